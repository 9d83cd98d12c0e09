use bevy::prelude::*;
use rand::Rng;

use crate::common::tunables::Tunables;
use crate::plugins::core::{self, DroneRng};

#[test]
fn inserts_resources() {
    let mut app = App::new();
    core::plugin(&mut app);
    assert!(app.world().get_resource::<Tunables>().is_some());
    assert!(app.world().get_resource::<DroneRng>().is_some());
    assert!(app.world().get_resource::<ClearColor>().is_some());
}

#[test]
fn keeps_preinserted_tunables() {
    let mut app = App::new();
    app.insert_resource(Tunables { drone_health: 7, ..default() });
    core::plugin(&mut app);
    assert_eq!(app.world().resource::<Tunables>().drone_health, 7);
}

#[test]
fn seeded_rng_is_reproducible() {
    let mut a = DroneRng::seeded(42);
    let mut b = DroneRng::seeded(42);
    for _ in 0..16 {
        assert_eq!(a.0.gen_range(0..1000), b.0.gen_range(0..1000));
    }
}
