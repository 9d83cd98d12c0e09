fn main() {
    drone_patrol::game::run();
}
