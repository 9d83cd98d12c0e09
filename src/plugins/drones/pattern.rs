//! Attack patterns and the round -> pattern mapping.

/// How a drone closes in on its target.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum AttackPattern {
    /// Straight linear run at the target.
    #[default]
    SeekAndDestroy,
    /// Faster straight run with eased acceleration.
    HomingCharge,
    /// Endless laps around the target.
    CircularEncirclement,
}

impl AttackPattern {
    /// Pattern assigned to a round, if the round has one.
    pub fn for_round(round: u32) -> Option<Self> {
        match round {
            1 => Some(Self::SeekAndDestroy),
            2 => Some(Self::HomingCharge),
            3 => Some(Self::CircularEncirclement),
            _ => None,
        }
    }

    /// Rounds without a pattern keep `current`.
    #[inline]
    pub fn select(round: u32, current: Self) -> Self {
        Self::for_round(round).unwrap_or(current)
    }
}
