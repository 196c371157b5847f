//! Track entities the runner interacts with, and their effects on the run
//! state.

use crate::client::run_state::{RunAction, RunState};

/// Obstacle flavors; each demands a different dodge move.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ObstacleKind {
    Jump,
    Slide,
    Duck,
}

impl ObstacleKind {
    /// Health lost when the runner collides with this obstacle.
    pub fn damage(self) -> i32 {
        match self {
            ObstacleKind::Jump | ObstacleKind::Slide | ObstacleKind::Duck => 20,
        }
    }

    /// Apply a collision with this obstacle to the run state.
    pub fn apply_collision(self, state: &mut RunState) {
        state.apply(RunAction::AdjustHealth(-self.damage()));
        if state.health == 0 {
            state.apply(RunAction::End);
        }
    }
}

/// Pickup flavors scattered along the track.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PowerUpKind {
    Coin,
    Health,
    Speed,
    Shield,
}

/// A renderer-side effect that outlives the pickup moment.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct TimedBoost {
    pub kind: PowerUpKind,
    pub seconds: f32,
}

impl PowerUpKind {
    /// Apply picking up this power-up. Coin and health effects land on the
    /// run state directly; speed and shield are timed effects handed back to
    /// the game loop.
    pub fn apply_pickup(self, value: u32, state: &mut RunState) -> Option<TimedBoost> {
        match self {
            PowerUpKind::Coin => {
                state.apply(RunAction::AddCoins(u64::from(value)));
                None
            }
            PowerUpKind::Health => {
                state.apply(RunAction::AdjustHealth(value as i32));
                None
            }
            PowerUpKind::Speed | PowerUpKind::Shield => Some(TimedBoost {
                kind: self,
                seconds: value as f32,
            }),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn collision_damages_and_ends_the_run_at_zero() {
        let mut state = RunState::default();
        state.apply(RunAction::Start);
        ObstacleKind::Jump.apply_collision(&mut state);
        assert_eq!(state.health, 80);
        assert!(state.running);

        for _ in 0..4 {
            ObstacleKind::Duck.apply_collision(&mut state);
        }
        assert_eq!(state.health, 0);
        assert!(!state.running);
    }

    #[test]
    fn coin_pickup_credits_the_wallet() {
        let mut state = RunState::default();
        assert_eq!(PowerUpKind::Coin.apply_pickup(5, &mut state), None);
        assert_eq!(state.coins, 5);
    }

    #[test]
    fn health_pickup_is_clamped_to_max() {
        let mut state = RunState::default();
        state.apply(RunAction::AdjustHealth(-30));
        PowerUpKind::Health.apply_pickup(50, &mut state);
        assert_eq!(state.health, state.max_health);
    }

    #[test]
    fn speed_and_shield_become_timed_boosts() {
        let mut state = RunState::default();
        let boost = PowerUpKind::Shield.apply_pickup(8, &mut state).unwrap();
        assert_eq!(boost.kind, PowerUpKind::Shield);
        assert_eq!(boost.seconds, 8.0);
        assert_eq!(state, RunState::default());
    }
}
