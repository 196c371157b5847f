//! Ephemeral state of the active run and the reducer driving it.
//!
//! The reducer has no persistence side effects; saving progress is a
//! separate, explicit step taken by the surrounding screen logic at
//! defined checkpoints (pause, game over).

/// Health granted to a fresh account's runner.
pub const BASE_MAX_HEALTH: i32 = 100;
/// Max health can never grow beyond this, regardless of level.
pub const MAX_HEALTH_CAP: i32 = 200;
/// Max health gained per level.
const LEVEL_UP_HEALTH_BONUS: i32 = 10;

/// In-memory state of the active run.
#[derive(Debug, Clone, PartialEq)]
pub struct RunState {
    pub score: u64,
    pub distance: f64,
    /// Wallet balance; survives run resets.
    pub coins: u64,
    pub running: bool,
    pub paused: bool,
    pub level: u32,
    pub health: i32,
    pub max_health: i32,
}

impl Default for RunState {
    fn default() -> Self {
        Self {
            score: 0,
            distance: 0.0,
            coins: 0,
            running: false,
            paused: false,
            level: 1,
            health: BASE_MAX_HEALTH,
            max_health: BASE_MAX_HEALTH,
        }
    }
}

/// Transitions accepted by the run-state reducer.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum RunAction {
    /// Zero score and distance, refill health, start running.
    Start,
    Pause,
    Resume,
    End,
    AddScore(u64),
    AddDistance(f64),
    AddCoins(u64),
    /// Saturating; the balance never goes negative.
    SpendCoins(u64),
    /// Signed delta, clamped to `[0, max_health]`.
    AdjustHealth(i32),
    /// Raise the level, grow max health up to the cap, refill health.
    LevelUp,
    /// Back to the initial state, keeping the coin balance.
    Reset,
}

impl RunState {
    /// Apply one action to the state.
    pub fn apply(&mut self, action: RunAction) {
        match action {
            RunAction::Start => {
                self.running = true;
                self.paused = false;
                self.score = 0;
                self.distance = 0.0;
                self.health = self.max_health;
            }
            RunAction::Pause => self.paused = true,
            RunAction::Resume => self.paused = false,
            RunAction::End => {
                self.running = false;
                self.paused = false;
            }
            RunAction::AddScore(points) => self.score += points,
            RunAction::AddDistance(meters) => self.distance += meters,
            RunAction::AddCoins(coins) => self.coins += coins,
            RunAction::SpendCoins(coins) => self.coins = self.coins.saturating_sub(coins),
            RunAction::AdjustHealth(delta) => {
                self.health = (self.health + delta).clamp(0, self.max_health);
            }
            RunAction::LevelUp => {
                self.level += 1;
                self.max_health = (self.max_health + LEVEL_UP_HEALTH_BONUS).min(MAX_HEALTH_CAP);
                self.health = self.max_health;
            }
            RunAction::Reset => {
                *self = RunState {
                    coins: self.coins,
                    ..RunState::default()
                };
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn start_zeroes_run_fields_and_refills_health() {
        let mut state = RunState {
            score: 500,
            distance: 120.0,
            coins: 30,
            health: 40,
            ..RunState::default()
        };
        state.apply(RunAction::Start);
        assert!(state.running);
        assert!(!state.paused);
        assert_eq!(state.score, 0);
        assert_eq!(state.distance, 0.0);
        assert_eq!(state.health, state.max_health);
        // Wallet is untouched by starting a run.
        assert_eq!(state.coins, 30);
    }

    #[test]
    fn pause_and_resume_only_toggle_the_flag() {
        let mut state = RunState::default();
        state.apply(RunAction::Start);
        state.apply(RunAction::AddScore(10));
        state.apply(RunAction::Pause);
        assert!(state.paused);
        assert_eq!(state.score, 10);
        state.apply(RunAction::Resume);
        assert!(!state.paused);
        assert_eq!(state.score, 10);
    }

    #[test]
    fn health_is_clamped_both_ways() {
        let mut state = RunState::default();
        state.apply(RunAction::AdjustHealth(-250));
        assert_eq!(state.health, 0);
        state.apply(RunAction::AdjustHealth(999));
        assert_eq!(state.health, state.max_health);
    }

    #[test]
    fn level_up_grows_max_health_to_the_cap_and_refills() {
        let mut state = RunState::default();
        for _ in 0..15 {
            state.apply(RunAction::LevelUp);
        }
        assert_eq!(state.level, 16);
        assert_eq!(state.max_health, MAX_HEALTH_CAP);
        assert_eq!(state.health, MAX_HEALTH_CAP);
    }

    #[test]
    fn spend_coins_saturates_at_zero() {
        let mut state = RunState::default();
        state.apply(RunAction::AddCoins(10));
        state.apply(RunAction::SpendCoins(25));
        assert_eq!(state.coins, 0);
    }

    #[test]
    fn reset_keeps_only_the_coin_balance() {
        let mut state = RunState::default();
        state.apply(RunAction::Start);
        state.apply(RunAction::AddScore(999));
        state.apply(RunAction::AddCoins(42));
        state.apply(RunAction::LevelUp);
        state.apply(RunAction::Reset);
        assert_eq!(state.coins, 42);
        assert_eq!(
            state,
            RunState {
                coins: 42,
                ..RunState::default()
            }
        );
    }
}
