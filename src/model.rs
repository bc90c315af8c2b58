use serde::{Deserialize, Serialize};

use crate::error::{SimError, SimResult};

pub const FULL_TIME_MINUTE: u16 = 90;

// Per red card: the carded side keeps this share of its attacking rate...
pub const ATTACK_PENALTY: f64 = 0.75;
// ...and the opponent's rate is scaled up by this.
pub const DEFENSE_BONUS: f64 = 1.15;

pub const DEFAULT_TRIALS: u32 = 10_000;
pub const DEFAULT_TOTALS_LINE: f64 = 2.5;
pub const DEFAULT_TOP_SCORES: usize = 5;

/// Live state of the match at the moment of simulation.
///
/// `minute` beyond full time is accepted and treated as full time; stoppage
/// time is not modeled.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct MatchState {
    pub minute: u16,
    pub home_goals: u32,
    pub away_goals: u32,
    pub home_red_cards: u8,
    pub away_red_cards: u8,
}

impl MatchState {
    pub fn new(minute: u16, home_goals: u32, away_goals: u32) -> Self {
        Self {
            minute,
            home_goals,
            away_goals,
            home_red_cards: 0,
            away_red_cards: 0,
        }
    }

    pub fn with_red_cards(mut self, home: u8, away: u8) -> Self {
        self.home_red_cards = home;
        self.away_red_cards = away;
        self
    }

    pub fn clamped_minute(&self) -> u16 {
        self.minute.min(FULL_TIME_MINUTE)
    }
}

/// Pre-match expected goals for one side over a full 90 minutes.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct TeamRating {
    pub xg: f64,
}

impl TeamRating {
    pub fn new(xg: f64) -> Self {
        Self { xg }
    }

    pub(crate) fn validate(&self, field: &'static str) -> SimResult<()> {
        if !self.xg.is_finite() {
            return Err(SimError::invalid(field, format!("xG must be finite, got {}", self.xg)));
        }
        if self.xg < 0.0 {
            return Err(SimError::invalid(field, format!("xG must be >= 0, got {}", self.xg)));
        }
        Ok(())
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SimulationConfig {
    pub trials: u32,
    /// Fixed seed for reproducible runs; `None` draws a fresh one per call.
    pub seed: Option<u64>,
    pub totals_line: f64,
    pub top_scores: usize,
}

impl Default for SimulationConfig {
    fn default() -> Self {
        Self {
            trials: DEFAULT_TRIALS,
            seed: None,
            totals_line: DEFAULT_TOTALS_LINE,
            top_scores: DEFAULT_TOP_SCORES,
        }
    }
}

impl SimulationConfig {
    pub fn with_trials(mut self, trials: u32) -> Self {
        self.trials = trials;
        self
    }

    pub fn with_seed(mut self, seed: u64) -> Self {
        self.seed = Some(seed);
        self
    }

    pub(crate) fn validate(&self) -> SimResult<()> {
        if self.trials == 0 {
            return Err(SimError::invalid("trials", "must be a positive integer"));
        }
        if !self.totals_line.is_finite() || self.totals_line < 0.0 {
            return Err(SimError::invalid(
                "totals_line",
                format!("must be a finite number >= 0, got {}", self.totals_line),
            ));
        }
        if self.top_scores == 0 {
            return Err(SimError::invalid("top_scores", "must retain at least one score"));
        }
        Ok(())
    }
}

/// Red-card calibration. Not fitted against historical data.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ModelParams {
    pub attack_penalty: f64,
    pub defense_bonus: f64,
}

impl Default for ModelParams {
    fn default() -> Self {
        Self {
            attack_penalty: ATTACK_PENALTY,
            defense_bonus: DEFENSE_BONUS,
        }
    }
}

impl ModelParams {
    pub(crate) fn validate(&self) -> SimResult<()> {
        for (field, value) in [
            ("attack_penalty", self.attack_penalty),
            ("defense_bonus", self.defense_bonus),
        ] {
            if !value.is_finite() || value <= 0.0 {
                return Err(SimError::invalid(
                    field,
                    format!("must be a finite number > 0, got {value}"),
                ));
            }
        }
        Ok(())
    }
}

/// Everything one run depends on. Two equal `SimInputs` with a seed set
/// produce equal reports.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SimInputs {
    pub state: MatchState,
    pub home: TeamRating,
    pub away: TeamRating,
    pub config: SimulationConfig,
    pub params: ModelParams,
}

/// Flat request shape, e.g. when the engine is driven from a JSON file.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SimulationRequest {
    pub minute: u16,
    pub home_goals: u32,
    pub away_goals: u32,
    #[serde(rename = "homeXG", alias = "homeXg")]
    pub home_xg: f64,
    #[serde(rename = "awayXG", alias = "awayXg")]
    pub away_xg: f64,
    #[serde(default)]
    pub home_red_cards: u8,
    #[serde(default)]
    pub away_red_cards: u8,
    #[serde(default = "default_trials")]
    pub trials: u32,
    #[serde(default)]
    pub seed: Option<u64>,
}

fn default_trials() -> u32 {
    DEFAULT_TRIALS
}

impl SimulationRequest {
    pub fn to_inputs(&self) -> SimInputs {
        SimInputs {
            state: MatchState::new(self.minute, self.home_goals, self.away_goals)
                .with_red_cards(self.home_red_cards, self.away_red_cards),
            home: TeamRating::new(self.home_xg),
            away: TeamRating::new(self.away_xg),
            config: SimulationConfig {
                trials: self.trials,
                seed: self.seed,
                ..SimulationConfig::default()
            },
            params: ModelParams::default(),
        }
    }
}
