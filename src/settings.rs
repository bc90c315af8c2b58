use std::env;

use crate::model::{
    DEFAULT_TOP_SCORES, DEFAULT_TOTALS_LINE, DEFAULT_TRIALS, ModelParams, SimulationConfig,
};

const MAX_TRIALS: u32 = 5_000_000;
const MAX_TOP_SCORES: usize = 50;
const MAX_THREADS: usize = 64;

/// Run defaults read from the environment. Unparseable values fall back to
/// the built-in default rather than failing start-up.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Settings {
    pub trials: u32,
    pub seed: Option<u64>,
    pub totals_line: f64,
    pub top_scores: usize,
    pub params: ModelParams,
    pub threads: Option<usize>,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            trials: DEFAULT_TRIALS,
            seed: None,
            totals_line: DEFAULT_TOTALS_LINE,
            top_scores: DEFAULT_TOP_SCORES,
            params: ModelParams::default(),
            threads: None,
        }
    }
}

impl Settings {
    pub fn from_env() -> Self {
        Self::from_lookup(|key| env::var(key).ok())
    }

    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Self {
        let d = Settings::default();
        let parse_u64 = |key: &str| {
            lookup(key)
                .and_then(|val| val.trim().parse::<u64>().ok())
        };
        let parse_f64 = |key: &str| {
            lookup(key)
                .and_then(|val| val.trim().parse::<f64>().ok())
                .filter(|v| v.is_finite())
        };

        Settings {
            trials: parse_u64("SIM_TRIALS")
                .map(|v| v.clamp(1, u64::from(MAX_TRIALS)) as u32)
                .unwrap_or(d.trials),
            seed: parse_u64("SIM_SEED"),
            totals_line: parse_f64("SIM_TOTALS_LINE")
                .filter(|v| *v >= 0.0)
                .unwrap_or(d.totals_line),
            top_scores: parse_u64("SIM_TOP_SCORES")
                .map(|v| (v as usize).clamp(1, MAX_TOP_SCORES))
                .unwrap_or(d.top_scores),
            params: ModelParams {
                attack_penalty: parse_f64("SIM_ATTACK_PENALTY")
                    .filter(|v| *v > 0.0)
                    .unwrap_or(d.params.attack_penalty),
                defense_bonus: parse_f64("SIM_DEFENSE_BONUS")
                    .filter(|v| *v > 0.0)
                    .unwrap_or(d.params.defense_bonus),
            },
            threads: parse_u64("SIM_THREADS").map(|v| (v as usize).clamp(1, MAX_THREADS)),
        }
    }

    pub fn config(&self) -> SimulationConfig {
        SimulationConfig {
            trials: self.trials,
            seed: self.seed,
            totals_line: self.totals_line,
            top_scores: self.top_scores,
        }
    }
}

/// Size of the dedicated simulation pool, if one was requested.
pub fn sim_threads() -> Option<usize> {
    Settings::from_env().threads
}
