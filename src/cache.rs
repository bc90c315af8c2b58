use std::collections::{HashMap, VecDeque};
use std::sync::Arc;

use tracing::debug;

use crate::engine::simulate_inputs;
use crate::error::SimResult;
use crate::markets::MarketReport;
use crate::model::{MatchState, SimInputs};

const DEFAULT_CAPACITY: usize = 256;

// Floats are keyed by bit pattern; 0.0 and -0.0 therefore miss each other,
// which only costs a re-run.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
struct CacheKey {
    state: MatchState,
    home_xg: u64,
    away_xg: u64,
    trials: u32,
    seed: Option<u64>,
    totals_line: u64,
    top_scores: usize,
    attack_penalty: u64,
    defense_bonus: u64,
}

impl From<&SimInputs> for CacheKey {
    fn from(inputs: &SimInputs) -> Self {
        Self {
            state: inputs.state,
            home_xg: inputs.home.xg.to_bits(),
            away_xg: inputs.away.xg.to_bits(),
            trials: inputs.config.trials,
            seed: inputs.config.seed,
            totals_line: inputs.config.totals_line.to_bits(),
            top_scores: inputs.config.top_scores,
            attack_penalty: inputs.params.attack_penalty.to_bits(),
            defense_bonus: inputs.params.defense_bonus.to_bits(),
        }
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct CacheStats {
    pub hits: u64,
    pub misses: u64,
}

/// Memo of finished runs, owned by whoever drives the engine. An unseeded
/// entry pins the first stochastic estimate for its inputs until evicted.
#[derive(Debug)]
pub struct SimulationCache {
    capacity: usize,
    entries: HashMap<CacheKey, Arc<MarketReport>>,
    order: VecDeque<CacheKey>,
    stats: CacheStats,
}

impl Default for SimulationCache {
    fn default() -> Self {
        Self::with_capacity(DEFAULT_CAPACITY)
    }
}

impl SimulationCache {
    pub fn with_capacity(capacity: usize) -> Self {
        let capacity = capacity.max(1);
        Self {
            capacity,
            entries: HashMap::with_capacity(capacity),
            order: VecDeque::with_capacity(capacity),
            stats: CacheStats::default(),
        }
    }

    pub fn get_or_simulate(&mut self, inputs: &SimInputs) -> SimResult<Arc<MarketReport>> {
        let key = CacheKey::from(inputs);
        if let Some(report) = self.entries.get(&key) {
            self.stats.hits += 1;
            return Ok(Arc::clone(report));
        }

        let report = Arc::new(simulate_inputs(inputs)?);
        self.stats.misses += 1;

        if self.entries.len() >= self.capacity
            && let Some(oldest) = self.order.pop_front()
        {
            self.entries.remove(&oldest);
            debug!(capacity = self.capacity, "evicted oldest simulation");
        }
        self.entries.insert(key, Arc::clone(&report));
        self.order.push_back(key);
        Ok(report)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn stats(&self) -> CacheStats {
        self.stats
    }

    pub fn clear(&mut self) {
        self.entries.clear();
        self.order.clear();
    }
}
