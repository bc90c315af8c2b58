use once_cell::sync::OnceCell;
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use rand_distr::{Distribution, Poisson};
use rayon::prelude::*;
use tracing::{debug, trace};

use crate::error::{SimError, SimResult};
use crate::markets::{MarketReport, Tally};
use crate::model::{
    MatchState, ModelParams, SimInputs, SimulationConfig, SimulationRequest, TeamRating,
};
use crate::rates::{RemainingRates, check_rate, remaining_rates};
use crate::settings;

// Fixed so that a seeded run splits identically on any machine.
const CHUNK_TRIALS: u32 = 4_096;
const SEED_STRIDE: u64 = 0x9E37_79B9_7F4A_7C15;

static SIM_POOL: OnceCell<Option<rayon::ThreadPool>> = OnceCell::new();

/// Runs `config.trials` independent continuations of the match and turns the
/// simulated final scores into market probabilities.
pub fn simulate(
    state: &MatchState,
    home: &TeamRating,
    away: &TeamRating,
    config: &SimulationConfig,
    params: &ModelParams,
) -> SimResult<MarketReport> {
    home.validate("home_xg")?;
    away.validate("away_xg")?;
    config.validate()?;
    params.validate()?;

    let rates = remaining_rates(state, home, away, params);
    let home_sampler = GoalSampler::new(rates.home, "home_rate")?;
    let away_sampler = GoalSampler::new(rates.away, "away_rate")?;

    let seed = config.seed.unwrap_or_else(|| rand::thread_rng().r#gen());
    debug!(
        minute = state.clamped_minute(),
        home_rate = rates.home,
        away_rate = rates.away,
        trials = config.trials,
        seeded = config.seed.is_some(),
        "simulating remaining match time"
    );

    let chunks = chunk_plan(config.trials);
    let run = || {
        chunks
            .par_iter()
            .map(|&(index, len)| {
                sample_chunk(
                    chunk_seed(seed, index),
                    len,
                    state,
                    &home_sampler,
                    &away_sampler,
                    config.totals_line,
                )
            })
            .reduce(Tally::default, Tally::merge)
    };
    let tally = with_sim_pool(run);

    debug!(distinct_scores = tally.distinct_scores(), "simulation complete");
    Ok(tally.into_report(config.totals_line, config.top_scores))
}

pub fn simulate_inputs(inputs: &SimInputs) -> SimResult<MarketReport> {
    simulate(
        &inputs.state,
        &inputs.home,
        &inputs.away,
        &inputs.config,
        &inputs.params,
    )
}

pub fn simulate_request(request: &SimulationRequest) -> SimResult<MarketReport> {
    simulate_inputs(&request.to_inputs())
}

pub fn effective_rates(inputs: &SimInputs) -> RemainingRates {
    remaining_rates(&inputs.state, &inputs.home, &inputs.away, &inputs.params)
}

/// `rand_distr::Poisson` rejects a zero rate, and a side with nothing left to
/// play for can only add zero goals anyway.
#[derive(Debug, Clone)]
enum GoalSampler {
    Zero,
    Poisson(Poisson<f64>),
}

impl GoalSampler {
    fn new(rate: f64, field: &'static str) -> SimResult<Self> {
        check_rate(rate, field)?;
        if rate <= 0.0 {
            return Ok(GoalSampler::Zero);
        }
        Poisson::new(rate)
            .map(GoalSampler::Poisson)
            .map_err(|err| SimError::invalid(field, format!("rate {rate}: {err}")))
    }

    fn sample<R: Rng + ?Sized>(&self, rng: &mut R) -> u32 {
        match self {
            GoalSampler::Zero => 0,
            GoalSampler::Poisson(dist) => dist.sample(rng) as u32,
        }
    }
}

fn sample_chunk(
    seed: u64,
    len: u32,
    state: &MatchState,
    home: &GoalSampler,
    away: &GoalSampler,
    totals_line: f64,
) -> Tally {
    let mut rng = StdRng::seed_from_u64(seed);
    let mut tally = Tally::default();
    for _ in 0..len {
        // Home is always drawn first so a seed maps to one sequence of scores.
        let home_final = state.home_goals.saturating_add(home.sample(&mut rng));
        let away_final = state.away_goals.saturating_add(away.sample(&mut rng));
        tally.record(home_final, away_final, totals_line);
    }
    tally
}

fn chunk_plan(trials: u32) -> Vec<(u64, u32)> {
    let mut out = Vec::with_capacity(trials.div_ceil(CHUNK_TRIALS) as usize);
    let mut left = trials;
    let mut index = 0u64;
    while left > 0 {
        let len = left.min(CHUNK_TRIALS);
        out.push((index, len));
        left -= len;
        index += 1;
    }
    out
}

fn chunk_seed(seed: u64, index: u64) -> u64 {
    let derived = seed ^ index.wrapping_add(1).wrapping_mul(SEED_STRIDE);
    trace!(chunk = index, seed = derived, "chunk seed");
    derived
}

fn with_sim_pool<T>(action: impl FnOnce() -> T + Send) -> T
where
    T: Send,
{
    let pool = SIM_POOL.get_or_init(build_sim_pool);
    if let Some(pool) = pool.as_ref() {
        pool.install(action)
    } else {
        action()
    }
}

fn build_sim_pool() -> Option<rayon::ThreadPool> {
    let threads = settings::sim_threads()?;
    rayon::ThreadPoolBuilder::new()
        .num_threads(threads)
        .thread_name(|i| format!("inplay-sim-{i}"))
        .build()
        .ok()
}
