use crate::error::SimResult;
use crate::markets::{Outcome, classify_outcome};
use crate::model::{MatchState, ModelParams, TeamRating};
use crate::rates::{check_rate, remaining_rates};

pub const DEFAULT_MAX_GOALS: u32 = 15;

/// Closed-form probabilities for the same model the sampler draws from.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ExactProbabilities {
    pub home_win: f64,
    pub draw: f64,
    pub away_win: f64,
    pub over: f64,
    pub both_score: f64,
}

pub fn market_probabilities(
    state: &MatchState,
    home: &TeamRating,
    away: &TeamRating,
    params: &ModelParams,
    totals_line: f64,
    max_goals: u32,
) -> SimResult<ExactProbabilities> {
    home.validate("home_xg")?;
    away.validate("away_xg")?;
    params.validate()?;

    let rates = remaining_rates(state, home, away, params);
    check_rate(rates.home, "home_rate")?;
    check_rate(rates.away, "away_rate")?;
    let pmf_h = poisson_pmf(rates.home, max_goals);
    let pmf_a = poisson_pmf(rates.away, max_goals);

    let mut out = ExactProbabilities {
        home_win: 0.0,
        draw: 0.0,
        away_win: 0.0,
        over: 0.0,
        both_score: 0.0,
    };

    for (i, p_i) in pmf_h.iter().enumerate() {
        for (j, p_j) in pmf_a.iter().enumerate() {
            let p = p_i * p_j;
            let fh = state.home_goals.saturating_add(i as u32);
            let fa = state.away_goals.saturating_add(j as u32);
            match classify_outcome(fh, fa) {
                Outcome::Home => out.home_win += p,
                Outcome::Draw => out.draw += p,
                Outcome::Away => out.away_win += p,
            }
            if f64::from(fh) + f64::from(fa) > totals_line {
                out.over += p;
            }
            if fh > 0 && fa > 0 {
                out.both_score += p;
            }
        }
    }

    Ok(out)
}

/// Poisson pmf over `0..=max_k`, with the tail beyond `max_k` folded into the
/// last bucket so the vector sums to one.
pub fn poisson_pmf(lambda: f64, max_k: u32) -> Vec<f64> {
    let max_k = max_k as usize;
    let mut out = vec![0.0; max_k + 1];
    let lambda = lambda.max(0.0);

    out[0] = (-lambda).exp();
    for k in 1..=max_k {
        out[k] = out[k - 1] * lambda / k as f64;
    }

    let sum: f64 = out.iter().sum();
    if sum < 1.0 {
        out[max_k] += 1.0 - sum;
    }
    out
}
