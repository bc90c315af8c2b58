use crate::error::{SimError, SimResult};
use crate::model::{FULL_TIME_MINUTE, MatchState, ModelParams, TeamRating};

// Upper bound on goals still expected from one side. Far above any real match,
// and keeps every Poisson draw well inside `u32`.
pub const MAX_REMAINING_RATE: f64 = 1_000.0;

/// Expected goals still to come for each side, from now to full time.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct RemainingRates {
    pub fraction: f64,
    pub home: f64,
    pub away: f64,
}

/// Share of regulation time left. Zero at or past full time.
pub fn remaining_fraction(minute: u16) -> f64 {
    let minute = minute.min(FULL_TIME_MINUTE);
    f64::from(FULL_TIME_MINUTE - minute) / f64::from(FULL_TIME_MINUTE)
}

/// Combined red-card multiplier for one side's attacking rate: penalised for
/// its own cards, boosted for each card the opponent has taken.
pub fn card_multiplier(own_cards: u8, opponent_cards: u8, params: &ModelParams) -> f64 {
    params.attack_penalty.powi(i32::from(own_cards))
        * params.defense_bonus.powi(i32::from(opponent_cards))
}

pub fn remaining_rates(
    state: &MatchState,
    home: &TeamRating,
    away: &TeamRating,
    params: &ModelParams,
) -> RemainingRates {
    let fraction = remaining_fraction(state.minute);

    // Goal rate is assumed flat over the 90 minutes.
    let home_base = home.xg * fraction;
    let away_base = away.xg * fraction;

    RemainingRates {
        fraction,
        home: home_base * card_multiplier(state.home_red_cards, state.away_red_cards, params),
        away: away_base * card_multiplier(state.away_red_cards, state.home_red_cards, params),
    }
}

/// Rejects rates the sampler cannot draw from: non-finite values from
/// overflowing card multipliers, and anything above `MAX_REMAINING_RATE`.
pub fn check_rate(rate: f64, field: &'static str) -> SimResult<()> {
    if !rate.is_finite() {
        return Err(SimError::invalid(field, format!("rate is not finite ({rate})")));
    }
    if rate > MAX_REMAINING_RATE {
        return Err(SimError::invalid(
            field,
            format!("rate {rate} exceeds {MAX_REMAINING_RATE}"),
        ));
    }
    Ok(())
}

/// Minutes from `from` to full time in steps of `step`, always ending at full
/// time. `from` past full time is treated as full time.
pub fn sweep_minutes(from: u16, step: u16) -> Vec<u16> {
    let from = from.min(FULL_TIME_MINUTE);
    let mut out: Vec<u16> = (from..FULL_TIME_MINUTE)
        .step_by(usize::from(step.max(1)))
        .collect();
    out.push(FULL_TIME_MINUTE);
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    fn rates(minute: u16, home_reds: u8, away_reds: u8) -> RemainingRates {
        let state = MatchState::new(minute, 0, 0).with_red_cards(home_reds, away_reds);
        remaining_rates(
            &state,
            &TeamRating::new(1.8),
            &TeamRating::new(1.2),
            &ModelParams::default(),
        )
    }

    #[test]
    fn fraction_is_linear_and_floors_at_zero() {
        assert_eq!(remaining_fraction(0), 1.0);
        assert!((remaining_fraction(45) - 0.5).abs() < 1e-12);
        assert_eq!(remaining_fraction(90), 0.0);
        assert_eq!(remaining_fraction(150), 0.0);
        assert_eq!(remaining_fraction(u16::MAX), 0.0);
    }

    #[test]
    fn no_cards_scales_by_time_only() {
        let r = rates(30, 0, 0);
        assert!((r.home - 1.2).abs() < 1e-12);
        assert!((r.away - 0.8).abs() < 1e-12);
    }

    #[test]
    fn home_red_card_shifts_both_rates() {
        let r = rates(0, 1, 0);
        assert!((r.home - 1.8 * 0.75).abs() < 1e-12);
        assert!((r.away - 1.2 * 1.15).abs() < 1e-12);
    }

    #[test]
    fn cards_compose_multiplicatively() {
        let r = rates(0, 2, 1);
        let home = 1.8 * 0.75_f64.powi(2) * 1.15;
        let away = 1.2 * 0.75 * 1.15_f64.powi(2);
        assert!((r.home - home).abs() < 1e-12);
        assert!((r.away - away).abs() < 1e-12);
    }

    #[test]
    fn each_extra_card_strictly_moves_rates() {
        let mut prev = rates(10, 0, 0);
        for cards in 1..=4 {
            let next = rates(10, cards, 0);
            assert!(next.home < prev.home);
            assert!(next.away > prev.away);
            prev = next;
        }
    }

    #[test]
    fn full_time_rates_are_zero_regardless_of_cards() {
        let r = rates(90, 3, 1);
        assert_eq!(r.home, 0.0);
        assert_eq!(r.away, 0.0);
    }

    #[test]
    fn overflowing_or_huge_rates_are_rejected() {
        assert!(check_rate(1.2, "home_rate").is_ok());
        assert!(check_rate(0.0, "home_rate").is_ok());
        assert!(check_rate(MAX_REMAINING_RATE, "home_rate").is_ok());
        assert!(check_rate(f64::INFINITY, "home_rate").is_err());
        assert!(check_rate(f64::NAN, "away_rate").is_err());
        assert!(check_rate(1e10, "away_rate").is_err());
    }

    #[test]
    fn sweep_clamps_start_and_ends_at_full_time() {
        assert_eq!(sweep_minutes(70, 10), vec![70, 80, 90]);
        assert_eq!(sweep_minutes(85, 10), vec![85, 90]);
        assert_eq!(sweep_minutes(90, 5), vec![90]);
        assert_eq!(sweep_minutes(150, 5), vec![90]);
        assert_eq!(sweep_minutes(88, 0), vec![88, 89, 90]);
    }
}
