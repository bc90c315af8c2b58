use inplay_mc::markets::{AWAY_LABEL, DRAW_LABEL, HOME_LABEL, MarketKind};
use inplay_mc::{
    MarketReport, MatchState, ModelParams, SimError, SimulationConfig, TeamRating, simulate,
};

fn run(state: MatchState, home_xg: f64, away_xg: f64, config: SimulationConfig) -> MarketReport {
    simulate(
        &state,
        &TeamRating::new(home_xg),
        &TeamRating::new(away_xg),
        &config,
        &ModelParams::default(),
    )
    .expect("valid inputs")
}

fn seeded(trials: u32, seed: u64) -> SimulationConfig {
    SimulationConfig::default().with_trials(trials).with_seed(seed)
}

fn home_win(report: &MarketReport) -> f64 {
    report
        .probability(MarketKind::MatchOutcome, HOME_LABEL)
        .unwrap()
}

#[test]
fn complementary_markets_close_to_one() {
    let cases = [
        (MatchState::new(0, 0, 0), 1.4, 1.1),
        (MatchState::new(65, 1, 0).with_red_cards(1, 0), 1.8, 1.2),
        (MatchState::new(88, 2, 2).with_red_cards(2, 3), 2.5, 0.4),
        (MatchState::new(45, 0, 3), 0.0, 3.0),
    ];
    for (i, (state, h, a)) in cases.into_iter().enumerate() {
        let report = run(state, h, a, seeded(7_000, i as u64));
        for kind in [
            MarketKind::MatchOutcome,
            MarketKind::Totals,
            MarketKind::BothTeamsToScore,
        ] {
            let market = report.market(kind).unwrap();
            let sum = market.total_probability();
            assert!((sum - 1.0).abs() < 1e-9, "{kind:?} sums to {sum}");
            assert!(market.quotes.iter().all(|q| (0.0..=1.0).contains(&q.probability)));
        }
        assert_eq!(report.markets().len(), 4);
    }
}

#[test]
fn every_fixed_outcome_key_is_present() {
    let report = run(MatchState::new(10, 0, 0), 1.3, 1.3, seeded(1_000, 5));
    for label in [HOME_LABEL, DRAW_LABEL, AWAY_LABEL] {
        assert!(report.quote(MarketKind::MatchOutcome, label).is_some());
    }
    assert!(report.quote(MarketKind::Totals, "Over 2.5").is_some());
    assert!(report.quote(MarketKind::Totals, "Under 2.5").is_some());
    assert!(report.quote(MarketKind::BothTeamsToScore, "Yes").is_some());
    assert!(report.quote(MarketKind::BothTeamsToScore, "No").is_some());
    assert_eq!(report.correct_scores().len(), 5);
}

#[test]
fn fair_odds_are_reciprocal_of_probability() {
    let report = run(MatchState::new(80, 1, 0), 1.6, 1.0, seeded(10_000, 11));
    for market in report.markets() {
        for quote in &market.quotes {
            if quote.probability > 0.0 {
                let product = quote.fair_odds.value() * quote.probability;
                assert!((product - 1.0).abs() < 1e-9, "{}: {product}", quote.label);
            } else {
                assert!(quote.fair_odds.is_infinite());
            }
        }
    }
}

#[test]
fn leading_side_firms_up_as_clock_runs() {
    let state = MatchState::new(0, 1, 0);
    let minutes = [0u16, 30, 60, 85, 90];
    let probs: Vec<f64> = minutes
        .iter()
        .map(|m| {
            let mut s = state;
            s.minute = *m;
            home_win(&run(s, 1.5, 1.2, seeded(40_000, 99)))
        })
        .collect();
    for pair in probs.windows(2) {
        assert!(pair[1] > pair[0], "not increasing: {probs:?}");
    }
    assert_eq!(*probs.last().unwrap(), 1.0);
}

#[test]
fn red_cards_hurt_the_carded_side() {
    let mut prev = home_win(&run(MatchState::new(30, 0, 0), 1.5, 1.5, seeded(40_000, 3)));
    for cards in 1..=3u8 {
        let state = MatchState::new(30, 0, 0).with_red_cards(cards, 0);
        let next = home_win(&run(state, 1.5, 1.5, seeded(40_000, 3)));
        assert!(next < prev, "{cards} cards: {next} >= {prev}");
        prev = next;
    }

    let base = run(MatchState::new(30, 0, 0), 1.5, 1.5, seeded(40_000, 4));
    let opp_carded = run(
        MatchState::new(30, 0, 0).with_red_cards(0, 1),
        1.5,
        1.5,
        seeded(40_000, 4),
    );
    assert!(home_win(&opp_carded) > home_win(&base));
}

#[test]
fn top_scores_are_the_most_frequent() {
    let state = MatchState::new(20, 0, 0);
    let top5 = run(state, 1.6, 1.3, seeded(30_000, 8));
    let mut wide_cfg = seeded(30_000, 8);
    wide_cfg.top_scores = 500;
    let wide = run(state, 1.6, 1.3, wide_cfg);

    let short = top5.correct_scores();
    let all = wide.correct_scores();
    assert_eq!(short.len(), 5);
    assert!(all.len() > 5);
    assert_eq!(short, &all[..5]);
    for pair in all.windows(2) {
        assert!(pair[0].probability >= pair[1].probability);
    }
    let min_kept = short.last().unwrap().probability;
    assert!(all[5..].iter().all(|q| q.probability <= min_kept));
}

#[test]
fn same_seed_same_report() {
    let state = MatchState::new(52, 1, 1).with_red_cards(0, 1);
    let a = run(state, 1.7, 1.4, seeded(25_000, 1234));
    let b = run(state, 1.7, 1.4, seeded(25_000, 1234));
    assert_eq!(a, b);
    assert_eq!(a.to_json().unwrap(), b.to_json().unwrap());
}

#[test]
fn finished_match_is_certain_even_unseeded() {
    let config = SimulationConfig::default().with_trials(50_000);
    for _ in 0..3 {
        let report = run(MatchState::new(90, 2, 0), 0.0, 0.0, config);
        assert_eq!(home_win(&report), 1.0);
        let scores = report.correct_scores();
        assert_eq!(scores.len(), 1);
        assert_eq!(scores[0].label, "2-0");
        assert_eq!(scores[0].probability, 1.0);
        assert!(
            report
                .quote(MarketKind::MatchOutcome, AWAY_LABEL)
                .unwrap()
                .fair_odds
                .is_infinite()
        );
    }
}

#[test]
fn minutes_past_full_time_behave_like_full_time() {
    let state = MatchState::new(90, 1, 1);
    let late = MatchState { minute: 150, ..state };
    let a = run(state, 1.9, 0.7, seeded(5_000, 21));
    let b = run(late, 1.9, 0.7, seeded(5_000, 21));
    assert_eq!(a, b);
    assert_eq!(
        a.probability(MarketKind::MatchOutcome, DRAW_LABEL),
        Some(1.0)
    );
}

#[test]
fn zero_xg_freezes_current_score_from_kickoff() {
    let report = run(MatchState::new(0, 0, 1), 0.0, 0.0, seeded(5_000, 2));
    assert_eq!(
        report.probability(MarketKind::MatchOutcome, AWAY_LABEL),
        Some(1.0)
    );
    assert_eq!(report.probability(MarketKind::Totals, "Under 2.5"), Some(1.0));
    assert_eq!(report.probability(MarketKind::BothTeamsToScore, "No"), Some(1.0));
    assert_eq!(report.correct_scores()[0].label, "0-1");
}

#[test]
fn one_sided_zero_xg_never_scores() {
    let report = run(MatchState::new(0, 0, 0), 0.0, 2.0, seeded(10_000, 6));
    assert_eq!(report.probability(MarketKind::MatchOutcome, HOME_LABEL), Some(0.0));
    assert_eq!(report.probability(MarketKind::BothTeamsToScore, "Yes"), Some(0.0));
    assert!(report.correct_scores().iter().all(|q| q.label.starts_with("0-")));
}

#[test]
fn invalid_inputs_are_rejected() {
    let state = MatchState::new(10, 0, 0);
    let err = simulate(
        &state,
        &TeamRating::new(1.0),
        &TeamRating::new(1.0),
        &SimulationConfig::default().with_trials(0),
        &ModelParams::default(),
    )
    .unwrap_err();
    assert!(err.to_string().contains("trials"));

    let err = simulate(
        &state,
        &TeamRating::new(f64::INFINITY),
        &TeamRating::new(1.0),
        &SimulationConfig::default(),
        &ModelParams::default(),
    )
    .unwrap_err();
    assert!(matches!(err, SimError::InvalidInput { field: "home_xg", .. }));

    let err = simulate(
        &state,
        &TeamRating::new(1.0),
        &TeamRating::new(1.0),
        &SimulationConfig::default(),
        &ModelParams {
            attack_penalty: 0.75,
            defense_bonus: -1.0,
        },
    )
    .unwrap_err();
    assert!(matches!(err, SimError::InvalidInput { field: "defense_bonus", .. }));
}

#[test]
fn tiny_runs_may_report_fewer_scores() {
    let report = run(MatchState::new(0, 0, 0), 1.5, 1.5, seeded(3, 17));
    assert!(report.correct_scores().len() <= 3);
    assert_eq!(report.trials(), 3);
}
