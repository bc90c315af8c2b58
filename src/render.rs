use std::fmt::Write as _;

use crate::exact::ExactProbabilities;
use crate::markets::{
    AWAY_LABEL, DRAW_LABEL, FairOdds, HOME_LABEL, MarketKind, MarketReport,
};
use crate::model::MatchState;

pub fn scenario_line(state: &MatchState, home_name: &str, away_name: &str) -> String {
    let mut line = format!(
        "{}' {} {} - {} {}",
        state.minute, home_name, state.home_goals, state.away_goals, away_name
    );
    if state.home_red_cards > 0 || state.away_red_cards > 0 {
        let _ = write!(
            line,
            " (red cards {}-{})",
            state.home_red_cards, state.away_red_cards
        );
    }
    line
}

pub fn format_odds(odds: FairOdds) -> String {
    match odds {
        FairOdds::Finite(v) => format!("{v:.2}"),
        FairOdds::Infinite => "inf".to_string(),
    }
}

pub fn format_pct(p: f64) -> String {
    format!("{:.1}%", p * 100.0)
}

/// Plain-text report: one block per market, odds to two decimals.
pub fn render_text(report: &MarketReport) -> String {
    let mut out = String::new();
    let _ = writeln!(out, "Trials: {}", report.trials());

    for market in report.markets() {
        let _ = writeln!(out);
        let _ = writeln!(out, "{}", market.name);
        if market.kind == MarketKind::CorrectScore {
            let _ = writeln!(out, "  {:<8} {:>8} {:>8}", "Score", "Prob", "Odds");
        }
        for quote in &market.quotes {
            let _ = writeln!(
                out,
                "  {:<8} {:>8} {:>8}",
                quote.label,
                format_pct(quote.probability),
                format_odds(quote.fair_odds)
            );
        }
    }
    out
}

/// Side-by-side match-outcome table of simulated vs analytic values.
pub fn render_exact_comparison(report: &MarketReport, exact: &ExactProbabilities) -> String {
    let mut out = String::new();
    let _ = writeln!(out, "Analytic check (match outcome)");
    let _ = writeln!(out, "  {:<8} {:>8} {:>8} {:>8}", "", "Sim", "Exact", "AbsErr");
    for (label, expected) in [
        (HOME_LABEL, exact.home_win),
        (DRAW_LABEL, exact.draw),
        (AWAY_LABEL, exact.away_win),
    ] {
        let sim = report
            .probability(MarketKind::MatchOutcome, label)
            .unwrap_or(0.0);
        let _ = writeln!(
            out,
            "  {:<8} {:>8} {:>8} {:>8.4}",
            label,
            format_pct(sim),
            format_pct(expected),
            (sim - expected).abs()
        );
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::markets::Tally;

    #[test]
    fn odds_and_percentages_format() {
        assert_eq!(format_odds(FairOdds::Finite(2.0 / 3.0)), "0.67");
        assert_eq!(format_odds(FairOdds::Infinite), "inf");
        assert_eq!(format_pct(0.4567), "45.7%");
    }

    #[test]
    fn scenario_line_mentions_cards_only_when_present() {
        let state = MatchState::new(65, 1, 0);
        assert_eq!(scenario_line(&state, "A", "B"), "65' A 1 - 0 B");
        let carded = state.with_red_cards(1, 0);
        assert!(scenario_line(&carded, "A", "B").ends_with("(red cards 1-0)"));
    }

    #[test]
    fn text_report_lists_every_market() {
        let mut t = Tally::default();
        t.record(2, 0, 2.5);
        t.record(1, 1, 2.5);
        let text = render_text(&t.into_report(2.5, 5));
        assert!(text.contains("Match Outcome (1X2)"));
        assert!(text.contains("Total Goals (O/U 2.5)"));
        assert!(text.contains("Both Teams To Score"));
        assert!(text.contains("Correct Score (Top 5)"));
        assert!(text.contains("2-0"));
        assert!(text.contains("inf"));
    }
}
