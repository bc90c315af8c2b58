use std::cmp::Ordering;
use std::collections::HashMap;

use serde::ser::{SerializeMap, Serializer};
use serde::Serialize;

pub const MATCH_OUTCOME: &str = "Match Outcome (1X2)";
pub const BOTH_TEAMS_TO_SCORE: &str = "Both Teams To Score";

pub const HOME_LABEL: &str = "1";
pub const DRAW_LABEL: &str = "X";
pub const AWAY_LABEL: &str = "2";
pub const YES_LABEL: &str = "Yes";
pub const NO_LABEL: &str = "No";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Outcome {
    Home,
    Draw,
    Away,
}

pub fn classify_outcome(home_goals: u32, away_goals: u32) -> Outcome {
    match home_goals.cmp(&away_goals) {
        Ordering::Greater => Outcome::Home,
        Ordering::Less => Outcome::Away,
        Ordering::Equal => Outcome::Draw,
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum MarketKind {
    MatchOutcome,
    Totals,
    BothTeamsToScore,
    CorrectScore,
}

/// Break-even decimal odds with no margin.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum FairOdds {
    Finite(f64),
    Infinite,
}

impl FairOdds {
    pub fn from_probability(p: f64) -> Self {
        if p > 0.0 {
            FairOdds::Finite(1.0 / p)
        } else {
            FairOdds::Infinite
        }
    }

    pub fn value(self) -> f64 {
        match self {
            FairOdds::Finite(v) => v,
            FairOdds::Infinite => f64::INFINITY,
        }
    }

    pub fn is_infinite(self) -> bool {
        matches!(self, FairOdds::Infinite)
    }
}

impl Serialize for FairOdds {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        match self {
            FairOdds::Finite(v) => serializer.serialize_f64(*v),
            FairOdds::Infinite => serializer.serialize_str("infinite"),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Quote {
    #[serde(skip)]
    pub label: String,
    pub probability: f64,
    pub fair_odds: FairOdds,
}

impl Quote {
    pub fn new(label: impl Into<String>, probability: f64) -> Self {
        let probability = probability.clamp(0.0, 1.0);
        Self {
            label: label.into(),
            probability,
            fair_odds: FairOdds::from_probability(probability),
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct Market {
    pub kind: MarketKind,
    pub name: String,
    pub quotes: Vec<Quote>,
}

impl Market {
    pub fn quote(&self, label: &str) -> Option<&Quote> {
        self.quotes.iter().find(|q| q.label == label)
    }

    pub fn total_probability(&self) -> f64 {
        self.quotes.iter().map(|q| q.probability).sum()
    }
}

impl Serialize for Market {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut map = serializer.serialize_map(Some(self.quotes.len()))?;
        for quote in &self.quotes {
            map.serialize_entry(&quote.label, quote)?;
        }
        map.end()
    }
}

/// Snapshot of one simulation run. Markets are kept in a fixed order:
/// match outcome, totals, both teams to score, correct score.
#[derive(Debug, Clone, PartialEq)]
pub struct MarketReport {
    trials: u64,
    markets: Vec<Market>,
}

impl MarketReport {
    pub fn trials(&self) -> u64 {
        self.trials
    }

    pub fn markets(&self) -> &[Market] {
        &self.markets
    }

    pub fn market(&self, kind: MarketKind) -> Option<&Market> {
        self.markets.iter().find(|m| m.kind == kind)
    }

    pub fn market_by_name(&self, name: &str) -> Option<&Market> {
        self.markets.iter().find(|m| m.name == name)
    }

    pub fn quote(&self, kind: MarketKind, label: &str) -> Option<&Quote> {
        self.market(kind).and_then(|m| m.quote(label))
    }

    pub fn probability(&self, kind: MarketKind, label: &str) -> Option<f64> {
        self.quote(kind, label).map(|q| q.probability)
    }

    pub fn correct_scores(&self) -> &[Quote] {
        self.market(MarketKind::CorrectScore)
            .map(|m| m.quotes.as_slice())
            .unwrap_or(&[])
    }

    pub fn to_json(&self) -> serde_json::Result<String> {
        serde_json::to_string_pretty(self)
    }
}

impl Serialize for MarketReport {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut map = serializer.serialize_map(Some(self.markets.len()))?;
        for market in &self.markets {
            map.serialize_entry(&market.name, market)?;
        }
        map.end()
    }
}

pub fn totals_market_name(line: f64) -> String {
    format!("Total Goals (O/U {line})")
}

pub fn over_label(line: f64) -> String {
    format!("Over {line}")
}

pub fn under_label(line: f64) -> String {
    format!("Under {line}")
}

pub fn correct_score_market_name(top: usize) -> String {
    format!("Correct Score (Top {top})")
}

pub fn score_label(home_goals: u32, away_goals: u32) -> String {
    format!("{home_goals}-{away_goals}")
}

/// Running counts over simulated final scores. Tallies from independent
/// chunks of trials merge into the same totals a single pass would give.
#[derive(Debug, Clone, Default)]
pub struct Tally {
    trials: u64,
    home_wins: u64,
    draws: u64,
    overs: u64,
    both_scored: u64,
    scores: HashMap<(u32, u32), u64>,
}

impl Tally {
    pub fn record(&mut self, home_goals: u32, away_goals: u32, totals_line: f64) {
        self.trials += 1;
        match classify_outcome(home_goals, away_goals) {
            Outcome::Home => self.home_wins += 1,
            Outcome::Draw => self.draws += 1,
            Outcome::Away => {}
        }
        if f64::from(home_goals) + f64::from(away_goals) > totals_line {
            self.overs += 1;
        }
        if home_goals > 0 && away_goals > 0 {
            self.both_scored += 1;
        }
        *self.scores.entry((home_goals, away_goals)).or_insert(0) += 1;
    }

    pub fn merge(mut self, other: Tally) -> Tally {
        self.trials += other.trials;
        self.home_wins += other.home_wins;
        self.draws += other.draws;
        self.overs += other.overs;
        self.both_scored += other.both_scored;
        for (score, count) in other.scores {
            *self.scores.entry(score).or_insert(0) += count;
        }
        self
    }

    pub fn trials(&self) -> u64 {
        self.trials
    }

    pub fn distinct_scores(&self) -> usize {
        self.scores.len()
    }

    /// The `k` most frequent final scores, most frequent first. Equal counts
    /// are ordered by score so output does not depend on map iteration.
    pub fn top_scores(&self, k: usize) -> Vec<((u32, u32), u64)> {
        let mut entries: Vec<((u32, u32), u64)> =
            self.scores.iter().map(|(s, c)| (*s, *c)).collect();
        let by_frequency =
            |a: &((u32, u32), u64), b: &((u32, u32), u64)| b.1.cmp(&a.1).then(a.0.cmp(&b.0));

        if k == 0 {
            return Vec::new();
        }
        if entries.len() > k {
            entries.select_nth_unstable_by(k - 1, by_frequency);
            entries.truncate(k);
        }
        entries.sort_unstable_by(by_frequency);
        entries
    }

    pub fn into_report(self, totals_line: f64, top: usize) -> MarketReport {
        let n = self.trials.max(1) as f64;
        let ratio = |count: u64| count as f64 / n;

        // Complements come from the remaining counts, so each set sums to
        // exactly the number of trials.
        let away_wins = self.trials - self.home_wins - self.draws;
        let unders = self.trials - self.overs;
        let not_both = self.trials - self.both_scored;

        let outcome = Market {
            kind: MarketKind::MatchOutcome,
            name: MATCH_OUTCOME.to_string(),
            quotes: vec![
                Quote::new(HOME_LABEL, ratio(self.home_wins)),
                Quote::new(DRAW_LABEL, ratio(self.draws)),
                Quote::new(AWAY_LABEL, ratio(away_wins)),
            ],
        };
        let totals = Market {
            kind: MarketKind::Totals,
            name: totals_market_name(totals_line),
            quotes: vec![
                Quote::new(over_label(totals_line), ratio(self.overs)),
                Quote::new(under_label(totals_line), ratio(unders)),
            ],
        };
        let btts = Market {
            kind: MarketKind::BothTeamsToScore,
            name: BOTH_TEAMS_TO_SCORE.to_string(),
            quotes: vec![
                Quote::new(YES_LABEL, ratio(self.both_scored)),
                Quote::new(NO_LABEL, ratio(not_both)),
            ],
        };
        let correct = Market {
            kind: MarketKind::CorrectScore,
            name: correct_score_market_name(top),
            quotes: self
                .top_scores(top)
                .into_iter()
                .map(|((h, a), count)| Quote::new(score_label(h, a), ratio(count)))
                .collect(),
        };

        MarketReport {
            trials: self.trials,
            markets: vec![outcome, totals, btts, correct],
        }
    }
}
