use anyhow::{Context, Result};

use inplay_mc::cli::{self, parse_arg};
use inplay_mc::markets::{AWAY_LABEL, DRAW_LABEL, HOME_LABEL, MarketKind};
use inplay_mc::rates::sweep_minutes;
use inplay_mc::render::format_pct;
use inplay_mc::settings::Settings;
use inplay_mc::{MatchState, SimInputs, SimulationCache, TeamRating};

const DEFAULT_STEP: u16 = 5;
const DEFAULT_SWEEP_SEED: u64 = 2024;

fn main() -> Result<()> {
    cli::load_dotenv();
    cli::init_tracing();

    let args = std::env::args().skip(1).collect::<Vec<_>>();
    let settings = Settings::from_env();

    let from: u16 = parse_arg(&args, "--minute").unwrap_or(0);
    let step: u16 = parse_arg(&args, "--step").unwrap_or(DEFAULT_STEP);

    let mut config = settings.config();
    // Every row shares a seed so differences come from the state, not the draw.
    config.seed = Some(config.seed.unwrap_or(DEFAULT_SWEEP_SEED));
    if let Some(trials) = parse_arg(&args, "--trials") {
        config.trials = trials;
    }

    let base = SimInputs {
        state: MatchState::new(
            from,
            parse_arg(&args, "--home-goals").unwrap_or(0),
            parse_arg(&args, "--away-goals").unwrap_or(0),
        )
        .with_red_cards(
            parse_arg(&args, "--home-reds").unwrap_or(0),
            parse_arg(&args, "--away-reds").unwrap_or(0),
        ),
        home: TeamRating::new(parse_arg(&args, "--home-xg").unwrap_or(1.5)),
        away: TeamRating::new(parse_arg(&args, "--away-xg").unwrap_or(1.2)),
        config,
        params: settings.params,
    };

    let mut cache = SimulationCache::default();
    let minutes = sweep_minutes(from, step);

    println!("{:>6} {:>8} {:>8} {:>8}", "Minute", "1", "X", "2");
    for minute in minutes {
        let mut inputs = base;
        inputs.state.minute = minute;
        let report = cache
            .get_or_simulate(&inputs)
            .with_context(|| format!("simulate minute {minute}"))?;
        let p = |label: &str| {
            report
                .probability(MarketKind::MatchOutcome, label)
                .unwrap_or(0.0)
        };
        println!(
            "{:>6} {:>8} {:>8} {:>8}",
            minute,
            format_pct(p(HOME_LABEL)),
            format_pct(p(DRAW_LABEL)),
            format_pct(p(AWAY_LABEL))
        );
    }

    let stats = cache.stats();
    eprintln!("[INFO] cache: {} runs, {} hits", stats.misses, stats.hits);
    Ok(())
}
