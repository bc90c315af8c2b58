use std::fs;
use std::path::PathBuf;

use anyhow::{Context, Result};
use tracing::info;

use inplay_mc::cli::{self, has_flag, parse_arg};
use inplay_mc::engine::{effective_rates, simulate_inputs};
use inplay_mc::exact::{self, DEFAULT_MAX_GOALS};
use inplay_mc::render;
use inplay_mc::settings::Settings;
use inplay_mc::{MatchState, SimInputs, SimulationRequest, TeamRating};

const DEFAULT_MINUTE: u16 = 65;
const DEFAULT_HOME_XG: f64 = 1.8;
const DEFAULT_AWAY_XG: f64 = 1.2;

fn main() -> Result<()> {
    cli::load_dotenv();
    cli::init_tracing();

    let args = std::env::args().skip(1).collect::<Vec<_>>();
    if has_flag(&args, "--help") || has_flag(&args, "-h") {
        print_usage();
        return Ok(());
    }

    let settings = Settings::from_env();
    let inputs = build_inputs(&args, &settings)?;
    let rates = effective_rates(&inputs);
    info!(
        home_rate = rates.home,
        away_rate = rates.away,
        remaining = rates.fraction,
        "effective remaining rates"
    );

    let report = simulate_inputs(&inputs).context("simulation rejected")?;

    if has_flag(&args, "--json") {
        println!("{}", report.to_json().context("serialize report")?);
        return Ok(());
    }

    let home_name = cli::arg_value(&args, "--home-name").unwrap_or_else(|| "Home".to_string());
    let away_name = cli::arg_value(&args, "--away-name").unwrap_or_else(|| "Away".to_string());
    println!(
        "{}",
        render::scenario_line(&inputs.state, &home_name, &away_name)
    );
    print!("{}", render::render_text(&report));

    if has_flag(&args, "--exact") {
        let exact = exact::market_probabilities(
            &inputs.state,
            &inputs.home,
            &inputs.away,
            &inputs.params,
            inputs.config.totals_line,
            DEFAULT_MAX_GOALS,
        )
        .context("analytic check rejected")?;
        println!();
        print!("{}", render::render_exact_comparison(&report, &exact));
    }

    Ok(())
}

fn build_inputs(args: &[String], settings: &Settings) -> Result<SimInputs> {
    let mut inputs = match cli::arg_value(args, "--request") {
        Some(path) => load_request(PathBuf::from(path))?.to_inputs(),
        None => SimInputs {
            state: MatchState::new(DEFAULT_MINUTE, 0, 0),
            home: TeamRating::new(DEFAULT_HOME_XG),
            away: TeamRating::new(DEFAULT_AWAY_XG),
            config: settings.config(),
            params: settings.params,
        },
    };

    // A request file pins its own trials/seed; everything else comes from settings.
    if cli::arg_value(args, "--request").is_some() {
        inputs.config.totals_line = settings.totals_line;
        inputs.config.top_scores = settings.top_scores;
        inputs.params = settings.params;
    }

    let state = &mut inputs.state;
    if let Some(v) = parse_arg(args, "--minute") {
        state.minute = v;
    }
    if let Some(v) = parse_arg(args, "--home-goals") {
        state.home_goals = v;
    }
    if let Some(v) = parse_arg(args, "--away-goals") {
        state.away_goals = v;
    }
    if let Some(v) = parse_arg(args, "--home-reds") {
        state.home_red_cards = v;
    }
    if let Some(v) = parse_arg(args, "--away-reds") {
        state.away_red_cards = v;
    }
    if let Some(v) = parse_arg(args, "--home-xg") {
        inputs.home.xg = v;
    }
    if let Some(v) = parse_arg(args, "--away-xg") {
        inputs.away.xg = v;
    }
    if let Some(v) = parse_arg(args, "--trials") {
        inputs.config.trials = v;
    }
    if let Some(v) = parse_arg(args, "--seed") {
        inputs.config.seed = Some(v);
    }
    if let Some(v) = parse_arg(args, "--line") {
        inputs.config.totals_line = v;
    }
    if let Some(v) = parse_arg(args, "--top") {
        inputs.config.top_scores = v;
    }

    Ok(inputs)
}

fn load_request(path: PathBuf) -> Result<SimulationRequest> {
    let raw = fs::read_to_string(&path)
        .with_context(|| format!("read request {}", path.display()))?;
    serde_json::from_str(&raw).with_context(|| format!("parse request {}", path.display()))
}

fn print_usage() {
    println!("inplay_mc: Monte Carlo in-play market probabilities");
    println!();
    println!("  --minute N --home-goals N --away-goals N");
    println!("  --home-xg X --away-xg X --home-reds N --away-reds N");
    println!("  --trials N --seed N --line X --top N");
    println!("  --home-name S --away-name S");
    println!("  --request FILE.json   load inputs from a request file");
    println!("  --json                print the report as JSON");
    println!("  --exact               compare against the analytic model");
}
