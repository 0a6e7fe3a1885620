//! `me-cli`: run the M&E engine over a JSON export of daily observations
//!
//! ```bash
//! me-cli rollup   --input logs.json --period monthly
//! me-cli filter   --input logs.json --period weekly --from 2024-01-01 --to 2024-01-31
//! me-cli variance --input logs.json --config engine.toml
//! me-cli metrics  --input logs.json
//! ```
//!
//! Results go to stdout as JSON; logs go to stderr (`RUST_LOG`, default `info`).

use anyhow::{bail, Context, Result};
use clap::{value_parser, Arg, ArgAction, ArgMatches, Command};
use me_engine::{EngineConfig, MeEngine};
use me_model::{DailyObservation, FilterPeriod, MeFilter, ProjectId, RollupPeriod};
use std::path::{Path, PathBuf};
use tracing_subscriber::EnvFilter;

const ROLLUP_PERIODS: [&str; 3] = ["weekly", "monthly", "quarterly"];
const FILTER_PERIODS: [&str; 4] = ["daily", "weekly", "monthly", "quarterly"];

fn source_args(cmd: Command) -> Command {
    cmd.arg(
        Arg::new("input")
            .long("input")
            .short('i')
            .required(true)
            .value_parser(value_parser!(PathBuf))
            .help("JSON array of daily observations"),
    )
    .arg(
        Arg::new("config")
            .long("config")
            .short('c')
            .value_parser(value_parser!(PathBuf))
            .help("Engine config (.toml, .yaml or .json)"),
    )
    .arg(
        Arg::new("project")
            .long("project")
            .help("Project id; defaults to the config or the first record"),
    )
}

fn build_cli() -> Command {
    Command::new("me-cli")
        .version(env!("CARGO_PKG_VERSION"))
        .about("M&E rollup and variance engine for construction daily logs")
        .subcommand_required(true)
        .arg_required_else_help(true)
        .arg(
            Arg::new("log-json")
                .long("log-json")
                .global(true)
                .action(ArgAction::SetTrue)
                .help("Emit logs as JSON"),
        )
        .arg(
            Arg::new("compact")
                .long("compact")
                .global(true)
                .action(ArgAction::SetTrue)
                .help("Print single-line JSON"),
        )
        .subcommand(source_args(
            Command::new("rollup")
                .about("Print rollups; the whole snapshot when no period is given")
                .arg(
                    Arg::new("period")
                        .long("period")
                        .short('p')
                        .value_parser(ROLLUP_PERIODS),
                ),
        ))
        .subcommand(source_args(
            Command::new("filter")
                .about("Select records by period and date range")
                .arg(
                    Arg::new("period")
                        .long("period")
                        .short('p')
                        .required(true)
                        .value_parser(FILTER_PERIODS),
                )
                .arg(Arg::new("from").long("from").required(true).help("YYYY-MM-DD"))
                .arg(Arg::new("to").long("to").required(true).help("YYYY-MM-DD")),
        ))
        .subcommand(source_args(
            Command::new("variance")
                .about("Planned-vs-actual variance per rollup")
                .arg(
                    Arg::new("period")
                        .long("period")
                        .short('p')
                        .default_value("weekly")
                        .value_parser(ROLLUP_PERIODS),
                ),
        ))
        .subcommand(source_args(
            Command::new("metrics").about("Top-level metrics over the observations"),
        ))
}

fn init_tracing(json: bool) {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    let builder = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr);
    if json {
        builder.json().init();
    } else {
        builder.init();
    }
}

fn read_observations(path: &Path) -> Result<Vec<DailyObservation>> {
    let text = std::fs::read_to_string(path)
        .with_context(|| format!("failed to read {}", path.display()))?;
    serde_json::from_str(&text)
        .with_context(|| format!("{} is not a JSON array of observations", path.display()))
}

fn load_engine(args: &ArgMatches) -> Result<MeEngine> {
    let input = args
        .get_one::<PathBuf>("input")
        .context("--input is required")?;
    let records = read_observations(input)?;

    let mut config = match args.get_one::<PathBuf>("config") {
        Some(path) => EngineConfig::from_path(path)
            .with_context(|| format!("invalid config {}", path.display()))?,
        None => EngineConfig::default(),
    };
    if let Some(project) = args.get_one::<String>("project") {
        config.project_id = ProjectId::new(project.as_str());
    } else if config.project_id.is_blank() {
        match records.first() {
            Some(first) => config.project_id = first.project_id.clone(),
            None => bail!("no project id: pass --project or a config file"),
        }
    }
    let total = records.len();
    let mut engine = MeEngine::new(config)?;
    let kept = engine.load_observations(records);
    if kept < total {
        tracing::warn!(
            project = %engine.project_id(),
            dropped = total - kept,
            "Ignored records for other projects"
        );
    }
    Ok(engine)
}

fn rollup_period(args: &ArgMatches) -> Result<Option<RollupPeriod>> {
    args.get_one::<String>("period")
        .map(|p| p.parse::<RollupPeriod>())
        .transpose()
        .map_err(Into::into)
}

fn execute(matches: &ArgMatches) -> Result<serde_json::Value> {
    let value = match matches.subcommand() {
        Some(("rollup", args)) => {
            let engine = load_engine(args)?;
            match rollup_period(args)? {
                Some(period) => serde_json::to_value(engine.list_rollups(period))?,
                None => serde_json::to_value(engine.snapshot().as_ref())?,
            }
        }
        Some(("filter", args)) => {
            let engine = load_engine(args)?;
            let period: FilterPeriod = args
                .get_one::<String>("period")
                .context("--period is required")?
                .parse()?;
            let from = args.get_one::<String>("from").context("--from is required")?;
            let to = args.get_one::<String>("to").context("--to is required")?;
            let filter = MeFilter::parse(period, from, to)
                .with_context(|| format!("invalid range {from} to {to}"))?;
            serde_json::to_value(engine.apply_filter(Some(&filter)))?
        }
        Some(("variance", args)) => {
            let engine = load_engine(args)?;
            let period = rollup_period(args)?.unwrap_or(RollupPeriod::Weekly);
            serde_json::to_value(engine.variance_for(period))?
        }
        Some(("metrics", args)) => serde_json::to_value(load_engine(args)?.metrics())?,
        Some((other, _)) => bail!("unknown command {other}"),
        None => bail!("no command given"),
    };
    Ok(value)
}

fn main() -> Result<()> {
    let matches = build_cli().get_matches();
    init_tracing(matches.get_flag("log-json"));

    let value = execute(&matches)?;
    let out = if matches.get_flag("compact") {
        serde_json::to_string(&value)?
    } else {
        serde_json::to_string_pretty(&value)?
    };
    println!("{out}");
    Ok(())
}
