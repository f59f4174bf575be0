// Startcast entry point.
//
// Startup sequence:
// 1. Parse arguments
// 2. Copy missing defaults and load config
// 3. Initialize tracing (stderr, so stdout carries only command output)
// 4. Run the subcommand

use std::io::{self, Write};
use std::path::{Path, PathBuf};

use anyhow::{bail, Context};
use clap::{Parser, Subcommand, ValueEnum};
use tracing::info;

use startcast::api::{self, ProjectionRequestBody};
use startcast::config::{self, Config};
use startcast::export;
use startcast::leagues::LeagueStore;
use startcast::teams;
use startcast_engine::{Handedness, PresetCatalog, ProjectionEngine, ScoringWeights, SortOrder};

#[derive(Parser)]
#[command(name = "startcast")]
#[command(about = "Project fantasy points for a starting pitcher's outing against every team")]
#[command(version)]
struct Cli {
    /// Directory containing defaults/ and config/ (defaults to the current directory)
    #[arg(long, global = true)]
    base_dir: Option<PathBuf>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Project, score, and classify every team for one outing
    Project {
        /// Handedness of the opposing batters (lefty or righty)
        #[arg(long, required_unless_present = "request")]
        handedness: Option<Handedness>,

        /// Innings in the projected outing (1-9)
        #[arg(long, required_unless_present = "request")]
        inning: Option<u8>,

        /// League preset or saved custom league name
        #[arg(long, default_value = "Custom")]
        league: String,

        /// JSON request body; overrides --handedness, --inning and --league
        #[arg(long)]
        request: Option<PathBuf>,

        /// Override the configured sort order
        #[arg(long, value_enum)]
        sort: Option<SortArg>,

        #[arg(long, value_enum, default_value = "table")]
        format: OutputFormat,
    },

    /// List league presets and their pitching weights
    Presets,

    /// Manage saved custom leagues
    Leagues {
        #[command(subcommand)]
        action: LeagueAction,
    },
}

#[derive(Subcommand)]
enum LeagueAction {
    /// List saved leagues, most recent first
    List,

    /// Print one saved league as JSON
    Show { name: String },

    /// Save (or replace) a league from a preset or a JSON weights file
    Save {
        name: String,

        /// Preset name, or path to a JSON scoring table
        #[arg(long)]
        from: String,
    },

    /// Delete a saved league
    Delete { name: String },
}

#[derive(Clone, Copy, ValueEnum)]
enum SortArg {
    Points,
    Team,
}

impl From<SortArg> for SortOrder {
    fn from(arg: SortArg) -> Self {
        match arg {
            SortArg::Points => SortOrder::PointsDescending,
            SortArg::Team => SortOrder::TeamAscending,
        }
    }
}

#[derive(Clone, Copy, ValueEnum)]
enum OutputFormat {
    Json,
    Csv,
    Table,
}

fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    let base_dir = match cli.base_dir {
        Some(dir) => dir,
        None => std::env::current_dir().context("failed to read current directory")?,
    };
    let (config, copied) =
        config::load_config_in(&base_dir).context("failed to load configuration")?;

    init_tracing(&config.logging.level)?;
    for path in &copied {
        info!("Copied default config to {}", path.display());
    }
    info!(
        "Config loaded: {} presets, teams from {}",
        config.presets.len(),
        config.teams_path().display()
    );

    match cli.command {
        Commands::Project {
            handedness,
            inning,
            league,
            request,
            sort,
            format,
        } => {
            let body = match request {
                Some(path) => read_request(&path)?,
                None => ProjectionRequestBody {
                    handedness: handedness.context("--handedness is required")?,
                    inning: inning.context("--inning is required")?,
                    league_type: league,
                    custom_scoring: None,
                },
            };
            run_projection(&config, &body, sort.map(SortOrder::from), format)
        }
        Commands::Presets => {
            print_presets(&config.presets);
            Ok(())
        }
        Commands::Leagues { action } => run_leagues(&config, action),
    }
}

fn run_projection(
    config: &Config,
    body: &ProjectionRequestBody,
    sort: Option<SortOrder>,
    format: OutputFormat,
) -> anyhow::Result<()> {
    let mut model = config.model.to_model();
    if let Some(sort) = sort {
        model.sort = sort;
    }
    let engine = ProjectionEngine::new(model);

    let teams_path = config.teams_path();
    let teams = teams::load_teams(&teams_path).context("failed to load team split data")?;
    info!("Loaded {} teams from {}", teams.len(), teams_path.display());

    let store = LeagueStore::open(config.custom_leagues_path());
    let response = api::handle_projection(body, &engine, &config.presets, Some(&store), &teams)
        .context("projection failed")?;

    let stdout = io::stdout();
    let mut out = stdout.lock();
    match format {
        OutputFormat::Json => {
            serde_json::to_writer_pretty(&mut out, &response)
                .context("failed to write JSON output")?;
            writeln!(out)?;
        }
        OutputFormat::Csv => {
            export::write_csv(&response.results, &mut out).context("failed to write CSV output")?;
        }
        OutputFormat::Table => {
            let p = &response.parameters;
            let a = &response.analysis;
            writeln!(
                out,
                "{} innings vs {} batters, {} scoring",
                p.inning, p.handedness, p.league_type
            )?;
            writeln!(
                out,
                "{} teams, min {:.2}, max {:.2}, avg {:.2}\n",
                a.total_teams, a.min_points, a.max_points, a.avg_points
            )?;
            write!(out, "{}", export::render_table(&response.results))?;
        }
    }
    Ok(())
}

fn read_request(path: &Path) -> anyhow::Result<ProjectionRequestBody> {
    let text = std::fs::read_to_string(path)
        .with_context(|| format!("failed to read request file {}", path.display()))?;
    serde_json::from_str(&text)
        .with_context(|| format!("invalid request body in {}", path.display()))
}

fn print_presets(presets: &PresetCatalog) {
    for (name, weights) in presets.iter() {
        let pitching: Vec<String> = weights
            .pitching_weights()
            .iter()
            .map(|(event, value)| format!("{event}={value}"))
            .collect();
        println!("{name}: {}", pitching.join(" "));
    }
}

fn run_leagues(config: &Config, action: LeagueAction) -> anyhow::Result<()> {
    let store = LeagueStore::open(config.custom_leagues_path());

    match action {
        LeagueAction::List => {
            let leagues = store.list().context("failed to read custom leagues")?;
            if leagues.is_empty() {
                println!("No saved leagues in {}", store.path().display());
            }
            for league in leagues {
                println!(
                    "{:<24} {:<8} {}",
                    league.name,
                    league.league_type,
                    league.saved_at.format("%Y-%m-%d %H:%M UTC")
                );
            }
        }
        LeagueAction::Show { name } => {
            let Some(league) = store.get(&name).context("failed to read custom leagues")? else {
                bail!("no saved league named '{name}'");
            };
            println!("{}", serde_json::to_string_pretty(&league)?);
        }
        LeagueAction::Save { name, from } => {
            let (league_type, scoring) = scoring_source(&config.presets, &from)?;
            let saved = store
                .save(&name, &league_type, scoring)
                .context("failed to save custom league")?;
            println!("Saved '{}' ({})", saved.name, saved.league_type);
        }
        LeagueAction::Delete { name } => {
            if store.delete(&name).context("failed to delete custom league")? {
                println!("Deleted '{name}'");
            } else {
                bail!("no saved league named '{name}'");
            }
        }
    }
    Ok(())
}

/// A preset name, or a path to a JSON scoring table.
fn scoring_source(presets: &PresetCatalog, from: &str) -> anyhow::Result<(String, ScoringWeights)> {
    let path = Path::new(from);
    if path.is_file() {
        let text = std::fs::read_to_string(path)
            .with_context(|| format!("failed to read scoring file {}", path.display()))?;
        let scoring: ScoringWeights = serde_json::from_str(&text)
            .with_context(|| format!("invalid scoring table in {}", path.display()))?;
        return Ok((PresetCatalog::CUSTOM.to_string(), scoring));
    }
    let scoring = presets.get(from)?.clone();
    let name = presets.canonical_name(from).unwrap_or(from).to_string();
    Ok((name, scoring))
}

/// Initialize tracing to stderr. `RUST_LOG` wins over the configured level.
fn init_tracing(level: &str) -> anyhow::Result<()> {
    use tracing_subscriber::fmt;
    use tracing_subscriber::EnvFilter;

    let subscriber = fmt::Subscriber::builder()
        .with_env_filter(
            EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| EnvFilter::new(format!("startcast={level},warn"))),
        )
        .with_writer(io::stderr)
        .with_target(true)
        .finish();

    tracing::subscriber::set_global_default(subscriber)
        .context("failed to set tracing subscriber")?;

    Ok(())
}
