use std::fs::{self, OpenOptions};
use std::io::{self, BufRead, Write};
use std::path::PathBuf;
use std::str::FromStr;

use anyhow::{anyhow, bail, Context, Result};
use clap::{Parser, Subcommand};
use uuid::Uuid;

use gauntlet::data::{ACTIVE_CATALOG_PATH, LAST_RUN_ID};
use gauntlet::{
    transfer, util, Challenge, ChallengeOrigin, ChallengeStatus, Config, Database, Difficulty,
    Filter, GauntletCore, HackKind, JsonCatalog, PlanEntry, Run, Visibility,
};

#[derive(Parser)]
#[command(name = "gauntlet", about = "Seeded challenge runs over a ROM hack catalog")]
struct Cli {
    /// Override the data directory (default: ~/.gauntlet)
    #[arg(long, global = true)]
    data_dir: Option<PathBuf>,

    /// Catalog file to use (remembered for later invocations)
    #[arg(long, global = true)]
    catalog: Option<PathBuf>,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Seed operations
    #[command(subcommand)]
    Seed(SeedCommand),
    /// Seed mapping operations
    #[command(subcommand)]
    Mapping(MappingCommand),
    /// Run operations
    #[command(subcommand)]
    Run(RunCommand),
}

#[derive(Subcommand)]
enum SeedCommand {
    /// Generate a seed for a filter, freezing its universe on first use
    Generate {
        #[arg(long)]
        kind: HackKind,
        #[arg(long)]
        difficulty: Difficulty,
    },
}

#[derive(Subcommand)]
enum MappingCommand {
    /// List frozen seed mappings
    List,
    /// Delete a mapping; seeds over it stop resolving
    Delete { code: String },
}

#[derive(Subcommand)]
enum RunCommand {
    /// Create a run from plan entries
    Create {
        name: String,
        /// Plan entry: `fixed:<item-id>` or
        /// `random:<kind>:<difficulty>:<count>:<seed>`, in order
        #[arg(long = "entry", required = true)]
        entries: Vec<String>,
    },
    /// List persisted runs
    List,
    /// Show a run's challenges
    Show { id: Uuid },
    /// Play a run interactively (reveal/complete/skip/undo)
    Play { id: Uuid },
    /// Export a run with its referenced seed mappings
    Export {
        id: Uuid,
        /// Output file (stdout if omitted)
        #[arg(long, short)]
        output: Option<PathBuf>,
    },
    /// Validate and import an exported run
    Import { file: PathBuf },
}

fn main() -> Result<()> {
    let cli = Cli::parse();
    util::init_data_dir(cli.data_dir.clone());

    // Log to file so interactive output stays clean
    fs::create_dir_all(util::logs_dir())?;
    let log_file = OpenOptions::new()
        .create(true)
        .append(true)
        .open(util::log_file_path())?;
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::from_default_env()
                .add_directive(tracing::Level::WARN.into()),
        )
        .with_writer(log_file)
        .with_ansi(false)
        .init();

    let database = Database::open(util::database_path())?;
    let catalog = load_catalog(&cli, &database)?;
    let mut core = GauntletCore::new(database, Box::new(catalog));

    match cli.command {
        Command::Seed(SeedCommand::Generate { kind, difficulty }) => {
            let token = core.generate_seed(&Filter::new(kind, difficulty))?;
            println!("{token}");
        }
        Command::Mapping(MappingCommand::List) => {
            for mapping in core.list_mappings()? {
                println!(
                    "{}  {}  {} items  frozen {}",
                    mapping.code,
                    mapping.filter_signature.as_deref().unwrap_or("(imported)"),
                    mapping.universe.len(),
                    mapping.created_at.format("%Y-%m-%d"),
                );
            }
        }
        Command::Mapping(MappingCommand::Delete { code }) => {
            core.delete_mapping(&code)?;
            println!("Deleted mapping {code}");
        }
        Command::Run(RunCommand::Create { name, entries }) => {
            let entries = entries
                .iter()
                .map(|spec| parse_entry(spec))
                .collect::<Result<Vec<_>>>()?;
            let run = core.create_plan(name, entries)?;
            println!("Created run {} with {} challenges", run.id, run.challenges.len());
        }
        Command::Run(RunCommand::List) => {
            for run in core.list_runs()? {
                let settled = run
                    .challenges
                    .iter()
                    .filter(|c| c.status.is_settled())
                    .count();
                println!(
                    "{}  {}  {}/{}",
                    run.id,
                    run.name,
                    settled,
                    run.challenges.len()
                );
            }
        }
        Command::Run(RunCommand::Show { id }) => {
            print_run(core.load_run(id)?.challenges.as_slice());
        }
        Command::Run(RunCommand::Play { id }) => {
            play(&mut core, id)?;
        }
        Command::Run(RunCommand::Export { id, output }) => {
            let export = core.export_run(id)?;
            let json = transfer::to_json(&export)?;
            match output {
                Some(path) => {
                    fs::write(&path, json)
                        .with_context(|| format!("writing {}", path.display()))?;
                    println!("Exported to {}", path.display());
                }
                None => println!("{json}"),
            }
        }
        Command::Run(RunCommand::Import { file }) => {
            let raw = fs::read_to_string(&file)
                .with_context(|| format!("reading {}", file.display()))?;
            let export = transfer::from_json(&raw)?;
            let report = core.validate_export(&export);
            if !report.compatible() {
                bail!(
                    "incompatible catalog; missing items: {}",
                    report.missing_items.join(", ")
                );
            }
            let run = core.import_run(&export)?;
            println!("Imported run {} ({})", run.id, run.name);
        }
    }

    Ok(())
}

/// Resolve the catalog: an explicit --catalog wins and is remembered,
/// then the stored setting, then config.toml
fn load_catalog(cli: &Cli, database: &Database) -> Result<JsonCatalog> {
    let settings = gauntlet::SettingsStore::new(database.connection());

    let path = if let Some(path) = &cli.catalog {
        settings.set(ACTIVE_CATALOG_PATH, &path.display().to_string())?;
        path.clone()
    } else if let Some(stored) = settings.get(ACTIVE_CATALOG_PATH)? {
        PathBuf::from(stored)
    } else if let Some(configured) = Config::load().catalog_path {
        configured
    } else {
        bail!("no catalog configured; pass --catalog <file> once");
    };

    Ok(JsonCatalog::load(&path)?)
}

/// Parse a CLI plan entry spec
fn parse_entry(spec: &str) -> Result<PlanEntry> {
    let parts: Vec<&str> = spec.split(':').collect();
    match parts.as_slice() {
        ["fixed", item_id] => Ok(PlanEntry::Fixed {
            item_id: item_id.to_string(),
        }),
        ["random", kind, difficulty, count, seed] => {
            let kind = HackKind::from_str(kind).map_err(|e| anyhow!(e))?;
            let difficulty = Difficulty::from_str(difficulty).map_err(|e| anyhow!(e))?;
            let count: usize = count.parse().context("entry count")?;
            if count == 0 {
                bail!("entry count must be at least 1");
            }
            Ok(PlanEntry::Random {
                filter: Filter::new(kind, difficulty),
                count,
                seed: seed.to_string(),
            })
        }
        _ => bail!(
            "bad entry {spec:?}; expected fixed:<item-id> or random:<kind>:<difficulty>:<count>:<seed>"
        ),
    }
}

fn print_run(challenges: &[Challenge]) {
    for c in challenges {
        let item = match (&c.visibility, &c.item_id) {
            (Visibility::Revealed, Some(id)) => id.clone(),
            _ => "???".to_string(),
        };
        let marker = match c.status {
            ChallengeStatus::InProgress => ">",
            _ => " ",
        };
        println!(
            "{marker} {:>3}  {:<20} {}",
            c.ordinal + 1,
            c.status.as_str(),
            item
        );
    }
}

fn describe_current(run: &Run) {
    match run.current() {
        Some(c) => {
            let shown = if c.revealed_explicitly
                || matches!(c.origin, ChallengeOrigin::Fixed { .. })
            {
                c.item_id.clone().unwrap_or_default()
            } else {
                "??? (type 'reveal' to see it)".to_string()
            };
            println!(
                "Challenge {}/{}: {shown}",
                c.ordinal + 1,
                run.challenges.len()
            );
        }
        None if run.is_finished() => println!("Run finished."),
        None => println!("Run not started."),
    }
}

/// Interactive session over one run; the undo history lives for its
/// duration
fn play(core: &mut GauntletCore, id: Uuid) -> Result<()> {
    let state = core.start_run(id)?.clone();
    core.settings().set(LAST_RUN_ID, &id.to_string())?;
    describe_current(&state);

    let stdin = io::stdin();
    loop {
        print!("> ");
        io::stdout().flush()?;
        let mut line = String::new();
        if stdin.lock().read_line(&mut line)? == 0 {
            break;
        }

        let result = match line.trim() {
            "reveal" | "r" => core.reveal(id).map(|r| r.clone()),
            "complete" | "c" | "done" => core.complete_challenge(id).map(|r| r.clone()),
            "skip" | "s" => core.skip_challenge(id).map(|r| r.clone()),
            "undo" | "u" => core.undo(id).map(|r| r.clone()),
            "show" => {
                print_run(&core.load_run(id)?.challenges);
                continue;
            }
            "quit" | "q" | "exit" => break,
            "" => continue,
            other => {
                println!("unknown command {other:?}; try reveal/complete/skip/undo/show/quit");
                continue;
            }
        };

        match result {
            Ok(run) => {
                describe_current(&run);
                if run.is_finished() {
                    break;
                }
            }
            Err(e) if e.is_recoverable() => println!("{e}"),
            Err(e) => return Err(e.into()),
        }
    }
    Ok(())
}
