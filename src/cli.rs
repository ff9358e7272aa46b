use std::fs::File;
use std::io::{BufReader, BufWriter, Write};
use std::path::PathBuf;
use std::sync::Arc;

use clap::{Args, Parser, Subcommand};
use impact_badges::badges::{
    AssignmentEngine, BadgeService, BadgeView, InMemoryBadgeStore, Person, PersonId,
    ReferenceData, RuleCatalog, RuleFailure,
};
use impact_badges::config::AppConfig;
use impact_badges::error::AppError;
use impact_badges::telemetry;
use serde::Serialize;

#[derive(Parser, Debug)]
#[command(
    name = "impact-badges",
    about = "Assign research impact badges from aggregated attention metrics",
    version
)]
struct Cli {
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Print the static metadata of every badge rule as JSON
    Catalog,
    /// Assign badges to every person in a JSON file and print their profiles
    Assign(AssignArgs),
}

#[derive(Args, Debug)]
struct AssignArgs {
    /// JSON array of people with their products and metrics
    #[arg(long)]
    people: PathBuf,
    /// Write the profiles here instead of stdout
    #[arg(long)]
    output: Option<PathBuf>,
    /// Override the configured reference data directory
    #[arg(long)]
    reference_dir: Option<PathBuf>,
}

#[derive(Debug, Serialize)]
struct PersonProfile {
    person_id: PersonId,
    badges: Vec<BadgeView>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    failures: Vec<RuleFailure>,
}

pub(crate) fn run() -> Result<(), AppError> {
    let cli = Cli::parse();
    let mut config = AppConfig::load()?;
    telemetry::init(&config.telemetry)?;

    match cli.command {
        Command::Catalog => {
            let snapshot = RuleCatalog::standard().config_snapshot();
            let stdout = std::io::stdout();
            serde_json::to_writer_pretty(stdout.lock(), &snapshot)?;
            println!();
            Ok(())
        }
        Command::Assign(args) => {
            if let Some(dir) = args.reference_dir.clone() {
                config.reference.reference_dir = dir;
            }
            run_assign(&config, args)
        }
    }
}

fn run_assign(config: &AppConfig, args: AssignArgs) -> Result<(), AppError> {
    let reference = Arc::new(ReferenceData::load(&config.reference)?);
    let people: Vec<Person> = serde_json::from_reader(BufReader::new(File::open(&args.people)?))?;
    tracing::info!(
        people = people.len(),
        source = %args.people.display(),
        "loaded people"
    );

    let engine = AssignmentEngine::new(RuleCatalog::standard(), reference)
        .with_worker_threads(config.assignment.worker_threads)?;
    let service = BadgeService::new(Arc::new(engine), Arc::new(InMemoryBadgeStore::new()));
    let summary = service.refresh_population(&people)?;

    let mut profiles = Vec::with_capacity(people.len());
    for person in &people {
        let failures = summary
            .failures
            .iter()
            .find(|entry| entry.person_id == person.id)
            .map(|entry| entry.failures.clone())
            .unwrap_or_default();
        profiles.push(PersonProfile {
            person_id: person.id.clone(),
            badges: service.profile(&person.id)?,
            failures,
        });
    }

    match args.output {
        Some(path) => {
            let mut writer = BufWriter::new(File::create(&path)?);
            serde_json::to_writer_pretty(&mut writer, &profiles)?;
            writer.flush()?;
            tracing::info!(output = %path.display(), "wrote badge profiles");
        }
        None => {
            let stdout = std::io::stdout();
            serde_json::to_writer_pretty(stdout.lock(), &profiles)?;
            println!();
        }
    }
    Ok(())
}
