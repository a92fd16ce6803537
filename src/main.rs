mod cli;
mod config;
mod datasources;
mod db;
mod error;
mod logic;
mod models;

use clap::Parser;
use cli::{Cli, Commands};
use config::Config;
use datasources::OpenWeatherMapClient;
use db::{Database, PitchStore};
use error::{PitchWatchError, Result};
use logic::{maintenance, PitchMonitorService, TurfRules};
use models::{Location, Pitch, TurfType, MAX_CONDITION, MIN_CONDITION};
use std::sync::Arc;
use tokio_util::sync::CancellationToken;
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() {
    // Load .env file if present
    let _ = dotenvy::dotenv();

    let cli = Cli::parse();

    // Initialize logging
    let default_level = match cli.verbose {
        0 => "info",
        1 => "debug",
        _ => "trace",
    };
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level)),
        )
        .init();

    if let Err(e) = dispatch(cli).await {
        eprintln!("Error: {}", e);
        std::process::exit(1);
    }
}

async fn dispatch(cli: Cli) -> Result<()> {
    let command = cli.command.unwrap_or(Commands::Run { once: false });

    if let Commands::Init = command {
        Config::setup_interactive()?;
        return Ok(());
    }

    // First run: fall through to interactive setup instead of erroring out.
    let config = if Config::exists(cli.config.as_ref()) {
        Config::load(cli.config.clone())?
    } else {
        let (config, _) = Config::setup_interactive()?;
        config
    };

    let db = Database::open(&Config::db_path(cli.data_dir.as_ref())?)?;
    tracing::debug!(path = %db.path().display(), "Database opened");

    match command {
        Commands::Init => Ok(()),
        Commands::Check => check(&config).await,
        Commands::Run { once } => run_monitor(&config, db, once).await,
        Commands::Add {
            name,
            city,
            country,
            latitude,
            longitude,
            turf_type,
            condition,
        } => add_pitch(&db, name, city, country, latitude, longitude, turf_type, condition),
        Commands::List {
            maintenance,
            replacement,
        } => list_pitches(&db, maintenance, replacement),
        Commands::Show { id } => show_pitch(&db, id),
        Commands::Remove { id } => remove_pitch(&db, id),
        Commands::ScheduleReplacement { id, date } => {
            let date = chrono::DateTime::parse_from_rfc3339(&date)
                .map(|d| d.with_timezone(&chrono::Utc))
                .map_err(|e| {
                    PitchWatchError::InvalidData(format!("invalid RFC 3339 date: {}", e))
                })?;
            let pitch = maintenance::schedule_replacement(&db, id, date, chrono::Utc::now())?;
            println!(
                "Replacement of '{}' scheduled for {}",
                pitch.name,
                date.to_rfc3339()
            );
            Ok(())
        }
        Commands::ExecuteMaintenance { id } => {
            let pitch = maintenance::execute_due_maintenance(&db, id, chrono::Utc::now())?;
            println!(
                "Maintenance of '{}' executed, condition restored to {}",
                pitch.name, pitch.current_condition
            );
            Ok(())
        }
    }
}

async fn check(config: &Config) -> Result<()> {
    println!("Config: OK");
    println!(
        "Monitor: every {}s, up to {} concurrent checks",
        config.monitor.interval_secs, config.monitor.max_concurrent_checks
    );

    if config.openweathermap.enabled && !config.openweathermap.api_key.is_empty() {
        let client = OpenWeatherMapClient::new(config.openweathermap.clone());
        match client.test_connection().await {
            Ok(true) => println!("OpenWeatherMap: OK"),
            Ok(false) => println!("OpenWeatherMap: FAILED (unexpected status)"),
            Err(e) => println!("OpenWeatherMap: FAILED ({})", e),
        }
    } else {
        println!("OpenWeatherMap: not configured");
    }

    Ok(())
}

async fn run_monitor(config: &Config, db: Database, once: bool) -> Result<()> {
    if !config.openweathermap.enabled || config.openweathermap.api_key.is_empty() {
        return Err(PitchWatchError::Config(
            "No weather source configured; set the OpenWeatherMap API key".into(),
        ));
    }

    let weather = OpenWeatherMapClient::new(config.openweathermap.clone());
    let rules = TurfRules::from_config(config.rules.as_ref());
    let monitor = PitchMonitorService::new(
        Arc::new(db),
        Arc::new(weather),
        rules,
        &config.monitor,
    );

    if once {
        let outcome = monitor.run_cycle().await?;
        println!(
            "Evaluated {} pitches, {} failed",
            outcome.evaluated, outcome.failed
        );
        return Ok(());
    }

    let cancel = CancellationToken::new();
    let signal_cancel = cancel.clone();
    tokio::spawn(async move {
        if tokio::signal::ctrl_c().await.is_ok() {
            tracing::info!("Shutdown signal received");
            signal_cancel.cancel();
        }
    });

    monitor.run(cancel).await;
    Ok(())
}

#[allow(clippy::too_many_arguments)]
fn add_pitch(
    db: &Database,
    name: String,
    city: String,
    country: String,
    latitude: f64,
    longitude: f64,
    turf_type: String,
    condition: u8,
) -> Result<()> {
    let turf_type = TurfType::from_str(&turf_type).ok_or_else(|| {
        PitchWatchError::InvalidData(format!(
            "unknown turf type '{}' (expected natural, artificial or hybrid)",
            turf_type
        ))
    })?;

    if !(MIN_CONDITION..=MAX_CONDITION).contains(&condition) {
        return Err(PitchWatchError::InvalidData(format!(
            "condition {} out of range {}-{}",
            condition, MIN_CONDITION, MAX_CONDITION
        )));
    }

    let mut pitch = Pitch::new(
        name,
        Location {
            city,
            country,
            latitude,
            longitude,
        },
        turf_type,
    );
    pitch.current_condition = condition;

    db.create_pitch(&pitch)?;
    println!("Created pitch {}", pitch.uuid);
    Ok(())
}

fn list_pitches(db: &Database, maintenance_only: bool, replacement_only: bool) -> Result<()> {
    let pitches = if maintenance_only {
        db.pitches_needing_maintenance()?
    } else if replacement_only {
        db.pitches_needing_replacement()?
    } else {
        db.list_pitches()?
    };

    if pitches.is_empty() {
        println!("No pitches");
        return Ok(());
    }

    println!(
        "{:<36}  {:<24}  {:<10}  {:>4}  {:>9}  {}",
        "ID", "NAME", "TURF", "COND", "RAIN HRS", "NEXT MAINTENANCE"
    );
    for pitch in pitches {
        println!(
            "{:<36}  {:<24}  {:<10}  {:>4}  {:>9}  {}",
            pitch.uuid,
            pitch.name,
            pitch.turf_type,
            pitch.current_condition,
            pitch.current_consecutive_rain_hours,
            pitch
                .next_scheduled_maintenance
                .map(|d| d.to_rfc3339())
                .unwrap_or_else(|| "-".to_string()),
        );
    }
    Ok(())
}

fn show_pitch(db: &Database, id: uuid::Uuid) -> Result<()> {
    let pitch = db
        .get_pitch(id)?
        .ok_or_else(|| PitchWatchError::NotFound(format!("pitch {}", id)))?;

    println!("{:<28} {}", "ID:", pitch.uuid);
    println!("{:<28} {}", "Name:", pitch.name);
    println!("{:<28} {}", "Location:", pitch.location);
    println!(
        "{:<28} {:.4}, {:.4}",
        "Coordinates:", pitch.location.latitude, pitch.location.longitude
    );
    println!("{:<28} {}", "Turf type:", pitch.turf_type);
    println!("{:<28} {}/10", "Condition:", pitch.current_condition);
    let status = if pitch.needs_replacement() {
        "turf replacement required"
    } else if pitch.needs_maintenance() {
        "maintenance required"
    } else {
        "good"
    };
    println!("{:<28} {}", "Status:", status);
    println!(
        "{:<28} {}",
        "Consecutive rain hours:", pitch.current_consecutive_rain_hours
    );
    println!(
        "{:<28} {}",
        "Last maintenance:",
        format_optional(pitch.last_maintenance_date)
    );
    println!(
        "{:<28} {}",
        "Next maintenance:",
        format_optional(pitch.next_scheduled_maintenance)
    );
    println!(
        "{:<28} {}",
        "Replacement date:",
        format_optional(pitch.replacement_date)
    );
    println!(
        "{:<28} {}",
        "Last checked:",
        format_optional(pitch.last_checked_at)
    );
    Ok(())
}

fn remove_pitch(db: &Database, id: uuid::Uuid) -> Result<()> {
    if db.delete_pitch(id)? {
        println!("Deleted pitch {}", id);
        Ok(())
    } else {
        Err(PitchWatchError::NotFound(format!("pitch {}", id)))
    }
}

fn format_optional(value: Option<chrono::DateTime<chrono::Utc>>) -> String {
    value
        .map(|d| d.to_rfc3339())
        .unwrap_or_else(|| "-".to_string())
}
