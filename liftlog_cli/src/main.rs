use chrono::Utc;
use clap::{Parser, Subcommand};
use liftlog_core::catalog::{default_seed, sync_catalog, validate};
use liftlog_core::codec::{export_to_file, parse_document};
use liftlog_core::formula::estimate_all;
use liftlog_core::generated::validate_generated;
use liftlog_core::tracking::{progression, write_progression_csv};
use liftlog_core::*;
use std::path::PathBuf;

#[derive(Parser)]
#[command(name = "liftlog")]
#[command(about = "Strength training log with 1RM tracking", long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// Override data directory
    #[arg(long, global = true)]
    data_dir: Option<PathBuf>,

    /// More log output on stderr (repeat for more)
    #[arg(short, long, global = true, action = clap::ArgAction::Count)]
    verbose: u8,
}

#[derive(Subcommand)]
enum Commands {
    /// Sync the built-in exercise catalog into the store
    Seed,

    /// Export the whole store to a JSON document
    Export {
        /// Output file
        #[arg(long)]
        out: PathBuf,
    },

    /// Replace the store with the contents of an export document
    Import {
        /// Export file to read
        file: PathBuf,

        /// Validate the document without touching the store
        #[arg(long)]
        check: bool,
    },

    /// Delete everything in the store
    Wipe {
        /// Confirm the wipe
        #[arg(long)]
        yes: bool,
    },

    /// Log a single completed set as its own workout
    LogSet {
        /// Exercise name (case-insensitive)
        #[arg(long)]
        exercise: String,

        #[arg(long)]
        weight: f64,

        #[arg(long)]
        reps: u32,

        /// Rate of perceived exertion (1-10)
        #[arg(long, value_parser = clap::value_parser!(u8).range(1..=10))]
        rpe: Option<u8>,

        /// Workout name
        #[arg(long, default_value = "Quick log")]
        workout: String,
    },

    /// Add a generated workout (JSON) after validating it against the catalog
    AddGenerated {
        /// Generated workout file
        file: PathBuf,
    },

    /// Show the current estimated max for an exercise
    Best {
        /// Exercise name (case-insensitive)
        exercise: String,
    },

    /// Show the estimated-max progression of an exercise
    Progress {
        /// Exercise name (case-insensitive)
        exercise: String,

        /// Window: 1m, 3m, 6m, 1y, all
        #[arg(long)]
        window: Option<String>,

        /// Also write the series to a CSV file
        #[arg(long)]
        csv: Option<PathBuf>,
    },

    /// Compare 1RM formulas for a set
    Estimate {
        #[arg(long)]
        weight: f64,

        #[arg(long)]
        reps: u32,
    },

    /// Show entity counts
    Stats,

    /// Report integrity problems, optionally removing orphans
    Check {
        #[arg(long)]
        repair: bool,
    },

    /// Show the profile, or create/update it when a name is given
    Profile {
        #[arg(long)]
        name: Option<String>,

        /// Training days per week (1-7)
        #[arg(long, value_parser = clap::value_parser!(u8).range(1..=7))]
        days: Option<u8>,
    },

    /// Write the current configuration to the config file
    InitConfig {
        /// Overwrite an existing file
        #[arg(long)]
        force: bool,
    },
}

fn main() -> Result<()> {
    let cli = Cli::parse();
    liftlog_core::logging::init(cli.verbose);

    let config = Config::load()?;
    let data_dir = cli.data_dir.unwrap_or_else(|| config.data.data_dir.clone());
    let store_file = StoreFile::new(config.data.store_path(&data_dir));

    match cli.command {
        Commands::Seed => cmd_seed(store_file),
        Commands::Export { out } => cmd_export(store_file, out),
        Commands::Import { file, check } => cmd_import(store_file, file, check),
        Commands::Wipe { yes } => cmd_wipe(store_file, yes),
        Commands::LogSet {
            exercise,
            weight,
            reps,
            rpe,
            workout,
        } => cmd_log_set(store_file, &config, exercise, weight, reps, rpe, workout),
        Commands::AddGenerated { file } => cmd_add_generated(store_file, file),
        Commands::Best { exercise } => cmd_best(store_file, exercise),
        Commands::Progress {
            exercise,
            window,
            csv,
        } => cmd_progress(store_file, &config, exercise, window, csv),
        Commands::Estimate { weight, reps } => cmd_estimate(weight, reps),
        Commands::Stats => cmd_stats(store_file),
        Commands::Check { repair } => cmd_check(store_file, repair),
        Commands::Profile { name, days } => cmd_profile(store_file, &config, name, days),
        Commands::InitConfig { force } => cmd_init_config(&config, force),
    }
}

fn cmd_seed(store_file: StoreFile) -> Result<()> {
    let errors = validate(default_seed());
    if !errors.is_empty() {
        eprintln!("Catalog validation errors:");
        for error in errors {
            eprintln!("  - {}", error);
        }
        return Err(Error::CatalogValidation("Invalid catalog seed".into()));
    }

    let report = store_file.update(|store| Ok(sync_catalog(store, default_seed())))?;
    println!(
        "✓ Catalog synced: {} created, {} updated, {} unchanged",
        report.created, report.updated, report.unchanged
    );
    Ok(())
}

fn cmd_export(store_file: StoreFile, out: PathBuf) -> Result<()> {
    let store = store_file.load()?;
    let bytes = export_to_file(&store, &out, Utc::now())?;
    println!("✓ Exported {} entities to {}", store.counts().total(), out.display());
    println!("  Size: {} bytes", bytes);
    Ok(())
}

fn cmd_import(mut store_file: StoreFile, file: PathBuf, check: bool) -> Result<()> {
    if check {
        let bytes = std::fs::read(&file)?;
        let parsed = parse_document(&bytes)?;
        println!("✓ Recognized export from {}", parsed.export_date.to_rfc3339());
        println!("  Records: {}", parsed.record_count());
        println!("  Malformed: {}", parsed.malformed);
        return Ok(());
    }

    // An unreadable store is about to be replaced anyway
    let mut store = match store_file.load() {
        Ok(store) => store,
        Err(Error::Store(msg)) => {
            tracing::warn!("{}. Importing over it.", msg);
            EntityStore::new()
        }
        Err(e) => return Err(e),
    };
    let report = import_file(&file, &mut store, &mut store_file)?;

    println!("✓ Imported export from {}", report.export_date.to_rfc3339());
    println!("  Replaced: {} entities", report.wiped.total());
    println!("  Restored: {} entities", report.restored.total());
    if report.skipped.total() > 0 || report.skipped.dropped_links > 0 {
        println!(
            "  Skipped: {} malformed, {} duplicate, {} unresolved ({} links dropped)",
            report.skipped.malformed,
            report.skipped.duplicates,
            report.skipped.unresolved,
            report.skipped.dropped_links
        );
    }
    Ok(())
}

fn cmd_wipe(mut store_file: StoreFile, yes: bool) -> Result<()> {
    if !yes {
        println!("Refusing to wipe without --yes");
        return Ok(());
    }

    let mut store = store_file.load()?;
    let report = wipe_all(&mut store);
    store_file.save(&store)?;

    println!("✓ Wiped {} entities", report.total());
    Ok(())
}

fn cmd_log_set(
    store_file: StoreFile,
    config: &Config,
    exercise: String,
    weight: f64,
    reps: u32,
    rpe: Option<u8>,
    workout: String,
) -> Result<()> {
    let auto_records = config.tracking.auto_records;

    let outcome = store_file.update(|store| {
        let exercise_id = store
            .exercise_by_name(&exercise)
            .map(|e| e.id)
            .ok_or_else(|| Error::Other(format!("No exercise named '{}'", exercise)))?;

        let workout_id = store.insert_workout(Workout::new(workout, Utc::now()));
        let entry = store.add_workout_exercise(workout_id, exercise_id, 90)?;
        let set_id = store.add_set(entry, weight, reps)?;
        store.edit_set(set_id, |s| {
            s.completed = true;
            s.rpe = rpe;
        })?;

        if auto_records {
            record_set(store, set_id)
        } else {
            Ok(None)
        }
    })?;

    let unit = unit_label(config.profile.weight_unit);
    println!("✓ Logged {}{} x {} on {}", weight, unit, reps, exercise);
    match outcome {
        Some(record) => {
            println!("  New record! Estimated max: {:.1}", record.estimated_max);
            if let Some(previous) = record.previous_best {
                println!("  Previous best: {:.1}", previous);
            }
        }
        None => println!("  No new record"),
    }
    Ok(())
}

fn cmd_add_generated(store_file: StoreFile, file: PathBuf) -> Result<()> {
    let raw = std::fs::read_to_string(&file)?;
    let candidate = GeneratedWorkout::from_json(&raw)?;

    let (workout_id, validated) = store_file.update(|store| {
        let validated = validate_generated(&candidate, store)?;
        let workout_id = validated.materialize(store, Utc::now())?;
        Ok((workout_id, validated))
    })?;

    println!(
        "✓ Added '{}' with {} exercises ({})",
        validated.name,
        validated.exercises.len(),
        workout_id
    );
    for name in &validated.dropped {
        println!("  Dropped unknown exercise: {}", name);
    }
    Ok(())
}

fn cmd_best(store_file: StoreFile, exercise: String) -> Result<()> {
    let store = store_file.load()?;
    match current_best(&store, &exercise) {
        Some(best) => {
            println!("{}: {:.1}", exercise, best.estimated_max);
            println!(
                "  {} via {} ({:?} confidence) on {}",
                best.source.as_str(),
                best.method,
                best.confidence,
                best.date.format("%Y-%m-%d")
            );
        }
        None => println!("No estimated max recorded for {}", exercise),
    }
    Ok(())
}

fn cmd_progress(
    store_file: StoreFile,
    config: &Config,
    exercise: String,
    window: Option<String>,
    csv: Option<PathBuf>,
) -> Result<()> {
    let window = match window {
        Some(raw) => TimeWindow::parse(&raw).ok_or_else(|| {
            Error::Config(format!("Unknown window '{}'. Use 1m, 3m, 6m, 1y or all", raw))
        })?,
        None => config.tracking.default_window,
    };

    let store = store_file.load()?;
    let Some(exercise_id) = store.exercise_by_name(&exercise).map(|e| e.id) else {
        println!("No exercise named '{}'", exercise);
        return Ok(());
    };

    let points = progression(&store, exercise_id, window);
    if points.is_empty() {
        println!("No progression data for {} in {:?}", exercise, window);
        return Ok(());
    }

    for point in points.iter().rev() {
        println!(
            "  {}  {:>7.1}  (weight {:.1}, {})",
            point.date.format("%Y-%m-%d"),
            point.estimated_max,
            point.confidence_weight,
            point.source.as_str()
        );
    }

    if let Some(path) = csv {
        let written = write_progression_csv(&points, &path)?;
        println!("✓ Wrote {} points to {}", written, path.display());
    }
    Ok(())
}

fn cmd_estimate(weight: f64, reps: u32) -> Result<()> {
    for (method, value) in estimate_all(weight, reps) {
        println!("  {:<10} {:.1}", method.name(), value);
    }
    Ok(())
}

fn cmd_stats(store_file: StoreFile) -> Result<()> {
    let counts = store_file.load()?.counts();
    println!("Exercises:         {}", counts.exercises);
    println!("Workouts:          {}", counts.workouts);
    println!("Workout exercises: {}", counts.workout_exercises);
    println!("Sets:              {}", counts.sets);
    println!("Personal records:  {}", counts.personal_records);
    println!("1RM history:       {}", counts.history);
    println!("Profiles:          {}", counts.profiles);
    Ok(())
}

fn cmd_check(mut store_file: StoreFile, repair: bool) -> Result<()> {
    let mut store = store_file.load()?;
    let violations = store.integrity_violations();

    if violations.is_empty() {
        println!("✓ No integrity problems");
        return Ok(());
    }

    for violation in &violations {
        println!("  - {}", violation);
    }

    if repair {
        let (entries, sets) = store.purge_orphans();
        store_file.save(&store)?;
        println!(
            "✓ Removed {} orphaned workout exercises and {} orphaned sets",
            entries, sets
        );
    }
    Ok(())
}

fn unit_label(unit: WeightUnit) -> &'static str {
    match unit {
        WeightUnit::Kg => "kg",
        WeightUnit::Lbs => "lbs",
    }
}

fn cmd_profile(
    store_file: StoreFile,
    config: &Config,
    name: Option<String>,
    days: Option<u8>,
) -> Result<()> {
    let profile = if name.is_none() && days.is_none() {
        store_file.load()?.profile().cloned()
    } else {
        let profile = store_file.update(|store| {
            let mut profile = match store.profile() {
                Some(existing) => existing.clone(),
                None => {
                    let mut fresh = UserProfile::new("Lifter");
                    fresh.weight_unit = config.profile.weight_unit;
                    fresh
                }
            };
            if let Some(name) = name {
                profile.display_name = name;
            }
            if let Some(days) = days {
                profile.workout_days_per_week = days;
            }
            store.set_profile(profile.clone());
            Ok(profile)
        })?;
        println!("✓ Profile saved");
        Some(profile)
    };

    match profile {
        Some(profile) => {
            println!("Name:          {}", profile.display_name);
            println!("Unit:          {}", unit_label(profile.weight_unit));
            println!("Experience:    {:?}", profile.experience_level);
            println!("Days per week: {}", profile.workout_days_per_week);
        }
        None => println!("No profile yet. Create one with --name"),
    }
    Ok(())
}

fn cmd_init_config(config: &Config, force: bool) -> Result<()> {
    let path = Config::default_config_path();
    if path.exists() && !force {
        println!("Config already exists at {} (use --force to overwrite)", path.display());
        return Ok(());
    }

    config.save_to(&path)?;
    println!("✓ Wrote config to {}", path.display());
    Ok(())
}
