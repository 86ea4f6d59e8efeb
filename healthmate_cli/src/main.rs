use clap::{Args, Parser, Subcommand};
use healthmate_core::*;
use serde::Serialize;
use std::path::PathBuf;

#[derive(Parser)]
#[command(name = "healthmate")]
#[command(about = "Nutrition tracking with plain-text storage", long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Option<Commands>,

    /// Override data directory
    #[arg(long, global = true)]
    data_dir: Option<PathBuf>,
}

#[derive(Subcommand)]
enum Commands {
    /// Load all saved data and report what was found (default)
    Status,

    /// Manage the meal catalog
    #[command(subcommand)]
    Meal(MealCommand),

    /// Manage the meal entry log
    #[command(subcommand)]
    Log(LogCommand),

    /// Manage the user profile
    #[command(subcommand)]
    Profile(ProfileCommand),

    /// Clear the meal catalog and entry log
    Reset,
}

#[derive(Subcommand)]
enum MealCommand {
    /// Add a meal to the catalog
    Add {
        #[arg(long)]
        calories: i32,

        #[arg(long)]
        name: Option<String>,
    },

    /// List the catalog
    List {
        #[arg(long)]
        json: bool,
    },
}

#[derive(Subcommand)]
enum LogCommand {
    /// Record a consumed meal
    Add(LogAddArgs),

    /// List logged meals
    List {
        #[arg(long)]
        json: bool,
    },
}

#[derive(Args)]
struct LogAddArgs {
    /// Copy name and calories from a catalog meal
    #[arg(long, conflicts_with_all = ["calories", "name"])]
    meal: Option<String>,

    #[arg(long, required_unless_present = "meal")]
    calories: Option<i32>,

    #[arg(long)]
    name: Option<String>,

    /// When the meal was eaten (YYYY-MM-DDTHH:MM[:SS]), defaults to now
    #[arg(long)]
    at: Option<String>,
}

#[derive(Subcommand)]
enum ProfileCommand {
    /// Set the profile
    Set {
        #[arg(long)]
        height: f64,

        #[arg(long)]
        weight: f64,

        #[command(flatten)]
        sex: SexArgs,

        #[arg(long)]
        age: u32,

        #[arg(long)]
        goal: String,
    },

    /// Show the profile
    Show {
        /// Print the profile file as stored
        #[arg(long)]
        raw: bool,
    },
}

#[derive(Args)]
#[group(required = true, multiple = false)]
struct SexArgs {
    #[arg(long)]
    male: bool,

    #[arg(long)]
    female: bool,
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    let config = Config::load()?;
    healthmate_core::logging::init_with_level(&config.logging.level);

    let data_dir = cli.data_dir.unwrap_or_else(|| config.data.data_dir.clone());
    tracing::debug!("Data directory: {:?}", data_dir);
    let mut tracker = HistoryTracker::new(data_dir)?;

    match cli.command {
        Some(Commands::Status) | None => cmd_status(&mut tracker),
        Some(Commands::Meal(cmd)) => cmd_meal(&tracker, cmd),
        Some(Commands::Log(cmd)) => cmd_log(&tracker, cmd),
        Some(Commands::Profile(cmd)) => cmd_profile(&mut tracker, cmd),
        Some(Commands::Reset) => cmd_reset(&tracker),
    }
}

fn cmd_status(tracker: &mut HistoryTracker) -> Result<()> {
    match tracker.load_profile() {
        Ok(Some(profile)) => println!(
            "Profile: {} cm, {} kg, age {}, goal: {}",
            profile.height, profile.weight, profile.age, profile.goal
        ),
        Ok(None) => println!("No profile saved yet."),
        Err(e) => println!("Could not load profile: {}", e),
    }

    let options = tracker.load_meal_options()?;
    report_skipped(&options);
    println!("Meal Options Loaded Successfully!");
    println!("  {} meals in catalog", options.records.len());

    let entries = tracker.load_meal_entries()?;
    report_skipped(&entries);
    println!("Meal Entries Loaded Successfully!");
    println!(
        "  {} entries, {} kcal total",
        entries.records.len(),
        entries.records.total_calories()
    );

    Ok(())
}

fn cmd_meal(tracker: &HistoryTracker, cmd: MealCommand) -> Result<()> {
    let options = tracker.load_meal_options()?;
    report_skipped(&options);
    let mut options = options.records;

    match cmd {
        MealCommand::Add { calories, name } => {
            let meal = Meal::new(check_name(name)?, calories);
            println!("Added to catalog: {}", meal);
            options.push(meal);
            tracker.save_meal_options(&options)?;
        }
        MealCommand::List { json } => {
            if json {
                print_json(options.meals())?;
            } else if options.is_empty() {
                println!("No meals in catalog.");
            } else {
                for (i, meal) in options.iter().enumerate() {
                    println!("{}. {}", i + 1, meal);
                }
            }
        }
    }

    Ok(())
}

fn cmd_log(tracker: &HistoryTracker, cmd: LogCommand) -> Result<()> {
    let entries = tracker.load_meal_entries()?;
    report_skipped(&entries);
    let mut entries = entries.records;

    match cmd {
        LogCommand::Add(args) => {
            let timestamp = match args.at {
                Some(at) => parse_timestamp(&at).map_err(|e| {
                    Error::Input(format!("Invalid --at value {:?}: {}", at, e))
                })?,
                None => chrono::Local::now().naive_local(),
            };

            let entry = match (args.meal, args.calories) {
                (Some(meal_name), _) => {
                    let options = tracker.load_meal_options()?.records;
                    let meal = options
                        .iter()
                        .find(|m| m.name.as_deref() == Some(meal_name.as_str()))
                        .ok_or_else(|| {
                            Error::Input(format!("No meal named {:?} in catalog", meal_name))
                        })?;
                    MealEntry::from_meal(meal, timestamp)
                }
                (None, Some(calories)) => {
                    MealEntry::new(check_name(args.name)?, calories, timestamp)
                }
                (None, None) => {
                    return Err(Error::Input("Either --meal or --calories is required".into()))
                }
            };

            println!("Logged: {}", entry);
            entries.push(entry);
            tracker.save_meal_entries(&entries)?;
        }
        LogCommand::List { json } => {
            if json {
                print_json(entries.entries())?;
            } else if entries.is_empty() {
                println!("No meals logged.");
            } else {
                for entry in &entries {
                    println!("{}", entry);
                }
                println!("Total: {} kcal", entries.total_calories());
            }
        }
    }

    Ok(())
}

fn cmd_profile(tracker: &mut HistoryTracker, cmd: ProfileCommand) -> Result<()> {
    match cmd {
        ProfileCommand::Set {
            height,
            weight,
            sex,
            age,
            goal,
        } => {
            // Loading first makes sure the profile file exists
            if let Err(e) = tracker.load_profile() {
                println!("Replacing unreadable profile: {}", e);
            }

            let profile = Profile::new(height, weight, sex.male, age, goal);
            match tracker.save_profile(&profile)? {
                ProfileSave::Written => println!("Profile saved."),
                ProfileSave::FileCreated => {
                    println!("Profile file created; run the command again to save.")
                }
            }
        }
        ProfileCommand::Show { raw } => {
            if raw {
                for line in tracker.read_profile_lines()? {
                    println!("{}", line);
                }
                return Ok(());
            }

            match tracker.load_profile() {
                Ok(Some(profile)) => {
                    println!("Height: {} cm", profile.height);
                    println!("Weight: {} kg", profile.weight);
                    println!("Sex:    {}", if profile.is_male { "male" } else { "female" });
                    println!("Age:    {}", profile.age);
                    println!("Goal:   {}", profile.goal);
                }
                Ok(None) => println!("No profile saved yet."),
                Err(e) => println!("Error loading profile: {}", e),
            }
        }
    }

    Ok(())
}

fn cmd_reset(tracker: &HistoryTracker) -> Result<()> {
    tracker.save_meal_options(&tracker.empty_meal_options())?;
    tracker.save_meal_entries(&tracker.empty_meal_entries())?;
    println!("Cleared meal catalog and entry log.");
    Ok(())
}

/// Names are stored unquoted, so a comma or line break would not reload
fn check_name(name: Option<String>) -> Result<Option<String>> {
    match name {
        Some(n) if n.contains(|c| matches!(c, ',' | '\n' | '\r')) => Err(Error::Input(format!(
            "Meal name {:?} cannot contain commas or line breaks",
            n
        ))),
        other => Ok(other),
    }
}

fn report_skipped<T>(loaded: &Loaded<T>) {
    for skipped in &loaded.skipped {
        eprintln!("warning: skipped {}", skipped);
    }
}

fn print_json<T: Serialize + ?Sized>(value: &T) -> Result<()> {
    let json = serde_json::to_string_pretty(value).map_err(std::io::Error::from)?;
    println!("{}", json);
    Ok(())
}
