use clap::{Parser, Subcommand};
use std::path::PathBuf;
use std::time::Instant;

use credit_projector::config::Config;
use credit_projector::notice;
use credit_projector::persistence::{Sink, SimulationRecord};
use credit_projector::profile::Profile;

const EXIT_SUCCESS: i32 = 0;
const EXIT_PERSISTENCE: i32 = 2;
const EXIT_CONFIG: i32 = 4;

#[derive(Subcommand, Debug)]
enum Commands {
    /// Answer a few questions and see your projection (default if no subcommand)
    Wizard {
        /// Prefill answers from a profile file (YAML or JSON)
        #[arg(short, long)]
        profile: Option<PathBuf>,

        /// Print the result as JSON
        #[arg(long)]
        json: bool,

        /// Do not save the result
        #[arg(long)]
        no_save: bool,
    },
    /// Run a projection for a profile file without prompting
    Simulate {
        /// Profile file (YAML or JSON)
        #[arg(short, long)]
        profile: PathBuf,

        /// Print the result as JSON
        #[arg(long)]
        json: bool,

        /// Do not save the result
        #[arg(long)]
        no_save: bool,
    },
    /// List saved projections from the local history
    History {
        /// Number of entries to show, most recent first
        #[arg(short = 'n', long, default_value_t = 10)]
        limit: usize,

        /// Only show entries for this user id
        #[arg(short, long)]
        user: Option<String>,
    },
    /// Write a starter config file
    Init {
        /// Overwrite an existing config file
        #[arg(long)]
        force: bool,
    },
}

#[derive(Parser, Debug)]
#[command(name = "credit-projector")]
#[command(about = "Project your credit score through a debt relief program", long_about = None)]
#[command(version)]
struct Cli {
    /// Enable verbose logging
    #[arg(short, long, global = true)]
    verbose: bool,

    /// Path to config file (defaults to ~/.config/credit-projector/config.yaml)
    #[arg(short, long, global = true)]
    config: Option<String>,

    #[command(subcommand)]
    command: Option<Commands>,
}

struct RunOptions {
    json: bool,
    save: bool,
    verbose: bool,
}

#[tokio::main]
async fn main() {
    // reqwest needs a rustls crypto provider; a second install is harmless
    let _ = rustls::crypto::ring::default_provider().install_default();

    let cli = Cli::parse();
    let command = cli.command.unwrap_or(Commands::Wizard {
        profile: None,
        json: false,
        no_save: false,
    });
    let config_path = cli.config.map(PathBuf::from);

    if let Commands::Init { force } = command {
        match credit_projector::config::write_default_config(config_path, force) {
            Ok(path) => println!("Wrote config to {}", path.display()),
            Err(e) => {
                eprintln!("Config error: {:#}", e);
                std::process::exit(EXIT_CONFIG);
            }
        }
        std::process::exit(EXIT_SUCCESS);
    }

    let config = match credit_projector::config::load_config(config_path) {
        Ok(c) => c,
        Err(e) => {
            eprintln!("Config error: {:#}", e);
            std::process::exit(EXIT_CONFIG);
        }
    };

    if let Err(errors) = credit_projector::config::validate_config(&config) {
        eprintln!("Config errors:");
        for error in errors {
            eprintln!("  - {}", error);
        }
        std::process::exit(EXIT_CONFIG);
    }

    if cli.verbose {
        eprintln!("User id: {}", config.resolved_user_id());
        eprintln!("Reveal delay: {:?}", config.reveal_delay());
    }

    let code = match command {
        Commands::Simulate {
            profile,
            json,
            no_save,
        } => {
            let profile = match credit_projector::profile::load_profile(&profile) {
                Ok(p) => p,
                Err(e) => {
                    eprintln!("Profile error: {:#}", e);
                    std::process::exit(EXIT_CONFIG);
                }
            };
            let options = RunOptions {
                json,
                save: !no_save,
                verbose: cli.verbose,
            };
            run_projection(profile, &config, &options).await
        }
        Commands::Wizard {
            profile,
            json,
            no_save,
        } => {
            let draft = match profile {
                Some(path) => match credit_projector::profile::load_profile(&path) {
                    Ok(p) => credit_projector::wizard::ProfileDraft::from(&p),
                    Err(e) => {
                        eprintln!("Profile error: {:#}", e);
                        std::process::exit(EXIT_CONFIG);
                    }
                },
                None => credit_projector::wizard::ProfileDraft::default(),
            };

            let stdin = std::io::stdin();
            let target = credit_projector::wizard::PromptTarget::for_report(json);
            let mut prompter =
                credit_projector::wizard::Prompter::new(stdin.lock(), target.writer());
            let profile = match credit_projector::wizard::run_wizard(
                &mut prompter,
                credit_projector::wizard::Wizard::with_draft(draft),
            ) {
                Ok(p) => p,
                Err(e) => {
                    eprintln!("{:#}", e);
                    std::process::exit(EXIT_CONFIG);
                }
            };
            drop(prompter);
            if !json {
                println!();
            }

            let options = RunOptions {
                json,
                save: !no_save,
                verbose: cli.verbose,
            };
            run_projection(profile, &config, &options).await
        }
        Commands::History { limit, user } => show_history(&config, limit, user.as_deref()),
        Commands::Init { .. } => EXIT_SUCCESS,
    };

    std::process::exit(code);
}

/// Validate, simulate, display and save one profile. Returns the exit code.
async fn run_projection(profile: Profile, config: &Config, options: &RunOptions) -> i32 {
    if let Err(errors) = credit_projector::profile::validate_profile(&profile) {
        eprintln!("Profile errors:");
        for error in errors {
            eprintln!("  - {}", error);
        }
        return EXIT_CONFIG;
    }

    let start_time = Instant::now();
    let projection = credit_projector::scoring::run_simulation(&profile);
    let timeline = credit_projector::timeline::build_timeline(&projection, profile.scenario);

    if options.verbose {
        eprintln!("Simulation finished in {:?}", start_time.elapsed());
    }

    // Save in the background; a failed save only produces a notice
    notice::hold();
    let save_task = if options.save {
        match Sink::from_config(config) {
            Ok(sink) => {
                if options.verbose {
                    eprintln!("Saving to {}", sink.describe());
                }
                let record = SimulationRecord::new(
                    &config.resolved_user_id(),
                    profile.clone(),
                    projection.clone(),
                );
                let verbose = options.verbose;
                Some(tokio::spawn(async move {
                    match sink.save(record).await {
                        Ok(Some(receipt)) if verbose => {
                            let id = receipt.id.unwrap_or_else(|| "-".to_string());
                            let at = receipt
                                .saved_at
                                .map(|t| t.to_rfc3339())
                                .unwrap_or_else(|| "pending".to_string());
                            credit_projector::notice!("Saved simulation (id {}, at {})", id, at);
                        }
                        Ok(_) => {}
                        Err(e) => credit_projector::notice!("Could not save simulation: {}", e),
                    }
                }))
            }
            Err(e) => {
                credit_projector::notice!("Could not save simulation: {}", e);
                None
            }
        }
    } else {
        None
    };

    if options.json {
        match credit_projector::output::format_json(&profile, &projection, &timeline) {
            Ok(json) => println!("{}", json),
            Err(e) => {
                eprintln!("Failed to serialize result: {}", e);
                notice::release();
                return EXIT_CONFIG;
            }
        }
    } else {
        let delay = config.reveal_delay();
        if !delay.is_zero() {
            eprintln!("Crunching the numbers...");
            tokio::time::sleep(delay).await;
        }

        let use_colors = credit_projector::output::should_use_colors();
        println!(
            "{}",
            credit_projector::output::format_kpis(&projection, profile.scenario, use_colors)
        );
        println!();
        println!(
            "{}",
            credit_projector::output::format_milestones(&projection, use_colors)
        );
        println!();
        println!(
            "{}",
            credit_projector::output::format_timeline(&timeline, use_colors)
        );

        if options.verbose {
            let breakdown = credit_projector::scoring::explain_weights(&profile);
            println!();
            println!(
                "{}",
                credit_projector::output::format_weight_breakdown(&breakdown)
            );
            println!();
            println!("{}", credit_projector::output::format_gains(&projection));
        }
    }

    if let Some(task) = save_task {
        if let Err(e) = task.await {
            credit_projector::notice!("Could not save simulation: {}", e);
        }
    }

    let notices = notice::release();
    if !notices.is_empty() {
        eprintln!();
        for msg in notices {
            eprintln!("{}", msg);
        }
    }

    EXIT_SUCCESS
}

fn show_history(config: &Config, limit: usize, user: Option<&str>) -> i32 {
    let path = config
        .persistence
        .history_path
        .as_ref()
        .map(PathBuf::from)
        .unwrap_or_else(credit_projector::persistence::get_history_path);

    if let Some(note) = Sink::history_note(config.persistence.sink) {
        eprintln!("{}", note);
    }

    let history = match credit_projector::persistence::load_history(&path) {
        Ok(h) => h,
        Err(e) => {
            eprintln!("History error: {:#}", e);
            return EXIT_PERSISTENCE;
        }
    };

    let records: Vec<&SimulationRecord> = match user {
        Some(user_id) => history.for_user(user_id).take(limit).collect(),
        None => history.latest(limit).collect(),
    };

    let use_colors = credit_projector::output::should_use_colors();
    println!(
        "{}",
        credit_projector::output::format_history(records, use_colors)
    );

    EXIT_SUCCESS
}
