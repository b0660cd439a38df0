use chrono::{Datelike, Local};
use clap::{Parser, Subcommand};

use vinted_wrapped::{config, report};

#[derive(Parser)]
#[command(name = "vinted-wrapped", about = "Your year on Vinted, wrapped")]
struct Cli {
    /// Database path (default: ~/.vinted-wrapped/wrapped.db)
    #[arg(long)]
    db: Option<String>,

    /// Increase logging verbosity
    #[arg(short, long, action = clap::ArgAction::Count)]
    verbose: u8,

    #[command(subcommand)]
    command: Commands,
}

/// Progress reporter that writes to stderr.
struct StderrProgress;

impl vinted_wrapped::FetchProgress for StderrProgress {
    fn on_phase(&self, phase: &vinted_wrapped::FetchPhase) {
        if *phase == vinted_wrapped::FetchPhase::Loading {
            eprintln!("Loading your Vinted journey... this may take a minute or two.");
        }
    }

    fn on_records_fetched(&self, resource: vinted_wrapped::Resource, count: usize) {
        eprintln!("  Fetched {count} {resource}");
    }
}

#[derive(Subcommand)]
enum Commands {
    /// Show your wrapped summary
    Show {
        /// Access token
        #[arg(long, env = "VINTED_ACCESS_TOKEN", hide_env_values = true)]
        access_token: Option<String>,
        /// CSRF token
        #[arg(long, env = "VINTED_CSRF_TOKEN", hide_env_values = true)]
        csrf_token: Option<String>,
        /// Marketplace domain (e.g. fr, de, co.uk)
        #[arg(long)]
        domain: Option<String>,
        /// Ignore the cached summary and fetch again
        #[arg(long, conflicts_with = "offline")]
        refresh: bool,
        /// Only use the cached summary
        #[arg(long)]
        offline: bool,
        /// Output as JSON
        #[arg(long)]
        json: bool,
    },
    /// Manage the cached summary
    Cache {
        #[command(subcommand)]
        action: CacheAction,
    },
    /// Manage configuration
    Config {
        #[command(subcommand)]
        action: ConfigAction,
    },
}

#[derive(Subcommand)]
enum CacheAction {
    /// Show when the summary was cached
    Status,
    /// Remove the cached summary
    Clear,
}

#[derive(Subcommand)]
enum ConfigAction {
    /// Get a config value
    Get { key: String },
    /// Set a config value
    Set { key: String, value: String },
    /// List all config values
    List,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    let level = match cli.verbose {
        0 => "warn",
        1 => "info",
        2 => "debug",
        _ => "trace",
    };
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or(level)).init();

    let db = match &cli.db {
        Some(path) => vinted_wrapped::Database::open_at(path).await?,
        None => vinted_wrapped::Database::open().await?,
    };

    match cli.command {
        Commands::Show {
            access_token,
            csrf_token,
            domain,
            refresh,
            offline,
            json,
        } => {
            let domain = config::resolve_domain(&db, domain.as_deref()).await?;
            let backend_url = config::resolve_backend_url(&db).await?;
            let provider = vinted_wrapped::HttpProvider::new(&backend_url)?;
            let wrapped = vinted_wrapped::Wrapped::new(db.clone(), provider);
            let credentials = || -> vinted_wrapped::Result<vinted_wrapped::Credentials> {
                let missing = |flag: &str, var: &str| {
                    vinted_wrapped::Error::Config(format!("--{flag} (or {var}) is required"))
                };
                let access_token = access_token
                    .clone()
                    .ok_or_else(|| missing("access-token", "VINTED_ACCESS_TOKEN"))?;
                let csrf_token = csrf_token
                    .clone()
                    .ok_or_else(|| missing("csrf-token", "VINTED_CSRF_TOKEN"))?;
                vinted_wrapped::Credentials::new(access_token, csrf_token, domain.clone())
            };

            let summary = if offline {
                wrapped.cached().await?.ok_or_else(|| {
                    anyhow::anyhow!("No fresh cached summary. Run without --offline.")
                })?
            } else if refresh {
                wrapped.refresh(&credentials()?, &StderrProgress).await?
            } else {
                wrapped.load_with(credentials, &StderrProgress).await?
            };

            if json {
                println!("{}", serde_json::to_string_pretty(&summary)?);
            } else {
                let slides = report::slides(&summary, Local::now().year());
                print!("{}", report::render_text(&slides));
            }
        }
        Commands::Cache { action } => {
            let cache = vinted_wrapped::SummaryCache::new(db);
            match action {
                CacheAction::Status => match cache.cached_at().await? {
                    Some(at) => {
                        let state = if cache.is_fresh(at) { "fresh" } else { "expired" };
                        println!(
                            "Cached at {} ({state})",
                            at.with_timezone(&Local).format("%Y-%m-%d %H:%M:%S")
                        );
                    }
                    None => println!("No cached summary"),
                },
                CacheAction::Clear => {
                    if cache.clear().await? {
                        println!("Cleared cached summary");
                    } else {
                        println!("No cached summary");
                    }
                }
            }
        }
        Commands::Config { action } => match action {
            ConfigAction::Get { key } => match config::get(&db, &key).await? {
                Some(val) => println!("{val}"),
                None => println!("(not set)"),
            },
            ConfigAction::Set { key, value } => {
                config::set(&db, &key, &value).await?;
                println!("Set {key}");
            }
            ConfigAction::List => {
                let entries = config::list(&db).await?;
                if entries.is_empty() {
                    println!("No config values set.");
                }
                for (k, v) in entries {
                    println!("{k} = {v}");
                }
            }
        },
    }

    Ok(())
}
