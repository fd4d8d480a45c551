//! storedesk - command line console for the grocery platform's store admins.
//!
//! # Usage
//!
//! ```bash
//! # Log in (password prompted, optionally remembered in the OS keychain)
//! storedesk login -e manager@store.in --remember
//!
//! # Superadmin: act on behalf of a store, then browse its inventory
//! storedesk act-as 665f1c0e2a
//! storedesk inventory --page 2
//!
//! # Serve the exported console frontend behind the session gate
//! storedesk serve --dir out --addr 127.0.0.1:3000
//! ```

mod commands;

use std::io;
use std::path::PathBuf;

use anyhow::Result;
use chrono::NaiveDate;
use clap::{Parser, Subcommand};
use tracing::info;
use tracing_appender::non_blocking::WorkerGuard;
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

#[derive(Parser)]
#[command(name = "storedesk")]
#[command(author, version, about = "Store admin console for the grocery platform")]
struct Cli {
    /// Also write logs to this file
    #[arg(long, global = true)]
    log_file: Option<PathBuf>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Log in and store the session
    Login {
        /// Account email (defaults to the last one used)
        #[arg(short, long)]
        email: Option<String>,

        /// Remember the password in the OS keychain
        #[arg(long)]
        remember: bool,
    },
    /// Delete the stored session
    Logout,
    /// Show the stored session and active store
    Status,
    /// Act on behalf of a store (superadmin)
    ActAs {
        store_id: String,
    },
    /// Stop acting on behalf of a store (superadmin)
    LeaveStore,
    /// Show what the gate decides for a console path
    Check {
        path: String,
    },
    /// Remove a remembered password from the keychain
    Forget {
        #[arg(short, long)]
        email: Option<String>,
    },
    /// Serve the console frontend behind the session gate
    Serve {
        /// Directory with the exported frontend
        #[arg(long, default_value = "out")]
        dir: PathBuf,

        #[arg(long, default_value = "127.0.0.1:3000")]
        addr: String,
    },
    /// List stores (superadmin)
    Stores {
        #[arg(long, default_value_t = 1)]
        page: u32,

        #[arg(long, default_value_t = 10)]
        limit: u32,
    },
    /// List the active store's inventory
    Inventory {
        #[arg(long, default_value_t = 1)]
        page: u32,

        #[arg(long, default_value_t = 10)]
        limit: u32,
    },
    /// List coupons (superadmin)
    Coupons,
    /// List cashback offers (superadmin)
    Cashbacks,
    /// Broadcast a push notification (superadmin)
    Notify {
        #[arg(long)]
        title: String,

        #[arg(long)]
        body: String,
    },
    /// Sales analysis for a date range (superadmin)
    Analysis {
        /// First day, YYYY-MM-DD
        #[arg(long)]
        from: NaiveDate,

        /// Last day, YYYY-MM-DD
        #[arg(long)]
        to: NaiveDate,
    },
    /// The active store's daily report
    Report {
        /// Day, YYYY-MM-DD (defaults to today)
        #[arg(long)]
        date: Option<NaiveDate>,
    },
}

/// Initialize the tracing subscriber for logging.
/// Use RUST_LOG env var to control log level (e.g., RUST_LOG=debug).
fn init_tracing(log_file: Option<&PathBuf>) -> Result<Option<WorkerGuard>> {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn"));

    let (file_layer, guard) = match log_file {
        Some(path) => {
            let dir = path
                .parent()
                .filter(|p| !p.as_os_str().is_empty())
                .map(PathBuf::from)
                .unwrap_or_else(|| PathBuf::from("."));
            let name = path
                .file_name()
                .ok_or_else(|| anyhow::anyhow!("Log file path has no file name"))?;
            std::fs::create_dir_all(&dir)?;
            let appender = tracing_appender::rolling::never(dir, name);
            let (writer, guard) = tracing_appender::non_blocking(appender);
            (
                Some(fmt::layer().with_writer(writer).with_ansi(false)),
                Some(guard),
            )
        }
        None => (None, None),
    };

    tracing_subscriber::registry()
        .with(fmt::layer().with_writer(io::stderr))
        .with(file_layer)
        .with(filter)
        .init();

    Ok(guard)
}

#[tokio::main]
async fn main() -> Result<()> {
    // Load .env file if present (silently ignore if not found)
    let _ = dotenvy::dotenv();

    let cli = Cli::parse();
    let _guard = init_tracing(cli.log_file.as_ref())?;
    info!("storedesk starting");

    let result = run(cli.command).await;
    if let Err(ref e) = result {
        tracing::error!("Command failed: {e:#}");
    }
    result
}

async fn run(command: Commands) -> Result<()> {
    use commands::{resources, serve, session};

    match command {
        Commands::Login { email, remember } => session::login(email, remember).await,
        Commands::Logout => session::logout(),
        Commands::Status => session::status(),
        Commands::ActAs { store_id } => session::act_as(&store_id).await,
        Commands::LeaveStore => session::leave_store(),
        Commands::Check { path } => session::check(&path),
        Commands::Forget { email } => session::forget(email),
        Commands::Serve { dir, addr } => serve::run(dir, &addr).await,
        Commands::Stores { page, limit } => resources::stores(page, limit).await,
        Commands::Inventory { page, limit } => resources::inventory(page, limit).await,
        Commands::Coupons => resources::coupons().await,
        Commands::Cashbacks => resources::cashbacks().await,
        Commands::Notify { title, body } => resources::notify(title, body).await,
        Commands::Analysis { from, to } => resources::analysis(from, to).await,
        Commands::Report { date } => resources::report(date).await,
    }
}
