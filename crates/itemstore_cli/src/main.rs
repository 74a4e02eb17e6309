//! Schema provisioning CLI.
//!
//! # Responsibility
//! - Apply item-store migrations once, before the server is started.
//! - Report schema readiness for quick local sanity checks.

use std::process::ExitCode;

use clap::{Parser, Subcommand};
use itemstore_core::db::migrations::{current_user_version, latest_version};
use itemstore_core::db::{close_db, open_db, provision_db};
use itemstore_core::{core_version, init_logging, DatabaseLocation};
use rusqlite::Connection;

#[derive(Parser, Debug)]
#[command(name = "itemstore-cli")]
#[command(about = "Provision and inspect the item store schema")]
#[command(version)]
struct Cli {
    /// Connection string of the backing store, e.g. `sqlite://items.db`
    #[arg(long, global = true, env = "DATABASE_URL")]
    database_url: Option<String>,

    /// Log level: trace|debug|info|warn|error
    #[arg(long, global = true, env = "ITEMSTORE_LOG_LEVEL", default_value = "warn")]
    log_level: String,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Apply pending migrations (creates the database file if needed)
    Migrate,
    /// Print schema version and item count
    Status,
    /// Print the core crate version
    Version,
}

fn main() -> ExitCode {
    let cli = Cli::parse();
    if let Err(err) = init_logging(&cli.log_level, None) {
        eprintln!("itemstore-cli: {err}");
        return ExitCode::FAILURE;
    }

    match run(&cli) {
        Ok(()) => ExitCode::SUCCESS,
        Err(err) => {
            eprintln!("itemstore-cli: {err}");
            ExitCode::FAILURE
        }
    }
}

fn run(cli: &Cli) -> Result<(), String> {
    if let Command::Version = cli.command {
        println!("itemstore_core version={}", core_version());
        return Ok(());
    }

    let url = cli
        .database_url
        .as_deref()
        .ok_or_else(|| "DATABASE_URL is not set (pass --database-url)".to_string())?;
    let location = DatabaseLocation::parse(url).map_err(|err| err.to_string())?;

    match cli.command {
        Command::Migrate => {
            let conn = provision_db(&location).map_err(|err| err.to_string())?;
            println!(
                "itemstore schema provisioned location={location} version={}",
                latest_version()
            );
            close_db(conn).map_err(|err| err.to_string())
        }
        Command::Status => {
            let conn = match open_db(&location) {
                Ok(conn) => conn,
                Err(err) => {
                    println!("itemstore schema status=not_ready location={location} reason={err}");
                    return Err("schema is not ready".to_string());
                }
            };
            print_status(&conn, &location).map_err(|err| err.to_string())?;
            close_db(conn).map_err(|err| err.to_string())
        }
        Command::Version => Ok(()),
    }
}

fn print_status(conn: &Connection, location: &DatabaseLocation) -> Result<(), String> {
    let version = current_user_version(conn).map_err(|err| err.to_string())?;
    let items: i64 = conn
        .query_row("SELECT COUNT(*) FROM items;", [], |row| row.get(0))
        .map_err(|err| err.to_string())?;
    println!("itemstore schema status=ready location={location} version={version} items={items}");
    Ok(())
}
