use clap::{Parser, Subcommand};
use coursebase_backend::config::Config;
use coursebase_backend::helper::video_helpers::{self, MuxVideoHost};
use coursebase_backend::models::db_operations::{categories_db_operations, video_assets_db_operations};
use coursebase_backend::setup::db_setup;
use rusqlite::Connection;
use std::fs;
use std::path::PathBuf;

#[derive(Parser, Debug)]
#[command(name = "setup_cli", author, version, about = "A CLI for initial application setup.", long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// Path to the .env configuration file.
    #[arg(long, required = true, value_name = "FILE")]
    env_file: PathBuf,
}

#[derive(Subcommand, Debug)]
enum Commands {
    Db {
        #[command(subcommand)]
        action: DbAction,
    },
    Category {
        #[command(subcommand)]
        action: CategoryAction,
    },
    Assets {
        #[command(subcommand)]
        action: AssetsAction,
    },
}

#[derive(Subcommand, Debug)]
enum DbAction {
    Setup,
}

#[derive(Subcommand, Debug)]
enum CategoryAction {
    Add {
        #[arg(long)]
        name: String,
    },
    List,
}

#[derive(Subcommand, Debug)]
enum AssetsAction {
    /// Lists remote video assets whose deletion failed.
    ListOrphans,
    /// Retries deleting every recorded orphan on the video host.
    PurgeOrphans,
}

fn main() {
    let cli = Cli::parse();

    let config = Config::from_env(&cli.env_file)
        .expect("FATAL: Failed to load or parse configuration.");

    env_logger::init_from_env(env_logger::Env::new().default_filter_or(&config.log_level));

    match &cli.command {
        Commands::Db { action } => match action {
            DbAction::Setup => setup_courses_database(&config),
        },
        Commands::Category { action } => match action {
            CategoryAction::Add { name } => add_category(&config, name),
            CategoryAction::List => list_categories(&config),
        },
        Commands::Assets { action } => match action {
            AssetsAction::ListOrphans => list_orphans(&config),
            AssetsAction::PurgeOrphans => purge_orphans(&config),
        },
    }
}

fn setup_courses_database(config: &Config) {
    let db_path = config.courses_db_path();
    println!("\nSetting up courses database at '{}'...", db_path.display());

    if let Some(parent_dir) = db_path.parent() {
        fs::create_dir_all(parent_dir).expect("Could not create database directory.");
    }

    let mut conn = Connection::open(&db_path).expect("Could not create courses database file.");
    match db_setup::setup_courses_db(&mut conn) {
        Ok(_) => println!("✅ Courses database setup completed successfully."),
        Err(e) => eprintln!("❌ Error setting up courses database: {}", e),
    }
}

fn open_existing(config: &Config) -> Option<Connection> {
    let db_path = config.courses_db_path();
    if !db_path.exists() {
        eprintln!("❌ Error: Courses database not found at '{}'. Please run `setup_cli db setup` first.", db_path.display());
        return None;
    }
    match Connection::open(&db_path) {
        Ok(conn) => Some(conn),
        Err(e) => {
            eprintln!("❌ Error opening courses database: {}", e);
            None
        }
    }
}

fn add_category(config: &Config, name: &str) {
    let Some(conn) = open_existing(config) else { return };
    if name.trim().is_empty() {
        eprintln!("❌ Error: Category name must not be empty.");
        return;
    }
    match categories_db_operations::add_category(&conn, name) {
        Ok(id) => println!("✅ Category '{}' is available with id {}.", name.trim(), id),
        Err(e) => eprintln!("❌ Error adding category: {}", e),
    }
}

fn list_categories(config: &Config) {
    let Some(conn) = open_existing(config) else { return };
    match categories_db_operations::read_all_categories(&conn) {
        Ok(categories) => {
            println!("Listing Categories:");
            for category in categories {
                println!("- {} ({})", category.name, category.id);
            }
        }
        Err(e) => eprintln!("❌ Error fetching categories: {}", e),
    }
}

fn list_orphans(config: &Config) {
    let Some(conn) = open_existing(config) else { return };
    match video_assets_db_operations::list_orphaned_assets(&conn) {
        Ok(ids) if ids.is_empty() => println!("No orphaned video assets."),
        Ok(ids) => {
            println!("Listing Orphaned Video Assets:");
            for id in ids {
                println!("- {}", id);
            }
        }
        Err(e) => eprintln!("❌ Error fetching orphaned assets: {}", e),
    }
}

fn purge_orphans(config: &Config) {
    if open_existing(config).is_none() {
        return;
    }
    let pool = match db_setup::open_pool(&config.courses_db_path()) {
        Ok(pool) => pool,
        Err(e) => {
            eprintln!("❌ Error opening courses database: {}", e);
            return;
        }
    };
    let host = MuxVideoHost::new(&config.video);

    let outcome = actix_web::rt::System::new().block_on(video_helpers::purge_orphaned_assets(&pool, &host));
    match outcome {
        Ok(report) => println!(
            "✅ Purged {} orphaned video asset(s); {} still pending.",
            report.purged, report.remaining
        ),
        Err(e) => eprintln!("❌ Error purging orphaned assets: {}", e),
    }
}
