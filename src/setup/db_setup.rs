use crate::DbPool;
use r2d2::Pool;
use r2d2_sqlite::SqliteConnectionManager;
use rusqlite::{Connection, Result as RusqliteResult, Transaction};
use std::path::Path;
use thiserror::Error;
use uuid::Uuid;

#[derive(Error, Debug)]
pub enum SetupError {
    #[error("Rusqlite error: {0}")]
    Rusqlite(#[from] rusqlite::Error),
    #[error("R2D2 Pool error: {0}")]
    Pool(#[from] r2d2::Error),
}

/// Category names offered by the catalog out of the box.
pub const DEFAULT_CATEGORIES: [&str; 35] = [
    "3D & Animation",
    "Algorithms",
    "Architecture",
    "Artificial Intelligence",
    "Audio Production",
    "Augmented Reality",
    "Blockchain",
    "Cloud Computing",
    "Computer Networking",
    "Cybersecurity",
    "Data Science",
    "Databases",
    "DevOps",
    "Digital Art",
    "Fashion Design",
    "Game Design",
    "Game Development",
    "Graphic Design",
    "Health & Fitness",
    "Instruments",
    "Lifestyle",
    "Machine Learning",
    "Mobile Development",
    "Motion Graphics",
    "Music Production",
    "Music Theory",
    "Operating Systems",
    "Photography",
    "Product Design",
    "Programming Languages",
    "Singing",
    "Software Engineering",
    "Video Editing",
    "Virtual Reality",
    "Web Development",
];

fn enable_foreign_keys(conn: &mut Connection) -> RusqliteResult<()> {
    conn.execute_batch("PRAGMA foreign_keys = ON;")
}

/// Connection pool over the courses database. Foreign keys are switched on for every connection.
pub fn open_pool(db_path: &Path) -> Result<DbPool, SetupError> {
    let manager = SqliteConnectionManager::file(db_path).with_init(enable_foreign_keys);
    Ok(Pool::builder().build(manager)?)
}

/// Single-connection in-memory pool with the schema applied. Used by tests.
pub fn open_memory_pool() -> Result<DbPool, SetupError> {
    // Every in-memory connection is its own database, so the pool must never open a second one.
    let manager = SqliteConnectionManager::memory().with_init(enable_foreign_keys);
    let pool = Pool::builder().max_size(1).build(manager)?;
    {
        let mut conn = pool.get()?;
        create_schema(&mut conn, false)?;
    }
    Ok(pool)
}

pub fn setup_courses_db(conn: &mut Connection) -> Result<(), SetupError> {
    enable_foreign_keys(conn)?;
    create_schema(conn, true)
}

fn create_schema(conn: &mut Connection, verbose: bool) -> Result<(), SetupError> {
    let step = |msg: &str| {
        if verbose {
            println!("{}", msg);
        }
    };

    let tx = conn.transaction()?;

    step("- Creating 'categories' table...");
    tx.execute(
        "CREATE TABLE IF NOT EXISTS categories (
            id TEXT PRIMARY KEY,
            name TEXT NOT NULL UNIQUE
        )",
        [],
    )?;

    step("- Creating 'courses' table...");
    tx.execute(
        "CREATE TABLE IF NOT EXISTS courses (
            id TEXT PRIMARY KEY,
            user_id TEXT NOT NULL,
            title TEXT NOT NULL,
            description TEXT,
            image_url TEXT,
            price REAL,
            is_published INTEGER NOT NULL DEFAULT 0,
            category_id TEXT,
            created_at TEXT NOT NULL,
            updated_at TEXT NOT NULL,
            FOREIGN KEY (category_id) REFERENCES categories(id) ON DELETE SET NULL
        )",
        [],
    )?;
    tx.execute("CREATE INDEX IF NOT EXISTS idx_courses_user_id ON courses(user_id)", [])?;
    tx.execute("CREATE INDEX IF NOT EXISTS idx_courses_category_id ON courses(category_id)", [])?;

    step("- Creating 'attachments' table...");
    tx.execute(
        "CREATE TABLE IF NOT EXISTS attachments (
            id TEXT PRIMARY KEY,
            name TEXT NOT NULL,
            url TEXT NOT NULL,
            course_id TEXT NOT NULL,
            created_at TEXT NOT NULL,
            FOREIGN KEY (course_id) REFERENCES courses(id) ON DELETE CASCADE
        )",
        [],
    )?;
    tx.execute("CREATE INDEX IF NOT EXISTS idx_attachments_course_id ON attachments(course_id)", [])?;

    step("- Creating 'chapters' table...");
    tx.execute(
        "CREATE TABLE IF NOT EXISTS chapters (
            id TEXT PRIMARY KEY,
            title TEXT NOT NULL,
            description TEXT,
            video_url TEXT,
            position INTEGER NOT NULL,
            is_published INTEGER NOT NULL DEFAULT 0,
            is_free INTEGER NOT NULL DEFAULT 0,
            course_id TEXT NOT NULL,
            created_at TEXT NOT NULL,
            updated_at TEXT NOT NULL,
            UNIQUE (course_id, position),
            FOREIGN KEY (course_id) REFERENCES courses(id) ON DELETE CASCADE
        )",
        [],
    )?;

    step("- Creating 'video_assets' table...");
    tx.execute(
        "CREATE TABLE IF NOT EXISTS video_assets (
            id TEXT PRIMARY KEY,
            asset_id TEXT NOT NULL,
            playback_id TEXT,
            chapter_id TEXT NOT NULL UNIQUE,
            FOREIGN KEY (chapter_id) REFERENCES chapters(id) ON DELETE CASCADE
        )",
        [],
    )?;

    step("- Creating 'orphaned_video_assets' table...");
    tx.execute(
        "CREATE TABLE IF NOT EXISTS orphaned_video_assets (
            asset_id TEXT PRIMARY KEY,
            reason TEXT NOT NULL,
            recorded_at TEXT NOT NULL
        )",
        [],
    )?;

    seed_categories(&tx, verbose)?;

    tx.commit()?;
    Ok(())
}

fn seed_categories(tx: &Transaction, verbose: bool) -> RusqliteResult<()> {
    if verbose {
        println!("- Seeding default categories...");
    }
    let mut inserted = 0;
    for name in DEFAULT_CATEGORIES {
        inserted += tx.execute(
            "INSERT OR IGNORE INTO categories (id, name) VALUES (?1, ?2)",
            [Uuid::new_v4().to_string().as_str(), name],
        )?;
    }
    if verbose {
        println!("  > {} categories added.", inserted);
    }
    Ok(())
}
