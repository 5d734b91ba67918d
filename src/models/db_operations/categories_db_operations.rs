use crate::models::Category;
use rusqlite::{params, Connection, Error as RusqliteError};
use uuid::Uuid;

pub fn read_all_categories(conn: &Connection) -> Result<Vec<Category>, RusqliteError> {
    let mut stmt = conn.prepare("SELECT id, name FROM categories ORDER BY name ASC")?;
    let rows = stmt.query_map([], |row| {
        Ok(Category {
            id: row.get(0)?,
            name: row.get(1)?,
        })
    })?;

    let mut categories = Vec::new();
    for category in rows {
        categories.push(category?);
    }
    Ok(categories)
}

pub fn category_exists(conn: &Connection, category_id: &str) -> Result<bool, RusqliteError> {
    conn.query_row(
        "SELECT EXISTS(SELECT 1 FROM categories WHERE id = ?1)",
        [category_id],
        |row| row.get(0),
    )
}

/// Inserts a category unless one with the same name exists. Returns the id either way.
pub fn add_category(conn: &Connection, name: &str) -> Result<String, RusqliteError> {
    let name = name.trim();
    conn.execute(
        "INSERT OR IGNORE INTO categories (id, name) VALUES (?1, ?2)",
        params![Uuid::new_v4().to_string(), name],
    )?;
    conn.query_row("SELECT id FROM categories WHERE name = ?1", [name], |row| row.get(0))
}
