use crate::helper::{get_conn, ActionError};
use crate::models::db_operations::{categories_db_operations, courses_db_operations};
use crate::models::{Category, Course};
use crate::DbPool;

fn non_blank(value: Option<&str>) -> Option<&str> {
    value.map(str::trim).filter(|v| !v.is_empty())
}

pub fn fetch_categories(pool: &DbPool) -> Result<Vec<Category>, ActionError> {
    let conn = get_conn(pool)?;
    Ok(categories_db_operations::read_all_categories(&conn)?)
}

/// Published courses only. Blank filters are ignored; the title match is case-insensitive.
pub fn search_published_courses(
    pool: &DbPool,
    category_id: Option<&str>,
    title_query: Option<&str>,
) -> Result<Vec<Course>, ActionError> {
    let conn = get_conn(pool)?;
    Ok(courses_db_operations::read_published_courses(
        &conn,
        non_blank(category_id),
        non_blank(title_query),
    )?)
}
