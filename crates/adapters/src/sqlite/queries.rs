use rusqlite::{params, Connection, OptionalExtension, Result};

pub struct RemoteRow {
    pub url: String,
    pub location_json: Option<String>,
}

pub struct LocalRow {
    pub file_name: String,
    pub file_path: String,
    pub location_json: Option<String>,
}

pub fn find_draft(conn: &Connection) -> Result<Option<Option<String>>> {
    conn.query_row(
        "SELECT property_location_json FROM drafts WHERE id = 1",
        [],
        |row| row.get(0),
    )
    .optional()
}

pub fn upsert_draft(
    conn: &Connection,
    property_location_json: Option<&str>,
    updated_at: &str,
) -> Result<()> {
    conn.execute(
        "INSERT INTO drafts (id, property_location_json, updated_at)
         VALUES (1, ?1, ?2)
         ON CONFLICT(id) DO UPDATE SET
            property_location_json = excluded.property_location_json,
            updated_at = excluded.updated_at",
        params![property_location_json, updated_at],
    )?;
    Ok(())
}

pub fn list_remote_images(conn: &Connection) -> Result<Vec<RemoteRow>> {
    let mut stmt = conn.prepare(
        "SELECT url, location_json
         FROM draft_remote_images
         ORDER BY position ASC",
    )?;
    let rows = stmt.query_map([], |row| {
        Ok(RemoteRow {
            url: row.get(0)?,
            location_json: row.get(1)?,
        })
    })?;
    rows.collect()
}

pub fn list_local_images(conn: &Connection) -> Result<Vec<LocalRow>> {
    let mut stmt = conn.prepare(
        "SELECT file_name, file_path, location_json
         FROM draft_local_images
         ORDER BY position ASC",
    )?;
    let rows = stmt.query_map([], |row| {
        Ok(LocalRow {
            file_name: row.get(0)?,
            file_path: row.get(1)?,
            location_json: row.get(2)?,
        })
    })?;
    rows.collect()
}

pub fn replace_remote_images(conn: &Connection, rows: &[RemoteRow]) -> Result<()> {
    conn.execute("DELETE FROM draft_remote_images", [])?;
    let mut stmt = conn.prepare(
        "INSERT INTO draft_remote_images (position, url, location_json)
         VALUES (?1, ?2, ?3)",
    )?;
    for (position, row) in rows.iter().enumerate() {
        stmt.execute(params![position as i64, row.url, row.location_json])?;
    }
    Ok(())
}

pub fn replace_local_images(conn: &Connection, rows: &[LocalRow]) -> Result<()> {
    conn.execute("DELETE FROM draft_local_images", [])?;
    let mut stmt = conn.prepare(
        "INSERT INTO draft_local_images (position, file_name, file_path, location_json)
         VALUES (?1, ?2, ?3, ?4)",
    )?;
    for (position, row) in rows.iter().enumerate() {
        stmt.execute(params![
            position as i64,
            row.file_name,
            row.file_path,
            row.location_json
        ])?;
    }
    Ok(())
}

pub fn delete_draft(conn: &Connection) -> Result<()> {
    conn.execute_batch(
        "DELETE FROM draft_local_images;
         DELETE FROM draft_remote_images;
         DELETE FROM drafts;",
    )
}
