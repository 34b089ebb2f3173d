use rusqlite::{params, Connection};
use uuid::Uuid;

use super::{format_timestamp, parse_timestamp, parse_uuid};
use crate::db::DatabaseError;
use crate::models::*;

const ARTIFACT_COLUMNS: &str =
    "id, owner_id, visa_category, document_type, format, page_count, content, pdf_path, created_at";

struct ArtifactRow {
    id: String,
    owner_id: String,
    visa_category: String,
    document_type: String,
    format: String,
    page_count: i64,
    content: String,
    pdf_path: String,
    created_at: String,
}

fn read_row(row: &rusqlite::Row<'_>) -> rusqlite::Result<ArtifactRow> {
    Ok(ArtifactRow {
        id: row.get(0)?,
        owner_id: row.get(1)?,
        visa_category: row.get(2)?,
        document_type: row.get(3)?,
        format: row.get(4)?,
        page_count: row.get(5)?,
        content: row.get(6)?,
        pdf_path: row.get(7)?,
        created_at: row.get(8)?,
    })
}

fn artifact_from_row(row: ArtifactRow) -> Result<GeneratedArtifact, DatabaseError> {
    Ok(GeneratedArtifact {
        id: parse_uuid(&row.id)?,
        owner_id: parse_uuid(&row.owner_id)?,
        visa_category: row.visa_category,
        document_type: row.document_type,
        format: row.format,
        page_count: row.page_count.max(1) as u32,
        content: row.content,
        pdf_path: row.pdf_path,
        created_at: parse_timestamp(&row.created_at),
    })
}

pub fn insert_artifact(conn: &Connection, artifact: &GeneratedArtifact) -> Result<(), DatabaseError> {
    conn.execute(
        &format!(
            "INSERT INTO generated_artifacts ({ARTIFACT_COLUMNS})
             VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9)"
        ),
        params![
            artifact.id.to_string(),
            artifact.owner_id.to_string(),
            artifact.visa_category,
            artifact.document_type,
            artifact.format,
            artifact.page_count as i64,
            artifact.content,
            artifact.pdf_path,
            format_timestamp(&artifact.created_at),
        ],
    )?;
    Ok(())
}

pub fn get_artifact(conn: &Connection, id: &Uuid) -> Result<Option<GeneratedArtifact>, DatabaseError> {
    let mut stmt = conn.prepare(&format!(
        "SELECT {ARTIFACT_COLUMNS} FROM generated_artifacts WHERE id = ?1"
    ))?;

    match stmt.query_row(params![id.to_string()], read_row) {
        Ok(row) => Ok(Some(artifact_from_row(row)?)),
        Err(rusqlite::Error::QueryReturnedNoRows) => Ok(None),
        Err(e) => Err(e.into()),
    }
}

/// All artifacts for an owner, oldest first. Insertion order breaks timestamp ties.
pub fn list_artifacts_for_owner(
    conn: &Connection,
    owner_id: &Uuid,
) -> Result<Vec<GeneratedArtifact>, DatabaseError> {
    let mut stmt = conn.prepare(&format!(
        "SELECT {ARTIFACT_COLUMNS} FROM generated_artifacts
         WHERE owner_id = ?1 ORDER BY created_at ASC, rowid ASC"
    ))?;

    let rows = stmt.query_map(params![owner_id.to_string()], read_row)?;
    let mut artifacts = Vec::new();
    for row in rows {
        artifacts.push(artifact_from_row(row?)?);
    }
    Ok(artifacts)
}
