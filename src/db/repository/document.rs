use std::str::FromStr;

use rusqlite::{params, Connection};
use uuid::Uuid;

use super::{decode_list, encode_list, format_timestamp, parse_timestamp, parse_uuid};
use crate::db::DatabaseError;
use crate::models::*;

const DOCUMENT_COLUMNS: &str = "id, owner_id, file_name, media_type, storage_path, checksum,
     status, extracted_text, fraud_detected, confidence, fraud_reasons, missing_fields,
     recommendations, predicted_type, created_at";

struct DocumentRow {
    id: String,
    owner_id: String,
    file_name: String,
    media_type: String,
    storage_path: String,
    checksum: String,
    status: String,
    extracted_text: Option<String>,
    fraud_detected: i32,
    confidence: i64,
    fraud_reasons: String,
    missing_fields: String,
    recommendations: String,
    predicted_type: Option<String>,
    created_at: String,
}

fn read_row(row: &rusqlite::Row<'_>) -> rusqlite::Result<DocumentRow> {
    Ok(DocumentRow {
        id: row.get(0)?,
        owner_id: row.get(1)?,
        file_name: row.get(2)?,
        media_type: row.get(3)?,
        storage_path: row.get(4)?,
        checksum: row.get(5)?,
        status: row.get(6)?,
        extracted_text: row.get(7)?,
        fraud_detected: row.get(8)?,
        confidence: row.get(9)?,
        fraud_reasons: row.get(10)?,
        missing_fields: row.get(11)?,
        recommendations: row.get(12)?,
        predicted_type: row.get(13)?,
        created_at: row.get(14)?,
    })
}

fn document_from_row(row: DocumentRow) -> Result<DocumentRecord, DatabaseError> {
    Ok(DocumentRecord {
        id: parse_uuid(&row.id)?,
        owner_id: parse_uuid(&row.owner_id)?,
        file_name: row.file_name,
        media_type: row.media_type,
        storage_path: row.storage_path,
        checksum: row.checksum,
        status: DocumentStatus::from_str(&row.status)?,
        extracted_text: row.extracted_text,
        fraud_detected: row.fraud_detected != 0,
        confidence: row.confidence.clamp(0, 100) as u8,
        fraud_reasons: decode_list(&row.fraud_reasons),
        missing_fields: decode_list(&row.missing_fields),
        recommendations: row.recommendations,
        predicted_type: row.predicted_type,
        created_at: parse_timestamp(&row.created_at),
    })
}

fn not_found(id: &Uuid) -> DatabaseError {
    DatabaseError::NotFound {
        entity_type: "Document".into(),
        id: id.to_string(),
    }
}

pub fn insert_document(conn: &Connection, doc: &DocumentRecord) -> Result<(), DatabaseError> {
    conn.execute(
        &format!(
            "INSERT INTO documents ({DOCUMENT_COLUMNS})
             VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10, ?11, ?12, ?13, ?14, ?15)"
        ),
        params![
            doc.id.to_string(),
            doc.owner_id.to_string(),
            doc.file_name,
            doc.media_type,
            doc.storage_path,
            doc.checksum,
            doc.status.as_str(),
            doc.extracted_text,
            doc.fraud_detected as i32,
            doc.confidence as i64,
            encode_list(&doc.fraud_reasons),
            encode_list(&doc.missing_fields),
            doc.recommendations,
            doc.predicted_type,
            format_timestamp(&doc.created_at),
        ],
    )?;
    Ok(())
}

pub fn get_document(conn: &Connection, id: &Uuid) -> Result<Option<DocumentRecord>, DatabaseError> {
    let mut stmt = conn.prepare(&format!(
        "SELECT {DOCUMENT_COLUMNS} FROM documents WHERE id = ?1"
    ))?;

    match stmt.query_row(params![id.to_string()], read_row) {
        Ok(row) => Ok(Some(document_from_row(row)?)),
        Err(rusqlite::Error::QueryReturnedNoRows) => Ok(None),
        Err(e) => Err(e.into()),
    }
}

/// Update only the processing status of a document.
pub fn update_document_status(
    conn: &Connection,
    id: &Uuid,
    status: DocumentStatus,
) -> Result<(), DatabaseError> {
    let rows = conn.execute(
        "UPDATE documents SET status = ?2 WHERE id = ?1",
        params![id.to_string(), status.as_str()],
    )?;
    if rows == 0 {
        return Err(not_found(id));
    }
    Ok(())
}

/// Store extraction output alongside the status it produced.
pub fn update_extracted_text(
    conn: &Connection,
    id: &Uuid,
    text: Option<&str>,
    status: DocumentStatus,
) -> Result<(), DatabaseError> {
    let rows = conn.execute(
        "UPDATE documents SET extracted_text = ?2, status = ?3 WHERE id = ?1",
        params![id.to_string(), text, status.as_str()],
    )?;
    if rows == 0 {
        return Err(not_found(id));
    }
    Ok(())
}

/// Persist a gated fraud verdict and mark the document completed.
pub fn update_fraud_verdict(
    conn: &Connection,
    id: &Uuid,
    fraud_detected: bool,
    confidence: u8,
    fraud_reasons: &[String],
    missing_fields: &[String],
    recommendations: &str,
) -> Result<(), DatabaseError> {
    let rows = conn.execute(
        "UPDATE documents SET fraud_detected = ?2, confidence = ?3, fraud_reasons = ?4,
         missing_fields = ?5, recommendations = ?6, status = ?7
         WHERE id = ?1",
        params![
            id.to_string(),
            fraud_detected as i32,
            confidence as i64,
            encode_list(fraud_reasons),
            encode_list(missing_fields),
            recommendations,
            DocumentStatus::Completed.as_str(),
        ],
    )?;
    if rows == 0 {
        return Err(not_found(id));
    }
    Ok(())
}

pub fn update_predicted_type(
    conn: &Connection,
    id: &Uuid,
    predicted_type: &str,
) -> Result<(), DatabaseError> {
    let rows = conn.execute(
        "UPDATE documents SET predicted_type = ?2 WHERE id = ?1",
        params![id.to_string(), predicted_type],
    )?;
    if rows == 0 {
        return Err(not_found(id));
    }
    Ok(())
}

/// Every storage path referenced by a document record.
pub fn list_storage_paths(conn: &Connection) -> Result<Vec<String>, DatabaseError> {
    let mut stmt = conn.prepare("SELECT storage_path FROM documents")?;
    let rows = stmt.query_map([], |row| row.get::<_, String>(0))?;
    let mut paths = Vec::new();
    for row in rows {
        paths.push(row?);
    }
    Ok(paths)
}
