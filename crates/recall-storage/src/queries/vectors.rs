// SPDX-FileCopyrightText: 2026 Recall Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Vector collection operations over the `vector_collections` and
//! `vector_entries` tables.

use chrono::{SecondsFormat, Utc};
use recall_core::types::VectorMatch;
use recall_core::vector::{blob_to_vec, rank_nearest, vec_to_blob};
use recall_core::RecallError;
use rusqlite::params;

use crate::database::{map_tr_err, Database};

/// Create `name`, emptying it if it already exists.
pub async fn create_collection(db: &Database, name: &str) -> Result<(), RecallError> {
    let name = name.to_string();
    let created_at = Utc::now().to_rfc3339_opts(SecondsFormat::Millis, true);
    db.connection()
        .call(move |conn| -> Result<(), rusqlite::Error> {
            let tx = conn.transaction()?;
            tx.execute(
                "INSERT INTO vector_collections (name, created_at) VALUES (?1, ?2)
                 ON CONFLICT(name) DO NOTHING",
                params![name, created_at],
            )?;
            tx.execute(
                "DELETE FROM vector_entries WHERE collection = ?1",
                params![name],
            )?;
            tx.commit()
        })
        .await
        .map_err(map_tr_err)
}

/// Drop `name` and its entries. Missing collections are ignored.
pub async fn delete_collection(db: &Database, name: &str) -> Result<(), RecallError> {
    let name = name.to_string();
    db.connection()
        .call(move |conn| -> Result<(), rusqlite::Error> {
            conn.execute("DELETE FROM vector_collections WHERE name = ?1", params![name])?;
            Ok(())
        })
        .await
        .map_err(map_tr_err)
}

pub async fn collection_exists(db: &Database, name: &str) -> Result<bool, RecallError> {
    let name = name.to_string();
    db.connection()
        .call(move |conn| -> Result<bool, rusqlite::Error> {
            conn.query_row(
                "SELECT EXISTS(SELECT 1 FROM vector_collections WHERE name = ?1)",
                params![name],
                |row| row.get(0),
            )
        })
        .await
        .map_err(map_tr_err)
}

pub async fn list_collections(db: &Database) -> Result<Vec<String>, RecallError> {
    db.connection()
        .call(|conn| -> Result<Vec<String>, rusqlite::Error> {
            let mut stmt = conn.prepare("SELECT name FROM vector_collections ORDER BY name")?;
            let rows = stmt.query_map([], |row| row.get(0))?;
            rows.collect()
        })
        .await
        .map_err(map_tr_err)
}

/// Insert or replace one entry. Fails if the collection does not exist.
pub async fn insert_entry(
    db: &Database,
    collection: &str,
    id: i64,
    embedding: &[f32],
    document: String,
) -> Result<(), RecallError> {
    let collection = collection.to_string();
    let blob = vec_to_blob(embedding);
    db.connection()
        .call(move |conn| -> Result<(), rusqlite::Error> {
            conn.execute(
                "INSERT OR REPLACE INTO vector_entries (collection, id, embedding, document)
                 VALUES (?1, ?2, ?3, ?4)",
                params![collection, id, blob, document],
            )?;
            Ok(())
        })
        .await
        .map_err(map_tr_err)
}

/// Brute-force cosine scan of a collection, best match first.
pub async fn nearest(
    db: &Database,
    collection: &str,
    query: &[f32],
    k: usize,
) -> Result<Vec<VectorMatch>, RecallError> {
    let collection = collection.to_string();
    let rows = db
        .connection()
        .call(move |conn| -> Result<Vec<(i64, String, Vec<f32>)>, rusqlite::Error> {
            let mut stmt = conn.prepare(
                "SELECT id, document, embedding FROM vector_entries WHERE collection = ?1",
            )?;
            let rows = stmt.query_map(params![collection], |row| {
                let blob: Vec<u8> = row.get(2)?;
                Ok((row.get(0)?, row.get(1)?, blob_to_vec(&blob)))
            })?;
            rows.collect()
        })
        .await
        .map_err(map_tr_err)?;

    Ok(rank_nearest(
        query,
        rows.iter()
            .map(|(id, doc, emb)| (*id, doc.as_str(), emb.as_slice())),
        k,
    ))
}

pub async fn count(db: &Database, collection: &str) -> Result<usize, RecallError> {
    let collection = collection.to_string();
    let n = db
        .connection()
        .call(move |conn| -> Result<i64, rusqlite::Error> {
            conn.query_row(
                "SELECT COUNT(*) FROM vector_entries WHERE collection = ?1",
                params![collection],
                |row| row.get(0),
            )
        })
        .await
        .map_err(map_tr_err)?;
    Ok(usize::try_from(n).unwrap_or(0))
}
