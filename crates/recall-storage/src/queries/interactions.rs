// SPDX-FileCopyrightText: 2026 Recall Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Interaction log operations.

use chrono::{SecondsFormat, Utc};
use recall_core::{Interaction, RecallError};
use rusqlite::{params, OptionalExtension};

use crate::database::{map_tr_err, Database};

/// Insert a new interaction stamped with the current UTC time. Returns its id.
pub async fn insert_interaction(
    db: &Database,
    user_input: &str,
    ai_response: &str,
) -> Result<i64, RecallError> {
    let user_input = user_input.to_string();
    let ai_response = ai_response.to_string();
    let timestamp = Utc::now().to_rfc3339_opts(SecondsFormat::Millis, true);
    db.connection()
        .call(move |conn| -> Result<i64, rusqlite::Error> {
            conn.execute(
                "INSERT INTO interactions (timestamp, user_input, ai_response) VALUES (?1, ?2, ?3)",
                params![timestamp, user_input, ai_response],
            )?;
            Ok(conn.last_insert_rowid())
        })
        .await
        .map_err(map_tr_err)
}

/// All interactions in id (insertion) order.
pub async fn fetch_all(db: &Database) -> Result<Vec<Interaction>, RecallError> {
    db.connection()
        .call(|conn| -> Result<Vec<Interaction>, rusqlite::Error> {
            let mut stmt = conn.prepare(
                "SELECT id, timestamp, user_input, ai_response FROM interactions ORDER BY id ASC",
            )?;
            let rows = stmt.query_map([], |row| {
                Ok(Interaction {
                    id: row.get(0)?,
                    timestamp: row.get(1)?,
                    user_input: row.get(2)?,
                    ai_response: row.get(3)?,
                })
            })?;
            rows.collect()
        })
        .await
        .map_err(map_tr_err)
}

/// Delete the interaction with the highest id, returning that id.
pub async fn delete_most_recent(db: &Database) -> Result<Option<i64>, RecallError> {
    db.connection()
        .call(|conn| -> Result<Option<i64>, rusqlite::Error> {
            let tx = conn.transaction()?;
            let latest: Option<i64> = tx
                .query_row("SELECT MAX(id) FROM interactions", [], |row| row.get(0))
                .optional()?
                .flatten();
            if let Some(id) = latest {
                tx.execute("DELETE FROM interactions WHERE id = ?1", params![id])?;
            }
            tx.commit()?;
            Ok(latest)
        })
        .await
        .map_err(map_tr_err)
}
