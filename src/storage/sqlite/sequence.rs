// File: src/storage/sqlite/sequence.rs

use super::store::SqliteStore;
use crate::error::StorageError;
use crate::traits::SequenceStore;
use rusqlite::{params, OptionalExtension, TransactionBehavior};

impl SequenceStore for SqliteStore {
    fn allocate_next(&self) -> Result<u64, StorageError> {
        let mut conn = self.get_conn()?;
        // IMMEDIATE takes the write lock up front so the read below cannot go stale
        let tx = conn
            .transaction_with_behavior(TransactionBehavior::Immediate)
            .map_err(|e| StorageError::TransactionFailed(e.to_string()))?;

        let now = chrono::Utc::now().timestamp_nanos_opt().unwrap_or(0);
        let last: Option<i64> = tx
            .query_row(
                "SELECT last_sequence FROM certificate_sequence WHERE id = 1",
                [],
                |row| row.get(0),
            )
            .optional()?;

        let next = match last {
            None => {
                tx.execute(
                    "INSERT INTO certificate_sequence (id, last_sequence, updated_at) VALUES (1, 1, ?1)",
                    params![now],
                )?;
                1
            }
            Some(last) => {
                let next = last.checked_add(1).ok_or_else(|| {
                    StorageError::Corruption(format!("sequence counter at {} cannot advance", last))
                })?;
                tx.execute(
                    "UPDATE certificate_sequence SET last_sequence = ?1, updated_at = ?2 WHERE id = 1",
                    params![next, now],
                )?;
                next
            }
        };

        tx.commit()
            .map_err(|e| StorageError::TransactionFailed(e.to_string()))?;

        Ok(next as u64)
    }

    fn current(&self) -> Result<Option<u64>, StorageError> {
        let conn = self.get_conn()?;
        let last: Option<i64> = conn
            .query_row(
                "SELECT last_sequence FROM certificate_sequence WHERE id = 1",
                [],
                |row| row.get(0),
            )
            .optional()?;
        Ok(last.map(|v| v as u64))
    }
}
