// File: src/storage/sqlite/activity.rs

use super::convert;
use super::store::SqliteStore;
use crate::error::StorageError;
use crate::model::ActivityEvent;
use crate::traits::ActivityLog;
use async_trait::async_trait;
use rusqlite::params;
use uuid::Uuid;

#[async_trait]
impl ActivityLog for SqliteStore {
    async fn record(&self, event: ActivityEvent) -> Result<(), StorageError> {
        let conn = self.get_conn()?;
        conn.execute(
            "INSERT INTO activity_logs (actor_id, actor_type, actor_name, action, target_type,
                target_id, institution_id, details, occurred_at)
             VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9)",
            params![
                event.actor_id.map(|id| id.to_string()),
                event.actor_type.as_str(),
                event.actor_name,
                event.action.as_str(),
                event.target_type,
                event.target_id.to_string(),
                event.institution_id.map(|id| id.to_string()),
                event.details.to_string(),
                convert::to_nanos(event.occurred_at),
            ],
        )?;
        Ok(())
    }
}

impl SqliteStore {
    /// Action names logged against a target, oldest first
    pub fn activity_actions_for(&self, target_id: &Uuid) -> Result<Vec<String>, StorageError> {
        let conn = self.get_conn()?;
        let mut stmt =
            conn.prepare("SELECT action FROM activity_logs WHERE target_id = ?1 ORDER BY id ASC")?;
        let rows = stmt.query_map(params![target_id.to_string()], |row| row.get(0))?;
        Ok(rows.collect::<Result<Vec<String>, _>>()?)
    }
}
