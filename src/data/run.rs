//! Run data access object
//!
//! Persists runs with their plan entries and challenge slots. The
//! executor funnels every state transition through
//! [`RunStore::apply_transition`], which writes the cursor and the
//! touched challenge rows in a single transaction so a transition is
//! either fully persisted or not at all.

use chrono::{DateTime, Utc};
use rusqlite::{params, Connection, Transaction};
use std::sync::{Arc, Mutex};
use uuid::Uuid;

use super::models::{Challenge, ChallengeStatus, Run, Visibility};
use crate::error::{GauntletError, Result};

/// Data access object for run operations
#[derive(Clone)]
pub struct RunStore {
    conn: Arc<Mutex<Connection>>,
}

impl RunStore {
    /// Create a new RunStore
    pub fn new(conn: Arc<Mutex<Connection>>) -> Self {
        Self { conn }
    }

    /// Insert or replace a run with all of its challenges
    pub fn save(&self, run: &Run) -> Result<()> {
        let mut conn = self.conn.lock().unwrap();
        let tx = conn.transaction()?;

        tx.execute(
            "INSERT INTO runs (id, name, plan_entries, cursor, created_at, updated_at)
             VALUES (?1, ?2, ?3, ?4, ?5, ?6)
             ON CONFLICT(id) DO UPDATE SET
                 name = ?2, plan_entries = ?3, cursor = ?4, updated_at = ?6",
            params![
                run.id.to_string(),
                run.name,
                serde_json::to_string(&run.plan).unwrap_or_else(|_| "[]".to_string()),
                run.cursor.map(|c| c as i64),
                run.created_at.to_rfc3339(),
                Utc::now().to_rfc3339(),
            ],
        )?;

        tx.execute(
            "DELETE FROM challenges WHERE run_id = ?1",
            params![run.id.to_string()],
        )?;
        for challenge in &run.challenges {
            Self::insert_challenge(&tx, run.id, challenge)?;
        }

        tx.commit()?;
        Ok(())
    }

    /// Get a run with its challenges, ordered by ordinal
    pub fn get_by_id(&self, id: Uuid) -> Result<Option<Run>> {
        let conn = self.conn.lock().unwrap();
        let mut stmt = conn.prepare(
            "SELECT id, name, plan_entries, cursor, created_at, updated_at
             FROM runs WHERE id = ?1",
        )?;

        let mut rows = stmt.query(params![id.to_string()])?;
        let Some(row) = rows.next()? else {
            return Ok(None);
        };
        let mut run = Self::row_to_run(row)?;
        drop(rows);
        drop(stmt);

        let mut stmt = conn.prepare(
            "SELECT id, ordinal, origin, item_id, visibility, revealed_explicitly,
                    status, started_at, finished_at
             FROM challenges WHERE run_id = ?1 ORDER BY ordinal",
        )?;
        run.challenges = stmt
            .query_map(params![id.to_string()], Self::row_to_challenge)?
            .collect::<rusqlite::Result<Vec<_>>>()?;

        Ok(Some(run))
    }

    /// Get all runs (challenges included), newest first
    pub fn get_all(&self) -> Result<Vec<Run>> {
        let ids: Vec<Uuid> = {
            let conn = self.conn.lock().unwrap();
            let mut stmt =
                conn.prepare("SELECT id FROM runs ORDER BY created_at DESC, id")?;
            let id_strings = stmt
                .query_map([], |row| row.get::<_, String>(0))?
                .collect::<rusqlite::Result<Vec<_>>>()?;
            id_strings
                .iter()
                .filter_map(|s| Uuid::parse_str(s).ok())
                .collect()
        };

        let mut runs = Vec::with_capacity(ids.len());
        for id in ids {
            if let Some(run) = self.get_by_id(id)? {
                runs.push(run);
            }
        }
        Ok(runs)
    }

    /// Persist one executor transition: the new cursor plus every
    /// challenge row it touched, atomically
    pub fn apply_transition(
        &self,
        run_id: Uuid,
        cursor: Option<usize>,
        touched: &[Challenge],
    ) -> Result<()> {
        let mut conn = self.conn.lock().unwrap();
        let tx = conn.transaction()?;

        let updated = tx.execute(
            "UPDATE runs SET cursor = ?2, updated_at = ?3 WHERE id = ?1",
            params![
                run_id.to_string(),
                cursor.map(|c| c as i64),
                Utc::now().to_rfc3339(),
            ],
        )?;
        if updated == 0 {
            return Err(GauntletError::UnknownRun {
                run_id: run_id.to_string(),
            });
        }

        for challenge in touched {
            tx.execute(
                "UPDATE challenges SET
                     item_id = ?2, visibility = ?3, revealed_explicitly = ?4,
                     status = ?5, started_at = ?6, finished_at = ?7
                 WHERE id = ?1",
                params![
                    challenge.id.to_string(),
                    challenge.item_id,
                    challenge.visibility.as_str(),
                    challenge.revealed_explicitly as i32,
                    challenge.status.as_str(),
                    challenge.started_at.map(|t| t.to_rfc3339()),
                    challenge.finished_at.map(|t| t.to_rfc3339()),
                ],
            )?;
        }

        tx.commit()?;
        Ok(())
    }

    /// Delete a run (cascades to its challenges)
    pub fn delete(&self, id: Uuid) -> Result<()> {
        let conn = self.conn.lock().unwrap();
        conn.execute("DELETE FROM runs WHERE id = ?1", params![id.to_string()])?;
        Ok(())
    }

    fn insert_challenge(tx: &Transaction, run_id: Uuid, challenge: &Challenge) -> Result<()> {
        tx.execute(
            "INSERT INTO challenges (id, run_id, ordinal, origin, item_id, visibility,
                                     revealed_explicitly, status, started_at, finished_at)
             VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10)",
            params![
                challenge.id.to_string(),
                run_id.to_string(),
                challenge.ordinal as i64,
                serde_json::to_string(&challenge.origin)
                    .unwrap_or_else(|_| "{}".to_string()),
                challenge.item_id,
                challenge.visibility.as_str(),
                challenge.revealed_explicitly as i32,
                challenge.status.as_str(),
                challenge.started_at.map(|t| t.to_rfc3339()),
                challenge.finished_at.map(|t| t.to_rfc3339()),
            ],
        )?;
        Ok(())
    }

    /// Convert a database row to a Run (challenges loaded separately)
    fn row_to_run(row: &rusqlite::Row) -> rusqlite::Result<Run> {
        let id_str: String = row.get(0)?;
        let plan_json: String = row.get(2)?;
        let cursor: Option<i64> = row.get(3)?;
        let created_at_str: String = row.get(4)?;
        let updated_at_str: String = row.get(5)?;

        Ok(Run {
            id: Uuid::parse_str(&id_str).unwrap_or_else(|_| Uuid::new_v4()),
            name: row.get(1)?,
            plan: serde_json::from_str(&plan_json).unwrap_or_default(),
            challenges: Vec::new(),
            cursor: cursor.map(|c| c as usize),
            created_at: parse_timestamp(&created_at_str),
            updated_at: parse_timestamp(&updated_at_str),
        })
    }

    /// Convert a database row to a Challenge
    fn row_to_challenge(row: &rusqlite::Row) -> rusqlite::Result<Challenge> {
        let id_str: String = row.get(0)?;
        let ordinal: i64 = row.get(1)?;
        let origin_json: String = row.get(2)?;
        let visibility_str: String = row.get(4)?;
        let revealed_explicitly: i64 = row.get(5)?;
        let status_str: String = row.get(6)?;
        let started_at_str: Option<String> = row.get(7)?;
        let finished_at_str: Option<String> = row.get(8)?;

        let origin = serde_json::from_str(&origin_json).map_err(|e| {
            rusqlite::Error::FromSqlConversionFailure(
                2,
                rusqlite::types::Type::Text,
                Box::new(e),
            )
        })?;

        Ok(Challenge {
            id: Uuid::parse_str(&id_str).unwrap_or_else(|_| Uuid::new_v4()),
            ordinal: ordinal as usize,
            origin,
            item_id: row.get(3)?,
            visibility: Visibility::parse(&visibility_str),
            revealed_explicitly: revealed_explicitly != 0,
            status: ChallengeStatus::parse(&status_str),
            started_at: started_at_str.as_deref().map(parse_timestamp),
            finished_at: finished_at_str.as_deref().map(parse_timestamp),
        })
    }
}

fn parse_timestamp(s: &str) -> DateTime<Utc> {
    DateTime::parse_from_rfc3339(s)
        .map(|dt| dt.with_timezone(&Utc))
        .unwrap_or_else(|_| Utc::now())
}
