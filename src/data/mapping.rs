//! Seed mapping data access object
//!
//! Owns creation and lookup of frozen universes. Creation is the only
//! coordination point in the engine: the unique index on
//! `filter_signature` serializes concurrent `get_or_create` calls, and
//! the loser of an insert race re-selects the winner's row so two callers
//! can never observe divergent universes for one signature.

use chrono::{DateTime, Utc};
use rusqlite::{params, Connection, OptionalExtension};
use std::sync::{Arc, Mutex};
use tracing::info;

use super::models::SeedMapping;
use crate::catalog::{Catalog, Filter};
use crate::error::{GauntletError, Result};
use crate::seed::generate_mapping_code;

/// Data access object for seed mapping operations
#[derive(Clone)]
pub struct MappingStore {
    conn: Arc<Mutex<Connection>>,
}

impl MappingStore {
    /// Create a new MappingStore
    pub fn new(conn: Arc<Mutex<Connection>>) -> Self {
        Self { conn }
    }

    /// Return the mapping frozen for `filter`, creating it on first use.
    ///
    /// An existing mapping is returned as-is; its universe is never
    /// regenerated, because every seed already handed out over it would
    /// desynchronize. A new mapping snapshots the catalog under the
    /// filter and freezes the ids in byte-wise sorted order, so two
    /// installations with agreeing catalogs freeze identical universes.
    pub fn get_or_create(&self, filter: &Filter, catalog: &dyn Catalog) -> Result<SeedMapping> {
        let signature = filter.signature();

        if let Some(existing) = self.find_by_signature(&signature)? {
            return Ok(existing);
        }

        let mut universe = catalog.query_by_filter(filter);
        universe.sort();
        universe.dedup();
        if universe.is_empty() {
            return Err(GauntletError::InsufficientCatalogSize {
                requested: 1,
                available: 0,
            });
        }

        let mapping = SeedMapping::new(self.fresh_code()?, Some(signature.clone()), universe);

        let conn = self.conn.lock().unwrap();
        let inserted = conn.execute(
            "INSERT INTO seed_mappings (code, filter_signature, universe, created_at)
             VALUES (?1, ?2, ?3, ?4)
             ON CONFLICT(filter_signature) DO NOTHING",
            params![
                mapping.code,
                mapping.filter_signature,
                serde_json::to_string(&mapping.universe).unwrap_or_else(|_| "[]".to_string()),
                mapping.created_at.to_rfc3339(),
            ],
        )?;
        drop(conn);

        if inserted == 0 {
            // Lost the creation race; the winner's universe is canonical
            return self
                .find_by_signature(&signature)?
                .ok_or(GauntletError::UnknownMapping {
                    code: mapping.code.clone(),
                });
        }

        info!(
            code = %mapping.code,
            signature = %signature,
            universe = mapping.universe.len(),
            "Froze new seed mapping"
        );
        Ok(mapping)
    }

    /// Resolve a mapping by its code
    pub fn resolve(&self, code: &str) -> Result<SeedMapping> {
        let conn = self.conn.lock().unwrap();
        let mut stmt = conn.prepare(
            "SELECT code, filter_signature, universe, created_at
             FROM seed_mappings WHERE code = ?1",
        )?;

        let mut rows = stmt.query(params![code])?;
        match rows.next()? {
            Some(row) => Ok(Self::row_to_mapping(row)?),
            None => Err(GauntletError::UnknownMapping {
                code: code.to_string(),
            }),
        }
    }

    /// Check that a mapping can be imported without desynchronizing an
    /// existing local mapping of the same code. Reads only, so a caller
    /// importing a batch can reject the whole batch before the first
    /// write.
    pub fn verify_importable(&self, mapping: &SeedMapping) -> Result<()> {
        match self.resolve(&mapping.code) {
            Ok(existing) if existing.universe == mapping.universe => Ok(()),
            Ok(_) => Err(GauntletError::MappingConflict {
                code: mapping.code.clone(),
            }),
            Err(GauntletError::UnknownMapping { .. }) => Ok(()),
            Err(e) => Err(e),
        }
    }

    /// Insert a mapping brought in by an import, verbatim.
    ///
    /// Imported rows carry no filter signature so they can never collide
    /// with (or be returned for) a locally created signature. A code
    /// collision with an identical universe is reused; a differing
    /// universe is refused.
    pub fn insert_imported(&self, mapping: &SeedMapping) -> Result<()> {
        self.verify_importable(mapping)?;
        if self.resolve(&mapping.code).is_ok() {
            // Identical universe already present; reuse it
            return Ok(());
        }

        let conn = self.conn.lock().unwrap();
        conn.execute(
            "INSERT INTO seed_mappings (code, filter_signature, universe, created_at)
             VALUES (?1, NULL, ?2, ?3)",
            params![
                mapping.code,
                serde_json::to_string(&mapping.universe).unwrap_or_else(|_| "[]".to_string()),
                mapping.created_at.to_rfc3339(),
            ],
        )?;
        Ok(())
    }

    /// Remove a mapping. Explicit user action only; seeds over it stop
    /// resolving.
    pub fn delete(&self, code: &str) -> Result<()> {
        let conn = self.conn.lock().unwrap();
        conn.execute("DELETE FROM seed_mappings WHERE code = ?1", params![code])?;
        Ok(())
    }

    /// All mappings, newest first
    pub fn list(&self) -> Result<Vec<SeedMapping>> {
        let conn = self.conn.lock().unwrap();
        let mut stmt = conn.prepare(
            "SELECT code, filter_signature, universe, created_at
             FROM seed_mappings ORDER BY created_at DESC, code",
        )?;

        let mappings = stmt
            .query_map([], Self::row_to_mapping)?
            .collect::<rusqlite::Result<Vec<_>>>()?;
        Ok(mappings)
    }

    fn find_by_signature(&self, signature: &str) -> Result<Option<SeedMapping>> {
        let conn = self.conn.lock().unwrap();
        let mapping = conn
            .query_row(
                "SELECT code, filter_signature, universe, created_at
                 FROM seed_mappings WHERE filter_signature = ?1",
                params![signature],
                Self::row_to_mapping,
            )
            .optional()?;
        Ok(mapping)
    }

    /// Generate a mapping code not already in the store
    fn fresh_code(&self) -> Result<String> {
        loop {
            let code = generate_mapping_code();
            match self.resolve(&code) {
                Err(GauntletError::UnknownMapping { .. }) => return Ok(code),
                Ok(_) => continue,
                Err(e) => return Err(e),
            }
        }
    }

    /// Convert a database row to a SeedMapping
    fn row_to_mapping(row: &rusqlite::Row) -> rusqlite::Result<SeedMapping> {
        let universe_json: String = row.get(2)?;
        let created_at_str: String = row.get(3)?;

        Ok(SeedMapping {
            code: row.get(0)?,
            filter_signature: row.get(1)?,
            universe: serde_json::from_str(&universe_json).unwrap_or_default(),
            created_at: DateTime::parse_from_rfc3339(&created_at_str)
                .map(|dt| dt.with_timezone(&Utc))
                .unwrap_or_else(|_| Utc::now()),
        })
    }
}
