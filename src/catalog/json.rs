//! JSON file catalog provider
//!
//! The CLI host points this at a catalog export (an array of items).
//! Installations sync catalog files out of band; this crate never
//! writes to them.

use std::fs;
use std::path::{Path, PathBuf};

use thiserror::Error;
use tracing::debug;

use super::{Catalog, CatalogItem, Filter, StaticCatalog};

#[derive(Error, Debug)]
pub enum CatalogError {
    #[error("failed to read catalog file {path}: {source}")]
    Read {
        path: PathBuf,
        source: std::io::Error,
    },
    #[error("failed to parse catalog file {path}: {source}")]
    Parse {
        path: PathBuf,
        source: serde_json::Error,
    },
}

/// Catalog loaded from a JSON file (an array of [`CatalogItem`])
#[derive(Debug, Clone)]
pub struct JsonCatalog {
    inner: StaticCatalog,
    path: PathBuf,
}

impl JsonCatalog {
    pub fn load(path: impl AsRef<Path>) -> Result<Self, CatalogError> {
        let path = path.as_ref().to_path_buf();
        let raw = fs::read_to_string(&path).map_err(|source| CatalogError::Read {
            path: path.clone(),
            source,
        })?;
        let items: Vec<CatalogItem> =
            serde_json::from_str(&raw).map_err(|source| CatalogError::Parse {
                path: path.clone(),
                source,
            })?;
        debug!(path = %path.display(), items = items.len(), "Loaded catalog");
        Ok(Self {
            inner: StaticCatalog::new(items),
            path,
        })
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn len(&self) -> usize {
        self.inner.len()
    }

    pub fn is_empty(&self) -> bool {
        self.inner.is_empty()
    }
}

impl Catalog for JsonCatalog {
    fn lookup(&self, item_id: &str) -> Option<CatalogItem> {
        self.inner.lookup(item_id)
    }

    fn query_by_filter(&self, filter: &Filter) -> Vec<String> {
        self.inner.query_by_filter(filter)
    }
}
