//! Crate-wide error taxonomy
//!
//! Everything except `Storage` is user-recoverable: regenerate the seed,
//! reduce the requested count, adjust the plan, or obtain the missing
//! catalog content.

use thiserror::Error;

#[derive(Error, Debug)]
pub enum GauntletError {
    /// The seed token does not match the `MAPID-SUFFIX` grammar
    #[error("invalid seed format: {token:?}")]
    InvalidSeedFormat { token: String },

    /// The seed references a mapping this installation does not have.
    /// Surfaced to the user as "invalid seed".
    #[error("unknown seed mapping: {code}")]
    UnknownMapping { code: String },

    /// More items requested than the mapping's universe contains
    #[error("catalog too small: requested {requested}, universe has {available}")]
    InsufficientCatalogSize { requested: usize, available: usize },

    /// The run has no challenge slots
    #[error("run has no challenges")]
    EmptyRun,

    /// The undo history is empty
    #[error("nothing to undo")]
    NothingToUndo,

    /// The local catalog cannot reproduce every referenced mapping
    #[error("incompatible catalog: {} missing item(s)", missing.len())]
    IncompatibleCatalog { missing: Vec<String> },

    /// An imported mapping collides with a local mapping of the same code
    /// but a different universe; overwriting would desynchronize every
    /// existing seed over the local mapping.
    #[error("mapping {code} already exists with a different universe")]
    MappingConflict { code: String },

    /// A catalog item id that does not resolve
    #[error("unknown catalog item: {item_id}")]
    UnknownItem { item_id: String },

    /// A run id that does not resolve
    #[error("unknown run: {run_id}")]
    UnknownRun { run_id: String },

    /// The backing store failed; not user-recoverable
    #[error("storage unavailable: {0}")]
    Storage(#[from] rusqlite::Error),
}

impl GauntletError {
    /// Whether the user can recover by adjusting their input
    pub fn is_recoverable(&self) -> bool {
        !matches!(self, GauntletError::Storage(_))
    }
}

pub type Result<T> = std::result::Result<T, GauntletError>;
