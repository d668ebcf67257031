//! Run export, import, and catalog compatibility validation

mod export;
mod validate;

pub use export::{export_run, from_json, import_run, to_json, RunExport, EXPORT_VERSION};
pub use validate::{validate, CompatibilityReport};
