//! Core infrastructure shared by CLI and embedding hosts

mod engine;

pub use engine::GauntletCore;
