//! Presentation: read-only frame snapshots and the terminal frontend

pub mod keys;
pub mod snapshot;
pub mod terminal;

pub use keys::KeyTranslator;
pub use snapshot::Snapshot;
pub use terminal::{Canvas, OutputError, TerminalOutput, compose};
