//! Errors raised while building or validating observations.
//!
//! The decision core assumes a well-formed snapshot. Everything that can be
//! wrong with one is caught here, at the session boundary, so malformed input
//! is rejected before it reaches navigation or decision code.

use thiserror::Error;

/// A snapshot (or a part of it) violates the observation schema.
#[derive(Clone, Debug, PartialEq, Error)]
pub enum SnapshotError {
    #[error("grid has no cells")]
    EmptyGrid,

    #[error("grid row {row} has {found} cells, expected {expected}")]
    RaggedGrid {
        row: usize,
        expected: usize,
        found: usize,
    },

    #[error("cell size must be positive and finite, got {0}")]
    InvalidCellSize(f32),

    #[error("unknown cell code {0}")]
    UnknownCell(u8),

    #[error("unknown cell glyph {0:?}")]
    UnknownGlyph(char),

    #[error("max hp must be positive, got {0}")]
    InvalidMaxHp(f32),

    #[error("non-finite value in {0}")]
    NonFinite(&'static str),
}
