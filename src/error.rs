//! Error types for Mallrow.

use thiserror::Error;

use crate::row::Side;

/// Result type for Mallrow operations
pub type Result<T> = std::result::Result<T, MallError>;

/// Mallrow error types
#[derive(Debug, Error)]
pub enum MallError {
    /// The recipe graph loops back on itself
    #[error("Cyclic recipe: {}", .cycle.join(" -> "))]
    CyclicRecipe { cycle: Vec<String> },

    /// A lane was requested on a side with no empty lane left
    #[error("All ingredient lanes full on {side} side, cannot add {ingredient}")]
    LanesFull { side: Side, ingredient: String },

    /// A recipe was added to a side with no free recipe slot
    #[error("The {side} side is full, cannot add {recipe}")]
    SideFull { side: Side, recipe: String },

    /// A recipe needs more lanes than any side offers
    #[error("Recipe {recipe} needs {required} ingredient lanes but a side only has {capacity}")]
    UnplaceableRecipe {
        recipe: String,
        required: usize,
        capacity: usize,
    },

    /// The selection loop made no progress on a fresh row
    #[error("Layout stalled with {} recipes pending: {}", .pending.len(), .pending.join(", "))]
    Stalled { pending: Vec<String> },

    /// Configuration values are out of range
    #[error("Invalid config: {0}")]
    InvalidConfig(String),

    /// Malformed input data
    #[error("Parse error on line {line}: {message}")]
    Parse { line: usize, message: String },

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("CSV error: {0}")]
    Csv(#[from] csv::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}
