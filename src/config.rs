//! Tunable parameters for the router.

use serde::{Deserialize, Serialize};

/// Spawn stride along a trial line's axis, in the same units as [`crate::types::Point`].
pub const STEP_SIZE: i64 = 5;

/// Global per-`solve_path` budget on the number of child trials created.
pub const MAX_LINE_COUNT: u32 = 200_000;

/// Default clearance maintained around every obstacle.
pub const DEFAULT_SPACING: i64 = 15;

/// Compile-time-ish knobs, grouped so a caller can override them per [`crate::Router`]
/// instance without touching the engine's internals.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct RouterConfig {
    /// Minimum clearance kept around obstacles.
    pub spacing: i64,
    /// Spawn stride for trial-line expansion.
    pub step_size: i64,
    /// Hard cap on trial lines created within a single `solve_path` call.
    pub max_line_count: u32,
}

impl Default for RouterConfig {
    fn default() -> Self {
        Self {
            spacing: DEFAULT_SPACING,
            step_size: STEP_SIZE,
            max_line_count: MAX_LINE_COUNT,
        }
    }
}
