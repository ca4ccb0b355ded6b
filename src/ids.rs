use std::fmt;

/// Opaque, non-contiguous identifier for an obstacle rectangle.
#[derive(Clone, Copy, Debug, Eq, Hash, PartialEq, PartialOrd, Ord, serde::Serialize, serde::Deserialize)]
pub struct ObstacleId(pub usize);

impl fmt::Display for ObstacleId {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "Obstacle #{}", self.0)
    }
}

/// Opaque identifier for a user-facing path. Stable across `solve` calls.
#[derive(Clone, Copy, Debug, Eq, Hash, PartialEq, PartialOrd, Ord, serde::Serialize, serde::Deserialize)]
pub struct PathId(pub usize);

impl fmt::Display for PathId {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "Path #{}", self.0)
    }
}

/// Identifier for a child sub-path within a user path's decomposition.
///
/// `index` is the sub-path's position along the bend-point chain: sub-path 0 runs
/// from the user path's `start` to its first bend point (or straight to `end` if
/// there are none).
#[derive(Clone, Copy, Debug, Eq, Hash, PartialEq, PartialOrd, Ord, serde::Serialize, serde::Deserialize)]
pub struct ChildPathId {
    pub parent: PathId,
    pub index: usize,
}

impl fmt::Display for ChildPathId {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "child {} of {}", self.index, self.parent)
    }
}

/// Identifier for a [`TrialLine`](crate::trial_line::TrialLine) within the arena
/// owned by a single `solve_path` invocation. Never persists past that call.
#[derive(Clone, Copy, Debug, Eq, Hash, PartialEq, PartialOrd, Ord)]
pub struct TrialLineId(pub usize);

impl fmt::Display for TrialLineId {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "trial #{}", self.0)
    }
}
