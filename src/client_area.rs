//! The graphical figure/viewport the router consumes but never owns.

use crate::ids::PathId;
use crate::types::{Point, Rectangle};

/// What the owning diagram editor exposes about its viewport.
///
/// Implemented by the editor, not the router; the router only ever calls these
/// two methods, treating both as advisory.
pub trait ClientArea {
    /// The finite region within which trial lines may extend.
    fn bounds(&self) -> Rectangle;

    /// Called when `path`'s start or end point lies outside `bounds()` at the
    /// moment of routing. The router proceeds with the route regardless; this
    /// is purely a layout hint for the editor (e.g. "scroll/resize to fit").
    fn notify_out_of_bounds(&self, path: PathId, point: Point) {
        debug!("{path} has an endpoint at {point:?} outside the client area");
    }
}

/// A [`ClientArea`] with a fixed bounding rectangle and no update notification,
/// suitable for tests and for embedders that don't need the hook.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct FixedClientArea {
    bounds: Rectangle,
}

impl FixedClientArea {
    pub fn new(bounds: Rectangle) -> Self {
        Self { bounds }
    }
}

impl ClientArea for FixedClientArea {
    fn bounds(&self) -> Rectangle {
        self.bounds
    }
}
