//! `OrthogonalPath` and child-path decomposition.

use crate::ids::{ChildPathId, PathId};
use crate::types::{ForbiddenDirection, Point};

/// A user-visible path between two endpoints, optionally bent through
/// intermediate bendpoints.
///
/// The router never routes a user path directly: it decomposes the path into
/// one or more [`ChildPath`]s, one per leg between consecutive bendpoints
/// (including the endpoints themselves), solves each leg independently, and
/// recombines the results into `points`.
#[derive(Clone, Debug)]
pub struct OrthogonalPath {
    pub start: Point,
    pub end: Point,
    /// Ordered intermediate points the route must pass through, between
    /// `start` and `end`.
    pub bendpoints: Vec<Point>,
    /// Prohibits spawning trial lines in this direction from `start` -- set by
    /// the embedder, e.g. to keep a route leaving the right side of a shape.
    pub forbidden_direction: ForbiddenDirection,
    /// The last solved route, in order from `start` to `end`. Empty until the
    /// first successful solve.
    pub points: Vec<Point>,
    /// True once any of `start`/`end`/`bendpoints`/`forbidden_direction` has
    /// changed since the last solve.
    pub dirty: bool,
}

impl OrthogonalPath {
    pub fn new(start: Point, end: Point, forbidden_direction: ForbiddenDirection) -> Self {
        Self {
            start,
            end,
            bendpoints: Vec::new(),
            forbidden_direction,
            points: Vec::new(),
            dirty: true,
        }
    }

    /// The ordered sequence of endpoints a decomposition's child paths must
    /// connect: `start`, then every bendpoint, then `end`.
    fn waypoints(&self) -> Vec<Point> {
        let mut out = Vec::with_capacity(self.bendpoints.len() + 2);
        out.push(self.start);
        out.extend_from_slice(&self.bendpoints);
        out.push(self.end);
        out
    }

    /// How many child paths a correct decomposition must hold: one leg per
    /// consecutive waypoint pair.
    fn required_child_count(&self) -> usize {
        self.waypoints().len() - 1
    }

    /// A path with no bend points has exactly one leg and is routed directly
    /// as itself; only a path with at least one bend point decomposes into
    /// real child sub-paths.
    pub fn is_decomposed(&self) -> bool {
        !self.bendpoints.is_empty()
    }
}

/// One leg of a decomposed [`OrthogonalPath`], spanning exactly two
/// consecutive waypoints.
#[derive(Clone, Debug)]
pub struct ChildPath {
    pub start: Point,
    pub end: Point,
    pub forbidden_direction: ForbiddenDirection,
    pub points: Vec<Point>,
    pub dirty: bool,
}

impl ChildPath {
    fn new(start: Point, end: Point) -> Self {
        Self {
            start,
            end,
            forbidden_direction: ForbiddenDirection::None,
            points: Vec::new(),
            dirty: true,
        }
    }
}

/// Grows or shrinks `path`'s child list to match its current waypoints,
/// preserving as much of the previous decomposition as still applies.
///
/// A child whose `start`/`end` still matches its waypoint pair is left alone
/// (including its cached `points` and `dirty` flag); everything else is
/// rebuilt from scratch and marked dirty.
pub fn regenerate(path: &OrthogonalPath, previous: Vec<ChildPath>) -> Vec<ChildPath> {
    let waypoints = path.waypoints();
    let required = path.required_child_count();
    let mut previous = previous.into_iter();

    let mut children = Vec::with_capacity(required);
    for pair in waypoints.windows(2) {
        let (start, end) = (pair[0], pair[1]);
        match previous.next() {
            Some(child) if child.start == start && child.end == end => children.push(child),
            _ => children.push(ChildPath::new(start, end)),
        }
    }
    debug_assert_eq!(children.len(), required, "child decomposition count mismatch for {path:?}");
    children
}

/// Assigns each child's `forbidden_direction` from the terminal direction of
/// the child before it.
///
/// The first child keeps the parent path's own `forbidden_direction`. Every
/// interior child is forbidden from spawning back the way its predecessor's
/// route arrived, which is the compass-opposite of the predecessor's last
/// segment direction.
pub fn refresh_endpoints(path: &OrthogonalPath, children: &mut [ChildPath]) {
    if let Some(first) = children.first_mut() {
        first.forbidden_direction = path.forbidden_direction;
    }
    for i in 1..children.len() {
        let incoming = terminal_direction(&children[i - 1]);
        children[i].forbidden_direction = incoming.map_or(ForbiddenDirection::None, opposite);
    }
}

/// The compass direction of the last segment of a solved child path, or
/// `None` if it hasn't been solved yet or is a single point.
fn terminal_direction(child: &ChildPath) -> Option<ForbiddenDirection> {
    let points = &child.points;
    let last = *points.last()?;
    let prev = *points.get(points.len().checked_sub(2)?)?;
    if last.x == prev.x {
        if last.y > prev.y {
            Some(ForbiddenDirection::Down)
        } else {
            Some(ForbiddenDirection::Up)
        }
    } else if last.x > prev.x {
        Some(ForbiddenDirection::Right)
    } else {
        Some(ForbiddenDirection::Left)
    }
}

fn opposite(direction: ForbiddenDirection) -> ForbiddenDirection {
    match direction {
        ForbiddenDirection::Up => ForbiddenDirection::Down,
        ForbiddenDirection::Down => ForbiddenDirection::Up,
        ForbiddenDirection::Left => ForbiddenDirection::Right,
        ForbiddenDirection::Right => ForbiddenDirection::Left,
        ForbiddenDirection::None => ForbiddenDirection::None,
    }
}

/// Concatenates solved children into a single polyline for the parent path:
/// each child's first point is dropped except for the very first child,
/// since it's the same point as the previous child's last point.
pub fn recombine(children: &[ChildPath]) -> Vec<Point> {
    let mut out = Vec::new();
    for (i, child) in children.iter().enumerate() {
        if child.points.is_empty() {
            continue;
        }
        if i == 0 {
            out.extend_from_slice(&child.points);
        } else {
            out.extend_from_slice(&child.points[1..]);
        }
    }
    out
}

/// Identifies one child of a decomposed path, for callers that need to refer
/// to a specific leg (e.g. error messages, `notify_out_of_bounds`).
pub fn child_path_id(parent: PathId, index: usize) -> ChildPathId {
    ChildPathId { parent, index }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn straight_path_has_one_child() {
        let path = OrthogonalPath::new(Point::new(0, 0), Point::new(100, 0), ForbiddenDirection::None);
        let children = regenerate(&path, Vec::new());
        assert_eq!(children.len(), 1);
        assert_eq!(children[0].start, Point::new(0, 0));
        assert_eq!(children[0].end, Point::new(100, 0));
    }

    #[test]
    fn bendpoints_produce_one_child_per_leg() {
        let mut path = OrthogonalPath::new(Point::new(0, 0), Point::new(100, 100), ForbiddenDirection::None);
        path.bendpoints = vec![Point::new(50, 0), Point::new(50, 100)];
        let children = regenerate(&path, Vec::new());
        assert_eq!(children.len(), 3);
        assert_eq!(children[1].start, Point::new(50, 0));
        assert_eq!(children[1].end, Point::new(50, 100));
    }

    #[test]
    fn regenerate_preserves_unaffected_children() {
        let mut path = OrthogonalPath::new(Point::new(0, 0), Point::new(100, 100), ForbiddenDirection::None);
        path.bendpoints = vec![Point::new(50, 50)];
        let mut previous = regenerate(&path, Vec::new());
        previous[0].points = vec![Point::new(0, 0), Point::new(50, 50)];
        previous[0].dirty = false;

        let children = regenerate(&path, previous);
        assert!(!children[0].dirty);
        assert_eq!(children[0].points, vec![Point::new(0, 0), Point::new(50, 50)]);
        assert!(children[1].dirty);
    }

    #[test]
    fn removing_a_bendpoint_rebuilds_from_that_point_on() {
        let mut path = OrthogonalPath::new(Point::new(0, 0), Point::new(100, 0), ForbiddenDirection::None);
        path.bendpoints = vec![Point::new(50, 0)];
        let previous = regenerate(&path, Vec::new());
        path.bendpoints.clear();
        let children = regenerate(&path, previous);
        assert_eq!(children.len(), 1);
        assert_eq!(children[0].end, Point::new(100, 0));
    }

    #[test]
    fn refresh_endpoints_forbids_backtracking_into_predecessor() {
        let path = OrthogonalPath::new(Point::new(0, 0), Point::new(100, 100), ForbiddenDirection::None);
        let mut children = vec![
            ChildPath::new(Point::new(0, 0), Point::new(50, 0)),
            ChildPath::new(Point::new(50, 0), Point::new(100, 100)),
        ];
        children[0].points = vec![Point::new(0, 0), Point::new(50, 0)];
        refresh_endpoints(&path, &mut children);
        assert_eq!(children[1].forbidden_direction, ForbiddenDirection::Left);
    }

    #[test]
    fn recombine_drops_duplicate_joint_points() {
        let mut a = ChildPath::new(Point::new(0, 0), Point::new(50, 0));
        a.points = vec![Point::new(0, 0), Point::new(50, 0)];
        let mut b = ChildPath::new(Point::new(50, 0), Point::new(50, 100));
        b.points = vec![Point::new(50, 0), Point::new(50, 100)];
        let combined = recombine(&[a, b]);
        assert_eq!(combined, vec![Point::new(0, 0), Point::new(50, 0), Point::new(50, 100)]);
    }
}
