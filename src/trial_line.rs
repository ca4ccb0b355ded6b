//! The trial-line data model: construction, obstacle cutting, and intersection
//! tests. This is the core unit the Mikami-Tabuchi search engine (`search.rs`)
//! expands layer by layer.

use crate::config::RouterConfig;
use crate::ids::TrialLineId;
use crate::obstacles::ObstacleStore;
use crate::types::{Axis, ForbiddenDirection, Point, Rectangle};

/// One axis-aligned ray from a parent line, or a seed ray from a path endpoint.
///
/// Immutable after construction except for the `parent` back-link, which is
/// always set at construction time too -- nothing here is mutated once filed
/// into an arena.
#[derive(Clone, Copy, Debug)]
pub struct TrialLine {
    pub from: Point,
    pub vertical: bool,
    pub from_source: bool,
    /// Inclusive lower bound of the valid span, along this line's own axis.
    pub start: i64,
    /// Exclusive upper bound of the valid span, along this line's own axis.
    pub finish: i64,
    /// Sub-range of `[start, finish)` that child trials must not be spawned from.
    pub creation_forbidden: Option<(i64, i64)>,
    pub parent: Option<TrialLineId>,
}

impl TrialLine {
    pub fn axis(&self) -> Axis {
        Axis::from_vertical(self.vertical)
    }

    /// A [`TrialLine`] never has its origin strictly inside an obstacle's
    /// interior (offset 0); construction enforces this by cutting or rejecting.
    fn new(from: Point, vertical: bool, from_source: bool, start: i64, finish: i64, creation_forbidden: Option<(i64, i64)>, parent: Option<TrialLineId>) -> Self {
        Self { from, vertical, from_source, start, finish, creation_forbidden, parent }
    }

    /// Build a seed trial at a path endpoint.
    pub fn seed(
        from: Point,
        vertical: bool,
        from_source: bool,
        forbidden_direction: ForbiddenDirection,
        obstacles: &ObstacleStore,
        client_area: Rectangle,
        config: &RouterConfig,
    ) -> Self {
        let axis = Axis::from_vertical(vertical);

        // Step 1: cut by obstacles, ignoring any that contain the origin.
        let (mut start, mut finish) = cut_by_obstacles(from, axis, config.spacing, obstacles.iter().map(|(_, r)| *r), true);

        // Step 2: default span, clamped to the client area.
        let (lo, hi) = client_area.extent(axis);
        let start = start.get_or_insert(lo);
        let finish = finish.get_or_insert(hi);
        let (start, finish) = (*start, *finish);

        // Step 3: forbidden range, from the origin's own figure and the forbidden direction.
        let own_figure_range = obstacles
            .iter()
            .map(|(_, r)| *r)
            .filter(|r| r.contains(from))
            .map(|r| {
                let (o0, o1) = r.extent(axis);
                (o0 - config.spacing, o1 + config.spacing)
            })
            .reduce(|(a0, a1), (b0, b1)| (a0.min(b0), a1.max(b1)));

        let direction_range = forbidden_direction_range(from, axis, forbidden_direction, start, finish);

        let creation_forbidden = union_ranges(own_figure_range, direction_range);

        TrialLine::new(from, vertical, from_source, start, finish, creation_forbidden, None)
    }

    /// Build a child trial spawned from `parent` at position `i` along the
    /// parent's axis.
    ///
    /// Returns `None` if `i` itself falls inside an obstacle's interior --
    /// unlike a seed line, a child is not exempt from the obstacle
    /// containing its own origin, so the spawn attempt is simply rejected
    /// and the caller moves on to the next scan position.
    pub fn child(parent: &TrialLine, parent_id: TrialLineId, i: i64, obstacles: &ObstacleStore, config: &RouterConfig) -> Option<Self> {
        let vertical = !parent.vertical;
        let from = if vertical { Point::new(i, parent.from.y) } else { Point::new(parent.from.x, i) };
        let axis = Axis::from_vertical(vertical);

        if obstacles.iter().any(|(_, r)| r.contains(from)) {
            // Unlike a seed line, a child line is not exempt from obstacles that
            // contain its own origin: the spawn position itself is inside a figure.
            return None;
        }

        let (start, finish) = cut_by_obstacles(from, axis, config.spacing, obstacles.iter().map(|(_, r)| *r), false);
        // Child lines have no default-span clamp to the client area in the
        // spec; an uncut span would be unbounded, which cannot arise here
        // because the parent's own span is always bounded and `i` is drawn
        // from within it, but we still need concrete numbers to store.
        let start = start.unwrap_or(i64::MIN);
        let finish = finish.unwrap_or(i64::MAX);
        if start > i || finish <= i {
            // The spawn position itself got cut away by an obstacle containing it.
            return None;
        }

        Some(TrialLine::new(from, vertical, parent.from_source, start, finish, None, Some(parent_id)))
    }

    /// Two trials intersect iff they are perpendicular, opposite-polarity, and
    /// each one's origin projects inside the other's valid span.
    pub fn intersects(&self, other: &TrialLine) -> bool {
        if self.vertical == other.vertical {
            return false;
        }
        if self.from_source == other.from_source {
            return false;
        }
        let self_origin_on_other_axis = self.from.coord(other.axis());
        let other_origin_on_self_axis = other.from.coord(self.axis());
        self_origin_on_other_axis >= other.start
            && self_origin_on_other_axis < other.finish
            && other_origin_on_self_axis >= self.start
            && other_origin_on_self_axis < self.finish
    }

    /// The point where `self` and `other` cross, assuming [`Self::intersects`].
    pub fn intersection_point(&self, other: &TrialLine) -> Point {
        if self.vertical {
            Point::new(self.from.x, other.from.y)
        } else {
            Point::new(other.from.x, self.from.y)
        }
    }
}

/// Obstacle cut rule.
///
/// Tightens `start`/`finish` for every obstacle whose transverse band covers
/// `from`. When `starting_line` is true, obstacles that contain `from`
/// (offset 0) are ignored rather than cutting -- the origin is expected to sit
/// inside its own figure.
fn cut_by_obstacles(from: Point, axis: Axis, spacing: i64, obstacles: impl Iterator<Item = Rectangle>, starting_line: bool) -> (Option<i64>, Option<i64>) {
    let a = from.coord(axis);
    let transverse = from.transverse(axis);

    let mut start: Option<i64> = None;
    let mut finish: Option<i64> = None;

    for obstacle in obstacles {
        if starting_line && obstacle.contains(from) {
            continue;
        }
        let (t0, t1) = obstacle.extent(axis.transverse());
        if transverse < t0 - spacing || transverse >= t1 + spacing {
            continue;
        }
        let (o0, o1) = obstacle.extent(axis);
        if a > o1 {
            let bound = o1 + spacing;
            start = Some(start.map_or(bound, |s| s.max(bound)));
        } else if a <= o0 {
            let bound = o0 - spacing;
            finish = Some(finish.map_or(bound, |f| f.min(bound)));
        }
    }

    (start, finish)
}

/// The half-open sub-range a [`ForbiddenDirection`] carves out of `[start, finish)`.
/// Directions that don't match the line's orientation have no effect.
fn forbidden_direction_range(from: Point, axis: Axis, direction: ForbiddenDirection, start: i64, finish: i64) -> Option<(i64, i64)> {
    let a = from.coord(axis);
    match (axis, direction) {
        (Axis::Vertical, ForbiddenDirection::Down) => Some((a, finish)),
        (Axis::Vertical, ForbiddenDirection::Up) => Some((start, a + 1)),
        (Axis::Horizontal, ForbiddenDirection::Left) => Some((start, a + 1)),
        (Axis::Horizontal, ForbiddenDirection::Right) => Some((a, finish)),
        _ => None,
    }
}

fn union_ranges(a: Option<(i64, i64)>, b: Option<(i64, i64)>) -> Option<(i64, i64)> {
    match (a, b) {
        (Some((a0, a1)), Some((b0, b1))) => Some((a0.min(b0), a1.max(b1))),
        (Some(r), None) | (None, Some(r)) => Some(r),
        (None, None) => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn config() -> RouterConfig {
        RouterConfig::default()
    }

    #[test]
    fn seed_with_no_obstacles_spans_client_area() {
        let obstacles = ObstacleStore::new();
        let client_area = Rectangle::new(0, 0, 1000, 1000);
        let line = TrialLine::seed(Point::new(100, 100), false, true, ForbiddenDirection::None, &obstacles, client_area, &config());
        assert_eq!((line.start, line.finish), (0, 1000));
        assert!(line.creation_forbidden.is_none());
    }

    #[test]
    fn seed_ignores_obstacle_containing_origin() {
        let mut obstacles = ObstacleStore::new();
        obstacles.add(Rectangle::new(50, 50, 150, 150));
        let client_area = Rectangle::new(0, 0, 1000, 1000);
        let line = TrialLine::seed(Point::new(100, 100), false, true, ForbiddenDirection::None, &obstacles, client_area, &config());
        // The containing obstacle is ignored for cutting, but does set the forbidden range.
        assert_eq!((line.start, line.finish), (0, 1000));
        let (f0, f1) = line.creation_forbidden.unwrap();
        assert_eq!((f0, f1), (50 - config().spacing, 150 + config().spacing));
    }

    #[test]
    fn seed_is_cut_by_obstacle_on_the_line() {
        let mut obstacles = ObstacleStore::new();
        obstacles.add(Rectangle::new(150, 50, 250, 150));
        let client_area = Rectangle::new(0, 0, 1000, 1000);
        // horizontal seed at y=100 running along x; obstacle blocks x in [150,250) with
        // transverse band covering y=100.
        let line = TrialLine::seed(Point::new(100, 100), false, true, ForbiddenDirection::None, &obstacles, client_area, &config());
        assert_eq!(line.finish, 150 - config().spacing);
    }

    #[test]
    fn forbidden_direction_only_applies_to_matching_orientation() {
        let start = 0;
        let finish = 100;
        let from = Point::new(0, 40);
        assert_eq!(forbidden_direction_range(from, Axis::Vertical, ForbiddenDirection::Down, start, finish), Some((40, 100)));
        assert_eq!(forbidden_direction_range(from, Axis::Horizontal, ForbiddenDirection::Down, start, finish), None);
    }

    #[test]
    fn perpendicular_opposite_polarity_lines_intersect() {
        let mut src = TrialLine::new(Point::new(0, 50), false, true, 0, 100, None, None);
        src.finish = 100;
        let tgt = TrialLine::new(Point::new(30, 0), true, false, 0, 100, None, None);
        assert!(src.intersects(&tgt));
        assert_eq!(src.intersection_point(&tgt), Point::new(30, 50));
    }

    #[test]
    fn same_polarity_lines_never_intersect() {
        let a = TrialLine::new(Point::new(0, 50), false, true, 0, 100, None, None);
        let b = TrialLine::new(Point::new(30, 0), true, true, 0, 100, None, None);
        assert!(!a.intersects(&b));
    }
}
