//! The Mikami-Tabuchi line-search engine: `solve_path` seeds, expands, and
//! traces back a route for one working sub-path.

use std::collections::HashSet;

use crate::client_area::ClientArea;
use crate::config::RouterConfig;
use crate::ids::{PathId, TrialLineId};
use crate::obstacles::ObstacleStore;
use crate::trial_line::TrialLine;
use crate::types::{ForbiddenDirection, Point, Rectangle};

/// The four polarity/orientation buckets a layer is split into.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
enum Bucket {
    SrcVert = 0,
    SrcHoriz = 1,
    TgtVert = 2,
    TgtHoriz = 3,
}

impl Bucket {
    fn of(from_source: bool, vertical: bool) -> Bucket {
        match (from_source, vertical) {
            (true, true) => Bucket::SrcVert,
            (true, false) => Bucket::SrcHoriz,
            (false, true) => Bucket::TgtVert,
            (false, false) => Bucket::TgtHoriz,
        }
    }

    /// The bucket an intersecting line of the opposite polarity must live in,
    /// for a trial of this bucket's polarity/orientation to intersect it.
    fn opposing_perpendicular(self) -> Bucket {
        match self {
            Bucket::SrcVert => Bucket::TgtHoriz,
            Bucket::SrcHoriz => Bucket::TgtVert,
            Bucket::TgtVert => Bucket::SrcHoriz,
            Bucket::TgtHoriz => Bucket::SrcVert,
        }
    }

    fn all() -> [Bucket; 4] {
        [Bucket::SrcVert, Bucket::SrcHoriz, Bucket::TgtVert, Bucket::TgtHoriz]
    }
}

type Layer = [Vec<TrialLineId>; 4];

fn layer_bucket(layer: &Layer, b: Bucket) -> &Vec<TrialLineId> {
    &layer[b as usize]
}

fn layer_bucket_mut(layer: &mut Layer, b: Bucket) -> &mut Vec<TrialLineId> {
    &mut layer[b as usize]
}

/// Tolerance (in the same integer units as [`Point`]) within which a candidate
/// spawn point is considered to already lie on a previously routed polyline.
const COLLISION_TOLERANCE: i64 = 2;

/// How many trial lines this call to `solve_path` created.
#[derive(Default, Clone, Copy, Debug)]
pub struct SearchStats {
    pub lines_considered: u32,
}

/// Shared, mutable scratch state threaded through one `solve_path` expansion.
struct Search<'a> {
    arena: Vec<TrialLine>,
    layers: Vec<Layer>,
    bounds: Rectangle,
    obstacles: &'a ObstacleStore,
    config: &'a RouterConfig,
    point_set: &'a mut HashSet<Point>,
    routed_polylines: &'a [Vec<Point>],
    result: Option<(i64, TrialLineId, TrialLineId, Point)>,
    stats: SearchStats,
}

/// Routes a single working sub-path: a user path with no bend points, or one
/// child of a decomposed user path. Returns `None` only when neither a route
/// nor the budget-exhausted fallback applies (no more expansions possible).
pub fn solve_path(
    path_id: PathId,
    start: Point,
    end: Point,
    is_child: bool,
    forbidden_direction: ForbiddenDirection,
    obstacles: &ObstacleStore,
    client_area: &dyn ClientArea,
    config: &RouterConfig,
    point_set: &mut HashSet<Point>,
    routed_polylines: &[Vec<Point>],
) -> (Option<Vec<Point>>, SearchStats) {
    if start == end {
        return (Some(vec![start, end]), SearchStats::default());
    }

    let bounds = client_area.bounds();
    if !bounds.contains(start) {
        client_area.notify_out_of_bounds(path_id, start);
    }
    if !bounds.contains(end) {
        client_area.notify_out_of_bounds(path_id, end);
    }

    let mut search = Search {
        arena: Vec::new(),
        layers: vec![Default::default()],
        bounds,
        obstacles,
        config,
        point_set,
        routed_polylines,
        result: None,
        stats: SearchStats::default(),
    };

    let src_h = search.push_seed(start, false, true, forbidden_direction);
    let tgt_h = search.push_seed(end, false, false, forbidden_direction);
    layer_bucket_mut(&mut search.layers[0], Bucket::of(true, false)).push(src_h);
    layer_bucket_mut(&mut search.layers[0], Bucket::of(false, false)).push(tgt_h);
    if is_child {
        let src_v = search.push_seed(start, true, true, forbidden_direction);
        let tgt_v = search.push_seed(end, true, false, forbidden_direction);
        layer_bucket_mut(&mut search.layers[0], Bucket::of(true, true)).push(src_v);
        layer_bucket_mut(&mut search.layers[0], Bucket::of(false, true)).push(tgt_v);
    }

    let mut iter = 0usize;
    loop {
        search.layers.push(Default::default());

        for bucket in Bucket::all() {
            let trial_ids: Vec<TrialLineId> = layer_bucket(&search.layers[iter], bucket).clone();
            for t_id in trial_ids {
                if search.spawn_children(t_id, iter + 1) == ScanOutcome::BudgetExceeded {
                    warn!("{path_id} exhausted its line budget ({} lines); falling back to a direct route", search.stats.lines_considered);
                    return (Some(vec![start, end]), search.stats);
                }
            }
        }

        if let Some((_, a_id, b_id, p)) = search.result {
            let route = traceback(&search.arena, a_id, b_id, p, search.point_set);
            return (Some(route), search.stats);
        }

        let spawned_any = search.layers[iter + 1].iter().any(|bucket| !bucket.is_empty());
        if !spawned_any {
            return (None, search.stats);
        }
        iter += 1;
    }
}

/// What a single scanned spawn position, or a whole branch scan, decided.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
enum ScanOutcome {
    /// Keep scanning the remainder of this branch.
    Continue,
    /// An intersection was found and processed (stored as the first result,
    /// or compared against and possibly replacing an existing one) -- stop
    /// scanning this trial's remaining positions. Other trials in the same
    /// layer sweep still run, so a shorter candidate can still replace this
    /// one before the layer finishes.
    Stop,
    BudgetExceeded,
}

impl<'a> Search<'a> {
    fn push_seed(&mut self, from: Point, vertical: bool, from_source: bool, forbidden_direction: ForbiddenDirection) -> TrialLineId {
        let line = TrialLine::seed(from, vertical, from_source, forbidden_direction, self.obstacles, self.bounds, self.config);
        let id = TrialLineId(self.arena.len());
        self.arena.push(line);
        id
    }

    /// Walks both directions away from `t_id`'s origin, spawning perpendicular
    /// children.
    fn spawn_children(&mut self, t_id: TrialLineId, child_layer: usize) -> ScanOutcome {
        let t = self.arena[t_id.0];

        let descend_start = t.creation_forbidden.map(|(fs, _)| fs - 1).unwrap_or_else(|| t.from.coord(t.axis()));
        let ascend_start = t.creation_forbidden.map(|(_, ff)| ff + 1).unwrap_or_else(|| t.from.coord(t.axis()));

        let mut i = descend_start;
        while i >= t.start {
            match self.step(t_id, &t, i, child_layer) {
                ScanOutcome::Continue => {}
                outcome => return outcome,
            }
            i -= self.config.step_size;
        }

        let mut i = ascend_start;
        while i < t.finish {
            match self.step(t_id, &t, i, child_layer) {
                ScanOutcome::Continue => {}
                outcome => return outcome,
            }
            i += self.config.step_size;
        }

        ScanOutcome::Continue
    }

    /// Handles one scanned spawn position.
    fn step(&mut self, t_id: TrialLineId, t: &TrialLine, i: i64, child_layer: usize) -> ScanOutcome {
        self.stats.lines_considered += 1;
        if self.stats.lines_considered > self.config.max_line_count {
            return ScanOutcome::BudgetExceeded;
        }

        let candidate_from = if t.vertical { Point::new(i, t.from.y) } else { Point::new(t.from.x, i) };
        if self.point_set.contains(&candidate_from) || near_any_polyline(candidate_from, self.routed_polylines) {
            return ScanOutcome::Continue;
        }

        let Some(child) = TrialLine::child(t, t_id, i, self.obstacles, self.config) else {
            return ScanOutcome::Continue;
        };

        let child_id = TrialLineId(self.arena.len());
        let child_bucket = Bucket::of(child.from_source, child.vertical);
        self.arena.push(child);
        layer_bucket_mut(&mut self.layers[child_layer], child_bucket).push(child_id);

        let Some(x_id) = self.find_intersection(child_id, child_bucket, child_layer) else {
            return ScanOutcome::Continue;
        };

        let child_line = self.arena[child_id.0];
        let x_line = self.arena[x_id.0];
        let p = child_line.intersection_point(&x_line);
        if self.point_set.contains(&p) {
            return ScanOutcome::Continue;
        }
        let (a_id, b_id) = if child_line.from_source { (child_id, x_id) } else { (x_id, child_id) };
        let length = candidate_length(&self.arena, a_id, b_id, p);
        match self.result {
            None => self.result = Some((length, a_id, b_id, p)),
            Some((best, ..)) if length < best => self.result = Some((length, a_id, b_id, p)),
            _ => {}
        }
        // Found or not, any processed intersection ends this trial's scan.
        ScanOutcome::Stop
    }

    /// Scans layers from most recently spawned (`child_layer`) down to the
    /// seed layer, returning the first trial in the opposing-polarity
    /// perpendicular bucket that actually intersects `child_id`.
    fn find_intersection(&self, child_id: TrialLineId, child_bucket: Bucket, child_layer: usize) -> Option<TrialLineId> {
        let child = &self.arena[child_id.0];
        let target_bucket = child_bucket.opposing_perpendicular();
        for layer_index in (0..=child_layer).rev() {
            for &candidate_id in layer_bucket(&self.layers[layer_index], target_bucket) {
                if candidate_id == child_id {
                    continue;
                }
                let candidate = &self.arena[candidate_id.0];
                if child.intersects(candidate) {
                    return Some(candidate_id);
                }
            }
        }
        None
    }
}

fn near_any_polyline(p: Point, polylines: &[Vec<Point>]) -> bool {
    use itertools::Itertools;
    polylines.iter().any(|line| line.iter().tuple_windows().any(|(&a, &b)| point_near_segment(p, a, b, COLLISION_TOLERANCE)))
}

fn point_near_segment(p: Point, a: Point, b: Point, tol: i64) -> bool {
    if a.y == b.y {
        (p.y - a.y).abs() <= tol && p.x >= a.x.min(b.x) - tol && p.x <= a.x.max(b.x) + tol
    } else {
        (p.x - a.x).abs() <= tol && p.y >= a.y.min(b.y) - tol && p.y <= a.y.max(b.y) + tol
    }
}

fn chain_points_up(arena: &[TrialLine], start_id: TrialLineId) -> Vec<Point> {
    let mut out = Vec::new();
    let mut cur = Some(start_id);
    while let Some(id) = cur {
        let line = &arena[id.0];
        if out.last() != Some(&line.from) {
            out.push(line.from);
        }
        cur = line.parent;
    }
    out
}

fn candidate_length(arena: &[TrialLine], a_id: TrialLineId, b_id: TrialLineId, p: Point) -> i64 {
    use itertools::Itertools;
    let points = build_route(arena, a_id, b_id, p);
    points.into_iter().tuple_windows().map(|(a, b)| (b.x - a.x).abs() + (b.y - a.y).abs()).sum()
}

fn build_route(arena: &[TrialLine], a_id: TrialLineId, b_id: TrialLineId, p: Point) -> Vec<Point> {
    let mut a_chain = chain_points_up(arena, a_id);
    a_chain.reverse();
    let mut out = a_chain;
    if out.last() != Some(&p) {
        out.push(p);
    }
    for point in chain_points_up(arena, b_id) {
        if out.last() != Some(&point) {
            out.push(point);
        }
    }
    out
}

fn traceback(arena: &[TrialLine], a_id: TrialLineId, b_id: TrialLineId, p: Point, point_set: &mut HashSet<Point>) -> Vec<Point> {
    let route = build_route(arena, a_id, b_id, p);
    for point in &route {
        point_set.insert(*point);
    }
    route
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::client_area::FixedClientArea;
    use crate::config::RouterConfig;
    use crate::ids::PathId;
    use crate::obstacles::ObstacleStore;

    #[test]
    fn bucket_opposing_perpendicular_is_its_own_inverse() {
        for b in Bucket::all() {
            assert_eq!(b.opposing_perpendicular().opposing_perpendicular(), b);
        }
    }

    #[test]
    fn point_near_segment_respects_tolerance() {
        let a = Point::new(0, 0);
        let b = Point::new(100, 0);
        assert!(point_near_segment(Point::new(50, 1), a, b, 2));
        assert!(!point_near_segment(Point::new(50, 5), a, b, 2));
        assert!(!point_near_segment(Point::new(150, 0), a, b, 2));
    }

    #[test]
    fn straight_line_solve_needs_no_expansion() {
        let obstacles = ObstacleStore::new();
        let client_area = FixedClientArea::new(Rectangle::new(0, 0, 1000, 1000));
        let config = RouterConfig::default();
        let mut point_set = HashSet::new();
        let (route, stats) = solve_path(
            PathId(0),
            Point::new(100, 100),
            Point::new(300, 100),
            false,
            ForbiddenDirection::None,
            &obstacles,
            &client_area,
            &config,
            &mut point_set,
            &[],
        );
        assert_eq!(route, Some(vec![Point::new(100, 100), Point::new(300, 100)]));
        // One scan from each seed's own side finds the crossing immediately;
        // neither branch needs to expand further.
        assert_eq!(stats.lines_considered, 2);
        assert!(point_set.contains(&Point::new(100, 100)));
        assert!(point_set.contains(&Point::new(300, 100)));
    }

    #[test]
    fn l_shaped_solve_commits_every_vertex_to_point_set() {
        let obstacles = ObstacleStore::new();
        let client_area = FixedClientArea::new(Rectangle::new(0, 0, 1000, 1000));
        let config = RouterConfig::default();
        let mut point_set = HashSet::new();
        let (route, _) = solve_path(
            PathId(0),
            Point::new(100, 100),
            Point::new(300, 200),
            false,
            ForbiddenDirection::None,
            &obstacles,
            &client_area,
            &config,
            &mut point_set,
            &[],
        );
        let route = route.unwrap();
        assert_eq!(route.first(), Some(&Point::new(100, 100)));
        assert_eq!(route.last(), Some(&Point::new(300, 200)));
        for p in &route {
            assert!(point_set.contains(p));
        }
    }
}
