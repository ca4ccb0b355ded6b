//! The public router surface: obstacle book, path registry, and `solve`.

use std::collections::{BTreeMap, HashSet};

use anyhow::Result;
use serde::Serialize;

use crate::client_area::ClientArea;
use crate::config::RouterConfig;
use crate::ids::{ChildPathId, ObstacleId, PathId};
use crate::obstacles::ObstacleStore;
use crate::path::{self, ChildPath, OrthogonalPath};
use crate::search;
use crate::types::{ForbiddenDirection, Point, Rectangle};

/// Tallies produced by one [`Router::solve`] call, for callers that want to
/// log or surface search cost.
#[derive(Clone, Copy, Debug, Default, Serialize)]
pub struct RoutingStats {
    /// Sum of `lines_considered` across every sub-path solved this pass.
    pub lines_considered: u32,
    /// How many child sub-paths were actually re-solved this pass.
    pub paths_routed: u32,
}

/// Owns every obstacle and path, and drives the line-search engine.
///
/// All state here is private to a single owning thread; see the concurrency
/// notes carried over into [`crate`]'s module docs. Nothing here is `Send`
/// unless `ClientArea` is, since the client area is stored behind a trait
/// object.
pub struct Router {
    config: RouterConfig,
    client_area: Box<dyn ClientArea>,
    obstacles: ObstacleStore,
    user_paths: BTreeMap<PathId, OrthogonalPath>,
    child_paths: BTreeMap<PathId, Vec<ChildPath>>,
    next_path_id: usize,
}

impl Router {
    pub fn new(client_area: Box<dyn ClientArea>) -> Self {
        Self::with_config(client_area, RouterConfig::default())
    }

    pub fn with_config(client_area: Box<dyn ClientArea>, config: RouterConfig) -> Self {
        Self {
            config,
            client_area,
            obstacles: ObstacleStore::new(),
            user_paths: BTreeMap::new(),
            child_paths: BTreeMap::new(),
            next_path_id: 0,
        }
    }

    pub fn config(&self) -> RouterConfig {
        self.config
    }

    pub fn set_client_area(&mut self, client_area: Box<dyn ClientArea>) {
        self.client_area = client_area;
        self.mark_all_dirty();
    }

    /// Overrides the clearance kept around obstacles. Dirties every path,
    /// since every cut decision depends on it.
    pub fn set_spacing(&mut self, spacing: i64) {
        self.config.spacing = spacing;
        self.mark_all_dirty();
    }
}

// Obstacle mutation
impl Router {
    pub fn add_obstacle(&mut self, rect: Rectangle) -> ObstacleId {
        let id = self.obstacles.add(rect);
        self.mark_all_dirty();
        id
    }

    pub fn remove_obstacle(&mut self, id: ObstacleId) -> Result<Rectangle> {
        let rect = self.obstacles.remove(id)?;
        self.mark_all_dirty();
        Ok(rect)
    }

    /// Replaces an obstacle's rectangle in place, dirtying every path (any
    /// path could have been routed around its old position or now need to
    /// route around its new one).
    pub fn update_obstacle(&mut self, id: ObstacleId, new_rect: Rectangle) -> Result<Rectangle> {
        let old = self.obstacles.update(id, new_rect)?;
        self.mark_all_dirty();
        Ok(old)
    }

    pub fn obstacles(&self) -> impl Iterator<Item = (ObstacleId, &Rectangle)> {
        self.obstacles.iter()
    }
}

// Path registration and mutation
impl Router {
    pub fn add_path(&mut self, start: Point, end: Point, forbidden_direction: ForbiddenDirection) -> PathId {
        let id = PathId(self.next_path_id);
        self.next_path_id += 1;
        self.user_paths.insert(id, OrthogonalPath::new(start, end, forbidden_direction));
        self.child_paths.insert(id, Vec::new());
        id
    }

    pub fn remove_path(&mut self, id: PathId) -> Result<OrthogonalPath> {
        self.child_paths.remove(&id);
        self.user_paths.remove(&id).ok_or_else(|| anyhow!("{id} is not in this router"))
    }

    fn path_mut(&mut self, id: PathId) -> Result<&mut OrthogonalPath> {
        self.user_paths.get_mut(&id).ok_or_else(|| anyhow!("{id} is not in this router"))
    }

    pub fn set_endpoints(&mut self, id: PathId, start: Point, end: Point) -> Result<()> {
        let path = self.path_mut(id)?;
        path.start = start;
        path.end = end;
        path.dirty = true;
        Ok(())
    }

    pub fn set_bendpoints(&mut self, id: PathId, bendpoints: Vec<Point>) -> Result<()> {
        let path = self.path_mut(id)?;
        path.bendpoints = bendpoints;
        path.dirty = true;
        Ok(())
    }

    pub fn set_forbidden_direction(&mut self, id: PathId, forbidden_direction: ForbiddenDirection) -> Result<()> {
        let path = self.path_mut(id)?;
        path.forbidden_direction = forbidden_direction;
        path.dirty = true;
        Ok(())
    }

    pub fn mark_dirty(&mut self, id: PathId) -> Result<()> {
        self.path_mut(id)?.dirty = true;
        Ok(())
    }

    pub fn mark_all_dirty(&mut self) {
        for path in self.user_paths.values_mut() {
            path.dirty = true;
        }
    }

    pub fn paths(&self) -> impl Iterator<Item = (PathId, &OrthogonalPath)> {
        self.user_paths.iter().map(|(id, path)| (*id, path))
    }

    pub fn path(&self, id: PathId) -> Result<&OrthogonalPath> {
        self.user_paths.get(&id).ok_or_else(|| anyhow!("{id} is not in this router"))
    }

    /// The current child-path decomposition for a user path, one entry per
    /// leg between consecutive waypoints. Empty until the first `solve`.
    pub fn child_paths(&self, id: PathId) -> Result<&[ChildPath]> {
        self.child_paths.get(&id).map(Vec::as_slice).ok_or_else(|| anyhow!("{id} is not in this router"))
    }
}

// Solve orchestration
impl Router {
    /// Re-routes every dirty path and returns search cost tallies for the
    /// pass.
    ///
    /// Paths are processed in `PathId` order, so earlier paths claim
    /// contested geometry first -- see the concurrency notes on why this
    /// ordering dependence is accepted rather than eliminated.
    pub fn solve(&mut self) -> RoutingStats {
        let mut stats = RoutingStats::default();
        let mut point_set: HashSet<Point> = HashSet::new();
        let mut routed_polylines: Vec<Vec<Point>> = Vec::new();

        let dirty_ids: Vec<PathId> = self.user_paths.iter().filter(|(_, p)| p.dirty).map(|(id, _)| *id).collect();
        debug!("solving {} dirty path(s) out of {}", dirty_ids.len(), self.user_paths.len());

        for id in dirty_ids {
            let path = self.user_paths.get(&id).expect("dirty id came from user_paths");

            let points = if path.is_decomposed() {
                let children = self.child_paths.remove(&id).unwrap_or_default();
                let mut children = path::regenerate(path, children);
                path::refresh_endpoints(path, &mut children);

                for child in children.iter_mut() {
                    let (route, child_stats) = search::solve_path(
                        id,
                        child.start,
                        child.end,
                        true,
                        child.forbidden_direction,
                        &self.obstacles,
                        self.client_area.as_ref(),
                        &self.config,
                        &mut point_set,
                        &routed_polylines,
                    );
                    stats.lines_considered += child_stats.lines_considered;
                    stats.paths_routed += 1;
                    match route {
                        Some(route) => {
                            routed_polylines.push(route.clone());
                            child.points = route;
                        }
                        None => warn!("{id} leg {:?}..{:?} found no route", child.start, child.end),
                    }
                    child.dirty = false;
                }

                let points = path::recombine(&children);
                self.child_paths.insert(id, children);
                points
            } else {
                // No bend points: the user path itself is the sole working
                // sub-path, routed directly with is_child=false so it leaves
                // its attached figure horizontally rather than radiating in
                // both orientations like a real decomposition's children do.
                self.child_paths.insert(id, Vec::new());
                let (route, child_stats) = search::solve_path(
                    id,
                    path.start,
                    path.end,
                    false,
                    path.forbidden_direction,
                    &self.obstacles,
                    self.client_area.as_ref(),
                    &self.config,
                    &mut point_set,
                    &routed_polylines,
                );
                stats.lines_considered += child_stats.lines_considered;
                stats.paths_routed += 1;
                match route {
                    Some(route) => {
                        routed_polylines.push(route.clone());
                        route
                    }
                    None => {
                        warn!("{id} found no route");
                        Vec::new()
                    }
                }
            };

            let path = self.user_paths.get_mut(&id).expect("dirty id came from user_paths");
            path.points = points;
            path.dirty = false;
        }

        stats
    }

    /// The id of a user path's `index`-th child, for embedders that want to
    /// key their own per-leg diagnostics (e.g. highlighting which segment of
    /// a multi-bend path failed to route) off something more specific than
    /// the parent's [`PathId`].
    pub fn child_path_id(&self, parent: PathId, index: usize) -> ChildPathId {
        path::child_path_id(parent, index)
    }
}
