//! An orthogonal connection router for two-dimensional diagram editors.
//!
//! Given a set of rectangular obstacles and a list of paths (each an
//! ordered pair of endpoints plus optional bend points), [`Router::solve`]
//! computes, for every dirty path, an axis-aligned polyline connecting its
//! endpoints that clears every obstacle by [`RouterConfig::spacing`] and
//! prefers shorter routes over provably-shortest ones.
//!
//! The search engine is an adaptation of the Mikami-Tabuchi line-search
//! algorithm: trial lines are expanded in layers alternately from each
//! path's two endpoints, and a route is formed at the first perpendicular
//! intersection between a source-origin and a target-origin trial.
//!
//! This crate is synchronous and single-threaded: [`Router`] owns all of its
//! state and `solve` is a plain blocking call with no internal concurrency.

#[macro_use]
extern crate anyhow;
#[macro_use]
extern crate log;

pub use self::client_area::{ClientArea, FixedClientArea};
pub use self::config::RouterConfig;
pub use self::ids::{ChildPathId, ObstacleId, PathId, TrialLineId};
pub use self::path::{ChildPath, OrthogonalPath};
pub use self::router::{Router, RoutingStats};
pub use self::types::{Axis, ForbiddenDirection, Point, Rectangle};

mod client_area;
mod config;
mod ids;
mod obstacles;
mod path;
mod router;
mod search;
mod trial_line;
mod types;
