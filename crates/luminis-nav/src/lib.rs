//! Spatial queries on a wrapping (toroidal) tile board.
//!
//! - [`Grid`]: wall mask, wrap-aware distance, neighbours in a fixed direction order.
//! - [`PathFinder`]: deterministic A* with an avoid-set.
//! - [`ProximitySearch`]: breadth-first nearest point matching a predicate.
//! - [`ClusterFinder`]: groups a team's nests into clusters.
//! - [`NavigationTable`]: optional precomputed direction/distance table, loaded from disk.

#![cfg_attr(docsrs, feature(doc_cfg))]
#![forbid(unsafe_code)]

pub mod cache;
pub mod cluster;
pub mod grid;
pub mod navigator;
pub mod path;
pub mod proximity;

pub use cache::{CacheError, NavigationTable};
pub use cluster::{ClusterFinder, NestCluster};
pub use grid::{toroidal_distance, Direction, DirectionOrder, Grid, Point};
pub use navigator::{Navigation, Navigator};
pub use path::PathFinder;
pub use proximity::{DistanceField, ProximitySearch};
