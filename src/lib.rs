//! mission-planner core
//!
//! Plans a single resource-constrained agent mission over precomputed
//! distance/path tables: subset selection, trip replay and a
//! population-based optimizer over visit subsets and orders.

pub mod error;
pub mod traits;
pub mod path;
pub mod tables;
pub mod terrain;
pub mod config;
pub mod state;
pub mod simulate;
pub mod estimate;
pub mod csp;
pub mod genetic;
pub mod optimizer;
pub mod planner;

pub use error::{PlanError, PlanResult};
pub use traits::{NodeId, ResourceTables};
