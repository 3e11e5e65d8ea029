//! site-planner core
//!
//! Surrogate-guided placement of new store sites over planar resident and
//! store point clouds.

pub mod error;
pub mod traits;
pub mod model;
pub mod projection;
pub mod spatial;
pub mod sobol;
pub mod score;
pub mod surrogate;
pub mod acquisition;
pub mod optimizer;
pub mod solver;
