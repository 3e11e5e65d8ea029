//! Test fixtures for site-planner.
//!
//! Provides realistic test data including:
//! - Residential blocks and convenience stores around central Warsaw
//! - Synthetic planar resident clouds with fixed seeds

pub mod warsaw_locations;

pub use warsaw_locations::*;
