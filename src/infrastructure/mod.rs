//! Infrastructure layer - Filesystem, logging and metrics implementations

pub mod artifact;
pub mod dataset;
pub mod logging;
pub mod observability;
pub mod services;
