pub mod config;
pub mod detectors;
pub mod error;
pub mod estimator;
pub mod frame;
pub mod logging;
pub mod overlay;
pub mod session;
pub mod sinks;
