pub mod curve;
pub mod metrics;
#[cfg(feature = "server")]
pub mod plot;
pub mod threshold;

pub use curve::Harness;
pub use curve::Point;
pub use curve::Scale;
pub use metrics::Confusion;
pub use threshold::Objective;
pub use threshold::Sweep;
