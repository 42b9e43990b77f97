mod diagnostics;
mod health;
mod metrics;
mod stats;
mod track;

pub use diagnostics::diagnostics_handler;
pub use health::{health_handler, ping_handler, root_handler};
pub use metrics::metrics_handler;
pub use stats::{X_SOURCE, stats_handler};
pub use track::track_handler;
