mod config;
mod desired;
mod engine;
mod errors;
mod metrics;
mod query;
mod read_model;
mod reconciler;
mod sensor;
mod transport;

pub use config::*;
pub use desired::*;
pub use engine::*;
pub use errors::*;
pub use metrics::*;
pub use query::*;
pub use read_model::*;
pub use reconciler::*;
pub use sensor::*;
pub use transport::*;

//-----------------------------------------------------------
// Test utils

#[cfg(test)]
pub mod test_utils;
//-----------------------------------------------------------
// Autometrics
/// autometrics: https://docs.autometrics.dev/rust/adding-alerts-and-slos
use autometrics::objectives::Objective;
use autometrics::objectives::ObjectiveLatency;
use autometrics::objectives::ObjectivePercentile;
const API_SLO: Objective = Objective::new("api")
    .success_rate(ObjectivePercentile::P99_9)
    .latency(ObjectiveLatency::Ms10, ObjectivePercentile::P99);
