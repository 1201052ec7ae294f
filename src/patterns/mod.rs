//! Local pattern recognition over a patient's pain journal.
//!
//! Pipeline: raw entries → cleaner → baseline → daily/weekly trend →
//! {episodes, correlations, QoL patterns, dissonance, lagged correlations}
//! → orchestrator. Every stage is a pure function of its inputs and the
//! configuration; nothing is cached between calls.

mod baseline;
mod cleaner;
mod correlation;
mod engine;
mod episodes;
mod lagged;
mod messages;
mod qol;
mod trend;
mod types;

pub use baseline::*;
pub use cleaner::*;
pub use correlation::*;
pub use engine::*;
pub use episodes::*;
pub use lagged::*;
pub use messages::*;
pub use qol::*;
pub use trend::*;
pub use types::*;
