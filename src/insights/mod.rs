//! Clinical-facing layers built on a finished pattern analysis:
//! intervention effectiveness, early-warning indicators and the weekly brief.

mod brief;
mod interventions;
mod messages;
mod predictive;
mod types;

pub use brief::*;
pub use interventions::*;
pub use messages::*;
pub use predictive::*;
pub use types::*;
