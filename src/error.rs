//! Scene construction errors.
//!
//! Only construction can fail. Rejected placement samples and malformed
//! trajectory parameters are recovered locally and never reach this type.

use thiserror::Error;

use crate::simulation::agents::AgentKind;

#[derive(Debug, Error)]
pub enum SceneBuildError {
    /// The renderable factory could not produce a transform for an agent.
    #[error("renderable factory returned no handle for {kind:?} #{index}")]
    MissingHandle { kind: AgentKind, index: usize },

    /// A ring zone violates `radius > width / 2 >= 0`.
    #[error("ring zone {index} is malformed (radius {radius}, width {width})")]
    InvalidZone {
        index: usize,
        radius: f64,
        width: f64,
    },

    /// A population entry refers to a ring the zone model does not have.
    #[error("ring zone {0} does not exist")]
    UnknownRing(usize),
}
