//! Scenario domain module.
//!
//! Read-only definitions of role-play exercises: type, rubric, and the
//! scripted dialogue (interviews) or flow (presentations) that drives the
//! simulated counterpart.

mod errors;
mod model;

pub use errors::ScenarioError;
pub use model::{
    ApproachFeedback, Criterion, DialogueEntry, FlowStage, Scenario, ScenarioType,
    GENERAL_TRIGGER,
};

#[cfg(test)]
pub(crate) use model::fixtures;
