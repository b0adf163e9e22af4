// SPDX-License-Identifier: MIT

//! Multi-day meal plans from an iterative plan, research, draft and
//! critique loop over a language model and a web-search provider.

pub mod adk;
pub mod planner;

pub use adk::error::PlannerError;
pub use planner::workflow::engine::{MealPlanner, RunReport};
pub use planner::workflow::state::WorkflowState;
