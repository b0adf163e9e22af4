// SPDX-License-Identifier: MIT

//! The plan, research, draft and critique loop

pub mod checkpoint;
pub mod engine;
pub mod events;
pub mod prompts;
pub mod query;
pub mod stage;
pub mod state;
pub mod steps;
