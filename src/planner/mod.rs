// SPDX-License-Identifier: MIT

pub mod config;
pub mod factory;
pub mod search;
pub mod workflow;
