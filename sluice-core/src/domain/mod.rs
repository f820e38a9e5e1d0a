//! Core domain types
//!
//! This module contains the structures shared between the compiler (which
//! produces task graphs) and its callers (which persist jobs and execute tasks).
//! These types carry structure only; all behaviour lives in `sluice-compiler`.

pub mod env;
pub mod job;
pub mod repository;
pub mod store;
pub mod task;
pub mod workflow;
