//! Sluice Core
//!
//! Core types shared by the Sluice job compiler and its tooling.
//!
//! This crate contains:
//! - Domain types: workflows, declared jobs, repositories, stored definitions
//!   and the compiled task graph
//! - DTOs: documents exchanged with callers (workflow definition files)

pub mod domain;
pub mod dto;
