//! Data Transfer Objects
//!
//! Documents exchanged with callers of the compiler. DTOs bundle domain
//! entities into the shapes that are read from and written to files.

pub mod workflow;
