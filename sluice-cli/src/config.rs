//! Configuration module
//!
//! Settings shared by every command.

use sluice_compiler::CompilerConfig;
use std::path::PathBuf;

/// CLI configuration
#[derive(Debug, Clone)]
pub struct Config {
    /// Spec store snapshot the compiler resolves definitions from
    pub store_path: PathBuf,
    pub compiler: CompilerConfig,
}
