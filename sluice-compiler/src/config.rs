//! Compiler configuration
//!
//! Settings that shape compiled tasks but come from the deployment rather than
//! from any job: the builder image template, the output capture directory and
//! the portal address used to render task links.

use crate::error::ConfigError;

/// Placeholder substituted with a built-in base image's value
pub const BUILD_OS_PLACEHOLDER: &str = "${BuildOS}";

/// Compiler configuration
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CompilerConfig {
    /// Image reference template for built-in base images
    pub builder_image_template: String,

    /// Directory output-capture lines write declared outputs to
    pub output_dir: String,

    /// Portal base URL (e.g., "http://localhost:8080") used for `TASK_URL`
    pub portal_url: String,
}

impl CompilerConfig {
    /// Creates configuration from environment variables
    ///
    /// Recognised environment variables (all optional):
    /// - SLUICE_BUILDER_IMAGE (default: `sluice/builder:${BuildOS}`)
    /// - SLUICE_OUTPUT_DIR (default: `/workspace/outputs`)
    /// - SLUICE_PORTAL_URL (default: `http://localhost:8080`)
    pub fn from_env() -> Self {
        let defaults = Self::default();

        Self {
            builder_image_template: std::env::var("SLUICE_BUILDER_IMAGE")
                .unwrap_or(defaults.builder_image_template),
            output_dir: std::env::var("SLUICE_OUTPUT_DIR").unwrap_or(defaults.output_dir),
            portal_url: std::env::var("SLUICE_PORTAL_URL").unwrap_or(defaults.portal_url),
        }
    }

    /// Validates the configuration
    pub fn validate(&self) -> Result<(), ConfigError> {
        if !self.builder_image_template.contains(BUILD_OS_PLACEHOLDER) {
            return Err(ConfigError::Invalid(format!(
                "builder_image_template must contain {}",
                BUILD_OS_PLACEHOLDER
            )));
        }

        if self.output_dir.trim().is_empty() {
            return Err(ConfigError::Invalid("output_dir cannot be empty".to_string()));
        }

        if !self.portal_url.starts_with("http://") && !self.portal_url.starts_with("https://") {
            return Err(ConfigError::Invalid(
                "portal_url must start with http:// or https://".to_string(),
            ));
        }

        Ok(())
    }

    /// Renders a built-in base image into a full image reference
    pub fn builder_image(&self, build_os: &str) -> String {
        self.builder_image_template.replace(BUILD_OS_PLACEHOLDER, build_os)
    }
}

impl Default for CompilerConfig {
    fn default() -> Self {
        Self {
            builder_image_template: format!("sluice/builder:{}", BUILD_OS_PLACEHOLDER),
            output_dir: "/workspace/outputs".to_string(),
            portal_url: "http://localhost:8080".to_string(),
        }
    }
}
