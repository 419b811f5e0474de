//! Site configuration management for `docweave.toml`.
//!
//! # Sections
//!
//! | Section     | Purpose                                          |
//! |-------------|--------------------------------------------------|
//! | `[base]`    | Site metadata (title, root name, language)       |
//! | `[build]`   | Paths, context file, markers, minify, head       |
//!
//! # Example
//!
//! ```toml
//! [base]
//! title = "Quarterly Report"
//!
//! [build]
//! content = "content"
//! output = "public"
//! context = "data.json"
//!
//! [build.head]
//! styles = ["https://cdn.example.com/report.css"]
//! ```

mod base;
mod build;
pub mod defaults;
mod error;

pub use base::BaseConfig;
pub use build::{BuildConfig, HeadConfig, MarkersConfig};
pub use error::ConfigError;

use crate::cli::{Cli, Commands};
use crate::fundsl::Context;
use crate::preprocess::Markers;
use educe::Educe;
use serde::{Deserialize, Serialize};
use std::{
    fs,
    path::{Path, PathBuf},
};

// ============================================================================
// Root Configuration
// ============================================================================

/// Root configuration structure representing docweave.toml
#[derive(Debug, Clone, Educe, Serialize, Deserialize)]
#[educe(Default)]
#[serde(deny_unknown_fields)]
pub struct SiteConfig {
    /// Absolute path to the config file (set after loading)
    #[serde(skip)]
    pub config_path: PathBuf,

    /// Basic site information
    #[serde(default)]
    pub base: BaseConfig,

    /// Build settings
    #[serde(default)]
    pub build: BuildConfig,
}

impl SiteConfig {
    /// Parse configuration from TOML string
    pub fn from_str(content: &str) -> Result<Self, ConfigError> {
        let config: SiteConfig = toml::from_str(content)?;
        Ok(config)
    }

    /// Load configuration from file path
    pub fn from_path(path: &Path) -> Result<Self, ConfigError> {
        let content =
            fs::read_to_string(path).map_err(|err| ConfigError::Io(path.to_path_buf(), err))?;
        Self::from_str(&content)
    }

    /// Get the root directory path
    pub fn get_root(&self) -> &Path {
        self.build.root.as_deref().unwrap_or(Path::new("./"))
    }

    /// Set the root directory path
    pub fn set_root(&mut self, path: &Path) {
        self.build.root = Some(path.to_path_buf())
    }

    /// Update configuration with CLI arguments
    pub fn update_with_cli(&mut self, cli: &Cli) {
        let root = cli
            .root
            .clone()
            .unwrap_or_else(|| self.get_root().to_owned());

        if let Commands::Build { build_args } = &cli.command {
            Self::update_option(&mut self.build.minify, build_args.minify.as_ref());
            Self::update_option(&mut self.build.output, build_args.output.as_ref());
            self.build.clean |= build_args.clean;
        }

        self.update_path_with_root(&root, &cli.config);
    }

    /// Update config option if CLI value is provided
    fn update_option<T: Clone>(config_option: &mut T, cli_option: Option<&T>) {
        if let Some(option) = cli_option {
            *config_option = option.clone();
        }
    }

    /// Update all paths relative to root directory and normalize to absolute paths
    fn update_path_with_root(&mut self, root: &Path, config: &Path) {
        let root = Self::normalize_path(root);
        self.set_root(&root);

        self.config_path = Self::normalize_path(&root.join(config));
        self.build.content = Self::normalize_path(&root.join(&self.build.content));
        self.build.output = Self::normalize_path(&root.join(&self.build.output));
        self.build.assets = Self::normalize_path(&root.join(&self.build.assets));
        if let Some(context) = &self.build.context {
            self.build.context = Some(Self::normalize_path(&root.join(context)));
        }
    }

    /// Normalize a path to absolute, using canonicalize if the path exists
    fn normalize_path(path: &Path) -> PathBuf {
        path.canonicalize().unwrap_or_else(|_| {
            if path.is_absolute() {
                path.to_path_buf()
            } else {
                std::env::current_dir()
                    .map(|cwd| cwd.join(path))
                    .unwrap_or_else(|_| path.to_path_buf())
            }
        })
    }

    /// Check settings that cannot be expressed in the TOML schema.
    pub fn validate(&self) -> Result<(), ConfigError> {
        self.markers()?;

        if let Some(path) = &self.build.context {
            if !path.exists() {
                return Err(ConfigError::Validation(format!(
                    "[build.context] `{}` not found",
                    path.display()
                )));
            }
            if !path.is_file() {
                return Err(ConfigError::Validation(format!(
                    "[build.context] `{}` is not a file",
                    path.display()
                )));
            }
        }

        Ok(())
    }

    /// Fun-dsl span delimiters from `[build.markers]`.
    pub fn markers(&self) -> Result<Markers, ConfigError> {
        let markers = &self.build.markers;
        Markers::new(&markers.start, &markers.end)
            .map_err(|err| ConfigError::Validation(format!("[build.markers] {err}")))
    }

    /// Variables shared by every page, empty when `[build.context]` is unset.
    pub fn load_context(&self) -> Result<Context, ConfigError> {
        match &self.build.context {
            Some(path) => read_context(path),
            None => Ok(Context::new()),
        }
    }
}

/// Read a JSON object into a fun-dsl [`Context`].
pub fn read_context(path: &Path) -> Result<Context, ConfigError> {
    let content =
        fs::read_to_string(path).map_err(|err| ConfigError::Io(path.to_path_buf(), err))?;
    let json = serde_json::from_str(&content)
        .map_err(|err| ConfigError::Json(path.to_path_buf(), err))?;
    Context::from_json(json)
        .map_err(|err| ConfigError::Validation(format!("`{}`: {err}", path.display())))
}

// ============================================================================
// Tests
// ============================================================================
