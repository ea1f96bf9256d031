//! Configuration: element settings and rule sets.
//!
//! ```text
//! TOML / JSON text
//!   ↓ serde (DTO layer)
//! dto types
//!   ↓ validate + convert (warnings go to Diagnostics)
//! Config { Settings snapshot, rule entries }
//! ```

use std::path::{Path, PathBuf};
use std::sync::Arc;

pub mod dto;
pub mod loader;
mod model;

pub use loader::{LoadError, RuleEntry, RuleLevel};
pub use model::{ElementDescriptor, ElementPattern, Mode, Settings, SnapshotId};

use crate::diagnostics::Diagnostics;
use crate::resolver::AliasResolver;

/// Loaded configuration document.
#[derive(Debug, Clone)]
pub struct Config {
    settings: Arc<Settings>,
    preset: Option<String>,
    aliases: Vec<(String, String)>,
    rules: Vec<(String, RuleEntry)>,
}

impl dto::ConfigDto {
    /// Deserializes a TOML document.
    ///
    /// # Errors
    ///
    /// Returns an error if the TOML is invalid or has an unsupported shape.
    pub fn from_toml(content: &str) -> Result<Self, ConfigError> {
        toml::from_str(content).map_err(|e| ConfigError::Parse {
            message: e.to_string(),
        })
    }

    /// Deserializes a JSON document.
    ///
    /// # Errors
    ///
    /// Returns an error if the JSON is invalid or has an unsupported shape.
    pub fn from_json(content: &str) -> Result<Self, ConfigError> {
        serde_json::from_str(content).map_err(|e| ConfigError::Parse {
            message: e.to_string(),
        })
    }

    /// Reads a configuration file (`.json` as JSON, anything else as TOML).
    ///
    /// # Errors
    ///
    /// Returns an error if the file cannot be read or parsed.
    pub fn read(path: &Path) -> Result<Self, ConfigError> {
        let content = std::fs::read_to_string(path).map_err(|e| ConfigError::Io {
            path: path.to_path_buf(),
            source: e,
        })?;
        if path.extension().is_some_and(|ext| ext == "json") {
            Self::from_json(&content)
        } else {
            Self::from_toml(&content)
        }
    }
}

impl Config {
    /// Parses a TOML document; a relative `root` is kept as written.
    ///
    /// # Errors
    ///
    /// Returns an error if the TOML is invalid or a rule matcher pattern fails to compile.
    pub fn parse(content: &str, diagnostics: &mut Diagnostics) -> Result<Self, ConfigError> {
        Self::load(dto::ConfigDto::from_toml(content)?, None, diagnostics)
    }

    /// Parses a JSON document; a relative `root` is kept as written.
    ///
    /// # Errors
    ///
    /// Returns an error if the JSON is invalid or a rule matcher pattern fails to compile.
    pub fn from_json(content: &str, diagnostics: &mut Diagnostics) -> Result<Self, ConfigError> {
        Self::load(dto::ConfigDto::from_json(content)?, None, diagnostics)
    }

    /// Loads a configuration file (`.json` as JSON, anything else as TOML).
    ///
    /// A relative `root` is resolved against the file's directory.
    ///
    /// # Errors
    ///
    /// Returns an error if the file cannot be read, parsed or validated.
    pub fn from_file(path: &Path, diagnostics: &mut Diagnostics) -> Result<Self, ConfigError> {
        Self::load(dto::ConfigDto::read(path)?, path.parent(), diagnostics)
    }

    /// Converts a deserialized document.
    ///
    /// # Errors
    ///
    /// Returns an error if a rule matcher pattern, severity or default fails
    /// validation.
    pub fn load(
        dto: dto::ConfigDto,
        base_dir: Option<&Path>,
        diagnostics: &mut Diagnostics,
    ) -> Result<Self, ConfigError> {
        let root = PathBuf::from(dto.root.as_deref().unwrap_or("."));
        let root = match base_dir {
            Some(dir) if root.is_relative() && !dir.as_os_str().is_empty() => dir.join(root),
            _ => root,
        };
        let aliases = dto.settings.alias.0.clone();
        let settings = loader::load_settings(dto.settings, root, diagnostics);
        let rules = dto
            .rules
            .0
            .into_iter()
            .map(|(name, entry)| {
                let entry = loader::load_rule_entry(&name, entry)?;
                Ok((name, entry))
            })
            .collect::<Result<Vec<_>, LoadError>>()?;

        Ok(Self {
            settings: Arc::new(settings),
            preset: dto.preset,
            aliases,
            rules,
        })
    }

    /// Immutable settings snapshot.
    #[must_use]
    pub fn settings(&self) -> &Arc<Settings> {
        &self.settings
    }

    /// Preset name, when configured.
    #[must_use]
    pub fn preset(&self) -> Option<&str> {
        self.preset.as_deref()
    }

    /// Import aliases in declaration order.
    #[must_use]
    pub fn aliases(&self) -> &[(String, String)] {
        &self.aliases
    }

    /// Rule entries in declaration order.
    #[must_use]
    pub fn rules(&self) -> &[(String, RuleEntry)] {
        &self.rules
    }

    /// Entry for the rule called `name`.
    #[must_use]
    pub fn rule(&self, name: &str) -> Option<&RuleEntry> {
        self.rules
            .iter()
            .find(|(rule, _)| rule == name)
            .map(|(_, entry)| entry)
    }

    /// Resolver honoring the configured aliases.
    #[must_use]
    pub fn resolver(&self) -> AliasResolver {
        self.aliases
            .iter()
            .fold(AliasResolver::new(self.settings.root()), |resolver, (prefix, target)| {
                resolver.with_alias(prefix, target)
            })
    }
}

/// Configuration errors.
#[derive(Debug, thiserror::Error, miette::Diagnostic)]
pub enum ConfigError {
    /// IO error reading config file.
    #[error("Failed to read config file {path}: {source}")]
    #[diagnostic(code(bounds_lint::config::io))]
    Io {
        /// Path that failed to read.
        path: PathBuf,
        /// Underlying IO error.
        source: std::io::Error,
    },

    /// Parse error in config file.
    #[error("Failed to parse config: {message}")]
    #[diagnostic(code(bounds_lint::config::parse))]
    Parse {
        /// Parse error message.
        message: String,
    },

    /// The document parsed but failed validation.
    #[error(transparent)]
    #[diagnostic(transparent)]
    Load(#[from] LoadError),
}
