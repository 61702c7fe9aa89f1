//! Configuration management for the code generator
//!
//! Supports loading configuration from:
//! - Default values
//! - Config file (codegen.toml)
//! - Environment variables (FAMILIAR_CODEGEN__*)
//!
//! ## Example config file (codegen.toml):
//! ```toml
//! [target]
//! language = "swift"
//! root_namespace = "WeatherClient"
//! models_dir = "Sources/WeatherClient/models"
//!
//! [normalize]
//! synthetic_namespace = "familiar.synthetic"
//! input_suffix = "Input"
//! output_suffix = "Output"
//!
//! [symbols]
//! nullability = "client-optional"
//! reserved_words = ["Result", "Error"]
//!
//! [naming]
//! acronyms = ["ID", "URL"]
//! preserve_screaming_case = true
//! ```

use config_crate::{Config, Environment, File};
use serde::{Deserialize, Serialize};
use std::path::Path;

use crate::codegen::config::{Language, NamingConfig, RenderProfile};
use crate::codegen::nullability::NullabilityMode;
use crate::codegen::symbols::ResolverOptions;
use crate::error::Result;
use crate::graph::NormalizeOptions;

/// Main configuration for a generation run
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct GeneratorConfig {
    /// Target language and output placement
    #[serde(default)]
    pub target: TargetConfig,

    /// Synthetic operation records
    #[serde(default)]
    pub normalize: NormalizeOptions,

    /// Symbol resolution settings
    #[serde(default)]
    pub symbols: SymbolsConfig,

    /// Casing of generated names
    #[serde(default)]
    pub naming: NamingConfig,
}

/// Target configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TargetConfig {
    #[serde(default = "default_language")]
    pub language: Language,

    /// Dot-separated namespace all symbols live under
    #[serde(default = "default_root_namespace")]
    pub root_namespace: String,

    /// Directory declared types are written to
    #[serde(default = "default_models_dir")]
    pub models_dir: String,
}

/// Symbol resolution configuration
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct SymbolsConfig {
    /// Which nullability policy to apply on top of the structural rule
    #[serde(default)]
    pub nullability: NullabilityMode,

    /// Reserved words on top of the language's own
    #[serde(default)]
    pub reserved_words: Vec<String>,

    /// Overrides the language's fallback variant name
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub fallback_variant: Option<String>,
}

// Default value functions
fn default_language() -> Language {
    Language::Swift
}

fn default_root_namespace() -> String {
    "Models".to_string()
}

fn default_models_dir() -> String {
    "Sources/Models".to_string()
}

impl Default for TargetConfig {
    fn default() -> Self {
        Self {
            language: default_language(),
            root_namespace: default_root_namespace(),
            models_dir: default_models_dir(),
        }
    }
}

impl GeneratorConfig {
    /// Load configuration from default locations
    pub fn load() -> Result<Self> {
        Self::load_from(None)
    }

    /// Load configuration, with a specific file layered on top
    pub fn load_from(config_path: Option<&Path>) -> Result<Self> {
        Self::load_with_env(config_path, environment())
    }

    /// Load configuration using the given environment source
    pub fn load_with_env(config_path: Option<&Path>, env: Environment) -> Result<Self> {
        let mut builder = Config::builder();

        // Load from default locations
        let config_locations = ["codegen.toml", ".codegen.toml", "config/codegen.toml"];

        for location in config_locations {
            builder = builder.add_source(File::with_name(location).required(false));
        }

        // Load from XDG config directory
        if let Some(config_dir) = directories::ProjectDirs::from("dev", "familiar", "codegen") {
            let xdg_config = config_dir.config_dir().join("codegen.toml");
            if xdg_config.exists() {
                builder = builder.add_source(File::from(xdg_config).required(false));
            }
        }

        // Load from specified path
        if let Some(path) = config_path {
            builder = builder.add_source(File::from(path.to_path_buf()).required(true));
        }

        builder = builder.add_source(env);

        let config = builder.build()?;
        Ok(config.try_deserialize()?)
    }

    /// Save configuration to a file
    pub fn save(&self, path: &Path) -> Result<()> {
        let content = toml::to_string_pretty(self)
            .map_err(|e| std::io::Error::new(std::io::ErrorKind::InvalidData, e))?;
        std::fs::write(path, content)?;
        Ok(())
    }

    /// Render profile for the target language, with config overrides
    pub fn profile(&self) -> RenderProfile {
        let mut profile = RenderProfile::for_language(self.target.language);
        if let Some(fallback) = &self.symbols.fallback_variant {
            profile.fallback_variant = fallback.clone();
        }
        profile
    }

    pub fn resolver_options(&self) -> ResolverOptions {
        ResolverOptions {
            root_namespace: self.target.root_namespace.clone(),
            models_dir: self.target.models_dir.clone(),
            reserved_words: self.symbols.reserved_words.clone(),
            fallback_variant: self.symbols.fallback_variant.clone(),
            naming: self.naming.clone(),
        }
    }
}

/// Environment variables (FAMILIAR_CODEGEN__SECTION__KEY)
pub fn environment() -> Environment {
    Environment::with_prefix("FAMILIAR_CODEGEN")
        .separator("__")
        .try_parsing(true)
        .list_separator(",")
        .with_list_parse_key("symbols.reserved_words")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config() {
        let config = GeneratorConfig::default();
        assert_eq!(config.target.language, Language::Swift);
        assert_eq!(config.target.root_namespace, "Models");
        assert_eq!(config.normalize.synthetic_namespace, "familiar.synthetic");
        assert_eq!(config.symbols.nullability, NullabilityMode::Structural);
    }

    #[test]
    fn test_serialize_config() {
        let config = GeneratorConfig::default();
        let toml_str = toml::to_string_pretty(&config).unwrap();
        assert!(toml_str.contains("[target]"));
        assert!(toml_str.contains("[normalize]"));
        assert!(toml_str.contains("language = \"swift\""));
    }

    #[test]
    fn test_partial_sections_fall_back_to_defaults() {
        let config: GeneratorConfig = toml::from_str(
            r#"
            [target]
            language = "rust"

            [symbols]
            nullability = "client-optional"
            "#,
        )
        .unwrap();
        assert_eq!(config.target.language, Language::Rust);
        assert_eq!(config.target.models_dir, "Sources/Models");
        assert_eq!(config.symbols.nullability, NullabilityMode::ClientOptional);
        assert_eq!(config.normalize.input_suffix, "Input");
        assert!(config.naming.acronyms.contains("ID"));
    }

    #[test]
    fn test_fallback_override_reaches_profile() {
        let mut config = GeneratorConfig::default();
        config.symbols.fallback_variant = Some("unknownValue".to_string());
        assert_eq!(config.profile().fallback_variant, "unknownValue");
        assert_eq!(config.resolver_options().fallback_variant.as_deref(), Some("unknownValue"));
    }
}
