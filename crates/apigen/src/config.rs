//! Generator configuration (`apigen.toml`).
//!
//! Example:
//! ```toml
//! api_prefix = "Vulkan"
//! type_prefix = "Vk"
//! namespaces = ["gfxrecon"]
//! protect_file = true
//! common_headers = ["format/platform_types.h"]
//! platform_headers = ["<windows.h>"]
//!
//! [blacklist]
//! names = ["vkCreateRayTracingPipelinesNV"]
//! file = "blacklists.json"
//!
//! [platform_types.HWND]
//! win32 = "uint64_t"
//!
//! [consumer]
//! class_name = "VulkanReplayConsumer"
//! is_override = true
//! ```
//!
//! Every section and key is optional.

use crate::compose::{Include, OutputOptions};
use crate::domain::Domain;
use crate::output::{ApiNaming, ConsumerHeaderOptions, DecoderBodyOptions};
use crate::registry::Registry;
use crate::resolver::{Blacklist, PlatformTypeOverrides, Resolver};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use thiserror::Error;

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed to read {}", .path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("invalid config {}", .path.display())]
    Toml {
        path: PathBuf,
        #[source]
        source: toml::de::Error,
    },
    #[error("invalid blacklist {}", .path.display())]
    Blacklist {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },
}

/// `[blacklist]` section.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct BlacklistConfig {
    pub names: Vec<String>,
    /// JSON blacklist in the `{"functions": [...], "structures": [...]}`
    /// shape, relative to the config file.
    pub file: Option<PathBuf>,
}

/// The JSON blacklist document.
#[derive(Debug, Default, Deserialize)]
#[serde(default)]
struct BlacklistFile {
    functions: Vec<String>,
    structures: Vec<String>,
}

/// `[consumer]` section. Unset names default from `api_prefix`.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ConsumerConfig {
    pub class_name: Option<String>,
    pub base_class: Option<String>,
    pub base_class_header: Option<String>,
    pub is_override: bool,
    pub constructor_args: String,
}

/// `[decoder]` section. Unset names default from `api_prefix`.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct DecoderConfig {
    pub class_name: Option<String>,
    pub base_class: Option<String>,
}

/// Root configuration.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct GeneratorConfig {
    pub api_prefix: String,
    pub type_prefix: String,
    pub namespaces: Vec<String>,
    pub protect_file: bool,
    pub protect_feature: bool,
    pub prefix_text: Option<String>,
    /// Headers as written in an `#include`; `<x>` marks a system header.
    pub common_headers: Vec<String>,
    pub extra_headers: Vec<String>,
    pub platform_headers: Vec<String>,
    pub blacklist: BlacklistConfig,
    pub platform_types: PlatformTypeOverrides,
    pub consumer: ConsumerConfig,
    pub decoder: DecoderConfig,
}

impl Default for GeneratorConfig {
    fn default() -> Self {
        let naming = ApiNaming::default();
        Self {
            api_prefix: naming.api_prefix,
            type_prefix: naming.type_prefix,
            namespaces: naming.namespaces,
            protect_file: false,
            protect_feature: true,
            prefix_text: None,
            common_headers: Vec::new(),
            extra_headers: Vec::new(),
            platform_headers: Vec::new(),
            blacklist: BlacklistConfig::default(),
            platform_types: PlatformTypeOverrides::default(),
            consumer: ConsumerConfig::default(),
            decoder: DecoderConfig::default(),
        }
    }
}

impl GeneratorConfig {
    pub fn from_toml_str(text: &str) -> Result<Self, toml::de::Error> {
        toml::from_str(text)
    }

    /// Load a config file, merging the JSON blacklist it points at.
    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        let text = read(path)?;
        let mut config = Self::from_toml_str(&text).map_err(|source| ConfigError::Toml {
            path: path.to_path_buf(),
            source,
        })?;
        if let Some(file) = config.blacklist.file.take() {
            let file = match path.parent() {
                Some(dir) if file.is_relative() => dir.join(file),
                _ => file,
            };
            config.merge_blacklist_file(&file)?;
        }
        tracing::debug!(
            path = %path.display(),
            blacklisted = config.blacklist.names.len(),
            "loaded config"
        );
        Ok(config)
    }

    /// Add the names of a `{"functions": [...], "structures": [...]}` file.
    pub fn merge_blacklist_file(&mut self, path: &Path) -> Result<(), ConfigError> {
        let text = read(path)?;
        let file: BlacklistFile =
            serde_json::from_str(&text).map_err(|source| ConfigError::Blacklist {
                path: path.to_path_buf(),
                source,
            })?;
        self.blacklist
            .names
            .extend(file.functions.into_iter().chain(file.structures));
        Ok(())
    }

    pub fn naming(&self) -> ApiNaming {
        ApiNaming {
            api_prefix: self.api_prefix.clone(),
            type_prefix: self.type_prefix.clone(),
            namespaces: self.namespaces.clone(),
        }
    }

    pub fn blacklist(&self) -> Blacklist {
        Blacklist::new(self.blacklist.names.iter().cloned())
    }

    pub fn platform_overrides(&self) -> PlatformTypeOverrides {
        self.platform_types.clone()
    }

    /// `registry` seen through this config's blacklist and platform types.
    pub fn domain<'r>(&self, registry: &'r Registry) -> Domain<'r> {
        Domain::new(Resolver::new(
            registry,
            self.blacklist(),
            self.platform_overrides(),
        ))
    }

    pub fn output_options(&self) -> OutputOptions {
        let includes = |headers: &[String]| -> Vec<Include> {
            headers.iter().map(|h| Include::parse(h)).collect()
        };
        OutputOptions {
            prefix_text: self.prefix_text.clone(),
            protect_file: self.protect_file,
            protect_feature: self.protect_feature,
            common_headers: includes(&self.common_headers),
            extra_headers: includes(&self.extra_headers),
            platform_headers: includes(&self.platform_headers),
        }
    }

    pub fn consumer_options(&self) -> ConsumerHeaderOptions {
        let mut options = ConsumerHeaderOptions::new(self.naming());
        let c = &self.consumer;
        if let Some(name) = &c.class_name {
            options.class_name = name.clone();
        }
        if let Some(base) = &c.base_class {
            options.base_class = base.clone();
        }
        if let Some(header) = &c.base_class_header {
            options.base_class_header = header.clone();
        }
        options.is_override = c.is_override;
        options.constructor_args = c.constructor_args.clone();
        options
    }

    pub fn decoder_options(&self) -> DecoderBodyOptions {
        let mut options = DecoderBodyOptions::new(self.naming());
        if let Some(name) = &self.decoder.class_name {
            options.class_name = name.clone();
        }
        if let Some(base) = &self.decoder.base_class {
            options.base_class = base.clone();
        }
        options
    }
}

fn read(path: &Path) -> Result<String, ConfigError> {
    std::fs::read_to_string(path).map_err(|source| ConfigError::Io {
        path: path.to_path_buf(),
        source,
    })
}
