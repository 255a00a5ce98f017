//! Output backends.
//!
//! Each backend implements [`Backend`](crate::traits::Backend) and is driven
//! by the traversal engine; none of them walks the registry on its own.

pub mod consumer_header;
pub mod decoder_body;
pub mod enum_json_header;
pub mod object_info_table;
pub(crate) mod params;
pub mod struct_handle_mappers;
pub mod struct_handle_wrappers;

pub use consumer_header::{ConsumerHeaderBackend, ConsumerHeaderOptions};
pub use decoder_body::{DecoderBodyBackend, DecoderBodyOptions};
pub use enum_json_header::EnumJsonHeaderBackend;
pub use object_info_table::ObjectInfoTableBackend;
pub use struct_handle_mappers::StructHandleMappersBackend;
pub use struct_handle_wrappers::StructHandleWrappersBackend;

/// API-wide naming shared by all backends.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ApiNaming {
    /// Prefix of generated class and type names (`Vulkan` -> `VulkanDecoder`).
    pub api_prefix: String,
    /// Prefix of registry type names (`Vk` in `VkDevice`).
    pub type_prefix: String,
    /// Outer namespaces every artifact is wrapped in.
    pub namespaces: Vec<String>,
}

impl Default for ApiNaming {
    fn default() -> Self {
        Self {
            api_prefix: "Vulkan".to_string(),
            type_prefix: "Vk".to_string(),
            namespaces: vec!["gfxrecon".to_string()],
        }
    }
}

impl ApiNaming {
    /// Lowercase API name for file and header paths.
    pub fn lower(&self) -> String {
        self.api_prefix.to_lowercase()
    }

    /// `VkDevice` -> `Device`.
    pub fn short_name<'a>(&self, name: &'a str) -> &'a str {
        name.strip_prefix(self.type_prefix.as_str())
            .filter(|rest| !rest.is_empty())
            .unwrap_or(name)
    }

    /// Replay-side info type for a handle: `VkDevice` -> `VulkanDeviceInfo`.
    pub fn handle_info(&self, handle: &str) -> String {
        format!("{}{}Info", self.api_prefix, self.short_name(handle))
    }

    /// The outer namespaces followed by `inner`.
    pub fn namespaces_with(&self, inner: &str) -> Vec<String> {
        let mut namespaces = self.namespaces.clone();
        namespaces.push(inner.to_string());
        namespaces
    }
}

/// `VulkanReplayConsumer` -> `vulkan_replay_consumer`.
pub(crate) fn snake_case(name: &str) -> String {
    let mut out = String::with_capacity(name.len() + 4);
    for (i, c) in name.chars().enumerate() {
        if c.is_ascii_uppercase() {
            if i > 0 {
                out.push('_');
            }
            out.push(c.to_ascii_lowercase());
        } else {
            out.push(c);
        }
    }
    out
}

/// `DescriptorSet` -> `descriptorSet`.
pub(crate) fn lower_first(name: &str) -> String {
    let mut chars = name.chars();
    match chars.next() {
        Some(first) => first.to_ascii_lowercase().to_string() + chars.as_str(),
        None => String::new(),
    }
}
