use crate::negotiation::Capabilities;
use crate::runtime::Runtime;
use crate::{Version, names};

pub const VALIDATION_LAYER_NAME: &str = "VK_LAYER_KHRONOS_validation";
pub const DEBUG_UTILS_EXT_NAME: &str = "VK_EXT_debug_utils";
#[cfg(feature = "portability")]
pub const PORTABILITY_ENUMERATION_EXT_NAME: &str = "VK_KHR_portability_enumeration";

/// What the runtime offers before any instance exists.
#[derive(Debug, Clone, Default)]
pub struct SystemInfo {
    pub available_layers: Vec<String>,
    pub available_extensions: Vec<String>,
    pub validation_layers_available: bool,
    pub debug_utils_available: bool,
    pub instance_api_version: Version,
}

/// Effective names the runtime did not list.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Unsupported {
    pub extensions: Vec<String>,
    pub layers: Vec<String>,
}

impl Unsupported {
    pub fn is_empty(&self) -> bool {
        self.extensions.is_empty() && self.layers.is_empty()
    }
}

impl SystemInfo {
    #[cfg_attr(feature = "enable_tracing", tracing::instrument(skip(runtime)))]
    pub fn get_system_info<R: Runtime>(runtime: &R) -> crate::Result<Self> {
        let available_layers = runtime.instance_layers()?;
        let available_extensions = runtime.instance_extensions()?;
        let instance_api_version = runtime.instance_version()?;

        let validation_layers_available = names::contains(&available_layers, VALIDATION_LAYER_NAME);
        let debug_utils_available = names::contains(&available_extensions, DEBUG_UTILS_EXT_NAME);

        #[cfg(feature = "enable_tracing")]
        tracing::trace!(validation_layers_available, debug_utils_available, %instance_api_version);

        Ok(Self {
            available_layers,
            available_extensions,
            validation_layers_available,
            debug_utils_available,
            instance_api_version,
        })
    }

    pub fn is_extension_available(&self, extension: &str) -> bool {
        names::contains(&self.available_extensions, extension)
    }

    pub fn is_layer_available(&self, layer: &str) -> bool {
        names::contains(&self.available_layers, layer)
    }

    /// Warns about every effective name the runtime does not support.
    ///
    /// Nothing is removed; instance creation decides whether the request is
    /// acceptable.
    #[must_use]
    pub fn report_unsupported(&self, capabilities: &Capabilities) -> Unsupported {
        let unsupported = Unsupported {
            extensions: capabilities
                .extensions
                .iter()
                .filter(|extension| !self.is_extension_available(extension))
                .cloned()
                .collect(),
            layers: capabilities
                .layers
                .iter()
                .filter(|layer| !self.is_layer_available(layer))
                .cloned()
                .collect(),
        };

        #[cfg(feature = "enable_tracing")]
        {
            for extension in &unsupported.extensions {
                tracing::warn!("Extension {extension} not supported");
            }
            for layer in &unsupported.layers {
                tracing::warn!("Layer {layer} not supported");
            }
        }

        unsupported
    }
}
