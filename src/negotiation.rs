use crate::ContextConfig;
use crate::names::append_if_absent;
use crate::system_info::{DEBUG_UTILS_EXT_NAME, VALIDATION_LAYER_NAME};
use ash::vk;

/// Extensions, layers and flags actually requested from the runtime.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Capabilities {
    pub extensions: Vec<String>,
    pub layers: Vec<String>,
    pub flags: vk::InstanceCreateFlags,
}

impl Capabilities {
    /// Merges the caller's request with what windowing and diagnostics need.
    ///
    /// `mandated` holds the windowing system's surface extensions; they are
    /// always added.
    pub fn negotiate<S: AsRef<str>>(config: &ContextConfig, mandated: &[S]) -> Self {
        let mut extensions = vec![];
        let mut layers = vec![];

        append_if_absent(&mut extensions, &config.extensions);
        append_if_absent(&mut layers, &config.layers);

        append_if_absent(&mut extensions, mandated);

        if config.diagnostics.enable_diagnostics_channel {
            append_if_absent(&mut extensions, [DEBUG_UTILS_EXT_NAME]);
        }

        if config.diagnostics.enable_validation {
            append_if_absent(&mut layers, [VALIDATION_LAYER_NAME]);
        }

        #[cfg(feature = "portability")]
        append_if_absent(
            &mut extensions,
            [crate::system_info::PORTABILITY_ENUMERATION_EXT_NAME],
        );

        let flags = if cfg!(feature = "portability") {
            vk::InstanceCreateFlags::ENUMERATE_PORTABILITY_KHR
        } else {
            vk::InstanceCreateFlags::empty()
        };

        #[cfg(feature = "enable_tracing")]
        tracing::trace!(?extensions, ?layers, "Negotiated capabilities");

        Self {
            extensions,
            layers,
            flags,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn portable(mut names: Vec<&str>) -> Vec<&str> {
        if cfg!(feature = "portability") {
            names.push("VK_KHR_portability_enumeration");
        }
        names
    }

    #[test]
    fn windowing_names_merge_without_duplicates() {
        let config = ContextConfig::new()
            .enable_extension("A")
            .enable_extension("B");

        let capabilities = Capabilities::negotiate(&config, &["B", "C"]);

        assert_eq!(capabilities.extensions, portable(vec!["A", "B", "C"]));
        assert!(capabilities.layers.is_empty());
    }

    #[test]
    fn diagnostics_add_debug_utils_and_validation() {
        let config = ContextConfig::new()
            .enable_layer("VK_LAYER_custom")
            .enable_validation(true)
            .enable_diagnostics_channel(true);

        let capabilities = Capabilities::negotiate(&config, &["VK_KHR_surface"]);

        assert_eq!(
            capabilities.extensions,
            portable(vec!["VK_KHR_surface", DEBUG_UTILS_EXT_NAME])
        );
        assert_eq!(
            capabilities.layers,
            ["VK_LAYER_custom", VALIDATION_LAYER_NAME]
        );
    }

    #[test]
    fn already_requested_diagnostics_are_not_repeated() {
        let config = ContextConfig::new()
            .enable_extension(DEBUG_UTILS_EXT_NAME)
            .enable_layer(VALIDATION_LAYER_NAME)
            .enable_validation(true)
            .enable_diagnostics_channel(true);

        let capabilities = Capabilities::negotiate(&config, &[DEBUG_UTILS_EXT_NAME]);

        assert_eq!(capabilities.extensions, portable(vec![DEBUG_UTILS_EXT_NAME]));
        assert_eq!(capabilities.layers, [VALIDATION_LAYER_NAME]);
    }

    #[test]
    fn negotiation_is_idempotent_and_leaves_config_alone() {
        let config = ContextConfig::new()
            .enable_extension("A")
            .enable_validation(true);
        let snapshot = config.clone();

        let first = Capabilities::negotiate(&config, &["VK_KHR_surface"]);
        let second = Capabilities::negotiate(&config, &["VK_KHR_surface"]);

        assert_eq!(first, second);
        assert_eq!(config, snapshot);
        assert_eq!(config.extensions(), ["A"]);
    }
}
