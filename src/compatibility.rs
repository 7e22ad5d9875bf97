use crate::device::DeviceCandidate;
use std::fmt::{Display, Formatter};

/// Device extension every candidate must support.
pub const SWAPCHAIN_EXT_NAME: &str = "VK_KHR_swapchain";

/// A hard requirement a candidate failed to meet.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Requirement {
    Extension(String),
    SurfaceFormat,
    PresentMode,
    GraphicsQueue,
    PresentQueue,
}

impl Display for Requirement {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Requirement::Extension(name) => write!(f, "device extension {name}"),
            Requirement::SurfaceFormat => write!(f, "at least one surface format"),
            Requirement::PresentMode => write!(f, "at least one present mode"),
            Requirement::GraphicsQueue => write!(f, "a graphics queue family"),
            Requirement::PresentQueue => {
                write!(f, "a graphics queue family able to present to the surface")
            }
        }
    }
}

/// Pass/fail checks applied to every enumerated device before picking.
#[derive(Debug, Clone)]
pub struct CompatibilityFilter {
    required_extensions: Vec<String>,
    surface: bool,
}

impl CompatibilityFilter {
    /// `surface` enables the presentation checks.
    pub fn new(surface: bool) -> Self {
        Self {
            required_extensions: vec![SWAPCHAIN_EXT_NAME.to_owned()],
            surface,
        }
    }

    pub fn require_extension(&mut self, extension: impl Into<String>) {
        crate::names::append_if_absent(&mut self.required_extensions, [extension.into()]);
    }

    pub fn required_extensions(&self) -> &[String] {
        &self.required_extensions
    }

    /// Every unmet requirement, in check order.
    pub fn unmet_requirements(&self, candidate: &DeviceCandidate) -> Vec<Requirement> {
        let mut unmet: Vec<Requirement> = self
            .required_extensions
            .iter()
            .filter(|extension| !candidate.supports_extension(extension))
            .map(|extension| Requirement::Extension(extension.clone()))
            .collect();

        if self.surface {
            let support = candidate.surface_support();
            if support.is_none_or(|support| support.formats.is_empty()) {
                unmet.push(Requirement::SurfaceFormat);
            }
            if support.is_none_or(|support| support.present_modes.is_empty()) {
                unmet.push(Requirement::PresentMode);
            }
        }

        if candidate.graphics_queue_family(self.surface).is_none() {
            if candidate.graphics_queue_family(false).is_none() {
                unmet.push(Requirement::GraphicsQueue);
            } else {
                unmet.push(Requirement::PresentQueue);
            }
        }

        unmet
    }

    pub fn is_compatible(&self, candidate: &DeviceCandidate) -> bool {
        let unmet = self.unmet_requirements(candidate);

        #[cfg(feature = "enable_tracing")]
        for requirement in &unmet {
            tracing::info!(
                "{} is not compatible: missing {requirement}",
                candidate.name()
            );
        }

        unmet.is_empty()
    }

    /// Drops incompatible candidates in place, keeping enumeration order.
    /// Returns how many were removed.
    pub fn remove_incompatible(&self, candidates: &mut Vec<DeviceCandidate>) -> usize {
        let before = candidates.len();
        candidates.retain(|candidate| self.is_compatible(candidate));
        let removed = before - candidates.len();

        #[cfg(feature = "enable_tracing")]
        tracing::info!("Removed {removed} incompatible devices");

        removed
    }
}
