use ash::vk;
use std::fmt::{Display, Formatter};

/// A `major.minor.patch` triple as understood by Vulkan.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Default)]
pub struct Version {
    pub major: u32,
    pub minor: u32,
    pub patch: u32,
}

impl Display for Version {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}.{}.{}", self.major, self.minor, self.patch)
    }
}

impl Version {
    pub const V1_0_0: Version = Version::new(1, 0, 0);
    pub const V1_1_0: Version = Version::new(1, 1, 0);
    pub const V1_2_0: Version = Version::new(1, 2, 0);
    pub const V1_3_0: Version = Version::new(1, 3, 0);

    pub const fn new(major: u32, minor: u32, patch: u32) -> Self {
        Self {
            major,
            minor,
            patch,
        }
    }

    /// Packs the version with a zero variant.
    pub const fn to_vk(self) -> u32 {
        vk::make_api_version(0, self.major, self.minor, self.patch)
    }
}

impl From<Version> for u32 {
    fn from(version: Version) -> Self {
        version.to_vk()
    }
}

impl From<u32> for Version {
    fn from(version: u32) -> Self {
        Self::new(
            vk::api_version_major(version),
            vk::api_version_minor(version),
            vk::api_version_patch(version),
        )
    }
}
