use ash::vk;
use std::fmt::{Display, Formatter};

/// Packed Vulkan API version as reported in `VkPhysicalDeviceProperties::apiVersion`.
///
/// Ordering compares variant, major, minor and patch in that order, which is
/// what plain integer comparison of the packed value gives.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct Version(u32);

impl Version {
    pub const V1_0_0: Version = Version(vk::API_VERSION_1_0);
    pub const V1_1_0: Version = Version(vk::API_VERSION_1_1);
    pub const V1_2_0: Version = Version(vk::API_VERSION_1_2);
    pub const V1_3_0: Version = Version(vk::API_VERSION_1_3);

    pub fn new(major: u32, minor: u32, patch: u32) -> Self {
        Self(vk::make_api_version(0, major, minor, patch))
    }

    pub fn major(self) -> u32 {
        vk::api_version_major(self.0)
    }

    pub fn minor(self) -> u32 {
        vk::api_version_minor(self.0)
    }

    pub fn patch(self) -> u32 {
        vk::api_version_patch(self.0)
    }
}

impl Default for Version {
    fn default() -> Self {
        Self::V1_0_0
    }
}

impl From<u32> for Version {
    fn from(value: u32) -> Self {
        Self(value)
    }
}

impl From<Version> for u32 {
    fn from(value: Version) -> Self {
        value.0
    }
}

impl Display for Version {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}.{}.{}", self.major(), self.minor(), self.patch())
    }
}

#[cfg(test)]
mod tests {
    use super::Version;

    #[test]
    fn displays_major_minor_patch() {
        assert_eq!(Version::new(1, 3, 268).to_string(), "1.3.268");
    }

    #[test]
    fn orders_by_packed_value() {
        assert!(Version::V1_0_0 < Version::V1_1_0);
        assert!(Version::new(1, 2, 200) < Version::V1_3_0);
        assert_eq!(Version::from(u32::from(Version::V1_2_0)), Version::V1_2_0);
    }

    #[test]
    fn defaults_to_vulkan_1_0() {
        assert_eq!(Version::default().to_string(), "1.0.0");
    }
}
