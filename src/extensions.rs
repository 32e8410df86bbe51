use crate::DeviceDescriptor;

/// Outcome of checking a device's extensions against the required set.
#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct ExtensionCheck {
    pub missing: Vec<String>,
}

impl ExtensionCheck {
    pub fn is_supported(&self) -> bool {
        self.missing.is_empty()
    }
}

/// Checks `required` against what `device` supports and records the supported
/// ones in [`DeviceDescriptor::enabled_extensions`].
pub fn check_extensions<H, I>(device: &mut DeviceDescriptor<H>, required: I) -> ExtensionCheck
where
    I: IntoIterator,
    I::Item: AsRef<str>,
{
    let mut check = ExtensionCheck::default();

    for name in required {
        let name = name.as_ref();
        if device.supported_extensions.contains(name) {
            device.enabled_extensions.insert(name.to_owned());
        } else if !check.missing.iter().any(|missing| missing == name) {
            check.missing.push(name.to_owned());
        }
    }

    #[cfg(feature = "enable_tracing")]
    {
        if !check.is_supported() {
            tracing::debug!(device = device.name(), missing = ?check.missing, "Device lacks extensions");
        }
    }

    check
}
