use ash::vk;
use bitflags::bitflags;
use std::fmt::{Display, Formatter};

bitflags! {
    /// Operation classes a queue family supports, or a queue request needs.
    ///
    /// Bit values match `VkQueueFlagBits` so conversion from the raw flags is a
    /// plain truncation.
    #[derive(Debug, Default, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
    pub struct CapabilityMask: u32 {
        const GRAPHICS = 0x1;
        const COMPUTE = 0x2;
        const TRANSFER = 0x4;
        const SPARSE_BINDING = 0x8;
        const PROTECTED = 0x10;
    }
}

impl CapabilityMask {
    /// `self ⊆ provided`.
    pub fn is_subset_of(self, provided: CapabilityMask) -> bool {
        provided.contains(self)
    }

    /// Number of set flags, used to prefer narrow families over universal ones.
    pub fn flag_count(self) -> u32 {
        self.bits().count_ones()
    }
}

impl From<vk::QueueFlags> for CapabilityMask {
    fn from(flags: vk::QueueFlags) -> Self {
        // Vendor bits such as video decode are dropped.
        CapabilityMask::from_bits_truncate(flags.as_raw())
    }
}

impl From<CapabilityMask> for vk::QueueFlags {
    fn from(mask: CapabilityMask) -> Self {
        vk::QueueFlags::from_raw(mask.bits())
    }
}

impl Display for CapabilityMask {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        if self.is_empty() {
            return f.write_str("(none)");
        }

        let names = [
            (CapabilityMask::GRAPHICS, "Graphics"),
            (CapabilityMask::COMPUTE, "Compute"),
            (CapabilityMask::TRANSFER, "Transfer"),
            (CapabilityMask::SPARSE_BINDING, "SparseBinding"),
            (CapabilityMask::PROTECTED, "Protected"),
        ];

        let mut first = true;
        for (flag, name) in names {
            if self.contains(flag) {
                if !first {
                    f.write_str(" | ")?;
                }
                f.write_str(name)?;
                first = false;
            }
        }

        Ok(())
    }
}
