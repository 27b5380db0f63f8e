//! Code-element targets an annotation may be declared on.

use bitflags::bitflags;
use serde::{Deserialize, Serialize};
use std::fmt;

bitflags! {
    /// Bitmask of code-element kinds.
    ///
    /// An empty mask disables target checks entirely.
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
    pub struct Target: u32 {
        const CLASS = 1;
        const METHOD = 2;
        const PROPERTY = 4;
        const ANNOTATION = 8;
        const FUNCTION = 16;
        const ALL = Self::CLASS.bits()
            | Self::METHOD.bits()
            | Self::PROPERTY.bits()
            | Self::ANNOTATION.bits()
            | Self::FUNCTION.bits();
    }
}

/// Names accepted by `@Target`, in the order they are listed in error messages.
pub const TARGET_NAMES: [(&str, Target); 6] = [
    ("CLASS", Target::CLASS),
    ("METHOD", Target::METHOD),
    ("PROPERTY", Target::PROPERTY),
    ("FUNCTION", Target::FUNCTION),
    ("ANNOTATION", Target::ANNOTATION),
    ("ALL", Target::ALL),
];

impl Target {
    /// `ALL`, or a comma-separated list of the set flags.
    pub fn describe(&self) -> String {
        if self.contains(Target::ALL) {
            return "ALL".to_string();
        }
        TARGET_NAMES
            .iter()
            .filter(|(_, target)| *target != Target::ALL && self.contains(*target))
            .map(|(label, _)| *label)
            .collect::<Vec<_>>()
            .join(", ")
    }

    /// Comma-separated list of every accepted target name.
    pub fn available_names() -> String {
        TARGET_NAMES
            .iter()
            .map(|(label, _)| *label)
            .collect::<Vec<_>>()
            .join(", ")
    }
}

impl Default for Target {
    fn default() -> Self {
        Self::empty()
    }
}

impl fmt::Display for Target {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.describe())
    }
}

// Manual serde implementation for Target (bitflags 2.x + serde)
impl Serialize for Target {
    fn serialize<S: serde::Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        self.bits().serialize(serializer)
    }
}

impl<'de> Deserialize<'de> for Target {
    fn deserialize<D: serde::Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let bits = u32::deserialize(deserializer)?;
        Self::from_bits(bits).ok_or_else(|| {
            serde::de::Error::custom(format!("invalid Target bits: {:#04x}", bits))
        })
    }
}
