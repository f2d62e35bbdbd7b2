//! Concentration flags of a project and their percentage encoding.

use serde::{Deserialize, Deserializer, Serialize};

/// Percentages in declaration order. Encoded output is always a subsequence
/// of this list.
pub const CONCENTRATION_LEVELS: [u8; 4] = [20, 50, 80, 100];

/// The four independent dilution flags of a project.
///
/// An unset project defaults to full-strength-only testing: `qpc100` is true,
/// the other flags false. A stored `null` reads as the flag's default.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct ConcentrationFlags {
    #[serde(default, deserialize_with = "null_as_unset")]
    pub qpc20: bool,
    #[serde(default, deserialize_with = "null_as_unset")]
    pub qpc50: bool,
    #[serde(default, deserialize_with = "null_as_unset")]
    pub qpc80: bool,
    #[serde(
        default = "full_strength_default",
        deserialize_with = "null_as_full_strength"
    )]
    pub qpc100: bool,
}

impl Default for ConcentrationFlags {
    fn default() -> Self {
        Self {
            qpc20: false,
            qpc50: false,
            qpc80: false,
            qpc100: full_strength_default(),
        }
    }
}

impl ConcentrationFlags {
    pub fn percentages(&self) -> Vec<u8> {
        encode(self.qpc20, self.qpc50, self.qpc80, self.qpc100)
    }
}

fn full_strength_default() -> bool {
    true
}

fn null_as_unset<'de, D: Deserializer<'de>>(deserializer: D) -> Result<bool, D::Error> {
    Ok(Option::<bool>::deserialize(deserializer)?.unwrap_or(false))
}

fn null_as_full_strength<'de, D: Deserializer<'de>>(deserializer: D) -> Result<bool, D::Error> {
    Ok(Option::<bool>::deserialize(deserializer)?.unwrap_or_else(full_strength_default))
}

/// Emit 20, 50, 80, 100 in that order, each gated by its own flag.
pub fn encode(flag20: bool, flag50: bool, flag80: bool, flag100: bool) -> Vec<u8> {
    [flag20, flag50, flag80, flag100]
        .into_iter()
        .zip(CONCENTRATION_LEVELS)
        .filter_map(|(enabled, level)| enabled.then_some(level))
        .collect()
}
