//! Jet category labels: top decay topology and QCD hadron flavour.

use std::fmt;

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

/// Label value for jets that were not probed.
pub const NOT_PROBED: i32 = -1;

/// How much of a hadronic top decay a jet contains.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub enum TopCategory {
    /// Unmatched or other.
    Other = 0,
    /// Only the W decay (two light quarks).
    Qq = 1,
    /// b quark plus one quark from the W.
    Bq = 2,
    /// Fully merged top: b quark plus both W quarks.
    Bqq = 3,
}

impl TopCategory {
    /// Integer label written to output columns.
    #[must_use]
    pub fn label(self) -> i32 {
        self as i32
    }

    /// Parses an integer label; `None` for `-1` and unknown values.
    #[must_use]
    pub fn from_label(label: i32) -> Option<Self> {
        match label {
            0 => Some(TopCategory::Other),
            1 => Some(TopCategory::Qq),
            2 => Some(TopCategory::Bq),
            3 => Some(TopCategory::Bqq),
            _ => None,
        }
    }

    /// Dataset name used when splitting samples by category.
    #[must_use]
    pub fn sample_name(self) -> &'static str {
        match self {
            TopCategory::Other => "Top_other",
            TopCategory::Qq => "Top_qq",
            TopCategory::Bq => "Top_bq",
            TopCategory::Bqq => "Top_bqq",
        }
    }
}

impl fmt::Display for TopCategory {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            TopCategory::Other => "other",
            TopCategory::Qq => "qq",
            TopCategory::Bq => "bq",
            TopCategory::Bqq => "bqq",
        };
        f.write_str(name)
    }
}

/// Hadron flavour class of a QCD jet.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub enum QcdFlavour {
    /// No heavy-flavour hadron (`hadronFlavour == 0`).
    Light,
    /// Charm hadron (`hadronFlavour == 4`).
    Charm,
    /// Bottom hadron (`hadronFlavour == 5`).
    Bottom,
}

impl QcdFlavour {
    /// All flavours, in output order.
    pub const ALL: [QcdFlavour; 3] = [QcdFlavour::Light, QcdFlavour::Charm, QcdFlavour::Bottom];

    /// Maps a `hadronFlavour` value; `None` for anything but 0, 4 and 5.
    #[must_use]
    pub fn from_hadron_flavour(flavour: i32) -> Option<Self> {
        match flavour {
            0 => Some(QcdFlavour::Light),
            4 => Some(QcdFlavour::Charm),
            5 => Some(QcdFlavour::Bottom),
            _ => None,
        }
    }

    /// Dataset name used when splitting samples by flavour.
    #[must_use]
    pub fn sample_name(self) -> &'static str {
        match self {
            QcdFlavour::Light => "QCD_light",
            QcdFlavour::Charm => "QCD_c",
            QcdFlavour::Bottom => "QCD_b",
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_labels() {
        assert_eq!(TopCategory::Bqq.label(), 3);
        assert_eq!(TopCategory::from_label(2), Some(TopCategory::Bq));
        assert_eq!(TopCategory::from_label(NOT_PROBED), None);
        assert_eq!(TopCategory::from_label(7), None);
        assert_eq!(TopCategory::Qq.to_string(), "qq");
    }

    #[test]
    fn test_qcd_flavours() {
        assert_eq!(QcdFlavour::from_hadron_flavour(0), Some(QcdFlavour::Light));
        assert_eq!(QcdFlavour::from_hadron_flavour(4), Some(QcdFlavour::Charm));
        assert_eq!(QcdFlavour::from_hadron_flavour(5), Some(QcdFlavour::Bottom));
        assert_eq!(QcdFlavour::from_hadron_flavour(3), None);
        assert_eq!(QcdFlavour::Bottom.sample_name(), "QCD_b");
    }
}
