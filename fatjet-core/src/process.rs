//! Physics processes and the generator particles their jets are matched to.

use std::fmt;
use std::str::FromStr;

use crate::error::{Error, Result};

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

/// Simulated (or recorded) sample category.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub enum Process {
    /// Fully hadronic top pair production.
    TTto4Q,
    /// Higgs to bottom quarks.
    Hbb,
    /// Hadronic W.
    Wqq,
    /// Hadronic Z.
    Zqq,
    /// QCD multijet background.
    Qcd,
    /// Heavy scalar Y to four quarks.
    Yto4q,
    /// Collision data.
    Data,
    /// Semi-visible jets.
    Svj,
    /// Emerging jets.
    Emj,
}

impl Process {
    /// All known processes.
    pub const ALL: [Process; 9] = [
        Process::TTto4Q,
        Process::Hbb,
        Process::Wqq,
        Process::Zqq,
        Process::Qcd,
        Process::Yto4q,
        Process::Data,
        Process::Svj,
        Process::Emj,
    ];

    /// Canonical process name.
    #[must_use]
    pub fn name(self) -> &'static str {
        match self {
            Process::TTto4Q => "TTto4Q",
            Process::Hbb => "Hbb",
            Process::Wqq => "Wqq",
            Process::Zqq => "Zqq",
            Process::Qcd => "QCD",
            Process::Yto4q => "Yto4q",
            Process::Data => "Data",
            Process::Svj => "SVJ",
            Process::Emj => "EMJ",
        }
    }

    /// Absolute PDG IDs that selected jets must be matched to.
    ///
    /// Empty when the process is selected on kinematics alone.
    #[must_use]
    pub fn match_ids(self) -> &'static [i32] {
        match self {
            Process::TTto4Q | Process::Qcd | Process::Data => &[],
            Process::Hbb => &[25],
            Process::Wqq => &[24],
            Process::Zqq => &[23],
            Process::Yto4q => &[35],
            Process::Svj => &[4_900_111, 4_900_113, 4_900_211, 4_900_213],
            Process::Emj => &[4_900_101, 4_900_113, 4_900_111, 4_900_211, 4_900_213],
        }
    }

    /// True if jets of this process are labelled by top decay topology.
    #[must_use]
    pub fn classifies_top(self) -> bool {
        self == Process::TTto4Q
    }

    /// Resolves a dataset name such as `QCD_HT1000to1500` to its process.
    ///
    /// # Errors
    /// Returns [`Error::UnknownProcess`] if nothing matches.
    pub fn from_sample_name(sample: &str) -> Result<Self> {
        const PATTERNS: [(&str, Process); 7] = [
            ("QCD", Process::Qcd),
            ("WJets", Process::Wqq),
            ("ZJets", Process::Zqq),
            ("GluGluHto2B", Process::Hbb),
            ("JetMet", Process::Data),
            ("SVJ", Process::Svj),
            ("EMJ", Process::Emj),
        ];
        PATTERNS
            .iter()
            .find(|(pattern, _)| sample.contains(pattern))
            .map(|&(_, process)| process)
            .map_or_else(|| sample.parse(), Ok)
    }
}

impl fmt::Display for Process {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for Process {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        Process::ALL
            .into_iter()
            .find(|process| process.name() == s)
            .ok_or_else(|| Error::UnknownProcess(s.to_string()))
    }
}
