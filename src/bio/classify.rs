//! Replicon typing and 4-way class labels from free-text descriptions

use serde::{Deserialize, Serialize};
use std::fmt;

const VIRAL_KEYWORDS: &[&str] = &["phage", "virus", "viral", "bacteriophage"];
const PLASMID_KEYWORD: &str = "plasmid";
const CHROMOSOMAL_KEYWORDS: &[&str] = &["chromosome", "complete genome", "chromosomal"];

/// Dataset category to domain label
pub const CATEGORY_TO_DOMAIN: &[(&str, ClassLabel)] = &[
    ("archaea", ClassLabel::Prokaryote),
    ("bacteria", ClassLabel::Prokaryote),
    ("fungi", ClassLabel::Eukaryote),
    ("protozoa", ClassLabel::Eukaryote),
    ("virus", ClassLabel::Viral),
    ("viral", ClassLabel::Viral),
];

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum RepliconType {
    Viral,
    Plasmid,
    Chromosomal,
    Unknown,
}

impl RepliconType {
    pub fn as_str(&self) -> &'static str {
        match self {
            RepliconType::Viral => "viral",
            RepliconType::Plasmid => "plasmid",
            RepliconType::Chromosomal => "chromosomal",
            RepliconType::Unknown => "unknown",
        }
    }
}

impl fmt::Display for RepliconType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ClassLabel {
    Plasmid,
    Viral,
    Prokaryote,
    Eukaryote,
    Unknown,
}

impl ClassLabel {
    pub fn as_str(&self) -> &'static str {
        match self {
            ClassLabel::Plasmid => "plasmid",
            ClassLabel::Viral => "viral",
            ClassLabel::Prokaryote => "prokaryote",
            ClassLabel::Eukaryote => "eukaryote",
            ClassLabel::Unknown => "unknown",
        }
    }

    pub fn is_unknown(&self) -> bool {
        matches!(self, ClassLabel::Unknown)
    }
}

impl fmt::Display for ClassLabel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Classify a description by keyword. Viral keywords win over `plasmid`,
/// which wins over the chromosomal keywords.
pub fn replicon_type(description: &str) -> RepliconType {
    let d = description.to_lowercase();

    if VIRAL_KEYWORDS.iter().any(|w| d.contains(w)) {
        RepliconType::Viral
    } else if d.contains(PLASMID_KEYWORD) {
        RepliconType::Plasmid
    } else if CHROMOSOMAL_KEYWORDS.iter().any(|w| d.contains(w)) {
        RepliconType::Chromosomal
    } else {
        RepliconType::Unknown
    }
}

/// Domain associated with a dataset category, if the category is mapped
pub fn category_domain(category: &str) -> Option<ClassLabel> {
    let category = category.trim().to_lowercase();
    CATEGORY_TO_DOMAIN
        .iter()
        .find(|(name, _)| *name == category)
        .map(|(_, label)| *label)
}

/// Class for a record whose replicon type is already known
pub fn class_for(category: &str, rtype: RepliconType) -> ClassLabel {
    match rtype {
        RepliconType::Plasmid => ClassLabel::Plasmid,
        RepliconType::Viral => ClassLabel::Viral,
        _ => category_domain(category).unwrap_or(ClassLabel::Unknown),
    }
}

pub fn class_label(category: &str, description: &str) -> ClassLabel {
    class_for(category, replicon_type(description))
}
