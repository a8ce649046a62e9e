// Guideline classification
// Maps a document's path to the clinical guideline corpus it belongs to,
// and provides the shared tag type used by ingestion payloads and
// retrieval filters.

#[cfg(test)]
mod tests;

use std::fmt;

use serde::{Deserialize, Serialize};

/// Closed set of clinical guideline corpora a document can belong to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum GuidelineTag {
    Ada,
    Aha,
    Dash,
    Lipid,
    General,
}

impl GuidelineTag {
    #[inline]
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Ada => "ADA",
            Self::Aha => "AHA",
            Self::Dash => "DASH",
            Self::Lipid => "LIPID",
            Self::General => "GENERAL",
        }
    }
}

impl fmt::Display for GuidelineTag {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Ordered classification rules: first pattern contained in the lowercased
/// path wins. Evaluated top to bottom, so a path matching several rules is
/// tagged by the earliest one.
const CLASSIFICATION_RULES: &[(&[&str], GuidelineTag)] = &[
    (&["heart", "aha"], GuidelineTag::Aha),
    (&["diabetes", "ada"], GuidelineTag::Ada),
    (&["dash"], GuidelineTag::Dash),
    (&["cholesterol", "lipid"], GuidelineTag::Lipid),
];

/// Classify a document path into a guideline tag.
///
/// Case-insensitive substring match over the whole path; paths matching no
/// rule fall back to [`GuidelineTag::General`].
#[inline]
pub fn classify_path(path: &str) -> GuidelineTag {
    let path_lower = path.to_lowercase();

    for (patterns, tag) in CLASSIFICATION_RULES {
        if patterns.iter().any(|p| path_lower.contains(p)) {
            return *tag;
        }
    }

    GuidelineTag::General
}
