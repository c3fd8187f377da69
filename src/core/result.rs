//! The value produced by one detection run.

use serde::{Deserialize, Serialize};

use crate::core::{ContainerFormat, Language};
use crate::error::Result;

/// Best-effort source-language verdict for a single binary.
///
/// Created empty when detection starts, filled by each phase in turn and
/// finalized by the aggregator. `candidate_languages` keeps every hit,
/// duplicates included, in discovery order; repeated hits are what give a
/// language its weight.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DetectionResult {
    pub primary_language: Language,
    pub confidence: f64,
    pub candidate_languages: Vec<Language>,
    pub evidence: Vec<String>,
    pub container_format: ContainerFormat,
    pub platform: String,
}

impl DetectionResult {
    /// Start a result for a container classified by the sniffer.
    pub fn new(container_format: ContainerFormat, platform: impl Into<String>) -> Self {
        Self {
            primary_language: Language::Unknown,
            confidence: 0.0,
            candidate_languages: Vec::new(),
            evidence: Vec::new(),
            container_format,
            platform: platform.into(),
        }
    }

    /// Record one signal supporting `languages`.
    pub fn record(&mut self, languages: &[Language], evidence: impl Into<String>) {
        self.candidate_languages.extend_from_slice(languages);
        self.evidence.push(evidence.into());
    }

    /// Record an evidence entry that names no language (parse failures and
    /// similar).
    pub fn note(&mut self, evidence: impl Into<String>) {
        self.evidence.push(evidence.into());
    }

    /// Number of times `language` appears among the candidates.
    pub fn count(&self, language: Language) -> usize {
        self.candidate_languages
            .iter()
            .filter(|&&l| l == language)
            .count()
    }

    pub fn has_candidates(&self) -> bool {
        !self.candidate_languages.is_empty()
    }

    pub fn to_json(&self) -> Result<String> {
        Ok(serde_json::to_string(self)?)
    }

    pub fn from_json(s: &str) -> Result<Self> {
        Ok(serde_json::from_str(s)?)
    }
}
