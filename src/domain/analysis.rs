use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

/// Score and short feedback for one evaluation criterion.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CriterionScore {
    pub name: String,
    pub score: f64,
    pub feedback: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct OverallAnalysis {
    pub criteria: Vec<CriterionScore>,
    pub summary: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SpeakerAnalysis {
    pub criteria: Vec<CriterionScore>,
    pub summary: String,
    pub strengths: Vec<String>,
    pub improvements: Vec<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct InteractionAnalysis {
    pub criteria: Vec<CriterionScore>,
    pub summary: String,
    pub recommendations: Vec<String>,
}

/// An evaluation section together with how it was obtained. A degraded
/// section carries the statically defined fallback record instead of a live
/// model response; callers can tell the two apart without consulting error
/// codes.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct AnalysisOutcome<T> {
    #[serde(flatten)]
    pub value: T,
    pub degraded: bool,
}

impl<T> AnalysisOutcome<T> {
    pub fn computed(value: T) -> Self {
        Self {
            value,
            degraded: false,
        }
    }

    pub fn fallback(value: T) -> Self {
        Self {
            value,
            degraded: true,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct AnalysisResult {
    pub overall: AnalysisOutcome<OverallAnalysis>,
    pub speakers: BTreeMap<String, AnalysisOutcome<SpeakerAnalysis>>,
    pub interaction: AnalysisOutcome<InteractionAnalysis>,
}

impl AnalysisResult {
    /// True when at least one section fell back to its default record.
    pub fn is_degraded(&self) -> bool {
        self.overall.degraded
            || self.interaction.degraded
            || self.speakers.values().any(|s| s.degraded)
    }
}
