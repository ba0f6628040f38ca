use std::fmt;
use std::str::FromStr;

use chrono::{DateTime, Utc};

/// One submitted transcription request. Lives for a single pipeline run and
/// is never persisted.
#[derive(Debug, Clone)]
pub struct TranscriptionJob {
    pub job_id: String,
    pub status: TranscriptionStatus,
    pub created_at: DateTime<Utc>,
}

impl TranscriptionJob {
    pub fn new(job_id: impl Into<String>) -> Self {
        Self {
            job_id: job_id.into(),
            status: TranscriptionStatus::Submitted,
            created_at: Utc::now(),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum TranscriptionStatus {
    Submitted,
    Processing,
    Transcribed,
    Error,
}

impl TranscriptionStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            TranscriptionStatus::Submitted => "SUBMITTED",
            TranscriptionStatus::Processing => "PROCESSING",
            TranscriptionStatus::Transcribed => "TRANSCRIBED",
            TranscriptionStatus::Error => "ERROR",
        }
    }

    pub fn is_terminal(&self) -> bool {
        matches!(
            self,
            TranscriptionStatus::Transcribed | TranscriptionStatus::Error
        )
    }
}

impl FromStr for TranscriptionStatus {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "SUBMITTED" => Ok(TranscriptionStatus::Submitted),
            "PROCESSING" => Ok(TranscriptionStatus::Processing),
            "TRANSCRIBED" => Ok(TranscriptionStatus::Transcribed),
            "ERROR" => Ok(TranscriptionStatus::Error),
            _ => Err(format!("Invalid transcription status: {}", s)),
        }
    }
}

impl fmt::Display for TranscriptionStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}
