use std::fmt;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Role played by one pipeline stage
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum StageRole {
    Writer,
    Reviewer,
    ComplianceOfficer,
}

impl StageRole {
    /// Heading used to label this role's output when it is fed forward as
    /// context to later stages
    pub fn label(&self) -> &'static str {
        match self {
            StageRole::Writer => "Creative Content Writer",
            StageRole::Reviewer => "Brand Compliance Reviewer",
            StageRole::ComplianceOfficer => "Legal and Ethics Compliance Officer",
        }
    }

    /// Logical field this role's output maps to in the decomposed outcome
    pub fn field(&self) -> &'static str {
        match self {
            StageRole::Writer => "draft",
            StageRole::Reviewer => "review",
            StageRole::ComplianceOfficer => "verdict",
        }
    }
}

impl fmt::Display for StageRole {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

/// Raw output of one executed stage, immutable once created
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StageResult {
    pub role: StageRole,
    pub raw_text: String,
    pub produced_at: DateTime<Utc>,
}

impl StageResult {
    pub fn new(role: StageRole, raw_text: String) -> Self {
        Self {
            role,
            raw_text,
            produced_at: Utc::now(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_role_field_mapping() {
        assert_eq!(StageRole::Writer.field(), "draft");
        assert_eq!(StageRole::Reviewer.field(), "review");
        assert_eq!(StageRole::ComplianceOfficer.field(), "verdict");
    }

    #[test]
    fn test_role_display_uses_label() {
        assert_eq!(
            StageRole::ComplianceOfficer.to_string(),
            "Legal and Ethics Compliance Officer"
        );
    }
}
