//! String-backed enums shared by several entities.

use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};
use std::fmt;

/// Review status of an exemption application.
///
/// `Pending` is never written by this service; rows carrying it are treated
/// like `Submitted`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, EnumIter, DeriveActiveEnum, Serialize, Deserialize)]
#[sea_orm(rs_type = "String", db_type = "String(StringLen::N(16))")]
pub enum ApplicationStatus {
    /// Received, documents not yet checked
    #[sea_orm(string_value = "Submitted")]
    Submitted,
    /// Legacy waiting state
    #[sea_orm(string_value = "Pending")]
    Pending,
    /// Documents checked by an administrator, decision still outstanding
    #[sea_orm(string_value = "Validated")]
    Validated,
    /// Exemption granted
    #[sea_orm(string_value = "Approved")]
    Approved,
    /// Refused
    #[sea_orm(string_value = "Rejected")]
    Rejected,
}

impl ApplicationStatus {
    /// Statuses that still await a decision.
    pub const OPEN: [Self; 3] = [Self::Submitted, Self::Pending, Self::Validated];

    /// True while the application awaits a decision.
    #[must_use]
    pub const fn is_open(self) -> bool {
        matches!(self, Self::Submitted | Self::Pending | Self::Validated)
    }

    /// Parses the stored/displayed name, e.g. `"Approved"`.
    #[must_use]
    pub fn parse(value: &str) -> Option<Self> {
        Self::try_from_value(&value.to_string()).ok()
    }
}

impl fmt::Display for ApplicationStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.to_value())
    }
}

/// Exemption category a passenger can apply for.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, EnumIter, DeriveActiveEnum, Serialize, Deserialize)]
#[sea_orm(rs_type = "String", db_type = "String(StringLen::N(16))")]
pub enum ExemptionCategory {
    /// Enrolled student
    #[sea_orm(string_value = "Student")]
    Student,
    /// Senior citizen
    #[sea_orm(string_value = "Senior")]
    Senior,
    /// Passenger with a disability
    #[sea_orm(string_value = "Disability")]
    Disability,
    /// Low-income passenger
    #[sea_orm(string_value = "LowIncome")]
    LowIncome,
}

impl ExemptionCategory {
    /// Parses a category name exactly as submitted by the forms.
    #[must_use]
    pub fn parse(value: &str) -> Option<Self> {
        Self::try_from_value(&value.to_string()).ok()
    }
}

impl fmt::Display for ExemptionCategory {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.to_value())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use sea_orm::Iterable;

    #[test]
    fn test_parse_category() {
        assert_eq!(ExemptionCategory::parse("LowIncome"), Some(ExemptionCategory::LowIncome));
        assert_eq!(ExemptionCategory::parse("lowincome"), None);
        assert_eq!(ExemptionCategory::parse("Veteran"), None);
    }

    #[test]
    fn test_open_statuses() {
        assert!(ApplicationStatus::Submitted.is_open());
        assert!(ApplicationStatus::Pending.is_open());
        assert!(ApplicationStatus::Validated.is_open());
        assert!(!ApplicationStatus::Approved.is_open());
        assert!(!ApplicationStatus::Rejected.is_open());
        assert!(ApplicationStatus::OPEN.iter().all(|s| s.is_open()));
    }

    #[test]
    fn test_status_display_round_trips_parse() {
        for status in ApplicationStatus::iter() {
            assert_eq!(ApplicationStatus::parse(&status.to_string()), Some(status));
        }
    }
}
