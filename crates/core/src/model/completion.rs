use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::model::ids::UserId;

//
// ─── ERRORS ────────────────────────────────────────────────────────────────────
//

#[derive(Debug, Error, Clone, PartialEq, Eq)]
#[non_exhaustive]
pub enum CompletionError {
    #[error("completed courses ({completed}) exceeds total courses ({total})")]
    CountMismatch { completed: u32, total: u32 },
}

//
// ─── POLICY ────────────────────────────────────────────────────────────────────
//

/// Which records count as evidence that a course was completed.
///
/// The underlying data offers two independent signals, and deployments differ
/// on which one they trust. The widget treats the choice as per-instance
/// configuration rather than baking one in.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum EvidenceSource {
    /// Completion-tracking rows that carry a completion timestamp.
    #[default]
    CompletionTracking,
    /// At least one issued certificate, of any kind.
    Certificates,
}

/// The certificate families a course can issue.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CertificateKind {
    Standard,
    Custom,
}

//
// ─── COMPLETION ────────────────────────────────────────────────────────────────
//

/// Aggregate completion counts for one user.
///
/// Invariant: `completed_courses <= total_courses`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CompletionRecord {
    user_id: UserId,
    total_courses: u32,
    completed_courses: u32,
}

impl CompletionRecord {
    /// Build a record from raw counts.
    ///
    /// # Errors
    ///
    /// Returns `CompletionError::CountMismatch` if `completed` exceeds `total`.
    pub fn from_counts(
        user_id: UserId,
        total_courses: u32,
        completed_courses: u32,
    ) -> Result<Self, CompletionError> {
        if completed_courses > total_courses {
            return Err(CompletionError::CountMismatch {
                completed: completed_courses,
                total: total_courses,
            });
        }

        Ok(Self {
            user_id,
            total_courses,
            completed_courses,
        })
    }

    /// The zero record for a user with no relevant courses.
    #[must_use]
    pub fn empty(user_id: UserId) -> Self {
        Self {
            user_id,
            total_courses: 0,
            completed_courses: 0,
        }
    }

    #[must_use]
    pub fn user_id(&self) -> UserId {
        self.user_id
    }

    #[must_use]
    pub fn total_courses(&self) -> u32 {
        self.total_courses
    }

    #[must_use]
    pub fn completed_courses(&self) -> u32 {
        self.completed_courses
    }

    /// The completion percentage for this record.
    #[must_use]
    pub fn percent_completed(&self) -> CompletionPercent {
        CompletionPercent::from_ratio(self.completed_courses, self.total_courses)
    }
}

/// A rounded completion percentage in `[0, 100]`.
#[derive(Debug, Clone, Copy, PartialEq, PartialOrd)]
pub struct CompletionPercent(f64);

impl CompletionPercent {
    /// Compute `round(completed / total * 100)`.
    ///
    /// A zero total yields zero, so a user with no relevant courses renders
    /// an empty bar instead of dividing by zero.
    #[must_use]
    pub fn from_ratio(completed: u32, total: u32) -> Self {
        if total == 0 {
            return Self(0.0);
        }
        Self((f64::from(completed) / f64::from(total) * 100.0).round())
    }

    #[must_use]
    pub fn zero() -> Self {
        Self(0.0)
    }

    #[must_use]
    pub fn value(&self) -> f64 {
        self.0
    }

    /// The integral value used for markup (ARIA value and bar width).
    ///
    /// Always exact: the percentage is already rounded.
    #[must_use]
    #[allow(clippy::cast_possible_truncation, clippy::cast_sign_loss)]
    pub fn display_value(&self) -> u8 {
        self.0 as u8
    }

    #[must_use]
    pub fn is_zero(&self) -> bool {
        self.0 == 0.0
    }
}

//
// ─── TESTS ─────────────────────────────────────────────────────────────────────
//

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn percent_rounds_ratio() {
        let percent = CompletionPercent::from_ratio(3, 4);
        assert_eq!(percent.display_value(), 75);
        assert!((percent.value() - 75.0).abs() < f64::EPSILON);
    }

    #[test]
    fn percent_rounds_up_at_half() {
        // 2/3 = 66.66… -> 67
        assert_eq!(CompletionPercent::from_ratio(2, 3).display_value(), 67);
        // 1/8 = 12.5 -> 13 (round half away from zero)
        assert_eq!(CompletionPercent::from_ratio(1, 8).display_value(), 13);
    }

    #[test]
    fn percent_zero_total_is_zero() {
        let percent = CompletionPercent::from_ratio(0, 0);
        assert!(percent.is_zero());
        assert_eq!(percent.display_value(), 0);
    }

    #[test]
    fn percent_stays_in_bounds() {
        for total in 1..=20_u32 {
            for completed in 0..=total {
                let percent = CompletionPercent::from_ratio(completed, total);
                let expected = (f64::from(completed) / f64::from(total) * 100.0).round();
                assert!((percent.value() - expected).abs() < f64::EPSILON);
                assert!(percent.value() >= 0.0);
                assert!(percent.value() <= 100.0);
            }
        }
    }

    #[test]
    fn record_rejects_completed_over_total() {
        let err = CompletionRecord::from_counts(UserId::new(1), 2, 3).unwrap_err();
        assert_eq!(
            err,
            CompletionError::CountMismatch {
                completed: 3,
                total: 2
            }
        );
    }

    #[test]
    fn record_empty_is_zero_percent() {
        let record = CompletionRecord::empty(UserId::new(7));
        assert_eq!(record.total_courses(), 0);
        assert_eq!(record.completed_courses(), 0);
        assert!(record.percent_completed().is_zero());
    }

    #[test]
    fn record_percent_matches_counts() {
        let record = CompletionRecord::from_counts(UserId::new(1), 4, 3).unwrap();
        assert_eq!(record.percent_completed().display_value(), 75);
    }

    #[test]
    fn evidence_source_defaults_to_completion_tracking() {
        assert_eq!(EvidenceSource::default(), EvidenceSource::CompletionTracking);
    }
}
