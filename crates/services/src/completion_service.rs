use std::sync::Arc;

use storage::repository::CompletionRepository;
use track_core::model::{CompletionPercent, CompletionRecord, EvidenceSource, RoleId, UserId};

use crate::error::CompletionServiceError;

/// Storage-backed completion queries for the widget.
#[derive(Clone)]
pub struct CompletionService {
    completions: Arc<dyn CompletionRepository>,
}

impl CompletionService {
    #[must_use]
    pub fn new(completions: Arc<dyn CompletionRepository>) -> Self {
        Self { completions }
    }

    /// Aggregate completion counts for one user.
    ///
    /// A user with no relevant courses yields the zero record; absent data is
    /// not an error.
    ///
    /// # Errors
    ///
    /// Returns `CompletionServiceError::Storage` if repository access fails.
    pub async fn completion_for_user(
        &self,
        user_id: UserId,
        role: RoleId,
        evidence: EvidenceSource,
    ) -> Result<CompletionRecord, CompletionServiceError> {
        let record = self
            .completions
            .completion_counts(user_id, role, evidence)
            .await?;
        Ok(record)
    }

    /// The rounded completion percentage for one user.
    ///
    /// # Errors
    ///
    /// Returns `CompletionServiceError::Storage` if repository access fails.
    pub async fn percent_for_user(
        &self,
        user_id: UserId,
        role: RoleId,
        evidence: EvidenceSource,
    ) -> Result<CompletionPercent, CompletionServiceError> {
        let record = self.completion_for_user(user_id, role, evidence).await?;
        Ok(record.percent_completed())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    use storage::repository::{EnrollmentRepository, InMemoryRepository};
    use track_core::model::{Course, CourseId};
    use track_core::time::fixed_now;

    async fn seeded_repo() -> InMemoryRepository {
        let repo = InMemoryRepository::new();
        for id in 1..=4_u64 {
            let course = Course::new(CourseId::new(id), format!("Course {id}"), true).unwrap();
            repo.upsert_course(&course).await.unwrap();
            repo.assign_role(UserId::new(1), course.id(), RoleId::STUDENT)
                .await
                .unwrap();
        }
        for id in 1..=3_u64 {
            repo.mark_completed(UserId::new(1), CourseId::new(id), Some(fixed_now()))
                .await
                .unwrap();
        }
        repo
    }

    #[tokio::test]
    async fn percent_for_user_rounds_counts() {
        let repo = seeded_repo().await;
        let service = CompletionService::new(Arc::new(repo));

        let percent = service
            .percent_for_user(
                UserId::new(1),
                RoleId::STUDENT,
                EvidenceSource::CompletionTracking,
            )
            .await
            .unwrap();

        assert_eq!(percent.display_value(), 75);
    }

    #[tokio::test]
    async fn absent_data_degrades_to_zero() {
        let service = CompletionService::new(Arc::new(InMemoryRepository::new()));

        let record = service
            .completion_for_user(
                UserId::new(9),
                RoleId::STUDENT,
                EvidenceSource::CompletionTracking,
            )
            .await
            .unwrap();

        assert_eq!(record.total_courses(), 0);
        assert!(record.percent_completed().is_zero());
    }
}
