use async_trait::async_trait;
use chrono::{DateTime, Utc};
use std::collections::{HashMap, HashSet};
use std::sync::{Arc, Mutex, MutexGuard};
use thiserror::Error;
use track_core::model::{
    CertificateKind, CompletionRecord, Course, CourseId, EvidenceSource, RoleId, UserId,
};

/// Errors surfaced by storage adapters.
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum StorageError {
    #[error("not found")]
    NotFound,

    #[error("conflict")]
    Conflict,

    #[error("connection error: {0}")]
    Connection(String),

    #[error("serialization error: {0}")]
    Serialization(String),
}

/// Repository contract for courses and role assignments.
#[async_trait]
pub trait EnrollmentRepository: Send + Sync {
    /// Persist or update a course.
    ///
    /// # Errors
    ///
    /// Returns `StorageError` if the course cannot be stored.
    async fn upsert_course(&self, course: &Course) -> Result<(), StorageError>;

    /// Fetch a course by ID.
    ///
    /// Returns `Ok(None)` when the course does not exist.
    ///
    /// # Errors
    ///
    /// Returns `StorageError` if repository access fails.
    async fn get_course(&self, id: CourseId) -> Result<Option<Course>, StorageError>;

    /// Grant a role to a user within a course. Idempotent.
    ///
    /// # Errors
    ///
    /// Returns `StorageError` if the assignment cannot be stored.
    async fn assign_role(
        &self,
        user_id: UserId,
        course_id: CourseId,
        role: RoleId,
    ) -> Result<(), StorageError>;
}

/// Repository contract for completion evidence and the aggregate count query.
#[async_trait]
pub trait CompletionRepository: Send + Sync {
    /// Record a completion row for a user in a course.
    ///
    /// `completed_at` of `None` models a tracking row that exists before the
    /// course is actually finished; only rows with a timestamp count as
    /// completed.
    ///
    /// # Errors
    ///
    /// Returns `StorageError` if the row cannot be stored.
    async fn mark_completed(
        &self,
        user_id: UserId,
        course_id: CourseId,
        completed_at: Option<DateTime<Utc>>,
    ) -> Result<(), StorageError>;

    /// Record an issued certificate for a user in a course.
    ///
    /// # Errors
    ///
    /// Returns `StorageError` if the row cannot be stored.
    async fn issue_certificate(
        &self,
        user_id: UserId,
        course_id: CourseId,
        kind: CertificateKind,
        issued_at: DateTime<Utc>,
    ) -> Result<(), StorageError>;

    /// Aggregate completion counts for one user.
    ///
    /// `total_courses` counts distinct visible courses where the user holds
    /// `role`; `completed_courses` counts the subset with the configured kind
    /// of completion evidence. A user with no enrollments yields the zero
    /// record.
    ///
    /// # Errors
    ///
    /// Returns `StorageError` if repository access fails or the stored counts
    /// violate the completion invariant.
    async fn completion_counts(
        &self,
        user_id: UserId,
        role: RoleId,
        evidence: EvidenceSource,
    ) -> Result<CompletionRecord, StorageError>;
}

/// Simple in-memory repository implementation for testing and prototyping.
#[derive(Clone, Default)]
pub struct InMemoryRepository {
    courses: Arc<Mutex<HashMap<CourseId, Course>>>,
    roles: Arc<Mutex<HashSet<(UserId, CourseId, RoleId)>>>,
    completions: Arc<Mutex<HashMap<(UserId, CourseId), Option<DateTime<Utc>>>>>,
    certificates: Arc<Mutex<HashMap<(UserId, CourseId), HashSet<CertificateKind>>>>,
}

fn lock<T>(mutex: &Mutex<T>) -> Result<MutexGuard<'_, T>, StorageError> {
    mutex
        .lock()
        .map_err(|e| StorageError::Connection(e.to_string()))
}

fn ser<E: core::fmt::Display>(e: E) -> StorageError {
    StorageError::Serialization(e.to_string())
}

impl InMemoryRepository {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl EnrollmentRepository for InMemoryRepository {
    async fn upsert_course(&self, course: &Course) -> Result<(), StorageError> {
        let mut guard = lock(&self.courses)?;
        guard.insert(course.id(), course.clone());
        Ok(())
    }

    async fn get_course(&self, id: CourseId) -> Result<Option<Course>, StorageError> {
        let guard = lock(&self.courses)?;
        Ok(guard.get(&id).cloned())
    }

    async fn assign_role(
        &self,
        user_id: UserId,
        course_id: CourseId,
        role: RoleId,
    ) -> Result<(), StorageError> {
        let mut guard = lock(&self.roles)?;
        guard.insert((user_id, course_id, role));
        Ok(())
    }
}

#[async_trait]
impl CompletionRepository for InMemoryRepository {
    async fn mark_completed(
        &self,
        user_id: UserId,
        course_id: CourseId,
        completed_at: Option<DateTime<Utc>>,
    ) -> Result<(), StorageError> {
        let mut guard = lock(&self.completions)?;
        guard.insert((user_id, course_id), completed_at);
        Ok(())
    }

    async fn issue_certificate(
        &self,
        user_id: UserId,
        course_id: CourseId,
        kind: CertificateKind,
        _issued_at: DateTime<Utc>,
    ) -> Result<(), StorageError> {
        let mut guard = lock(&self.certificates)?;
        guard.entry((user_id, course_id)).or_default().insert(kind);
        Ok(())
    }

    async fn completion_counts(
        &self,
        user_id: UserId,
        role: RoleId,
        evidence: EvidenceSource,
    ) -> Result<CompletionRecord, StorageError> {
        let courses = lock(&self.courses)?;
        let roles = lock(&self.roles)?;
        let completions = lock(&self.completions)?;
        let certificates = lock(&self.certificates)?;

        let mut total = 0_u32;
        let mut completed = 0_u32;

        for (user, course_id, assigned_role) in roles.iter() {
            if *user != user_id || *assigned_role != role {
                continue;
            }
            let Some(course) = courses.get(course_id) else {
                continue;
            };
            if !course.visible() {
                continue;
            }

            total = total.saturating_add(1);

            let is_completed = match evidence {
                EvidenceSource::CompletionTracking => completions
                    .get(&(user_id, *course_id))
                    .is_some_and(Option::is_some),
                EvidenceSource::Certificates => certificates
                    .get(&(user_id, *course_id))
                    .is_some_and(|kinds| !kinds.is_empty()),
            };
            if is_completed {
                completed = completed.saturating_add(1);
            }
        }

        CompletionRecord::from_counts(user_id, total, completed).map_err(ser)
    }
}

/// Aggregates repositories behind trait objects for easy backend swapping.
#[derive(Clone)]
pub struct Storage {
    pub enrollments: Arc<dyn EnrollmentRepository>,
    pub completions: Arc<dyn CompletionRepository>,
}

impl Storage {
    #[must_use]
    pub fn in_memory() -> Self {
        let repo = InMemoryRepository::new();
        let enrollments: Arc<dyn EnrollmentRepository> = Arc::new(repo.clone());
        let completions: Arc<dyn CompletionRepository> = Arc::new(repo);
        Self {
            enrollments,
            completions,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use track_core::time::fixed_now;

    fn build_course(id: u64, visible: bool) -> Course {
        Course::new(CourseId::new(id), format!("Course {id}"), visible).unwrap()
    }

    async fn enroll(repo: &InMemoryRepository, user: UserId, course: &Course) {
        repo.upsert_course(course).await.unwrap();
        repo.assign_role(user, course.id(), RoleId::STUDENT)
            .await
            .unwrap();
    }

    #[tokio::test]
    async fn counts_completed_against_enrolled() {
        let repo = InMemoryRepository::new();
        let user = UserId::new(1);

        for id in 1..=4 {
            enroll(&repo, user, &build_course(id, true)).await;
        }
        for id in 1..=3 {
            repo.mark_completed(user, CourseId::new(id), Some(fixed_now()))
                .await
                .unwrap();
        }
        // A tracking row without a timestamp is not a completion.
        repo.mark_completed(user, CourseId::new(4), None)
            .await
            .unwrap();

        let record = repo
            .completion_counts(user, RoleId::STUDENT, EvidenceSource::CompletionTracking)
            .await
            .unwrap();

        assert_eq!(record.total_courses(), 4);
        assert_eq!(record.completed_courses(), 3);
        assert_eq!(record.percent_completed().display_value(), 75);
    }

    #[tokio::test]
    async fn unknown_user_yields_zero_record() {
        let repo = InMemoryRepository::new();
        enroll(&repo, UserId::new(1), &build_course(1, true)).await;

        let record = repo
            .completion_counts(
                UserId::new(99),
                RoleId::STUDENT,
                EvidenceSource::CompletionTracking,
            )
            .await
            .unwrap();

        assert_eq!(record, CompletionRecord::empty(UserId::new(99)));
    }

    #[tokio::test]
    async fn invisible_courses_are_excluded() {
        let repo = InMemoryRepository::new();
        let user = UserId::new(1);
        enroll(&repo, user, &build_course(1, true)).await;
        enroll(&repo, user, &build_course(2, false)).await;
        repo.mark_completed(user, CourseId::new(2), Some(fixed_now()))
            .await
            .unwrap();

        let record = repo
            .completion_counts(user, RoleId::STUDENT, EvidenceSource::CompletionTracking)
            .await
            .unwrap();

        assert_eq!(record.total_courses(), 1);
        assert_eq!(record.completed_courses(), 0);
    }

    #[tokio::test]
    async fn certificates_count_a_course_once() {
        let repo = InMemoryRepository::new();
        let user = UserId::new(1);
        enroll(&repo, user, &build_course(1, true)).await;
        enroll(&repo, user, &build_course(2, true)).await;

        // Both certificate kinds for the same course must not double-count.
        repo.issue_certificate(user, CourseId::new(1), CertificateKind::Standard, fixed_now())
            .await
            .unwrap();
        repo.issue_certificate(user, CourseId::new(1), CertificateKind::Custom, fixed_now())
            .await
            .unwrap();

        let record = repo
            .completion_counts(user, RoleId::STUDENT, EvidenceSource::Certificates)
            .await
            .unwrap();

        assert_eq!(record.total_courses(), 2);
        assert_eq!(record.completed_courses(), 1);
        assert_eq!(record.percent_completed().display_value(), 50);
    }

    #[tokio::test]
    async fn evidence_sources_are_independent() {
        let repo = InMemoryRepository::new();
        let user = UserId::new(1);
        enroll(&repo, user, &build_course(1, true)).await;
        repo.mark_completed(user, CourseId::new(1), Some(fixed_now()))
            .await
            .unwrap();

        let tracking = repo
            .completion_counts(user, RoleId::STUDENT, EvidenceSource::CompletionTracking)
            .await
            .unwrap();
        let certificates = repo
            .completion_counts(user, RoleId::STUDENT, EvidenceSource::Certificates)
            .await
            .unwrap();

        assert_eq!(tracking.completed_courses(), 1);
        assert_eq!(certificates.completed_courses(), 0);
    }

    #[tokio::test]
    async fn other_roles_do_not_count() {
        let repo = InMemoryRepository::new();
        let user = UserId::new(1);
        let course = build_course(1, true);
        repo.upsert_course(&course).await.unwrap();
        repo.assign_role(user, course.id(), RoleId::new(3))
            .await
            .unwrap();

        let record = repo
            .completion_counts(user, RoleId::STUDENT, EvidenceSource::CompletionTracking)
            .await
            .unwrap();

        assert_eq!(record.total_courses(), 0);
    }
}
