use chrono::{DateTime, Utc};
use sqlx::Row;
use track_core::model::{
    CertificateKind, CompletionRecord, CourseId, EvidenceSource, RoleId, UserId,
};

use super::SqliteRepository;
use super::mapping::{
    certificate_kind_to_str, course_id_to_i64, role_id_to_i64, ser, u32_from_i64, user_id_to_i64,
};
use crate::repository::{CompletionRepository, StorageError};

/// Completion-tracking variant: a course counts as completed once its
/// tracking row carries a completion timestamp. The LEFT JOIN keeps courses
/// without any tracking row in the total.
const COUNTS_BY_COMPLETION: &str = r"
    SELECT
        COUNT(c.id) AS total_courses,
        COALESCE(SUM(CASE WHEN cc.completed_at IS NOT NULL THEN 1 ELSE 0 END), 0)
            AS completed_courses
    FROM role_assignments ra
    INNER JOIN courses c
        ON c.id = ra.course_id AND c.visible = 1
    LEFT JOIN course_completions cc
        ON cc.course_id = c.id AND cc.user_id = ra.user_id
    WHERE ra.user_id = ?1
      AND ra.role_id = ?2
";

/// Certificate variant: a course counts as completed once at least one
/// certificate of any kind was issued. The EXISTS probe counts a course at
/// most once however many certificates it has.
const COUNTS_BY_CERTIFICATE: &str = r"
    SELECT
        COUNT(c.id) AS total_courses,
        COALESCE(SUM(CASE WHEN EXISTS (
            SELECT 1 FROM certificate_issues ci
            WHERE ci.course_id = c.id AND ci.user_id = ra.user_id
        ) THEN 1 ELSE 0 END), 0) AS completed_courses
    FROM role_assignments ra
    INNER JOIN courses c
        ON c.id = ra.course_id AND c.visible = 1
    WHERE ra.user_id = ?1
      AND ra.role_id = ?2
";

#[async_trait::async_trait]
impl CompletionRepository for SqliteRepository {
    async fn mark_completed(
        &self,
        user_id: UserId,
        course_id: CourseId,
        completed_at: Option<DateTime<Utc>>,
    ) -> Result<(), StorageError> {
        sqlx::query(
            r"
                INSERT INTO course_completions (user_id, course_id, completed_at)
                VALUES (?1, ?2, ?3)
                ON CONFLICT(user_id, course_id) DO UPDATE SET
                    completed_at = excluded.completed_at
            ",
        )
        .bind(user_id_to_i64(user_id)?)
        .bind(course_id_to_i64(course_id)?)
        .bind(completed_at)
        .execute(&self.pool)
        .await
        .map_err(|e| StorageError::Connection(e.to_string()))?;

        Ok(())
    }

    async fn issue_certificate(
        &self,
        user_id: UserId,
        course_id: CourseId,
        kind: CertificateKind,
        issued_at: DateTime<Utc>,
    ) -> Result<(), StorageError> {
        sqlx::query(
            r"
                INSERT INTO certificate_issues (user_id, course_id, kind, issued_at)
                VALUES (?1, ?2, ?3, ?4)
            ",
        )
        .bind(user_id_to_i64(user_id)?)
        .bind(course_id_to_i64(course_id)?)
        .bind(certificate_kind_to_str(kind))
        .bind(issued_at)
        .execute(&self.pool)
        .await
        .map_err(|e| StorageError::Connection(e.to_string()))?;

        Ok(())
    }

    async fn completion_counts(
        &self,
        user_id: UserId,
        role: RoleId,
        evidence: EvidenceSource,
    ) -> Result<CompletionRecord, StorageError> {
        let sql = match evidence {
            EvidenceSource::CompletionTracking => COUNTS_BY_COMPLETION,
            EvidenceSource::Certificates => COUNTS_BY_CERTIFICATE,
        };

        let row = sqlx::query(sql)
            .bind(user_id_to_i64(user_id)?)
            .bind(role_id_to_i64(role))
            .fetch_one(&self.pool)
            .await
            .map_err(|e| StorageError::Connection(e.to_string()))?;

        let total = u32_from_i64(
            "total_courses",
            row.try_get::<i64, _>("total_courses").map_err(ser)?,
        )?;
        let completed = u32_from_i64(
            "completed_courses",
            row.try_get::<i64, _>("completed_courses").map_err(ser)?,
        )?;

        CompletionRecord::from_counts(user_id, total, completed).map_err(ser)
    }
}
