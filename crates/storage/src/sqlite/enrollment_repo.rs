use track_core::model::{Course, CourseId, RoleId, UserId};

use super::SqliteRepository;
use super::mapping::{course_id_to_i64, map_course_row, role_id_to_i64, user_id_to_i64};
use crate::repository::{EnrollmentRepository, StorageError};

#[async_trait::async_trait]
impl EnrollmentRepository for SqliteRepository {
    async fn upsert_course(&self, course: &Course) -> Result<(), StorageError> {
        let id = course_id_to_i64(course.id())?;
        let visible = if course.visible() { 1_i64 } else { 0_i64 };

        sqlx::query(
            r"
                INSERT INTO courses (id, fullname, visible)
                VALUES (?1, ?2, ?3)
                ON CONFLICT(id) DO UPDATE SET
                    fullname = excluded.fullname,
                    visible = excluded.visible
            ",
        )
        .bind(id)
        .bind(course.fullname())
        .bind(visible)
        .execute(&self.pool)
        .await
        .map_err(|e| StorageError::Connection(e.to_string()))?;

        Ok(())
    }

    async fn get_course(&self, id: CourseId) -> Result<Option<Course>, StorageError> {
        let row = sqlx::query(
            r"
                SELECT id, fullname, visible
                FROM courses
                WHERE id = ?1
            ",
        )
        .bind(course_id_to_i64(id)?)
        .fetch_optional(&self.pool)
        .await
        .map_err(|e| StorageError::Connection(e.to_string()))?;

        match row {
            Some(row) => map_course_row(&row).map(Some),
            None => Ok(None),
        }
    }

    async fn assign_role(
        &self,
        user_id: UserId,
        course_id: CourseId,
        role: RoleId,
    ) -> Result<(), StorageError> {
        sqlx::query(
            r"
                INSERT INTO role_assignments (user_id, course_id, role_id)
                VALUES (?1, ?2, ?3)
                ON CONFLICT(user_id, course_id, role_id) DO NOTHING
            ",
        )
        .bind(user_id_to_i64(user_id)?)
        .bind(course_id_to_i64(course_id)?)
        .bind(role_id_to_i64(role))
        .execute(&self.pool)
        .await
        .map_err(|e| StorageError::Connection(e.to_string()))?;

        Ok(())
    }
}
