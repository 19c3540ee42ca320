use sqlx::Row;
use track_core::model::{CertificateKind, Course, CourseId, RoleId, UserId};

use crate::repository::StorageError;

pub(crate) fn ser<E: core::fmt::Display>(e: E) -> StorageError {
    StorageError::Serialization(e.to_string())
}

fn id_i64(field: &'static str, v: u64) -> Result<i64, StorageError> {
    i64::try_from(v).map_err(|_| StorageError::Serialization(format!("{field} overflow")))
}

fn i64_to_u64(field: &'static str, v: i64) -> Result<u64, StorageError> {
    u64::try_from(v).map_err(|_| StorageError::Serialization(format!("{field} sign overflow")))
}

pub(crate) fn user_id_to_i64(id: UserId) -> Result<i64, StorageError> {
    id_i64("user_id", id.value())
}

pub(crate) fn course_id_to_i64(id: CourseId) -> Result<i64, StorageError> {
    id_i64("course_id", id.value())
}

pub(crate) fn role_id_to_i64(id: RoleId) -> i64 {
    i64::from(id.value())
}

pub(crate) fn course_id_from_i64(v: i64) -> Result<CourseId, StorageError> {
    Ok(CourseId::new(i64_to_u64("course_id", v)?))
}

pub(crate) fn u32_from_i64(field: &'static str, v: i64) -> Result<u32, StorageError> {
    u32::try_from(v).map_err(|_| StorageError::Serialization(format!("invalid {field}: {v}")))
}

/// Storage encoding for certificate kinds. Must stay consistent with the
/// schema's CHECK constraint.
pub(crate) fn certificate_kind_to_str(kind: CertificateKind) -> &'static str {
    match kind {
        CertificateKind::Standard => "standard",
        CertificateKind::Custom => "custom",
    }
}

pub(crate) fn map_course_row(row: &sqlx::sqlite::SqliteRow) -> Result<Course, StorageError> {
    let id = course_id_from_i64(row.try_get::<i64, _>("id").map_err(ser)?)?;
    let fullname: String = row.try_get("fullname").map_err(ser)?;
    let visible: i64 = row.try_get("visible").map_err(ser)?;

    Course::new(id, fullname, visible != 0).map_err(ser)
}
