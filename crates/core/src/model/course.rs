use thiserror::Error;

use crate::model::ids::CourseId;

#[derive(Debug, Error, Clone, PartialEq, Eq)]
#[non_exhaustive]
pub enum CourseError {
    #[error("course name cannot be empty")]
    EmptyName,
}

/// A course a user can be enrolled in.
///
/// Only visible courses participate in the completion percentage.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Course {
    id: CourseId,
    fullname: String,
    visible: bool,
}

impl Course {
    /// Creates a new course.
    ///
    /// # Errors
    ///
    /// Returns `CourseError::EmptyName` if the name is empty or whitespace-only.
    pub fn new(id: CourseId, fullname: impl Into<String>, visible: bool) -> Result<Self, CourseError> {
        let fullname = fullname.into();
        if fullname.trim().is_empty() {
            return Err(CourseError::EmptyName);
        }

        Ok(Self {
            id,
            fullname: fullname.trim().to_owned(),
            visible,
        })
    }

    // Accessors
    #[must_use]
    pub fn id(&self) -> CourseId {
        self.id
    }

    #[must_use]
    pub fn fullname(&self) -> &str {
        &self.fullname
    }

    #[must_use]
    pub fn visible(&self) -> bool {
        self.visible
    }
}
