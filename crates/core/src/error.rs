use thiserror::Error;

use crate::model::CompletionError;
use crate::model::CourseError;

#[derive(Debug, Error)]
pub enum Error {
    #[error(transparent)]
    Course(#[from] CourseError),
    #[error(transparent)]
    Completion(#[from] CompletionError),
}
