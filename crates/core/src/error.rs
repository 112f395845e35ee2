use thiserror::Error;

use crate::model::{LetterError, QuestionError, QuizError, SubjectError};
use crate::parser::ParseError;

#[derive(Debug, Error)]
pub enum Error {
    #[error(transparent)]
    Letter(#[from] LetterError),
    #[error(transparent)]
    Subject(#[from] SubjectError),
    #[error(transparent)]
    Quiz(#[from] QuizError),
    #[error(transparent)]
    Question(#[from] QuestionError),
    #[error(transparent)]
    Parse(#[from] ParseError),
}
