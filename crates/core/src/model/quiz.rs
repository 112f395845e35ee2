use chrono::{DateTime, Utc};
use thiserror::Error;

use crate::model::ids::{QuizId, SubjectId};

#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum QuizError {
    #[error("quiz name cannot be empty")]
    EmptyName,
}

/// An ordered set of questions owned by exactly one Subject.
///
/// Question order is the order the author wrote them in; the quiz itself
/// only carries identity, naming, and its creation instant.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Quiz {
    id: QuizId,
    subject_id: SubjectId,
    name: String,
    created_at: DateTime<Utc>,
}

impl Quiz {
    /// Creates a new Quiz.
    ///
    /// # Errors
    ///
    /// Returns `QuizError::EmptyName` if the name is empty or
    /// whitespace-only.
    pub fn new(
        id: QuizId,
        subject_id: SubjectId,
        name: impl Into<String>,
        created_at: DateTime<Utc>,
    ) -> Result<Self, QuizError> {
        let name = name.into();
        let name = name.trim();
        if name.is_empty() {
            return Err(QuizError::EmptyName);
        }

        Ok(Self {
            id,
            subject_id,
            name: name.to_owned(),
            created_at,
        })
    }

    #[must_use]
    pub fn id(&self) -> QuizId {
        self.id
    }

    #[must_use]
    pub fn subject_id(&self) -> SubjectId {
        self.subject_id
    }

    #[must_use]
    pub fn name(&self) -> &str {
        &self.name
    }

    #[must_use]
    pub fn created_at(&self) -> DateTime<Utc> {
        self.created_at
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::time::fixed_now;

    #[test]
    fn quiz_rejects_empty_name() {
        let err = Quiz::new(QuizId::new(1), SubjectId::new(1), "  ", fixed_now()).unwrap_err();
        assert_eq!(err, QuizError::EmptyName);
    }

    #[test]
    fn quiz_happy_path_trims_name() {
        let quiz = Quiz::new(
            QuizId::new(2),
            SubjectId::new(7),
            "  Midterm review ",
            fixed_now(),
        )
        .unwrap();

        assert_eq!(quiz.id(), QuizId::new(2));
        assert_eq!(quiz.subject_id(), SubjectId::new(7));
        assert_eq!(quiz.name(), "Midterm review");
        assert_eq!(quiz.created_at(), fixed_now());
    }
}
