use thiserror::Error;

use crate::model::ids::SubjectId;

#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum SubjectError {
    #[error("subject name cannot be empty")]
    EmptyName,
}

/// Top-level grouping of quizzes, e.g. a course topic.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Subject {
    id: SubjectId,
    name: String,
}

impl Subject {
    /// Creates a new Subject.
    ///
    /// # Errors
    ///
    /// Returns `SubjectError::EmptyName` if the name is empty or
    /// whitespace-only.
    pub fn new(id: SubjectId, name: impl Into<String>) -> Result<Self, SubjectError> {
        let name = name.into();
        let name = name.trim();
        if name.is_empty() {
            return Err(SubjectError::EmptyName);
        }

        Ok(Self {
            id,
            name: name.to_owned(),
        })
    }

    #[must_use]
    pub fn id(&self) -> SubjectId {
        self.id
    }

    #[must_use]
    pub fn name(&self) -> &str {
        &self.name
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn subject_rejects_empty_name() {
        let err = Subject::new(SubjectId::new(1), "   ").unwrap_err();
        assert_eq!(err, SubjectError::EmptyName);
    }

    #[test]
    fn subject_trims_name() {
        let subject = Subject::new(SubjectId::new(1), "  Mathematics  ").unwrap();
        assert_eq!(subject.name(), "Mathematics");
        assert_eq!(subject.id(), SubjectId::new(1));
    }
}
