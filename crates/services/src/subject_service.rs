use std::sync::Arc;

use quiz_core::model::{AuthorId, Subject, SubjectId};
use storage::repository::{NewSubjectRecord, SubjectRepository, SubjectWithQuizzes};

use crate::error::SubjectServiceError;

/// Orchestrates subject creation and the subject overview.
#[derive(Clone)]
pub struct SubjectService {
    subjects: Arc<dyn SubjectRepository>,
}

impl SubjectService {
    #[must_use]
    pub fn new(subjects: Arc<dyn SubjectRepository>) -> Self {
        Self { subjects }
    }

    /// Create a new subject and persist it.
    ///
    /// # Errors
    ///
    /// Returns `SubjectServiceError::Subject` for validation failures.
    /// Returns `SubjectServiceError::Storage` if persistence fails, including
    /// `Conflict` for a duplicate name.
    pub async fn create_subject(
        &self,
        author: &AuthorId,
        name: &str,
    ) -> Result<SubjectId, SubjectServiceError> {
        let subject = Subject::new(SubjectId::new(1), name)?;
        let subject_id = self
            .subjects
            .insert_subject(author, NewSubjectRecord::from_subject(&subject))
            .await?;
        Ok(subject_id)
    }

    /// Reuse the subject with this name, creating it when it does not exist
    /// yet.
    ///
    /// # Errors
    ///
    /// Returns `SubjectServiceError` as [`create_subject`](Self::create_subject)
    /// does.
    pub async fn find_or_create(
        &self,
        author: &AuthorId,
        name: &str,
    ) -> Result<SubjectId, SubjectServiceError> {
        // Validate and trim first so lookup and insert agree on the name.
        let subject = Subject::new(SubjectId::new(1), name)?;
        if let Some(existing) = self.subjects.find_subject_by_name(subject.name()).await? {
            return Ok(existing.id());
        }

        let subject_id = self
            .subjects
            .insert_subject(author, NewSubjectRecord::from_subject(&subject))
            .await?;
        Ok(subject_id)
    }

    /// Subjects with their quizzes, for the browse view.
    ///
    /// # Errors
    ///
    /// Returns `SubjectServiceError::Storage` if repository access fails.
    pub async fn list_overview(
        &self,
        limit: u32,
    ) -> Result<Vec<SubjectWithQuizzes>, SubjectServiceError> {
        let overview = self.subjects.list_subjects_with_quizzes(limit).await?;
        Ok(overview)
    }
}
