use async_trait::async_trait;
use chrono::{DateTime, Utc};
use quiz_core::model::{
    AuthorId, Choice, Question, QuestionId, Quiz, QuizId, Subject, SubjectId, ValidatedQuestion,
};
use std::collections::HashMap;
use std::sync::{Arc, Mutex};
use thiserror::Error;

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

/// Snapshot returned by a successful connection probe.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StoreHealth {
    /// Which adapter answered, e.g. `"sqlite"` or `"hosted"`.
    pub backend: &'static str,
    pub checked_at: DateTime<Utc>,
}

//
// ─── INSERT RECORDS ────────────────────────────────────────────────────────────
//

/// Persisted shape for a new subject; the store assigns the id.
#[derive(Debug, Clone)]
pub struct NewSubjectRecord {
    pub name: String,
}

impl NewSubjectRecord {
    #[must_use]
    pub fn from_subject(subject: &Subject) -> Self {
        Self {
            name: subject.name().to_owned(),
        }
    }
}

/// Persisted shape for a new quiz linked to its subject.
#[derive(Debug, Clone)]
pub struct NewQuizRecord {
    pub subject_id: SubjectId,
    pub name: String,
    pub created_at: DateTime<Utc>,
}

impl NewQuizRecord {
    #[must_use]
    pub fn from_quiz(quiz: &Quiz) -> Self {
        Self {
            subject_id: quiz.subject_id(),
            name: quiz.name().to_owned(),
            created_at: quiz.created_at(),
        }
    }
}

/// Persisted shape for a new question. `position` preserves the author's
/// block order; choices are inserted separately in bulk.
#[derive(Debug, Clone)]
pub struct NewQuestionRecord {
    pub quiz_id: QuizId,
    pub position: u32,
    pub text: String,
    pub correct_answer: Option<quiz_core::model::Letter>,
}

impl NewQuestionRecord {
    #[must_use]
    pub fn from_validated(quiz_id: QuizId, position: u32, question: &ValidatedQuestion) -> Self {
        Self {
            quiz_id,
            position,
            text: question.text.clone(),
            correct_answer: question.correct_answer,
        }
    }
}

//
// ─── JOINED READS ──────────────────────────────────────────────────────────────
//

/// One subject with every quiz it owns, oldest quiz first.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SubjectWithQuizzes {
    pub subject: Subject,
    pub quizzes: Vec<Quiz>,
}

/// One quiz with its questions in authored order, each with its choices.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct QuizWithQuestions {
    pub quiz: Quiz,
    pub questions: Vec<Question>,
}

//
// ─── REPOSITORY CONTRACTS ──────────────────────────────────────────────────────
//

/// Repository contract for subjects.
///
/// Every write takes the acting author explicitly; adapters must not supply
/// an identity of their own.
#[async_trait]
pub trait SubjectRepository: Send + Sync {
    /// Persist a new subject and return its store-assigned id.
    ///
    /// # Errors
    ///
    /// Returns `StorageError::Conflict` if a subject with the same name
    /// already exists, or other storage errors.
    async fn insert_subject(
        &self,
        author: &AuthorId,
        record: NewSubjectRecord,
    ) -> Result<SubjectId, StorageError>;

    /// Look up a subject by exact name.
    ///
    /// # Errors
    ///
    /// Returns `StorageError` if the store cannot be reached.
    async fn find_subject_by_name(&self, name: &str) -> Result<Option<Subject>, StorageError>;

    /// Fetch up to `limit` subjects together with their quizzes.
    ///
    /// # Errors
    ///
    /// Returns `StorageError` if the store cannot be reached.
    async fn list_subjects_with_quizzes(
        &self,
        limit: u32,
    ) -> Result<Vec<SubjectWithQuizzes>, StorageError>;
}

/// Repository contract for quizzes, their questions, and choices.
#[async_trait]
pub trait QuizRepository: Send + Sync {
    /// Persist a new quiz and return its store-assigned id.
    ///
    /// # Errors
    ///
    /// Returns `StorageError` if the quiz cannot be stored.
    async fn insert_quiz(
        &self,
        author: &AuthorId,
        record: NewQuizRecord,
    ) -> Result<QuizId, StorageError>;

    /// Persist a new question and return its store-assigned id.
    ///
    /// # Errors
    ///
    /// Returns `StorageError` if the question cannot be stored.
    async fn insert_question(
        &self,
        author: &AuthorId,
        record: NewQuestionRecord,
    ) -> Result<QuestionId, StorageError>;

    /// Persist all choices of one question in a single bulk operation.
    ///
    /// # Errors
    ///
    /// Returns `StorageError` if any choice cannot be stored.
    async fn insert_choices(
        &self,
        author: &AuthorId,
        question_id: QuestionId,
        choices: &[Choice],
    ) -> Result<(), StorageError>;

    /// Fetch a quiz with its questions and their choices.
    ///
    /// Returns `Ok(None)` when the quiz does not exist.
    ///
    /// # Errors
    ///
    /// Returns `StorageError` if the store cannot be reached or a row fails
    /// to rehydrate.
    async fn get_quiz_with_questions(
        &self,
        id: QuizId,
    ) -> Result<Option<QuizWithQuestions>, StorageError>;
}

/// Cheap reachability probe, mirroring the hosted backend's `select count
/// limit 1` connection check.
#[async_trait]
pub trait StoreProbe: Send + Sync {
    /// Verify the store answers queries at all.
    ///
    /// # Errors
    ///
    /// Returns `StorageError` when the store is unreachable.
    async fn check_connection(&self) -> Result<StoreHealth, StorageError>;
}

//
// ─── IN-MEMORY ADAPTER ─────────────────────────────────────────────────────────
//

#[derive(Debug, Clone)]
struct StoredQuestion {
    quiz_id: QuizId,
    position: u32,
    text: String,
    correct_answer: Option<quiz_core::model::Letter>,
}

#[derive(Default)]
struct Tables {
    next_id: u64,
    subjects: HashMap<SubjectId, Subject>,
    quizzes: HashMap<QuizId, Quiz>,
    questions: HashMap<QuestionId, StoredQuestion>,
    choices: HashMap<QuestionId, Vec<Choice>>,
}

impl Tables {
    fn next_id(&mut self) -> u64 {
        self.next_id += 1;
        self.next_id
    }
}

/// Simple in-memory repository implementation for testing and prototyping.
#[derive(Clone, Default)]
pub struct InMemoryRepository {
    tables: Arc<Mutex<Tables>>,
}

impl InMemoryRepository {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    fn lock(&self) -> Result<std::sync::MutexGuard<'_, Tables>, StorageError> {
        self.tables
            .lock()
            .map_err(|e| StorageError::Connection(e.to_string()))
    }
}

#[async_trait]
impl SubjectRepository for InMemoryRepository {
    async fn insert_subject(
        &self,
        _author: &AuthorId,
        record: NewSubjectRecord,
    ) -> Result<SubjectId, StorageError> {
        let mut tables = self.lock()?;
        if tables.subjects.values().any(|s| s.name() == record.name) {
            return Err(StorageError::Conflict);
        }
        let id = SubjectId::new(tables.next_id());
        let subject =
            Subject::new(id, record.name).map_err(|e| StorageError::Serialization(e.to_string()))?;
        tables.subjects.insert(id, subject);
        Ok(id)
    }

    async fn find_subject_by_name(&self, name: &str) -> Result<Option<Subject>, StorageError> {
        let tables = self.lock()?;
        Ok(tables
            .subjects
            .values()
            .find(|s| s.name() == name)
            .cloned())
    }

    async fn list_subjects_with_quizzes(
        &self,
        limit: u32,
    ) -> Result<Vec<SubjectWithQuizzes>, StorageError> {
        let tables = self.lock()?;

        let mut subjects: Vec<Subject> = tables.subjects.values().cloned().collect();
        subjects.sort_by_key(Subject::id);
        subjects.truncate(usize::try_from(limit).unwrap_or(usize::MAX));

        let mut out = Vec::with_capacity(subjects.len());
        for subject in subjects {
            let mut quizzes: Vec<Quiz> = tables
                .quizzes
                .values()
                .filter(|q| q.subject_id() == subject.id())
                .cloned()
                .collect();
            quizzes.sort_by_key(|q| (q.created_at(), q.id()));
            out.push(SubjectWithQuizzes { subject, quizzes });
        }
        Ok(out)
    }
}

#[async_trait]
impl QuizRepository for InMemoryRepository {
    async fn insert_quiz(
        &self,
        _author: &AuthorId,
        record: NewQuizRecord,
    ) -> Result<QuizId, StorageError> {
        let mut tables = self.lock()?;
        if !tables.subjects.contains_key(&record.subject_id) {
            return Err(StorageError::NotFound);
        }
        let id = QuizId::new(tables.next_id());
        let quiz = Quiz::new(id, record.subject_id, record.name, record.created_at)
            .map_err(|e| StorageError::Serialization(e.to_string()))?;
        tables.quizzes.insert(id, quiz);
        Ok(id)
    }

    async fn insert_question(
        &self,
        _author: &AuthorId,
        record: NewQuestionRecord,
    ) -> Result<QuestionId, StorageError> {
        let mut tables = self.lock()?;
        if !tables.quizzes.contains_key(&record.quiz_id) {
            return Err(StorageError::NotFound);
        }
        let id = QuestionId::new(tables.next_id());
        tables.questions.insert(
            id,
            StoredQuestion {
                quiz_id: record.quiz_id,
                position: record.position,
                text: record.text,
                correct_answer: record.correct_answer,
            },
        );
        Ok(id)
    }

    async fn insert_choices(
        &self,
        _author: &AuthorId,
        question_id: QuestionId,
        choices: &[Choice],
    ) -> Result<(), StorageError> {
        let mut tables = self.lock()?;
        if !tables.questions.contains_key(&question_id) {
            return Err(StorageError::NotFound);
        }
        let slot = tables.choices.entry(question_id).or_default();
        for choice in choices {
            if slot.iter().any(|c| c.letter == choice.letter) {
                return Err(StorageError::Conflict);
            }
            slot.push(choice.clone());
        }
        slot.sort_by_key(|c| c.letter);
        Ok(())
    }

    async fn get_quiz_with_questions(
        &self,
        id: QuizId,
    ) -> Result<Option<QuizWithQuestions>, StorageError> {
        let tables = self.lock()?;
        let Some(quiz) = tables.quizzes.get(&id).cloned() else {
            return Ok(None);
        };

        let mut rows: Vec<(QuestionId, StoredQuestion)> = tables
            .questions
            .iter()
            .filter(|(_, q)| q.quiz_id == id)
            .map(|(question_id, q)| (*question_id, q.clone()))
            .collect();
        rows.sort_by_key(|(question_id, q)| (q.position, *question_id));

        let mut questions = Vec::with_capacity(rows.len());
        for (question_id, stored) in rows {
            let choices = tables.choices.get(&question_id).cloned().unwrap_or_default();
            let question = Question::from_persisted(
                question_id,
                stored.quiz_id,
                stored.text,
                choices,
                stored.correct_answer,
            )
            .map_err(|e| StorageError::Serialization(e.to_string()))?;
            questions.push(question);
        }

        Ok(Some(QuizWithQuestions { quiz, questions }))
    }
}

#[async_trait]
impl StoreProbe for InMemoryRepository {
    async fn check_connection(&self) -> Result<StoreHealth, StorageError> {
        self.lock()?;
        Ok(StoreHealth {
            backend: "memory",
            checked_at: Utc::now(),
        })
    }
}

//
// ─── STORAGE AGGREGATE ─────────────────────────────────────────────────────────
//

/// Aggregates the repositories behind trait objects for easy backend
/// swapping.
#[derive(Clone)]
pub struct Storage {
    pub subjects: Arc<dyn SubjectRepository>,
    pub quizzes: Arc<dyn QuizRepository>,
    pub probe: Arc<dyn StoreProbe>,
}

impl Storage {
    #[must_use]
    pub fn in_memory() -> Self {
        let repo = InMemoryRepository::new();
        let subjects: Arc<dyn SubjectRepository> = Arc::new(repo.clone());
        let quizzes: Arc<dyn QuizRepository> = Arc::new(repo.clone());
        let probe: Arc<dyn StoreProbe> = Arc::new(repo);
        Self {
            subjects,
            quizzes,
            probe,
        }
    }
}

//
// ─── TESTS ─────────────────────────────────────────────────────────────────────
//
