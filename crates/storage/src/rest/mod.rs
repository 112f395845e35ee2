//! Client for a hosted PostgREST-style table store.
//!
//! Speaks the usual wire conventions of such services: header-based API
//! keys, `POST /rest/v1/<table>` inserts returning the created
//! representation, and embedded-resource selects for the two joined reads.

use std::env;
use std::sync::Arc;

use chrono::{DateTime, Utc};
use reqwest::{Client, RequestBuilder, StatusCode};
use serde::{Deserialize, Serialize, de::DeserializeOwned};
use url::Url;

use quiz_core::model::{
    AuthorId, Choice, Letter, Question, QuestionId, Quiz, QuizId, Subject, SubjectId,
};

use crate::repository::{
    NewQuestionRecord, NewQuizRecord, NewSubjectRecord, QuizRepository, QuizWithQuestions,
    Storage, StorageError, StoreHealth, StoreProbe, SubjectRepository, SubjectWithQuizzes,
};

/// Connection settings for the hosted table store.
#[derive(Clone, Debug)]
pub struct HostedStoreConfig {
    pub base_url: Url,
    pub api_key: String,
}

impl HostedStoreConfig {
    /// Reads `QUIZ_STORE_URL` and `QUIZ_STORE_KEY`; returns `None` when the
    /// hosted store is not configured.
    #[must_use]
    pub fn from_env() -> Option<Self> {
        let api_key = env::var("QUIZ_STORE_KEY").ok()?;
        if api_key.trim().is_empty() {
            return None;
        }
        let base_url = env::var("QUIZ_STORE_URL").ok()?;
        let base_url = Url::parse(&base_url).ok()?;
        Some(Self { base_url, api_key })
    }
}

/// Repository implementation backed by the hosted table store.
#[derive(Clone)]
pub struct RestRepository {
    client: Client,
    config: HostedStoreConfig,
}

impl RestRepository {
    #[must_use]
    pub fn new(config: HostedStoreConfig) -> Self {
        Self {
            client: Client::new(),
            config,
        }
    }

    fn table_endpoint(&self, table: &str) -> String {
        format!(
            "{}/rest/v1/{table}",
            self.config.base_url.as_str().trim_end_matches('/')
        )
    }

    fn authed(&self, builder: RequestBuilder) -> RequestBuilder {
        builder
            .header("apikey", &self.config.api_key)
            .bearer_auth(&self.config.api_key)
    }

    /// Insert one record and return the created representation.
    async fn insert_returning<T, R>(&self, table: &str, payload: &T) -> Result<R, StorageError>
    where
        T: Serialize + Sync,
        R: DeserializeOwned + Send,
    {
        let response = self
            .authed(self.client.post(self.table_endpoint(table)))
            .header("Prefer", "return=representation")
            .json(payload)
            .send()
            .await
            .map_err(|e| StorageError::Connection(e.to_string()))?;

        let response = check_status(response).await?;
        let mut rows: Vec<R> = response
            .json()
            .await
            .map_err(|e| StorageError::Serialization(e.to_string()))?;
        if rows.is_empty() {
            return Err(StorageError::Serialization(format!(
                "insert into {table} returned no representation"
            )));
        }
        Ok(rows.swap_remove(0))
    }

    async fn select<R>(&self, table: &str, query: &[(&str, &str)]) -> Result<Vec<R>, StorageError>
    where
        R: DeserializeOwned + Send,
    {
        let response = self
            .authed(self.client.get(self.table_endpoint(table)))
            .query(query)
            .send()
            .await
            .map_err(|e| StorageError::Connection(e.to_string()))?;

        let response = check_status(response).await?;
        response
            .json()
            .await
            .map_err(|e| StorageError::Serialization(e.to_string()))
    }
}

/// Maps a non-success response to a `StorageError`, surfacing the store's
/// own message when one is present.
async fn check_status(response: reqwest::Response) -> Result<reqwest::Response, StorageError> {
    let status = response.status();
    if status.is_success() {
        return Ok(response);
    }
    if status == StatusCode::CONFLICT {
        return Err(StorageError::Conflict);
    }

    let body = response.text().await.unwrap_or_default();
    let message = serde_json::from_str::<ErrorBody>(&body)
        .ok()
        .and_then(|e| e.message)
        .unwrap_or(body);
    Err(StorageError::Connection(format!(
        "store returned status {status}: {message}"
    )))
}

#[async_trait::async_trait]
impl SubjectRepository for RestRepository {
    async fn insert_subject(
        &self,
        author: &AuthorId,
        record: NewSubjectRecord,
    ) -> Result<SubjectId, StorageError> {
        let row: SubjectRow = self
            .insert_returning(
                "subjects",
                &NewSubjectPayload {
                    name: &record.name,
                    created_by: author.as_str(),
                },
            )
            .await?;
        Ok(SubjectId::new(row.id))
    }

    async fn find_subject_by_name(&self, name: &str) -> Result<Option<Subject>, StorageError> {
        let filter = format!("eq.{name}");
        let rows: Vec<SubjectRow> = self
            .select(
                "subjects",
                &[("select", "id,name"), ("name", &filter), ("limit", "1")],
            )
            .await?;
        rows.into_iter().next().map(SubjectRow::into_subject).transpose()
    }

    async fn list_subjects_with_quizzes(
        &self,
        limit: u32,
    ) -> Result<Vec<SubjectWithQuizzes>, StorageError> {
        let limit = limit.to_string();
        let rows: Vec<SubjectTreeRow> = self
            .select(
                "subjects",
                &[
                    ("select", "id,name,quizzes(id,subject_id,name,created_at)"),
                    ("order", "id.asc"),
                    ("quizzes.order", "created_at.asc"),
                    ("limit", &limit),
                ],
            )
            .await?;
        rows.into_iter().map(SubjectTreeRow::into_group).collect()
    }
}

#[async_trait::async_trait]
impl QuizRepository for RestRepository {
    async fn insert_quiz(
        &self,
        author: &AuthorId,
        record: NewQuizRecord,
    ) -> Result<QuizId, StorageError> {
        let row: QuizRow = self
            .insert_returning(
                "quizzes",
                &NewQuizPayload {
                    subject_id: record.subject_id.value(),
                    name: &record.name,
                    created_at: record.created_at,
                    created_by: author.as_str(),
                },
            )
            .await?;
        Ok(QuizId::new(row.id))
    }

    async fn insert_question(
        &self,
        author: &AuthorId,
        record: NewQuestionRecord,
    ) -> Result<QuestionId, StorageError> {
        let row: InsertedRow = self
            .insert_returning(
                "questions",
                &NewQuestionPayload {
                    quiz_id: record.quiz_id.value(),
                    position: record.position,
                    text: &record.text,
                    correct_answer: record.correct_answer.map(|l| l.as_char().to_string()),
                    created_by: author.as_str(),
                },
            )
            .await?;
        Ok(QuestionId::new(row.id))
    }

    async fn insert_choices(
        &self,
        author: &AuthorId,
        question_id: QuestionId,
        choices: &[Choice],
    ) -> Result<(), StorageError> {
        if choices.is_empty() {
            return Ok(());
        }

        // PostgREST bulk insert: one POST with an array body.
        let payload: Vec<ChoicePayload<'_>> = choices
            .iter()
            .map(|choice| ChoicePayload {
                question_id: question_id.value(),
                letter: choice.letter.as_char().to_string(),
                text: &choice.text,
                created_by: author.as_str(),
            })
            .collect();

        let response = self
            .authed(self.client.post(self.table_endpoint("choices")))
            .header("Prefer", "return=minimal")
            .json(&payload)
            .send()
            .await
            .map_err(|e| StorageError::Connection(e.to_string()))?;
        check_status(response).await?;
        Ok(())
    }

    async fn get_quiz_with_questions(
        &self,
        id: QuizId,
    ) -> Result<Option<QuizWithQuestions>, StorageError> {
        let filter = format!("eq.{id}");
        let rows: Vec<QuizTreeRow> = self
            .select(
                "quizzes",
                &[
                    (
                        "select",
                        "id,subject_id,name,created_at,\
                         questions(id,quiz_id,position,text,correct_answer,choices(letter,text))",
                    ),
                    ("id", &filter),
                    ("questions.order", "position.asc"),
                    ("questions.choices.order", "letter.asc"),
                ],
            )
            .await?;
        rows.into_iter().next().map(QuizTreeRow::into_bundle).transpose()
    }
}

#[async_trait::async_trait]
impl StoreProbe for RestRepository {
    async fn check_connection(&self) -> Result<StoreHealth, StorageError> {
        let _: Vec<InsertedRow> = self
            .select("subjects", &[("select", "id"), ("limit", "1")])
            .await?;
        Ok(StoreHealth {
            backend: "hosted",
            checked_at: Utc::now(),
        })
    }
}

impl Storage {
    /// Build a `Storage` backed by the hosted table store.
    #[must_use]
    pub fn hosted(config: HostedStoreConfig) -> Self {
        let repo = RestRepository::new(config);
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
// ─── WIRE PAYLOADS ─────────────────────────────────────────────────────────────
//

#[derive(Debug, Serialize)]
struct NewSubjectPayload<'a> {
    name: &'a str,
    created_by: &'a str,
}

#[derive(Debug, Serialize)]
struct NewQuizPayload<'a> {
    subject_id: u64,
    name: &'a str,
    created_at: DateTime<Utc>,
    created_by: &'a str,
}

#[derive(Debug, Serialize)]
struct NewQuestionPayload<'a> {
    quiz_id: u64,
    position: u32,
    text: &'a str,
    correct_answer: Option<String>,
    created_by: &'a str,
}

#[derive(Debug, Serialize)]
struct ChoicePayload<'a> {
    question_id: u64,
    letter: String,
    text: &'a str,
    created_by: &'a str,
}

#[derive(Debug, Deserialize)]
struct ErrorBody {
    message: Option<String>,
}

#[derive(Debug, Deserialize)]
struct InsertedRow {
    id: u64,
}

#[derive(Debug, Deserialize)]
struct SubjectRow {
    id: u64,
    name: String,
}

impl SubjectRow {
    fn into_subject(self) -> Result<Subject, StorageError> {
        Subject::new(SubjectId::new(self.id), self.name)
            .map_err(|e| StorageError::Serialization(e.to_string()))
    }
}

#[derive(Debug, Deserialize)]
struct QuizRow {
    id: u64,
    subject_id: u64,
    name: String,
    created_at: DateTime<Utc>,
}

impl QuizRow {
    fn into_quiz(self) -> Result<Quiz, StorageError> {
        Quiz::new(
            QuizId::new(self.id),
            SubjectId::new(self.subject_id),
            self.name,
            self.created_at,
        )
        .map_err(|e| StorageError::Serialization(e.to_string()))
    }
}

#[derive(Debug, Deserialize)]
struct SubjectTreeRow {
    id: u64,
    name: String,
    #[serde(default)]
    quizzes: Vec<QuizRow>,
}

impl SubjectTreeRow {
    fn into_group(self) -> Result<SubjectWithQuizzes, StorageError> {
        let subject = Subject::new(SubjectId::new(self.id), self.name)
            .map_err(|e| StorageError::Serialization(e.to_string()))?;
        let quizzes = self
            .quizzes
            .into_iter()
            .map(QuizRow::into_quiz)
            .collect::<Result<_, _>>()?;
        Ok(SubjectWithQuizzes { subject, quizzes })
    }
}

#[derive(Debug, Deserialize)]
struct ChoiceRow {
    letter: String,
    text: String,
}

#[derive(Debug, Deserialize)]
struct QuestionTreeRow {
    id: u64,
    quiz_id: u64,
    position: u32,
    text: String,
    correct_answer: Option<String>,
    #[serde(default)]
    choices: Vec<ChoiceRow>,
}

impl QuestionTreeRow {
    fn into_question(self) -> Result<Question, StorageError> {
        let choices = self
            .choices
            .into_iter()
            .map(|c| Ok(Choice::new(parse_letter(&c.letter)?, c.text)))
            .collect::<Result<Vec<_>, StorageError>>()?;
        let correct_answer = self
            .correct_answer
            .as_deref()
            .map(parse_letter)
            .transpose()?;

        Question::from_persisted(
            QuestionId::new(self.id),
            QuizId::new(self.quiz_id),
            self.text,
            choices,
            correct_answer,
        )
        .map_err(|e| StorageError::Serialization(e.to_string()))
    }
}

#[derive(Debug, Deserialize)]
struct QuizTreeRow {
    id: u64,
    subject_id: u64,
    name: String,
    created_at: DateTime<Utc>,
    #[serde(default)]
    questions: Vec<QuestionTreeRow>,
}

impl QuizTreeRow {
    fn into_bundle(self) -> Result<QuizWithQuestions, StorageError> {
        let quiz = Quiz::new(
            QuizId::new(self.id),
            SubjectId::new(self.subject_id),
            self.name,
            self.created_at,
        )
        .map_err(|e| StorageError::Serialization(e.to_string()))?;

        // Authored order, even if the store ignored the nested order param.
        let mut rows = self.questions;
        rows.sort_by_key(|q| q.position);
        let questions = rows
            .into_iter()
            .map(QuestionTreeRow::into_question)
            .collect::<Result<_, _>>()?;
        Ok(QuizWithQuestions { quiz, questions })
    }
}

fn parse_letter(s: &str) -> Result<Letter, StorageError> {
    let mut chars = s.chars();
    let (Some(c), None) = (chars.next(), chars.next()) else {
        return Err(StorageError::Serialization(format!("invalid letter: {s:?}")));
    };
    Letter::from_char(c).map_err(|e| StorageError::Serialization(e.to_string()))
}

//
// ─── TESTS ─────────────────────────────────────────────────────────────────────
//
