use quiz_core::model::{Letter, Question, QuestionId, Quiz, QuizId, Subject, SubjectId};
use sqlx::Row;
use sqlx::sqlite::SqliteRow;

use crate::repository::StorageError;

pub(crate) fn ser<E: core::fmt::Display>(e: E) -> StorageError {
    StorageError::Serialization(e.to_string())
}

fn i64_to_u64(field: &'static str, v: i64) -> Result<u64, StorageError> {
    u64::try_from(v).map_err(|_| StorageError::Serialization(format!("{field} sign overflow")))
}

pub(crate) fn subject_id_from_i64(v: i64) -> Result<SubjectId, StorageError> {
    Ok(SubjectId::new(i64_to_u64("subject_id", v)?))
}

pub(crate) fn quiz_id_from_i64(v: i64) -> Result<QuizId, StorageError> {
    Ok(QuizId::new(i64_to_u64("quiz_id", v)?))
}

pub(crate) fn question_id_from_i64(v: i64) -> Result<QuestionId, StorageError> {
    Ok(QuestionId::new(i64_to_u64("question_id", v)?))
}

pub(crate) fn id_to_i64(field: &'static str, v: u64) -> Result<i64, StorageError> {
    i64::try_from(v).map_err(|_| StorageError::Serialization(format!("{field} overflow")))
}

/// Maps a sqlx error to `Conflict` for constraint violations, `Connection`
/// otherwise.
pub(crate) fn write_err(e: sqlx::Error) -> StorageError {
    match e.as_database_error() {
        Some(db) if db.is_unique_violation() => StorageError::Conflict,
        Some(db) if db.is_foreign_key_violation() => StorageError::NotFound,
        _ => StorageError::Connection(e.to_string()),
    }
}

/// Converts a stored single-character string back into a `Letter`.
pub(crate) fn letter_from_db(s: &str) -> Result<Letter, StorageError> {
    let mut chars = s.chars();
    let (Some(c), None) = (chars.next(), chars.next()) else {
        return Err(StorageError::Serialization(format!("invalid letter: {s:?}")));
    };
    Letter::from_char(c).map_err(ser)
}

pub(crate) fn letter_to_db(letter: Letter) -> String {
    letter.as_char().to_string()
}

pub(crate) fn map_subject_row(row: &SqliteRow) -> Result<Subject, StorageError> {
    let id = subject_id_from_i64(row.try_get::<i64, _>("id").map_err(ser)?)?;
    Subject::new(id, row.try_get::<String, _>("name").map_err(ser)?).map_err(ser)
}

pub(crate) fn map_quiz_row(row: &SqliteRow) -> Result<Quiz, StorageError> {
    Quiz::new(
        quiz_id_from_i64(row.try_get::<i64, _>("id").map_err(ser)?)?,
        subject_id_from_i64(row.try_get::<i64, _>("subject_id").map_err(ser)?)?,
        row.try_get::<String, _>("name").map_err(ser)?,
        row.try_get("created_at").map_err(ser)?,
    )
    .map_err(ser)
}

/// Rehydrates one question from its row plus the already-fetched choices.
pub(crate) fn map_question_row(
    row: &SqliteRow,
    choices: Vec<quiz_core::model::Choice>,
) -> Result<Question, StorageError> {
    let correct_answer = row
        .try_get::<Option<String>, _>("correct_answer")
        .map_err(ser)?
        .map(|s| letter_from_db(&s))
        .transpose()?;

    Question::from_persisted(
        question_id_from_i64(row.try_get::<i64, _>("id").map_err(ser)?)?,
        quiz_id_from_i64(row.try_get::<i64, _>("quiz_id").map_err(ser)?)?,
        row.try_get::<String, _>("text").map_err(ser)?,
        choices,
        correct_answer,
    )
    .map_err(ser)
}
