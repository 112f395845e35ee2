use std::collections::HashMap;

use quiz_core::model::{AuthorId, Choice, QuestionId, QuizId};
use sqlx::Row;

use super::SqliteRepository;
use super::mapping::{
    id_to_i64, letter_from_db, letter_to_db, map_question_row, map_quiz_row, question_id_from_i64,
    quiz_id_from_i64, ser, write_err,
};
use crate::repository::{
    NewQuestionRecord, NewQuizRecord, QuizRepository, QuizWithQuestions, StorageError,
};

#[async_trait::async_trait]
impl QuizRepository for SqliteRepository {
    async fn insert_quiz(
        &self,
        author: &AuthorId,
        record: NewQuizRecord,
    ) -> Result<QuizId, StorageError> {
        let res = sqlx::query(
            r"
            INSERT INTO quizzes (subject_id, name, created_by, created_at)
            VALUES (?1, ?2, ?3, ?4)
            ",
        )
        .bind(id_to_i64("subject_id", record.subject_id.value())?)
        .bind(record.name)
        .bind(author.as_str())
        .bind(record.created_at)
        .execute(self.pool())
        .await
        .map_err(write_err)?;

        quiz_id_from_i64(res.last_insert_rowid())
    }

    async fn insert_question(
        &self,
        author: &AuthorId,
        record: NewQuestionRecord,
    ) -> Result<QuestionId, StorageError> {
        let res = sqlx::query(
            r"
            INSERT INTO questions (quiz_id, position, text, correct_answer, created_by)
            VALUES (?1, ?2, ?3, ?4, ?5)
            ",
        )
        .bind(id_to_i64("quiz_id", record.quiz_id.value())?)
        .bind(i64::from(record.position))
        .bind(record.text)
        .bind(record.correct_answer.map(letter_to_db))
        .bind(author.as_str())
        .execute(self.pool())
        .await
        .map_err(write_err)?;

        question_id_from_i64(res.last_insert_rowid())
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

        // One transaction per question keeps the bulk insert all-or-nothing.
        let mut tx = self
            .pool()
            .begin()
            .await
            .map_err(|e| StorageError::Connection(e.to_string()))?;

        for choice in choices {
            sqlx::query(
                r"
                INSERT INTO choices (question_id, letter, text, created_by)
                VALUES (?1, ?2, ?3, ?4)
                ",
            )
            .bind(id_to_i64("question_id", question_id.value())?)
            .bind(letter_to_db(choice.letter))
            .bind(choice.text.as_str())
            .bind(author.as_str())
            .execute(&mut *tx)
            .await
            .map_err(write_err)?;
        }

        tx.commit()
            .await
            .map_err(|e| StorageError::Connection(e.to_string()))
    }

    async fn get_quiz_with_questions(
        &self,
        id: QuizId,
    ) -> Result<Option<QuizWithQuestions>, StorageError> {
        let quiz_row = sqlx::query(
            r"
            SELECT id, subject_id, name, created_at FROM quizzes WHERE id = ?1
            ",
        )
        .bind(id_to_i64("quiz_id", id.value())?)
        .fetch_optional(self.pool())
        .await
        .map_err(|e| StorageError::Connection(e.to_string()))?;

        let Some(quiz_row) = quiz_row else {
            return Ok(None);
        };
        let quiz = map_quiz_row(&quiz_row)?;

        let question_rows = sqlx::query(
            r"
            SELECT id, quiz_id, position, text, correct_answer
            FROM questions
            WHERE quiz_id = ?1
            ORDER BY position ASC, id ASC
            ",
        )
        .bind(id_to_i64("quiz_id", id.value())?)
        .fetch_all(self.pool())
        .await
        .map_err(|e| StorageError::Connection(e.to_string()))?;

        let question_ids: Vec<i64> = question_rows
            .iter()
            .map(|row| row.try_get::<i64, _>("id").map_err(ser))
            .collect::<Result<_, _>>()?;
        let mut choices_by_question = self.choices_for(&question_ids).await?;

        let mut questions = Vec::with_capacity(question_rows.len());
        for row in &question_rows {
            let question_id: i64 = row.try_get("id").map_err(ser)?;
            let choices = choices_by_question.remove(&question_id).unwrap_or_default();
            questions.push(map_question_row(row, choices)?);
        }

        Ok(Some(QuizWithQuestions { quiz, questions }))
    }
}

impl SqliteRepository {
    /// Fetches choices for a batch of questions, grouped by question id and
    /// ordered by letter.
    async fn choices_for(
        &self,
        question_ids: &[i64],
    ) -> Result<HashMap<i64, Vec<Choice>>, StorageError> {
        if question_ids.is_empty() {
            return Ok(HashMap::new());
        }

        let mut sql = String::from(
            r"
            SELECT question_id, letter, text
            FROM choices
            WHERE question_id IN (
            ",
        );
        for i in 0..question_ids.len() {
            if i > 0 {
                sql.push_str(", ");
            }
            sql.push_str(&format!("?{}", i + 1));
        }
        sql.push_str(") ORDER BY question_id ASC, letter ASC");

        let mut query = sqlx::query(&sql);
        for id in question_ids {
            query = query.bind(id);
        }

        let rows = query
            .fetch_all(self.pool())
            .await
            .map_err(|e| StorageError::Connection(e.to_string()))?;

        let mut grouped: HashMap<i64, Vec<Choice>> = HashMap::new();
        for row in rows {
            let question_id: i64 = row.try_get("question_id").map_err(ser)?;
            let letter = letter_from_db(&row.try_get::<String, _>("letter").map_err(ser)?)?;
            let text: String = row.try_get("text").map_err(ser)?;
            grouped
                .entry(question_id)
                .or_default()
                .push(Choice::new(letter, text));
        }
        Ok(grouped)
    }
}
