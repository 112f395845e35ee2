use quiz_core::model::{AuthorId, Quiz, Subject, SubjectId};
use sqlx::Row;

use super::SqliteRepository;
use super::mapping::{map_subject_row, quiz_id_from_i64, ser, subject_id_from_i64, write_err};
use crate::repository::{NewSubjectRecord, StorageError, SubjectRepository, SubjectWithQuizzes};

#[async_trait::async_trait]
impl SubjectRepository for SqliteRepository {
    async fn insert_subject(
        &self,
        author: &AuthorId,
        record: NewSubjectRecord,
    ) -> Result<SubjectId, StorageError> {
        let res = sqlx::query(
            r"
            INSERT INTO subjects (name, created_by)
            VALUES (?1, ?2)
            ",
        )
        .bind(record.name)
        .bind(author.as_str())
        .execute(self.pool())
        .await
        .map_err(write_err)?;

        subject_id_from_i64(res.last_insert_rowid())
    }

    async fn find_subject_by_name(&self, name: &str) -> Result<Option<Subject>, StorageError> {
        let row = sqlx::query(
            r"
            SELECT id, name FROM subjects WHERE name = ?1
            ",
        )
        .bind(name)
        .fetch_optional(self.pool())
        .await
        .map_err(|e| StorageError::Connection(e.to_string()))?;

        match row {
            Some(row) => map_subject_row(&row).map(Some),
            None => Ok(None),
        }
    }

    async fn list_subjects_with_quizzes(
        &self,
        limit: u32,
    ) -> Result<Vec<SubjectWithQuizzes>, StorageError> {
        let rows = sqlx::query(
            r"
            SELECT
                s.id AS subject_id, s.name AS subject_name,
                q.id AS quiz_id, q.name AS quiz_name, q.created_at AS quiz_created_at
            FROM subjects s
            LEFT JOIN quizzes q ON q.subject_id = s.id
            WHERE s.id IN (SELECT id FROM subjects ORDER BY id ASC LIMIT ?1)
            ORDER BY s.id ASC, q.created_at ASC, q.id ASC
            ",
        )
        .bind(i64::from(limit))
        .fetch_all(self.pool())
        .await
        .map_err(|e| StorageError::Connection(e.to_string()))?;

        let mut out: Vec<SubjectWithQuizzes> = Vec::new();
        for row in rows {
            let subject_id =
                subject_id_from_i64(row.try_get::<i64, _>("subject_id").map_err(ser)?)?;

            let is_new = out.last().is_none_or(|g| g.subject.id() != subject_id);
            if is_new {
                let subject = Subject::new(
                    subject_id,
                    row.try_get::<String, _>("subject_name").map_err(ser)?,
                )
                .map_err(ser)?;
                out.push(SubjectWithQuizzes {
                    subject,
                    quizzes: Vec::new(),
                });
            }

            // LEFT JOIN: a subject without quizzes yields one all-NULL quiz row.
            if let Some(quiz_id) = row.try_get::<Option<i64>, _>("quiz_id").map_err(ser)? {
                let quiz = Quiz::new(
                    quiz_id_from_i64(quiz_id)?,
                    subject_id,
                    row.try_get::<String, _>("quiz_name").map_err(ser)?,
                    row.try_get("quiz_created_at").map_err(ser)?,
                )
                .map_err(ser)?;
                if let Some(group) = out.last_mut() {
                    group.quizzes.push(quiz);
                }
            }
        }
        Ok(out)
    }
}
