use std::sync::Arc;

use tracing::warn;

use quiz_core::Clock;
use quiz_core::model::{AuthorId, Quiz, QuizId};
use quiz_core::parser::QuizTextParser;
use storage::repository::{NewQuestionRecord, NewQuizRecord, QuizRepository, QuizWithQuestions};

use crate::error::AuthoringError;
use crate::subject_service::SubjectService;

/// Turns a pasted quiz-text blob into a persisted subject/quiz/question
/// tree.
#[derive(Clone)]
pub struct QuizService {
    clock: Clock,
    parser: QuizTextParser,
    subjects: SubjectService,
    quizzes: Arc<dyn QuizRepository>,
}

impl QuizService {
    #[must_use]
    pub fn new(
        clock: Clock,
        parser: QuizTextParser,
        subjects: SubjectService,
        quizzes: Arc<dyn QuizRepository>,
    ) -> Self {
        Self {
            clock,
            parser,
            subjects,
            quizzes,
        }
    }

    /// Create a quiz from the authoring form: subject name, quiz name, and
    /// the question text blob.
    ///
    /// The text is parsed and validated before anything is written, so a bad
    /// submission leaves the store untouched. Writes then run sequentially:
    /// subject (reused when it already exists), quiz, and one question plus
    /// its choices per block, in block order. A store failure surfaces
    /// immediately and is never retried here.
    ///
    /// # Errors
    ///
    /// Returns `AuthoringError::Parse` for malformed quiz text,
    /// `AuthoringError::Subject`/`Quiz` for blank names, and
    /// `AuthoringError::Storage` when a write fails.
    pub async fn create_quiz_from_text(
        &self,
        author: &AuthorId,
        subject_name: &str,
        quiz_name: &str,
        questions_text: &str,
    ) -> Result<QuizId, AuthoringError> {
        let questions = self.parser.parse(questions_text)?;
        for (i, question) in questions.iter().enumerate() {
            if question.correct_answer.is_none() {
                // Accepted, but such a question can never display as correct.
                warn!(block = i + 1, "question has no recorded correct answer");
            }
        }

        let subject_id = self.subjects.find_or_create(author, subject_name).await?;

        let now = self.clock.now();
        let quiz = Quiz::new(QuizId::new(1), subject_id, quiz_name, now)?;
        let quiz_id = self
            .quizzes
            .insert_quiz(author, NewQuizRecord::from_quiz(&quiz))
            .await?;

        let mut position = 0_u32;
        for question in questions {
            let question_id = self
                .quizzes
                .insert_question(
                    author,
                    NewQuestionRecord::from_validated(quiz_id, position, &question),
                )
                .await?;
            self.quizzes
                .insert_choices(author, question_id, &question.choices)
                .await?;
            position += 1;
        }

        Ok(quiz_id)
    }

    /// Fetch a quiz with its questions, e.g. for the author's preview.
    ///
    /// Returns `Ok(None)` when the quiz does not exist.
    ///
    /// # Errors
    ///
    /// Returns `AuthoringError::Storage` if repository access fails.
    pub async fn load_quiz(
        &self,
        quiz_id: QuizId,
    ) -> Result<Option<QuizWithQuestions>, AuthoringError> {
        let bundle = self.quizzes.get_quiz_with_questions(quiz_id).await?;
        Ok(bundle)
    }
}
