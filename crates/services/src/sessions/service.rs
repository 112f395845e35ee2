use std::sync::Arc;

use quiz_core::model::{Letter, Question, Quiz, QuizId};
use quiz_core::parser::render_quiz_text;
use quiz_core::session::{AnswerSheet, AnswerSheetError, OptionState, QuestionStatus};
use storage::repository::QuizRepository;

use super::progress::SessionProgress;
use crate::error::SessionError;

//
// ─── SESSION ───────────────────────────────────────────────────────────────────
//

/// One taker's pass through a loaded quiz.
///
/// Holds the questions plus a fresh [`AnswerSheet`]; nothing here is
/// persisted. The wrapper adds what the bare sheet cannot know: that a
/// selected letter must actually belong to the question's choices.
#[derive(Debug)]
pub struct QuizSession {
    quiz: Quiz,
    questions: Vec<Question>,
    sheet: AnswerSheet,
}

impl QuizSession {
    /// Create a session over loaded questions, every question unanswered.
    ///
    /// # Errors
    ///
    /// Returns `SessionError::Empty` if the quiz has no questions.
    pub fn new(quiz: Quiz, questions: Vec<Question>) -> Result<Self, SessionError> {
        if questions.is_empty() {
            return Err(SessionError::Empty);
        }
        let sheet = AnswerSheet::new(questions.len());
        Ok(Self {
            quiz,
            questions,
            sheet,
        })
    }

    #[must_use]
    pub fn quiz(&self) -> &Quiz {
        &self.quiz
    }

    #[must_use]
    pub fn questions(&self) -> &[Question] {
        &self.questions
    }

    #[must_use]
    pub fn sheet(&self) -> &AnswerSheet {
        &self.sheet
    }

    fn question(&self, index: usize) -> Result<&Question, SessionError> {
        self.questions
            .get(index)
            .ok_or(SessionError::Sheet(AnswerSheetError::OutOfRange {
                index,
                len: self.questions.len(),
            }))
    }

    /// Record the taker's choice for one question, overwriting any earlier
    /// choice there, and report the resulting status.
    ///
    /// # Errors
    ///
    /// Returns `SessionError::UnknownOption` when the letter is not one of
    /// the question's choices, or `SessionError::Sheet` for a bad index.
    pub fn select_answer(
        &mut self,
        index: usize,
        letter: Letter,
    ) -> Result<QuestionStatus, SessionError> {
        let question = self.question(index)?;
        if question.choice(letter).is_none() {
            return Err(SessionError::UnknownOption { index, letter });
        }
        self.sheet.select(index, letter)?;
        Ok(self.sheet.status(index, self.question(index)?))
    }

    /// Display classification for one option of the question at `index`.
    ///
    /// # Errors
    ///
    /// Returns `SessionError::Sheet` for a bad index.
    pub fn option_state(&self, index: usize, letter: Letter) -> Result<OptionState, SessionError> {
        let question = self.question(index)?;
        Ok(self.sheet.option_state(index, question, letter))
    }

    /// Answer lifecycle state of the question at `index`.
    ///
    /// # Errors
    ///
    /// Returns `SessionError::Sheet` for a bad index.
    pub fn status(&self, index: usize) -> Result<QuestionStatus, SessionError> {
        let question = self.question(index)?;
        Ok(self.sheet.status(index, question))
    }

    #[must_use]
    pub fn is_answered(&self, index: usize) -> bool {
        self.sheet.is_answered(index)
    }

    /// The correct answer to reveal after a wrong selection, if any was
    /// recorded.
    ///
    /// # Errors
    ///
    /// Returns `SessionError::Sheet` for a bad index.
    pub fn reveal_correct(&self, index: usize) -> Result<Option<Letter>, SessionError> {
        let question = self.question(index)?;
        Ok(self.sheet.reveal_correct(index, question))
    }

    #[must_use]
    pub fn progress(&self) -> SessionProgress {
        let total = self.questions.len();
        let answered = self.sheet.answered();
        let correct = self
            .questions
            .iter()
            .enumerate()
            .filter(|(i, q)| self.sheet.status(*i, q) == QuestionStatus::AnsweredCorrect)
            .count();

        SessionProgress {
            total,
            answered,
            remaining: total - answered,
            correct,
            is_complete: answered == total,
        }
    }

    /// Clears every selection, as if the quiz had just been loaded again.
    pub fn restart(&mut self) {
        self.sheet.clear();
    }

    /// Text form of the quiz for the share/copy flow.
    ///
    /// Feeding this back through the parser reproduces the same questions.
    #[must_use]
    pub fn share_text(&self) -> String {
        render_quiz_text(&self.questions)
    }
}

//
// ─── SESSION SERVICE ───────────────────────────────────────────────────────────
//

/// Loads quizzes into fresh sessions.
#[derive(Clone)]
pub struct SessionService {
    quizzes: Arc<dyn QuizRepository>,
}

impl SessionService {
    #[must_use]
    pub fn new(quizzes: Arc<dyn QuizRepository>) -> Self {
        Self { quizzes }
    }

    /// Load a quiz and start taking it.
    ///
    /// Every call builds a fresh answer sheet, so loading — or reloading —
    /// a quiz always starts from all-unanswered.
    ///
    /// # Errors
    ///
    /// Returns `SessionError::QuizNotFound` for an unknown id,
    /// `SessionError::Empty` for a quiz without questions, and
    /// `SessionError::Storage` if the store fails.
    pub async fn start(&self, quiz_id: QuizId) -> Result<QuizSession, SessionError> {
        let bundle = self
            .quizzes
            .get_quiz_with_questions(quiz_id)
            .await?
            .ok_or(SessionError::QuizNotFound)?;
        QuizSession::new(bundle.quiz, bundle.questions)
    }
}

//
// ─── TESTS ─────────────────────────────────────────────────────────────────────
//

#[cfg(test)]
mod tests {
    use super::*;
    use quiz_core::model::{AuthorId, SubjectId};
    use quiz_core::parser::QuizTextParser;
    use quiz_core::time::fixed_now;
    use storage::repository::{
        InMemoryRepository, NewQuestionRecord, NewQuizRecord, NewSubjectRecord, SubjectRepository,
    };

    const TEXT: &str = "\
1. What is 2+2?
a) 3
b) 4
c) 5
d) 6
Answer: b

2. Which planet is closest to the sun?
a) Venus
b) Mercury
Answer: b
";

    fn letter(c: char) -> Letter {
        Letter::from_char(c).unwrap()
    }

    async fn seeded_service() -> (SessionService, QuizId) {
        let repo = InMemoryRepository::new();
        let author = AuthorId::new("tester").unwrap();

        let subject_id = repo
            .insert_subject(
                &author,
                NewSubjectRecord {
                    name: "Math".into(),
                },
            )
            .await
            .unwrap();
        let quiz_id = repo
            .insert_quiz(
                &author,
                NewQuizRecord {
                    subject_id,
                    name: "Basics".into(),
                    created_at: fixed_now(),
                },
            )
            .await
            .unwrap();

        let questions = QuizTextParser::default().parse(TEXT).unwrap();
        let mut position = 0_u32;
        for question in questions {
            let question_id = repo
                .insert_question(
                    &author,
                    NewQuestionRecord::from_validated(quiz_id, position, &question),
                )
                .await
                .unwrap();
            repo.insert_choices(&author, question_id, &question.choices)
                .await
                .unwrap();
            position += 1;
        }

        (SessionService::new(Arc::new(repo)), quiz_id)
    }

    #[tokio::test]
    async fn start_builds_an_unanswered_session() {
        let (service, quiz_id) = seeded_service().await;
        let session = service.start(quiz_id).await.unwrap();

        assert_eq!(session.quiz().name(), "Basics");
        assert_eq!(session.questions().len(), 2);
        let progress = session.progress();
        assert_eq!(progress.total, 2);
        assert_eq!(progress.answered, 0);
        assert_eq!(progress.remaining, 2);
        assert!(!progress.is_complete);
    }

    #[tokio::test]
    async fn selection_drives_option_state_and_hint() {
        let (service, quiz_id) = seeded_service().await;
        let mut session = service.start(quiz_id).await.unwrap();

        let status = session.select_answer(0, letter('b')).unwrap();
        assert_eq!(status, QuestionStatus::AnsweredCorrect);
        assert_eq!(
            session.option_state(0, letter('b')).unwrap(),
            OptionState::SelectedCorrect
        );
        assert_eq!(
            session.option_state(0, letter('c')).unwrap(),
            OptionState::Neutral
        );
        assert_eq!(session.reveal_correct(0).unwrap(), None);

        let status = session.select_answer(1, letter('a')).unwrap();
        assert_eq!(status, QuestionStatus::AnsweredIncorrect);
        assert_eq!(session.reveal_correct(1).unwrap(), Some(letter('b')));

        let progress = session.progress();
        assert_eq!(progress.answered, 2);
        assert_eq!(progress.correct, 1);
        assert!(progress.is_complete);
    }

    #[tokio::test]
    async fn answer_state_is_tracked_per_question() {
        let (service, quiz_id) = seeded_service().await;
        let mut session = service.start(quiz_id).await.unwrap();

        session.select_answer(0, letter('a')).unwrap();
        assert_eq!(session.status(0).unwrap(), QuestionStatus::AnsweredIncorrect);
        assert_eq!(session.status(1).unwrap(), QuestionStatus::Unanswered);
    }

    #[tokio::test]
    async fn selecting_a_letter_the_question_lacks_fails() {
        let (service, quiz_id) = seeded_service().await;
        let mut session = service.start(quiz_id).await.unwrap();

        // Question 2 only has options A and B.
        let err = session.select_answer(1, letter('d')).unwrap_err();
        assert!(matches!(
            err,
            SessionError::UnknownOption { index: 1, .. }
        ));
        assert!(!session.is_answered(1));
    }

    #[tokio::test]
    async fn reloading_resets_every_question() {
        let (service, quiz_id) = seeded_service().await;
        let mut session = service.start(quiz_id).await.unwrap();
        session.select_answer(0, letter('b')).unwrap();
        session.select_answer(1, letter('b')).unwrap();

        let reloaded = service.start(quiz_id).await.unwrap();
        assert_eq!(reloaded.progress().answered, 0);
        assert_eq!(reloaded.status(0).unwrap(), QuestionStatus::Unanswered);

        session.restart();
        assert_eq!(session.progress().answered, 0);
    }

    #[tokio::test]
    async fn share_text_round_trips_through_the_parser() {
        let (service, quiz_id) = seeded_service().await;
        let session = service.start(quiz_id).await.unwrap();

        let shared = session.share_text();
        let reparsed = QuizTextParser::default().parse(&shared).unwrap();
        assert_eq!(reparsed.len(), 2);
        assert_eq!(reparsed[0].text, session.questions()[0].text);
        assert_eq!(
            reparsed[1].correct_answer,
            session.questions()[1].correct_answer
        );
    }

    #[tokio::test]
    async fn unknown_quiz_is_reported() {
        let (service, _) = seeded_service().await;
        let err = service.start(QuizId::new(4242)).await.unwrap_err();
        assert!(matches!(err, SessionError::QuizNotFound));
    }
}
