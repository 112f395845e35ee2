use std::sync::Arc;

use quiz_core::Clock;
use quiz_core::model::{AuthorId, Letter, QuestionId, QuizId};
use quiz_core::parser::QuizTextParser;
use quiz_core::session::{OptionState, QuestionStatus};
use quiz_core::time::fixed_now;
use services::{AppServices, AuthoringError, QuizService, SubjectService};
use storage::repository::{
    NewQuestionRecord, NewQuizRecord, QuizRepository, QuizWithQuestions, StorageError,
};

const PASTED_QUIZ: &str = "\
1. What is 2+2?
a) 3
b) 4
c) 5
d) 6
Answer: b

2. Which planet is closest to the sun?
a) Venus
b) Mercury
c) Mars
d) Jupiter
Answer: b
";

fn letter(c: char) -> Letter {
    Letter::from_char(c).unwrap()
}

#[tokio::test]
async fn author_flow_paste_take_share() {
    let services = AppServices::new_sqlite(
        "sqlite:file:memdb_author_flow?mode=memory&cache=shared",
        Clock::fixed(fixed_now()),
    )
    .await
    .expect("connect sqlite");
    let author = AuthorId::new("alice").unwrap();

    // Author pastes the text blob and files it under a subject.
    let quiz_id = services
        .quiz_service()
        .create_quiz_from_text(&author, "Math", "Basics", PASTED_QUIZ)
        .await
        .expect("create quiz");

    // The browse view shows the subject with its quiz.
    let overview = services
        .subject_service()
        .list_overview(25)
        .await
        .expect("overview");
    assert_eq!(overview.len(), 1);
    assert_eq!(overview[0].subject.name(), "Math");
    assert_eq!(overview[0].quizzes.len(), 1);
    assert_eq!(overview[0].quizzes[0].id(), quiz_id);
    assert_eq!(overview[0].quizzes[0].created_at(), fixed_now());

    // Taking the quiz: immediate correctness feedback per selection.
    let mut session = services
        .session_service()
        .start(quiz_id)
        .await
        .expect("start session");
    assert_eq!(session.questions().len(), 2);

    let status = session.select_answer(0, letter('b')).unwrap();
    assert_eq!(status, QuestionStatus::AnsweredCorrect);
    assert_eq!(
        session.option_state(0, letter('b')).unwrap(),
        OptionState::SelectedCorrect
    );

    let status = session.select_answer(1, letter('d')).unwrap();
    assert_eq!(status, QuestionStatus::AnsweredIncorrect);
    assert_eq!(session.reveal_correct(1).unwrap(), Some(letter('b')));

    // Changing the answer re-evaluates.
    let status = session.select_answer(1, letter('b')).unwrap();
    assert_eq!(status, QuestionStatus::AnsweredCorrect);
    assert!(session.progress().is_complete);
    assert_eq!(session.progress().correct, 2);

    // Share text round-trips through the parser.
    let shared = session.share_text();
    let reparsed = QuizTextParser::default().parse(&shared).expect("reparse");
    assert_eq!(reparsed.len(), 2);
    assert_eq!(reparsed[0].text, "What is 2+2?");
    assert_eq!(reparsed[0].correct_answer, Some(letter('b')));

    // Reloading the quiz starts over from unanswered.
    let reloaded = services
        .session_service()
        .start(quiz_id)
        .await
        .expect("reload");
    assert_eq!(reloaded.progress().answered, 0);
}

/// Store double whose writes fail after the quiz row, to observe error
/// propagation mid-tree.
struct FlakyQuizStore;

#[async_trait::async_trait]
impl QuizRepository for FlakyQuizStore {
    async fn insert_quiz(
        &self,
        _author: &AuthorId,
        _record: NewQuizRecord,
    ) -> Result<QuizId, StorageError> {
        Ok(QuizId::new(1))
    }

    async fn insert_question(
        &self,
        _author: &AuthorId,
        _record: NewQuestionRecord,
    ) -> Result<QuestionId, StorageError> {
        Err(StorageError::Connection("socket closed".into()))
    }

    async fn insert_choices(
        &self,
        _author: &AuthorId,
        _question_id: QuestionId,
        _choices: &[quiz_core::model::Choice],
    ) -> Result<(), StorageError> {
        Ok(())
    }

    async fn get_quiz_with_questions(
        &self,
        _id: QuizId,
    ) -> Result<Option<QuizWithQuestions>, StorageError> {
        Ok(None)
    }
}

#[tokio::test]
async fn store_failures_surface_unchanged() {
    let memory = storage::repository::Storage::in_memory();
    let service = QuizService::new(
        Clock::fixed(fixed_now()),
        QuizTextParser::default(),
        SubjectService::new(Arc::clone(&memory.subjects)),
        Arc::new(FlakyQuizStore),
    );
    let author = AuthorId::new("alice").unwrap();

    let err = service
        .create_quiz_from_text(&author, "Math", "Basics", PASTED_QUIZ)
        .await
        .unwrap_err();

    match err {
        AuthoringError::Storage(StorageError::Connection(message)) => {
            assert_eq!(message, "socket closed");
        }
        other => panic!("unexpected error: {other}"),
    }
}
