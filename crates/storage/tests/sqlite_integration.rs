use chrono::Duration;
use quiz_core::model::{AuthorId, Letter, QuizId, SubjectId};
use quiz_core::parser::QuizTextParser;
use quiz_core::time::fixed_now;
use storage::repository::{
    NewQuestionRecord, NewQuizRecord, NewSubjectRecord, QuizRepository, StorageError, StoreProbe,
    SubjectRepository,
};
use storage::sqlite::SqliteRepository;

const QUIZ_TEXT: &str = "\
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

fn author() -> AuthorId {
    AuthorId::new("tester").unwrap()
}

fn letter(c: char) -> Letter {
    Letter::from_char(c).unwrap()
}

async fn connect(name: &str) -> SqliteRepository {
    let url = format!("sqlite:file:{name}?mode=memory&cache=shared");
    let repo = SqliteRepository::connect(&url).await.expect("connect");
    repo.migrate().await.expect("migrate");
    repo
}

async fn seed_quiz(repo: &SqliteRepository, subject: &str, quiz: &str, text: &str) -> QuizId {
    let author = author();
    let subject_id = match repo.find_subject_by_name(subject).await.unwrap() {
        Some(existing) => existing.id(),
        None => repo
            .insert_subject(
                &author,
                NewSubjectRecord {
                    name: subject.into(),
                },
            )
            .await
            .unwrap(),
    };

    let quiz_id = repo
        .insert_quiz(
            &author,
            NewQuizRecord {
                subject_id,
                name: quiz.into(),
                created_at: fixed_now(),
            },
        )
        .await
        .unwrap();

    let questions = QuizTextParser::default().parse(text).unwrap();
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
    quiz_id
}

#[tokio::test]
async fn sqlite_round_trips_a_quiz_tree() {
    let repo = connect("memdb_quiz_roundtrip").await;
    let quiz_id = seed_quiz(&repo, "Math", "Basics", QUIZ_TEXT).await;

    let bundle = repo
        .get_quiz_with_questions(quiz_id)
        .await
        .expect("fetch")
        .expect("quiz exists");

    assert_eq!(bundle.quiz.name(), "Basics");
    assert_eq!(bundle.quiz.created_at(), fixed_now());
    assert_eq!(bundle.questions.len(), 2);

    let first = &bundle.questions[0];
    assert_eq!(first.text, "What is 2+2?");
    assert_eq!(first.correct_answer, Some(letter('b')));
    let letters: String = first.choices.iter().map(|c| c.letter.as_char()).collect();
    assert_eq!(letters, "ABCD");

    let second = &bundle.questions[1];
    assert_eq!(second.choices.len(), 2);
    assert_eq!(second.correct_answer, Some(letter('b')));
}

#[tokio::test]
async fn sqlite_preserves_unset_correct_answer() {
    let repo = connect("memdb_quiz_unset_answer").await;
    let quiz_id = seed_quiz(&repo, "Math", "No answers", "1. Pick one\na) x\nb) y").await;

    let bundle = repo
        .get_quiz_with_questions(quiz_id)
        .await
        .unwrap()
        .unwrap();
    assert_eq!(bundle.questions[0].correct_answer, None);
}

#[tokio::test]
async fn sqlite_missing_quiz_reads_as_none() {
    let repo = connect("memdb_quiz_missing").await;
    let found = repo
        .get_quiz_with_questions(QuizId::new(1234))
        .await
        .unwrap();
    assert!(found.is_none());
}

#[tokio::test]
async fn sqlite_lists_subjects_with_quizzes_in_creation_order() {
    let repo = connect("memdb_quiz_overview").await;
    seed_quiz(&repo, "Math", "Basics", QUIZ_TEXT).await;
    seed_quiz(&repo, "Math", "Advanced", QUIZ_TEXT).await;
    seed_quiz(&repo, "History", "Dates", QUIZ_TEXT).await;

    let overview = repo.list_subjects_with_quizzes(10).await.unwrap();
    assert_eq!(overview.len(), 2);
    assert_eq!(overview[0].subject.name(), "Math");
    let names: Vec<&str> = overview[0].quizzes.iter().map(|q| q.name()).collect();
    assert_eq!(names, vec!["Basics", "Advanced"]);
    assert_eq!(overview[1].subject.name(), "History");

    let limited = repo.list_subjects_with_quizzes(1).await.unwrap();
    assert_eq!(limited.len(), 1);
    assert_eq!(limited[0].subject.name(), "Math");
}

#[tokio::test]
async fn sqlite_rejects_duplicate_subject_names() {
    let repo = connect("memdb_quiz_conflict").await;
    let record = NewSubjectRecord {
        name: "Math".into(),
    };
    repo.insert_subject(&author(), record.clone()).await.unwrap();
    let err = repo.insert_subject(&author(), record).await.unwrap_err();
    assert!(matches!(err, StorageError::Conflict));
}

#[tokio::test]
async fn sqlite_rejects_quiz_for_missing_subject() {
    let repo = connect("memdb_quiz_orphan").await;
    let err = repo
        .insert_quiz(
            &author(),
            NewQuizRecord {
                subject_id: SubjectId::new(77),
                name: "Orphan".into(),
                created_at: fixed_now() + Duration::minutes(1),
            },
        )
        .await
        .unwrap_err();
    assert!(matches!(err, StorageError::NotFound));
}

#[tokio::test]
async fn sqlite_probe_answers_after_migrate() {
    let repo = connect("memdb_quiz_probe").await;
    let health = repo.check_connection().await.unwrap();
    assert_eq!(health.backend, "sqlite");
}
