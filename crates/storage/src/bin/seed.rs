use std::fmt;
use std::fs;

use chrono::{DateTime, Utc};
use quiz_core::model::{AuthorId, Quiz, QuizId, Subject, SubjectId};
use quiz_core::parser::QuizTextParser;
use storage::repository::{NewQuestionRecord, NewQuizRecord, NewSubjectRecord, Storage};
use tracing::{info, warn};

const SAMPLE_QUIZ: &str = "\
1. What is 2+2?
a) 3
b) 4
c) 5
d) 6
Answer: b

2. Which planet is closest to the sun?
a) Venus
b) Earth
c) Mercury
d) Mars
Answer: c
";

#[derive(Debug, Clone)]
struct Args {
    db_url: String,
    author: String,
    subject: String,
    quiz: String,
    file: Option<String>,
    now: Option<DateTime<Utc>>,
}

#[derive(Debug)]
enum ArgsError {
    MissingValue { flag: &'static str },
    UnknownArg(String),
    InvalidDbUrl { raw: String },
    InvalidNow { raw: String },
}

impl fmt::Display for ArgsError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ArgsError::MissingValue { flag } => write!(f, "{flag} requires a value"),
            ArgsError::UnknownArg(arg) => write!(f, "unknown argument: {arg}"),
            ArgsError::InvalidDbUrl { raw } => write!(f, "invalid --db value: {raw}"),
            ArgsError::InvalidNow { raw } => {
                write!(f, "invalid --now value (expected RFC3339): {raw}")
            }
        }
    }
}

impl std::error::Error for ArgsError {}

fn require_value(
    args: &mut impl Iterator<Item = String>,
    flag: &'static str,
) -> Result<String, ArgsError> {
    args.next().ok_or(ArgsError::MissingValue { flag })
}

impl Args {
    fn parse() -> Result<Self, ArgsError> {
        let mut db_url =
            std::env::var("QUIZ_DB_URL").unwrap_or_else(|_| "sqlite:quiz.sqlite3".into());
        let mut author = std::env::var("QUIZ_AUTHOR").unwrap_or_else(|_| "seed".into());
        let mut subject = std::env::var("QUIZ_SUBJECT").unwrap_or_else(|_| "Mathematics".into());
        let mut quiz = std::env::var("QUIZ_NAME").unwrap_or_else(|_| "Practice quiz".into());
        let mut file: Option<String> = None;
        let mut now: Option<DateTime<Utc>> = None;

        let mut args = std::env::args().skip(1);
        while let Some(arg) = args.next() {
            match arg.as_str() {
                "--db" => {
                    let value = require_value(&mut args, "--db")?;
                    if value.trim().is_empty() {
                        return Err(ArgsError::InvalidDbUrl { raw: value });
                    }
                    db_url = value;
                }
                "--author" => author = require_value(&mut args, "--author")?,
                "--subject" => subject = require_value(&mut args, "--subject")?,
                "--quiz" => quiz = require_value(&mut args, "--quiz")?,
                "--file" => file = Some(require_value(&mut args, "--file")?),
                "--now" => {
                    let raw = require_value(&mut args, "--now")?;
                    let parsed = DateTime::parse_from_rfc3339(&raw)
                        .map_err(|_| ArgsError::InvalidNow { raw })?;
                    now = Some(parsed.with_timezone(&Utc));
                }
                "-h" | "--help" => {
                    print_usage();
                    std::process::exit(0);
                }
                _ => return Err(ArgsError::UnknownArg(arg)),
            }
        }

        Ok(Self {
            db_url,
            author,
            subject,
            quiz,
            file,
            now,
        })
    }
}

fn print_usage() {
    eprintln!("Usage:");
    eprintln!("  cargo run -p storage --bin seed -- [options]");
    eprintln!();
    eprintln!("Options:");
    eprintln!("  --db <sqlite_url>         SQLite URL (default: sqlite:quiz.sqlite3)");
    eprintln!("  --author <name>           Identity recorded on every write (default: seed)");
    eprintln!("  --subject <name>          Subject to file the quiz under (default: Mathematics)");
    eprintln!("  --quiz <name>             Quiz name (default: Practice quiz)");
    eprintln!("  --file <path>             Quiz text file; a built-in sample is used otherwise");
    eprintln!("  --now <rfc3339>           Fixed creation time for deterministic seeding");
    eprintln!("  -h, --help                Show this help");
    eprintln!();
    eprintln!("Environment (same as flags):");
    eprintln!("  QUIZ_DB_URL, QUIZ_AUTHOR, QUIZ_SUBJECT, QUIZ_NAME");
}

async fn run() -> Result<(), Box<dyn std::error::Error>> {
    let args = Args::parse().map_err(|e| {
        eprintln!("{e}");
        print_usage();
        e
    })?;

    let text = match &args.file {
        Some(path) => fs::read_to_string(path)?,
        None => SAMPLE_QUIZ.to_owned(),
    };

    let author = AuthorId::new(args.author.clone())?;
    let questions = QuizTextParser::default().parse(&text)?;
    for (i, question) in questions.iter().enumerate() {
        if question.correct_answer.is_none() {
            warn!(block = i + 1, "question has no recorded correct answer");
        }
    }

    let storage = Storage::sqlite(&args.db_url).await?;
    let now = args.now.unwrap_or_else(Utc::now);

    let subject_id = match storage.subjects.find_subject_by_name(args.subject.trim()).await? {
        Some(existing) => existing.id(),
        None => {
            let subject = Subject::new(SubjectId::new(1), args.subject.clone())?;
            storage
                .subjects
                .insert_subject(&author, NewSubjectRecord::from_subject(&subject))
                .await?
        }
    };

    let quiz = Quiz::new(QuizId::new(1), subject_id, args.quiz.clone(), now)?;
    let quiz_id = storage
        .quizzes
        .insert_quiz(&author, NewQuizRecord::from_quiz(&quiz))
        .await?;

    let mut seeded = 0_u32;
    for question in questions {
        let question_id = storage
            .quizzes
            .insert_question(
                &author,
                NewQuestionRecord::from_validated(quiz_id, seeded, &question),
            )
            .await?;
        storage
            .quizzes
            .insert_choices(&author, question_id, &question.choices)
            .await?;
        seeded += 1;
    }

    info!(
        quiz_id = quiz_id.value(),
        questions = seeded,
        db = %args.db_url,
        "seeded quiz"
    );

    Ok(())
}

#[tokio::main]
async fn main() {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info")),
        )
        .init();

    if let Err(err) = run().await {
        eprintln!("{err}");
        std::process::exit(2);
    }
}
