use std::collections::HashSet;

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::model::ids::{QuestionId, QuizId};
use crate::model::letter::Letter;

//
// ─── QUESTION TYPES ────────────────────────────────────────────────────────────
//

/// One selectable option within a question.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Choice {
    pub letter: Letter,
    pub text: String,
}

impl Choice {
    #[must_use]
    pub fn new(letter: Letter, text: impl Into<String>) -> Self {
        Self {
            letter,
            text: text.into(),
        }
    }
}

/// Unvalidated question parts, as produced by the parser or an editor form.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct QuestionDraft {
    pub text: String,
    pub choices: Vec<Choice>,
    /// `None` means no correct answer was recorded for this question.
    pub correct_answer: Option<Letter>,
}

impl QuestionDraft {
    /// Checks the question invariants and normalizes whitespace.
    ///
    /// # Errors
    ///
    /// Returns `QuestionError::EmptyText` for a blank question,
    /// `QuestionError::DuplicateChoice` when two choices share a letter,
    /// `QuestionError::EmptyChoiceText` for a blank choice body, and
    /// `QuestionError::UnknownCorrectAnswer` when the recorded answer names
    /// a letter no choice carries.
    pub fn validate(self) -> Result<ValidatedQuestion, QuestionError> {
        let text = self.text.trim().to_owned();
        if text.is_empty() {
            return Err(QuestionError::EmptyText);
        }

        let mut seen = HashSet::new();
        for choice in &self.choices {
            if choice.text.trim().is_empty() {
                return Err(QuestionError::EmptyChoiceText {
                    letter: choice.letter,
                });
            }
            if !seen.insert(choice.letter) {
                return Err(QuestionError::DuplicateChoice {
                    letter: choice.letter,
                });
            }
        }

        if let Some(letter) = self.correct_answer {
            if !seen.contains(&letter) {
                return Err(QuestionError::UnknownCorrectAnswer { letter });
            }
        }

        let choices = self
            .choices
            .into_iter()
            .map(|c| Choice::new(c.letter, c.text.trim().to_owned()))
            .collect();

        Ok(ValidatedQuestion {
            text,
            choices,
            correct_answer: self.correct_answer,
        })
    }
}

/// A question whose invariants hold but which has not been persisted yet.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ValidatedQuestion {
    pub text: String,
    pub choices: Vec<Choice>,
    pub correct_answer: Option<Letter>,
}

impl ValidatedQuestion {
    #[must_use]
    pub fn assign_id(self, id: QuestionId, quiz_id: QuizId) -> Question {
        Question {
            id,
            quiz_id,
            text: self.text,
            choices: self.choices,
            correct_answer: self.correct_answer,
        }
    }
}

/// A persisted question with its ordered choices.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Question {
    pub id: QuestionId,
    pub quiz_id: QuizId,
    pub text: String,
    pub choices: Vec<Choice>,
    pub correct_answer: Option<Letter>,
}

impl Question {
    /// Rehydrates a question from storage, re-checking the invariants.
    ///
    /// # Errors
    ///
    /// Returns `QuestionError` as [`QuestionDraft::validate`] does.
    pub fn from_persisted(
        id: QuestionId,
        quiz_id: QuizId,
        text: String,
        choices: Vec<Choice>,
        correct_answer: Option<Letter>,
    ) -> Result<Self, QuestionError> {
        let validated = QuestionDraft {
            text,
            choices,
            correct_answer,
        }
        .validate()?;
        Ok(validated.assign_id(id, quiz_id))
    }

    /// Looks up the choice carrying the given letter.
    #[must_use]
    pub fn choice(&self, letter: Letter) -> Option<&Choice> {
        self.choices.iter().find(|c| c.letter == letter)
    }

    /// True when a correct answer was recorded for this question.
    #[must_use]
    pub fn has_correct_answer(&self) -> bool {
        self.correct_answer.is_some()
    }
}

//
// ─── QUESTION VALIDATION ERRORS ────────────────────────────────────────────────
//

#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum QuestionError {
    #[error("question text cannot be empty")]
    EmptyText,

    #[error("choice {letter} has no text")]
    EmptyChoiceText { letter: Letter },

    #[error("duplicate choice letter {letter}")]
    DuplicateChoice { letter: Letter },

    #[error("correct answer {letter} does not match any choice")]
    UnknownCorrectAnswer { letter: Letter },
}

//
// ─── TESTS ─────────────────────────────────────────────────────────────────────
//
