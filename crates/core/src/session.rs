//! In-memory answer state for the quiz currently being taken.
//!
//! The [`AnswerSheet`] is a transient overlay keyed by question index: it is
//! built fresh every time a quiz is loaded, mutated only by the taker's
//! selections, and never persisted. All display state — which option to
//! highlight, whether to reveal the correct answer — is derived from it.

use thiserror::Error;

use crate::model::{Letter, Question};

//
// ─── ERRORS ────────────────────────────────────────────────────────────────────
//

#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum AnswerSheetError {
    #[error("question index {index} is out of range for a sheet of {len} questions")]
    OutOfRange { index: usize, len: usize },
}

//
// ─── DERIVED STATES ────────────────────────────────────────────────────────────
//

/// Display classification for one option of one question.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OptionState {
    /// Not selected, or the question has no selection yet.
    Neutral,
    /// Selected and it is the recorded correct answer.
    SelectedCorrect,
    /// Selected and it is not the recorded correct answer.
    SelectedIncorrect,
}

/// Per-question answer lifecycle.
///
/// A question moves from `Unanswered` to one of the answered states on the
/// first selection; re-selecting a different option re-evaluates and may
/// flip between the two answered states.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum QuestionStatus {
    Unanswered,
    AnsweredCorrect,
    AnsweredIncorrect,
}

/// Classifies one option given the stored selection and the recorded
/// correct answer.
///
/// A question without a recorded correct answer never yields
/// `SelectedCorrect`, no matter what is selected.
#[must_use]
pub fn option_state(
    selection: Option<Letter>,
    correct_answer: Option<Letter>,
    letter: Letter,
) -> OptionState {
    match selection {
        Some(selected) if selected == letter => match correct_answer {
            Some(correct) if correct == letter => OptionState::SelectedCorrect,
            _ => OptionState::SelectedIncorrect,
        },
        _ => OptionState::Neutral,
    }
}

//
// ─── ANSWER SHEET ──────────────────────────────────────────────────────────────
//

/// Selections for each question of the quiz being taken, by question index.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AnswerSheet {
    selections: Vec<Option<Letter>>,
}

impl AnswerSheet {
    /// Creates a sheet with every question unanswered.
    #[must_use]
    pub fn new(question_count: usize) -> Self {
        Self {
            selections: vec![None; question_count],
        }
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.selections.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.selections.is_empty()
    }

    /// The selection for the given question, `None` while unanswered.
    #[must_use]
    pub fn selection(&self, index: usize) -> Option<Letter> {
        self.selections.get(index).copied().flatten()
    }

    #[must_use]
    pub fn is_answered(&self, index: usize) -> bool {
        self.selection(index).is_some()
    }

    /// Number of questions with a selection.
    #[must_use]
    pub fn answered(&self) -> usize {
        self.selections.iter().filter(|s| s.is_some()).count()
    }

    /// Records a selection, overwriting any prior choice for that question
    /// only.
    ///
    /// # Errors
    ///
    /// Returns `AnswerSheetError::OutOfRange` for an index past the end of
    /// the sheet.
    pub fn select(&mut self, index: usize, letter: Letter) -> Result<(), AnswerSheetError> {
        let len = self.selections.len();
        let slot = self
            .selections
            .get_mut(index)
            .ok_or(AnswerSheetError::OutOfRange { index, len })?;
        *slot = Some(letter);
        Ok(())
    }

    /// Pure form of [`select`](Self::select): consumes the sheet and returns
    /// the updated one, leaving composition to the caller.
    ///
    /// # Errors
    ///
    /// Returns `AnswerSheetError::OutOfRange` as `select` does.
    pub fn with_selection(mut self, index: usize, letter: Letter) -> Result<Self, AnswerSheetError> {
        self.select(index, letter)?;
        Ok(self)
    }

    /// Resets every question to unanswered.
    pub fn clear(&mut self) {
        for slot in &mut self.selections {
            *slot = None;
        }
    }

    /// Classifies one option of the question at `index`.
    ///
    /// The caller passes the question displayed at that index; the result is
    /// a pure function of the stored selection and the question.
    #[must_use]
    pub fn option_state(&self, index: usize, question: &Question, letter: Letter) -> OptionState {
        option_state(self.selection(index), question.correct_answer, letter)
    }

    /// The answer lifecycle state of the question at `index`.
    #[must_use]
    pub fn status(&self, index: usize, question: &Question) -> QuestionStatus {
        match self.selection(index) {
            None => QuestionStatus::Unanswered,
            Some(selected) if question.correct_answer == Some(selected) => {
                QuestionStatus::AnsweredCorrect
            }
            Some(_) => QuestionStatus::AnsweredIncorrect,
        }
    }

    /// The correct answer to reveal as a hint, only once the question was
    /// answered incorrectly and an answer is recorded at all.
    #[must_use]
    pub fn reveal_correct(&self, index: usize, question: &Question) -> Option<Letter> {
        match self.status(index, question) {
            QuestionStatus::AnsweredIncorrect => question.correct_answer,
            _ => None,
        }
    }
}

//
// ─── TESTS ─────────────────────────────────────────────────────────────────────
//

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::{Choice, QuestionDraft, QuestionId, QuizId};

    fn letter(c: char) -> Letter {
        Letter::from_char(c).unwrap()
    }

    fn question(correct: Option<char>) -> Question {
        QuestionDraft {
            text: "What is 2+2?".into(),
            choices: vec![
                Choice::new(letter('a'), "3"),
                Choice::new(letter('b'), "4"),
                Choice::new(letter('c'), "5"),
                Choice::new(letter('d'), "6"),
            ],
            correct_answer: correct.map(letter),
        }
        .validate()
        .unwrap()
        .assign_id(QuestionId::new(1), QuizId::new(1))
    }

    #[test]
    fn fresh_sheet_is_unanswered() {
        let sheet = AnswerSheet::new(3);
        let q = question(Some('b'));
        assert_eq!(sheet.len(), 3);
        assert_eq!(sheet.answered(), 0);
        for i in 0..3 {
            assert!(!sheet.is_answered(i));
            assert_eq!(sheet.status(i, &q), QuestionStatus::Unanswered);
        }
    }

    #[test]
    fn correct_selection_highlights_only_itself() {
        let q = question(Some('b'));
        let mut sheet = AnswerSheet::new(1);
        sheet.select(0, letter('b')).unwrap();

        assert_eq!(
            sheet.option_state(0, &q, letter('b')),
            OptionState::SelectedCorrect
        );
        assert_eq!(sheet.option_state(0, &q, letter('c')), OptionState::Neutral);
        assert_eq!(sheet.status(0, &q), QuestionStatus::AnsweredCorrect);
        assert_eq!(sheet.reveal_correct(0, &q), None);
    }

    #[test]
    fn incorrect_selection_reveals_the_answer() {
        let q = question(Some('b'));
        let mut sheet = AnswerSheet::new(1);
        sheet.select(0, letter('a')).unwrap();

        assert_eq!(
            sheet.option_state(0, &q, letter('a')),
            OptionState::SelectedIncorrect
        );
        assert_eq!(sheet.option_state(0, &q, letter('b')), OptionState::Neutral);
        assert_eq!(sheet.status(0, &q), QuestionStatus::AnsweredIncorrect);
        assert_eq!(sheet.reveal_correct(0, &q), Some(letter('b')));
    }

    #[test]
    fn unset_correct_answer_never_reads_as_correct() {
        let q = question(None);
        let mut sheet = AnswerSheet::new(1);
        for c in ['a', 'b', 'c', 'd'] {
            sheet.select(0, letter(c)).unwrap();
            assert_eq!(
                sheet.option_state(0, &q, letter(c)),
                OptionState::SelectedIncorrect
            );
            assert_eq!(sheet.status(0, &q), QuestionStatus::AnsweredIncorrect);
            // No recorded answer, so there is nothing to reveal either.
            assert_eq!(sheet.reveal_correct(0, &q), None);
        }
    }

    #[test]
    fn last_selection_wins_and_others_stay_untouched() {
        let mut sheet = AnswerSheet::new(3);
        sheet.select(1, letter('a')).unwrap();
        sheet.select(0, letter('c')).unwrap();
        sheet.select(1, letter('d')).unwrap();

        assert_eq!(sheet.selection(1), Some(letter('d')));
        assert_eq!(sheet.selection(0), Some(letter('c')));
        assert_eq!(sheet.selection(2), None);
    }

    #[test]
    fn reselection_can_flip_the_status() {
        let q = question(Some('b'));
        let mut sheet = AnswerSheet::new(1);

        sheet.select(0, letter('a')).unwrap();
        assert_eq!(sheet.status(0, &q), QuestionStatus::AnsweredIncorrect);

        sheet.select(0, letter('b')).unwrap();
        assert_eq!(sheet.status(0, &q), QuestionStatus::AnsweredCorrect);
    }

    #[test]
    fn with_selection_composes_without_mutation() {
        let sheet = AnswerSheet::new(2);
        let updated = sheet
            .with_selection(0, letter('a'))
            .unwrap()
            .with_selection(1, letter('b'))
            .unwrap();

        assert_eq!(updated.selection(0), Some(letter('a')));
        assert_eq!(updated.selection(1), Some(letter('b')));
    }

    #[test]
    fn out_of_range_selection_is_an_error() {
        let mut sheet = AnswerSheet::new(2);
        let err = sheet.select(2, letter('a')).unwrap_err();
        assert_eq!(err, AnswerSheetError::OutOfRange { index: 2, len: 2 });
    }

    #[test]
    fn clear_resets_every_question() {
        let mut sheet = AnswerSheet::new(2);
        sheet.select(0, letter('a')).unwrap();
        sheet.select(1, letter('b')).unwrap();

        sheet.clear();
        assert_eq!(sheet.answered(), 0);
        assert_eq!(sheet, AnswerSheet::new(2));
    }
}
