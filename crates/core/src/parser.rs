//! Quiz-text parsing and rendering.
//!
//! The authoring format is a plain text blob of numbered question blocks:
//!
//! ```text
//! 1. What is 2+2?
//! a) 3
//! b) 4
//! c) 5
//! d) 6
//! Answer: b
//! ```
//!
//! [`QuizTextParser::parse`] turns such a blob into validated question
//! records; [`render_quiz_text`] is the inverse, used by the share/copy
//! flow. Parsing the rendered text yields the same records back.

use regex::Regex;
use thiserror::Error;

use crate::model::{OptionAlphabet, Question, QuestionDraft, QuestionError, ValidatedQuestion};
use crate::model::{Choice, Letter};

//
// ─── ERRORS ────────────────────────────────────────────────────────────────────
//

#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum ParseError {
    /// The input contains no block with any non-whitespace content.
    #[error("quiz text contains no question blocks")]
    NoQuestions,

    /// A block parsed structurally but violates a question invariant.
    #[error("question block {block} is invalid: {source}")]
    Question {
        /// 1-based index of the offending block.
        block: usize,
        #[source]
        source: QuestionError,
    },

    /// Strict-mode validation rejected the submission.
    #[error("quiz text failed validation")]
    Invalid { defects: Vec<ValidationError> },
}

/// Defects reported by strict validation, one entry per defect class.
///
/// Each variant lists the 1-based numbers of every offending block, so the
/// caller can show a single message per class rather than one per line.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum ValidationError {
    /// Block has fewer non-empty lines than question + full option set +
    /// answer line.
    #[error("malformed question block")]
    MalformedBlock { blocks: Vec<usize> },

    /// Block's last non-empty line is not of the form `Answer: <letter>`.
    #[error("missing or malformed answer line")]
    MalformedAnswerLine { blocks: Vec<usize> },
}

//
// ─── PARSER ────────────────────────────────────────────────────────────────────
//

/// How much structure to demand before accepting a submission.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Strictness {
    /// Parse whatever matches: missing answers and partial option sets are
    /// accepted.
    #[default]
    Lenient,
    /// Run [`QuizTextParser::validate`] first and reject any defect.
    Strict,
}

/// Parser for the numbered question-block format.
///
/// The option-letter alphabet and the strictness level are configuration;
/// both observed variants of the format are covered by one parser.
#[derive(Debug, Clone)]
pub struct QuizTextParser {
    alphabet: OptionAlphabet,
    strictness: Strictness,
    block_start: Regex,
    option_line: Regex,
    answer_line: Regex,
    answer_line_exact: Regex,
}

impl Default for QuizTextParser {
    fn default() -> Self {
        Self::new(OptionAlphabet::default(), Strictness::Lenient)
    }
}

impl QuizTextParser {
    #[must_use]
    pub fn new(alphabet: OptionAlphabet, strictness: Strictness) -> Self {
        let upper = alphabet.last().as_char();
        let lower = upper.to_ascii_lowercase();

        Self {
            alphabet,
            strictness,
            block_start: compile(r"(?m)^\d+\.\s"),
            // Anchored to the start of the trimmed line, so a line can match
            // at most one letter.
            option_line: compile(&format!(r"^([a-{lower}A-{upper}])\)\s(.+)$")),
            answer_line: compile(&format!(r"(?i)answer:\s*([a-{lower}])")),
            answer_line_exact: compile(&format!(r"(?i)^answer:\s*[a-{lower}]$")),
        }
    }

    #[must_use]
    pub fn alphabet(&self) -> OptionAlphabet {
        self.alphabet
    }

    #[must_use]
    pub fn strictness(&self) -> Strictness {
        self.strictness
    }

    /// Parses a text blob into question records, one per block, in block
    /// order.
    ///
    /// # Errors
    ///
    /// Returns [`ParseError::NoQuestions`] for input without any content,
    /// [`ParseError::Question`] when a block violates a question invariant,
    /// and [`ParseError::Invalid`] when strict mode finds defects.
    pub fn parse(&self, text: &str) -> Result<Vec<ValidatedQuestion>, ParseError> {
        if self.strictness == Strictness::Strict {
            self.validate(text)
                .map_err(|defects| ParseError::Invalid { defects })?;
        }

        let blocks = self.blocks(text);
        if blocks.is_empty() {
            return Err(ParseError::NoQuestions);
        }

        let mut questions = Vec::with_capacity(blocks.len());
        for (i, block) in blocks.iter().enumerate() {
            let validated = self
                .parse_block(block)
                .validate()
                .map_err(|source| ParseError::Question {
                    block: i + 1,
                    source,
                })?;
            questions.push(validated);
        }
        Ok(questions)
    }

    /// Strict structural checks, independent of parsing.
    ///
    /// A block must carry at least question + full option set + answer line
    /// (six non-empty lines for the default alphabet), and its last
    /// non-empty line must be exactly an `Answer: <letter>` line.
    ///
    /// # Errors
    ///
    /// Returns one [`ValidationError`] per defect class, each listing the
    /// offending block numbers.
    pub fn validate(&self, text: &str) -> Result<(), Vec<ValidationError>> {
        let min_lines = 2 + usize::from(self.alphabet.size());
        let mut short_blocks = Vec::new();
        let mut bad_answers = Vec::new();

        for (i, block) in self.blocks(text).iter().enumerate() {
            let lines: Vec<&str> = non_empty_lines(block).collect();
            if lines.len() < min_lines {
                short_blocks.push(i + 1);
            }
            match lines.last() {
                Some(last) if self.answer_line_exact.is_match(last) => {}
                _ => bad_answers.push(i + 1),
            }
        }

        let mut defects = Vec::new();
        if !short_blocks.is_empty() {
            defects.push(ValidationError::MalformedBlock {
                blocks: short_blocks,
            });
        }
        if !bad_answers.is_empty() {
            defects.push(ValidationError::MalformedAnswerLine {
                blocks: bad_answers,
            });
        }

        if defects.is_empty() { Ok(()) } else { Err(defects) }
    }

    /// Splits the input at numbered delimiters, discarding segments with no
    /// non-whitespace content.
    fn blocks<'a>(&self, text: &'a str) -> Vec<&'a str> {
        self.block_start
            .split(text)
            .filter(|block| !block.trim().is_empty())
            .collect()
    }

    fn parse_block(&self, block: &str) -> QuestionDraft {
        let mut lines = non_empty_lines(block);
        let text = lines.next().unwrap_or_default().to_owned();

        let mut choices = Vec::new();
        let mut correct_answer = None;
        for line in lines {
            if let Some(caps) = self.option_line.captures(line) {
                if let Some(letter) = captured_letter(&caps, 1) {
                    choices.push(Choice::new(letter, caps[2].trim()));
                }
            }
            if let Some(caps) = self.answer_line.captures(line) {
                // Later answer lines overwrite earlier ones. A letter
                // outside the alphabet never matches and is ignored.
                if let Some(letter) = captured_letter(&caps, 1) {
                    correct_answer = Some(letter);
                }
            }
        }

        QuestionDraft {
            text,
            choices,
            correct_answer,
        }
    }
}

fn non_empty_lines(block: &str) -> impl Iterator<Item = &str> {
    block.lines().map(str::trim).filter(|line| !line.is_empty())
}

fn captured_letter(caps: &regex::Captures<'_>, group: usize) -> Option<Letter> {
    let c = caps.get(group)?.as_str().chars().next()?;
    Letter::from_char(c).ok()
}

/// Compiles a pattern built from a validated alphabet.
///
/// # Panics
///
/// Panics only if a generated pattern is invalid, which cannot happen for
/// alphabet sizes accepted by [`OptionAlphabet::new`].
fn compile(pattern: &str) -> Regex {
    Regex::new(pattern).expect("generated pattern should be valid")
}

//
// ─── RENDERING ─────────────────────────────────────────────────────────────────
//

/// Renders questions back into the authoring format, blocks separated by one
/// blank line.
///
/// Letters are emitted uppercase. A question without a recorded correct
/// answer gets no `Answer:` line at all, so the unset marker survives a
/// round-trip through [`QuizTextParser::parse`].
#[must_use]
pub fn render_quiz_text(questions: &[Question]) -> String {
    let mut blocks = Vec::with_capacity(questions.len());
    for (i, question) in questions.iter().enumerate() {
        let mut block = format!("{}. {}\n", i + 1, question.text);
        for choice in &question.choices {
            block.push_str(&format!("{}) {}\n", choice.letter, choice.text));
        }
        if let Some(correct) = question.correct_answer {
            block.push_str(&format!("Answer: {correct}\n"));
        }
        blocks.push(block);
    }
    blocks.join("\n")
}

//
// ─── TESTS ─────────────────────────────────────────────────────────────────────
//
