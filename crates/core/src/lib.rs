//! Domain core for the quiz engine.
//!
//! Holds the subject/quiz/question model, the quiz-text parser that turns a
//! pasted block of numbered questions into validated records, and the answer
//! sheet tracking selections while a quiz is taken. Everything here is pure
//! and synchronous; persistence lives in the `storage` crate and
//! orchestration in `services`.

pub mod error;
pub mod model;
pub mod parser;
pub mod session;
pub mod time;

pub use error::Error;
pub use time::Clock;
