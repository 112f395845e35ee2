#![forbid(unsafe_code)]

pub mod app_services;
pub mod error;
pub mod quiz_service;
pub mod sessions;
pub mod subject_service;

pub use quiz_core::Clock;

pub use app_services::AppServices;
pub use error::{AppServicesError, AuthoringError, SessionError, SubjectServiceError};
pub use quiz_service::QuizService;
pub use sessions::{QuizSession, SessionProgress, SessionService};
pub use subject_service::SubjectService;
