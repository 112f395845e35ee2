use std::sync::Arc;

use quiz_core::Clock;
use quiz_core::parser::QuizTextParser;
use storage::repository::{Storage, StorageError, StoreHealth};
use storage::rest::HostedStoreConfig;

use crate::error::AppServicesError;
use crate::quiz_service::QuizService;
use crate::sessions::SessionService;
use crate::subject_service::SubjectService;

/// Assembles the app-facing services over one storage backend.
#[derive(Clone)]
pub struct AppServices {
    storage: Storage,
    subject_service: Arc<SubjectService>,
    quiz_service: Arc<QuizService>,
    session_service: Arc<SessionService>,
}

impl AppServices {
    /// Wire services over an already-built storage backend.
    #[must_use]
    pub fn with_storage(storage: Storage, clock: Clock, parser: QuizTextParser) -> Self {
        let subject_service = Arc::new(SubjectService::new(Arc::clone(&storage.subjects)));
        let quiz_service = Arc::new(QuizService::new(
            clock,
            parser,
            SubjectService::new(Arc::clone(&storage.subjects)),
            Arc::clone(&storage.quizzes),
        ));
        let session_service = Arc::new(SessionService::new(Arc::clone(&storage.quizzes)));

        Self {
            storage,
            subject_service,
            quiz_service,
            session_service,
        }
    }

    /// Build services over the in-memory store, for tests and prototyping.
    #[must_use]
    pub fn in_memory(clock: Clock) -> Self {
        Self::with_storage(Storage::in_memory(), clock, QuizTextParser::default())
    }

    /// Build services backed by `SQLite` storage.
    ///
    /// # Errors
    ///
    /// Returns `AppServicesError` if storage initialization fails.
    pub async fn new_sqlite(db_url: &str, clock: Clock) -> Result<Self, AppServicesError> {
        let storage = Storage::sqlite(db_url).await?;
        Ok(Self::with_storage(storage, clock, QuizTextParser::default()))
    }

    /// Build services backed by the hosted table store.
    #[must_use]
    pub fn new_hosted(config: HostedStoreConfig, clock: Clock) -> Self {
        Self::with_storage(Storage::hosted(config), clock, QuizTextParser::default())
    }

    #[must_use]
    pub fn subject_service(&self) -> Arc<SubjectService> {
        Arc::clone(&self.subject_service)
    }

    #[must_use]
    pub fn quiz_service(&self) -> Arc<QuizService> {
        Arc::clone(&self.quiz_service)
    }

    #[must_use]
    pub fn session_service(&self) -> Arc<SessionService> {
        Arc::clone(&self.session_service)
    }

    /// Ask the backend whether it answers queries at all.
    ///
    /// # Errors
    ///
    /// Returns `StorageError` when the store is unreachable.
    pub async fn check_connection(&self) -> Result<StoreHealth, StorageError> {
        self.storage.probe.check_connection().await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use quiz_core::model::AuthorId;
    use quiz_core::time::fixed_clock;

    #[tokio::test]
    async fn in_memory_services_share_one_store() {
        let services = AppServices::in_memory(fixed_clock());
        let author = AuthorId::new("tester").unwrap();

        let quiz_id = services
            .quiz_service()
            .create_quiz_from_text(&author, "Math", "Basics", "1. Q?\na) x\nAnswer: a")
            .await
            .unwrap();

        let overview = services.subject_service().list_overview(10).await.unwrap();
        assert_eq!(overview.len(), 1);
        assert_eq!(overview[0].quizzes[0].id(), quiz_id);

        let session = services.session_service().start(quiz_id).await.unwrap();
        assert_eq!(session.questions().len(), 1);

        let health = services.check_connection().await.unwrap();
        assert_eq!(health.backend, "memory");
    }
}
