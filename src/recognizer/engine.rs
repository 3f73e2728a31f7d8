use std::path::{Path, PathBuf};
use std::sync::Arc;

use async_trait::async_trait;
use tracing::info;

use super::provider::{
    EventSender, RecognizerError, SpeechProvider, SpeechSession,
};

/// Seam to the external transcription engine.
///
/// The engine (model inference, audio capture) lives outside this crate;
/// applications inject an implementation and the chain drives it through
/// this trait. Tests use `MockSpeechEngine` (via `mockall`).
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait SpeechEngine: Send + Sync {
    /// Load model data from `model_path`. May fail on corrupt model
    /// files or an unsupported host environment.
    ///
    /// # Errors
    /// Returns an error when the engine cannot initialize; the fallback
    /// chain advances to the next strategy.
    async fn load_model(&self, model_path: &Path) -> Result<(), RecognizerError>;

    /// Begin capturing and transcribing, delivering events on `events`.
    ///
    /// # Errors
    /// Returns an error on microphone or device failure.
    async fn open_session(
        &self,
        events: EventSender,
    ) -> Result<Box<dyn SpeechSession>, RecognizerError>;
}

/// Configuration for the engine strategy.
#[derive(Debug, Clone)]
pub struct EngineConfig {
    /// Where the model file must already exist on disk.
    pub model_path: PathBuf,
    /// Where an operator can fetch the model from. Surfaced in the
    /// unavailability error; this crate never downloads it.
    pub model_url: Option<String>,
}

/// Primary strategy: the bundled offline transcription engine.
pub struct EngineProvider {
    engine: Arc<dyn SpeechEngine>,
    config: EngineConfig,
}

impl EngineProvider {
    /// Wrap an injected engine with its model configuration.
    pub fn new(engine: Arc<dyn SpeechEngine>, config: EngineConfig) -> Self {
        Self { engine, config }
    }
}

#[async_trait]
impl SpeechProvider for EngineProvider {
    fn id(&self) -> &'static str {
        "engine"
    }

    fn check_requirements(&self) -> Result<(), RecognizerError> {
        if !self.config.model_path.exists() {
            let hint = self.config.model_url.as_ref().map_or_else(String::new, |url| {
                format!(" (available from {url})")
            });
            return Err(RecognizerError::ModelMissing {
                path: self.config.model_path.display().to_string(),
                hint,
            });
        }
        Ok(())
    }

    async fn start_session(
        &self,
        events: EventSender,
    ) -> Result<Box<dyn SpeechSession>, RecognizerError> {
        self.engine.load_model(&self.config.model_path).await?;
        info!(model = %self.config.model_path.display(), "engine model loaded");
        self.engine.open_session(events).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tokio::sync::mpsc;

    #[derive(Debug)]
    struct NoopSession;

    impl SpeechSession for NoopSession {
        fn stop(&mut self) {}
        fn abort(&mut self) {}
    }

    fn existing_model() -> (tempfile::TempDir, EngineConfig) {
        let dir = tempfile::tempdir().unwrap();
        let model_path = dir.path().join("model.bin");
        std::fs::write(&model_path, b"model bytes").unwrap();
        (
            dir,
            EngineConfig {
                model_path,
                model_url: None,
            },
        )
    }

    fn event_channel() -> EventSender {
        let (tx, _rx) = mpsc::unbounded_channel();
        tx
    }

    #[test]
    fn missing_model_is_reported_before_touching_the_engine() {
        let mut engine = MockSpeechEngine::new();
        engine.expect_load_model().never();
        engine.expect_open_session().never();

        let provider = EngineProvider::new(
            Arc::new(engine),
            EngineConfig {
                model_path: PathBuf::from("/nonexistent/fitvoice/model.bin"),
                model_url: Some("https://example.com/model.bin".to_owned()),
            },
        );

        let err = provider.check_requirements().unwrap_err();
        let msg = err.to_string();
        assert!(msg.contains("/nonexistent/fitvoice/model.bin"));
        assert!(msg.contains("https://example.com/model.bin"));
    }

    #[test]
    fn missing_model_hint_is_empty_without_url() {
        let engine = MockSpeechEngine::new();
        let provider = EngineProvider::new(
            Arc::new(engine),
            EngineConfig {
                model_path: PathBuf::from("/nonexistent/model.bin"),
                model_url: None,
            },
        );

        let msg = provider.check_requirements().unwrap_err().to_string();
        assert!(msg.ends_with("/nonexistent/model.bin"));
    }

    #[test]
    fn present_model_passes_requirements() {
        let (_dir, config) = existing_model();
        let provider = EngineProvider::new(Arc::new(MockSpeechEngine::new()), config);
        assert!(provider.check_requirements().is_ok());
    }

    #[tokio::test]
    async fn load_failure_surfaces_as_initialization_error() {
        let (_dir, config) = existing_model();
        let mut engine = MockSpeechEngine::new();
        engine
            .expect_load_model()
            .returning(|_| Err(RecognizerError::Initialization("bad model".to_owned())));
        engine.expect_open_session().never();

        let provider = EngineProvider::new(Arc::new(engine), config);
        let err = provider.start_session(event_channel()).await.unwrap_err();
        assert!(matches!(err, RecognizerError::Initialization(_)));
    }

    #[tokio::test]
    async fn device_failure_on_open_propagates() {
        let (_dir, config) = existing_model();
        let mut engine = MockSpeechEngine::new();
        engine.expect_load_model().returning(|_| Ok(()));
        engine
            .expect_open_session()
            .returning(|_| Err(RecognizerError::Device("microphone busy".to_owned())));

        let provider = EngineProvider::new(Arc::new(engine), config);
        let err = provider.start_session(event_channel()).await.unwrap_err();
        assert!(matches!(err, RecognizerError::Device(_)));
    }

    #[tokio::test]
    async fn successful_start_loads_model_then_opens_session() {
        let (_dir, config) = existing_model();
        let expected_path = config.model_path.clone();
        let mut engine = MockSpeechEngine::new();
        engine
            .expect_load_model()
            .withf(move |path| path == expected_path)
            .times(1)
            .returning(|_| Ok(()));
        engine
            .expect_open_session()
            .times(1)
            .returning(|_| Ok(Box::new(NoopSession) as Box<dyn SpeechSession>));

        let provider = EngineProvider::new(Arc::new(engine), config);
        assert!(provider.start_session(event_channel()).await.is_ok());
    }
}
