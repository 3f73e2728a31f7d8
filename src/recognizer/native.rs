use std::sync::Arc;

use async_trait::async_trait;

use super::provider::{
    EventSender, RecognizerError, SpeechProvider, SpeechSession,
};

/// Seam to a platform speech-recognition API, when the host has one.
///
/// Applications register an implementation explicitly; the chain never
/// probes ambient host state for one.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait NativeSpeechApi: Send + Sync {
    /// Whether the platform recognizer can run on this host.
    fn is_supported(&self) -> bool;

    /// Start platform dictation, delivering events on `events`.
    ///
    /// # Errors
    /// Returns an error on permission or device failure.
    async fn begin(
        &self,
        events: EventSender,
    ) -> Result<Box<dyn SpeechSession>, RecognizerError>;
}

/// Secondary strategy: the host platform's own recognizer.
pub struct NativeProvider {
    api: Arc<dyn NativeSpeechApi>,
}

impl NativeProvider {
    /// Wrap an injected platform recognizer.
    pub fn new(api: Arc<dyn NativeSpeechApi>) -> Self {
        Self { api }
    }
}

#[async_trait]
impl SpeechProvider for NativeProvider {
    fn id(&self) -> &'static str {
        "native"
    }

    fn check_requirements(&self) -> Result<(), RecognizerError> {
        if !self.api.is_supported() {
            return Err(RecognizerError::NotAvailable {
                reason: "platform speech recognition not supported on this host".to_owned(),
            });
        }
        Ok(())
    }

    async fn start_session(
        &self,
        events: EventSender,
    ) -> Result<Box<dyn SpeechSession>, RecognizerError> {
        self.api.begin(events).await
    }
}
