use async_trait::async_trait;
use thiserror::Error;
use tokio::sync::mpsc;
use tracing::{info, warn};

/// Events emitted by an active recognition strategy.
#[derive(Debug, Clone)]
pub enum RecognizerEvent {
    /// A finalized utterance transcript.
    Result {
        /// Raw transcript text for one utterance.
        transcript: String,
    },
    /// A runtime failure (device, permission, backend). Ends the session.
    Error {
        /// Human-readable failure description.
        reason: String,
    },
    /// The strategy finished on its own or after a graceful stop.
    Ended,
}

/// Channel half handed to a strategy session for event delivery.
pub type EventSender = mpsc::UnboundedSender<RecognizerEvent>;

/// Errors raised while selecting or starting a recognition strategy.
#[derive(Debug, Error)]
pub enum RecognizerError {
    /// Strategy requirements are not met on this host.
    #[error("strategy not available: {reason}")]
    NotAvailable {
        /// Why the strategy cannot run.
        reason: String,
    },

    /// Model file required by the engine strategy is absent.
    #[error("model file not found at {path}{hint}")]
    ModelMissing {
        /// Configured model path.
        path: String,
        /// Optional download hint, empty when no URL is configured.
        hint: String,
    },

    /// Asynchronous initialization failed (model load, environment).
    #[error("initialization failed: {0}")]
    Initialization(String),

    /// Microphone or audio device failure.
    #[error("audio device failure: {0}")]
    Device(String),

    /// Every registered strategy failed to start.
    #[error("all recognition strategies failed: {summary}")]
    Exhausted {
        /// One "id: reason" entry per attempted strategy, in order.
        summary: String,
    },
}

/// A running recognition session owned by exactly one strategy.
///
/// Implementations release microphone/audio resources on [`stop`],
/// [`abort`] and on `Drop`, so teardown is idempotent across all exit
/// paths.
///
/// [`stop`]: SpeechSession::stop
/// [`abort`]: SpeechSession::abort
pub trait SpeechSession: Send + std::fmt::Debug {
    /// End the session gracefully. The strategy may still flush a final
    /// [`RecognizerEvent::Result`] before [`RecognizerEvent::Ended`].
    fn stop(&mut self);

    /// End the session immediately, discarding pending results.
    fn abort(&mut self);
}

/// One entry in the fallback chain.
///
/// Mirrors the start/callback surface of a platform speech recognizer:
/// a cheap availability probe plus an asynchronous session start that
/// either yields an active session or a reason to advance the chain.
#[async_trait]
pub trait SpeechProvider: Send + Sync {
    /// Short strategy name used in logs and exhaustion summaries.
    fn id(&self) -> &'static str;

    /// Cheap synchronous probe; an `Err` skips this strategy without
    /// attempting initialization.
    fn check_requirements(&self) -> Result<(), RecognizerError>;

    /// Initialize the strategy and begin delivering events on `events`.
    ///
    /// # Errors
    /// Returns an error when initialization fails; the chain advances to
    /// the next strategy.
    async fn start_session(
        &self,
        events: EventSender,
    ) -> Result<Box<dyn SpeechSession>, RecognizerError>;
}

/// A successfully started session plus the id of the strategy behind it.
#[derive(Debug)]
pub struct StartedSession {
    /// Id of the strategy that won the chain.
    pub provider: &'static str,
    /// The active session handle.
    pub session: Box<dyn SpeechSession>,
}

/// Ordered list of recognition strategies, tried first to last.
///
/// Strategies are registered explicitly at construction; nothing is
/// discovered from ambient host state.
#[derive(Default)]
pub struct FallbackChain {
    providers: Vec<Box<dyn SpeechProvider>>,
}

impl FallbackChain {
    /// Create an empty chain.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Append a strategy to the end of the chain.
    pub fn register(&mut self, provider: Box<dyn SpeechProvider>) {
        self.providers.push(provider);
    }

    /// Number of registered strategies.
    #[must_use]
    pub fn len(&self) -> usize {
        self.providers.len()
    }

    /// Whether the chain has no strategies registered.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.providers.is_empty()
    }

    /// Registered strategy ids, in chain order.
    #[must_use]
    pub fn ids(&self) -> Vec<&'static str> {
        self.providers.iter().map(|p| p.id()).collect()
    }

    /// Try each strategy in order and return the first that starts.
    ///
    /// Unavailable strategies are skipped, failed starts advance the
    /// chain; both are logged at `warn`. Evaluated once per session
    /// start.
    ///
    /// # Errors
    /// Returns [`RecognizerError::Exhausted`] with one entry per attempt
    /// when no strategy starts.
    pub async fn start_first_available(
        &self,
        events: &EventSender,
    ) -> Result<StartedSession, RecognizerError> {
        let mut attempts: Vec<String> = Vec::new();

        for provider in &self.providers {
            if let Err(e) = provider.check_requirements() {
                warn!(strategy = provider.id(), error = %e, "strategy unavailable, trying next");
                attempts.push(format!("{}: {e}", provider.id()));
                continue;
            }

            match provider.start_session(events.clone()).await {
                Ok(session) => {
                    info!(strategy = provider.id(), "recognition session started");
                    return Ok(StartedSession {
                        provider: provider.id(),
                        session,
                    });
                }
                Err(e) => {
                    warn!(strategy = provider.id(), error = %e, "strategy failed to start, trying next");
                    attempts.push(format!("{}: {e}", provider.id()));
                }
            }
        }

        let summary = if attempts.is_empty() {
            "no strategies registered".to_owned()
        } else {
            attempts.join("; ")
        };
        Err(RecognizerError::Exhausted { summary })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[derive(Debug)]
    struct NoopSession;

    impl SpeechSession for NoopSession {
        fn stop(&mut self) {}
        fn abort(&mut self) {}
    }

    struct AlwaysOk(&'static str);

    #[async_trait]
    impl SpeechProvider for AlwaysOk {
        fn id(&self) -> &'static str {
            self.0
        }

        fn check_requirements(&self) -> Result<(), RecognizerError> {
            Ok(())
        }

        async fn start_session(
            &self,
            _events: EventSender,
        ) -> Result<Box<dyn SpeechSession>, RecognizerError> {
            Ok(Box::new(NoopSession))
        }
    }

    struct Unavailable(&'static str);

    #[async_trait]
    impl SpeechProvider for Unavailable {
        fn id(&self) -> &'static str {
            self.0
        }

        fn check_requirements(&self) -> Result<(), RecognizerError> {
            Err(RecognizerError::NotAvailable {
                reason: "requirements unmet".to_owned(),
            })
        }

        async fn start_session(
            &self,
            _events: EventSender,
        ) -> Result<Box<dyn SpeechSession>, RecognizerError> {
            // The chain must skip this strategy before ever starting it.
            Err(RecognizerError::Initialization(
                "started a strategy whose requirements failed".to_owned(),
            ))
        }
    }

    struct FailsToStart(&'static str);

    #[async_trait]
    impl SpeechProvider for FailsToStart {
        fn id(&self) -> &'static str {
            self.0
        }

        fn check_requirements(&self) -> Result<(), RecognizerError> {
            Ok(())
        }

        async fn start_session(
            &self,
            _events: EventSender,
        ) -> Result<Box<dyn SpeechSession>, RecognizerError> {
            Err(RecognizerError::Initialization("model load failed".to_owned()))
        }
    }

    fn event_channel() -> EventSender {
        let (tx, _rx) = mpsc::unbounded_channel();
        tx
    }

    #[tokio::test]
    async fn first_available_strategy_wins() {
        let mut chain = FallbackChain::new();
        chain.register(Box::new(AlwaysOk("engine")));
        chain.register(Box::new(AlwaysOk("simulated")));

        let started = chain
            .start_first_available(&event_channel())
            .await
            .unwrap();
        assert_eq!(started.provider, "engine");
    }

    #[tokio::test]
    async fn unavailable_strategy_is_skipped() {
        let mut chain = FallbackChain::new();
        chain.register(Box::new(Unavailable("engine")));
        chain.register(Box::new(AlwaysOk("native")));

        let started = chain
            .start_first_available(&event_channel())
            .await
            .unwrap();
        assert_eq!(started.provider, "native");
    }

    #[tokio::test]
    async fn failed_start_advances_chain() {
        let mut chain = FallbackChain::new();
        chain.register(Box::new(FailsToStart("engine")));
        chain.register(Box::new(AlwaysOk("simulated")));

        let started = chain
            .start_first_available(&event_channel())
            .await
            .unwrap();
        assert_eq!(started.provider, "simulated");
    }

    #[tokio::test]
    async fn exhaustion_summarizes_every_attempt_in_order() {
        let mut chain = FallbackChain::new();
        chain.register(Box::new(Unavailable("engine")));
        chain.register(Box::new(FailsToStart("native")));

        let err = chain
            .start_first_available(&event_channel())
            .await
            .unwrap_err();
        let msg = err.to_string();
        assert!(msg.contains("engine: strategy not available"));
        assert!(msg.contains("native: initialization failed"));
        let engine_pos = msg.find("engine:").unwrap();
        let native_pos = msg.find("native:").unwrap();
        assert!(engine_pos < native_pos);
    }

    #[tokio::test]
    async fn empty_chain_reports_no_strategies() {
        let chain = FallbackChain::new();
        let err = chain
            .start_first_available(&event_channel())
            .await
            .unwrap_err();
        assert!(err.to_string().contains("no strategies registered"));
    }

    #[test]
    fn ids_follow_registration_order() {
        let mut chain = FallbackChain::new();
        chain.register(Box::new(AlwaysOk("a")));
        chain.register(Box::new(AlwaysOk("b")));
        assert_eq!(chain.ids(), vec!["a", "b"]);
        assert_eq!(chain.len(), 2);
        assert!(!chain.is_empty());
    }
}
