//! Speech source adapter: a drop-in recognizer object backed by a
//! fallback chain of transcription strategies.
//!
//! [`SpeechRecognizer`] exposes the start/stop/abort/callback surface of
//! a standard speech-recognition object. On `start()` the chain tries
//! the external engine, then the platform recognizer, then the offline
//! simulation, in configured order; exactly one strategy is active per
//! session.

/// External-engine strategy and the `SpeechEngine` seam.
pub mod engine;
/// Platform-recognizer strategy and the `NativeSpeechApi` seam.
pub mod native;
/// Strategy traits, events, errors and the fallback chain.
pub mod provider;
/// Built-in offline simulation strategy.
pub mod simulated;

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;

use anyhow::Result;
use tokio::sync::{mpsc, watch};
use tokio::task::JoinHandle;
use tracing::{debug, warn};

use crate::config::Config;
pub use engine::{EngineConfig, EngineProvider, SpeechEngine};
pub use native::{NativeProvider, NativeSpeechApi};
pub use provider::{
    EventSender, FallbackChain, RecognizerError, RecognizerEvent, SpeechProvider, SpeechSession,
    StartedSession,
};
pub use simulated::SimulatedProvider;

type ResultCallback = Box<dyn FnMut(&str) + Send>;
type ErrorCallback = Box<dyn FnMut(&str) + Send>;
type EndCallback = Box<dyn FnMut() + Send>;

#[derive(Default)]
struct Callbacks {
    on_result: Option<ResultCallback>,
    on_error: Option<ErrorCallback>,
    on_end: Option<EndCallback>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum SessionControl {
    Run,
    Stop,
    Abort,
}

/// Handles to externally implemented strategies, registered explicitly
/// at chain construction.
#[derive(Default)]
pub struct ExternalProviders {
    /// The bundled offline transcription engine, if the application
    /// ships one.
    pub engine: Option<Arc<dyn SpeechEngine>>,
    /// The host platform recognizer, if the application wraps one.
    pub native: Option<Arc<dyn NativeSpeechApi>>,
}

/// Assemble the fallback chain in the order configured under
/// `[recognition] preferred`, skipping strategies with no registered
/// handle and warning on unknown names.
///
/// # Errors
/// Returns an error when the configured model path cannot be expanded.
pub fn chain_from_config(config: &Config, external: &ExternalProviders) -> Result<FallbackChain> {
    let mut chain = FallbackChain::new();

    for name in &config.recognition.preferred {
        match name.as_str() {
            "engine" => {
                if let Some(engine) = &external.engine {
                    chain.register(Box::new(EngineProvider::new(
                        Arc::clone(engine),
                        EngineConfig {
                            model_path: Config::expand_path(&config.recognition.model_path)?,
                            model_url: config.recognition.model_url.clone(),
                        },
                    )));
                } else {
                    debug!("no engine registered, skipping strategy");
                }
            }
            "native" => {
                if let Some(native) = &external.native {
                    chain.register(Box::new(NativeProvider::new(Arc::clone(native))));
                } else {
                    debug!("no platform recognizer registered, skipping strategy");
                }
            }
            "simulated" => {
                if config.simulation.enabled {
                    chain.register(Box::new(SimulatedProvider::new(
                        config.simulation.utterances.clone(),
                        Duration::from_millis(config.simulation.interval_ms),
                    )));
                } else {
                    debug!("simulation disabled, skipping strategy");
                }
            }
            other => {
                warn!(strategy = other, "unknown strategy in preferred order, skipping");
            }
        }
    }

    Ok(chain)
}

struct SessionHandle {
    control: watch::Sender<SessionControl>,
    listening: Arc<AtomicBool>,
    task: JoinHandle<()>,
}

/// Drop-in speech recognizer: `start`/`stop`/`abort` plus result, error
/// and end callback slots.
///
/// Must be used inside a tokio runtime; each `start()` spawns one
/// session task that drives the chain and the callbacks. Dropping the
/// recognizer tears the active session down.
pub struct SpeechRecognizer {
    chain: Arc<FallbackChain>,
    callbacks: Arc<Mutex<Callbacks>>,
    session: Option<SessionHandle>,
}

impl SpeechRecognizer {
    /// Create a recognizer over an assembled fallback chain.
    #[must_use]
    pub fn new(chain: FallbackChain) -> Self {
        Self {
            chain: Arc::new(chain),
            callbacks: Arc::new(Mutex::new(Callbacks::default())),
            session: None,
        }
    }

    /// Set the callback invoked once per finalized utterance. The
    /// transcript is lowercased and trimmed before delivery.
    pub fn set_on_result(&mut self, callback: impl FnMut(&str) + Send + 'static) {
        if let Ok(mut cb) = self.callbacks.lock() {
            cb.on_result = Some(Box::new(callback));
        }
    }

    /// Set the callback invoked on session failure with a descriptive
    /// reason. Fires only when every strategy failed to start, or when
    /// the active strategy hits a device/permission failure.
    pub fn set_on_error(&mut self, callback: impl FnMut(&str) + Send + 'static) {
        if let Ok(mut cb) = self.callbacks.lock() {
            cb.on_error = Some(Box::new(callback));
        }
    }

    /// Set the callback invoked exactly once when a session ends, on
    /// every exit path.
    pub fn set_on_end(&mut self, callback: impl FnMut() + Send + 'static) {
        if let Ok(mut cb) = self.callbacks.lock() {
            cb.on_end = Some(Box::new(callback));
        }
    }

    /// Whether a strategy is currently delivering transcripts.
    #[must_use]
    pub fn is_listening(&self) -> bool {
        self.session
            .as_ref()
            .is_some_and(|s| !s.task.is_finished() && s.listening.load(Ordering::SeqCst))
    }

    /// Begin a recognition session.
    ///
    /// Evaluates the fallback chain once; initialization failures
    /// advance the chain and reach the error callback only when every
    /// strategy fails. Calling `start` while a session is active
    /// (including one still initializing) is a no-op.
    pub fn start(&mut self) {
        if let Some(session) = &self.session {
            if !session.task.is_finished() {
                debug!("start while a session is active (ignored)");
                return;
            }
        }

        let (control_tx, control_rx) = watch::channel(SessionControl::Run);
        let listening = Arc::new(AtomicBool::new(false));
        let task = tokio::spawn(run_session(
            Arc::clone(&self.chain),
            Arc::clone(&self.callbacks),
            control_rx,
            Arc::clone(&listening),
        ));
        self.session = Some(SessionHandle {
            control: control_tx,
            listening,
            task,
        });
    }

    /// End the active session gracefully; the strategy may flush a
    /// final result first. No-op when no session is active.
    pub fn stop(&self) {
        match &self.session {
            Some(session) if !session.task.is_finished() => {
                let _ = session.control.send(SessionControl::Stop);
            }
            _ => debug!("stop with no active session (ignored)"),
        }
    }

    /// End the active session immediately, discarding pending results.
    /// No-op when no session is active.
    pub fn abort(&self) {
        match &self.session {
            Some(session) if !session.task.is_finished() => {
                let _ = session.control.send(SessionControl::Abort);
            }
            _ => debug!("abort with no active session (ignored)"),
        }
    }
}

async fn run_session(
    chain: Arc<FallbackChain>,
    callbacks: Arc<Mutex<Callbacks>>,
    mut control_rx: watch::Receiver<SessionControl>,
    listening: Arc<AtomicBool>,
) {
    let (events_tx, mut events_rx) = mpsc::unbounded_channel();

    // Strategy selection can be cancelled by stop/abort (or by dropping
    // the recognizer) before any strategy has fully initialized; the
    // end callback still fires.
    let started = tokio::select! {
        result = chain.start_first_available(&events_tx) => result,
        _ = control_rx.changed() => {
            debug!("session cancelled during strategy selection");
            fire_end(&callbacks);
            return;
        }
    };

    let mut active = match started {
        Ok(started) => {
            listening.store(true, Ordering::SeqCst);
            started
        }
        Err(e) => {
            fire_error(&callbacks, &e.to_string());
            fire_end(&callbacks);
            return;
        }
    };

    let mut aborted = false;
    loop {
        tokio::select! {
            changed = control_rx.changed() => {
                if changed.is_err() {
                    // Recognizer dropped; tear down immediately.
                    active.session.abort();
                    break;
                }
                match *control_rx.borrow() {
                    SessionControl::Stop => active.session.stop(),
                    SessionControl::Abort => {
                        aborted = true;
                        active.session.abort();
                        break;
                    }
                    SessionControl::Run => {}
                }
            }
            event = events_rx.recv() => match event {
                Some(RecognizerEvent::Result { transcript }) => {
                    if !aborted {
                        let transcript = transcript.to_lowercase();
                        fire_result(&callbacks, transcript.trim());
                    }
                }
                Some(RecognizerEvent::Error { reason }) => {
                    fire_error(&callbacks, &reason);
                    break;
                }
                Some(RecognizerEvent::Ended) | None => break,
            }
        }
    }

    listening.store(false, Ordering::SeqCst);
    // Releases whatever resources the strategy session still holds.
    drop(active);
    fire_end(&callbacks);
}

fn fire_result(callbacks: &Arc<Mutex<Callbacks>>, transcript: &str) {
    if let Ok(mut cb) = callbacks.lock() {
        if let Some(f) = cb.on_result.as_mut() {
            f(transcript);
        }
    }
}

fn fire_error(callbacks: &Arc<Mutex<Callbacks>>, reason: &str) {
    warn!(reason, "recognition session error");
    if let Ok(mut cb) = callbacks.lock() {
        if let Some(f) = cb.on_error.as_mut() {
            f(reason);
        }
    }
}

fn fire_end(callbacks: &Arc<Mutex<Callbacks>>) {
    if let Ok(mut cb) = callbacks.lock() {
        if let Some(f) = cb.on_end.as_mut() {
            f();
        }
    }
}
