use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use tokio::sync::watch;
use tokio::task::JoinHandle;
use tracing::debug;

use super::provider::{
    EventSender, RecognizerError, RecognizerEvent, SpeechProvider, SpeechSession,
};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Control {
    Run,
    Stop,
    Abort,
}

/// Offline simulation strategy: plays a configured script of utterances
/// on a timer, one transcript per tick.
///
/// The last resort of the fallback chain. Also the strategy the demo
/// binary and the tests run against, since it needs no engine, model or
/// microphone.
///
/// Clones share the live-session counter, so a clone can be registered
/// with a chain while the original keeps observing resource usage.
#[derive(Clone)]
pub struct SimulatedProvider {
    script: Vec<String>,
    interval: Duration,
    live: Arc<AtomicUsize>,
}

impl SimulatedProvider {
    /// Create a simulation that emits each line of `script` in order,
    /// waiting `interval` before each one.
    #[must_use]
    pub fn new(script: Vec<String>, interval: Duration) -> Self {
        Self {
            script,
            interval,
            live: Arc::new(AtomicUsize::new(0)),
        }
    }

    /// Number of sessions currently holding simulated audio resources.
    ///
    /// Returns to zero once a session has fully torn down; used to
    /// verify that repeated start/stop cycles do not accumulate
    /// resources.
    #[must_use]
    pub fn active_sessions(&self) -> usize {
        self.live.load(Ordering::SeqCst)
    }
}

/// Stand-in for a microphone/audio handle. Held by the emitter task for
/// the lifetime of the session, released on every exit path via `Drop`.
struct ResourceGuard(Arc<AtomicUsize>);

impl ResourceGuard {
    fn acquire(counter: &Arc<AtomicUsize>) -> Self {
        counter.fetch_add(1, Ordering::SeqCst);
        Self(Arc::clone(counter))
    }
}

impl Drop for ResourceGuard {
    fn drop(&mut self) {
        self.0.fetch_sub(1, Ordering::SeqCst);
    }
}

#[async_trait]
impl SpeechProvider for SimulatedProvider {
    fn id(&self) -> &'static str {
        "simulated"
    }

    fn check_requirements(&self) -> Result<(), RecognizerError> {
        if self.script.is_empty() {
            return Err(RecognizerError::NotAvailable {
                reason: "simulation script is empty".to_owned(),
            });
        }
        Ok(())
    }

    async fn start_session(
        &self,
        events: EventSender,
    ) -> Result<Box<dyn SpeechSession>, RecognizerError> {
        let (control_tx, mut control_rx) = watch::channel(Control::Run);
        let guard = ResourceGuard::acquire(&self.live);
        let script = self.script.clone();
        let interval = self.interval;

        let task = tokio::spawn(async move {
            let _guard = guard;
            for line in script {
                tokio::select! {
                    () = tokio::time::sleep(interval) => {
                        debug!(transcript = %line, "simulated utterance");
                        if events.send(RecognizerEvent::Result { transcript: line }).is_err() {
                            return;
                        }
                    }
                    changed = control_rx.changed() => {
                        if changed.is_err() {
                            return;
                        }
                        match *control_rx.borrow() {
                            Control::Stop => {
                                let _ = events.send(RecognizerEvent::Ended);
                                return;
                            }
                            Control::Abort => return,
                            Control::Run => {}
                        }
                    }
                }
            }
            let _ = events.send(RecognizerEvent::Ended);
        });

        Ok(Box::new(SimulatedSession {
            control: control_tx,
            task,
        }))
    }
}

#[derive(Debug)]
struct SimulatedSession {
    control: watch::Sender<Control>,
    task: JoinHandle<()>,
}

impl SpeechSession for SimulatedSession {
    fn stop(&mut self) {
        let _ = self.control.send(Control::Stop);
    }

    fn abort(&mut self) {
        let _ = self.control.send(Control::Abort);
    }
}

impl Drop for SimulatedSession {
    fn drop(&mut self) {
        self.task.abort();
    }
}
