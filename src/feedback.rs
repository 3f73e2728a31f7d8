//! Feedback sinks for dispatcher output.
//!
//! The dispatcher produces feedback text for every transcript; sinks
//! decide how it reaches the user. A spoken implementation would wrap
//! an external text-to-speech engine behind this same trait.

/// Delivers one line of feedback per dispatched transcript.
pub trait FeedbackSink: Send {
    /// Present `text` to the user.
    fn announce(&mut self, text: &str);
}

/// Visual feedback on stdout, for the demo binary.
pub struct ConsoleFeedback;

impl FeedbackSink for ConsoleFeedback {
    #[allow(clippy::print_stdout)]
    fn announce(&mut self, text: &str) {
        println!("» {text}");
    }
}

/// Log-only feedback, for headless embedding.
pub struct TracingFeedback;

impl FeedbackSink for TracingFeedback {
    fn announce(&mut self, text: &str) {
        tracing::info!(feedback = text, "announced");
    }
}
