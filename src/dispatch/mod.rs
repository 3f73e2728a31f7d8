//! Command dispatcher: maps one finalized transcript to at most one
//! action, in fixed priority order — built-ins, then complex tasks,
//! then automation sequences.

/// Built-in command table and argument extraction.
pub mod builtin;
/// Externally supplied command entries and their matching rule.
pub mod external;

use tracing::{debug, info};

pub use builtin::{render_feedback, BuiltinAction, BuiltinCommand, BUILTIN_COMMANDS};
pub use external::CommandEntry;

use crate::config::CommandsConfig;

/// Feedback text when no command matches anywhere.
pub const DEFAULT_NOT_RECOGNIZED: &str = "command not recognized";

/// Similarity floor for the "did you mean" hint.
pub const DEFAULT_SUGGESTION_THRESHOLD: f64 = 0.8;

/// Result of dispatching one transcript. Every variant carries feedback
/// text; no transcript is dropped silently.
#[derive(Debug, Clone, PartialEq)]
pub enum Outcome {
    /// A built-in command fired.
    Builtin {
        /// The selected action.
        action: BuiltinAction,
        /// Extracted trailing argument, possibly empty.
        argument: String,
        /// Rendered feedback text.
        feedback: String,
    },
    /// A complex task fired.
    Task {
        /// Entry name.
        name: String,
        /// Opaque action identifier for the application.
        action: String,
        /// Feedback text.
        feedback: String,
    },
    /// An automation sequence fired.
    Automation {
        /// Entry name.
        name: String,
        /// Opaque action identifier for the application.
        action: String,
        /// Feedback text.
        feedback: String,
    },
    /// Nothing matched; only feedback is produced.
    NotRecognized {
        /// Feedback text, with a "did you mean" hint when one clears
        /// the similarity threshold.
        feedback: String,
    },
}

impl Outcome {
    /// The feedback text carried by every outcome.
    #[must_use]
    pub fn feedback(&self) -> &str {
        match self {
            Self::Builtin { feedback, .. }
            | Self::Task { feedback, .. }
            | Self::Automation { feedback, .. }
            | Self::NotRecognized { feedback } => feedback,
        }
    }
}

/// The phrase-matching dispatcher. Construct once, call
/// [`dispatch`](Self::dispatch) once per finalized utterance.
pub struct Dispatcher {
    tasks: Vec<CommandEntry>,
    automations: Vec<CommandEntry>,
    not_recognized: String,
    suggestion_threshold: f64,
    suggestion_phrases: Vec<String>,
}

impl Dispatcher {
    /// Build a dispatcher over externally supplied complex tasks and
    /// automation sequences, with default feedback settings.
    #[must_use]
    pub fn new(tasks: Vec<CommandEntry>, automations: Vec<CommandEntry>) -> Self {
        Self::with_feedback(
            tasks,
            automations,
            DEFAULT_NOT_RECOGNIZED.to_owned(),
            DEFAULT_SUGGESTION_THRESHOLD,
        )
    }

    /// Build a dispatcher with configured not-recognized feedback and
    /// suggestion threshold.
    #[must_use]
    pub fn with_feedback(
        tasks: Vec<CommandEntry>,
        automations: Vec<CommandEntry>,
        not_recognized: String,
        suggestion_threshold: f64,
    ) -> Self {
        let tasks: Vec<CommandEntry> = tasks.into_iter().map(CommandEntry::normalized).collect();
        let automations: Vec<CommandEntry> = automations
            .into_iter()
            .map(CommandEntry::normalized)
            .collect();

        let mut suggestion_phrases: Vec<String> = BUILTIN_COMMANDS
            .iter()
            .map(|c| c.phrase.to_owned())
            .collect();
        for entry in tasks.iter().chain(automations.iter()) {
            if entry.phrases.is_empty() {
                suggestion_phrases.push(entry.name.clone());
            } else {
                suggestion_phrases.extend(entry.phrases.iter().cloned());
            }
        }

        Self {
            tasks,
            automations,
            not_recognized,
            suggestion_threshold,
            suggestion_phrases,
        }
    }

    /// Build a dispatcher from the `[commands]` configuration section.
    #[must_use]
    pub fn from_config(config: &CommandsConfig) -> Self {
        Self::with_feedback(
            config.complex_tasks.clone(),
            config.automations.clone(),
            config.not_recognized.clone(),
            config.suggestion_threshold,
        )
    }

    /// Map a transcript to exactly one [`Outcome`].
    ///
    /// Matching is substring containment in priority order: the
    /// built-in table, then complex tasks, then automation sequences.
    /// At most one command fires per transcript.
    #[must_use]
    pub fn dispatch(&self, transcript: &str) -> Outcome {
        // Transcripts arrive lowercase from the adapter; normalize
        // again so direct callers get the same behavior.
        let transcript = transcript.to_lowercase();

        if let Some(m) = builtin::match_builtin(&transcript) {
            debug!(
                phrase = m.command.phrase,
                argument = %m.argument,
                "built-in command matched"
            );
            return Outcome::Builtin {
                action: m.command.action,
                feedback: render_feedback(m.command.feedback, &m.argument),
                argument: m.argument,
            };
        }

        if let Some(entry) = external::find_match(&self.tasks, &transcript) {
            debug!(name = %entry.name, "complex task matched");
            return Outcome::Task {
                name: entry.name.clone(),
                action: entry.action.clone(),
                feedback: entry
                    .feedback
                    .clone()
                    .unwrap_or_else(|| format!("running {}", entry.name)),
            };
        }

        if let Some(entry) = external::find_match(&self.automations, &transcript) {
            debug!(name = %entry.name, "automation sequence matched");
            return Outcome::Automation {
                name: entry.name.clone(),
                action: entry.action.clone(),
                feedback: entry
                    .feedback
                    .clone()
                    .unwrap_or_else(|| format!("starting {}", entry.name)),
            };
        }

        info!(transcript = %transcript, "command not recognized");
        let feedback = match self.suggest(&transcript) {
            Some(phrase) => format!("{}, did you mean \"{phrase}\"?", self.not_recognized),
            None => self.not_recognized.clone(),
        };
        Outcome::NotRecognized { feedback }
    }

    /// Closest known trigger phrase above the similarity threshold.
    fn suggest(&self, transcript: &str) -> Option<String> {
        let mut best: Option<(&String, f64)> = None;
        for phrase in &self.suggestion_phrases {
            let similarity = strsim::jaro_winkler(transcript, phrase);
            if similarity >= self.suggestion_threshold
                && best.is_none_or(|(_, score)| similarity > score)
            {
                best = Some((phrase, similarity));
            }
        }
        best.map(|(phrase, _)| phrase.clone())
    }
}
