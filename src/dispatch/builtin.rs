//! Fixed table of built-in voice commands.
//!
//! Matching is pure substring containment in table order; the first
//! command whose trigger phrase occurs anywhere in the transcript wins.
//! A phrase embedded in a longer word still matches ("restart timer"
//! fires the start-timer action). Kept for behavioral compatibility.

/// Actions the application wires to its timer, exercise and view logic.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BuiltinAction {
    /// Start the workout timer.
    StartTimer,
    /// Stop the workout timer.
    StopTimer,
    /// Pause the workout timer.
    PauseTimer,
    /// Reset the workout timer.
    ResetTimer,
    /// Set the timer duration from the spoken argument.
    SetDuration,
    /// Set the repetition count from the spoken argument.
    SetReps,
    /// Record an exercise named by the spoken argument.
    LogExercise,
    /// Advance to the next exercise in the plan.
    NextExercise,
    /// Navigate to the view named by the spoken argument.
    ShowView,
    /// Read out the available commands.
    Help,
}

/// One row of the built-in command table.
#[derive(Debug)]
pub struct BuiltinCommand {
    /// Trigger phrase, lowercase.
    pub phrase: &'static str,
    /// Action selected when the phrase matches.
    pub action: BuiltinAction,
    /// Whether the text after the phrase is extracted as an argument.
    pub takes_argument: bool,
    /// Feedback template; `{arg}` is replaced by the extracted argument.
    pub feedback: &'static str,
}

/// The built-in command table, evaluated strictly in order.
pub const BUILTIN_COMMANDS: &[BuiltinCommand] = &[
    BuiltinCommand {
        phrase: "start timer",
        action: BuiltinAction::StartTimer,
        takes_argument: false,
        feedback: "timer started",
    },
    BuiltinCommand {
        phrase: "stop timer",
        action: BuiltinAction::StopTimer,
        takes_argument: false,
        feedback: "timer stopped",
    },
    BuiltinCommand {
        phrase: "pause timer",
        action: BuiltinAction::PauseTimer,
        takes_argument: false,
        feedback: "timer paused",
    },
    BuiltinCommand {
        phrase: "reset timer",
        action: BuiltinAction::ResetTimer,
        takes_argument: false,
        feedback: "timer reset",
    },
    BuiltinCommand {
        phrase: "set duration",
        action: BuiltinAction::SetDuration,
        takes_argument: true,
        feedback: "duration set to {arg}",
    },
    BuiltinCommand {
        phrase: "set reps",
        action: BuiltinAction::SetReps,
        takes_argument: true,
        feedback: "reps set to {arg}",
    },
    BuiltinCommand {
        phrase: "log exercise",
        action: BuiltinAction::LogExercise,
        takes_argument: true,
        feedback: "logged {arg}",
    },
    BuiltinCommand {
        phrase: "next exercise",
        action: BuiltinAction::NextExercise,
        takes_argument: false,
        feedback: "moving to the next exercise",
    },
    BuiltinCommand {
        phrase: "go to",
        action: BuiltinAction::ShowView,
        takes_argument: true,
        feedback: "showing {arg}",
    },
    BuiltinCommand {
        phrase: "show",
        action: BuiltinAction::ShowView,
        takes_argument: true,
        feedback: "showing {arg}",
    },
    BuiltinCommand {
        phrase: "help",
        action: BuiltinAction::Help,
        takes_argument: false,
        feedback: "try start timer, stop timer, or log exercise followed by a name",
    },
];

/// A matched built-in command plus its extracted argument.
#[derive(Debug)]
pub struct BuiltinMatch {
    /// The winning table row.
    pub command: &'static BuiltinCommand,
    /// Trimmed text after the first occurrence of the trigger phrase;
    /// empty when the phrase takes no argument or ends the transcript.
    pub argument: String,
}

/// Scan the table in order and return the first containment match.
#[must_use]
pub fn match_builtin(transcript: &str) -> Option<BuiltinMatch> {
    for command in BUILTIN_COMMANDS {
        if let Some(pos) = transcript.find(command.phrase) {
            let argument = if command.takes_argument {
                transcript[pos + command.phrase.len()..].trim().to_owned()
            } else {
                String::new()
            };
            return Some(BuiltinMatch { command, argument });
        }
    }
    None
}

/// Render a feedback template, substituting `{arg}` and trimming the
/// result so an empty argument reads cleanly.
#[must_use]
pub fn render_feedback(template: &str, argument: &str) -> String {
    template.replace("{arg}", argument).trim().to_owned()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn exact_phrase_matches_without_argument() {
        let m = match_builtin("start timer").unwrap();
        assert_eq!(m.command.action, BuiltinAction::StartTimer);
        assert_eq!(m.argument, "");
    }

    #[test]
    fn trailing_text_becomes_the_argument() {
        let m = match_builtin("log exercise pushups").unwrap();
        assert_eq!(m.command.action, BuiltinAction::LogExercise);
        assert_eq!(m.argument, "pushups");
    }

    #[test]
    fn argument_is_trimmed() {
        let m = match_builtin("set duration   five minutes  ").unwrap();
        assert_eq!(m.command.action, BuiltinAction::SetDuration);
        assert_eq!(m.argument, "five minutes");
    }

    #[test]
    fn argument_follows_the_first_occurrence() {
        let m = match_builtin("log exercise log exercise").unwrap();
        assert_eq!(m.command.action, BuiltinAction::LogExercise);
        assert_eq!(m.argument, "log exercise");
    }

    #[test]
    fn phrase_only_transcript_yields_empty_argument() {
        let m = match_builtin("log exercise").unwrap();
        assert_eq!(m.command.action, BuiltinAction::LogExercise);
        assert_eq!(m.argument, "");
    }

    #[test]
    fn substring_containment_matches_inside_longer_words() {
        // Deliberate policy: no word-boundary checks.
        let m = match_builtin("restart timer").unwrap();
        assert_eq!(m.command.action, BuiltinAction::StartTimer);

        let m = match_builtin("reset duration to ten").unwrap();
        assert_eq!(m.command.action, BuiltinAction::SetDuration);
        assert_eq!(m.argument, "to ten");
    }

    #[test]
    fn table_order_decides_between_overlapping_phrases() {
        // "go to" precedes "show" in the table.
        let m = match_builtin("show go to history").unwrap();
        assert_eq!(m.command.action, BuiltinAction::ShowView);
        assert_eq!(m.command.phrase, "go to");
        assert_eq!(m.argument, "history");
    }

    #[test]
    fn unknown_transcript_matches_nothing() {
        assert!(match_builtin("xyzzy").is_none());
        assert!(match_builtin("").is_none());
    }

    #[test]
    fn every_argument_command_has_an_arg_placeholder() {
        for command in BUILTIN_COMMANDS {
            assert_eq!(
                command.takes_argument,
                command.feedback.contains("{arg}"),
                "feedback/argument mismatch for {:?}",
                command.phrase
            );
        }
    }

    #[test]
    fn feedback_renders_the_argument() {
        assert_eq!(render_feedback("logged {arg}", "squats"), "logged squats");
    }

    #[test]
    fn feedback_tolerates_an_empty_argument() {
        assert_eq!(render_feedback("logged {arg}", ""), "logged");
        assert_eq!(render_feedback("timer started", ""), "timer started");
    }
}
