//! Externally supplied command definitions: "complex tasks" and
//! "automation sequences" share one shape and one matching rule.

use serde::Deserialize;

/// One externally defined command entry.
///
/// An entry with trigger `phrases` matches when any phrase occurs in
/// the transcript (phrases are tested in order); an entry without
/// phrases falls back to containment of its `name`.
#[derive(Debug, Clone, Deserialize, PartialEq, Eq)]
pub struct CommandEntry {
    /// Display name; doubles as the trigger when `phrases` is empty.
    pub name: String,
    /// Trigger phrases, tested in order.
    #[serde(default)]
    pub phrases: Vec<String>,
    /// Opaque action identifier handed back to the application.
    pub action: String,
    /// Feedback text spoken/shown when the entry fires.
    #[serde(default)]
    pub feedback: Option<String>,
}

impl CommandEntry {
    /// Lowercase the name and phrases so matching against an
    /// already-lowercase transcript is direct.
    #[must_use]
    pub fn normalized(mut self) -> Self {
        self.name = self.name.to_lowercase();
        self.phrases = self.phrases.iter().map(|p| p.to_lowercase()).collect();
        self
    }

    fn matches(&self, transcript: &str) -> bool {
        if self.phrases.is_empty() {
            transcript.contains(self.name.as_str())
        } else {
            self.phrases.iter().any(|p| transcript.contains(p.as_str()))
        }
    }
}

/// Scan `entries` in order and return the first whose trigger occurs in
/// the transcript. Scanning stops at the first match.
#[must_use]
pub fn find_match<'a>(entries: &'a [CommandEntry], transcript: &str) -> Option<&'a CommandEntry> {
    entries.iter().find(|entry| entry.matches(transcript))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn entry(name: &str, phrases: &[&str], action: &str) -> CommandEntry {
        CommandEntry {
            name: name.to_owned(),
            phrases: phrases.iter().map(|p| (*p).to_owned()).collect(),
            action: action.to_owned(),
            feedback: None,
        }
        .normalized()
    }

    #[test]
    fn phrase_containment_selects_the_entry() {
        let entries = vec![
            entry("warmup", &["begin warmup", "warm up"], "task.warmup"),
            entry("cooldown", &["begin cooldown"], "task.cooldown"),
        ];

        let m = find_match(&entries, "please begin cooldown now").unwrap();
        assert_eq!(m.action, "task.cooldown");
    }

    #[test]
    fn first_entry_wins_when_several_match() {
        let entries = vec![
            entry("warmup", &["begin"], "task.warmup"),
            entry("cooldown", &["begin"], "task.cooldown"),
        ];

        let m = find_match(&entries, "begin").unwrap();
        assert_eq!(m.action, "task.warmup");
    }

    #[test]
    fn name_is_the_fallback_trigger() {
        let entries = vec![entry("evening stretch", &[], "task.stretch")];

        let m = find_match(&entries, "run my evening stretch routine").unwrap();
        assert_eq!(m.action, "task.stretch");
    }

    #[test]
    fn phrases_take_precedence_over_name_when_present() {
        // With phrases defined, the name alone does not trigger.
        let entries = vec![entry("evening stretch", &["stretch time"], "task.stretch")];

        assert!(find_match(&entries, "evening stretch").is_none());
        assert!(find_match(&entries, "stretch time").is_some());
    }

    #[test]
    fn mixed_case_definitions_are_normalized() {
        let entries = vec![entry("Warmup", &["Begin Warmup"], "task.warmup")];
        assert!(find_match(&entries, "begin warmup").is_some());
    }

    #[test]
    fn no_entries_no_match() {
        assert!(find_match(&[], "anything").is_none());
    }

    #[test]
    fn deserializes_with_optional_fields() {
        let entry: CommandEntry = toml::from_str(
            r#"
            name = "warmup"
            action = "task.warmup"
            "#,
        )
        .unwrap();
        assert!(entry.phrases.is_empty());
        assert!(entry.feedback.is_none());
    }
}
