//! The unit of communication from the recognition worker (C2) to the turn
//! pipeline (C3).

use std::time::{SystemTime, UNIX_EPOCH};

/// Discriminates why a [`SpeechEvent`] was produced.
///
/// `Partial` never reaches the turn queue — it drives barge-in only and is
/// handled entirely inside the media reactor.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum SpeechEventKind {
    Partial,
    Final,
    Error,
    Greeting,
    Announcement,
    StatusUpdate,
    ErrorMessage,
}

impl SpeechEventKind {
    /// Whether an event of this kind is enqueued to the turn pipeline.
    /// `Partial` is the only kind that is transient and never enqueued.
    #[must_use]
    pub fn is_enqueued(self) -> bool {
        !matches!(self, SpeechEventKind::Partial)
    }
}

/// A speech recognition result or system-originated utterance, flowing from
/// C2 (or synthesized by C4 for the greeting) into C3's speech queue.
#[derive(Debug, Clone)]
pub struct SpeechEvent {
    pub kind: SpeechEventKind,
    pub text: String,
    pub language: Option<String>,
    pub speaker_id: Option<String>,
    pub confidence: Option<f32>,
    /// Monotonic wall-clock timestamp, seconds since the Unix epoch.
    pub timestamp: f64,
}

impl SpeechEvent {
    fn now() -> f64 {
        SystemTime::now()
            .duration_since(UNIX_EPOCH)
            .map(|d| d.as_secs_f64())
            .unwrap_or(0.0)
    }

    /// Build a `Final` event, the result of a completed ASR utterance.
    #[must_use]
    pub fn final_result(text: impl Into<String>, language: Option<String>) -> Self {
        Self {
            kind: SpeechEventKind::Final,
            text: text.into(),
            language,
            speaker_id: None,
            confidence: None,
            timestamp: Self::now(),
        }
    }

    /// Build a `Partial` event. Never enqueued; consumed directly by the
    /// media reactor's barge-in check.
    #[must_use]
    pub fn partial(text: impl Into<String>, language: Option<String>) -> Self {
        Self {
            kind: SpeechEventKind::Partial,
            text: text.into(),
            language,
            speaker_id: None,
            confidence: None,
            timestamp: Self::now(),
        }
    }

    /// Build an `Error` event from an ASR-source error string.
    #[must_use]
    pub fn error(message: impl Into<String>) -> Self {
        Self {
            kind: SpeechEventKind::Error,
            text: message.into(),
            language: None,
            speaker_id: None,
            confidence: None,
            timestamp: Self::now(),
        }
    }

    /// Build a `Greeting` event, synthesized by the media reactor on the
    /// first `AudioMetadata` frame.
    #[must_use]
    pub fn greeting(text: impl Into<String>) -> Self {
        Self {
            kind: SpeechEventKind::Greeting,
            text: text.into(),
            language: None,
            speaker_id: None,
            confidence: None,
            timestamp: Self::now(),
        }
    }

}

/// Trimmed character count, used by the boundary checks in C2's callback
/// semantics (partial > 3 chars, final > 1 char). Counts Unicode scalar
/// values, not UTF-8 bytes, so a multibyte transcript crosses the same
/// boundary a single-byte one would.
#[must_use]
pub fn trimmed_char_count(text: &str) -> usize {
    text.trim().chars().count()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn partial_is_not_enqueued() {
        assert!(!SpeechEventKind::Partial.is_enqueued());
    }

    #[test]
    fn final_and_system_kinds_are_enqueued() {
        for kind in [
            SpeechEventKind::Final,
            SpeechEventKind::Error,
            SpeechEventKind::Greeting,
            SpeechEventKind::Announcement,
            SpeechEventKind::StatusUpdate,
            SpeechEventKind::ErrorMessage,
        ] {
            assert!(kind.is_enqueued());
        }
    }

    #[test]
    fn trimmed_char_count_ignores_surrounding_whitespace() {
        assert_eq!(trimmed_char_count("  hi  "), 2);
    }

    #[test]
    fn trimmed_char_count_counts_chars_not_bytes() {
        // "привет" is 6 Unicode scalar values but 12 UTF-8 bytes.
        assert_eq!(trimmed_char_count("  привет  "), 6);
    }
}
