//! Classification of a player's stat markers into event tokens.
//!
//! A marker is an icon carrying a set of class labels plus some display
//! text, e.g. `<i class="icon ball"></i> 34'`. Goals, substitutions and
//! cards are told apart only by those labels.

use regex::Regex;
use serde::Serialize;
use std::sync::LazyLock;

static NON_MINUTE_CHARS: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"[^0-9,]").unwrap());

/// Kind of match event a marker label stands for
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
pub enum EventKind {
    Goal,
    SubstituteOn,
    SubstituteOff,
    YellowCard,
    RedCard,
    Unknown,
}

impl EventKind {
    /// Classify a single icon class label
    pub fn from_label(label: &str) -> Self {
        match label {
            "ball" => EventKind::Goal,
            "subson" => EventKind::SubstituteOn,
            "subsoff" => EventKind::SubstituteOff,
            "yellow-card" | "yellowcard" => EventKind::YellowCard,
            "red-card" | "redcard" => EventKind::RedCard,
            _ => EventKind::Unknown,
        }
    }
}

/// One classified occurrence for one player
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct EventToken {
    pub kind: EventKind,
    /// Digits of the recorded minute, kept as text; `None` when the event
    /// was recorded without a minute
    pub minute: Option<String>,
}

impl EventToken {
    pub fn new(kind: EventKind, minute: Option<String>) -> Self {
        Self { kind, minute }
    }
}

/// Keep only digits and commas from a marker's display text.
///
/// Stoppage-time annotations collapse: `45+2'` becomes `452`.
pub fn strip_minute_text(raw: &str) -> String {
    NON_MINUTE_CHARS.replace_all(raw, "").into_owned()
}

/// Split a stripped minute string into its non-empty digit pieces
fn split_minutes(minute_text: &str) -> Vec<String> {
    minute_text
        .split(',')
        .filter(|piece| !piece.is_empty())
        .map(str::to_string)
        .collect()
}

/// Turn one marker (its class labels and raw text) into event tokens.
///
/// Goal takes precedence over substitution labels; card labels are
/// evaluated independently, so one marker can yield both a movement and
/// a card. Goals without a minute still produce a token; substitutions
/// without one produce nothing. Minutes stay digit text, so any marker
/// content is accepted.
pub fn parse_marker<S: AsRef<str>>(labels: &[S], raw_text: &str) -> Vec<EventToken> {
    let kinds: Vec<EventKind> = labels
        .iter()
        .map(|label| EventKind::from_label(label.as_ref()))
        .collect();
    let has = |kind: EventKind| kinds.contains(&kind);

    let minute_text = strip_minute_text(raw_text);
    let mut tokens = Vec::new();

    if has(EventKind::Goal) {
        let minutes = split_minutes(&minute_text);
        if minutes.is_empty() {
            tokens.push(EventToken::new(EventKind::Goal, None));
        } else {
            tokens.extend(
                minutes
                    .into_iter()
                    .map(|m| EventToken::new(EventKind::Goal, Some(m))),
            );
        }
    } else if has(EventKind::SubstituteOn) {
        tokens.extend(
            split_minutes(&minute_text)
                .into_iter()
                .map(|m| EventToken::new(EventKind::SubstituteOn, Some(m))),
        );
    } else if has(EventKind::SubstituteOff) {
        tokens.extend(
            split_minutes(&minute_text)
                .into_iter()
                .map(|m| EventToken::new(EventKind::SubstituteOff, Some(m))),
        );
    }

    if has(EventKind::YellowCard) {
        tokens.push(EventToken::new(EventKind::YellowCard, None));
    }
    if has(EventKind::RedCard) {
        tokens.push(EventToken::new(EventKind::RedCard, None));
    }

    tokens
}
