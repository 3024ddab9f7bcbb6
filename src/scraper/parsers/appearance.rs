//! Per-player appearance records built from event tokens.

use serde::{Deserialize, Serialize};

use super::{EventKind, EventToken};

/// Separator used when storing minute lists
pub const MINUTE_SEPARATOR: &str = ", ";

/// One player's participation in one fixture.
///
/// Identity is (`fixture_id`, `player_name`).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Appearance {
    pub fixture_id: String,
    pub player_name: String,
    pub team_name: String,
    pub is_starter: bool,
    pub goals: u32,
    pub goal_minutes: Option<String>,
    pub sub_on_minutes: Option<String>,
    pub sub_off_minutes: Option<String>,
    pub yellow_cards: u32,
    pub red_cards: u32,
}

/// Reduces a player's token sequence into an [`Appearance`]
pub struct AppearanceBuilder;

impl AppearanceBuilder {
    pub fn build(
        fixture_id: &str,
        player_name: &str,
        team_name: &str,
        is_starter: bool,
        tokens: &[EventToken],
    ) -> Appearance {
        let count = |kind: EventKind| tokens.iter().filter(|t| t.kind == kind).count() as u32;

        Appearance {
            fixture_id: fixture_id.to_string(),
            player_name: player_name.to_string(),
            team_name: team_name.to_string(),
            is_starter,
            // Known-minute and unknown-minute goals both count
            goals: count(EventKind::Goal),
            goal_minutes: join_minutes(tokens, EventKind::Goal),
            sub_on_minutes: join_minutes(tokens, EventKind::SubstituteOn),
            sub_off_minutes: join_minutes(tokens, EventKind::SubstituteOff),
            yellow_cards: count(EventKind::YellowCard),
            red_cards: count(EventKind::RedCard),
        }
    }
}

/// Join the minutes of tokens of `kind` in encounter order; `None` if there are none
fn join_minutes(tokens: &[EventToken], kind: EventKind) -> Option<String> {
    let minutes: Vec<String> = tokens
        .iter()
        .filter(|t| t.kind == kind)
        .filter_map(|t| t.minute.clone())
        .collect();

    if minutes.is_empty() {
        None
    } else {
        Some(minutes.join(MINUTE_SEPARATOR))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn token(kind: EventKind, minute: Option<u32>) -> EventToken {
        EventToken::new(kind, minute.map(|m| m.to_string()))
    }

    #[test]
    fn test_no_tokens() {
        let app = AppearanceBuilder::build("F1", "J. Bloggs", "Home FC", false, &[]);
        assert_eq!(app.goals, 0);
        assert_eq!(app.goal_minutes, None);
        assert_eq!(app.sub_on_minutes, None);
        assert_eq!(app.sub_off_minutes, None);
        assert_eq!(app.yellow_cards, 0);
        assert_eq!(app.red_cards, 0);
        assert!(!app.is_starter);
    }

    #[test]
    fn test_goal_and_yellow() {
        let tokens = [
            token(EventKind::Goal, Some(34)),
            token(EventKind::YellowCard, None),
        ];
        let app = AppearanceBuilder::build("F1", "A. Smith", "Home FC", true, &tokens);
        assert_eq!(app.fixture_id, "F1");
        assert_eq!(app.player_name, "A. Smith");
        assert_eq!(app.goals, 1);
        assert_eq!(app.goal_minutes.as_deref(), Some("34"));
        assert_eq!(app.yellow_cards, 1);
        assert_eq!(app.red_cards, 0);
    }

    #[test]
    fn test_unknown_minute_goal_counts_without_minute() {
        let tokens = [
            token(EventKind::Goal, Some(12)),
            token(EventKind::Goal, None),
            token(EventKind::Goal, Some(80)),
        ];
        let app = AppearanceBuilder::build("F1", "B. Jones", "Away FC", true, &tokens);
        assert_eq!(app.goals, 3);
        assert_eq!(app.goal_minutes.as_deref(), Some("12, 80"));
    }

    #[test]
    fn test_only_unknown_minute_goal() {
        let tokens = [token(EventKind::Goal, None)];
        let app = AppearanceBuilder::build("F1", "B. Jones", "Away FC", true, &tokens);
        assert_eq!(app.goals, 1);
        assert_eq!(app.goal_minutes, None);
    }

    #[test]
    fn test_substitution_minutes_in_order() {
        let tokens = [
            token(EventKind::SubstituteOn, Some(46)),
            token(EventKind::SubstituteOff, Some(88)),
            token(EventKind::SubstituteOn, Some(20)),
        ];
        let app = AppearanceBuilder::build("F1", "C. Brown", "Home FC", false, &tokens);
        assert_eq!(app.sub_on_minutes.as_deref(), Some("46, 20"));
        assert_eq!(app.sub_off_minutes.as_deref(), Some("88"));
        assert_eq!(app.goals, 0);
    }

    #[test]
    fn test_card_counts() {
        let tokens = [
            token(EventKind::YellowCard, None),
            token(EventKind::YellowCard, None),
            token(EventKind::RedCard, None),
        ];
        let app = AppearanceBuilder::build("F1", "D. Green", "Home FC", true, &tokens);
        assert_eq!(app.yellow_cards, 2);
        assert_eq!(app.red_cards, 1);
    }

    #[test]
    fn test_deterministic() {
        let tokens = [
            token(EventKind::Goal, Some(5)),
            token(EventKind::SubstituteOff, Some(70)),
        ];
        let a = AppearanceBuilder::build("F1", "E. White", "Home FC", true, &tokens);
        let b = AppearanceBuilder::build("F1", "E. White", "Home FC", true, &tokens);
        assert_eq!(a, b);
    }
}
