//! Fixture detail page parser: line-ups and per-player match events.
//!
//! URL: {base}/displayFixture.html?id=FIXTUREID
//!
//! Page structure:
//! ```text
//! div.fixture-lineup-statistics
//!   div.home-team / div.road-team
//!     div.starters / div.subs
//!       div.player
//!         p                      player name
//!         div.flex.left.middle   one marker: <i class="... ball"></i> 34'
//! ```

use scraper::{ElementRef, Html, Selector};
use std::sync::LazyLock;
use tracing::debug;

use super::{clean_text, parse_marker, Appearance, AppearanceBuilder, EventToken};

static LINEUP: LazyLock<Selector> =
    LazyLock::new(|| Selector::parse("div.fixture-lineup-statistics").unwrap());
static HOME_TEAM: LazyLock<Selector> =
    LazyLock::new(|| Selector::parse("div[class*='home-team']").unwrap());
static ROAD_TEAM: LazyLock<Selector> =
    LazyLock::new(|| Selector::parse("div[class*='road-team']").unwrap());
static STARTERS: LazyLock<Selector> = LazyLock::new(|| Selector::parse("div.starters").unwrap());
static SUBS: LazyLock<Selector> = LazyLock::new(|| Selector::parse("div.subs").unwrap());
static PLAYER: LazyLock<Selector> = LazyLock::new(|| Selector::parse("div.player").unwrap());
static PLAYER_NAME: LazyLock<Selector> = LazyLock::new(|| Selector::parse("p").unwrap());
static MARKER: LazyLock<Selector> =
    LazyLock::new(|| Selector::parse("div.flex.left.middle").unwrap());
static ICON: LazyLock<Selector> = LazyLock::new(|| Selector::parse("i").unwrap());

/// Parser for fixture detail pages
pub struct LineupParser;

impl LineupParser {
    /// Parse a fixture page into one appearance per named player.
    ///
    /// Returns an empty list when the page has no published line-up.
    pub fn parse(html: &str, fixture_id: &str, home_team: &str, away_team: &str) -> Vec<Appearance> {
        let document = Html::parse_document(html);
        Self::extract(&document, fixture_id, home_team, away_team)
    }

    /// Walk home then away, starters then substitutes
    pub fn extract(
        document: &Html,
        fixture_id: &str,
        home_team: &str,
        away_team: &str,
    ) -> Vec<Appearance> {
        let mut appearances = Vec::new();

        let Some(grid) = document.select(&LINEUP).next() else {
            debug!(fixture_id, "no lineup section");
            return appearances;
        };

        let sides: [(&Selector, &str); 2] = [(&HOME_TEAM, home_team), (&ROAD_TEAM, away_team)];
        let groups: [(&Selector, bool); 2] = [(&STARTERS, true), (&SUBS, false)];

        for (side_selector, team_name) in sides {
            let Some(team) = grid.select(side_selector).next() else {
                continue;
            };

            for (group_selector, is_starter) in groups {
                let Some(container) = team.select(group_selector).next() else {
                    continue;
                };

                for player in container.select(&PLAYER) {
                    let Some(name) = Self::player_name(&player) else {
                        continue;
                    };

                    let tokens = Self::player_tokens(&player);
                    appearances.push(AppearanceBuilder::build(
                        fixture_id, &name, team_name, is_starter, &tokens,
                    ));
                }
            }
        }

        debug!(fixture_id, players = appearances.len(), "parsed lineup");
        appearances
    }

    fn player_name(player: &ElementRef) -> Option<String> {
        let name = clean_text(&player.select(&PLAYER_NAME).next()?);
        if name.is_empty() {
            None
        } else {
            Some(name)
        }
    }

    /// Tokens from every marker of one player, in document order
    fn player_tokens(player: &ElementRef) -> Vec<EventToken> {
        let mut tokens = Vec::new();

        for marker in player.select(&MARKER) {
            let Some(icon) = marker.select(&ICON).next() else {
                continue;
            };
            let labels: Vec<&str> = icon.value().classes().collect();
            let raw_text = marker.text().collect::<String>();

            tokens.extend(parse_marker(&labels, raw_text.trim()));
        }

        tokens
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const FIXTURE_HTML: &str = r#"<!DOCTYPE html>
<html>
<body>
<div class="fixture-lineup-statistics">
  <div class="team home-team">
    <div class="starters">
      <div class="player">
        <p>A. Smith</p>
        <div class="flex left middle"><i class="icon ball"></i><span>34'</span></div>
        <div class="flex left middle"><i class="icon yellow-card"></i></div>
      </div>
      <div class="player">
        <p>  B.   Jones </p>
        <div class="flex left middle"><i class="icon ball"></i></div>
        <div class="flex left middle"><i class="icon ball"></i> 12', 45+2'</div>
        <div class="flex left middle"><i class="icon subsoff"></i> 70'</div>
      </div>
      <div class="player">
        <div class="flex left middle"><i class="icon ball"></i> 5'</div>
      </div>
    </div>
    <div class="subs">
      <div class="player">
        <p>C. Brown</p>
        <div class="flex left middle"><i class="icon subson"></i> 70'</div>
        <div class="flex left middle"><i class="icon subsoff"></i></div>
      </div>
    </div>
  </div>
  <div class="team road-team">
    <div class="starters">
      <div class="player">
        <p>D. Green</p>
        <div class="flex left middle"><i class="icon redcard"></i> 88'</div>
        <div class="flex left middle"><span>no icon here</span></div>
      </div>
      <div class="player">
        <p>E. Busy</p>
        <div class="flex left middle"><i class="icon ball"></i> 12' 34' 56' 78' 90+1'</div>
      </div>
    </div>
    <div class="subs">
      <div class="player"><p>F. Unused</p></div>
    </div>
  </div>
</div>
</body>
</html>"#;

    fn parse_sample() -> Vec<Appearance> {
        LineupParser::parse(FIXTURE_HTML, "F1", "Hampsthwaite FC", "Road Rovers")
    }

    fn find<'a>(apps: &'a [Appearance], name: &str) -> &'a Appearance {
        apps.iter().find(|a| a.player_name == name).unwrap()
    }

    #[test]
    fn test_scorer_with_yellow() {
        let apps = parse_sample();
        let smith = find(&apps, "A. Smith");
        assert_eq!(smith.fixture_id, "F1");
        assert_eq!(smith.team_name, "Hampsthwaite FC");
        assert!(smith.is_starter);
        assert_eq!(smith.goals, 1);
        assert_eq!(smith.goal_minutes.as_deref(), Some("34"));
        assert_eq!(smith.yellow_cards, 1);
        assert_eq!(smith.red_cards, 0);
    }

    #[test]
    fn test_unknown_minute_goal_and_stoppage_time() {
        let apps = parse_sample();
        let jones = find(&apps, "B. Jones");
        assert_eq!(jones.goals, 3);
        assert_eq!(jones.goal_minutes.as_deref(), Some("12, 452"));
        assert_eq!(jones.sub_off_minutes.as_deref(), Some("70"));
    }

    #[test]
    fn test_substitute_group_and_dropped_substitution() {
        let apps = parse_sample();
        let brown = find(&apps, "C. Brown");
        assert!(!brown.is_starter);
        assert_eq!(brown.team_name, "Hampsthwaite FC");
        assert_eq!(brown.sub_on_minutes.as_deref(), Some("70"));
        assert_eq!(brown.sub_off_minutes, None);
    }

    #[test]
    fn test_away_side() {
        let apps = parse_sample();
        let green = find(&apps, "D. Green");
        assert_eq!(green.team_name, "Road Rovers");
        assert_eq!(green.red_cards, 1);
        assert_eq!(green.goals, 0);

        let unused = find(&apps, "F. Unused");
        assert!(!unused.is_starter);
        assert_eq!(unused.goals, 0);
    }

    #[test]
    fn test_nameless_player_skipped() {
        let apps = parse_sample();
        assert_eq!(apps.len(), 6);
        assert!(apps.iter().all(|a| !a.player_name.is_empty()));
    }

    #[test]
    fn test_space_separated_minutes_keep_player() {
        let apps = parse_sample();
        let busy = find(&apps, "E. Busy");
        assert_eq!(busy.goals, 1);
        assert_eq!(busy.goal_minutes.as_deref(), Some("123456789901"));
        assert_eq!(busy.team_name, "Road Rovers");
    }

    #[test]
    fn test_order_home_then_away() {
        let names: Vec<_> = parse_sample().into_iter().map(|a| a.player_name).collect();
        assert_eq!(
            names,
            vec!["A. Smith", "B. Jones", "C. Brown", "D. Green", "E. Busy", "F. Unused"]
        );
    }

    #[test]
    fn test_reparse_is_identical() {
        assert_eq!(parse_sample(), parse_sample());
    }

    #[test]
    fn test_no_lineup_section() {
        let html = r#"<html><body><div class="fixture-details">Postponed</div></body></html>"#;
        assert!(LineupParser::parse(html, "F9", "A", "B").is_empty());
    }

    #[test]
    fn test_missing_side_tolerated() {
        let html = r#"
        <div class="fixture-lineup-statistics">
          <div class="road-team"><div class="starters">
            <div class="player"><p>Solo</p></div>
          </div></div>
        </div>"#;
        let apps = LineupParser::parse(html, "F2", "Home", "Away");
        assert_eq!(apps.len(), 1);
        assert_eq!(apps[0].team_name, "Away");
    }
}
