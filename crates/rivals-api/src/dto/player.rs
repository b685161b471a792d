//! Player profile and search results

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

use crate::validation::{Dto, Field, Shape};

/// Result of a player name search
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FoundPlayer {
    pub name: String,
    pub uid: u64,
}

impl Dto for FoundPlayer {
    fn shape() -> Shape {
        Shape::object(
            "FoundPlayer",
            vec![
                Field::req("name", Shape::String),
                Field::req("uid", Shape::Integer),
            ],
        )
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PlayerDto {
    pub uid: u64,
    pub name: String,
    #[serde(rename = "isPrivate")]
    pub is_private: bool,
    pub player: PlayerInfo,
    pub overall_stats: OverallStats,
    pub heroes_ranked: Vec<HeroStats>,
    pub heroes_unranked: Vec<HeroStats>,
    pub updates: PlayerUpdates,
    pub match_history: Vec<serde_json::Value>,
    pub rank_history: Vec<serde_json::Value>,
    pub hero_matchups: Vec<serde_json::Value>,
    pub team_mates: Vec<serde_json::Value>,
    pub maps: Vec<serde_json::Value>,
}

impl Dto for PlayerDto {
    fn shape() -> Shape {
        let loose = || Shape::array(Shape::Any);
        Shape::object(
            "PlayerDTO",
            vec![
                Field::req("uid", Shape::Integer),
                Field::req("name", Shape::String),
                Field::req("isPrivate", Shape::Bool),
                Field::req("player", PlayerInfo::shape()),
                Field::req("overall_stats", OverallStats::shape()),
                Field::req("heroes_ranked", Shape::array(HeroStats::shape())),
                Field::req("heroes_unranked", Shape::array(HeroStats::shape())),
                Field::req("updates", PlayerUpdates::shape()),
                Field::req("match_history", loose()),
                Field::req("rank_history", loose()),
                Field::req("hero_matchups", loose()),
                Field::req("team_mates", loose()),
                Field::req("maps", loose()),
            ],
        )
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PlayerInfo {
    pub uid: u64,
    pub level: String,
    pub name: String,
    pub icon: PlayerIcon,
    pub rank: PlayerRank,
    pub team: PlayerTeam,
    pub info: SeasonInfo,
}

impl Dto for PlayerInfo {
    fn shape() -> Shape {
        Shape::object(
            "PlayerInfo",
            vec![
                Field::req("uid", Shape::Integer),
                Field::req("level", Shape::String),
                Field::req("name", Shape::String),
                Field::req("icon", PlayerIcon::shape()),
                Field::req("rank", PlayerRank::shape()),
                Field::req("team", PlayerTeam::shape()),
                Field::req("info", SeasonInfo::shape()),
            ],
        )
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PlayerIcon {
    pub player_icon_id: String,
    pub player_icon: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub banner: Option<String>,
}

impl Dto for PlayerIcon {
    fn shape() -> Shape {
        Shape::object(
            "PlayerIcon",
            vec![
                Field::req("player_icon_id", Shape::String),
                Field::req("player_icon", Shape::String),
                Field::opt("banner", Shape::nullable(Shape::String)),
            ],
        )
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PlayerRank {
    pub rank: String,
    pub image: Option<String>,
    pub color: Option<String>,
}

impl Dto for PlayerRank {
    fn shape() -> Shape {
        Shape::object(
            "PlayerRank",
            vec![
                Field::req("rank", Shape::String),
                Field::req("image", Shape::nullable(Shape::String)),
                Field::req("color", Shape::nullable(Shape::String)),
            ],
        )
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct PlayerTeam {
    pub club_team_id: String,
    pub club_team_mini_name: String,
    pub club_team_type: String,
}

impl Dto for PlayerTeam {
    fn shape() -> Shape {
        Shape::object(
            "PlayerTeam",
            vec![
                Field::req("club_team_id", Shape::String),
                Field::req("club_team_mini_name", Shape::String),
                Field::req("club_team_type", Shape::String),
            ],
        )
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SeasonInfo {
    pub completed_achievements: String,
    pub login_os: String,
    /// Keyed by ranked season id
    pub rank_game_season: BTreeMap<String, RankSeason>,
}

impl Dto for SeasonInfo {
    fn shape() -> Shape {
        Shape::object(
            "SeasonInfo",
            vec![
                Field::req("completed_achievements", Shape::String),
                Field::req("login_os", Shape::String),
                Field::req("rank_game_season", Shape::map(RankSeason::shape())),
            ],
        )
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RankSeason {
    pub rank_game_id: u64,
    pub level: u32,
    pub rank_score: f64,
    pub max_level: u32,
    pub max_rank_score: f64,
    /// Milliseconds since the epoch
    pub update_time: i64,
    pub win_count: u64,
    pub protect_score: f64,
    pub diff_score: f64,
}

impl Dto for RankSeason {
    fn shape() -> Shape {
        Shape::object(
            "RankSeason",
            vec![
                Field::req("rank_game_id", Shape::Integer),
                Field::req("level", Shape::Integer),
                Field::req("rank_score", Shape::Number),
                Field::req("max_level", Shape::Integer),
                Field::req("max_rank_score", Shape::Number),
                Field::req("update_time", Shape::Integer),
                Field::req("win_count", Shape::Integer),
                Field::req("protect_score", Shape::Number),
                Field::req("diff_score", Shape::Number),
            ],
        )
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct OverallStats {
    pub total_matches: u64,
    pub total_wins: u64,
    pub unranked: ModeStats,
    pub ranked: ModeStats,
}

impl Dto for OverallStats {
    fn shape() -> Shape {
        Shape::object(
            "OverallStats",
            vec![
                Field::req("total_matches", Shape::Integer),
                Field::req("total_wins", Shape::Integer),
                Field::req("unranked", ModeStats::shape()),
                Field::req("ranked", ModeStats::shape()),
            ],
        )
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ModeStats {
    pub total_matches: u64,
    pub total_wins: u64,
    pub total_assists: u64,
    pub total_deaths: u64,
    pub total_kills: u64,
    /// Display form, e.g. `"12h 3m"`
    #[serde(default)]
    pub total_time_played: Option<String>,
    /// Seconds
    pub total_time_played_raw: f64,
    pub total_mvp: u64,
    pub total_svp: u64,
}

impl Dto for ModeStats {
    fn shape() -> Shape {
        Shape::object(
            "ModeStats",
            vec![
                Field::req("total_matches", Shape::Integer),
                Field::req("total_wins", Shape::Integer),
                Field::req("total_assists", Shape::Integer),
                Field::req("total_deaths", Shape::Integer),
                Field::req("total_kills", Shape::Integer),
                Field::opt("total_time_played", Shape::nullable(Shape::String)),
                Field::req("total_time_played_raw", Shape::Number),
                Field::req("total_mvp", Shape::Integer),
                Field::req("total_svp", Shape::Integer),
            ],
        )
    }
}

/// Per-hero totals for one game mode
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct HeroStats {
    pub hero_id: u64,
    pub hero_name: String,
    pub hero_thumbnail: String,
    pub matches: u64,
    pub wins: u64,
    pub mvp: u64,
    pub svp: u64,
    pub kills: u64,
    pub deaths: u64,
    pub assists: u64,
    pub play_time: f64,
    pub damage: f64,
    pub heal: f64,
    pub damage_taken: f64,
    pub main_attack: MainAttack,
}

impl Dto for HeroStats {
    fn shape() -> Shape {
        let mut fields = vec![
            Field::req("hero_id", Shape::Integer),
            Field::req("hero_name", Shape::String),
            Field::req("hero_thumbnail", Shape::String),
        ];
        for name in ["matches", "wins", "mvp", "svp", "kills", "deaths", "assists"] {
            fields.push(Field::req(name, Shape::Integer));
        }
        for name in ["play_time", "damage", "heal", "damage_taken"] {
            fields.push(Field::req(name, Shape::Number));
        }
        fields.push(Field::req("main_attack", MainAttack::shape()));
        Shape::object("HeroesRanked", fields)
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct MainAttack {
    pub total: u64,
    pub hits: u64,
}

impl Dto for MainAttack {
    fn shape() -> Shape {
        Shape::object(
            "MainAttack",
            vec![
                Field::req("total", Shape::Integer),
                Field::req("hits", Shape::Integer),
            ],
        )
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct PlayerUpdates {
    pub info_update_time: Option<String>,
    pub last_history_update: Option<String>,
    pub last_inserted_match: Option<String>,
    pub last_update_request: Option<String>,
}

impl Dto for PlayerUpdates {
    fn shape() -> Shape {
        let stamp = || Shape::nullable(Shape::String);
        Shape::object(
            "PlayerUpdates",
            vec![
                Field::req("info_update_time", stamp()),
                Field::req("last_history_update", stamp()),
                Field::req("last_inserted_match", stamp()),
                Field::req("last_update_request", stamp()),
            ],
        )
    }
}

#[cfg(test)]
#[allow(clippy::expect_used, clippy::panic)]
mod tests {
    use super::*;
    use crate::validation::{Validation, validate};
    use serde_json::json;

    fn sample_player(uid: u64) -> serde_json::Value {
        let mode = json!({
            "total_matches": 10, "total_wins": 6, "total_assists": 20,
            "total_deaths": 8, "total_kills": 30, "total_time_played": "2h 1m",
            "total_time_played_raw": 7260.5, "total_mvp": 1, "total_svp": 2
        });
        json!({
            "uid": uid,
            "name": "Iron-Fist",
            "isPrivate": false,
            "player": {
                "uid": uid,
                "level": "42",
                "name": "Iron-Fist",
                "icon": {"player_icon_id": "30000001", "player_icon": "/players/heads/30000001.png"},
                "rank": {"rank": "Gold II", "image": null, "color": "#FFDA57"},
                "team": {"club_team_id": "", "club_team_mini_name": "", "club_team_type": ""},
                "info": {
                    "completed_achievements": "",
                    "login_os": "pc",
                    "rank_game_season": {}
                }
            },
            "overall_stats": {"total_matches": 10, "total_wins": 6, "unranked": mode, "ranked": mode},
            "heroes_ranked": [],
            "heroes_unranked": [],
            "updates": {
                "info_update_time": null, "last_history_update": null,
                "last_inserted_match": null, "last_update_request": null
            },
            "match_history": [], "rank_history": [], "hero_matchups": [],
            "team_mates": [], "maps": []
        })
    }

    #[test]
    fn test_player_payload_validates() {
        let Validation::Valid(player) = validate::<PlayerDto>(sample_player(12345)) else {
            panic!("sample player should validate");
        };
        assert_eq!(player.uid, 12345);
        assert_eq!(player.player.rank.color.as_deref(), Some("#FFDA57"));
        assert_eq!(player.overall_stats.ranked.total_time_played.as_deref(), Some("2h 1m"));
    }

    #[test]
    fn test_nested_mismatch_paths() {
        let mut payload = sample_player(1);
        payload["player"]["level"] = json!(42);
        payload["overall_stats"]["ranked"]["total_kills"] = json!("many");

        let Validation::Invalid(mismatches) = validate::<PlayerDto>(payload) else {
            panic!("payload should be rejected");
        };
        let paths: Vec<&str> = mismatches.iter().map(|m| m.path.as_str()).collect();
        assert_eq!(
            paths,
            vec!["$input.player.level", "$input.overall_stats.ranked.total_kills"]
        );
    }
}
