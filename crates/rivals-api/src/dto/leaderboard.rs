//! Per-hero leaderboards

use serde::{Deserialize, Serialize};

use crate::validation::{Dto, Field, Shape};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct HeroLeaderboard {
    pub players: Vec<LeaderboardEntry>,
}

impl Dto for HeroLeaderboard {
    fn shape() -> Shape {
        Shape::object(
            "LeaderboardPlayerHeroDTO",
            vec![Field::req("players", Shape::array(LeaderboardEntry::shape()))],
        )
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LeaderboardEntry {
    pub info: LeaderboardPlayerInfo,
    pub player_uid: u64,
    pub matches: u64,
    pub wins: u64,
    pub kills: u64,
    pub deaths: u64,
    pub assists: u64,
    pub play_time: f64,
    pub total_hero_damage: f64,
    pub total_hero_heal: f64,
    pub total_damage_taken: f64,
}

impl Dto for LeaderboardEntry {
    fn shape() -> Shape {
        let mut fields = vec![
            Field::req("info", LeaderboardPlayerInfo::shape()),
            Field::req("player_uid", Shape::Integer),
        ];
        for name in ["matches", "wins", "kills", "deaths", "assists"] {
            fields.push(Field::req(name, Shape::Integer));
        }
        for name in ["play_time", "total_hero_damage", "total_hero_heal", "total_damage_taken"] {
            fields.push(Field::req(name, Shape::Number));
        }
        Shape::object("LeaderboardEntry", fields)
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LeaderboardPlayerInfo {
    pub name: String,
    pub cur_head_icon_id: String,
    #[serde(default)]
    pub rank_season: Option<String>,
    pub login_os: String,
}

impl Dto for LeaderboardPlayerInfo {
    fn shape() -> Shape {
        Shape::object(
            "LeaderboardPlayerInfo",
            vec![
                Field::req("name", Shape::String),
                Field::req("cur_head_icon_id", Shape::String),
                Field::opt("rank_season", Shape::nullable(Shape::String)),
                Field::req("login_os", Shape::String),
            ],
        )
    }
}
