//! Match history pages

use serde::{Deserialize, Serialize};

use crate::validation::{Dto, Field, Shape};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MatchHistory {
    pub match_history: Vec<MatchSummary>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub pagination: Option<Pagination>,
}

impl Dto for MatchHistory {
    fn shape() -> Shape {
        Shape::object(
            "MatchHistoryDTO",
            vec![
                Field::req("match_history", Shape::array(MatchSummary::shape())),
                Field::opt("pagination", Pagination::shape()),
            ],
        )
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MatchSummary {
    pub match_uid: String,
    pub map_id: u64,
    #[serde(default)]
    pub map_thumbnail: Option<String>,
    /// Seconds since the epoch
    pub match_time_stamp: i64,
    /// Seconds
    pub duration: f64,
    pub game_mode_id: u64,
    #[serde(default)]
    pub winner_side: Option<u64>,
    /// Stats of the requested player in this match
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub match_player: Option<serde_json::Value>,
}

impl Dto for MatchSummary {
    fn shape() -> Shape {
        Shape::object(
            "MatchSummary",
            vec![
                Field::req("match_uid", Shape::String),
                Field::req("map_id", Shape::Integer),
                Field::opt("map_thumbnail", Shape::nullable(Shape::String)),
                Field::req("match_time_stamp", Shape::Integer),
                Field::req("duration", Shape::Number),
                Field::req("game_mode_id", Shape::Integer),
                Field::opt("winner_side", Shape::nullable(Shape::Integer)),
                Field::opt("match_player", Shape::Any),
            ],
        )
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Pagination {
    pub page: u32,
    pub limit: u32,
    pub total_matches: u64,
    pub has_more: bool,
}

impl Dto for Pagination {
    fn shape() -> Shape {
        Shape::object(
            "Pagination",
            vec![
                Field::req("page", Shape::Integer),
                Field::req("limit", Shape::Integer),
                Field::req("total_matches", Shape::Integer),
                Field::req("has_more", Shape::Bool),
            ],
        )
    }
}
