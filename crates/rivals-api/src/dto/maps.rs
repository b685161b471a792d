//! Map catalogue

use serde::{Deserialize, Serialize};

use crate::validation::{Dto, Field, Shape};

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Maps {
    pub total_maps: u64,
    pub maps: Vec<GameMap>,
}

impl Dto for Maps {
    fn shape() -> Shape {
        Shape::object(
            "MapsDTO",
            vec![
                Field::req("total_maps", Shape::Integer),
                Field::req("maps", Shape::array(GameMap::shape())),
            ],
        )
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct GameMap {
    pub id: u64,
    pub name: String,
    pub full_name: String,
    pub location: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    pub game_mode: String,
    pub video: Option<String>,
    pub images: Vec<String>,
}

impl Dto for GameMap {
    fn shape() -> Shape {
        Shape::object(
            "MapDTO",
            vec![
                Field::req("id", Shape::Integer),
                Field::req("name", Shape::String),
                Field::req("full_name", Shape::String),
                Field::req("location", Shape::String),
                Field::opt("description", Shape::String),
                Field::req("game_mode", Shape::String),
                Field::req("video", Shape::nullable(Shape::String)),
                Field::req("images", Shape::array(Shape::String)),
            ],
        )
    }
}
