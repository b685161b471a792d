//! Hero catalogue

use serde::{Deserialize, Serialize};

use crate::validation::{Dto, Field, Shape};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Role {
    Duelist,
    Strategist,
    Vanguard,
}

impl Role {
    pub const NAMES: [&'static str; 3] = ["Duelist", "Strategist", "Vanguard"];

    /// Unknown role names fall back to Duelist.
    pub fn from_name(name: &str) -> Self {
        match name {
            "Strategist" => Self::Strategist,
            "Vanguard" => Self::Vanguard,
            _ => Self::Duelist,
        }
    }
}

/// Entry of the hero list
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct HeroSummary {
    pub id: String,
    pub name: String,
    pub real_name: String,
    #[serde(rename = "imageUrl")]
    pub image_url: String,
    pub role: Role,
    pub attack_type: String,
    pub team: Vec<String>,
    pub difficulty: String,
    pub bio: String,
    pub lore: String,
    pub transformations: Vec<serde_json::Value>,
    pub costumes: Vec<serde_json::Value>,
    pub abilities: Vec<serde_json::Value>,
}

fn common_fields() -> Vec<Field> {
    vec![
        Field::req("id", Shape::String),
        Field::req("name", Shape::String),
        Field::req("real_name", Shape::String),
        Field::req("imageUrl", Shape::String),
        Field::req("role", Shape::one_of(&Role::NAMES)),
        Field::req("attack_type", Shape::String),
        Field::req("team", Shape::array(Shape::String)),
        Field::req("difficulty", Shape::String),
        Field::req("bio", Shape::String),
        Field::req("lore", Shape::String),
    ]
}

impl Dto for HeroSummary {
    fn shape() -> Shape {
        let mut fields = common_fields();
        fields.extend([
            Field::req("transformations", Shape::array(Shape::Any)),
            Field::req("costumes", Shape::array(Shape::Any)),
            Field::req("abilities", Shape::array(Shape::Any)),
        ]);
        Shape::object("HeroesDTO", fields)
    }
}

/// A single hero with its ability kit
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct HeroDetail {
    pub id: String,
    pub name: String,
    pub real_name: String,
    #[serde(rename = "imageUrl")]
    pub image_url: String,
    pub role: Role,
    pub attack_type: String,
    pub team: Vec<String>,
    pub difficulty: String,
    pub bio: String,
    pub lore: String,
    pub transformations: Vec<serde_json::Value>,
    pub costumes: Vec<serde_json::Value>,
    pub abilities: Vec<Ability>,
}

impl Dto for HeroDetail {
    fn shape() -> Shape {
        let mut fields = common_fields();
        fields.extend([
            Field::req("transformations", Shape::array(Shape::Any)),
            Field::req("costumes", Shape::array(Shape::Any)),
            Field::req("abilities", Shape::array(Ability::shape())),
        ]);
        Shape::object("HeroDTO", fields)
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Ability {
    pub id: u64,
    #[serde(default)]
    pub icon: Option<String>,
    #[serde(default)]
    pub name: Option<String>,
    #[serde(rename = "type")]
    pub kind: String,
    #[serde(default)]
    pub description: Option<String>,
}

impl Dto for Ability {
    fn shape() -> Shape {
        Shape::object(
            "Ability",
            vec![
                Field::req("id", Shape::Integer),
                Field::opt("icon", Shape::nullable(Shape::String)),
                Field::opt("name", Shape::nullable(Shape::String)),
                Field::req("type", Shape::String),
                Field::opt("description", Shape::nullable(Shape::String)),
            ],
        )
    }
}
