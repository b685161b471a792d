//! Tracking-service payloads
//!
//! These come from a second upstream with camelCase field names and loosely
//! typed stat blocks. Only the members the profile transform reads are typed.

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

use crate::validation::{Dto, Field, Shape};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TrackerProfile {
    pub data: ProfileData,
}

impl Dto for TrackerProfile {
    fn shape() -> Shape {
        Shape::object("Profile", vec![Field::req("data", ProfileData::shape())])
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ProfileData {
    pub platform_info: PlatformInfo,
    pub metadata: ProfileMetadata,
}

impl Dto for ProfileData {
    fn shape() -> Shape {
        Shape::object(
            "ProfileData",
            vec![
                Field::req("platformInfo", PlatformInfo::shape()),
                Field::req("metadata", ProfileMetadata::shape()),
            ],
        )
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PlatformInfo {
    pub platform_slug: String,
    pub platform_user_handle: String,
    pub platform_user_identifier: String,
    pub avatar_url: String,
}

impl Dto for PlatformInfo {
    fn shape() -> Shape {
        Shape::object(
            "PlatformInfo",
            vec![
                Field::req("platformSlug", Shape::String),
                Field::req("platformUserHandle", Shape::String),
                Field::req("platformUserIdentifier", Shape::String),
                Field::req("avatarUrl", Shape::String),
            ],
        )
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ProfileMetadata {
    pub last_updated: LastUpdated,
    #[serde(rename = "isPC")]
    pub is_pc: bool,
    pub club_mini_name: Option<String>,
    pub is_private_career_overview: bool,
    pub is_private_career_statistics: bool,
    pub level: u64,
    #[serde(default)]
    pub current_season: Option<u64>,
}

impl Dto for ProfileMetadata {
    fn shape() -> Shape {
        Shape::object(
            "DataMetadata",
            vec![
                Field::req("lastUpdated", LastUpdated::shape()),
                Field::req("isPC", Shape::Bool),
                Field::req("clubMiniName", Shape::nullable(Shape::String)),
                Field::req("isPrivateCareerOverview", Shape::Bool),
                Field::req("isPrivateCareerStatistics", Shape::Bool),
                Field::req("level", Shape::Integer),
                Field::opt("currentSeason", Shape::Integer),
            ],
        )
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LastUpdated {
    /// RFC 3339 timestamp
    pub value: String,
    pub display_value: String,
}

impl Dto for LastUpdated {
    fn shape() -> Shape {
        Shape::object(
            "LastUpdated",
            vec![
                Field::req("value", Shape::String),
                Field::req("displayValue", Shape::String),
            ],
        )
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TrackerCareer {
    pub data: Vec<CareerSegment>,
}

impl Dto for TrackerCareer {
    fn shape() -> Shape {
        Shape::object(
            "CareerDTO",
            vec![Field::req("data", Shape::array(CareerSegment::shape()))],
        )
    }
}

impl TrackerCareer {
    pub fn segments<'a>(&'a self, kind: &'a str) -> impl Iterator<Item = &'a CareerSegment> {
        self.data.iter().filter(move |s| s.kind == kind)
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CareerSegment {
    /// `overview`, `hero`, `hero-role`, `ranked-peaks`
    #[serde(rename = "type")]
    pub kind: String,
    #[serde(default)]
    pub attributes: SegmentAttributes,
    #[serde(default)]
    pub metadata: SegmentMetadata,
    #[serde(default)]
    pub stats: BTreeMap<String, Stat>,
}

impl Dto for CareerSegment {
    fn shape() -> Shape {
        Shape::object(
            "Datum",
            vec![
                Field::req("type", Shape::String),
                Field::opt("attributes", SegmentAttributes::shape()),
                Field::opt("metadata", SegmentMetadata::shape()),
                Field::opt("stats", Shape::map(Stat::shape())),
            ],
        )
    }
}

impl CareerSegment {
    /// Numeric stat value, zero when missing or not numeric
    pub fn stat(&self, name: &str) -> f64 {
        self.stats.get(name).map_or(0.0, Stat::number)
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SegmentAttributes {
    #[serde(default)]
    pub hero_id: Option<u64>,
    #[serde(default)]
    pub season: Option<u64>,
    #[serde(default)]
    pub mode: Option<String>,
}

impl Dto for SegmentAttributes {
    fn shape() -> Shape {
        Shape::object(
            "Attributes",
            vec![
                Field::opt("heroId", Shape::nullable(Shape::Integer)),
                Field::opt("season", Shape::nullable(Shape::Integer)),
                Field::opt("mode", Shape::nullable(Shape::String)),
            ],
        )
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SegmentMetadata {
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default)]
    pub image_url: Option<String>,
    #[serde(default)]
    pub role_name: Option<String>,
    #[serde(default)]
    pub color: Option<String>,
}

impl Dto for SegmentMetadata {
    fn shape() -> Shape {
        Shape::object(
            "DatumMetadata",
            vec![
                Field::opt("name", Shape::nullable(Shape::String)),
                Field::opt("imageUrl", Shape::nullable(Shape::String)),
                Field::opt("roleName", Shape::nullable(Shape::String)),
                Field::opt("color", Shape::nullable(Shape::String)),
            ],
        )
    }
}

/// One stat of a segment. The value may be a number, a string or a list.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Stat {
    #[serde(default)]
    pub value: serde_json::Value,
    #[serde(default)]
    pub display_value: Option<String>,
    #[serde(default)]
    pub metadata: StatMetadata,
}

impl Dto for Stat {
    fn shape() -> Shape {
        Shape::object(
            "Stat",
            vec![
                Field::opt("value", Shape::Any),
                Field::opt("displayValue", Shape::nullable(Shape::String)),
                Field::opt("metadata", StatMetadata::shape()),
            ],
        )
    }
}

impl Stat {
    /// Coerce the value to a number the way the tracker UI does: numbers and
    /// numeric strings convert, anything else is zero.
    pub fn number(&self) -> f64 {
        let n = match &self.value {
            serde_json::Value::Number(n) => n.as_f64().unwrap_or(0.0),
            serde_json::Value::String(s) => s.trim().parse().unwrap_or(0.0),
            serde_json::Value::Bool(b) => f64::from(u8::from(*b)),
            _ => 0.0,
        };
        if n.is_finite() { n } else { 0.0 }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StatMetadata {
    #[serde(default)]
    pub tier_name: Option<String>,
    #[serde(default)]
    pub color: Option<String>,
    #[serde(default)]
    pub icon_url: Option<String>,
}

impl Dto for StatMetadata {
    fn shape() -> Shape {
        Shape::object(
            "StatMetadata",
            vec![
                Field::opt("tierName", Shape::nullable(Shape::String)),
                Field::opt("color", Shape::nullable(Shape::String)),
                Field::opt("iconUrl", Shape::nullable(Shape::String)),
            ],
        )
    }
}

/// Hero metadata list
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TrackerHeroes {
    pub data: TrackerHeroItems,
}

impl Dto for TrackerHeroes {
    fn shape() -> Shape {
        Shape::object(
            "Welcome",
            vec![Field::req(
                "data",
                Shape::object(
                    "Data",
                    vec![Field::req("items", Shape::array(TrackerHero::shape()))],
                ),
            )],
        )
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TrackerHeroItems {
    pub items: Vec<TrackerHero>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TrackerHero {
    pub key: String,
    pub name: String,
    #[serde(default)]
    pub description: String,
    pub image_url: String,
    pub role_name: String,
}

impl Dto for TrackerHero {
    fn shape() -> Shape {
        Shape::object(
            "Item",
            vec![
                Field::req("key", Shape::String),
                Field::req("name", Shape::String),
                Field::opt("description", Shape::String),
                Field::req("imageUrl", Shape::String),
                Field::req("roleName", Shape::String),
            ],
        )
    }
}

/// Player name suggestions
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Autocomplete {
    pub data: Vec<AutocompleteUser>,
}

impl Dto for Autocomplete {
    fn shape() -> Shape {
        Shape::object(
            "AutocompleteDTO",
            vec![Field::req("data", Shape::array(AutocompleteUser::shape()))],
        )
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AutocompleteUser {
    pub platform_user_identifier: String,
    pub platform_user_handle: String,
}

impl Dto for AutocompleteUser {
    fn shape() -> Shape {
        Shape::object(
            "AutocompleteUserDTO",
            vec![
                Field::req("platformUserIdentifier", Shape::String),
                Field::req("platformUserHandle", Shape::String),
            ],
        )
    }
}
