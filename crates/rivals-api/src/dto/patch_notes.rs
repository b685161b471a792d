//! Patch notes

use serde::{Deserialize, Serialize};

use crate::validation::{Dto, Field, Shape};

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PatchNotes {
    #[serde(default)]
    pub total_patches: Option<u64>,
    pub formatted_patches: Vec<FormattedPatch>,
}

impl Dto for PatchNotes {
    fn shape() -> Shape {
        Shape::object(
            "PatchNotesDTO",
            vec![
                Field::opt("total_patches", Shape::Integer),
                Field::req("formatted_patches", Shape::array(FormattedPatch::shape())),
            ],
        )
    }
}

impl PatchNotes {
    /// Most recent patch, as listed first upstream
    pub fn latest(&self) -> Option<&FormattedPatch> {
        self.formatted_patches.first()
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FormattedPatch {
    pub id: String,
    pub title: String,
    pub date: String,
    pub overview: String,
    /// Relative to the image CDN, see [`Api::build_image`](crate::Api::build_image)
    #[serde(rename = "imagePath")]
    pub image_path: String,
    #[serde(rename = "fullContent", default, skip_serializing_if = "Option::is_none")]
    pub full_content: Option<String>,
}

impl Dto for FormattedPatch {
    fn shape() -> Shape {
        Shape::object(
            "FormattedPatch",
            vec![
                Field::req("id", Shape::String),
                Field::req("title", Shape::String),
                Field::req("date", Shape::String),
                Field::req("overview", Shape::String),
                Field::req("imagePath", Shape::String),
                Field::opt("fullContent", Shape::String),
            ],
        )
    }
}
