use once_cell::sync::Lazy;
use regex::Regex;
use serde::{Deserialize, Serialize};
use utoipa::{IntoParams, ToSchema};
use validator::Validate;

use crate::calculate::{BoundingBox, GeometryMetrics, round2};

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize, Serialize, ToSchema)]
#[serde(rename_all = "lowercase")]
pub enum Unit {
    #[default]
    Mm,
    Cm,
    M,
}

impl Unit {
    /// Converts a volume in cubic millimeters into this unit, cubed.
    pub fn volume_from_mm3(&self, volume_mm3: f64) -> f64 {
        match self {
            Self::Mm => volume_mm3,
            Self::Cm => volume_mm3 / 1_000.0,
            Self::M => volume_mm3 / 1_000_000_000.0,
        }
    }
}

#[derive(Debug, Deserialize, Serialize, Validate, IntoParams)]
#[into_params(parameter_in = Query)]
pub struct AnalyzeQuery {
    /// Name of the uploaded model, used to check the format.
    #[validate(
        length(min = 1, max = 255, message = "file_name must be 1 to 255 characters long"),
        regex(
            path = "*FILENAME_REGEX",
            message = "file_name must be alphanumeric characters with hyphens, periods, or underscores only"
        )
    )]
    pub file_name: String,

    /// Unit of the reported volume, defaults to mm.
    #[serde(default)]
    pub unit: Unit,
}

// file_name: only alphanumeric, hyphens, periods and underscores
static FILENAME_REGEX: Lazy<Regex> = Lazy::new(|| Regex::new(r"^[A-Za-z0-9_.-]+$").unwrap());

#[derive(Debug, Serialize, ToSchema)]
pub struct AnalyzeRes {
    #[schema(example = 12)]
    pub triangle_count: u64,

    pub bounding_box_mm: BoundingBox,

    // volume in the requested unit
    #[schema(example = 1.0)]
    pub volume: f64,

    pub unit: Unit,

    #[schema(example = 1000.0)]
    pub volume_mm3: f64,

    #[schema(example = 600.0)]
    pub surface_area_mm2: f64,
}

impl AnalyzeRes {
    pub fn new(metrics: &GeometryMetrics, unit: Unit) -> Self {
        Self {
            triangle_count: metrics.triangle_count,
            bounding_box_mm: metrics.bounding_box,
            volume: round2(unit.volume_from_mm3(metrics.volume_mm3)),
            unit,
            volume_mm3: round2(metrics.volume_mm3),
            surface_area_mm2: round2(metrics.surface_area_mm2),
        }
    }
}
