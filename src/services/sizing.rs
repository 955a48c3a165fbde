//! Garment size recommendation from height, weight and fit preference.

use std::fmt;

use serde::{Deserialize, Serialize};
use thiserror::Error;
use utoipa::ToSchema;

pub const HEIGHT_RANGE_CM: (f64, f64) = (100.0, 250.0);
pub const WEIGHT_RANGE_KG: (f64, f64) = (30.0, 200.0);

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize, ToSchema)]
pub enum Size {
    XS,
    S,
    M,
    L,
    XL,
    XXL,
}

impl Size {
    /// Smallest to largest.
    pub const SCALE: [Size; 6] = [Size::XS, Size::S, Size::M, Size::L, Size::XL, Size::XXL];

    pub fn as_str(&self) -> &'static str {
        match self {
            Size::XS => "XS",
            Size::S => "S",
            Size::M => "M",
            Size::L => "L",
            Size::XL => "XL",
            Size::XXL => "XXL",
        }
    }

    fn index(self) -> usize {
        self as usize
    }

    /// One step down, staying at XS.
    pub fn smaller(self) -> Size {
        Self::SCALE[self.index().saturating_sub(1)]
    }

    /// One step up, staying at XXL.
    pub fn larger(self) -> Size {
        Self::SCALE[(self.index() + 1).min(Self::SCALE.len() - 1)]
    }
}

impl fmt::Display for Size {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "snake_case")]
pub enum FitPreference {
    Fitted,
    #[default]
    Regular,
    Oversized,
}

#[derive(Debug, Error, PartialEq)]
pub enum SizingError {
    #[error("height and weight must be numeric values")]
    NotNumeric,

    #[error("height must be between 100 and 250 cm")]
    HeightOutOfRange,

    #[error("weight must be between 30 and 200 kg")]
    WeightOutOfRange,
}

#[derive(Debug, Clone, PartialEq, Serialize, ToSchema)]
pub struct SizeRecommendation {
    pub size: Size,
    /// Whether the product offers the recommended size.
    pub available: bool,
}

pub fn recommend_size(height_cm: f64, weight_kg: f64, fit: FitPreference) -> Result<Size, SizingError> {
    if !height_cm.is_finite() || !weight_kg.is_finite() {
        return Err(SizingError::NotNumeric);
    }
    if height_cm < HEIGHT_RANGE_CM.0 || height_cm > HEIGHT_RANGE_CM.1 {
        return Err(SizingError::HeightOutOfRange);
    }
    if weight_kg < WEIGHT_RANGE_KG.0 || weight_kg > WEIGHT_RANGE_KG.1 {
        return Err(SizingError::WeightOutOfRange);
    }

    let base = base_size(height_cm, weight_kg);
    Ok(match fit {
        FitPreference::Fitted => base.smaller(),
        FitPreference::Regular => base,
        FitPreference::Oversized => base.larger(),
    })
}

/// Recommend a size and report whether `offered_sizes` contains it.
pub fn recommend_for_sizes(
    height_cm: f64,
    weight_kg: f64,
    fit: FitPreference,
    offered_sizes: &[String],
) -> Result<SizeRecommendation, SizingError> {
    let size = recommend_size(height_cm, weight_kg, fit)?;
    let available = offered_sizes.iter().any(|offered| offered == size.as_str());
    Ok(SizeRecommendation { size, available })
}

fn base_size(height: f64, weight: f64) -> Size {
    if weight < 55.0 {
        Size::XS
    } else if weight < 65.0 {
        if height < 165.0 {
            Size::XS
        } else if height < 175.0 {
            Size::S
        } else {
            Size::M
        }
    } else if weight < 75.0 {
        if height < 165.0 {
            Size::S
        } else if height < 185.0 {
            Size::M
        } else {
            Size::L
        }
    } else if weight < 85.0 {
        if height < 170.0 { Size::M } else { Size::L }
    } else if weight < 95.0 {
        if height < 175.0 { Size::L } else { Size::XL }
    } else if height < 180.0 {
        Size::XL
    } else {
        Size::XXL
    }
}
