//! The fixed consumer-insight taxonomy
//!
//! Every label the system can surface is one of the sixteen variants below.
//! Declaration order is the canonical taxonomy order: it drives label-set
//! iteration, output joining, and the column order of the binary indicator
//! matrix used during validation.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// A single consumer-insight label
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum TaxonomyLabel {
    #[serde(rename = "Accessibility")]
    Accessibility,
    #[serde(rename = "Fragrance")]
    Fragrance,
    #[serde(rename = "Brand Value")]
    BrandValue,
    #[serde(rename = "Feel / Finish")]
    FeelFinish,
    #[serde(rename = "Price")]
    Price,
    #[serde(rename = "Product Safety")]
    ProductSafety,
    #[serde(rename = "Packaging")]
    Packaging,
    #[serde(rename = "Cleansing")]
    Cleansing,
    #[serde(rename = "Efficacy")]
    Efficacy,
    #[serde(rename = "Product Texture")]
    ProductTexture,
    #[serde(rename = "Skin Care")]
    SkinCare,
    #[serde(rename = "Companion Approval")]
    CompanionApproval,
    #[serde(rename = "Convenience")]
    Convenience,
    #[serde(rename = "Brand Accountability")]
    BrandAccountability,
    #[serde(rename = "Skin Texture Improvement")]
    SkinTextureImprovement,
    #[serde(rename = "Brand For Me")]
    BrandForMe,
}

impl TaxonomyLabel {
    /// All labels, in taxonomy order
    pub const ALL: [TaxonomyLabel; 16] = [
        Self::Accessibility,
        Self::Fragrance,
        Self::BrandValue,
        Self::FeelFinish,
        Self::Price,
        Self::ProductSafety,
        Self::Packaging,
        Self::Cleansing,
        Self::Efficacy,
        Self::ProductTexture,
        Self::SkinCare,
        Self::CompanionApproval,
        Self::Convenience,
        Self::BrandAccountability,
        Self::SkinTextureImprovement,
        Self::BrandForMe,
    ];

    /// Number of labels in the taxonomy
    pub const COUNT: usize = Self::ALL.len();

    /// The label's canonical identifier
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Accessibility => "Accessibility",
            Self::Fragrance => "Fragrance",
            Self::BrandValue => "Brand Value",
            Self::FeelFinish => "Feel / Finish",
            Self::Price => "Price",
            Self::ProductSafety => "Product Safety",
            Self::Packaging => "Packaging",
            Self::Cleansing => "Cleansing",
            Self::Efficacy => "Efficacy",
            Self::ProductTexture => "Product Texture",
            Self::SkinCare => "Skin Care",
            Self::CompanionApproval => "Companion Approval",
            Self::Convenience => "Convenience",
            Self::BrandAccountability => "Brand Accountability",
            Self::SkinTextureImprovement => "Skin Texture Improvement",
            Self::BrandForMe => "Brand For Me",
        }
    }

    /// Column index of this label in the indicator matrix
    pub fn index(&self) -> usize {
        *self as usize
    }

    /// Exact lookup of a model-produced string; anything else is out of vocabulary
    pub fn parse(s: &str) -> Option<Self> {
        Self::ALL.iter().copied().find(|label| label.as_str() == s)
    }

    /// All identifiers in taxonomy order, for embedding in prompts
    pub fn names() -> Vec<&'static str> {
        Self::ALL.iter().map(|l| l.as_str()).collect()
    }
}

impl fmt::Display for TaxonomyLabel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for TaxonomyLabel {
    type Err = crate::Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse(s)
            .ok_or_else(|| crate::Error::label_parse(format!("'{s}' is not a taxonomy label")))
    }
}
