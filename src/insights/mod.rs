//! Insight generation engine.
//!
//! Each domain owns a fixed list of pure detectors. Every detector inspects
//! one entity context and either abstains or emits a candidate `Insight`.
//! The selector orders candidates by the domain's category sequence, drops
//! duplicates, truncates, and falls back to a "within normal ranges" insight
//! when nothing fired.

pub mod detectors;
pub mod engine;
pub mod known_risk;
pub mod selector;
pub mod series;

use std::fmt;

use serde::Serialize;

/// Closed classification of insight types. Doubles as the dedup key.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "kebab-case")]
pub enum Category {
    Magnitude,
    Deviation,
    Volume,
    Trend,
    Concentration,
    RiskList,
    Fallback,
}

impl Category {
    pub fn as_str(&self) -> &'static str {
        match self {
            Category::Magnitude => "magnitude",
            Category::Deviation => "deviation",
            Category::Volume => "volume",
            Category::Trend => "trend",
            Category::Concentration => "concentration",
            Category::RiskList => "risk-list",
            Category::Fallback => "fallback",
        }
    }
}

impl fmt::Display for Category {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// One unit of generated narrative.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Insight {
    pub category: Category,
    /// Name of the detector that produced the sentence. Renderers that want
    /// their own wording can key templates off it.
    pub detector: &'static str,
    pub text: String,
    /// Only breaks ties between insights of the same category.
    pub weight: f64,
}

impl Insight {
    pub fn new(category: Category, detector: &'static str, text: String, weight: f64) -> Self {
        Self {
            category,
            detector,
            text,
            weight,
        }
    }
}

impl fmt::Display for Insight {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.text)
    }
}
