//! Detector thresholds.
//!
//! Every number a detector compares against lives here so thresholds can be
//! tuned (or loaded from a JSON file at process start) without touching
//! detector code. Missing keys in a config file keep their defaults.

use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::error::EngineError;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct DetectorConfig {
    /// Provider markup ratio above which the deviation detector fires. Also
    /// the specialty threshold when no system-wide baseline is available.
    pub markup_ratio_threshold: f64,
    /// Specialty markup must exceed the system average by this multiple.
    pub specialty_markup_multiple: f64,
    /// Top provider's per-service payment vs. the code-wide average.
    pub procedure_price_multiple: f64,
    /// Services per working day above which an individual is flagged.
    pub services_per_day_threshold: f64,
    /// Assumed annual working days, a policy constant rather than a measurement.
    pub working_days_per_year: f64,
    pub provider_growth_pct: f64,
    pub region_growth_pct: f64,
    pub specialty_growth_pct: f64,
    pub procedure_growth_pct: f64,
    /// Share (percent) of a provider's payments from its top procedure code.
    pub procedure_concentration_pct: f64,
    /// Share (percent) of a procedure's payments from its top region.
    pub region_share_concentration_pct: f64,
    /// Share (percent) of a region's payments from its top specialty.
    pub specialty_share_concentration_pct: f64,
}

impl Default for DetectorConfig {
    fn default() -> Self {
        Self {
            markup_ratio_threshold: 5.0,
            specialty_markup_multiple: 1.5,
            procedure_price_multiple: 3.0,
            services_per_day_threshold: 50.0,
            working_days_per_year: 250.0,
            provider_growth_pct: 50.0,
            region_growth_pct: 20.0,
            specialty_growth_pct: 20.0,
            procedure_growth_pct: 50.0,
            procedure_concentration_pct: 60.0,
            region_share_concentration_pct: 25.0,
            specialty_share_concentration_pct: 25.0,
        }
    }
}

impl DetectorConfig {
    /// Parse and validate a config from JSON. Absent keys keep their defaults.
    pub fn from_json_str(json: &str) -> Result<Self, EngineError> {
        let config: DetectorConfig = serde_json::from_str(json)?;
        config.validate()?;
        Ok(config)
    }

    /// Load a config file from disk.
    pub fn load(path: &Path) -> Result<Self, EngineError> {
        let content = std::fs::read_to_string(path)?;
        let config = Self::from_json_str(&content)?;
        log::info!("Loaded detector config from {}", path.display());
        Ok(config)
    }

    /// Every threshold must be finite and strictly positive.
    pub fn validate(&self) -> Result<(), EngineError> {
        for (name, value) in self.thresholds() {
            if !value.is_finite() || value <= 0.0 {
                return Err(EngineError::Config(format!(
                    "{} must be a positive number, got {}",
                    name, value
                )));
            }
        }
        Ok(())
    }

    fn thresholds(&self) -> [(&'static str, f64); 12] {
        [
            ("markupRatioThreshold", self.markup_ratio_threshold),
            ("specialtyMarkupMultiple", self.specialty_markup_multiple),
            ("procedurePriceMultiple", self.procedure_price_multiple),
            ("servicesPerDayThreshold", self.services_per_day_threshold),
            ("workingDaysPerYear", self.working_days_per_year),
            ("providerGrowthPct", self.provider_growth_pct),
            ("regionGrowthPct", self.region_growth_pct),
            ("specialtyGrowthPct", self.specialty_growth_pct),
            ("procedureGrowthPct", self.procedure_growth_pct),
            ("procedureConcentrationPct", self.procedure_concentration_pct),
            ("regionShareConcentrationPct", self.region_share_concentration_pct),
            (
                "specialtyShareConcentrationPct",
                self.specialty_share_concentration_pct,
            ),
        ]
    }
}
