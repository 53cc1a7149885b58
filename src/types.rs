use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::error::EngineError;

// ---------------------------------------------------------------------------
// Domain tag
// ---------------------------------------------------------------------------

/// The four kinds of entity an insight can describe.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Domain {
    Provider,
    #[serde(alias = "state")]
    Region,
    Specialty,
    Procedure,
}

impl Domain {
    pub fn as_str(&self) -> &'static str {
        match self {
            Domain::Provider => "provider",
            Domain::Region => "region",
            Domain::Specialty => "specialty",
            Domain::Procedure => "procedure",
        }
    }
}

impl fmt::Display for Domain {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Domain {
    type Err = EngineError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "provider" => Ok(Domain::Provider),
            "region" | "state" => Ok(Domain::Region),
            "specialty" => Ok(Domain::Specialty),
            "procedure" | "hcpcs" => Ok(Domain::Procedure),
            other => Err(EngineError::InvalidDomain(other.to_string())),
        }
    }
}

// ---------------------------------------------------------------------------
// Entity context
// ---------------------------------------------------------------------------

/// A validated aggregate record for one entity, as handed over by the
/// fetch layer. Internally tagged by `"domain"` in JSON.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "domain", rename_all = "lowercase")]
pub enum EntityContext {
    Provider(ProviderContext),
    #[serde(alias = "state")]
    Region(RegionContext),
    Specialty(SpecialtyContext),
    Procedure(ProcedureContext),
}

impl EntityContext {
    pub fn domain(&self) -> Domain {
        match self {
            EntityContext::Provider(_) => Domain::Provider,
            EntityContext::Region(_) => Domain::Region,
            EntityContext::Specialty(_) => Domain::Specialty,
            EntityContext::Procedure(_) => Domain::Procedure,
        }
    }

    /// Parse a context from a JSON document produced by the aggregation layer.
    pub fn from_json_str(json: &str) -> Result<Self, serde_json::Error> {
        serde_json::from_str(json)
    }
}

/// One point of a yearly payment series.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct YearlyPayment {
    pub year: Option<i32>,
    #[serde(deserialize_with = "lenient::opt_f64")]
    pub amount: Option<f64>,
}

impl YearlyPayment {
    pub fn new(year: i32, amount: f64) -> Self {
        Self {
            year: Some(year),
            amount: Some(amount),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum EntityKind {
    #[serde(alias = "I", alias = "individual_provider")]
    Individual,
    #[serde(alias = "O")]
    Organization,
}

/// A procedure code's share of one provider's payments.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct ProcedureShare {
    pub code: String,
    pub description: Option<String>,
    /// Percent (0–100) of the provider's total payments.
    #[serde(deserialize_with = "lenient::opt_f64")]
    pub payment_share: Option<f64>,
}

/// Presence on the externally scored risk list.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct RiskListEntry {
    /// 0–100.
    #[serde(deserialize_with = "lenient::opt_f64")]
    pub risk_score: Option<f64>,
}

#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct ProviderContext {
    pub npi: Option<String>,
    pub name: Option<String>,
    #[serde(deserialize_with = "lenient::opt_f64")]
    pub total_payments: Option<f64>,
    #[serde(deserialize_with = "lenient::opt_f64")]
    pub total_services: Option<f64>,
    #[serde(deserialize_with = "lenient::opt_f64")]
    pub years_active: Option<f64>,
    pub entity_kind: Option<EntityKind>,
    pub specialty: Option<String>,
    #[serde(deserialize_with = "lenient::opt_f64")]
    pub avg_markup_ratio: Option<f64>,
    /// Median markup ratio of the provider's specialty peers.
    #[serde(deserialize_with = "lenient::opt_f64")]
    pub specialty_markup_median: Option<f64>,
    pub top_procedures: Vec<ProcedureShare>,
    /// 0–100.
    #[serde(deserialize_with = "lenient::opt_f64")]
    pub peer_percentile: Option<f64>,
    #[serde(deserialize_with = "lenient::opt_f64")]
    pub peer_median_payment: Option<f64>,
    pub risk_entry: Option<RiskListEntry>,
    pub yearly_payments: Vec<YearlyPayment>,
}

impl ProviderContext {
    /// Display label used to open sentences.
    pub fn label(&self) -> String {
        non_blank(self.name.as_deref())
            .map(str::to_string)
            .unwrap_or_else(|| "This provider".to_string())
    }
}

#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct SpecialtySpend {
    pub specialty: String,
    #[serde(deserialize_with = "lenient::opt_f64")]
    pub payments: Option<f64>,
    #[serde(deserialize_with = "lenient::opt_f64")]
    pub provider_count: Option<f64>,
}

#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct RegionContext {
    pub code: Option<String>,
    pub name: Option<String>,
    pub yearly_payments: Vec<YearlyPayment>,
    pub specialty_breakdown: Vec<SpecialtySpend>,
    /// Provider count in the latest year.
    #[serde(deserialize_with = "lenient::opt_f64")]
    pub provider_count: Option<f64>,
}

impl RegionContext {
    pub fn label(&self) -> String {
        non_blank(self.name.as_deref())
            .or_else(|| non_blank(self.code.as_deref()))
            .map(str::to_string)
            .unwrap_or_else(|| "this region".to_string())
    }
}

#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct SpecialtySummary {
    #[serde(deserialize_with = "lenient::opt_f64")]
    pub total_payments: Option<f64>,
    #[serde(deserialize_with = "lenient::opt_f64")]
    pub total_providers: Option<f64>,
    #[serde(deserialize_with = "lenient::opt_f64")]
    pub markup_ratio: Option<f64>,
}

#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct SpecialtyContext {
    pub name: String,
    pub yearly_payments: Vec<YearlyPayment>,
    pub summary: Option<SpecialtySummary>,
    /// System-wide average markup ratio across all specialties.
    #[serde(deserialize_with = "lenient::opt_f64")]
    pub system_markup_ratio: Option<f64>,
}

impl SpecialtyContext {
    pub fn label(&self) -> String {
        non_blank(Some(&self.name))
            .map(str::to_string)
            .unwrap_or_else(|| "this specialty".to_string())
    }
}

/// One year of a procedure code's national totals.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct ProcedureYear {
    pub year: Option<i32>,
    #[serde(deserialize_with = "lenient::opt_f64")]
    pub payments: Option<f64>,
    #[serde(deserialize_with = "lenient::opt_f64")]
    pub services: Option<f64>,
    #[serde(deserialize_with = "lenient::opt_f64")]
    pub providers: Option<f64>,
}

#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct ProcedureProvider {
    pub npi: Option<String>,
    pub name: Option<String>,
    #[serde(deserialize_with = "lenient::opt_f64")]
    pub services: Option<f64>,
    #[serde(deserialize_with = "lenient::opt_f64")]
    pub avg_payment_per_service: Option<f64>,
}

#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct RegionSpend {
    pub region: String,
    #[serde(deserialize_with = "lenient::opt_f64")]
    pub payments: Option<f64>,
}

#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct ProcedureContext {
    pub code: String,
    pub description: Option<String>,
    pub yearly: Vec<ProcedureYear>,
    pub top_providers: Vec<ProcedureProvider>,
    pub region_breakdown: Vec<RegionSpend>,
}

impl ProcedureContext {
    /// `"99213 (Office visit, established patient)"`, or the bare code.
    pub fn label(&self) -> String {
        let code = non_blank(Some(&self.code)).unwrap_or("this code");
        match non_blank(self.description.as_deref()) {
            Some(desc) => format!("{} ({})", code, desc),
            None => code.to_string(),
        }
    }
}

// ---------------------------------------------------------------------------
// Availability helpers
// ---------------------------------------------------------------------------

/// A numeric field that is present and finite. Everything else is "not
/// available" and must make a detector abstain.
pub fn available(value: Option<f64>) -> Option<f64> {
    value.filter(|v| v.is_finite())
}

/// A numeric field that is present, finite and strictly positive.
pub fn positive(value: Option<f64>) -> Option<f64> {
    available(value).filter(|v| *v > 0.0)
}

pub(crate) fn non_blank(s: Option<&str>) -> Option<&str> {
    s.map(str::trim).filter(|s| !s.is_empty())
}

/// Decoders for loosely typed numeric fields coming from JSON documents.
mod lenient {
    use serde::{Deserialize, Deserializer};
    use serde_json::Value;

    /// Numbers pass through, plain numeric strings are parsed, everything
    /// else (null, booleans, objects, junk strings, NaN) is `None`.
    pub fn opt_f64<'de, D>(deserializer: D) -> Result<Option<f64>, D::Error>
    where
        D: Deserializer<'de>,
    {
        let value = Option::<Value>::deserialize(deserializer)?;
        let parsed = match value {
            Some(Value::Number(n)) => n.as_f64(),
            Some(Value::String(s)) => s.trim().parse::<f64>().ok(),
            _ => None,
        };
        Ok(parsed.filter(|v| v.is_finite()))
    }
}
