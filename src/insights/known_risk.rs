//! Static lookups for billing categories named in federal oversight findings.
//!
//! This is a lookup, not a statistical computation: a match only says the
//! category as a whole has drawn scrutiny.

use std::sync::OnceLock;

use regex::Regex;

/// Why a procedure code is on the known-risk list.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ProcedureRisk {
    WoundCare,
    CovidTest,
}

impl ProcedureRisk {
    pub fn description(&self) -> &'static str {
        match self {
            ProcedureRisk::WoundCare => {
                "skin substitute (wound care) products, a category federal auditors have flagged for explosive spending growth"
            }
            ProcedureRisk::CovidTest => {
                "COVID-19 testing, a category with documented pandemic-era billing abuse"
            }
        }
    }
}

/// COVID-19 laboratory test codes singled out in oversight reports.
const COVID_TEST_CODES: &[&str] = &[
    "U0001", "U0002", "U0003", "U0004", "U0005", "87635", "0240U", "0241U", "86328", "86769",
];

/// Specialties named in oversight findings, lowercase.
const OVERSIGHT_SPECIALTIES: &[&str] = &[
    "clinical laboratory",
    "durable medical equipment",
    "home health",
    "ambulance",
    "hospice",
    "independent diagnostic testing facility",
];

// Skin substitute HCPCS codes Q4100–Q4299.
fn wound_care_re() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"^Q4[12]\d{2}$").unwrap())
}

/// Classify a procedure code. Matching is case-insensitive and ignores
/// surrounding whitespace.
pub fn procedure_risk(code: &str) -> Option<ProcedureRisk> {
    let code = code.trim().to_uppercase();
    if code.is_empty() {
        return None;
    }
    if wound_care_re().is_match(&code) {
        return Some(ProcedureRisk::WoundCare);
    }
    if COVID_TEST_CODES.contains(&code.as_str()) {
        return Some(ProcedureRisk::CovidTest);
    }
    None
}

/// True when the specialty name contains one of the oversight-listed
/// sectors, e.g. "Clinical Laboratory" or "Ambulance Service Provider".
pub fn is_oversight_specialty(name: &str) -> bool {
    let name = name.trim().to_lowercase();
    !name.is_empty() && OVERSIGHT_SPECIALTIES.iter().any(|s| name.contains(s))
}
