//! Per-domain detector registries.
//!
//! Each detector is a pure function of one context and the thresholds. It
//! either abstains (`None`) or returns exactly one insight in the category it
//! is registered under. Detectors never see each other's output; a missing,
//! null or non-finite input always means abstain.

pub mod procedure;
pub mod provider;
pub mod region;
pub mod specialty;

use crate::format;

use super::series::Growth;

/// "{subject} grew 120% from 2019 to 2023 ($1.0M to $2.2M)."
pub(crate) fn trend_sentence(subject: &str, growth: &Growth) -> String {
    format!(
        "{} {} {} from {} to {} ({} to {}).",
        subject,
        growth.direction(),
        format::percent(growth.pct),
        growth.from_year,
        growth.to_year,
        format::currency(growth.from_amount),
        format::currency(growth.to_amount),
    )
}

/// "1 year", "3 years", "2.5 years".
pub(crate) fn years_phrase(years: f64) -> String {
    if (years - 1.0).abs() < f64::EPSILON {
        "1 year".to_string()
    } else if years.fract() == 0.0 {
        format!("{} years", years)
    } else {
        format!("{:.1} years", years)
    }
}

#[cfg(test)]
pub(crate) mod fixtures {
    //! Shared contexts for detector and engine tests.

    use crate::types::*;

    pub fn series(points: &[(i32, f64)]) -> Vec<YearlyPayment> {
        points.iter().map(|(y, a)| YearlyPayment::new(*y, *a)).collect()
    }

    /// Large payments, high markup against a quoted baseline, on the risk list.
    pub fn scenario_a_provider() -> ProviderContext {
        ProviderContext {
            total_payments: Some(50_000_000.0),
            peer_percentile: Some(99.0),
            avg_markup_ratio: Some(12.0),
            specialty_markup_median: Some(3.0),
            risk_entry: Some(RiskListEntry {
                risk_score: Some(91.0),
            }),
            ..Default::default()
        }
    }

    /// An individual billing an impossible number of services in one year.
    pub fn scenario_b_provider() -> ProviderContext {
        ProviderContext {
            total_services: Some(2_465_495.0),
            years_active: Some(1.0),
            entity_kind: Some(EntityKind::Individual),
            ..Default::default()
        }
    }

    pub fn scenario_c_region() -> RegionContext {
        RegionContext {
            yearly_payments: series(&[(2019, 100.0), (2020, 78.0)]),
            ..Default::default()
        }
    }

    /// Top region holds `top_region_payments` of 100; four other regions
    /// split the rest evenly, so none of them outranks the top one.
    pub fn scenario_e_procedure(top_region_payments: f64) -> ProcedureContext {
        let rest = (100.0 - top_region_payments) / 4.0;
        let mut region_breakdown = vec![RegionSpend {
            region: "FL".into(),
            payments: Some(top_region_payments),
        }];
        for region in ["CA", "TX", "NY", "OH"] {
            region_breakdown.push(RegionSpend {
                region: region.into(),
                payments: Some(rest),
            });
        }
        ProcedureContext {
            code: "99213".into(),
            region_breakdown,
            ..Default::default()
        }
    }

    /// A provider on which every provider detector fires.
    pub fn loud_provider() -> ProviderContext {
        ProviderContext {
            name: Some("Dr. Loud".into()),
            total_payments: Some(8_000_000.0),
            total_services: Some(100_000.0),
            years_active: Some(2.0),
            entity_kind: Some(EntityKind::Individual),
            specialty: Some("Cardiology".into()),
            avg_markup_ratio: Some(9.0),
            specialty_markup_median: Some(2.5),
            top_procedures: vec![ProcedureShare {
                code: "93000".into(),
                description: Some("Electrocardiogram".into()),
                payment_share: Some(82.0),
            }],
            peer_percentile: Some(99.6),
            peer_median_payment: Some(400_000.0),
            risk_entry: Some(RiskListEntry {
                risk_score: Some(77.0),
            }),
            yearly_payments: series(&[(2019, 1_000_000.0), (2023, 3_000_000.0)]),
            ..Default::default()
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::insights::series::growth;

    #[test]
    fn test_trend_sentence_decline() {
        let g = growth(vec![(Some(2019), Some(100.0)), (Some(2020), Some(78.0))]).unwrap();
        assert_eq!(
            trend_sentence("Medicare payments in FL", &g),
            "Medicare payments in FL declined 22% from 2019 to 2020 ($100 to $78)."
        );
    }

    #[test]
    fn test_years_phrase() {
        assert_eq!(years_phrase(1.0), "1 year");
        assert_eq!(years_phrase(3.0), "3 years");
        assert_eq!(years_phrase(2.5), "2.5 years");
    }
}
