//! Region (state) detectors.

use crate::config::DetectorConfig;
use crate::format;
use crate::insights::engine::{DetectorEntry, DomainRegistry};
use crate::insights::series::{growth, latest_positive, leading_share};
use crate::insights::{Category, Insight};
use crate::types::{non_blank, positive, Domain, RegionContext};

use super::trend_sentence;

pub const SEQUENCE: &[Category] = &[Category::Magnitude, Category::Trend, Category::Concentration];

pub const DETECTORS: &[DetectorEntry<RegionContext>] = &[
    DetectorEntry {
        name: "detect_region_magnitude",
        category: Category::Magnitude,
        detect: detect_region_magnitude,
    },
    DetectorEntry {
        name: "detect_region_trend",
        category: Category::Trend,
        detect: detect_region_trend,
    },
    DetectorEntry {
        name: "detect_region_specialty_concentration",
        category: Category::Concentration,
        detect: detect_region_specialty_concentration,
    },
];

pub static REGISTRY: DomainRegistry<RegionContext> = DomainRegistry {
    domain: Domain::Region,
    sequence: SEQUENCE,
    detectors: DETECTORS,
    fallback: region_fallback,
};

/// Latest-year payments, with the per-provider average when the provider
/// count is known.
pub fn detect_region_magnitude(ctx: &RegionContext, _config: &DetectorConfig) -> Option<Insight> {
    let (year, total) = latest_positive(ctx.yearly_payments.iter().map(|p| (p.year, p.amount)))?;

    let mut text = format!(
        "In {}, Medicare paid {} in {}",
        year,
        format::currency(total),
        ctx.label()
    );
    if let Some(count) = positive(ctx.provider_count) {
        text.push_str(&format!(
            ", across {} providers (an average of {} each)",
            format::number(count),
            format::currency(total / count)
        ));
    }
    text.push('.');

    Some(Insight::new(Category::Magnitude, "detect_region_magnitude", text, 0.50))
}

pub fn detect_region_trend(ctx: &RegionContext, config: &DetectorConfig) -> Option<Insight> {
    let g = growth(ctx.yearly_payments.iter().map(|p| (p.year, p.amount)))?;
    if g.pct.abs() <= config.region_growth_pct {
        return None;
    }

    let subject = format!("Medicare payments in {}", ctx.label());
    Some(Insight::new(
        Category::Trend,
        "detect_region_trend",
        trend_sentence(&subject, &g),
        0.70,
    ))
}

/// One specialty takes an outsized share of the region's latest-year payments.
pub fn detect_region_specialty_concentration(
    ctx: &RegionContext,
    config: &DetectorConfig,
) -> Option<Insight> {
    let regional = latest_positive(ctx.yearly_payments.iter().map(|p| (p.year, p.amount)))
        .map(|(_, total)| total);
    let share = leading_share(ctx.specialty_breakdown.iter().map(|s| s.payments), regional)?;
    if share.pct <= config.specialty_share_concentration_pct {
        return None;
    }

    let top = &ctx.specialty_breakdown[share.index];
    let specialty = non_blank(Some(&top.specialty))?;

    let mut text = format!(
        "{} accounts for {} of Medicare payments in {} ({})",
        specialty,
        format::percent(share.pct),
        ctx.label(),
        format::currency(share.amount)
    );
    if let Some(count) = positive(top.provider_count) {
        text.push_str(&format!(" from {} providers", format::number(count)));
    }
    text.push('.');

    Some(Insight::new(
        Category::Concentration,
        "detect_region_specialty_concentration",
        text,
        0.60,
    ))
}

pub fn region_fallback(ctx: &RegionContext) -> Insight {
    Insight::new(
        Category::Fallback,
        "region_fallback",
        format!(
            "Medicare spending in {} falls within expected ranges for comparable regions.",
            ctx.label()
        ),
        0.0,
    )
}
