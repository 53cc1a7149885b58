//! Procedure (HCPCS code) detectors.

use crate::config::DetectorConfig;
use crate::format;
use crate::insights::engine::{DetectorEntry, DomainRegistry};
use crate::insights::known_risk;
use crate::insights::series::{growth, leading_share};
use crate::insights::{Category, Insight};
use crate::types::{non_blank, positive, Domain, ProcedureContext, ProcedureProvider, ProcedureYear};

use super::trend_sentence;

pub const SEQUENCE: &[Category] = &[
    Category::Magnitude,
    Category::Deviation,
    Category::Trend,
    Category::Concentration,
    Category::RiskList,
];

pub const DETECTORS: &[DetectorEntry<ProcedureContext>] = &[
    DetectorEntry {
        name: "detect_procedure_magnitude",
        category: Category::Magnitude,
        detect: detect_procedure_magnitude,
    },
    DetectorEntry {
        name: "detect_procedure_price_outlier",
        category: Category::Deviation,
        detect: detect_procedure_price_outlier,
    },
    DetectorEntry {
        name: "detect_procedure_trend",
        category: Category::Trend,
        detect: detect_procedure_trend,
    },
    DetectorEntry {
        name: "detect_procedure_region_concentration",
        category: Category::Concentration,
        detect: detect_procedure_region_concentration,
    },
    DetectorEntry {
        name: "detect_procedure_known_risk",
        category: Category::RiskList,
        detect: detect_procedure_known_risk,
    },
];

pub static REGISTRY: DomainRegistry<ProcedureContext> = DomainRegistry {
    domain: Domain::Procedure,
    sequence: SEQUENCE,
    detectors: DETECTORS,
    fallback: procedure_fallback,
};

/// Latest year with positive payments.
fn latest_year(ctx: &ProcedureContext) -> Option<(i32, &ProcedureYear)> {
    ctx.yearly
        .iter()
        .filter(|y| positive(y.payments).is_some())
        .filter_map(|y| Some((y.year?, y)))
        .max_by_key(|(year, _)| *year)
}

fn display_code(ctx: &ProcedureContext) -> &str {
    non_blank(Some(&ctx.code)).unwrap_or("this code")
}

/// Latest-year payments with service and provider counts when known.
pub fn detect_procedure_magnitude(ctx: &ProcedureContext, _config: &DetectorConfig) -> Option<Insight> {
    let (year, latest) = latest_year(ctx)?;
    let payments = positive(latest.payments)?;

    let mut text = format!(
        "In {}, Medicare paid {} for {}",
        year,
        format::currency(payments),
        ctx.label()
    );
    let services = positive(latest.services);
    if let Some(services) = services {
        text.push_str(&format!(" across {} services", format::number(services)));
    }
    if let Some(providers) = positive(latest.providers) {
        text.push_str(&format!(" from {} providers", format::number(providers)));
    }
    if let Some(services) = services {
        text.push_str(&format!(
            " (an average of {} per service)",
            format::currency_precise(payments / services)
        ));
    }
    text.push('.');

    Some(Insight::new(Category::Magnitude, "detect_procedure_magnitude", text, 0.50))
}

/// Highest per-service average among top billers vs. the code-wide average.
/// Without a code-wide baseline there is nothing to compare against.
pub fn detect_procedure_price_outlier(ctx: &ProcedureContext, config: &DetectorConfig) -> Option<Insight> {
    let (_, latest) = latest_year(ctx)?;
    let baseline = positive(latest.payments)? / positive(latest.services)?;

    let mut top: Option<(&ProcedureProvider, f64)> = None;
    for p in ctx.top_providers.iter().filter(|p| positive(p.services).is_some()) {
        if let Some(price) = positive(p.avg_payment_per_service) {
            if top.map_or(true, |(_, best)| price > best) {
                top = Some((p, price));
            }
        }
    }
    let (top, price) = top?;

    let multiple = price / baseline;
    if multiple <= config.procedure_price_multiple {
        return None;
    }

    let who = non_blank(top.name.as_deref())
        .or_else(|| non_blank(top.npi.as_deref()))
        .unwrap_or("The top-billing provider");
    let text = format!(
        "{} averages {} per service for {}, {} the national average of {}.",
        who,
        format::currency_precise(price),
        display_code(ctx),
        format::ratio(multiple),
        format::currency_precise(baseline)
    );
    Some(Insight::new(
        Category::Deviation,
        "detect_procedure_price_outlier",
        text,
        0.75,
    ))
}

pub fn detect_procedure_trend(ctx: &ProcedureContext, config: &DetectorConfig) -> Option<Insight> {
    let g = growth(ctx.yearly.iter().map(|y| (y.year, y.payments)))?;
    if g.pct.abs() <= config.procedure_growth_pct {
        return None;
    }

    let subject = format!("Medicare payments for {}", display_code(ctx));
    Some(Insight::new(
        Category::Trend,
        "detect_procedure_trend",
        trend_sentence(&subject, &g),
        0.70,
    ))
}

/// One region takes an outsized share of the code's latest-year payments.
pub fn detect_procedure_region_concentration(
    ctx: &ProcedureContext,
    config: &DetectorConfig,
) -> Option<Insight> {
    let national = latest_year(ctx).and_then(|(_, latest)| latest.payments);
    let share = leading_share(ctx.region_breakdown.iter().map(|r| r.payments), national)?;
    if share.pct <= config.region_share_concentration_pct {
        return None;
    }

    let region = non_blank(Some(&ctx.region_breakdown[share.index].region))?;
    let text = format!(
        "{} accounts for {} of Medicare payments for {} ({}).",
        region,
        format::percent(share.pct),
        display_code(ctx),
        format::currency(share.amount)
    );
    Some(Insight::new(
        Category::Concentration,
        "detect_procedure_region_concentration",
        text,
        0.60,
    ))
}

/// Code on the static wound-care or COVID-19 test lists.
pub fn detect_procedure_known_risk(ctx: &ProcedureContext, _config: &DetectorConfig) -> Option<Insight> {
    let risk = known_risk::procedure_risk(&ctx.code)?;

    let text = format!(
        "{} falls under {}. Category-level scrutiny is not a finding against any individual provider.",
        ctx.code.trim().to_uppercase(),
        risk.description()
    );
    Some(Insight::new(
        Category::RiskList,
        "detect_procedure_known_risk",
        text,
        0.85,
    ))
}

pub fn procedure_fallback(ctx: &ProcedureContext) -> Insight {
    Insight::new(
        Category::Fallback,
        "procedure_fallback",
        format!(
            "Billing for {} falls within expected ranges for comparable procedure codes.",
            ctx.label()
        ),
        0.0,
    )
}
