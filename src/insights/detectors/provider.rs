//! Provider detectors (one billing NPI).

use crate::config::DetectorConfig;
use crate::format;
use crate::insights::engine::{DetectorEntry, DomainRegistry};
use crate::insights::series::growth;
use crate::insights::{Category, Insight};
use crate::types::{available, non_blank, positive, Domain, EntityKind, ProviderContext};

use super::{trend_sentence, years_phrase};

pub const SEQUENCE: &[Category] = &[
    Category::Magnitude,
    Category::Deviation,
    Category::Volume,
    Category::Trend,
    Category::Concentration,
    Category::RiskList,
];

pub const DETECTORS: &[DetectorEntry<ProviderContext>] = &[
    DetectorEntry {
        name: "detect_provider_magnitude",
        category: Category::Magnitude,
        detect: detect_provider_magnitude,
    },
    DetectorEntry {
        name: "detect_provider_markup",
        category: Category::Deviation,
        detect: detect_provider_markup,
    },
    DetectorEntry {
        name: "detect_provider_volume",
        category: Category::Volume,
        detect: detect_provider_volume,
    },
    DetectorEntry {
        name: "detect_provider_trend",
        category: Category::Trend,
        detect: detect_provider_trend,
    },
    DetectorEntry {
        name: "detect_provider_concentration",
        category: Category::Concentration,
        detect: detect_provider_concentration,
    },
    DetectorEntry {
        name: "detect_provider_risk_list",
        category: Category::RiskList,
        detect: detect_provider_risk_list,
    },
];

pub static REGISTRY: DomainRegistry<ProviderContext> = DomainRegistry {
    domain: Domain::Provider,
    sequence: SEQUENCE,
    detectors: DETECTORS,
    fallback: provider_fallback,
};

// ---------------------------------------------------------------------------
// Detector 1: Magnitude
// ---------------------------------------------------------------------------

/// Total payments, with percentile rank and peer median when known.
pub fn detect_provider_magnitude(ctx: &ProviderContext, _config: &DetectorConfig) -> Option<Insight> {
    let total = positive(ctx.total_payments)?;

    let mut text = format!(
        "{} received {} in Medicare payments",
        ctx.label(),
        format::currency(total)
    );

    let percentile = available(ctx.peer_percentile).filter(|p| (0.0..=100.0).contains(p));
    if let Some(pct) = percentile {
        let peers = match non_blank(ctx.specialty.as_deref()) {
            Some(specialty) => format!("{} providers", specialty),
            None => "peer providers".to_string(),
        };
        text.push_str(&format!(
            ", ranking in the {} percentile among {}",
            format::ordinal(pct),
            peers
        ));
    }
    if let Some(median) = positive(ctx.peer_median_payment) {
        text.push_str(&format!(
            ", {} the peer median of {}",
            format::ratio(total / median),
            format::currency(median)
        ));
    }
    text.push('.');

    let weight = percentile.map(|p| p / 100.0).unwrap_or(0.5);
    Some(Insight::new(Category::Magnitude, "detect_provider_magnitude", text, weight))
}

// ---------------------------------------------------------------------------
// Detector 2: Markup deviation
// ---------------------------------------------------------------------------

/// Markup ratio above the threshold. When the specialty median is known it
/// is always quoted, on whichever side of it the provider sits.
pub fn detect_provider_markup(ctx: &ProviderContext, config: &DetectorConfig) -> Option<Insight> {
    let markup = available(ctx.avg_markup_ratio)?;
    if markup <= config.markup_ratio_threshold {
        return None;
    }

    let text = match positive(ctx.specialty_markup_median) {
        Some(median) if markup <= median => format!(
            "Average markup ratio of {} exceeds the {} review threshold, against a specialty median of {} ({} the median).",
            format::ratio(markup),
            format::ratio(config.markup_ratio_threshold),
            format::ratio(median),
            format::ratio(markup / median)
        ),
        Some(median) => format!(
            "Average markup ratio of {} is significantly above the specialty median of {} ({} the median).",
            format::ratio(markup),
            format::ratio(median),
            format::ratio(markup / median)
        ),
        None => format!(
            "Average markup ratio of {} is well above average: billed charges run {} the amount Medicare actually pays.",
            format::ratio(markup),
            format::ratio(markup)
        ),
    };

    Some(Insight::new(Category::Deviation, "detect_provider_markup", text, 0.80))
}

// ---------------------------------------------------------------------------
// Detector 3: Impossible volume
// ---------------------------------------------------------------------------

/// Services per working day for individual practitioners only.
pub fn detect_provider_volume(ctx: &ProviderContext, config: &DetectorConfig) -> Option<Insight> {
    if ctx.entity_kind != Some(EntityKind::Individual) {
        return None;
    }
    let services = positive(ctx.total_services)?;
    let years = positive(ctx.years_active)?;

    let per_day = services / years / config.working_days_per_year;
    if per_day <= config.services_per_day_threshold {
        return None;
    }

    let text = format!(
        "Billed {} services over {}, an average of ~{}/day across {} working days a year. That is an implausible volume for a single practitioner.",
        format::number(services),
        years_phrase(years),
        format::number(per_day),
        format::number(config.working_days_per_year)
    );
    Some(Insight::new(Category::Volume, "detect_provider_volume", text, 0.90))
}

// ---------------------------------------------------------------------------
// Detector 4: Trend
// ---------------------------------------------------------------------------

pub fn detect_provider_trend(ctx: &ProviderContext, config: &DetectorConfig) -> Option<Insight> {
    let g = growth(ctx.yearly_payments.iter().map(|p| (p.year, p.amount)))?;
    if g.pct.abs() <= config.provider_growth_pct {
        return None;
    }

    let subject = format!("Annual Medicare payments to {}", lowercase_label(ctx));
    Some(Insight::new(
        Category::Trend,
        "detect_provider_trend",
        trend_sentence(&subject, &g),
        0.70,
    ))
}

// ---------------------------------------------------------------------------
// Detector 5: Procedure concentration
// ---------------------------------------------------------------------------

/// A single procedure code dominates the provider's payments.
pub fn detect_provider_concentration(ctx: &ProviderContext, config: &DetectorConfig) -> Option<Insight> {
    let (top, share) = ctx
        .top_procedures
        .iter()
        .filter(|p| non_blank(Some(&p.code)).is_some())
        .filter_map(|p| {
            available(p.payment_share)
                .filter(|s| (0.0..=100.0).contains(s))
                .map(|s| (p, s))
        })
        .fold(None, |best: Option<(_, f64)>, (p, s)| match best {
            Some((_, top)) if top >= s => best,
            _ => Some((p, s)),
        })?;

    if share <= config.procedure_concentration_pct {
        return None;
    }

    let code = match non_blank(top.description.as_deref()) {
        Some(desc) => format!("{} ({})", top.code.trim(), desc),
        None => top.code.trim().to_string(),
    };
    let text = format!(
        "{} of payments come from a single procedure code, {}.",
        format::percent(share),
        code
    );
    Some(Insight::new(
        Category::Concentration,
        "detect_provider_concentration",
        text,
        0.65,
    ))
}

// ---------------------------------------------------------------------------
// Detector 6: Risk list
// ---------------------------------------------------------------------------

/// Fires on presence alone; the score is quoted when known.
pub fn detect_provider_risk_list(ctx: &ProviderContext, _config: &DetectorConfig) -> Option<Insight> {
    let entry = ctx.risk_entry.as_ref()?;

    let score = available(entry.risk_score).filter(|s| (0.0..=100.0).contains(s));
    let listing = match score {
        Some(score) => format!(
            "{} appears on the statistical risk list with a risk score of {}/100.",
            ctx.label(),
            format::number(score)
        ),
        None => format!("{} appears on the statistical risk list.", ctx.label()),
    };
    let text = format!("{} Statistical flags are not accusations of fraud.", listing);

    Some(Insight::new(Category::RiskList, "detect_provider_risk_list", text, 0.95))
}

pub fn provider_fallback(ctx: &ProviderContext) -> Insight {
    let subject = match non_blank(ctx.name.as_deref()) {
        Some(name) => format!("{}'s", name),
        None => "This provider's".to_string(),
    };
    Insight::new(
        Category::Fallback,
        "provider_fallback",
        format!(
            "{} billing metrics fall within expected ranges for its peer group.",
            subject
        ),
        0.0,
    )
}

fn lowercase_label(ctx: &ProviderContext) -> String {
    non_blank(ctx.name.as_deref())
        .map(str::to_string)
        .unwrap_or_else(|| "this provider".to_string())
}
