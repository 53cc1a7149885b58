//! Specialty detectors.

use crate::config::DetectorConfig;
use crate::format;
use crate::insights::engine::{DetectorEntry, DomainRegistry};
use crate::insights::known_risk;
use crate::insights::series::{growth, latest_positive};
use crate::insights::{Category, Insight};
use crate::types::{available, positive, Domain, SpecialtyContext};

use super::trend_sentence;

pub const SEQUENCE: &[Category] = &[
    Category::Magnitude,
    Category::Deviation,
    Category::Trend,
    Category::RiskList,
];

pub const DETECTORS: &[DetectorEntry<SpecialtyContext>] = &[
    DetectorEntry {
        name: "detect_specialty_magnitude",
        category: Category::Magnitude,
        detect: detect_specialty_magnitude,
    },
    DetectorEntry {
        name: "detect_specialty_markup",
        category: Category::Deviation,
        detect: detect_specialty_markup,
    },
    DetectorEntry {
        name: "detect_specialty_trend",
        category: Category::Trend,
        detect: detect_specialty_trend,
    },
    DetectorEntry {
        name: "detect_specialty_oversight",
        category: Category::RiskList,
        detect: detect_specialty_oversight,
    },
];

pub static REGISTRY: DomainRegistry<SpecialtyContext> = DomainRegistry {
    domain: Domain::Specialty,
    sequence: SEQUENCE,
    detectors: DETECTORS,
    fallback: specialty_fallback,
};

/// Summary total when present, otherwise the latest year of the series.
pub fn detect_specialty_magnitude(ctx: &SpecialtyContext, _config: &DetectorConfig) -> Option<Insight> {
    let summary_total = ctx.summary.as_ref().and_then(|s| positive(s.total_payments));

    let mut text = match summary_total {
        Some(total) => format!(
            "Providers in {} received {} in Medicare payments",
            ctx.label(),
            format::currency(total)
        ),
        None => {
            let (year, total) =
                latest_positive(ctx.yearly_payments.iter().map(|p| (p.year, p.amount)))?;
            format!(
                "In {}, providers in {} received {} in Medicare payments",
                year,
                ctx.label(),
                format::currency(total)
            )
        }
    };

    if let (Some(total), Some(providers)) = (
        summary_total,
        ctx.summary.as_ref().and_then(|s| positive(s.total_providers)),
    ) {
        text.push_str(&format!(
            " across {} providers (an average of {} each)",
            format::number(providers),
            format::currency(total / providers)
        ));
    }
    text.push('.');

    Some(Insight::new(Category::Magnitude, "detect_specialty_magnitude", text, 0.50))
}

/// Markup against the system-wide average when known, otherwise against the
/// absolute markup threshold.
pub fn detect_specialty_markup(ctx: &SpecialtyContext, config: &DetectorConfig) -> Option<Insight> {
    let markup = available(ctx.summary.as_ref()?.markup_ratio)?;

    let text = match positive(ctx.system_markup_ratio) {
        Some(system) => {
            if markup <= system * config.specialty_markup_multiple {
                return None;
            }
            format!(
                "Providers in {} have an average markup ratio of {}, {} the system-wide average of {}.",
                ctx.label(),
                format::ratio(markup),
                format::ratio(markup / system),
                format::ratio(system)
            )
        }
        None => {
            if markup <= config.markup_ratio_threshold {
                return None;
            }
            format!(
                "Providers in {} have an average markup ratio of {}, well above average.",
                ctx.label(),
                format::ratio(markup)
            )
        }
    };

    Some(Insight::new(Category::Deviation, "detect_specialty_markup", text, 0.75))
}

pub fn detect_specialty_trend(ctx: &SpecialtyContext, config: &DetectorConfig) -> Option<Insight> {
    let g = growth(ctx.yearly_payments.iter().map(|p| (p.year, p.amount)))?;
    if g.pct.abs() <= config.specialty_growth_pct {
        return None;
    }

    let subject = format!("Medicare payments to {} providers", ctx.label());
    Some(Insight::new(
        Category::Trend,
        "detect_specialty_trend",
        trend_sentence(&subject, &g),
        0.70,
    ))
}

/// Specialty named in federal oversight findings (static lookup).
pub fn detect_specialty_oversight(ctx: &SpecialtyContext, _config: &DetectorConfig) -> Option<Insight> {
    if !known_risk::is_oversight_specialty(&ctx.name) {
        return None;
    }

    let text = format!(
        "{} is among the provider categories named in federal oversight findings on improper billing. This reflects sector-wide findings, not a judgment about any individual provider.",
        ctx.label()
    );
    Some(Insight::new(Category::RiskList, "detect_specialty_oversight", text, 0.85))
}

pub fn specialty_fallback(ctx: &SpecialtyContext) -> Insight {
    Insight::new(
        Category::Fallback,
        "specialty_fallback",
        format!(
            "Metrics for {} fall within expected ranges compared with other specialties.",
            ctx.label()
        ),
        0.0,
    )
}
