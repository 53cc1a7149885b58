//! Insight engine: domain registries and the single dispatch point.
//!
//! Each domain registers a fixed list of detectors, a category sequence and
//! a fallback. `InsightEngine` matches the context variant exhaustively,
//! runs that domain's detectors and hands the candidates to the selector.

use crate::config::DetectorConfig;
use crate::error::EngineError;
use crate::types::{Domain, EntityContext};

use super::detectors::{procedure, provider, region, specialty};
use super::selector;
use super::{Category, Insight};

// ---------------------------------------------------------------------------
// Types
// ---------------------------------------------------------------------------

/// Function signature for a detector over one context type.
pub type DetectorFn<C> = fn(&C, &DetectorConfig) -> Option<Insight>;

/// A registered detector and the one category it is responsible for.
pub struct DetectorEntry<C> {
    pub name: &'static str,
    pub category: Category,
    pub detect: DetectorFn<C>,
}

/// Everything the engine needs to evaluate one domain.
pub struct DomainRegistry<C: 'static> {
    pub domain: Domain,
    /// Output order. Categories not listed here are never emitted.
    pub sequence: &'static [Category],
    pub detectors: &'static [DetectorEntry<C>],
    pub fallback: fn(&C) -> Insight,
}

impl<C: 'static> DomainRegistry<C> {
    /// Run every detector, then select.
    pub fn evaluate(&self, ctx: &C, config: &DetectorConfig) -> Vec<Insight> {
        let mut fired = Vec::new();
        for entry in self.detectors {
            let Some(insight) = (entry.detect)(ctx, config) else {
                continue;
            };
            if insight.category != entry.category {
                log::warn!(
                    "{}: {} emitted a {} insight but is registered for {}; dropping it",
                    self.domain,
                    entry.name,
                    insight.category,
                    entry.category
                );
                continue;
            }
            fired.push(insight);
        }

        log::debug!(
            "{} insights: {} of {} detectors fired [{}]",
            self.domain,
            fired.len(),
            self.detectors.len(),
            fired
                .iter()
                .map(|i| i.detector)
                .collect::<Vec<_>>()
                .join(", ")
        );

        selector::select(fired, self.sequence, || (self.fallback)(ctx))
    }
}

// ---------------------------------------------------------------------------
// Engine
// ---------------------------------------------------------------------------

/// Stateless insight engine. Holds only read-only thresholds, so one
/// instance can be shared across threads.
#[derive(Debug, Clone, Default)]
pub struct InsightEngine {
    config: DetectorConfig,
}

impl InsightEngine {
    /// Build an engine from validated thresholds.
    pub fn new(config: DetectorConfig) -> Result<Self, EngineError> {
        config.validate()?;
        Ok(Self { config })
    }

    pub fn config(&self) -> &DetectorConfig {
        &self.config
    }

    /// Generate insights for `ctx`, which must belong to `domain`.
    ///
    /// A tag that disagrees with the context variant is a caller bug and is
    /// reported, never silently re-routed.
    pub fn generate(&self, domain: Domain, ctx: &EntityContext) -> Result<Vec<Insight>, EngineError> {
        let actual = ctx.domain();
        if actual != domain {
            return Err(EngineError::DomainMismatch {
                expected: domain,
                actual,
            });
        }
        Ok(self.generate_for(ctx))
    }

    /// Same as `generate`, with the domain given as a string tag.
    pub fn generate_tagged(&self, domain: &str, ctx: &EntityContext) -> Result<Vec<Insight>, EngineError> {
        let domain: Domain = domain.parse()?;
        self.generate(domain, ctx)
    }

    /// Generate insights for whichever domain the context belongs to.
    /// Always returns between 1 and `MAX_INSIGHTS` insights.
    pub fn generate_for(&self, ctx: &EntityContext) -> Vec<Insight> {
        match ctx {
            EntityContext::Provider(c) => provider::REGISTRY.evaluate(c, &self.config),
            EntityContext::Region(c) => region::REGISTRY.evaluate(c, &self.config),
            EntityContext::Specialty(c) => specialty::REGISTRY.evaluate(c, &self.config),
            EntityContext::Procedure(c) => procedure::REGISTRY.evaluate(c, &self.config),
        }
    }

    /// Evaluate many contexts (e.g. a list page), preserving input order.
    pub fn generate_batch(&self, contexts: &[EntityContext]) -> Vec<Vec<Insight>> {
        contexts.iter().map(|ctx| self.generate_for(ctx)).collect()
    }
}

/// Build an engine with the default thresholds.
pub fn default_engine() -> InsightEngine {
    InsightEngine::default()
}

#[cfg(test)]
mod tests {
    use std::collections::HashSet;

    use super::*;
    use crate::insights::detectors::fixtures::*;
    use crate::insights::selector::MAX_INSIGHTS;
    use crate::types::*;

    fn categories(list: &[Insight]) -> Vec<Category> {
        list.iter().map(|i| i.category).collect()
    }

    fn assert_registry_consistent<C: 'static>(registry: &DomainRegistry<C>) {
        let mut seen = HashSet::new();
        for entry in registry.detectors {
            assert!(
                seen.insert(entry.category),
                "{}: two detectors registered for {}",
                registry.domain,
                entry.category
            );
            assert!(
                registry.sequence.contains(&entry.category),
                "{}: {} is not in the category sequence",
                registry.domain,
                entry.category
            );
        }
        assert!(!registry.sequence.contains(&Category::Fallback));
    }

    fn assert_output_invariants(out: &[Insight]) {
        assert!(!out.is_empty() && out.len() <= MAX_INSIGHTS, "len {}", out.len());
        let distinct: HashSet<Category> = out.iter().map(|i| i.category).collect();
        assert_eq!(distinct.len(), out.len(), "duplicate categories: {:?}", categories(out));
        if out.iter().any(|i| i.category == Category::Fallback) {
            assert_eq!(out.len(), 1, "fallback mixed with other insights");
        }
        for insight in out {
            assert!(!insight.text.is_empty());
            assert!(!insight.text.contains("NaN"));
            assert!(!insight.text.contains("None") && !insight.text.contains("{}"));
        }
    }

    /// A spread of contexts across all domains, from empty to fully loaded.
    fn corpus() -> Vec<EntityContext> {
        let mut contexts = vec![
            EntityContext::Provider(ProviderContext::default()),
            EntityContext::Provider(scenario_a_provider()),
            EntityContext::Provider(scenario_b_provider()),
            EntityContext::Provider(loud_provider()),
            EntityContext::Region(RegionContext::default()),
            EntityContext::Region(scenario_c_region()),
            EntityContext::Specialty(SpecialtyContext::default()),
            EntityContext::Procedure(ProcedureContext::default()),
            EntityContext::Procedure(scenario_e_procedure(30.0)),
            EntityContext::Procedure(scenario_e_procedure(20.0)),
        ];
        for markup in [f64::NAN, 0.0, 4.9, 5.0, 5.1, 40.0] {
            let mut p = loud_provider();
            p.avg_markup_ratio = Some(markup);
            p.total_payments = Some(markup * 1_000.0);
            contexts.push(EntityContext::Provider(p));
        }
        contexts.push(EntityContext::Specialty(SpecialtyContext {
            name: "Clinical Laboratory".into(),
            yearly_payments: series(&[(2019, 10.0), (2023, 40.0)]),
            summary: Some(SpecialtySummary {
                total_payments: Some(9_000_000_000.0),
                total_providers: Some(3_000.0),
                markup_ratio: Some(6.0),
            }),
            system_markup_ratio: Some(3.0),
        }));
        contexts.push(EntityContext::Procedure(ProcedureContext {
            code: "Q4205".into(),
            description: Some("Skin substitute".into()),
            yearly: vec![
                ProcedureYear {
                    year: Some(2019),
                    payments: Some(1_000_000.0),
                    services: Some(1_000.0),
                    providers: Some(10.0),
                },
                ProcedureYear {
                    year: Some(2023),
                    payments: Some(9_000_000.0),
                    services: Some(3_000.0),
                    providers: Some(40.0),
                },
            ],
            top_providers: vec![ProcedureProvider {
                name: Some("Wound Clinic LLC".into()),
                services: Some(200.0),
                avg_payment_per_service: Some(15_000.0),
                ..Default::default()
            }],
            region_breakdown: vec![
                RegionSpend {
                    region: "AZ".into(),
                    payments: Some(6_000_000.0),
                },
                RegionSpend {
                    region: "TX".into(),
                    payments: Some(3_000_000.0),
                },
            ],
        }));
        contexts
    }

    fn mislabeled_trend(_ctx: &ProviderContext, _config: &DetectorConfig) -> Option<Insight> {
        Some(Insight::new(Category::Trend, "mislabeled_trend", "wrong slot".into(), 1.0))
    }

    fn always_magnitude(_ctx: &ProviderContext, _config: &DetectorConfig) -> Option<Insight> {
        Some(Insight::new(Category::Magnitude, "always_magnitude", "ok".into(), 0.5))
    }

    static MISLABELED: DomainRegistry<ProviderContext> = DomainRegistry {
        domain: Domain::Provider,
        sequence: provider::SEQUENCE,
        detectors: &[
            DetectorEntry {
                name: "mislabeled_trend",
                category: Category::Volume,
                detect: mislabeled_trend,
            },
            DetectorEntry {
                name: "always_magnitude",
                category: Category::Magnitude,
                detect: always_magnitude,
            },
        ],
        fallback: provider::provider_fallback,
    };

    #[test]
    fn test_insight_outside_registered_category_is_dropped() {
        let out = MISLABELED.evaluate(&ProviderContext::default(), &DetectorConfig::default());
        assert_eq!(categories(&out), vec![Category::Magnitude]);
        assert_eq!(out[0].detector, "always_magnitude");
    }

    #[test]
    fn test_registries_are_consistent() {
        assert_registry_consistent(&provider::REGISTRY);
        assert_registry_consistent(&region::REGISTRY);
        assert_registry_consistent(&specialty::REGISTRY);
        assert_registry_consistent(&procedure::REGISTRY);
    }

    #[test]
    fn test_scenario_a_provider_magnitude_deviation_risk() {
        let engine = default_engine();
        let ctx = EntityContext::Provider(scenario_a_provider());
        let out = engine.generate(Domain::Provider, &ctx).unwrap();

        assert_eq!(
            categories(&out),
            vec![Category::Magnitude, Category::Deviation, Category::RiskList]
        );
        assert!(out[0].text.contains("99th percentile"), "{}", out[0].text);
        assert!(out[1].text.contains("12.0x"), "{}", out[1].text);
        assert!(
            out[1].text.contains("significantly above the specialty median of 3.0x"),
            "{}",
            out[1].text
        );
        assert!(
            out[2].text.ends_with(
                "risk score of 91/100. Statistical flags are not accusations of fraud."
            ),
            "{}",
            out[2].text
        );
    }

    #[test]
    fn test_scenario_b_provider_volume() {
        let out = default_engine().generate_for(&EntityContext::Provider(scenario_b_provider()));
        assert_eq!(categories(&out), vec![Category::Volume]);
        assert!(out[0].text.contains("~9,862/day"), "{}", out[0].text);
    }

    #[test]
    fn test_scenario_c_region_decline() {
        let out = default_engine()
            .generate(Domain::Region, &EntityContext::Region(scenario_c_region()))
            .unwrap();
        let trend = out.iter().find(|i| i.category == Category::Trend).unwrap();
        assert!(trend.text.contains("declined 22% from 2019 to 2020"), "{}", trend.text);
    }

    #[test]
    fn test_scenario_d_empty_contexts_fall_back_in_every_domain() {
        let engine = default_engine();
        let empties = [
            EntityContext::Provider(ProviderContext::default()),
            EntityContext::Region(RegionContext::default()),
            EntityContext::Specialty(SpecialtyContext::default()),
            EntityContext::Procedure(ProcedureContext::default()),
        ];
        for ctx in &empties {
            let out = engine.generate(ctx.domain(), ctx).unwrap();
            assert_eq!(categories(&out), vec![Category::Fallback], "{:?}", ctx.domain());
            assert!(out[0].text.contains("expected ranges"), "{}", out[0].text);
        }
    }

    #[test]
    fn test_scenario_d_zero_values_fall_back() {
        let ctx = EntityContext::Provider(ProviderContext {
            total_payments: Some(0.0),
            total_services: Some(0.0),
            years_active: Some(0.0),
            entity_kind: Some(EntityKind::Individual),
            avg_markup_ratio: Some(0.0),
            yearly_payments: series(&[(2019, 0.0), (2020, 0.0)]),
            ..Default::default()
        });
        let out = default_engine().generate_for(&ctx);
        assert_eq!(categories(&out), vec![Category::Fallback]);
    }

    #[test]
    fn test_scenario_e_procedure_concentration_threshold() {
        let engine = default_engine();
        let fires = engine.generate_for(&EntityContext::Procedure(scenario_e_procedure(30.0)));
        assert!(fires.iter().any(|i| i.category == Category::Concentration));

        let quiet = engine.generate_for(&EntityContext::Procedure(scenario_e_procedure(20.0)));
        assert!(quiet.iter().all(|i| i.category != Category::Concentration));
    }

    #[test]
    fn test_wound_care_procedure_fires_every_category() {
        let ctx = corpus().pop().unwrap();
        let out = default_engine().generate_for(&ctx);
        assert_eq!(categories(&out), procedure::SEQUENCE.to_vec());
        assert!(out[1].text.contains("Wound Clinic LLC averages $15,000.00 per service"));
    }

    #[test]
    fn test_provider_with_everything_truncates_to_five() {
        let out = default_engine().generate_for(&EntityContext::Provider(loud_provider()));
        assert_eq!(
            categories(&out),
            vec![
                Category::Magnitude,
                Category::Deviation,
                Category::Volume,
                Category::Trend,
                Category::Concentration,
            ]
        );
    }

    #[test]
    fn test_invariants_hold_across_corpus() {
        let engine = default_engine();
        for ctx in corpus() {
            let out = engine.generate_for(&ctx);
            assert_output_invariants(&out);
        }
    }

    #[test]
    fn test_deterministic_and_does_not_mutate() {
        let engine = default_engine();
        for ctx in corpus() {
            let before = ctx.clone();
            let first = engine.generate_for(&ctx);
            let second = engine.generate_for(&ctx);
            assert_eq!(first, second);
            // NaN fields never compare equal, so compare the serialized form.
            assert_eq!(
                serde_json::to_string(&before).unwrap(),
                serde_json::to_string(&ctx).unwrap()
            );
        }
    }

    #[test]
    fn test_parallel_evaluation_matches_sequential() {
        let engine = default_engine();
        let contexts = corpus();
        let sequential = engine.generate_batch(&contexts);

        let shared = &engine;
        let parallel: Vec<Vec<Insight>> = std::thread::scope(|scope| {
            let handles: Vec<_> = contexts
                .iter()
                .map(|ctx| scope.spawn(move || shared.generate_for(ctx)))
                .collect();
            handles.into_iter().map(|h| h.join().unwrap()).collect()
        });
        assert_eq!(sequential, parallel);
    }

    #[test]
    fn test_domain_mismatch_is_an_error() {
        let engine = default_engine();
        let ctx = EntityContext::Region(scenario_c_region());
        let err = engine.generate(Domain::Provider, &ctx).unwrap_err();
        assert!(matches!(
            err,
            EngineError::DomainMismatch {
                expected: Domain::Provider,
                actual: Domain::Region
            }
        ));
        assert!(err.is_caller_bug());
    }

    #[test]
    fn test_unknown_domain_tag_is_an_error() {
        let engine = default_engine();
        let ctx = EntityContext::Region(scenario_c_region());
        let err = engine.generate_tagged("county", &ctx).unwrap_err();
        assert!(matches!(err, EngineError::InvalidDomain(_)));
        assert!(engine.generate_tagged("state", &ctx).is_ok());
    }

    #[test]
    fn test_new_rejects_invalid_config() {
        let config = DetectorConfig {
            services_per_day_threshold: -1.0,
            ..Default::default()
        };
        assert!(matches!(InsightEngine::new(config), Err(EngineError::Config(_))));
    }

    #[test]
    fn test_thresholds_come_from_config() {
        let strict = InsightEngine::new(DetectorConfig {
            services_per_day_threshold: 10_000.0,
            ..Default::default()
        })
        .unwrap();
        let out = strict.generate_for(&EntityContext::Provider(scenario_b_provider()));
        assert_eq!(categories(&out), vec![Category::Fallback]);
    }

    #[test]
    fn test_json_document_end_to_end() {
        let ctx = EntityContext::from_json_str(
            r#"{
                "domain": "region",
                "name": "Florida",
                "yearlyPayments": [
                    {"year": 2019, "amount": 100},
                    {"year": 2020, "amount": "78"}
                ],
                "providerCount": "garbage"
            }"#,
        )
        .unwrap();
        let out = default_engine().generate(Domain::Region, &ctx).unwrap();
        assert_eq!(categories(&out), vec![Category::Magnitude, Category::Trend]);
        assert!(out[1].text.starts_with("Medicare payments in Florida declined 22%"));
        assert!(!out[0].text.contains("across"), "{}", out[0].text);
    }
}
