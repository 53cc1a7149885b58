//! Ordering, dedup and truncation of fired insights.
//!
//! Domain-agnostic: every domain hands in its own category sequence and
//! fallback, so adding a domain never touches this module.

use super::{Category, Insight};

/// Hard cap on insights shown for one entity.
pub const MAX_INSIGHTS: usize = 5;

/// Select the final ordered insight list for one entity.
///
/// 1. At most one insight per category. When several compete, the highest
///    weight wins and equal weights keep the first registered.
/// 2. Ordered by `sequence`; categories that did not fire are skipped.
/// 3. Truncated to `MAX_INSIGHTS`.
/// 4. If nothing survives, exactly one insight from `fallback`.
pub fn select<F>(fired: Vec<Insight>, sequence: &[Category], fallback: F) -> Vec<Insight>
where
    F: FnOnce() -> Insight,
{
    let mut pool: Vec<Option<Insight>> = fired.into_iter().map(Some).collect();

    for insight in pool.iter().flatten() {
        if !sequence.contains(&insight.category) || insight.category == Category::Fallback {
            log::warn!(
                "select: dropping {} insight from {} (category not in domain sequence)",
                insight.category,
                insight.detector
            );
        }
    }

    let mut selected: Vec<Insight> = Vec::with_capacity(MAX_INSIGHTS);
    for &category in sequence {
        if selected.len() == MAX_INSIGHTS {
            break;
        }
        if category == Category::Fallback || selected.iter().any(|i| i.category == category) {
            continue;
        }

        let mut winner: Option<usize> = None;
        let mut competing = 0usize;
        for (idx, slot) in pool.iter().enumerate() {
            let Some(candidate) = slot else { continue };
            if candidate.category != category {
                continue;
            }
            competing += 1;
            let replace = match winner.and_then(|w| pool[w].as_ref()) {
                None => true,
                Some(current) => candidate.weight > current.weight,
            };
            if replace {
                winner = Some(idx);
            }
        }

        if let Some(insight) = winner.and_then(|idx| pool[idx].take()) {
            if competing > 1 {
                log::warn!(
                    "select: {} detectors fired for category {}; keeping {}",
                    competing,
                    category,
                    insight.detector
                );
            }
            selected.push(insight);
        }
    }

    if selected.is_empty() {
        selected.push(fallback());
    }
    selected
}
