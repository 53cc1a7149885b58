//! Series and share arithmetic shared by detectors (pure math, no text).

use crate::types::{available, positive};

/// Percent change between the earliest and latest points of a yearly series.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Growth {
    pub from_year: i32,
    pub to_year: i32,
    pub from_amount: f64,
    pub to_amount: f64,
    pub pct: f64,
}

impl Growth {
    pub fn direction(&self) -> &'static str {
        if self.pct < 0.0 {
            "declined"
        } else {
            "grew"
        }
    }
}

/// Compute first-to-last growth over `(year, amount)` points.
///
/// Points with a missing year or amount are skipped. The remaining points
/// are ordered by year, so callers need not trust input ordering. Returns
/// `None` with fewer than two distinct years or a non-positive first amount.
pub fn growth<I>(points: I) -> Option<Growth>
where
    I: IntoIterator<Item = (Option<i32>, Option<f64>)>,
{
    let mut valid: Vec<(i32, f64)> = points
        .into_iter()
        .filter_map(|(year, amount)| Some((year?, available(amount)?)))
        .collect();
    valid.sort_by_key(|(year, _)| *year);

    let (from_year, from_amount) = *valid.first()?;
    let (to_year, to_amount) = *valid.last()?;
    if from_year == to_year || from_amount <= 0.0 {
        return None;
    }

    Some(Growth {
        from_year,
        to_year,
        from_amount,
        to_amount,
        pct: (to_amount - from_amount) / from_amount * 100.0,
    })
}

/// Latest point of a yearly series with a strictly positive amount.
pub fn latest_positive<I>(points: I) -> Option<(i32, f64)>
where
    I: IntoIterator<Item = (Option<i32>, Option<f64>)>,
{
    points
        .into_iter()
        .filter_map(|(year, amount)| Some((year?, positive(amount)?)))
        .max_by_key(|(year, _)| *year)
}

/// The leading entry of a breakdown and its percent share of the total.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Share {
    pub index: usize,
    pub amount: f64,
    pub pct: f64,
}

/// Find the largest entry and its share of the whole.
///
/// `reported_total` is the entity's own total for the period; breakdowns
/// are usually truncated to the top few entries, so that total is the
/// denominator when it is positive. Without it, or when it is smaller than
/// the breakdown itself, the sum of available entries is used. Ties resolve
/// to the earliest entry. Returns `None` when the denominator is not positive.
pub fn leading_share<I>(amounts: I, reported_total: Option<f64>) -> Option<Share>
where
    I: IntoIterator<Item = Option<f64>>,
{
    let mut sum = 0.0;
    let mut best: Option<(usize, f64)> = None;
    for (index, amount) in amounts.into_iter().enumerate() {
        let Some(amount) = available(amount).filter(|a| *a >= 0.0) else {
            continue;
        };
        sum += amount;
        if best.map_or(true, |(_, top)| amount > top) {
            best = Some((index, amount));
        }
    }

    let (index, amount) = best?;
    let total = positive(reported_total).map_or(sum, |reported| reported.max(sum));
    if total <= 0.0 {
        return None;
    }
    Some(Share {
        index,
        amount,
        pct: amount / total * 100.0,
    })
}
