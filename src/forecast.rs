// Producing the plan price table from a handful of known prices.
//
// The estimator only reads the resulting `PriceTable`; how the prices are
// extrapolated is up to the `PriceForecaster` handed in here.

use crate::tables::{PlanKey, PriceTable};
use log::warn;
use std::collections::BTreeMap;

pub trait PriceForecaster {
    /// Predict one price per entry of `years` from `(year, price)` observations.
    /// `None` when there is nothing to extrapolate from.
    fn forecast(&self, history: &[(i32, f64)], years: &[i32]) -> Option<Vec<f64>>;
}

/// Uses the latest observation at or before each target year, or the earliest
/// one for years before any observation. Past the last known point this is
/// exactly what a shallow regression tree fit on one or two prices predicts.
#[derive(Debug, Clone, Copy, Default)]
pub struct CarryForwardForecaster;

impl PriceForecaster for CarryForwardForecaster {
    fn forecast(&self, history: &[(i32, f64)], years: &[i32]) -> Option<Vec<f64>> {
        let mut sorted = history.to_vec();
        sorted.sort_by_key(|(y, _)| *y);
        let first = *sorted.first()?;
        let out = years
            .iter()
            .map(|target| {
                sorted
                    .iter()
                    .rev()
                    .find(|(y, _)| y <= target)
                    .unwrap_or(&first)
                    .1
            })
            .collect();
        Some(out)
    }
}

pub fn build_price_table<F: PriceForecaster>(
    history: &BTreeMap<PlanKey, Vec<(i32, f64)>>,
    years: &[i32],
    forecaster: &F,
) -> PriceTable {
    let mut table = PriceTable::new();
    for (key, points) in history {
        let Some(prices) = forecaster.forecast(points, years) else {
            warn!(
                "no price history for {} / {} / {}",
                key.province, key.product, key.agent
            );
            continue;
        };
        for (year, price) in years.iter().zip(prices) {
            table.insert(key.clone(), *year, price);
        }
    }
    table
}
