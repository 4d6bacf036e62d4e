// Deviation of an estimate from the average transaction of its product,
// province and agent.

use crate::error::{RevenueError, RevenueResult};
use crate::types::{Dimension, RevenueEstimate, TransactionRecord};
use crate::util::average;
use serde::Serialize;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum Performance {
    Over,
    Under,
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct DimensionDelta {
    /// Signed percentage of the estimate above (+) or below (-) the mean.
    pub pct: f64,
    pub mean: f64,
    pub performance: Performance,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Comparison {
    pub product: DimensionDelta,
    pub province: DimensionDelta,
    pub agent: DimensionDelta,
}

/// Mean price over records whose `dimension` equals `key`. Records without a
/// price do not count.
pub fn dimension_mean(records: &[TransactionRecord], dimension: Dimension, key: &str) -> f64 {
    let prices: Vec<f64> = records
        .iter()
        .filter(|r| dimension.key(r) == key)
        .filter_map(|r| r.total_price)
        .collect();
    average(&prices)
}

fn delta(
    value: f64,
    records: &[TransactionRecord],
    dimension: Dimension,
    key: &str,
) -> RevenueResult<DimensionDelta> {
    let mean = dimension_mean(records, dimension, key);
    if mean == 0.0 {
        return Err(RevenueError::Division(format!(
            "average revenue for {} '{}' is 0",
            dimension, key
        )));
    }
    let pct = 100.0 * (value - mean) / mean;
    let performance = if pct > 0.0 {
        Performance::Over
    } else {
        Performance::Under
    };
    Ok(DimensionDelta {
        pct,
        mean,
        performance,
    })
}

pub fn compare(estimate: &RevenueEstimate, records: &[TransactionRecord]) -> RevenueResult<Comparison> {
    Ok(Comparison {
        product: delta(estimate.value, records, Dimension::Product, &estimate.product)?,
        province: delta(estimate.value, records, Dimension::Province, &estimate.province)?,
        agent: delta(estimate.value, records, Dimension::Agent, &estimate.agent)?,
    })
}

impl Comparison {
    /// Analysis lines shown under the estimate.
    pub fn narrative(&self, estimate: &RevenueEstimate) -> Vec<String> {
        let product = &estimate.product;
        let province = &estimate.province;
        let agent = &estimate.agent;
        let mag = |d: &DimensionDelta| format!("{:.2}", d.pct.abs());

        let product_line = match self.product.performance {
            Performance::Over => format!(
                "Product Performance: {} is projected to outperform the average product by {}%. \
                 This indicates strong demand and potential for further growth.",
                product,
                mag(&self.product)
            ),
            Performance::Under => format!(
                "Product Performance: {} is projected to underperform the average product by {}%. \
                 Investigate pricing, saturation or competition behind the lower demand.",
                product,
                mag(&self.product)
            ),
        };
        let province_line = match self.province.performance {
            Performance::Over => format!(
                "Regional Performance: {} is expected to exceed the average revenue for the region by {}%. \
                 Consider allocating additional resources to this region.",
                province,
                mag(&self.province)
            ),
            Performance::Under => format!(
                "Regional Performance: {} is projected to underperform compared to the regional average by {}%. \
                 Consider targeted campaigns or partnerships to boost sales.",
                province,
                mag(&self.province)
            ),
        };
        let agent_line = match self.agent.performance {
            Performance::Over => format!(
                "Agent Performance: {} is predicted to generate {}% more revenue than the average agent. \
                 Consider sharing their practices with other agents.",
                agent,
                mag(&self.agent)
            ),
            Performance::Under => format!(
                "Agent Performance: {} is projected to generate {}% less revenue than the average agent. \
                 Additional training or support may help.",
                agent,
                mag(&self.agent)
            ),
        };

        vec![
            format!(
                "Analysis for {} in {} sold by {} in {}:",
                product, province, agent, estimate.year
            ),
            product_line,
            province_line,
            agent_line,
        ]
    }
}
