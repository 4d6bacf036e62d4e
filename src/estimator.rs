// What-if revenue estimation for a plan, a subscription length and a
// customer count.
//
// The historical mode takes the average monthly revenue per customer of the
// exact (province, product, agent) combination and scales it by the
// province's predicted growth over the base year. The flat-price mode reads a
// forecast plan price straight from the price table instead.

use crate::error::{RevenueError, RevenueResult};
use crate::tables::{LookupTables, PlanKey, PriceTable};
use crate::types::{RevenueEstimate, TransactionRecord};
use crate::util::average;
use log::{debug, warn};

pub const MAX_SUBSCRIPTION_MONTHS: u32 = 12;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, clap::ValueEnum)]
pub enum EstimatorMode {
    #[default]
    Historical,
    FlatPrice,
}

/// Selections made on the predictor page. `year` is `None` until chosen.
#[derive(Debug, Clone, PartialEq)]
pub struct EstimateRequest {
    pub year: Option<i32>,
    pub province: String,
    pub product: String,
    pub agent: String,
    pub subscription_length: u32,
    pub num_customers: u32,
}

/// A request that passed validation; selectors are normalised keys.
#[derive(Debug, Clone, PartialEq)]
struct Validated {
    year: i32,
    plan: PlanKey,
    subscription_length: u32,
    num_customers: u32,
}

impl EstimateRequest {
    fn validate(&self) -> RevenueResult<Validated> {
        let plan = PlanKey::new(&self.province, &self.product, &self.agent);
        let mut missing = Vec::new();
        if self.year.is_none() {
            missing.push("prediction year");
        }
        if plan.province.is_empty() {
            missing.push("province");
        }
        if plan.product.is_empty() {
            missing.push("product");
        }
        if plan.agent.is_empty() {
            missing.push("agent partner");
        }
        if !missing.is_empty() {
            return Err(RevenueError::InvalidInput(format!(
                "please select the following options before predicting: {}",
                missing.join(", ")
            )));
        }
        if !(1..=MAX_SUBSCRIPTION_MONTHS).contains(&self.subscription_length) {
            return Err(RevenueError::InvalidInput(format!(
                "subscription length must be between 1 and {} months, got {}",
                MAX_SUBSCRIPTION_MONTHS, self.subscription_length
            )));
        }
        if self.num_customers == 0 {
            return Err(RevenueError::InvalidInput(
                "number of customers must be at least 1".into(),
            ));
        }
        Ok(Validated {
            year: self.year.unwrap_or_default(),
            plan,
            subscription_length: self.subscription_length,
            num_customers: self.num_customers,
        })
    }
}

/// Average monthly revenue per customer for one plan, with the number of
/// records it was derived from. `None` when no usable record matches.
///
/// Records without a price or with a zero/absent subscription length are
/// ignored.
pub fn monthly_rate(
    records: &[TransactionRecord],
    province: &str,
    product: &str,
    agent: &str,
) -> Option<(f64, usize)> {
    let plan = PlanKey::new(province, product, agent);
    let (prices, lengths): (Vec<f64>, Vec<f64>) = records
        .iter()
        .filter(|r| r.province == plan.province && r.product == plan.product && r.agent == plan.agent)
        .filter_map(|r| match (r.total_price, r.subscription_length_months) {
            (Some(p), Some(l)) if l > 0 => Some((p, l as f64)),
            _ => None,
        })
        .unzip();
    if prices.is_empty() {
        return None;
    }
    Some((average(&prices) / average(&lengths), prices.len()))
}

/// Historical-average estimate. With no matching history the estimate is 0
/// and the reference tables are not consulted.
pub fn estimate(
    request: &EstimateRequest,
    records: &[TransactionRecord],
    tables: &LookupTables,
) -> RevenueResult<RevenueEstimate> {
    let v = request.validate()?;
    let mut out = empty_estimate(&v);

    let Some((rate, matched)) =
        monthly_rate(records, &v.plan.province, &v.plan.product, &v.plan.agent)
    else {
        warn!(
            "no history for {} / {} / {}, estimate is 0",
            v.plan.province, v.plan.product, v.plan.agent
        );
        return Ok(out);
    };

    let factor = tables.scaling_factor(&v.plan.province, v.year)?;
    let per_customer = rate * factor * v.subscription_length as f64;
    out.value = per_customer * v.num_customers as f64;
    out.matched_records = matched;
    out.monthly_rate = Some(rate);
    out.scaling_factor = Some(factor);
    debug!(
        "estimate {}: rate {} x factor {} x {} months x {} customers = {}",
        v.year, rate, factor, v.subscription_length, v.num_customers, out.value
    );
    Ok(out)
}

/// Flat-price estimate: forecast plan price x months x customers. An unknown
/// plan yields 0; a known plan without a price for the year is a lookup error.
pub fn estimate_flat_price(
    request: &EstimateRequest,
    prices: &PriceTable,
) -> RevenueResult<RevenueEstimate> {
    let v = request.validate()?;
    let mut out = empty_estimate(&v);

    let Some(by_year) = prices.prices(&v.plan) else {
        warn!(
            "no price plan for {} / {} / {}, estimate is 0",
            v.plan.province, v.plan.product, v.plan.agent
        );
        return Ok(out);
    };
    let price = by_year.get(&v.year).copied().ok_or_else(|| {
        RevenueError::Lookup(format!("no predicted price for {}", v.year))
    })?;

    out.value = price * v.subscription_length as f64 * v.num_customers as f64;
    out.matched_records = 1;
    out.monthly_rate = Some(price);
    Ok(out)
}

fn empty_estimate(v: &Validated) -> RevenueEstimate {
    RevenueEstimate {
        year: v.year,
        province: v.plan.province.clone(),
        product: v.plan.product.clone(),
        agent: v.plan.agent.clone(),
        subscription_length: v.subscription_length,
        num_customers: v.num_customers,
        value: 0.0,
        matched_records: 0,
        monthly_rate: None,
        scaling_factor: None,
    }
}

/// Bundles the session's read-only tables with the selected mode.
#[derive(Debug, Clone, Copy)]
pub struct Estimator<'a> {
    pub mode: EstimatorMode,
    pub records: &'a [TransactionRecord],
    pub tables: &'a LookupTables,
    pub prices: &'a PriceTable,
}

impl<'a> Estimator<'a> {
    pub fn run(&self, request: &EstimateRequest) -> RevenueResult<RevenueEstimate> {
        match self.mode {
            EstimatorMode::Historical => estimate(request, self.records, self.tables),
            EstimatorMode::FlatPrice => estimate_flat_price(request, self.prices),
        }
    }

    /// Selector choices offered to the user, drawn from the loaded data.
    pub fn choices(&self) -> (Vec<String>, Vec<String>, Vec<String>) {
        let mut provinces = Vec::new();
        let mut products = Vec::new();
        let mut agents = Vec::new();
        match self.mode {
            EstimatorMode::Historical => {
                for r in self.records {
                    provinces.push(r.province.clone());
                    products.push(r.product.clone());
                    agents.push(r.agent.clone());
                }
            }
            EstimatorMode::FlatPrice => {
                for k in self.prices.plans() {
                    provinces.push(k.province.clone());
                    products.push(k.product.clone());
                    agents.push(k.agent.clone());
                }
            }
        }
        for v in [&mut provinces, &mut products, &mut agents] {
            v.retain(|s| !s.is_empty());
            v.sort();
            v.dedup();
        }
        (provinces, products, agents)
    }
}
