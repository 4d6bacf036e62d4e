// Province-level reference tables and the per-plan price table.
//
// These are supplied from outside the core (built in, or read from JSON /
// CSV) and are only ever read by the estimator and the reports.

use crate::error::{RevenueError, RevenueResult};
use crate::util::normalize_key;
use log::{debug, info};
use once_cell::sync::Lazy;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::path::Path;

/// province -> year -> total revenue
pub type ProvinceYearTable = BTreeMap<String, BTreeMap<i32, f64>>;

/// Figures observed for the three provinces served by the reseller.
static BUILTIN: Lazy<LookupTables> = Lazy::new(|| {
    let actual = [
        ("BALI", [(2022, 3_220_853_684.0), (2023, 9_086_408_000.0)]),
        (
            "NUSA TENGGARA BARAT",
            [(2022, 1_277_415_042.0), (2023, 3_143_802_000.0)],
        ),
        (
            "NUSA TENGGARA TIMUR",
            [(2022, 604_448_722.0), (2023, 3_672_627_000.0)],
        ),
    ];
    let predicted = [
        (
            "BALI",
            [
                (2024, 9_881_050_833.0),
                (2025, 10_966_640_866.0),
                (2026, 11_578_671_120.0),
            ],
        ),
        (
            "NUSA TENGGARA BARAT",
            [
                (2024, 3_599_877_853.0),
                (2025, 3_836_036_550.0),
                (2026, 4_360_106_712.0),
            ],
        ),
        (
            "NUSA TENGGARA TIMUR",
            [
                (2024, 4_125_092_421.0),
                (2025, 4_395_696_223.0),
                (2026, 4_879_712_932.0),
            ],
        ),
    ];
    LookupTables {
        base_year: 2023,
        actual: actual
            .iter()
            .map(|(p, ys)| (p.to_string(), ys.iter().copied().collect()))
            .collect(),
        predicted: predicted
            .iter()
            .map(|(p, ys)| (p.to_string(), ys.iter().copied().collect()))
            .collect(),
    }
});

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LookupTables {
    /// Most recent full year of actuals; denominator of the scaling factor.
    pub base_year: i32,
    pub actual: ProvinceYearTable,
    pub predicted: ProvinceYearTable,
}

impl LookupTables {
    pub fn builtin() -> &'static LookupTables {
        &BUILTIN
    }

    /// Read tables from a JSON document shaped like
    /// `{"base_year": 2023, "actual": {"BALI": {"2023": 1.0}}, "predicted": {...}}`.
    pub fn from_json_file<P: AsRef<Path>>(path: P) -> RevenueResult<LookupTables> {
        let s = std::fs::read_to_string(path.as_ref())?;
        let tables = Self::from_json_str(&s)?;
        info!(
            "Loaded lookup tables from {} ({} provinces, base year {})",
            path.as_ref().display(),
            tables.provinces().len(),
            tables.base_year
        );
        Ok(tables)
    }

    pub fn from_json_str(s: &str) -> RevenueResult<LookupTables> {
        let raw: LookupTables = serde_json::from_str(s)?;
        Ok(LookupTables {
            base_year: raw.base_year,
            actual: normalize_table(raw.actual),
            predicted: normalize_table(raw.predicted),
        })
    }

    pub fn actual(&self, province: &str, year: i32) -> RevenueResult<f64> {
        figure(&self.actual, "actual", province, year)
    }

    pub fn predicted(&self, province: &str, year: i32) -> RevenueResult<f64> {
        figure(&self.predicted, "predicted", province, year)
    }

    /// Ratio of the predicted total for `year` to the base-year actual.
    pub fn scaling_factor(&self, province: &str, year: i32) -> RevenueResult<f64> {
        let predicted = self.predicted(province, year)?;
        let base = self.actual(province, self.base_year)?;
        if base == 0.0 {
            return Err(RevenueError::Division(format!(
                "actual {} revenue for {} is 0",
                self.base_year, province
            )));
        }
        let factor = predicted / base;
        debug!(
            "scaling factor {}/{}: {} / {} = {}",
            province, year, predicted, base, factor
        );
        Ok(factor)
    }

    /// Provinces present in both tables.
    pub fn provinces(&self) -> Vec<String> {
        self.predicted
            .keys()
            .filter(|p| self.actual.contains_key(*p))
            .cloned()
            .collect()
    }

    pub fn actual_years(&self) -> Vec<i32> {
        years(&self.actual)
    }

    pub fn forecast_years(&self) -> Vec<i32> {
        years(&self.predicted)
    }
}

fn normalize_table(table: ProvinceYearTable) -> ProvinceYearTable {
    table
        .into_iter()
        .map(|(k, v)| (normalize_key(&k), v))
        .collect()
}

fn figure(table: &ProvinceYearTable, what: &str, province: &str, year: i32) -> RevenueResult<f64> {
    let key = normalize_key(province);
    let by_year = table
        .get(&key)
        .ok_or_else(|| RevenueError::Lookup(format!("no {} figures for province '{}'", what, key)))?;
    by_year.get(&year).copied().ok_or_else(|| {
        RevenueError::Lookup(format!("no {} figure for '{}' in {}", what, key, year))
    })
}

fn years(table: &ProvinceYearTable) -> Vec<i32> {
    let mut ys: Vec<i32> = table.values().flat_map(|m| m.keys().copied()).collect();
    ys.sort_unstable();
    ys.dedup();
    ys
}

/// Identifies one sellable plan: a product sold in a province by an agent.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct PlanKey {
    pub province: String,
    pub product: String,
    pub agent: String,
}

impl PlanKey {
    pub fn new(province: &str, product: &str, agent: &str) -> Self {
        PlanKey {
            province: normalize_key(province),
            product: normalize_key(product),
            agent: normalize_key(agent),
        }
    }
}

/// plan -> year -> predicted monthly price
#[derive(Debug, Clone, Default, PartialEq)]
pub struct PriceTable {
    plans: BTreeMap<PlanKey, BTreeMap<i32, f64>>,
}

impl PriceTable {
    pub fn new() -> Self {
        Self::default()
    }

    /// First row wins when the same plan appears twice.
    pub fn insert(&mut self, key: PlanKey, year: i32, price: f64) {
        self.plans
            .entry(key)
            .or_default()
            .entry(year)
            .or_insert(price);
    }

    pub fn prices(&self, key: &PlanKey) -> Option<&BTreeMap<i32, f64>> {
        self.plans.get(key)
    }

    pub fn plans(&self) -> impl Iterator<Item = &PlanKey> {
        self.plans.keys()
    }

    pub fn len(&self) -> usize {
        self.plans.len()
    }

    pub fn is_empty(&self) -> bool {
        self.plans.is_empty()
    }

    pub fn years(&self) -> Vec<i32> {
        let mut ys: Vec<i32> = self
            .plans
            .values()
            .flat_map(|m| m.keys().copied())
            .collect();
        ys.sort_unstable();
        ys.dedup();
        ys
    }
}
