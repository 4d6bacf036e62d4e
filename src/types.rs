use crate::util::normalize_key;
use chrono::{Datelike, NaiveDate};
use serde::{Deserialize, Serialize};
use std::fmt;
use tabled::Tabled;

/// One transaction row as it appears in the sales export. Everything is kept
/// as text here; `loader` decides what is usable.
#[derive(Debug, Deserialize)]
pub struct RawRow {
    #[serde(rename = "tanggal", alias = "date")]
    pub date: Option<String>,
    #[serde(rename = "namakp", alias = "province")]
    pub province: Option<String>,
    #[serde(rename = "namaproduk", alias = "product")]
    pub product: Option<String>,
    #[serde(rename = "mitraagen", alias = "agent")]
    pub agent: Option<String>,
    #[serde(rename = "ae", alias = "account_executive")]
    pub account_executive: Option<String>,
    #[serde(rename = "totalharga", alias = "total_price")]
    pub total_price: Option<String>,
    #[serde(rename = "lamalangganan", alias = "subscription_length")]
    pub subscription_length: Option<String>,
}

/// A sold subscription entry. Category fields hold normalised keys.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct TransactionRecord {
    pub date: NaiveDate,
    pub province: String,
    pub product: String,
    pub agent: String,
    pub account_executive: String,
    pub total_price: Option<f64>,
    pub subscription_length_months: Option<u32>,
}

impl TransactionRecord {
    pub fn new(
        date: NaiveDate,
        province: &str,
        product: &str,
        agent: &str,
        account_executive: &str,
        total_price: Option<f64>,
        subscription_length_months: Option<u32>,
    ) -> Self {
        TransactionRecord {
            date,
            province: normalize_key(province),
            product: normalize_key(product),
            agent: normalize_key(agent),
            account_executive: normalize_key(account_executive),
            total_price,
            subscription_length_months,
        }
    }

    /// `YYYY-MM` bucket of the transaction date.
    pub fn month(&self) -> String {
        format!("{:04}-{:02}", self.date.year(), self.date.month())
    }
}

/// Categorical axis a revenue series can be pivoted on.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
pub enum Dimension {
    Province,
    Product,
    Agent,
    AccountExecutive,
}

impl Dimension {
    pub const ALL: [Dimension; 4] = [
        Dimension::Province,
        Dimension::Product,
        Dimension::Agent,
        Dimension::AccountExecutive,
    ];

    pub fn key<'a>(&self, record: &'a TransactionRecord) -> &'a str {
        match self {
            Dimension::Province => &record.province,
            Dimension::Product => &record.product,
            Dimension::Agent => &record.agent,
            Dimension::AccountExecutive => &record.account_executive,
        }
    }

    /// Export file name, e.g. `revenue_by_province.csv`.
    pub fn file_name(&self) -> &'static str {
        match self {
            Dimension::Province => "revenue_by_province.csv",
            Dimension::Product => "revenue_by_product.csv",
            Dimension::Agent => "revenue_by_agent.csv",
            Dimension::AccountExecutive => "revenue_by_ae.csv",
        }
    }
}

impl fmt::Display for Dimension {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            Dimension::Province => "Province",
            Dimension::Product => "Product",
            Dimension::Agent => "Agent",
            Dimension::AccountExecutive => "Account Executive",
        };
        f.write_str(s)
    }
}

/// Result of one estimator call, with the selectors that produced it.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RevenueEstimate {
    pub year: i32,
    pub province: String,
    pub product: String,
    pub agent: String,
    pub subscription_length: u32,
    pub num_customers: u32,
    pub value: f64,
    /// Historical records backing the estimate; 0 means no precedent.
    pub matched_records: usize,
    pub monthly_rate: Option<f64>,
    pub scaling_factor: Option<f64>,
}

impl RevenueEstimate {
    pub fn has_history(&self) -> bool {
        self.matched_records > 0
    }
}

#[derive(Debug, Serialize, Tabled, Clone)]
pub struct DashboardRow {
    #[serde(rename = "Province")]
    #[tabled(rename = "Province")]
    pub province: String,
    #[serde(rename = "Actual Year")]
    #[tabled(rename = "Actual Year")]
    pub actual_year: i32,
    #[serde(rename = "Predicted Year")]
    #[tabled(rename = "Predicted Year")]
    pub predicted_year: i32,
    #[serde(rename = "Actual Revenue")]
    #[tabled(rename = "Actual Revenue")]
    pub actual_revenue: String,
    #[serde(rename = "Predicted Revenue")]
    #[tabled(rename = "Predicted Revenue")]
    pub predicted_revenue: String,
    #[serde(rename = "Percentage Change")]
    #[tabled(rename = "Percentage Change")]
    pub percentage_change: String,
}

#[derive(Debug, Serialize)]
pub struct DashboardSummary {
    pub actual_year: i32,
    pub predicted_year: i32,
    pub total_actual: f64,
    pub total_predicted: f64,
    pub percentage_change: f64,
    pub rows: Vec<DashboardRow>,
}
