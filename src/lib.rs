// ICONNET revenue.
//
// Monthly revenue pivots, province-level dashboard figures and a what-if
// revenue estimator for a regional internet-service reseller.
//
// - `aggregate::aggregate` pivots transactions into `YYYY-MM` series per
//   province, product, agent or account executive.
// - `estimator::estimate` scales the historical monthly revenue per
//   customer of one plan by its province's predicted growth.
// - `compare::compare` measures an estimate against the average
//   transaction of its product, province and agent.
//
// All operations are pure functions over read-only tables.

pub mod aggregate;
pub mod compare;
pub mod config;
pub mod error;
pub mod estimator;
pub mod forecast;
pub mod loader;
pub mod output;
pub mod reports;
pub mod tables;
pub mod types;
pub mod util;

pub use aggregate::{aggregate, MonthlyRevenue};
pub use compare::{compare, Comparison, DimensionDelta, Performance};
pub use error::{RevenueError, RevenueResult};
pub use estimator::{estimate, estimate_flat_price, EstimateRequest, Estimator, EstimatorMode};
pub use forecast::{build_price_table, CarryForwardForecaster, PriceForecaster};
pub use loader::{load_price_table, load_transactions, LoadReport};
pub use reports::{dashboard_summary, monthly_reports};
pub use tables::{LookupTables, PlanKey, PriceTable};
pub use types::{Dimension, RevenueEstimate, TransactionRecord};
