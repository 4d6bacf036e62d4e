use crate::aggregate::{aggregate, MonthlyRevenue};
use crate::error::RevenueResult;
use crate::tables::LookupTables;
use crate::types::{DashboardRow, DashboardSummary, Dimension, TransactionRecord};
use crate::util::{format_number, percentage_change};

/// Predicted totals for `predicted_year` against actuals of `actual_year`,
/// overall and per province.
pub fn dashboard_summary(
    tables: &LookupTables,
    actual_year: i32,
    predicted_year: i32,
) -> RevenueResult<DashboardSummary> {
    let mut rows = Vec::new();
    let mut total_actual = 0.0;
    let mut total_predicted = 0.0;

    for province in tables.provinces() {
        let actual = tables.actual(&province, actual_year)?;
        let predicted = tables.predicted(&province, predicted_year)?;
        total_actual += actual;
        total_predicted += predicted;
        let change = percentage_change(predicted, actual)?;
        rows.push(DashboardRow {
            province,
            actual_year,
            predicted_year,
            actual_revenue: format_number(actual, 2),
            predicted_revenue: format_number(predicted, 2),
            percentage_change: format!("{:.2}%", change),
        });
    }

    Ok(DashboardSummary {
        actual_year,
        predicted_year,
        total_actual,
        total_predicted,
        percentage_change: percentage_change(total_predicted, total_actual)?,
        rows,
    })
}

/// One monthly pivot per dimension, in `Dimension::ALL` order.
pub fn monthly_reports(records: &[TransactionRecord]) -> Vec<MonthlyRevenue> {
    Dimension::ALL
        .iter()
        .map(|d| aggregate(records, *d))
        .collect()
}
