// Monthly revenue pivots for charting and export.

use crate::error::RevenueResult;
use crate::types::{Dimension, TransactionRecord};
use serde::Serialize;
use std::collections::{BTreeMap, BTreeSet};

/// month (`YYYY-MM`) -> dimension value -> summed price.
///
/// Every month row carries every dimension value seen anywhere in the input,
/// zero-filled, so lookups never come back empty for a known pair.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct MonthlyRevenue {
    pub dimension: Dimension,
    pub rows: BTreeMap<String, BTreeMap<String, f64>>,
}

impl MonthlyRevenue {
    pub fn months(&self) -> Vec<&str> {
        self.rows.keys().map(String::as_str).collect()
    }

    pub fn columns(&self) -> Vec<&str> {
        self.rows
            .values()
            .next()
            .map(|r| r.keys().map(String::as_str).collect())
            .unwrap_or_default()
    }

    pub fn value(&self, month: &str, key: &str) -> f64 {
        self.rows
            .get(month)
            .and_then(|r| r.get(key))
            .copied()
            .unwrap_or(0.0)
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    /// Flat CSV text: `month,<value...>` header, one line per month.
    pub fn to_delimited(&self) -> RevenueResult<String> {
        let mut wtr = csv::Writer::from_writer(Vec::new());
        wtr.write_record(std::iter::once("month").chain(self.columns()))?;
        for (month, row) in &self.rows {
            let mut line = vec![month.clone()];
            line.extend(row.values().map(|v| v.to_string()));
            wtr.write_record(&line)?;
        }
        let bytes = wtr.into_inner().map_err(|e| e.into_error())?;
        Ok(String::from_utf8_lossy(&bytes).into_owned())
    }
}

/// Records with a blank value for `dimension` are left out of that pivot.
pub fn aggregate(records: &[TransactionRecord], dimension: Dimension) -> MonthlyRevenue {
    let keyed: Vec<&TransactionRecord> = records
        .iter()
        .filter(|r| !dimension.key(r).is_empty())
        .collect();
    let keys: BTreeSet<&str> = keyed.iter().map(|r| dimension.key(*r)).collect();

    let mut rows: BTreeMap<String, BTreeMap<String, f64>> = BTreeMap::new();
    for r in keyed {
        let row = rows.entry(r.month()).or_insert_with(|| {
            keys.iter().map(|k| (k.to_string(), 0.0)).collect()
        });
        if let Some(v) = row.get_mut(dimension.key(r)) {
            *v += r.total_price.unwrap_or(0.0);
        }
    }

    MonthlyRevenue { dimension, rows }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;

    fn rec(y: i32, m: u32, province: &str, product: &str, price: f64) -> TransactionRecord {
        TransactionRecord::new(
            NaiveDate::from_ymd_opt(y, m, 10).unwrap(),
            province,
            product,
            "iconplus",
            "made",
            Some(price),
            Some(1),
        )
    }

    #[test]
    fn sums_per_month_and_value_with_zero_fill() {
        let records = vec![
            rec(2023, 2, "BALI", "A", 100.0),
            rec(2023, 1, "BALI", "A", 50.0),
            rec(2023, 1, "BALI", "A", 25.0),
            rec(2023, 2, "NTB", "B", 10.0),
        ];
        let agg = aggregate(&records, Dimension::Province);
        assert_eq!(agg.months(), vec!["2023-01", "2023-02"]);
        assert_eq!(agg.columns(), vec!["BALI", "NTB"]);
        assert_eq!(agg.rows["2023-01"]["BALI"], 75.0);
        assert_eq!(agg.rows["2023-01"]["NTB"], 0.0);
        assert_eq!(agg.rows["2023-02"]["NTB"], 10.0);
    }

    #[test]
    fn months_sort_across_years() {
        let records = vec![rec(2024, 1, "BALI", "A", 1.0), rec(2023, 12, "BALI", "A", 1.0)];
        let agg = aggregate(&records, Dimension::Product);
        assert_eq!(agg.months(), vec!["2023-12", "2024-01"]);
    }

    #[test]
    fn missing_price_counts_as_zero() {
        let mut r = rec(2023, 3, "BALI", "A", 0.0);
        r.total_price = None;
        let agg = aggregate(&[r], Dimension::Province);
        assert_eq!(agg.rows["2023-03"]["BALI"], 0.0);
    }

    #[test]
    fn blank_key_adds_no_column() {
        let mut blank = rec(2023, 1, "BALI", "A", 50.0);
        blank.account_executive = String::new();
        let records = vec![rec(2023, 1, "BALI", "A", 100.0), blank];
        let agg = aggregate(&records, Dimension::AccountExecutive);
        assert_eq!(agg.columns(), vec!["MADE"]);
        assert_eq!(agg.to_delimited().unwrap(), "month,MADE\n2023-01,100\n");
        // the blank row still counts for the other dimensions
        assert_eq!(aggregate(&records, Dimension::Province).value("2023-01", "BALI"), 150.0);
    }

    #[test]
    fn month_with_only_blank_keys_is_dropped() {
        let mut blank = rec(2023, 2, "BALI", "A", 50.0);
        blank.account_executive = String::new();
        let records = vec![rec(2023, 1, "BALI", "A", 100.0), blank];
        let agg = aggregate(&records, Dimension::AccountExecutive);
        assert_eq!(agg.months(), vec!["2023-01"]);
    }

    #[test]
    fn empty_input_is_empty_output() {
        let agg = aggregate(&[], Dimension::AccountExecutive);
        assert!(agg.is_empty());
        assert!(agg.columns().is_empty());
        assert_eq!(agg.value("2023-01", "X"), 0.0);
    }

    #[test]
    fn repeated_runs_are_identical() {
        let records = vec![rec(2023, 1, "BALI", "A", 1.5), rec(2023, 2, "NTT", "B", 2.5)];
        let a = aggregate(&records, Dimension::Product).to_delimited().unwrap();
        let b = aggregate(&records, Dimension::Product).to_delimited().unwrap();
        assert_eq!(a, b);
        assert_eq!(a, "month,A,B\n2023-01,1.5,0\n2023-02,0,2.5\n");
    }
}
