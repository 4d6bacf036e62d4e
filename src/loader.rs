use crate::error::RevenueResult;
use crate::tables::{PlanKey, PriceTable};
use crate::types::{RawRow, TransactionRecord};
use crate::util::{normalize_key, parse_date_safe, parse_f64_safe, parse_u32_safe};
use csv::ReaderBuilder;
use log::{info, warn};
use std::io::Read;
use std::path::Path;

#[derive(Debug, Clone, Default, PartialEq)]
pub struct LoadReport {
    pub total_rows: usize,
    pub kept_rows: usize,
    pub skipped_rows: usize,
}

pub fn load_transactions<P: AsRef<Path>>(
    path: P,
) -> RevenueResult<(Vec<TransactionRecord>, LoadReport)> {
    let file = std::fs::File::open(path.as_ref())?;
    let (records, report) = read_transactions(file)?;
    info!(
        "Loaded {} of {} transaction rows from {}",
        report.kept_rows,
        report.total_rows,
        path.as_ref().display()
    );
    Ok((records, report))
}

pub fn read_transactions<R: Read>(reader: R) -> RevenueResult<(Vec<TransactionRecord>, LoadReport)> {
    let mut rdr = ReaderBuilder::new().flexible(true).from_reader(reader);
    let mut report = LoadReport::default();
    let mut records = Vec::new();

    for (idx, result) in rdr.deserialize::<RawRow>().enumerate() {
        report.total_rows += 1;
        let row = match result {
            Ok(r) => r,
            Err(e) => {
                warn!("row {}: {}", idx + 1, e);
                report.skipped_rows += 1;
                continue;
            }
        };

        let Some(date) = parse_date_safe(row.date.as_deref()) else {
            warn!("row {}: missing or malformed date, skipped", idx + 1);
            report.skipped_rows += 1;
            continue;
        };

        // Missing prices and lengths are kept; the estimator filters them.
        let total_price = parse_f64_safe(row.total_price.as_deref()).filter(|v| *v >= 0.0);
        let subscription_length = parse_u32_safe(row.subscription_length.as_deref());

        records.push(TransactionRecord::new(
            date,
            row.province.as_deref().unwrap_or(""),
            row.product.as_deref().unwrap_or(""),
            row.agent.as_deref().unwrap_or(""),
            row.account_executive.as_deref().unwrap_or(""),
            total_price,
            subscription_length,
        ));
    }

    report.kept_rows = records.len();
    Ok((records, report))
}

pub fn load_price_table<P: AsRef<Path>>(path: P) -> RevenueResult<(PriceTable, LoadReport)> {
    let file = std::fs::File::open(path.as_ref())?;
    let (table, report) = read_price_table(file)?;
    info!(
        "Loaded {} plans from {} ({} rows skipped)",
        table.len(),
        path.as_ref().display(),
        report.skipped_rows
    );
    Ok((table, report))
}

/// Reads `namakp,namaproduk,mitraagen,pred_harga_<YEAR>...`. Prices may carry
/// thousands separators; they are stripped before parsing.
pub fn read_price_table<R: Read>(reader: R) -> RevenueResult<(PriceTable, LoadReport)> {
    let mut rdr = ReaderBuilder::new().flexible(true).from_reader(reader);
    let headers = rdr.headers()?.clone();

    let column = |names: &[&str]| {
        headers
            .iter()
            .position(|h| names.iter().any(|n| h.trim().eq_ignore_ascii_case(n)))
    };
    let province_col = column(&["namakp", "province"]);
    let product_col = column(&["namaproduk", "product"]);
    let agent_col = column(&["mitraagen", "agent"]);
    let year_cols: Vec<(usize, i32)> = headers
        .iter()
        .enumerate()
        .filter_map(|(i, h)| {
            let year = h.trim().strip_prefix("pred_harga_")?.parse::<i32>().ok()?;
            Some((i, year))
        })
        .collect();
    if year_cols.is_empty() {
        warn!("price table has no pred_harga_<YEAR> columns");
    }

    let mut table = PriceTable::new();
    let mut report = LoadReport::default();
    for (idx, result) in rdr.records().enumerate() {
        report.total_rows += 1;
        let rec = match result {
            Ok(r) => r,
            Err(e) => {
                warn!("price row {}: {}", idx + 1, e);
                report.skipped_rows += 1;
                continue;
            }
        };
        let field = |col: Option<usize>| col.and_then(|c| rec.get(c)).map(normalize_key);
        let (Some(province), Some(product), Some(agent)) =
            (field(province_col), field(product_col), field(agent_col))
        else {
            report.skipped_rows += 1;
            continue;
        };
        if province.is_empty() || product.is_empty() || agent.is_empty() {
            report.skipped_rows += 1;
            continue;
        }

        let key = PlanKey::new(&province, &product, &agent);
        let mut any = false;
        for (col, year) in &year_cols {
            match parse_f64_safe(rec.get(*col)) {
                Some(price) => {
                    table.insert(key.clone(), *year, price);
                    any = true;
                }
                None => warn!("price row {}: no usable price for {}", idx + 1, year),
            }
        }
        if any {
            report.kept_rows += 1;
        } else {
            report.skipped_rows += 1;
        }
    }

    Ok((table, report))
}
