use crate::aggregate::MonthlyRevenue;
use crate::error::RevenueResult;
use crate::util::format_number;
use serde::Serialize;
use std::path::Path;
use tabled::{builder::Builder, settings::Style, Table, Tabled};

pub fn write_csv<T: Serialize, P: AsRef<Path>>(path: P, rows: &[T]) -> RevenueResult<()> {
    let mut wtr = csv::Writer::from_path(path)?;
    for r in rows {
        wtr.serialize(r)?;
    }
    wtr.flush()?;
    Ok(())
}

pub fn write_json<T: Serialize, P: AsRef<Path>>(path: P, value: &T) -> RevenueResult<()> {
    let s = serde_json::to_string_pretty(value)?;
    std::fs::write(path, s)?;
    Ok(())
}

pub fn write_monthly<P: AsRef<Path>>(path: P, series: &MonthlyRevenue) -> RevenueResult<()> {
    std::fs::write(path, series.to_delimited()?)?;
    Ok(())
}

pub fn preview_table_rows<T>(rows: &[T], max_rows: usize)
where
    T: Tabled + Clone,
{
    let slice: Vec<T> = rows.iter().take(max_rows).cloned().collect();
    if slice.is_empty() {
        println!("(no rows)\n");
        return;
    }
    let table_str = Table::new(slice).with(Style::markdown()).to_string();
    println!("{}\n", table_str);
}

/// Markdown preview of the first `max_rows` months of a pivot.
pub fn preview_monthly(series: &MonthlyRevenue, max_rows: usize) {
    if series.is_empty() {
        println!("(no rows)\n");
        return;
    }
    let mut builder = Builder::default();
    let header = std::iter::once("Month").chain(series.columns());
    builder.push_record(header.map(String::from));
    for (month, row) in series.rows.iter().take(max_rows) {
        let mut line = vec![month.clone()];
        line.extend(row.values().map(|v| format_number(*v, 2)));
        builder.push_record(line);
    }
    let table_str = builder.build().with(Style::markdown()).to_string();
    println!("{}\n", table_str);
}
