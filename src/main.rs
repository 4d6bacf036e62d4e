// Entry point and high-level CLI flow.
//
// - Option [1] loads the transaction export and the plan price table.
// - Option [2] shows actual vs predicted province totals.
// - Option [3] pivots actual revenue by month and exports each pivot.
// - Option [4] runs the what-if revenue predictor.
// After a page is shown the user can go back to the menu or exit.
use anyhow::Result;
use clap::Parser;
use iconnet_revenue::config::Cli;
use iconnet_revenue::estimator::MAX_SUBSCRIPTION_MONTHS;
use iconnet_revenue::types::DashboardSummary;
use iconnet_revenue::util::{format_int, format_number, format_rupiah, format_rupiah_million};
use iconnet_revenue::{
    compare, dashboard_summary, load_price_table, load_transactions, monthly_reports, output,
    EstimateRequest, Estimator, LookupTables, PriceTable, RevenueError, RevenueResult,
    TransactionRecord,
};
use log::warn;
use std::io::{self, BufRead, Write};
use std::path::Path;

/// Everything loaded for this run. Pages borrow from it; nothing mutates it
/// after loading.
struct Session {
    cli: Cli,
    tables: LookupTables,
    records: Option<Vec<TransactionRecord>>,
    prices: PriceTable,
}

/// One trimmed line from `input`, or `None` once the input is exhausted.
fn read_line_from<R: BufRead>(input: &mut R, prompt: &str) -> Option<String> {
    print!("{}", prompt);
    let _ = io::stdout().flush();
    let mut buf = String::new();
    match input.read_line(&mut buf) {
        Ok(0) | Err(_) => None,
        Ok(_) => Some(buf.trim().to_string()),
    }
}

fn read_line(prompt: &str) -> Option<String> {
    read_line_from(&mut io::stdin().lock(), prompt)
}

fn read_choice() -> Option<String> {
    read_line("Enter choice: ")
}

/// Ask the user whether to go back to the menu.
///
/// Returns `true` if the user chose `Y`, `false` if they chose `N` or the
/// input ended.
fn prompt_back_to_menu() -> bool {
    loop {
        let Some(resp) = read_line("Back to Menu (Y/N): ") else {
            return false;
        };
        match resp.to_uppercase().as_str() {
            "Y" => return true,
            "N" => return false,
            _ => println!("Invalid choice. Please enter Y or N."),
        }
    }
}

/// Numbered pick list. Empty input leaves the selection unset.
fn prompt_select(label: &str, options: &[String]) -> Option<String> {
    println!("{}:", label);
    for (i, o) in options.iter().enumerate() {
        println!("  [{}] {}", i + 1, o);
    }
    let resp = read_line(&format!("Select {} (blank to skip): ", label.to_lowercase()))?;
    let idx: usize = resp.parse().ok()?;
    options.get(idx.checked_sub(1)?).cloned()
}

fn year_options(years: &[i32]) -> Vec<String> {
    years.iter().map(|y| y.to_string()).collect()
}

fn prompt_number(label: &str, default: u32) -> u32 {
    let resp = read_line(&format!("{} [{}]: ", label, default)).unwrap_or_default();
    if resp.is_empty() {
        return default;
    }
    // Out-of-range values go through so the estimator can reject them.
    resp.parse().unwrap_or(0)
}

/// Line shown after an export attempt.
fn export_message(file: &Path, result: RevenueResult<()>) -> String {
    match result {
        Ok(()) => format!("(Full table exported to {})\n", file.display()),
        Err(e) => format!("Write error: {}\n", e),
    }
}

fn handle_load(session: &mut Session) {
    match load_transactions(&session.cli.transactions) {
        Ok((records, report)) => {
            println!(
                "Processing dataset... ({} rows read, {} kept)",
                format_int(report.total_rows),
                format_int(report.kept_rows)
            );
            if report.skipped_rows > 0 {
                println!(
                    "Note: {} rows skipped due to parse/validation errors.",
                    format_int(report.skipped_rows)
                );
            }
            session.records = Some(records);
        }
        Err(e) => {
            eprintln!("Failed to load transactions: {}\n", e);
            return;
        }
    }

    match load_price_table(&session.cli.prices) {
        Ok((prices, report)) => {
            println!("Price table: {} plans loaded.", format_int(report.kept_rows));
            session.prices = prices;
        }
        Err(e) => warn!("price table unavailable: {}", e),
    }
    println!();
}

fn print_dashboard(summary: &DashboardSummary) {
    println!(
        "Overall predicted revenue {}: {} ({:.2} % vs {})",
        summary.predicted_year,
        format_rupiah(summary.total_predicted),
        summary.percentage_change,
        summary.actual_year
    );
    println!(
        "Total actual revenue {}: {}\n",
        summary.actual_year,
        format_rupiah_million(summary.total_actual)
    );
    output::preview_table_rows(&summary.rows, summary.rows.len());
}

fn handle_dashboard(session: &Session) {
    let actual_years = year_options(&session.tables.actual_years());
    let forecast_years = year_options(&session.tables.forecast_years());
    let (Some(actual), Some(predicted)) = (
        prompt_select("Actual Year", &actual_years),
        prompt_select("Prediction Year", &forecast_years),
    ) else {
        println!("Please select both an actual and a prediction year.\n");
        return;
    };
    let (Ok(actual), Ok(predicted)) = (actual.parse::<i32>(), predicted.parse::<i32>()) else {
        return;
    };

    match dashboard_summary(&session.tables, actual, predicted) {
        Ok(summary) => {
            print_dashboard(&summary);
            let file = session.cli.out_path("dashboard_revenue_data.csv");
            let result = output::write_csv(&file, &summary.rows);
            println!("{}", export_message(&file, result));
        }
        Err(e) => eprintln!("Dashboard unavailable: {}\n", e),
    }
}

fn handle_actual_data(session: &Session) {
    let Some(records) = &session.records else {
        println!("Error: No data loaded. Please load the files first (option 1).\n");
        return;
    };

    for series in monthly_reports(records) {
        println!("Revenue by {}\n", series.dimension);
        output::preview_monthly(&series, 3);
        let file = session.cli.out_path(series.dimension.file_name());
        let result = output::write_monthly(&file, &series);
        println!("{}", export_message(&file, result));
    }
}

fn handle_predictor(session: &Session) {
    let Some(records) = &session.records else {
        println!("Error: No data loaded. Please load the files first (option 1).\n");
        return;
    };
    let estimator = Estimator {
        mode: session.cli.mode,
        records,
        tables: &session.tables,
        prices: &session.prices,
    };
    let (provinces, products, agents) = estimator.choices();
    let years = year_options(&session.tables.forecast_years());

    let request = EstimateRequest {
        year: prompt_select("Prediction Year", &years).and_then(|y| y.parse().ok()),
        province: prompt_select("Province", &provinces).unwrap_or_default(),
        product: prompt_select("Name of Product", &products).unwrap_or_default(),
        agent: prompt_select("Agent Partner", &agents).unwrap_or_default(),
        subscription_length: prompt_number(
            &format!("Long Subscription (1-{} months)", MAX_SUBSCRIPTION_MONTHS),
            3,
        ),
        num_customers: prompt_number("Number of Customers", 1),
    };

    let estimate = match estimator.run(&request) {
        Ok(e) => e,
        Err(RevenueError::InvalidInput(msg)) => {
            println!("{}\n", msg);
            return;
        }
        Err(e) => {
            eprintln!("Prediction failed: {}\n", e);
            return;
        }
    };

    println!("\nTotal Revenue Prediction: {}\n", format_rupiah(estimate.value));
    if !estimate.has_history() {
        println!("No sales history for this combination yet.\n");
        return;
    }
    if let (Some(rate), Some(factor)) = (estimate.monthly_rate, estimate.scaling_factor) {
        println!(
            "Monthly revenue per customer {} x growth {} over {}",
            format_rupiah(rate),
            format_number(factor, 4),
            session.tables.base_year
        );
    }

    println!("Summary and Analysis\n");
    match compare(&estimate, records) {
        Ok(cmp) => {
            for line in cmp.narrative(&estimate) {
                println!("- {}", line);
            }
            println!();
        }
        Err(e) => eprintln!("Comparison unavailable: {}\n", e),
    }
}

/// Non-interactive run: every export, no prompts.
fn run_batch(session: &Session) -> Result<()> {
    let (records, report) = load_transactions(&session.cli.transactions)?;
    println!(
        "Processing dataset... ({} rows read, {} kept)",
        format_int(report.total_rows),
        format_int(report.kept_rows)
    );
    for series in monthly_reports(&records) {
        let file = session.cli.out_path(series.dimension.file_name());
        output::write_monthly(&file, &series)?;
        println!("Revenue by {} exported to {}", series.dimension, file.display());
    }

    let actual = session.tables.base_year;
    for predicted in session.tables.forecast_years() {
        let summary = dashboard_summary(&session.tables, actual, predicted)?;
        print_dashboard(&summary);
        let file = session.cli.out_path(&format!("dashboard_revenue_data_{}.csv", predicted));
        output::write_csv(&file, &summary.rows)?;
        output::write_json(
            session.cli.out_path(&format!("dashboard_summary_{}.json", predicted)),
            &summary,
        )?;
    }
    Ok(())
}

fn main() -> Result<()> {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("warn")).init();

    let cli = Cli::parse();
    let tables = cli.lookup_tables()?;
    let mut session = Session {
        cli,
        tables,
        records: None,
        prices: PriceTable::new(),
    };

    if session.cli.batch {
        return run_batch(&session);
    }

    loop {
        println!("Dashboard Revenue ICONNET");
        println!("[1] Load the files");
        println!("[2] Dashboard");
        println!("[3] Actual Data");
        println!("[4] Predictor\n");
        let Some(choice) = read_choice() else {
            println!("Exiting the program.");
            break;
        };
        let page: fn(&Session) = match choice.as_str() {
            "1" => {
                handle_load(&mut session);
                continue;
            }
            "2" => handle_dashboard,
            "3" => handle_actual_data,
            "4" => handle_predictor,
            _ => {
                println!("Invalid choice. Please enter 1 to 4.\n");
                continue;
            }
        };
        println!();
        page(&session);
        if !prompt_back_to_menu() {
            println!("Exiting the program.");
            break;
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use iconnet_revenue::aggregate;
    use iconnet_revenue::types::Dimension;

    #[test]
    fn exhausted_input_reads_as_none() {
        let mut input = io::Cursor::new("  2 \n\n");
        assert_eq!(read_line_from(&mut input, ""), Some("2".to_string()));
        assert_eq!(read_line_from(&mut input, ""), Some(String::new()));
        assert_eq!(read_line_from(&mut input, ""), None);
    }

    #[test]
    fn failed_export_is_not_reported_as_exported() {
        let dir = tempfile::tempdir().unwrap();
        let file = dir.path().join("missing").join("revenue_by_province.csv");
        let series = aggregate(&[], Dimension::Province);
        let msg = export_message(&file, output::write_monthly(&file, &series));
        assert!(msg.starts_with("Write error:"));
        assert!(!msg.contains("exported"));

        let file = dir.path().join("revenue_by_province.csv");
        let msg = export_message(&file, output::write_monthly(&file, &series));
        assert!(msg.starts_with("(Full table exported to"));
    }
}
