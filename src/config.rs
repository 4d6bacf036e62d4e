use crate::error::RevenueResult;
use crate::estimator::EstimatorMode;
use crate::tables::LookupTables;
use clap::Parser;
use std::path::PathBuf;

#[derive(Debug, Clone, Parser)]
#[command(name = "iconnet-revenue", about = "Revenue dashboard and what-if predictor")]
pub struct Cli {
    /// Transaction export (CSV)
    #[arg(long, default_value = "iconnet-revenue.csv")]
    pub transactions: PathBuf,

    /// Plan price forecast table (CSV with pred_harga_<YEAR> columns)
    #[arg(long, default_value = "pred_hargaproduk.csv")]
    pub prices: PathBuf,

    /// JSON file replacing the built-in province revenue tables
    #[arg(long)]
    pub tables: Option<PathBuf>,

    /// Directory the exported reports are written to
    #[arg(long, default_value = ".")]
    pub out_dir: PathBuf,

    #[arg(long, value_enum, default_value_t = EstimatorMode::Historical)]
    pub mode: EstimatorMode,

    /// Load, export every report and exit without prompting
    #[arg(long)]
    pub batch: bool,
}

impl Cli {
    pub fn lookup_tables(&self) -> RevenueResult<LookupTables> {
        match &self.tables {
            Some(path) => LookupTables::from_json_file(path),
            None => Ok(LookupTables::builtin().clone()),
        }
    }

    pub fn out_path(&self, file_name: &str) -> PathBuf {
        self.out_dir.join(file_name)
    }
}
