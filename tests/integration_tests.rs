use chrono::NaiveDate;
use iconnet_revenue::*;
use std::io::Write;

fn bali_records() -> Vec<TransactionRecord> {
    (1..=3)
        .map(|m| {
            TransactionRecord::new(
                NaiveDate::from_ymd_opt(2023, m, 15).unwrap(),
                "BALI",
                "ICONNET 10 MBPS",
                "iconplus",
                "Made",
                Some(140_000.0),
                Some(1),
            )
        })
        .collect()
}

fn bali_request(subscription_length: u32, num_customers: u32) -> EstimateRequest {
    EstimateRequest {
        year: Some(2024),
        province: "BALI".into(),
        product: "ICONNET 10 MBPS".into(),
        agent: "iconplus".into(),
        subscription_length,
        num_customers,
    }
}

#[test]
fn test_bali_end_to_end_estimate() {
    let records = bali_records();
    let est = estimate(&bali_request(3, 2), &records, LookupTables::builtin()).unwrap();

    assert_eq!(est.matched_records, 3);
    assert_eq!(est.monthly_rate, Some(140_000.0));
    let factor = est.scaling_factor.unwrap();
    assert!((factor - 9_881_050_833.0 / 9_086_408_000.0).abs() < 1e-12);
    assert!((factor - 1.0875).abs() < 1e-3);

    let expected = 140_000.0 * factor * 3.0 * 2.0;
    assert!((est.value - expected).abs() < 1e-6);
    // ~913,700 with the factor rounded to 1.0875
    assert!((est.value - 913_700.0).abs() / 913_700.0 < 1e-3);
}

#[test]
fn test_selectors_match_after_normalisation() {
    let records = bali_records();
    let mut req = bali_request(1, 1);
    req.province = " bali".into();
    req.product = "iconnet  10 mbps".into();
    req.agent = "ICONPLUS ".into();
    let est = estimate(&req, &records, LookupTables::builtin()).unwrap();
    assert_eq!(est.province, "BALI");
    assert!(est.has_history());
}

#[test]
fn test_comparison_sign_follows_estimate() {
    let records = bali_records();
    let est = estimate(&bali_request(3, 2), &records, LookupTables::builtin()).unwrap();
    let cmp = compare(&est, &records).unwrap();

    // every group mean is 140,000 and the estimate is far above it
    for d in [cmp.product, cmp.province, cmp.agent] {
        assert_eq!(d.mean, 140_000.0);
        assert!(d.pct > 0.0);
        assert_eq!(d.performance, Performance::Over);
    }
}

#[test]
fn test_custom_tables_with_zero_base_year() {
    let json = r#"{
        "base_year": 2023,
        "actual": {"BALI": {"2023": 0}},
        "predicted": {"BALI": {"2024": 9881050833}}
    }"#;
    let tables = LookupTables::from_json_str(json).unwrap();
    let result = estimate(&bali_request(3, 2), &bali_records(), &tables);
    assert!(matches!(result, Err(RevenueError::Division(_))));
}

#[test]
fn test_load_files_and_export_monthly_pivots() {
    let dir = tempfile::tempdir().unwrap();

    let tx_path = dir.path().join("iconnet-revenue.csv");
    let mut f = std::fs::File::create(&tx_path).unwrap();
    writeln!(f, "tanggal,namakp,namaproduk,mitraagen,ae,totalharga,lamalangganan").unwrap();
    writeln!(f, "2023-01-03,BALI,ICONNET 10 MBPS,iconplus,Made,\"140,000\",1").unwrap();
    writeln!(f, "2023-01-20,NUSA TENGGARA BARAT,ICONNET 20 MBPS,mitra ntb,Lalu,\"400,000\",2").unwrap();
    writeln!(f, "2023-02-11,BALI,ICONNET 10 MBPS,iconplus,Made,\"280,000\",2").unwrap();
    drop(f);

    let price_path = dir.path().join("pred_hargaproduk.csv");
    std::fs::write(
        &price_path,
        "namakp,namaproduk,mitraagen,pred_harga_2024,pred_harga_2025,pred_harga_2026\n\
         BALI,ICONNET 10 MBPS,iconplus,\"150,000\",\"155,000\",\"160,000\"\n",
    )
    .unwrap();

    let (records, report) = load_transactions(&tx_path).unwrap();
    assert_eq!(report.kept_rows, 3);
    let (prices, _) = load_price_table(&price_path).unwrap();

    let by_province = aggregate(&records, Dimension::Province);
    assert_eq!(by_province.value("2023-01", "BALI"), 140_000.0);
    assert_eq!(by_province.value("2023-02", "NUSA TENGGARA BARAT"), 0.0);
    assert!(by_province.rows["2023-02"].contains_key("NUSA TENGGARA BARAT"));

    let out = dir.path().join(Dimension::Province.file_name());
    output::write_monthly(&out, &by_province).unwrap();
    let text = std::fs::read_to_string(&out).unwrap();
    assert_eq!(
        text,
        "month,BALI,NUSA TENGGARA BARAT\n2023-01,140000,400000\n2023-02,280000,0\n"
    );

    let historical = Estimator {
        mode: EstimatorMode::Historical,
        records: &records,
        tables: LookupTables::builtin(),
        prices: &prices,
    };
    // (140,000 + 280,000) / 2 over (1 + 2) / 2 months
    let est = historical.run(&bali_request(1, 1)).unwrap();
    assert_eq!(est.monthly_rate, Some(140_000.0));

    let flat = Estimator {
        mode: EstimatorMode::FlatPrice,
        ..historical
    };
    let est = flat.run(&bali_request(3, 2)).unwrap();
    assert_eq!(est.value, 900_000.0);
}

#[test]
fn test_dashboard_export() {
    let dir = tempfile::tempdir().unwrap();
    let summary = dashboard_summary(LookupTables::builtin(), 2022, 2026).unwrap();
    let path = dir.path().join("dashboard_revenue_data.csv");
    output::write_csv(&path, &summary.rows).unwrap();

    let text = std::fs::read_to_string(&path).unwrap();
    let mut lines = text.lines();
    assert_eq!(
        lines.next().unwrap(),
        "Province,Actual Year,Predicted Year,Actual Revenue,Predicted Revenue,Percentage Change"
    );
    assert_eq!(lines.count(), 3);
}

#[test]
fn test_carry_forward_table_feeds_flat_price_mode() {
    let mut history = std::collections::BTreeMap::new();
    history.insert(
        PlanKey::new("BALI", "ICONNET 10 MBPS", "iconplus"),
        vec![(2022, 130_000.0), (2023, 140_000.0)],
    );
    let prices = build_price_table(&history, &[2024, 2025, 2026], &CarryForwardForecaster);
    let mut req = bali_request(2, 5);
    req.year = Some(2026);
    let est = estimate_flat_price(&req, &prices).unwrap();
    assert_eq!(est.value, 140_000.0 * 2.0 * 5.0);
}
