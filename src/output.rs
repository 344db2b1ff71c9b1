//! Report rendering and CSV export.
//!
//! The CSV is the one bit-exact contract: UTF-8 with a BOM so Excel keeps the
//! Japanese headers intact, one row per batch entry in input order, numerics
//! as decimal text. Failed rows carry the sentinel verdict plus the cause
//! string so "no investable signal" and "could not retrieve data" stay
//! distinguishable.

use std::fs::File;
use std::io::Write;

use anyhow::Result;
use csv::WriterBuilder;
use serde::Serialize;
use tracing::{debug, info};

use crate::pipeline::{BatchResult, Outcome, ResultRow};

const UTF8_BOM: &[u8] = &[0xEF, 0xBB, 0xBF];

/// Verdict shown for rows whose fetch failed.
pub const UNCLASSIFIABLE: &str = "取得不可";

/// One CSV row. Column names match the original report.
#[derive(Debug, Serialize)]
pub struct ReportRow<'a> {
    #[serde(rename = "コード")]
    pub code: &'a str,
    #[serde(rename = "略称")]
    pub name: Option<&'a str>,
    #[serde(rename = "PBR")]
    pub pbr: Option<f64>,
    #[serde(rename = "ROE")]
    pub roe: Option<f64>,
    #[serde(rename = "自己資本比率")]
    pub equity_ratio: Option<f64>,
    #[serde(rename = "流動比率")]
    pub current_ratio: Option<f64>,
    #[serde(rename = "売上成長率")]
    pub revenue_growth: Option<f64>,
    #[serde(rename = "清算価値")]
    pub liquidation_value: Option<f64>,
    #[serde(rename = "配当性向")]
    pub dividend_payout: Option<f64>,
    #[serde(rename = "時価総額")]
    pub market_cap: Option<f64>,
    #[serde(rename = "投資判断")]
    pub verdict: String,
    #[serde(rename = "エラー")]
    pub error: Option<&'a str>,
}

impl<'a> ReportRow<'a> {
    pub fn from_result(row: &'a ResultRow) -> Self {
        match &row.outcome {
            Outcome::Graded { record, grade } => ReportRow {
                code: &row.code,
                name: Some(&record.name),
                pbr: Some(record.pbr),
                roe: Some(record.roe),
                equity_ratio: Some(record.equity_ratio),
                current_ratio: record.current_ratio,
                revenue_growth: Some(record.revenue_growth),
                liquidation_value: record.liquidation_value,
                dividend_payout: Some(record.dividend_payout),
                market_cap: record.market_cap,
                verdict: grade.to_string(),
                error: None,
            },
            Outcome::Failed(err) => ReportRow {
                code: &row.code,
                name: None,
                pbr: None,
                roe: None,
                equity_ratio: None,
                current_ratio: None,
                revenue_growth: None,
                liquidation_value: None,
                dividend_payout: None,
                market_cap: None,
                verdict: UNCLASSIFIABLE.to_string(),
                error: Some(err.cause()),
            },
        }
    }
}

/// Writes the batch as CSV to any writer, BOM first.
pub fn write_report_to<W: Write>(mut writer: W, batch: &BatchResult) -> Result<()> {
    writer.write_all(UTF8_BOM)?;

    let mut csv_writer = WriterBuilder::new().from_writer(writer);
    for row in &batch.rows {
        csv_writer.serialize(ReportRow::from_result(row))?;
    }
    csv_writer.flush()?;

    Ok(())
}

/// Writes the batch report to a fresh CSV file, replacing any previous run.
pub fn write_report(path: &str, batch: &BatchResult) -> Result<()> {
    debug!(path, rows = batch.rows.len(), "Writing CSV report");
    let file = File::create(path)?;
    write_report_to(file, batch)
}

/// Logs the batch as pretty-printed JSON.
pub fn print_json(batch: &BatchResult) -> Result<()> {
    let rows: Vec<ReportRow<'_>> = batch.rows.iter().map(ReportRow::from_result).collect();
    info!("{}", serde_json::to_string_pretty(&rows)?);
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::FetchError;
    use crate::metrics::MetricRecord;
    use crate::scorer::Grade;
    use std::env;
    use std::fs;

    fn temp_path(name: &str) -> String {
        format!("{}/{}", env::temp_dir().display(), name)
    }

    fn graded_row(code: &str) -> ResultRow {
        ResultRow {
            code: code.to_string(),
            outcome: Outcome::Graded {
                record: MetricRecord {
                    name: "日本電信電話".to_string(),
                    pbr: 0.85,
                    roe: 12.5,
                    equity_ratio: 55.0,
                    revenue_growth: 8.2,
                    dividend_payout: 35.0,
                    current_ratio: Some(150.0),
                    liquidation_value: None,
                    market_cap: None,
                },
                grade: Grade::A,
            },
        }
    }

    fn failed_row(code: &str, cause: &str) -> ResultRow {
        ResultRow {
            code: code.to_string(),
            outcome: Outcome::Failed(FetchError::network(cause)),
        }
    }

    fn batch() -> BatchResult {
        BatchResult {
            started_at: chrono::Utc::now(),
            rows: vec![graded_row("9432"), failed_row("1332", "timeout")],
        }
    }

    #[test]
    fn test_report_starts_with_bom() {
        let mut buf = Vec::new();
        write_report_to(&mut buf, &batch()).unwrap();
        assert_eq!(&buf[..3], UTF8_BOM);
    }

    #[test]
    fn test_report_header_and_row_order() {
        let mut buf = Vec::new();
        write_report_to(&mut buf, &batch()).unwrap();

        let text = String::from_utf8(buf[3..].to_vec()).unwrap();
        let lines: Vec<_> = text.lines().collect();
        assert_eq!(lines.len(), 3);
        assert!(lines[0].starts_with("コード,略称,PBR,ROE"));
        assert!(lines[0].ends_with("投資判断,エラー"));
        assert!(lines[1].starts_with("9432,日本電信電話,0.85,12.5,55.0,150.0,8.2,,35.0,,A,"));
        assert!(lines[2].starts_with("1332,"));
    }

    #[test]
    fn test_numeric_values_round_trip_as_decimal_text() {
        let mut buf = Vec::new();
        write_report_to(&mut buf, &batch()).unwrap();

        let text = String::from_utf8(buf[3..].to_vec()).unwrap();
        let data_line = text.lines().nth(1).unwrap();
        let fields: Vec<_> = data_line.split(',').collect();
        assert_eq!(fields[2].parse::<f64>().unwrap(), 0.85);
        assert_eq!(fields[3].parse::<f64>().unwrap(), 12.5);
    }

    #[test]
    fn test_failed_row_has_sentinel_verdict_and_cause() {
        let mut buf = Vec::new();
        write_report_to(&mut buf, &batch()).unwrap();

        let text = String::from_utf8(buf[3..].to_vec()).unwrap();
        let failed_line = text.lines().nth(2).unwrap();
        assert!(failed_line.contains(UNCLASSIFIABLE));
        assert!(failed_line.ends_with("timeout"));
    }

    #[test]
    fn test_write_report_creates_file() {
        let path = temp_path("kabutan_analyzer_test_report.csv");
        let _ = fs::remove_file(&path); // clean up any prior run

        write_report(&path, &batch()).unwrap();

        let content = fs::read(&path).unwrap();
        assert_eq!(&content[..3], UTF8_BOM);

        fs::remove_file(&path).unwrap();
    }

    #[test]
    fn test_print_json_does_not_panic() {
        print_json(&batch()).unwrap();
    }
}
