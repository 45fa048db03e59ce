use chrono::{Duration, NaiveDate, NaiveDateTime};
use thiserror::Error;
use tracing::debug;

/// The eight output columns of staging.online_retail, in insert order
pub const CANONICAL_COLUMNS: [&str; 8] = [
    "InvoiceNo",
    "StockCode",
    "Description",
    "Quantity",
    "InvoiceDate",
    "UnitPrice",
    "CustomerID",
    "Country",
];

#[derive(Error, Debug)]
pub enum NormalizeError {
    #[error("Missing required columns after rename: {0:?}")]
    MissingColumns(Vec<String>),
}

/// A single cell of an input file, typed as loosely as the sources are
#[derive(Debug, Clone, PartialEq)]
pub enum CellValue {
    Text(String),
    Int(i64),
    Float(f64),
    DateTime(NaiveDateTime),
    Empty,
}

/// An input file parsed into memory: one header row plus data rows.
/// Column order and spelling are whatever the source file contains.
#[derive(Debug, Clone)]
pub struct RawTable {
    pub columns: Vec<String>,
    pub rows: Vec<Vec<CellValue>>,
}

/// One row of staging.online_retail
///
/// Every field is nullable: the staging table holds the data as-is and
/// later transforms deal with blanks.
#[derive(Debug, Clone, PartialEq)]
pub struct StagingRecord {
    pub invoice_no: Option<String>,
    pub stock_code: Option<String>,
    pub description: Option<String>,
    pub quantity: Option<i64>,
    pub invoice_date: Option<NaiveDateTime>,
    pub unit_price: Option<f64>,
    pub customer_id: Option<i64>,
    pub country: Option<String>,
}

/// Map an observed header spelling to its canonical column name.
///
/// The 2009-2011 edition of the dataset uses `Invoice`, `Price` and
/// `Customer ID`; the 2010-2011 edition uses `InvoiceNo`, `UnitPrice` and
/// `CustomerID`. Canonical names map to themselves, so renaming an
/// already-normalized header is a no-op. Unknown headers pass through.
pub fn canonical_name(header: &str) -> &str {
    match header {
        "Invoice" | "InvoiceNo" => "InvoiceNo",
        "StockCode" => "StockCode",
        "Description" => "Description",
        "Quantity" => "Quantity",
        "InvoiceDate" | "InvoiceDateTime" => "InvoiceDate",
        "Price" | "UnitPrice" => "UnitPrice",
        "Customer ID" | "CustomerID" => "CustomerID",
        "Country" => "Country",
        other => other,
    }
}

/// Rename headers via the synonym table, verify all eight canonical columns
/// are present, and project to exactly those columns in canonical order.
///
/// Extra columns are dropped. Fails with [`NormalizeError::MissingColumns`]
/// naming exactly the absent columns, in canonical order.
pub fn normalize_columns(table: RawTable) -> Result<RawTable, NormalizeError> {
    let renamed: Vec<String> = table
        .columns
        .iter()
        .map(|c| canonical_name(c.trim()).to_string())
        .collect();

    let mut indices = Vec::with_capacity(CANONICAL_COLUMNS.len());
    let mut missing = Vec::new();
    for name in CANONICAL_COLUMNS {
        match renamed.iter().position(|c| c == name) {
            Some(idx) => indices.push(idx),
            None => missing.push(name.to_string()),
        }
    }

    if !missing.is_empty() {
        return Err(NormalizeError::MissingColumns(missing));
    }

    let rows = table
        .rows
        .into_iter()
        .map(|row| {
            indices
                .iter()
                .map(|&idx| row.get(idx).cloned().unwrap_or(CellValue::Empty))
                .collect()
        })
        .collect();

    debug!("Projected table to {} canonical columns", indices.len());

    Ok(RawTable {
        columns: CANONICAL_COLUMNS.iter().map(|s| s.to_string()).collect(),
        rows,
    })
}

/// Convert a column-normalized table into typed staging records.
///
/// Expects the output of [`normalize_columns`]; rows shorter than eight
/// cells are padded with nulls. The invoice date is coerced through the
/// known source formats, with unparseable values becoming `None`.
pub fn to_records(table: &RawTable) -> Vec<StagingRecord> {
    table
        .rows
        .iter()
        .map(|row| {
            let cell = |idx: usize| row.get(idx).unwrap_or(&CellValue::Empty);
            StagingRecord {
                invoice_no: cell_text(cell(0)),
                stock_code: cell_text(cell(1)),
                description: cell_text(cell(2)),
                quantity: cell_int(cell(3)),
                invoice_date: cell_datetime(cell(4)),
                unit_price: cell_float(cell(5)),
                customer_id: cell_int(cell(6)),
                country: cell_text(cell(7)),
            }
        })
        .collect()
}

/// Full normalization pipeline: rename, validate, project, type
pub fn normalize(table: RawTable) -> Result<Vec<StagingRecord>, NormalizeError> {
    let normalized = normalize_columns(table)?;
    Ok(to_records(&normalized))
}

fn cell_text(cell: &CellValue) -> Option<String> {
    match cell {
        CellValue::Text(s) => {
            let trimmed = s.trim();
            if trimmed.is_empty() {
                None
            } else {
                Some(trimmed.to_string())
            }
        }
        CellValue::Int(i) => Some(i.to_string()),
        CellValue::Float(f) => {
            if f.fract() == 0.0 {
                Some(format!("{f:.0}"))
            } else {
                Some(f.to_string())
            }
        }
        CellValue::DateTime(dt) => Some(dt.to_string()),
        CellValue::Empty => None,
    }
}

fn cell_int(cell: &CellValue) -> Option<i64> {
    match cell {
        CellValue::Int(i) => Some(*i),
        CellValue::Float(f) => Some(*f as i64),
        CellValue::Text(s) => {
            let trimmed = s.trim();
            if trimmed.is_empty() {
                return None;
            }
            trimmed
                .parse::<i64>()
                .ok()
                .or_else(|| trimmed.parse::<f64>().ok().map(|f| f as i64))
        }
        _ => None,
    }
}

fn cell_float(cell: &CellValue) -> Option<f64> {
    match cell {
        CellValue::Float(f) => Some(*f),
        CellValue::Int(i) => Some(*i as f64),
        CellValue::Text(s) => {
            let trimmed = s.trim();
            if trimmed.is_empty() {
                None
            } else {
                trimmed.parse::<f64>().ok()
            }
        }
        _ => None,
    }
}

fn cell_datetime(cell: &CellValue) -> Option<NaiveDateTime> {
    match cell {
        CellValue::DateTime(dt) => Some(*dt),
        CellValue::Text(s) => parse_datetime_str(s.trim()),
        CellValue::Float(f) => excel_serial_to_datetime(*f),
        CellValue::Int(i) => excel_serial_to_datetime(*i as f64),
        CellValue::Empty => None,
    }
}

/// Parse an invoice date string in any of the formats the two dataset
/// editions use. Returns `None` for anything unrecognized.
fn parse_datetime_str(value: &str) -> Option<NaiveDateTime> {
    const FORMATS: [&str; 4] = [
        "%Y-%m-%d %H:%M:%S",
        "%Y-%m-%d %H:%M",
        "%m/%d/%Y %H:%M",
        "%m/%d/%y %H:%M",
    ];

    for format in FORMATS {
        if let Ok(dt) = NaiveDateTime::parse_from_str(value, format) {
            return Some(dt);
        }
    }

    // Date-only cells become midnight
    NaiveDate::parse_from_str(value, "%Y-%m-%d")
        .ok()
        .and_then(|d| d.and_hms_opt(0, 0, 0))
}

/// Convert an Excel date serial number (days since 1899-12-30, fraction is
/// time of day) into a datetime
fn excel_serial_to_datetime(serial: f64) -> Option<NaiveDateTime> {
    if !serial.is_finite() || serial <= 0.0 {
        return None;
    }

    let days = serial.trunc() as i64;
    let seconds = (serial.fract() * 86_400.0).round() as i64;
    let base = NaiveDate::from_ymd_opt(1899, 12, 30)?;
    let date = base.checked_add_signed(Duration::days(days))?;
    date.and_hms_opt(0, 0, 0)
        .map(|dt| dt + Duration::seconds(seconds))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn text(s: &str) -> CellValue {
        CellValue::Text(s.to_string())
    }

    #[test]
    fn test_canonical_name_synonyms() {
        assert_eq!(canonical_name("Invoice"), "InvoiceNo");
        assert_eq!(canonical_name("InvoiceDateTime"), "InvoiceDate");
        assert_eq!(canonical_name("Price"), "UnitPrice");
        assert_eq!(canonical_name("Customer ID"), "CustomerID");
    }

    #[test]
    fn test_canonical_name_idempotent() {
        for name in CANONICAL_COLUMNS {
            assert_eq!(canonical_name(name), name);
        }
    }

    #[test]
    fn test_canonical_name_passthrough() {
        assert_eq!(canonical_name("SomethingElse"), "SomethingElse");
    }

    #[test]
    fn test_normalize_columns_reorders_and_drops_extras() {
        let table = RawTable {
            columns: vec![
                "Country".to_string(),
                "Invoice".to_string(),
                "StockCode".to_string(),
                "Description".to_string(),
                "Quantity".to_string(),
                "InvoiceDate".to_string(),
                "Price".to_string(),
                "Customer ID".to_string(),
                "Extra".to_string(),
            ],
            rows: vec![vec![
                text("France"),
                text("536365"),
                text("71053"),
                text("WHITE METAL LANTERN"),
                text("6"),
                text("2010-12-01 08:26:00"),
                text("3.39"),
                text("17850"),
                text("dropped"),
            ]],
        };

        let normalized = normalize_columns(table).unwrap();
        assert_eq!(normalized.columns, CANONICAL_COLUMNS.to_vec());
        assert_eq!(normalized.rows[0].len(), 8);
        assert_eq!(normalized.rows[0][0], text("536365"));
        assert_eq!(normalized.rows[0][7], text("France"));
    }

    #[test]
    fn test_normalize_columns_missing_reported_in_canonical_order() {
        let table = RawTable {
            columns: vec![
                "Country".to_string(),
                "Invoice".to_string(),
                "Description".to_string(),
                "InvoiceDate".to_string(),
                "Price".to_string(),
                "Customer ID".to_string(),
            ],
            rows: vec![],
        };

        match normalize_columns(table).unwrap_err() {
            NormalizeError::MissingColumns(missing) => {
                assert_eq!(missing, vec!["StockCode".to_string(), "Quantity".to_string()]);
            }
        }
    }

    #[test]
    fn test_normalize_missing_price_reports_unit_price() {
        let table = RawTable {
            columns: vec![
                "Invoice".to_string(),
                "StockCode".to_string(),
                "Description".to_string(),
                "Quantity".to_string(),
                "InvoiceDate".to_string(),
                "Customer ID".to_string(),
                "Country".to_string(),
            ],
            rows: vec![],
        };

        match normalize(table).unwrap_err() {
            NormalizeError::MissingColumns(missing) => {
                assert_eq!(missing, vec!["UnitPrice".to_string()]);
            }
        }
    }

    #[test]
    fn test_unparseable_date_becomes_none() {
        assert_eq!(cell_datetime(&text("not a date")), None);
        assert_eq!(cell_datetime(&CellValue::Empty), None);
    }

    #[test]
    fn test_parse_datetime_iso_seconds() {
        let dt = parse_datetime_str("2010-12-01 08:26:00").unwrap();
        assert_eq!(
            dt,
            NaiveDate::from_ymd_opt(2010, 12, 1)
                .unwrap()
                .and_hms_opt(8, 26, 0)
                .unwrap()
        );
    }

    #[test]
    fn test_parse_datetime_us_format() {
        let dt = parse_datetime_str("12/1/2010 8:26").unwrap();
        assert_eq!(
            dt,
            NaiveDate::from_ymd_opt(2010, 12, 1)
                .unwrap()
                .and_hms_opt(8, 26, 0)
                .unwrap()
        );
    }

    #[test]
    fn test_parse_datetime_date_only() {
        let dt = parse_datetime_str("2011-06-15").unwrap();
        assert_eq!(
            dt,
            NaiveDate::from_ymd_opt(2011, 6, 15)
                .unwrap()
                .and_hms_opt(0, 0, 0)
                .unwrap()
        );
    }

    #[test]
    fn test_excel_serial_to_datetime() {
        // 40513 is 2010-12-01
        let dt = excel_serial_to_datetime(40513.0).unwrap();
        assert_eq!(
            dt,
            NaiveDate::from_ymd_opt(2010, 12, 1)
                .unwrap()
                .and_hms_opt(0, 0, 0)
                .unwrap()
        );

        let noon = excel_serial_to_datetime(40513.5).unwrap();
        assert_eq!(noon.time(), chrono::NaiveTime::from_hms_opt(12, 0, 0).unwrap());
    }

    #[test]
    fn test_excel_serial_rejects_nonpositive() {
        assert_eq!(excel_serial_to_datetime(0.0), None);
        assert_eq!(excel_serial_to_datetime(-5.0), None);
    }

    #[test]
    fn test_cell_coercions() {
        assert_eq!(cell_int(&text("17850")), Some(17850));
        assert_eq!(cell_int(&text("17850.0")), Some(17850));
        assert_eq!(cell_int(&CellValue::Float(6.0)), Some(6));
        assert_eq!(cell_int(&text("")), None);
        assert_eq!(cell_float(&text("3.39")), Some(3.39));
        assert_eq!(cell_float(&CellValue::Int(3)), Some(3.0));
        assert_eq!(cell_text(&CellValue::Int(536365)), Some("536365".to_string()));
        assert_eq!(cell_text(&CellValue::Float(71053.0)), Some("71053".to_string()));
        assert_eq!(cell_text(&text("  ")), None);
    }

    #[test]
    fn test_normalize_end_to_end_example() {
        let table = RawTable {
            columns: vec![
                "Invoice".to_string(),
                "StockCode".to_string(),
                "Description".to_string(),
                "Quantity".to_string(),
                "InvoiceDate".to_string(),
                "Price".to_string(),
                "Customer ID".to_string(),
                "Country".to_string(),
            ],
            rows: vec![vec![
                text("536365"),
                text("71053"),
                text("WHITE METAL LANTERN"),
                CellValue::Int(6),
                text("2010-12-01 08:26:00"),
                CellValue::Float(3.39),
                CellValue::Int(17850),
                text("United Kingdom"),
            ]],
        };

        let records = normalize(table).unwrap();
        assert_eq!(records.len(), 1);

        let record = &records[0];
        assert_eq!(record.invoice_no.as_deref(), Some("536365"));
        assert_eq!(record.stock_code.as_deref(), Some("71053"));
        assert_eq!(record.description.as_deref(), Some("WHITE METAL LANTERN"));
        assert_eq!(record.quantity, Some(6));
        assert_eq!(
            record.invoice_date,
            NaiveDate::from_ymd_opt(2010, 12, 1)
                .unwrap()
                .and_hms_opt(8, 26, 0)
        );
        assert_eq!(record.unit_price, Some(3.39));
        assert_eq!(record.customer_id, Some(17850));
        assert_eq!(record.country.as_deref(), Some("United Kingdom"));
    }
}
