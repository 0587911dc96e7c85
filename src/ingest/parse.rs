//! CSV parsing with per-row validation.

use std::collections::{HashMap, HashSet};
use std::fmt;

use csv::{ReaderBuilder, StringRecord, Trim};
use log::{info, warn};

use super::record::{normalize_zip, ZipRecord};
use crate::config::MAX_LOGGED_ROW_ERRORS;
use crate::error_handling::IngestError;

const COL_ZIP: &str = "zip";
const COL_TYPE: &str = "type";
const COL_DECOMMISSIONED: &str = "decommissioned";
const COL_PRIMARY_CITY: &str = "primary_city";
const COL_ACCEPTABLE_CITIES: &str = "acceptable_cities";
const COL_UNACCEPTABLE_CITIES: &str = "unacceptable_cities";
const COL_STATE: &str = "state";
const COL_COUNTY: &str = "county";
const COL_TIMEZONE: &str = "timezone";
const COL_AREA_CODES: &str = "area_codes";
const COL_WORLD_REGION: &str = "world_region";
const COL_COUNTRY: &str = "country";
const COL_LATITUDE: &str = "latitude";
const COL_LONGITUDE: &str = "longitude";
const COL_POPULATION: &str = "irs_estimated_population";

const REQUIRED_COLUMNS: &[&str] = &[COL_ZIP, COL_LATITUDE, COL_LONGITUDE];

/// Why a single row was rejected.
#[derive(Debug, Clone, PartialEq)]
pub enum RowErrorKind {
    /// The row is shorter than the header and lacks this column.
    MissingColumn(&'static str),
    InvalidZip(String),
    InvalidNumber {
        column: &'static str,
        value: String,
    },
    InvalidFlag {
        column: &'static str,
        value: String,
    },
    OutOfRange {
        column: &'static str,
        value: f64,
    },
    /// A previous row already used this ZIP code.
    DuplicateZip(String),
    /// The CSV reader could not decode the row at all.
    Malformed(String),
}

impl fmt::Display for RowErrorKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            RowErrorKind::MissingColumn(column) => write!(f, "missing column '{}'", column),
            RowErrorKind::InvalidZip(value) => write!(f, "invalid ZIP code '{}'", value),
            RowErrorKind::InvalidNumber { column, value } => {
                write!(f, "'{}' is not a number in column '{}'", value, column)
            }
            RowErrorKind::InvalidFlag { column, value } => {
                write!(f, "'{}' is not a boolean in column '{}'", value, column)
            }
            RowErrorKind::OutOfRange { column, value } => {
                write!(f, "{} is out of range for column '{}'", value, column)
            }
            RowErrorKind::DuplicateZip(zip) => write!(f, "duplicate ZIP code '{}'", zip),
            RowErrorKind::Malformed(message) => write!(f, "malformed row: {}", message),
        }
    }
}

/// A rejected data row.
#[derive(Debug, Clone, PartialEq)]
pub struct RowError {
    /// 1-based line number in the source text (the header is line 1)
    pub line: u64,
    /// Raw ZIP value of the row, when it could be read
    pub zip: Option<String>,
    pub kind: RowErrorKind,
}

impl fmt::Display for RowError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.zip {
            Some(zip) => write!(f, "line {} (zip {}): {}", self.line, zip, self.kind),
            None => write!(f, "line {}: {}", self.line, self.kind),
        }
    }
}

/// Outcome of ingesting a CSV document.
#[derive(Debug, Default)]
pub struct IngestReport {
    /// Accepted records, in source order
    pub records: Vec<ZipRecord>,
    /// Rejected rows, in source order
    pub errors: Vec<RowError>,
}

impl IngestReport {
    /// Number of data rows read, accepted or not.
    pub fn rows(&self) -> usize {
        self.records.len() + self.errors.len()
    }

    /// Logs the rejected rows (the first few individually) and a summary line.
    pub fn log_summary(&self) {
        for error in self.errors.iter().take(MAX_LOGGED_ROW_ERRORS) {
            warn!("Rejected CSV row at {}", error);
        }
        if self.errors.len() > MAX_LOGGED_ROW_ERRORS {
            warn!(
                "... and {} more rejected rows",
                self.errors.len() - MAX_LOGGED_ROW_ERRORS
            );
        }
        info!(
            "Ingested {} of {} ZIP code rows ({} rejected)",
            self.records.len(),
            self.rows(),
            self.errors.len()
        );
    }
}

/// Header name to column position.
struct Columns(HashMap<String, usize>);

impl Columns {
    fn from_header(header: &StringRecord) -> Result<Self, IngestError> {
        let map: HashMap<String, usize> = header
            .iter()
            .enumerate()
            .map(|(i, name)| (name.trim().trim_start_matches('\u{feff}').to_ascii_lowercase(), i))
            .collect();
        for column in REQUIRED_COLUMNS {
            if !map.contains_key(*column) {
                return Err(IngestError::MissingColumn(*column));
            }
        }
        Ok(Self(map))
    }

    /// Value of an optional column; absent columns read as empty.
    fn text<'r>(&self, row: &'r StringRecord, column: &str) -> &'r str {
        self.0
            .get(column)
            .and_then(|&i| row.get(i))
            .unwrap_or("")
    }

    /// Value of a column that must be present in the row.
    fn required<'r>(
        &self,
        row: &'r StringRecord,
        column: &'static str,
    ) -> Result<&'r str, RowErrorKind> {
        self.0
            .get(column)
            .and_then(|&i| row.get(i))
            .ok_or(RowErrorKind::MissingColumn(column))
    }
}

/// Parses raw CSV text into ZIP records.
///
/// Columns are matched by header name (case-insensitive), so their order is
/// free and unknown columns are ignored. `zip`, `latitude` and `longitude`
/// must be present in the header; every other column may be absent.
///
/// Each row is validated independently. A row is rejected when its ZIP is not
/// one to five digits, its coordinates do not parse or are out of range, its
/// population or decommissioned flag is malformed, or its ZIP repeats an
/// earlier row. Rejected rows are returned in [`IngestReport::errors`].
///
/// # Errors
///
/// Returns an error only when the header itself cannot be read or lacks a
/// required column.
pub fn parse_zip_csv(text: &str) -> Result<IngestReport, IngestError> {
    let mut reader = ReaderBuilder::new()
        .has_headers(true)
        .flexible(true)
        .trim(Trim::All)
        .from_reader(text.as_bytes());

    let columns = Columns::from_header(reader.headers()?)?;
    let mut report = IngestReport::default();
    let mut seen: HashSet<String> = HashSet::new();

    for (index, result) in reader.records().enumerate() {
        // Header is line 1; used when the reader cannot report a position
        let fallback_line = index as u64 + 2;
        let row = match result {
            Ok(row) => row,
            Err(e) => {
                let line = e
                    .position()
                    .map(|p| p.line())
                    .unwrap_or(fallback_line);
                report.errors.push(RowError {
                    line,
                    zip: None,
                    kind: RowErrorKind::Malformed(e.to_string()),
                });
                continue;
            }
        };
        let line = row.position().map(|p| p.line()).unwrap_or(fallback_line);

        match parse_row(&columns, &row) {
            Ok(record) => {
                if seen.insert(record.zip.clone()) {
                    report.records.push(record);
                } else {
                    report.errors.push(RowError {
                        line,
                        zip: Some(record.zip.clone()),
                        kind: RowErrorKind::DuplicateZip(record.zip),
                    });
                }
            }
            Err(kind) => {
                let zip = columns.text(&row, COL_ZIP);
                report.errors.push(RowError {
                    line,
                    zip: (!zip.is_empty()).then(|| zip.to_string()),
                    kind,
                });
            }
        }
    }

    Ok(report)
}

fn parse_row(columns: &Columns, row: &StringRecord) -> Result<ZipRecord, RowErrorKind> {
    let raw_zip = columns.required(row, COL_ZIP)?;
    let zip = normalize_zip(raw_zip).ok_or_else(|| RowErrorKind::InvalidZip(raw_zip.to_string()))?;

    let latitude = parse_coordinate(columns.required(row, COL_LATITUDE)?, COL_LATITUDE, 90.0)?;
    let longitude = parse_coordinate(columns.required(row, COL_LONGITUDE)?, COL_LONGITUDE, 180.0)?;

    let population = columns.text(row, COL_POPULATION);
    let irs_estimated_population = if population.is_empty() {
        None
    } else {
        let value = parse_number(population, COL_POPULATION)?;
        if value < 0.0 {
            return Err(RowErrorKind::OutOfRange {
                column: COL_POPULATION,
                value,
            });
        }
        Some(value)
    };

    Ok(ZipRecord {
        zip,
        kind: columns.text(row, COL_TYPE).to_string(),
        decommissioned: parse_flag(columns.text(row, COL_DECOMMISSIONED), COL_DECOMMISSIONED)?,
        primary_city: columns.text(row, COL_PRIMARY_CITY).to_string(),
        acceptable_cities: split_list(columns.text(row, COL_ACCEPTABLE_CITIES)),
        unacceptable_cities: split_list(columns.text(row, COL_UNACCEPTABLE_CITIES)),
        state: columns.text(row, COL_STATE).to_string(),
        county: columns.text(row, COL_COUNTY).to_string(),
        timezone: columns.text(row, COL_TIMEZONE).to_string(),
        area_codes: dedup(split_list(columns.text(row, COL_AREA_CODES))),
        world_region: columns.text(row, COL_WORLD_REGION).to_string(),
        country: columns.text(row, COL_COUNTRY).to_string(),
        latitude,
        longitude,
        irs_estimated_population,
    })
}

fn parse_number(value: &str, column: &'static str) -> Result<f64, RowErrorKind> {
    match value.parse::<f64>() {
        Ok(n) if n.is_finite() => Ok(n),
        _ => Err(RowErrorKind::InvalidNumber {
            column,
            value: value.to_string(),
        }),
    }
}

fn parse_coordinate(value: &str, column: &'static str, limit: f64) -> Result<f64, RowErrorKind> {
    let n = parse_number(value, column)?;
    if n.abs() > limit {
        return Err(RowErrorKind::OutOfRange { column, value: n });
    }
    Ok(n)
}

fn parse_flag(value: &str, column: &'static str) -> Result<bool, RowErrorKind> {
    match value.to_ascii_lowercase().as_str() {
        "" | "0" | "false" | "no" => Ok(false),
        "1" | "true" | "yes" => Ok(true),
        _ => Err(RowErrorKind::InvalidFlag {
            column,
            value: value.to_string(),
        }),
    }
}

/// Splits a comma-separated cell ("Brookhaven, Medford") into trimmed names.
fn split_list(value: &str) -> Vec<String> {
    value
        .split(',')
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .map(String::from)
        .collect()
}

/// Removes repeated entries, keeping first occurrences in order.
fn dedup(values: Vec<String>) -> Vec<String> {
    let mut seen = HashSet::new();
    values.into_iter().filter(|v| seen.insert(v.clone())).collect()
}
