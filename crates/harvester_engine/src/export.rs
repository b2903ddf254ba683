use std::fs::File;
use std::path::{Path, PathBuf};

use harvester_core::MovieRecord;

/// Output format selector, the fixed enumeration callers choose from.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ExportFormat {
    /// Delimited text.
    Csv,
    /// Structured text: a JSON array of records.
    Json,
    /// Spreadsheet workbook.
    Xlsx,
    /// Embedded relational store: a SQLite database file.
    Sqlite,
}

impl ExportFormat {
    /// Conventional file extension for the format.
    pub fn extension(&self) -> &'static str {
        match self {
            ExportFormat::Csv => "csv",
            ExportFormat::Json => "json",
            ExportFormat::Xlsx => "xlsx",
            ExportFormat::Sqlite => "sqlite",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ExportSummary {
    pub rows: usize,
    pub path: PathBuf,
}

#[derive(Debug, thiserror::Error)]
pub enum ExportError {
    #[error("io error: {0}")]
    Io(#[from] std::io::Error),
    #[error("csv error: {0}")]
    Csv(#[from] csv::Error),
    #[error("json error: {0}")]
    Json(#[from] serde_json::Error),
    #[error("spreadsheet error: {0}")]
    Xlsx(#[from] rust_xlsxwriter::XlsxError),
    #[error("sqlite error: {0}")]
    Sqlite(#[from] rusqlite::Error),
}

/// Writes the record set to `path` in the chosen format.
///
/// Pure format translation: the record sequence is emitted as-is, in order.
pub fn export_records(
    records: &[MovieRecord],
    format: ExportFormat,
    path: &Path,
) -> Result<ExportSummary, ExportError> {
    match format {
        ExportFormat::Csv => write_csv(records, path)?,
        ExportFormat::Json => write_json(records, path)?,
        ExportFormat::Xlsx => write_xlsx(records, path)?,
        ExportFormat::Sqlite => write_sqlite(records, path)?,
    }
    Ok(ExportSummary {
        rows: records.len(),
        path: path.to_path_buf(),
    })
}

/// The Adult column exists only when the harvest carried the flag. Records
/// of one harvest are uniform, so the first record decides.
fn has_adult_column(records: &[MovieRecord]) -> bool {
    records.first().is_some_and(|record| record.adult.is_some())
}

fn header(adult: bool) -> Vec<&'static str> {
    let mut columns = vec!["Title", "Year", "Rating", "Description", "Genre"];
    if adult {
        columns.push("Adult");
    }
    columns
}

fn write_csv(records: &[MovieRecord], path: &Path) -> Result<(), ExportError> {
    let adult = has_adult_column(records);
    let mut writer = csv::Writer::from_path(path)?;
    writer.write_record(header(adult))?;
    for record in records {
        let mut row = vec![
            record.title.clone(),
            record.year.clone(),
            record.rating.to_string(),
            record.description.clone(),
            record.genre.clone(),
        ];
        if let Some(flag) = record.adult {
            row.push(flag.to_string());
        }
        writer.write_record(&row)?;
    }
    writer.flush()?;
    Ok(())
}

fn write_json(records: &[MovieRecord], path: &Path) -> Result<(), ExportError> {
    let file = File::create(path)?;
    serde_json::to_writer_pretty(file, records)?;
    Ok(())
}

fn write_xlsx(records: &[MovieRecord], path: &Path) -> Result<(), ExportError> {
    let adult = has_adult_column(records);
    let mut workbook = rust_xlsxwriter::Workbook::new();
    let sheet = workbook.add_worksheet();

    for (col, name) in header(adult).iter().enumerate() {
        sheet.write_string(0, col as u16, *name)?;
    }
    for (index, record) in records.iter().enumerate() {
        let row = (index + 1) as u32;
        sheet.write_string(row, 0, &record.title)?;
        sheet.write_string(row, 1, &record.year)?;
        sheet.write_number(row, 2, record.rating)?;
        sheet.write_string(row, 3, &record.description)?;
        sheet.write_string(row, 4, &record.genre)?;
        if let Some(flag) = record.adult {
            sheet.write_boolean(row, 5, flag)?;
        }
    }
    workbook.save(path)?;
    Ok(())
}

fn write_sqlite(records: &[MovieRecord], path: &Path) -> Result<(), ExportError> {
    let adult = has_adult_column(records);
    let mut conn = rusqlite::Connection::open(path)?;
    // Replace the table wholesale, like every other format's output file.
    conn.execute("DROP TABLE IF EXISTS movies", [])?;
    let schema = if adult {
        "CREATE TABLE movies (Title TEXT, Year TEXT, Rating REAL, Description TEXT, Genre TEXT, Adult INTEGER)"
    } else {
        "CREATE TABLE movies (Title TEXT, Year TEXT, Rating REAL, Description TEXT, Genre TEXT)"
    };
    conn.execute(schema, [])?;

    let tx = conn.transaction()?;
    {
        if adult {
            let mut stmt = tx.prepare("INSERT INTO movies VALUES (?1, ?2, ?3, ?4, ?5, ?6)")?;
            for record in records {
                stmt.execute(rusqlite::params![
                    record.title,
                    record.year,
                    record.rating,
                    record.description,
                    record.genre,
                    record.adult,
                ])?;
            }
        } else {
            let mut stmt = tx.prepare("INSERT INTO movies VALUES (?1, ?2, ?3, ?4, ?5)")?;
            for record in records {
                stmt.execute(rusqlite::params![
                    record.title,
                    record.year,
                    record.rating,
                    record.description,
                    record.genre,
                ])?;
            }
        }
    }
    tx.commit()?;
    Ok(())
}
