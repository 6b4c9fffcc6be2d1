// src/services/csv_prices.rs
use anyhow::{Context, Result};
use chrono::NaiveDate;
use csv::{Reader, Writer};
use log::info;
use std::fs::File;
use std::io::{Read, Write};
use std::path::Path;

use crate::error::PortfolioError;
use crate::models::PriceTable;

const DATE_FORMAT: &str = "%Y-%m-%d";

pub fn load_price_file(path: &Path) -> Result<PriceTable> {
    info!("Loading price CSV from {}", path.display());
    let file = File::open(path).with_context(|| format!("Failed to open {}", path.display()))?;
    let table = read_price_csv(file).with_context(|| format!("Failed to read {}", path.display()))?;
    info!(
        "Loaded {} dates x {} tickers",
        table.len(),
        table.tickers().len()
    );
    Ok(table)
}

/// Wide layout: a `date` column followed by one column per ticker. Empty
/// cells are missing prices.
pub fn read_price_csv<R: Read>(reader: R) -> Result<PriceTable> {
    let mut rdr = Reader::from_reader(reader);

    let headers = rdr.headers()?.clone();
    let mut fields = headers.iter().map(str::trim);
    match fields.next() {
        Some(first) if first.eq_ignore_ascii_case("date") => {}
        _ => return Err(PortfolioError::new("First CSV column must be 'date'").into()),
    }
    let tickers: Vec<String> = fields.map(str::to_string).collect();

    let mut dates = Vec::new();
    let mut columns = vec![Vec::new(); tickers.len()];
    for (line, record) in rdr.records().enumerate() {
        let row = record?;
        let raw_date = row.get(0).unwrap_or_default().trim();
        let date = NaiveDate::parse_from_str(raw_date, DATE_FORMAT)
            .with_context(|| format!("Bad date {:?} on data row {}", raw_date, line + 1))?;
        dates.push(date);

        for (i, column) in columns.iter_mut().enumerate() {
            let cell = row.get(i + 1).unwrap_or_default().trim();
            let price = if cell.is_empty() || cell.eq_ignore_ascii_case("nan") {
                f64::NAN
            } else {
                cell.parse::<f64>().with_context(|| {
                    format!("Bad price {:?} for {} on {}", cell, tickers[i], raw_date)
                })?
            };
            column.push(price);
        }
    }

    Ok(PriceTable::new(dates, tickers, columns)?)
}

pub fn write_price_csv<W: Write>(table: &PriceTable, writer: W) -> Result<()> {
    let mut wtr = Writer::from_writer(writer);

    let mut header = vec!["date".to_string()];
    header.extend(table.tickers().iter().cloned());
    wtr.write_record(&header)?;

    let columns = table
        .tickers()
        .iter()
        .map(|t| table.column(t))
        .collect::<Result<Vec<_>, _>>()?;

    for (row, date) in table.dates().iter().enumerate() {
        let mut record = vec![date.format(DATE_FORMAT).to_string()];
        record.extend(columns.iter().map(|c| {
            let price = c[row];
            if price.is_nan() {
                String::new()
            } else {
                price.to_string()
            }
        }));
        wtr.write_record(&record)?;
    }

    wtr.flush()?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    const CSV: &str = "date,AAA,BBB\n2022-11-21,10.0,20.5\n2022-11-22,,21\n2022-11-23,11.5,NaN\n";

    #[test]
    fn test_read_price_csv() {
        let table = read_price_csv(CSV.as_bytes()).unwrap();
        assert_eq!(table.tickers(), &["AAA".to_string(), "BBB".to_string()]);
        assert_eq!(table.len(), 3);
        let a = table.column("AAA").unwrap();
        assert_eq!(a[0], 10.0);
        assert!(a[1].is_nan());
        assert!(table.column("BBB").unwrap()[2].is_nan());
    }

    #[test]
    fn test_write_then_read_keeps_missing_cells() {
        let table = read_price_csv(CSV.as_bytes()).unwrap();
        let mut out = Vec::new();
        write_price_csv(&table, &mut out).unwrap();
        let text = String::from_utf8(out).unwrap();
        assert!(text.starts_with("date,AAA,BBB\n2022-11-21,10,20.5\n2022-11-22,,21\n"));
        assert_eq!(read_price_csv(text.as_bytes()).unwrap().dates(), table.dates());
    }

    #[test]
    fn test_rejects_missing_date_column() {
        assert!(read_price_csv("AAA,BBB\n1,2\n".as_bytes()).is_err());
    }

    #[test]
    fn test_rejects_bad_price() {
        let err = read_price_csv("date,AAA\n2022-11-21,abc\n".as_bytes()).unwrap_err();
        assert!(format!("{:#}", err).contains("AAA"));
    }
}
