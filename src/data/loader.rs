use std::io::Read;
use std::path::Path;

use anyhow::{bail, Context, Result};
use arrow::array::{Array, ArrayRef, Float32Array, Float64Array, Int32Array, Int64Array};
use parquet::arrow::arrow_reader::ParquetRecordBatchReaderBuilder;
use serde_json::Value as JsonValue;

use super::model::Spectrum;
use crate::error::AnalysisError;

/// Header of the wavenumber column (case-sensitive).
pub const WAVENUMBER_COLUMN: &str = "Wavelength";
/// Header of the absorbance column (case-sensitive).
pub const ABSORBANCE_COLUMN: &str = "Absorbance";

// ---------------------------------------------------------------------------
// Public entry-points
// ---------------------------------------------------------------------------

/// Load a spectrum from a file.  Dispatch by extension.
///
/// Supported formats:
/// * `.csv`     – header row with `Wavelength` and `Absorbance` columns
/// * `.json`    – `[{ "Wavelength": .., "Absorbance": .. }, ...]` or
///                `{ "Wavelength": [...], "Absorbance": [...] }`
/// * `.parquet` – numeric `Wavelength` and `Absorbance` columns
///
/// Every failure surfaces as [`AnalysisError::InputFormat`].
pub fn load_file(path: &Path) -> crate::Result<Spectrum> {
    let ext = path
        .extension()
        .and_then(|e| e.to_str())
        .unwrap_or("")
        .to_ascii_lowercase();

    let columns = match ext.as_str() {
        "parquet" | "pq" => load_parquet(path),
        "json" => load_json(path),
        "csv" => std::fs::File::open(path)
            .with_context(|| format!("opening {}", path.display()))
            .and_then(read_csv_columns),
        other => Err(anyhow::anyhow!("Unsupported file extension: .{other}")),
    }
    .map_err(AnalysisError::input_format)?;

    let (x, y) = columns;
    let spectrum = Spectrum::new(x, y)?;
    log::info!("Loaded {} samples from {}", spectrum.len(), path.display());
    Ok(spectrum)
}

/// Parse CSV text (with header row) from any reader.
pub fn read_csv<R: Read>(reader: R) -> crate::Result<Spectrum> {
    let (x, y) = read_csv_columns(reader).map_err(AnalysisError::input_format)?;
    Spectrum::new(x, y)
}

type Columns = (Vec<f64>, Vec<f64>);

// ---------------------------------------------------------------------------
// CSV loader
// ---------------------------------------------------------------------------

/// CSV layout: header row with column names. Columns other than
/// `Wavelength` and `Absorbance` are ignored.
fn read_csv_columns<R: Read>(reader: R) -> Result<Columns> {
    let mut reader = csv::Reader::from_reader(reader);
    let headers: Vec<String> = reader
        .headers()
        .context("reading CSV headers")?
        .iter()
        .map(|h| h.trim().to_string())
        .collect();

    let x_idx = headers
        .iter()
        .position(|h| h == WAVENUMBER_COLUMN)
        .with_context(|| format!("CSV missing '{WAVENUMBER_COLUMN}' column"))?;
    let y_idx = headers
        .iter()
        .position(|h| h == ABSORBANCE_COLUMN)
        .with_context(|| format!("CSV missing '{ABSORBANCE_COLUMN}' column"))?;

    let mut x = Vec::new();
    let mut y = Vec::new();

    for (row_no, result) in reader.records().enumerate() {
        let record = result.with_context(|| format!("CSV row {row_no}"))?;
        x.push(parse_cell(record.get(x_idx), row_no, WAVENUMBER_COLUMN)?);
        y.push(parse_cell(record.get(y_idx), row_no, ABSORBANCE_COLUMN)?);
    }

    Ok((x, y))
}

fn parse_cell(cell: Option<&str>, row: usize, col: &str) -> Result<f64> {
    let tok = cell.unwrap_or("").trim();
    tok.parse::<f64>()
        .with_context(|| format!("Row {row}, {col}: '{tok}' is not a number"))
}

// ---------------------------------------------------------------------------
// JSON loader
// ---------------------------------------------------------------------------

/// Accepts the two layouts pandas produces:
///
/// ```json
/// [ { "Wavelength": 4000.0, "Absorbance": 0.12 }, ... ]      // orient='records'
/// { "Wavelength": [4000.0, ...], "Absorbance": [0.12, ...] }  // orient='list'
/// ```
fn load_json(path: &Path) -> Result<Columns> {
    let text = std::fs::read_to_string(path).context("reading JSON file")?;
    let root: JsonValue = serde_json::from_str(&text).context("parsing JSON")?;
    json_columns(&root)
}

fn json_columns(root: &JsonValue) -> Result<Columns> {
    match root {
        JsonValue::Array(records) => {
            let mut x = Vec::with_capacity(records.len());
            let mut y = Vec::with_capacity(records.len());
            for (i, rec) in records.iter().enumerate() {
                let obj = rec
                    .as_object()
                    .with_context(|| format!("Row {i} is not a JSON object"))?;
                x.push(json_number(obj.get(WAVENUMBER_COLUMN), i, WAVENUMBER_COLUMN)?);
                y.push(json_number(obj.get(ABSORBANCE_COLUMN), i, ABSORBANCE_COLUMN)?);
            }
            Ok((x, y))
        }
        JsonValue::Object(obj) => {
            let x = json_number_array(obj.get(WAVENUMBER_COLUMN), WAVENUMBER_COLUMN)?;
            let y = json_number_array(obj.get(ABSORBANCE_COLUMN), ABSORBANCE_COLUMN)?;
            Ok((x, y))
        }
        _ => bail!("Expected a JSON array of records or an object of columns"),
    }
}

fn json_number(val: Option<&JsonValue>, row: usize, col: &str) -> Result<f64> {
    val.with_context(|| format!("Row {row}: missing '{col}'"))?
        .as_f64()
        .with_context(|| format!("Row {row}, {col}: not a number"))
}

fn json_number_array(val: Option<&JsonValue>, col: &str) -> Result<Vec<f64>> {
    let arr = val
        .and_then(|v| v.as_array())
        .with_context(|| format!("missing or invalid '{col}' array"))?;

    arr.iter()
        .enumerate()
        .map(|(j, v)| {
            v.as_f64()
                .with_context(|| format!("{col}[{j}]: not a number"))
        })
        .collect()
}

// ---------------------------------------------------------------------------
// Parquet loader
// ---------------------------------------------------------------------------

/// Load a Parquet file with one row per sample.
///
/// `Wavelength` and `Absorbance` may be Float64, Float32, Int64 or Int32;
/// other columns are ignored. Works with files written by both **Pandas**
/// (`df.to_parquet()`) and **Polars** (`df.write_parquet()`).
fn load_parquet(path: &Path) -> Result<Columns> {
    let file = std::fs::File::open(path).context("opening parquet file")?;
    let builder = ParquetRecordBatchReaderBuilder::try_new(file)
        .context("reading parquet metadata")?;
    let reader = builder.build().context("building parquet reader")?;

    let mut x = Vec::new();
    let mut y = Vec::new();

    for batch_result in reader {
        let batch = batch_result.context("reading parquet record batch")?;
        let schema = batch.schema();

        let x_idx = schema
            .index_of(WAVENUMBER_COLUMN)
            .map_err(|_| anyhow::anyhow!("Parquet file missing '{WAVENUMBER_COLUMN}' column"))?;
        let y_idx = schema
            .index_of(ABSORBANCE_COLUMN)
            .map_err(|_| anyhow::anyhow!("Parquet file missing '{ABSORBANCE_COLUMN}' column"))?;

        extend_numeric(&mut x, batch.column(x_idx), WAVENUMBER_COLUMN)?;
        extend_numeric(&mut y, batch.column(y_idx), ABSORBANCE_COLUMN)?;
    }

    Ok((x, y))
}

/// Append every value of a numeric Arrow column, rejecting nulls.
fn extend_numeric(out: &mut Vec<f64>, col: &ArrayRef, name: &str) -> Result<()> {
    if col.null_count() > 0 {
        bail!("column '{name}' contains {} null values", col.null_count());
    }

    let any = col.as_any();
    if let Some(arr) = any.downcast_ref::<Float64Array>() {
        out.extend(arr.values().iter().copied());
    } else if let Some(arr) = any.downcast_ref::<Float32Array>() {
        out.extend(arr.values().iter().map(|&v| v as f64));
    } else if let Some(arr) = any.downcast_ref::<Int64Array>() {
        out.extend(arr.values().iter().map(|&v| v as f64));
    } else if let Some(arr) = any.downcast_ref::<Int32Array>() {
        out.extend(arr.values().iter().map(|&v| v as f64));
    } else {
        bail!(
            "column '{name}' has type {:?}, expected a numeric column",
            col.data_type()
        );
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    use std::sync::Arc;

    use arrow::datatypes::{DataType, Field, Schema};
    use arrow::record_batch::RecordBatch;
    use parquet::arrow::ArrowWriter;

    fn temp_path(name: &str) -> std::path::PathBuf {
        std::env::temp_dir().join(format!("ftir-loader-{}-{name}", std::process::id()))
    }

    #[test]
    fn test_csv_reads_named_columns_and_ignores_extras() {
        let text = "Sample,Wavelength,Absorbance\nA,1000,0.1\nA,1020,0.9\nA,1040,0.1\n";
        let sp = read_csv(text.as_bytes()).unwrap();
        assert_eq!(sp.wavenumbers(), &[1000.0, 1020.0, 1040.0]);
        assert_eq!(sp.absorbance(), &[0.1, 0.9, 0.1]);
    }

    #[test]
    fn test_csv_header_is_case_sensitive() {
        let text = "wavelength,absorbance\n1000,0.1\n";
        let err = read_csv(text.as_bytes()).unwrap_err();
        assert!(matches!(err, AnalysisError::InputFormat(_)));
        assert!(err.to_string().contains("Wavelength"), "got: {err}");
    }

    #[test]
    fn test_csv_rejects_non_numeric_cell() {
        let text = "Wavelength,Absorbance\n1000,0.1\n1020,abc\n";
        let err = read_csv(text.as_bytes()).unwrap_err();
        assert!(err.to_string().contains("'abc' is not a number"), "got: {err}");
    }

    #[test]
    fn test_json_records_and_columns() {
        let records: JsonValue = serde_json::json!([
            { "Wavelength": 1000.0, "Absorbance": 0.1 },
            { "Wavelength": 1020.0, "Absorbance": 0.9 }
        ]);
        let (x, y) = json_columns(&records).unwrap();
        assert_eq!(x, vec![1000.0, 1020.0]);
        assert_eq!(y, vec![0.1, 0.9]);

        let columns: JsonValue = serde_json::json!({
            "Wavelength": [1000.0, 1020.0],
            "Absorbance": [0.1, 0.9]
        });
        assert_eq!(json_columns(&columns).unwrap(), (x, y));
    }

    #[test]
    fn test_json_missing_column() {
        let records: JsonValue = serde_json::json!([{ "Wavelength": 1000.0 }]);
        let err = json_columns(&records).unwrap_err();
        assert!(format!("{err:#}").contains("missing 'Absorbance'"));
    }

    #[test]
    fn test_unsupported_extension() {
        let err = load_file(Path::new("spectrum.xlsx")).unwrap_err();
        assert!(err.to_string().contains("Unsupported file extension"), "got: {err}");
    }

    #[test]
    fn test_parquet_round_trip_through_file() {
        let schema = Arc::new(Schema::new(vec![
            Field::new(WAVENUMBER_COLUMN, DataType::Float64, false),
            Field::new(ABSORBANCE_COLUMN, DataType::Float32, false),
        ]));
        let batch = RecordBatch::try_new(
            schema.clone(),
            vec![
                Arc::new(Float64Array::from(vec![1000.0, 1020.0, 1040.0])),
                Arc::new(Float32Array::from(vec![0.25f32, 0.5, 0.25])),
            ],
        )
        .unwrap();

        let path = temp_path("spectrum.parquet");
        let file = std::fs::File::create(&path).unwrap();
        let mut writer = ArrowWriter::try_new(file, schema, None).unwrap();
        writer.write(&batch).unwrap();
        writer.close().unwrap();

        let sp = load_file(&path).unwrap();
        std::fs::remove_file(&path).ok();
        assert_eq!(sp.wavenumbers(), &[1000.0, 1020.0, 1040.0]);
        assert_eq!(sp.absorbance(), &[0.25, 0.5, 0.25]);
    }
}
