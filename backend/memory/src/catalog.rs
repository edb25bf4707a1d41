//! The fixed reference catalog, loaded once from CSV.
//!
//! The file needs a header row with a `text` column. Every other column is
//! carried through as metadata: integer and float cells become JSON numbers,
//! empty cells become `null`, anything else stays a string.

use std::fs::File;
use std::io::Read;
use std::path::Path;

use greenlens_core::{LensError, LensResult};
use serde_json::{Map, Number, Value};
use tracing::info;

use crate::types::CatalogEntry;

const TEXT_COLUMN: &str = "text";

#[derive(Debug, Clone, Default, PartialEq)]
pub struct Catalog {
    entries: Vec<CatalogEntry>,
}

impl Catalog {
    pub fn new(entries: Vec<CatalogEntry>) -> Self {
        Self { entries }
    }

    pub fn from_csv_path(path: &Path) -> LensResult<Self> {
        let file = File::open(path).map_err(|e| {
            LensError::CatalogError(format!("cannot open {}: {e}", path.display()))
        })?;
        let catalog = Self::from_reader(file)?;
        info!(path = %path.display(), entries = catalog.len(), "Loaded catalog");
        Ok(catalog)
    }

    pub fn from_reader<R: Read>(reader: R) -> LensResult<Self> {
        let mut rdr = csv::ReaderBuilder::new()
            .trim(csv::Trim::Headers)
            .from_reader(reader);
        let headers = rdr
            .headers()
            .map_err(|e| LensError::CatalogError(format!("unreadable header: {e}")))?
            .clone();
        let text_at = headers
            .iter()
            .position(|h| h == TEXT_COLUMN)
            .ok_or_else(|| LensError::CatalogError("missing `text` column".to_string()))?;

        let mut entries = Vec::new();
        for (row, record) in rdr.records().enumerate() {
            let record = record
                .map_err(|e| LensError::CatalogError(format!("row {}: {e}", row + 1)))?;
            let mut metadata = Map::new();
            for (column, (name, cell)) in headers.iter().zip(record.iter()).enumerate() {
                if column != text_at {
                    metadata.insert(name.to_string(), cell_value(cell));
                }
            }
            let text = record.get(text_at).unwrap_or_default().to_string();
            entries.push(CatalogEntry { text, metadata });
        }
        Ok(Self { entries })
    }

    pub fn entries(&self) -> &[CatalogEntry] {
        &self.entries
    }

    pub fn get(&self, row: usize) -> Option<&CatalogEntry> {
        self.entries.get(row)
    }

    pub fn texts(&self) -> Vec<&str> {
        self.entries.iter().map(|e| e.text.as_str()).collect()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

fn cell_value(raw: &str) -> Value {
    let trimmed = raw.trim();
    if trimmed.is_empty() {
        return Value::Null;
    }
    if let Ok(int) = trimmed.parse::<i64>() {
        return Value::from(int);
    }
    if let Some(float) = trimmed.parse::<f64>().ok().and_then(Number::from_f64) {
        return Value::Number(float);
    }
    Value::String(raw.to_string())
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn loads_text_and_typed_metadata() {
        let csv = "id,text,price,brand,rating\n\
                   1,solar panel kit,199.5,Sunly,\n\
                   2,wind turbine blade,1200,\"Gale, Inc\",4\n";
        let catalog = Catalog::from_reader(csv.as_bytes()).unwrap();

        assert_eq!(catalog.len(), 2);
        assert_eq!(catalog.texts(), vec!["solar panel kit", "wind turbine blade"]);

        let first = catalog.get(0).unwrap();
        assert_eq!(first.metadata["id"], json!(1));
        assert_eq!(first.metadata["price"], json!(199.5));
        assert_eq!(first.metadata["brand"], json!("Sunly"));
        assert_eq!(first.metadata["rating"], Value::Null);
        assert!(!first.metadata.contains_key("text"));

        assert_eq!(catalog.get(1).unwrap().metadata["brand"], json!("Gale, Inc"));
    }

    #[test]
    fn text_only_catalog_has_empty_metadata() {
        let catalog = Catalog::from_reader("text\nsolar panel kit\n".as_bytes()).unwrap();
        assert!(catalog.get(0).unwrap().metadata.is_empty());
    }

    #[test]
    fn missing_text_column_is_a_catalog_error() {
        let err = Catalog::from_reader("name,price\nkit,10\n".as_bytes()).unwrap_err();
        assert!(matches!(err, LensError::CatalogError(msg) if msg.contains("text")));
    }

    #[test]
    fn ragged_rows_are_rejected() {
        let err = Catalog::from_reader("text,price\nkit,10,extra\n".as_bytes()).unwrap_err();
        assert!(matches!(err, LensError::CatalogError(_)));
    }

    #[test]
    fn non_finite_numbers_stay_strings() {
        let catalog = Catalog::from_reader("text,score\nkit,NaN\n".as_bytes()).unwrap();
        assert_eq!(catalog.get(0).unwrap().metadata["score"], json!("NaN"));
    }

    #[test]
    fn missing_file_is_a_catalog_error() {
        let err = Catalog::from_csv_path(Path::new("/definitely/not/here.csv")).unwrap_err();
        assert!(matches!(err, LensError::CatalogError(_)));
    }
}
