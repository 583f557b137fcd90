use super::normalizer::{field_for_header, normalize_header};
use serde_json::{Map, Value};
use std::io::Read;
use tracing::warn;

/// Reads a placement export into loosely-typed JSON objects, one per row.
///
/// Columns are matched by normalized header; unrecognized columns are
/// ignored and blank cells are omitted so the record normalizer treats them
/// as missing. Rows whose field count disagrees with the header are skipped.
pub(crate) fn parse_rows<R: Read>(reader: R) -> Result<Vec<Value>, csv::Error> {
    let mut csv_reader = csv::ReaderBuilder::new()
        .trim(csv::Trim::All)
        .from_reader(reader);

    let columns: Vec<Option<&'static str>> = csv_reader
        .headers()?
        .iter()
        .map(|header| field_for_header(&normalize_header(header)))
        .collect();

    let mut rows = Vec::new();
    for (index, result) in csv_reader.records().enumerate() {
        let record = match result {
            Ok(record) => record,
            Err(err) if matches!(err.kind(), csv::ErrorKind::UnequalLengths { .. }) => {
                warn!(row = index + 1, error = %err, "skipping malformed placement row");
                continue;
            }
            Err(err) => return Err(err),
        };

        let mut object = Map::new();
        for (field, cell) in columns.iter().zip(record.iter()) {
            let Some(field) = field else {
                continue;
            };
            if cell.is_empty() || object.contains_key(*field) {
                continue;
            }
            object.insert((*field).to_string(), Value::String(cell.to_string()));
        }
        rows.push(Value::Object(object));
    }

    Ok(rows)
}
