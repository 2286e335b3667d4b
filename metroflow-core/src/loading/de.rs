use std::fs::File;
use std::io::BufReader;
use std::path::Path;

use serde::Deserialize;
use serde::de::DeserializeOwned;

use crate::Error;

/// Reads every record of a `.csv` or `.json` file.
///
/// A JSON file holds an array of records. Malformed rows are reported, not
/// skipped.
pub fn read_records<T>(path: &Path) -> Result<Vec<T>, Error>
where
    T: DeserializeOwned,
{
    let file = File::open(path).map_err(|e| {
        std::io::Error::new(
            e.kind(),
            format!("Failed to open file '{}': {}", path.display(), e),
        )
    })?;

    match path.extension().and_then(|ext| ext.to_str()) {
        Some(ext) if ext.eq_ignore_ascii_case("json") => {
            Ok(serde_json::from_reader(BufReader::new(file))?)
        }
        Some(ext) if ext.eq_ignore_ascii_case("csv") => csv::Reader::from_reader(file)
            .deserialize()
            .collect::<Result<Vec<T>, _>>()
            .map_err(Error::from),
        _ => Err(Error::invalid(format!(
            "unsupported record file '{}', expected .csv or .json",
            path.display()
        ))),
    }
}

/// Node ids appear both as integers (`1`) and strings (`"F1"`) in source data
pub(super) fn deserialize_id<'de, D>(deserializer: D) -> Result<String, D::Error>
where
    D: serde::Deserializer<'de>,
{
    #[derive(Deserialize)]
    #[serde(untagged)]
    enum RawId {
        Int(i64),
        Text(String),
    }

    match RawId::deserialize(deserializer)? {
        RawId::Int(value) => Ok(value.to_string()),
        RawId::Text(value) => {
            let trimmed = value.trim();
            if trimmed.is_empty() {
                Err(serde::de::Error::custom("empty node id"))
            } else {
                Ok(trimmed.to_string())
            }
        }
    }
}
