//! Common routines for handling input data.
use crate::model::{Model, ModelParameters};
use crate::units::Dimensionless;
use anyhow::{Context, Result, bail};
use chrono::{NaiveDate, NaiveDateTime};
use itertools::Itertools;
use serde::de::{DeserializeOwned, Deserializer};
use serde::Deserialize;
use std::fs;
use std::path::Path;

mod electrolyzer;
use electrolyzer::read_electrolyzer;
mod plant;
use plant::read_power_plants;

/// Formats accepted for timestamps in CSV files
const TIMESTAMP_FORMATS: [&str; 3] = ["%Y-%m-%dT%H:%M:%S", "%Y-%m-%d %H:%M:%S", "%Y-%m-%dT%H:%M"];

/// Read a series of type `T`s from a CSV file.
///
/// Will raise an error if the file is empty.
///
/// # Arguments
///
/// * `file_path` - Path to the CSV file
pub fn read_csv<'a, T: DeserializeOwned + 'a>(
    file_path: &'a Path,
) -> Result<impl Iterator<Item = T> + 'a> {
    let vec = read_csv_internal(file_path)?;
    if vec.is_empty() {
        bail!("CSV file {} cannot be empty", file_path.display());
    }

    Ok(vec.into_iter())
}

/// Read a series of type `T`s from a CSV file, returning nothing if the file doesn't exist.
///
/// # Arguments
///
/// * `file_path` - Path to the CSV file
pub fn read_csv_optional<'a, T: DeserializeOwned + 'a>(
    file_path: &'a Path,
) -> Result<impl Iterator<Item = T> + 'a> {
    if !file_path.exists() {
        return Ok(Vec::new().into_iter());
    }

    let vec = read_csv_internal(file_path)?;
    Ok(vec.into_iter())
}

fn read_csv_internal<T: DeserializeOwned>(file_path: &Path) -> Result<Vec<T>> {
    let vec = csv::ReaderBuilder::new()
        .trim(csv::Trim::All)
        .from_path(file_path)
        .with_context(|| input_err_msg(file_path))?
        .into_deserialize()
        .process_results(|iter| iter.collect_vec())
        .with_context(|| input_err_msg(file_path))?;

    Ok(vec)
}

/// Parse a TOML file at the specified path.
///
/// # Arguments
///
/// * `file_path` - Path to the TOML file
///
/// # Returns
///
/// * The deserialised TOML data or an error if the file could not be read or parsed.
pub fn read_toml<T: DeserializeOwned>(file_path: &Path) -> Result<T> {
    let toml_str = fs::read_to_string(file_path).with_context(|| input_err_msg(file_path))?;
    let toml_data = toml::from_str(&toml_str).with_context(|| input_err_msg(file_path))?;

    Ok(toml_data)
}

/// Format an error message to include the file path
pub fn input_err_msg<P: AsRef<Path>>(file_path: P) -> String {
    format!("Error reading {}", file_path.as_ref().display())
}

/// Read a [`Dimensionless`] value, checking that it is greater than zero and at most one
pub fn deserialise_proportion_nonzero<'de, D>(deserialiser: D) -> Result<Dimensionless, D::Error>
where
    D: Deserializer<'de>,
{
    let value = f64::deserialize(deserialiser)?;
    if !(value > 0.0 && value <= 1.0) {
        Err(serde::de::Error::custom("Value must be > 0 and <= 1"))?;
    }

    Ok(Dimensionless(value))
}

/// Parse a timestamp, which may be a full date and time or just a date (meaning midnight)
pub fn parse_timestamp(s: &str) -> Result<NaiveDateTime> {
    for format in TIMESTAMP_FORMATS {
        if let Ok(timestamp) = NaiveDateTime::parse_from_str(s, format) {
            return Ok(timestamp);
        }
    }

    if let Ok(date) = NaiveDate::parse_from_str(s, "%Y-%m-%d") {
        return Ok(date.and_time(chrono::NaiveTime::MIN));
    }

    bail!("Invalid timestamp: {s}")
}

/// Deserialise a timestamp using [`parse_timestamp`]
pub fn deserialise_timestamp<'de, D>(deserialiser: D) -> Result<NaiveDateTime, D::Error>
where
    D: Deserializer<'de>,
{
    let value = String::deserialize(deserialiser)?;
    parse_timestamp(&value).map_err(serde::de::Error::custom)
}

/// Read a model from the specified directory.
///
/// # Arguments
///
/// * `model_dir` - Folder containing model configuration files
///
/// # Returns
///
/// The loaded and validated model, or an error.
pub fn load_model<P: AsRef<Path>>(model_dir: P) -> Result<Model> {
    let model_dir = model_dir.as_ref();
    let parameters = ModelParameters::from_path(model_dir)?;
    let electrolyzer = read_electrolyzer(model_dir)?;
    let plants = read_power_plants(model_dir, parameters.emissions.mcf_to_mmbtu)?;

    Ok(Model {
        model_path: model_dir.to_path_buf(),
        parameters,
        electrolyzer,
        plants,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;
    use serde::Deserialize;
    use std::fs::File;
    use std::io::Write;
    use tempfile::tempdir;

    #[derive(Debug, PartialEq, Deserialize)]
    struct Record {
        id: String,
        value: u32,
    }

    /// Create an example CSV file in dir_path
    fn create_csv_file(dir_path: &Path, contents: &str) -> std::path::PathBuf {
        let file_path = dir_path.join("test.csv");
        let mut file = File::create(&file_path).unwrap();
        writeln!(file, "{contents}").unwrap();
        file_path
    }

    #[test]
    fn test_read_csv() {
        let dir = tempdir().unwrap();
        let file_path = create_csv_file(dir.path(), "id,value\nhello,1\nworld,2\n");
        let records: Vec<Record> = read_csv(&file_path).unwrap().collect();
        assert_eq!(
            records,
            &[
                Record {
                    id: "hello".to_string(),
                    value: 1,
                },
                Record {
                    id: "world".to_string(),
                    value: 2,
                }
            ]
        );

        // Whitespace is trimmed
        let file_path = create_csv_file(dir.path(), "id , value\n hello ,  1\n");
        let records: Vec<Record> = read_csv(&file_path).unwrap().collect();
        assert_eq!(records[0].id, "hello");

        // File with no data (only column headers)
        let file_path = create_csv_file(dir.path(), "id,value\n");
        assert!(read_csv::<Record>(&file_path).is_err());
        assert!(
            read_csv_optional::<Record>(&file_path)
                .unwrap()
                .next()
                .is_none()
        );
    }

    #[test]
    fn test_read_csv_optional_missing() {
        let dir = tempdir().unwrap();
        let file_path = dir.path().join("missing.csv");
        assert!(
            read_csv_optional::<Record>(&file_path)
                .unwrap()
                .next()
                .is_none()
        );
        assert!(read_csv::<Record>(&file_path).is_err());
    }

    #[test]
    fn test_read_toml() {
        let dir = tempdir().unwrap();
        let file_path = dir.path().join("test.toml");
        {
            let mut file = File::create(&file_path).unwrap();
            writeln!(file, "id = \"hello\"\nvalue = 1").unwrap();
        }

        assert_eq!(
            read_toml::<Record>(&file_path).unwrap(),
            Record {
                id: "hello".to_string(),
                value: 1,
            }
        );

        {
            let mut file = File::create(&file_path).unwrap();
            writeln!(file, "bad toml syntax").unwrap();
        }

        assert!(read_toml::<Record>(&file_path).is_err());
    }

    #[derive(Debug, Deserialize)]
    struct Proportion {
        #[serde(deserialize_with = "deserialise_proportion_nonzero")]
        value: Dimensionless,
    }

    #[rstest]
    #[case(0.01, true)]
    #[case(1.0, true)]
    #[case(0.0, false)]
    #[case(1.01, false)]
    #[case(f64::NAN, false)]
    fn test_deserialise_proportion_nonzero(#[case] value: f64, #[case] expected_valid: bool) {
        let result = toml::from_str::<Proportion>(&format!("value = {value}"));
        assert_eq!(result.is_ok(), expected_valid);
        if let Ok(proportion) = result {
            assert_eq!(proportion.value, Dimensionless(value));
        }
    }

    #[rstest]
    #[case("2023-07-01T05:00:00", (2023, 7, 1, 5))]
    #[case("2023-07-01 05:00:00", (2023, 7, 1, 5))]
    #[case("2023-07-01T05:00", (2023, 7, 1, 5))]
    #[case("2023-07-01", (2023, 7, 1, 0))]
    fn test_parse_timestamp(#[case] s: &str, #[case] expected: (i32, u32, u32, u32)) {
        let expected = crate::fixture::datetime(expected.0, expected.1, expected.2, expected.3);
        assert_eq!(parse_timestamp(s).unwrap(), expected);
    }

    #[rstest]
    #[case("")]
    #[case("2023-13-01")]
    #[case("July 2023")]
    fn test_parse_timestamp_invalid(#[case] s: &str) {
        assert!(parse_timestamp(s).is_err());
    }
}
