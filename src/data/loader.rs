use std::fs;
use std::io::{Read, Write};
use std::path::Path;

use log::debug;

use super::model::{presence_column, Covariate, Dataset, Observation};
use crate::error::DataError;

const ID_COLUMN: &str = "observation_id";
const HABITAT_COLUMN: &str = "water_body_type";

// ---------------------------------------------------------------------------
// CSV loader
// ---------------------------------------------------------------------------

/// Load the observation table from a CSV file.
///
/// Layout: header row, then one row per observation with the columns
/// `observation_id, water_body_type`, the four covariate columns and one
/// `<CODE>_present` column per species in `species`. Extra columns are
/// ignored; a missing one is an error.
pub fn load_csv(path: &Path, species: &[String]) -> Result<Dataset, DataError> {
    let file = fs::File::open(path).map_err(|source| DataError::Io {
        path: path.to_path_buf(),
        source,
    })?;
    let dataset = read_csv(file, species)?;
    debug!("loaded {} observations from {}", dataset.len(), path.display());
    Ok(dataset)
}

/// Parse an observation table from any reader. See [`load_csv`].
pub fn read_csv<R: Read>(input: R, species: &[String]) -> Result<Dataset, DataError> {
    let mut reader = csv::Reader::from_reader(input);
    let headers: Vec<String> = reader.headers()?.iter().map(|h| h.to_string()).collect();

    let column = |name: &str| {
        headers
            .iter()
            .position(|h| h == name)
            .ok_or_else(|| DataError::MissingColumn {
                column: name.to_string(),
            })
    };

    let id_idx = column(ID_COLUMN)?;
    let habitat_idx = column(HABITAT_COLUMN)?;
    let mut covariate_idx = [0usize; 4];
    for c in Covariate::ALL {
        covariate_idx[c.index()] = column(c.column())?;
    }
    let presence_idx = species
        .iter()
        .map(|s| column(&presence_column(s)))
        .collect::<Result<Vec<_>, _>>()?;

    let mut observations = Vec::new();

    for (row_no, result) in reader.records().enumerate() {
        let record = result?;
        let cell = |idx: usize| record.get(idx).unwrap_or("").trim();

        let id = parse_cell::<u64>(cell(id_idx), row_no, ID_COLUMN, "identifier")?;
        let habitat = cell(habitat_idx).to_string();

        let mut covariates = [0.0; 4];
        for (c, &idx) in Covariate::ALL.iter().zip(&covariate_idx) {
            covariates[c.index()] = parse_cell::<f64>(cell(idx), row_no, c.column(), "number")?;
        }

        let presence = species
            .iter()
            .zip(&presence_idx)
            .map(|(code, &idx)| parse_presence(cell(idx), row_no, code))
            .collect::<Result<Vec<_>, _>>()?;

        observations.push(Observation {
            id,
            habitat,
            covariates,
            presence,
        });
    }

    if observations.is_empty() {
        return Err(DataError::Empty);
    }

    Dataset::new(species.to_vec(), observations)
}

fn parse_cell<T: std::str::FromStr>(
    value: &str,
    row: usize,
    column: &str,
    expected: &'static str,
) -> Result<T, DataError> {
    value.parse::<T>().map_err(|_| DataError::InvalidValue {
        row,
        column: column.to_string(),
        value: value.to_string(),
        expected,
    })
}

fn parse_presence(value: &str, row: usize, species: &str) -> Result<u8, DataError> {
    match value {
        "0" => Ok(0),
        "1" => Ok(1),
        other => Err(DataError::InvalidValue {
            row,
            column: presence_column(species),
            value: other.to_string(),
            expected: "presence indicator (0 or 1)",
        }),
    }
}

// ---------------------------------------------------------------------------
// CSV writer
// ---------------------------------------------------------------------------

/// Write the dataset to `path`, creating parent directories as needed.
pub fn save_csv(dataset: &Dataset, path: &Path) -> Result<(), DataError> {
    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        fs::create_dir_all(parent).map_err(|source| DataError::Io {
            path: parent.to_path_buf(),
            source,
        })?;
    }
    let file = fs::File::create(path).map_err(|source| DataError::Io {
        path: path.to_path_buf(),
        source,
    })?;
    write_csv(dataset, file)
}

/// Serialize the dataset as CSV. Floats use the shortest representation
/// that parses back to the same value.
pub fn write_csv<W: Write>(dataset: &Dataset, output: W) -> Result<(), DataError> {
    let mut writer = csv::Writer::from_writer(output);

    let mut header: Vec<String> = vec![ID_COLUMN.to_string(), HABITAT_COLUMN.to_string()];
    header.extend(Covariate::ALL.iter().map(|c| c.column().to_string()));
    header.extend(dataset.species().iter().map(|s| presence_column(s)));
    writer.write_record(&header)?;

    for obs in dataset.observations() {
        let mut row: Vec<String> = Vec::with_capacity(header.len());
        row.push(obs.id.to_string());
        row.push(obs.habitat.clone());
        row.extend(obs.covariates.iter().map(|v| v.to_string()));
        row.extend(obs.presence.iter().map(|p| p.to_string()));
        writer.write_record(&row)?;
    }

    writer.flush().map_err(csv::Error::from)?;
    Ok(())
}
