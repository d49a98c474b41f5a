use csv::{ReaderBuilder, StringRecord};
use std::collections::BTreeSet;
use thiserror::Error;
use tracing::*;

/// Header of the column holding neutral structures.
pub const NEUTRAL_COLUMN: &str = "Neutral_smiles";
/// Header of the column holding protonated structures.
pub const PROTONATED_COLUMN: &str = "Protonated_smiles";

#[derive(Error, Debug)]
pub enum DatasetError {
    #[error("Error: The uploaded file is not valid UTF-8 text: {0}")]
    Encoding(#[from] std::str::Utf8Error),
    #[error("Error: The CSV file could not be read: {0}")]
    Csv(#[from] csv::Error),
    #[error("Error: The CSV file must contain 'Neutral_smiles' and 'Protonated_smiles' columns.")]
    MissingColumns { missing: Vec<String> },
}

/// A neutral structure and its protonated forms, in upload order.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StructureRecord {
    pub neutral: String,
    pub protonated: Vec<String>,
}

/// The validated (neutral, protonated) rows of an uploaded table.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Dataset {
    rows: Vec<(String, String)>,
}

impl Dataset {
    /// Decodes uploaded bytes as UTF-8 and reads them as a CSV table.
    pub fn from_bytes(bytes: &[u8]) -> Result<Self, DatasetError> {
        let text = std::str::from_utf8(bytes)?;
        Self::from_csv_str(text)
    }

    /// Reads a comma-separated table with a header row. Both required columns
    /// must be present; other columns are ignored.
    pub fn from_csv_str(csv_data: &str) -> Result<Self, DatasetError> {
        let csv_data = csv_data.strip_prefix('\u{feff}').unwrap_or(csv_data);
        let mut rdr = ReaderBuilder::new()
            .has_headers(true)
            .flexible(true)
            .from_reader(csv_data.as_bytes());

        let headers = rdr.headers()?.clone();
        let column = |name: &str| headers.iter().position(|header| header == name);
        let (neutral_column, protonated_column) =
            match (column(NEUTRAL_COLUMN), column(PROTONATED_COLUMN)) {
                (Some(neutral), Some(protonated)) => (neutral, protonated),
                (neutral, protonated) => {
                    let missing: Vec<String> = [(neutral, NEUTRAL_COLUMN), (protonated, PROTONATED_COLUMN)]
                        .into_iter()
                        .filter(|(found, _)| found.is_none())
                        .map(|(_, name)| name.to_string())
                        .collect();
                    warn!("Uploaded table is missing columns {:?}; header: {:?}", missing, headers);
                    return Err(DatasetError::MissingColumns { missing });
                }
            };

        let mut rows = Vec::new();
        for result in rdr.records() {
            let record: StringRecord = result?;
            let neutral = record.get(neutral_column).unwrap_or("");
            let protonated = record.get(protonated_column).unwrap_or("");
            if neutral.is_empty() || protonated.is_empty() {
                warn!("Skipping record with empty neutral or protonated SMILES: {:?}", record);
                continue;
            }
            rows.push((neutral.to_string(), protonated.to_string()));
        }

        info!("Loaded {} structure pairs", rows.len());
        Ok(Self { rows })
    }

    pub fn from_rows<N, P>(rows: impl IntoIterator<Item = (N, P)>) -> Self
    where
        N: Into<String>,
        P: Into<String>,
    {
        Self {
            rows: rows
                .into_iter()
                .map(|(neutral, protonated)| (neutral.into(), protonated.into()))
                .collect(),
        }
    }

    pub fn rows(&self) -> &[(String, String)] {
        &self.rows
    }

    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    /// Distinct neutral structures in ascending lexicographic order.
    pub fn neutral_options(&self) -> Vec<&str> {
        self.rows
            .iter()
            .map(|(neutral, _)| neutral.as_str())
            .collect::<BTreeSet<_>>()
            .into_iter()
            .collect()
    }

    /// Protonated forms recorded for `neutral`, in row order.
    pub fn protonated_forms(&self, neutral: &str) -> Vec<&str> {
        self.rows
            .iter()
            .filter(|(n, _)| n == neutral)
            .map(|(_, protonated)| protonated.as_str())
            .collect()
    }

    pub fn contains_neutral(&self, neutral: &str) -> bool {
        self.rows.iter().any(|(n, _)| n == neutral)
    }

    /// Every neutral structure grouped with its protonated forms.
    pub fn records(&self) -> Vec<StructureRecord> {
        self.neutral_options()
            .into_iter()
            .map(|neutral| StructureRecord {
                neutral: neutral.to_string(),
                protonated: self
                    .protonated_forms(neutral)
                    .into_iter()
                    .map(str::to_string)
                    .collect(),
            })
            .collect()
    }
}
