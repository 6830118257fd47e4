// metadata.rs

use log::{debug, info, warn};
use std::collections::{BTreeMap, HashSet};
use std::fs::File;
use std::io::{BufReader, Read};
use std::path::Path;
use thiserror::Error;

/// Name of the sample identifier column used when no mapping file is supplied.
pub const SAMPLE_ID_COLUMN: &str = "#SampleID";

/// Column name and constant value of the pseudo mapping built from coordinates alone.
pub const DEFAULT_CATEGORY: &str = "Sample";

#[derive(Debug, Error)]
pub enum MetadataError {
    #[error("failed to read mapping file: {0}")]
    Io(#[from] std::io::Error),

    #[error("failed to parse mapping file: {0}")]
    Csv(#[from] csv::Error),

    #[error("mapping file has no header line (expected a first line starting with '#', e.g. '#SampleID')")]
    MissingHeader,

    #[error("mapping file header is empty")]
    EmptyHeader,

    #[error("mapping row for sample '{sample}' has {found} fields, expected {expected}")]
    RaggedRow {
        sample: String,
        expected: usize,
        found: usize,
    },

    #[error("mapping row {0} has an empty sample ID")]
    EmptySampleId(usize),

    #[error("sample '{0}' appears more than once in the mapping")]
    DuplicateSample(String),
}

/// Sample metadata: a header plus one row of string values per sample.
///
/// The first column always holds the sample identifiers, which are unique
/// across rows, and every row is as long as the header.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MetadataTable {
    header: Vec<String>,
    rows: Vec<Vec<String>>,
}

impl MetadataTable {
    pub fn new(header: Vec<String>, rows: Vec<Vec<String>>) -> Result<Self, MetadataError> {
        if header.is_empty() {
            return Err(MetadataError::EmptyHeader);
        }
        let mut seen_samples: HashSet<&str> = HashSet::with_capacity(rows.len());
        for (idx, row) in rows.iter().enumerate() {
            let sample = row.first().map(String::as_str).unwrap_or_default();
            if sample.is_empty() {
                return Err(MetadataError::EmptySampleId(idx + 1));
            }
            if row.len() != header.len() {
                return Err(MetadataError::RaggedRow {
                    sample: sample.to_string(),
                    expected: header.len(),
                    found: row.len(),
                });
            }
            if !seen_samples.insert(sample) {
                return Err(MetadataError::DuplicateSample(sample.to_string()));
            }
        }
        Ok(Self { header, rows })
    }

    /// Pseudo mapping for runs without a mapping file: every sample gets the
    /// constant category "Sample".
    pub fn default_for_samples(sample_ids: &[String]) -> Result<Self, MetadataError> {
        let header = vec![SAMPLE_ID_COLUMN.to_string(), DEFAULT_CATEGORY.to_string()];
        let rows = sample_ids
            .iter()
            .map(|id| vec![id.clone(), DEFAULT_CATEGORY.to_string()])
            .collect();
        Self::new(header, rows)
    }

    pub fn header(&self) -> &[String] {
        &self.header
    }

    pub fn rows(&self) -> &[Vec<String>] {
        &self.rows
    }

    pub fn sample_id_column(&self) -> &str {
        // `new` rejects an empty header, so index 0 always exists.
        &self.header[0]
    }

    pub fn sample_ids(&self) -> impl Iterator<Item = &str> + '_ {
        self.rows.iter().map(|row| row[0].as_str())
    }

    pub fn column_index(&self, name: &str) -> Option<usize> {
        self.header.iter().position(|column| column == name)
    }

    pub fn has_column(&self, name: &str) -> bool {
        self.column_index(name).is_some()
    }

    /// Values of one column, in row order.
    pub fn column_values(&self, name: &str) -> Option<Vec<&str>> {
        let idx = self.column_index(name)?;
        Some(self.rows.iter().map(|row| row[idx].as_str()).collect())
    }

    /// Groups sample IDs by their value in `name`. Groups are ordered by value;
    /// within a group, samples keep their row order.
    pub fn group_by_column(&self, name: &str) -> Option<BTreeMap<String, Vec<String>>> {
        let idx = self.column_index(name)?;
        let mut groups: BTreeMap<String, Vec<String>> = BTreeMap::new();
        for row in &self.rows {
            groups
                .entry(row[idx].clone())
                .or_default()
                .push(row[0].clone());
        }
        Some(groups)
    }

    /// Appends a column. `values` must hold exactly one entry per row, in row order.
    pub(crate) fn with_appended_column(mut self, name: String, values: Vec<String>) -> Self {
        debug_assert_eq!(values.len(), self.rows.len());
        self.header.push(name);
        for (row, value) in self.rows.iter_mut().zip(values) {
            row.push(value);
        }
        self
    }
}

pub fn read_mapping_file(path: &Path) -> Result<MetadataTable, MetadataError> {
    info!("Reading mapping file: {}", path.display());
    let file = File::open(path)?;
    let table = parse_mapping(BufReader::new(file))?;
    info!(
        "Mapping file has {} columns and {} samples.",
        table.header().len(),
        table.rows().len()
    );
    Ok(table)
}

/// Parses a tab-delimited mapping file. The first line starting with '#' is the
/// header; later '#' lines are comments.
pub fn parse_mapping<R: Read>(reader: R) -> Result<MetadataTable, MetadataError> {
    let mut csv_reader = csv::ReaderBuilder::new()
        .delimiter(b'\t')
        .has_headers(false)
        .flexible(true)
        .quoting(false)
        .from_reader(reader);

    let mut header: Option<Vec<String>> = None;
    let mut rows: Vec<Vec<String>> = Vec::new();

    for record in csv_reader.records() {
        let record = record?;
        let fields: Vec<String> = record.iter().map(|f| f.trim().to_string()).collect();
        if fields.iter().all(String::is_empty) {
            continue;
        }
        let line = record.position().map_or(0, |p| p.line());

        if fields[0].starts_with('#') {
            if header.is_none() {
                debug!("Mapping header on line {}: {:?}", line, fields);
                header = Some(fields);
            } else {
                debug!("Skipping comment on line {} of mapping file.", line);
            }
            continue;
        }

        if header.is_none() {
            warn!(
                "Data found on line {} of mapping file before any '#' header line.",
                line
            );
            return Err(MetadataError::MissingHeader);
        }
        rows.push(fields);
    }

    let header = header.ok_or(MetadataError::MissingHeader)?;
    MetadataTable::new(header, rows)
}
