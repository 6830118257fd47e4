// coords.rs

use log::{debug, info};
use ndarray::Array2;
use std::collections::HashSet;
use std::fs::File;
use std::io::{BufRead, BufReader};
use std::path::Path;
use thiserror::Error;

const EIGENVALUES_LABEL: &str = "eigvals";
const PCT_EXPLAINED_LABEL: &str = "% variation explained";

#[derive(Debug, Error)]
pub enum CoordsError {
    #[error("failed to read coordinates file: {0}")]
    Io(#[from] std::io::Error),

    #[error("line {line}: cannot parse '{value}' as a number")]
    Parse { line: usize, value: String },

    #[error("line {line}: sample '{sample}' has {found} coordinates, expected {expected}")]
    Ragged {
        line: usize,
        sample: String,
        expected: usize,
        found: usize,
    },

    #[error("line {line}: sample '{sample}' appears more than once")]
    DuplicateSample { line: usize, sample: String },

    #[error("coordinates file contains no samples")]
    Empty,

    #[error("coordinate matrix shape error: {0}")]
    Shape(#[from] ndarray::ShapeError),
}

/// Ordination output: one row of coordinates per sample, plus per-axis
/// eigenvalues and percent variation explained when the file provides them.
#[derive(Debug, Clone)]
pub struct CoordinateData {
    pub sample_ids: Vec<String>,
    pub coords: Array2<f64>,
    pub eigenvalues: Vec<f64>,
    pub pct_explained: Vec<f64>,
}

impl CoordinateData {
    pub fn num_axes(&self) -> usize {
        self.coords.ncols()
    }
}

pub fn read_coords_file(path: &Path) -> Result<CoordinateData, CoordsError> {
    info!("Reading coordinates file: {}", path.display());
    let file = File::open(path)?;
    let data = parse_coords(BufReader::new(file))?;
    info!(
        "Loaded coordinates for {} samples on {} axes.",
        data.sample_ids.len(),
        data.num_axes()
    );
    Ok(data)
}

fn parse_values(line_no: usize, fields: &[&str]) -> Result<Vec<f64>, CoordsError> {
    fields
        .iter()
        .map(|field| {
            let value = field.trim();
            value.parse::<f64>().map_err(|_| CoordsError::Parse {
                line: line_no,
                value: value.to_string(),
            })
        })
        .collect()
}

/// Parses a tab-delimited coordinates table: a header line, one line per
/// sample, then optional `eigvals` and `% variation explained` rows.
pub fn parse_coords<R: BufRead>(reader: R) -> Result<CoordinateData, CoordsError> {
    let mut sample_ids: Vec<String> = Vec::new();
    let mut flat_coords: Vec<f64> = Vec::new();
    let mut num_axes: Option<usize> = None;
    let mut eigenvalues = Vec::new();
    let mut pct_explained = Vec::new();

    let mut seen_header = false;
    let mut in_samples = true;
    let mut seen_samples: HashSet<String> = HashSet::new();

    for (idx, line) in reader.lines().enumerate() {
        let line = line?;
        let line_no = idx + 1;
        let trimmed = line.trim_end_matches(['\r', '\n']);

        if trimmed.trim().is_empty() {
            if seen_header && !sample_ids.is_empty() {
                in_samples = false;
            }
            continue;
        }
        if !seen_header {
            debug!("Coordinates header: {}", trimmed);
            seen_header = true;
            continue;
        }

        let fields: Vec<&str> = trimmed.split('\t').collect();
        let label = fields[0].trim();

        if label.eq_ignore_ascii_case(EIGENVALUES_LABEL) {
            eigenvalues = parse_values(line_no, &fields[1..])?;
            in_samples = false;
            continue;
        }
        if label.eq_ignore_ascii_case(PCT_EXPLAINED_LABEL) {
            pct_explained = parse_values(line_no, &fields[1..])?;
            in_samples = false;
            continue;
        }
        if !in_samples {
            debug!("Ignoring trailing line {} of coordinates file.", line_no);
            continue;
        }

        let values = parse_values(line_no, &fields[1..])?;
        let expected = *num_axes.get_or_insert(values.len());
        if values.len() != expected {
            return Err(CoordsError::Ragged {
                line: line_no,
                sample: label.to_string(),
                expected,
                found: values.len(),
            });
        }
        if !seen_samples.insert(label.to_string()) {
            return Err(CoordsError::DuplicateSample {
                line: line_no,
                sample: label.to_string(),
            });
        }
        sample_ids.push(label.to_string());
        flat_coords.extend(values);
    }

    if sample_ids.is_empty() {
        return Err(CoordsError::Empty);
    }
    let coords = Array2::from_shape_vec((sample_ids.len(), num_axes.unwrap_or(0)), flat_coords)?;

    Ok(CoordinateData {
        sample_ids,
        coords,
        eigenvalues,
        pct_explained,
    })
}
