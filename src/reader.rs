//! Vector stream reader: one vector per line after a fixed-size metadata
//! prefix, `<id><delim><coord>...<delim><coord>`.

use crate::error::{Error, Result};
use crate::vector::Vector;
use std::fs::File;
use std::io::{BufRead, BufReader};
use std::path::Path;

/// Reads every data line of `path`, skipping `skip_lines` prefix lines, and
/// parses each into a `Vector`. The first data line fixes the expected
/// dimensionality; any later line that disagrees is a `DimensionMismatch`.
pub fn read_vectors<P: AsRef<Path>>(path: P, delimiter: char, skip_lines: usize) -> Result<Vec<Vector>> {
    let file = File::open(path.as_ref()).map_err(|source| Error::InputOpenFailed {
        path: path.as_ref().display().to_string(),
        source,
    })?;
    let reader = BufReader::new(file);

    let mut vectors = Vec::new();
    let mut expected_dim: Option<usize> = None;

    for (line_no, line) in reader.lines().enumerate() {
        if line_no < skip_lines {
            continue;
        }
        let line = line.map_err(Error::Io)?;
        let line = line.trim_end_matches('\r');
        if line.is_empty() {
            continue;
        }
        let vector = parse_line(line, delimiter, line_no + 1)?;
        match expected_dim {
            None => expected_dim = Some(vector.dim()),
            Some(d) if d != vector.dim() => {
                return Err(Error::DimensionMismatch {
                    expected: d,
                    actual: vector.dim(),
                })
            }
            _ => {}
        }
        vectors.push(vector);
    }

    if vectors.is_empty() {
        return Err(Error::EmptyInput);
    }
    Ok(vectors)
}

fn parse_line(line: &str, delimiter: char, line_no: usize) -> Result<Vector> {
    let mut parts = line.split(delimiter);
    let id = parts.next().ok_or_else(|| Error::MalformedInput {
        line: line_no,
        reason: "missing id field".to_string(),
    })?;
    let dims: std::result::Result<Vec<f64>, _> = parts.map(|s| s.trim().parse::<f64>()).collect();
    let dims = dims.map_err(|_| Error::MalformedInput {
        line: line_no,
        reason: "non-numeric coordinate".to_string(),
    })?;
    if dims.is_empty() {
        return Err(Error::MalformedInput {
            line: line_no,
            reason: "vector has zero coordinates".to_string(),
        });
    }
    Ok(Vector::new(id.trim(), dims))
}
