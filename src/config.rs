//! Flat `key = value` run configuration, deserialized from a TOML-compatible
//! file by `serde`.

use crate::error::{Error, Result};
use serde::Deserialize;
use std::path::Path;

fn default_k_hash() -> usize {
    4
}
fn default_l() -> usize {
    5
}
fn default_bucket_div() -> usize {
    4
}
fn default_euclidean_h_w() -> f64 {
    0.01
}
fn default_cube_probes() -> usize {
    0
}
fn default_cube_range_c() -> f64 {
    1.0
}
fn default_max_iter() -> usize {
    30
}
fn default_min_dist_kmeans() -> f64 {
    0.05
}
fn default_csv_delimiter() -> char {
    ','
}

#[derive(Debug, Clone, Deserialize)]
pub struct Config {
    pub number_of_clusters: Option<usize>,
    #[serde(default = "default_k_hash")]
    pub number_of_hash_functions: usize,
    #[serde(default = "default_l")]
    pub number_of_hash_tables: usize,
    #[serde(default = "default_bucket_div")]
    pub lsh_bucket_div: usize,
    #[serde(default = "default_euclidean_h_w")]
    pub euclidean_h_w: f64,
    #[serde(default = "default_cube_probes")]
    pub cube_probes: usize,
    /// Reserved: not consumed by this core's range-assignment protocol.
    #[serde(default = "default_cube_range_c")]
    pub cube_range_c: f64,
    #[serde(default = "default_max_iter")]
    pub max_algo_iterations: usize,
    #[serde(default = "default_min_dist_kmeans")]
    pub min_dist_kmeans: f64,
    #[serde(default = "default_csv_delimiter")]
    pub csv_delimiter: char,
}

impl Default for Config {
    fn default() -> Self {
        Config {
            number_of_clusters: None,
            number_of_hash_functions: default_k_hash(),
            number_of_hash_tables: default_l(),
            lsh_bucket_div: default_bucket_div(),
            euclidean_h_w: default_euclidean_h_w(),
            cube_probes: default_cube_probes(),
            cube_range_c: default_cube_range_c(),
            max_algo_iterations: default_max_iter(),
            min_dist_kmeans: default_min_dist_kmeans(),
            csv_delimiter: default_csv_delimiter(),
        }
    }
}

impl Config {
    pub fn from_str(text: &str) -> Result<Self> {
        toml::from_str(text).map_err(Error::from)
    }

    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let text = std::fs::read_to_string(path.as_ref()).map_err(|source| {
            Error::InputOpenFailed {
                path: path.as_ref().display().to_string(),
                source,
            }
        })?;
        Self::from_str(&text)
    }
}

#[cfg(test)]
mod test {
    use super::*;
    use std::io::Write;
    use tempfile::NamedTempFile;

    #[test]
    fn test_defaults_when_only_k_given() {
        let cfg = Config::from_str("number_of_clusters = 3\n").unwrap();
        assert_eq!(cfg.number_of_clusters, Some(3));
        assert_eq!(cfg.number_of_hash_functions, 4);
        assert_eq!(cfg.number_of_hash_tables, 5);
        assert_eq!(cfg.max_algo_iterations, 30);
        assert!((cfg.min_dist_kmeans - 0.05).abs() < 1e-12);
    }

    #[test]
    fn test_overrides_are_respected() {
        let text = "number_of_clusters = 2\nnumber_of_hash_functions = 6\ncube_probes = 3\n";
        let cfg = Config::from_str(text).unwrap();
        assert_eq!(cfg.number_of_hash_functions, 6);
        assert_eq!(cfg.cube_probes, 3);
    }

    #[test]
    fn test_missing_k_is_none() {
        let cfg = Config::from_str("number_of_hash_functions = 6\n").unwrap();
        assert_eq!(cfg.number_of_clusters, None);
    }

    #[test]
    fn test_from_file_round_trip() {
        let mut file = NamedTempFile::new().unwrap();
        writeln!(file, "number_of_clusters = 5").unwrap();
        let cfg = Config::from_file(file.path()).unwrap();
        assert_eq!(cfg.number_of_clusters, Some(5));
    }

    #[test]
    fn test_malformed_toml_is_config_parse_error() {
        let result = Config::from_str("this is not = valid = toml [[[");
        assert!(result.is_err());
    }
}
