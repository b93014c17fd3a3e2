//! Fixture loading and sampling
//!
//! Fixtures are JSON arrays of request payloads, loaded once per process and
//! shared read-only across all workers. A missing or malformed file yields an
//! empty set rather than aborting: scenarios check for emptiness and skip
//! their workload for that iteration.

use serde_json::Value;
use std::path::Path;
use thiserror::Error;
use tracing::{info, warn};

/// Errors that can occur when sampling fixture data
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum DataError {
    /// The fixture data set has no elements to sample
    #[error("Fixture data set is empty")]
    Empty,
}

/// Load a JSON fixture file into a payload vector.
///
/// A top-level array becomes the vector; a single object is normalized to a
/// one-element vector. Load failures are recovered by returning an empty
/// vector so the run can proceed without that workload.
pub fn load_json_fixture(path: impl AsRef<Path>) -> Vec<Value> {
    let path = path.as_ref();
    let raw = match std::fs::read(path) {
        Ok(raw) => raw,
        Err(e) => {
            warn!(path = %path.display(), error = %e, "failed to read fixture");
            return Vec::new();
        }
    };

    match serde_json::from_slice::<Value>(&raw) {
        Ok(Value::Array(items)) => {
            info!(path = %path.display(), count = items.len(), "loaded fixture samples");
            items
        }
        Ok(single) => {
            info!(path = %path.display(), count = 1, "loaded fixture sample");
            vec![single]
        }
        Err(e) => {
            warn!(path = %path.display(), error = %e, "failed to parse fixture");
            Vec::new()
        }
    }
}

/// Random element from a fixture set, for varied request payloads
pub fn random_sample<T>(data: &[T]) -> Result<&T, DataError> {
    if data.is_empty() {
        return Err(DataError::Empty);
    }
    Ok(&data[rand::random::<usize>() % data.len()])
}

/// Element by wrapping index, for deterministic request sequences
pub fn sequential_sample<T>(data: &[T], index: usize) -> Result<&T, DataError> {
    if data.is_empty() {
        return Err(DataError::Empty);
    }
    Ok(&data[index % data.len()])
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    fn fixture_file(contents: &str) -> tempfile::NamedTempFile {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        write!(file, "{contents}").unwrap();
        file
    }

    #[test]
    fn test_load_array() {
        let file = fixture_file(r#"[{"features":[1.0]},{"features":[2.0]}]"#);
        let data = load_json_fixture(file.path());
        assert_eq!(data.len(), 2);
        assert_eq!(data[1]["features"][0], 2.0);
    }

    #[test]
    fn test_single_object_normalized() {
        let file = fixture_file(r#"{"query":"What is MLOps?"}"#);
        let data = load_json_fixture(file.path());
        assert_eq!(data.len(), 1);
        assert_eq!(data[0]["query"], "What is MLOps?");
    }

    #[test]
    fn test_missing_file_yields_empty() {
        assert!(load_json_fixture("/nonexistent/wine.json").is_empty());
    }

    #[test]
    fn test_malformed_file_yields_empty() {
        let file = fixture_file("not json at all {");
        assert!(load_json_fixture(file.path()).is_empty());
    }

    #[test]
    fn test_random_sample_never_fails_on_non_empty() {
        let data = vec![1, 2, 3];
        for _ in 0..100 {
            let sample = random_sample(&data).unwrap();
            assert!(data.contains(sample));
        }
    }

    #[test]
    fn test_empty_sampling_fails() {
        let data: Vec<i32> = Vec::new();
        assert_eq!(random_sample(&data), Err(DataError::Empty));
        assert_eq!(sequential_sample(&data, 0), Err(DataError::Empty));
    }

    #[test]
    fn test_sequential_sample_wraps() {
        let data = vec!["a", "b", "c"];
        assert_eq!(*sequential_sample(&data, 0).unwrap(), "a");
        assert_eq!(*sequential_sample(&data, 4).unwrap(), "b");
        assert_eq!(*sequential_sample(&data, 300).unwrap(), "a");
    }
}
