//! Literal request bodies kept as JSON files on disk.

use crate::result::ProbeResult;
use serde::de::DeserializeOwned;
use serde_json::Value;
use std::path::{Path, PathBuf};

/// File name of the create payload
pub const POST_REQUEST_BODY: &str = "post_request_body.json";

/// File name of the update payload
pub const PUT_REQUEST_BODY: &str = "put_request_body.json";

/// Read and parse a JSON file.
pub fn load_json_file<T: DeserializeOwned>(path: impl AsRef<Path>) -> ProbeResult<T> {
    let path = path.as_ref();
    let text = std::fs::read_to_string(path)?;
    let value = serde_json::from_str(&text)?;
    tracing::debug!(path = %path.display(), "loaded test data");
    Ok(value)
}

/// Loader rooted at a test data directory.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TestData {
    root: PathBuf,
}

impl Default for TestData {
    fn default() -> Self {
        Self::bundled()
    }
}

impl TestData {
    /// The files shipped with this crate.
    #[must_use]
    pub fn bundled() -> Self {
        Self::new(Path::new(env!("CARGO_MANIFEST_DIR")).join("testdata"))
    }

    /// Loader over an arbitrary directory
    #[must_use]
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    /// Directory the files are read from
    #[must_use]
    pub fn root(&self) -> &Path {
        &self.root
    }

    /// Load `<root>/<name>`.
    pub fn load<T: DeserializeOwned>(&self, name: &str) -> ProbeResult<T> {
        load_json_file(self.root.join(name))
    }

    /// Body for the "POST from file" scenario
    pub fn post_request_body(&self) -> ProbeResult<Value> {
        self.load(POST_REQUEST_BODY)
    }

    /// Body for the PUT scenario
    pub fn put_request_body(&self) -> ProbeResult<Value> {
        self.load(PUT_REQUEST_BODY)
    }
}
