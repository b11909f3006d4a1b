use std::path::PathBuf;

#[derive(Debug, Clone)]
pub struct Config {
    /// Where the in-memory collection persists its JSON snapshot.
    pub snapshot_path: PathBuf,

    /// Substitute the fixed placeholder page when the collection is empty
    /// and the listing was unfiltered. Advisory UX behavior, never applied
    /// to an empty search result.
    pub placeholder_on_empty: bool,
}

impl Default for Config {
    fn default() -> Self {
        Config {
            snapshot_path: PathBuf::from("./data/patients.json"),
            placeholder_on_empty: true,
        }
    }
}
