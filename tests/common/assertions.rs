//! Custom assertions over album output directories

use std::path::Path;

/// Sorted file names inside `directory`
pub fn list_files(directory: &Path) -> Vec<String> {
    let mut names: Vec<String> = std::fs::read_dir(directory)
        .unwrap()
        .map(|entry| entry.unwrap().file_name().to_string_lossy().into_owned())
        .collect();
    names.sort();
    names
}

/// Assert `directory/name` exists and holds exactly `expected`
pub fn assert_file_contents(directory: &Path, name: &str, expected: &[u8]) {
    let path = directory.join(name);
    let actual = std::fs::read(&path)
        .unwrap_or_else(|e| panic!("failed to read {}: {e}", path.display()));
    assert_eq!(actual, expected, "unexpected contents in {}", path.display());
}

/// Parse the `images.json` manifest saved in `directory`
pub fn read_manifest(directory: &Path) -> serde_json::Value {
    let text = std::fs::read_to_string(directory.join(imgur_dl::MANIFEST_FILE_NAME)).unwrap();
    serde_json::from_str(&text).unwrap()
}
