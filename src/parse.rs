use std::fs;
use std::path::Path;
use std::str::FromStr;

/// Parse a permutation written as a list of integers separated by commas and/or whitespace, such
/// as `"1,0,3,2"` or `"1 0 3 2"`.  This only checks the syntax; use
/// `routing::validate_permutation` to check that the result is actually a permutation.
pub fn parse_perm(s: &str) -> Result<Vec<u32>, String> {
    s.split(|c: char| c == ',' || c.is_whitespace())
        .filter(|word| !word.is_empty())
        .map(|word| {
            u32::from_str(word).map_err(|e| format!("bad permutation entry {:?}: {}", word, e))
        })
        .collect()
}

/// Read a permutation from a file containing a list of integers.  The format is chosen by the
/// file extension: `.yaml`, `.json`, or `.cbor`; anything else is read as CBOR.
pub fn read_perm_file(path: &Path) -> Result<Vec<u32>, String> {
    let content = fs::read(path)
        .map_err(|e| format!("failed to read {}: {}", path.display(), e))?;
    let perm = match path.extension().and_then(|os| os.to_str()) {
        Some("yaml") => serde_yaml::from_slice(&content).map_err(|e| e.to_string()),
        Some("json") => serde_json::from_slice(&content).map_err(|e| e.to_string()),
        _ => serde_cbor::from_slice(&content).map_err(|e| e.to_string()),
    };
    perm.map_err(|e| format!("failed to parse {}: {}", path.display(), e))
}
