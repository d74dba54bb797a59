//! Revocation list loading.
//!
//! Grounded in `_revocation_locations`/`_read_revocations`/`_load_revocations`
//! in the reference implementation: entries are fingerprints or `jti`
//! values, one per line, `#`-comments and blank lines ignored. A
//! `CONTRACT_TESTER_REVOKED_FILE` path is authoritative when set; otherwise
//! the cwd and home-directory files are unioned.

use std::collections::HashSet;
use std::path::{Path, PathBuf};

const REVOCATION_FILE: &str = "revoked_licenses.txt";
const ENV_REVOCATIONS_PATH: &str = "CONTRACT_TESTER_REVOKED_FILE";

fn read_revocations(path: &Path) -> HashSet<String> {
    let Ok(content) = std::fs::read_to_string(path) else {
        return HashSet::new();
    };
    content
        .lines()
        .map(str::trim)
        .filter(|line| !line.is_empty() && !line.starts_with('#'))
        .map(str::to_string)
        .collect()
}

fn revocation_locations() -> Vec<PathBuf> {
    if let Ok(path) = std::env::var(ENV_REVOCATIONS_PATH) {
        return vec![PathBuf::from(path)];
    }
    let mut locations = vec![PathBuf::from(REVOCATION_FILE)];
    if let Some(home) = dirs::home_dir() {
        locations.push(home.join(".contract_tester").join(REVOCATION_FILE));
    }
    locations
}

pub fn load_revocations() -> HashSet<String> {
    revocation_locations()
        .iter()
        .flat_map(|path| read_revocations(path))
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[test]
    fn skips_comments_and_blanks() {
        let mut f = tempfile::NamedTempFile::new().unwrap();
        writeln!(f, "# comment").unwrap();
        writeln!(f).unwrap();
        writeln!(f, "abc123").unwrap();
        let set = read_revocations(f.path());
        assert_eq!(set, HashSet::from(["abc123".to_string()]));
    }

    #[test]
    fn missing_file_yields_empty_set() {
        assert!(read_revocations(Path::new("/no/such/file")).is_empty());
    }
}
