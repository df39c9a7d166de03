use std::collections::HashMap;
use std::fs::File;
use std::io::Read;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use blake3::Hasher;
use tracing::debug;

use crate::types::ChangeKind;

/// Compute the hash of a single file.
pub fn compute_file_hash(path: &Path) -> Result<String> {
    let mut hasher = Hasher::new();
    let mut file =
        File::open(path).with_context(|| format!("opening file for hashing: {:?}", path))?;
    let mut buf = [0u8; 8192];
    loop {
        let n = file.read(&mut buf)?;
        if n == 0 {
            break;
        }
        hasher.update(&buf[..n]);
    }
    Ok(hasher.finalize().to_hex().to_string())
}

/// Remembers the last seen content hash of every file that changed, so that
/// saves which leave a file byte-identical can be dropped.
///
/// Enabled by `skip_unchanged_content = true`. A file's first event always
/// passes (there is nothing to compare against yet).
#[derive(Debug, Default)]
pub struct ContentFilter {
    hashes: HashMap<PathBuf, String>,
}

impl ContentFilter {
    pub fn new() -> Self {
        Self {
            hashes: HashMap::new(),
        }
    }

    /// Returns true if the event should be forwarded.
    pub fn is_changed(&mut self, path: &Path, kind: ChangeKind) -> bool {
        if kind == ChangeKind::Unlink {
            self.hashes.remove(path);
            return true;
        }

        let hash = match compute_file_hash(path) {
            Ok(h) => h,
            Err(err) => {
                // Most likely removed again before we got to it.
                debug!(path = ?path, error = %err, "could not hash changed file");
                self.hashes.remove(path);
                return true;
            }
        };

        match self.hashes.insert(path.to_path_buf(), hash.clone()) {
            Some(old) if old == hash => {
                debug!(path = ?path, "content unchanged; dropping event");
                false
            }
            _ => true,
        }
    }
}
