use log::*;
use std::fs;
use std::path::{Path, PathBuf};

use deduper::FileEntry;

/// List every regular file below root.
///
/// Entries which can't be read are logged and ignored. Symbolic links are not
/// followed.
pub fn list_files(root: &Path) -> Vec<FileEntry> {
    let mut files = Vec::new();
    let mut dirs: Vec<PathBuf> = vec![root.to_path_buf()];
    while let Some(dir) = dirs.pop() {
        let entries = match fs::read_dir(&dir) {
            Ok(entries) => entries,
            Err(err) => {
                warn!("Ignoring error for: {}, err: {}", dir.display(), err);
                continue;
            }
        };
        for entry in entries {
            let path = match entry {
                Ok(entry) => entry.path(),
                Err(err) => {
                    warn!("Ignoring error in: {}, err: {}", dir.display(), err);
                    continue;
                }
            };
            match fs::symlink_metadata(&path) {
                Ok(meta) if meta.is_dir() => dirs.push(path),
                Ok(meta) if meta.is_file() => files.push(FileEntry {
                    path,
                    size: meta.len(),
                }),
                Ok(_) => debug!("Skipping: {}", path.display()),
                Err(err) => warn!("Ignoring error for: {}, err: {}", path.display(), err),
            }
        }
    }
    files.sort_by(|a, b| a.path.cmp(&b.path));
    files
}
