use std::fs;
use std::io;
use std::path::Path;

use tally_core::{order_entries, FileEntry};
use tally_logging::{tally_debug, tally_warn};

use crate::ScanError;

/// Lists `folder` (non-recursive) and returns its entries in processing order.
///
/// Every entry is inspected; directories and entries whose metadata cannot be
/// read come back with `is_regular_file() == false`. Any failure to list the
/// folder itself aborts the scan.
pub fn scan(folder: &Path) -> Result<Vec<FileEntry>, ScanError> {
    let meta = fs::metadata(folder).map_err(|err| match err.kind() {
        io::ErrorKind::NotFound => ScanError::NotFound(folder.to_path_buf()),
        _ => unreadable(folder, err),
    })?;
    if !meta.is_dir() {
        return Err(ScanError::NotADirectory(folder.to_path_buf()));
    }

    let mut entries = Vec::new();
    for dir_entry in fs::read_dir(folder).map_err(|err| unreadable(folder, err))? {
        let dir_entry = dir_entry.map_err(|err| unreadable(folder, err))?;
        let raw_name = dir_entry.file_name();
        let Some(name) = raw_name.to_str() else {
            tally_warn!("Skipping entry with non UTF-8 name: {:?}", raw_name);
            entries.push(FileEntry::new(raw_name.to_string_lossy(), false));
            continue;
        };

        // Follows symlinks, so a link to a document counts as a file.
        let is_regular_file = match fs::metadata(dir_entry.path()) {
            Ok(meta) => meta.is_file(),
            Err(err) => {
                tally_warn!("Cannot stat {}: {}", name, err);
                false
            }
        };
        entries.push(FileEntry::new(name, is_regular_file));
    }

    order_entries(&mut entries);
    tally_debug!("Scanned {} entries in {}", entries.len(), folder.display());
    Ok(entries)
}

fn unreadable(folder: &Path, source: io::Error) -> ScanError {
    ScanError::Unreadable {
        path: folder.to_path_buf(),
        source,
    }
}
