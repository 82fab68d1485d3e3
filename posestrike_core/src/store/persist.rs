use std::{
    fs,
    io::ErrorKind,
    path::{Path, PathBuf},
};

use pose_data::document::StoreDocument;

use crate::error::PersistenceError;

/// Reads a store document. `Ok(None)` when the file does not exist.
pub fn read_document(path: &Path) -> Result<Option<StoreDocument>, PersistenceError> {
    let bytes = match fs::read(path) {
        Ok(bytes) => bytes,
        Err(e) if e.kind() == ErrorKind::NotFound => return Ok(None),
        Err(source) => {
            return Err(PersistenceError::Read {
                path: path.to_path_buf(),
                source,
            })
        }
    };
    serde_json::from_slice(&bytes)
        .map(Some)
        .map_err(|source| PersistenceError::Decode {
            path: path.to_path_buf(),
            source,
        })
}

/// Writes the document next to `path` and renames it into place, so a crash
/// mid-write leaves the previous file intact.
pub fn write_document(path: &Path, document: &StoreDocument) -> Result<(), PersistenceError> {
    let json = serde_json::to_vec_pretty(document).map_err(PersistenceError::Encode)?;

    let mut tmp = path.as_os_str().to_owned();
    tmp.push(".tmp");
    let tmp = Path::new(&tmp);

    let write_err = |source| PersistenceError::Write {
        path: path.to_path_buf(),
        source,
    };
    if let Some(dir) = path.parent().filter(|d| !d.as_os_str().is_empty()) {
        fs::create_dir_all(dir).map_err(write_err)?;
    }
    fs::write(tmp, json).map_err(write_err)?;
    fs::rename(tmp, path).map_err(write_err)
}

/// Renames an unreadable store to `<path>.corrupt` so the next save does not
/// overwrite it. Returns the new location.
pub fn set_aside(path: &Path) -> Result<PathBuf, PersistenceError> {
    let mut target = path.as_os_str().to_owned();
    target.push(".corrupt");
    let target = PathBuf::from(target);
    fs::rename(path, &target).map_err(|source| PersistenceError::Write {
        path: target.clone(),
        source,
    })?;
    Ok(target)
}
