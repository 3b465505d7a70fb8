use std::fs::{self, File};
use std::io::{self, BufReader, Read, Seek, SeekFrom};
use std::path::{Path, PathBuf};

use fnt_core::{header_size, FntError, FntResult, FormatError, Geometry};
use log::{debug, info};

use crate::{open_fountain, same_file};

/// Appends every whole row of `other` to `target`, then deletes `other`.
/// Returns the number of rows appended.
pub fn merge_from(target: &Path, other: &Path) -> FntResult<usize> {
    let (mut target_file, header) = open_fountain(target, true)?;
    let (other_file, other_header) = open_fountain(other, false)?;
    if same_file(target, other)? {
        return Err(FntError::InvalidArgument("cannot merge a fountain file into itself"));
    }
    if !header.is_compatible(&other_header) {
        return Err(FormatError::Incompatible.into());
    }

    let geometry = header.geometry();
    trim_partial_block(&target_file, &geometry)?;
    let rows = append_rows(&mut target_file, &geometry, other_file)?;
    fs::remove_file(other)?;

    info!("Merged {} rows from {} into {}", rows, other.display(), target.display());
    Ok(rows)
}

/// Folds every compatible fountain file in `target`'s directory into `target`.
///
/// Siblings that cannot be opened, are not fountain files, or carry a
/// different header are left alone. Returns the paths that were merged and
/// deleted.
pub fn merge_siblings(target: &Path) -> FntResult<Vec<PathBuf>> {
    let (mut target_file, header) = open_fountain(target, true)?;
    let geometry = header.geometry();
    trim_partial_block(&target_file, &geometry)?;

    let own = fs::canonicalize(target)?;
    let dir = match target.parent() {
        Some(p) if !p.as_os_str().is_empty() => p.to_path_buf(),
        _ => PathBuf::from("."),
    };
    let mut candidates: Vec<PathBuf> = fs::read_dir(&dir)?
        .filter_map(|entry| entry.ok().map(|e| e.path()))
        .filter(|p| p.is_file())
        .collect();
    candidates.sort();

    let mut merged = Vec::new();
    for path in candidates {
        if fs::canonicalize(&path).ok().as_ref() == Some(&own) { continue; }

        let (other_file, other_header) = match open_fountain(&path, false) {
            Ok(opened) => opened,
            Err(e) => {
                debug!("skipping {}: {}", path.display(), e);
                continue;
            }
        };
        if !header.is_compatible(&other_header) {
            debug!("skipping {}: different source or row size", path.display());
            continue;
        }

        info!("Merging in {}", path.display());
        append_rows(&mut target_file, &geometry, other_file)?;
        fs::remove_file(&path)?;
        merged.push(path);
    }
    Ok(merged)
}

/// Drops a trailing partial block so appended rows stay aligned.
fn trim_partial_block(file: &File, geometry: &Geometry) -> FntResult<()> {
    let len = file.metadata()?.len();
    let aligned = geometry.block_aligned_len(len);
    if aligned != len {
        debug!("trimming {} trailing bytes", len - aligned);
        file.set_len(aligned)?;
    }
    Ok(())
}

fn append_rows(target: &mut File, geometry: &Geometry, other: File) -> FntResult<usize> {
    let rows = geometry.row_count(other.metadata()?.len());
    let bytes = rows as u64 * geometry.block_size() as u64;

    let mut reader = BufReader::new(other);
    reader.seek(SeekFrom::Start(header_size()))?;
    target.seek(SeekFrom::End(0))?;

    let copied = io::copy(&mut reader.take(bytes), target)?;
    if copied != bytes {
        return Err(io::Error::new(io::ErrorKind::UnexpectedEof, "fountain file shrank during merge").into());
    }
    Ok(rows)
}
