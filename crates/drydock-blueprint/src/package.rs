//! On-disk blueprint folder: `<root>/<name>/bp.sbc` plus optional `thumb.png`.

use std::io::Write;
use std::path::{Path, PathBuf};

use base64::engine::general_purpose::STANDARD as BASE64;
use base64::Engine as _;
use tempfile::NamedTempFile;

use crate::{Error, Result, ThumbnailError};

/// Directory blueprint folders are created under unless configured otherwise.
pub const DEFAULT_ROOT: &str = "blueprints";

/// File name of the blueprint document inside its folder.
pub const BLUEPRINT_FILE_NAME: &str = "bp.sbc";

/// File name of the thumbnail image inside its folder.
pub const THUMBNAIL_FILE_NAME: &str = "thumb.png";

/// Check that a sanitized blueprint name is usable as a single folder name.
pub(crate) fn validate_folder_name(name: &str) -> Result<()> {
    let bad = name.is_empty()
        || name == "."
        || name == ".."
        || name.contains(['/', '\\', '\0']);
    if bad {
        return Err(Error::InvalidName(name.to_string()));
    }
    Ok(())
}

/// Create `<root>/<name>` and any missing parents. Existing folders are reused.
pub(crate) fn ensure_folder(root: &Path, name: &str) -> Result<PathBuf> {
    validate_folder_name(name)?;
    let folder = root.join(name);
    std::fs::create_dir_all(&folder).map_err(|e| Error::io(&folder, e))?;
    Ok(folder)
}

/// Replace `path` with `data`.
///
/// The bytes go to a temporary file in the same folder which is then renamed
/// over the target, so readers see either the old or the new file.
pub(crate) fn write_atomic(path: &Path, data: &[u8]) -> std::io::Result<()> {
    let dir = path.parent().unwrap_or_else(|| Path::new("."));
    let mut file = NamedTempFile::new_in(dir)?;
    file.write_all(data)?;
    file.as_file().sync_all()?;
    file.persist(path).map_err(|e| e.error)?;
    Ok(())
}

/// Decode the payload of a `data:<mime>;base64,<payload>` URI.
///
/// Everything up to the first comma is treated as the header and ignored.
pub fn decode_data_uri(uri: &str) -> std::result::Result<Vec<u8>, ThumbnailError> {
    let (_header, payload) = uri.split_once(',').ok_or(ThumbnailError::MissingPayload)?;
    Ok(BASE64.decode(payload.trim())?)
}

/// Decode a thumbnail data URI and write it into `folder`.
pub(crate) fn write_thumbnail(
    folder: &Path,
    uri: &str,
) -> std::result::Result<PathBuf, ThumbnailError> {
    let image = decode_data_uri(uri)?;
    let path = folder.join(THUMBNAIL_FILE_NAME);
    write_atomic(&path, &image)?;
    Ok(path)
}

/// Delete a thumbnail left in `folder` by an earlier export. Missing is fine.
pub(crate) fn remove_thumbnail(folder: &Path) -> std::io::Result<()> {
    match std::fs::remove_file(folder.join(THUMBNAIL_FILE_NAME)) {
        Err(e) if e.kind() != std::io::ErrorKind::NotFound => Err(e),
        _ => Ok(()),
    }
}
