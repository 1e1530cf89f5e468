use crate::model::PhotoAttachment;
use std::fs::{self, File, create_dir_all};
use std::io::Write;
use std::path::{Path, PathBuf};

/// Store an uploaded photo under `dir` as `<item_id>_<YYYYMMDD_HHMMSS><ext>`.
///
/// The directory is created when missing. Returns the path written.
pub fn save_photo(dir: &Path, item_id: &str, photo: &PhotoAttachment) -> std::io::Result<PathBuf> {
    if !dir.exists() {
        create_dir_all(dir)?;
    }

    let timestamp = chrono::Local::now().format("%Y%m%d_%H%M%S");
    let filename = format!("{}_{}{}", item_id, timestamp, photo.extension());
    let path = dir.join(filename);

    let mut file = File::create(&path)?;
    file.write_all(&photo.bytes)?;
    log::info!("photo for {} saved to {}", item_id, path.display());

    Ok(path)
}

/// Read a photo from disk into an attachment, keeping the file name.
pub fn read_photo(path: &Path) -> std::io::Result<PhotoAttachment> {
    let bytes = fs::read(path)?;
    let filename = path
        .file_name()
        .and_then(|name| name.to_str())
        .unwrap_or("photo")
        .to_string();
    Ok(PhotoAttachment::new(bytes, filename))
}
