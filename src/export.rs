// Export: encode whatever the last render left on the surface as PNG.
// Nothing here re-renders; the picture is exactly what the window shows (minus the HUD).

use crate::error::Error;
use image::codecs::png::PngEncoder;
use image::{ExtendedColorType, ImageEncoder, RgbaImage};
use std::fs;
use std::path::{Path, PathBuf};

/// Fixed name of the downloaded picture.
pub const EXPORT_FILE_NAME: &str = "meme.png";

/// Encode the surface to PNG bytes.
pub fn encode_png(surface: &RgbaImage) -> Result<Vec<u8>, Error> {
    let mut bytes = Vec::new();
    PngEncoder::new(&mut bytes)
        .write_image(surface.as_raw(), surface.width(), surface.height(), ExtendedColorType::Rgba8)
        .map_err(|e| Error::ExportFailure(format!("encode png: {e}")))?;
    Ok(bytes)
}

/// Encode and write `<dir>/meme.png`, creating `dir` if needed. Returns the written path.
pub fn save(surface: &RgbaImage, dir: &Path) -> Result<PathBuf, Error> {
    let bytes = encode_png(surface)?;

    if !dir.as_os_str().is_empty() && !dir.exists() {
        fs::create_dir_all(dir)
            .map_err(|e| Error::ExportFailure(format!("create {}: {e}", dir.display())))?;
    }

    let path = dir.join(EXPORT_FILE_NAME);
    fs::write(&path, &bytes)
        .map_err(|e| Error::ExportFailure(format!("write {}: {e}", path.display())))?;
    log::info!("exported {} ({} bytes)", path.display(), bytes.len());
    Ok(path)
}
