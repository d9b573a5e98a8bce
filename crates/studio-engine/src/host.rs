//! Collaborators supplied by the host application.

use std::fs;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use base64::engine::general_purpose::STANDARD as BASE64;
use base64::Engine as _;
use studio_contracts::results::GeneratedResult;

/// Rasterized export from, and import into, the open document.
pub trait DocumentHost {
    /// PNG of the whole canvas; `None` without an active document.
    fn export_document(&mut self) -> Result<Option<Vec<u8>>>;
    /// PNG of the first active layer; `None` without a document or layer.
    fn export_active_layer(&mut self) -> Result<Option<Vec<u8>>>;
    /// Imports image bytes as a new layer.
    fn place_image(&mut self, image: &[u8]) -> Result<()>;
}

pub trait Clipboard {
    fn copy_text(&mut self, text: &str) -> Result<()>;
}

pub fn decode_image(data: &str) -> Result<Vec<u8>> {
    BASE64
        .decode(data.trim().as_bytes())
        .context("image base64 decode failed")
}

pub fn encode_image(image: &[u8]) -> String {
    BASE64.encode(image)
}

pub fn result_file_name(result: &GeneratedResult) -> String {
    format!("gemini-result-{}.png", result.id)
}

/// Decodes `result` and writes it into `dir`, returning the written path.
pub fn save_result(dir: &Path, result: &GeneratedResult) -> Result<PathBuf> {
    let bytes = decode_image(&result.data)?;
    fs::create_dir_all(dir).with_context(|| format!("failed to create {}", dir.display()))?;
    let path = dir.join(result_file_name(result));
    fs::write(&path, bytes).with_context(|| format!("failed to write {}", path.display()))?;
    Ok(path)
}

#[cfg(test)]
mod tests {
    use base64::Engine as _;
    use studio_contracts::results::GeneratedResult;

    use super::{decode_image, save_result, BASE64};

    #[test]
    fn save_result_writes_decoded_bytes() -> anyhow::Result<()> {
        let temp = tempfile::tempdir()?;
        let result = GeneratedResult {
            id: "1700-0".to_string(),
            data: BASE64.encode(b"\x89PNG-bytes"),
        };
        let path = save_result(&temp.path().join("out"), &result)?;
        assert!(path.ends_with("gemini-result-1700-0.png"));
        assert_eq!(std::fs::read(path)?, b"\x89PNG-bytes");
        Ok(())
    }

    #[test]
    fn invalid_base64_is_an_error() {
        let err = decode_image("!!not base64!!").err();
        assert!(err
            .map(|err| err.to_string().contains("base64 decode failed"))
            .unwrap_or(false));
    }
}
