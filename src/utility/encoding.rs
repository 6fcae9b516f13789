use std::{fs, path::Path};

use anyhow::{Context, Result};
use encoding_rs::UTF_8;

// A UTF-8 or UTF-16 BOM wins, otherwise the document is read as UTF-8
pub fn decode_markup(bytes: &[u8]) -> String {
    let (text, used, had_errors) = UTF_8.decode(bytes);
    if had_errors {
        tracing::warn!(
            encoding = used.name(),
            "input contains malformed sequences, replaced with U+FFFD"
        );
    }

    text.into_owned()
}

pub fn read_markup(path: &Path) -> Result<String> {
    let bytes =
        fs::read(path).with_context(|| format!("Failed to open {}", path.display()))?;
    Ok(decode_markup(&bytes))
}
