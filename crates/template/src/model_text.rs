//! Model file bytes <-> template text.
//!
//! Both ASCII and binary STL files are decoded one byte per char so that
//! the exporter can reproduce the input byte-for-byte.

use std::path::Path;

use crate::extract::extract;
use crate::{ParsedTemplate, TemplateError};

/// Only `.stl` files are accepted (case-insensitive)
pub const SUPPORTED_EXTENSION: &str = "stl";
/// Byte written for chars that Latin-1 cannot hold
pub const REPLACEMENT: u8 = b'?';

/// Reject anything that is not an `.stl` file, before parsing
pub fn check_file_name(file_name: &str) -> Result<(), TemplateError> {
    let supported = Path::new(file_name)
        .extension()
        .and_then(|ext| ext.to_str())
        .is_some_and(|ext| ext.eq_ignore_ascii_case(SUPPORTED_EXTENSION));
    if supported {
        Ok(())
    } else {
        Err(TemplateError::InvalidFileType {
            file_name: file_name.to_string(),
        })
    }
}

/// Decode one char per byte (Latin-1)
pub fn decode(bytes: &[u8]) -> String {
    bytes.iter().map(|&b| char::from(b)).collect()
}

/// Inverse of [`decode`]: one byte per char. Model files are Latin-1 text,
/// and values typed by the user follow the same rule; a char above U+00FF
/// has no byte of its own and is written as `?`.
pub fn encode(text: &str) -> Vec<u8> {
    let mut replaced = 0usize;
    let bytes = text
        .chars()
        .map(|c| {
            u8::try_from(u32::from(c)).unwrap_or_else(|_| {
                replaced += 1;
                REPLACEMENT
            })
        })
        .collect();
    if replaced > 0 {
        tracing::warn!(replaced, "Chars outside Latin-1 written as '?'");
    }
    bytes
}

/// ASCII STL files start with `solid` (after leading whitespace, any case)
pub fn is_ascii_stl(text: &str) -> bool {
    text.trim_start()
        .get(..5)
        .is_some_and(|head| head.eq_ignore_ascii_case("solid"))
}

/// Validate the file name, decode the bytes and extract the template
pub fn load_model_file(
    file_name: &str,
    bytes: &[u8],
    use_defaults: bool,
) -> Result<ParsedTemplate, TemplateError> {
    check_file_name(file_name)?;
    let text = decode(bytes);
    tracing::info!(
        file_name,
        bytes = bytes.len(),
        ascii = is_ascii_stl(&text),
        "Loading model file"
    );
    Ok(extract(&text, use_defaults))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_check_file_name() {
        assert!(check_file_name("plate.stl").is_ok());
        assert!(check_file_name("PLATE.STL").is_ok());
        assert!(check_file_name("dir/plate.Stl").is_ok());
        assert_eq!(
            check_file_name("plate.obj"),
            Err(TemplateError::InvalidFileType {
                file_name: "plate.obj".to_string()
            })
        );
        assert!(check_file_name("stl").is_err());
        assert!(check_file_name("plate.stl.txt").is_err());
    }

    #[test]
    fn test_decode_encode_all_bytes() {
        let bytes: Vec<u8> = (0..=255).collect();
        let text = decode(&bytes);
        assert_eq!(text.chars().count(), 256);
        assert_eq!(encode(&text), bytes);
    }

    #[test]
    fn test_encode_is_one_byte_per_char() {
        assert_eq!(encode("Café"), vec![b'C', b'a', b'f', 0xE9]);
        assert_eq!(encode("a€b"), vec![b'a', REPLACEMENT, b'b']);
    }

    #[test]
    fn test_is_ascii_stl() {
        assert!(is_ascii_stl("solid plate\n"));
        assert!(is_ascii_stl("  \n SOLID"));
        assert!(!is_ascii_stl("sol"));
        assert!(!is_ascii_stl("\u{0}\u{0}solid"));
    }

    #[test]
    fn test_load_rejects_before_parsing() {
        let err = load_model_file("notes.txt", b"# TEMPLATE_TEXT_a b", false).unwrap_err();
        assert!(err.to_string().contains("notes.txt"));
    }

    #[test]
    fn test_load_extracts() {
        let t = load_model_file("a.stl", b"solid a\n# TEMPLATE_TEXT_title Hi\n", false).unwrap();
        assert_eq!(t.fields.len(), 1);
        assert_eq!(t.fields[0].id, "title");
    }
}
