use percent_encoding::{percent_decode_str, percent_encode_byte};

use crate::fs::error::{FsError, FsResult};

const MAX_PATH_LENGTH: usize = 4096;
pub(crate) const MAX_FILENAME_LENGTH: usize = 255;

pub fn normalize_path(path: &str) -> FsResult<String> {
    if path.is_empty() {
        return Err(FsError::InvalidPath("Empty path".to_string()));
    }

    if path.contains('\0') {
        return Err(FsError::InvalidPath("Path contains NULL character".to_string()));
    }

    if path.len() > MAX_PATH_LENGTH {
        return Err(FsError::PathTooLong(path.len()));
    }

    if !path.starts_with('/') {
        return Err(FsError::InvalidPath("Path must start with /".to_string()));
    }

    let parts: Vec<&str> = path.split('/').filter(|s| !s.is_empty()).collect();

    for part in &parts {
        if part.len() > MAX_FILENAME_LENGTH {
            return Err(FsError::FilenameTooLong(part.len()));
        }
    }

    Ok(format!("/{}", parts.join("/")))
}

/// Returns the file name a path points at, or `None` for the root.
///
/// The namespace is flat: anything below a file is rejected with `NotDirectory`.
pub fn file_name(path: &str) -> FsResult<Option<String>> {
    let normalized = normalize_path(path)?;
    let mut parts = normalized.split('/').filter(|s| !s.is_empty());

    let Some(name) = parts.next() else {
        return Ok(None);
    };
    if parts.next().is_some() {
        return Err(FsError::NotDirectory(format!("/{}", name)));
    }

    Ok(Some(name.to_string()))
}

/// Sanitizes a slug into a single path segment: percent-decode, escape `%`,
/// `_` and control characters, then turn every `/` into `_`.
///
/// `%` keeps decoding unambiguous and `_` is reserved as the stand-in for `/`.
pub fn slug_to_segment(slug: &str) -> String {
    let decoded = percent_decode_str(slug).decode_utf8_lossy();
    let mut segment = String::with_capacity(decoded.len());

    for c in decoded.chars() {
        match c {
            '/' => segment.push('_'),
            '%' | '_' => segment.push_str(percent_encode_byte(c as u8)),
            c if c.is_control() => {
                let mut buf = [0u8; 4];
                for byte in c.encode_utf8(&mut buf).bytes() {
                    segment.push_str(percent_encode_byte(byte));
                }
            }
            c => segment.push(c),
        }
    }

    segment
}

/// Inverse of [`slug_to_segment`]: `_` back to `/`, then percent-decode.
pub fn segment_to_slug(segment: &str) -> String {
    percent_decode_str(&segment.replace('_', "/")).decode_utf8_lossy().into_owned()
}
