//! `file://` URI helpers for document and workspace identifiers.

use std::fmt::Write as _;
use std::path::{self, Path, PathBuf};

fn absolute(path: &Path) -> PathBuf {
    path::absolute(path).unwrap_or_else(|_| path.to_path_buf())
}

/// The path in URI form: forward slashes with a leading `/`.
fn uri_path(path: &Path) -> String {
    let text = path.to_string_lossy();
    if !cfg!(windows) {
        return text.into_owned();
    }
    let slashed = text.replace('\\', "/");
    if slashed.starts_with('/') {
        slashed
    } else {
        format!("/{slashed}")
    }
}

/// Convert a filesystem path to a `file://` URI.
///
/// Relative paths are made absolute against the current directory. The file does not need to
/// exist.
pub fn path_to_file_uri(path: &Path) -> String {
    format!("file://{}", percent_encode_path(&uri_path(&absolute(path))))
}

/// URI of the directory containing `path`, used as the workspace root.
pub fn root_uri_for(path: &Path) -> String {
    let abs = absolute(path);
    path_to_file_uri(abs.parent().unwrap_or(abs.as_path()))
}

fn is_path_safe(byte: u8) -> bool {
    byte.is_ascii_alphanumeric() || b"-._~/".contains(&byte)
}

/// Percent-encode a path for use in a URI. Unreserved bytes and `/` are kept.
pub fn percent_encode_path(path: &str) -> String {
    path.bytes()
        .fold(String::with_capacity(path.len()), |mut out, byte| {
            if is_path_safe(byte) {
                out.push(char::from(byte));
            } else {
                let _ = write!(out, "%{byte:02X}");
            }
            out
        })
}

/// Decode `%XX` escapes. Malformed escapes are kept literally.
pub fn percent_decode_path(path: &str) -> String {
    let mut out = Vec::with_capacity(path.len());
    let mut rest = path.as_bytes();
    while let Some((&byte, tail)) = rest.split_first() {
        let escaped = match tail {
            [hi, lo, ..] if byte == b'%' && hi.is_ascii_hexdigit() && lo.is_ascii_hexdigit() => {
                std::str::from_utf8(&tail[..2])
                    .ok()
                    .and_then(|hex| u8::from_str_radix(hex, 16).ok())
            }
            _ => None,
        };
        match escaped {
            Some(decoded) => {
                out.push(decoded);
                rest = &tail[2..];
            }
            None => {
                out.push(byte);
                rest = tail;
            }
        }
    }
    String::from_utf8_lossy(&out).into_owned()
}

/// Convert a `file://` URI back into a filesystem path. Other schemes yield `None`.
pub fn file_uri_to_path(uri: &str) -> Option<PathBuf> {
    let rest = uri.strip_prefix("file://")?;
    let decoded = percent_decode_path(rest.strip_prefix("localhost").unwrap_or(rest));
    if !cfg!(windows) {
        return Some(PathBuf::from(decoded));
    }
    // `/C:/dir` -> `C:\dir`
    let trimmed = match decoded.as_bytes() {
        [b'/', _, b':', ..] => &decoded[1..],
        _ => decoded.as_str(),
    };
    Some(PathBuf::from(trimmed.replace('/', "\\")))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_percent_encoding_keeps_separators() {
        assert_eq!(percent_encode_path("/tmp/a b/c#1.rs"), "/tmp/a%20b/c%231.rs");
        assert_eq!(percent_decode_path("/tmp/a%20b/c%231.rs"), "/tmp/a b/c#1.rs");
        assert_eq!(percent_decode_path("100%"), "100%");
        assert_eq!(percent_decode_path("a%20"), "a ");
        assert_eq!(percent_decode_path("%+1%zz"), "%+1%zz");
        assert_eq!(percent_encode_path("/d\u{e9}j\u{e0}"), "/d%C3%A9j%C3%A0");
    }

    #[cfg(unix)]
    #[test]
    fn test_file_uri_round_trip() {
        let path = Path::new("/tmp/hello world/main.go");
        let uri = path_to_file_uri(path);
        assert_eq!(uri, "file:///tmp/hello%20world/main.go");
        assert_eq!(file_uri_to_path(&uri).unwrap(), path);
        assert_eq!(root_uri_for(path), "file:///tmp/hello%20world");
    }

    #[cfg(unix)]
    #[test]
    fn test_localhost_authority_and_other_schemes() {
        assert_eq!(
            file_uri_to_path("file://localhost/etc/hosts").unwrap(),
            PathBuf::from("/etc/hosts")
        );
        assert!(file_uri_to_path("untitled:Untitled-1").is_none());
    }
}
