//! JSON-RPC/LSP stdio framing.
//!
//! LSP messages are JSON values framed by HTTP-like headers:
//!
//! ```text
//! Content-Length: <n>\r\n
//! \r\n
//! <n bytes of UTF-8 JSON>
//! ```

use serde_json::Value;
use std::io::{self, BufRead, Write};

/// Write a single LSP JSON-RPC message to `writer`.
pub fn write_lsp_message<W: Write + ?Sized>(writer: &mut W, value: &Value) -> io::Result<()> {
    let body =
        serde_json::to_vec(value).map_err(|err| io::Error::new(io::ErrorKind::InvalidData, err))?;

    write!(writer, "Content-Length: {}\r\n\r\n", body.len())?;
    writer.write_all(&body)?;
    writer.flush()?;
    Ok(())
}

/// Read one framed body from `reader` without decoding it.
///
/// Returns `Ok(None)` on clean EOF before a header. A header block without a usable
/// `Content-Length` yields an `InvalidData` error; the stream is still positioned after the
/// blank line, so the caller may keep reading.
pub fn read_lsp_frame<R: BufRead>(reader: &mut R) -> io::Result<Option<Vec<u8>>> {
    let mut content_length: Option<usize> = None;
    let mut line = String::new();

    loop {
        line.clear();
        let read = reader.read_line(&mut line)?;
        if read == 0 {
            return Ok(None);
        }

        let trimmed = line.trim_end_matches(['\r', '\n']);
        if trimmed.is_empty() {
            break;
        }

        if let Some((name, rest)) = trimmed.split_once(':')
            && name.trim().eq_ignore_ascii_case("Content-Length")
        {
            content_length = rest.trim().parse::<usize>().ok();
        }
    }

    let len = content_length
        .filter(|&len| len > 0)
        .ok_or_else(|| io::Error::new(io::ErrorKind::InvalidData, "Missing Content-Length header"))?;

    let mut body = vec![0u8; len];
    reader.read_exact(&mut body)?;
    Ok(Some(body))
}

/// Read and decode a single LSP JSON-RPC message from `reader`.
///
/// Returns:
/// - `Ok(Some(value))` when a message is successfully read.
/// - `Ok(None)` on clean EOF (no more messages).
pub fn read_lsp_message<R: BufRead>(reader: &mut R) -> io::Result<Option<Value>> {
    let Some(body) = read_lsp_frame(reader)? else {
        return Ok(None);
    };
    let value: Value = serde_json::from_slice(&body)
        .map_err(|err| io::Error::new(io::ErrorKind::InvalidData, err))?;
    Ok(Some(value))
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;
    use std::io::Cursor;

    #[test]
    fn test_write_then_read() {
        let mut out = Vec::new();
        write_lsp_message(&mut out, &json!({"jsonrpc": "2.0", "method": "exit"})).unwrap();
        let text = String::from_utf8(out.clone()).unwrap();
        assert!(text.starts_with("Content-Length: 33\r\n\r\n"));

        let mut reader = Cursor::new(out);
        let msg = read_lsp_message(&mut reader).unwrap().unwrap();
        assert_eq!(msg["method"], "exit");
        assert!(read_lsp_message(&mut reader).unwrap().is_none());
    }

    #[test]
    fn test_header_is_case_insensitive_and_extra_headers_ignored() {
        let body = r#"{"id":1}"#;
        let raw = format!(
            "content-length: {}\r\nContent-Type: application/vscode-jsonrpc\r\n\r\n{body}",
            body.len()
        );
        let msg = read_lsp_message(&mut Cursor::new(raw)).unwrap().unwrap();
        assert_eq!(msg["id"], 1);
    }

    #[test]
    fn test_missing_length_is_invalid_data() {
        let mut reader = Cursor::new("X-Other: 1\r\n\r\n");
        let err = read_lsp_frame(&mut reader).unwrap_err();
        assert_eq!(err.kind(), io::ErrorKind::InvalidData);
    }

    #[test]
    fn test_length_counts_bytes_not_chars() {
        let mut out = Vec::new();
        write_lsp_message(&mut out, &json!("héllo")).unwrap();
        let text = String::from_utf8(out).unwrap();
        assert!(text.starts_with("Content-Length: 8\r\n\r\n"));
    }
}
