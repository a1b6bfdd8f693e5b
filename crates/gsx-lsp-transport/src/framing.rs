//! `Content-Length` message framing for the LSP base protocol.

use std::io::{self, BufRead, Read, Write};

use gsx_lsp_protocol::JsonRpcRequest;
use serde::Serialize;

/// Reads one `Content-Length`-framed message body from `reader`, without
/// interpreting it.
///
/// Parses the `Content-Length: N\r\n\r\n` header block, then reads exactly
/// `N` bytes of JSON body and returns them raw. Returns `Ok(None)` at a
/// clean EOF between messages (no header line read at all); any other
/// truncation is an error. [`read_message`] and the host-language proxy's
/// response reader both build on this so there is exactly one
/// Content-Length parser in the workspace.
pub fn read_frame<R: BufRead>(reader: &mut R) -> io::Result<Option<Vec<u8>>> {
    let mut content_length: Option<usize> = None;
    let mut saw_any_header_line = false;

    loop {
        let mut line = String::new();
        let bytes_read = reader.read_line(&mut line)?;
        if bytes_read == 0 {
            if saw_any_header_line {
                return Err(io::Error::new(
                    io::ErrorKind::UnexpectedEof,
                    "connection closed mid-header",
                ));
            }
            return Ok(None);
        }
        saw_any_header_line = true;
        let trimmed = line.trim_end_matches(['\r', '\n']);
        if trimmed.is_empty() {
            break;
        }
        if let Some(value) = trimmed.strip_prefix("Content-Length:") {
            content_length = value.trim().parse::<usize>().ok();
        }
        // Any other header (e.g. Content-Type) is accepted and ignored.
    }

    let length = content_length
        .ok_or_else(|| io::Error::new(io::ErrorKind::InvalidData, "missing Content-Length header"))?;

    let mut body = vec![0u8; length];
    reader.read_exact(&mut body)?;
    Ok(Some(body))
}

/// Reads one framed LSP message from `reader` and parses it as an incoming
/// request or notification.
///
/// Returns `Ok(None)` at a clean EOF between messages; see [`read_frame`].
pub fn read_message<R: BufRead>(reader: &mut R) -> io::Result<Option<JsonRpcRequest>> {
    let Some(body) = read_frame(reader)? else { return Ok(None) };
    let request: JsonRpcRequest = serde_json::from_slice(&body)
        .map_err(|e| io::Error::new(io::ErrorKind::InvalidData, e))?;
    Ok(Some(request))
}

/// Serializes `message` and writes it to `writer` with a `Content-Length`
/// header, per the LSP base protocol.
pub fn write_message<W: Write, T: Serialize>(writer: &mut W, message: &T) -> io::Result<()> {
    let body = serde_json::to_vec(message).map_err(|e| io::Error::new(io::ErrorKind::InvalidData, e))?;
    write!(writer, "Content-Length: {}\r\n\r\n", body.len())?;
    writer.write_all(&body)?;
    writer.flush()
}

/// Writes a JSON-RPC notification (no `id` field) with the same framing as
/// [`write_message`].
pub fn write_notification<W: Write>(
    writer: &mut W,
    method: &str,
    params: serde_json::Value,
) -> io::Result<()> {
    let notification = serde_json::json!({
        "jsonrpc": "2.0",
        "method": method,
        "params": params,
    });
    write_message(writer, &notification)
}

/// Debug-logs an outgoing response body. A no-op unless the process's debug
/// log file is configured (see `gsx_lsp::util::debug_log`); kept here so
/// transport-level logging has one call site regardless of which debug
/// sink is active.
pub fn log_response<T: Serialize>(message: &T) {
    if let Ok(json) = serde_json::to_string(message) {
        log::trace!(target: "gsx_lsp_transport", "outgoing: {json}");
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::BufReader;

    #[test]
    fn reads_a_framed_request() {
        let body = br#"{"jsonrpc":"2.0","id":1,"method":"initialize","params":null}"#;
        let framed = format!("Content-Length: {}\r\n\r\n", body.len());
        let mut full = framed.into_bytes();
        full.extend_from_slice(body);
        let mut reader = BufReader::new(&full[..]);

        let request = read_message(&mut reader).unwrap().unwrap();
        assert_eq!(request.method, "initialize");
    }

    #[test]
    fn clean_eof_before_any_header_returns_none() {
        let mut reader = BufReader::new(&b""[..]);
        assert!(read_message(&mut reader).unwrap().is_none());
    }

    #[test]
    fn truncated_header_is_an_error() {
        let mut reader = BufReader::new(&b"Content-Length: 10\r\n"[..]);
        assert!(read_message(&mut reader).is_err());
    }

    #[test]
    fn write_message_frames_with_content_length() {
        let mut buf = Vec::new();
        write_message(&mut buf, &serde_json::json!({"a": 1})).unwrap();
        let text = String::from_utf8(buf).unwrap();
        assert!(text.starts_with("Content-Length: 9\r\n\r\n"));
        assert!(text.ends_with(r#"{"a":1}"#));
    }

    #[test]
    fn write_notification_has_no_id_field() {
        let mut buf = Vec::new();
        write_notification(&mut buf, "textDocument/publishDiagnostics", serde_json::json!({})).unwrap();
        let text = String::from_utf8(buf).unwrap();
        let body_start = text.find("\r\n\r\n").unwrap() + 4;
        let value: serde_json::Value = serde_json::from_str(&text[body_start..]).unwrap();
        assert!(value.get("id").is_none());
        assert_eq!(value["method"], "textDocument/publishDiagnostics");
    }
}
