// Copyright © 2024 Nathaniel Hardesty
//
// Permission is hereby granted, free of charge, to any person obtaining a copy
// of this software and associated documentation files (the “Software”), to
// deal in the Software without restriction, including without limitation the
// rights to use, copy, modify, merge, publish, distribute, sublicense, and/or
// sell copies of the Software, and to permit persons to whom the Software is
// furnished to do so, subject to the following conditions:
//
// The above copyright notice and this permission notice shall be included in
// all copies or substantial portions of the Software.
//
// THE SOFTWARE IS PROVIDED “AS IS”, WITHOUT WARRANTY OF ANY KIND, EXPRESS OR
// IMPLIED, INCLUDING BUT NOT LIMITED TO THE WARRANTIES OF MERCHANTABILITY,
// FITNESS FOR A PARTICULAR PURPOSE AND NONINFRINGEMENT. IN NO EVENT SHALL THE
// AUTHORS OR COPYRIGHT HOLDERS BE LIABLE FOR ANY CLAIM, DAMAGES OR OTHER
// LIABILITY, WHETHER IN AN ACTION OF CONTRACT, TORT OR OTHERWISE, ARISING
// FROM, OUT OF OR IN CONNECTION WITH THE SOFTWARE OR THE USE OR OTHER DEALINGS
// IN THE SOFTWARE.

//! ## LINE PROTOCOL
//!
//! Framing and parsing for the ASCII, `\n`-delimited, space-tokenized
//! protocol spoken against `playernsd`. A handful of commands
//! carry a raw payload on the line(s) that follow; this module only frames
//! and parses the *header* line for those — the payload itself is read by
//! length through [Line Reader], never by delimiter, so that embedded `\n`
//! and NUL bytes survive intact.
//!
//! [Line Reader]: crate::reader::LineReader

use crate::clientid::ClientId;
use crate::error::{ServerError, WireError};

/// The only protocol version this codec understands.
pub const PROTOCOL_VERSION: &str = "0001";

/// A parsed header line received from the daemon. Some variants
/// (`MsgTextHeader`, `MsgBinHeader`) describe a payload that has not been
/// read yet; the caller must consume it from the same stream before
/// reading the next header line.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Inbound {
    /// `greetings <id> playernsd <ver>`
    Greetings { id: ClientId, version: String },
    /// `registered`
    Registered,
    /// `ping`
    Ping,
    /// `listclients <id1> <id2> ...`
    ListClients(Vec<ClientId>),
    /// `msgtext <source>` — the body occupies the next line verbatim.
    MsgTextHeader { source: ClientId },
    /// `msgbin <source> <length>` — exactly `length` raw bytes follow,
    /// consumed by length rather than by a terminating newline.
    MsgBinHeader { source: ClientId, length: u32 },
    /// `propval <key> <value...>` — value is the remainder of the line
    /// verbatim, including any further spaces.
    PropVal { key: String, value: Vec<u8> },
    /// `error <kind> [detail...]`
    Error { kind: ServerError, detail: String },
}

/// Splits a header line into its first whitespace-delimited token and the
/// (possibly empty) remainder, without discarding interior spaces in the
/// remainder. Used for `propval` and `error`, whose trailing field is
/// taken verbatim rather than re-tokenized.
fn split_first_token(s: &str) -> (&str, &str) {
    match s.find(' ') {
        Some(idx) => (&s[..idx], &s[idx + 1..]),
        None => (s, ""),
    }
}

/// Parses one header line (without its trailing `\n`) received from the
/// daemon. An empty line is rejected with [`WireError::EmptyLine`]; the
/// caller should log this and continue rather than treat it as a fatal
/// protocol violation.
pub fn parse_inbound(line: &str) -> Result<Inbound, WireError> {
    if line.is_empty() {
        return Err(WireError::EmptyLine);
    }

    let (command, rest) = split_first_token(line);
    match command {
        "greetings" => {
            let mut tokens = rest.split(' ');
            let id = tokens.next().ok_or(WireError::MissingTokens("greetings id"))?;
            let server = tokens.next().ok_or(WireError::MissingTokens("greetings server"))?;
            let version = tokens.next().ok_or(WireError::MissingTokens("greetings version"))?;
            if server != "playernsd" {
                return Err(WireError::MissingTokens("greetings server literal"));
            }
            if version != PROTOCOL_VERSION {
                return Err(WireError::IncompatibleVersion(version.to_string()));
            }
            Ok(Inbound::Greetings {
                id: ClientId::new(id)?,
                version: version.to_string(),
            })
        }
        "registered" => Ok(Inbound::Registered),
        "ping" => Ok(Inbound::Ping),
        "listclients" => {
            let clients = rest
                .split(' ')
                .filter(|tok| !tok.is_empty())
                .map(ClientId::new)
                .collect::<Result<Vec<_>, _>>()?;
            Ok(Inbound::ListClients(clients))
        }
        "msgtext" => {
            let source = rest.trim();
            if source.is_empty() {
                return Err(WireError::MissingTokens("msgtext source"));
            }
            Ok(Inbound::MsgTextHeader {
                source: ClientId::new(source)?,
            })
        }
        "msgbin" => {
            let (source, length_str) = split_first_token(rest);
            if source.is_empty() || length_str.is_empty() {
                return Err(WireError::MalformedMsgBinHeader("expected <source> <length>"));
            }
            let length: u32 = length_str
                .trim()
                .parse()
                .map_err(|_| WireError::MalformedMsgBinHeader("length is not a number"))?;
            Ok(Inbound::MsgBinHeader {
                source: ClientId::new(source)?,
                length,
            })
        }
        "propval" => {
            let (key, value) = split_first_token(rest);
            if key.is_empty() {
                return Err(WireError::MissingTokens("propval key"));
            }
            Ok(Inbound::PropVal {
                key: key.to_string(),
                value: value.as_bytes().to_vec(),
            })
        }
        "error" => {
            let (kind, detail) = split_first_token(rest);
            if kind.is_empty() {
                return Err(WireError::MissingTokens("error kind"));
            }
            Ok(Inbound::Error {
                kind: ServerError::parse(kind),
                detail: detail.to_string(),
            })
        }
        other => Err(WireError::UnknownCommand(other.to_string())),
    }
}

/// Serializes `greetings <id> playernsd 0001\n`, used both for the
/// client's initial registration attempt and any retry after a
/// `clientidinuse` error.
pub fn encode_greetings(id: &ClientId) -> Vec<u8> {
    format!("greetings {id} playernsd {PROTOCOL_VERSION}\n").into_bytes()
}

pub fn encode_listclients() -> Vec<u8> {
    b"listclients\n".to_vec()
}

pub fn encode_propget(key: &str) -> Vec<u8> {
    format!("propget {key}\n").into_bytes()
}

pub fn encode_propset(key: &str, value: &str) -> Vec<u8> {
    format!("propset {key} {value}\n").into_bytes()
}

/// Serializes `msgtext <target>\n<body>\n`. An absent target is sent as an
/// empty token, which the daemon treats as a broadcast. `body` must not
/// contain `\n`.
pub fn encode_msgtext(target: Option<&ClientId>, body: &str) -> Vec<u8> {
    let target = target.map(ClientId::as_str).unwrap_or("");
    format!("msgtext {target}\n{body}\n").into_bytes()
}

/// Serializes the binary-send frame. With a target: `msgbin <target>
/// <len>\n<bytes>`. Broadcast (no target): `msgbin <len>\n<bytes>`.
pub fn encode_msgbin(target: Option<&ClientId>, data: &[u8]) -> Vec<u8> {
    let mut out = match target {
        Some(target) => format!("msgbin {target} {}\n", data.len()).into_bytes(),
        None => format!("msgbin {}\n", data.len()).into_bytes(),
    };
    out.extend_from_slice(data);
    out
}

pub fn encode_pong() -> Vec<u8> {
    b"pong\n".to_vec()
}

pub fn encode_bye() -> Vec<u8> {
    b"bye\n".to_vec()
}

/// `requestip <target>` — asks the daemon for a peer's IP address. Not
/// reachable from the driver bridge's dispatch table, only from the
/// engine/proxy directly.
pub fn encode_requestip(target: &ClientId) -> Vec<u8> {
    format!("requestip {target}\n").into_bytes()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_greetings() {
        let parsed = parse_inbound("greetings srv playernsd 0001").unwrap();
        assert_eq!(
            parsed,
            Inbound::Greetings {
                id: ClientId::new("srv").unwrap(),
                version: "0001".to_string(),
            }
        );
    }

    #[test]
    fn rejects_incompatible_version() {
        let err = parse_inbound("greetings srv playernsd 0002").unwrap_err();
        assert!(matches!(err, WireError::IncompatibleVersion(v) if v == "0002"));
    }

    #[test]
    fn rejects_empty_line() {
        assert!(matches!(parse_inbound(""), Err(WireError::EmptyLine)));
    }

    #[test]
    fn propval_keeps_interior_spaces() {
        let parsed = parse_inbound("propval key value with spaces").unwrap();
        match parsed {
            Inbound::PropVal { key, value } => {
                assert_eq!(key, "key");
                assert_eq!(value, b"value with spaces");
            }
            _ => panic!("wrong variant"),
        }
    }

    #[test]
    fn listclients_splits_tokens() {
        let parsed = parse_inbound("listclients bot1 bot2 bot3").unwrap();
        assert_eq!(
            parsed,
            Inbound::ListClients(vec![
                ClientId::new("bot1").unwrap(),
                ClientId::new("bot2").unwrap(),
                ClientId::new("bot3").unwrap(),
            ])
        );
    }

    #[test]
    fn error_line_parses_known_and_unknown_kinds() {
        let parsed = parse_inbound("error clientidinuse").unwrap();
        assert_eq!(
            parsed,
            Inbound::Error {
                kind: ServerError::ClientIdInUse,
                detail: String::new(),
            }
        );
        let parsed = parse_inbound("error somethingnew extra detail").unwrap();
        assert_eq!(
            parsed,
            Inbound::Error {
                kind: ServerError::Unknown,
                detail: "extra detail".to_string(),
            }
        );
    }

    #[test]
    fn msgbin_header_parses_length() {
        let parsed = parse_inbound("msgbin bot2 5").unwrap();
        assert_eq!(
            parsed,
            Inbound::MsgBinHeader {
                source: ClientId::new("bot2").unwrap(),
                length: 5,
            }
        );
    }

    #[test]
    fn encodes_msgbin_broadcast_form() {
        let bytes = encode_msgbin(None, &[1, 2, 3]);
        assert_eq!(bytes, b"msgbin 3\n\x01\x02\x03");
    }

    #[test]
    fn encodes_msgbin_targeted_form() {
        let target = ClientId::new("bot2").unwrap();
        let bytes = encode_msgbin(Some(&target), &[0x00, b'A', b'\n', b'\n', 0xFF]);
        assert_eq!(bytes, b"msgbin bot2 5\n\x00A\n\n\xff");
    }
}
