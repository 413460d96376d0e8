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

//! ## CLIENT ID
//!
//! A short opaque name by which a single client is known to the daemon.
//!
//! -----------------------------------------------------------------------
//!
//! On the wire a [Client ID] is just a bare token between spaces; there is
//! no length prefix and no padding. At certain boundaries, though (the
//! list-clients ACK handed to a consumer, the proxy's client-list view),
//! callers want a fixed-width record they can index into rather than a
//! variable-length string. [Client ID] is kept as an ordinary owned
//! `String` for wire use, and [Fixed Client ID] supplies the canonical
//! NUL-padded `ID_WIDTH`-byte encoding for those boundaries.
//!
//! [Client ID]:       ClientId
//! [Fixed Client ID]: FixedClientId

use std::fmt;

use crate::WireError;

/// The fixed width, in bytes, used to encode a [Client ID] whenever a
/// caller needs a fixed-size record (list-clients ACKs, proxy client-list
/// views). Matches `CLIENTID_LEN` from the daemon's C client library.
///
/// [Client ID]: ClientId
pub const ID_WIDTH: usize = 64;

/// An opaque client name, unique across connected clients at any instant.
///
/// [Client ID]: ClientId
#[derive(Clone, Debug, Default, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct ClientId(String);

impl ClientId {
    /// Builds a [Client ID] from a token taken off the wire or supplied by
    /// a caller. Rejects tokens that could not round-trip through the
    /// fixed-width encoding used at ACK boundaries.
    ///
    /// [Client ID]: ClientId
    pub fn new(id: impl Into<String>) -> Result<Self, WireError> {
        let id = id.into();
        if id.is_empty() {
            return Err(WireError::EmptyClientId);
        }
        // ID_WIDTH includes the terminator, so the name itself must leave
        // room for at least one NUL byte.
        if id.len() >= ID_WIDTH {
            return Err(WireError::ClientIdTooLong { len: id.len() });
        }
        if id.as_bytes().iter().any(|&b| b == b' ' || b == b'\n') {
            return Err(WireError::MalformedClientId);
        }
        Ok(Self(id))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Appends a single underscore, the recovery move used by the driver
    /// bridge after a `clientidinuse` error.
    pub fn with_suffix_underscore(&self) -> Result<Self, WireError> {
        Self::new(format!("{}_", self.0))
    }

    /// Encodes this id as a NUL-padded `ID_WIDTH`-byte record, the
    /// canonical fixed encoding used by list-clients ACKs.
    pub fn to_fixed_bytes(&self) -> [u8; ID_WIDTH] {
        let mut out = [0u8; ID_WIDTH];
        let bytes = self.0.as_bytes();
        out[..bytes.len()].copy_from_slice(bytes);
        out
    }

    /// Decodes a NUL-padded `ID_WIDTH`-byte record back into a [Client ID].
    ///
    /// [Client ID]: ClientId
    pub fn from_fixed_bytes(bytes: &[u8; ID_WIDTH]) -> Result<Self, WireError> {
        let end = bytes.iter().position(|&b| b == 0).unwrap_or(ID_WIDTH);
        let s = std::str::from_utf8(&bytes[..end]).map_err(|_| WireError::MalformedClientId)?;
        Self::new(s)
    }
}

/// Encodes a list-clients response as a contiguous array of fixed-width
/// records: `clients.len() * ID_WIDTH` bytes, each client's
/// [`ClientId::to_fixed_bytes`] laid out back to back in order.
pub fn encode_client_list_ack(clients: &[ClientId]) -> Vec<u8> {
    let mut out = Vec::with_capacity(clients.len() * ID_WIDTH);
    for client in clients {
        out.extend_from_slice(&client.to_fixed_bytes());
    }
    out
}

impl fmt::Display for ClientId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl TryFrom<&str> for ClientId {
    type Error = WireError;

    fn try_from(value: &str) -> Result<Self, Self::Error> {
        Self::new(value)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn round_trips_through_fixed_width() {
        let id = ClientId::new("bot1").unwrap();
        let fixed = id.to_fixed_bytes();
        assert_eq!(ClientId::from_fixed_bytes(&fixed).unwrap(), id);
    }

    #[test]
    fn rejects_overlong_ids() {
        let long = "x".repeat(ID_WIDTH);
        assert!(matches!(
            ClientId::new(long),
            Err(WireError::ClientIdTooLong { .. })
        ));
    }

    #[test]
    fn underscore_suffix_is_used_for_conflict_recovery() {
        let id = ClientId::new("bot1").unwrap();
        let retried = id.with_suffix_underscore().unwrap();
        assert_eq!(retried.as_str(), "bot1_");
    }

    #[test]
    fn client_list_ack_byte_count_is_clients_times_id_width() {
        let clients = vec![
            ClientId::new("bot1").unwrap(),
            ClientId::new("bot2").unwrap(),
            ClientId::new("bot3").unwrap(),
        ];
        let ack = encode_client_list_ack(&clients);
        assert_eq!(ack.len(), clients.len() * ID_WIDTH);
        assert_eq!(
            ClientId::from_fixed_bytes(ack[ID_WIDTH..2 * ID_WIDTH].try_into().unwrap()).unwrap(),
            ClientId::new("bot2").unwrap()
        );
    }
}
