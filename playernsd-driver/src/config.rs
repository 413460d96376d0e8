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

//! ## DRIVER CONFIGURATION
//!
//! The fields a driver instance reads once at construction (spec §6).
//! Parsing an actual configuration file or Stage world file is out of
//! scope (spec §1's Non-goals) — a caller that owns that parsing hands the
//! already-resolved values to [`DriverConfig`] directly.

use std::path::PathBuf;

use playernsd_wire::ClientId;

use crate::error::BridgeError;

/// The pose/localization origin a position2d sample is expressed relative
/// to, read from a Stage world file in the original system. Defaults to the
/// coordinate-system origin.
#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub struct Origin {
    pub x: f64,
    pub y: f64,
    pub a: f64,
}

/// Configuration read once at driver construction (spec §6). `id` is
/// required; everything else has the defaults the original driver used.
#[derive(Clone, Debug)]
pub struct DriverConfig {
    id: ClientId,
    host: String,
    port: String,
    position2d: Option<String>,
    world_file: Option<PathBuf>,
    origin: Origin,
}

impl DriverConfig {
    /// Builds a configuration with the required `id` and the defaults
    /// `host = "localhost"`, `port = "9999"`. A missing or malformed `id`
    /// is a construction-time error, not a panic (spec §6).
    pub fn new(id: impl AsRef<str>) -> Result<Self, BridgeError> {
        let id = ClientId::new(id.as_ref()).map_err(|_| BridgeError::MissingId)?;
        Ok(Self {
            id,
            host: "localhost".to_string(),
            port: "9999".to_string(),
            position2d: None,
            world_file: None,
            origin: Origin::default(),
        })
    }

    pub fn with_host(mut self, host: impl Into<String>) -> Self {
        self.host = host.into();
        self
    }

    pub fn with_port(mut self, port: impl Into<String>) -> Self {
        self.port = port.into();
        self
    }

    pub fn with_position2d(mut self, addr: impl Into<String>) -> Self {
        self.position2d = Some(addr.into());
        self
    }

    pub fn with_world_file(mut self, path: impl Into<PathBuf>) -> Self {
        self.world_file = Some(path.into());
        self
    }

    pub fn with_origin(mut self, origin: Origin) -> Self {
        self.origin = origin;
        self
    }

    pub fn id(&self) -> &ClientId {
        &self.id
    }

    pub fn host(&self) -> &str {
        &self.host
    }

    pub fn port(&self) -> &str {
        &self.port
    }

    pub fn position2d(&self) -> Option<&str> {
        self.position2d.as_deref()
    }

    pub fn world_file(&self) -> Option<&PathBuf> {
        self.world_file.as_ref()
    }

    pub fn origin(&self) -> Origin {
        self.origin
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_match_the_original_driver() {
        let config = DriverConfig::new("bot1").unwrap();
        assert_eq!(config.host(), "localhost");
        assert_eq!(config.port(), "9999");
        assert_eq!(config.position2d(), None);
        assert_eq!(config.origin(), Origin::default());
    }

    #[test]
    fn empty_id_is_a_construction_error() {
        assert!(matches!(DriverConfig::new(""), Err(BridgeError::MissingId)));
    }
}
