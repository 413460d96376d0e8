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

//! ## NSDNET DEVICE SEAM
//!
//! The original proxy is a thin `libplayerc++` wrapper around a `nsdnet_t`
//! device handle reached through IPC to a player server; the device handle
//! itself (the middleware substrate) is out of scope here. [`NsdnetDevice`]
//! models just the synchronous request surface that handle exposes, so
//! [`crate::NsdnetProxy`] is testable against a stub rather than a real
//! middleware connection.

use playernsd_wire::ClientId;

use crate::error::ProxyError;

/// The synchronous request surface a proxy drives. Each method corresponds
/// to one blocking call into the underlying device in the original
/// (`nsdnet_send_message`, `nsdnet_property_get`, ...).
pub trait NsdnetDevice: Send + Sync {
    fn send_message(&self, target: Option<&ClientId>, data: &[u8]) -> Result<(), ProxyError>;
    fn request_property(&self, key: &str) -> Result<(), ProxyError>;
    /// The most recently retrieved property value, as last filled by
    /// [`request_property`](Self::request_property).
    fn property_value(&self) -> Vec<u8>;
    fn set_property(&self, key: &str, value: &str) -> Result<(), ProxyError>;
    fn request_client_list(&self) -> Result<Vec<ClientId>, ProxyError>;
}
