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

//! ## DEVICE SEAM
//!
//! The real middleware device-table/pub-sub substrate is out of scope;
//! its *interface* is modeled here as a small [`DeviceSink`] trait so
//! [`crate::DriverBridge`]'s dispatch logic is directly testable. This
//! abstracts a responding entity's policy as plain closures/trait methods
//! instead of hard-wiring one concrete behavior.

use playernsd_wire::{ClientId, ServerError};

/// One incoming request or command the driver dispatches (message-kind,
/// subtype, address collapsed here to a single enum discriminant — the
/// address/kind/subtype triple is the middleware's business, not this
/// bridge's).
#[derive(Clone, Debug, PartialEq)]
pub enum Request {
    /// `REQ list-clients`
    ListClients,
    /// `CMD send` — `target = None` is the broadcast form.
    Send { target: Option<ClientId>, payload: Payload },
    /// `REQ property-get`
    PropertyGet { key: String },
    /// `CMD property-set`
    PropertySet { key: String, value: String },
    /// `DATA position2d state` or `DATA position2d geom` — both give the
    /// same `(x, y, a) = (px − origin_x, py − origin_y, pa − origin_a)`
    /// formula, so both are modeled as one sample kind.
    Position2dSample { x: f64, y: f64, a: f64 },
}

#[derive(Clone, Debug, PartialEq)]
pub enum Payload {
    Text(String),
    Binary(Vec<u8>),
}

/// The middleware-facing publish surface a [`DriverBridge`](crate::DriverBridge)
/// drives. A real implementation forwards these to `Device::Publish`; tests
/// use a recording stub.
pub trait DeviceSink: Send + Sync {
    /// ACKs a list-clients request with the daemon's last-known client
    /// list. A real middleware implementation serializes `clients` as a
    /// contiguous fixed-width-record array before handing it to
    /// `Device::Publish` — see `playernsd_wire::encode_client_list_ack`
    /// for that encoding; the actual XDR/middleware serialization step
    /// itself is out of scope here.
    fn publish_list_clients_ack(&self, clients: &[ClientId]);

    /// ACKs a property-get request with the resolved key/value.
    fn publish_property_ack(&self, key: &str, value: &[u8]);

    /// NACKs a request the bridge could not satisfy.
    fn publish_nack(&self, detail: &str);

    /// Publishes an inbound text or binary message to subscribers
    /// (`DATA_RECV`).
    fn publish_receive(&self, source: &ClientId, timestamp: u64, payload: &[u8]);

    /// Publishes a daemon-reported error to subscribers (`DATA_ERROR`).
    fn publish_error(&self, kind: ServerError, detail: &str);
}
