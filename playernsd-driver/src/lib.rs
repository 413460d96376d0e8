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

//! # playernsd-driver
//!
//! The driver-side bridge between a robotics middleware device and a
//! `playernsd` connection: translates middleware requests onto
//! `playernsd-client` engine calls, short-circuits `self.id`, and forwards
//! engine callbacks (state changes, server errors, inbound messages) back
//! onto the middleware's publish surface.
//!
//! The middleware device-table/pub-sub substrate itself is out of scope;
//! this crate models its interface as the [`DeviceSink`] trait so the
//! bridge is directly testable without a real middleware.

mod bridge;
mod config;
mod device;
mod error;

pub use bridge::DriverBridge;
pub use config::{DriverConfig, Origin};
pub use device::{DeviceSink, Payload, Request};
pub use error::BridgeError;

pub use playernsd_client::{ClientEngine, ClientHandler, ConnectionState};
pub use playernsd_wire::{ClientId, ServerError};
