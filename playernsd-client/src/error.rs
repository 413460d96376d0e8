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

//! ## CLIENT ERROR
//!
//! Failures raised by the client engine, as distinct from [`playernsd_wire::WireError`]
//! (a codec-level parse failure) and [`playernsd_wire::ServerError`] (a daemon-reported
//! error kind, carried inside [`ClientError::ServerRejected`]).

use thiserror::Error;

use playernsd_wire::ServerError;

#[derive(Debug, Error)]
pub enum ClientError {
    #[error("already connected")]
    AlreadyConnected,

    #[error("not connected")]
    NotConnected,

    #[error("could not resolve or reach any address for {host}:{port}")]
    ConnectFailed { host: String, port: String },

    #[error("incompatible protocol version {0:?}, expected \"0001\"")]
    IncompatibleVersion(String),

    #[error("Register called outside the Greeting state")]
    RegisterOutsideGreeting,

    #[error("connection lost while waiting for a reply")]
    ConnectionLost,

    #[error("daemon rejected the request: {0:?}")]
    ServerRejected(ServerError),

    #[error(transparent)]
    Wire(#[from] playernsd_wire::WireError),

    #[error(transparent)]
    Io(#[from] std::io::Error),
}
