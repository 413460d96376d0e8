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

//! # playernsd-wire
//!
//! The wire codec for `playernsd`: a line-oriented ASCII protocol, a
//! handful of commands of which carry a raw binary payload read by length
//! rather than by delimiter. This crate owns framing and parsing only — it
//! knows nothing about sockets, threads, or connection state; that lives
//! in `playernsd-client`.

mod clientid;
mod error;
mod line;
mod reader;

pub use clientid::{encode_client_list_ack, ClientId, ID_WIDTH};
pub use error::{ServerError, WireError};
pub use line::{
    encode_bye, encode_greetings, encode_listclients, encode_msgbin, encode_msgtext,
    encode_pong, encode_propget, encode_propset, encode_requestip, parse_inbound, Inbound,
    PROTOCOL_VERSION,
};
pub use reader::LineReader;
