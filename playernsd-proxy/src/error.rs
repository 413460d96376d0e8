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

use thiserror::Error;

/// Mirrors the original proxy's policy of throwing a descriptive error out
/// of each blocking call rather than returning a result the caller might
/// ignore silently; here it is simply a typed `Result`.
#[derive(Debug, Error)]
pub enum ProxyError {
    #[error("error sending message")]
    SendFailed,

    #[error("error requesting property")]
    PropertyRequestFailed,

    #[error("error setting property")]
    PropertySetFailed,

    #[error("error requesting client list")]
    ClientListRequestFailed,

    #[error(transparent)]
    Wire(#[from] playernsd_wire::WireError),

    #[error(transparent)]
    Client(#[from] playernsd_client::ClientError),
}
