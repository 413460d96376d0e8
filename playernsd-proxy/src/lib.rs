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

//! # playernsd-proxy
//!
//! The client-side convenience facade over a playernsd-backed device:
//! send/receive text and binary messages, property get/set, client-list
//! request/read. Each operation serializes on the proxy's own mutex for
//! the duration of the underlying device call, the way `NSDNetProxy` holds
//! `mPc->mMutex` around every libplayerc++ call.

mod device;
mod error;
mod proxy;

pub use device::NsdnetDevice;
pub use error::ProxyError;
pub use proxy::NsdnetProxy;

pub use playernsd_client::InboundMessage;
pub use playernsd_wire::ClientId;
