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

//! ## SERVER ERROR & WIRE ERROR
//!
//! Two distinct enumerations live here and are easy to confuse:
//!
//! - [Server Error] is *data*: the closed set of error kinds `playernsd`
//!   itself can report in an `error <kind>` line.
//! - [Wire Error] is a *failure*: something this crate's codec could not
//!   parse or encode.
//!
//! [Server Error]: ServerError
//! [Wire Error]:   WireError

use thiserror::Error;

/// The closed set of error kinds the daemon can report via an
/// `error <kind> [detail...]` line.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ServerError {
    Unknown,
    ClientIdInUse,
    InvalidParameter,
    InvalidParameterCount,
    UnknownCommand,
    AlreadyRegistered,
    UnknownClient,
    PropertyNotExist,
}

impl ServerError {
    /// Parses the `<kind>` token of an `error` line. Unrecognized tokens
    /// collapse to [`ServerError::Unknown`] rather than failing the parse —
    /// an unrecognized error kind is still a recoverable server error, not
    /// a reason to treat the whole line as malformed.
    pub fn parse(token: &str) -> Self {
        match token {
            "clientidinuse" => ServerError::ClientIdInUse,
            "invalidparameter" => ServerError::InvalidParameter,
            "invalidparametercount" => ServerError::InvalidParameterCount,
            "unknowncommand" => ServerError::UnknownCommand,
            "alreadyregistered" => ServerError::AlreadyRegistered,
            "unknownclient" => ServerError::UnknownClient,
            "propertynotexist" => ServerError::PropertyNotExist,
            _ => ServerError::Unknown,
        }
    }

    pub fn as_token(&self) -> &'static str {
        match self {
            ServerError::Unknown => "unknown",
            ServerError::ClientIdInUse => "clientidinuse",
            ServerError::InvalidParameter => "invalidparameter",
            ServerError::InvalidParameterCount => "invalidparametercount",
            ServerError::UnknownCommand => "unknowncommand",
            ServerError::AlreadyRegistered => "alreadyregistered",
            ServerError::UnknownClient => "unknownclient",
            ServerError::PropertyNotExist => "propertynotexist",
        }
    }
}

/// Failures raised by the wire codec itself: a line could not be framed,
/// parsed, or built into a valid [Client ID].
///
/// [Client ID]: crate::ClientId
#[derive(Debug, Error)]
pub enum WireError {
    #[error("empty line")]
    EmptyLine,

    #[error("line is missing required tokens: {0}")]
    MissingTokens(&'static str),

    #[error("unrecognized command {0:?}")]
    UnknownCommand(String),

    #[error("incompatible protocol version {0:?}, expected \"0001\"")]
    IncompatibleVersion(String),

    #[error("malformed msgbin header: {0}")]
    MalformedMsgBinHeader(&'static str),

    #[error("client id must not be empty")]
    EmptyClientId,

    #[error("client id too long ({len} bytes, must fit within ID_WIDTH)")]
    ClientIdTooLong { len: usize },

    #[error("client id contains a space or newline")]
    MalformedClientId,

    #[error(transparent)]
    Io(#[from] std::io::Error),
}
