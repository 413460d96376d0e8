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

//! ## CLIENT ENGINE
//!
//! Owns the TCP socket and drives the connection state machine described by
//! the wire protocol: a reader thread parses inbound lines and dispatches
//! them, a writer thread drains the [`SendQueue`] onto the socket. The two
//! never touch each other directly; everything they need to coordinate on —
//! connection state, the two rendezvous slots — is reached through `self`.
//!
//! To use the [Client Engine]:
//!
//! - Build one with [`ClientEngine::new`], supplying a [`ClientHandler`].
//! - [`connect`](ClientEngine::connect) to the daemon.
//! - [`register`](ClientEngine::register) once the handler observes
//!   [`ConnectionState::Greeting`].
//! - Send traffic with [`send_text`](ClientEngine::send_text),
//!   [`send_binary`](ClientEngine::send_binary),
//!   [`property_set`](ClientEngine::property_set),
//!   [`request_client_list`](ClientEngine::request_client_list), and
//!   [`property_get`](ClientEngine::property_get).
//! - [`close`](ClientEngine::close) when done.
//!
//! [Client Engine]: ClientEngine

use std::io::Write;
use std::net::{Shutdown, TcpStream, ToSocketAddrs};
use std::sync::{Arc, RwLock};
use std::thread;

use playernsd_wire::{
    encode_bye, encode_greetings, encode_listclients, encode_msgbin, encode_msgtext,
    encode_pong, encode_propget, encode_propset, encode_requestip, ClientId, Inbound, LineReader,
    ServerError,
};

use crate::error::ClientError;
use crate::queue::SendQueue;
use crate::rendezvous::Rendezvous;

/// The connection's observable state (spec §4.3). Transitions are driven
/// exclusively by the reader thread and by [`ClientEngine::connect`],
/// [`ClientEngine::register`], and [`ClientEngine::close`].
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ConnectionState {
    Disconnected,
    Connected,
    Greeting,
    WaitingRegistration,
    Registered,
}

/// A daemon-reported property value, as last observed by a `propget`.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct PropertyView {
    pub key: String,
    pub value: Vec<u8>,
}

/// Capability set an engine consumer implements to receive callbacks. All
/// methods fire on the reader thread; implementations must not block.
pub trait ClientHandler: Send + Sync {
    fn state_changed(&self, state: ConnectionState);
    fn error_raised(&self, kind: ServerError, detail: String);
    fn receive_text(&self, source: ClientId, body: String);
    fn receive_binary(&self, source: ClientId, payload: Vec<u8>);
}

pub struct ClientEngine<H: ClientHandler + 'static> {
    state: RwLock<ConnectionState>,
    stream: RwLock<Option<TcpStream>>,
    send_queue: RwLock<Arc<SendQueue>>,
    handler: Arc<H>,
    list_rendezvous: Rendezvous<Vec<ClientId>>,
    prop_rendezvous: Rendezvous<PropertyView>,
}

impl<H: ClientHandler + 'static> ClientEngine<H> {
    /// Builds an engine in the [`Disconnected`](ConnectionState::Disconnected)
    /// state, ready for [`connect`](Self::connect).
    pub fn new(handler: Arc<H>) -> Arc<Self> {
        Arc::new(Self {
            state: RwLock::new(ConnectionState::Disconnected),
            stream: RwLock::new(None),
            send_queue: RwLock::new(Arc::new(SendQueue::new())),
            handler,
            list_rendezvous: Rendezvous::new(),
            prop_rendezvous: Rendezvous::new(),
        })
    }

    pub fn state(&self) -> ConnectionState {
        *self.state.read().unwrap()
    }

    /// Resolves `host:port` and attempts each resolved address in order
    /// until one connects. Starts the reader and writer threads on success.
    pub fn connect(self: &Arc<Self>, host: &str, port: &str) -> Result<(), ClientError> {
        if self.state() != ConnectionState::Disconnected {
            return Err(ClientError::AlreadyConnected);
        }

        let port_number: u16 = port.parse().map_err(|_| ClientError::ConnectFailed {
            host: host.to_string(),
            port: port.to_string(),
        })?;
        let addrs = (host, port_number)
            .to_socket_addrs()
            .map_err(|_| ClientError::ConnectFailed {
                host: host.to_string(),
                port: port.to_string(),
            })?;

        let mut connected = None;
        for addr in addrs {
            if let Ok(stream) = TcpStream::connect(addr) {
                connected = Some(stream);
                break;
            }
        }
        let stream = connected.ok_or_else(|| ClientError::ConnectFailed {
            host: host.to_string(),
            port: port.to_string(),
        })?;

        let reader_stream = stream.try_clone()?;
        let writer_stream = stream.try_clone()?;
        *self.stream.write().unwrap() = Some(stream);

        let queue = Arc::new(SendQueue::new());
        *self.send_queue.write().unwrap() = queue.clone();
        self.list_rendezvous.reset();
        self.prop_rendezvous.reset();

        self.transition(ConnectionState::Connected);

        let reader_self = self.clone();
        thread::spawn(move || reader_self.reader_loop(reader_stream));
        let writer_self = self.clone();
        thread::spawn(move || writer_self.writer_loop(writer_stream, queue));

        Ok(())
    }

    /// Sends the registration `greetings` line. Must be called while the
    /// engine is in the [`Greeting`](ConnectionState::Greeting) state,
    /// typically from [`ClientHandler::state_changed`] itself.
    pub fn register(self: &Arc<Self>, id: &ClientId) -> Result<(), ClientError> {
        if self.state() != ConnectionState::Greeting {
            return Err(ClientError::RegisterOutsideGreeting);
        }
        self.send_queue.read().unwrap().push(encode_greetings(id))?;
        self.transition(ConnectionState::WaitingRegistration);
        Ok(())
    }

    /// Requests the current client list and blocks until the daemon
    /// replies or the connection is lost.
    pub fn request_client_list(self: &Arc<Self>) -> Result<Vec<ClientId>, ClientError> {
        if self.state() != ConnectionState::Registered {
            return Err(ClientError::NotConnected);
        }
        let queue = self.send_queue.read().unwrap().clone();
        self.list_rendezvous.request(|| queue.push(encode_listclients()))
    }

    /// Requests a property's value and blocks until the daemon replies or
    /// the connection is lost.
    pub fn property_get(self: &Arc<Self>, key: &str) -> Result<PropertyView, ClientError> {
        if self.state() != ConnectionState::Registered {
            return Err(ClientError::NotConnected);
        }
        let queue = self.send_queue.read().unwrap().clone();
        self.prop_rendezvous.request(|| queue.push(encode_propget(key)))
    }

    pub fn property_set(self: &Arc<Self>, key: &str, value: &str) -> Result<(), ClientError> {
        self.send_queue.read().unwrap().push(encode_propset(key, value))
    }

    pub fn send_text(self: &Arc<Self>, target: Option<&ClientId>, body: &str) -> Result<(), ClientError> {
        self.send_queue.read().unwrap().push(encode_msgtext(target, body))
    }

    pub fn send_binary(self: &Arc<Self>, target: Option<&ClientId>, data: &[u8]) -> Result<(), ClientError> {
        self.send_queue.read().unwrap().push(encode_msgbin(target, data))
    }

    /// Asks the daemon for a peer's IP address. Carried over from
    /// `original_source/playernsd_client.cc` as an ambient supplement (see
    /// SPEC_FULL.md §4.1) — `playernsd` does not reply to `requestip` with a
    /// distinguishable header this codec models, so this is fire-and-forget
    /// rather than a rendezvous kind.
    pub fn request_ip(self: &Arc<Self>, target: &ClientId) -> Result<(), ClientError> {
        self.send_queue.read().unwrap().push(encode_requestip(target))
    }

    /// Interrupts both loops, best-effort writes `bye`, and closes the
    /// socket. Idempotent — calling this on an already-disconnected engine
    /// is a no-op beyond re-asserting the Disconnected state.
    pub fn close(self: &Arc<Self>) {
        let queue = self.send_queue.read().unwrap().clone();
        let _ = queue.push(encode_bye());
        queue.close();
        if let Some(stream) = self.stream.write().unwrap().take() {
            let _ = stream.shutdown(Shutdown::Both);
        }
        self.transition(ConnectionState::Disconnected);
        self.list_rendezvous.cancel();
        self.prop_rendezvous.cancel();
    }

    /// Sets the state and, if it actually changed, fires exactly one
    /// `state_changed` callback (spec invariant 3).
    fn transition(&self, new: ConnectionState) {
        let changed = {
            let mut state = self.state.write().unwrap();
            let changed = *state != new;
            *state = new;
            changed
        };
        if changed {
            self.handler.state_changed(new);
        }
    }

    /// Sets the state without firing `state_changed`. Used only for the
    /// `clientidinuse` recovery path: a `state_changed(Greeting)` callback
    /// there would let a handler re-register with the still-unrenamed id
    /// before `error_raised` gets a chance to rename it. Grounded on
    /// `original_source/playernsd_client.cc`, which sets
    /// `connectionState = StateGreeting` by direct assignment rather than
    /// through `changeState()` on this exact path.
    fn set_state_silently(&self, new: ConnectionState) {
        *self.state.write().unwrap() = new;
    }

    fn handle_disconnect(self: &Arc<Self>) {
        if let Some(stream) = self.stream.write().unwrap().take() {
            let _ = stream.shutdown(Shutdown::Both);
        }
        self.send_queue.read().unwrap().close();
        self.transition(ConnectionState::Disconnected);
        self.list_rendezvous.cancel();
        self.prop_rendezvous.cancel();
    }

    fn reader_loop(self: Arc<Self>, stream: TcpStream) {
        let mut reader = LineReader::new(stream);
        loop {
            let line = match reader.read_line() {
                Ok(Some(line)) => line,
                Ok(None) => {
                    log::info!("playernsd-client: connection closed by peer");
                    self.handle_disconnect();
                    return;
                }
                Err(e) => {
                    log::error!("playernsd-client: read error: {e}");
                    self.handle_disconnect();
                    return;
                }
            };

            if line.is_empty() {
                log::warn!("playernsd-client: ignoring empty line");
                continue;
            }

            let parsed = match playernsd_wire::parse_inbound(&line) {
                Ok(parsed) => parsed,
                Err(playernsd_wire::WireError::IncompatibleVersion(version)) => {
                    log::error!("playernsd-client: incompatible protocol version {version:?}");
                    self.handle_disconnect();
                    return;
                }
                Err(playernsd_wire::WireError::MalformedMsgBinHeader(reason)) => {
                    log::error!("playernsd-client: malformed msgbin header: {reason}");
                    self.handle_disconnect();
                    return;
                }
                Err(e) => {
                    log::warn!("playernsd-client: ignoring unparsable line {line:?}: {e}");
                    continue;
                }
            };

            // Pings are answered regardless of state or registration status.
            if let Inbound::Ping = parsed {
                let _ = self.send_queue.read().unwrap().push(encode_pong());
                continue;
            }

            if let Err(fatal) = self.dispatch(parsed, &mut reader) {
                log::error!("playernsd-client: {fatal}");
                self.handle_disconnect();
                return;
            }
        }
    }

    fn dispatch(
        self: &Arc<Self>,
        parsed: Inbound,
        reader: &mut LineReader<TcpStream>,
    ) -> Result<(), ClientError> {
        match (self.state(), parsed) {
            (ConnectionState::Connected, Inbound::Greetings { version, .. }) => {
                debug_assert_eq!(version, playernsd_wire::PROTOCOL_VERSION);
                self.transition(ConnectionState::Greeting);
                Ok(())
            }
            (ConnectionState::Greeting, Inbound::Error { kind, detail }) => {
                self.handler.error_raised(kind, detail);
                Ok(())
            }
            (ConnectionState::WaitingRegistration, Inbound::Registered) => {
                self.transition(ConnectionState::Registered);
                Ok(())
            }
            (ConnectionState::WaitingRegistration, Inbound::Error { kind: ServerError::ClientIdInUse, detail }) => {
                // Silent: firing state_changed(Greeting) here would let a
                // handler's Greeting callback re-register with the stale id
                // before error_raised below has renamed it.
                self.set_state_silently(ConnectionState::Greeting);
                self.handler.error_raised(ServerError::ClientIdInUse, detail);
                Ok(())
            }
            (ConnectionState::WaitingRegistration, Inbound::Error { kind, detail }) => {
                self.handler.error_raised(kind, detail);
                Ok(())
            }
            (ConnectionState::Registered, inbound) => self.dispatch_registered(inbound, reader),
            (state, inbound) => Err(unexpected_command(state, &inbound)),
        }
    }

    fn dispatch_registered(
        self: &Arc<Self>,
        parsed: Inbound,
        reader: &mut LineReader<TcpStream>,
    ) -> Result<(), ClientError> {
        match parsed {
            Inbound::ListClients(ids) => {
                self.list_rendezvous.fulfill(ids);
                Ok(())
            }
            Inbound::PropVal { key, value } => {
                self.prop_rendezvous.fulfill(PropertyView { key, value });
                Ok(())
            }
            Inbound::MsgTextHeader { source } => {
                let body = reader.read_line()?.ok_or(ClientError::Io(std::io::Error::from(
                    std::io::ErrorKind::UnexpectedEof,
                )))?;
                self.handler.receive_text(source, body);
                Ok(())
            }
            Inbound::MsgBinHeader { source, length } => {
                let payload = reader.read_exact(length as usize)?;
                self.handler.receive_binary(source, payload);
                Ok(())
            }
            Inbound::Error { kind, detail } => {
                self.handler.error_raised(kind, detail);
                Ok(())
            }
            other => Err(unexpected_command(ConnectionState::Registered, &other)),
        }
    }

    fn writer_loop(self: Arc<Self>, mut stream: TcpStream, queue: Arc<SendQueue>) {
        while let Some(frame) = queue.pop() {
            if let Err(e) = stream.write_all(&frame) {
                log::error!("playernsd-client: write error: {e}");
                self.handle_disconnect();
                return;
            }
        }
    }
}

fn unexpected_command(state: ConnectionState, inbound: &Inbound) -> ClientError {
    ClientError::Io(std::io::Error::new(
        std::io::ErrorKind::InvalidData,
        format!("unexpected command {inbound:?} in state {state:?}"),
    ))
}
