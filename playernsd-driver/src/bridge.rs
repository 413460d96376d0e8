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

//! ## DRIVER BRIDGE
//!
//! Translates middleware requests/commands onto [`playernsd_client::ClientEngine`]
//! calls, and engine callbacks back onto middleware publishes. Owns the
//! receive queue, the client-list view, and the property view — nothing
//! else touches them.

use std::sync::{Mutex, OnceLock};
use std::time::{SystemTime, UNIX_EPOCH};

use playernsd_client::{
    ClientEngine, ClientHandler, ClientId, ConnectionState, InboundMessage, ReceiveQueue,
    ServerError,
};

use crate::config::DriverConfig;
use crate::device::{DeviceSink, Payload, Request};
use crate::error::BridgeError;

fn monotonic_wall_clock_seconds() -> u64 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|d| d.as_secs())
        .unwrap_or(0)
}

/// The bridge between one middleware device and one `playernsd` connection.
/// Built with [`DriverBridge::connect`], which resolves the
/// construction-order cycle with the engine (the bridge is the engine's
/// [`ClientHandler`], but the engine itself has to exist to be driven) by
/// filling in a [`OnceLock`] right after the engine is constructed.
pub struct DriverBridge<D: DeviceSink + 'static> {
    config: DriverConfig,
    device: D,
    engine: OnceLock<std::sync::Arc<ClientEngine<DriverBridge<D>>>>,
    current_id: Mutex<ClientId>,
    recv_queue: ReceiveQueue,
    client_list: Mutex<Vec<ClientId>>,
    last_property: Mutex<Option<(String, Vec<u8>)>>,
    // Held for the entire request/response window of their respective
    // rendezvous kind (spec §4.4: "at most one request of each kind in
    // flight per engine instance"). `Rendezvous` alone only guards against
    // the reader; it releases its own lock across the condvar wait, so two
    // middleware request threads calling the same kind concurrently would
    // otherwise both be in flight at once.
    list_request_lock: Mutex<()>,
    property_request_lock: Mutex<()>,
}

impl<D: DeviceSink + 'static> DriverBridge<D> {
    /// Connects to the daemon named in `config` and returns a running
    /// bridge. Fails the way [`ClientEngine::connect`] fails: could not
    /// resolve or reach any address for `host:port`.
    pub fn connect(config: DriverConfig, device: D) -> Result<std::sync::Arc<Self>, BridgeError> {
        let current_id = config.id().clone();
        let bridge = std::sync::Arc::new(Self {
            config,
            device,
            engine: OnceLock::new(),
            current_id: Mutex::new(current_id),
            recv_queue: ReceiveQueue::new(),
            client_list: Mutex::new(Vec::new()),
            last_property: Mutex::new(None),
            list_request_lock: Mutex::new(()),
            property_request_lock: Mutex::new(()),
        });

        let engine = ClientEngine::new(bridge.clone());
        bridge
            .engine
            .set(engine.clone())
            .unwrap_or_else(|_| panic!("engine already initialized"));

        engine.connect(bridge.config.host(), bridge.config.port())?;
        Ok(bridge)
    }

    fn engine(&self) -> &std::sync::Arc<ClientEngine<DriverBridge<D>>> {
        self.engine.get().expect("engine initialized by connect()")
    }

    pub fn state(&self) -> ConnectionState {
        self.engine().state()
    }

    /// The receive queue of inbound messages (spec §4.5), exclusively owned
    /// by the bridge.
    pub fn receive_queue(&self) -> &ReceiveQueue {
        &self.recv_queue
    }

    pub fn client_list(&self) -> Vec<ClientId> {
        self.client_list.lock().unwrap().clone()
    }

    pub fn last_property(&self) -> Option<(String, Vec<u8>)> {
        self.last_property.lock().unwrap().clone()
    }

    /// Dispatches one middleware request, translating it onto engine calls
    /// and publishing the result (ACK/NACK/data) through the [`DeviceSink`].
    pub fn dispatch(&self, request: Request) -> Result<(), BridgeError> {
        match request {
            Request::ListClients => {
                let _guard = self.list_request_lock.lock().unwrap();
                let ids = self.engine().request_client_list()?;
                *self.client_list.lock().unwrap() = ids.clone();
                self.device.publish_list_clients_ack(&ids);
                Ok(())
            }
            Request::Send { target, payload } => {
                log::debug!(
                    "sending to '{}', {:?}",
                    target.as_ref().map(ClientId::as_str).unwrap_or("all"),
                    payload
                );
                match payload {
                    Payload::Text(body) => self.engine().send_text(target.as_ref(), &body)?,
                    Payload::Binary(bytes) => self.engine().send_binary(target.as_ref(), &bytes)?,
                }
                Ok(())
            }
            Request::PropertyGet { key } => {
                // self.id is served locally and never reaches the socket
                // (spec §4.6, invariant 5).
                if key == "self.id" {
                    self.device
                        .publish_property_ack("self.id", self.config.id().as_str().as_bytes());
                    return Ok(());
                }
                let _guard = self.property_request_lock.lock().unwrap();
                let view = self.engine().property_get(&key)?;
                *self.last_property.lock().unwrap() = Some((view.key.clone(), view.value.clone()));
                self.device.publish_property_ack(&view.key, &view.value);
                Ok(())
            }
            Request::PropertySet { key, value } => {
                self.engine().property_set(&key, &value)?;
                Ok(())
            }
            Request::Position2dSample { x, y, a } => {
                let origin = self.config.origin();
                let relative = format!("{} {} {}", x - origin.x, y - origin.y, a - origin.a);
                self.engine().property_set("self.position", &relative)?;
                Ok(())
            }
        }
    }

    pub fn close(&self) {
        self.engine().close();
    }
}

impl<D: DeviceSink + 'static> ClientHandler for DriverBridge<D> {
    fn state_changed(&self, state: ConnectionState) {
        match state {
            ConnectionState::Greeting => {
                let id = self.current_id.lock().unwrap().clone();
                log::debug!("registering with playernsd server as {id}");
                if let Err(e) = self.engine().register(&id) {
                    log::error!("failed to register as {id}: {e}");
                }
            }
            ConnectionState::Registered => {
                log::debug!("registered with playernsd server");
            }
            _ => {}
        }
    }

    fn error_raised(&self, kind: ServerError, detail: String) {
        match kind {
            ServerError::ClientIdInUse => {
                let retried = {
                    let mut guard = self.current_id.lock().unwrap();
                    *guard = guard.with_suffix_underscore().unwrap_or_else(|_| guard.clone());
                    guard.clone()
                };
                log::info!("client id conflict, retrying as {retried}");
                if let Err(e) = self.engine().register(&retried) {
                    log::error!("failed to re-register as {retried}: {e}");
                }
            }
            other => {
                log::warn!("playernsd error: {other:?} {detail}");
                self.device.publish_error(other, &detail);
            }
        }
    }

    fn receive_text(&self, source: ClientId, body: String) {
        let timestamp = monotonic_wall_clock_seconds();
        self.device.publish_receive(&source, timestamp, body.as_bytes());
        self.recv_queue.push(InboundMessage {
            timestamp,
            source,
            payload: body.into_bytes(),
        });
    }

    fn receive_binary(&self, source: ClientId, payload: Vec<u8>) {
        let timestamp = monotonic_wall_clock_seconds();
        self.device.publish_receive(&source, timestamp, &payload);
        self.recv_queue.push(InboundMessage {
            timestamp,
            source,
            payload,
        });
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::{BufRead, BufReader, Read, Write};
    use std::net::{TcpListener, TcpStream};
    use std::sync::{Arc, Mutex as StdMutex};
    use std::time::Duration;

    struct RecordingSink {
        list_acks: StdMutex<Vec<Vec<ClientId>>>,
        property_acks: StdMutex<Vec<(String, Vec<u8>)>>,
        receives: StdMutex<Vec<(ClientId, Vec<u8>)>>,
    }

    impl RecordingSink {
        fn new() -> Self {
            Self {
                list_acks: StdMutex::new(Vec::new()),
                property_acks: StdMutex::new(Vec::new()),
                receives: StdMutex::new(Vec::new()),
            }
        }
    }

    impl DeviceSink for RecordingSink {
        fn publish_list_clients_ack(&self, clients: &[ClientId]) {
            self.list_acks.lock().unwrap().push(clients.to_vec());
        }
        fn publish_property_ack(&self, key: &str, value: &[u8]) {
            self.property_acks
                .lock()
                .unwrap()
                .push((key.to_string(), value.to_vec()));
        }
        fn publish_nack(&self, _detail: &str) {}
        fn publish_receive(&self, source: &ClientId, _timestamp: u64, payload: &[u8]) {
            self.receives.lock().unwrap().push((source.clone(), payload.to_vec()));
        }
        fn publish_error(&self, _kind: ServerError, _detail: &str) {}
    }

    fn accept_one(listener: &TcpListener) -> (BufReader<TcpStream>, TcpStream) {
        let (stream, _) = listener.accept().unwrap();
        let reader = BufReader::new(stream.try_clone().unwrap());
        (reader, stream)
    }

    fn read_line(reader: &mut BufReader<TcpStream>) -> String {
        let mut line = String::new();
        reader.read_line(&mut line).unwrap();
        line.trim_end_matches(['\n', '\r']).to_string()
    }

    fn wait_for<F: Fn() -> bool>(f: F) {
        for _ in 0..200 {
            if f() {
                return;
            }
            std::thread::sleep(Duration::from_millis(10));
        }
        panic!("condition never became true");
    }

    #[test]
    fn self_id_never_reaches_the_socket() {
        let listener = TcpListener::bind("127.0.0.1:0").unwrap();
        let addr = listener.local_addr().unwrap();

        let server = std::thread::spawn(move || {
            let (mut reader, mut stream) = accept_one(&listener);
            stream.write_all(b"greetings srv playernsd 0001\n").unwrap();
            let line = read_line(&mut reader);
            assert_eq!(line, "greetings bot7 playernsd 0001");
            stream.write_all(b"registered\n").unwrap();
            // Nothing else should ever arrive: a self.id propget must not
            // reach the socket. Prove it by reading with a short timeout.
            stream.set_read_timeout(Some(Duration::from_millis(150))).unwrap();
            let mut buf = [0u8; 1];
            let err = reader.read_exact(&mut buf);
            assert!(err.is_err());
        });

        let config = DriverConfig::new("bot7").unwrap();
        let sink = Arc::new(RecordingSink::new());
        let bridge = {
            let config = config.with_host(addr.ip().to_string()).with_port(addr.port().to_string());
            DriverBridge::connect(config, CloneSink(sink.clone())).unwrap()
        };

        wait_for(|| bridge.state() == ConnectionState::Registered);
        bridge
            .dispatch(Request::PropertyGet { key: "self.id".to_string() })
            .unwrap();

        wait_for(|| !sink.property_acks.lock().unwrap().is_empty());
        assert_eq!(sink.property_acks.lock().unwrap()[0], ("self.id".to_string(), b"bot7".to_vec()));

        bridge.close();
        server.join().unwrap();
    }

    #[test]
    fn list_clients_request_round_trips_through_the_rendezvous() {
        let listener = TcpListener::bind("127.0.0.1:0").unwrap();
        let addr = listener.local_addr().unwrap();

        let server = std::thread::spawn(move || {
            let (mut reader, mut stream) = accept_one(&listener);
            stream.write_all(b"greetings srv playernsd 0001\n").unwrap();
            let _ = read_line(&mut reader);
            stream.write_all(b"registered\n").unwrap();
            let line = read_line(&mut reader);
            assert_eq!(line, "listclients");
            stream.write_all(b"listclients bot1 bot2 bot3\n").unwrap();
            std::thread::sleep(Duration::from_millis(100));
        });

        let config = DriverConfig::new("bot1")
            .unwrap()
            .with_host(addr.ip().to_string())
            .with_port(addr.port().to_string());
        let sink = Arc::new(RecordingSink::new());
        let bridge = DriverBridge::connect(config, CloneSink(sink.clone())).unwrap();

        wait_for(|| bridge.state() == ConnectionState::Registered);
        bridge.dispatch(Request::ListClients).unwrap();

        assert_eq!(
            bridge.client_list(),
            vec![
                ClientId::new("bot1").unwrap(),
                ClientId::new("bot2").unwrap(),
                ClientId::new("bot3").unwrap(),
            ]
        );
        assert_eq!(sink.list_acks.lock().unwrap().len(), 1);

        bridge.close();
        server.join().unwrap();
    }

    #[test]
    fn client_id_conflict_is_retried_automatically() {
        let listener = TcpListener::bind("127.0.0.1:0").unwrap();
        let addr = listener.local_addr().unwrap();

        let server = std::thread::spawn(move || {
            let (mut reader, mut stream) = accept_one(&listener);
            stream.write_all(b"greetings srv playernsd 0001\n").unwrap();
            let first = read_line(&mut reader);
            assert_eq!(first, "greetings bot1 playernsd 0001");
            stream.write_all(b"error clientidinuse \n").unwrap();
            let second = read_line(&mut reader);
            assert_eq!(second, "greetings bot1_ playernsd 0001");
            stream.write_all(b"registered\n").unwrap();
            std::thread::sleep(Duration::from_millis(100));
        });

        let config = DriverConfig::new("bot1")
            .unwrap()
            .with_host(addr.ip().to_string())
            .with_port(addr.port().to_string());
        let sink = Arc::new(RecordingSink::new());
        let bridge = DriverBridge::connect(config, CloneSink(sink.clone())).unwrap();

        wait_for(|| bridge.state() == ConnectionState::Registered);

        bridge.close();
        server.join().unwrap();
    }

    /// Thin `Arc<RecordingSink>` wrapper so `DriverBridge<D>` can own a
    /// `D: DeviceSink` while the test still holds its own handle to inspect
    /// recorded calls.
    struct CloneSink(Arc<RecordingSink>);

    impl DeviceSink for CloneSink {
        fn publish_list_clients_ack(&self, clients: &[ClientId]) {
            self.0.publish_list_clients_ack(clients);
        }
        fn publish_property_ack(&self, key: &str, value: &[u8]) {
            self.0.publish_property_ack(key, value);
        }
        fn publish_nack(&self, detail: &str) {
            self.0.publish_nack(detail);
        }
        fn publish_receive(&self, source: &ClientId, timestamp: u64, payload: &[u8]) {
            self.0.publish_receive(source, timestamp, payload);
        }
        fn publish_error(&self, kind: ServerError, detail: &str) {
            self.0.publish_error(kind, detail);
        }
    }
}
