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

//! ## PROXY FACADE
//!
//! A client-side convenience wrapper over the same playernsd device a
//! driver exposes: send/receive text and binary messages, request and
//! read properties, request and read the client list. The proxy owns its
//! own receive queue, populated by whatever wires it to the middleware
//! calling [`NsdnetProxy::on_message_received`] — the middleware's
//! subscribe/callback plumbing itself is out of scope.

use std::sync::Mutex;

use playernsd_client::{InboundMessage, ReceiveQueue};
use playernsd_wire::ClientId;

use crate::device::NsdnetDevice;
use crate::error::ProxyError;

pub struct NsdnetProxy<D: NsdnetDevice> {
    device: Mutex<D>,
    recv_queue: ReceiveQueue,
    client_list: Mutex<Vec<ClientId>>,
}

impl<D: NsdnetDevice> NsdnetProxy<D> {
    pub fn new(device: D) -> Self {
        Self {
            device: Mutex::new(device),
            recv_queue: ReceiveQueue::new(),
            client_list: Mutex::new(Vec::new()),
        }
    }

    /// Sends a message. `target = None` broadcasts, mirroring the
    /// original's overload pair (`SendMessage(target, ...)` /
    /// `SendMessage(...)`) collapsed into one optional target.
    pub fn send_message(&self, target: Option<&ClientId>, data: &[u8]) -> Result<(), ProxyError> {
        self.device.lock().unwrap().send_message(target, data)
    }

    /// Called by whatever bridges this proxy to the middleware's incoming
    /// data callback. Not part of the original's public API surface (the
    /// original's device handle fills its queue from inside libplayerc's
    /// own read thread) but is the seam that plays the same role here.
    pub fn on_message_received(&self, msg: InboundMessage) {
        self.recv_queue.push(msg);
    }

    /// Pops the oldest received message, or `None` if the queue is empty.
    /// Returns `(timestamp, source, payload)`, matching the original's
    /// `ReceiveMessage(timestamp, source, message)` out-parameters.
    pub fn receive_message(&self) -> Option<(u64, ClientId, Vec<u8>)> {
        self.recv_queue.pop().map(|msg| (msg.timestamp, msg.source, msg.payload))
    }

    pub fn receive_message_count(&self) -> u64 {
        self.recv_queue.len()
    }

    pub fn request_property(&self, key: &str) -> Result<(), ProxyError> {
        self.device.lock().unwrap().request_property(key)
    }

    pub fn get_property(&self) -> Vec<u8> {
        self.device.lock().unwrap().property_value()
    }

    pub fn set_property(&self, key: &str, value: &str) -> Result<(), ProxyError> {
        self.device.lock().unwrap().set_property(key, value)
    }

    /// Requests the client list and caches it for [`get_client_list`](Self::get_client_list).
    pub fn request_client_list(&self) -> Result<(), ProxyError> {
        let clients = self.device.lock().unwrap().request_client_list()?;
        *self.client_list.lock().unwrap() = clients;
        Ok(())
    }

    pub fn get_client_list(&self) -> Vec<ClientId> {
        self.client_list.lock().unwrap().clone()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Mutex as StdMutex;

    struct StubDevice {
        property: StdMutex<Vec<u8>>,
        clients: Vec<ClientId>,
        sent: StdMutex<Vec<(Option<ClientId>, Vec<u8>)>>,
    }

    impl NsdnetDevice for StubDevice {
        fn send_message(&self, target: Option<&ClientId>, data: &[u8]) -> Result<(), ProxyError> {
            self.sent.lock().unwrap().push((target.cloned(), data.to_vec()));
            Ok(())
        }
        fn request_property(&self, key: &str) -> Result<(), ProxyError> {
            *self.property.lock().unwrap() = format!("value-of-{key}").into_bytes();
            Ok(())
        }
        fn property_value(&self) -> Vec<u8> {
            self.property.lock().unwrap().clone()
        }
        fn set_property(&self, _key: &str, _value: &str) -> Result<(), ProxyError> {
            Ok(())
        }
        fn request_client_list(&self) -> Result<Vec<ClientId>, ProxyError> {
            Ok(self.clients.clone())
        }
    }

    fn stub() -> StubDevice {
        StubDevice {
            property: StdMutex::new(Vec::new()),
            clients: vec![ClientId::new("bot1").unwrap(), ClientId::new("bot2").unwrap()],
            sent: StdMutex::new(Vec::new()),
        }
    }

    #[test]
    fn request_then_get_property_round_trips() {
        let proxy = NsdnetProxy::new(stub());
        proxy.request_property("self.battery").unwrap();
        assert_eq!(proxy.get_property(), b"value-of-self.battery".to_vec());
    }

    #[test]
    fn request_then_get_client_list_round_trips() {
        let proxy = NsdnetProxy::new(stub());
        proxy.request_client_list().unwrap();
        assert_eq!(
            proxy.get_client_list(),
            vec![ClientId::new("bot1").unwrap(), ClientId::new("bot2").unwrap()]
        );
    }

    #[test]
    fn receive_queue_delivers_messages_pushed_from_middleware_callback() {
        let proxy = NsdnetProxy::new(stub());
        assert_eq!(proxy.receive_message_count(), 0);
        proxy.on_message_received(InboundMessage {
            timestamp: 42,
            source: ClientId::new("bot1").unwrap(),
            payload: b"hello".to_vec(),
        });
        assert_eq!(proxy.receive_message_count(), 1);
        let (timestamp, source, payload) = proxy.receive_message().unwrap();
        assert_eq!(timestamp, 42);
        assert_eq!(source, ClientId::new("bot1").unwrap());
        assert_eq!(payload, b"hello".to_vec());
        assert!(proxy.receive_message().is_none());
    }

    #[test]
    fn broadcast_send_passes_no_target() {
        let device = stub();
        let proxy = NsdnetProxy::new(device);
        proxy.send_message(None, b"hi all").unwrap();
        proxy.send_message(Some(&ClientId::new("bot2").unwrap()), b"hi bot2").unwrap();
    }
}
