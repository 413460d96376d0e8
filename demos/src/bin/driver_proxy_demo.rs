//! Wires a [`playernsd_driver::DriverBridge`] directly to a
//! [`playernsd_proxy::NsdnetProxy`] in one process, standing in for the
//! middleware IPC hop the real system would otherwise cross: the proxy's
//! `NsdnetDevice` calls are implemented by dispatching straight onto the
//! bridge. Demonstrates the request/response round trip end to end —
//! `self.id`, a property get/set, and a list-clients request.
//!
//! Usage: `driver_proxy_demo <id> [host] [port]`

use std::sync::Arc;
use std::time::Duration;

use playernsd_driver::{ConnectionState, DeviceSink, DriverBridge, DriverConfig, Payload, Request};
use playernsd_proxy::{ClientId, NsdnetDevice, NsdnetProxy, ProxyError};
use playernsd_wire::ServerError;

/// A `DeviceSink` that just logs every publish — there is no real
/// middleware in this demo to forward to.
struct LoggingSink;

impl DeviceSink for LoggingSink {
    fn publish_list_clients_ack(&self, clients: &[ClientId]) {
        log::info!("ACK list-clients: {clients:?}");
    }
    fn publish_property_ack(&self, key: &str, value: &[u8]) {
        log::info!("ACK property {key} = {:?}", String::from_utf8_lossy(value));
    }
    fn publish_nack(&self, detail: &str) {
        log::warn!("NACK: {detail}");
    }
    fn publish_receive(&self, source: &ClientId, timestamp: u64, payload: &[u8]) {
        println!("[{timestamp}] {source}: {}", String::from_utf8_lossy(payload));
    }
    fn publish_error(&self, kind: ServerError, detail: &str) {
        log::warn!("server error: {kind:?} {detail}");
    }
}

/// Adapts a running [`DriverBridge`] to the [`NsdnetDevice`] seam the proxy
/// drives, the way a real middleware IPC hop would adapt driver requests on
/// one side and proxy calls on the other.
struct BridgeDevice {
    bridge: Arc<DriverBridge<LoggingSink>>,
}

impl NsdnetDevice for BridgeDevice {
    fn send_message(&self, target: Option<&ClientId>, data: &[u8]) -> Result<(), ProxyError> {
        self.bridge
            .dispatch(Request::Send {
                target: target.cloned(),
                payload: Payload::Text(String::from_utf8_lossy(data).into_owned()),
            })
            .map_err(|_| ProxyError::SendFailed)
    }

    fn request_property(&self, key: &str) -> Result<(), ProxyError> {
        self.bridge
            .dispatch(Request::PropertyGet { key: key.to_string() })
            .map_err(|_| ProxyError::PropertyRequestFailed)
    }

    fn property_value(&self) -> Vec<u8> {
        self.bridge.last_property().map(|(_, v)| v).unwrap_or_default()
    }

    fn set_property(&self, key: &str, value: &str) -> Result<(), ProxyError> {
        self.bridge
            .dispatch(Request::PropertySet {
                key: key.to_string(),
                value: value.to_string(),
            })
            .map_err(|_| ProxyError::PropertySetFailed)
    }

    fn request_client_list(&self) -> Result<Vec<ClientId>, ProxyError> {
        self.bridge
            .dispatch(Request::ListClients)
            .map_err(|_| ProxyError::ClientListRequestFailed)?;
        Ok(self.bridge.client_list())
    }
}

fn main() {
    env_logger::init();

    let mut args = std::env::args().skip(1);
    let id = args.next().unwrap_or_else(|| {
        eprintln!("usage: driver_proxy_demo <id> [host] [port]");
        std::process::exit(1);
    });
    let host = args.next().unwrap_or_else(|| "localhost".to_string());
    let port = args.next().unwrap_or_else(|| "9999".to_string());

    let config = DriverConfig::new(id).expect("id must not be empty").with_host(host).with_port(port);
    let bridge = DriverBridge::connect(config, LoggingSink).expect("could not connect to playernsd");

    while bridge.state() != ConnectionState::Registered {
        std::thread::sleep(Duration::from_millis(20));
    }

    let proxy = NsdnetProxy::new(BridgeDevice { bridge: bridge.clone() });

    proxy.request_property("self.id").expect("self.id request failed");
    println!("client id: {}", String::from_utf8_lossy(&proxy.get_property()));

    proxy.set_property("self.battery", "0.97").expect("property set failed");

    proxy.request_client_list().expect("list-clients request failed");
    println!("clients: {:?}", proxy.get_client_list());

    proxy.send_message(None, b"hello from the demo").expect("send failed");

    bridge.close();
}
