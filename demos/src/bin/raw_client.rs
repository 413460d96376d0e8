//! A bare wire-protocol client: connects, registers, broadcasts "Hello
//! World <n>" every half second the way `original_source/examples/
//! example_client.cc` does, and logs anything received in between.
//!
//! Usage: `raw_client <id> [host] [port]`

use std::sync::Arc;
use std::thread;
use std::time::Duration;

use playernsd_client::{ClientEngine, ClientHandler, ClientId, ConnectionState, ServerError};

struct LoggingHandler;

impl ClientHandler for LoggingHandler {
    fn state_changed(&self, state: ConnectionState) {
        log::info!("state changed: {state:?}");
    }
    fn error_raised(&self, kind: ServerError, detail: String) {
        log::warn!("server error: {kind:?} {detail}");
    }
    fn receive_text(&self, source: ClientId, body: String) {
        println!("{source}: {body}");
    }
    fn receive_binary(&self, source: ClientId, payload: Vec<u8>) {
        println!("{source}: <{} bytes binary>", payload.len());
    }
}

fn main() {
    env_logger::init();

    let mut args = std::env::args().skip(1);
    let id = args.next().unwrap_or_else(|| {
        eprintln!("usage: raw_client <id> [host] [port]");
        std::process::exit(1);
    });
    let host = args.next().unwrap_or_else(|| "localhost".to_string());
    let port = args.next().unwrap_or_else(|| "9999".to_string());

    let handler = Arc::new(LoggingHandler);
    let engine = ClientEngine::new(handler);
    engine.connect(&host, &port).expect("could not connect to playernsd");

    // register() is normally called from state_changed(Greeting); this demo
    // polls instead to keep the handler trivial.
    while engine.state() != ConnectionState::Greeting {
        thread::sleep(Duration::from_millis(20));
    }
    let client_id = ClientId::new(id).expect("invalid client id");
    engine.register(&client_id).expect("register failed");
    while engine.state() != ConnectionState::Registered {
        thread::sleep(Duration::from_millis(20));
    }
    log::info!("registered as {client_id}");

    for n in 0..100 {
        engine
            .send_text(None, &format!("Hello World {n}"))
            .expect("send failed");
        thread::sleep(Duration::from_millis(500));
    }

    engine.close();
}
