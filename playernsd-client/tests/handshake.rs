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

//! End-to-end tests against a loopback stub standing in for `playernsd`,
//! exercising the scenarios named in spec §8.

use std::io::{BufRead, BufReader, Read, Write};
use std::net::{TcpListener, TcpStream};
use std::sync::{Arc, Mutex};
use std::time::Duration;

use playernsd_client::{ClientEngine, ClientHandler, ClientId, ConnectionState, ServerError};

struct RecordingHandler {
    states: Mutex<Vec<ConnectionState>>,
    errors: Mutex<Vec<(ServerError, String)>>,
    texts: Mutex<Vec<(ClientId, String)>>,
    binaries: Mutex<Vec<(ClientId, Vec<u8>)>>,
}

impl RecordingHandler {
    fn new() -> Arc<Self> {
        Arc::new(Self {
            states: Mutex::new(Vec::new()),
            errors: Mutex::new(Vec::new()),
            texts: Mutex::new(Vec::new()),
            binaries: Mutex::new(Vec::new()),
        })
    }

    fn states(&self) -> Vec<ConnectionState> {
        self.states.lock().unwrap().clone()
    }
}

impl ClientHandler for RecordingHandler {
    fn state_changed(&self, state: ConnectionState) {
        self.states.lock().unwrap().push(state);
    }
    fn error_raised(&self, kind: ServerError, detail: String) {
        self.errors.lock().unwrap().push((kind, detail));
    }
    fn receive_text(&self, source: ClientId, body: String) {
        self.texts.lock().unwrap().push((source, body));
    }
    fn receive_binary(&self, source: ClientId, payload: Vec<u8>) {
        self.binaries.lock().unwrap().push((source, payload));
    }
}

/// Accepts one connection and hands back buffered read/write halves so the
/// test can script the stub daemon's side of the exchange line by line.
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

fn wait_for_state(handler: &RecordingHandler, state: ConnectionState) {
    for _ in 0..200 {
        if handler.states().last() == Some(&state) {
            return;
        }
        std::thread::sleep(Duration::from_millis(10));
    }
    panic!("timed out waiting for state {state:?}, saw {:?}", handler.states());
}

#[test]
fn handshake_reaches_registered_in_order() {
    let listener = TcpListener::bind("127.0.0.1:0").unwrap();
    let addr = listener.local_addr().unwrap();

    let server = std::thread::spawn(move || {
        let (mut reader, mut stream) = accept_one(&listener);
        stream.write_all(b"greetings srv playernsd 0001\n").unwrap();
        let line = read_line(&mut reader);
        assert_eq!(line, "greetings bot1 playernsd 0001");
        stream.write_all(b"registered\n").unwrap();
        // keep the stream open until the test drops its handle
        std::thread::sleep(Duration::from_millis(100));
    });

    let handler = RecordingHandler::new();
    let engine = ClientEngine::new(handler.clone());
    engine.connect(&addr.ip().to_string(), &addr.port().to_string()).unwrap();

    wait_for_state(&handler, ConnectionState::Greeting);
    engine.register(&ClientId::new("bot1").unwrap()).unwrap();
    wait_for_state(&handler, ConnectionState::Registered);

    assert_eq!(
        handler.states(),
        vec![
            ConnectionState::Connected,
            ConnectionState::Greeting,
            ConnectionState::WaitingRegistration,
            ConnectionState::Registered,
        ]
    );

    engine.close();
    server.join().unwrap();
}

#[test]
fn client_id_conflict_recovers_with_underscore_suffix() {
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

    let handler = RecordingHandler::new();
    let engine = ClientEngine::new(handler.clone());
    engine.connect(&addr.ip().to_string(), &addr.port().to_string()).unwrap();

    wait_for_state(&handler, ConnectionState::Greeting);
    let mut id = ClientId::new("bot1").unwrap();
    engine.register(&id).unwrap();

    // wait for the clientidinuse error, then retry with the suffixed id,
    // mirroring the driver bridge's ErrorRaised(ClientIdInUse) handling.
    for _ in 0..200 {
        if !handler.errors.lock().unwrap().is_empty() {
            break;
        }
        std::thread::sleep(Duration::from_millis(10));
    }
    assert_eq!(handler.errors.lock().unwrap()[0].0, ServerError::ClientIdInUse);
    wait_for_state(&handler, ConnectionState::Greeting);
    id = id.with_suffix_underscore().unwrap();
    engine.register(&id).unwrap();
    wait_for_state(&handler, ConnectionState::Registered);

    engine.close();
    server.join().unwrap();
}

#[test]
fn binary_payload_with_embedded_newlines_round_trips() {
    let listener = TcpListener::bind("127.0.0.1:0").unwrap();
    let addr = listener.local_addr().unwrap();

    let server = std::thread::spawn(move || {
        let (mut reader, mut stream) = accept_one(&listener);
        stream.write_all(b"greetings srv playernsd 0001\n").unwrap();
        let _ = read_line(&mut reader);
        stream.write_all(b"registered\n").unwrap();

        let mut frame = b"msgbin bot2 5\n".to_vec();
        frame.extend_from_slice(&[0x00, b'A', b'\n', b'\n', 0xff]);
        stream.write_all(&frame).unwrap();
        std::thread::sleep(Duration::from_millis(100));
    });

    let handler = RecordingHandler::new();
    let engine = ClientEngine::new(handler.clone());
    engine.connect(&addr.ip().to_string(), &addr.port().to_string()).unwrap();
    wait_for_state(&handler, ConnectionState::Greeting);
    engine.register(&ClientId::new("bot1").unwrap()).unwrap();
    wait_for_state(&handler, ConnectionState::Registered);

    for _ in 0..200 {
        if !handler.binaries.lock().unwrap().is_empty() {
            break;
        }
        std::thread::sleep(Duration::from_millis(10));
    }
    let binaries = handler.binaries.lock().unwrap();
    assert_eq!(binaries.len(), 1);
    assert_eq!(binaries[0].0, ClientId::new("bot2").unwrap());
    assert_eq!(binaries[0].1, vec![0x00, b'A', b'\n', b'\n', 0xff]);
    drop(binaries);

    engine.close();
    server.join().unwrap();
}

#[test]
fn ping_is_answered_with_pong_regardless_of_state() {
    let listener = TcpListener::bind("127.0.0.1:0").unwrap();
    let addr = listener.local_addr().unwrap();

    let server = std::thread::spawn(move || {
        let (mut reader, mut stream) = accept_one(&listener);
        stream.write_all(b"greetings srv playernsd 0001\n").unwrap();
        stream.write_all(b"ping\n").unwrap();
        let mut buf = [0u8; 5];
        reader.read_exact(&mut buf).unwrap();
        assert_eq!(&buf, b"pong\n");
    });

    let handler = RecordingHandler::new();
    let engine = ClientEngine::new(handler.clone());
    engine.connect(&addr.ip().to_string(), &addr.port().to_string()).unwrap();
    wait_for_state(&handler, ConnectionState::Greeting);

    server.join().unwrap();
    engine.close();
}
