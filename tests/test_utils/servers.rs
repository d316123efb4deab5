//! Minimal collectors used by integration tests.
//!
//! Each server accepts a fixed number of connections in sequence and reports
//! every received line, so tests can observe reconnects as well as payloads.

use std::{
    io::{BufRead, BufReader, Read},
    net::{SocketAddr, TcpListener},
    sync::mpsc,
    thread,
    time::Duration,
};

use native_tls::{Identity, TlsAcceptor};

const RECV_TIMEOUT: Duration = Duration::from_secs(5);

/// Something a test collector observed.
#[derive(Debug, PartialEq, Eq)]
pub enum CollectorEvent {
    /// A line (terminator included) arrived on connection `n`.
    Line(usize, String),
    /// Connection `n` ended.
    Closed(usize),
    /// The TLS handshake on connection `n` failed.
    HandshakeFailed(usize, String),
}

/// Handle to a running test collector.
pub struct Collector {
    pub addr: SocketAddr,
    events: mpsc::Receiver<CollectorEvent>,
}

impl Collector {
    pub fn port(&self) -> u16 {
        self.addr.port()
    }

    /// Wait for the next event.
    pub fn next_event(&self) -> CollectorEvent {
        self.events
            .recv_timeout(RECV_TIMEOUT)
            .expect("collector event should arrive")
    }

    /// Wait for the next event, expecting a line, and return its text.
    pub fn next_line(&self) -> String {
        match self.next_event() {
            CollectorEvent::Line(_, line) => line,
            other => panic!("expected a line, got {other:?}"),
        }
    }

    /// Collect lines until connection `index` closes.
    pub fn lines_until_closed(&self, index: usize) -> Vec<String> {
        let mut lines = Vec::new();
        loop {
            match self.next_event() {
                CollectorEvent::Line(_, line) => lines.push(line),
                CollectorEvent::Closed(n) if n == index => return lines,
                other => panic!("unexpected event {other:?}"),
            }
        }
    }
}

fn bind() -> TcpListener {
    TcpListener::bind(("127.0.0.1", 0)).expect("bind ephemeral listener")
}

fn pump_lines<R: Read>(
    index: usize,
    stream: R,
    max_lines: Option<usize>,
    tx: &mpsc::Sender<CollectorEvent>,
) {
    let mut reader = BufReader::new(stream);
    let mut seen = 0;
    while max_lines.is_none_or(|max| seen < max) {
        let mut line = String::new();
        match reader.read_line(&mut line) {
            Ok(0) | Err(_) => break,
            Ok(_) => {
                seen += 1;
                let _ = tx.send(CollectorEvent::Line(index, line));
            }
        }
    }
    drop(reader);
    let _ = tx.send(CollectorEvent::Closed(index));
}

/// Plain TCP collector accepting `connections` sockets one after another.
///
/// When `max_lines` is set the server hangs up after that many lines on each
/// connection.
pub fn spawn_tcp_collector(connections: usize, max_lines: Option<usize>) -> Collector {
    let listener = bind();
    let addr = listener.local_addr().expect("listener has address");
    let (tx, events) = mpsc::channel();
    thread::spawn(move || {
        for index in 0..connections {
            let Ok((stream, _)) = listener.accept() else {
                return;
            };
            pump_lines(index, stream, max_lines, &tx);
        }
    });
    Collector { addr, events }
}

/// TLS collector presenting `identity`, reading lines from one connection.
pub fn spawn_tls_collector(identity: Identity) -> Collector {
    let listener = bind();
    let addr = listener.local_addr().expect("listener has address");
    let acceptor = TlsAcceptor::new(identity).expect("build tls acceptor");
    let (tx, events) = mpsc::channel();
    thread::spawn(move || {
        let Ok((stream, _)) = listener.accept() else {
            return;
        };
        let _ = stream.set_read_timeout(Some(RECV_TIMEOUT));
        match acceptor.accept(stream) {
            Ok(tls) => pump_lines(0, tls, None, &tx),
            Err(err) => {
                let _ = tx.send(CollectorEvent::HandshakeFailed(0, err.to_string()));
            }
        }
    });
    Collector { addr, events }
}
