//! Transport primitives for the connection manager.

use std::{
    io::{self, Write},
    net::{Shutdown, SocketAddr, TcpStream, ToSocketAddrs},
    time::Duration,
};

use native_tls::{HandshakeError, TlsStream};

use super::{config::ConnectionConfig, error::ConnectionError, trust::TrustPolicy};

/// Active socket connection state.
pub enum ActiveConnection {
    PlainTcp(TcpStream),
    Tls(Box<TlsStream<TcpStream>>),
}

impl ActiveConnection {
    fn tcp(&self) -> &TcpStream {
        match self {
            ActiveConnection::PlainTcp(stream) => stream,
            ActiveConnection::Tls(stream) => stream.get_ref(),
        }
    }

    /// Whether the connection is using TLS.
    pub fn is_tls(&self) -> bool {
        matches!(self, ActiveConnection::Tls(_))
    }

    /// Update the write timeout for the underlying socket.
    pub fn set_write_timeout(&self, timeout: Duration) -> io::Result<()> {
        self.tcp().set_write_timeout(Some(timeout))
    }

    /// Write a full buffer to the socket.
    pub fn write_all(&mut self, buf: &[u8]) -> io::Result<()> {
        match self {
            ActiveConnection::PlainTcp(stream) => stream.write_all(buf),
            ActiveConnection::Tls(stream) => stream.write_all(buf),
        }
    }

    /// Flush the underlying writer.
    pub fn flush(&mut self) -> io::Result<()> {
        match self {
            ActiveConnection::PlainTcp(stream) => stream.flush(),
            ActiveConnection::Tls(stream) => stream.flush(),
        }
    }

    /// Probe whether the peer is still reachable without consuming data.
    ///
    /// A pending socket error or an orderly shutdown from the peer marks the
    /// connection as dead. The probe never blocks.
    pub fn is_alive(&self) -> bool {
        let stream = self.tcp();
        if !matches!(stream.take_error(), Ok(None)) {
            return false;
        }
        if stream.set_nonblocking(true).is_err() {
            return false;
        }
        let mut probe = [0u8; 1];
        let alive = match stream.peek(&mut probe) {
            Ok(0) => false,
            Ok(_) => true,
            Err(err) => matches!(
                err.kind(),
                io::ErrorKind::WouldBlock | io::ErrorKind::Interrupted
            ),
        };
        stream.set_nonblocking(false).is_ok() && alive
    }

    /// Send TLS close-notify where applicable and shut the socket down.
    pub fn close(self) {
        match self {
            ActiveConnection::PlainTcp(stream) => {
                let _ = stream.shutdown(Shutdown::Both);
            }
            ActiveConnection::Tls(mut stream) => {
                let _ = stream.shutdown();
                let _ = stream.get_ref().shutdown(Shutdown::Both);
            }
        }
    }
}

impl std::fmt::Debug for ActiveConnection {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ActiveConnection")
            .field("tls", &self.is_tls())
            .field("peer", &self.tcp().peer_addr().ok())
            .finish()
    }
}

fn socket_addrs(config: &ConnectionConfig) -> io::Result<Vec<SocketAddr>> {
    (config.host.as_str(), config.port)
        .to_socket_addrs()
        .map(|iter| iter.collect())
}

fn connect_tcp(config: &ConnectionConfig) -> io::Result<TcpStream> {
    let mut last_err = None;
    for addr in socket_addrs(config)? {
        match TcpStream::connect_timeout(&addr, config.connect_timeout) {
            Ok(stream) => {
                stream.set_nonblocking(false)?;
                stream.set_nodelay(true)?;
                return Ok(stream);
            }
            Err(err) => last_err = Some(err),
        }
    }
    Err(last_err.unwrap_or_else(|| {
        io::Error::new(
            io::ErrorKind::AddrNotAvailable,
            format!("{} did not resolve to any address", config.address()),
        )
    }))
}

fn handshake(
    config: &ConnectionConfig,
    policy: &TrustPolicy,
    stream: TcpStream,
) -> Result<TlsStream<TcpStream>, ConnectionError> {
    let connector = policy
        .connector()
        .map_err(|err| ConnectionError::handshake(&config.host, err))?;
    stream
        .set_read_timeout(Some(config.connect_timeout))
        .and_then(|()| stream.set_write_timeout(Some(config.connect_timeout)))
        .map_err(|err| ConnectionError::handshake(&config.host, err))?;
    match connector.connect(&config.host, stream) {
        Ok(tls) => Ok(tls),
        Err(HandshakeError::Failure(err)) => Err(ConnectionError::handshake(&config.host, err)),
        // A blocking socket only reports `WouldBlock` once its timeout fires.
        Err(HandshakeError::WouldBlock(_)) => Err(ConnectionError::handshake(
            &config.host,
            format!("timed out after {:?}", config.connect_timeout),
        )),
    }
}

/// Establish a connection to the configured collector.
///
/// `policy` selects TLS; `None` yields a plain TCP connection. On failure
/// every partially built resource has already been dropped.
pub fn connect_transport(
    config: &ConnectionConfig,
    policy: Option<&TrustPolicy>,
) -> Result<ActiveConnection, ConnectionError> {
    let stream = connect_tcp(config).map_err(|source| ConnectionError::Connect {
        address: config.address(),
        source,
    })?;
    let connection = match policy {
        Some(policy) => ActiveConnection::Tls(Box::new(handshake(config, policy, stream)?)),
        None => ActiveConnection::PlainTcp(stream),
    };
    connection
        .tcp()
        .set_read_timeout(None)
        .and_then(|()| connection.set_write_timeout(config.write_timeout))
        .map_err(|source| ConnectionError::Connect {
            address: config.address(),
            source,
        })?;
    Ok(connection)
}
