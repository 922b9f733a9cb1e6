//! Transport side of gathering: reads the capture stream and hands every
//! chunk to the caller together with its receive time.

use chrono::{DateTime, Utc};
use std::{
    io,
    net::{Ipv4Addr, SocketAddr},
};
use thiserror::Error;
use tokio::{
    io::{AsyncRead, AsyncReadExt},
    net::{TcpStream, UdpSocket},
};

const READ_BUFFER_LEN: usize = 4096;
// Largest UDP payload
const DATAGRAM_LEN: usize = 65_535;

#[derive(Error, Debug)]
pub enum TransportError {
    #[error("Failed to connect to {address}: {source}")]
    Connect { address: String, source: io::Error },

    #[error("Failed to listen on {address}: {source}")]
    Bind { address: String, source: io::Error },

    #[error("Invalid UDP address {0}, expected an IPv4 address")]
    InvalidAddress(String),

    #[error("Connection lost")]
    ConnectionLost,

    #[error("Failed to receive: {0}")]
    Receive(#[from] io::Error),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Protocol {
    Tcp,
    Udp,
}

/// Connects to the capture stream and feeds it to `on_chunk` until the
/// connection ends.
///
/// TCP streams only return on failure, a closed connection being
/// [`TransportError::ConnectionLost`]. UDP never ends by itself.
pub async fn receive<F>(
    protocol: Protocol,
    address: &str,
    port: u16,
    on_chunk: F,
) -> Result<(), TransportError>
where
    F: FnMut(&[u8], DateTime<Utc>),
{
    match protocol {
        Protocol::Tcp => {
            let address = format!("{}:{}", address, port);
            let stream = TcpStream::connect(&address)
                .await
                .map_err(|source| TransportError::Connect {
                    address: address.clone(),
                    source,
                })?;

            log::info!("Connected to {}", address);
            read_stream(stream, on_chunk).await
        }
        Protocol::Udp => {
            let socket = bind_udp(address, port).await?;
            read_datagrams(&socket, on_chunk).await
        }
    }
}

/// Binds `port` on all interfaces, joining `address` if it is a multicast
/// group.
pub async fn bind_udp(address: &str, port: u16) -> Result<UdpSocket, TransportError> {
    let group: Ipv4Addr = address
        .parse()
        .map_err(|_| TransportError::InvalidAddress(address.to_string()))?;

    let local = SocketAddr::from((Ipv4Addr::UNSPECIFIED, port));
    let to_bind_error = |source| TransportError::Bind {
        address: format!("{}:{}", address, port),
        source,
    };

    let socket = UdpSocket::bind(local).await.map_err(to_bind_error)?;
    if group.is_multicast() {
        socket
            .join_multicast_v4(group, Ipv4Addr::UNSPECIFIED)
            .map_err(to_bind_error)?;
    }

    log::info!("Listening for datagrams on {}:{}", address, port);
    Ok(socket)
}

pub async fn read_stream<R, F>(mut stream: R, mut on_chunk: F) -> Result<(), TransportError>
where
    R: AsyncRead + Unpin,
    F: FnMut(&[u8], DateTime<Utc>),
{
    let mut buffer = vec![0u8; READ_BUFFER_LEN];

    loop {
        let len = stream.read(&mut buffer).await?;
        if len == 0 {
            return Err(TransportError::ConnectionLost);
        }

        on_chunk(&buffer[..len], Utc::now());
    }
}

pub async fn read_datagrams<F>(socket: &UdpSocket, mut on_chunk: F) -> Result<(), TransportError>
where
    F: FnMut(&[u8], DateTime<Utc>),
{
    let mut buffer = vec![0u8; DATAGRAM_LEN];

    loop {
        let (len, from) = socket.recv_from(&mut buffer).await?;
        log::trace!("{} bytes from {}", len, from);

        on_chunk(&buffer[..len], Utc::now());
    }
}
