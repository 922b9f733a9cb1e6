use chrono::{DateTime, Utc};
use eavesdropper::transport::{self, Protocol, TransportError};
use nmea2000::{Frame, FrameAssembler};
use std::time::Duration;
use tokio::{
    io::AsyncWriteExt,
    net::{TcpListener, UdpSocket},
};

const DATA1: &str = "04:54:52.150 R 15FD080E 36 00 02 9F 73 FF FF FF\r\n";
const DATA2: &str = "04:54:52.151 R 15FD070E 36 C2 9F 73 FF 7F FB 03\r\n";

#[tokio::test]
async fn stream_chunks_are_reassembled() {
    let (mut writer, reader) = tokio::io::duplex(16);

    tokio::spawn(async move {
        for record in [DATA1, DATA2] {
            let (first, second) = record.split_at(record.len() / 2);
            writer.write_all(first.as_bytes()).await.unwrap();
            writer.write_all(second.as_bytes()).await.unwrap();
        }
        // dropping the writer closes the stream
    });

    let mut frames = Vec::new();
    let mut assembler = FrameAssembler::new(|frame: Frame, _: &DateTime<Utc>| frames.push(frame));

    let result = transport::read_stream(reader, |chunk, timestamp| {
        assembler.ingest(chunk, timestamp)
    })
    .await;
    drop(assembler);

    assert!(matches!(result, Err(TransportError::ConnectionLost)));
    assert_eq!(
        frames,
        vec![
            Frame::new("15FD080E", "3600029F73FFFFFF"),
            Frame::new("15FD070E", "36C29F73FF7FFB03"),
        ]
    );
}

#[tokio::test]
async fn tcp_connection_lost_is_reported() {
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let port = listener.local_addr().unwrap().port();

    tokio::spawn(async move {
        let (mut socket, _) = listener.accept().await.unwrap();
        socket.write_all(DATA1.as_bytes()).await.unwrap();
        socket.write_all(&DATA2.as_bytes()[..10]).await.unwrap();
    });

    let mut frames = Vec::new();
    let mut assembler = FrameAssembler::new(|frame: Frame, _: &DateTime<Utc>| frames.push(frame));

    let result = transport::receive(Protocol::Tcp, "127.0.0.1", port, |chunk, timestamp| {
        assembler.ingest(chunk, timestamp)
    })
    .await;
    drop(assembler);

    assert!(matches!(result, Err(TransportError::ConnectionLost)));
    assert_eq!(frames, vec![Frame::new("15FD080E", "3600029F73FFFFFF")]);
}

#[tokio::test]
async fn tcp_connect_failure_is_reported() {
    // Grab a free port and release it so nothing listens there.
    let port = {
        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        listener.local_addr().unwrap().port()
    };

    let result = transport::receive(Protocol::Tcp, "127.0.0.1", port, |_, _| {}).await;

    assert!(matches!(result, Err(TransportError::Connect { .. })));
}

#[tokio::test]
async fn datagrams_are_reassembled_with_receive_time() {
    let socket = transport::bind_udp("127.0.0.1", 0).await.unwrap();
    let port = socket.local_addr().unwrap().port();

    let sender = UdpSocket::bind("127.0.0.1:0").await.unwrap();
    for record in [DATA1, DATA2] {
        let (first, second) = record.split_at(record.len() / 2);
        sender.send_to(first.as_bytes(), ("127.0.0.1", port)).await.unwrap();
        sender.send_to(second.as_bytes(), ("127.0.0.1", port)).await.unwrap();
    }

    let before = Utc::now();
    let mut received = Vec::new();
    let mut assembler = FrameAssembler::new(|frame: Frame, timestamp: &DateTime<Utc>| {
        received.push((frame, *timestamp))
    });

    // UDP never ends by itself
    let _ = tokio::time::timeout(
        Duration::from_millis(500),
        transport::read_datagrams(&socket, |chunk, timestamp| {
            assembler.ingest(chunk, timestamp)
        }),
    )
    .await;
    drop(assembler);

    assert_eq!(received.len(), 2);
    assert_eq!(received[0].0.identifier, "15FD080E");
    assert_eq!(received[1].0.identifier, "15FD070E");
    assert!(received.iter().all(|(_, timestamp)| *timestamp >= before));
}

#[tokio::test]
async fn udp_rejects_hostnames() {
    let result = transport::bind_udp("localhost", 0).await;

    assert!(matches!(result, Err(TransportError::InvalidAddress(_))));
}
