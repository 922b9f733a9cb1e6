use anyhow::Context;
use clap::Parser;
use std::{fs, net::UdpSocket, path::PathBuf, thread, time::Duration};

const SEND_INTERVAL: Duration = Duration::from_millis(1);

/// Fake NMEA2000 frame streamer over UDP
///
/// Sends every record of a capture file in two halves, so the receiving end
/// has to reassemble each record from two datagrams.
#[derive(Parser, Debug)]
#[command(version, about, long_about = None)]
struct Args {
    /// Port number to send to
    port: u16,

    /// Host to send to
    #[arg(long, default_value = "127.0.0.1")]
    host: String,

    /// Capture file with one record per line
    #[arg(short, long, default_value = "eavesdropper/data/nmea2000_sample.log")]
    file: PathBuf,
}

/// Splits a record at half its length.
fn halves(record: &[u8]) -> (&[u8], &[u8]) {
    record.split_at(record.len() / 2)
}

fn main() -> anyhow::Result<()> {
    let args = Args::parse();

    let capture = fs::read(&args.file)
        .with_context(|| format!("Failed to read {}", args.file.display()))?;
    let socket = UdpSocket::bind("0.0.0.0:0").context("Failed to open socket")?;
    let target = (args.host.as_str(), args.port);

    let mut sent = 0;
    for record in capture.split_inclusive(|&b| b == b'\n') {
        let (first, second) = halves(record);

        socket.send_to(first, target)?;
        thread::sleep(SEND_INTERVAL);
        socket.send_to(second, target)?;
        thread::sleep(SEND_INTERVAL);

        sent += 1;
    }

    println!("Sent {} records to {}:{}", sent, args.host, args.port);
    Ok(())
}
