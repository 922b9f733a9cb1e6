use anyhow::Context;
use chrono::{DateTime, Utc};
use clap::{Parser, Subcommand};
use eavesdropper::{
    config::Config,
    handler::{EnvelopeLogger, FrameHandler, Output},
    sink::DailyFileSink,
    transport::{self, Protocol},
};
use mqtt_client::{receiver::MqttReceiver, sender::MqttSender, topic};
use nmea2000::FrameAssembler;
use std::{path::PathBuf, time::Duration};

const RECONNECT_DELAY: Duration = Duration::from_secs(1);

/// NMEA2000 stream eavesdropper
#[derive(Parser, Debug)]
#[command(version, about = "NMEA2000 stream eavesdropper", long_about = None)]
struct Args {
    /// Pub/sub session id
    #[arg(short, long, default_value_t = 111)]
    cid: u16,

    /// Identification id of this microservice
    #[arg(short, long, default_value_t = 1)]
    id: u16,

    /// Path of the file the recorded frames are dumped to, the date is added
    /// to the file name and the file rotates at midnight
    #[arg(short, long, default_value = "NMEA2000/frames.txt")]
    path: PathBuf,

    /// Print every frame to stdout
    #[arg(long)]
    verbose: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Connect to a capture stream, listen for incoming NMEA2000 frames and
    /// publish them on the session, or dump them to disk in standalone mode
    Gather {
        /// IP address of the stream
        #[arg(short, long)]
        address: String,

        /// Port number to connect to
        #[arg(short, long)]
        port: u16,

        /// Receive datagrams over UDP instead of connecting over TCP
        #[arg(long)]
        udp: bool,

        /// Dump frames directly to disk instead of publishing them
        #[arg(long)]
        standalone: bool,
    },

    /// Listen for the frames published on the session by gatherers and dump
    /// them to disk
    Log,
}

#[tokio::main]
async fn main() {
    env_logger::init_from_env(env_logger::Env::new().default_filter_or("info"));

    let args = Args::parse();

    let config = Config::load().unwrap_or_else(|err| {
        log::error!("Failed to load configuration: {}", err);
        std::process::exit(1);
    });
    log::debug!("Loaded configuration: {:?}", config);

    let result = match &args.command {
        Commands::Gather {
            address,
            port,
            udp,
            standalone,
        } => {
            let protocol = if *udp { Protocol::Udp } else { Protocol::Tcp };
            gather(&args, &config, protocol, address, *port, *standalone).await
        }
        Commands::Log => log_frames(&args, &config).await,
    };

    if let Err(e) = result {
        log::error!("{:#}", e);
        std::process::exit(1);
    }
}

async fn gather(
    args: &Args,
    config: &Config,
    protocol: Protocol,
    address: &str,
    port: u16,
    standalone: bool,
) -> anyhow::Result<()> {
    let output = if standalone {
        Output::Dump(DailyFileSink::new(&args.path))
    } else {
        let (sender, eventloop) =
            MqttSender::new(&config.mqtt.host, config.mqtt.port, config.mqtt.keep_alive());
        tokio::spawn(mqtt_client::sender::run(eventloop));

        log::info!(
            "Publishing to {} on {}:{}",
            topic(args.cid),
            config.mqtt.host,
            config.mqtt.port
        );
        Output::Publish {
            sender,
            topic: topic(args.cid),
            sender_stamp: args.id,
        }
    };

    let mut handler = FrameHandler::new(output, args.verbose);
    let mut assembler =
        FrameAssembler::new(|frame, timestamp: &DateTime<Utc>| handler.handle(frame, timestamp));

    tokio::select! {
        result = transport::receive(protocol, address, port, |chunk, timestamp| {
            assembler.ingest(chunk, timestamp)
        }) => result.context("Capture stream failed")?,
        _ = tokio::signal::ctrl_c() => log::info!("Interrupted, stopping"),
    }

    Ok(())
}

async fn log_frames(args: &Args, config: &Config) -> anyhow::Result<()> {
    let topic = topic(args.cid);
    let mut logger = EnvelopeLogger::new(DailyFileSink::new(&args.path), args.verbose);
    let mut receiver =
        MqttReceiver::new(&config.mqtt.host, config.mqtt.port, config.mqtt.keep_alive());

    receiver
        .subscribe(&topic)
        .await
        .context("Failed to subscribe")?;

    let ctrl_c = tokio::signal::ctrl_c();
    tokio::pin!(ctrl_c);

    loop {
        tokio::select! {
            received = receiver.recv() => match received {
                Ok(envelope) => logger.handle(&envelope),
                Err(e) => {
                    log::warn!("Lost session: {}", e);
                    tokio::select! {
                        _ = tokio::time::sleep(RECONNECT_DELAY) => {}
                        _ = &mut ctrl_c => {
                            log::info!("Interrupted, stopping");
                            break;
                        }
                    }
                }
            },
            _ = &mut ctrl_c => {
                log::info!("Interrupted, stopping");
                break;
            }
        }
    }

    if let Err(e) = receiver.close().await {
        log::warn!("Failed to disconnect: {}", e);
    }
    Ok(())
}
