use crate::sink::DailyFileSink;
use chrono::{DateTime, Utc};
use mqtt_client::{Envelope, sender::MqttSender};
use nmea2000::Frame;

/// Where gathered frames go.
pub enum Output {
    /// Publish on the session topic, stamped with this gatherer's id.
    Publish {
        sender: MqttSender,
        topic: String,
        sender_stamp: u16,
    },
    /// Standalone mode, dump straight to disk.
    Dump(DailyFileSink),
}

/// Consumes the frames of a gathering assembler.
///
/// Called synchronously from the assembler, so failures are logged and never
/// returned.
pub struct FrameHandler {
    output: Output,
    verbose: bool,
}

impl FrameHandler {
    pub fn new(output: Output, verbose: bool) -> Self {
        Self { output, verbose }
    }

    pub fn handle(&mut self, frame: Frame, timestamp: &DateTime<Utc>) {
        if self.verbose {
            println!("{}", frame);
        }

        match &mut self.output {
            Output::Publish {
                sender,
                topic,
                sender_stamp,
            } => {
                let envelope = Envelope::new(frame, timestamp, *sender_stamp);
                if let Err(e) = sender.try_publish(topic.as_str(), &envelope) {
                    log::error!("Failed to publish frame {}: {}", envelope.frame, e);
                }
            }
            Output::Dump(sink) => {
                if let Err(e) = sink.write(&gathered_record(&frame, timestamp)) {
                    log::error!("Failed to dump frame {}: {}", frame, e);
                }
            }
        }
    }
}

/// Dumps envelopes received from the session.
pub struct EnvelopeLogger {
    sink: DailyFileSink,
    verbose: bool,
}

impl EnvelopeLogger {
    pub fn new(sink: DailyFileSink, verbose: bool) -> Self {
        Self { sink, verbose }
    }

    pub fn handle(&mut self, envelope: &Envelope) {
        let record = logged_record(envelope);

        if let Err(e) = self.sink.write(&record) {
            log::error!("Failed to dump frame {}: {}", envelope.frame, e);
        }
        if self.verbose {
            println!("{}", record);
        }
    }
}

/// `<sample time us> <identifier> <payload>`
pub fn gathered_record(frame: &Frame, timestamp: &DateTime<Utc>) -> String {
    format!(
        "{} {} {}",
        timestamp.timestamp_micros(),
        frame.identifier,
        frame.payload
    )
}

/// `<sample time us> <sender stamp> <identifier> <payload>`
pub fn logged_record(envelope: &Envelope) -> String {
    format!(
        "{} {} {} {}",
        envelope.sample_time_us,
        envelope.sender_stamp,
        envelope.frame.identifier,
        envelope.frame.payload
    )
}
