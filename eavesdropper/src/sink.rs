use chrono::{Local, NaiveDate};
use std::{
    fs::{self, File, OpenOptions},
    io::{self, Write},
    path::{Path, PathBuf},
};
use thiserror::Error;

#[derive(Error, Debug)]
pub enum SinkError {
    #[error("Failed to open dump file {path}: {source}")]
    Open { path: PathBuf, source: io::Error },

    #[error("Failed to write dump file: {0}")]
    Write(#[from] io::Error),
}

/// Appends records to a file that rotates at local midnight.
///
/// Records for `NMEA2000/frames.txt` written on 2021-10-19 end up in
/// `NMEA2000/frames_2021-10-19.txt`. Every record is one line and is flushed
/// right away.
#[derive(Debug)]
pub struct DailyFileSink {
    path: PathBuf,
    current: Option<(NaiveDate, File)>,
}

impl DailyFileSink {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self {
            path: path.into(),
            current: None,
        }
    }

    /// File holding the records of `date`.
    pub fn path_for(&self, date: NaiveDate) -> PathBuf {
        let stem = self
            .path
            .file_stem()
            .map(|s| s.to_string_lossy())
            .unwrap_or_default();
        let date = date.format("%Y-%m-%d");

        let name = match self.path.extension() {
            Some(ext) => format!("{}_{}.{}", stem, date, ext.to_string_lossy()),
            None => format!("{}_{}", stem, date),
        };
        self.path.with_file_name(name)
    }

    pub fn write(&mut self, record: &str) -> Result<(), SinkError> {
        self.write_on(Local::now().date_naive(), record)
    }

    pub fn write_on(&mut self, date: NaiveDate, record: &str) -> Result<(), SinkError> {
        let (day, file) = match self.current.take() {
            Some((day, file)) if day == date => (day, file),
            _ => (date, open(&self.path_for(date))?),
        };
        let (_, file) = self.current.insert((day, file));

        writeln!(file, "{}", record)?;
        file.flush()?;
        Ok(())
    }
}

fn open(path: &Path) -> Result<File, SinkError> {
    let to_open_error = |source| SinkError::Open {
        path: path.to_path_buf(),
        source,
    };

    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        fs::create_dir_all(parent).map_err(to_open_error)?;
    }

    log::info!("Dumping frames to {}", path.display());
    OpenOptions::new()
        .create(true)
        .append(true)
        .open(path)
        .map_err(to_open_error)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn date(day: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(2021, 10, day).unwrap()
    }

    #[test]
    fn date_goes_before_extension() {
        let sink = DailyFileSink::new("NMEA2000/frames.txt");

        assert_eq!(
            sink.path_for(date(19)),
            PathBuf::from("NMEA2000/frames_2021-10-19.txt")
        );
    }

    #[test]
    fn date_is_appended_without_extension() {
        let sink = DailyFileSink::new("frames");

        assert_eq!(sink.path_for(date(19)), PathBuf::from("frames_2021-10-19"));
    }

    #[test]
    fn creates_parent_directories() {
        let dir = tempfile::tempdir().unwrap();
        let mut sink = DailyFileSink::new(dir.path().join("NMEA2000/frames.txt"));

        sink.write_on(date(19), "1634619292150000 15FD080E 3600029F73FFFFFF")
            .unwrap();

        let written = fs::read_to_string(sink.path_for(date(19))).unwrap();
        assert_eq!(written, "1634619292150000 15FD080E 3600029F73FFFFFF\n");
    }

    #[test]
    fn rotates_on_date_change() {
        let dir = tempfile::tempdir().unwrap();
        let mut sink = DailyFileSink::new(dir.path().join("frames.txt"));

        sink.write_on(date(19), "first").unwrap();
        sink.write_on(date(19), "second").unwrap();
        sink.write_on(date(20), "third").unwrap();

        assert_eq!(
            fs::read_to_string(sink.path_for(date(19))).unwrap(),
            "first\nsecond\n"
        );
        assert_eq!(fs::read_to_string(sink.path_for(date(20))).unwrap(), "third\n");
    }

    #[test]
    fn appends_to_existing_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("frames.txt");

        DailyFileSink::new(&path).write_on(date(19), "before restart").unwrap();
        DailyFileSink::new(&path).write_on(date(19), "after restart").unwrap();

        let sink = DailyFileSink::new(&path);
        assert_eq!(
            fs::read_to_string(sink.path_for(date(19))).unwrap(),
            "before restart\nafter restart\n"
        );
    }

    #[test]
    fn open_failure_is_reported() {
        let dir = tempfile::tempdir().unwrap();
        let blocker = dir.path().join("blocker");
        fs::write(&blocker, "").unwrap();

        // A regular file cannot act as the parent directory.
        let mut sink = DailyFileSink::new(blocker.join("frames.txt"));
        let err = sink.write_on(date(19), "record").unwrap_err();

        assert!(matches!(err, SinkError::Open { .. }));
    }
}
