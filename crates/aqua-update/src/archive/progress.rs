//! Progress reporting for downloads and archive extraction

use indicatif::{ProgressBar, ProgressStyle};
use std::io::{self, Read};
use std::sync::{Arc, Mutex};
use tracing::debug;

/// Receives byte-level progress for a named transfer
pub trait ProgressObserver: Send + Sync {
    /// A transfer of `total` bytes (0 when unknown) is starting
    fn on_start(&self, _name: &str, _total: u64) {}

    /// `current` bytes of `total` have been transferred
    fn on_progress(&self, name: &str, current: u64, total: u64);

    /// The transfer ended, successfully or not
    fn on_finish(&self, _name: &str) {}
}

/// Terminal progress bar backed by indicatif
pub struct ProgressBarObserver {
    verb: &'static str,
    bar: Mutex<Option<ProgressBar>>,
}

impl ProgressBarObserver {
    /// Observer whose bar message reads "{verb} {name}"
    pub fn new(verb: &'static str) -> Self {
        Self {
            verb,
            bar: Mutex::new(None),
        }
    }

    fn style() -> ProgressStyle {
        ProgressStyle::default_bar()
            .template("{msg}\n{spinner:.green} [{elapsed_precise}] [{wide_bar:.cyan/blue}] {bytes}/{total_bytes} ({bytes_per_sec}, {eta})")
            .unwrap_or_else(|_| ProgressStyle::default_bar())
            .progress_chars("#>-")
    }
}

impl ProgressObserver for ProgressBarObserver {
    fn on_start(&self, name: &str, total: u64) {
        let bar = if total > 0 {
            ProgressBar::new(total)
        } else {
            ProgressBar::no_length()
        };
        bar.set_style(Self::style());
        bar.set_message(format!("{} {}", self.verb, name));

        if let Ok(mut slot) = self.bar.lock() {
            *slot = Some(bar);
        }
    }

    fn on_progress(&self, _name: &str, current: u64, _total: u64) {
        if let Ok(slot) = self.bar.lock() {
            if let Some(bar) = slot.as_ref() {
                bar.set_position(current);
            }
        }
    }

    fn on_finish(&self, name: &str) {
        if let Ok(mut slot) = self.bar.lock() {
            if let Some(bar) = slot.take() {
                debug!(entry = %name, bytes = bar.position(), "{} finished", self.verb);
                bar.finish_and_clear();
            }
        }
    }
}

/// Reader wrapper reporting bytes read to an observer
pub struct ProgressReader<R> {
    inner: R,
    name: String,
    current: u64,
    total: u64,
    observer: Arc<dyn ProgressObserver>,
}

impl<R: Read> ProgressReader<R> {
    pub fn new(inner: R, name: &str, total: u64, observer: Arc<dyn ProgressObserver>) -> Self {
        observer.on_start(name, total);
        Self {
            inner,
            name: name.to_string(),
            current: 0,
            total,
            observer,
        }
    }
}

impl<R: Read> Read for ProgressReader<R> {
    fn read(&mut self, buf: &mut [u8]) -> io::Result<usize> {
        let n = self.inner.read(buf)?;
        if n > 0 {
            self.current += n as u64;
            self.observer
                .on_progress(&self.name, self.current, self.total);
        }
        Ok(n)
    }
}

impl<R> Drop for ProgressReader<R> {
    fn drop(&mut self) {
        self.observer.on_finish(&self.name);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[derive(Default)]
    struct Recording {
        events: Mutex<Vec<(String, u64, u64)>>,
        finished: Mutex<Vec<String>>,
    }

    impl ProgressObserver for Recording {
        fn on_progress(&self, name: &str, current: u64, total: u64) {
            self.events
                .lock()
                .unwrap()
                .push((name.to_string(), current, total));
        }

        fn on_finish(&self, name: &str) {
            self.finished.lock().unwrap().push(name.to_string());
        }
    }

    #[test]
    fn test_progress_reader_reports_cumulative_bytes() {
        let observer = Arc::new(Recording::default());
        let data = vec![7u8; 10];

        {
            let mut reader = ProgressReader::new(&data[..], "bin", 10, observer.clone());
            let mut buf = [0u8; 4];
            while reader.read(&mut buf).unwrap() > 0 {}
        }

        let events = observer.events.lock().unwrap();
        let positions: Vec<u64> = events.iter().map(|e| e.1).collect();
        assert_eq!(positions, vec![4, 8, 10]);
        assert!(events.iter().all(|e| e.0 == "bin" && e.2 == 10));
        assert_eq!(*observer.finished.lock().unwrap(), vec!["bin".to_string()]);
    }
}
