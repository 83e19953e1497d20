//! Background execution of a conversion
//!
//! Runs a [`DvhConverter`] on its own thread and streams progress and the
//! final outcome back over a channel, so a caller can stay responsive while
//! a large directory is processed.

use crate::api::{ConversionOptions, ConversionSummary, DvhConverter};
use crate::error::{DvhError, Result};
use log::debug;
use std::sync::mpsc::{self, Receiver};
use std::thread::{self, JoinHandle};

/// Message sent from a running conversion
#[derive(Debug)]
pub enum ConversionEvent {
    /// Fraction of work done, in `[0, 1]`
    Progress(f64),

    /// Terminal outcome; always the last event
    Finished(Result<ConversionSummary>),
}

/// Handle to a conversion running in the background
#[derive(Debug)]
pub struct ConversionHandle {
    events: Receiver<ConversionEvent>,
    thread: Option<JoinHandle<()>>,
}

impl ConversionHandle {
    /// Channel of progress and completion events
    pub fn events(&self) -> &Receiver<ConversionEvent> {
        &self.events
    }

    /// Returns the next event without blocking
    pub fn try_next(&self) -> Option<ConversionEvent> {
        self.events.try_recv().ok()
    }

    /// Blocks until the conversion finishes, discarding progress events
    pub fn wait(mut self) -> Result<ConversionSummary> {
        let mut outcome = None;
        for event in self.events.iter() {
            if let ConversionEvent::Finished(result) = event {
                outcome = Some(result);
            }
        }

        if let Some(thread) = self.thread.take() {
            if thread.join().is_err() {
                return Err(DvhError::Worker("conversion thread panicked".to_string()));
            }
        }

        outcome.unwrap_or_else(|| {
            Err(DvhError::Worker(
                "conversion ended without a result".to_string(),
            ))
        })
    }
}

/// Starts a conversion on a background thread
///
/// Configuration errors are reported through the channel like any other
/// failure, as the single `Finished` event.
pub fn spawn(options: ConversionOptions) -> ConversionHandle {
    let (sender, events) = mpsc::channel();

    let thread = thread::spawn(move || {
        let converter = DvhConverter::new(options);
        let progress_sender = sender.clone();
        let result = converter.run(|fraction| {
            // The receiver may already be gone; progress is best effort
            let _ = progress_sender.send(ConversionEvent::Progress(fraction));
        });
        debug!("Background conversion finished: ok={}", result.is_ok());
        let _ = sender.send(ConversionEvent::Finished(result));
    });

    ConversionHandle {
        events,
        thread: Some(thread),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::PivotSelection;
    use std::fs::File;
    use std::io::Write;
    use std::time::Duration;
    use tempfile::TempDir;

    #[test]
    fn test_spawn_reports_progress_then_finishes() {
        let input = TempDir::new().unwrap();
        let output = TempDir::new().unwrap();
        File::create(input.path().join("p.txt"))
            .unwrap()
            .write_all(b"Patient ID : P1\nStructure : PTV\n1  1  50.0\n")
            .unwrap();

        let handle = spawn(ConversionOptions::new(input.path(), output.path()));
        let events: Vec<_> = handle.events().iter().collect();

        let (last, rest) = events.split_last().unwrap();
        assert!(matches!(last, ConversionEvent::Finished(Ok(_))));
        assert!(rest
            .iter()
            .all(|e| matches!(e, ConversionEvent::Progress(p) if (0.0..=1.0).contains(p))));
        assert!(output.path().join("P1.csv").exists());
    }

    #[test]
    fn test_wait_returns_summary() {
        let input = TempDir::new().unwrap();
        let output = TempDir::new().unwrap();
        File::create(input.path().join("p.txt"))
            .unwrap()
            .write_all(b"Patient ID : P1\nStructure : PTV\n1  1  50.0\n")
            .unwrap();

        let summary = spawn(ConversionOptions::new(input.path(), output.path()))
            .wait()
            .unwrap();
        assert_eq!(summary.patients, 1);
        assert_eq!(summary.files_written(), 2);
    }

    #[test]
    fn test_wait_surfaces_failure() {
        let input = TempDir::new().unwrap();
        let output = TempDir::new().unwrap();
        let options = ConversionOptions::new(input.path(), output.path())
            .with_pivots(PivotSelection::none());

        let err = spawn(options).wait().unwrap_err();
        assert!(err.is_config());
    }

    #[test]
    fn test_try_next_polls_until_finished() {
        let input = TempDir::new().unwrap();
        let output = TempDir::new().unwrap();
        File::create(input.path().join("p.txt"))
            .unwrap()
            .write_all(b"Patient ID : P1\nStructure : PTV\n1  1  50.0\n")
            .unwrap();

        let handle = spawn(ConversionOptions::new(input.path(), output.path()));
        let mut progress = Vec::new();
        let result = loop {
            match handle.try_next() {
                Some(ConversionEvent::Finished(result)) => break result,
                Some(ConversionEvent::Progress(p)) => progress.push(p),
                None => thread::sleep(Duration::from_millis(5)),
            }
        };

        assert_eq!(result.unwrap().patients, 1);
        assert_eq!(progress.last(), Some(&1.0));
        assert!(handle.try_next().is_none());
    }

    #[test]
    fn test_wait_without_result_is_worker_error() {
        let (sender, events) = mpsc::channel::<ConversionEvent>();
        sender.send(ConversionEvent::Progress(0.5)).unwrap();
        drop(sender);

        let handle = ConversionHandle {
            events,
            thread: None,
        };
        let err = handle.wait().unwrap_err();
        assert!(matches!(err, DvhError::Worker(_)));
        assert_eq!(err.to_string(), "Worker error: conversion ended without a result");
    }
}
