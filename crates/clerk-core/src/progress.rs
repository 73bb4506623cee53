//! Progress indicators
//!
//! A command asks its output for an indicator instead of drawing one itself.
//! Terminal outputs hand back an `indicatif` bar, in-memory outputs hand back
//! a recorder so tests can count every start, advance and finish.

use std::cell::RefCell;
use std::rc::Rc;

use indicatif::{ProgressBar, ProgressDrawTarget, ProgressStyle};

pub trait ProgressIndicator {
    fn start(&mut self);
    fn advance(&mut self, steps: u64);
    fn set_max_steps(&mut self, max: u64);
    fn finish(&mut self);
    fn set_message(&mut self, _message: &str) {}
    fn position(&self) -> u64;
    fn max_steps(&self) -> u64;
}

const BAR_TEMPLATE: &str = " {pos}/{len} [{bar:28}] {percent:>3}% {msg}";

pub struct IndicatifProgress {
    bar: ProgressBar,
}

impl IndicatifProgress {
    pub fn new(max: u64, hidden: bool) -> Self {
        let target = if hidden {
            ProgressDrawTarget::hidden()
        } else {
            ProgressDrawTarget::stdout()
        };
        let bar = ProgressBar::with_draw_target(Some(max), target);
        let style = ProgressStyle::with_template(BAR_TEMPLATE)
            .map(|style| style.progress_chars("=>-"))
            .unwrap_or_else(|_| ProgressStyle::default_bar());
        bar.set_style(style);
        Self { bar }
    }

    pub fn inner(&self) -> &ProgressBar {
        &self.bar
    }
}

impl ProgressIndicator for IndicatifProgress {
    fn start(&mut self) {
        self.bar.reset();
        self.bar.tick();
    }

    fn advance(&mut self, steps: u64) {
        self.bar.inc(steps);
    }

    fn set_max_steps(&mut self, max: u64) {
        self.bar.set_length(max);
    }

    fn finish(&mut self) {
        self.bar.finish();
    }

    fn set_message(&mut self, message: &str) {
        self.bar.set_message(message.to_string());
    }

    fn position(&self) -> u64 {
        self.bar.position()
    }

    fn max_steps(&self) -> u64 {
        self.bar.length().unwrap_or(0)
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ProgressEvent {
    Started { max: u64 },
    Advanced { position: u64 },
    MaxSteps(u64),
    Finished { position: u64 },
}

/// Indicator that records what happened to it into a shared log.
pub struct RecordingProgress {
    max: u64,
    position: u64,
    events: Rc<RefCell<Vec<ProgressEvent>>>,
}

impl RecordingProgress {
    pub fn new(max: u64, events: Rc<RefCell<Vec<ProgressEvent>>>) -> Self {
        Self {
            max,
            position: 0,
            events,
        }
    }

    fn record(&self, event: ProgressEvent) {
        self.events.borrow_mut().push(event);
    }
}

impl ProgressIndicator for RecordingProgress {
    fn start(&mut self) {
        self.position = 0;
        self.record(ProgressEvent::Started { max: self.max });
    }

    fn advance(&mut self, steps: u64) {
        self.position += steps;
        if self.max > 0 && self.position > self.max {
            self.max = self.position;
        }
        self.record(ProgressEvent::Advanced {
            position: self.position,
        });
    }

    fn set_max_steps(&mut self, max: u64) {
        self.max = max;
        self.record(ProgressEvent::MaxSteps(max));
    }

    fn finish(&mut self) {
        self.record(ProgressEvent::Finished {
            position: self.position,
        });
    }

    fn position(&self) -> u64 {
        self.position
    }

    fn max_steps(&self) -> u64 {
        self.max
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_recording_progress_tracks_position() {
        let events = Rc::new(RefCell::new(Vec::new()));
        let mut progress = RecordingProgress::new(3, events.clone());
        progress.start();
        progress.advance(1);
        progress.advance(2);
        progress.finish();

        assert_eq!(progress.position(), 3);
        assert_eq!(
            *events.borrow(),
            vec![
                ProgressEvent::Started { max: 3 },
                ProgressEvent::Advanced { position: 1 },
                ProgressEvent::Advanced { position: 3 },
                ProgressEvent::Finished { position: 3 },
            ]
        );
    }

    #[test]
    fn test_hidden_indicatif_progress() {
        let mut progress = IndicatifProgress::new(5, true);
        progress.start();
        progress.advance(2);
        progress.set_max_steps(10);
        assert_eq!(progress.position(), 2);
        assert_eq!(progress.max_steps(), 10);
        progress.finish();
        assert!(progress.inner().is_finished());
    }
}
