//! Console progress rendering
//!
//! Wraps `indicatif` behind a small tracker type and provides the console
//! implementation of [`ProgressObserver`]: an overall pipeline bar plus a
//! transient second bar for the staged full-resolution read.

use std::cell::RefCell;

use indicatif::{MultiProgress, ProgressBar, ProgressStyle};

use crate::pipeline::{PipelineStage, ProgressObserver};

pub struct ProgressTracker {
    bar: ProgressBar,
}

impl ProgressTracker {
    pub fn new(total: u64, description: &str) -> Self {
        let bar = ProgressBar::new(total);
        bar.set_style(ProgressStyle::default_bar()
            .template("{spinner:.green} [{elapsed_precise}] [{bar:40.cyan/blue}] {pos}/{len} {msg}")
            .unwrap()
            .progress_chars("#>-"));
        bar.set_message(description.to_string());

        ProgressTracker {
            bar,
        }
    }

    pub fn set_position(&self, position: u64) {
        self.bar.set_position(position);
    }

    pub fn finish(&self, message: &str) {
        self.bar.finish_with_message(message.to_string());
    }

    pub fn set_message(&self, msg: &str) {
        self.bar.set_message(msg.to_string());
    }
}

/// Overall completion per pipeline stage, out of 100
fn stage_position(stage: PipelineStage) -> u64 {
    match stage {
        PipelineStage::Idle => 0,
        PipelineStage::Detecting => 10,
        PipelineStage::Mapping => 35,
        PipelineStage::Staging => 50,
        PipelineStage::WritingOutput => 80,
        PipelineStage::Completed | PipelineStage::Failed => 100,
    }
}

/// Console observer: overall bar plus a transient read bar
pub struct ConsoleProgress {
    multi: MultiProgress,
    overall: ProgressTracker,
    read: RefCell<Option<ProgressBar>>,
}

impl ConsoleProgress {
    pub fn new() -> Self {
        let multi = MultiProgress::new();
        let overall = ProgressTracker::new(100, "Overall progress");
        multi.add(overall.bar.clone());
        ConsoleProgress {
            multi,
            overall,
            read: RefCell::new(None),
        }
    }
}

impl Default for ConsoleProgress {
    fn default() -> Self {
        Self::new()
    }
}

impl ProgressObserver for ConsoleProgress {
    fn on_stage(&self, stage: PipelineStage) {
        self.overall.set_message(stage.label());
        self.overall.set_position(stage_position(stage));
        match stage {
            PipelineStage::Completed => self.overall.finish("Extraction complete"),
            PipelineStage::Failed => self.overall.finish("Failed"),
            _ => {}
        }
    }

    fn on_read_progress(&self, completed: u32, total: u32) {
        let mut slot = self.read.borrow_mut();
        let bar = slot.get_or_insert_with(|| {
            let bar = ProgressBar::new(total as u64);
            bar.set_style(ProgressStyle::default_bar()
                .template("  [{bar:30.cyan/blue}] {pos}/{len} {msg}")
                .unwrap()
                .progress_chars("#>-"));
            bar.set_message("Reading");
            self.multi.add(bar.clone());
            bar
        });
        bar.set_position(completed as u64);
        if completed >= total {
            bar.finish_and_clear();
            *slot = None;
        }
    }
}
