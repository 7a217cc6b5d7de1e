use crate::error::{PipelineError, Result};
use crate::registry;
use crate::stage::{StageInstance, END_TOKEN};
use log::error;
use std::io::BufRead;

/// A linear chain of stages driven from an input line stream.
///
/// Construction and teardown follow a strict order: every stage is
/// initialized (low index first) before any is attached, stages are waited
/// on from first to last so the sentinel's path is mirrored, and
/// finalization runs in the same order so no upstream worker still holds a
/// reference to a joined stage's hand-off hook.
pub struct Pipeline {
    stages: Vec<StageInstance>,
}

impl std::fmt::Debug for Pipeline {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Pipeline")
            .field("stages", &self.stages.len())
            .finish()
    }
}

impl Pipeline {
    /// Resolve every stage name through the registry and construct the
    /// (uninitialized) stage instances.
    ///
    /// Fails on an empty chain or an unregistered name. Each position gets
    /// its own transform instance, so repeated names never share state.
    pub fn build(stage_names: &[String]) -> Result<Self> {
        if stage_names.is_empty() {
            return Err(PipelineError::NoStages);
        }
        let mut stages = Vec::with_capacity(stage_names.len());
        for name in stage_names {
            let transform = registry::create(name)
                .ok_or_else(|| PipelineError::UnknownStage(name.clone()))?;
            stages.push(StageInstance::new(name.clone(), transform));
        }
        Ok(Self { stages })
    }

    /// Initialize every stage and wire the chain together.
    ///
    /// Initialization runs low index first; if any stage fails, the stages
    /// that did come up are finalized (low to high) before the error is
    /// returned. Attachment happens only after every stage is initialized,
    /// so no stage ever observes a half-built downstream.
    pub fn start(&mut self, queue_size: usize) -> Result<()> {
        for index in 0..self.stages.len() {
            if let Err(err) = self.stages[index].init(queue_size) {
                for stage in &mut self.stages[..index] {
                    if let Err(fini_err) = stage.fini() {
                        error!("failed to finalize stage {}: {fini_err}", stage.name());
                    }
                }
                return Err(err);
            }
        }

        for index in 0..self.stages.len() - 1 {
            let hook = self.stages[index + 1].work_hook()?;
            self.stages[index].attach(Some(hook))?;
        }
        if let Some(last) = self.stages.last() {
            last.attach(None)?;
        }
        Ok(())
    }

    /// Feed input lines to the first stage until the sentinel or end of
    /// stream.
    ///
    /// Trailing newlines are stripped; everything else passes through
    /// unchanged (invalid UTF-8 bytes are replaced during decoding, and
    /// there is no line-length limit). A literal `<END>` line is forwarded
    /// and stops reading; if the stream ends without one, a sentinel is
    /// synthesized so the pipeline still terminates. Hand-off and read
    /// errors are logged and do not abort the feed.
    pub fn feed<R: BufRead>(&self, mut input: R) {
        let Some(first) = self.stages.first() else {
            return;
        };

        let mut buf = Vec::new();
        let mut end_seen = false;
        loop {
            buf.clear();
            match input.read_until(b'\n', &mut buf) {
                Ok(0) => break,
                Ok(_) => {}
                Err(err) => {
                    error!("failed to read input: {err}");
                    break;
                }
            }
            if buf.last() == Some(&b'\n') {
                buf.pop();
            }
            let line = String::from_utf8_lossy(&buf);
            if let Err(err) = first.place_work(&line) {
                error!("failed to place work: {err}");
            }
            if line == END_TOKEN {
                end_seen = true;
                break;
            }
        }

        if !end_seen {
            if let Err(err) = first.place_work(END_TOKEN) {
                error!("failed to send end token: {err}");
            }
        }
    }

    /// Wait for every stage to finish, then finalize each one.
    ///
    /// Both passes run from the first stage to the last, mirroring the
    /// sentinel's path through the chain. Anomalies are logged and the
    /// remaining shutdown continues.
    pub fn shutdown(&mut self) {
        for stage in &self.stages {
            if let Err(err) = stage.wait_finished() {
                error!(
                    "failed waiting for stage {} to finish: {err}",
                    stage.name()
                );
            }
        }
        for stage in &mut self.stages {
            if let Err(err) = stage.fini() {
                error!("failed to finalize stage {}: {err}", stage.name());
            }
        }
    }

    /// Feed the whole input stream, then shut the pipeline down.
    pub fn run<R: BufRead>(mut self, input: R) {
        self.feed(input);
        self.shutdown();
    }

    /// Number of stages in the chain.
    pub fn len(&self) -> usize {
        self.stages.len()
    }

    /// Whether the chain holds no stages.
    pub fn is_empty(&self) -> bool {
        self.stages.is_empty()
    }
}
