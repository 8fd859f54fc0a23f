//! Chunked persistence of decoded stories and frames
//!
//! Stories are written before frames. Each chunk goes to the store in a
//! single `save_stories`/`save_frames` call, which the store commits as one
//! transaction. A failing chunk aborts the write; earlier chunks stay
//! committed.

use storybundle_core::{FrameRecord, LibraryStore, StoryRecord};
use tracing::debug;

use crate::error::EngineResult;

/// Counters returned by a completed batch write
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct BatchReport {
    /// Story rows written
    pub stories_written: usize,
    /// Frame rows written
    pub frames_written: usize,
    /// Storage transactions committed
    pub transactions: usize,
}

/// Writes records in fixed-size chunks
#[derive(Debug, Clone, Copy)]
pub struct BatchWriter {
    story_chunk_size: usize,
    frame_chunk_size: usize,
}

impl Default for BatchWriter {
    fn default() -> Self {
        Self::new(200, 500)
    }
}

impl BatchWriter {
    /// Create a writer; zero chunk sizes are raised to one
    pub fn new(story_chunk_size: usize, frame_chunk_size: usize) -> Self {
        Self {
            story_chunk_size: story_chunk_size.max(1),
            frame_chunk_size: frame_chunk_size.max(1),
        }
    }

    /// Stories per transaction
    pub fn story_chunk_size(&self) -> usize {
        self.story_chunk_size
    }

    /// Frames per transaction
    pub fn frame_chunk_size(&self) -> usize {
        self.frame_chunk_size
    }

    /// Write all stories, then all frames
    ///
    /// `on_progress` receives the fraction of records written so far, in
    /// `[0.0, 1.0]`, after every committed chunk.
    ///
    /// # Errors
    ///
    /// Returns the first storage error. Chunks committed before it remain.
    pub fn write(
        &self,
        store: &dyn LibraryStore,
        stories: &[StoryRecord],
        frames: &[FrameRecord],
        on_progress: &mut dyn FnMut(f32),
    ) -> EngineResult<BatchReport> {
        let total = stories.len() + frames.len();
        let mut report = BatchReport::default();

        if total == 0 {
            on_progress(1.0);
            return Ok(report);
        }

        for chunk in stories.chunks(self.story_chunk_size) {
            store.save_stories(chunk)?;
            report.stories_written += chunk.len();
            report.transactions += 1;
            debug!(
                target: "storybundle::batch",
                chunk = chunk.len(),
                written = report.stories_written,
                "Committed story chunk"
            );
            on_progress(fraction(report.stories_written, total));
        }

        for chunk in frames.chunks(self.frame_chunk_size) {
            store.save_frames(chunk)?;
            report.frames_written += chunk.len();
            report.transactions += 1;
            debug!(
                target: "storybundle::batch",
                chunk = chunk.len(),
                written = report.frames_written,
                "Committed frame chunk"
            );
            on_progress(fraction(report.stories_written + report.frames_written, total));
        }

        Ok(report)
    }
}

fn fraction(done: usize, total: usize) -> f32 {
    done as f32 / total as f32
}
