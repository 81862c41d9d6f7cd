//! Batch export: one slide per data row.
//!
//! An [`ExportJob`] advances one row per [`ExportJob::step`], so a host can
//! report progress and stay responsive between rows. Rows are never split.

use crate::model::{PlacementModel, SlideDimensions};
use crate::project::{PlacedItem, project_slide};
use crate::session::{DataSession, ImageAsset};
use std::cell::Cell;
use thiserror::Error;

/// Export errors.
#[derive(Debug, Error)]
pub enum ExportError {
    #[error("An export is already running")]
    Busy,
    #[error("Export finished early: {done} of {total} slides written")]
    Incomplete { done: usize, total: usize },
    #[error("Export sink failed: {0}")]
    Sink(#[source] Box<dyn std::error::Error + Send + Sync>),
}

/// One output slide handed to a sink.
#[derive(Debug, Clone, PartialEq)]
pub struct RenderedSlide {
    /// Zero-based row index.
    pub index: usize,
    /// Resolved elements in paint order, boxes in centimetres.
    pub items: Vec<PlacedItem>,
}

/// Receives the slides of a batch export.
///
/// Geometry arrives in centimetres; converting to the output unit is the
/// sink's job.
pub trait ExportSink {
    type Error: std::error::Error + Send + Sync + 'static;

    /// Called once before the first slide.
    fn begin(&mut self, dimensions: SlideDimensions, background: Option<&ImageAsset>) -> Result<(), Self::Error>;

    fn add_slide(&mut self, slide: &RenderedSlide) -> Result<(), Self::Error>;

    /// Produce the output document.
    fn finish(&mut self) -> Result<Vec<u8>, Self::Error>;
}

/// Progress of an export.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ExportProgress {
    pub done: usize,
    pub total: usize,
    /// Rounded percentage, 100 for an empty batch.
    pub percent: u8,
}

impl ExportProgress {
    fn new(done: usize, total: usize) -> Self {
        let percent = if total == 0 {
            100
        } else {
            ((done as f64 / total as f64) * 100.0).round() as u8
        };
        Self { done, total, percent }
    }

    pub fn is_complete(&self) -> bool {
        self.done >= self.total
    }
}

/// Guards against running two exports at once.
#[derive(Debug, Default)]
pub struct BusyFlag(Cell<bool>);

impl BusyFlag {
    pub fn is_busy(&self) -> bool {
        self.0.get()
    }

    /// Mark busy until the returned guard is dropped.
    pub fn try_acquire(&self) -> Result<BusyGuard<'_>, ExportError> {
        if self.0.replace(true) {
            return Err(ExportError::Busy);
        }
        Ok(BusyGuard(&self.0))
    }
}

/// Clears the busy flag on drop.
#[derive(Debug)]
pub struct BusyGuard<'a>(&'a Cell<bool>);

impl Drop for BusyGuard<'_> {
    fn drop(&mut self) {
        self.0.set(false);
    }
}

/// A running batch export.
pub struct ExportJob<'a, S: ExportSink> {
    model: &'a PlacementModel,
    session: &'a DataSession,
    sink: S,
    next_row: usize,
    started: bool,
    _busy: Option<BusyGuard<'a>>,
}

impl<'a, S: ExportSink> ExportJob<'a, S> {
    pub fn new(model: &'a PlacementModel, session: &'a DataSession, sink: S) -> Self {
        Self {
            model,
            session,
            sink,
            next_row: 0,
            started: false,
            _busy: None,
        }
    }

    /// Hold `guard` for the lifetime of the job.
    pub fn with_guard(mut self, guard: BusyGuard<'a>) -> Self {
        self._busy = Some(guard);
        self
    }

    pub fn progress(&self) -> ExportProgress {
        ExportProgress::new(self.next_row, self.session.rows.len())
    }

    fn sink_error(e: S::Error) -> ExportError {
        ExportError::Sink(Box::new(e))
    }

    /// Write the next row. Returns the progress after the step; once all
    /// rows are written further steps do nothing.
    pub fn step(&mut self) -> Result<ExportProgress, ExportError> {
        if !self.started {
            log::info!(
                "Exporting {} slides with {} elements each",
                self.session.rows.len(),
                self.model.len()
            );
            self.sink
                .begin(self.model.dimensions(), self.session.background.as_deref())
                .map_err(Self::sink_error)?;
            self.started = true;
        }

        if let Some(row) = self.session.rows.get(self.next_row) {
            let slide = RenderedSlide {
                index: self.next_row,
                items: project_slide(self.model, &self.session.variables, row, &self.session.images),
            };
            self.sink.add_slide(&slide).map_err(Self::sink_error)?;
            self.next_row += 1;
            log::debug!("Exported slide {}/{}", self.next_row, self.session.rows.len());
        }
        Ok(self.progress())
    }

    /// Produce the output. Every row must have been written.
    pub fn finish(mut self) -> Result<Vec<u8>, ExportError> {
        let progress = self.progress();
        if !self.started || !progress.is_complete() {
            if self.started || progress.total > 0 {
                return Err(ExportError::Incomplete {
                    done: progress.done,
                    total: progress.total,
                });
            }
            self.step()?;
        }
        let bytes = self.sink.finish().map_err(Self::sink_error)?;
        log::info!("Export finished: {} slides, {} bytes", progress.total, bytes.len());
        Ok(bytes)
    }

    /// Run every remaining row, reporting progress after each one.
    pub fn run<F>(mut self, mut on_progress: F) -> Result<Vec<u8>, ExportError>
    where
        F: FnMut(ExportProgress),
    {
        loop {
            let progress = self.step()?;
            on_progress(progress);
            if progress.is_complete() {
                break;
            }
        }
        self.finish()
    }
}
