//! Sequential batch driver.
//!
//! Images are processed one after another with a cooperative yield between
//! items. A failing image is recorded on its job and the batch moves on.
//! Cancellation is checked before each item; items never started stay
//! [`JobStatus::Pending`].

use std::sync::atomic::{AtomicBool, Ordering};
use std::thread;

use crate::error::{CodecError, PipelineError};
use crate::icon_matte::alpha_channel::PixelBuffer;
use crate::icon_matte::codec;
use crate::icon_matte::pipeline::{process_image, ProcessingOptions};

/// Where a batch item's pixels come from
#[derive(Debug, Clone)]
pub enum ImageSource {
    /// Already decoded RGBA pixels
    Decoded(PixelBuffer),
    /// Encoded file bytes, decoded when the item is processed
    Encoded(Vec<u8>),
}

/// One input to a batch
#[derive(Debug, Clone)]
pub struct BatchItem {
    pub name: String,
    pub source: ImageSource,
    /// Replaces the batch-wide options for this item only
    pub options: Option<ProcessingOptions>,
}

impl BatchItem {
    pub fn decoded(name: impl Into<String>, image: PixelBuffer) -> Self {
        Self {
            name: name.into(),
            source: ImageSource::Decoded(image),
            options: None,
        }
    }

    pub fn encoded(name: impl Into<String>, bytes: Vec<u8>) -> Self {
        Self {
            name: name.into(),
            source: ImageSource::Encoded(bytes),
            options: None,
        }
    }

    pub fn with_options(mut self, options: ProcessingOptions) -> Self {
        self.options = Some(options);
        self
    }
}

/// Lifecycle of a single job
#[derive(Debug, Clone, PartialEq)]
pub enum JobStatus {
    Pending,
    Processing,
    Done(PixelBuffer),
    Error(String),
}

/// A batch item together with its outcome
#[derive(Debug, Clone)]
pub struct ImageJob {
    pub name: String,
    pub status: JobStatus,
}

impl ImageJob {
    pub fn result(&self) -> Option<&PixelBuffer> {
        match &self.status {
            JobStatus::Done(image) => Some(image),
            _ => None,
        }
    }

    pub fn is_done(&self) -> bool {
        matches!(self.status, JobStatus::Done(_))
    }

    /// Encodes the finished image as PNG
    ///
    /// # Returns
    ///
    /// `None` unless the job is done
    pub fn encode_png(&self) -> Option<Result<Vec<u8>, CodecError>> {
        self.result().map(codec::encode_png)
    }
}

/// Progress snapshot reported when an item starts and when it finishes
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Progress<'a> {
    pub completed: usize,
    pub total: usize,
    pub current: &'a str,
    /// `Processing` on start, `Done` or `Error` on finish
    pub status: &'a JobStatus,
}

impl Progress<'_> {
    pub fn is_finished(&self) -> bool {
        matches!(self.status, JobStatus::Done(_) | JobStatus::Error(_))
    }
}

/// Runs many images through [`process_image`] with shared options
#[derive(Debug, Clone, Default)]
pub struct BatchProcessor {
    options: ProcessingOptions,
    reference: Option<PixelBuffer>,
}

impl BatchProcessor {
    pub fn new(options: ProcessingOptions) -> Self {
        Self {
            options,
            reference: None,
        }
    }

    /// Uses `reference` as the bare-backdrop picture for every item
    pub fn with_reference(mut self, reference: PixelBuffer) -> Self {
        self.reference = Some(reference);
        self
    }

    pub fn options(&self) -> &ProcessingOptions {
        &self.options
    }

    pub fn reference(&self) -> Option<&PixelBuffer> {
        self.reference.as_ref()
    }

    /// Processes `items` in order
    ///
    /// # Arguments
    ///
    /// * `items` - Inputs, each optionally carrying its own options
    /// * `cancel` - Checked before each item; once set, remaining items stay pending
    /// * `progress` - Called as each item starts and again once it finishes
    ///
    /// # Returns
    ///
    /// One job per item, in input order
    pub fn run<F>(
        &self,
        items: Vec<BatchItem>,
        cancel: &AtomicBool,
        mut progress: F,
    ) -> Vec<ImageJob>
    where
        F: FnMut(Progress<'_>),
    {
        let total = items.len();
        let _span = tracing::info_span!("batch", total).entered();
        tracing::info!(total, "starting batch");

        let mut jobs: Vec<ImageJob> = items
            .iter()
            .map(|item| ImageJob {
                name: item.name.clone(),
                status: JobStatus::Pending,
            })
            .collect();

        let mut completed = 0;
        for (job, item) in jobs.iter_mut().zip(items) {
            if cancel.load(Ordering::Relaxed) {
                tracing::info!(completed, total, "batch cancelled");
                break;
            }

            job.status = JobStatus::Processing;
            progress(Progress {
                completed,
                total,
                current: &job.name,
                status: &job.status,
            });

            job.status = match self.process_item(item) {
                Ok(image) => JobStatus::Done(image),
                Err(err) => {
                    tracing::warn!(name = %job.name, error = %err, "image failed");
                    JobStatus::Error(err.to_string())
                }
            };

            completed += 1;
            progress(Progress {
                completed,
                total,
                current: &job.name,
                status: &job.status,
            });
            thread::yield_now();
        }

        tracing::info!(
            done = jobs.iter().filter(|job| job.is_done()).count(),
            total,
            "batch finished"
        );
        jobs
    }

    fn process_item(&self, item: BatchItem) -> Result<PixelBuffer, PipelineError> {
        let _span = tracing::debug_span!("item", name = %item.name).entered();
        let options = item.options.as_ref().unwrap_or(&self.options);
        match item.source {
            ImageSource::Decoded(image) => process_image(&image, self.reference(), options),
            ImageSource::Encoded(bytes) => {
                let image = codec::decode(&bytes)?;
                process_image(&image, self.reference(), options)
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_utils::{solid, ICON_BLUE};
    use image::{Rgb, Rgba};

    fn icon_on_white() -> PixelBuffer {
        let mut image = solid(6, 6, Rgba([255, 255, 255, 255]));
        image.put_pixel(3, 3, ICON_BLUE);
        image
    }

    fn white_key() -> ProcessingOptions {
        ProcessingOptions::new()
            .with_edge_smoothing(false)
            .with_target_background_color(Rgb([255, 255, 255]))
    }

    #[test]
    fn test_failures_are_isolated() {
        let items = vec![
            BatchItem::decoded("good", icon_on_white()),
            BatchItem::encoded("broken", b"not a png".to_vec()),
            BatchItem::decoded("bad_options", icon_on_white())
                .with_options(ProcessingOptions::new().with_threshold(0)),
            BatchItem::decoded("also_good", icon_on_white()),
        ];

        let jobs = BatchProcessor::new(white_key()).run(items, &AtomicBool::new(false), |_| {});

        assert_eq!(jobs.len(), 4);
        assert!(jobs[0].is_done());
        assert!(matches!(&jobs[1].status, JobStatus::Error(message) if message.contains("decode")));
        assert!(matches!(jobs[2].status, JobStatus::Error(_)));
        assert!(jobs[3].is_done());
    }

    #[test]
    fn test_cancel_leaves_items_pending() {
        let cancel = AtomicBool::new(false);
        let items = vec![
            BatchItem::decoded("first", icon_on_white()),
            BatchItem::decoded("second", icon_on_white()),
            BatchItem::decoded("third", icon_on_white()),
        ];

        let jobs = BatchProcessor::new(white_key()).run(items, &cancel, |progress| {
            if progress.is_finished() && progress.completed == 1 {
                cancel.store(true, Ordering::Relaxed);
            }
        });

        assert!(jobs[0].is_done());
        assert_eq!(jobs[1].status, JobStatus::Pending);
        assert_eq!(jobs[2].status, JobStatus::Pending);
    }

    #[test]
    fn test_progress_reports_every_item() {
        let items = vec![
            BatchItem::decoded("a", icon_on_white()),
            BatchItem::decoded("b", icon_on_white()),
        ];
        let mut seen = Vec::new();

        BatchProcessor::new(white_key()).run(items, &AtomicBool::new(false), |progress| {
            if progress.is_finished() {
                seen.push((progress.completed, progress.total, progress.current.to_string()));
            }
        });

        assert_eq!(seen, vec![(1, 2, "a".to_string()), (2, 2, "b".to_string())]);
    }

    #[test]
    fn test_progress_reports_processing_before_outcome() {
        let items = vec![
            BatchItem::decoded("good", icon_on_white()),
            BatchItem::encoded("broken", b"not a png".to_vec()),
        ];
        let mut events = Vec::new();

        BatchProcessor::new(white_key()).run(items, &AtomicBool::new(false), |progress| {
            let stage = match progress.status {
                JobStatus::Pending => "pending",
                JobStatus::Processing => "processing",
                JobStatus::Done(_) => "done",
                JobStatus::Error(_) => "error",
            };
            events.push((progress.current.to_string(), stage, progress.completed));
        });

        assert_eq!(
            events,
            vec![
                ("good".to_string(), "processing", 0),
                ("good".to_string(), "done", 1),
                ("broken".to_string(), "processing", 1),
                ("broken".to_string(), "error", 2),
            ]
        );
    }

    #[test]
    fn test_encoded_item_and_png_output() {
        let bytes = codec::encode_png(&icon_on_white()).unwrap();
        let jobs = BatchProcessor::new(white_key()).run(
            vec![BatchItem::encoded("icon.png", bytes)],
            &AtomicBool::new(false),
            |_| {},
        );

        let png = jobs[0].encode_png().unwrap().unwrap();
        let decoded = codec::decode(&png).unwrap();
        assert_eq!(decoded.get_pixel(3, 3), &ICON_BLUE);
        assert_eq!(decoded.get_pixel(0, 0)[3], 0);
    }

    #[test]
    fn test_reference_applies_to_every_item() {
        let backdrop = solid(6, 6, Rgba([255, 255, 255, 255]));
        let processor = BatchProcessor::new(ProcessingOptions::new().with_edge_smoothing(false))
            .with_reference(backdrop);

        let jobs = processor.run(
            vec![BatchItem::decoded("icon", icon_on_white())],
            &AtomicBool::new(false),
            |_| {},
        );
        let result = jobs[0].result().unwrap();
        assert_eq!(result.get_pixel(3, 3), &ICON_BLUE);
        assert_eq!(result.pixels().filter(|p| p[3] == 0).count(), 35);
    }

    #[test]
    fn test_pending_job_has_no_png() {
        let job = ImageJob {
            name: "x".into(),
            status: JobStatus::Pending,
        };
        assert!(job.encode_png().is_none());
    }
}
