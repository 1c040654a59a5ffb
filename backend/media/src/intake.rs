//! Image intake: the current selection and its previews.

use serde::{Deserialize, Serialize};
use tracing::{debug, info};

use crate::file::ImageFile;
use crate::mime_detect::is_image;
use crate::preview::{PreviewHandle, PreviewRegistry};
use crate::MediaError;

/// Default upper bound on images per selection.
pub const DEFAULT_MAX_IMAGES: usize = 32;

/// How a batch of files reached the intake.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum IntakeSource {
    /// File picker; its own `accept` filter already applied, so every input
    /// passes through.
    #[default]
    Picker,
    /// Drag and drop; anything dropped arrives, so non-images are filtered.
    Drop,
}

/// A selected file with its live preview.
#[derive(Debug)]
pub struct SelectedImage {
    file: ImageFile,
    preview: PreviewHandle,
}

impl SelectedImage {
    pub fn file(&self) -> &ImageFile {
        &self.file
    }

    pub fn preview(&self) -> &PreviewHandle {
        &self.preview
    }
}

/// Result of offering a batch to the intake.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct IntakeOutcome {
    /// `false` when the batch was ignored and the prior selection kept.
    pub accepted: bool,
    pub selected: usize,
    pub filtered_out: usize,
}

#[derive(Debug)]
pub struct ImageIntake {
    registry: PreviewRegistry,
    selected: Vec<SelectedImage>,
    max_images: usize,
}

impl ImageIntake {
    pub fn new(registry: PreviewRegistry, max_images: usize) -> Self {
        Self {
            registry,
            selected: Vec::new(),
            max_images,
        }
    }

    pub fn registry(&self) -> &PreviewRegistry {
        &self.registry
    }

    /// Offer a batch. On acceptance the previous selection and its previews
    /// are replaced; a drop with no images at all leaves it untouched.
    pub fn select(
        &mut self,
        files: Vec<ImageFile>,
        source: IntakeSource,
    ) -> Result<IntakeOutcome, MediaError> {
        let offered = files.len();
        let files: Vec<ImageFile> = match source {
            IntakeSource::Picker => files,
            IntakeSource::Drop => files
                .into_iter()
                .filter(|f| is_image(f.media_type()))
                .collect(),
        };
        let filtered_out = offered - files.len();

        if source == IntakeSource::Drop && files.is_empty() {
            debug!(offered, "Dropped batch held no images; keeping selection");
            return Ok(IntakeOutcome {
                accepted: false,
                selected: self.selected.len(),
                filtered_out,
            });
        }

        if files.len() > self.max_images {
            return Err(MediaError::TooManyImages {
                count: files.len(),
                max: self.max_images,
            });
        }

        // Allocate every new preview before releasing the old ones, so a
        // failure leaves the prior selection intact.
        let mut next = Vec::with_capacity(files.len());
        for file in files {
            let preview = self.registry.allocate(&file)?;
            next.push(SelectedImage { file, preview });
        }
        self.selected = next;

        info!(
            source = ?source,
            selected = self.selected.len(),
            filtered_out,
            "Selection replaced"
        );
        Ok(IntakeOutcome {
            accepted: true,
            selected: self.selected.len(),
            filtered_out,
        })
    }

    /// Release every preview and empty the selection.
    pub fn clear(&mut self) {
        let released = self.selected.len();
        self.selected.clear();
        debug!(released, "Selection cleared");
    }

    pub fn selected(&self) -> &[SelectedImage] {
        &self.selected
    }

    /// The accepted files, unchanged and in order.
    pub fn files(&self) -> Vec<ImageFile> {
        self.selected.iter().map(|s| s.file.clone()).collect()
    }

    pub fn len(&self) -> usize {
        self.selected.len()
    }

    pub fn is_empty(&self) -> bool {
        self.selected.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use bytes::Bytes;

    fn file(name: &str, mime: &str) -> ImageFile {
        ImageFile::from_bytes(name, Some(mime), Bytes::from_static(b"data"))
    }

    fn intake() -> ImageIntake {
        ImageIntake::new(PreviewRegistry::new(16), 8)
    }

    #[test]
    fn picker_passes_everything_through() {
        let mut intake = intake();
        let outcome = intake
            .select(
                vec![file("a.jpg", "image/jpeg"), file("notes.txt", "text/plain")],
                IntakeSource::Picker,
            )
            .unwrap();
        assert!(outcome.accepted);
        assert_eq!(intake.len(), 2);
        assert_eq!(intake.registry().live_count(), 2);
    }

    #[test]
    fn drop_keeps_only_images() {
        let mut intake = intake();
        let outcome = intake
            .select(
                vec![
                    file("a.jpg", "image/jpeg"),
                    file("memo.pdf", "application/pdf"),
                    file("b.png", "image/png"),
                ],
                IntakeSource::Drop,
            )
            .unwrap();
        assert_eq!(outcome.selected, 2);
        assert_eq!(outcome.filtered_out, 1);
        let names: Vec<_> = intake.files().iter().map(|f| f.name().to_string()).collect();
        assert_eq!(names, vec!["a.jpg", "b.png"]);
    }

    #[test]
    fn drop_without_images_keeps_prior_selection() {
        let mut intake = intake();
        intake
            .select(vec![file("a.jpg", "image/jpeg")], IntakeSource::Picker)
            .unwrap();
        let before = intake.selected()[0].preview().id();

        let outcome = intake
            .select(vec![file("notes.txt", "text/plain")], IntakeSource::Drop)
            .unwrap();
        assert!(!outcome.accepted);
        assert_eq!(intake.len(), 1);
        assert_eq!(intake.selected()[0].preview().id(), before);
    }

    #[test]
    fn replacement_releases_old_previews() {
        let mut intake = intake();
        intake
            .select(
                vec![file("a.jpg", "image/jpeg"), file("b.jpg", "image/jpeg")],
                IntakeSource::Picker,
            )
            .unwrap();
        intake
            .select(vec![file("c.jpg", "image/jpeg")], IntakeSource::Picker)
            .unwrap();
        assert_eq!(intake.registry().live_count(), 1);
    }

    #[test]
    fn clear_and_teardown_release_previews() {
        let registry = PreviewRegistry::new(16);
        let mut intake = ImageIntake::new(registry.clone(), 8);
        intake
            .select(vec![file("a.jpg", "image/jpeg")], IntakeSource::Picker)
            .unwrap();
        intake.clear();
        assert_eq!(registry.live_count(), 0);
        assert!(intake.is_empty());

        intake
            .select(vec![file("b.jpg", "image/jpeg")], IntakeSource::Picker)
            .unwrap();
        drop(intake);
        assert_eq!(registry.live_count(), 0);
    }

    #[test]
    fn failed_allocation_keeps_old_selection() {
        let registry = PreviewRegistry::new(3);
        let mut intake = ImageIntake::new(registry.clone(), 8);
        intake
            .select(
                vec![file("a.jpg", "image/jpeg"), file("b.jpg", "image/jpeg")],
                IntakeSource::Picker,
            )
            .unwrap();

        let err = intake
            .select(
                vec![file("c.jpg", "image/jpeg"), file("d.jpg", "image/jpeg")],
                IntakeSource::Picker,
            )
            .unwrap_err();
        assert!(matches!(err, MediaError::PreviewTableFull { .. }));
        assert_eq!(intake.len(), 2);
        assert_eq!(registry.live_count(), 2);
    }

    #[test]
    fn too_many_images_is_rejected() {
        let mut intake = ImageIntake::new(PreviewRegistry::new(16), 1);
        let err = intake
            .select(
                vec![file("a.jpg", "image/jpeg"), file("b.jpg", "image/jpeg")],
                IntakeSource::Picker,
            )
            .unwrap_err();
        assert!(matches!(err, MediaError::TooManyImages { count: 2, max: 1 }));
    }
}
