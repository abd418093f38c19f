use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

use crate::errors::ServiceError;

/// A pending product image as assembled by the admin form: the opaque
/// URL/storage-path pair returned by the upload endpoint plus optional alt
/// text. Ordering and the primary flag are derived at save time, never stored
/// on the draft.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
pub struct ImageDraft {
    pub url: String,
    #[serde(default)]
    pub storage_path: Option<String>,
    #[serde(default)]
    pub alt_text: Option<String>,
}

/// Ordered, immutable list of image drafts. Every edit returns a new list so
/// a stale handle can never observe a half-applied mutation. The first entry
/// is implicitly the primary image.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ImageList {
    entries: Vec<ImageDraft>,
}

impl ImageList {
    pub fn new() -> Self {
        Self::default()
    }

    /// Builds a list from drafts already in order, enforcing the maximum
    /// count. Used when a full image set arrives in a save payload.
    pub fn from_drafts(drafts: Vec<ImageDraft>, max_images: usize) -> Result<Self, ServiceError> {
        Self::new().with_appended(drafts, max_images)
    }

    /// Returns a new list with `drafts` appended at the end. If the result
    /// would exceed `max_images` the whole batch is rejected and no draft is
    /// appended.
    pub fn with_appended(
        &self,
        drafts: impl IntoIterator<Item = ImageDraft>,
        max_images: usize,
    ) -> Result<Self, ServiceError> {
        let incoming: Vec<ImageDraft> = drafts.into_iter().collect();
        if self.entries.len() + incoming.len() > max_images {
            return Err(ServiceError::ValidationError(format!(
                "A product can have at most {} images",
                max_images
            )));
        }

        let mut entries = self.entries.clone();
        entries.extend(incoming);
        Ok(Self { entries })
    }

    /// Returns a new list without the draft at `index`; later drafts shift
    /// one position left.
    pub fn with_removed(&self, index: usize) -> Result<Self, ServiceError> {
        self.check_index(index)?;
        let mut entries = self.entries.clone();
        entries.remove(index);
        Ok(Self { entries })
    }

    /// Returns a new list with the drafts at positions `a` and `b` exchanged.
    pub fn with_swapped(&self, a: usize, b: usize) -> Result<Self, ServiceError> {
        self.check_index(a)?;
        self.check_index(b)?;
        let mut entries = self.entries.clone();
        entries.swap(a, b);
        Ok(Self { entries })
    }

    /// The draft that will become the primary image, if any.
    pub fn primary(&self) -> Option<&ImageDraft> {
        self.entries.first()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &ImageDraft> {
        self.entries.iter()
    }

    fn check_index(&self, index: usize) -> Result<(), ServiceError> {
        if index >= self.entries.len() {
            return Err(ServiceError::InvalidInput(format!(
                "Image index {} out of bounds (list has {} entries)",
                index,
                self.entries.len()
            )));
        }
        Ok(())
    }
}
