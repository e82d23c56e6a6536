use serde::{Deserialize, Serialize};

/// An image attached to an album or artist. The API orders images
/// widest first.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct Image {
    /// The source URL of the image.
    pub url: Option<String>,
    /// The image height in pixels.
    pub height: Option<u32>,
    /// The image width in pixels.
    pub width: Option<u32>,
}

/// A page of items, as returned by list endpoints.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Paging<T> {
    /// The items on this page.
    #[serde(default)]
    pub items: Option<Vec<T>>,
    /// The total number of items available.
    #[serde(default)]
    pub total: Option<u32>,
    /// The maximum number of items in the response.
    #[serde(default)]
    pub limit: Option<u32>,
    /// The offset of this page.
    #[serde(default)]
    pub offset: Option<u32>,
}
impl<T> Default for Paging<T> {
    fn default() -> Self {
        Self {
            items: None,
            total: None,
            limit: None,
            offset: None,
        }
    }
}
impl<T> Paging<T> {
    /// Consume the page, returning its items (or nothing if absent).
    pub fn into_items(self) -> Vec<T> {
        self.items.unwrap_or_default()
    }
}

/// The URL of the first (widest) image, if any.
pub fn first_image_url(images: Option<&[Image]>) -> Option<&str> {
    images?.first()?.url.as_deref()
}
