use std::collections::HashMap;

use url::Url;

/// Extension used when an image URL carries no usable suffix.
pub const DEFAULT_IMAGE_EXTENSION: &str = "jpg";

const MAX_EXTENSION_LEN: usize = 5;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ImageMode {
    #[default]
    Embed,
    Strip,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ImageReference {
    pub original_url: String,
    pub local_name: Option<String>,
    pub sequence_index: usize,
}

impl ImageReference {
    /// Default local name: `img_001.png` for the first image, and so on.
    pub fn placeholder_name(&self) -> String {
        format!(
            "img_{:03}.{}",
            self.sequence_index + 1,
            image_extension(&self.original_url)
        )
    }
}

/// Insertion-ordered map of image URLs to references.
///
/// The first time a URL is registered it receives the next sequence index;
/// registering it again returns the same index.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ImageRegistry {
    references: Vec<ImageReference>,
    index_by_url: HashMap<String, usize>,
}

impl ImageRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn register(&mut self, url: &str) -> usize {
        if let Some(index) = self.index_by_url.get(url) {
            return *index;
        }
        let index = self.references.len();
        self.references.push(ImageReference {
            original_url: url.to_string(),
            local_name: None,
            sequence_index: index,
        });
        self.index_by_url.insert(url.to_string(), index);
        index
    }

    pub fn get(&self, index: usize) -> Option<&ImageReference> {
        self.references.get(index)
    }

    pub fn len(&self) -> usize {
        self.references.len()
    }

    pub fn is_empty(&self) -> bool {
        self.references.is_empty()
    }

    /// References in sequence-index order.
    pub fn references(&self) -> &[ImageReference] {
        &self.references
    }
}

fn image_extension(raw_url: &str) -> String {
    let path = match Url::parse(raw_url) {
        Ok(url) => url.path().to_string(),
        Err(_) => raw_url
            .split(['?', '#'])
            .next()
            .unwrap_or_default()
            .to_string(),
    };
    let last_segment = path.rsplit('/').next().unwrap_or_default();
    last_segment
        .rsplit_once('.')
        .map(|(_, ext)| ext.to_ascii_lowercase())
        .filter(|ext| {
            !ext.is_empty()
                && ext.len() <= MAX_EXTENSION_LEN
                && ext.chars().all(|c| c.is_ascii_alphanumeric())
        })
        .unwrap_or_else(|| DEFAULT_IMAGE_EXTENSION.to_string())
}

#[cfg(test)]
mod tests {
    use super::image_extension;

    #[test]
    fn extension_comes_from_path_not_query() {
        assert_eq!(image_extension("https://x.example/a/b.PNG?w=200"), "png");
        assert_eq!(image_extension("https://x.example/photo.webp#frag"), "webp");
    }

    #[test]
    fn missing_or_odd_extension_defaults_to_jpg() {
        assert_eq!(image_extension("https://x.example/images/12345"), "jpg");
        assert_eq!(image_extension("https://x.example/a.b/noext"), "jpg");
        assert_eq!(image_extension("https://x.example/file.toolongext"), "jpg");
        assert_eq!(image_extension("not a url"), "jpg");
    }
}
