use serde::Deserialize;
use ae_core::gallery::GalleryImage;

/// Gallery endpoints answer with either a bare list or `{images: [...]}`
#[derive(Debug, Clone, Deserialize)]
#[serde(untagged)]
pub enum GalleryListing {
    List(Vec<GalleryImage>),
    Wrapped { images: Vec<GalleryImage> },
}

impl GalleryListing {
    pub fn into_images(self) -> Vec<GalleryImage> {
        match self {
            GalleryListing::List(images) => images,
            GalleryListing::Wrapped { images } => images,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_both_listing_shapes() {
        let bare: GalleryListing =
            serde_json::from_str(r#"[{"image_url": "https://cdn/a.png", "prompt": "a cat"}]"#).unwrap();
        assert_eq!(bare.into_images().len(), 1);

        let wrapped: GalleryListing =
            serde_json::from_str(r#"{"images": [{"url": "https://cdn/b.png"}]}"#).unwrap();
        let images = wrapped.into_images();
        assert_eq!(images[0].image_url, "https://cdn/b.png");
    }
}
