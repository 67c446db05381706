use tracing::debug;

use crate::domain::LazyAsset;

/// Assigns deferred image sources on first visibility.
pub struct LazyMediaLoader;

impl LazyMediaLoader {
    /// Moves the deferred source into the live source.
    ///
    /// Returns true only on the call that performed the assignment; later
    /// calls leave the asset untouched.
    pub fn on_visible(asset: &mut LazyAsset) -> bool {
        if asset.is_loaded() {
            return false;
        }
        match asset.data_src.take() {
            Some(src) => {
                debug!(image = %asset.id, src = %src, "lazy image source assigned");
                asset.src = Some(src);
                true
            }
            None => false,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::Bounds;

    fn asset() -> LazyAsset {
        LazyAsset {
            id: "hero-dog".into(),
            alt: "A healthy dog".to_string(),
            bounds: Bounds::new(200.0, 8.0),
            data_src: Some("/static/img/dog.jpg".to_string()),
            src: None,
        }
    }

    #[test]
    fn test_source_assigned_once() {
        let mut image = asset();
        assert!(!image.is_loaded());

        assert!(LazyMediaLoader::on_visible(&mut image));
        assert_eq!(image.src.as_deref(), Some("/static/img/dog.jpg"));
        assert!(image.data_src.is_none());

        assert!(!LazyMediaLoader::on_visible(&mut image));
        assert_eq!(image.src.as_deref(), Some("/static/img/dog.jpg"));
    }

    #[test]
    fn test_without_deferred_source_nothing_happens() {
        let mut image = LazyAsset {
            data_src: None,
            ..asset()
        };
        assert!(!LazyMediaLoader::on_visible(&mut image));
        assert!(image.src.is_none());
    }
}
