//! Host capabilities backed by the local machine.

use async_trait::async_trait;
use image::RgbaImage;
use std::path::{Path, PathBuf};

use crate::error::PtimeError;
use crate::location::Coordinates;

use super::host::{Geolocation, ImageLoader};

/// Loads page image URLs from an assets directory.
///
/// Both `../img/earthViz.png` and `/www/img/earthViz.png` resolve to
/// `<root>/img/earthViz.png`.
#[derive(Debug, Clone)]
pub struct FileImageLoader {
    root: PathBuf,
}

impl FileImageLoader {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    pub fn resolve(&self, src: &str) -> PathBuf {
        let mut rel = src;
        loop {
            let next = rel
                .trim_start_matches('/')
                .trim_start_matches("../")
                .trim_start_matches("./");
            let next = next.strip_prefix("www/").unwrap_or(next);
            if next == rel {
                break;
            }
            rel = next;
        }
        let rel: PathBuf = Path::new(rel)
            .components()
            .filter(|c| matches!(c, std::path::Component::Normal(_)))
            .collect();
        self.root.join(rel)
    }
}

#[async_trait]
impl ImageLoader for FileImageLoader {
    async fn load(&self, src: &str) -> Result<RgbaImage, PtimeError> {
        let path = self.resolve(src);
        log::debug!("loading {} from {}", src, path.display());
        let decoded = tokio::task::spawn_blocking(move || image::open(&path))
            .await
            .map_err(|e| PtimeError::Image(format!("Load task failed: {}", e)))?
            .map_err(|e| PtimeError::Image(format!("Failed to load {}: {}", src, e)))?;
        Ok(decoded.to_rgba8())
    }
}

/// Already-decoded image, handed out for every source.
#[derive(Debug, Clone)]
pub struct StaticImage(pub RgbaImage);

#[async_trait]
impl ImageLoader for StaticImage {
    async fn load(&self, _src: &str) -> Result<RgbaImage, PtimeError> {
        Ok(self.0.clone())
    }
}

/// A position known up front (from a query string or CLI flags).
#[derive(Debug, Clone, Copy)]
pub struct FixedPosition(pub Coordinates);

#[async_trait]
impl Geolocation for FixedPosition {
    async fn current_position(&self) -> Option<Coordinates> {
        Some(self.0)
    }
}

/// A capability that exists but whose requests are refused.
#[derive(Debug, Clone, Copy, Default)]
pub struct DeniedPosition;

#[async_trait]
impl Geolocation for DeniedPosition {
    async fn current_position(&self) -> Option<Coordinates> {
        None
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_resolve_both_variants() {
        let loader = FileImageLoader::new("/srv/assets");
        assert_eq!(
            loader.resolve("../img/earthViz.png"),
            PathBuf::from("/srv/assets/img/earthViz.png")
        );
        assert_eq!(
            loader.resolve("/www/img/earthViz.png"),
            PathBuf::from("/srv/assets/img/earthViz.png")
        );
    }

    #[test]
    fn test_resolve_stays_under_root() {
        let loader = FileImageLoader::new("/srv/assets");
        assert_eq!(
            loader.resolve("/img/../../etc/passwd"),
            PathBuf::from("/srv/assets/img/etc/passwd")
        );
    }

    #[tokio::test]
    async fn test_missing_file_is_image_error() {
        let loader = FileImageLoader::new("/nonexistent");
        let err = loader.load("/www/img/earthViz.png").await.unwrap_err();
        assert!(matches!(err, PtimeError::Image(_)));
    }

    #[tokio::test]
    async fn test_fixed_and_denied() {
        let here = Coordinates::new(1.0, 2.0);
        assert_eq!(FixedPosition(here).current_position().await, Some(here));
        assert_eq!(DeniedPosition.current_position().await, None);
    }
}
