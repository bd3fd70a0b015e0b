pub mod catalog;
pub mod fetch;

use anyhow::{Context, Result};
use log::{debug, warn};
use std::{
    collections::{BTreeMap, BTreeSet},
    path::{Path, PathBuf},
};

use crate::histogram::{histogram_of_region, premium_code, CardHistogram, CropMode};

pub use catalog::{CardCatalog, CardClass, CardInfo, Rarity};
pub use fetch::{CardImageFetcher, HttpImageFetcher};

/// Reference histograms for every code that can show up this session.
///
/// Ordered by code so ranking ties resolve the same way every run. Codes whose
/// art is not on disk yet are tracked as pending until a download reports back.
#[derive(Debug, Clone, Default)]
pub struct ReferenceLibrary {
    cards_dir: PathBuf,
    hero_mode: bool,
    histograms: BTreeMap<String, CardHistogram>,
    pending: BTreeSet<String>,
}

impl ReferenceLibrary {
    pub fn new(cards_dir: PathBuf, hero_mode: bool) -> Self {
        Self {
            cards_dir,
            hero_mode,
            histograms: BTreeMap::new(),
            pending: BTreeSet::new(),
        }
    }

    /// Loads `code` and, for collectible cards, its premium render.
    pub fn add_card(&mut self, code: &str, catalog: &CardCatalog) {
        self.add_code(code);
        if !self.hero_mode && catalog.is_collectible(code) {
            self.add_code(&premium_code(code));
        }
    }

    /// Loads a single reference image from disk or marks it pending.
    pub fn add_code(&mut self, code: &str) {
        if self.histograms.contains_key(code) || self.pending.contains(code) {
            return;
        }
        let path = self.image_path(code);
        if !path.exists() {
            self.pending.insert(code.to_string());
            return;
        }
        match load_histogram(&path, CropMode::for_code(code, self.hero_mode)) {
            Ok(hist) => {
                self.histograms.insert(code.to_string(), hist);
            }
            Err(err) => {
                warn!("Discarding unreadable card image {code}: {err:#}");
                self.pending.insert(code.to_string());
            }
        }
    }

    /// Applies a finished download. Returns the remaining pending count, or
    /// `None` if `code` was not awaited by this library.
    pub fn complete_download(&mut self, code: &str, hist: Option<CardHistogram>) -> Option<usize> {
        if !self.pending.remove(code) {
            debug!("Ignoring download for untracked code {code}");
            return None;
        }
        if let Some(hist) = hist {
            self.histograms.insert(code.to_string(), hist);
        }
        Some(self.pending.len())
    }

    pub fn image_path(&self, code: &str) -> PathBuf {
        self.cards_dir.join(format!("{code}.png"))
    }

    pub fn crop_mode(&self, code: &str) -> CropMode {
        CropMode::for_code(code, self.hero_mode)
    }

    pub fn pending(&self) -> impl Iterator<Item = &str> {
        self.pending.iter().map(String::as_str)
    }

    pub fn is_pending(&self, code: &str) -> bool {
        self.pending.contains(code)
    }

    pub fn pending_count(&self) -> usize {
        self.pending.len()
    }

    pub fn is_ready(&self) -> bool {
        self.pending.is_empty()
    }

    pub fn len(&self) -> usize {
        self.histograms.len()
    }

    pub fn is_empty(&self) -> bool {
        self.histograms.is_empty()
    }

    pub fn get(&self, code: &str) -> Option<&CardHistogram> {
        self.histograms.get(code)
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &CardHistogram)> {
        self.histograms.iter().map(|(code, hist)| (code.as_str(), hist))
    }

    pub fn insert(&mut self, code: impl Into<String>, hist: CardHistogram) {
        self.histograms.insert(code.into(), hist);
    }
}

/// Opens a reference image and histograms its crop window.
pub fn load_histogram(path: &Path, crop: CropMode) -> Result<CardHistogram> {
    let image = image::open(path)
        .with_context(|| format!("Failed to open {}", path.display()))?
        .to_rgb8();
    histogram_of_region(&image, crop.rect())
        .with_context(|| format!("Bad card image {}", path.display()))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::histogram::distance;
    use image::{Rgb, RgbImage};

    fn write_card(dir: &Path, code: &str, color: [u8; 3]) {
        RgbImage::from_pixel(200, 380, Rgb(color))
            .save(dir.join(format!("{code}.png")))
            .unwrap();
    }

    fn catalog() -> CardCatalog {
        CardCatalog::from_json(
            r#"[
                {"id": "CS2_001", "name": "A", "rarity": "COMMON", "collectible": true},
                {"id": "ARENA_9", "name": "B", "rarity": "RARE", "collectible": false}
            ]"#,
        )
        .unwrap()
    }

    #[test]
    fn loads_cached_images_and_queues_missing() {
        let dir = tempfile::tempdir().unwrap();
        write_card(dir.path(), "CS2_001", [200, 30, 30]);

        let mut library = ReferenceLibrary::new(dir.path().to_path_buf(), false);
        library.add_card("CS2_001", &catalog());
        library.add_card("ARENA_9", &catalog());

        assert!(library.get("CS2_001").is_some());
        let pending: Vec<_> = library.pending().collect();
        assert_eq!(pending, vec!["ARENA_9", "CS2_001_premium"]);
    }

    #[test]
    fn non_collectible_cards_skip_premium() {
        let dir = tempfile::tempdir().unwrap();
        let mut library = ReferenceLibrary::new(dir.path().to_path_buf(), false);
        library.add_card("ARENA_9", &catalog());
        assert_eq!(library.pending_count(), 1);
    }

    #[test]
    fn downloads_for_unknown_codes_are_ignored() {
        let dir = tempfile::tempdir().unwrap();
        let mut library = ReferenceLibrary::new(dir.path().to_path_buf(), false);
        library.add_code("CS2_001");

        assert_eq!(library.complete_download("OTHER", None), None);
        assert_eq!(library.complete_download("CS2_001", None), Some(0));
        assert!(library.is_ready());
        assert!(library.get("CS2_001").is_none());
    }

    #[test]
    fn undersized_image_is_rejected() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("tiny.png");
        RgbImage::from_pixel(50, 50, Rgb([1, 2, 3])).save(&path).unwrap();
        assert!(load_histogram(&path, CropMode::Card).is_err());
    }

    #[test]
    fn premium_and_plain_crops_differ_on_bordered_art() {
        let dir = tempfile::tempdir().unwrap();
        // Vertical stripe at x=57..60 is only inside the premium window.
        let art = RgbImage::from_fn(200, 380, |x, _| {
            if (57..60).contains(&x) { Rgb([0, 0, 250]) } else { Rgb([250, 0, 0]) }
        });
        let path = dir.path().join("art.png");
        art.save(&path).unwrap();

        let plain = load_histogram(&path, CropMode::Card).unwrap();
        let premium = load_histogram(&path, CropMode::PremiumCard).unwrap();
        assert!(distance(&plain, &premium) > 0.0);
    }
}
