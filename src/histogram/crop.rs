use serde::{Deserialize, Serialize};

/// Axis-aligned pixel rectangle.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
pub struct Rect {
    pub x: u32,
    pub y: u32,
    pub width: u32,
    pub height: u32,
}

impl Rect {
    pub const fn new(x: u32, y: u32, width: u32, height: u32) -> Self {
        Self { x, y, width, height }
    }

    pub fn fits_within(&self, width: u32, height: u32) -> bool {
        self.width > 0
            && self.height > 0
            && self.x.saturating_add(self.width) <= width
            && self.y.saturating_add(self.height) <= height
    }
}

/// Which part of a reference image is compared against screen captures.
///
/// Premium art has a 3px narrower left border than the plain render, so the
/// card window starts further left for it. Hero portraits use a larger
/// square from further down the image.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CropMode {
    Card,
    PremiumCard,
    HeroPortrait,
}

pub const PREMIUM_SUFFIX: &str = "_premium";

impl CropMode {
    pub fn for_code(code: &str, hero_draft: bool) -> Self {
        if hero_draft {
            CropMode::HeroPortrait
        } else if is_premium(code) {
            CropMode::PremiumCard
        } else {
            CropMode::Card
        }
    }

    pub const fn rect(self) -> Rect {
        match self {
            CropMode::Card => Rect::new(60, 71, 80, 80),
            CropMode::PremiumCard => Rect::new(57, 71, 80, 80),
            CropMode::HeroPortrait => Rect::new(75, 201, 160, 160),
        }
    }
}

pub fn is_premium(code: &str) -> bool {
    code.ends_with(PREMIUM_SUFFIX)
}

/// Strips the premium suffix so both renders share one key.
pub fn degold(code: &str) -> &str {
    code.strip_suffix(PREMIUM_SUFFIX).unwrap_or(code)
}

pub fn premium_code(code: &str) -> String {
    format!("{code}{PREMIUM_SUFFIX}")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn premium_crop_is_three_pixels_left() {
        let plain = CropMode::for_code("EX1_001", false).rect();
        let premium = CropMode::for_code("EX1_001_premium", false).rect();
        assert_eq!(plain.x - premium.x, 3);
        assert_eq!(plain.y, premium.y);
        assert_eq!((premium.width, premium.height), (80, 80));
    }

    #[test]
    fn hero_mode_ignores_suffix() {
        assert_eq!(CropMode::for_code("HERO_01", true), CropMode::HeroPortrait);
        assert_eq!(CropMode::HeroPortrait.rect(), Rect::new(75, 201, 160, 160));
    }

    #[test]
    fn degold_only_strips_trailing_suffix() {
        assert_eq!(degold("CARD_01_premium"), "CARD_01");
        assert_eq!(degold("CARD_01"), "CARD_01");
        assert_eq!(degold("_premium_CARD"), "_premium_CARD");
    }

    #[test]
    fn rect_bounds() {
        assert!(Rect::new(60, 71, 80, 80).fits_within(140, 151));
        assert!(!Rect::new(60, 71, 80, 80).fits_within(139, 200));
    }
}
