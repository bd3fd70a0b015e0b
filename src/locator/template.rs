use anyhow::{Context, Result};
use image::{imageops, imageops::FilterType, GrayImage, RgbaImage};
use imageproc::template_matching::{find_extremes, match_template, MatchTemplateMethod};
use std::path::Path;

use crate::config::DraftConfig;
use crate::histogram::Rect;

/// Corner pairs of the three slots, in template pixels.
type Anchors = [((u32, u32), (u32, u32)); 3];

const CARD_ANCHORS: Anchors = [
    ((205, 276), (323, 394)),
    ((484, 276), (602, 394)),
    ((762, 276), (880, 394)),
];

const HERO_ANCHORS: Anchors = [
    ((182, 332), (334, 484)),
    ((453, 332), (605, 484)),
    ((724, 332), (876, 484)),
];

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum LayoutKind {
    Cards,
    Heroes,
}

impl LayoutKind {
    pub fn file_name(self) -> &'static str {
        match self {
            LayoutKind::Cards => "arenaTemplate.png",
            LayoutKind::Heroes => "heroesTemplate.png",
        }
    }

    fn anchors(self) -> Anchors {
        match self {
            LayoutKind::Cards => CARD_ANCHORS,
            LayoutKind::Heroes => HERO_ANCHORS,
        }
    }
}

/// Reference picture of a draft screen with the slot anchors inside it.
#[derive(Debug, Clone)]
pub struct DraftLayout {
    pub kind: LayoutKind,
    template: GrayImage,
    anchors: Anchors,
}

impl DraftLayout {
    pub fn load(templates_dir: &Path, kind: LayoutKind) -> Result<Self> {
        let path = templates_dir.join(kind.file_name());
        let template = image::open(&path)
            .with_context(|| format!("Failed to open template {}", path.display()))?
            .to_luma8();
        Ok(Self::from_image(kind, template))
    }

    pub fn from_image(kind: LayoutKind, template: GrayImage) -> Self {
        Self {
            kind,
            template,
            anchors: kind.anchors(),
        }
    }

    pub fn with_anchors(mut self, anchors: Anchors) -> Self {
        self.anchors = anchors;
        self
    }

    pub fn template_size(&self) -> (u32, u32) {
        self.template.dimensions()
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct MatchOptions {
    pub threshold: f32,
    pub search_width: u32,
    pub screen_fraction: f32,
    pub scale_steps: Vec<f32>,
}

impl From<&DraftConfig> for MatchOptions {
    fn from(config: &DraftConfig) -> Self {
        Self {
            threshold: config.template_match_threshold,
            search_width: config.template_search_width,
            screen_fraction: config.template_screen_fraction,
            scale_steps: config.template_scale_steps.clone(),
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct LayoutMatch {
    pub slots: [Rect; 3],
    pub score: f32,
    /// Template pixels to screen pixels
    pub template_scale: f32,
}

/// Finds `layout` on a full-resolution screen grab.
pub fn find_layout(screen: &RgbaImage, layout: &DraftLayout, options: &MatchOptions) -> Option<LayoutMatch> {
    let (screen_w, screen_h) = screen.dimensions();
    let (tpl_w, tpl_h) = layout.template_size();
    if screen_w == 0 || screen_h == 0 || tpl_w == 0 || tpl_h == 0 {
        return None;
    }

    let work = (options.search_width as f32 / screen_w as f32).min(1.0);
    let work_w = ((screen_w as f32 * work).round() as u32).max(1);
    let work_h = ((screen_h as f32 * work).round() as u32).max(1);
    let gray = imageops::grayscale(screen);
    let haystack = imageops::resize(&gray, work_w, work_h, FilterType::Triangle);

    let expected = screen_h as f32 * options.screen_fraction / tpl_h as f32;
    let mut best: Option<LayoutMatch> = None;

    for step in &options.scale_steps {
        let scale = expected * step;
        let needle_w = (tpl_w as f32 * scale * work).round() as u32;
        let needle_h = (tpl_h as f32 * scale * work).round() as u32;
        if needle_w < 8 || needle_h < 8 || needle_w > work_w || needle_h > work_h {
            continue;
        }
        let needle = imageops::resize(&layout.template, needle_w, needle_h, FilterType::Triangle);
        let scores = match_template(&haystack, &needle, MatchTemplateMethod::CrossCorrelationNormalized);
        let extremes = find_extremes(&scores);

        if extremes.max_value < options.threshold {
            continue;
        }
        if best.as_ref().is_some_and(|b| b.score >= extremes.max_value) {
            continue;
        }
        let (x, y) = extremes.max_value_location;
        let origin = (x as f32 / work, y as f32 / work);
        best = Some(LayoutMatch {
            slots: layout.anchors.map(|anchor| project(anchor, origin, scale)),
            score: extremes.max_value,
            template_scale: scale,
        });
    }

    best.filter(|m| m.slots.iter().all(|r| r.fits_within(screen_w, screen_h)))
}

fn project(((x1, y1), (x2, y2)): ((u32, u32), (u32, u32)), origin: (f32, f32), scale: f32) -> Rect {
    let left = (origin.0 + x1 as f32 * scale).round().max(0.0) as u32;
    let top = (origin.1 + y1 as f32 * scale).round().max(0.0) as u32;
    let right = (origin.0 + x2 as f32 * scale).round().max(0.0) as u32;
    let bottom = (origin.1 + y2 as f32 * scale).round().max(0.0) as u32;
    Rect::new(left, top, right.saturating_sub(left), bottom.saturating_sub(top))
}

#[cfg(test)]
mod tests {
    use super::*;
    use image::{Luma, Rgba};

    /// Blocky pattern with enough structure for correlation to lock on.
    pub(crate) fn pattern(width: u32, height: u32) -> GrayImage {
        GrayImage::from_fn(width, height, |x, y| {
            let v = ((x / 8) * 37 + (y / 8) * 91 + (x / 8) * (y / 8) * 13) % 251;
            Luma([v as u8])
        })
    }

    pub(crate) fn screen_with(template: &GrayImage, at: (u32, u32), size: (u32, u32)) -> RgbaImage {
        let mut screen = RgbaImage::from_pixel(size.0, size.1, Rgba([20, 20, 20, 255]));
        for (x, y, p) in template.enumerate_pixels() {
            let v = p[0];
            screen.put_pixel(at.0 + x, at.1 + y, Rgba([v, v, v, 255]));
        }
        screen
    }

    fn options(screen_h: u32, tpl_h: u32) -> MatchOptions {
        MatchOptions {
            threshold: 0.9,
            search_width: 400,
            screen_fraction: tpl_h as f32 / screen_h as f32,
            scale_steps: vec![1.0],
        }
    }

    #[test]
    fn locates_template_and_projects_anchors() {
        let template = pattern(96, 64);
        let screen = screen_with(&template, (120, 80), (320, 240));
        let layout = DraftLayout::from_image(LayoutKind::Cards, template).with_anchors([
            ((8, 8), (24, 24)),
            ((40, 8), (56, 24)),
            ((72, 8), (88, 24)),
        ]);

        let found = find_layout(&screen, &layout, &options(240, 64)).expect("template present");
        assert!(found.score > 0.99);
        assert_eq!(found.slots[0], Rect::new(128, 88, 16, 16));
        assert_eq!(found.slots[2], Rect::new(192, 88, 16, 16));
    }

    #[test]
    fn blank_screen_has_no_layout() {
        let template = pattern(96, 64);
        let screen = RgbaImage::from_pixel(320, 240, Rgba([20, 20, 20, 255]));
        let layout = DraftLayout::from_image(LayoutKind::Cards, template);
        assert!(find_layout(&screen, &layout, &options(240, 64)).is_none());
    }

    #[test]
    fn oversized_template_is_skipped() {
        let template = pattern(400, 300);
        let screen = RgbaImage::from_pixel(320, 240, Rgba([20, 20, 20, 255]));
        let layout = DraftLayout::from_image(LayoutKind::Heroes, template);
        let mut opts = options(240, 300);
        opts.screen_fraction = 2.0;
        assert!(find_layout(&screen, &layout, &opts).is_none());
    }
}
