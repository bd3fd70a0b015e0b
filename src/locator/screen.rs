use anyhow::Result;
use image::RgbaImage;
use serde::Serialize;

#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct DisplayInfo {
    pub index: usize,
    pub width: u32,
    pub height: u32,
    /// Physical pixels per logical unit
    pub scale_factor: f64,
}

/// Access to the attached displays. Calls block; run them off the runtime.
pub trait ScreenSource: Send + Sync {
    fn displays(&self) -> Result<Vec<DisplayInfo>>;

    /// Full-resolution grab of display `index`.
    fn capture(&self, index: usize) -> Result<RgbaImage>;
}

#[cfg(feature = "xcap")]
pub use desktop::DesktopScreens;

#[cfg(feature = "xcap")]
mod desktop {
    use anyhow::{anyhow, Context, Result};
    use image::RgbaImage;
    use xcap::Monitor;

    use super::{DisplayInfo, ScreenSource};

    /// Every monitor reported by the OS, in enumeration order.
    #[derive(Debug, Default, Clone, Copy)]
    pub struct DesktopScreens;

    impl ScreenSource for DesktopScreens {
        fn displays(&self) -> Result<Vec<DisplayInfo>> {
            let monitors = Monitor::all().map_err(|e| anyhow!("Failed to get monitors: {e}"))?;
            Ok(monitors
                .iter()
                .enumerate()
                .map(|(index, m)| DisplayInfo {
                    index,
                    width: m.width(),
                    height: m.height(),
                    scale_factor: m.scale_factor() as f64,
                })
                .collect())
        }

        fn capture(&self, index: usize) -> Result<RgbaImage> {
            let monitors = Monitor::all().map_err(|e| anyhow!("Failed to get monitors: {e}"))?;
            let monitor = monitors
                .get(index)
                .ok_or_else(|| anyhow!("display {index} not attached"))?;
            let shot = monitor
                .capture_image()
                .map_err(|e| anyhow!("Failed to capture display {index}: {e}"))?;
            let (width, height) = (shot.width(), shot.height());
            RgbaImage::from_raw(width, height, shot.into_raw())
                .context("capture buffer has unexpected size")
        }
    }
}
