//! Synthetic downward camera for the mock world.

use anyhow::{anyhow, Context, Result};
use episode::EnvHandle;
use image::{DynamicImage, GrayImage, Rgb, RgbImage};
use settings::CropRect;
use spatial::Pose3D;
use std::path::Path;

const WIDTH: u32 = 640;
const HEIGHT: u32 = 360;
/// Pixels per metre of horizontal offset at one metre of altitude.
const FOCAL: f64 = 180.0;
const MARKER_SIZE: f64 = 0.8;
const GROUND: Rgb<u8> = Rgb([70, 90, 60]);
const MARKER: Rgb<u8> = Rgb([240, 240, 240]);

/// Render the marker as a bright square seen from straight above the
/// vehicle. The square grows as the vehicle descends.
#[allow(clippy::cast_possible_truncation, clippy::cast_precision_loss)]
pub fn synthetic(vehicle: &Pose3D, marker: &Pose3D) -> DynamicImage {
    let rel = vehicle.relative_to(marker);
    let altitude = rel.z.max(0.2);
    let scale = FOCAL / altitude;
    let cx = f64::from(WIDTH) / 2.0 + rel.y * scale;
    let cy = f64::from(HEIGHT) / 2.0 + rel.x * scale;
    let half = MARKER_SIZE / 2.0 * scale;

    let image = RgbImage::from_fn(WIDTH, HEIGHT, |px, py| {
        let (px, py) = (f64::from(px), f64::from(py));
        if (px - cx).abs() <= half && (py - cy).abs() <= half {
            MARKER
        } else {
            GROUND
        }
    });
    DynamicImage::ImageRgb8(image)
}

/// Write the latest derived frame as a greyscale PNG.
pub fn save_matrix(handle: &EnvHandle, crop: &CropRect, path: &Path) -> Result<()> {
    let pixels = handle.get_frame_matrix().context("no derived frame to save")?;
    let image = GrayImage::from_raw(crop.width, crop.height, pixels)
        .ok_or_else(|| anyhow!("derived frame does not match the {}x{} crop", crop.width, crop.height))?;
    image.save(path).with_context(|| format!("writing {}", path.display()))?;
    Ok(())
}
