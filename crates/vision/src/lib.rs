#![deny(clippy::all, clippy::pedantic)]
//! # Camera Frames
//!
//! The downward camera delivers full-resolution frames far faster than the
//! agent consumes them. This crate keeps the most recent one and derives the
//! small greyscale observation the agent trains on: convert to luma, scale by
//! a fixed ratio, then cut a fixed rectangle out of the result.
//!
//! The transform is stateless; [`FrameStore`] only remembers its last output.

use image::imageops::{self, FilterType};
use image::{DynamicImage, GrayImage};
use settings::{CropRect, FrameConfig};
use thiserror::Error;
use tracing::warn;

#[derive(Error, Debug, Clone, PartialEq)]
pub enum VisionError {
    #[error("frame of {width}x{height} scales to an empty image")]
    EmptyAfterResize { width: u32, height: u32 },
    #[error("crop {crop:?} does not fit a {width}x{height} resized frame")]
    CropOutOfBounds { crop: CropRect, width: u32, height: u32 },
}

/// Greyscale, resize and crop, in that order.
#[derive(Debug, Clone, PartialEq)]
pub struct FrameTransform {
    resize_ratio: f64,
    crop: CropRect,
}

impl FrameTransform {
    #[must_use]
    pub fn new(config: &FrameConfig) -> Self {
        Self { resize_ratio: config.resize_ratio, crop: config.crop }
    }

    #[must_use]
    pub fn output_len(&self) -> usize {
        self.crop.width as usize * self.crop.height as usize
    }

    #[allow(clippy::cast_possible_truncation, clippy::cast_sign_loss)]
    fn scaled(&self, side: u32) -> u32 {
        (f64::from(side) * self.resize_ratio).round() as u32
    }

    /// # Errors
    /// Fails when the scaled frame is empty or too small for the crop
    /// rectangle.
    pub fn apply(&self, frame: &DynamicImage) -> Result<GrayImage, VisionError> {
        let (width, height) = (frame.width(), frame.height());
        let (new_w, new_h) = (self.scaled(width), self.scaled(height));
        if new_w == 0 || new_h == 0 {
            return Err(VisionError::EmptyAfterResize { width, height });
        }

        let CropRect { x, y, width: crop_w, height: crop_h } = self.crop;
        if x.saturating_add(crop_w) > new_w || y.saturating_add(crop_h) > new_h {
            return Err(VisionError::CropOutOfBounds {
                crop: self.crop,
                width: new_w,
                height: new_h,
            });
        }

        let grey = frame.to_luma8();
        let resized = imageops::resize(&grey, new_w, new_h, FilterType::Triangle);
        Ok(imageops::crop_imm(&resized, x, y, crop_w, crop_h).to_image())
    }
}

/// Latest camera frame plus its derived observation.
pub struct FrameStore {
    transform: FrameTransform,
    raw: Option<DynamicImage>,
    processed: Option<GrayImage>,
    received: u64,
}

impl FrameStore {
    #[must_use]
    pub fn new(transform: FrameTransform) -> Self {
        Self { transform, raw: None, processed: None, received: 0 }
    }

    /// Replace the stored frame.
    ///
    /// The raw frame is always kept. If the transform fails the previous
    /// derived frame is dropped rather than served as if it were current.
    ///
    /// # Errors
    /// Propagates the transform error.
    pub fn ingest(&mut self, frame: DynamicImage) -> Result<(), VisionError> {
        self.received += 1;
        let result = self.transform.apply(&frame);
        self.raw = Some(frame);
        match result {
            Ok(grey) => {
                self.processed = Some(grey);
                Ok(())
            }
            Err(e) => {
                warn!("Dropping derived frame: {e}");
                self.processed = None;
                Err(e)
            }
        }
    }

    #[must_use]
    pub fn raw(&self) -> Option<&DynamicImage> {
        self.raw.as_ref()
    }

    #[must_use]
    pub fn processed(&self) -> Option<&GrayImage> {
        self.processed.as_ref()
    }

    /// Derived frame flattened row-major.
    #[must_use]
    pub fn matrix(&self) -> Option<Vec<u8>> {
        self.processed.as_ref().map(|img| img.as_raw().clone())
    }

    #[must_use]
    pub fn frames_received(&self) -> u64 {
        self.received
    }
}
