//! Agent-facing request handlers.
//!
//! [`EnvHandle`] is what a transport layer wraps: each method is one
//! request/response call. Handles are cheap to clone and safe to use from any
//! thread while the loop is running. None of them waits for a tick.

use crate::action::Action;
use crate::context::{EpisodeStatus, RelativePose, SharedContext};
use crate::error::EpisodeError;
use image::DynamicImage;
use serde::Serialize;
use tracing::debug;
use vision::VisionError;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct CommandAck {
    /// What the token was understood as.
    pub action: Action,
    /// False when the token was unknown and replaced by a stop.
    pub recognized: bool,
}

#[derive(Clone)]
pub struct EnvHandle {
    ctx: SharedContext,
}

impl EnvHandle {
    #[must_use]
    pub fn new(ctx: SharedContext) -> Self {
        Self { ctx }
    }

    #[must_use]
    pub fn get_episode_status(&self) -> EpisodeStatus {
        self.ctx.lock().status()
    }

    /// # Errors
    /// `EpisodeError::NotReady` before the first tick has been evaluated.
    pub fn get_relative_pose(&self) -> Result<RelativePose, EpisodeError> {
        self.ctx.lock().relative_pose()
    }

    pub fn request_reset(&self, reset: bool) {
        debug!(reset, "reset requested");
        self.ctx.lock().request_reset(reset);
    }

    pub fn send_command(&self, token: &str) -> CommandAck {
        let recognized = Action::try_parse(token).is_some();
        let action = self.ctx.lock().send_command(token);
        CommandAck { action, recognized }
    }

    /// Latest raw camera frame.
    ///
    /// # Errors
    /// `EpisodeError::NoFrame` if no frame has arrived yet.
    pub fn get_frame(&self) -> Result<DynamicImage, EpisodeError> {
        self.ctx.lock().frame().cloned().ok_or(EpisodeError::NoFrame)
    }

    /// Latest derived greyscale frame, flattened row-major.
    ///
    /// # Errors
    /// `EpisodeError::NoFrame` if no frame has arrived yet or the last one
    /// could not be transformed.
    pub fn get_frame_matrix(&self) -> Result<Vec<u8>, EpisodeError> {
        self.ctx.lock().frame_matrix().ok_or(EpisodeError::NoFrame)
    }

    /// Frame-source callback.
    ///
    /// # Errors
    /// Propagates the frame transform error.
    pub fn ingest_frame(&self, frame: DynamicImage) -> Result<(), VisionError> {
        self.ctx.lock().ingest_frame(frame)
    }
}
