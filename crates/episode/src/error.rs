use settings::ConfigError;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum EpisodeError {
    /// Asked for tick-derived data before the first evaluation completed.
    #[error("no tick has been evaluated yet")]
    NotReady,
    #[error("no camera frame available")]
    NoFrame,
    #[error(transparent)]
    Config(#[from] ConfigError),
}
