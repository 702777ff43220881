use crate::action::Action;
use crate::context::EpisodeStatus;
use crate::handle::EnvHandle;
use crate::runner::EpisodeLoop;

/// Reinforcement learning environment trait.
///
/// Gym-style view of the landing task: each call to [`step`] applies one
/// action and returns the resulting status, the reward for the transition,
/// and whether the episode has terminated.
///
/// [`step`]: Env::step
pub trait Env {
    fn step(&mut self, action: Action) -> (EpisodeStatus, f64, bool);

    /// Start a new episode and return its first status.
    fn reset(&mut self) -> EpisodeStatus;

    /// Number of discrete actions.
    fn action_size(&self) -> usize {
        Action::ALL.len()
    }
}

/// Drives an [`EpisodeLoop`] in lock-step instead of in real time.
///
/// `settle` is called between the tick that dispatches an action and the tick
/// that evaluates its effect; with an in-process simulator that is where
/// physics advances.
pub struct LockstepEnv<F: FnMut()> {
    episode: EpisodeLoop,
    handle: EnvHandle,
    settle: F,
}

impl<F: FnMut()> LockstepEnv<F> {
    pub fn new(episode: EpisodeLoop, settle: F) -> Self {
        let handle = episode.handle();
        Self { episode, handle, settle }
    }

    #[must_use]
    pub fn handle(&self) -> &EnvHandle {
        &self.handle
    }

    fn advance(&mut self) -> EpisodeStatus {
        self.episode.tick();
        (self.settle)();
        self.episode.tick();
        self.handle.get_episode_status()
    }
}

impl<F: FnMut()> Env for LockstepEnv<F> {
    fn step(&mut self, action: Action) -> (EpisodeStatus, f64, bool) {
        self.handle.send_command(action.token());
        let status = self.advance();
        (status, status.reward, status.done)
    }

    fn reset(&mut self) -> EpisodeStatus {
        self.handle.request_reset(true);
        self.advance()
    }
}
