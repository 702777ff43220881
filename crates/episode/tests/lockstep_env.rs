mod common;

use common::{at, episode, world, VEHICLE};
use episode::{Action, Direction, Env, LockstepEnv};
use spatial::{BoundingBox, Pose3D};
use std::sync::Arc;

/// Basic sanity test for the lock-step environment.
///
/// Resets into the flight volume, then descends until the episode either
/// ends or the step budget runs out. Rewards must stay finite throughout.
#[test]
fn lockstep_env_basics() {
    let sim = world(at(0.0, 0.0, 0.0));
    let physics = Arc::clone(&sim);
    let mut env = LockstepEnv::new(episode(&sim), move || physics.advance(1.0 / 30.0));
    assert_eq!(env.action_size(), 15);

    let status = env.reset();
    assert_eq!(status.episode, 1);
    assert!(!status.done);
    let flight = BoundingBox::new(Pose3D::default(), 1.5, 20.0);
    assert!(flight.contains(&status.vehicle_pose.position));

    let start_z = status.vehicle_pose.position.z;
    for _ in 0..10 {
        let (_status, reward, done) = env.step(Action::Move(Direction::Descend));
        assert!(reward.is_finite());
        assert!(!done);
    }
    let z = sim.pose_of(VEHICLE).unwrap().position.z;
    assert!(z < start_z, "vehicle should have descended from {start_z}, now at {z}");
}

#[test]
fn landing_step_is_terminal_in_landing_box() {
    let sim = world(at(0.1, 0.1, 1.0));
    let physics = Arc::clone(&sim);
    let mut env = LockstepEnv::new(episode(&sim), move || physics.advance(0.1));

    let (status, reward, done) = env.step(Action::Land);
    assert!(done);
    assert_eq!(reward, 1.0);
    assert!(!status.wrong_altitude);
}
