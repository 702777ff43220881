mod common;

use common::{at, default_config, episode, episode_with, world, MARKER, VEHICLE};
use episode::{EpisodeError, EpisodeLoop};
use settings::EnvConfig;
use sim::{Actuation, MockSim, Simulator};
use spatial::{BoundingBox, Pose3D, Twist, Vec3};
use std::sync::atomic::AtomicBool;
use std::sync::Arc;

#[test]
fn relative_pose_is_not_ready_before_first_tick() {
    let sim = world(at(1.0, 2.0, 3.0));
    let mut episode = episode(&sim);
    let agent = episode.handle();

    assert!(matches!(agent.get_relative_pose(), Err(EpisodeError::NotReady)));

    episode.tick();
    let rel = agent.get_relative_pose().unwrap();
    assert_eq!((rel.x, rel.y, rel.z), (1.0, 2.0, 3.0));
    assert_eq!(rel.tick, 1);
}

#[test]
fn flying_out_of_the_flight_box_ends_the_episode() {
    let sim = world(at(5.0, 0.0, 3.0));
    let mut episode = episode(&sim);
    let agent = episode.handle();

    let report = episode.tick();
    let status = agent.get_episode_status();
    assert!(status.done);
    assert!(status.reward <= -1.0);
    assert_eq!(report.outcome.map(|o| o.done), Some(true));
}

#[test]
fn landing_inside_the_landing_box_succeeds() {
    let sim = world(at(0.2, -0.1, 0.8));
    let mut episode = episode(&sim);
    let agent = episode.handle();

    agent.send_command("land");
    episode.tick();

    let status = agent.get_episode_status();
    assert!(status.done);
    assert!(status.reward >= 1.0);
    assert!(!status.wrong_altitude);
    assert_eq!(sim.published(), vec![Actuation::Land]);
}

#[test]
fn left_dispatches_positive_y_velocity() {
    let sim = world(at(0.0, 0.0, 5.0));
    let mut episode = episode(&sim);
    let agent = episode.handle();

    let ack = agent.send_command("left");
    assert!(ack.recognized);
    let report = episode.tick();

    let expected = Twist::new(Vec3::new(0.0, 0.5, 0.0), Vec3::ZERO);
    assert_eq!(report.actuation, Some(Actuation::Velocity(expected)));
    assert_eq!(sim.published(), vec![Actuation::Velocity(expected)]);
}

#[test]
fn one_actuation_per_tick_with_take_off_first() {
    let sim = world(at(0.0, 0.0, 5.0));
    let mut episode = episode(&sim);
    let agent = episode.handle();

    agent.send_command("left");
    agent.send_command("land");
    agent.send_command("takeoff");
    episode.tick();
    assert_eq!(sim.published(), vec![Actuation::TakeOff]);

    // nothing carried over into the next tick
    let report = episode.tick();
    assert_eq!(report.actuation, None);
    assert_eq!(sim.published().len(), 1);
}

#[test]
fn unknown_token_is_acknowledged_as_stop() {
    let sim = world(at(0.0, 0.0, 5.0));
    let mut episode = episode(&sim);
    let agent = episode.handle();

    let ack = agent.send_command("loop_the_loop");
    assert!(!ack.recognized);
    assert_eq!(ack.action.token(), "stop");
    episode.tick();
    assert_eq!(sim.published(), vec![Actuation::Velocity(Twist::ZERO)]);
}

#[test]
fn reset_respawns_inside_flight_volume_once() {
    let sim = world(at(9.0, 9.0, 0.0));
    let mut episode = episode(&sim);
    let agent = episode.handle();

    agent.request_reset(true);
    assert!(agent.get_episode_status().reset_pending);
    let report = episode.tick();

    let respawn = report.respawn.expect("reset should be honoured");
    let vehicle = sim.pose_of(VEHICLE).unwrap();
    assert_eq!(vehicle, respawn);
    let flight = BoundingBox::new(Pose3D::default(), 1.5, 20.0);
    assert!(flight.contains(&vehicle.position));

    let status = agent.get_episode_status();
    assert!(!status.reset_pending);
    assert_eq!(status.episode, 1);

    // consumed: the next tick does not teleport again
    assert_eq!(episode.tick().respawn, None);
    let next = agent.get_episode_status();
    assert_eq!(next.vehicle_pose, respawn);
    assert!(!next.done);
}

#[test]
fn withdrawn_reset_is_not_honoured() {
    let sim = world(at(0.0, 0.0, 5.0));
    let mut episode = episode(&sim);
    let agent = episode.handle();

    agent.request_reset(true);
    agent.request_reset(false);
    assert_eq!(episode.tick().respawn, None);
    assert_eq!(agent.get_episode_status().episode, 0);
}

#[test]
fn reset_clears_the_landing_command() {
    let sim = world(at(0.0, 0.0, 0.5));
    let mut episode = episode(&sim);
    let agent = episode.handle();

    agent.send_command("land");
    episode.tick();
    assert!(agent.get_episode_status().done);

    agent.request_reset(true);
    episode.tick();
    episode.tick();
    let status = agent.get_episode_status();
    assert!(!status.done, "new episode should not inherit the landing");
}

#[test]
fn boxes_follow_the_marker() {
    let sim = world(at(10.0, 0.0, 0.5));
    let mut episode = episode(&sim);
    let agent = episode.handle();

    episode.tick();
    assert!(agent.get_episode_status().done);

    sim.place(MARKER, at(10.0, 0.0, 0.0));
    agent.send_command("land");
    episode.tick();
    let status = agent.get_episode_status();
    assert!(status.done);
    assert!(status.reward > 0.0);
}

#[test]
fn failed_queries_reuse_cached_poses() {
    let sim = world(at(0.5, 0.0, 5.0));
    let mut episode = episode(&sim);
    let agent = episode.handle();

    episode.tick();
    let before = agent.get_episode_status();
    assert!(!before.stale);

    sim.fail_next_queries(2);
    let report = episode.tick();
    assert!(report.stale);
    assert!(report.outcome.is_some());

    let status = agent.get_episode_status();
    assert!(status.stale);
    assert!(!status.degraded);
    assert_eq!(status.tick, 2);
    assert_eq!(status.vehicle_pose, before.vehicle_pose);
}

#[test]
fn relative_pose_from_cached_poses_is_flagged_stale() {
    let sim = world(at(1.0, 0.0, 5.0));
    let mut episode = episode(&sim);
    let agent = episode.handle();

    episode.tick();
    let fresh = agent.get_relative_pose().unwrap();
    assert!(!fresh.stale);

    sim.place(VEHICLE, at(-1.0, 0.0, 2.0));
    sim.set_unavailable(true);
    episode.tick();

    let rel = agent.get_relative_pose().unwrap();
    assert_eq!(rel.tick, 2);
    assert!(rel.stale);
    assert_eq!((rel.x, rel.z), (1.0, 5.0));

    sim.set_unavailable(false);
    episode.tick();
    let rel = agent.get_relative_pose().unwrap();
    assert!(!rel.stale);
    assert_eq!((rel.x, rel.z), (-1.0, 2.0));
}

#[test]
fn persistent_outage_reports_degraded_without_stopping() {
    let mut config = EnvConfig::default();
    config.degraded_after = 3;
    let sim = world(at(0.0, 0.0, 5.0));
    let mut episode = episode_with(config.validate().unwrap(), &sim);
    let agent = episode.handle();

    episode.tick();
    sim.set_unavailable(true);
    agent.send_command("ascend");
    for _ in 0..3 {
        episode.tick();
    }
    let status = agent.get_episode_status();
    assert!(status.stale && status.degraded);

    sim.set_unavailable(false);
    episode.tick();
    let status = agent.get_episode_status();
    assert!(!status.stale && !status.degraded);
    assert_eq!(status.tick, 5);
}

#[test]
fn reset_waits_for_a_known_marker() {
    let sim = Arc::new(MockSim::new(VEHICLE).with_object(VEHICLE, at(0.0, 0.0, 5.0)));
    let mut episode = episode(&sim);
    let agent = episode.handle();

    agent.request_reset(true);
    let report = episode.tick();
    assert_eq!(report.respawn, None);
    assert_eq!(report.outcome, None);
    assert!(agent.get_episode_status().reset_pending);
    assert!(matches!(agent.get_relative_pose(), Err(EpisodeError::NotReady)));

    sim.place(MARKER, Pose3D::default());
    assert!(episode.tick().respawn.is_some());
    assert!(!agent.get_episode_status().reset_pending);
}

#[test]
fn invalid_config_is_rejected_at_startup() {
    let mut config = EnvConfig::default();
    config.landing_box.height = 25.0;
    let sim: Arc<dyn Simulator> = world(Pose3D::default());
    let result = EpisodeLoop::from_config(config, sim);
    assert!(matches!(result, Err(EpisodeError::Config(_))));
}

#[test]
fn run_stops_after_max_ticks() {
    let mut config = EnvConfig::default();
    config.tick_rate_hz = 500.0;
    let sim = world(at(0.0, 0.0, 5.0));
    let mut episode = episode_with(config.validate().unwrap(), &sim);
    let stop = AtomicBool::new(false);

    let mut seen = 0;
    let ran = episode.run_with(Some(5), &stop, |_| seen += 1);
    assert_eq!(ran, 5);
    assert_eq!(seen, 5);
    assert_eq!(episode.handle().get_episode_status().tick, 5);
}

#[test]
fn concurrent_requests_never_double_publish() {
    let mut config = EnvConfig::default();
    config.tick_rate_hz = 200.0;
    let sim = world(at(0.0, 0.0, 5.0));
    let mut episode = episode_with(config.validate().unwrap(), &sim);
    let agent = episode.handle();
    let stop = AtomicBool::new(false);

    let sender = std::thread::spawn(move || {
        for i in 0..500 {
            let token = ["left", "land", "takeoff", "descend"][i % 4];
            agent.send_command(token);
            let _ = agent.get_episode_status();
        }
    });
    let ticks = episode.run(Some(20), &stop);
    sender.join().unwrap();

    assert_eq!(ticks, 20);
    assert!(sim.published().len() <= 20);
}

#[test]
fn frames_are_served_through_the_handle() {
    let sim = world(at(0.0, 0.0, 5.0));
    let episode = episode_with(default_config(), &sim);
    let agent = episode.handle();

    assert!(matches!(agent.get_frame(), Err(EpisodeError::NoFrame)));
    assert!(matches!(agent.get_frame_matrix(), Err(EpisodeError::NoFrame)));

    let frame = image::DynamicImage::new_rgb8(640, 360);
    agent.ingest_frame(frame).unwrap();
    assert_eq!(agent.get_frame().unwrap().width(), 640);
    assert_eq!(agent.get_frame_matrix().unwrap().len(), 84 * 84);
}
