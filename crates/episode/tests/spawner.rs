use episode::Spawner;
use settings::EnvConfig;
use spatial::{BoundingBox, Pose3D, Vec3};

#[test]
fn spawned_poses_stay_in_flight_volume() {
    let config = EnvConfig::default().validate().unwrap();
    let marker = Pose3D::from_position(Vec3::new(2.0, -3.0, 0.5));
    let flight = BoundingBox::new(marker, config.flight_box.half_size, config.flight_box.height);
    let landing = BoundingBox::new(marker, config.landing_box.half_size, config.landing_box.height);

    let low = marker.position.z + config.landing_box.height + 1.0;
    let high = marker.position.z + config.flight_box.height - config.landing_box.height;

    let mut spawner = Spawner::new(&config);
    for _ in 0..2000 {
        let pose = spawner.generate(&marker, &flight);
        let p = pose.position;
        assert!(flight.contains(&p), "{p:?} outside flight box");
        assert!(!landing.contains(&p), "{p:?} inside landing box");
        assert!(p.z > low && p.z < high, "altitude {} outside ({low}, {high})", p.z);
    }
}

#[test]
fn spawn_altitude_respects_respawn_ceiling() {
    let config = EnvConfig::default().validate().unwrap();
    let marker = Pose3D::default();
    let flight = BoundingBox::new(marker, 1.5, 20.0);
    let mut spawner = Spawner::with_seed(&config, 3);
    assert_eq!(spawner.altitude_range(), (2.5, 13.5));
    let max_z = (0..2000)
        .map(|_| spawner.generate(&marker, &flight).position.z)
        .fold(f64::MIN, f64::max);
    assert!(max_z < 13.5);
    assert!(max_z > 12.0, "samples should spread over the interval, max was {max_z}");
}

#[test]
fn spawns_cover_the_footprint() {
    let config = EnvConfig::default().validate().unwrap();
    let marker = Pose3D::default();
    let flight = BoundingBox::new(marker, 1.5, 20.0);
    let mut spawner = Spawner::with_seed(&config, 11);
    let poses: Vec<_> = (0..500).map(|_| spawner.generate(&marker, &flight)).collect();
    assert!(poses.iter().any(|p| p.position.x < -1.0));
    assert!(poses.iter().any(|p| p.position.x > 1.0));
    assert!(poses.iter().any(|p| p.position.y < -1.0));
    assert!(poses.iter().any(|p| p.position.y > 1.0));
}
