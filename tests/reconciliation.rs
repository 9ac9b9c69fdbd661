//! End-to-end reconciliation scenarios driven through the mock scene

use approx::assert_abs_diff_eq;
use nalgebra::Vector3;
use scene_location::api::EngineEvent;
use scene_location::core::{GeoFix, GeoPoint, Translation};
use scene_location::hardware::{MockScene, TrackingState};
use scene_location::{
    ApiError, ConfigError, EngineConfig, EstimateMethod, MarkerNode, SceneLocationEngine, Session,
};
use std::time::Duration;

fn l0() -> GeoFix {
    GeoFix::new(GeoPoint::new(40.7484, -73.9857, 10.0), 6.0, 1_000)
}

fn running_engine(config: EngineConfig) -> SceneLocationEngine<MockScene> {
    let mut engine =
        SceneLocationEngine::new(config, MockScene::tracking_at(Vector3::zeros())).unwrap();
    engine.start().unwrap();
    engine.on_location_update(l0());
    engine.on_frame_rendered();
    engine.take_events();
    engine
}

/// Walk the viewer in `steps` increments, reporting a matching fix each time
fn walk(engine: &mut SceneLocationEngine<MockScene>, offset: Vector3<f64>, steps: u32, accuracy: f64) {
    let start = engine.current_position().unwrap();
    let origin = engine.estimates()[0].fix;
    let origin_position = engine.estimates()[0].position;

    for step in 1..=steps {
        let position = start + offset * (f64::from(step) / f64::from(steps));
        engine.scene_mut().set_viewer_position(Some(position));

        let translation = Translation::new(
            origin_position.z - position.z,
            position.x - origin_position.x,
            0.0,
        );
        let fix = GeoFix {
            horizontal_accuracy: accuracy,
            timestamp_ms: origin.timestamp_ms + u64::from(step) * 1_000,
            ..origin.translated(&translation)
        };
        engine.on_location_update(fix);
        engine.tick();
    }
}

#[test]
fn distant_unconfirmed_node_is_frozen_relative_to_l0() {
    let mut engine = running_engine(EngineConfig::default());

    // Dropped at the viewer, then the viewer walks 150 m west
    let id = engine
        .place_at_current_position(MarkerNode::new("landmark"))
        .unwrap();
    assert!(!engine.node(id).unwrap().confirmed);

    walk(&mut engine, Vector3::new(-150.0, 0.0, 0.0), 30, 6.0);

    let node = engine.node(id).unwrap();
    assert!(node.confirmed);
    let frozen = node.location.unwrap();
    let drift = l0().translation_to(&frozen);
    assert!(drift.horizontal_magnitude() < 0.5, "drifted {:?}", drift);
}

#[test]
fn confirmation_is_monotonic_under_better_fixes() {
    let mut engine = running_engine(EngineConfig::default());
    let id = engine
        .place_at_current_position(MarkerNode::new("landmark"))
        .unwrap();

    walk(&mut engine, Vector3::new(0.0, 0.0, -120.0), 12, 6.0);
    let frozen = engine.node(id).unwrap().location;
    assert!(engine.node(id).unwrap().confirmed);

    // Much tighter fixes afterwards never touch the frozen location
    walk(&mut engine, Vector3::new(40.0, 0.0, 0.0), 8, 1.0);
    assert_eq!(engine.node(id).unwrap().location, frozen);
}

#[test]
fn confirmed_node_500m_away_is_clamped_to_100m() {
    let mut engine = running_engine(EngineConfig::default());
    let target = l0().translated(&Translation::new(-300.0, 400.0, 0.0));

    let id = engine
        .place_at_confirmed_location(MarkerNode::at_location(target))
        .unwrap();
    engine.tick();

    let transform = *engine.scene().transform(id).unwrap();
    let node = engine.node(id).unwrap();
    assert_abs_diff_eq!(node.scale, 0.2, epsilon = 1e-3);
    assert_abs_diff_eq!(transform.position.norm(), 100.0, epsilon = 0.1);
    // South-east of the viewer: +x, +z
    assert!(transform.position.x > 0.0 && transform.position.z > 0.0);
    assert_abs_diff_eq!(transform.child_scale, 100.0 * 0.181, epsilon = 0.05);
    assert_abs_diff_eq!(transform.pivot.y, -1.1 * transform.child_scale, epsilon = 1e-9);
}

#[test]
fn viewer_walking_toward_clamped_node_unclamps_it() {
    let mut engine = running_engine(EngineConfig::default());
    let target = l0().translated(&Translation::new(180.0, 0.0, 0.0));
    let id = engine
        .place_at_confirmed_location(MarkerNode::at_location(target))
        .unwrap();
    assert!(engine.node(id).unwrap().scale < 1.0);

    walk(&mut engine, Vector3::new(0.0, 0.0, -120.0), 12, 6.0);

    let node = engine.node(id).unwrap();
    assert_eq!(node.scale, 1.0);
    // Node sits about 60 m ahead of the viewer
    let viewer = engine.current_position().unwrap();
    assert_abs_diff_eq!(viewer.z - node.position.z, 60.0, epsilon = 0.5);
}

#[test]
fn empty_store_makes_placement_a_noop() {
    let mut engine =
        SceneLocationEngine::new(EngineConfig::default(), MockScene::tracking_at(Vector3::zeros()))
            .unwrap();
    engine.start().unwrap();

    assert!(engine.current_location().is_none());
    assert_eq!(
        engine.place_at_current_position(MarkerNode::new("x")),
        Err(ApiError::LocationUnavailable)
    );

    // Confirmed placement is accepted but cannot position the node yet
    let id = engine
        .place_at_confirmed_location(MarkerNode::at_location(l0()))
        .unwrap();
    engine.tick();
    assert!(engine.scene().transactions().is_empty());
    assert_eq!(engine.node(id).unwrap().position, Vector3::zeros());
}

#[test]
fn gps_only_mode_tracks_raw_fix() {
    let config = EngineConfig::default().with_estimate_method(EstimateMethod::GpsOnly);
    let mut engine = running_engine(config);

    let id = engine
        .place_at_current_position(MarkerNode::new("raw"))
        .unwrap();
    assert!(engine.node(id).unwrap().confirmed);

    let newer = GeoFix {
        timestamp_ms: 9_000,
        ..l0().translated(&Translation::new(25.0, 0.0, 0.0))
    };
    engine.on_location_update(newer);

    assert_eq!(engine.current_location(), Some(newer));
    // Still collected; the newer fix at the same spot replaces L0
    assert_eq!(engine.estimates().len(), 1);
    assert_eq!(engine.estimates()[0].fix, newer);
}

#[test]
fn estimates_left_behind_are_evicted() {
    let mut engine = running_engine(EngineConfig::default());

    engine.scene_mut().set_viewer_position(Some(Vector3::new(0.0, 0.0, -100.0)));
    assert!(!engine
        .tick()
        .iter()
        .any(|e| matches!(e, EngineEvent::EstimateRemoved { .. })));

    engine.scene_mut().set_viewer_position(Some(Vector3::new(0.0, 0.0, -100.5)));
    let removed = engine
        .tick()
        .iter()
        .filter(|e| matches!(e, EngineEvent::EstimateRemoved { .. }))
        .count();

    // The first rendered frame's estimate superseded the one from the fix
    assert_eq!(removed, 1);
    assert!(engine.best_estimate().is_none());
}

#[test]
fn session_runs_until_stopped() {
    let config = EngineConfig {
        tick_interval_ms: 5,
        ..EngineConfig::default()
    };
    let engine =
        SceneLocationEngine::new(config, MockScene::tracking_at(Vector3::zeros())).unwrap();
    let mut session = Session::new(engine);
    let (tx, rx) = crossbeam_channel::unbounded();
    session.register_callback(Box::new(move |event| {
        let _ = tx.send(event.clone());
    }));

    session.start().unwrap();
    assert!(session.is_running());
    let first = rx.recv_timeout(Duration::from_secs(2)).unwrap();
    assert_eq!(first, EngineEvent::RootEstablished);

    session.stop();
    assert!(!session.is_running());
    assert!(!session.engine().lock().scene().is_running());
}

#[test]
fn stationary_viewer_holds_a_single_estimate() {
    let mut engine = running_engine(EngineConfig::default());

    for step in 1..=5_000u64 {
        engine.on_location_update(GeoFix {
            timestamp_ms: 1_000 + step,
            ..l0()
        });
        engine.tick();
    }

    assert_eq!(engine.estimates().len(), 1);
    assert_eq!(engine.best_estimate().unwrap().fix.timestamp_ms, 6_000);
}

#[test]
fn invalid_scene_limit_is_rejected() {
    let config = EngineConfig {
        scene_limit_m: -5.0,
        ..EngineConfig::default()
    };

    assert!(matches!(
        SceneLocationEngine::new(config, MockScene::tracking_at(Vector3::zeros())),
        Err(ConfigError::InvalidParameter { .. })
    ));
}

#[test]
fn session_polls_tracking_state_every_tick() {
    let config = EngineConfig {
        tick_interval_ms: 5,
        ..EngineConfig::default()
    };
    let mut scene = MockScene::tracking_at(Vector3::zeros());
    scene.set_tracking_state(TrackingState::Relocalizing);
    let engine = SceneLocationEngine::new(config, scene).unwrap();
    let mut session = Session::new(engine);

    session.start().unwrap();
    let engine = session.engine();
    for _ in 0..400 {
        if engine.lock().tracking_state().is_some() {
            break;
        }
        std::thread::sleep(Duration::from_millis(5));
    }
    assert_eq!(engine.lock().tracking_state(), Some(TrackingState::Relocalizing));

    engine.lock().scene_mut().set_tracking_state(TrackingState::Normal);
    for _ in 0..400 {
        if engine.lock().tracking_state() == Some(TrackingState::Normal) {
            break;
        }
        std::thread::sleep(Duration::from_millis(5));
    }
    session.stop();

    assert_eq!(engine.lock().tracking_state(), Some(TrackingState::Normal));
}
