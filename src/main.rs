//! Scene location demo
//!
//! Walks a simulated viewer 150 m north through a mock scene while a scripted
//! GPS feed reports its position, and prints every engine event.
//!
//! Usage: `scene-location [--json] [--config <path> | <path>]`

use scene_location::api::formatting::{JsonFormatter, TextFormatter};
use scene_location::core::{GeoFix, GeoPoint, Translation};
use scene_location::hardware::{HeadingReading, LocationUpdate, MockScene};
use scene_location::utils::{ConfigurationManager, PoiConfig};
use scene_location::{MarkerNode, SceneLocationEngine, Session};
use nalgebra::Vector3;
use std::env;
use std::error::Error;
use std::thread;

const WALK_STEPS: u32 = 30;
const STEP_M: f64 = 5.0;

fn parse_config_path(args: &[String]) -> Option<String> {
    for i in 1..args.len() {
        if (args[i] == "--config" || args[i] == "-c") && i + 1 < args.len() {
            return Some(args[i + 1].clone());
        }
    }

    args.iter().skip(1).find(|arg| !arg.starts_with('-')).cloned()
}

fn demo_points_of_interest(manager: &mut ConfigurationManager) -> Result<(), Box<dyn Error>> {
    let points = [
        ("Gate", 51.50135, -0.14189, 20.0),
        ("Tower", 51.50072, -0.12462, 96.0),
    ];
    for (title, latitude, longitude, altitude) in points {
        manager.add_point_of_interest(PoiConfig {
            title: title.to_string(),
            latitude,
            longitude,
            altitude,
        })?;
    }
    Ok(())
}

fn main() -> Result<(), Box<dyn Error>> {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    let args: Vec<String> = env::args().collect();
    let json = args.iter().any(|arg| arg == "--json");

    let manager = match parse_config_path(&args) {
        Some(path) => {
            log::info!("Using config: {}", path);
            ConfigurationManager::from_file(&path)?
        }
        None => {
            let mut manager = ConfigurationManager::new();
            demo_points_of_interest(&mut manager)?;
            manager
        }
    };
    let config = manager.config().clone();
    let tick_interval = config.tick_interval();

    let start = GeoFix::new(GeoPoint::new(51.49930, -0.12731, 20.0), 8.0, 0);
    let engine = SceneLocationEngine::new(config, MockScene::tracking_at(Vector3::zeros()))?;
    let mut session = Session::new(engine);

    let text = TextFormatter::new();
    let json_formatter = JsonFormatter::new();
    session.register_callback(Box::new(move |event| {
        if json {
            match json_formatter.format_event(event) {
                Ok(line) => println!("{}", line),
                Err(e) => log::warn!("Failed to format event: {}", e),
            }
        } else {
            println!("{}", text.format_event(event));
        }
    }));

    let sender = session.location_sender();
    sender.send(LocationUpdate::Location(start))?;
    sender.send(LocationUpdate::Heading(HeadingReading::new(2.0, 0.5, 5.0)))?;
    session.start()?;
    thread::sleep(tick_interval * 2);

    let engine = session.engine();
    {
        let mut engine = engine.lock();
        let placed = engine.place_points_of_interest();
        log::info!("Placed {} points of interest", placed.len());
        match engine.place_at_current_position(MarkerNode::new("start")) {
            Ok(id) => log::info!("Dropped marker {} at the start of the walk", id),
            Err(e) => log::warn!("Could not drop start marker: {}", e),
        }
    }

    for step in 1..=WALK_STEPS {
        let walked = STEP_M * f64::from(step);
        engine
            .lock()
            .scene_mut()
            .move_viewer_by(Vector3::new(0.0, 0.0, -STEP_M));

        // GPS accuracy improves as the receiver settles
        let fix = GeoFix {
            horizontal_accuracy: (8.0 - f64::from(step) * 0.2).max(3.0),
            timestamp_ms: u64::from(step) * 1_000,
            ..start.translated(&Translation::new(walked, 0.0, 0.0))
        };
        sender.send(LocationUpdate::Location(fix))?;
        thread::sleep(tick_interval);
    }

    thread::sleep(tick_interval * 2);
    session.stop();

    let engine = engine.lock();
    for (id, node) in engine.registry().iter() {
        log::info!(
            "{} '{}': confirmed={} position=({:.1}, {:.1}, {:.1}) scale={:.3}",
            id,
            node.tag,
            node.confirmed,
            node.position.x,
            node.position.y,
            node.position.z,
            node.scale
        );
    }
    let stats = engine.validation_statistics();
    log::info!(
        "Accepted {} fixes, rejected {}; {} estimates held",
        stats.accepted_fixes,
        stats.rejected_fixes,
        engine.estimates().len()
    );

    Ok(())
}
