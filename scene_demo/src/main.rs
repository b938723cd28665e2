//! Headless scene demo
//!
//! Builds a small scene with a background layer, an orbiting sprite cluster,
//! a minimap camera on its own camera group and a fullscreen post-effect, then
//! runs a few frames against the recording graphics layer and logs what each
//! frame submitted.
//!
//! Usage: `scene_demo [config.toml|config.ron] [frames]`

use scene_engine::prelude::*;
use scene_engine::render::GraphicsCall;

const MINIMAP_GROUP: u64 = 0b10;

struct SceneIds {
    orbit: NodeId,
    ship: NodeId,
    blink: NodeId,
}

fn load_config(path: Option<&str>) -> Result<EngineConfig, Box<dyn std::error::Error>> {
    Ok(match path {
        Some(path) => EngineConfig::load_from_file(path)?,
        None => EngineConfig::default(),
    })
}

fn build_scene(engine: &mut Engine) -> Result<SceneIds, SceneError> {
    let background = engine.add_node(
        Node::sprite(Some(TextureId(1)), Vec2::new(800.0, 600.0))
            .with_z_order(-100)
            .with_camera_group(0b1 | MINIMAP_GROUP),
    )?;
    engine.transform_2d_mut(background)?.set_center(Vec2::new(400.0, 300.0));

    let orbit = engine.add_node(Node::transform_2d(Transform2D::new().with_position(Vec2::new(400.0, 300.0))))?;
    let ship = engine.insert(
        Node::polygon(vec![Vec2::new(0.0, -12.0), Vec2::new(8.0, 10.0), Vec2::new(-8.0, 10.0)])
            .with_z_order(10)
            .with_camera_group(0b1 | MINIMAP_GROUP),
    );
    engine.add_child(orbit, ship)?;
    engine.transform_2d_mut(ship)?.set_position(Vec2::new(120.0, 0.0));

    let blink = engine.insert(Node::text("PRESS START").with_z_order(50));
    engine.add_child(orbit, blink)?;

    let minimap = engine.add_node(Node::camera_2d(
        Camera::new_2d().with_clear_color(Color::new(0, 0, 0, 255)),
    ))?;
    engine.set_camera_group_mask(minimap, MINIMAP_GROUP)?;
    engine.transform_2d_mut(minimap)?.set_scale(Vec2::new(4.0, 4.0));

    engine.add_node(
        Node::post_effect(Dimension::TwoD, FullscreenPostEffect::new(MaterialId(7))).with_z_order(100),
    )?;

    Ok(SceneIds { orbit, ship, blink })
}

fn run() -> Result<(), Box<dyn std::error::Error>> {
    let mut args = std::env::args().skip(1);
    let config = load_config(args.next().as_deref())?;
    let frames: u64 = args.next().map_or(Ok(4), |n| n.parse())?;

    logging::init(&config.logging);
    log::info!("Starting scene demo for {frames} frame(s)");

    let mut engine = Engine::new(config)?;
    let mut graphics = HeadlessGraphics::new(TextureSize::new(800, 600));
    let mut culling = PassThroughCulling::new();

    let ids = build_scene(&mut engine)?;

    for frame in 0..frames {
        engine.transform_2d_mut(ids.orbit)?.set_angle(frame as f32 * 15.0);
        engine.set_is_drawn(ids.blink, frame % 2 == 0)?;

        let stats = engine.try_update(&mut graphics, &mut culling)?;
        let calls = graphics.take_calls();
        let scratch = calls
            .iter()
            .filter(|call| matches!(call, GraphicsCall::AcquireScratch(_)))
            .count();

        log::info!(
            "frame {frame}: {} pass(es), {} submitted, {} hidden, {} flush(es), {} post-effect(s), {scratch} scratch acquire(s)",
            stats.passes,
            stats.submitted,
            stats.hidden,
            stats.flushes,
            stats.post_effects,
        );
        if let Some(node) = engine.node(ids.ship) {
            let absolute = node.absolute_transform();
            log::debug!("ship at ({:.1}, {:.1})", absolute[(0, 3)], absolute[(1, 3)]);
        }
    }

    engine.terminate(&mut graphics)?;
    log::info!("Scene demo finished");
    Ok(())
}

fn main() {
    if let Err(e) = run() {
        eprintln!("scene_demo: {e}");
        std::process::exit(1);
    }
}
