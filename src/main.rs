use std::rc::Rc;

use anyhow::{ensure, Context, Result};
use glam::Vec3;
use log::{debug, info, warn};

use rusted_locomotion::engine::physics::{ChannelMask, CollisionChannel, CollisionWorld};
use rusted_locomotion::game::characters::{Character, StaminaSettings};
use rusted_locomotion::game::interactive::{InteractiveActor, Ladder, Zipline};
use rusted_locomotion::game::locomotion::{BaseMode, LocomotionConfig};

const DT: f32 = 1.0 / 60.0;

fn main() -> Result<()> {
    // Initialize logger
    env_logger::Builder::from_default_env()
        .filter_level(log::LevelFilter::Info)
        .init();

    info!("Starting locomotion demo...");

    let config = match std::env::args().nth(1) {
        Some(path) => LocomotionConfig::load(&path)
            .with_context(|| format!("Failed to load config {}", path))?,
        None => LocomotionConfig::default().with_default_curves(),
    };

    mantle_scenario(&config).context("Mantle scenario failed")?;
    ladder_scenario(&config).context("Ladder scenario failed")?;
    zipline_scenario(&config).context("Zipline scenario failed")?;
    wall_run_scenario(&config).context("Wall run scenario failed")?;
    slide_scenario(&config).context("Slide scenario failed")?;

    info!("All scenarios finished");
    Ok(())
}

fn spawn(config: &LocomotionConfig, location: Vec3) -> Character {
    Character::new(0, "runner", config.clone(), StaminaSettings::default(), location)
}

/// Floor whose top face is z = 0
fn floor() -> CollisionWorld {
    let mut world = CollisionWorld::new();
    world.add_box(Vec3::new(0.0, 0.0, -50.0), Vec3::new(5000.0, 5000.0, 50.0), ChannelMask::WORLD);
    world
}

/// Tick until `step` reports done, logging events. `step` also feeds the frame's input.
/// Returns the number of frames run.
fn run_until(
    character: &mut Character,
    world: &CollisionWorld,
    max_frames: usize,
    mut step: impl FnMut(&mut Character) -> bool,
) -> usize {
    for frame in 0..max_frames {
        if step(character) {
            return frame;
        }
        character.tick(world, DT);
        for event in character.locomotion.drain_events() {
            debug!("[{}] {:?}", frame, event);
        }
    }
    max_frames
}

fn mantle_scenario(config: &LocomotionConfig) -> Result<()> {
    let mut world = floor();
    world.add_box(
        Vec3::new(300.0, 0.0, 80.0),
        Vec3::new(100.0, 300.0, 80.0),
        ChannelMask::WORLD.with(CollisionChannel::Climbable),
    );
    let mut runner = spawn(config, Vec3::new(0.0, 0.0, 96.0));

    // Walk up to the block, then climb it
    run_until(&mut runner, &world, 60, |c| {
        c.add_movement_input(Vec3::X, 1.0);
        c.body.location().x >= 150.0
    });
    ensure!(runner.mantle(&world), "no ledge detected");

    let frames = run_until(&mut runner, &world, 600, |c| !c.locomotion.is_mantling());
    info!(
        "Mantle finished in {} frames at {:?}",
        frames,
        runner.body.location()
    );
    if runner.locomotion.base_mode() != BaseMode::Grounded {
        warn!("Mantle did not end on the ledge");
    }
    Ok(())
}

fn ladder_scenario(config: &LocomotionConfig) -> Result<()> {
    let mut world = floor();
    world.add_box(
        Vec3::new(200.0, 0.0, 150.0),
        Vec3::new(100.0, 300.0, 150.0),
        ChannelMask::WORLD.with(CollisionChannel::Climbable),
    );
    let ladder = Rc::new(Ladder::new(Vec3::new(100.0, 0.0, 0.0), 180.0, 300.0));
    let mut runner = spawn(config, Vec3::new(20.0, 0.0, 96.0));
    runner.register_interactive(InteractiveActor::Ladder(ladder));

    ensure!(runner.interact_with_ladder(&world), "could not attach to the ladder");
    let frames = run_until(&mut runner, &world, 600, |c| {
        c.climb_ladder_up(1.0);
        !c.locomotion.is_on_ladder()
    });
    info!("Left the ladder after {} frames", frames);

    run_until(&mut runner, &world, 600, |c| !c.locomotion.is_mantling());
    info!("Ladder climb ended at {:?}", runner.body.location());
    Ok(())
}

fn zipline_scenario(config: &LocomotionConfig) -> Result<()> {
    let mut world = floor();
    let zipline = Rc::new(Zipline::build(
        &mut world,
        Vec3::new(0.0, 0.0, 0.0),
        700.0,
        Vec3::new(3000.0, 0.0, 0.0),
        400.0,
    ));
    let length = zipline.cable_length();
    let mut runner = spawn(config, Vec3::new(80.0, 0.0, 96.0));
    runner.register_interactive(InteractiveActor::Zipline(zipline));

    ensure!(runner.interact_with_zipline(), "could not attach to the zipline");
    let start = runner.body.location();
    let frames = run_until(&mut runner, &world, 1200, |c| !c.locomotion.is_on_zipline());
    info!(
        "Rode {:.0} of {:.0} cm in {} frames",
        runner.body.location().distance(start),
        length,
        frames
    );
    ensure!(!runner.locomotion.is_on_zipline(), "never reached the far pole");

    run_until(&mut runner, &world, 600, |c| {
        c.locomotion.base_mode() == BaseMode::Grounded
    });
    Ok(())
}

fn wall_run_scenario(config: &LocomotionConfig) -> Result<()> {
    let mut world = floor();
    world.add_box(
        Vec3::new(0.0, 150.0, 400.0),
        Vec3::new(3000.0, 50.0, 400.0),
        ChannelMask::WORLD.with(CollisionChannel::WallRunnable),
    );
    let mut runner = spawn(config, Vec3::new(0.0, 0.0, 96.0));

    runner.request_sprint(&world);
    runner.request_wall_run();
    let heading = Vec3::new(1.0, 0.5, 0.0).normalize();
    runner.add_movement_input(heading, 1.0);
    runner.tick(&world, DT);
    ensure!(runner.jump(), "could not jump");

    run_until(&mut runner, &world, 120, |c| {
        c.locomotion.is_wall_running() || c.locomotion.base_mode() == BaseMode::Grounded
    });
    if !runner.locomotion.is_wall_running() {
        warn!("Landed before reaching the wall");
        return Ok(());
    }
    let params = runner.locomotion.wall_run_parameters();
    info!("Wall run on the {:?} at {} cm/s", params.side, params.speed);

    let frames = run_until(&mut runner, &world, 600, |c| !c.locomotion.is_wall_running());
    info!("Wall run lasted {} frames", frames);
    Ok(())
}

fn slide_scenario(config: &LocomotionConfig) -> Result<()> {
    let mut world = CollisionWorld::new();
    world.add_box(Vec3::new(0.0, 0.0, -50.0), Vec3::new(1500.0, 1500.0, 50.0), ChannelMask::WORLD);
    world.add_box(Vec3::new(0.0, 0.0, -1050.0), Vec3::new(5000.0, 5000.0, 50.0), ChannelMask::WORLD);
    let mut runner = spawn(config, Vec3::new(0.0, 0.0, 96.0));

    runner.request_sprint(&world);
    runner.add_movement_input(Vec3::X, 1.0);
    runner.tick(&world, DT);
    ensure!(runner.start_slide(), "could not start sliding");
    runner.stop_sprint_request();

    let frames = run_until(&mut runner, &world, 600, |c| !c.locomotion.is_sliding());
    info!(
        "Slide ended after {} frames at {:?} ({:?})",
        frames,
        runner.body.location(),
        runner.locomotion.base_mode()
    );
    Ok(())
}
