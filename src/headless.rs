use crate::config::SimConfig;
use crate::scripted_input::ScriptedInputPlayer;
use anyhow::{Context, Result};
use glam::Vec3;
use serde::Serialize;
use std::path::PathBuf;
use tracing::{debug, info, warn};
use voxelwalk_camera::{Camera, CameraView};
use voxelwalk_core::SimTick;
use voxelwalk_input::InputState;
use voxelwalk_testkit::{EventRecord, JsonlSink};
use voxelwalk_world::{CullStats, PlayerController, PlayerSnapshot, RenderSet, World};

pub struct HeadlessConfig {
    pub sim: SimConfig,
    pub ticks: Option<u64>,
    pub scripted_input: Option<PathBuf>,
    pub trace: Option<PathBuf>,
    pub exit_when_script_finished: bool,
}

/// One traced tick.
#[derive(Debug, Serialize)]
struct TickTrace {
    player: PlayerSnapshot,
    rendered: usize,
    added: usize,
    removed: usize,
    chunks: usize,
}

/// Totals reported when the run ends.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct RunSummary {
    pub ticks: u64,
    pub final_position: Vec3,
    pub rendered: usize,
    pub chunks: usize,
}

pub fn run(cfg: HeadlessConfig) -> Result<RunSummary> {
    let sim = cfg.sim;
    let max_ticks = cfg.ticks.unwrap_or(sim.run.ticks);

    let mut world = World::new(sim.world.clone()).context("invalid world config")?;
    let mut player = spawn_player(&sim, &mut world);

    let mut camera = Camera {
        fov: sim.run.fov_degrees.to_radians(),
        aspect: sim.run.aspect,
        ..Camera::default()
    };
    player.sync_camera(&mut camera);

    let mut script = cfg
        .scripted_input
        .as_deref()
        .map(|path| {
            ScriptedInputPlayer::from_path(path)
                .with_context(|| format!("loading scripted input {}", path.display()))
        })
        .transpose()?;

    let mut trace = cfg
        .trace
        .as_deref()
        .map(JsonlSink::create)
        .transpose()
        .context("creating trace file")?;

    let mut rendered = RenderSet::new();
    let mut tick = SimTick::ZERO;
    info!(
        seed = sim.world.seed,
        ticks = max_ticks,
        spawn = ?player.position(),
        "Starting headless run"
    );

    while tick.0 < max_ticks {
        let input = script
            .as_mut()
            .map(ScriptedInputPlayer::advance)
            .unwrap_or_default();
        let stats = step(&mut world, &mut player, &mut camera, &mut rendered, &input);
        tick = tick.advance(1);

        if let Some(sink) = trace.as_mut() {
            sink.write(&EventRecord {
                tick,
                kind: "tick",
                payload: TickTrace {
                    player: player.snapshot(),
                    rendered: rendered.len(),
                    added: stats.added,
                    removed: stats.removed,
                    chunks: world.generated_chunks(),
                },
            })?;
        }

        if cfg.exit_when_script_finished
            && script.as_ref().is_some_and(ScriptedInputPlayer::finished)
        {
            debug!(%tick, "scripted input finished");
            break;
        }
    }

    if let Some(sink) = trace.as_mut() {
        sink.flush()?;
    }

    let summary = RunSummary {
        ticks: tick.0,
        final_position: player.position(),
        rendered: rendered.len(),
        chunks: world.generated_chunks(),
    };
    info!(
        ticks = summary.ticks,
        position = ?summary.final_position,
        rendered = summary.rendered,
        chunks = summary.chunks,
        "Headless run finished"
    );
    Ok(summary)
}

/// One simulation tick: look, move, follow with the camera, then cull.
fn step(
    world: &mut World,
    player: &mut PlayerController,
    camera: &mut Camera,
    rendered: &mut RenderSet,
    input: &InputState,
) -> CullStats {
    player.look(input.look_delta.0, input.look_delta.1);
    player.sync_camera(camera);
    player.tick(input, &*camera, world);
    player.sync_camera(camera);
    let frustum = camera.frustum();
    world.update_rendered_blocks(player.position(), &frustum, rendered)
}

fn spawn_player(sim: &SimConfig, world: &mut World) -> PlayerController {
    let [x, z] = sim.player.spawn;
    if let Some(height) = sim.player.spawn_height {
        return PlayerController::new(sim.player.clone(), Vec3::new(x, height, z));
    }
    match world.surface_height_at(x, z) {
        Some(surface) => PlayerController::standing_on(sim.player.clone(), x, surface, z),
        None => {
            warn!(x, z, "No solid ground at spawn; dropping from the top of the world");
            let top = world.config().world_depth as f32 + sim.player.half_extents[1];
            PlayerController::new(sim.player.clone(), Vec3::new(x, top, z))
        }
    }
}
