// Save/load demo
//
// Builds a small forest scene, saves it, wanders off into the cave and
// changes things, then loads the save and waits for the forest to come
// back. Set RUST_LOG=debug to watch the reconciler step through its states.

use std::error::Error;
use std::task::Poll;

use game1_save::config::SaveConfig;
use game1_save::game::{GameWorld, SceneLayout};
use game1_save::geometry::{Vec2, Vec3};
use game1_save::host::SceneHost;
use game1_save::item::{ItemCatalog, ItemStack};
use game1_save::save::{GameSettings, SaveSystem, SaveTrigger};
use tracing::{error, info, warn};
use tracing_subscriber::EnvFilter;

const FRAME_TIME: f32 = 1.0 / 60.0;
/// Give up on a load that has not finished after this many frames
const MAX_LOAD_FRAMES: u32 = 600;

fn main() {
    init_tracing();

    if let Err(err) = run() {
        error!(error = %err, "demo failed");
        std::process::exit(1);
    }
}

fn init_tracing() {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .compact()
        .init();
}

fn run() -> Result<(), Box<dyn Error>> {
    let catalog = ItemCatalog::create_default();
    let config = SaveConfig::load_or_default("save_config.json");
    info!(path = %config.save_path().display(), "using save file");

    let mut world = build_world(&catalog)?;
    let mut saves = SaveSystem::new(&config, &catalog)?;
    saves.set_settings(GameSettings {
        master_volume: 0.6,
        fullscreen: false,
    });

    if let Some(summary) = saves.describe() {
        info!(
            scene = %summary.active_scene_id,
            played = %summary.play_time_label(),
            saved_at = %summary.saved_at,
            "previous save found"
        );
    }

    // Play a little, then save
    for _ in 0..30 {
        world.update(FRAME_TIME);
        saves.tick(&world, f64::from(FRAME_TIME));
    }
    let collection = saves.save(&world, SaveTrigger::Manual)?;
    info!(
        enemies = collection.document.enemies.len(),
        pickups = collection.document.item_pickups.len(),
        "forest saved"
    );

    // Change the world: hurt the first enemy badly and leave for the cave
    if let Some(enemy) = world.enemies.first_mut() {
        enemy.take_damage(1000.0);
    }
    world.begin_scene_load("cave")?;
    while !world.scene_load_complete() {
        world.update(FRAME_TIME);
    }
    info!(scene = %world.active_scene_id(), enemies = world.enemies.len(), "walked into the cave");

    // Load the save and wait for the forest to come back
    saves.begin_load()?;
    let mut frames = 0;
    let report = loop {
        if let Poll::Ready(result) = saves.poll_load(&mut world) {
            break result?;
        }
        frames += 1;
        if frames > MAX_LOAD_FRAMES {
            return Err("load did not finish".into());
        }
        world.update(FRAME_TIME);
    };

    for failure in &report.failures {
        warn!(error = %failure, "entity lost in load");
    }
    let player = world.player.as_ref().ok_or("player missing after load")?;
    info!(
        scene = %world.active_scene_id(),
        frames,
        health = player.health().current(),
        items = player.inventory.iter_items().count(),
        enemies = report.enemies_recreated,
        pickups = report.pickups_recreated,
        play_time = saves.play_time(),
        "forest restored"
    );

    Ok(())
}

fn build_world(catalog: &ItemCatalog) -> Result<GameWorld, Box<dyn Error>> {
    let potion = catalog.find_by_key("health_potion").ok_or("health_potion missing from catalog")?;
    let coin = catalog.find_by_key("gold_coin").ok_or("gold_coin missing from catalog")?;

    let mut world = GameWorld::new("forest");
    world.register_scene(
        "forest",
        SceneLayout::new(3)
            .with_player(Vec2::new(100.0, 100.0))
            .with_enemy(Vec3::new(300.0, 120.0, 0.0)),
    );
    world.register_scene(
        "cave",
        SceneLayout::new(5)
            .with_player(Vec2::new(20.0, 20.0))
            .with_enemy(Vec3::new(200.0, 50.0, 0.0))
            .with_enemy(Vec3::new(240.0, 80.0, 0.0)),
    );

    let player = world.spawn_player(Vec2::new(100.0, 100.0));
    player.equip_weapon();
    player.pick_up(ItemStack::from_definition(potion, 2))?;

    world.spawn_enemy(Vec3::new(400.0, 100.0, 0.0))?;
    world.spawn_enemy(Vec3::new(420.0, 260.0, 0.0))?;
    world.spawn_pickup(Vec3::new(500.0, 300.0, 0.0), ItemStack::from_definition(coin, 5));

    Ok(world)
}
