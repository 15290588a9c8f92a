use std::fs;
use std::task::Poll;

use game1_save::config::SaveConfig;
use game1_save::game::{GameWorld, SceneLayout};
use game1_save::geometry::{Vec2, Vec3};
use game1_save::host::SceneHost;
use game1_save::item::{ItemCatalog, ItemStack};
use game1_save::save::{ApplyReport, ErrorKind, SaveSystem, SaveTrigger, SessionError};

fn config_in(dir: &tempfile::TempDir) -> SaveConfig {
    SaveConfig {
        save_directory: dir.path().join("saves"),
        autosave_interval_secs: 10,
        ..SaveConfig::default()
    }
}

/// Player at 40/100 holding three gold coins, two enemies (one dead), one
/// picked-up pickup and one still lying around
fn scenario_world(catalog: &ItemCatalog) -> GameWorld {
    let coin = catalog.get(5).unwrap();
    let potion = catalog.get(2).unwrap();

    let mut world = GameWorld::new("forest");
    let player = world.spawn_player(Vec2::new(0.0, 0.0));
    player.take_damage(60.0);
    player.pick_up(ItemStack::from_definition(coin, 3)).unwrap();

    world.spawn_enemy(Vec3::new(400.0, 0.0, 0.0)).unwrap();
    let dead = world.spawn_enemy(Vec3::new(600.0, 0.0, 0.0)).unwrap();
    world.enemy_mut(dead).unwrap().take_damage(1000.0);

    let taken = world.spawn_pickup(Vec3::new(800.0, 800.0, 0.0), ItemStack::from_definition(potion, 1));
    let taken = world.pickup_mut(taken).unwrap();
    taken.tunables.destroy_on_pickup = false;
    taken.collect().unwrap();
    world.spawn_pickup(Vec3::new(900.0, 900.0, 0.0), ItemStack::from_definition(coin, 2));

    world
}

fn finish_load(saves: &mut SaveSystem<'_>, world: &mut GameWorld) -> Result<ApplyReport, SessionError> {
    for _ in 0..100 {
        if let Poll::Ready(result) = saves.poll_load(world) {
            return result;
        }
        world.update(0.016);
    }
    panic!("load never finished");
}

#[test]
fn test_save_then_load_restores_scenario() {
    let dir = tempfile::tempdir().unwrap();
    let catalog = ItemCatalog::create_default();
    let mut world = scenario_world(&catalog);
    let mut saves = SaveSystem::new(&config_in(&dir), &catalog).unwrap();

    let collection = saves.save(&world, SaveTrigger::Manual).unwrap();
    assert_eq!(collection.warning_count(), 0);
    assert_eq!(collection.document.enemies.len(), 2);
    assert_eq!(collection.document.item_pickups.len(), 2);

    // Make a mess of the live world
    let player = world.player.as_mut().unwrap();
    player.inventory.clear();
    player.position = Vec2::new(77.0, 77.0);
    for id in world.enemy_ids() {
        world.destroy(id);
    }
    world.spawn_enemy(Vec3::new(1.0, 1.0, 0.0)).unwrap();

    saves.begin_load().unwrap();
    let report = finish_load(&mut saves, &mut world).unwrap();

    let player = world.player.as_ref().unwrap();
    assert_eq!(player.health().current(), 40.0);
    assert_eq!(player.health().max(), 100.0);
    let items: Vec<_> = player.inventory.iter_items().collect();
    assert_eq!(items.len(), 1);
    assert_eq!(items[0].catalog_id, Some(5));
    assert_eq!(items[0].quantity, 3);

    assert_eq!(world.enemies.len(), 2);
    assert_eq!(report.enemies_recreated, 2);
    let dead: Vec<_> = world.enemies.iter().filter(|e| !e.is_alive()).collect();
    assert_eq!(dead.len(), 1);
    assert_eq!(dead[0].death_effects_fired(), 0);

    assert_eq!(world.pickups.len(), 1);
    assert_eq!(report.pickups_skipped, 1);
    assert_eq!(world.pickups[0].item().map(|i| i.quantity), Some(2));
    assert!(report.failures.is_empty());
}

#[test]
fn test_non_finite_enemy_skipped_and_save_still_loads() {
    let dir = tempfile::tempdir().unwrap();
    let catalog = ItemCatalog::create_default();
    let mut world = GameWorld::new("forest");
    world.spawn_player(Vec2::new(0.0, 0.0));
    world.spawn_enemy(Vec3::new(400.0, 0.0, 0.0)).unwrap();
    let far_sighted = world.spawn_enemy(Vec3::new(600.0, 0.0, 0.0)).unwrap();
    world.enemy_mut(far_sighted).unwrap().tunables.detection_range = f32::INFINITY;
    let mut saves = SaveSystem::new(&config_in(&dir), &catalog).unwrap();

    let collection = saves.save(&world, SaveTrigger::Manual).unwrap();
    assert_eq!(collection.warning_count(), 1);
    assert_eq!(collection.failures[0].kind(), ErrorKind::ParticipantExportFailure);

    saves.begin_load().unwrap();
    let report = finish_load(&mut saves, &mut world).unwrap();
    assert_eq!(report.enemies_recreated, 1);
    assert_eq!(world.enemies.len(), 1);
    assert!(world.enemies[0].tunables.detection_range.is_finite());
}

#[test]
fn test_load_from_other_scene_waits_for_scene() {
    let dir = tempfile::tempdir().unwrap();
    let catalog = ItemCatalog::create_default();
    let mut world = scenario_world(&catalog);
    world.register_scene("forest", SceneLayout::new(4).with_player(Vec2::new(10.0, 10.0)));
    world.register_scene("cave", SceneLayout::new(1).with_player(Vec2::new(3.0, 3.0)));
    let mut saves = SaveSystem::new(&config_in(&dir), &catalog).unwrap();
    saves.save(&world, SaveTrigger::SceneExit).unwrap();

    world.begin_scene_load("cave").unwrap();
    while !world.scene_load_complete() {
        world.update(0.016);
    }
    assert_eq!(world.active_scene_id(), "cave");

    saves.begin_load().unwrap();
    assert!(saves.poll_load(&mut world).is_pending());
    assert!(saves.is_loading());

    let report = finish_load(&mut saves, &mut world).unwrap();
    assert!(report.scene_changed);
    assert_eq!(world.active_scene_id(), "forest");
    assert_eq!(world.player.as_ref().unwrap().health().current(), 40.0);
    assert_eq!(world.enemies.len(), 2);
    assert!(!saves.is_loading());
}

#[test]
fn test_play_time_and_settings_come_back() {
    let dir = tempfile::tempdir().unwrap();
    let catalog = ItemCatalog::create_default();
    let mut world = scenario_world(&catalog);
    let mut saves = SaveSystem::new(&config_in(&dir), &catalog).unwrap();

    saves.advance_play_time(3725.0);
    let mut settings = saves.settings();
    settings.fullscreen = true;
    saves.set_settings(settings);
    saves.save(&world, SaveTrigger::PauseMenu).unwrap();

    let summary = saves.describe().unwrap();
    assert_eq!(summary.play_time_label(), "1:02:05");
    assert_eq!(summary.trigger, SaveTrigger::PauseMenu);
    assert_eq!(summary.active_scene_id, "forest");

    let mut fresh = SaveSystem::new(&config_in(&dir), &catalog).unwrap();
    assert!(fresh.can_load());
    fresh.begin_load().unwrap();
    finish_load(&mut fresh, &mut world).unwrap();

    assert_eq!(fresh.play_time(), 3725.0);
    assert!(fresh.settings().fullscreen);
    assert!(world.settings().fullscreen);
}

#[test]
fn test_autosave_after_interval() {
    let dir = tempfile::tempdir().unwrap();
    let catalog = ItemCatalog::create_default();
    let world = scenario_world(&catalog);
    let mut saves = SaveSystem::new(&config_in(&dir), &catalog).unwrap();

    assert!(saves.tick(&world, 9.0).is_none());
    assert!(!saves.can_load());

    let autosave = saves.tick(&world, 1.5).unwrap().unwrap();
    assert_eq!(autosave.document.trigger, SaveTrigger::Autosave);
    assert!(saves.can_load());
    assert!(!saves.should_autosave());
}

#[test]
fn test_autosave_disabled() {
    let dir = tempfile::tempdir().unwrap();
    let catalog = ItemCatalog::create_default();
    let world = scenario_world(&catalog);
    let config = SaveConfig {
        autosave_enabled: false,
        ..config_in(&dir)
    };
    let mut saves = SaveSystem::new(&config, &catalog).unwrap();

    assert!(saves.tick(&world, 10_000.0).is_none());
    assert!(!saves.can_load());
}

#[test]
fn test_missing_and_corrupt_files_are_distinct() {
    let dir = tempfile::tempdir().unwrap();
    let catalog = ItemCatalog::create_default();
    let config = config_in(&dir);
    let mut saves = SaveSystem::new(&config, &catalog).unwrap();

    let missing = saves.begin_load().unwrap_err();
    let SessionError::Load(missing) = missing else {
        panic!("expected a load error");
    };
    assert_eq!(missing.kind(), ErrorKind::NotFound);

    fs::write(config.save_path(), "{ not json").unwrap();
    assert!(saves.describe().is_none());
    let corrupt = saves.begin_load().unwrap_err();
    let SessionError::Load(corrupt) = corrupt else {
        panic!("expected a load error");
    };
    assert_eq!(corrupt.kind(), ErrorKind::CorruptContent);
    assert!(!saves.is_loading());
}

#[test]
fn test_load_without_player_changes_nothing() {
    let dir = tempfile::tempdir().unwrap();
    let catalog = ItemCatalog::create_default();
    let mut world = scenario_world(&catalog);
    let mut saves = SaveSystem::new(&config_in(&dir), &catalog).unwrap();
    saves.save(&world, SaveTrigger::Manual).unwrap();

    world.player = None;
    let before = world.enemy_ids();

    saves.begin_load().unwrap();
    let err = finish_load(&mut saves, &mut world).unwrap_err();
    let SessionError::Reconcile(err) = err else {
        panic!("expected a reconcile error");
    };
    assert_eq!(err.kind(), Some(ErrorKind::MissingPlayerFailure));
    assert_eq!(world.enemy_ids(), before);

    // Retry once a player exists
    world.spawn_player(Vec2::default());
    saves.begin_load().unwrap();
    finish_load(&mut saves, &mut world).unwrap();
    assert_eq!(world.player.as_ref().unwrap().health().current(), 40.0);
}

#[test]
fn test_delete_save() {
    let dir = tempfile::tempdir().unwrap();
    let catalog = ItemCatalog::create_default();
    let world = scenario_world(&catalog);
    let mut saves = SaveSystem::new(&config_in(&dir), &catalog).unwrap();

    saves.save(&world, SaveTrigger::Manual).unwrap();
    saves.delete().unwrap();
    assert!(!saves.can_load());
    assert_eq!(saves.delete().unwrap_err().kind(), ErrorKind::NotFound);
}
