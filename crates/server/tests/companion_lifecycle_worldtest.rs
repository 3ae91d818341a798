//! Worldtest: Backpack Companion Lifecycle
//!
//! Validates:
//! - First equip spawns exactly one companion, attached and skinned
//! - Unequip applies exactly one invisibility effect and spawns nothing
//! - Re-equip while the hidden companion still rides changes nothing
//! - Once the companion has dropped off, re-equip spawns a fresh one
//! - Unchanged equipment produces no host calls across many ticks
//! - The hide effect really expires in the host after its duration

use minerworks_core::{DimensionId, ItemStack, RegistryKey};
use minerworks_scripting::{AutomationConfig, CompanionConfig};
use minerworks_server::Automation;
use minerworks_testkit::{EventRecord, JsonlSink};
use minerworks_world::{
    EntityHost, EntityId, EquipmentSlot, HostEvent, Location, PropertyStore, SimWorld,
    StatusEffectType,
};

const DIM: DimensionId = DimensionId::Overworld;

fn key(id: &str) -> RegistryKey {
    RegistryKey::parse(id).unwrap()
}

fn wear(world: &mut SimWorld, player: EntityId, item: Option<&str>) {
    world
        .set_equipment(player, EquipmentSlot::Chest, item.map(|id| ItemStack::new(key(id), 1)))
        .expect("player can equip");
}

fn run(automation: &mut Automation<SimWorld>, world: &mut SimWorld, ticks: u64) {
    for _ in 0..ticks {
        automation.tick(world);
        world.tick();
    }
}

fn new_events(world: &SimWorld, since: usize) -> Vec<HostEvent> {
    world.records()[since..].iter().map(|r| r.event.clone()).collect()
}

fn companions(world: &SimWorld) -> Vec<EntityId> {
    world.entities_of_type(&key("miner:backpack_inventory"))
}

#[test]
fn companion_lifecycle_worldtest() {
    let log_path = std::env::temp_dir().join("companion_lifecycle_worldtest.jsonl");
    let mut event_log = JsonlSink::create(&log_path).expect("create event log");

    println!("=== Backpack Companion Lifecycle Worldtest ===\n");

    let mut world = SimWorld::new();
    let player = world.add_player(DIM, Location::new(8.0, 70.0, -3.0));
    let mut automation = Automation::new(AutomationConfig::default());
    run(&mut automation, &mut world, 5);
    assert!(world.records().is_empty());

    println!("Phase 1: First equip...");
    wear(&mut world, player, Some("miner:backpack_aqua"));
    let mark = world.records().len();
    run(&mut automation, &mut world, 1);
    let events = new_events(&world, mark);
    let spawned: Vec<_> = events
        .iter()
        .filter(|e| matches!(e, HostEvent::EntitySpawned { .. }))
        .collect();
    assert_eq!(spawned.len(), 1);
    let companion = companions(&world)[0];
    assert!(events.contains(&HostEvent::SkinSet {
        entity: companion,
        skin: 2
    }));
    assert!(events.contains(&HostEvent::EventTriggered {
        entity: companion,
        event: key("miner:tier_one")
    }));
    assert!(events.contains(&HostEvent::RiderAdded {
        mount: player,
        rider: companion
    }));
    event_log
        .write(&EventRecord {
            tick: world.current_tick(),
            kind: "CompanionSpawned",
            payload: &companion.to_string(),
        })
        .expect("write event");

    println!("Phase 2: Idle ticks...");
    let mark = world.records().len();
    run(&mut automation, &mut world, 50);
    assert!(new_events(&world, mark).is_empty());

    println!("Phase 3: Unequip...");
    wear(&mut world, player, None);
    let mark = world.records().len();
    run(&mut automation, &mut world, 20);
    let events = new_events(&world, mark);
    assert_eq!(
        events,
        vec![HostEvent::EffectAdded {
            entity: companion,
            effect: StatusEffectType::Invisibility,
            duration_ticks: 888_888,
            show_particles: false,
        }]
    );
    assert_eq!(companions(&world), vec![companion]);

    println!("Phase 4: Re-equip with hidden companion aboard...");
    wear(&mut world, player, Some("miner:backpack_purple"));
    let mark = world.records().len();
    run(&mut automation, &mut world, 10);
    assert!(new_events(&world, mark).is_empty());
    assert_eq!(companions(&world), vec![companion]);
    assert_eq!(world.riders(player).unwrap(), vec![companion]);
    assert!(world.has_effect(companion, StatusEffectType::Invisibility));

    println!("Phase 5: Companion dropped, re-equip...");
    world.eject_riders(player).expect("player is rideable");
    wear(&mut world, player, None);
    run(&mut automation, &mut world, 1);
    wear(&mut world, player, Some("miner:backpack_purple"));
    let mark = world.records().len();
    run(&mut automation, &mut world, 1);
    let events = new_events(&world, mark);
    assert_eq!(
        events
            .iter()
            .filter(|e| matches!(e, HostEvent::EntitySpawned { .. }))
            .count(),
        1
    );
    let fresh: Vec<_> = companions(&world)
        .into_iter()
        .filter(|id| *id != companion)
        .collect();
    assert_eq!(fresh.len(), 1);
    assert_eq!(world.riders(player).unwrap(), fresh);
    assert_eq!(world.skin_id(fresh[0]), Some(4));
    assert!(world.has_effect(companion, StatusEffectType::Invisibility));
    event_log
        .write(&EventRecord {
            tick: world.current_tick(),
            kind: "CompanionSpawned",
            payload: &fresh[0].to_string(),
        })
        .expect("write event");

    event_log.write_all(world.records()).expect("write host records");
    event_log.flush().expect("flush event log");
}

#[test]
fn unmatched_skin_leaves_default_and_level_picks_tier() {
    let mut world = SimWorld::new();
    let player = world.add_player(DIM, Location::ZERO);
    world
        .set_property_i64(player, "bdcraft:backpack_level", 2)
        .unwrap();
    let mut automation = Automation::new(AutomationConfig::default());

    wear(&mut world, player, Some("miner:backpack_plaid"));
    run(&mut automation, &mut world, 2);

    let companion = companions(&world)[0];
    assert_eq!(world.skin_id(companion), Some(0));
    assert_eq!(
        world.entity(companion).unwrap().triggered_events,
        vec![key("miner:tier_two")]
    );
}

#[test]
fn hide_effect_expires_in_host() {
    let config = AutomationConfig {
        companion: CompanionConfig {
            hide_duration_ticks: 30,
            ..CompanionConfig::default()
        },
        ..AutomationConfig::default()
    };
    let mut world = SimWorld::new();
    let player = world.add_player(DIM, Location::ZERO);
    let mut automation = Automation::new(config);

    wear(&mut world, player, Some("miner:backpack_red"));
    run(&mut automation, &mut world, 2);
    let companion = companions(&world)[0];
    wear(&mut world, player, None);
    run(&mut automation, &mut world, 1);
    assert!(world.has_effect(companion, StatusEffectType::Invisibility));

    run(&mut automation, &mut world, 40);
    assert!(!world.has_effect(companion, StatusEffectType::Invisibility));
    // An expired hide does not respawn or re-hide anything.
    assert_eq!(companions(&world), vec![companion]);
}

#[test]
fn disconnected_players_are_forgotten() {
    let mut world = SimWorld::new();
    let player = world.add_player(DIM, Location::ZERO);
    let mut automation = Automation::new(AutomationConfig::default());
    wear(&mut world, player, Some("miner:backpack_red"));
    world.despawn(player);
    let late = world.add_player(DIM, Location::ZERO);

    run(&mut automation, &mut world, 3);
    assert!(companions(&world).is_empty());
    assert_eq!(automation.companion_report().players, 1);
    assert!(world.is_valid(late));
}
