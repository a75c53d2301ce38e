//! Combat resolver integration tests
//!
//! Exercise `resolve` end to end with catalog abilities and seeded RNGs.

use rand::SeedableRng;
use rand_chacha::ChaCha8Rng;

use hex_skirmish::ability::{AbilityCatalog, AbilityKey, DamageType};
use hex_skirmish::combat::{commit_cost, commit_damage, resolve, ResolveMode};
use hex_skirmish::core::{BattleError, ResourceKind, TeamId};
use hex_skirmish::entity::{Entity, FightingStyle, StatBlock};
use hex_skirmish::grid::HexCoord;

fn swordsman(catalog: &AbilityCatalog) -> Entity {
    let mut entity = Entity::new("Swordsman", TeamId::new(0), StatBlock::default())
        .with_style(
            FightingStyle::new("Blade", 10.0)
                .bind(AbilityKey::Q, catalog.get("Strike").unwrap())
                .bind(AbilityKey::W, catalog.get("Firebolt").unwrap()),
        )
        .at(HexCoord::new(0, 0));
    entity.pools.pos = 100.0;
    entity
}

fn dummy(at: HexCoord) -> Entity {
    let mut entity = Entity::new("Dummy", TeamId::new(1), StatBlock::default()).at(at);
    entity.pools.hip = 100.0;
    entity
}

/// Strike: cost 25 pos, range 1, one 15-damage die at 85% accuracy
#[test]
fn test_strike_hit_rate_near_85_percent() {
    let catalog = AbilityCatalog::builtin();
    let strike = catalog.get("Strike").unwrap();
    let attacker = swordsman(&catalog);
    let target = dummy(HexCoord::new(1, 0));
    let mut rng = ChaCha8Rng::seed_from_u64(2024);

    let trials = 1000;
    let hits = (0..trials)
        .filter(|_| {
            resolve(&attacker, &strike, &target, target.position, ResolveMode::Execute, &mut rng)
                .unwrap()
                .hit
        })
        .count();

    let rate = hits as f64 / trials as f64;
    assert!((0.80..=0.90).contains(&rate), "hit rate {rate}");
}

#[test]
fn test_miss_still_costs() {
    let catalog = AbilityCatalog::builtin();
    let strike = catalog.get("Strike").unwrap();
    let target = dummy(HexCoord::new(1, 0));
    let mut rng = ChaCha8Rng::seed_from_u64(11);

    // Find a seeded miss
    let miss = (0..200)
        .map(|_| {
            resolve(&swordsman(&catalog), &strike, &target, target.position, ResolveMode::Execute, &mut rng)
                .unwrap()
        })
        .find(|clash| !clash.hit)
        .expect("no miss in 200 swings");

    assert_eq!(miss.damage, 0);
    let mut attacker = swordsman(&catalog);
    let mut target = target;
    commit_cost(&mut attacker, &miss).unwrap();
    commit_damage(&mut target, &miss);
    assert_eq!(attacker.pools.pos, 75.0);
    assert_eq!(target.pools.hip, 100.0);
}

#[test]
fn test_same_seed_same_clash() {
    let catalog = AbilityCatalog::builtin();
    let firebolt = catalog.get("Firebolt").unwrap();
    let mut attacker = swordsman(&catalog);
    attacker.pools.mana = 50.0;
    let target = dummy(HexCoord::new(3, 0));

    let roll = |seed| {
        let mut rng = ChaCha8Rng::seed_from_u64(seed);
        resolve(&attacker, &firebolt, &target, target.position, ResolveMode::Execute, &mut rng).unwrap()
    };
    assert_eq!(roll(99), roll(99));
}

#[test]
fn test_preview_and_execute_agree() {
    let catalog = AbilityCatalog::builtin();
    let strike = catalog.get("Strike").unwrap();
    let attacker = swordsman(&catalog);
    let target = dummy(HexCoord::new(0, 1));

    for seed in 0..50 {
        let mut preview_rng = ChaCha8Rng::seed_from_u64(seed);
        let mut execute_rng = ChaCha8Rng::seed_from_u64(seed);
        let preview =
            resolve(&attacker, &strike, &target, target.position, ResolveMode::Preview, &mut preview_rng).unwrap();
        let execute =
            resolve(&attacker, &strike, &target, target.position, ResolveMode::Execute, &mut execute_rng).unwrap();

        assert_eq!(preview.damage, execute.damage);
        assert_eq!(preview.rolls, execute.rolls);
        assert_eq!(preview.target_hip_after, execute.target_hip_after);
        assert!(!preview.executed);
        assert!(execute.executed);
    }
}

#[test]
fn test_resistance_scales_damage() {
    let catalog = AbilityCatalog::builtin();
    let firebolt = catalog.get("Firebolt").unwrap();
    let mut attacker = swordsman(&catalog);
    attacker.pools.mana = 50.0;
    let plain = dummy(HexCoord::new(2, 0));
    let warded = dummy(HexCoord::new(2, 0)).with_resistance(DamageType::Fire, 0.5);

    let mut a = ChaCha8Rng::seed_from_u64(5);
    let mut b = ChaCha8Rng::seed_from_u64(5);
    let full = resolve(&attacker, &firebolt, &plain, plain.position, ResolveMode::Preview, &mut a).unwrap();
    let half = resolve(&attacker, &firebolt, &warded, warded.position, ResolveMode::Preview, &mut b).unwrap();

    assert_eq!(full.raw_magnitude, half.raw_magnitude);
    assert_eq!(half.resistance_factor, 0.5);
    assert!(half.damage <= full.damage);
    assert_eq!(
        half.damage,
        (full.raw_magnitude as f32 * full.potency_factor * 0.5).floor() as u32
    );
}

#[test]
fn test_insufficient_mana_changes_nothing() {
    let catalog = AbilityCatalog::builtin();
    let firebolt = catalog.get("Firebolt").unwrap();
    let mut attacker = swordsman(&catalog);
    attacker.pools.mana = 10.0;
    let target = dummy(HexCoord::new(2, 0));
    let before = attacker.pools;

    let mut rng = ChaCha8Rng::seed_from_u64(1);
    let result = resolve(&attacker, &firebolt, &target, target.position, ResolveMode::Execute, &mut rng);
    assert!(matches!(
        result,
        Err(BattleError::InsufficientResource {
            kind: ResourceKind::Mana,
            ..
        })
    ));
    assert_eq!(attacker.pools, before);
}

#[test]
fn test_lethal_clash_flags_death() {
    let catalog = AbilityCatalog::builtin();
    let smite = catalog.get("Smite").unwrap();
    let mut attacker = swordsman(&catalog);
    attacker.pools.mana = 50.0;
    let mut target = dummy(HexCoord::new(1, 0));
    target.pools.hip = 1.0;

    let mut rng = ChaCha8Rng::seed_from_u64(3);
    let clash = resolve(&attacker, &smite, &target, target.position, ResolveMode::Execute, &mut rng).unwrap();
    assert!(clash.damage >= 1);
    assert!(clash.target_died);

    commit_damage(&mut target, &clash);
    assert_eq!(target.pools.hip, 0.0);
    assert!(target.is_dead());
}
