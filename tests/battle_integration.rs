//! Battle integration tests
//!
//! Full turns through `Battle`: readiness, intents, deaths and the outcome.

use hex_skirmish::ability::{AbilityCatalog, AbilityKey};
use hex_skirmish::battle::{Battle, BattleEventType, BattleOutcome, Intent, IntentOutcome, Scenario};
use hex_skirmish::core::{BattleError, EngineConfig, EntityId, ResourceKind, TeamId};
use hex_skirmish::entity::{Entity, FightingStyle, StatBlock};
use hex_skirmish::grid::{HexCoord, HexGrid, Terrain};
use hex_skirmish::scheduler::{SchedulerEvent, TurnState};

fn duel() -> Battle {
    Scenario::duel()
        .build(EngineConfig::default(), &AbilityCatalog::builtin())
        .unwrap()
}

const VANGUARD: EntityId = EntityId(uuid::Uuid::from_u128(1));
const PYROMANCER: EntityId = EntityId(uuid::Uuid::from_u128(2));

#[test]
fn test_speed_30_ready_on_fourth_tick() {
    let mut battle = Battle::new(EngineConfig::default());
    let runner = Entity::new("Runner", TeamId::new(0), StatBlock::default().with_speed(30));
    let id = battle.add_entity(runner).unwrap();

    for _ in 0..3 {
        battle.advance(1.0).unwrap();
        assert_eq!(battle.scheduler().state(id), Some(TurnState::Waiting));
    }
    assert_eq!(battle.entity(id).unwrap().pools.pos, 90.0);

    let events = battle.advance(1.0).unwrap();
    assert_eq!(
        events,
        vec![
            SchedulerEvent::BecameReady { id, tick: 4 },
            SchedulerEvent::TurnStarted { id, tick: 4 },
        ]
    );
    assert_eq!(battle.entity(id).unwrap().pools.pos, 100.0);
}

#[test]
fn test_style_switch_during_turn() {
    let mut battle = duel();
    while battle.acting() != Some(VANGUARD) {
        battle.advance(1.0).unwrap();
    }

    assert_eq!(battle.switch_fighting_style(VANGUARD, 1).unwrap(), 15.0);
    let vanguard = battle.entity(VANGUARD).unwrap();
    assert_eq!(vanguard.pools.pos, 85.0);
    assert_eq!(vanguard.active_style().map(|s| s.name.as_str()), Some("Bulwark"));

    assert!(matches!(
        battle.switch_fighting_style(VANGUARD, 1),
        Err(BattleError::StyleAlreadyActive(1))
    ));
    assert!(matches!(
        battle.switch_fighting_style(VANGUARD, 7),
        Err(BattleError::InvalidStyleIndex { index: 7, count: 2 })
    ));
    assert_eq!(battle.entity(VANGUARD).unwrap().pools.pos, 85.0);
}

#[test]
fn test_switch_cost_10_with_5_pos() {
    let catalog = AbilityCatalog::builtin();
    let mut battle = Battle::new(EngineConfig::default());
    let id = battle
        .add_entity(
            Entity::new("Adept", TeamId::new(0), StatBlock::default().with_speed(5))
                .with_style(FightingStyle::new("Open", 0.0).bind(AbilityKey::Q, catalog.get("Strike").unwrap()))
                .with_style(FightingStyle::new("Closed", 10.0).bind(AbilityKey::Q, catalog.get("Lunge").unwrap()))
                .at(HexCoord::new(0, 0)),
        )
        .unwrap();
    battle.advance(1.0).unwrap();
    assert_eq!(battle.entity(id).unwrap().pools.pos, 5.0);

    // Not acting yet: the turn check comes first
    assert!(matches!(
        battle.switch_fighting_style(id, 1),
        Err(BattleError::NotYourTurn(_))
    ));

    // Standalone entity check for the resource rule
    let mut adept = battle.entity(id).unwrap().clone();
    let result = adept.switch_fighting_style(1);
    assert!(matches!(
        result,
        Err(BattleError::InsufficientResource {
            kind: ResourceKind::Pos,
            ..
        })
    ));
    assert_eq!(adept.active_style_index(), 0);
    assert_eq!(adept.pools.pos, 5.0);
    assert_eq!(adept.ability(AbilityKey::Q).unwrap().name, "Strike");
}

fn scout_on(grid: HexGrid) -> (Battle, EntityId) {
    let mut battle = Battle::with_grid(EngineConfig::default(), grid);
    let id = battle
        .add_entity(
            Entity::new("Scout", TeamId::new(0), StatBlock::default().with_speed(100)).at(HexCoord::new(2, 2)),
        )
        .unwrap();
    battle.advance(1.0).unwrap();
    assert_eq!(battle.acting(), Some(id));
    (battle, id)
}

#[test]
fn test_movement_around_walls() {
    let goal = HexCoord::new(5, 2);

    let (mut open, id) = scout_on(HexGrid::new(12, 10));
    let (open_path, open_cost) = open.request_move(id, goal).unwrap();
    assert_eq!(open_path.len(), 4);
    assert_eq!(open_cost, 15.0);

    let mut grid = HexGrid::new(12, 10);
    grid.set_terrain(HexCoord::new(3, 2), Terrain::Wall);
    grid.set_terrain(HexCoord::new(4, 2), Terrain::Wall);
    let (mut walled, id) = scout_on(grid);
    let (detour, detour_cost) = walled.request_move(id, goal).unwrap();
    assert!(detour.len() > open_path.len());
    assert!(detour_cost > open_cost);
    assert!(!detour.contains(&HexCoord::new(3, 2)));

    let mut grid = HexGrid::new(12, 10);
    for cell in goal.neighbors() {
        grid.set_terrain(cell, Terrain::Wall);
    }
    let (mut sealed, id) = scout_on(grid);
    assert!(matches!(
        sealed.request_move(id, goal),
        Err(BattleError::Unreachable(cell)) if cell == goal
    ));
    assert_eq!(sealed.entity(id).unwrap().pools.pos, 100.0);
}

#[test]
fn test_duel_runs_to_completion() {
    let mut battle = duel();
    let mut turns = 0;

    while !battle.is_finished() && battle.tick() < 1_000 {
        battle.advance(1.0).unwrap();
        let Some(id) = battle.acting() else {
            continue;
        };
        turns += 1;

        let me = battle.entity(id).unwrap().clone();
        let foe = battle
            .roster()
            .living()
            .find(|other| other.team != me.team)
            .map(|other| other.position)
            .unwrap();

        let attacked = AbilityKey::ALL.into_iter().any(|key| {
            battle.preview_attack(id, key, foe).is_ok() && battle.submit_attack(id, key, foe).is_ok()
        });
        if !attacked {
            // Step toward the foe, one cell at a time while affordable
            for cell in me.position.line_to(&foe).into_iter().skip(1) {
                if cell == foe || battle.request_move(id, cell).is_err() {
                    break;
                }
            }
        }
        if battle.acting() == Some(id) {
            battle.end_turn(id).unwrap();
        }
    }

    assert!(battle.is_finished(), "no winner after {} ticks", battle.tick());
    assert!(turns > 0);
    assert!(matches!(battle.outcome(), BattleOutcome::Victory { .. }));
    let deaths = battle
        .log()
        .iter()
        .filter(|e| matches!(e.event_type, BattleEventType::EntityDied { .. }))
        .count();
    assert_eq!(deaths, 1);

    for entity in battle.roster().iter() {
        let max = entity.maxima();
        assert!((0.0..=100.0).contains(&entity.pools.pos));
        assert!((0.0..=max.hip).contains(&entity.pools.hip));
    }
}

#[test]
fn test_replay_is_deterministic() {
    let play = || {
        let mut battle = duel();
        let mut order = Vec::new();
        for _ in 0..40 {
            battle.advance(1.0).unwrap();
            if let Some(id) = battle.acting() {
                order.push(id);
                let _ = battle.apply(&Intent::SubmitAttack {
                    entity: id,
                    key: AbilityKey::Q,
                    target: HexCoord::new(8, 4),
                });
                battle.end_turn(id).unwrap();
            }
        }
        (order, battle.snapshot(0))
    };
    let (order_a, snap_a) = play();
    let (order_b, snap_b) = play();
    assert_eq!(order_a, order_b);
    assert_eq!(snap_a, snap_b);
    assert!(order_a.contains(&VANGUARD) && order_a.contains(&PYROMANCER));
}

#[test]
fn test_apply_reports_outcomes() {
    let mut battle = duel();
    let outcome = battle
        .apply(&Intent::SelectAbility {
            entity: PYROMANCER,
            key: AbilityKey::W,
        })
        .unwrap();
    assert_eq!(outcome, IntentOutcome::AbilitySelected { key: AbilityKey::W });

    let missing = EntityId::from_u128(99);
    assert!(matches!(
        battle.apply(&Intent::EndTurn { entity: missing }),
        Err(BattleError::ActorNotFound(id)) if id == missing
    ));
}
