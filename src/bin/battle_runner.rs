//! Headless Battle Runner
//!
//! Plays a scenario to the end with a scripted greedy policy and prints a
//! JSON or text summary. Same seed, same battle.

use clap::Parser;
use serde::Serialize;
use std::path::PathBuf;
use tracing_subscriber::EnvFilter;

use hex_skirmish::ability::{AbilityCatalog, AbilityKey};
use hex_skirmish::battle::{Battle, BattleEngine, BattleEventType, Intent, Scenario};
use hex_skirmish::core::error::Result;
use hex_skirmish::core::{EngineConfig, EntityId};
use hex_skirmish::grid::{find_path, path_cost, walkable_cost};
use hex_skirmish::lock::ActionLockGuard;

/// Headless Battle Runner - scripted skirmish to completion
#[derive(Parser, Debug)]
#[command(name = "battle_runner")]
#[command(about = "Run a hex skirmish headless and report the result")]
struct Args {
    /// Scenario TOML; the built-in duel when omitted
    #[arg(long)]
    scenario: Option<PathBuf>,

    /// Engine config TOML
    #[arg(long)]
    config: Option<PathBuf>,

    /// Extra abilities TOML, merged over the built-in catalog
    #[arg(long)]
    abilities: Option<PathBuf>,

    /// Random seed; overrides the config
    #[arg(long)]
    seed: Option<u64>,

    /// Scheduler step in seconds; the config's tick length when omitted
    #[arg(long)]
    dt: Option<f32>,

    /// Maximum scheduler ticks before calling it a draw
    #[arg(long, default_value_t = 500)]
    max_ticks: u64,

    /// Output format: json or text
    #[arg(long, default_value = "json")]
    format: String,

    /// Print the battle log to stderr as it happens
    #[arg(long, short = 'v')]
    verbose: bool,
}

#[derive(Serialize)]
struct Survivor {
    name: String,
    team: u8,
    hip: f32,
    max_hip: f32,
}

/// JSON output structure
#[derive(Serialize)]
struct BattleResult {
    outcome: String,
    ticks: u64,
    turns: usize,
    clashes: usize,
    seed: u64,
    published_version: Option<u64>,
    survivors: Vec<Survivor>,
}

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("hex_skirmish=warn")),
        )
        .with_writer(std::io::stderr)
        .init();

    let args = Args::parse();

    let mut config = match &args.config {
        Some(path) => EngineConfig::from_file(path)?,
        None => EngineConfig::default(),
    };
    if let Some(seed) = args.seed {
        config.battle.seed = seed;
    }
    let seed = config.battle.seed;
    let dt = args.dt.unwrap_or(config.scheduler.tick_seconds);

    let mut catalog = AbilityCatalog::builtin();
    if let Some(path) = &args.abilities {
        catalog.extend_from_toml_str(&std::fs::read_to_string(path)?)?;
    }
    let scenario = match &args.scenario {
        Some(path) => Scenario::from_file(path)?,
        None => Scenario::duel(),
    };

    let battle = scenario.build(config.clone(), &catalog)?;
    let engine = BattleEngine::new(battle, ActionLockGuard::new(config.locks.clone()));

    tracing::info!(seed, entities = scenario.entities.len(), "battle started");
    let mut printed = 0;

    loop {
        let (finished, tick) = engine.read(|b| (b.is_finished(), b.tick())).await;
        if finished || tick >= args.max_ticks {
            break;
        }

        engine.advance(dt).await?;
        if let Some(id) = engine.read(|b| b.acting()).await {
            take_turn(&engine, id).await;
        }

        if args.verbose {
            printed = print_new_events(&engine, printed).await;
        }
    }

    let result = engine.read(|b| summarize(b, seed)).await;
    let result = BattleResult {
        published_version: engine.published_version(),
        ..result
    };

    match args.format.as_str() {
        "text" => print_text(&result),
        "json" => println!("{}", serde_json::to_string_pretty(&result)?),
        other => {
            eprintln!("Unknown format '{}', defaulting to json", other);
            println!("{}", serde_json::to_string_pretty(&result)?);
        }
    }
    Ok(())
}

/// Attack if anything is in reach, otherwise close in and try again
async fn take_turn(engine: &BattleEngine, id: EntityId) {
    if let Some(intent) = engine.read(|b| choose_attack(b, id)).await {
        if engine.submit(intent).await.is_ok() {
            end_turn(engine, id).await;
            return;
        }
    }

    if let Some(intent) = engine.read(|b| choose_move(b, id)).await {
        if engine.submit(intent).await.is_ok() {
            if let Some(intent) = engine.read(|b| choose_attack(b, id)).await {
                let _ = engine.submit(intent).await;
            }
        }
    }
    end_turn(engine, id).await;
}

async fn end_turn(engine: &BattleEngine, id: EntityId) {
    // A kill can end the battle or the turn already
    if engine.read(|b| b.acting() == Some(id)).await {
        let _ = engine.submit(Intent::EndTurn { entity: id }).await;
    }
}

/// First ability key that can legally hit an enemy right now
fn choose_attack(battle: &Battle, id: EntityId) -> Option<Intent> {
    for key in AbilityKey::ALL {
        let Ok(targets) = battle.targets_in_range(id, key) else {
            continue;
        };
        for target in targets {
            if battle.preview_attack(id, key, target).is_ok() {
                return Some(Intent::SubmitAttack {
                    entity: id,
                    key,
                    target,
                });
            }
        }
    }
    None
}

/// Furthest affordable cell along the cheapest path next to the nearest enemy
fn choose_move(battle: &Battle, id: EntityId) -> Option<Intent> {
    let me = battle.entity(id).ok()?;
    let grid = battle.grid();
    let nearest = battle
        .roster()
        .living()
        .filter(|other| other.team != me.team)
        .min_by_key(|other| me.position.distance(&other.position))?;

    let path = nearest
        .position
        .neighbors()
        .into_iter()
        .filter(|cell| grid.contains(*cell) && !grid.is_occupied(*cell))
        .filter_map(|cell| find_path(grid, me.position, cell, walkable_cost(grid)).ok())
        .min_by_key(|path| path_cost(grid, path).unwrap_or(u32::MAX))?;

    let per_step = battle.config().movement.move_pos_per_step;
    let mut destination = me.position;
    for end in 1..path.len() {
        let cost = path_cost(grid, &path[..=end])? as f32 * per_step;
        if cost > me.pools.pos {
            break;
        }
        destination = path[end];
    }

    (destination != me.position).then_some(Intent::RequestMove {
        entity: id,
        to: destination,
    })
}

async fn print_new_events(engine: &BattleEngine, printed: usize) -> usize {
    engine
        .read(|b| {
            for event in b.log().iter().skip(printed) {
                eprintln!("  [{}] {:?}: {}", event.tick, event.event_type, event.description);
            }
            b.log().len()
        })
        .await
}

fn summarize(battle: &Battle, seed: u64) -> BattleResult {
    let log = battle.log();
    BattleResult {
        outcome: format!("{:?}", battle.outcome()),
        ticks: battle.tick(),
        turns: log
            .iter()
            .filter(|e| matches!(e.event_type, BattleEventType::TurnStarted { .. }))
            .count(),
        clashes: log
            .iter()
            .filter(|e| matches!(e.event_type, BattleEventType::Clash { .. }))
            .count(),
        seed,
        published_version: None,
        survivors: battle
            .roster()
            .living()
            .map(|entity| Survivor {
                name: entity.name.clone(),
                team: entity.team.0,
                hip: entity.pools.hip,
                max_hip: entity.maxima().hip,
            })
            .collect(),
    }
}

fn print_text(result: &BattleResult) {
    println!("Battle Result");
    println!("=============");
    println!("Outcome: {}", result.outcome);
    println!("Ticks: {}", result.ticks);
    println!("Turns: {}", result.turns);
    println!("Clashes: {}", result.clashes);
    for survivor in &result.survivors {
        println!(
            "  {} (team {}): {:.0}/{:.0} hip",
            survivor.name, survivor.team, survivor.hip, survivor.max_hip
        );
    }
    println!("Seed: {}", result.seed);
}
