//! The authoritative battle
//!
//! Every mutation validates first and commits second, so a rejected call
//! leaves the battle exactly as it was.

use rand::SeedableRng;
use rand_chacha::ChaCha8Rng;
use serde::{Deserialize, Serialize};
use std::sync::Arc;

use crate::ability::{Ability, AbilityCost, AbilityKey};
use crate::battle::events::{BattleEventLog, BattleEventType, BattleOutcome, BattlePhase};
use crate::battle::intent::{Intent, IntentOutcome};
use crate::combat::{commit_cost, commit_damage, resolve, ClashResult, ResolveMode};
use crate::core::config::EngineConfig;
use crate::core::error::{BattleError, Result};
use crate::core::types::{EntityId, TeamId, Tick};
use crate::entity::{Entity, ResourceSnapshot, Roster};
use crate::grid::{find_path, path_cost, walkable_cost, HexCoord, HexGrid};
use crate::scheduler::{ReadinessScheduler, SchedulerEvent};
use crate::sync::snapshot::{self, BattleSnapshot};

/// Per-entity view published to observers
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EntityView {
    pub id: EntityId,
    pub name: String,
    pub team: TeamId,
    pub position: HexCoord,
    pub resources: ResourceSnapshot,
    pub active_style: usize,
    pub armed: Option<AbilityKey>,
    pub dead: bool,
}

impl EntityView {
    fn of(entity: &Entity) -> Self {
        Self {
            id: entity.id,
            name: entity.name.clone(),
            team: entity.team,
            position: entity.position,
            resources: entity.snapshot(),
            active_style: entity.active_style_index(),
            armed: entity.armed(),
            dead: entity.is_dead(),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct OccupancyEntry {
    pub q: i32,
    pub r: i32,
    pub entity: EntityId,
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct TurnInfo {
    pub tick: Tick,
    pub acting: Option<EntityId>,
    pub phase: BattlePhase,
    pub outcome: BattleOutcome,
}

#[derive(Debug, Clone)]
pub struct Battle {
    config: EngineConfig,
    grid: HexGrid,
    roster: Roster,
    scheduler: ReadinessScheduler,
    rng: ChaCha8Rng,
    last_clash: Option<ClashResult>,
    log: BattleEventLog,
    phase: BattlePhase,
    outcome: BattleOutcome,
}

impl Battle {
    /// Empty rectangular battlefield sized and seeded from `config`
    pub fn new(config: EngineConfig) -> Self {
        let grid = HexGrid::new(config.battle.width, config.battle.height);
        Self::with_grid(config, grid)
    }

    pub fn with_grid(config: EngineConfig, grid: HexGrid) -> Self {
        Self {
            scheduler: ReadinessScheduler::new(&config.scheduler),
            rng: ChaCha8Rng::seed_from_u64(config.battle.seed),
            grid,
            roster: Roster::new(),
            last_clash: None,
            log: BattleEventLog::new(),
            phase: BattlePhase::Active,
            outcome: BattleOutcome::Undecided,
            config,
        }
    }

    pub fn config(&self) -> &EngineConfig {
        &self.config
    }

    pub fn grid(&self) -> &HexGrid {
        &self.grid
    }

    pub fn roster(&self) -> &Roster {
        &self.roster
    }

    pub fn entity(&self, id: EntityId) -> Result<&Entity> {
        self.roster.get(id)
    }

    pub fn scheduler(&self) -> &ReadinessScheduler {
        &self.scheduler
    }

    pub fn tick(&self) -> Tick {
        self.scheduler.current_tick()
    }

    /// Entity currently holding the turn
    pub fn acting(&self) -> Option<EntityId> {
        self.scheduler.acting().map(|turn| turn.id)
    }

    pub fn last_clash(&self) -> Option<&ClashResult> {
        self.last_clash.as_ref()
    }

    pub fn log(&self) -> &BattleEventLog {
        &self.log
    }

    pub fn phase(&self) -> BattlePhase {
        self.phase
    }

    pub fn outcome(&self) -> BattleOutcome {
        self.outcome
    }

    pub fn is_finished(&self) -> bool {
        matches!(self.phase, BattlePhase::Finished)
    }

    fn log_event(&mut self, event_type: BattleEventType, description: String) {
        let tick = self.tick();
        self.log.push(event_type, description, tick);
    }

    fn ensure_running(&self) -> Result<()> {
        if self.is_finished() {
            Err(BattleError::BattleOver)
        } else {
            Ok(())
        }
    }

    fn ensure_alive(&self, id: EntityId) -> Result<&Entity> {
        let entity = self.roster.get(id)?;
        if entity.is_dead() {
            return Err(BattleError::EntityDead(id));
        }
        Ok(entity)
    }

    /// Checks shared by every intent that needs the turn
    fn ensure_can_act(&self, id: EntityId) -> Result<()> {
        self.ensure_running()?;
        self.ensure_alive(id)?;
        self.scheduler.ensure_acting(id)
    }

    /// Place an entity at its position and enroll it with the scheduler
    pub fn add_entity(&mut self, entity: Entity) -> Result<EntityId> {
        self.ensure_running()?;
        if self.roster.contains(entity.id) {
            return Err(BattleError::Config(format!("duplicate entity id {}", entity.id)));
        }
        let id = entity.id;
        let team = entity.team;
        let name = entity.name.clone();
        let position = entity.position;

        self.grid.place(id, position)?;
        if let Err(err) = self.roster.insert(entity) {
            self.grid.vacate(position);
            return Err(err);
        }
        self.scheduler.enroll(id);

        self.log_event(
            BattleEventType::EntityJoined { entity: id, team },
            format!("{name} joins team {} at {position}", team.0),
        );
        Ok(id)
    }

    /// Run the scheduler for `dt` seconds and hand out the next turn
    pub fn advance(&mut self, dt: f32) -> Result<Vec<SchedulerEvent>> {
        self.ensure_running()?;
        let mut events = self.scheduler.tick(dt, &mut self.roster);
        if let Some(started) = self.start_next_turn() {
            events.push(started);
        }
        Ok(events)
    }

    fn start_next_turn(&mut self) -> Option<SchedulerEvent> {
        let started = self.scheduler.begin_next_turn(&self.roster)?;
        if let SchedulerEvent::TurnStarted { id, .. } = started {
            let name = self.roster.get(id).map(|e| e.name.clone()).unwrap_or_default();
            tracing::info!(entity = %id, %name, tick = self.tick(), "turn started");
            self.log_event(
                BattleEventType::TurnStarted { entity: id },
                format!("{name}'s turn"),
            );
        }
        Some(started)
    }

    /// Arm an ability; allowed outside the entity's turn
    pub fn select_ability(&mut self, id: EntityId, key: AbilityKey) -> Result<AbilityKey> {
        self.ensure_running()?;
        self.ensure_alive(id)?;
        self.roster.get_mut(id)?.select_ability(key)?;
        self.log_event(
            BattleEventType::AbilitySelected { entity: id, key },
            format!("ability {key:?} armed"),
        );
        Ok(key)
    }

    /// What `submit_attack` would produce right now, without committing
    ///
    /// Rolls on a copy of the battle RNG, so an identical submit that follows
    /// yields the same numbers.
    pub fn preview_attack(&self, id: EntityId, key: AbilityKey, cell: HexCoord) -> Result<ClashResult> {
        self.ensure_running()?;
        let (attacker, ability, target) = clash_inputs(&self.roster, &self.grid, id, key, cell)?;
        let mut rng = self.rng.clone();
        resolve(attacker, &ability, target, cell, ResolveMode::Preview, &mut rng)
    }

    /// Cells holding a living enemy that the ability on `key` can reach
    ///
    /// Listed nearest ring first; says nothing about cost or turn.
    pub fn targets_in_range(&self, id: EntityId, key: AbilityKey) -> Result<Vec<HexCoord>> {
        let me = self.roster.get(id)?;
        let ability = me.ability(key)?;
        let mut cells: Vec<HexCoord> = me
            .position
            .ring_range(ability.range.min, ability.range.max)
            .into_iter()
            .filter(|cell| {
                self.grid
                    .occupant(*cell)
                    .and_then(|other| self.roster.get(other).ok())
                    .is_some_and(|other| other.team != me.team && !other.is_dead())
            })
            .collect();
        cells.sort_by_key(|cell| (me.position.distance(cell), *cell));
        Ok(cells)
    }

    /// Resolve and commit an attack by the acting entity
    pub fn submit_attack(&mut self, id: EntityId, key: AbilityKey, cell: HexCoord) -> Result<ClashResult> {
        self.ensure_can_act(id)?;
        let (attacker, ability, target) = clash_inputs(&self.roster, &self.grid, id, key, cell)?;
        let clash = resolve(attacker, &ability, target, cell, ResolveMode::Execute, &mut self.rng)?;

        commit_cost(self.roster.get_mut(clash.attacker)?, &clash)?;
        self.scheduler.record_action(id, clash.cost.pos);
        commit_damage(self.roster.get_mut(clash.target)?, &clash);

        self.log_event(
            BattleEventType::Clash {
                attacker: clash.attacker,
                target: clash.target,
                damage: clash.damage,
                hit: clash.hit,
            },
            format!(
                "{} for {} damage ({})",
                clash.ability,
                clash.damage,
                if clash.hit { "hit" } else { "miss" }
            ),
        );
        self.last_clash = Some(clash.clone());

        if clash.target_died {
            self.handle_death(clash.target);
        }
        Ok(clash)
    }

    /// Walk the acting entity to `to`, paying pos per unit of path cost
    pub fn request_move(&mut self, id: EntityId, to: HexCoord) -> Result<(Vec<HexCoord>, f32)> {
        self.ensure_can_act(id)?;
        let from = self.roster.get(id)?.position;
        if to == from {
            return Err(BattleError::CellOccupied(to));
        }

        let path = find_path(&self.grid, from, to, walkable_cost(&self.grid))?;
        let steps = path_cost(&self.grid, &path).ok_or(BattleError::Unreachable(to))?;
        let cost = AbilityCost::pos(steps as f32 * self.config.movement.move_pos_per_step);
        self.roster.get(id)?.pools.can_afford(&cost)?;

        self.grid.relocate(from, to)?;
        let entity = self.roster.get_mut(id)?;
        entity.apply_cost(&cost)?;
        entity.position = to;
        self.scheduler.record_action(id, cost.pos);

        self.log_event(
            BattleEventType::Moved {
                entity: id,
                from,
                to,
                cost: cost.pos,
            },
            format!("moved {from} -> {to} for {} pos", cost.pos),
        );
        Ok((path, cost.pos))
    }

    pub fn switch_fighting_style(&mut self, id: EntityId, index: usize) -> Result<f32> {
        self.ensure_can_act(id)?;
        let cost = self.roster.get_mut(id)?.switch_fighting_style(index)?;
        self.scheduler.record_action(id, cost);
        self.log_event(
            BattleEventType::StyleSwitched {
                entity: id,
                index,
                cost,
            },
            format!("switched to style {index}"),
        );
        Ok(cost)
    }

    /// Close the acting entity's turn and hand the next one out
    pub fn end_turn(&mut self, id: EntityId) -> Result<f32> {
        self.ensure_running()?;
        self.roster.get(id)?;
        let ended = self.scheduler.end_turn(id, &mut self.roster)?;
        let spent = match ended {
            SchedulerEvent::TurnEnded { spent, .. } => spent,
            _ => 0.0,
        };
        self.log_event(
            BattleEventType::TurnEnded { entity: id, spent },
            format!("turn ended, {spent} pos spent"),
        );
        self.start_next_turn();
        Ok(spent)
    }

    /// Apply one intent
    pub fn apply(&mut self, intent: &Intent) -> Result<IntentOutcome> {
        match *intent {
            Intent::SelectAbility { entity, key } => self
                .select_ability(entity, key)
                .map(|key| IntentOutcome::AbilitySelected { key }),
            Intent::SubmitAttack {
                entity,
                key,
                target,
            } => self.submit_attack(entity, key, target).map(IntentOutcome::Clash),
            Intent::PreviewAttack {
                entity,
                key,
                target,
            } => self.preview_attack(entity, key, target).map(IntentOutcome::Preview),
            Intent::RequestMove { entity, to } => self
                .request_move(entity, to)
                .map(|(path, cost)| IntentOutcome::Moved { path, cost }),
            Intent::SwitchFightingStyle { entity, index } => self
                .switch_fighting_style(entity, index)
                .map(|cost| IntentOutcome::StyleSwitched { index, cost }),
            Intent::EndTurn { entity } => self
                .end_turn(entity)
                .map(|spent| IntentOutcome::TurnEnded { spent }),
        }
    }

    fn handle_death(&mut self, id: EntityId) {
        let Ok(entity) = self.roster.get(id) else {
            return;
        };
        let (name, position) = (entity.name.clone(), entity.position);
        let acting = self.acting() == Some(id);

        self.grid.vacate(position);
        self.scheduler.remove(id);
        tracing::info!(entity = %id, %name, "entity died");
        self.log_event(BattleEventType::EntityDied { entity: id }, format!("{name} falls"));

        if !self.check_battle_end() && acting {
            self.start_next_turn();
        }
    }

    /// Finish the battle once at most one team has anyone standing
    pub fn check_battle_end(&mut self) -> bool {
        if self.is_finished() {
            return true;
        }
        let teams = self.roster.living_teams();
        let outcome = match teams.as_slice() {
            [] => BattleOutcome::Draw,
            [team] => BattleOutcome::Victory { team: *team },
            _ => return false,
        };

        self.phase = BattlePhase::Finished;
        self.outcome = outcome;
        self.scheduler.halt();
        tracing::info!(?outcome, tick = self.tick(), "battle ended");
        self.log_event(
            BattleEventType::BattleEnded { outcome },
            format!("Battle ended: {outcome:?}"),
        );
        true
    }

    pub fn turn_info(&self) -> TurnInfo {
        TurnInfo {
            tick: self.tick(),
            acting: self.acting(),
            phase: self.phase,
            outcome: self.outcome,
        }
    }

    /// Capture every published value at `version`
    pub fn snapshot(&self, version: u64) -> BattleSnapshot {
        let mut out = BattleSnapshot::new(version);
        out.insert(snapshot::READINESS, &self.scheduler.fragments(&self.roster));
        for entity in self.roster.iter() {
            out.insert(snapshot::entity_key(entity.id), &EntityView::of(entity));
        }
        let occupancy: Vec<OccupancyEntry> = self
            .grid
            .occupancy()
            .into_iter()
            .map(|(coord, entity)| OccupancyEntry {
                q: coord.q,
                r: coord.r,
                entity,
            })
            .collect();
        out.insert(snapshot::GRID_OCCUPANCY, &occupancy);
        out.insert(snapshot::LAST_CLASH, &self.last_clash);
        out.insert(snapshot::TURN, &self.turn_info());
        out
    }
}

/// Attacker, its ability on `key`, and whoever stands on `cell`
fn clash_inputs<'a>(
    roster: &'a Roster,
    grid: &HexGrid,
    id: EntityId,
    key: AbilityKey,
    cell: HexCoord,
) -> Result<(&'a Entity, Arc<Ability>, &'a Entity)> {
    let attacker = roster.get(id)?;
    let ability = attacker.ability(key)?;
    let target_id = grid.occupant(cell).ok_or(BattleError::NoTarget(cell))?;
    let target = roster.get(target_id)?;
    Ok((attacker, ability, target))
}
