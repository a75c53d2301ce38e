//! Shared battle engine
//!
//! One authoritative `Battle` behind a read/write lock. Intents pass the
//! action lock guard first, mutate under the write lock and snapshot inside
//! the same critical section; publishing to observers happens after the write
//! lock is released, ordered by snapshot version.

use std::sync::{Arc, Mutex, MutexGuard, PoisonError};
use tokio::sync::{mpsc, oneshot, RwLock};
use tokio::task::JoinHandle;

use crate::battle::intent::{Intent, IntentOutcome};
use crate::battle::state::Battle;
use crate::core::error::{BattleError, Result};
use crate::lock::{ActionLockGuard, LockCategory};
use crate::scheduler::SchedulerEvent;
use crate::sync::{BattleSnapshot, Observer, StateSync};

struct Authority {
    battle: Battle,
    version: u64,
}

impl Authority {
    fn commit_snapshot(&mut self) -> BattleSnapshot {
        self.version += 1;
        self.battle.snapshot(self.version)
    }
}

pub struct BattleEngine {
    state: RwLock<Authority>,
    guard: ActionLockGuard,
    sync: Mutex<StateSync>,
}

impl BattleEngine {
    /// Wrap a battle; its initial state is published as version 0
    pub fn new(battle: Battle, guard: ActionLockGuard) -> Self {
        let mut sync = StateSync::new();
        sync.publish(battle.snapshot(0));
        Self {
            state: RwLock::new(Authority { battle, version: 0 }),
            guard,
            sync: Mutex::new(sync),
        }
    }

    pub fn guard(&self) -> &ActionLockGuard {
        &self.guard
    }

    fn sync(&self) -> MutexGuard<'_, StateSync> {
        self.sync.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Register an observer; it is hydrated with the last published state
    pub fn attach(&self, observer: Arc<dyn Observer>) {
        self.sync().attach(observer);
    }

    /// Push full state to every observer
    pub fn resync(&self) {
        self.sync().resync();
    }

    pub fn published_version(&self) -> Option<u64> {
        self.sync().version()
    }

    /// Run `f` against the battle under the read lock
    pub async fn read<T>(&self, f: impl FnOnce(&Battle) -> T) -> T {
        let state = self.state.read().await;
        f(&state.battle)
    }

    /// Current state, captured at the latest version
    pub async fn snapshot(&self) -> BattleSnapshot {
        let state = self.state.read().await;
        state.battle.snapshot(state.version)
    }

    fn publish(&self, snapshot: BattleSnapshot) {
        self.sync().publish(snapshot);
    }

    /// Validate and apply one intent
    ///
    /// Previews only take the read lock and publish nothing. Ability
    /// selections inside the debounce window are dropped.
    pub async fn submit(&self, intent: Intent) -> Result<IntentOutcome> {
        if let Intent::PreviewAttack {
            entity,
            key,
            target,
        } = intent
        {
            let state = self.state.read().await;
            return state
                .battle
                .preview_attack(entity, key, target)
                .map(IntentOutcome::Preview);
        }

        let category = intent.category();
        if category == LockCategory::AbilitySelection {
            // A locked selection must not use up the debounce window
            if !self.guard.can_perform_action(category) {
                tracing::warn!(entity = %intent.entity(), ?category, "intent rejected: locked");
                return Err(BattleError::AlreadyLocked(category));
            }
            let window = self.guard.config().selection_debounce();
            if self.guard.with_debounce(category, || (), window).is_none() {
                return Ok(IntentOutcome::Debounced);
            }
        }

        let state = &self.state;
        let intent_ref = &intent;
        let result = self
            .guard
            .lock_for_action(category, None, move || async move {
                let mut state = state.write().await;
                let outcome = state.battle.apply(intent_ref)?;
                Ok((outcome, state.commit_snapshot()))
            })
            .await;

        match result {
            Ok((outcome, snapshot)) => {
                self.publish(snapshot);
                Ok(outcome)
            }
            Err(err) => {
                tracing::warn!(entity = %intent.entity(), ?category, %err, "intent rejected");
                Err(err)
            }
        }
    }

    /// Tick the scheduler for `dt` seconds
    pub async fn advance(&self, dt: f32) -> Result<Vec<SchedulerEvent>> {
        if !self.guard.can_perform_action(LockCategory::Global) {
            return Err(BattleError::AlreadyLocked(LockCategory::Global));
        }
        let snapshot;
        let events = {
            let mut state = self.state.write().await;
            let events = state.battle.advance(dt)?;
            snapshot = state.commit_snapshot();
            events
        };
        self.publish(snapshot);
        Ok(events)
    }

    /// Serve intents from a channel, one at a time, until every sender is gone
    pub fn spawn_intent_loop(self: Arc<Self>) -> (IntentSender, JoinHandle<()>) {
        let (command_tx, mut command_rx) = mpsc::unbounded_channel::<Command>();
        let handle = tokio::spawn(async move {
            while let Some(command) = command_rx.recv().await {
                match command {
                    Command::Submit { intent, response } => {
                        let result = self.submit(intent).await;
                        // Requester may have stopped waiting
                        let _ = response.send(result);
                    }
                    Command::Advance { dt, response } => {
                        let result = self.advance(dt).await;
                        let _ = response.send(result);
                    }
                    Command::Shutdown => break,
                }
            }
            tracing::debug!("intent loop stopped");
        });
        (IntentSender { command_tx }, handle)
    }
}

impl std::fmt::Debug for BattleEngine {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("BattleEngine")
            .field("guard", &self.guard)
            .field("sync", &self.sync)
            .finish_non_exhaustive()
    }
}

enum Command {
    Submit {
        intent: Intent,
        response: oneshot::Sender<Result<IntentOutcome>>,
    },
    Advance {
        dt: f32,
        response: oneshot::Sender<Result<Vec<SchedulerEvent>>>,
    },
    Shutdown,
}

/// Cloneable handle onto a running intent loop
#[derive(Debug, Clone)]
pub struct IntentSender {
    command_tx: mpsc::UnboundedSender<Command>,
}

impl std::fmt::Debug for Command {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Command::Submit { intent, .. } => f.debug_tuple("Submit").field(intent).finish(),
            Command::Advance { dt, .. } => f.debug_tuple("Advance").field(dt).finish(),
            Command::Shutdown => f.write_str("Shutdown"),
        }
    }
}

impl IntentSender {
    /// Queue an intent; the receiver completes once it has been applied
    pub fn send(&self, intent: Intent) -> Result<oneshot::Receiver<Result<IntentOutcome>>> {
        let (response, rx) = oneshot::channel();
        self.command_tx
            .send(Command::Submit { intent, response })
            .map_err(|_| BattleError::EngineStopped)?;
        Ok(rx)
    }

    pub async fn submit(&self, intent: Intent) -> Result<IntentOutcome> {
        let rx = self.send(intent)?;
        rx.await.map_err(|_| BattleError::EngineStopped)?
    }

    pub async fn advance(&self, dt: f32) -> Result<Vec<SchedulerEvent>> {
        let (response, rx) = oneshot::channel();
        self.command_tx
            .send(Command::Advance { dt, response })
            .map_err(|_| BattleError::EngineStopped)?;
        rx.await.map_err(|_| BattleError::EngineStopped)?
    }

    /// Ask the loop to stop after the commands already queued
    pub fn shutdown(&self) {
        let _ = self.command_tx.send(Command::Shutdown);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ability::{AbilityCatalog, AbilityKey};
    use crate::battle::scenario::Scenario;
    use crate::core::config::{EngineConfig, LockConfig};
    use crate::core::types::EntityId;
    use crate::grid::HexCoord;
    use crate::lock::ManualClock;
    use crate::sync::snapshot::{entity_key, LAST_CLASH, READINESS, TURN};
    use crate::sync::MirrorObserver;
    use std::time::Duration;

    const VANGUARD: EntityId = EntityId(uuid::Uuid::from_u128(1));
    const PYROMANCER: EntityId = EntityId(uuid::Uuid::from_u128(2));

    fn engine() -> (Arc<BattleEngine>, Arc<ManualClock>) {
        let battle = Scenario::duel()
            .build(EngineConfig::default(), &AbilityCatalog::builtin())
            .unwrap();
        let clock = Arc::new(ManualClock::new());
        let guard = ActionLockGuard::with_clock(LockConfig::default(), clock.clone());
        (Arc::new(BattleEngine::new(battle, guard)), clock)
    }

    async fn until_turn(engine: &BattleEngine) -> EntityId {
        for _ in 0..20 {
            engine.advance(1.0).await.unwrap();
            if let Some(id) = engine.read(|battle| battle.acting()).await {
                return id;
            }
        }
        panic!("nobody became ready");
    }

    #[tokio::test]
    async fn test_observer_hydrated_on_attach() {
        let (engine, _clock) = engine();
        let mirror = Arc::new(MirrorObserver::new());
        engine.attach(mirror.clone());

        assert_eq!(mirror.hydrate_count(), 1);
        assert!(mirror.get(READINESS).is_some());
        assert!(mirror.get(&entity_key(VANGUARD)).is_some());
        assert_eq!(mirror.get(LAST_CLASH), Some(serde_json::Value::Null));
    }

    #[tokio::test]
    async fn test_advance_publishes_readiness() {
        let (engine, _clock) = engine();
        let mirror = Arc::new(MirrorObserver::new());
        engine.attach(mirror.clone());

        let before = mirror.get(READINESS);
        engine.advance(1.0).await.unwrap();
        assert_ne!(mirror.get(READINESS), before);
        assert_eq!(engine.published_version(), Some(1));
    }

    #[tokio::test]
    async fn test_first_turn_goes_to_fastest() {
        let (engine, _clock) = engine();
        // Vanguard speed 30, Pyromancer speed 25
        assert_eq!(until_turn(&engine).await, VANGUARD);
        assert_eq!(engine.read(|battle| battle.tick()).await, 4);
    }

    #[tokio::test]
    async fn test_move_publishes_occupancy_and_pos() {
        let (engine, _clock) = engine();
        let mirror = Arc::new(MirrorObserver::new());
        engine.attach(mirror.clone());
        until_turn(&engine).await;

        let outcome = engine
            .submit(Intent::RequestMove {
                entity: VANGUARD,
                to: HexCoord::new(3, 4),
            })
            .await
            .unwrap();
        assert!(matches!(outcome, IntentOutcome::Moved { cost, .. } if cost == 5.0));

        let view = mirror.get(&entity_key(VANGUARD)).unwrap();
        assert_eq!(view["position"]["q"], 3);
        assert_eq!(view["resources"]["pos"], 95.0);
        assert!(!engine.guard().is_locked(LockCategory::Movement));
    }

    #[tokio::test]
    async fn test_rejected_intent_publishes_nothing() {
        let (engine, _clock) = engine();
        let version = engine.published_version();

        let result = engine
            .submit(Intent::SwitchFightingStyle {
                entity: VANGUARD,
                index: 1,
            })
            .await;
        assert!(matches!(result, Err(BattleError::NotYourTurn(_))));
        assert_eq!(engine.published_version(), version);
        assert!(!engine.guard().is_locked(LockCategory::StyleSwitch));
    }

    #[tokio::test]
    async fn test_locked_category_rejects_intent() {
        let (engine, _clock) = engine();
        until_turn(&engine).await;
        engine
            .guard()
            .lock(LockCategory::Attack, None, Some("animation"));

        let result = engine
            .submit(Intent::SubmitAttack {
                entity: VANGUARD,
                key: AbilityKey::Q,
                target: HexCoord::new(8, 4),
            })
            .await;
        assert!(matches!(
            result,
            Err(BattleError::AlreadyLocked(LockCategory::Attack))
        ));
        let pos = engine
            .read(|battle| battle.entity(VANGUARD).map(|e| e.pools.pos))
            .await
            .unwrap();
        assert_eq!(pos, 100.0);
    }

    #[tokio::test]
    async fn test_global_lock_pauses_advance() {
        let (engine, clock) = engine();
        engine.guard().lock(LockCategory::Global, Some(Duration::from_secs(1)), None);
        assert!(matches!(
            engine.advance(1.0).await,
            Err(BattleError::AlreadyLocked(LockCategory::Global))
        ));
        clock.advance(Duration::from_secs(1));
        assert!(engine.advance(1.0).await.is_ok());
    }

    #[tokio::test]
    async fn test_selection_debounced() {
        let (engine, clock) = engine();
        let select = |key| Intent::SelectAbility {
            entity: PYROMANCER,
            key,
        };

        let first = engine.submit(select(AbilityKey::Q)).await.unwrap();
        assert_eq!(first, IntentOutcome::AbilitySelected { key: AbilityKey::Q });
        let second = engine.submit(select(AbilityKey::W)).await.unwrap();
        assert_eq!(second, IntentOutcome::Debounced);

        clock.advance(LockConfig::default().selection_debounce());
        let third = engine.submit(select(AbilityKey::W)).await.unwrap();
        assert_eq!(third, IntentOutcome::AbilitySelected { key: AbilityKey::W });
        let armed = engine
            .read(|battle| battle.entity(PYROMANCER).map(|e| e.armed()))
            .await
            .unwrap();
        assert_eq!(armed, Some(AbilityKey::W));
    }

    #[tokio::test]
    async fn test_locked_selection_keeps_debounce_window() {
        let (engine, _clock) = engine();
        let select = Intent::SelectAbility {
            entity: PYROMANCER,
            key: AbilityKey::W,
        };

        engine.guard().lock(LockCategory::Global, None, Some("cutscene"));
        assert!(matches!(
            engine.submit(select.clone()).await,
            Err(BattleError::AlreadyLocked(LockCategory::AbilitySelection))
        ));
        engine.guard().unlock(LockCategory::Global);

        // No clock advance: the rejected attempt did not open a window
        let outcome = engine.submit(select).await.unwrap();
        assert_eq!(outcome, IntentOutcome::AbilitySelected { key: AbilityKey::W });
    }

    #[tokio::test]
    async fn test_preview_does_not_publish() {
        let (engine, _clock) = engine();
        until_turn(&engine).await;
        engine
            .submit(Intent::RequestMove {
                entity: VANGUARD,
                to: HexCoord::new(7, 4),
            })
            .await
            .unwrap();
        let version = engine.published_version();

        let outcome = engine
            .submit(Intent::PreviewAttack {
                entity: VANGUARD,
                key: AbilityKey::Q,
                target: HexCoord::new(8, 4),
            })
            .await
            .unwrap();
        assert!(matches!(outcome, IntentOutcome::Preview(clash) if !clash.executed));
        assert_eq!(engine.published_version(), version);
    }

    #[tokio::test]
    async fn test_intent_loop_round_trip() {
        let (engine, _clock) = engine();
        let mirror = Arc::new(MirrorObserver::new());
        engine.attach(mirror.clone());
        let (sender, handle) = engine.clone().spawn_intent_loop();

        let mut acting = None;
        for _ in 0..20 {
            sender.advance(1.0).await.unwrap();
            acting = engine.read(|battle| battle.acting()).await;
            if acting.is_some() {
                break;
            }
        }
        let acting = acting.unwrap();

        let pending = sender.send(Intent::EndTurn { entity: acting }).unwrap();
        let outcome = pending.await.unwrap().unwrap();
        assert_eq!(outcome, IntentOutcome::TurnEnded { spent: 0.0 });
        // Both reached full readiness on the same tick; the other one is up next
        let turn = mirror.get(TURN).unwrap();
        assert_eq!(acting, VANGUARD);
        assert_eq!(turn["acting"], serde_json::to_value(PYROMANCER).unwrap());

        sender.shutdown();
        handle.await.unwrap();
        assert!(matches!(
            sender.submit(Intent::EndTurn { entity: acting }).await,
            Err(BattleError::EngineStopped)
        ));
    }

    #[tokio::test]
    async fn test_concurrent_senders_serialized() {
        let (engine, _clock) = engine();
        let (sender, _handle) = engine.clone().spawn_intent_loop();

        let tasks: Vec<_> = (0..8)
            .map(|_| {
                let sender = sender.clone();
                tokio::spawn(async move { sender.advance(0.5).await })
            })
            .collect();
        for task in tasks {
            task.await.unwrap().unwrap();
        }
        assert_eq!(engine.published_version(), Some(8));
    }
}
