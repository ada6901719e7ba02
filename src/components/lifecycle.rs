// Lifecycle controller for the push subsystem
// Owns the Idle/Active flag and the four subscription slots; the only entry point
// the rest of the app calls.

use parking_lot::Mutex;

use super::coordinator::EventCoordinator;
use super::deeplink::DispatchOutcome;
use super::permission::PermissionInitializer;
use super::platform::Subscription;
use super::token_sync::{TokenOutcome, TokenSynchronizer};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum LifecycleState {
    #[default]
    Idle,
    Active,
}

/// What the async part of `start()` achieved.
/// Every step degrades instead of failing.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StartReport {
    pub may_display: bool,
    pub token: TokenOutcome,
    /// Dispatch result of the tap that cold-started the process
    pub initial: Option<DispatchOutcome>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum StartOutcome {
    AlreadyActive,
    Started(StartReport),
    /// `stop()` ran while this start was suspended; nothing was kept installed
    Superseded(StartReport),
}

#[derive(Default)]
struct Slots {
    token_refresh: Option<Subscription>,
    foreground_message: Option<Subscription>,
    opened_app: Option<Subscription>,
    local_press: Option<Subscription>,
}

impl Slots {
    fn installed(&self) -> usize {
        [
            self.token_refresh.is_some(),
            self.foreground_message.is_some(),
            self.opened_app.is_some(),
            self.local_press.is_some(),
        ]
        .into_iter()
        .filter(|installed| *installed)
        .count()
    }

    fn take(&mut self) -> Vec<Subscription> {
        [
            self.token_refresh.take(),
            self.foreground_message.take(),
            self.opened_app.take(),
            self.local_press.take(),
        ]
        .into_iter()
        .flatten()
        .collect()
    }
}

#[derive(Default)]
struct ControllerState {
    lifecycle: LifecycleState,
    /// Bumped by every start/stop so a superseded start can tell
    generation: u64,
    slots: Slots,
}

pub struct LifecycleController {
    permissions: PermissionInitializer,
    tokens: TokenSynchronizer,
    coordinator: EventCoordinator,
    state: Mutex<ControllerState>,
}

impl LifecycleController {
    pub fn new(
        permissions: PermissionInitializer,
        tokens: TokenSynchronizer,
        coordinator: EventCoordinator,
    ) -> Self {
        Self {
            permissions,
            tokens,
            coordinator,
            state: Mutex::new(ControllerState::default()),
        }
    }

    pub fn state(&self) -> LifecycleState {
        self.state.lock().lifecycle
    }

    pub fn is_active(&self) -> bool {
        self.state() == LifecycleState::Active
    }

    /// Number of occupied subscription slots
    pub fn installed_subscriptions(&self) -> usize {
        self.state.lock().slots.installed()
    }

    /// Start the subsystem. Idempotent and infallible.
    pub async fn start(&self) -> StartOutcome {
        let generation = {
            let mut state = self.state.lock();
            if state.lifecycle == LifecycleState::Active {
                tracing::debug!("push notifications already started");
                return StartOutcome::AlreadyActive;
            }
            state.lifecycle = LifecycleState::Active;
            state.generation += 1;
            state.generation
        };
        tracing::info!(generation, "starting push notifications");

        let may_display = self.permissions.ensure_permission().await;
        self.permissions.ensure_channel().await;

        let token = self.tokens.sync_current_token().await;
        let token_refresh = self.tokens.subscribe_refresh();

        let initial = self.coordinator.check_initial_notification().await;
        let report = StartReport {
            may_display,
            token,
            initial,
        };

        if !self.is_current(generation) {
            tracing::info!(generation, "push start superseded by stop");
            return StartOutcome::Superseded(report);
        }

        let opened_app = self.coordinator.subscribe_opened_app();
        let local_press = self.coordinator.subscribe_local_press();
        let foreground_message = self.coordinator.subscribe_foreground_messages();

        let mut state = self.state.lock();
        if state.generation != generation || state.lifecycle != LifecycleState::Active {
            drop(state);
            tracing::info!(generation, "push start superseded by stop");
            return StartOutcome::Superseded(report);
        }
        state.slots = Slots {
            token_refresh: Some(token_refresh),
            foreground_message: Some(foreground_message),
            opened_app: Some(opened_app),
            local_press: Some(local_press),
        };
        drop(state);

        tracing::info!(generation, may_display, "push notifications started");
        StartOutcome::Started(report)
    }

    /// Tear down every subscription. Returns false when already idle.
    pub fn stop(&self) -> bool {
        let subscriptions = {
            let mut state = self.state.lock();
            if state.lifecycle == LifecycleState::Idle {
                return false;
            }
            state.lifecycle = LifecycleState::Idle;
            state.generation += 1;
            state.slots.take()
        };

        let count = subscriptions.len();
        for subscription in subscriptions {
            subscription.cancel();
        }
        tracing::info!(subscriptions = count, "push notifications stopped");
        true
    }

    fn is_current(&self, generation: u64) -> bool {
        let state = self.state.lock();
        state.generation == generation && state.lifecycle == LifecycleState::Active
    }
}
