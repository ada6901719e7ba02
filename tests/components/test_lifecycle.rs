//! Tests for components/lifecycle.rs

use std::sync::Arc;
use std::sync::atomic::Ordering;

use flovers_push::*;
use tokio::sync::Notify;

use crate::support::*;

#[tokio::test]
async fn test_start_installs_all_four_subscriptions() {
    let harness = Harness::new();
    assert_eq!(harness.controller.state(), LifecycleState::Idle);

    let outcome = harness.controller.start().await;

    assert!(matches!(outcome, StartOutcome::Started(_)));
    assert_eq!(harness.controller.state(), LifecycleState::Active);
    assert_eq!(harness.controller.installed_subscriptions(), 4);
    assert_eq!(harness.platform.live_listeners(), 3);
    assert_eq!(harness.renderer.foreground.len(), 1);
}

#[tokio::test]
async fn test_start_twice_installs_one_set() {
    let harness = Harness::new();

    harness.controller.start().await;
    let second = harness.controller.start().await;

    assert_eq!(second, StartOutcome::AlreadyActive);
    assert_eq!(harness.platform.live_listeners(), 3);
    assert_eq!(harness.renderer.foreground.len(), 1);
    assert_eq!(harness.platform.initial_checks.load(Ordering::SeqCst), 1);
    assert_eq!(harness.registry.registered().len(), 1);
}

#[tokio::test]
async fn test_stop_clears_every_slot() {
    let harness = Harness::new();
    harness.controller.start().await;

    assert!(harness.controller.stop());

    assert_eq!(harness.controller.state(), LifecycleState::Idle);
    assert_eq!(harness.controller.installed_subscriptions(), 0);
    assert_eq!(harness.platform.live_listeners(), 0);
    assert!(harness.renderer.foreground.is_empty());
    assert!(!harness.controller.stop());
}

#[tokio::test]
async fn test_restart_reinstalls_working_subscriptions() {
    let harness = Harness::new();
    harness.controller.start().await;
    harness.controller.stop();

    let outcome = harness.controller.start().await;

    assert!(matches!(outcome, StartOutcome::Started(_)));
    assert_eq!(harness.platform.live_listeners(), 3);
    assert_eq!(harness.renderer.foreground.len(), 1);

    harness
        .platform
        .opened
        .emit(RemoteMessage::new(data(&[("route", "Reminders")])))
        .await;
    assert_eq!(
        harness.navigator.calls(),
        vec![("Reminders".to_string(), Some(RouteParams::default()))]
    );
}

#[tokio::test]
async fn test_start_degrades_instead_of_failing() {
    let platform = FakePlatform::default();
    *platform.authorization.lock() = Ok(AuthorizationStatus::Denied);
    *platform.token.lock() = Ok(None);
    let harness = Harness::with_parts(platform, FakeNavigator::ready());

    let StartOutcome::Started(report) = harness.controller.start().await else {
        panic!("Expected Started");
    };

    assert!(!report.may_display);
    assert_eq!(report.token, TokenOutcome::Unavailable);
    assert_eq!(report.initial, None);
    assert!(harness.controller.is_active());
    assert_eq!(harness.controller.installed_subscriptions(), 4);
}

#[tokio::test]
async fn test_registration_failure_does_not_block_start() {
    let harness = Harness::new();
    harness.registry.fail.store(true, Ordering::SeqCst);

    let StartOutcome::Started(report) = harness.controller.start().await else {
        panic!("Expected Started");
    };

    assert!(matches!(report.token, TokenOutcome::Failed(_, PushError::RegistrationRejected { status: 500, .. })));
    assert_eq!(harness.registry.registered().len(), 1);
}

#[tokio::test]
async fn test_cold_start_tap_dispatched_before_live_sources() {
    let platform = FakePlatform::default();
    *platform.initial.lock() = Some(RemoteMessage::new(data(&[("url", "https://flovers.app/tips")])));
    let harness = Harness::with_parts(platform, FakeNavigator::not_ready());

    let StartOutcome::Started(report) = harness.controller.start().await else {
        panic!("Expected Started");
    };

    assert_eq!(
        report.initial,
        Some(DispatchOutcome::LinkOpened("https://flovers.app/tips".to_string()))
    );
    assert_eq!(harness.opener.opened().len(), 1);
}

/// Registry that parks until released, so `stop()` can run mid-start
struct GatedRegistry {
    entered: Notify,
    release: Notify,
}

impl DeviceRegistry for GatedRegistry {
    fn register<'a>(&'a self, _token: &'a DeviceToken) -> BoxFuture<'a, PushResult<()>> {
        Box::pin(async move {
            self.entered.notify_one();
            self.release.notified().await;
            Ok(())
        })
    }
}

#[tokio::test]
async fn test_stop_during_start_leaves_nothing_installed() {
    let platform = Arc::new(FakePlatform::default());
    let renderer = Arc::new(FakeRenderer::default());
    let registry = Arc::new(GatedRegistry {
        entered: Notify::new(),
        release: Notify::new(),
    });
    let controller = Arc::new(
        PushServiceBuilder::new(PushConfig::default().with_platform(DevicePlatform::Android))
            .with_platform(platform.clone())
            .with_renderer(renderer.clone())
            .with_navigator(Arc::new(FakeNavigator::ready()))
            .with_link_opener(Arc::new(FakeOpener::default()))
            .with_registry(registry.clone())
            .build()
            .expect("collaborators provided"),
    );

    let starting = tokio::spawn({
        let controller = Arc::clone(&controller);
        async move { controller.start().await }
    });

    registry.entered.notified().await;
    assert!(controller.is_active());
    assert!(controller.stop());
    registry.release.notify_one();

    let outcome = starting.await.expect("start task completes");
    assert!(matches!(outcome, StartOutcome::Superseded(_)));
    assert_eq!(controller.state(), LifecycleState::Idle);
    assert_eq!(controller.installed_subscriptions(), 0);
    assert_eq!(platform.live_listeners(), 0);
    assert!(renderer.foreground.is_empty());
}
