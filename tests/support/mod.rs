//! In-memory collaborators shared by the integration tests

#![allow(dead_code)]

use std::sync::Arc;
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};

use flovers_push::*;
use parking_lot::Mutex;

pub fn init_tracing() {
    let _ = tracing_subscriber::fmt()
        .with_test_writer()
        .with_max_level(tracing::Level::DEBUG)
        .try_init();
}

pub struct FakePlatform {
    pub runtime_required: AtomicBool,
    pub runtime_granted: AtomicBool,
    pub authorization: Mutex<PushResult<AuthorizationStatus>>,
    pub token: Mutex<PushResult<Option<String>>>,
    pub initial: Mutex<Option<RemoteMessage>>,
    pub runtime_requests: Mutex<Vec<RuntimePermission>>,
    pub initial_checks: AtomicUsize,
    pub token_refresh: ListenerSet<String>,
    pub messages: ListenerSet<RemoteMessage>,
    pub opened: ListenerSet<RemoteMessage>,
    pub background_messages: ListenerSet<RemoteMessage>,
}

impl Default for FakePlatform {
    fn default() -> Self {
        Self {
            runtime_required: AtomicBool::new(true),
            runtime_granted: AtomicBool::new(true),
            authorization: Mutex::new(Ok(AuthorizationStatus::Authorized)),
            token: Mutex::new(Ok(Some("fcm-token-1".to_string()))),
            initial: Mutex::new(None),
            runtime_requests: Mutex::new(Vec::new()),
            initial_checks: AtomicUsize::new(0),
            token_refresh: ListenerSet::new(),
            messages: ListenerSet::new(),
            opened: ListenerSet::new(),
            background_messages: ListenerSet::new(),
        }
    }
}

impl FakePlatform {
    /// Listeners currently installed across the three platform sources
    pub fn live_listeners(&self) -> usize {
        self.token_refresh.len() + self.messages.len() + self.opened.len()
    }
}

impl PushPlatform for FakePlatform {
    fn requires_runtime_permission(&self, _permission: RuntimePermission) -> bool {
        self.runtime_required.load(Ordering::SeqCst)
    }

    fn request_runtime_permission(
        &self,
        permission: RuntimePermission,
    ) -> BoxFuture<'_, PushResult<bool>> {
        self.runtime_requests.lock().push(permission);
        let granted = self.runtime_granted.load(Ordering::SeqCst);
        Box::pin(async move { Ok(granted) })
    }

    fn request_authorization(&self) -> BoxFuture<'_, PushResult<AuthorizationStatus>> {
        let status = self.authorization.lock().clone();
        Box::pin(async move { status })
    }

    fn current_token(&self) -> BoxFuture<'_, PushResult<Option<String>>> {
        let token = self.token.lock().clone();
        Box::pin(async move { token })
    }

    fn initial_notification(&self) -> BoxFuture<'_, PushResult<Option<RemoteMessage>>> {
        self.initial_checks.fetch_add(1, Ordering::SeqCst);
        let initial = self.initial.lock().take();
        Box::pin(async move { Ok(initial) })
    }

    fn on_token_refresh(&self, handler: EventHandler<String>) -> Subscription {
        self.token_refresh.subscribe(handler)
    }

    fn on_message(&self, handler: EventHandler<RemoteMessage>) -> Subscription {
        self.messages.subscribe(handler)
    }

    fn on_notification_opened(&self, handler: EventHandler<RemoteMessage>) -> Subscription {
        self.opened.subscribe(handler)
    }

    fn set_background_message_handler(&self, handler: EventHandler<RemoteMessage>) {
        self.background_messages.attach(handler);
    }
}

#[derive(Default)]
pub struct FakeRenderer {
    pub channels: Mutex<Vec<NotificationChannel>>,
    pub displayed: Mutex<Vec<LocalNotification>>,
    pub fail_display: AtomicBool,
    pub foreground: ListenerSet<LocalEvent>,
    pub background: ListenerSet<LocalEvent>,
}

impl LocalRenderer for FakeRenderer {
    fn create_channel<'a>(
        &'a self,
        channel: &'a NotificationChannel,
    ) -> BoxFuture<'a, PushResult<()>> {
        Box::pin(async move {
            let mut channels = self.channels.lock();
            if !channels.iter().any(|c| c.id == channel.id) {
                channels.push(channel.clone());
            }
            Ok(())
        })
    }

    fn display(&self, notification: LocalNotification) -> BoxFuture<'_, PushResult<String>> {
        Box::pin(async move {
            if self.fail_display.load(Ordering::SeqCst) {
                return Err(PushError::platform("display", "renderer unavailable"));
            }
            let mut displayed = self.displayed.lock();
            displayed.push(notification);
            Ok(format!("local-{}", displayed.len()))
        })
    }

    fn on_foreground_event(&self, handler: EventHandler<LocalEvent>) -> Subscription {
        self.foreground.subscribe(handler)
    }

    fn on_background_event(&self, handler: EventHandler<LocalEvent>) {
        self.background.attach(handler);
    }
}

pub struct FakeNavigator {
    pub ready: AtomicBool,
    pub calls: Mutex<Vec<(String, Option<RouteParams>)>>,
}

impl FakeNavigator {
    pub fn ready() -> Self {
        Self {
            ready: AtomicBool::new(true),
            calls: Mutex::new(Vec::new()),
        }
    }

    pub fn not_ready() -> Self {
        Self {
            ready: AtomicBool::new(false),
            calls: Mutex::new(Vec::new()),
        }
    }

    pub fn calls(&self) -> Vec<(String, Option<RouteParams>)> {
        self.calls.lock().clone()
    }
}

impl Navigator for FakeNavigator {
    fn is_ready(&self) -> bool {
        self.ready.load(Ordering::SeqCst)
    }

    fn navigate(&self, route: &str, params: Option<&RouteParams>) {
        self.calls.lock().push((route.to_string(), params.cloned()));
    }
}

#[derive(Default)]
pub struct FakeOpener {
    pub opened: Mutex<Vec<String>>,
    pub fail: AtomicBool,
}

impl FakeOpener {
    pub fn failing() -> Self {
        Self {
            opened: Mutex::new(Vec::new()),
            fail: AtomicBool::new(true),
        }
    }

    pub fn opened(&self) -> Vec<String> {
        self.opened.lock().clone()
    }
}

impl LinkOpener for FakeOpener {
    fn open<'a>(&'a self, url: &'a str) -> BoxFuture<'a, PushResult<()>> {
        Box::pin(async move {
            self.opened.lock().push(url.to_string());
            if self.fail.load(Ordering::SeqCst) {
                return Err(PushError::LinkOpen {
                    url: url.to_string(),
                    message: "no handler for scheme".to_string(),
                });
            }
            Ok(())
        })
    }
}

#[derive(Default)]
pub struct FakeRegistry {
    pub registered: Mutex<Vec<DeviceToken>>,
    pub fail: AtomicBool,
}

impl FakeRegistry {
    pub fn registered(&self) -> Vec<DeviceToken> {
        self.registered.lock().clone()
    }
}

impl DeviceRegistry for FakeRegistry {
    fn register<'a>(&'a self, token: &'a DeviceToken) -> BoxFuture<'a, PushResult<()>> {
        Box::pin(async move {
            self.registered.lock().push(token.clone());
            if self.fail.load(Ordering::SeqCst) {
                return Err(PushError::RegistrationRejected {
                    status: 500,
                    message: "server error".to_string(),
                });
            }
            Ok(())
        })
    }
}

/// Every collaborator plus a controller wired through the public builder
pub struct Harness {
    pub platform: Arc<FakePlatform>,
    pub renderer: Arc<FakeRenderer>,
    pub navigator: Arc<FakeNavigator>,
    pub opener: Arc<FakeOpener>,
    pub registry: Arc<FakeRegistry>,
    pub controller: LifecycleController,
}

impl Harness {
    pub fn new() -> Self {
        Self::with_parts(FakePlatform::default(), FakeNavigator::ready())
    }

    pub fn with_parts(platform: FakePlatform, navigator: FakeNavigator) -> Self {
        let platform = Arc::new(platform);
        let renderer = Arc::new(FakeRenderer::default());
        let navigator = Arc::new(navigator);
        let opener = Arc::new(FakeOpener::default());
        let registry = Arc::new(FakeRegistry::default());

        let controller = PushServiceBuilder::new(
            PushConfig::default().with_platform(DevicePlatform::Android),
        )
        .with_platform(platform.clone())
        .with_renderer(renderer.clone())
        .with_navigator(navigator.clone())
        .with_link_opener(opener.clone())
        .with_registry(registry.clone())
        .build()
        .expect("all collaborators provided");

        Self {
            platform,
            renderer,
            navigator,
            opener,
            registry,
            controller,
        }
    }

    pub fn dispatcher(&self) -> DeepLinkDispatcher {
        DeepLinkDispatcher::new(self.navigator.clone(), self.opener.clone(), "Home")
    }

    pub fn coordinator(&self) -> EventCoordinator {
        EventCoordinator::new(
            self.platform.clone(),
            self.renderer.clone(),
            self.dispatcher(),
            DisplayConfig {
                channel_id: "default".to_string(),
                fallback_title: "Flovers".to_string(),
            },
        )
    }
}

pub fn data(pairs: &[(&str, &str)]) -> NotificationData {
    pairs.iter().map(|(k, v)| (*k, *v)).collect()
}

pub fn params(plant_id: Option<&str>, id: Option<&str>) -> RouteParams {
    RouteParams {
        plant_id: plant_id.map(str::to_string),
        id: id.map(str::to_string),
    }
}
