//! Push notification delivery and deep-link routing for the Flovers plant-care app.
//!
//! The crate reconciles the platform's notification event sources (cold-start tap,
//! background tap, foreground message, local press), keeps the device token mirrored
//! to the backend, and resolves every notification open into exactly one action:
//! open a URL, navigate to a route, or fall back to the default screen.
//!
//! Platform services are reached through the traits in [`components::platform`];
//! [`PushServiceBuilder`] wires them into a [`LifecycleController`], the single
//! `start`/`stop` entry point for the app.

pub mod backends;
pub mod components;

pub use backends::*;
pub use components::*;

use std::sync::Arc;

/// Builder that assembles a [`LifecycleController`] from its collaborators
pub struct PushServiceBuilder {
    config: PushConfig,
    platform: Option<Arc<dyn PushPlatform>>,
    renderer: Option<Arc<dyn LocalRenderer>>,
    navigator: Option<Arc<dyn Navigator>>,
    opener: Option<Arc<dyn LinkOpener>>,
    registry: Option<Arc<dyn DeviceRegistry>>,
}

impl PushServiceBuilder {
    pub fn new(config: PushConfig) -> Self {
        Self {
            config,
            platform: None,
            renderer: None,
            navigator: None,
            opener: None,
            registry: None,
        }
    }

    pub fn with_platform(mut self, platform: Arc<dyn PushPlatform>) -> Self {
        self.platform = Some(platform);
        self
    }

    pub fn with_renderer(mut self, renderer: Arc<dyn LocalRenderer>) -> Self {
        self.renderer = Some(renderer);
        self
    }

    pub fn with_navigator(mut self, navigator: Arc<dyn Navigator>) -> Self {
        self.navigator = Some(navigator);
        self
    }

    pub fn with_link_opener(mut self, opener: Arc<dyn LinkOpener>) -> Self {
        self.opener = Some(opener);
        self
    }

    pub fn with_registry(mut self, registry: Arc<dyn DeviceRegistry>) -> Self {
        self.registry = Some(registry);
        self
    }

    /// Register through the REST API using `auth` for the bearer token
    pub fn with_http_registry(self, auth: Arc<dyn AuthTokenSource>) -> PushResult<Self> {
        let registry = HttpDeviceRegistry::new(&self.config, auth)?;
        Ok(self.with_registry(Arc::new(registry)))
    }

    pub fn config(&self) -> &PushConfig {
        &self.config
    }

    pub fn build(self) -> PushResult<LifecycleController> {
        let platform = required(self.platform, "platform")?;
        let renderer = required(self.renderer, "renderer")?;
        let navigator = required(self.navigator, "navigator")?;
        let opener = required(self.opener, "link_opener")?;
        let registry = required(self.registry, "registry")?;
        let config = self.config;

        let permissions = PermissionInitializer::new(
            Arc::clone(&platform),
            Arc::clone(&renderer),
            config.channel.to_channel(),
            config.platform,
        );
        let tokens = TokenSynchronizer::new(Arc::clone(&platform), registry, config.platform);
        let dispatcher = DeepLinkDispatcher::new(navigator, opener, config.default_route.clone());
        let coordinator = EventCoordinator::new(
            platform,
            renderer,
            dispatcher,
            DisplayConfig {
                channel_id: config.channel.id.clone(),
                fallback_title: config.fallback_title.clone(),
            },
        );

        Ok(LifecycleController::new(permissions, tokens, coordinator))
    }
}

fn required<T>(value: Option<T>, field: &str) -> PushResult<T> {
    value.ok_or_else(|| PushError::Config {
        field: field.to_string(),
        message: "collaborator not provided".to_string(),
    })
}
