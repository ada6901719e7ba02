// Push subsystem configuration
// Endpoint location, default route, and the channel every local notification lands on

use std::sync::LazyLock;
use std::time::Duration;

use serde::{Deserialize, Serialize};
use url::Url;

use super::content::{ChannelImportance, NotificationChannel};
use super::{DevicePlatform, PushError, PushResult};

pub const ENV_API_BASE: &str = "FLOVERS_API_BASE";
pub const ENV_DEVICES_PATH: &str = "FLOVERS_DEVICES_PATH";
pub const ENV_DEFAULT_ROUTE: &str = "FLOVERS_DEFAULT_ROUTE";
pub const ENV_PLATFORM: &str = "FLOVERS_PLATFORM";

const DEFAULT_API_BASE: &str = "http://localhost:8000";

// Parsed from a literal, so this cannot fail at runtime
static DEFAULT_API_URL: LazyLock<Url> =
    LazyLock::new(|| Url::parse(DEFAULT_API_BASE).expect("default API base is a valid URL"));

/// Default delivery channel settings
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ChannelConfig {
    pub id: String,
    pub name: String,
    pub importance: ChannelImportance,
}

impl Default for ChannelConfig {
    fn default() -> Self {
        Self {
            id: "default".to_string(),
            name: "Default".to_string(),
            importance: ChannelImportance::High,
        }
    }
}

impl ChannelConfig {
    pub fn to_channel(&self) -> NotificationChannel {
        NotificationChannel {
            id: self.id.clone(),
            name: self.name.clone(),
            importance: self.importance,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PushConfig {
    /// Base URL of the REST API
    pub api_base: Url,
    /// Device-registration path, joined onto `api_base`
    pub registration_path: String,
    /// Route used when a payload carries neither `url` nor `route`
    pub default_route: String,
    pub platform: DevicePlatform,
    pub channel: ChannelConfig,
    /// Title for foreground messages without a presentation title
    pub fallback_title: String,
    #[serde(with = "duration_secs")]
    pub request_timeout: Duration,
}

impl Default for PushConfig {
    fn default() -> Self {
        Self {
            api_base: DEFAULT_API_URL.clone(),
            registration_path: "/devices/".to_string(),
            default_route: "Home".to_string(),
            platform: DevicePlatform::current(),
            channel: ChannelConfig::default(),
            fallback_title: "Flovers".to_string(),
            request_timeout: Duration::from_secs(15),
        }
    }
}

impl PushConfig {
    /// Defaults overridden by `FLOVERS_*` environment variables
    pub fn from_env() -> PushResult<Self> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Same as [`PushConfig::from_env`] with an injectable variable source
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> PushResult<Self> {
        let mut config = Self::default();
        let value = |key: &str| lookup(key).map(|v| v.trim().to_string()).filter(|v| !v.is_empty());

        if let Some(base) = value(ENV_API_BASE) {
            config = config.with_api_base(&base)?;
        }
        if let Some(path) = value(ENV_DEVICES_PATH) {
            config.registration_path = path;
        }
        if let Some(route) = value(ENV_DEFAULT_ROUTE) {
            config.default_route = route;
        }
        if let Some(platform) = value(ENV_PLATFORM) {
            config.platform = platform.parse()?;
        }
        Ok(config)
    }

    pub fn with_api_base(mut self, base: &str) -> PushResult<Self> {
        self.api_base = Url::parse(base.trim_end_matches('/')).map_err(|e| PushError::Config {
            field: "api_base".to_string(),
            message: format!("'{}': {}", base, e),
        })?;
        Ok(self)
    }

    pub fn with_registration_path(mut self, path: impl Into<String>) -> Self {
        self.registration_path = path.into();
        self
    }

    pub fn with_default_route(mut self, route: impl Into<String>) -> Self {
        self.default_route = route.into();
        self
    }

    pub fn with_platform(mut self, platform: DevicePlatform) -> Self {
        self.platform = platform;
        self
    }

    pub fn with_channel(mut self, channel: ChannelConfig) -> Self {
        self.channel = channel;
        self
    }

    pub fn with_fallback_title(mut self, title: impl Into<String>) -> Self {
        self.fallback_title = title.into();
        self
    }

    pub fn with_request_timeout(mut self, timeout: Duration) -> Self {
        self.request_timeout = timeout;
        self
    }

    /// Absolute registration endpoint. A base path such as `/api` is kept.
    pub fn registration_url(&self) -> PushResult<Url> {
        let mut base = self.api_base.clone();
        if !base.path().ends_with('/') {
            let path = format!("{}/", base.path());
            base.set_path(&path);
        }
        base.join(self.registration_path.trim_start_matches('/'))
            .map_err(|e| PushError::Config {
                field: "registration_path".to_string(),
                message: format!("'{}': {}", self.registration_path, e),
            })
    }
}

mod duration_secs {
    use std::time::Duration;

    use serde::{Deserialize, Deserializer, Serializer};

    pub fn serialize<S: Serializer>(value: &Duration, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_u64(value.as_secs())
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(deserializer: D) -> Result<Duration, D::Error> {
        u64::deserialize(deserializer).map(Duration::from_secs)
    }
}
