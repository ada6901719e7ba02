// Notification payloads as they cross the platform boundary
// Remote push messages, locally rendered notifications, and the data mapping both carry

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

/// String-keyed data payload attached to every push message.
///
/// Keys the router understands: `url`, `route`, `plantId`, `id`.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct NotificationData(BTreeMap<String, String>);

impl NotificationData {
    pub const URL: &'static str = "url";
    pub const ROUTE: &'static str = "route";
    pub const PLANT_ID: &'static str = "plantId";
    pub const ID: &'static str = "id";

    pub fn new() -> Self {
        Self(BTreeMap::new())
    }

    pub fn with(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.0.insert(key.into(), value.into());
        self
    }

    pub fn insert(&mut self, key: impl Into<String>, value: impl Into<String>) {
        self.0.insert(key.into(), value.into());
    }

    pub fn get(&self, key: &str) -> Option<&str> {
        self.0.get(key).map(String::as_str)
    }

    /// Value for `key` unless it is missing or blank
    pub fn non_empty(&self, key: &str) -> Option<&str> {
        self.get(key).filter(|value| !value.trim().is_empty())
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &str)> {
        self.0.iter().map(|(k, v)| (k.as_str(), v.as_str()))
    }
}

impl<K: Into<String>, V: Into<String>> FromIterator<(K, V)> for NotificationData {
    fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Self {
        Self(
            iter.into_iter()
                .map(|(k, v)| (k.into(), v.into()))
                .collect(),
        )
    }
}

impl From<BTreeMap<String, String>> for NotificationData {
    fn from(map: BTreeMap<String, String>) -> Self {
        Self(map)
    }
}

/// Presentation block of a remote message (`notification` in FCM terms)
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct MessagePresentation {
    pub title: Option<String>,
    pub body: Option<String>,
}

/// Message delivered by the platform push service
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct RemoteMessage {
    pub message_id: Option<String>,
    pub notification: Option<MessagePresentation>,
    #[serde(default)]
    pub data: NotificationData,
}

impl RemoteMessage {
    pub fn new(data: NotificationData) -> Self {
        Self {
            message_id: None,
            notification: None,
            data,
        }
    }

    pub fn with_presentation(mut self, title: impl Into<String>, body: impl Into<String>) -> Self {
        self.notification = Some(MessagePresentation {
            title: Some(title.into()),
            body: Some(body.into()),
        });
        self
    }

    pub fn with_message_id(mut self, id: impl Into<String>) -> Self {
        self.message_id = Some(id.into());
        self
    }

    pub fn title(&self) -> Option<&str> {
        self.notification.as_ref()?.title.as_deref()
    }

    pub fn body(&self) -> Option<&str> {
        self.notification.as_ref()?.body.as_deref()
    }
}

/// Android channel importance levels the renderer understands
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ChannelImportance {
    Min,
    Low,
    Default,
    #[default]
    High,
}

/// Delivery channel provisioned before anything is displayed
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NotificationChannel {
    pub id: String,
    pub name: String,
    pub importance: ChannelImportance,
}

/// Notification rendered by the app itself
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LocalNotification {
    pub id: Option<String>,
    pub title: String,
    pub body: String,
    pub channel_id: String,
    /// Must survive rendering: the later press is routed from it
    pub data: NotificationData,
}

/// Kind of interaction the local renderer reports
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum LocalEventKind {
    Press,
    ActionPress,
    Dismissed,
    Delivered,
    Unknown,
}

/// Event emitted by the local renderer for a displayed notification
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LocalEvent {
    pub kind: LocalEventKind,
    pub notification: Option<LocalNotification>,
}

impl LocalEvent {
    pub fn press(notification: LocalNotification) -> Self {
        Self {
            kind: LocalEventKind::Press,
            notification: Some(notification),
        }
    }

    pub fn is_press(&self) -> bool {
        self.kind == LocalEventKind::Press
    }

    pub fn data(&self) -> Option<&NotificationData> {
        self.notification.as_ref().map(|n| &n.data)
    }

    pub fn into_data(self) -> NotificationData {
        self.notification.map(|n| n.data).unwrap_or_default()
    }
}
