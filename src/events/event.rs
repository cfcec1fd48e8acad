use std::{fmt, path::PathBuf, time::SystemTime};

/// The closed set of notifications carried by the [`EventBus`](super::EventBus).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum EventKind {
    CatalogFileChanged,
    TranslationUpdated,
    TranslationDeleted,
    TranslationKeyCreated,
    ProjectConfigChanged,
    PluginConfigChanged,
    CacheCleared,
    ParseCompleted,
    Error,
    Aggregated,
}

impl EventKind {
    pub const ALL: [EventKind; 10] = [
        EventKind::CatalogFileChanged,
        EventKind::TranslationUpdated,
        EventKind::TranslationDeleted,
        EventKind::TranslationKeyCreated,
        EventKind::ProjectConfigChanged,
        EventKind::PluginConfigChanged,
        EventKind::CacheCleared,
        EventKind::ParseCompleted,
        EventKind::Error,
        EventKind::Aggregated,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            EventKind::CatalogFileChanged => "arb_file_changed",
            EventKind::TranslationUpdated => "translation_updated",
            EventKind::TranslationDeleted => "translation_deleted",
            EventKind::TranslationKeyCreated => "translation_key_created",
            EventKind::ProjectConfigChanged => "project_config_changed",
            EventKind::PluginConfigChanged => "plugin_config_changed",
            EventKind::CacheCleared => "cache_cleared",
            EventKind::ParseCompleted => "parse_completed",
            EventKind::Error => "error",
            EventKind::Aggregated => "aggregated",
        }
    }
}

impl fmt::Display for EventKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// What happened to a watched file.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ChangeType {
    Created,
    Modified,
    Deleted,
}

impl ChangeType {
    pub fn as_str(&self) -> &'static str {
        match self {
            ChangeType::Created => "created",
            ChangeType::Modified => "modified",
            ChangeType::Deleted => "deleted",
        }
    }
}

impl fmt::Display for ChangeType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Event data, one variant per [`EventKind`].
#[derive(Debug, Clone, PartialEq)]
pub enum EventPayload {
    CatalogFileChanged {
        path: PathBuf,
        locale: String,
        change: ChangeType,
    },
    TranslationUpdated {
        key: String,
        locale: String,
        value: String,
    },
    TranslationDeleted {
        key: String,
        locale: String,
    },
    TranslationKeyCreated {
        key: String,
        locales: Vec<String>,
    },
    ProjectConfigChanged {
        root: PathBuf,
    },
    PluginConfigChanged,
    CacheCleared {
        prefixes: Vec<String>,
    },
    ParseCompleted {
        path: String,
        references: usize,
        diagnostics: usize,
    },
    Error {
        source: String,
        message: String,
    },
    /// A debounced burst of events sharing one aggregation key.
    Aggregated {
        source: EventKind,
        key: String,
        events: Vec<Event>,
    },
}

impl EventPayload {
    pub fn kind(&self) -> EventKind {
        match self {
            EventPayload::CatalogFileChanged { .. } => EventKind::CatalogFileChanged,
            EventPayload::TranslationUpdated { .. } => EventKind::TranslationUpdated,
            EventPayload::TranslationDeleted { .. } => EventKind::TranslationDeleted,
            EventPayload::TranslationKeyCreated { .. } => EventKind::TranslationKeyCreated,
            EventPayload::ProjectConfigChanged { .. } => EventKind::ProjectConfigChanged,
            EventPayload::PluginConfigChanged => EventKind::PluginConfigChanged,
            EventPayload::CacheCleared { .. } => EventKind::CacheCleared,
            EventPayload::ParseCompleted { .. } => EventKind::ParseCompleted,
            EventPayload::Error { .. } => EventKind::Error,
            EventPayload::Aggregated { .. } => EventKind::Aggregated,
        }
    }
}

/// A timestamped notification.
#[derive(Debug, Clone, PartialEq)]
pub struct Event {
    pub payload: EventPayload,
    pub timestamp: SystemTime,
}

impl Event {
    pub fn new(payload: EventPayload) -> Self {
        Self {
            payload,
            timestamp: SystemTime::now(),
        }
    }

    pub fn kind(&self) -> EventKind {
        self.payload.kind()
    }

    pub fn error(source: impl Into<String>, message: impl Into<String>) -> Self {
        Self::new(EventPayload::Error {
            source: source.into(),
            message: message.into(),
        })
    }
}

impl From<EventPayload> for Event {
    fn from(payload: EventPayload) -> Self {
        Self::new(payload)
    }
}
