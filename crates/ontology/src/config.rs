//! World configuration

use crate::ecs::ErrorMode;
use serde::{Deserialize, Serialize};

/// How systems spread per-entity work.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DispatchMode {
    /// Every entity is processed on the calling thread.
    #[default]
    Serial,
    /// Parallel systems fan their entities out over the rayon pool.
    /// Systems themselves still run one after another.
    Parallel,
}

/// World settings. Missing fields take their defaults when deserialized.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct WorldConfig {
    pub error_mode: ErrorMode,
    pub dispatch: DispatchMode,
    /// Entities to reserve room for up front.
    pub entity_capacity: usize,
}

impl WorldConfig {
    pub fn with_error_mode(mut self, error_mode: ErrorMode) -> Self {
        self.error_mode = error_mode;
        self
    }

    pub fn with_dispatch(mut self, dispatch: DispatchMode) -> Self {
        self.dispatch = dispatch;
        self
    }

    pub fn with_entity_capacity(mut self, entity_capacity: usize) -> Self {
        self.entity_capacity = entity_capacity;
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_raise_serially() {
        let config = WorldConfig::default();
        assert_eq!(config.error_mode, ErrorMode::Raise);
        assert_eq!(config.dispatch, DispatchMode::Serial);
        assert_eq!(config.entity_capacity, 0);
    }

    #[test]
    fn partial_json_fills_defaults() {
        let config: WorldConfig =
            serde_json::from_str(r#"{ "dispatch": "parallel", "entity_capacity": 256 }"#).unwrap();
        assert_eq!(config.dispatch, DispatchMode::Parallel);
        assert_eq!(config.entity_capacity, 256);
        assert_eq!(config.error_mode, ErrorMode::Raise);
    }

    #[test]
    fn json_round_trip() {
        let config = WorldConfig::default()
            .with_error_mode(ErrorMode::Unchecked)
            .with_dispatch(DispatchMode::Parallel);
        let text = serde_json::to_string(&config).unwrap();
        assert!(text.contains("\"unchecked\""));
        assert_eq!(serde_json::from_str::<WorldConfig>(&text).unwrap(), config);
    }
}
