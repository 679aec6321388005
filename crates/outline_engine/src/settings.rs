//! The persistent settings collaborator.
//!
//! Read and write failures are never allowed to block UI construction:
//! typed loaders log the failure and hand back the default.

use std::collections::HashMap;

use outline_core::{NavigationMode, PanelPosition};
use outline_logging::outline_warn;
use parking_lot::Mutex;
use thiserror::Error;

/// Storage key for the persisted navigation mode.
pub const NAVIGATION_MODE_KEY: &str = "navigation_mode";
/// Storage key for the list-mode panel placement.
pub const PANEL_POSITION_KEY: &str = "panel_position";

#[derive(Debug, Error)]
pub enum SettingsError {
    #[error("settings backend error: {0}")]
    Backend(String),
}

/// Key-value persistence seam. No schema versioning: absent or
/// unrecognized values silently default at the call site.
pub trait SettingsStore: Send + Sync {
    fn get(&self, keys: &[&str]) -> Result<HashMap<String, String>, SettingsError>;
    fn set(&self, values: &[(String, String)]) -> Result<(), SettingsError>;
}

/// In-memory store for tests and embedding hosts without real persistence.
#[derive(Default)]
pub struct MemorySettingsStore {
    values: Mutex<HashMap<String, String>>,
}

impl SettingsStore for MemorySettingsStore {
    fn get(&self, keys: &[&str]) -> Result<HashMap<String, String>, SettingsError> {
        let values = self.values.lock();
        Ok(keys
            .iter()
            .filter_map(|key| values.get(*key).map(|v| ((*key).to_owned(), v.clone())))
            .collect())
    }

    fn set(&self, values: &[(String, String)]) -> Result<(), SettingsError> {
        let mut map = self.values.lock();
        for (key, value) in values {
            map.insert(key.clone(), value.clone());
        }
        Ok(())
    }
}

/// Loads the persisted mode; absent, unrecognized or failing reads all
/// default to [`NavigationMode::List`].
pub fn load_navigation_mode(store: &dyn SettingsStore) -> NavigationMode {
    match store.get(&[NAVIGATION_MODE_KEY]) {
        Ok(values) => values
            .get(NAVIGATION_MODE_KEY)
            .and_then(|token| NavigationMode::from_token(token))
            .unwrap_or_default(),
        Err(err) => {
            outline_warn!("failed to read navigation mode, defaulting: {err}");
            NavigationMode::default()
        }
    }
}

/// Persists the mode; failure is logged and swallowed.
pub fn save_navigation_mode(store: &dyn SettingsStore, mode: NavigationMode) {
    let entry = (NAVIGATION_MODE_KEY.to_owned(), mode.token().to_owned());
    if let Err(err) = store.set(&[entry]) {
        outline_warn!("failed to persist navigation mode {mode}: {err}");
    }
}

/// Loads the panel placement, defaulting to [`PanelPosition::Right`].
pub fn load_panel_position(store: &dyn SettingsStore) -> PanelPosition {
    match store.get(&[PANEL_POSITION_KEY]) {
        Ok(values) => values
            .get(PANEL_POSITION_KEY)
            .and_then(|token| PanelPosition::from_token(token))
            .unwrap_or_default(),
        Err(err) => {
            outline_warn!("failed to read panel position, defaulting: {err}");
            PanelPosition::default()
        }
    }
}

/// Persists the panel placement; failure is logged and swallowed.
pub fn save_panel_position(store: &dyn SettingsStore, position: PanelPosition) {
    let entry = (PANEL_POSITION_KEY.to_owned(), position.token().to_owned());
    if let Err(err) = store.set(&[entry]) {
        outline_warn!("failed to persist panel position {position}: {err}");
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn unrecognized_persisted_tokens_default_silently() {
        let store = MemorySettingsStore::default();
        store
            .set(&[(NAVIGATION_MODE_KEY.to_owned(), "minimap".to_owned())])
            .unwrap();
        assert_eq!(load_navigation_mode(&store), NavigationMode::List);
        assert_eq!(load_panel_position(&store), PanelPosition::Right);
    }

    #[test]
    fn round_trips_mode_and_position() {
        let store = MemorySettingsStore::default();
        save_navigation_mode(&store, NavigationMode::Precision);
        save_panel_position(&store, PanelPosition::Left);
        assert_eq!(load_navigation_mode(&store), NavigationMode::Precision);
        assert_eq!(load_panel_position(&store), PanelPosition::Left);
    }
}
