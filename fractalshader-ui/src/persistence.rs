//! Browser persistence for the viewer state.
//!
//! State is stored in localStorage as versioned JSON so users continue
//! exploring from their last position. Anything unreadable falls back to
//! defaults.

use crate::state::ViewerState;
use serde::{Deserialize, Serialize};

#[cfg(target_arch = "wasm32")]
const STORAGE_KEY: &str = "fractalshader_state";

/// State persisted to localStorage between sessions.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct PersistedState {
    pub viewer: ViewerState,
    /// Selected fractal configuration ID
    pub config_id: String,
    /// Schema version for future migrations
    version: u32,
}

impl PersistedState {
    const CURRENT_VERSION: u32 = 1;

    pub fn new(viewer: ViewerState, config_id: String) -> Self {
        Self {
            viewer,
            config_id,
            version: Self::CURRENT_VERSION,
        }
    }
}

/// Serialize state to JSON.
pub fn encode_state(state: &PersistedState) -> Option<String> {
    match serde_json::to_string(state) {
        Ok(json) => Some(json),
        Err(e) => {
            log::warn!("Failed to serialize state: {}", e);
            None
        }
    }
}

/// Parse state from JSON, rejecting other schema versions.
pub fn decode_state(json: &str) -> Option<PersistedState> {
    match serde_json::from_str::<PersistedState>(json) {
        Ok(state) if state.version == PersistedState::CURRENT_VERSION => Some(state),
        Ok(state) => {
            log::warn!(
                "Ignoring persisted state with version {} (current: {})",
                state.version,
                PersistedState::CURRENT_VERSION
            );
            None
        }
        Err(e) => {
            log::warn!("Failed to parse persisted state: {}", e);
            None
        }
    }
}

/// Load state from localStorage. None if absent, unreadable or outside the browser.
pub fn load_state() -> Option<PersistedState> {
    #[cfg(target_arch = "wasm32")]
    {
        let window = web_sys::window()?;
        let storage = window.local_storage().ok()??;
        let json = storage.get_item(STORAGE_KEY).ok()??;
        let state = decode_state(&json)?;
        log::info!("Loaded persisted state: config={}", state.config_id);
        Some(state)
    }
    #[cfg(not(target_arch = "wasm32"))]
    {
        None
    }
}

/// Save state to localStorage. Logs a warning if storage is unavailable or full.
pub fn save_state(state: &PersistedState) {
    #[cfg(target_arch = "wasm32")]
    {
        let Some(json) = encode_state(state) else {
            return;
        };
        let Some(window) = web_sys::window() else {
            return;
        };
        let Ok(Some(storage)) = window.local_storage() else {
            return;
        };
        if let Err(e) = storage.set_item(STORAGE_KEY, &json) {
            log::warn!("Failed to save state to localStorage: {:?}", e);
        }
    }
    #[cfg(not(target_arch = "wasm32"))]
    {
        let _ = state;
    }
}

/// Remove persisted state.
pub fn clear_state() {
    #[cfg(target_arch = "wasm32")]
    {
        if let Some(Ok(Some(storage))) = web_sys::window().map(|w| w.local_storage()) {
            let _ = storage.remove_item(STORAGE_KEY);
        }
        log::info!("Cleared persisted state");
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use fractalshader_core::Vec2;

    fn sample_state() -> PersistedState {
        let viewer = ViewerState {
            center: Vec2::new(-0.75, 0.125),
            zoom: 0.0078125,
            iterations: 4000,
            ..ViewerState::default()
        };
        PersistedState::new(viewer, "mandelbrot".to_string())
    }

    #[test]
    fn encoded_state_decodes_to_the_same_view() {
        let state = sample_state();
        let json = encode_state(&state).unwrap();
        assert_eq!(decode_state(&json), Some(state));
    }

    #[test]
    fn other_versions_are_ignored() {
        let json = encode_state(&sample_state())
            .unwrap()
            .replace("\"version\":1", "\"version\":99");
        assert_eq!(decode_state(&json), None);
    }

    #[test]
    fn garbage_is_ignored() {
        assert_eq!(decode_state("not json"), None);
        assert_eq!(decode_state("{\"config_id\":\"mandelbrot\"}"), None);
    }
}

#[cfg(all(test, target_arch = "wasm32"))]
mod browser_tests {
    use super::*;
    use wasm_bindgen_test::*;

    wasm_bindgen_test_configure!(run_in_browser);

    #[wasm_bindgen_test]
    fn test_save_then_load_from_local_storage() {
        clear_state();
        assert!(load_state().is_none());

        let state = PersistedState::new(ViewerState::default(), "mandelbrot".to_string());
        save_state(&state);
        assert_eq!(load_state(), Some(state));

        clear_state();
        assert!(load_state().is_none());
    }
}
