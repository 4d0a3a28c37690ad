//! Keeps a scene in step with the application state by comparing version
//! counters once per frame.

use crate::font::FontRequest;
use crate::state::AppState;

use super::backend::RenderBackend;
use super::SceneManager;

#[derive(Debug, Default)]
pub struct SceneSync {
    document_version: u64,
    store_version: u64,
}

impl SceneSync {
    pub fn new() -> Self {
        Self::default()
    }

    /// Reload the scene for a new document, or push changed values into the
    /// live scene. Returns the font request of a fresh load.
    pub fn sync<B: RenderBackend>(
        &mut self,
        state: &AppState,
        scene: &mut SceneManager<B>,
    ) -> Option<FontRequest> {
        let document = state.document.as_ref()?;

        if state.document_version != self.document_version {
            self.document_version = state.document_version;
            self.store_version = state.store.version();
            return Some(scene.load(&document.template.raw_text, &state.store.snapshot()));
        }

        if state.store.version() != self.store_version {
            self.store_version = state.store.version();
            scene.apply_customization(&state.store.snapshot());
        }
        None
    }

    /// Force a reload on the next sync
    pub fn invalidate(&mut self) {
        self.document_version = 0;
    }
}
