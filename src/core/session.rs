//! Game session and state stack
//!
//! A [`Session`] owns the resource manager and the stack of active game
//! states. States receive the manager explicitly when they load and dispose
//! their resources.

use crate::assets::{AssetError, AssetSource, ResourceManager, TeardownReport};
use crate::core::ResourceConfig;

/// A game state that holds resources while it is on the stack.
///
/// Every resource loaded in [`GameState::load_resources`] must be disposed
/// in [`GameState::dispose_resources`] so access counts stay balanced.
pub trait GameState<S: AssetSource> {
    /// Name used in diagnostics
    fn name(&self) -> &str;

    /// Load everything this state draws or plays.
    ///
    /// # Errors
    ///
    /// Returns the first asset that failed to load. The state is then not
    /// pushed, and is responsible for releasing what it already loaded.
    fn load_resources(&mut self, resources: &mut ResourceManager<S>) -> Result<(), AssetError>;

    /// Release what [`GameState::load_resources`] loaded
    fn dispose_resources(&mut self, resources: &mut ResourceManager<S>);
}

/// Owns the resource manager and the active game states
pub struct Session<S: AssetSource> {
    resources: ResourceManager<S>,
    /// Active states, top of the stack last
    states: Vec<Box<dyn GameState<S>>>,
    shut_down: bool,
}

impl<S: AssetSource> Session<S> {
    /// Create a session with an empty state stack
    pub fn new(source: S, config: ResourceConfig) -> Self {
        Self {
            resources: ResourceManager::new(source, config),
            states: Vec::new(),
            shut_down: false,
        }
    }

    /// The resource manager
    pub fn resources(&self) -> &ResourceManager<S> {
        &self.resources
    }

    /// The resource manager, mutably
    pub fn resources_mut(&mut self) -> &mut ResourceManager<S> {
        &mut self.resources
    }

    /// Load a state's resources and put it on top of the stack
    ///
    /// # Errors
    ///
    /// Returns the state's load error; the stack is unchanged in that case
    pub fn push_state(&mut self, mut state: Box<dyn GameState<S>>) -> Result<(), AssetError> {
        log::info!("Entering state {}", state.name());
        if let Err(e) = state.load_resources(&mut self.resources) {
            log::error!("State {} failed to load its resources: {e}", state.name());
            return Err(e);
        }
        self.states.push(state);
        Ok(())
    }

    /// Dispose the top state's resources and remove it.
    ///
    /// Returns the name of the removed state.
    pub fn pop_state(&mut self) -> Option<String> {
        let mut state = self.states.pop()?;
        log::info!("Leaving state {}", state.name());
        state.dispose_resources(&mut self.resources);
        Some(state.name().to_string())
    }

    /// Replace the top state, releasing its resources before loading the new one
    ///
    /// # Errors
    ///
    /// Returns the new state's load error; the old state is gone either way
    pub fn switch_state(&mut self, state: Box<dyn GameState<S>>) -> Result<(), AssetError> {
        self.pop_state();
        self.push_state(state)
    }

    /// Name of the top state
    pub fn current_state(&self) -> Option<&str> {
        self.states.last().map(|state| state.name())
    }

    /// Number of states on the stack
    pub fn depth(&self) -> usize {
        self.states.len()
    }

    /// Pop every state and release all remaining resources.
    ///
    /// Runs once; later calls return an empty report.
    pub fn shutdown(&mut self) -> TeardownReport {
        if self.shut_down {
            return TeardownReport::default();
        }

        while self.pop_state().is_some() {}
        let report = self.resources.dispose_all();
        self.shut_down = true;
        log::info!("Session shut down");
        report
    }
}

impl<S: AssetSource> Drop for Session<S> {
    fn drop(&mut self) {
        self.shutdown();
    }
}

impl<S: AssetSource> std::fmt::Debug for Session<S> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Session")
            .field("resources", &self.resources)
            .field("states", &self.depth())
            .field("shut_down", &self.shut_down)
            .finish()
    }
}
