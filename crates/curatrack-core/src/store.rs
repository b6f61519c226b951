//! Store facade: load on construction, dispatch, write back.
//!
//! ```text
//! PatientStore::open ──load──▶ INITIALIZE(persisted | [])
//!                                     │
//!        dispatch(action) ──▶ reduce ─┴─▶ notify listeners ──▶ save (errors logged)
//! ```
//!
//! INITIALIZE is saved like any other accepted change, so a legacy or corrupt
//! document is rewritten in the current shape as soon as the store opens.
//!
//! Lifecycle is `Uninitialized → Loading → Initialized`. Loading happens
//! synchronously inside [`PatientStore::open`], so callers only ever see an
//! initialized store. A failed load degrades to an empty collection.

use tracing::{debug, error, warn};

use crate::config::CoreConfig;
use crate::reducer::{reduce, Action, AppState, Outcome};
use crate::storage::{PatientStorage, StorageError};

/// Callback invoked with each accepted state snapshot.
pub type Listener = Box<dyn Fn(&AppState) + Send>;

/// Single-writer store over a persistence port.
pub struct PatientStore<S: PatientStorage> {
    storage: S,
    state: AppState,
    persist: bool,
    listeners: Vec<Listener>,
}

impl<S: PatientStorage> PatientStore<S> {
    /// Build a store, loading the persisted collection.
    pub fn open(storage: S) -> Self {
        Self::with_options(storage, true)
    }

    /// Build a store using the write-back setting from `config`.
    pub fn open_with_config(storage: S, config: &CoreConfig) -> Self {
        Self::with_options(storage, config.persist())
    }

    fn with_options(storage: S, persist: bool) -> Self {
        let mut store = Self {
            storage,
            state: AppState::new(),
            persist,
            listeners: Vec::new(),
        };
        store.initialize();
        store
    }

    fn initialize(&mut self) {
        let patients = match self.storage.load() {
            Ok(patients) => patients,
            Err(StorageError::Absent(key)) => {
                debug!(key = %key, "no stored patients, starting empty");
                Vec::new()
            }
            Err(e) => {
                warn!(error = %e, "failed to load patients, starting empty");
                Vec::new()
            }
        };
        let reduction = reduce(&self.state, Action::Initialize(patients));
        self.state = reduction.state;
        debug!(patients = self.state.patients().len(), "store initialized");
        self.notify();
        self.write_back();
    }

    /// Current state snapshot.
    pub fn state(&self) -> &AppState {
        &self.state
    }

    /// Apply an action and persist the result.
    ///
    /// Missing ids and unknown kinds leave the state as it was; the returned
    /// outcome says which happened.
    pub fn dispatch(&mut self, action: Action) -> Outcome {
        let kind = action.kind().to_string();
        let reduction = reduce(&self.state, action);

        match &reduction.outcome {
            Outcome::Applied => {
                self.state = reduction.state;
                debug!(
                    action = %kind,
                    patients = self.state.patients().len(),
                    doctors = self.state.doctors().len(),
                    "action applied"
                );
                self.notify();
                self.write_back();
            }
            Outcome::NotFound(missing) => {
                warn!(action = %kind, ?missing, "action referenced a missing record");
            }
            Outcome::Ignored(_) => {
                debug!(action = %kind, "ignoring unknown action");
            }
        }

        reduction.outcome
    }

    /// Register a listener for accepted transitions.
    pub fn subscribe(&mut self, listener: Listener) {
        self.listeners.push(listener);
    }

    /// Borrow the underlying storage.
    pub fn storage(&self) -> &S {
        &self.storage
    }

    /// Mutably borrow the underlying storage.
    pub fn storage_mut(&mut self) -> &mut S {
        &mut self.storage
    }

    fn notify(&self) {
        for listener in &self.listeners {
            listener(&self.state);
        }
    }

    fn write_back(&mut self) {
        if !self.persist || !self.state.is_initialized() {
            return;
        }
        if let Err(e) = self.storage.save(self.state.patients()) {
            error!(error = %e, "failed to save patients");
        }
    }
}
