//! `SaveSystem`: the one object game code holds on to
//!
//! Ties the store, the collector and the reconciler together and owns the
//! session values (play time, settings, autosave timer) that end up in
//! every document.

use std::task::Poll;
use tracing::{debug, info, warn};

use super::collector::{self, CollectContext, Collection};
use super::error::{DeleteError, ReconcileError, SaveError, SessionError};
use super::reconciler::{ApplyReport, Reconciler};
use super::store::SaveStore;
use super::types::{GameSettings, SaveSummary, SaveTrigger};
use crate::config::SaveConfig;
use crate::host::SceneHost;
use crate::item::ItemCatalog;

/// Session values waiting for a load to finish
struct PendingSession {
    elapsed_play_time: f64,
    settings: GameSettings,
}

pub struct SaveSystem<'a> {
    catalog: &'a ItemCatalog,
    store: SaveStore,
    reconciler: Reconciler,
    play_time: f64,
    settings: GameSettings,
    /// None when autosave is disabled
    autosave_interval: Option<f64>,
    since_autosave: f64,
    pending: Option<PendingSession>,
}

impl<'a> SaveSystem<'a> {
    pub fn new(config: &SaveConfig, catalog: &'a ItemCatalog) -> Result<Self, SaveError> {
        let store = SaveStore::new(config)?;
        let autosave_interval = config
            .autosave_enabled
            .then(|| config.autosave_interval().as_secs_f64());

        Ok(SaveSystem {
            catalog,
            store,
            reconciler: Reconciler::new(),
            play_time: 0.0,
            settings: GameSettings::default(),
            autosave_interval,
            since_autosave: 0.0,
            pending: None,
        })
    }

    pub fn catalog(&self) -> &ItemCatalog {
        self.catalog
    }

    pub fn store(&self) -> &SaveStore {
        &self.store
    }

    /// Seconds played this session, including time restored from a load
    pub fn play_time(&self) -> f64 {
        self.play_time
    }

    pub fn settings(&self) -> GameSettings {
        self.settings
    }

    pub fn set_settings(&mut self, settings: GameSettings) {
        self.settings = settings;
    }

    pub fn is_loading(&self) -> bool {
        self.reconciler.is_busy()
    }

    /// True if a save file is there to load
    pub fn can_load(&self) -> bool {
        self.store.exists()
    }

    /// Header info of the current save, for menus
    pub fn describe(&self) -> Option<SaveSummary> {
        self.store.describe()
    }

    pub fn delete(&mut self) -> Result<(), DeleteError> {
        self.store.delete()
    }

    /// Collects the scene and writes it out
    ///
    /// Participants that fail to export are skipped and come back in the
    /// returned collection's `failures`.
    pub fn save<H: SceneHost + ?Sized>(&mut self, host: &H, trigger: SaveTrigger) -> Result<Collection, SaveError> {
        let context = CollectContext {
            elapsed_play_time: self.play_time,
            settings: self.settings,
            trigger,
        };

        let collection = collector::collect(host, &context, self.catalog);
        self.store.save(&collection.document)?;

        if trigger == SaveTrigger::Autosave {
            self.since_autosave = 0.0;
        }
        info!(%trigger, warnings = collection.warning_count(), "save finished");
        Ok(collection)
    }

    /// Reads the save file and starts reconciling it
    ///
    /// Drive the pass to completion with `poll_load`, once per tick.
    pub fn begin_load(&mut self) -> Result<(), SessionError> {
        if self.reconciler.is_busy() {
            return Err(ReconcileError::Busy.into());
        }

        let document = self.store.load()?;
        let pending = PendingSession {
            elapsed_play_time: document.elapsed_play_time,
            settings: document.settings,
        };
        self.reconciler.begin(document)?;
        self.pending = Some(pending);
        debug!("load started");
        Ok(())
    }

    /// Advances an in-flight load
    ///
    /// Session values (play time, settings) are only taken from the document
    /// once the world has been rebuilt.
    pub fn poll_load<H: SceneHost + ?Sized>(&mut self, host: &mut H) -> Poll<Result<ApplyReport, SessionError>> {
        let result = match self.reconciler.poll(host, self.catalog) {
            Poll::Pending => return Poll::Pending,
            Poll::Ready(result) => result,
        };

        let pending = self.pending.take();
        match result {
            Ok(report) => {
                if let Some(pending) = pending {
                    self.play_time = pending.elapsed_play_time;
                    self.settings = pending.settings;
                }
                self.since_autosave = 0.0;
                info!(play_time = self.play_time, "game loaded");
                Poll::Ready(Ok(report))
            }
            Err(e) => {
                warn!(error = %e, "load failed");
                Poll::Ready(Err(e.into()))
            }
        }
    }

    /// Adds play time without considering autosave
    pub fn advance_play_time(&mut self, delta_time: f64) {
        if delta_time.is_finite() && delta_time > 0.0 {
            self.play_time += delta_time;
            self.since_autosave += delta_time;
        }
    }

    /// True once enough play time has passed since the last autosave
    pub fn should_autosave(&self) -> bool {
        match self.autosave_interval {
            Some(interval) => self.since_autosave >= interval,
            None => false,
        }
    }

    /// Per-frame hook: counts play time and autosaves when due
    ///
    /// Autosave is held back while a load is being applied. Returns the
    /// autosave result when one was attempted.
    pub fn tick<H: SceneHost + ?Sized>(&mut self, host: &H, delta_time: f64) -> Option<Result<Collection, SaveError>> {
        self.advance_play_time(delta_time);

        if self.is_loading() || !self.should_autosave() {
            return None;
        }

        let result = self.save(host, SaveTrigger::Autosave);
        if let Err(e) = &result {
            warn!(error = %e, "autosave failed");
            // try again after another full interval
            self.since_autosave = 0.0;
        }
        Some(result)
    }
}
