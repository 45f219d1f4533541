//! Editor session: a draft of the settings record bound to an edit form.
//!
//! The session keeps the last loaded record (`canonical`) and the operator's
//! working copy (`draft`) side by side, plus a [`SessionStatus`]. It never
//! touches the repository's cached value; changes reach the store only
//! through [`EditorSession::save`].
//!
//! Loads and saves are split into `begin_*`/`*_finish` halves so a caller
//! driving its own event loop can keep editing while a request is in flight.
//! Each half is matched by a ticket; results carrying an outdated ticket are
//! ignored.
//!
//! ```text
//! Loading --apply_load--> Ready --begin_save--> Saving --finish_save(Ok)--> Ready
//!                                                  \--finish_save(Err)--> Failed
//! Failed --begin_save--> Saving        Failed --apply_load--> Ready
//! Saving --abandon_save--> Failed
//! ```
//!
//! A caller that drops a [`SaveTicket`] without finishing it must call
//! [`EditorSession::abandon_save`]; [`EditorSession::save`] does so itself
//! when its future is dropped.

use tracing::{debug, instrument, warn};

use dreamtrade_core::{FieldError, FieldValue, SettingsField, SiteSettings};

use super::repository::{SettingsError, SettingsRepository};

/// Lifecycle state of an editor session.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SessionStatus {
    /// A load is in flight.
    Loading,
    /// The draft is editable and no save is running.
    Ready,
    /// A save is in flight. Edits are still accepted.
    Saving,
    /// The last save failed. The draft still holds the unsaved edits.
    Failed {
        /// Description of the failure.
        message: String,
    },
}

/// Errors returned by editor session operations.
#[derive(Debug, thiserror::Error)]
pub enum SessionError {
    /// No record has been loaded into the session yet.
    #[error("settings have not been loaded yet")]
    NotLoaded,

    /// A save for this session is already running.
    #[error("a save is already in progress")]
    SaveInFlight,

    /// The field assignment was rejected.
    #[error(transparent)]
    Field(#[from] FieldError),

    /// The repository failed to persist the draft.
    #[error(transparent)]
    Save(#[from] SettingsError),
}

/// Token for one in-flight load.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[must_use]
pub struct LoadTicket(u64);

/// Token for one in-flight save, carrying the draft snapshot being written.
#[derive(Debug, Clone)]
#[must_use]
pub struct SaveTicket {
    seq: u64,
    record: SiteSettings,
}

impl SaveTicket {
    /// The record this save writes.
    #[must_use]
    pub const fn record(&self) -> &SiteSettings {
        &self.record
    }
}

/// An operator's edit session over the site settings.
#[derive(Debug, Clone)]
pub struct EditorSession {
    canonical: Option<SiteSettings>,
    draft: SiteSettings,
    status: SessionStatus,
    load_seq: u64,
    save_seq: u64,
}

impl Default for EditorSession {
    fn default() -> Self {
        Self::new()
    }
}

impl EditorSession {
    /// Create a session awaiting its first load.
    #[must_use]
    pub fn new() -> Self {
        Self {
            canonical: None,
            draft: SiteSettings::default(),
            status: SessionStatus::Loading,
            load_seq: 0,
            save_seq: 0,
        }
    }

    /// Create a session and load the current settings into it.
    pub async fn open(repo: &SettingsRepository) -> Self {
        let mut session = Self::new();
        session.reload(repo).await;
        session
    }

    // =========================================================================
    // Queries
    // =========================================================================

    /// Current status.
    #[must_use]
    pub const fn status(&self) -> &SessionStatus {
        &self.status
    }

    /// The working copy.
    #[must_use]
    pub const fn draft(&self) -> &SiteSettings {
        &self.draft
    }

    /// The most recently loaded or saved record.
    #[must_use]
    pub const fn canonical(&self) -> Option<&SiteSettings> {
        self.canonical.as_ref()
    }

    /// Message of the last failed save, while the session is `Failed`.
    #[must_use]
    pub fn last_error(&self) -> Option<&str> {
        match &self.status {
            SessionStatus::Failed { message } => Some(message),
            _ => None,
        }
    }

    /// Whether the draft differs from the canonical record.
    #[must_use]
    pub fn is_dirty(&self) -> bool {
        self.canonical
            .as_ref()
            .is_some_and(|canonical| canonical != &self.draft)
    }

    /// Fields whose draft value differs from the canonical record.
    #[must_use]
    pub fn dirty_fields(&self) -> Vec<SettingsField> {
        self.canonical
            .as_ref()
            .map(|canonical| self.draft.changed_fields(canonical))
            .unwrap_or_default()
    }

    // =========================================================================
    // Loading
    // =========================================================================

    /// Start a load. Any earlier load still in flight becomes stale.
    pub fn begin_load(&mut self) -> LoadTicket {
        self.load_seq += 1;
        if self.status != SessionStatus::Saving {
            self.status = SessionStatus::Loading;
        }
        LoadTicket(self.load_seq)
    }

    /// Apply a loaded record.
    ///
    /// Replaces both the canonical record and the draft, discarding unsaved
    /// edits. Returns `false` if the ticket was superseded or a save is in
    /// flight, in which case nothing changes: the record may predate the
    /// write, and the save outcome decides the canonical record.
    pub fn apply_load(&mut self, ticket: LoadTicket, record: SiteSettings) -> bool {
        if ticket.0 != self.load_seq {
            debug!(ticket = ticket.0, latest = self.load_seq, "discarding stale load");
            return false;
        }
        if self.status == SessionStatus::Saving {
            debug!(ticket = ticket.0, "discarding load that overlaps a save");
            return false;
        }
        if self.is_dirty() {
            debug!(fields = ?self.dirty_fields(), "reload discards unsaved edits");
        }

        self.draft = record.clone();
        self.canonical = Some(record);
        self.status = SessionStatus::Ready;
        true
    }

    /// Load the current settings from the repository into the session.
    #[instrument(skip_all)]
    pub async fn reload(&mut self, repo: &SettingsRepository) {
        let ticket = self.begin_load();
        let record = repo.load().await;
        self.apply_load(ticket, record);
    }

    // =========================================================================
    // Editing
    // =========================================================================

    /// Replace one draft field, by wire name.
    ///
    /// # Errors
    ///
    /// Returns `SessionError::NotLoaded` before the first load, and
    /// `SessionError::Field` for unknown fields or values that do not fit the
    /// field. The draft is unchanged on error.
    pub fn set_field(&mut self, name: &str, value: impl Into<FieldValue>) -> Result<(), SessionError> {
        let field: SettingsField = name.parse()?;
        self.set(field, value)
    }

    /// Replace one draft field.
    ///
    /// # Errors
    ///
    /// See [`EditorSession::set_field`].
    pub fn set(&mut self, field: SettingsField, value: impl Into<FieldValue>) -> Result<(), SessionError> {
        if self.canonical.is_none() {
            return Err(SessionError::NotLoaded);
        }
        self.draft.set(field, value.into())?;
        debug!(field = field.name(), "draft field updated");
        Ok(())
    }

    /// Put one draft field back to its canonical value.
    ///
    /// # Errors
    ///
    /// Returns `SessionError::NotLoaded` before the first load.
    pub fn revert_field(&mut self, field: SettingsField) -> Result<(), SessionError> {
        let canonical = self.canonical.as_ref().ok_or(SessionError::NotLoaded)?;
        self.draft.set(field, canonical.get(field))?;
        Ok(())
    }

    /// Discard every unsaved edit.
    ///
    /// # Errors
    ///
    /// Returns `SessionError::NotLoaded` before the first load.
    pub fn discard_changes(&mut self) -> Result<(), SessionError> {
        let canonical = self.canonical.as_ref().ok_or(SessionError::NotLoaded)?;
        self.draft = canonical.clone();
        Ok(())
    }

    // =========================================================================
    // Saving
    // =========================================================================

    /// Start a save of the current draft.
    ///
    /// Loads still in flight become stale: their results predate this write.
    ///
    /// # Errors
    ///
    /// Returns `SessionError::NotLoaded` before the first load and
    /// `SessionError::SaveInFlight` while another save is running.
    pub fn begin_save(&mut self) -> Result<SaveTicket, SessionError> {
        if self.canonical.is_none() {
            return Err(SessionError::NotLoaded);
        }
        if self.status == SessionStatus::Saving {
            return Err(SessionError::SaveInFlight);
        }

        self.save_seq += 1;
        self.load_seq += 1;
        self.status = SessionStatus::Saving;
        Ok(SaveTicket {
            seq: self.save_seq,
            record: self.draft.clone(),
        })
    }

    /// Record the outcome of a save.
    ///
    /// On success the saved record becomes canonical and every load issued
    /// before this point becomes stale; on failure the session moves to
    /// `Failed`. The draft is left as-is either way. Outcomes of a superseded
    /// ticket are returned without touching the session.
    ///
    /// # Errors
    ///
    /// Returns `SessionError::Save` when the save failed.
    pub fn finish_save(
        &mut self,
        ticket: SaveTicket,
        result: Result<SiteSettings, SettingsError>,
    ) -> Result<SiteSettings, SessionError> {
        if ticket.seq != self.save_seq {
            debug!(ticket = ticket.seq, latest = self.save_seq, "discarding stale save outcome");
            return result.map_err(SessionError::from);
        }

        match result {
            Ok(saved) => {
                self.load_seq += 1;
                self.canonical = Some(saved.clone());
                self.status = SessionStatus::Ready;
                Ok(saved)
            }
            Err(e) => {
                warn!(error = %e, "settings save failed, keeping draft");
                self.status = SessionStatus::Failed {
                    message: e.to_string(),
                };
                Err(e.into())
            }
        }
    }

    /// Save the draft through the repository.
    ///
    /// # Errors
    ///
    /// Returns the errors of [`EditorSession::begin_save`] and
    /// [`EditorSession::finish_save`].
    #[instrument(skip_all)]
    pub async fn save(&mut self, repo: &SettingsRepository) -> Result<SiteSettings, SessionError> {
        let ticket = self.begin_save()?;
        let record = ticket.record().clone();
        let pending = PendingSave {
            seq: ticket.seq,
            session: self,
        };
        let result = repo.save(record).await;
        pending.finish(ticket, result)
    }

    /// Give up on the save in flight.
    ///
    /// The session moves to `Failed` with the draft intact, and a late
    /// [`finish_save`](Self::finish_save) for the abandoned ticket is ignored.
    /// Whether the write reached the store is unknown, so loads issued before
    /// this call become stale. Returns `false` if no save was in flight.
    pub fn abandon_save(&mut self) -> bool {
        self.abandon(self.save_seq)
    }

    fn abandon(&mut self, seq: u64) -> bool {
        if self.status != SessionStatus::Saving || seq != self.save_seq {
            return false;
        }
        warn!(ticket = seq, "settings save abandoned before completion");
        self.save_seq += 1;
        self.load_seq += 1;
        self.status = SessionStatus::Failed {
            message: "save abandoned before completion".to_string(),
        };
        true
    }
}

/// A save started by [`EditorSession::save`]; abandons it if dropped unfinished.
struct PendingSave<'a> {
    seq: u64,
    session: &'a mut EditorSession,
}

impl PendingSave<'_> {
    fn finish(
        mut self,
        ticket: SaveTicket,
        result: Result<SiteSettings, SettingsError>,
    ) -> Result<SiteSettings, SessionError> {
        self.session.finish_save(ticket, result)
    }
}

impl Drop for PendingSave<'_> {
    fn drop(&mut self) {
        self.session.abandon(self.seq);
    }
}
