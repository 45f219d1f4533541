//! Site settings persistence and editing.
//!
//! - [`store`] - Key-value stores holding the raw settings payload
//! - [`cache`] - Process-wide cache of merged records
//! - [`repository`] - Load/save with merge-with-defaults and cache invalidation
//! - [`session`] - Draft-vs-canonical editing with load/save status
//!
//! ```text
//! SettingsRepository::load() --> EditorSession draft --set_field--> draft
//!        ^                                                            |
//!        |                                                 EditorSession::save()
//!   cache invalidated <-- SettingsStore::set() <-- SettingsRepository::save()
//! ```

pub mod cache;
pub mod repository;
pub mod session;
pub mod store;

pub use cache::SettingsCache;
pub use repository::{DEFAULT_SETTINGS_KEY, SettingsError, SettingsRepository};
pub use session::{EditorSession, LoadTicket, SaveTicket, SessionError, SessionStatus};
pub use store::{MemoryStore, PgSettingsStore, SettingsStore, StoreError};
