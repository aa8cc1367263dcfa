//! Well-known top-level keys of the settings blob.

/// Per-module settings: module id → setting key → value.
pub const SETTINGS: &str = "settings";

/// Per-module enabled flags: module id → bool.
pub const MODULE_STATES: &str = "moduleStates";

/// Primary API credential; never exported.
pub const API_TOKEN: &str = "apiToken";

/// Raises the log filter to `debug` when `true`.
pub const VERBOSE_LOGGING: &str = "verboseLogging";

/// Metadata attached to exported backups.
pub const BACKUP_META: &str = "alextrasMeta";
