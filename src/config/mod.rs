//! Monitor configuration: the beans file and runtime settings.

mod groups;
mod settings;

pub use groups::{load_groups, parse_group_token, parse_groups};
pub use settings::{
    DEFAULT_BEANS_FILE, DEFAULT_ENDPOINT, DEFAULT_INTERVAL_SECS, DEFAULT_PROC_PATH,
    DEFAULT_TIMEOUT_SECS, MonitorSettings,
};
