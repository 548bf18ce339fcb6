pub mod config;
pub mod error;
pub mod latest;
pub mod signal;
pub mod storage;

pub use config::{AppConfig, TOKEN_STORAGE_KEY};
pub use error::{Error, Result, ValidationError};
pub use latest::{Latest, LoadOutcome, LoadStatus};
pub use signal::{RefreshSignal, Sequencer, Ticket};
pub use storage::{FileStore, KeyValueStore, MemoryStore, SharedStore};
