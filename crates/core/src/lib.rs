pub mod config;
pub mod error;
pub mod job;
pub mod loader;
pub mod queue;
pub mod record;

pub use config::{load_dotenv, DispatcherConfig};
pub use error::{BatchError, Result};
pub use job::JobSpec;
pub use loader::{
    load_dispatch_list, parse_dispatch_bytes, parse_dispatch_list, DispatchList, MalformedEntry,
};
pub use queue::RecordQueue;
pub use record::{ProcessRecord, ProcessState, ProcessTable, RecordId, Ticks, WorkerHandle};
