pub mod recorder;

pub use recorder::{RecordedWatch, WEBHOOK_TAGS, WatchRecorder};
