mod reader;
mod record;

pub use reader::{HistoryReader, read_history};
pub use record::{EpisodeRecord, FIELD_COUNT, FIELD_DELIMITER};
