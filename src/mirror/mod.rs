mod link;
mod naming;

pub use link::{CleanupReport, MirrorSync, PublishReport, partition_existing};
pub use naming::{FEED_EXTENSION, feed_file_name, is_plain_entry_name, mirror_dir_name};
