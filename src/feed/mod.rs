mod channel;
mod item;
mod tags;

pub use channel::{AssembledFeed, ChannelInfo, FeedContext, assemble_feed, reference_build_time};
pub use item::{
    EnclosureInfo, FeedItem, build_item, episode_title, mime_type_for, pad_number, public_url,
    read_summary, sequence_key,
};
pub use tags::{Mp4TagReader, NoTags, TagReader};
