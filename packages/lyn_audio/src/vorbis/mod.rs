//! Contains the Vorbis stream re-packager: parsing, vendor-string editing, and
//! re-emitting of Ogg bitstreams with correct page segmentation and CRC-32,
//! plus the fixed-block multi-channel interleaver used when encapsulating
//! Vorbis payloads in a LyN container.

mod crc;
pub mod interleave;
mod ogg_page;
pub mod repackager;

pub use interleave::{interleave as interleave_channels, BLOCK_SIZE};
pub use ogg_page::OggPage;
pub use repackager::repackage;
