//! `lyn_audio` converts standard 16-bit PCM WAV audio into the proprietary audio
//! container used by Ubisoft's LyN game engine (as shipped in the Rabbids Go Home
//! family of titles): a RIFF-framed stream carrying either Nintendo GameCube ADPCM
//! ("DSP") or multiplexed Vorbis ("OGG") payloads, wrapped in either an SNS or a
//! SON container.
//!
//! # Entry point
//!
//! [`convert`] is the recommended entry point: it sequences WAV parsing, optional
//! external preprocessing, audio encoding, container assembly, and an atomic write
//! of the destination file. Lower-level building blocks ([`adpcm`], [`vorbis`],
//! [`container`]) are exposed for advanced use cases, such as driving the encoder
//! over audio that didn't come from a WAV file.
//!
//! # What this crate does not do
//!
//! This crate does not decode LyN files back into PCM, does not resample audio
//! (that is delegated to an external `ffmpeg` invocation, see [`preprocess`]), and
//! does not synthesize beat-marker data — it can only copy pre-existing beat bytes
//! out of a reference SNS file (see [`beat`]). It also makes no attempt at
//! streaming or constant-memory operation: inputs are expected to fit in memory.
//!
//! # Logging
//!
//! This crate uses the [`log`](https://crates.io/crates/log) crate for logging
//! status and diagnostic messages. Executables can customize the verbosity of
//! this logging, and even compile it out, [as explained in the `log` crate
//! documentation](https://docs.rs/log).

#![forbid(unsafe_code)]
#![deny(clippy::print_stdout)]
#![warn(missing_docs)]
#![warn(unreachable_pub)]
#![warn(clippy::use_self)]

pub mod adpcm;
pub mod beat;
pub mod config;
pub mod container;
mod convert;
mod error;
pub mod preprocess;
pub mod progress;
pub mod vorbis;
mod wav;

pub use beat::BeatChunk;
pub use config::{Codec, Config, ContainerFormat, Extras};
pub use convert::convert;
pub use error::ConversionError;
pub use wav::PcmSource;

/// A text tag that precisely identifies this `lyn_audio` build.
pub static LYN_AUDIO_VERSION_TAG: &str = concat!(
	"lyn_audio ",
	env!("CARGO_PKG_VERSION"),
	env!("LYN_AUDIO_BUILD_DATE_VERSION_SUFFIX")
);
