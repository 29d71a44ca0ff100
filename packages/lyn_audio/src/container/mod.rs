//! Contains the LyN container assembler: byte-exact construction of the
//! RIFF/SNS/SON/LySE chunk trees, including the multi-channel interleave
//! layout and beat-chunk splicing.

mod son;
mod sns;

use crate::adpcm;
use crate::beat::BeatChunk;
use crate::config::{ContainerFormat, Extras};
use crate::vorbis;

/// The just-generated audio payload for a channel set, not yet interleaved
/// into the container's `data` chunk.
pub enum Payload {
	/// One already GC-ADPCM-encoded byte stream per channel.
	Dsp(Vec<Vec<u8>>),
	/// One already Vorbis-repackaged byte stream per channel.
	Ogg(Vec<Vec<u8>>)
}

impl Payload {
	fn channel_count(&self) -> usize {
		match self {
			Self::Dsp(channels) | Self::Ogg(channels) => channels.len()
		}
	}

	/// Interleaves the per-channel streams into the bytes that make up the
	/// container's `data` chunk.
	fn interleave(&self) -> Vec<u8> {
		match self {
			Self::Dsp(channels) if channels.len() == 1 => channels[0].clone(),
			Self::Dsp(channels) => adpcm::interleave::interleave(channels),
			Self::Ogg(channels) => {
				let mut sink = crate::progress::NoopProgressSink;
				vorbis::interleave_channels(channels, &mut sink)
			}
		}
	}
}

/// Everything the container assembler needs to emit a finished SNS or SON
/// file.
pub struct AssembleRequest<'a> {
	/// Which outer envelope to emit.
	pub format: ContainerFormat,
	/// The encoded audio, one stream per channel.
	pub payload: Payload,
	/// The sample rate written into the `fmt ` chunk.
	pub sample_rate: u32,
	/// Number of sample frames per channel, written into the `fact` chunk.
	/// This is the frame count of the source audio, not the (possibly
	/// zero-padded) encoded length.
	pub num_samples: u32,
	/// SON-only: if `true`, duplicates a stereo payload's two streams into a
	/// 4-channel WAVEFORMATEXTENSIBLE layout.
	pub four_channel: bool,
	/// SNS-only: selects the Just-Dance prefix or a spliced-in beat chunk.
	pub extras: Extras,
	/// The beat bytes to splice in when `extras` is
	/// [`Extras::CustomBeats`](crate::config::Extras::CustomBeats).
	pub beat_chunk: Option<&'a BeatChunk>
}

/// Writes a chunk: a 4-byte ASCII id, a little-endian `u32` body length, then
/// the body itself.
fn write_chunk(out: &mut Vec<u8>, id: &[u8; 4], body: &[u8]) {
	out.extend_from_slice(id);
	out.extend_from_slice(&(body.len() as u32).to_le_bytes());
	out.extend_from_slice(body);
}

/// The byte-rate written into a DSP `fmt ` chunk. Fixed by `spec.md` §4.5
/// regardless of sample rate or channel count.
const DSP_BYTE_RATE: u32 = 128_000;

fn fmt_dsp_body(channels: u16, sample_rate: u32) -> Vec<u8> {
	let mut body = Vec::with_capacity(18);
	body.extend_from_slice(&0x5050u16.to_le_bytes());
	body.extend_from_slice(&channels.to_le_bytes());
	body.extend_from_slice(&sample_rate.to_le_bytes());
	body.extend_from_slice(&DSP_BYTE_RATE.to_le_bytes());
	body.extend_from_slice(&4u16.to_le_bytes()); // block_align
	body.extend_from_slice(&4u16.to_le_bytes()); // bits_per_sample
	body.extend_from_slice(&0u16.to_le_bytes()); // cb_size
	body
}

fn fmt_ogg_body(channels: u16, sample_rate: u32) -> Vec<u8> {
	let byte_rate = sample_rate * u32::from(channels) * 2;

	let mut body = Vec::with_capacity(18);
	body.extend_from_slice(&0x3156u16.to_le_bytes());
	body.extend_from_slice(&channels.to_le_bytes());
	body.extend_from_slice(&sample_rate.to_le_bytes());
	body.extend_from_slice(&byte_rate.to_le_bytes());
	body.extend_from_slice(&4u16.to_le_bytes()); // block_align
	body.extend_from_slice(&16u16.to_le_bytes()); // bits_per_sample
	body.extend_from_slice(&0u16.to_le_bytes()); // cb_size
	body
}

/// The fixed 16-byte WAVEFORMATEXTENSIBLE subformat GUID tail used by the
/// 4-channel SON `fmt ` chunk.
const SON_4CH_SUBFORMAT: [u8; 16] =
	[0x50, 0x50, 0x00, 0x00, 0x00, 0x00, 0x10, 0x00, 0x80, 0x00, 0x00, 0xAA, 0x00, 0x38, 0x9B, 0x71];

fn fmt_son_4ch_body(sample_rate: u32) -> Vec<u8> {
	let mut body = Vec::with_capacity(0x28);
	body.extend_from_slice(&0xFFFEu16.to_le_bytes());
	body.extend_from_slice(&4u16.to_le_bytes()); // channels
	body.extend_from_slice(&sample_rate.to_le_bytes());
	body.extend_from_slice(&DSP_BYTE_RATE.to_le_bytes());
	body.extend_from_slice(&0u16.to_le_bytes()); // block_align
	body.extend_from_slice(&4u16.to_le_bytes()); // bits_per_sample
	body.extend_from_slice(&0x16u16.to_le_bytes()); // cb_size
	body.extend_from_slice(&0u16.to_le_bytes());
	body.extend_from_slice(&0u32.to_le_bytes());
	body.extend_from_slice(&SON_4CH_SUBFORMAT);
	body
}

fn fact_body(num_samples: u32, p: u32, q: u32) -> Vec<u8> {
	let mut body = Vec::with_capacity(16);
	body.extend_from_slice(&num_samples.to_le_bytes());
	body.extend_from_slice(b"LyN ");
	body.extend_from_slice(&p.to_le_bytes());
	body.extend_from_slice(&q.to_le_bytes());
	body
}

/// The fixed 20-byte Just-Dance `LySE` prefix, SNS-only, never applied to SON.
const JUST_DANCE_PREFIX: [u8; 20] = [
	0x4C, 0x79, 0x53, 0x45, 0x0C, 0x00, 0x00, 0x00, 0x00, 0x00, 0x00, 0x00, 0x0C, 0x00, 0x00, 0x00, 0x1F, 0x00, 0x00,
	0x00
];

/// Assembles a finished SNS or SON container file, per `request.format`.
pub fn assemble(request: AssembleRequest<'_>) -> Vec<u8> {
	match request.format {
		ContainerFormat::Sns => sns::assemble(request),
		ContainerFormat::Son => son::assemble(request)
	}
}
