//! Contains the Vorbis block interleaver: pads each channel's repackaged
//! Vorbis stream to a multiple of [`BLOCK_SIZE`] bytes and round-robin
//! concatenates fixed-size blocks across channels.

use crate::progress::ProgressSink;

/// The fixed interleave stride, in bytes, at which multi-channel Vorbis
/// payloads are multiplexed inside an SNS/SON `data` chunk.
pub const BLOCK_SIZE: usize = 0x2134;

/// Interleaves `channels` Vorbis byte streams into one payload:
///
/// - A header: `u32 LE` [`BLOCK_SIZE`], then one `u32 LE` logical length per
///   channel (the channel's length *before* zero-padding).
/// - For block `b = 0..M` and channel `c = 0..C`, exactly [`BLOCK_SIZE`]
///   bytes from channel `c`'s zero-padded stream starting at `b * BLOCK_SIZE`,
///   where `M` is the block count of the longest (padded) channel.
pub fn interleave(channels: &[Vec<u8>], progress: &mut dyn ProgressSink) -> Vec<u8> {
	let channel_count = channels.len();
	let logical_lengths: Vec<u32> = channels.iter().map(|c| c.len() as u32).collect();
	let block_count = channels.iter().map(|c| c.len().div_ceil(BLOCK_SIZE)).max().unwrap_or(0);

	let mut out = Vec::with_capacity(4 + 4 * channel_count + block_count * channel_count * BLOCK_SIZE);
	out.extend_from_slice(&(BLOCK_SIZE as u32).to_le_bytes());
	for &len in &logical_lengths {
		out.extend_from_slice(&len.to_le_bytes());
	}

	for block in 0..block_count {
		let start = block * BLOCK_SIZE;
		for (channel_index, channel) in channels.iter().enumerate() {
			let end = start + BLOCK_SIZE;
			match channel.get(start..end) {
				Some(slice) => out.extend_from_slice(slice),
				None => {
					let available = channel.get(start..).unwrap_or(&[]);
					out.extend_from_slice(available);
					out.extend(std::iter::repeat(0u8).take(BLOCK_SIZE - available.len()));
				}
			}
			progress.vorbis_channel_interleaved(channel_index, channel_count);
		}
	}

	out
}

#[cfg(test)]
mod test {
	use super::*;
	use crate::progress::NoopProgressSink;

	#[test]
	fn header_carries_block_size_and_logical_lengths() {
		let mut sink = NoopProgressSink;
		let a = vec![1u8; 100];
		let b = vec![2u8; 200];

		let out = interleave(&[a, b], &mut sink);

		assert_eq!(u32::from_le_bytes(out[0..4].try_into().unwrap()) as usize, BLOCK_SIZE);
		assert_eq!(u32::from_le_bytes(out[4..8].try_into().unwrap()), 100);
		assert_eq!(u32::from_le_bytes(out[8..12].try_into().unwrap()), 200);
	}

	#[test]
	fn blocks_round_robin_across_channels_with_zero_padding() {
		let mut sink = NoopProgressSink;
		let a = vec![0xAAu8; BLOCK_SIZE + 10];
		let b = vec![0xBBu8; BLOCK_SIZE];

		let out = interleave(&[a, b], &mut sink);
		let header_len = 4 + 4 * 2;

		let block0_a = &out[header_len..header_len + BLOCK_SIZE];
		let block0_b = &out[header_len + BLOCK_SIZE..header_len + 2 * BLOCK_SIZE];
		let block1_a = &out[header_len + 2 * BLOCK_SIZE..header_len + 3 * BLOCK_SIZE];
		let block1_b = &out[header_len + 3 * BLOCK_SIZE..header_len + 4 * BLOCK_SIZE];

		assert!(block0_a.iter().all(|&b| b == 0xAA));
		assert!(block0_b.iter().all(|&b| b == 0xBB));
		assert!(block1_a[..10].iter().all(|&b| b == 0xAA));
		assert!(block1_a[10..].iter().all(|&b| b == 0));
		assert!(block1_b.iter().all(|&b| b == 0));
	}

	#[test]
	fn deinterleave_recovers_padded_channel_stream() {
		let mut sink = NoopProgressSink;
		let a = vec![1u8; 5];
		let b = vec![2u8; BLOCK_SIZE];
		let c = vec![3u8; 3];

		let out = interleave(&[a.clone(), b.clone(), c.clone()], &mut sink);
		let header_len = 4 + 4 * 3;
		let body = &out[header_len..];

		let channel_count = 3;
		for (index, padded) in [a, b, c].into_iter().enumerate() {
			let mut recovered = Vec::new();
			let mut offset = index * BLOCK_SIZE;
			while offset < body.len() {
				recovered.extend_from_slice(&body[offset..offset + BLOCK_SIZE]);
				offset += channel_count * BLOCK_SIZE;
			}
			let mut expected = padded;
			expected.resize(expected.len().div_ceil(BLOCK_SIZE) * BLOCK_SIZE, 0);
			assert_eq!(recovered, expected);
		}
	}
}
