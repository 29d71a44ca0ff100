//! Contains the DSP channel interleaver: frame-wise interleave of 2 or 4
//! ADPCM byte streams at 8-byte granularity.

use super::FRAME_SIZE;

/// Interleaves 2 or 4 already GC-ADPCM-encoded channel byte streams at
/// 8-byte-block granularity: block `b` of the output is the concatenation of
/// bytes `[8b, 8b+8)` from each channel, in order.
///
/// Every input stream must already be a whole number of 8-byte frames.
/// Streams shorter than the longest one are treated as right-padded with zero
/// *bytes* (not zero-valued frames) up to the maximum length.
///
/// # Panics
///
/// Panics if `channels.len()` is not 2 or 4, or if any stream's length is not
/// a multiple of [`FRAME_SIZE`].
pub fn interleave(channels: &[Vec<u8>]) -> Vec<u8> {
	assert!(
		channels.len() == 2 || channels.len() == 4,
		"DSP interleaving supports only 2 or 4 channels, got {}",
		channels.len()
	);
	for channel in channels {
		assert_eq!(channel.len() % FRAME_SIZE, 0, "channel length must be a whole number of ADPCM frames");
	}

	let max_len = channels.iter().map(Vec::len).max().unwrap_or(0);
	let block_count = max_len / FRAME_SIZE;

	let mut out = Vec::with_capacity(max_len * channels.len());
	for block in 0..block_count {
		let start = block * FRAME_SIZE;
		for channel in channels {
			match channel.get(start..start + FRAME_SIZE) {
				Some(slice) => out.extend_from_slice(slice),
				None => out.extend(std::iter::repeat(0u8).take(FRAME_SIZE))
			}
		}
	}

	out
}

#[cfg(test)]
mod test {
	use super::*;

	#[test]
	fn stereo_interleave_produces_expected_block_order() {
		let left = vec![0xAAu8; FRAME_SIZE * 2];
		let right = vec![0xBBu8; FRAME_SIZE * 2];

		let out = interleave(&[left.clone(), right.clone()]);

		assert_eq!(out.len(), FRAME_SIZE * 4);
		assert_eq!(&out[0..FRAME_SIZE], &left[0..FRAME_SIZE]);
		assert_eq!(&out[FRAME_SIZE..FRAME_SIZE * 2], &right[0..FRAME_SIZE]);
		assert_eq!(&out[FRAME_SIZE * 2..FRAME_SIZE * 3], &left[FRAME_SIZE..]);
		assert_eq!(&out[FRAME_SIZE * 3..], &right[FRAME_SIZE..]);
	}

	#[test]
	fn shorter_channel_is_padded_with_zero_bytes() {
		let left = vec![0xFFu8; FRAME_SIZE * 2];
		let right = vec![0xFFu8; FRAME_SIZE];

		let out = interleave(&[left, right]);

		assert_eq!(out.len(), FRAME_SIZE * 4);
		// Second block's right-channel slot must be zero padding, not a zero-valued frame.
		assert_eq!(&out[FRAME_SIZE * 3..], &[0u8; FRAME_SIZE][..]);
	}

	#[test]
	fn four_channel_duplicates_stereo_for_son() {
		let left = vec![0x11u8; FRAME_SIZE];
		let right = vec![0x22u8; FRAME_SIZE];

		let out = interleave(&[left.clone(), right.clone(), left.clone(), right.clone()]);

		assert_eq!(out.len(), FRAME_SIZE * 4);
		assert_eq!(&out[0..FRAME_SIZE], &left[..]);
		assert_eq!(&out[FRAME_SIZE..FRAME_SIZE * 2], &right[..]);
		assert_eq!(&out[FRAME_SIZE * 2..FRAME_SIZE * 3], &left[..]);
		assert_eq!(&out[FRAME_SIZE * 3..], &right[..]);
	}

	#[test]
	#[should_panic]
	fn rejects_unsupported_channel_counts() {
		let _ = interleave(&[vec![0u8; FRAME_SIZE]; 3]);
	}
}
