//! Contains the beat harvester: copies the `cue ` .. `data` byte range out of
//! a reference SNS file, for splicing into a later container assembly.

use log::debug;

use crate::error::ConversionError;

/// A beat-marker byte range harvested from a reference SNS file, held
/// explicitly by the caller and passed into [`container::assemble`] rather
/// than stored in global state.
///
/// [`container::assemble`]: crate::container::assemble
#[derive(Debug, Clone)]
pub struct BeatChunk {
	/// The verbatim bytes spanning the `cue ` chunk's id through just before
	/// the reference file's `data` chunk.
	pub bytes: Vec<u8>,
	/// The `u32 LE` cue-point count read from the `cue ` chunk's own body,
	/// kept for diagnostic reporting.
	pub cue_count: u32
}

/// Scans `sns_bytes` for the first `cue ` chunk, then for the following
/// `data` chunk magic, and returns a [`BeatChunk`] spanning the bytes between
/// them (inclusive of the `cue ` chunk's own id, size, and body).
///
/// Returns [`ConversionError::InputInvalid`] if no `cue ` chunk is found, or
/// if no `data` magic follows it.
pub fn extract_beats_from_sns(sns_bytes: &[u8]) -> Result<BeatChunk, ConversionError> {
	let cue_pos = find_subslice(sns_bytes, b"cue ")
		.ok_or_else(|| ConversionError::InputInvalid("reference file has no 'cue ' chunk".to_string()))?;

	let chunk_size_start = cue_pos + 4;
	let chunk_size_bytes = sns_bytes
		.get(chunk_size_start..chunk_size_start + 4)
		.ok_or_else(|| ConversionError::InputInvalid("'cue ' chunk is truncated".to_string()))?;
	let chunk_size = u32::from_le_bytes(chunk_size_bytes.try_into().unwrap());

	let cue_count_start = chunk_size_start + 4;
	let cue_count_bytes = sns_bytes
		.get(cue_count_start..cue_count_start + 4)
		.ok_or_else(|| ConversionError::InputInvalid("'cue ' chunk body is truncated".to_string()))?;
	let cue_count = u32::from_le_bytes(cue_count_bytes.try_into().unwrap());

	let search_start = cue_pos + 8 + chunk_size as usize;
	let data_pos = find_subslice(sns_bytes.get(search_start..).unwrap_or(&[]), b"data")
		.map(|offset| search_start + offset)
		.ok_or_else(|| ConversionError::InputInvalid("no 'data' chunk found after 'cue '".to_string()))?;

	debug!("harvested beat chunk: {} bytes, {} cue points", data_pos - cue_pos, cue_count);

	Ok(BeatChunk { bytes: sns_bytes[cue_pos..data_pos].to_vec(), cue_count })
}

fn find_subslice(haystack: &[u8], needle: &[u8]) -> Option<usize> {
	haystack.windows(needle.len()).position(|window| window == needle)
}

#[cfg(test)]
mod test {
	use super::*;

	fn build_reference_sns(cue_body: &[u8], trailer_before_data: &[u8]) -> Vec<u8> {
		let mut out = Vec::new();
		out.extend_from_slice(b"RIFF");
		out.extend_from_slice(&0u32.to_le_bytes());
		out.extend_from_slice(b"WAVE");
		out.extend_from_slice(b"cue ");
		out.extend_from_slice(&(cue_body.len() as u32).to_le_bytes());
		out.extend_from_slice(cue_body);
		out.extend_from_slice(trailer_before_data);
		out.extend_from_slice(b"data");
		out.extend_from_slice(&4u32.to_le_bytes());
		out.extend_from_slice(&[0u8; 4]);
		out
	}

	#[test_log::test]
	fn extracts_exact_cue_to_data_byte_range() {
		let mut cue_body = Vec::new();
		cue_body.extend_from_slice(&3u32.to_le_bytes());
		cue_body.extend_from_slice(&[0u8; 20]);

		let input = build_reference_sns(&cue_body, b"");
		let chunk = extract_beats_from_sns(&input).unwrap();

		let cue_pos = find_subslice(&input, b"cue ").unwrap();
		let data_pos = find_subslice(&input, b"data").unwrap();
		assert_eq!(chunk.bytes, input[cue_pos..data_pos]);
		assert_eq!(chunk.cue_count, 3);
	}

	#[test]
	fn tolerates_bytes_between_cue_chunk_and_data_chunk() {
		let mut cue_body = Vec::new();
		cue_body.extend_from_slice(&1u32.to_le_bytes());
		cue_body.extend_from_slice(&[0u8; 8]);

		let input = build_reference_sns(&cue_body, b"LIST\x04\x00\x00\x00abcd");
		let chunk = extract_beats_from_sns(&input).unwrap();

		assert!(chunk.bytes.ends_with(b"LIST\x04\x00\x00\x00abcd"));
	}

	#[test]
	fn reports_failure_when_no_cue_chunk_is_present() {
		let input = b"RIFF\x00\x00\x00\x00WAVEdata\x00\x00\x00\x00".to_vec();
		let result = extract_beats_from_sns(&input);
		assert!(matches!(result, Err(ConversionError::InputInvalid(_))));
	}

	#[test]
	fn reports_failure_when_no_data_chunk_follows_cue() {
		let mut cue_body = Vec::new();
		cue_body.extend_from_slice(&0u32.to_le_bytes());
		cue_body.extend_from_slice(&[0u8; 4]);

		let mut input = Vec::new();
		input.extend_from_slice(b"RIFF\x00\x00\x00\x00WAVE");
		input.extend_from_slice(b"cue ");
		input.extend_from_slice(&(cue_body.len() as u32).to_le_bytes());
		input.extend_from_slice(&cue_body);

		let result = extract_beats_from_sns(&input);
		assert!(matches!(result, Err(ConversionError::InputInvalid(_))));
	}
}
