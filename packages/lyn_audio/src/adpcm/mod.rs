//! Contains the GC-ADPCM (Nintendo GameCube "DSP") encoder: a 4-bit adaptive
//! predictive codec that packs 14 decoded samples into an 8-byte frame, with a
//! per-frame coefficient-and-scale search that minimises reconstruction error
//! under exact fixed-point feedback semantics.
//!
//! [`Encoder`] is the container-agnostic building block; [`encode`] is a
//! convenience wrapper for encoding a single channel end to end.

pub mod interleave;

use crate::progress::ProgressSink;

/// Number of decoded samples packed into one ADPCM frame.
pub const SAMPLES_PER_FRAME: usize = 14;
/// Size, in bytes, of one encoded ADPCM frame.
pub const FRAME_SIZE: usize = 8;

/// The eight fixed `(c1, c2)` coefficient pairs of the canonical
/// vgmstream-derived LyN coefficient table, as signed 16-bit integers. This is
/// the "hex-form" table pinned as authoritative; see `DESIGN.md` for why the
/// alternate "decimal-looking" table found in some references is not used.
pub const COEFFICIENTS: [(i32, i32); 8] = [
	(0x04AB, i16_from_hex(0xFCED)),
	(0x0789, i16_from_hex(0xFEDF)),
	(0x09A2, i16_from_hex(0xFAE5)),
	(0x0C90, i16_from_hex(0xFAC1)),
	(0x084D, i16_from_hex(0xFAA4)),
	(0x0982, i16_from_hex(0xFDF7)),
	(0x0AF6, i16_from_hex(0xFAFA)),
	(0x0BE6, i16_from_hex(0xFBF5))
];

const fn i16_from_hex(v: u16) -> i32 {
	v as i16 as i32
}

/// Number of candidate scale exponents tried per frame (`0..=12`).
const MAX_SCALE: u32 = 12;

/// Per-channel GC-ADPCM encoder state. Carries the two 32-bit signed history
/// samples across frames; never share one instance between channels.
#[derive(Debug, Default, Clone, Copy)]
pub struct Encoder {
	h1: i32,
	h2: i32
}

/// The result of encoding a single frame: the emitted bytes and the updated
/// encoder history that the next frame must continue from.
struct FrameResult {
	bytes: [u8; FRAME_SIZE],
	h1: i32,
	h2: i32,
	sum_squared_error: i64
}

impl Encoder {
	/// Creates an encoder with both history samples initialized to zero, as
	/// required at the start of a channel's stream.
	pub fn new() -> Self {
		Self::default()
	}

	/// Encodes `samples` into `ceil(samples.len() / 14) * 8` bytes. Input
	/// shorter than a frame boundary is right-padded with zero samples; the
	/// padding samples participate in encoding but their reconstruction error
	/// is irrelevant.
	///
	/// `progress` is invoked once per emitted frame.
	pub fn encode(&mut self, samples: &[i16], progress: &mut dyn ProgressSink) -> Vec<u8> {
		let frame_count = samples.len().div_ceil(SAMPLES_PER_FRAME);
		let mut out = Vec::with_capacity(frame_count * FRAME_SIZE);

		let mut padded_frame = [0i16; SAMPLES_PER_FRAME];
		for (frame_index, chunk) in samples.chunks(SAMPLES_PER_FRAME).enumerate() {
			padded_frame[..chunk.len()].copy_from_slice(chunk);
			padded_frame[chunk.len()..].fill(0);

			let result = self.encode_frame(&padded_frame);
			out.extend_from_slice(&result.bytes);
			self.h1 = result.h1;
			self.h2 = result.h2;

			progress.adpcm_frame_encoded(frame_index, frame_count);
		}

		out
	}

	/// Returns the total sum-of-squared reconstruction error the encoder would
	/// accumulate if [`Self::encode`] were called on `samples`, without
	/// mutating `self`. Used by tests asserting coefficient optimality.
	#[cfg(test)]
	fn total_sum_squared_error(&self, samples: &[i16]) -> i64 {
		let mut encoder = *self;
		let mut total = 0i64;
		let mut padded_frame = [0i16; SAMPLES_PER_FRAME];
		for chunk in samples.chunks(SAMPLES_PER_FRAME) {
			padded_frame[..chunk.len()].copy_from_slice(chunk);
			padded_frame[chunk.len()..].fill(0);
			let result = encoder.encode_frame(&padded_frame);
			total += result.sum_squared_error;
			encoder.h1 = result.h1;
			encoder.h2 = result.h2;
		}
		total
	}

	/// Encodes exactly one frame of [`SAMPLES_PER_FRAME`] samples, searching
	/// over all eight coefficient pairs and, for each, the smallest scale that
	/// fits the ideal-predictor residual, then picking the pair/scale
	/// combination with the lowest simulated sum-of-squared error. Ties are
	/// broken by the lowest coefficient index, since coefficients are tried
	/// in order and a later candidate only replaces the best one found so far
	/// on a strictly smaller error.
	fn encode_frame(&self, frame: &[i16; SAMPLES_PER_FRAME]) -> FrameResult {
		let mut best: Option<FrameResult> = None;

		for (coef_idx, &(c1, c2)) in COEFFICIENTS.iter().enumerate() {
			let scale = Self::best_scale_for(self.h1, self.h2, c1, c2, frame);
			let candidate = Self::simulate(coef_idx, scale, c1, c2, self.h1, self.h2, frame);

			let replace = match &best {
				None => true,
				Some(current) => candidate.sum_squared_error < current.sum_squared_error
			};
			if replace {
				best = Some(candidate);
			}
		}

		best.expect("COEFFICIENTS is non-empty")
	}

	/// Computes the maximum absolute residual under the *ideal* (non-quantized)
	/// predictor path, where history is advanced by the true sample rather
	/// than the decoded one, then picks the smallest `scale` such that
	/// `max_abs_residual <= (1 << scale) * 8 - 1`. Caps at [`MAX_SCALE`] if no
	/// scale fits, per `spec.md` §4.1 and §9 (overflowing residuals are
	/// silently clamped by the nibble range afterwards, not rejected here).
	fn best_scale_for(h1: i32, h2: i32, c1: i32, c2: i32, frame: &[i16; SAMPLES_PER_FRAME]) -> u32 {
		let mut ideal_h1 = h1;
		let mut ideal_h2 = h2;
		let mut max_abs_residual: i64 = 0;

		for &sample in frame {
			let sample = i64::from(sample);
			let pred = (i64::from(c1) * i64::from(ideal_h1) + i64::from(c2) * i64::from(ideal_h2) + 1024) >> 11;
			let residual = sample - pred;
			max_abs_residual = max_abs_residual.max(residual.abs());

			ideal_h2 = ideal_h1;
			ideal_h1 = sample as i32;
		}

		for scale in 0..=MAX_SCALE {
			if max_abs_residual <= (1i64 << scale) * 8 - 1 {
				return scale;
			}
		}
		MAX_SCALE
	}

	/// Simulates quantization and decode-side feedback for one candidate
	/// `(coef_idx, scale)` pair, producing the packed frame bytes, the updated
	/// history for the next frame, and the accumulated sum-of-squared error
	/// between the true samples and their decoded reconstructions.
	fn simulate(
		coef_idx: usize,
		scale: u32,
		c1: i32,
		c2: i32,
		mut h1: i32,
		mut h2: i32,
		frame: &[i16; SAMPLES_PER_FRAME]
	) -> FrameResult {
		let scale_factor: i64 = 1i64 << scale;
		let mut nibbles = [0u8; SAMPLES_PER_FRAME];
		let mut sum_squared_error = 0i64;

		for (i, &sample) in frame.iter().enumerate() {
			let sample = i64::from(sample);
			let pred = (i64::from(c1) * i64::from(h1) + i64::from(c2) * i64::from(h2) + 1024) >> 11;
			let residual = sample - pred;

			// Truncating division rounds toward zero for negative residuals; this
			// asymmetry is the source's behavior and is pinned, not a bug here.
			let rounded = (residual + (scale_factor >> 1)) / scale_factor;
			let nibble = rounded.clamp(-8, 7);
			nibbles[i] = (nibble as i8 as u8) & 0xF;

			// `((nibble*scale_factor) << 11 + 1024 + c1*h1 + c2*h2) >> 11` collapses to
			// `pred + nibble*scale_factor`, since `pred` already is `(1024 + c1*h1 +
			// c2*h2) >> 11` and `(nibble*scale_factor) << 11` is an exact multiple of
			// 2048, so the single final shift distributes over the sum.
			let decoded = (pred + nibble * scale_factor).clamp(-32768, 32767);

			let error = sample - decoded;
			sum_squared_error += error * error;

			h2 = h1;
			h1 = decoded as i32;
		}

		let mut bytes = [0u8; FRAME_SIZE];
		bytes[0] = ((coef_idx as u8) << 4) | (scale as u8);
		for (i, pair) in nibbles.chunks(2).enumerate() {
			bytes[1 + i] = (pair[0] << 4) | pair[1];
		}

		FrameResult { bytes, h1, h2, sum_squared_error }
	}
}

/// Encodes a single mono channel end to end, starting from zeroed history, as
/// a convenience wrapper around [`Encoder`].
pub fn encode(samples: &[i16], progress: &mut dyn ProgressSink) -> Vec<u8> {
	Encoder::new().encode(samples, progress)
}

/// Decodes a stream of GC-ADPCM frames back into samples, starting from
/// zeroed history. Used by tests to assert that the encoder's emitted frames
/// reproduce the same samples a compliant LyN decoder would, and that the
/// replayed history matches what the encoder carried internally.
#[cfg(test)]
pub(crate) fn decode_all(data: &[u8]) -> Vec<i16> {
	assert_eq!(data.len() % FRAME_SIZE, 0, "ADPCM data must be a whole number of frames");

	let mut h1 = 0i32;
	let mut h2 = 0i32;
	let mut out = Vec::with_capacity((data.len() / FRAME_SIZE) * SAMPLES_PER_FRAME);

	for frame in data.chunks(FRAME_SIZE) {
		let header = frame[0];
		let coef_idx = usize::from(header >> 4);
		let scale = u32::from(header & 0xF);
		let (c1, c2) = COEFFICIENTS[coef_idx];
		let scale_factor = 1i64 << scale;

		for &byte in &frame[1..] {
			for nibble in [byte >> 4, byte & 0xF] {
				// Sign-extend the 4-bit two's-complement nibble to a full integer.
				let signed: i64 = if nibble & 0x8 != 0 { i64::from(nibble) - 16 } else { i64::from(nibble) };
				let pred = (i64::from(c1) * i64::from(h1) + i64::from(c2) * i64::from(h2) + 1024) >> 11;
				let decoded = (pred + signed * scale_factor).clamp(-32768, 32767);

				out.push(decoded as i16);
				h2 = h1;
				h1 = decoded as i32;
			}
		}
	}

	out
}
