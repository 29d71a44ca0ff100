//! Builds the SNS (RIFF-shaped) container: `RIFF/WAVE`, `fmt `, `fact`, an
//! optional spliced-in beat chunk, then `data`, with an optional Just-Dance
//! prefix.

use super::{fact_body, fmt_dsp_body, fmt_ogg_body, write_chunk, AssembleRequest, JUST_DANCE_PREFIX};
use crate::config::Extras;
use crate::container::Payload;

pub(super) fn assemble(request: AssembleRequest<'_>) -> Vec<u8> {
	let channel_count = request.payload.channel_count() as u16;
	let data = request.payload.interleave();

	let fmt_body = match &request.payload {
		Payload::Dsp(_) => fmt_dsp_body(channel_count, request.sample_rate),
		Payload::Ogg(_) => fmt_ogg_body(channel_count, request.sample_rate)
	};
	let fact_body = fact_body(request.num_samples, 3, 7);

	let mut wave_body = Vec::new();
	wave_body.extend_from_slice(b"WAVE");
	write_chunk(&mut wave_body, b"fmt ", &fmt_body);
	write_chunk(&mut wave_body, b"fact", &fact_body);
	if request.extras == Extras::CustomBeats {
		if let Some(beat_chunk) = request.beat_chunk {
			wave_body.extend_from_slice(&beat_chunk.bytes);
		}
	}
	write_chunk(&mut wave_body, b"data", &data);

	let mut out = Vec::with_capacity(8 + wave_body.len() + 20);
	out.extend_from_slice(b"RIFF");
	out.extend_from_slice(&(wave_body.len() as u32).to_le_bytes());
	out.extend_from_slice(&wave_body);

	if request.extras == Extras::JustDance {
		let mut prefixed = Vec::with_capacity(JUST_DANCE_PREFIX.len() + out.len());
		prefixed.extend_from_slice(&JUST_DANCE_PREFIX);
		prefixed.extend_from_slice(&out);
		return prefixed;
	}

	out
}
