//! Builds the SON container: an outer SON-tagged box wrapping an SNS-shaped
//! RIFF, with a leading `LySE` descriptor chunk and an adjusted `fact`
//! trailer. Supports duplicating a stereo payload into 4 channels.

use super::{fact_body, fmt_dsp_body, fmt_ogg_body, fmt_son_4ch_body, write_chunk, AssembleRequest};
use crate::container::Payload;

/// A `LySE` flag byte set when the encoded audio is longer than 10 seconds.
const LONG_AUDIO_FLAG: u32 = 0x21;

pub(super) fn assemble(request: AssembleRequest<'_>) -> Vec<u8> {
	let is_long_audio = u64::from(request.num_samples) > u64::from(request.sample_rate) * 10;
	let long_audio_flag = if is_long_audio { LONG_AUDIO_FLAG } else { 0 };

	let (fmt_body, data) = match &request.payload {
		Payload::Dsp(channels) if request.four_channel => {
			assert_eq!(channels.len(), 2, "four_channel SON requires a stereo source payload");
			let duplicated = vec![channels[0].clone(), channels[1].clone(), channels[0].clone(), channels[1].clone()];
			(fmt_son_4ch_body(request.sample_rate), crate::adpcm::interleave::interleave(&duplicated))
		}
		Payload::Dsp(_) => {
			let channel_count = request.payload.channel_count() as u16;
			(fmt_dsp_body(channel_count, request.sample_rate), request.payload.interleave())
		}
		Payload::Ogg(_) => {
			assert!(
				!request.four_channel,
				"four_channel SON encoding is only defined for the DSP codec, not Ogg"
			);
			let channel_count = request.payload.channel_count() as u16;
			(fmt_ogg_body(channel_count, request.sample_rate), request.payload.interleave())
		}
	};

	let mut lyse_body = Vec::with_capacity(16);
	lyse_body.extend_from_slice(&1u32.to_le_bytes());
	lyse_body.extend_from_slice(&0x10u32.to_le_bytes());
	lyse_body.extend_from_slice(&long_audio_flag.to_le_bytes());
	lyse_body.extend_from_slice(&0u32.to_le_bytes());

	let fact_body = fact_body(request.num_samples, 4, 14);

	let mut wave_body = Vec::new();
	wave_body.extend_from_slice(b"WAVE");
	write_chunk(&mut wave_body, b"LySE", &lyse_body);
	write_chunk(&mut wave_body, b"fmt ", &fmt_body);
	write_chunk(&mut wave_body, b"fact", &fact_body);
	write_chunk(&mut wave_body, b"data", &data);

	let mut inner_riff = Vec::with_capacity(8 + wave_body.len());
	inner_riff.extend_from_slice(b"RIFF");
	inner_riff.extend_from_slice(&(wave_body.len() as u32).to_le_bytes());
	inner_riff.extend_from_slice(&wave_body);

	let riff_total_size = 4u32 + wave_body.len() as u32;
	let son_size = riff_total_size + 0x0C;

	let mut out = Vec::with_capacity(4 + 4 + 4 + 4 + 4 + 4 + 8 + inner_riff.len() + 4);
	out.extend_from_slice(&son_size.to_le_bytes());
	out.extend_from_slice(&son_size.to_le_bytes());
	out.extend_from_slice(&0u32.to_le_bytes());
	out.extend_from_slice(&2u32.to_le_bytes());
	out.extend_from_slice(&0u32.to_le_bytes());
	out.extend_from_slice(b"SON\0");
	out.extend_from_slice(&0u64.to_le_bytes());
	out.extend_from_slice(&inner_riff);
	out.extend_from_slice(&0u32.to_le_bytes());

	out
}
