//! Contains [`convert`], the top-level orchestrator: WAV parse → optional
//! preprocessing → encode/repackage → interleave → assemble → atomic write.

use std::fs;
use std::path::{Path, PathBuf};

use log::info;

use crate::adpcm;
use crate::beat::BeatChunk;
use crate::config::{Codec, Config, ContainerFormat, Extras};
use crate::container::{self, AssembleRequest, Payload};
use crate::error::ConversionError;
use crate::preprocess;
use crate::progress::ProgressSink;
use crate::vorbis;
use crate::wav::PcmSource;

/// Converts `input_wav` into a LyN audio container written to `output_path`,
/// per `config`.
///
/// Sequences WAV parsing, optional external preprocessing (resampling,
/// mono-mixing, loudness normalization), GC-ADPCM encoding or Vorbis
/// repackaging (per `config.codec`, the latter additionally invoking the
/// external Vorbis encoder once per channel), multi-channel interleaving,
/// container assembly, and an atomic write: the destination is only renamed
/// into place after every byte is ready, so a failure never leaves a
/// partially written output file.
///
/// `beat_chunk` is only consulted when `config.extras` is
/// [`Extras::CustomBeats`]; pass `None` otherwise.
pub fn convert(
	input_wav: &Path,
	output_path: &Path,
	config: &Config,
	beat_chunk: Option<&BeatChunk>,
	progress: &mut dyn ProgressSink
) -> Result<(), ConversionError> {
	info!("converting {} -> {}", input_wav.display(), output_path.display());

	if config.four_channel && matches!(config.format, ContainerFormat::Son) && config.codec == Codec::Ogg {
		return Err(ConversionError::InputInvalid(
			"four_channel SON encoding is only defined for the DSP codec, not Ogg".to_string()
		));
	}

	let preprocessed_guard = preprocess::resample_and_normalize(input_wav, config)?;
	let working_wav_path = preprocessed_guard.as_ref().map_or(input_wav, |guard| guard.path());

	let source = PcmSource::from_wav_file(working_wav_path)?;
	let num_samples = source.frame_count() as u32;

	let payload = match config.codec {
		Codec::Dsp => build_dsp_payload(working_wav_path, &source, config, progress)?,
		Codec::Ogg => build_ogg_payload(working_wav_path, &source, progress)?
	};

	let is_son = matches!(config.format, ContainerFormat::Son);
	let request = AssembleRequest {
		format: config.format,
		payload,
		sample_rate: source.sample_rate,
		num_samples,
		four_channel: config.four_channel && is_son,
		extras: if is_son { Extras::None } else { config.extras },
		beat_chunk: if config.extras == Extras::CustomBeats { beat_chunk } else { None }
	};

	let output_bytes = container::assemble(request);

	write_atomically(output_path, &output_bytes)
}

fn build_dsp_payload(
	working_wav_path: &Path,
	source: &PcmSource,
	config: &Config,
	progress: &mut dyn ProgressSink
) -> Result<Payload, ConversionError> {
	if config.four_channel && matches!(config.format, ContainerFormat::Son) {
		let channel_count = source.channel_count();
		if channel_count != 2 {
			return Err(ConversionError::InputInvalid(
				"four_channel SON encoding requires a stereo input".to_string()
			));
		}

		let split_guards = preprocess::split_channels(working_wav_path, channel_count)?;
		let mut channels = Vec::with_capacity(channel_count);
		for guard in &split_guards {
			let channel_source = PcmSource::from_wav_file(guard.path())?;
			channels.push(adpcm::encode(&channel_source.channels[0], progress));
		}

		return Ok(Payload::Dsp(channels));
	}

	let mut channels = Vec::with_capacity(source.channel_count());
	for channel in &source.channels {
		let mut encoder = adpcm::Encoder::new();
		channels.push(encoder.encode(channel, progress));
	}

	Ok(Payload::Dsp(channels))
}

fn build_ogg_payload(
	working_wav_path: &Path,
	source: &PcmSource,
	progress: &mut dyn ProgressSink
) -> Result<Payload, ConversionError> {
	let channel_count = source.channel_count();
	let split_guards = preprocess::split_channels(working_wav_path, channel_count)?;

	let mut channels = Vec::with_capacity(channel_count);
	for guard in &split_guards {
		let ogg_guard = preprocess::encode_vorbis(guard.path())?;
		let raw_ogg = fs::read(ogg_guard.path()).map_err(|source| ConversionError::io(ogg_guard.path(), source))?;
		channels.push(vorbis::repackage(&raw_ogg));
		progress.vorbis_channel_interleaved(channels.len() - 1, channel_count);
	}

	Ok(Payload::Ogg(channels))
}

fn write_atomically(output_path: &Path, bytes: &[u8]) -> Result<(), ConversionError> {
	let temp_path = sibling_temp_path(output_path);

	fs::write(&temp_path, bytes).map_err(|source| ConversionError::io(temp_path.clone(), source))?;
	fs::rename(&temp_path, output_path).map_err(|source| {
		let _ = fs::remove_file(&temp_path);
		ConversionError::io(output_path.to_path_buf(), source)
	})
}

fn sibling_temp_path(output_path: &Path) -> PathBuf {
	let mut file_name = output_path.file_name().map(|n| n.to_os_string()).unwrap_or_default();
	file_name.push(".lyn_audio.tmp");
	output_path.with_file_name(file_name)
}

#[cfg(test)]
mod test {
	use std::io::Write as _;

	use hound::{SampleFormat, WavSpec, WavWriter};
	use tempfile::NamedTempFile;

	use super::*;
	use crate::config::ContainerFormat;
	use crate::progress::NoopProgressSink;

	fn write_mono_wav(samples: &[i16], sample_rate: u32) -> NamedTempFile {
		let spec = WavSpec { channels: 1, sample_rate, bits_per_sample: 16, sample_format: SampleFormat::Int };
		let mut file = NamedTempFile::new().unwrap();
		{
			let mut writer = WavWriter::new(&mut file, spec).unwrap();
			for &sample in samples {
				writer.write_sample(sample).unwrap();
			}
			writer.finalize().unwrap();
		}
		file.flush().unwrap();
		file
	}

	#[test_log::test]
	fn converts_tiny_mono_silence_to_an_86_byte_dsp_sns_file() {
		let input = write_mono_wav(&[0; 14], 32000);
		let output_dir = tempfile::tempdir().unwrap();
		let output_path = output_dir.path().join("out.sns");

		let config = Config { format: ContainerFormat::Sns, ..Config::default() };
		let mut sink = NoopProgressSink;
		convert(input.path(), &output_path, &config, None, &mut sink).unwrap();

		let bytes = fs::read(&output_path).unwrap();
		assert_eq!(bytes.len(), 86);
		assert_eq!(&bytes[0..4], b"RIFF");
	}

	#[test_log::test]
	fn output_file_is_never_observed_partially_written() {
		let input = write_mono_wav(&[100; 14], 32000);
		let output_dir = tempfile::tempdir().unwrap();
		let output_path = output_dir.path().join("out.sns");

		let config = Config::default();
		let mut sink = NoopProgressSink;
		convert(input.path(), &output_path, &config, None, &mut sink).unwrap();

		assert!(output_path.exists());
		let temp_path = sibling_temp_path(&output_path);
		assert!(!temp_path.exists());
	}

	#[test_log::test]
	fn four_channel_ogg_son_is_rejected_before_touching_external_tools() {
		let input = write_mono_wav(&[0; 14], 32000);
		let output_dir = tempfile::tempdir().unwrap();
		let output_path = output_dir.path().join("out.son");

		let config = Config {
			format: ContainerFormat::Son,
			codec: Codec::Ogg,
			four_channel: true,
			..Config::default()
		};
		let mut sink = NoopProgressSink;
		let err = convert(input.path(), &output_path, &config, None, &mut sink).unwrap_err();

		assert!(matches!(err, ConversionError::InputInvalid(_)));
		assert!(!output_path.exists());
	}
}
