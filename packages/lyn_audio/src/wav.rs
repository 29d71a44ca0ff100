//! Contains [`PcmSource`], the in-memory, de-interleaved result of parsing a WAV
//! file, and the parsing logic that produces it.

use std::io::Read;
use std::path::Path;

use hound::{SampleFormat, WavReader};

use crate::error::ConversionError;

/// Sixteen-bit PCM audio loaded fully into memory, with samples already split
/// out per channel. This is the input type every encoder in this crate
/// operates on.
#[derive(Debug, Clone)]
pub struct PcmSource {
	/// One `Vec<i16>` of samples per channel, all of equal length.
	pub channels: Vec<Vec<i16>>,
	/// The sample rate, in Hz, that the source was recorded at.
	pub sample_rate: u32
}

impl PcmSource {
	/// Returns the number of channels in this source.
	pub fn channel_count(&self) -> usize {
		self.channels.len()
	}

	/// Returns the number of sample frames per channel.
	pub fn frame_count(&self) -> usize {
		self.channels.first().map_or(0, Vec::len)
	}

	/// Parses 16-bit PCM WAV audio from `path`.
	///
	/// # Errors
	///
	/// Returns [`ConversionError::InputInvalid`] if the file is not a WAV
	/// container, declares an `audio_format` other than PCM (`1`), or declares
	/// a `bits_per_sample` other than `16`. Returns [`ConversionError::Io`] on
	/// any other read failure.
	pub fn from_wav_file(path: &Path) -> Result<Self, ConversionError> {
		let reader = WavReader::open(path).map_err(|err| map_hound_err(path, err))?;
		Self::from_wav_reader(reader, path)
	}

	/// Parses 16-bit PCM WAV audio from an in-memory reader. `context_path` is
	/// only used to attribute any error message to a file name.
	pub fn from_wav_bytes(bytes: &[u8], context_path: &Path) -> Result<Self, ConversionError> {
		let reader =
			WavReader::new(std::io::Cursor::new(bytes)).map_err(|err| map_hound_err(context_path, err))?;
		Self::from_wav_reader(reader, context_path)
	}

	fn from_wav_reader<R: Read>(
		mut reader: WavReader<R>,
		context_path: &Path
	) -> Result<Self, ConversionError> {
		let spec = reader.spec();

		if spec.sample_format != SampleFormat::Int {
			return Err(ConversionError::InputInvalid(format!(
				"{}: unsupported WAV sample format, only PCM integer samples are supported",
				context_path.display()
			)));
		}
		if spec.bits_per_sample != 16 {
			return Err(ConversionError::InputInvalid(format!(
				"{}: unsupported bits per sample {}, only 16-bit PCM is supported",
				context_path.display(),
				spec.bits_per_sample
			)));
		}

		let channel_count = usize::from(spec.channels);
		if channel_count == 0 {
			return Err(ConversionError::InputInvalid(format!(
				"{}: WAV file declares zero channels",
				context_path.display()
			)));
		}

		let mut channels = vec![Vec::new(); channel_count];
		for (i, sample) in reader.samples::<i16>().enumerate() {
			let sample = sample.map_err(|err| map_hound_err(context_path, err))?;
			channels[i % channel_count].push(sample);
		}

		Ok(Self { channels, sample_rate: spec.sample_rate })
	}
}

fn map_hound_err(path: &Path, err: hound::Error) -> ConversionError {
	match err {
		hound::Error::IoError(io_err) => ConversionError::io(path, io_err),
		other => ConversionError::InputInvalid(format!("{}: {}", path.display(), other))
	}
}

#[cfg(test)]
mod test {
	use std::path::Path;

	use hound::{SampleFormat, WavSpec, WavWriter};

	use super::PcmSource;

	fn encode_wav<S: hound::Sample + Copy>(spec: WavSpec, samples: &[S]) -> Vec<u8> {
		let mut buffer = Vec::new();
		{
			let mut cursor = std::io::Cursor::new(&mut buffer);
			let mut writer = WavWriter::new(&mut cursor, spec).unwrap();
			for &sample in samples {
				writer.write_sample(sample).unwrap();
			}
			writer.finalize().unwrap();
		}
		buffer
	}

	#[test]
	fn parses_mono_pcm16() {
		let spec = WavSpec {
			channels: 1,
			sample_rate: 32000,
			bits_per_sample: 16,
			sample_format: SampleFormat::Int
		};
		let bytes = encode_wav::<i16>(spec, &[0, 1, 2, 3, -1, -2]);

		let source = PcmSource::from_wav_bytes(&bytes, Path::new("test.wav")).unwrap();

		assert_eq!(source.channel_count(), 1);
		assert_eq!(source.sample_rate, 32000);
		assert_eq!(source.channels[0], vec![0, 1, 2, 3, -1, -2]);
	}

	#[test]
	fn de_interleaves_stereo_pcm16() {
		let spec = WavSpec {
			channels: 2,
			sample_rate: 44100,
			bits_per_sample: 16,
			sample_format: SampleFormat::Int
		};
		let bytes = encode_wav::<i16>(spec, &[1000, -1000, 1000, -1000]);

		let source = PcmSource::from_wav_bytes(&bytes, Path::new("test.wav")).unwrap();

		assert_eq!(source.channel_count(), 2);
		assert_eq!(source.channels[0], vec![1000, 1000]);
		assert_eq!(source.channels[1], vec![-1000, -1000]);
	}

	#[test]
	fn rejects_non_pcm_format() {
		let spec = WavSpec {
			channels: 1,
			sample_rate: 32000,
			bits_per_sample: 32,
			sample_format: SampleFormat::Float
		};
		let bytes = encode_wav::<f32>(spec, &[]);

		let err = PcmSource::from_wav_bytes(&bytes, Path::new("test.wav")).unwrap_err();
		assert!(matches!(err, crate::ConversionError::InputInvalid(_)));
	}

	#[test]
	fn rejects_non_16_bit_pcm() {
		// hound only allows 8/16/24/32-bit integer formats; use 8-bit to hit our check.
		let spec = WavSpec { channels: 1, sample_rate: 8000, bits_per_sample: 8, sample_format: SampleFormat::Int };
		let bytes = encode_wav::<i8>(spec, &[1, 2, 3]);

		let err = PcmSource::from_wav_bytes(&bytes, Path::new("test.wav")).unwrap_err();
		assert!(matches!(err, crate::ConversionError::InputInvalid(_)));
	}
}
