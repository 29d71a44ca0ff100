//! Contains [`Config`] and the enums that parametrize a conversion.

/// Holds the settings that customize how a WAV file is converted into a LyN
/// audio container. Constructed by callers (typically a CLI or GUI layer) and
/// passed to [`convert`](crate::convert).
#[derive(Debug, Clone)]
#[non_exhaustive]
pub struct Config {
	/// If set, the preprocessor resamples the source audio to this rate
	/// (`ffmpeg -ar`) before encoding, and this rate is written into the
	/// output `fmt ` chunk. If unset, the source sample rate is kept.
	///
	/// **Default value**: `None`
	pub target_sample_rate: Option<u32>,
	/// If `true` and the input has more than one channel, the preprocessor
	/// downmixes it to mono before encoding.
	///
	/// **Default value**: `false`
	pub force_mono: bool,
	/// If `true`, the preprocessor applies an `loudnorm=I=-16:TP=-1.5:LRA=11`
	/// audio filter before encoding.
	///
	/// **Default value**: `false`
	pub normalize: bool,
	/// Selects the audio payload carried inside the container.
	///
	/// **Default value**: [`Codec::Dsp`]
	pub codec: Codec,
	/// Selects the outer container envelope.
	///
	/// **Default value**: [`ContainerFormat::Sns`]
	pub format: ContainerFormat,
	/// SON-only, and only meaningful for [`Codec::Dsp`]. If `true` and the
	/// source is stereo, the output is encoded as 4-channel
	/// WAVEFORMATEXTENSIBLE audio, with channels 2 and 3 duplicating channels
	/// 0 and 1. The fixed 4-channel `fmt ` layout is a 4-bit-per-sample
	/// ADPCM layout with no Vorbis counterpart; combining this with
	/// [`Codec::Ogg`] is rejected with [`ConversionError::InputInvalid`](crate::ConversionError::InputInvalid).
	///
	/// **Default value**: `false`
	pub four_channel: bool,
	/// SNS-only. Selects an optional extra feature: a Just-Dance header prefix,
	/// or splicing in a beat-marker chunk harvested from a reference file.
	///
	/// **Default value**: [`Extras::None`]
	pub extras: Extras
}

impl Default for Config {
	fn default() -> Self {
		Self {
			target_sample_rate: None,
			force_mono: false,
			normalize: false,
			codec: Codec::Dsp,
			format: ContainerFormat::Sns,
			four_channel: false,
			extras: Extras::None
		}
	}
}

/// The audio payload carried inside the container.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Codec {
	/// Nintendo GC-ADPCM, one frame-aligned byte stream per channel.
	Dsp,
	/// Vorbis, one repackaged Ogg byte stream per channel, requiring the
	/// external Vorbis encoder via [`preprocess::encode_vorbis`](crate::preprocess::encode_vorbis).
	Ogg
}

/// The outer container envelope a conversion produces.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ContainerFormat {
	/// A RIFF-shaped SNS file: `"RIFF" <size> "WAVE" "fmt " "fact" [beat] "data"`.
	Sns,
	/// A SON-tagged outer box wrapping an SNS-shaped RIFF, with a leading
	/// `LySE` descriptor chunk and an adjusted `fact` trailer.
	Son
}

/// An SNS-only extra feature layered on top of the base container.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Extras {
	/// No extra feature.
	None,
	/// Prepends the fixed 20-byte Just-Dance `LySE` header to the SNS output.
	JustDance,
	/// Splices a [`BeatChunk`](crate::BeatChunk) harvested from a reference SNS
	/// file verbatim between the `fact` and `data` chunks.
	CustomBeats
}
