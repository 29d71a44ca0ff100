//! Contains the preprocessor driver: invokes the external resampler,
//! mono-mixer, loudness normalizer, channel splitter, and Vorbis encoder as
//! child processes, per the command lines the LyN toolchain has always used.

use std::io;
use std::path::{Path, PathBuf};
use std::process::Command;

use log::{debug, info};
use tempfile::Builder;

use crate::config::Config;
use crate::error::ConversionError;

/// A scoped temp-file handle that unlinks its path on drop, on every exit
/// path: success, an early `?` return, or the caller dropping the guard.
pub struct TempGuard {
	path: tempfile::TempPath
}

impl TempGuard {
	fn new(suffix: &str) -> Result<Self, ConversionError> {
		let named = Builder::new()
			.suffix(suffix)
			.tempfile()
			.map_err(|source| ConversionError::io(PathBuf::from(format!("<tempfile{suffix}>")), source))?;
		Ok(Self { path: named.into_temp_path() })
	}

	/// The path of the underlying temp file.
	pub fn path(&self) -> &Path {
		&self.path
	}
}

/// Resamples, downmixes, and/or loudness-normalizes `input_wav` into a fresh
/// temp WAV, according to `config`. Returns the untouched input path,
/// wrapped in no guard, if none of `target_sample_rate`, `force_mono`, or
/// `normalize` require a preprocessing pass.
pub fn resample_and_normalize(input_wav: &Path, config: &Config) -> Result<Option<TempGuard>, ConversionError> {
	if config.target_sample_rate.is_none() && !config.force_mono && !config.normalize {
		return Ok(None);
	}

	let guard = TempGuard::new(".wav")?;

	let mut command = Command::new("ffmpeg");
	command.arg("-y").arg("-i").arg(input_wav);
	if config.force_mono {
		command.arg("-ac").arg("1");
	}
	if let Some(rate) = config.target_sample_rate {
		command.arg("-ar").arg(rate.to_string());
	}
	if config.normalize {
		command.arg("-af").arg("loudnorm=I=-16:TP=-1.5:LRA=11");
	}
	command.arg(guard.path());

	info!("preprocessing {} with ffmpeg", input_wav.display());
	spawn_and_wait("ffmpeg", command)?;

	Ok(Some(guard))
}

/// Splits `input_wav` into one mono temp WAV per channel, by invoking the
/// channel-splitter filter once per target channel index. Used for SON
/// four-channel encoding, where channels 2 and 3 must be produced as
/// independent mono streams before ADPCM-encoding each.
pub fn split_channels(input_wav: &Path, channel_count: usize) -> Result<Vec<TempGuard>, ConversionError> {
	let mut guards = Vec::with_capacity(channel_count);

	for channel_index in 0..channel_count {
		let guard = TempGuard::new(".wav")?;

		let filter = format!("[0:a]pan=mono|c0=c{channel_index}[a]");
		let mut command = Command::new("ffmpeg");
		command
			.arg("-y")
			.arg("-i")
			.arg(input_wav)
			.arg("-filter_complex")
			.arg(&filter)
			.arg("-map")
			.arg("[a]")
			.arg(guard.path());

		debug!("splitting channel {channel_index} of {}", input_wav.display());
		spawn_and_wait("ffmpeg", command)?;

		guards.push(guard);
	}

	Ok(guards)
}

/// Encodes `input_wav` to Ogg Vorbis into a fresh temp file, preferring
/// `oggenc` and falling back to `ffmpeg`'s libvorbis backend when `oggenc`
/// isn't on `PATH`.
pub fn encode_vorbis(input_wav: &Path) -> Result<TempGuard, ConversionError> {
	let guard = TempGuard::new(".ogg")?;

	let mut oggenc = Command::new("oggenc");
	oggenc.arg("-q").arg("6").arg("-o").arg(guard.path()).arg(input_wav);

	match spawn_and_wait("oggenc", oggenc) {
		Ok(()) => return Ok(guard),
		Err(ConversionError::ExternalMissing { .. }) => {
			debug!("oggenc not found, falling back to ffmpeg libvorbis");
		}
		Err(other) => return Err(other)
	}

	let mut ffmpeg = Command::new("ffmpeg");
	ffmpeg
		.arg("-y")
		.arg("-i")
		.arg(input_wav)
		.arg("-c:a")
		.arg("libvorbis")
		.arg("-q:a")
		.arg("6")
		.arg(guard.path());
	spawn_and_wait("ffmpeg", ffmpeg)?;

	Ok(guard)
}

fn spawn_and_wait(tool: &str, mut command: Command) -> Result<(), ConversionError> {
	let status = command.status().map_err(|source| match source.kind() {
		io::ErrorKind::NotFound => ConversionError::ExternalMissing { tool: tool.to_string() },
		_ => ConversionError::io(PathBuf::from(tool), source)
	})?;

	if !status.success() {
		return Err(ConversionError::ExternalFailed { tool: tool.to_string(), code: status.code() });
	}

	Ok(())
}

#[cfg(test)]
mod test {
	use super::*;

	#[test]
	fn missing_binary_is_reported_without_touching_the_destination() {
		let command = Command::new("lyn-audio-nonexistent-tool-xyz");
		let result = spawn_and_wait("lyn-audio-nonexistent-tool-xyz", command);
		assert!(matches!(result, Err(ConversionError::ExternalMissing { tool }) if tool == "lyn-audio-nonexistent-tool-xyz"));
	}

	#[test]
	fn resample_and_normalize_is_a_noop_when_config_requests_nothing() {
		let config = Config::default();
		let result = resample_and_normalize(Path::new("/nonexistent/input.wav"), &config).unwrap();
		assert!(result.is_none());
	}
}
