//! Contains [`ConversionError`], the sum-typed result returned by every fallible
//! operation exposed by this crate.

use std::io;
use std::path::PathBuf;

use thiserror::Error;

/// Represents an error that may occur while converting a WAV file into a LyN
/// container. Every top-level conversion returns either `Ok(())` or a single
/// variant of this type, which formats into the one human-readable diagnostic
/// string the caller is expected to show to end-users.
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum ConversionError {
	/// The input WAV file is missing required chunks, has an unsupported
	/// `audio_format`, an unsupported `bits_per_sample`, or is otherwise not a
	/// file this crate can encode.
	#[error("Invalid input audio: {0}")]
	InputInvalid(String),
	/// A required external tool (a resampler or a Vorbis encoder) could not be
	/// found on disk or on `PATH`.
	#[error("Required external tool not found: {tool}")]
	ExternalMissing {
		/// The name of the tool that could not be located.
		tool: String
	},
	/// A required external tool was found and invoked, but exited with a
	/// non-zero status code.
	#[error("External tool '{tool}' failed with exit code {code:?}")]
	ExternalFailed {
		/// The name of the tool that failed.
		tool: String,
		/// The process exit code, if the process was not terminated by a signal.
		code: Option<i32>
	},
	/// A filesystem read, write, or delete operation failed.
	#[error("I/O error on {path}: {source}")]
	Io {
		/// The path the failing operation was performed on.
		path: PathBuf,
		/// The underlying I/O error.
		#[source]
		source: io::Error
	}
}

impl ConversionError {
	/// Wraps an [`io::Error`] together with the path it occurred on.
	pub(crate) fn io(path: impl Into<PathBuf>, source: io::Error) -> Self {
		Self::Io { path: path.into(), source }
	}
}
