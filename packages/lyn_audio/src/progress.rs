//! Contains the [`ProgressSink`] trait, invoked synchronously at well-defined
//! milestones during encoding.

/// Receives synchronous progress notifications during a conversion.
///
/// Implementations must not block for any significant amount of time, since
/// callbacks are invoked on the thread doing the encoding work, at frame
/// boundaries for ADPCM encoding and at channel boundaries for Vorbis
/// repackaging.
pub trait ProgressSink {
	/// Called after a GC-ADPCM frame has been encoded.
	///
	/// `frame_index` is zero-based; `frame_count` is the total number of
	/// frames that will be produced for the channel being encoded.
	fn adpcm_frame_encoded(&mut self, frame_index: usize, frame_count: usize) {
		let _ = (frame_index, frame_count);
	}

	/// Called after a Vorbis stream's interleave block has been written.
	///
	/// `channel_index` is zero-based; `channel_count` is the total number of
	/// channels being interleaved.
	fn vorbis_channel_interleaved(&mut self, channel_index: usize, channel_count: usize) {
		let _ = (channel_index, channel_count);
	}
}

/// A [`ProgressSink`] that ignores every notification. Used when a caller has
/// no interest in progress reporting.
#[derive(Debug, Default, Clone, Copy)]
pub struct NoopProgressSink;

impl ProgressSink for NoopProgressSink {}
