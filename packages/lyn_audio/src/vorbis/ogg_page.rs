//! Contains [`OggPage`], a parsed view of one Ogg page, and the page-walking
//! parser used by the repackager.

/// The `OggS` magic that starts every Ogg page.
pub const MAGIC: &[u8; 4] = b"OggS";

/// Fixed-size portion of an Ogg page header, not counting the magic or the
/// variable-length segment table.
const FIXED_HEADER_LEN: usize = 23;

/// A parsed view of one Ogg page.
#[derive(Debug, Clone)]
pub struct OggPage {
	/// Bit 0 (continuation), bit 1 (beginning-of-stream), bit 2
	/// (end-of-stream) header type flags.
	pub header_type: u8,
	/// The granule position (timestamp) of this page.
	pub granule_position: i64,
	/// The logical bitstream serial number.
	pub serial: u32,
	/// The page sequence number within its logical bitstream.
	pub page_sequence: u32,
	/// The segment table: one length byte per segment in the page body.
	pub segment_table: Vec<u8>,
	/// The page body, whose length equals the sum of `segment_table`.
	pub data: Vec<u8>
}

impl OggPage {
	/// `true` if this page's `header_type` marks it as a continuation of the
	/// previous page's last packet.
	pub fn is_continuation(&self) -> bool {
		self.header_type & 0x01 != 0
	}

	/// Reads one page starting at `input[pos..]`. Returns the parsed page and
	/// the offset just past it, or `None` on a missing magic, a short read, or
	/// a body shorter than the segment table declares.
	fn read_at(input: &[u8], pos: usize) -> Option<(Self, usize)> {
		if input.len() < pos + FIXED_HEADER_LEN + 4 {
			return None;
		}
		if &input[pos..pos + 4] != MAGIC {
			return None;
		}

		let header_type = input[pos + 5];
		let granule_position = i64::from_le_bytes(input[pos + 6..pos + 14].try_into().ok()?);
		let serial = u32::from_le_bytes(input[pos + 14..pos + 18].try_into().ok()?);
		let page_sequence = u32::from_le_bytes(input[pos + 18..pos + 22].try_into().ok()?);
		let num_segments = usize::from(input[pos + 26]);

		let segment_table_start = pos + 27;
		let segment_table_end = segment_table_start + num_segments;
		if input.len() < segment_table_end {
			return None;
		}
		let segment_table = input[segment_table_start..segment_table_end].to_vec();

		let body_len: usize = segment_table.iter().map(|&b| usize::from(b)).sum();
		let body_start = segment_table_end;
		let body_end = body_start + body_len;
		if input.len() < body_end {
			return None;
		}
		let data = input[body_start..body_end].to_vec();

		Some((
			Self { header_type, granule_position, serial, page_sequence, segment_table, data },
			body_end
		))
	}

	/// Parses every page in `input`, in order. Stops cleanly (returning
	/// whatever pages were found so far) on a missing magic, a short read, or
	/// a truncated body, matching `spec.md`'s requirement that the
	/// repackager bail out to "unchanged input" on any parse inconsistency.
	pub fn parse_all(input: &[u8]) -> Vec<Self> {
		let mut pages = Vec::new();
		let mut pos = 0;
		while let Some((page, next_pos)) = Self::read_at(input, pos) {
			pos = next_pos;
			pages.push(page);
		}
		pages
	}

	/// Serializes this page back to bytes, with a freshly computed CRC-32.
	/// `serial` and `page_sequence` are taken from `self`.
	pub fn to_bytes(&self) -> Vec<u8> {
		let mut out = Vec::with_capacity(FIXED_HEADER_LEN + 4 + self.segment_table.len() + self.data.len());

		out.extend_from_slice(MAGIC);
		out.push(0); // stream structure version, always 0
		out.push(self.header_type);
		out.extend_from_slice(&self.granule_position.to_le_bytes());
		out.extend_from_slice(&self.serial.to_le_bytes());
		out.extend_from_slice(&self.page_sequence.to_le_bytes());
		out.extend_from_slice(&[0u8; 4]); // CRC placeholder, filled below
		out.push(self.segment_table.len() as u8);
		out.extend_from_slice(&self.segment_table);
		out.extend_from_slice(&self.data);

		let crc = super::crc::checksum(&out);
		out[22..26].copy_from_slice(&crc.to_le_bytes());

		out
	}
}

/// Builds the segment table for a body of `len` bytes: as many 255-byte
/// segments as needed, followed by a final segment shorter than 255 (which
/// may be `0` if `len` is an exact multiple of 255).
pub fn segment_table_for_len(len: usize) -> Vec<u8> {
	let mut table = vec![255u8; len / 255];
	table.push((len % 255) as u8);
	table
}
