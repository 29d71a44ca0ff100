//! Contains the Vorbis repackager: rewrites the vendor string embedded in a
//! Vorbis comment header and re-emits a well-formed Ogg stream with freshly
//! computed page CRCs, preserving every audio page's granule position,
//! header-type flags, and segment table.

use super::ogg_page::{segment_table_for_len, OggPage};

/// The vendor string the LyN engine expects in the rewritten comment header.
const TARGET_VENDOR: &str = "Xiph.Org libVorbis I 20050304";

/// The maximum number of segments, out of the 255 an Ogg page can hold, that
/// page 1 is allowed to spend on the comment packet and the head of the
/// setup packet. This cap (not the usual 255-segment page limit) is the
/// source's own, pinned behavior; see `DESIGN.md`.
const PAGE_ONE_SEGMENT_BUDGET: usize = 15;

/// Maximum bytes a single continuation page can carry: 255 segments of 255
/// bytes each.
const MAX_CONTINUATION_PAGE_BYTES: usize = 255 * 255;

/// Rewrites the vendor string in `input`'s Vorbis comment header to
/// [`TARGET_VENDOR`], clears the user comment list, and renumbers every page.
/// Audio pages are preserved verbatim (same `header_type`, `granule_position`,
/// segment table, and data), only their page sequence number changes.
///
/// Any parse inconsistency — a missing `OggS` magic, too few pages, or a
/// malformed comment packet — causes this function to return `input`
/// unchanged, rather than a partial result. This is why the function cannot
/// fail: its contract is "best-effort repackage, or a faithful passthrough".
pub fn repackage(input: &[u8]) -> Vec<u8> {
	match try_repackage(input) {
		Some(output) => output,
		None => input.to_vec()
	}
}

fn try_repackage(input: &[u8]) -> Option<Vec<u8>> {
	let pages = OggPage::parse_all(input);
	if pages.len() < 3 {
		return None;
	}

	let serial = pages[0].serial;
	let id_header_body = pages[0].data.clone();

	let comment_packet = extract_packet_starting_at(&pages, 1)?;
	if !is_well_formed_comment_packet(&comment_packet) {
		return None;
	}
	let setup_packet = extract_packet_starting_at(&pages, 2)?;

	let audio_start_page = detect_audio_start_page(&pages);

	let mut sequence = 0u32;
	let mut output_pages = Vec::new();

	output_pages.push(OggPage {
		header_type: 0x02,
		granule_position: 0,
		serial,
		page_sequence: sequence,
		segment_table: segment_table_for_len(id_header_body.len()),
		data: id_header_body
	});
	sequence += 1;

	let comment_body = synthesize_comment_packet();
	let comment_segments = comment_body.len().div_ceil(255) + 1;
	let setup_budget = PAGE_ONE_SEGMENT_BUDGET.saturating_sub(comment_segments) * 255;
	let setup_prefix_len = setup_packet.len().min(setup_budget);

	let mut page_one_body = comment_body.clone();
	page_one_body.extend_from_slice(&setup_packet[..setup_prefix_len]);

	let mut page_one_segments = segment_table_for_len(comment_body.len());
	let setup_fits_entirely = setup_prefix_len == setup_packet.len();
	if setup_fits_entirely {
		page_one_segments.extend(segment_table_for_len(setup_prefix_len));
	} else {
		// `setup_prefix_len` is a multiple of 255 here (it was capped at
		// `setup_budget`, itself a multiple of 255), so every segment is a
		// full 255-byte chunk, leaving no terminator: this signals to the
		// reader that the packet continues onto the next page.
		page_one_segments.extend(std::iter::repeat(255u8).take(setup_prefix_len / 255));
	}

	output_pages.push(OggPage {
		header_type: 0x00,
		granule_position: 0,
		serial,
		page_sequence: sequence,
		segment_table: page_one_segments,
		data: page_one_body
	});
	sequence += 1;

	let mut remaining_setup = &setup_packet[setup_prefix_len..];
	while !remaining_setup.is_empty() {
		let chunk_len = remaining_setup.len().min(MAX_CONTINUATION_PAGE_BYTES);
		let chunk = &remaining_setup[..chunk_len];
		let is_final_chunk = chunk_len == remaining_setup.len();

		let segment_table = if is_final_chunk {
			segment_table_for_len(chunk_len)
		} else {
			vec![255u8; chunk_len / 255]
		};

		output_pages.push(OggPage {
			header_type: 0x01,
			granule_position: 0,
			serial,
			page_sequence: sequence,
			segment_table,
			data: chunk.to_vec()
		});
		sequence += 1;

		remaining_setup = &remaining_setup[chunk_len..];
	}

	for page in &pages[audio_start_page..] {
		output_pages.push(OggPage {
			header_type: page.header_type,
			granule_position: page.granule_position,
			serial,
			page_sequence: sequence,
			segment_table: page.segment_table.clone(),
			data: page.data.clone()
		});
		sequence += 1;
	}

	let mut out = Vec::new();
	for page in &output_pages {
		out.extend_from_slice(&page.to_bytes());
	}
	Some(out)
}

/// Builds the new Vorbis comment packet: type byte, `"vorbis"` tag, the fixed
/// target vendor string, and an empty user comment list. No framing bit is
/// appended, matching the source's behavior (see `DESIGN.md`).
fn synthesize_comment_packet() -> Vec<u8> {
	let vendor = TARGET_VENDOR.as_bytes();
	let mut out = Vec::with_capacity(1 + 6 + 4 + vendor.len() + 4);

	out.push(0x03);
	out.extend_from_slice(b"vorbis");
	out.extend_from_slice(&(vendor.len() as u32).to_le_bytes());
	out.extend_from_slice(vendor);
	out.extend_from_slice(&0u32.to_le_bytes()); // user comment count

	out
}

fn is_well_formed_comment_packet(packet: &[u8]) -> bool {
	packet.len() >= 7 && packet[0] == 0x03 && &packet[1..7] == b"vorbis"
}

/// Concatenates segment bodies starting at page index `start_page`,
/// continuing across subsequent pages until a segment shorter than 255
/// bytes terminates the packet. Returns `None` if no terminator is found
/// before the pages run out.
fn extract_packet_starting_at(pages: &[OggPage], start_page: usize) -> Option<Vec<u8>> {
	let mut packet = Vec::new();

	for page in pages.get(start_page..)? {
		let mut offset = 0usize;
		for &segment_len in &page.segment_table {
			let segment_len = usize::from(segment_len);
			packet.extend_from_slice(page.data.get(offset..offset + segment_len)?);
			offset += segment_len;
			if segment_len < 255 {
				return Some(packet);
			}
		}
	}

	None
}

/// Finds the index of the first audio page, per `spec.md` §4.3: the earliest
/// non-continuation page with a positive granule position whose first body
/// byte is not the setup-packet marker `0x05`. Falls back to the first page
/// with a positive granule position, then to `min(3, total_pages)`.
fn detect_audio_start_page(pages: &[OggPage]) -> usize {
	let strict_match = pages.iter().position(|page| {
		!page.is_continuation() && page.granule_position > 0 && page.data.first() != Some(&0x05)
	});
	if let Some(index) = strict_match {
		return index;
	}

	let granule_match = pages.iter().position(|page| page.granule_position > 0);
	if let Some(index) = granule_match {
		return index;
	}

	pages.len().min(3)
}

#[cfg(test)]
mod test {
	use super::*;
	use crate::vorbis::ogg_page::segment_table_for_len;

	fn page_bytes(header_type: u8, granule: i64, serial: u32, sequence: u32, body: &[u8]) -> Vec<u8> {
		OggPage {
			header_type,
			granule_position: granule,
			serial,
			page_sequence: sequence,
			segment_table: segment_table_for_len(body.len()),
			data: body.to_vec()
		}
		.to_bytes()
	}

	fn build_minimal_ogg_vorbis(vendor: &str, setup_len: usize, audio_pages: &[(i64, &[u8])]) -> Vec<u8> {
		let serial = 7;
		let mut out = Vec::new();

		out.extend_from_slice(&page_bytes(0x02, 0, serial, 0, b"id header body"));

		let mut comment = vec![0x03];
		comment.extend_from_slice(b"vorbis");
		comment.extend_from_slice(&(vendor.len() as u32).to_le_bytes());
		comment.extend_from_slice(vendor.as_bytes());
		comment.extend_from_slice(&0u32.to_le_bytes());
		out.extend_from_slice(&page_bytes(0x00, 0, serial, 1, &comment));

		let setup: Vec<u8> = (0..setup_len).map(|i| (i % 251) as u8).collect();
		out.extend_from_slice(&page_bytes(0x00, 0, serial, 2, &setup));

		for (i, &(granule, body)) in audio_pages.iter().enumerate() {
			out.extend_from_slice(&page_bytes(0x00, granule, serial, 3 + i as u32, body));
		}

		out
	}

	#[test]
	fn rewrites_vendor_string_and_clears_comments() {
		let input = build_minimal_ogg_vorbis("some encoder 1.0", 50, &[(64, b"audio packet one")]);
		let output = repackage(&input);

		let pages = OggPage::parse_all(&output);
		let comment_packet = extract_packet_starting_at(&pages, 1).unwrap();

		assert_eq!(comment_packet[0], 0x03);
		assert_eq!(&comment_packet[1..7], b"vorbis");
		let vendor_len = u32::from_le_bytes(comment_packet[7..11].try_into().unwrap()) as usize;
		assert_eq!(vendor_len, TARGET_VENDOR.len());
		assert_eq!(&comment_packet[11..11 + vendor_len], TARGET_VENDOR.as_bytes());
		let comment_count = u32::from_le_bytes(
			comment_packet[11 + vendor_len..11 + vendor_len + 4].try_into().unwrap()
		);
		assert_eq!(comment_count, 0);
	}

	#[test]
	fn every_emitted_page_has_a_valid_crc() {
		let input = build_minimal_ogg_vorbis("enc", 4000, &[(64, b"audio one"), (128, b"audio two")]);
		let output = repackage(&input);

		let mut pos = 0;
		while pos + 27 <= output.len() && &output[pos..pos + 4] == super::super::ogg_page::MAGIC {
			let num_segments = usize::from(output[pos + 26]);
			let body_len: usize =
				output[pos + 27..pos + 27 + num_segments].iter().map(|&b| usize::from(b)).sum();
			let page_len = 27 + num_segments + body_len;

			let mut page = output[pos..pos + page_len].to_vec();
			let expected_crc = u32::from_le_bytes(page[22..26].try_into().unwrap());
			page[22..26].fill(0);
			assert_eq!(super::super::crc::checksum(&page), expected_crc);

			pos += page_len;
		}
		assert_eq!(pos, output.len());
	}

	#[test]
	fn preserves_audio_page_granule_positions_and_bodies() {
		let input = build_minimal_ogg_vorbis("enc", 10, &[(64, b"one"), (128, b"two"), (192, b"three")]);
		let output = repackage(&input);

		let pages = OggPage::parse_all(&output);
		let audio_pages = &pages[3..];
		assert_eq!(audio_pages.len(), 3);
		assert_eq!(audio_pages[0].granule_position, 64);
		assert_eq!(audio_pages[0].data, b"one");
		assert_eq!(audio_pages[2].granule_position, 192);
		assert_eq!(audio_pages[2].data, b"three");
	}

	#[test]
	fn large_setup_header_spills_into_continuation_pages() {
		let input = build_minimal_ogg_vorbis("enc", 20_000, &[(64, b"audio")]);
		let output = repackage(&input);

		let pages = OggPage::parse_all(&output);
		let continuation_pages: Vec<_> = pages.iter().filter(|p| p.header_type == 0x01).collect();
		assert!(!continuation_pages.is_empty(), "a 20000-byte setup header must spill into continuation pages");
	}

	#[test]
	fn returns_input_unchanged_when_not_valid_ogg() {
		let input = b"this is not an ogg file at all".to_vec();
		let output = repackage(&input);
		assert_eq!(output, input);
	}

	#[test]
	fn returns_input_unchanged_on_too_few_pages() {
		let mut input = Vec::new();
		input.extend_from_slice(&page_bytes(0x02, 0, 1, 0, b"id"));
		let output = repackage(&input);
		assert_eq!(output, input);
	}
}
