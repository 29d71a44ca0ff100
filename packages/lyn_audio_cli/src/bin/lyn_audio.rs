use std::borrow::Cow;
use std::env;
use std::path::Path;
use std::process::exit;
use std::time::Instant;

use getopts::{Matches, Options, ParsingStyle};
use log::info;
use stderrlog::ColorChoice;

use lyn_audio::progress::NoopProgressSink;
use lyn_audio::{beat, convert, Codec, Config, ContainerFormat, Extras, LYN_AUDIO_VERSION_TAG};

fn main() {
	exit(match run() {
		Ok(_) => 0,
		Err(err) => {
			eprintln!("{}", err);
			1
		}
	})
}

fn run() -> Result<(), Cow<'static, str>> {
	let mut options = Options::new();

	options
		.optflag("h", "help", "Prints information about the accepted command line arguments and exits.")
		.optflag("", "version", "Prints version and copyright information, then exits.")
		.optflag("q", "quiet", "When enabled, the program will only print error messages, unless -h is specified.")
		.optflagmulti("v", "verbose", "Increases the verbosity of the messages. Can be repeated several times.")
		.optopt("", "codec", "Selects the audio payload. One of: dsp, ogg. Defaults to dsp.", "CODEC")
		.optopt("", "container", "Selects the container envelope. One of: sns, son. Defaults to sns.", "CONTAINER")
		.optopt("", "sample_rate", "Resamples the source audio to this rate before encoding.", "HZ")
		.optflag("", "mono", "Downmixes the source audio to mono before encoding.")
		.optflag("", "normalize", "Applies loudness normalization before encoding.")
		.optflag("", "four_channel", "SON only. Duplicates a stereo source into 4 channels.")
		.optflag("", "just_dance", "SNS only. Prepends the Just-Dance header.")
		.optopt(
			"",
			"beats_from",
			"SNS only. Splices the beat-marker chunk harvested from this reference SNS file.",
			"REFERENCE-FILE"
		)
		.parsing_style(ParsingStyle::StopAtFirstFree);

	match options.parse(env::args().skip(1)) {
		Ok(matches) => {
			if matches.opt_present("h") {
				print_header();
				println!();
				println!("Usage:");
				print!("    {} [OPTION]... <input WAV file> <output file>", env!("CARGO_BIN_NAME"));
				println!("{}", options.usage(""));
			} else if matches.opt_present("version") {
				print_header();
			} else {
				let quiet_mode = matches.opt_present("q");

				if !quiet_mode {
					print_header();
					println!();
				}

				if matches.free.len() != 2 {
					return Err(format!(
						"Too many or few file arguments specified. Run {} -h to see command line argument help",
						env!("CARGO_BIN_NAME")
					))?;
				}

				init_logging(&matches, quiet_mode);

				run_conversion(&matches)?;
			}

			Ok(())
		}
		Err(parse_err) => Err(format!(
			"{}\nRun {} -h to see command line argument help",
			parse_err,
			env!("CARGO_BIN_NAME")
		))?
	}
}

fn run_conversion(matches: &Matches) -> Result<(), Cow<'static, str>> {
	let input_file_name = &*matches.free[0];
	let output_file_name = &*matches.free[1];

	let mut config = Config::default();

	config.codec = match matches.opt_str("codec").as_deref() {
		Some("dsp") | None => Codec::Dsp,
		Some("ogg") => Codec::Ogg,
		Some(other) => Err(format!("Invalid value for codec option: {}", other))?
	};
	config.format = match matches.opt_str("container").as_deref() {
		Some("sns") | None => ContainerFormat::Sns,
		Some("son") => ContainerFormat::Son,
		Some(other) => Err(format!("Invalid value for container option: {}", other))?
	};
	config.target_sample_rate = matches
		.opt_str("sample_rate")
		.map(|value| value.parse::<u32>().map_err(|_| format!("Invalid value for sample_rate option: {}", value)))
		.transpose()?;
	config.force_mono = matches.opt_present("mono");
	config.normalize = matches.opt_present("normalize");
	config.four_channel = matches.opt_present("four_channel");

	let beats_from = matches.opt_str("beats_from");
	config.extras = if matches.opt_present("just_dance") {
		Extras::JustDance
	} else if beats_from.is_some() {
		Extras::CustomBeats
	} else {
		Extras::None
	};

	let beat_chunk = beats_from
		.map(|reference_path| {
			let reference_bytes = std::fs::read(&reference_path)
				.map_err(|err| format!("Could not read beat reference file: {}", err))?;
			beat::extract_beats_from_sns(&reference_bytes)
				.map_err(|err| format!("Could not harvest beats from reference file: {}", err))
		})
		.transpose()?;

	info!("Processing {} and saving to {}...", input_file_name, output_file_name);

	let convert_begin = Instant::now();
	let mut progress = NoopProgressSink;
	convert(Path::new(input_file_name), Path::new(output_file_name), &config, beat_chunk.as_ref(), &mut progress)
		.map_err(|err| format!("Error while converting the input file: {}", err))?;

	info!("Conversion completed in {:.3} s. Have a nice day!", convert_begin.elapsed().as_secs_f64());

	Ok(())
}

fn init_logging(option_matches: &Matches, quiet_mode: bool) {
	let verbosity_level = option_matches.opt_count("v");

	stderrlog::new()
		.module("lyn_audio")
		.verbosity(2 + verbosity_level)
		.show_level(false)
		.quiet(quiet_mode)
		.color(ColorChoice::Never)
		.init()
		.unwrap();
}

fn print_header() {
	println!("{}", LYN_AUDIO_VERSION_TAG);
	println!("{}", env!("CARGO_PKG_DESCRIPTION"));
}
