fn main() {
	println!("cargo:rerun-if-env-changed=LYN_AUDIO_BUILD_DATE");

	match option_env!("LYN_AUDIO_BUILD_DATE") {
		Some(build_date) => {
			println!("cargo:rustc-env=LYN_AUDIO_BUILD_DATE_VERSION_SUFFIX= ({build_date})");
		}
		None => println!("cargo:rustc-env=LYN_AUDIO_BUILD_DATE_VERSION_SUFFIX=")
	}
}
