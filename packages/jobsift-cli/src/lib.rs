use clap::builder::{
	Styles,
	styling::{AnsiColor, Effects},
};
use color_eyre::eyre;
use tracing_subscriber::EnvFilter;

/// `<crate version>-<git sha>-<target triple>`, shared by every binary's `--version`.
pub const VERSION: &str = concat!(
	env!("CARGO_PKG_VERSION"),
	"-",
	env!("VERGEN_GIT_SHA"),
	"-",
	env!("VERGEN_CARGO_TARGET_TRIPLE"),
);

pub fn styles() -> Styles {
	Styles::styled()
		.header(AnsiColor::Green.on_default() | Effects::BOLD)
		.usage(AnsiColor::Green.on_default() | Effects::BOLD)
		.literal(AnsiColor::Cyan.on_default() | Effects::BOLD)
		.placeholder(AnsiColor::Yellow.on_default())
}

/// Installs the global fmt subscriber. An unparseable level falls back to `info`.
pub fn init_tracing(log_level: &str) -> color_eyre::Result<()> {
	let filter = EnvFilter::try_new(log_level).unwrap_or_else(|_| EnvFilter::new("info"));

	tracing_subscriber::fmt().with_env_filter(filter).try_init().map_err(|err| eyre::eyre!(err))
}

#[cfg(test)]
mod tests {
	use super::*;

	#[test]
	fn version_carries_crate_version() {
		assert!(VERSION.starts_with(env!("CARGO_PKG_VERSION")));
	}
}
