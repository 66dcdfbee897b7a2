use clap::Parser;

#[tokio::main]
async fn main() -> color_eyre::Result<()> {
	color_eyre::install()?;

	let args = jobsift_worker::Args::parse();

	jobsift_worker::run(args).await
}
