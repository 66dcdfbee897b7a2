use clap::Parser;

#[tokio::main]
async fn main() -> color_eyre::Result<()> {
	color_eyre::install()?;

	let args = jobsift_api::Args::parse();

	jobsift_api::run(args).await
}
