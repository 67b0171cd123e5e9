use clap::Parser;
use tracing_subscriber::EnvFilter;
use visualize::Args;

fn main() -> anyhow::Result<()> {
    let args = Args::parse();

    tracing_subscriber::fmt()
        .compact()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .init();

    let outcome = visualize::run(&args)?;

    if outcome.summary.boxes == 0 {
        tracing::info!("{}", detection::NO_FOOD_MESSAGE);
    }
    println!("{}", outcome.output.display());

    Ok(())
}
