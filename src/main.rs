use clap::Parser;
use hoplink::config::Config;
use hoplink::logging::init_tracing;

#[tokio::main(flavor = "current_thread")]
async fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();

    let config = Config::parse();
    init_tracing(&config);

    config.validate()?;
    config.print_summary();

    hoplink::server::run(config).await
}
