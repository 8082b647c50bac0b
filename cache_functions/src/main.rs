use cache_functions::{configuration::get_configuration, startup::Application};
use common::telemetry::{get_tracing_subscriber, init_tracing_subscriber};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let tracing_subscriber =
        get_tracing_subscriber("cache_functions".into(), "info".into(), std::io::stdout);
    init_tracing_subscriber(tracing_subscriber)?;

    let configuration = get_configuration()?;
    let application = Application::build(configuration, None).await?;

    application.run_until_stopped().await?;
    Ok(())
}
