/// rolodex - address-book service entry point
use rolodex::{config::ServerConfig, context::AppContext, error::RolodexResult, server};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[tokio::main]
async fn main() -> RolodexResult<()> {
    // Initialize logging
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "rolodex=debug,tower_http=debug".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    // Load configuration; any missing required value aborts startup
    let config = ServerConfig::from_env()?;

    // Create application context: store connectivity, provider discovery,
    // signing-policy check, and the initial key-set fetch all happen here
    let ctx = AppContext::new(config).await?;

    // Start server
    server::serve(ctx).await?;

    Ok(())
}
