use inline_editing::application::{init_state, Application};
use inline_editing::config::config::get_configuration;
use inline_editing::telemetry::init_subscriber;
use tracing::info;

#[actix_web::main]
async fn main() -> anyhow::Result<()> {
  dotenvy::dotenv().ok();

  let level = std::env::var("RUST_LOG").unwrap_or("info".to_string());
  println!("Inline editing server with RUST_LOG={}", level);
  let filters = vec![
    format!("actix_web={}", level),
    format!("inline_editing={}", level),
    format!("access_control={}", level),
    format!("database={}", level),
  ];
  let conf =
    get_configuration().map_err(|e| anyhow::anyhow!("Failed to read configuration: {}", e))?;
  init_subscriber(&conf.app_env, filters)?;
  info!("Environment: {}", conf.app_env.as_str());

  let state = init_state(&conf)
    .await
    .map_err(|e| anyhow::anyhow!("Failed to initialize application state: {}", e))?;
  let application = Application::build(conf, state).await?;
  application.run_until_stopped().await?;

  Ok(())
}
