use crate::api::inline_scope;
use crate::config::config::{Config, DatabaseSetting, PersistenceLayer};
use crate::middleware::request_id::RequestIdMiddleware;
use crate::state::AppState;
use access_control::handler::PermissionHandlers;
use access_control::role::SimpleUserRoleChecker;
use actix_web::web::{Data, PayloadConfig};
use actix_web::{dev::Server, App, HttpServer};
use anyhow::{Context, Error};
use database::content::{ContentStore, PgContentStore};
use database::entity::{EntityStore, PgEntityStore};
use database::install::create_inline_content_table;
use database::memory::{MemoryContentStore, MemoryEntityStore};
use sqlx::{postgres::PgPoolOptions, PgPool};
use std::net::TcpListener;
use std::sync::Arc;
use std::time::Duration;
use tracing::info;
use tracing_actix_web::TracingLogger;

pub struct Application {
  port: u16,
  server: Server,
}

impl Application {
  pub async fn build(config: Config, state: AppState) -> Result<Self, Error> {
    let address = format!("{}:{}", config.application.host, config.application.port);
    let listener = TcpListener::bind(&address)?;
    let port = listener.local_addr()?.port();
    info!("Server started at {}", listener.local_addr()?);
    let server = run(listener, state)?;
    Ok(Self { port, server })
  }

  pub async fn run_until_stopped(self) -> Result<(), std::io::Error> {
    self.server.await
  }

  pub fn port(&self) -> u16 {
    self.port
  }
}

pub fn run(listener: TcpListener, state: AppState) -> Result<Server, Error> {
  let server = HttpServer::new(move || {
    App::new()
      .wrap(RequestIdMiddleware)
      .wrap(TracingLogger::default())
      .app_data(PayloadConfig::new(state.config.inline.payload_limit))
      .app_data(Data::new(state.clone()))
      .service(inline_scope(&state.config.inline.url))
  })
  .listen(listener)?
  .run();
  Ok(server)
}

/// Build the application state with the permission handlers derived from the configuration.
pub async fn init_state(config: &Config) -> Result<AppState, Error> {
  let mut permission_handlers = PermissionHandlers::new();
  if let Some(roles) = &config.inline.allowed_roles {
    info!("allow inline editing for roles: {:?}", roles);
    SimpleUserRoleChecker::new(roles.clone()).install(&mut permission_handlers);
  }
  init_state_with_handlers(config, permission_handlers).await
}

pub async fn init_state_with_handlers(
  config: &Config,
  permission_handlers: PermissionHandlers,
) -> Result<AppState, Error> {
  let setting = &config.inline;
  let (content_store, entity_store): (Arc<dyn ContentStore>, Arc<dyn EntityStore>) =
    match setting.persistence_layer {
      PersistenceLayer::Memory => {
        info!("Using in-memory inline content storage");
        let entity_store = setting
          .entities
          .iter()
          .fold(MemoryEntityStore::new(), |store, mapping| {
            let properties = mapping
              .properties
              .iter()
              .map(String::as_str)
              .collect::<Vec<_>>();
            store.with_type(&mapping.entity, &properties)
          });
        (Arc::new(MemoryContentStore::new()), Arc::new(entity_store))
      },
      PersistenceLayer::Postgres => {
        info!("Preparing to run database migrations...");
        let pg_pool = get_connection_pool(&config.db_settings).await?;
        if setting.install_database {
          create_inline_content_table(&pg_pool, &setting.table_name)
            .await
            .context("fail to install the inline content table")?;
        }
        (
          Arc::new(PgContentStore::new(pg_pool.clone(), &setting.table_name)?),
          Arc::new(PgEntityStore::new(pg_pool, setting.entities.clone())?),
        )
      },
    };

  Ok(AppState::new(
    config.clone(),
    permission_handlers,
    content_store,
    Some(entity_store),
  ))
}

async fn get_connection_pool(setting: &DatabaseSetting) -> Result<PgPool, Error> {
  info!("Connecting to postgres database with setting: {}", setting);
  PgPoolOptions::new()
    .max_connections(setting.max_connections)
    .acquire_timeout(Duration::from_secs(10))
    .max_lifetime(Duration::from_secs(30 * 60))
    .idle_timeout(Duration::from_secs(30))
    .connect_with(setting.pg_conn_opts.clone())
    .await
    .map_err(|e| anyhow::anyhow!("Failed to connect to postgres database: {}", e))
}
