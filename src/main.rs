#![allow(async_fn_in_trait)]

mod config;
mod core;
mod database;
mod error;
mod handlers;
mod request;
mod response;

use actix_web::middleware::Logger;
use actix_web::web::Data;
use actix_web::{App, HttpServer};
use log::info;
use sqlx::postgres::PgPoolOptions;

use crate::config::Config;
use crate::database::sqlx::PgSqlxManager;

#[actix_web::main]
async fn main() -> anyhow::Result<()> {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();
    let config = Config::from_env()?;
    let pool = PgPoolOptions::new()
        .max_connections(config.max_connections)
        .connect(&config.database_url)
        .await?;
    if config.run_migrations {
        sqlx::migrate!().run(&pool).await?;
        info!("migrations applied");
    }
    let manager = PgSqlxManager::new(pool);
    let address = config.server_address.clone();
    info!("listening on {}", address);
    HttpServer::new(move || {
        App::new()
            .wrap(Logger::default())
            .app_data(Data::new(manager.clone()))
            .app_data(Data::new(config.clone()))
            .configure(handlers::configure::<PgSqlxManager>)
    })
    .bind(address)?
    .run()
    .await?;
    Ok(())
}
