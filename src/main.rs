mod config;
mod db;
mod errors;
mod handlers;
mod models;
mod utils;

use actix_web::{middleware, web, App, HttpServer};
use dotenv::dotenv;
use log::info;
use std::io;

use crate::config::Config;

#[actix_web::main]
async fn main() -> io::Result<()> {
    dotenv().ok();
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    let config = Config::from_env().map_err(|err| io::Error::new(io::ErrorKind::InvalidInput, err))?;

    // One pool for the whole process; handlers borrow connections from it per request.
    let pool = db::create_pool(&config)
        .await
        .map_err(|err| io::Error::new(io::ErrorKind::Other, err))?;

    db::run_migrations(&pool)
        .await
        .map_err(|err| io::Error::new(io::ErrorKind::Other, err))?;
    info!("database schema is up to date");

    info!("Starting server at {}", config.bind_address);

    HttpServer::new(move || {
        App::new()
            .wrap(middleware::Logger::default())
            .app_data(web::Data::new(pool.clone()))
            .configure(handlers::configure)
    })
    .bind(&config.bind_address)?
    .run()
    .await
}
