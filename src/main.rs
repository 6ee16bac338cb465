use std::io;

use actix_web::{App, HttpServer, middleware, web};
use dotenvy::dotenv;

use pushkind_places::db::establish_connection_pool;
use pushkind_places::models::config::ServerConfig;
use pushkind_places::repository::DieselRepository;
use pushkind_places::routes;

#[actix_web::main]
async fn main() -> io::Result<()> {
    dotenv().ok();
    env_logger::init_from_env(env_logger::Env::new().default_filter_or("info"));

    let server_config = match ServerConfig::load() {
        Ok(config) => config,
        Err(e) => {
            log::error!("Failed to load configuration: {e}");
            std::process::exit(1);
        }
    };

    let pool = match establish_connection_pool(&server_config.database_url) {
        Ok(pool) => pool,
        Err(e) => {
            log::error!("Failed to establish database connection: {e}");
            std::process::exit(1);
        }
    };

    let repo = DieselRepository::new(pool);
    let bind_address = (server_config.address.clone(), server_config.port);

    log::info!(
        "Starting places service on {}:{} (database: {})",
        bind_address.0,
        bind_address.1,
        server_config.database_url
    );

    let server_config = web::Data::new(server_config);
    let repo = web::Data::new(repo);

    HttpServer::new(move || {
        App::new()
            .wrap(middleware::Logger::default())
            .app_data(repo.clone())
            .app_data(server_config.clone())
            .configure(routes::configure)
    })
    .bind(bind_address)?
    .run()
    .await
}
