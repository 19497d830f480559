mod cors;

use actix_web::{
    App, HttpServer,
    web::{self},
};
use common::env_config::Config;

#[actix_web::main]
async fn main() -> std::io::Result<()> {
    // get env vars
    let config = Config::from_env();
    let config_data = config.clone();

    // get info
    let is_production = config.environment == "production";
    let origin = config.cors_allowed_origin.clone();

    // init logger
    if config.console_logging_enabled {
        logger::setup().expect("Failed to set up logger");
    }

    // init db connection
    let pool = db::setup(&config.database_url, is_production)
        .await
        .expect("Failed to set up database");

    // mirror the Stripe catalog into local plans; a transient Stripe
    // outage at boot should not keep the server down
    let client = common::stripe::create_client(&config.stripe_secret_key);
    match api_billing::services::catalog::sync_plans(&client, &pool).await {
        Ok(plans) => log::info!("Synced {} plans from Stripe", plans.len()),
        Err(err) => log::warn!("Plan sync failed, keeping existing catalog: {}", err),
    }

    HttpServer::new(move || {
        App::new()
            .app_data(web::Data::new(pool.clone()))
            .app_data(web::Data::new(config_data.clone()))
            .wrap(logger::middleware()) // 2nd
            .wrap(cors::middleware(&origin)) // 1st
            .service(
                web::scope("/api")
                    .service(api_auth::mount_auth())
                    .service(api_billing::mount_webhook())
                    .service(
                        web::scope("/dashboard")
                            .wrap(api_auth::auth_middleware(config_data.clone()))
                            .service(api_auth::mount_user())
                            .service(api_apps::mount_apps())
                            .service(api_billing::mount_billing()),
                    ),
            )
    })
    .bind((config.server_host.as_str(), config.server_port))?
    .workers(config.num_workers)
    .run()
    .await
}
