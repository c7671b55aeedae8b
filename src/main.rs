mod attachments;
mod auth;
mod config;
mod db;
mod errors;
mod fanout;
mod membership;
mod models;
mod moderation;
mod permissions;
mod routes;

use crate::config::Config;
use crate::db::Db;
use crate::fanout::Fanout;
use actix_cors::Cors;
use actix_web::http::header;
use actix_web::middleware::Logger;
use actix_web::web::Data;
use actix_web::{App, HttpServer, web};
use env_logger::Env;
use std::time::Duration;

#[actix_web::main]
async fn main() -> std::io::Result<()> {
    // Init logger to show info by default, but can be overridden by RUST_LOG
    env_logger::Builder::from_env(Env::default().default_filter_or("info")).init();
    let cfg = Config::from_env_config();

    let db = Db::connect_and_migrate(&cfg.database_path)
        .await
        .expect("database init failed");

    // One outbound client for all external collaborators; the timeout keeps a
    // slow dependency from hanging requests.
    let http = reqwest::Client::builder()
        .timeout(Duration::from_secs(cfg.external_timeout_secs))
        .build()
        .expect("http client init failed");
    let fanout = Fanout::new(http.clone(), cfg.realtime_endpoint.clone());

    log::info!("Starting server at {}", cfg.listen);

    let listen_addr = cfg.listen.clone();
    HttpServer::new(move || {
        let cors = Cors::permissive() // change later
            .allowed_methods(vec!["GET", "POST", "PATCH", "PUT", "DELETE"])
            .allowed_headers(vec![header::AUTHORIZATION, header::ACCEPT, header::CONTENT_TYPE])
            .supports_credentials()
            .max_age(3600);

        App::new()
            .wrap(Logger::default())
            .wrap(cors)
            .app_data(Data::new(cfg.clone()))
            .app_data(Data::new(db.clone()))
            .app_data(Data::new(http.clone()))
            .app_data(Data::new(fanout.clone()))
            .service(
                web::scope("/api")
                    .route("/health", web::get().to(routes::health::health_check))
                    .route("/setup", web::get().to(routes::profiles::setup))
                    .route("/profile", web::get().to(routes::profiles::me))
                    .service(
                        web::scope("/servers")
                            .route("", web::post().to(routes::servers::create_server))
                            .route("/{server_id}", web::get().to(routes::servers::get_server))
                            .route(
                                "/{server_id}/invite-code",
                                web::patch().to(routes::servers::regenerate_invite_code),
                            )
                            .route("/{server_id}/landing", web::get().to(routes::servers::landing)),
                    )
                    .service(
                        web::scope("/invite")
                            .route("/{invite_code}", web::post().to(routes::invites::redeem)),
                    )
                    .service(
                        web::scope("/channels")
                            .route(
                                "/{channel_id}/messages",
                                web::get().to(routes::channels::list_messages),
                            )
                            .route(
                                "/{channel_id}/messages",
                                web::post().to(routes::channels::post_message),
                            ),
                    )
                    .service(
                        web::scope("/messages")
                            .route("/{message_id}", web::patch().to(routes::messages::edit_message))
                            .route(
                                "/{message_id}",
                                web::delete().to(routes::messages::delete_message),
                            ),
                    )
                    .route(
                        "/attachments/kind",
                        web::get().to(routes::attachments::attachment_kind),
                    )
                    .route("/media/token", web::get().to(routes::media::media_token))
                    .route("/assistant", web::post().to(routes::assistant::generate)),
            )
    })
    .bind(&listen_addr)?
    .run()
    .await
}
