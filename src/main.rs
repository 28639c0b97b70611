use actix_web::http::StatusCode;
use actix_web::middleware::{ErrorHandlers, Logger};
use actix_web::{App, HttpResponse, HttpServer, Responder, get, web};
use dotenv::dotenv;
use env_logger::Env;
use log::{info, warn};

mod comment;
mod database;
mod middleware;
mod post;
mod router;
mod user;
mod utils;
mod view_log;

use comment::service::CommentService;
use database::{RedisClient, RedisService};
use middleware::not_found::not_found;
use post::post_service::PostService;
use router::index::routes;
use serde_json::json;
use user::service::UserService;
use view_log::service::ViewLogService;

#[get("/")]
async fn default() -> impl Responder {
    HttpResponse::Ok().json(json!({
        "success": true,
        "message": "Welcome to the YourVoice forum API",
        "httpStatusCode": StatusCode::OK.as_u16(),
        "service": std::env::var("SERVICE_NAME").unwrap_or_else(|_| "Unknown".to_string()),
    }))
}

#[actix_web::main]
async fn main() -> std::io::Result<()> {
    // Load environment variables from .env file
    dotenv().ok();

    env_logger::Builder::from_env(Env::default().default_filter_or("info")).init();

    let port: u16 = std::env::var("PORT")
        .ok()
        .and_then(|p| p.parse().ok())
        .unwrap_or(3000);

    info!("Starting server on http://localhost:{}", port);

    let mongo_client = database::connect_to_mongo()
        .await
        .expect("Failed to connect to MongoDB");

    // Sessions survive without Redis, but can no longer be revoked
    let redis_service = match RedisClient::init().await {
        Ok(client) => Some(RedisService::new(&client)),
        Err(e) => {
            warn!("Redis unavailable, falling back to stateless JWT auth: {}", e);
            None
        }
    };

    let user_service = web::Data::new(UserService::new(&mongo_client));
    let post_service = web::Data::new(PostService::new(&mongo_client));
    let comment_service = web::Data::new(CommentService::new(&mongo_client));
    let view_log_service = web::Data::new(ViewLogService::new(&mongo_client));

    HttpServer::new(move || {
        let mut app = App::new()
            .wrap(Logger::default())
            .app_data(user_service.clone())
            .app_data(post_service.clone())
            .app_data(comment_service.clone())
            .app_data(view_log_service.clone());

        if let Some(redis) = &redis_service {
            app = app.app_data(web::Data::new(redis.clone()));
        }

        app.configure(routes)
            .wrap(ErrorHandlers::new().handler(StatusCode::NOT_FOUND, not_found))
            .service(default)
    })
    .bind(("0.0.0.0", port))?
    .run()
    .await?;

    info!("Server has stopped");

    Ok(())
}
