use super::controller::{
    ban_user, delete_user, get_user, list_users, login_user, logout_user, register_user,
    report_user, update_user,
};
use actix_web::web;

pub fn user_routes(cfg: &mut web::ServiceConfig) {
    cfg.service(
        web::scope("/user")
            .route("/register", web::post().to(register_user))
            .route("/login", web::post().to(login_user))
            .route("/logout", web::post().to(logout_user))
            .route("/report/{id}", web::put().to(report_user))
            .route("/ban/{id}", web::put().to(ban_user))
            .route("", web::get().to(list_users))
            .route("/{id}", web::get().to(get_user))
            .route("/{id}", web::put().to(update_user))
            .route("/{id}", web::delete().to(delete_user)),
    );
}
