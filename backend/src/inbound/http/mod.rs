//! HTTP inbound adapter exposing the admin endpoints.

pub mod admin_users;
pub mod error;
pub mod groups;
pub mod health;
pub mod state;

pub use error::ApiResult;

use actix_web::web;

/// Register all routes. State is supplied separately via `app_data`.
pub fn configure(cfg: &mut web::ServiceConfig) {
    cfg.service(health::live).service(
        web::scope("/api/v1/admin")
            .service(admin_users::list_users)
            .service(admin_users::user_groups)
            .service(admin_users::bulk_membership)
            .service(groups::group_options),
    );
}
