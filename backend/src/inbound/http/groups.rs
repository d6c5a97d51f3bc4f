//! Group selection data HTTP handler.
//!
//! ```text
//! GET /api/v1/admin/groups/options
//! ```

use actix_web::{get, web, HttpRequest};
use serde::Deserialize;

use crate::domain::GroupOption;
use crate::inbound::http::admin_users::require_moderator;
use crate::inbound::http::state::HttpState;
use crate::inbound::http::ApiResult;

/// Query parameters of the options listing.
#[derive(Debug, Default, Deserialize)]
pub struct GroupOptionsQuery {
    /// Include the synthetic "without group" entry.
    pub show_without_group: Option<bool>,
}

/// List group selection options with member counts.
#[get("/groups/options")]
pub async fn group_options(
    state: web::Data<HttpState>,
    request: HttpRequest,
    query: web::Query<GroupOptionsQuery>,
) -> ApiResult<web::Json<Vec<GroupOption>>> {
    require_moderator(&state, &request).await?;

    let options = state
        .group_options
        .options(query.show_without_group.unwrap_or(false))
        .await?;
    Ok(web::Json(options))
}
