//! Admin user management HTTP handlers.
//!
//! ```text
//! GET  /api/v1/admin/users
//! GET  /api/v1/admin/users/{id}/groups
//! POST /api/v1/admin/users/bulk-membership
//! ```
//!
//! The write path answers with a `303 See Other` to the sanitized
//! referring location in every case; validation failures are silent by
//! design and never surface an error body.

use actix_web::http::header;
use actix_web::{get, post, web, HttpRequest, HttpResponse};
use serde::{Deserialize, Serialize};
use url::form_urlencoded;

use crate::domain::{
    ActorId, BatchOutcome, DomainError, GroupFilterParams, GroupId, MutationBatch, ReplayToken,
    UserId, UserListRequest,
};
use crate::inbound::http::state::HttpState;
use crate::inbound::http::ApiResult;

/// Header carrying the authenticated actor id, set by the upstream
/// authentication proxy.
pub const ACTOR_HEADER: &str = "x-actor-id";

/// Query parameters of the user listing.
///
/// `group_id` / `include_hierarchy` are the structured query fields;
/// `group` / `hierarchy` are the raw legacy parameters kept for saved
/// admin bookmarks. Structured wins on conflict.
#[derive(Debug, Default, Deserialize)]
pub struct UsersListQuery {
    /// Structured group filter; `-1` selects users without any group.
    pub group_id: Option<i64>,
    /// Structured hierarchy-inclusive flag.
    pub include_hierarchy: Option<bool>,
    /// Legacy group filter parameter.
    pub group: Option<i64>,
    /// Legacy hierarchy flag parameter.
    pub hierarchy: Option<bool>,
    /// One-based page number.
    pub page: Option<u32>,
}

/// Response payload for the user listing.
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct UsersListResponse {
    /// Matching user ids for the requested page.
    pub users: Vec<UserId>,
    /// Total matches across all pages.
    pub total: u64,
    /// The returned page.
    pub page: u32,
}

/// One group entry of a user's membership listing.
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct UserGroupResponse {
    /// Group identifier.
    pub id: GroupId,
    /// Parent group, absent for roots.
    pub parent_id: Option<GroupId>,
    /// Display name.
    pub name: String,
}

fn extract_actor(request: &HttpRequest) -> Result<ActorId, DomainError> {
    let raw = request
        .headers()
        .get(ACTOR_HEADER)
        .and_then(|value| value.to_str().ok())
        .ok_or_else(|| DomainError::unauthorized("actor header missing"))?;
    raw.parse::<i64>()
        .ok()
        .and_then(|value| ActorId::try_new(value).ok())
        .ok_or_else(|| DomainError::unauthorized("actor header is not a valid id"))
}

pub(crate) async fn require_moderator(
    state: &HttpState,
    request: &HttpRequest,
) -> Result<ActorId, DomainError> {
    let actor = extract_actor(request)?;
    if state.moderation.can_moderate_groups(actor).await {
        Ok(actor)
    } else {
        Err(DomainError::forbidden("actor cannot moderate groups"))
    }
}

/// List users, optionally filtered by group membership.
#[get("/users")]
pub async fn list_users(
    state: web::Data<HttpState>,
    request: HttpRequest,
    query: web::Query<UsersListQuery>,
) -> ApiResult<web::Json<UsersListResponse>> {
    require_moderator(&state, &request).await?;

    let query = query.into_inner();
    let page = state
        .user_list
        .list(&UserListRequest {
            filter: GroupFilterParams {
                structured_group: query.group_id,
                raw_group: query.group,
                structured_hierarchy: query.include_hierarchy,
                raw_hierarchy: query.hierarchy,
            },
            page: query.page.unwrap_or(1),
        })
        .await?;

    Ok(web::Json(UsersListResponse {
        users: page.user_ids,
        total: page.total,
        page: page.page,
    }))
}

/// List the groups a user belongs to.
#[get("/users/{id}/groups")]
pub async fn user_groups(
    state: web::Data<HttpState>,
    request: HttpRequest,
    path: web::Path<i64>,
) -> ApiResult<web::Json<Vec<UserGroupResponse>>> {
    require_moderator(&state, &request).await?;

    let user = UserId::try_new(path.into_inner())
        .map_err(|err| DomainError::invalid_request(err.to_string()))?;
    let groups = state.group_options.groups_for_user(user).await?;

    Ok(web::Json(
        groups
            .into_iter()
            .map(|group| UserGroupResponse {
                id: group.id,
                parent_id: group.parent_id,
                name: group.name,
            })
            .collect(),
    ))
}

/// Decoded bulk mutation form.
#[derive(Debug, Default, Clone, PartialEq, Eq)]
struct BulkForm {
    user_ids: Vec<UserId>,
    join_group: Option<GroupId>,
    leave_group: Option<GroupId>,
    replay_token: Option<ReplayToken>,
    page: u32,
}

/// Decode an urlencoded bulk form body.
///
/// `users` may repeat (both `users` and the bracketed `users[]` spelling
/// are accepted). Values that fail to parse as positive integers are
/// dropped rather than failing the request; the domain gates take care of
/// the rest.
fn parse_bulk_form(body: &str) -> BulkForm {
    let mut form = BulkForm {
        page: 1,
        ..BulkForm::default()
    };
    for (name, value) in form_urlencoded::parse(body.as_bytes()) {
        match name.as_ref() {
            "users" | "users[]" => {
                if let Some(user) = parse_positive(&value).and_then(|v| UserId::try_new(v).ok()) {
                    form.user_ids.push(user);
                }
            }
            "join_group" => {
                form.join_group = parse_positive(&value).and_then(|v| GroupId::try_new(v).ok());
            }
            "leave_group" => {
                form.leave_group = parse_positive(&value).and_then(|v| GroupId::try_new(v).ok());
            }
            "replay_token" => {
                form.replay_token = ReplayToken::new(value.as_ref());
            }
            "page" => {
                if let Ok(page) = value.parse::<u32>() {
                    form.page = page.max(1);
                }
            }
            _ => {}
        }
    }
    form
}

fn parse_positive(value: &str) -> Option<i64> {
    value.trim().parse::<i64>().ok()
}

fn see_other(location: &str) -> HttpResponse {
    HttpResponse::SeeOther()
        .insert_header((header::LOCATION, location.to_owned()))
        .finish()
}

/// Apply a batched membership mutation and redirect back.
#[post("/users/bulk-membership")]
pub async fn bulk_membership(
    state: web::Data<HttpState>,
    request: HttpRequest,
    body: String,
) -> HttpResponse {
    let return_url = request
        .headers()
        .get(header::REFERER)
        .and_then(|value| value.to_str().ok())
        .unwrap_or("/")
        .to_owned();
    let form = parse_bulk_form(&body);

    // An unidentifiable actor is handled like any other gate failure:
    // redirect without effect, no error body.
    let Ok(actor) = extract_actor(&request) else {
        return see_other(&crate::domain::Redirect::sanitized(&return_url, form.page).location);
    };

    let outcome = state
        .bulk
        .process(MutationBatch {
            actor,
            user_ids: form.user_ids,
            join_group: form.join_group,
            leave_group: form.leave_group,
            replay_token: form.replay_token,
            page: form.page,
            return_url,
        })
        .await;

    match outcome {
        BatchOutcome::Completed { result, redirect } => {
            let redirect = redirect.with_result_params(result.joined, result.left);
            see_other(&redirect.location)
        }
        BatchOutcome::Rejected { redirect } => see_other(&redirect.location),
    }
}
