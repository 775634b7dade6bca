//! User API handlers
//!
//! HTTP handler functions for the user endpoints. Each handler receives its capability
//! as an extractor, delegates to [`UserService`] and shapes the JSON response.

use actix_multipart::Multipart;
use actix_web::{web, HttpResponse};
use serde_json::{Map, Value};
use uuid::Uuid;

use crate::auth::{ActingUser, AdminCapability};
use crate::state::AppState;
use crate::upload::read_profile_form;
use crate::user::dto::{ProfileResponse, UserChanges, UserListResponse, UserResponse};
use crate::user::error::UserError;

/// Path IDs that don't parse can't name a stored user
fn parse_user_id(raw: &str) -> Result<Uuid, UserError> {
    Uuid::parse_str(raw).map_err(|_| UserError::UserNotFound)
}

/// List users (admin)
pub async fn get_all_users(
    state: web::Data<AppState>,
    admin: AdminCapability,
) -> Result<HttpResponse, UserError> {
    let users = state.user_service.list_users(&admin).await?;
    Ok(HttpResponse::Ok().json(UserListResponse::new(users)))
}

/// Get a user by ID (admin)
pub async fn get_user(
    state: web::Data<AppState>,
    admin: AdminCapability,
    path: web::Path<String>,
) -> Result<HttpResponse, UserError> {
    let user_id = parse_user_id(&path)?;
    let user = state.user_service.get_user(&admin, &user_id).await?;
    Ok(HttpResponse::Ok().json(UserResponse::new(user)))
}

/// Update any user (admin)
pub async fn update_user(
    state: web::Data<AppState>,
    admin: AdminCapability,
    path: web::Path<String>,
    payload: web::Json<UserChanges>,
) -> Result<HttpResponse, UserError> {
    let user_id = parse_user_id(&path)?;
    let user = state.user_service.update_user(&admin, &user_id, payload.into_inner()).await?;
    Ok(HttpResponse::Ok().json(UserResponse::new(user)))
}

/// Get the acting user's own profile; same response as [`get_user`]
pub async fn get_me(
    state: web::Data<AppState>,
    acting: ActingUser,
) -> Result<HttpResponse, UserError> {
    let user = state.user_service.get_me(&acting).await?;
    Ok(HttpResponse::Ok().json(UserResponse::new(user)))
}

/// JSON profile update
pub async fn update_me(
    state: web::Data<AppState>,
    acting: ActingUser,
    payload: web::Json<Map<String, Value>>,
) -> Result<HttpResponse, UserError> {
    let user = state.user_service.update_profile(&acting, &payload).await?;
    Ok(HttpResponse::Ok().json(ProfileResponse::new(user)))
}

/// Multipart profile update: store the optional photo first, then apply the text fields
pub async fn update_me_with_photo(
    state: web::Data<AppState>,
    acting: ActingUser,
    payload: Multipart,
) -> Result<HttpResponse, UserError> {
    let max_bytes = state.user_service.photos().config().max_bytes;
    let form = read_profile_form(payload, max_bytes).await?;

    if let Some(photo) = form.photo {
        state.user_service.upload_photo(&acting, photo).await?;
    }

    let user = state.user_service.update_profile(&acting, &form.fields).await?;
    Ok(HttpResponse::Ok().json(ProfileResponse::new(user)))
}

/// Delete the acting user's account and everything it owns
pub async fn delete_me(
    state: web::Data<AppState>,
    acting: ActingUser,
) -> Result<HttpResponse, UserError> {
    state.user_service.delete_account(&acting).await?;
    Ok(HttpResponse::NoContent().finish())
}
