//! User management routes
//!
//! Configuration of all user-related HTTP endpoints.

use actix_web::{guard, http::header::CONTENT_TYPE, web};
use std::sync::Arc;

use crate::auth::{JwtMiddleware, JwtService};
use crate::user::error::UserError;
use crate::user::handlers;

/// Matches `multipart/form-data` bodies regardless of boundary
fn multipart_guard() -> impl guard::Guard {
    guard::fn_guard(|ctx| {
        ctx.head()
            .headers()
            .get(CONTENT_TYPE)
            .and_then(|value| value.to_str().ok())
            .is_some_and(|value| value.starts_with("multipart/form-data"))
    })
}

/// JSON bodies that fail to parse surface as 400s in the usual error shape
fn json_config() -> web::JsonConfig {
    web::JsonConfig::default().error_handler(|err, _req| {
        UserError::ValidationError(format!("Malformed JSON body: {err}")).into()
    })
}

/// Configure user management routes
///
/// Every route sits behind the bearer-token middleware.
pub fn configure_user_routes(cfg: &mut web::ServiceConfig, jwt_service: Arc<JwtService>) {
    cfg.service(
        web::scope("/api/v1/users")
            .wrap(JwtMiddleware::new(jwt_service))
            .app_data(json_config())
            // Self-service, registered before /{id} so "me" isn't read as an ID
            .service(
                web::resource("/me")
                    .route(web::get().to(handlers::get_me))
                    .route(web::patch().guard(multipart_guard()).to(handlers::update_me_with_photo))
                    .route(web::patch().to(handlers::update_me))
                    .route(web::delete().to(handlers::delete_me)),
            )
            // Admin only
            .service(web::resource("").route(web::get().to(handlers::get_all_users)))
            .service(
                web::resource("/{id}")
                    .route(web::get().to(handlers::get_user))
                    .route(web::patch().to(handlers::update_user)),
            ),
    );
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::UploadConfig;
    use crate::state::AppState;
    use crate::store::{memory::InMemoryStore, Repositories};
    use crate::upload::PhotoProcessor;
    use crate::user::service::UserService;
    use actix_web::{test, web::Data, App};

    #[actix_web::test]
    async fn test_routes_require_token() {
        let jwt = Arc::new(JwtService::new("test_secret", 60));
        let state = AppState::new(UserService::new(
            Repositories::in_memory(Arc::new(InMemoryStore::new())),
            PhotoProcessor::new(UploadConfig::default()),
        ));
        let app = test::init_service(
            App::new()
                .app_data(Data::new(state))
                .configure(|cfg| configure_user_routes(cfg, jwt)),
        )
        .await;

        for uri in ["/api/v1/users", "/api/v1/users/me"] {
            let req = test::TestRequest::get().uri(uri).to_request();
            let resp = test::try_call_service(&app, req).await;
            let status = match resp {
                Ok(resp) => resp.status(),
                Err(err) => err.as_response_error().status_code(),
            };
            assert_eq!(status, 401, "{uri} should require a token");
        }
    }
}
