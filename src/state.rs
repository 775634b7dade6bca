//! Shared application state handed to every handler through `web::Data`

use crate::user::service::UserService;

pub struct AppState {
    pub user_service: UserService,
}

impl AppState {
    pub fn new(user_service: UserService) -> Self {
        Self {
            user_service,
        }
    }
}
