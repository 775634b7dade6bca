//! Capability tokens
//!
//! Handlers never read identity from ambient request state. They take one of these
//! extractors as an argument, and service methods take the capability by reference.

use actix_web::{dev::Payload, FromRequest, HttpMessage, HttpRequest};
use futures_util::future::{ready, Ready};
use uuid::Uuid;

use crate::auth::jwt::Claims;
use crate::user::error::UserError;
use crate::user::models::{OwnerRef, UserRole};

/// Proof that the request was authenticated as a particular user
#[derive(Debug, Clone, PartialEq)]
pub struct ActingUser {
    pub id: Uuid,
    pub username: String,
    pub role: UserRole,
}

impl ActingUser {
    pub fn owner_ref(&self) -> OwnerRef {
        OwnerRef {
            id: self.id,
            username: self.username.clone(),
        }
    }

    /// Upgrade to the admin capability, if the role allows it
    pub fn into_admin(self) -> Result<AdminCapability, UserError> {
        match self.role {
            UserRole::Admin => Ok(AdminCapability(self)),
            UserRole::User => Err(UserError::Forbidden),
        }
    }
}

impl From<Claims> for ActingUser {
    fn from(claims: Claims) -> Self {
        Self {
            id: claims.sub,
            username: claims.username,
            role: claims.role,
        }
    }
}

impl FromRequest for ActingUser {
    type Error = UserError;
    type Future = Ready<Result<Self, Self::Error>>;

    fn from_request(req: &HttpRequest, _: &mut Payload) -> Self::Future {
        let acting = req
            .extensions()
            .get::<Claims>()
            .cloned()
            .map(ActingUser::from)
            .ok_or_else(|| UserError::Unauthorized("Please log in to get access".to_string()));
        ready(acting)
    }
}

/// Proof that the acting user is an administrator
#[derive(Debug, Clone, PartialEq)]
pub struct AdminCapability(ActingUser);

impl AdminCapability {
    pub fn acting(&self) -> &ActingUser {
        &self.0
    }
}

impl FromRequest for AdminCapability {
    type Error = UserError;
    type Future = Ready<Result<Self, Self::Error>>;

    fn from_request(req: &HttpRequest, payload: &mut Payload) -> Self::Future {
        let admin = match ActingUser::from_request(req, payload).into_inner() {
            Ok(acting) => acting.into_admin(),
            Err(err) => Err(err),
        };
        ready(admin)
    }
}
