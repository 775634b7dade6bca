//! User module
//!
//! This module handles user management: the admin CRUD endpoints, the self-service
//! profile routes, avatar uploads and account deletion.

pub mod dto;
pub mod error;
pub mod handlers;
pub mod models;
pub mod repository;
pub mod routes;
pub mod service;
