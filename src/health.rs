//! Health Check Handler
//!
//! Unauthenticated liveness endpoint reporting the service version and whether the
//! storage backend answers.

use actix_web::{web, HttpResponse};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::time::Instant;

use crate::postgres::health_check;
use crate::types::Storage;
use crate::{SERVICE_NAME, VERSION};

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "lowercase")]
pub enum ServiceStatus {
    Healthy,
    Unhealthy,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StorageStatus {
    pub backend: String,
    pub status: ServiceStatus,
    pub response_time_ms: u64,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error_message: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HealthResponse {
    pub status: ServiceStatus,
    pub service: String,
    pub version: String,
    pub timestamp: DateTime<Utc>,
    pub storage: StorageStatus,
}

/// Convert duration to milliseconds, ensuring it fits in u64
fn safe_duration_to_ms(duration: std::time::Duration) -> u64 {
    duration.as_millis().try_into().unwrap_or(u64::MAX)
}

/// Probe the configured storage backend
pub async fn check_storage(storage: &Storage) -> StorageStatus {
    let start_time = Instant::now();

    let result = match storage {
        Storage::Postgres(pool) => health_check(pool).await,
        Storage::Memory(_) => Ok(()),
    };

    let (status, error_message) = match result {
        Ok(()) => (ServiceStatus::Healthy, None),
        Err(e) => {
            log::warn!("Storage health check failed: {}", e);
            (ServiceStatus::Unhealthy, Some(e))
        },
    };

    StorageStatus {
        backend: storage.backend_name().to_string(),
        status,
        response_time_ms: safe_duration_to_ms(start_time.elapsed()),
        error_message,
    }
}

/// `GET /health`
pub async fn health(storage: web::Data<Storage>) -> HttpResponse {
    let storage = check_storage(&storage).await;
    let status = storage.status.clone();

    let response = HealthResponse {
        status: status.clone(),
        service: SERVICE_NAME.to_string(),
        version: VERSION.to_string(),
        timestamp: Utc::now(),
        storage,
    };

    match status {
        ServiceStatus::Healthy => HttpResponse::Ok().json(response),
        ServiceStatus::Unhealthy => HttpResponse::ServiceUnavailable().json(response),
    }
}
