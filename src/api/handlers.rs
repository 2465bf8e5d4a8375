//! API Handlers
//!
//! HTTP request handlers mapping the storage contract onto JSON endpoints.
//! Storage calls block on network I/O, so each one runs on tokio's blocking
//! pool.

use std::collections::HashMap;
use std::sync::Arc;

use axum::{
    extract::{Path, State},
    Json,
};

use crate::error::{ApiError, KvError};
use crate::kv::Storage;
use crate::models::{
    GetResponse, HasResponse, HealthResponse, ItemsRequest, KeysRequest, MGetResponse, OkResponse,
    TtlResponse,
};

/// Application state shared across all handlers.
///
/// Maps storage names to the drivers serving them.
#[derive(Clone, Default)]
pub struct AppState {
    pub storages: Arc<HashMap<String, Arc<dyn Storage>>>,
}

impl AppState {
    /// Creates a new AppState serving the given storages.
    pub fn new(storages: HashMap<String, Arc<dyn Storage>>) -> Self {
        Self {
            storages: Arc::new(storages),
        }
    }

    fn storage(&self, name: &str) -> Result<Arc<dyn Storage>, ApiError> {
        self.storages
            .get(name)
            .cloned()
            .ok_or_else(|| ApiError::UnknownStorage(name.to_string()))
    }

    /// Sorted storage names.
    pub fn names(&self) -> Vec<String> {
        let mut names: Vec<String> = self.storages.keys().cloned().collect();
        names.sort();
        names
    }

    /// Stops every storage.
    pub fn stop_all(&self) {
        for storage in self.storages.values() {
            storage.stop();
        }
    }

    /// Runs a storage call on the blocking pool.
    async fn run<T, F>(&self, name: &str, call: F) -> Result<T, ApiError>
    where
        T: Send + 'static,
        F: FnOnce(&dyn Storage) -> Result<T, KvError> + Send + 'static,
    {
        let storage = self.storage(name)?;
        let result = tokio::task::spawn_blocking(move || call(storage.as_ref())).await?;
        Ok(result?)
    }
}

/// Handler for POST /kv/:storage/has
pub async fn has_handler(
    State(state): State<AppState>,
    Path(storage): Path<String>,
    Json(req): Json<KeysRequest>,
) -> Result<Json<HasResponse>, ApiError> {
    let keys = req.into_keys();
    let items = state.run(&storage, move |s| s.has(&keys)).await?;

    Ok(Json(HasResponse { items }))
}

/// Handler for GET /kv/:storage/get/:key
pub async fn get_handler(
    State(state): State<AppState>,
    Path((storage, key)): Path<(String, String)>,
) -> Result<Json<GetResponse>, ApiError> {
    let lookup = key.clone();
    let value = state.run(&storage, move |s| s.get(&lookup)).await?;

    Ok(Json(GetResponse::new(key, value.as_deref())))
}

/// Handler for POST /kv/:storage/mget
pub async fn mget_handler(
    State(state): State<AppState>,
    Path(storage): Path<String>,
    Json(req): Json<KeysRequest>,
) -> Result<Json<MGetResponse>, ApiError> {
    let keys = req.into_keys();
    let values = state.run(&storage, move |s| s.mget(&keys)).await?;

    Ok(Json(MGetResponse::new(values)))
}

/// Handler for POST /kv/:storage/set
pub async fn set_handler(
    State(state): State<AppState>,
    Path(storage): Path<String>,
    Json(req): Json<ItemsRequest>,
) -> Result<Json<OkResponse>, ApiError> {
    let items = req.into_items();
    state.run(&storage, move |s| s.set(&items)).await?;

    Ok(Json(OkResponse::new("set", &storage)))
}

/// Handler for POST /kv/:storage/mexpire
pub async fn mexpire_handler(
    State(state): State<AppState>,
    Path(storage): Path<String>,
    Json(req): Json<ItemsRequest>,
) -> Result<Json<OkResponse>, ApiError> {
    let items = req.into_items();
    state.run(&storage, move |s| s.mexpire(&items)).await?;

    Ok(Json(OkResponse::new("mexpire", &storage)))
}

/// Handler for POST /kv/:storage/ttl
pub async fn ttl_handler(
    State(state): State<AppState>,
    Path(storage): Path<String>,
    Json(req): Json<KeysRequest>,
) -> Result<Json<TtlResponse>, ApiError> {
    let keys = req.into_keys();
    let items = state.run(&storage, move |s| s.ttl(&keys)).await?;

    Ok(Json(TtlResponse { items }))
}

/// Handler for POST /kv/:storage/delete
pub async fn delete_handler(
    State(state): State<AppState>,
    Path(storage): Path<String>,
    Json(req): Json<KeysRequest>,
) -> Result<Json<OkResponse>, ApiError> {
    let keys = req.into_keys();
    state.run(&storage, move |s| s.delete(&keys)).await?;

    Ok(Json(OkResponse::new("delete", &storage)))
}

/// Handler for POST /kv/:storage/clear
pub async fn clear_handler(
    State(state): State<AppState>,
    Path(storage): Path<String>,
) -> Result<Json<OkResponse>, ApiError> {
    state.run(&storage, |s| s.clear()).await?;

    Ok(Json(OkResponse::new("clear", &storage)))
}

/// Handler for GET /health
pub async fn health_handler(State(state): State<AppState>) -> Json<HealthResponse> {
    Json(HealthResponse::healthy(state.names()))
}
