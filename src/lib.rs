pub mod config;
pub mod db;
pub mod entities;
pub mod error;
pub mod extract;
pub mod pagination;
pub mod repository;
pub mod routes;
pub mod schemas;
pub mod validation;

use crate::db::Db;

#[derive(Clone)]
pub struct AppState {
    pub db: Db,
}
