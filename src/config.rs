use std::{net::SocketAddr, path::PathBuf};

use anyhow::Context;

pub const IN_MEMORY_DATABASE: &str = ":memory:";

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Environment {
    /// Any `ENVIRONMENT` value other than `testing`, including unset.
    Production,
    Testing,
}

impl Environment {
    pub fn parse(value: Option<&str>) -> Self {
        match value.unwrap_or("developing") {
            "testing" => Environment::Testing,
            _ => Environment::Production,
        }
    }
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct PostgresSettings {
    pub user: String,
    pub password: String,
    pub host: String,
    pub port: u16,
    pub db_name: String,
}

impl PostgresSettings {
    pub fn url(&self) -> String {
        format!(
            "postgres://{}:{}@{}:{}/{}",
            urlencoding::encode(&self.user),
            urlencoding::encode(&self.password),
            self.host,
            self.port,
            self.db_name
        )
    }
}

#[derive(Clone, Debug)]
pub struct Settings {
    pub environment: Environment,
    pub addr: SocketAddr,
    pub base_dir: PathBuf,
    pub database_path: String,
    pub seed_csv_path: PathBuf,
    pub postgres: Option<PostgresSettings>,
}

impl Settings {
    pub fn from_env() -> anyhow::Result<Self> {
        dotenvy::dotenv().ok();
        Self::resolve(|key| std::env::var(key).ok())
    }

    pub fn resolve(lookup: impl Fn(&str) -> Option<String>) -> anyhow::Result<Self> {
        match Environment::parse(lookup("ENVIRONMENT").as_deref()) {
            Environment::Testing => Self::testing(lookup),
            Environment::Production => Self::production(lookup),
        }
    }

    pub fn production(lookup: impl Fn(&str) -> Option<String>) -> anyhow::Result<Self> {
        let base_dir = base_dir();
        let var = |key: &str, default: &str| lookup(key).unwrap_or_else(|| default.to_string());

        let port: u16 = var("POSTGRES_DB_PORT", "5432").parse().context("POSTGRES_DB_PORT")?;
        let postgres = PostgresSettings {
            user: var("POSTGRES_USER", "test_user"),
            password: var("POSTGRES_PASSWORD", "test_password"),
            host: var("POSTGRES_HOST", "test_host"),
            port,
            db_name: var("POSTGRES_DB", "test_db"),
        };

        Ok(Self {
            environment: Environment::Production,
            addr: bind_addr(&lookup)?,
            database_path: base_dir.join("data").join("theater.db").display().to_string(),
            seed_csv_path: base_dir.join("data").join("seed_data").join("imdb_movies.csv"),
            base_dir,
            postgres: Some(postgres),
        })
    }

    /// Database and seed paths are fixed here and ignore the environment.
    pub fn testing(lookup: impl Fn(&str) -> Option<String>) -> anyhow::Result<Self> {
        let base_dir = base_dir();
        Ok(Self {
            environment: Environment::Testing,
            addr: bind_addr(&lookup)?,
            database_path: IN_MEMORY_DATABASE.to_string(),
            seed_csv_path: base_dir.join("data").join("seed_data").join("test_data.csv"),
            base_dir,
            postgres: None,
        })
    }
}

fn base_dir() -> PathBuf {
    PathBuf::from(env!("CARGO_MANIFEST_DIR"))
}

fn bind_addr(lookup: &impl Fn(&str) -> Option<String>) -> anyhow::Result<SocketAddr> {
    let host = lookup("HOST").unwrap_or_else(|| "0.0.0.0".to_string());
    let port: u16 = lookup("PORT").unwrap_or_else(|| "8000".to_string()).parse().context("PORT")?;
    format!("{host}:{port}").parse().context("HOST/PORT")
}
