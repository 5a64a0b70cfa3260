use anyhow::Result;
use sea_orm::{ConnectOptions, Database, DatabaseConnection};
use std::path::Path;
use std::time::Duration;
use tracing::info;

use crate::config::SecurityConfig;

pub mod migrator;
pub mod repositories;

pub use repositories::joke::Joke;
pub use repositories::user::User;

#[derive(Clone)]
pub struct Store {
    pub conn: DatabaseConnection,
}

impl Store {
    pub async fn with_pool_options(
        db_url: &str,
        max_connections: u32,
        min_connections: u32,
    ) -> Result<Self> {
        use sea_orm_migration::MigratorTrait;

        if !db_url.contains(":memory:") {
            let path_str = db_url.trim_start_matches("sqlite:");
            if let Some(parent) = Path::new(path_str).parent() {
                tokio::fs::create_dir_all(parent).await.ok();
            }
            if !Path::new(path_str).exists() {
                std::fs::File::create(path_str)?;
            }
        }

        let mut opt = ConnectOptions::new(db_url.to_string());
        opt.max_connections(max_connections)
            .min_connections(min_connections)
            .connect_timeout(Duration::from_secs(10))
            .acquire_timeout(Duration::from_secs(10))
            .idle_timeout(Duration::from_secs(300))
            .max_lifetime(Duration::from_secs(600))
            .sqlx_logging(false);

        let conn = Database::connect(opt).await?;

        migrator::Migrator::up(&conn, None).await?;

        info!(
            "Database connected & migrations applied (pool: {}-{})",
            min_connections, max_connections
        );

        Ok(Self { conn })
    }

    fn user_repo(&self) -> repositories::user::UserRepository {
        repositories::user::UserRepository::new(self.conn.clone())
    }

    fn joke_repo(&self) -> repositories::joke::JokeRepository {
        repositories::joke::JokeRepository::new(self.conn.clone())
    }

    // ========== User Repository Methods ==========

    pub async fn find_user_by_username(&self, username: &str) -> Result<Option<User>> {
        self.user_repo().get_by_username(username).await
    }

    pub async fn find_user_by_id(&self, id: i32) -> Result<Option<User>> {
        self.user_repo().get_by_id(id).await
    }

    pub async fn create_user(
        &self,
        username: &str,
        password: &str,
        security: &SecurityConfig,
    ) -> Result<User> {
        self.user_repo().create(username, password, security).await
    }

    pub async fn verify_user_password(&self, username: &str, password: &str) -> Result<bool> {
        self.user_repo().verify_password(username, password).await
    }

    // ========== Joke Repository Methods ==========

    pub async fn create_joke(&self, author_id: i32, name: &str, content: &str) -> Result<Joke> {
        self.joke_repo().create(author_id, name, content).await
    }

    pub async fn find_joke_by_id(&self, id: i32) -> Result<Option<Joke>> {
        self.joke_repo().get(id).await
    }

    pub async fn delete_joke(&self, id: i32) -> Result<bool> {
        self.joke_repo().remove(id).await
    }

    pub async fn count_jokes(&self) -> Result<u64> {
        self.joke_repo().count().await
    }

    pub async fn list_jokes_page(&self, page: u64, per_page: u64) -> Result<Vec<Joke>> {
        self.joke_repo().list_page(page, per_page).await
    }

    pub async fn random_joke(&self) -> Result<Option<Joke>> {
        self.joke_repo().random().await
    }
}
