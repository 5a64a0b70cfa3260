use anyhow::{Context, Result};
use rand::Rng;
use sea_orm::{
    ActiveModelTrait, DatabaseConnection, EntityTrait, PaginatorTrait, QueryOrder, QuerySelect,
    Set,
};
use tracing::info;

use crate::entities::jokes;
use crate::entities::prelude::*;

/// Repository for joke operations
pub struct JokeRepository {
    conn: DatabaseConnection,
}

impl JokeRepository {
    #[must_use]
    pub const fn new(conn: DatabaseConnection) -> Self {
        Self { conn }
    }

    fn map_joke_model(j: jokes::Model) -> Joke {
        Joke {
            id: j.id,
            name: j.name,
            content: j.content,
            author_id: j.author_id,
            created_at: j.created_at,
        }
    }

    pub async fn create(&self, author_id: i32, name: &str, content: &str) -> Result<Joke> {
        let active = jokes::ActiveModel {
            name: Set(name.to_string()),
            content: Set(content.to_string()),
            author_id: Set(author_id),
            created_at: Set(chrono::Utc::now().to_rfc3339()),
            ..Default::default()
        };

        let model = active
            .insert(&self.conn)
            .await
            .context("Failed to insert joke")?;

        info!("Added joke {} for user {}", model.id, author_id);
        Ok(Self::map_joke_model(model))
    }

    pub async fn get(&self, id: i32) -> Result<Option<Joke>> {
        let joke = Jokes::find_by_id(id)
            .one(&self.conn)
            .await
            .context("Failed to query joke by ID")?;

        Ok(joke.map(Self::map_joke_model))
    }

    pub async fn remove(&self, id: i32) -> Result<bool> {
        let result = Jokes::delete_by_id(id)
            .exec(&self.conn)
            .await
            .context("Failed to delete joke")?;

        Ok(result.rows_affected > 0)
    }

    pub async fn count(&self) -> Result<u64> {
        let count = Jokes::find()
            .count(&self.conn)
            .await
            .context("Failed to count jokes")?;

        Ok(count)
    }

    /// One page of jokes, newest first (zero-based page index).
    pub async fn list_page(&self, page: u64, per_page: u64) -> Result<Vec<Joke>> {
        let rows = Jokes::find()
            .order_by_desc(jokes::Column::CreatedAt)
            .order_by_desc(jokes::Column::Id)
            .paginate(&self.conn, per_page)
            .fetch_page(page)
            .await
            .context("Failed to list jokes")?;

        Ok(rows.into_iter().map(Self::map_joke_model).collect())
    }

    /// A uniformly random joke, or `None` when the table is empty.
    /// Picks a random offset into the table, the same strategy a
    /// `LIMIT 1 OFFSET ?` query would use.
    pub async fn random(&self) -> Result<Option<Joke>> {
        let count = self.count().await?;
        if count == 0 {
            return Ok(None);
        }

        let offset = rand::rng().random_range(0..count);

        let joke = Jokes::find()
            .offset(offset)
            .limit(1)
            .one(&self.conn)
            .await
            .context("Failed to query random joke")?;

        Ok(joke.map(Self::map_joke_model))
    }
}

// ============================================================================
// Data Types
// ============================================================================

#[derive(Debug, Clone)]
pub struct Joke {
    pub id: i32,
    pub name: String,
    pub content: String,
    pub author_id: i32,
    pub created_at: String,
}
