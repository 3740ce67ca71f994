//! Item operations for the repository.
//!
//! Title uniqueness is checked before every write and again by the
//! `uq_items_title` index; a unique violation from storage surfaces as the
//! same `Conflict` as a failed pre-check. Each operation issues exactly one
//! mutating statement, so a failed write leaves nothing behind.

use crate::domain::item::parse_created_at;
use crate::domain::{Item, ItemId, ItemPatch, NewItem};
use sqlx::sqlite::{Sqlite, SqliteRow};
use sqlx::{QueryBuilder, Row};
use tracing::{debug, info, warn};

use super::{RepoError, RepoResult, Repository};

const ITEM_COLUMNS: &str = "id, title, description, is_active, created_at";

impl Repository {
    /// Insert a new item.
    ///
    /// # Errors
    /// `Conflict` if another item already has the same title.
    pub async fn create_item(&self, new: &NewItem) -> RepoResult<Item> {
        if self.find_by_title(&new.title).await?.is_some() {
            debug!(title = %new.title, "Create rejected: title taken");
            return Err(RepoError::Conflict {
                title: new.title.clone(),
            });
        }

        let item = self.insert_item(new).await?;
        info!(id = %item.id, title = %item.title, "Item created");
        Ok(item)
    }

    async fn insert_item(&self, new: &NewItem) -> RepoResult<Item> {
        let sql = format!(
            "INSERT INTO items (title, description, is_active) VALUES (?, ?, ?) RETURNING {}",
            ITEM_COLUMNS
        );
        let row = sqlx::query(&sql)
            .bind(new.title.as_str())
            .bind(new.description.as_deref())
            .bind(new.is_active)
            .fetch_one(&self.pool)
            .await
            .map_err(|e| map_write_error(e, &new.title))?;

        item_from_row(&row)
    }

    /// List items in insertion order, skipping `skip` rows and returning at
    /// most `limit`. Negative arguments are treated as zero.
    ///
    /// # Errors
    /// Returns an error if the query fails.
    pub async fn list_items(&self, skip: i64, limit: i64) -> RepoResult<Vec<Item>> {
        let sql = format!(
            "SELECT {} FROM items ORDER BY id ASC LIMIT ? OFFSET ?",
            ITEM_COLUMNS
        );
        let rows = sqlx::query(&sql)
            .bind(limit.max(0))
            .bind(skip.max(0))
            .fetch_all(&self.pool)
            .await?;

        rows.iter().map(item_from_row).collect()
    }

    /// Fetch a single item.
    ///
    /// # Errors
    /// `NotFound` if no item has this id.
    pub async fn get_item(&self, id: ItemId) -> RepoResult<Item> {
        let sql = format!("SELECT {} FROM items WHERE id = ?", ITEM_COLUMNS);
        let row = sqlx::query(&sql)
            .bind(id.as_i64())
            .fetch_optional(&self.pool)
            .await?;

        match row {
            Some(row) => item_from_row(&row),
            None => {
                debug!(%id, "Item not found");
                Err(RepoError::NotFound(id))
            }
        }
    }

    /// Apply a partial update and return the updated item.
    ///
    /// An empty patch returns the current item untouched.
    ///
    /// # Errors
    /// `NotFound` if the item does not exist, `Conflict` if the new title
    /// belongs to a different item.
    pub async fn update_item(&self, id: ItemId, patch: &ItemPatch) -> RepoResult<Item> {
        let current = self.get_item(id).await?;
        if patch.is_empty() {
            return Ok(current);
        }

        if let Some(title) = &patch.title {
            if let Some(other) = self.find_by_title(title).await? {
                if other.id != id {
                    debug!(%id, other = %other.id, %title, "Update rejected: title taken");
                    return Err(RepoError::Conflict {
                        title: title.clone(),
                    });
                }
            }
        }

        let mut qb = QueryBuilder::<Sqlite>::new("UPDATE items SET ");
        {
            let mut set = qb.separated(", ");
            if let Some(title) = &patch.title {
                set.push("title = ").push_bind_unseparated(title.clone());
            }
            if let Some(description) = &patch.description {
                set.push("description = ")
                    .push_bind_unseparated(description.clone());
            }
            if let Some(is_active) = patch.is_active {
                set.push("is_active = ").push_bind_unseparated(is_active);
            }
        }
        qb.push(" WHERE id = ")
            .push_bind(id.as_i64())
            .push(" RETURNING ")
            .push(ITEM_COLUMNS);

        let conflict_title = patch.title.as_deref().unwrap_or(&current.title);
        let row = qb
            .build()
            .fetch_optional(&self.pool)
            .await
            .map_err(|e| map_write_error(e, conflict_title))?;

        // The row can vanish between the existence check and the write.
        let item = match row {
            Some(row) => item_from_row(&row)?,
            None => return Err(RepoError::NotFound(id)),
        };
        info!(%id, "Item updated");
        Ok(item)
    }

    /// Permanently remove an item, returning it as it was before removal.
    ///
    /// # Errors
    /// `NotFound` if the item does not exist.
    pub async fn delete_item(&self, id: ItemId) -> RepoResult<Item> {
        let sql = format!("DELETE FROM items WHERE id = ? RETURNING {}", ITEM_COLUMNS);
        let row = sqlx::query(&sql)
            .bind(id.as_i64())
            .fetch_optional(&self.pool)
            .await?;

        match row {
            Some(row) => {
                let item = item_from_row(&row)?;
                info!(%id, title = %item.title, "Item deleted");
                Ok(item)
            }
            None => {
                debug!(%id, "Delete of missing item");
                Err(RepoError::NotFound(id))
            }
        }
    }

    /// Look up an item by exact, case-sensitive title.
    pub(crate) async fn find_by_title(&self, title: &str) -> RepoResult<Option<Item>> {
        let sql = format!("SELECT {} FROM items WHERE title = ?", ITEM_COLUMNS);
        let row = sqlx::query(&sql)
            .bind(title)
            .fetch_optional(&self.pool)
            .await?;

        row.as_ref().map(item_from_row).transpose()
    }
}

fn map_write_error(err: sqlx::Error, title: &str) -> RepoError {
    match &err {
        sqlx::Error::Database(db_err) if db_err.is_unique_violation() => {
            debug!(%title, "Storage rejected duplicate title");
            RepoError::Conflict {
                title: title.to_string(),
            }
        }
        _ => RepoError::Storage(err),
    }
}

fn item_from_row(row: &SqliteRow) -> RepoResult<Item> {
    let id: i64 = row.try_get("id")?;
    let title: String = row.try_get("title")?;
    let description: Option<String> = row.try_get("description")?;

    let is_active = match row.try_get::<Option<bool>, _>("is_active")? {
        Some(flag) => flag,
        None => {
            warn!(id, "NULL is_active in stored item, treating as active");
            true
        }
    };

    // Declared as TIMESTAMP, stored as text by CURRENT_TIMESTAMP.
    let raw_created_at: String = row.try_get_unchecked("created_at")?;
    let created_at = parse_created_at(&raw_created_at).ok_or_else(|| {
        RepoError::InvalidData(format!(
            "item {} has unparseable created_at '{}'",
            id, raw_created_at
        ))
    })?;

    Ok(Item {
        id: ItemId::new(id),
        title,
        description,
        is_active,
        created_at,
    })
}
