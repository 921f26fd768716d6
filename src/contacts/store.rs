/// Contact persistence, keyed by owner and contact id
use crate::contacts::Contact;
use crate::error::{RolodexError, RolodexResult};
use chrono::Utc;
use sqlx::{Row, SqlitePool};

/// Database-backed contact collection, one per owner.
#[derive(Clone)]
pub struct ContactStore {
    db: SqlitePool,
}

impl ContactStore {
    pub fn new(db: SqlitePool) -> Self {
        Self { db }
    }

    /// Store a contact in the owner's collection.
    ///
    /// Keyed by the contact's own id, so re-adding the same contact
    /// overwrites the stored fields rather than duplicating the row.
    pub async fn put(&self, owner_id: &str, contact: &Contact) -> RolodexResult<()> {
        let now = Utc::now().to_rfc3339();

        sqlx::query(
            r#"
            INSERT INTO contact (owner_id, contact_id, email, alias, updated_at)
            VALUES (?1, ?2, ?3, ?4, ?5)
            ON CONFLICT(owner_id, contact_id) DO UPDATE SET
                email = excluded.email,
                alias = excluded.alias,
                updated_at = excluded.updated_at
            "#,
        )
        .bind(owner_id)
        .bind(&contact.id)
        .bind(&contact.email)
        .bind(&contact.alias)
        .bind(&now)
        .execute(&self.db)
        .await
        .map_err(RolodexError::Database)?;

        Ok(())
    }

    /// All contacts stored for the owner, unordered. An empty collection
    /// yields an empty list, not an error.
    pub async fn list(&self, owner_id: &str) -> RolodexResult<Vec<Contact>> {
        let rows = sqlx::query("SELECT contact_id, email, alias FROM contact WHERE owner_id = ?1")
            .bind(owner_id)
            .fetch_all(&self.db)
            .await
            .map_err(RolodexError::Database)?;

        rows.into_iter()
            .map(|row| {
                Ok(Contact {
                    id: row.try_get("contact_id")?,
                    email: row.try_get("email")?,
                    alias: row.try_get("alias")?,
                })
            })
            .collect()
    }
}
