use async_trait::async_trait;
use quiz_core::model::CustomSelection;
use sqlx::Row;

use crate::repository::{PreferenceRepository, StorageError, decode_selection, encode_selection};

use super::SqliteRepository;

#[async_trait]
impl PreferenceRepository for SqliteRepository {
    async fn load_selection(&self) -> Result<Option<CustomSelection>, StorageError> {
        let row = sqlx::query("SELECT custom_selection FROM preferences WHERE id = 1")
            .fetch_optional(&self.pool)
            .await
            .map_err(|err| StorageError::Connection(err.to_string()))?;

        let Some(row) = row else {
            return Ok(None);
        };

        let raw: String = row
            .try_get("custom_selection")
            .map_err(|err| StorageError::Serialization(err.to_string()))?;

        decode_selection(&raw).map(Some)
    }

    async fn save_selection(&self, selection: &CustomSelection) -> Result<(), StorageError> {
        let encoded = encode_selection(selection)?;

        sqlx::query(
            r"
            INSERT INTO preferences (id, custom_selection, updated_at)
            VALUES (?1, ?2, ?3)
            ON CONFLICT(id) DO UPDATE SET
                custom_selection = excluded.custom_selection,
                updated_at = excluded.updated_at
            ",
        )
        .bind(1_i64)
        .bind(encoded)
        .bind(self.clock.now())
        .execute(&self.pool)
        .await
        .map_err(|err| StorageError::Connection(err.to_string()))?;

        Ok(())
    }
}
