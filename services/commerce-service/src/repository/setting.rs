// /commerce/services/commerce-service/src/repository/setting.rs

use async_trait::async_trait;

use super::PgUnitOfWork;
use crate::{
    models::{NewSetting, Setting},
    utils::error::AppResult,
};

#[async_trait]
pub trait SettingStore: Send {
    async fn list_settings(&mut self) -> AppResult<Vec<Setting>>;
    async fn active_settings(&mut self) -> AppResult<Vec<Setting>>;
    async fn get_setting(&mut self, setting_id: i64) -> AppResult<Option<Setting>>;
    async fn insert_setting(&mut self, setting: &NewSetting) -> AppResult<Setting>;
    async fn update_setting(&mut self, setting_id: i64, setting: &NewSetting) -> AppResult<Option<Setting>>;
    async fn delete_setting(&mut self, setting_id: i64) -> AppResult<bool>;
}

#[async_trait]
impl SettingStore for PgUnitOfWork {
    async fn list_settings(&mut self) -> AppResult<Vec<Setting>> {
        let rows = sqlx::query_as::<_, Setting>("SELECT * FROM settings ORDER BY key")
            .fetch_all(&mut *self.tx)
            .await?;
        Ok(rows)
    }

    async fn active_settings(&mut self) -> AppResult<Vec<Setting>> {
        let rows = sqlx::query_as::<_, Setting>(
            "SELECT * FROM settings WHERE is_active = TRUE ORDER BY key",
        )
        .fetch_all(&mut *self.tx)
        .await?;
        Ok(rows)
    }

    async fn get_setting(&mut self, setting_id: i64) -> AppResult<Option<Setting>> {
        let row = sqlx::query_as::<_, Setting>("SELECT * FROM settings WHERE id = $1")
            .bind(setting_id)
            .fetch_optional(&mut *self.tx)
            .await?;
        Ok(row)
    }

    async fn insert_setting(&mut self, setting: &NewSetting) -> AppResult<Setting> {
        let row = sqlx::query_as::<_, Setting>(
            r#"
            INSERT INTO settings (key, value, description, is_active)
            VALUES ($1, $2, $3, $4)
            RETURNING *
            "#,
        )
        .bind(&setting.key)
        .bind(&setting.value)
        .bind(&setting.description)
        .bind(setting.is_active)
        .fetch_one(&mut *self.tx)
        .await?;
        Ok(row)
    }

    async fn update_setting(&mut self, setting_id: i64, setting: &NewSetting) -> AppResult<Option<Setting>> {
        let row = sqlx::query_as::<_, Setting>(
            r#"
            UPDATE settings
            SET key = $2, value = $3, description = $4, is_active = $5
            WHERE id = $1
            RETURNING *
            "#,
        )
        .bind(setting_id)
        .bind(&setting.key)
        .bind(&setting.value)
        .bind(&setting.description)
        .bind(setting.is_active)
        .fetch_optional(&mut *self.tx)
        .await?;
        Ok(row)
    }

    async fn delete_setting(&mut self, setting_id: i64) -> AppResult<bool> {
        let result = sqlx::query("DELETE FROM settings WHERE id = $1")
            .bind(setting_id)
            .execute(&mut *self.tx)
            .await?;
        Ok(result.rows_affected() > 0)
    }
}
