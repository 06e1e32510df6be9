use std::path::Path;

use chrono::Utc;
use sqlx::{ConnectOptions, Row, SqlitePool, sqlite::SqliteConnectOptions, sqlite::SqliteRow};

use crate::error::AppError;

use super::model::WidgetInstance;

#[derive(Clone)]
pub struct WidgetStorage {
    pub pool: SqlitePool,
}

impl WidgetStorage {
    pub async fn connect_sqlite(path: &str, wal: bool) -> Result<Self, AppError> {
        if let Some(parent) = Path::new(path).parent()
            && !parent.as_os_str().is_empty()
        {
            std::fs::create_dir_all(parent)
                .map_err(|e| AppError::Internal(format!("创建 sqlite 目录失败: {e}")))?;
        }
        let opt = SqliteConnectOptions::new()
            .filename(Path::new(path))
            .create_if_missing(true)
            .log_statements(tracing::log::LevelFilter::Off);
        let pool = SqlitePool::connect_with(opt)
            .await
            .map_err(|e| AppError::Internal(format!("sqlite connect: {e}")))?;
        if wal {
            sqlx::query("PRAGMA journal_mode=WAL;")
                .execute(&pool)
                .await
                .ok();
        }
        sqlx::query("PRAGMA synchronous=NORMAL;")
            .execute(&pool)
            .await
            .ok();
        Ok(Self { pool })
    }

    pub async fn init_schema(&self) -> Result<(), AppError> {
        let ddl = r#"
        CREATE TABLE IF NOT EXISTS widget_instance (
            instance_id INTEGER PRIMARY KEY AUTOINCREMENT,
            instance_type TEXT,
            code TEXT,
            theme_id INTEGER,
            title TEXT,
            store_ids TEXT NOT NULL DEFAULT '[]',
            sort_order INTEGER NOT NULL DEFAULT 0,
            widget_parameters TEXT NOT NULL DEFAULT '{}',
            created_at TEXT NOT NULL,
            updated_at TEXT NOT NULL
        );
        CREATE INDEX IF NOT EXISTS idx_widget_instance_theme ON widget_instance(theme_id);
        "#;
        sqlx::query(ddl).execute(&self.pool).await?;
        Ok(())
    }

    /// 按 ID 读取实例；不存在返回 None
    pub async fn load(&self, instance_id: i64) -> Result<Option<WidgetInstance>, AppError> {
        let row = sqlx::query(
            "SELECT instance_id, instance_type, code, theme_id, title, store_ids, sort_order, widget_parameters
             FROM widget_instance WHERE instance_id = ?",
        )
        .bind(instance_id)
        .fetch_optional(&self.pool)
        .await?;
        row.map(|r| row_to_instance(&r)).transpose()
    }

    /// 新增实例，返回分配的 ID
    pub async fn insert(&self, instance: &WidgetInstance) -> Result<i64, AppError> {
        let now = Utc::now().to_rfc3339();
        let (store_ids, params) = encode_json_columns(instance)?;
        let res = sqlx::query(
            "INSERT INTO widget_instance
                (instance_type, code, theme_id, title, store_ids, sort_order, widget_parameters, created_at, updated_at)
             VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?)",
        )
        .bind(&instance.instance_type)
        .bind(&instance.code)
        .bind(instance.theme_id)
        .bind(&instance.title)
        .bind(store_ids)
        .bind(instance.sort_order)
        .bind(params)
        .bind(&now)
        .bind(&now)
        .execute(&self.pool)
        .await?;
        Ok(res.last_insert_rowid())
    }

    /// 更新已有实例；返回是否命中
    pub async fn update(&self, instance: &WidgetInstance) -> Result<bool, AppError> {
        let Some(id) = instance.instance_id else {
            return Err(AppError::Validation("更新需要 instance_id".into()));
        };
        let (store_ids, params) = encode_json_columns(instance)?;
        let res = sqlx::query(
            "UPDATE widget_instance SET
                instance_type = ?, code = ?, theme_id = ?, title = ?,
                store_ids = ?, sort_order = ?, widget_parameters = ?, updated_at = ?
             WHERE instance_id = ?",
        )
        .bind(&instance.instance_type)
        .bind(&instance.code)
        .bind(instance.theme_id)
        .bind(&instance.title)
        .bind(store_ids)
        .bind(instance.sort_order)
        .bind(params)
        .bind(Utc::now().to_rfc3339())
        .bind(id)
        .execute(&self.pool)
        .await?;
        Ok(res.rows_affected() > 0)
    }
}

fn encode_json_columns(instance: &WidgetInstance) -> Result<(String, String), AppError> {
    let store_ids = serde_json::to_string(&instance.store_ids)
        .map_err(|e| AppError::Internal(format!("序列化 store_ids 失败: {e}")))?;
    let params = serde_json::to_string(&instance.widget_parameters)
        .map_err(|e| AppError::Internal(format!("序列化 widget_parameters 失败: {e}")))?;
    Ok((store_ids, params))
}

fn row_to_instance(row: &SqliteRow) -> Result<WidgetInstance, AppError> {
    let store_ids: String = row.try_get("store_ids")?;
    let params: String = row.try_get("widget_parameters")?;
    Ok(WidgetInstance {
        instance_id: row.try_get("instance_id")?,
        instance_type: row.try_get("instance_type")?,
        code: row.try_get("code")?,
        theme_id: row.try_get("theme_id")?,
        title: row.try_get("title")?,
        // 旧数据列内容损坏时退化为空值
        store_ids: serde_json::from_str(&store_ids).unwrap_or_default(),
        sort_order: row.try_get("sort_order")?,
        widget_parameters: serde_json::from_str(&params)
            .unwrap_or_else(|_| serde_json::Value::Object(Default::default())),
    })
}
