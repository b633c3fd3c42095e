//! 本地持久化适配器
//!
//! 所有实体集合以 JSON 文本的形式整体存放在 SQLite 的键值表中，
//! 一个集合对应一个键，每次写入整体覆盖。读写失败只记录日志、
//! 不向调用方抛出：`save` 失败静默丢弃，`load` 失败按"不存在"处理。
//! 调用方不得假设写入一定成功。
//!
//! 每次成功写入会使数据版本号自增，状态缓存据此判断自身是否过期。

use std::path::{Path, PathBuf};
use std::fs;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Mutex;
use anyhow::{Context, Result};
use chrono::Utc;
use rusqlite::{params, Connection, OptionalExtension};
use serde::de::DeserializeOwned;
use serde::Serialize;
use tracing::{debug, error};

/// 各实体集合的存储键
pub mod storage_keys {
    pub const EXAMS: &str = "study_tracker_exams";
    pub const CHAPTERS: &str = "study_tracker_chapters";
    pub const STUDY_SESSIONS: &str = "study_tracker_study_sessions";
    pub const STUDY_PLANS: &str = "study_tracker_study_plans";
    pub const PERFORMANCES: &str = "study_tracker_performances";
    pub const NOTIFICATIONS: &str = "study_tracker_notifications";
    pub const USER_SETTINGS: &str = "study_tracker_user_settings";
}

pub struct Database {
    conn: Mutex<Connection>,
    db_path: PathBuf,
    data_version: AtomicU64,
}

impl Database {
    /// 创建新的数据库连接并初始化键值表
    pub fn new(db_path: &Path) -> Result<Self> {
        if let Some(parent) = db_path.parent() {
            fs::create_dir_all(parent)
                .with_context(|| format!("创建数据目录失败: {:?}", parent))?;
        }

        let conn = Connection::open(db_path)
            .with_context(|| format!("打开数据库连接失败: {:?}", db_path))?;

        let db = Database {
            conn: Mutex::new(conn),
            db_path: db_path.to_path_buf(),
            data_version: AtomicU64::new(0),
        };
        db.initialize_schema()?;
        Ok(db)
    }

    /// 默认数据库文件位置（用户数据目录下）
    pub fn default_db_path() -> PathBuf {
        dirs::data_dir()
            .unwrap_or_else(|| PathBuf::from("."))
            .join("study-tracker")
            .join("study_tracker.db")
    }

    pub fn path(&self) -> &Path {
        &self.db_path
    }

    /// 当前数据版本号，每次成功写入自增
    pub fn version(&self) -> u64 {
        self.data_version.load(Ordering::SeqCst)
    }

    fn bump_version(&self) {
        self.data_version.fetch_add(1, Ordering::SeqCst);
    }

    fn initialize_schema(&self) -> Result<()> {
        let conn = self.conn.lock().unwrap();
        conn.execute_batch(
            "CREATE TABLE IF NOT EXISTS collections (
                key TEXT PRIMARY KEY,
                value TEXT NOT NULL,
                updated_at TEXT NOT NULL
            );",
        )?;
        Ok(())
    }

    /// 整体保存一个值到指定键，失败时仅记录日志
    pub fn save<T: Serialize>(&self, key: &str, value: &T) {
        if let Err(e) = self.try_save(key, value) {
            error!("保存集合失败 key={}: {:#}", key, e);
        }
    }

    /// 读取指定键的值，不存在或损坏时返回 None
    pub fn load<T: DeserializeOwned>(&self, key: &str) -> Option<T> {
        match self.try_load(key) {
            Ok(value) => value,
            Err(e) => {
                error!("读取集合失败 key={}: {:#}", key, e);
                None
            }
        }
    }

    /// 读取一个实体集合，不存在时返回空列表
    pub fn load_collection<T: DeserializeOwned>(&self, key: &str) -> Vec<T> {
        self.load(key).unwrap_or_default()
    }

    /// 删除指定键，失败时仅记录日志
    pub fn remove(&self, key: &str) {
        if let Err(e) = self.try_remove(key) {
            error!("删除键失败 key={}: {:#}", key, e);
        }
    }

    /// 清空全部数据（设置页"清除所有数据"入口）
    pub fn clear_all(&self) {
        let result = {
            let conn = self.conn.lock().unwrap();
            conn.execute("DELETE FROM collections", [])
        };
        match result {
            Ok(n) => {
                debug!("已清空全部集合，删除 {} 个键", n);
                self.bump_version();
            }
            Err(e) => error!("清空数据失败: {:#}", e),
        }
    }

    fn try_save<T: Serialize>(&self, key: &str, value: &T) -> Result<()> {
        let json = serde_json::to_string(value).context("序列化失败")?;
        let conn = self.conn.lock().unwrap();
        conn.execute(
            "INSERT OR REPLACE INTO collections (key, value, updated_at) VALUES (?1, ?2, ?3)",
            params![key, json, Utc::now().to_rfc3339()],
        )?;
        drop(conn);
        self.bump_version();
        Ok(())
    }

    fn try_load<T: DeserializeOwned>(&self, key: &str) -> Result<Option<T>> {
        let conn = self.conn.lock().unwrap();
        let raw: Option<String> = conn
            .query_row(
                "SELECT value FROM collections WHERE key = ?1",
                params![key],
                |row| row.get(0),
            )
            .optional()?;
        match raw {
            Some(json) => Ok(Some(serde_json::from_str(&json).context("反序列化失败")?)),
            None => Ok(None),
        }
    }

    fn try_remove(&self, key: &str) -> Result<()> {
        let conn = self.conn.lock().unwrap();
        let n = conn.execute("DELETE FROM collections WHERE key = ?1", params![key])?;
        drop(conn);
        if n > 0 {
            self.bump_version();
        }
        Ok(())
    }
}
