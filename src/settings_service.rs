//! 用户设置服务
//!
//! 单例记录，只有一个存储键、一种结构；未保存过时返回内置默认值。

use std::sync::Arc;
use tracing::debug;

use crate::database::{storage_keys, Database};
use crate::models::UserSettings;

pub struct SettingsService {
    db: Arc<Database>,
}

impl SettingsService {
    pub fn new(db: Arc<Database>) -> Self {
        Self { db }
    }

    /// 当前设置，未保存过时为默认值
    pub fn get(&self) -> UserSettings {
        self.db.load(storage_keys::USER_SETTINGS).unwrap_or_default()
    }

    pub fn save(&self, settings: &UserSettings) {
        self.db.save(storage_keys::USER_SETTINGS, settings);
        debug!("保存用户设置");
    }
}
