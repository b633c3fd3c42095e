//! 数据备份与恢复
//!
//! 把全部集合与用户设置导出为单个 JSON 文档，或从这样的文档整体恢复。
//! 导入只要求文档能解析且带有 `exams` 与 `userSettings`
//! （兼容旧文件的 `settings` 别名）两个键；校验不通过时整体拒绝，
//! 不落任何部分数据。旧导出文件中多余的键（如独立的 `topics`
//! 集合）会被忽略。

use std::sync::Arc;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use tracing::info;

use crate::database::{storage_keys, Database};
use crate::models::{
    Chapter, Exam, Notification, Performance, StudyPlan, StudySession, UserSettings,
};

/// 导出文档格式版本
pub const EXPORT_FORMAT_VERSION: &str = "1.0";

/// 导出文档
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ExportBundle {
    pub version: String,
    pub export_date: DateTime<Utc>,
    pub exams: Vec<Exam>,
    pub chapters: Vec<Chapter>,
    pub study_sessions: Vec<StudySession>,
    pub study_plans: Vec<StudyPlan>,
    pub notifications: Vec<Notification>,
    pub performances: Vec<Performance>,
    pub user_settings: UserSettings,
}

/// 导入侧的宽松结构：缺失的集合按空处理，只在入口处校验必需键
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct ImportBundle {
    #[serde(default)]
    exams: Vec<Exam>,
    #[serde(default)]
    chapters: Vec<Chapter>,
    #[serde(default)]
    study_sessions: Vec<StudySession>,
    #[serde(default)]
    study_plans: Vec<StudyPlan>,
    #[serde(default)]
    notifications: Vec<Notification>,
    #[serde(default)]
    performances: Vec<Performance>,
    #[serde(default, alias = "settings")]
    user_settings: Option<UserSettings>,
}

/// 导入结果摘要
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ImportSummary {
    pub exams: usize,
    pub chapters: usize,
    pub study_sessions: usize,
    pub study_plans: usize,
    pub notifications: usize,
    pub performances: usize,
}

#[derive(Debug, thiserror::Error)]
pub enum BackupError {
    #[error("备份文件解析失败: {0}")]
    Parse(#[from] serde_json::Error),
    #[error("备份文件不是 JSON 对象")]
    NotAnObject,
    #[error("备份文件缺少必需字段: {0}")]
    MissingField(&'static str),
}

/// 汇集当前持久化状态为导出文档
pub fn export_data(db: &Arc<Database>) -> ExportBundle {
    ExportBundle {
        version: EXPORT_FORMAT_VERSION.to_string(),
        export_date: Utc::now(),
        exams: db.load_collection(storage_keys::EXAMS),
        chapters: db.load_collection(storage_keys::CHAPTERS),
        study_sessions: db.load_collection(storage_keys::STUDY_SESSIONS),
        study_plans: db.load_collection(storage_keys::STUDY_PLANS),
        notifications: db.load_collection(storage_keys::NOTIFICATIONS),
        performances: db.load_collection(storage_keys::PERFORMANCES),
        user_settings: db.load(storage_keys::USER_SETTINGS).unwrap_or_default(),
    }
}

/// 导出为带缩进的 JSON 文本
pub fn export_json(db: &Arc<Database>) -> Result<String, BackupError> {
    let bundle = export_data(db);
    Ok(serde_json::to_string_pretty(&bundle)?)
}

/// 从 JSON 文本整体恢复，成功时覆盖现有各集合
pub fn import_json(db: &Arc<Database>, json: &str) -> Result<ImportSummary, BackupError> {
    let value: serde_json::Value = serde_json::from_str(json)?;
    let object = value.as_object().ok_or(BackupError::NotAnObject)?;

    if !object.contains_key("exams") {
        return Err(BackupError::MissingField("exams"));
    }
    if !object.contains_key("userSettings") && !object.contains_key("settings") {
        return Err(BackupError::MissingField("userSettings"));
    }

    let bundle: ImportBundle = serde_json::from_value(value)?;

    db.save(storage_keys::EXAMS, &bundle.exams);
    db.save(storage_keys::CHAPTERS, &bundle.chapters);
    db.save(storage_keys::STUDY_SESSIONS, &bundle.study_sessions);
    db.save(storage_keys::STUDY_PLANS, &bundle.study_plans);
    db.save(storage_keys::NOTIFICATIONS, &bundle.notifications);
    db.save(storage_keys::PERFORMANCES, &bundle.performances);
    if let Some(settings) = &bundle.user_settings {
        db.save(storage_keys::USER_SETTINGS, settings);
    }

    let summary = ImportSummary {
        exams: bundle.exams.len(),
        chapters: bundle.chapters.len(),
        study_sessions: bundle.study_sessions.len(),
        study_plans: bundle.study_plans.len(),
        notifications: bundle.notifications.len(),
        performances: bundle.performances.len(),
    };
    info!(
        "导入完成：考试 {} 章节 {} 学习记录 {}",
        summary.exams, summary.chapters, summary.study_sessions
    );
    Ok(summary)
}
