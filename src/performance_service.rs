//! 表现记录服务
//!
//! Performance 是无主键、只追加的日志，时间戳在创建时由服务填充。

use std::sync::Arc;

use crate::database::{storage_keys, Database};
use crate::models::{CreatePerformanceRequest, Performance};

/// 最近记录查询的默认条数
pub const DEFAULT_RECENT_LIMIT: usize = 10;

pub struct PerformanceService {
    db: Arc<Database>,
}

impl PerformanceService {
    pub fn new(db: Arc<Database>) -> Self {
        Self { db }
    }

    pub fn get_all(&self) -> Vec<Performance> {
        self.db.load_collection(storage_keys::PERFORMANCES)
    }

    pub fn create(&self, request: CreatePerformanceRequest) -> Performance {
        let performance = Performance {
            exam_id: request.exam_id,
            chapter_id: request.chapter_id,
            topic_id: request.topic_id,
            time_spent: request.time_spent,
            accuracy: request.accuracy,
            speed: request.speed,
            date: chrono::Utc::now(),
        };

        let mut performances = self.get_all();
        performances.push(performance.clone());
        self.db.save(storage_keys::PERFORMANCES, &performances);
        performance
    }

    pub fn get_by_exam_id(&self, exam_id: &str) -> Vec<Performance> {
        self.get_all()
            .into_iter()
            .filter(|performance| performance.exam_id == exam_id)
            .collect()
    }

    /// 按时间倒序取最近 `limit` 条
    pub fn get_recent_performance(&self, limit: usize) -> Vec<Performance> {
        let mut performances = self.get_all();
        performances.sort_by(|a, b| b.date.cmp(&a.date));
        performances.truncate(limit);
        performances
    }

    pub fn delete_by_exam_id(&self, exam_id: &str) {
        let remaining: Vec<Performance> = self
            .get_all()
            .into_iter()
            .filter(|performance| performance.exam_id != exam_id)
            .collect();
        self.db.save(storage_keys::PERFORMANCES, &remaining);
    }
}
