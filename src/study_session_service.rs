//! 学习记录服务
//!
//! StudySession 是只追加的集合：创建后不提供更新操作。
//! 日期范围查询按本地日历日的 yyyy-MM-dd 字符串做闭区间比较，
//! 依赖 ISO 日期的字典序与时间序一致。

use std::sync::Arc;
use tracing::debug;

use crate::database::{storage_keys, Database};
use crate::models::{CreateStudySessionRequest, StudySession};
use crate::utils::datetime::format_date;
use crate::utils::ids::generate_id;

pub struct StudySessionService {
    db: Arc<Database>,
}

impl StudySessionService {
    pub fn new(db: Arc<Database>) -> Self {
        Self { db }
    }

    pub fn get_all(&self) -> Vec<StudySession> {
        self.db.load_collection(storage_keys::STUDY_SESSIONS)
    }

    pub fn create(&self, request: CreateStudySessionRequest) -> StudySession {
        let session = StudySession {
            id: generate_id(),
            exam_id: request.exam_id,
            chapter_id: request.chapter_id,
            topic_id: request.topic_id,
            date: request.date,
            duration: request.duration,
            notes: request.notes,
            performance_rating: request.performance_rating,
            completed: request.completed,
        };

        let mut sessions = self.get_all();
        sessions.push(session.clone());
        self.db.save(storage_keys::STUDY_SESSIONS, &sessions);
        debug!("记录学习 id={} duration={}min", session.id, session.duration);
        session
    }

    /// 闭区间 [start, end] 内的学习记录，保持原插入顺序
    pub fn get_by_date_range(&self, start: &str, end: &str) -> Vec<StudySession> {
        self.get_all()
            .into_iter()
            .filter(|session| {
                let date = format_date(&session.date);
                date.as_str() >= start && date.as_str() <= end
            })
            .collect()
    }

    pub fn get_by_exam_id(&self, exam_id: &str) -> Vec<StudySession> {
        self.get_all()
            .into_iter()
            .filter(|session| session.exam_id == exam_id)
            .collect()
    }

    pub fn delete_by_exam_id(&self, exam_id: &str) {
        let remaining: Vec<StudySession> = self
            .get_all()
            .into_iter()
            .filter(|session| session.exam_id != exam_id)
            .collect();
        self.db.save(storage_keys::STUDY_SESSIONS, &remaining);
    }

    pub fn delete_by_chapter_id(&self, chapter_id: &str) {
        let remaining: Vec<StudySession> = self
            .get_all()
            .into_iter()
            .filter(|session| session.chapter_id != chapter_id)
            .collect();
        self.db.save(storage_keys::STUDY_SESSIONS, &remaining);
    }

    pub fn delete_by_topic_id(&self, topic_id: &str) {
        let remaining: Vec<StudySession> = self
            .get_all()
            .into_iter()
            .filter(|session| session.topic_id != topic_id)
            .collect();
        self.db.save(storage_keys::STUDY_SESSIONS, &remaining);
    }
}
