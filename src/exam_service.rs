//! 考试服务
//!
//! Exam 集合的 CRUD。删除考试时对全部外键关系统一级联：
//! 章节、学习记录、学习计划、表现记录与相关通知一并移除，
//! 不允许悬空引用存活。

use std::sync::Arc;
use chrono::Utc;
use tracing::{debug, info};

use crate::chapter_service::ChapterService;
use crate::database::{storage_keys, Database};
use crate::models::{CreateExamRequest, Exam, UpdateExamRequest};
use crate::notification_service::NotificationService;
use crate::performance_service::PerformanceService;
use crate::study_plan_service::StudyPlanService;
use crate::study_session_service::StudySessionService;
use crate::utils::ids::generate_id;

pub struct ExamService {
    db: Arc<Database>,
}

impl ExamService {
    pub fn new(db: Arc<Database>) -> Self {
        Self { db }
    }

    pub fn get_all(&self) -> Vec<Exam> {
        self.db.load_collection(storage_keys::EXAMS)
    }

    pub fn get_by_id(&self, id: &str) -> Option<Exam> {
        self.get_all().into_iter().find(|exam| exam.id == id)
    }

    pub fn create(&self, request: CreateExamRequest) -> Exam {
        let now = Utc::now();
        let exam = Exam {
            id: generate_id(),
            name: request.name,
            exam_type: request.exam_type,
            category: request.category,
            target_date: request.target_date,
            description: request.description,
            created_at: now,
            updated_at: now,
        };

        let mut exams = self.get_all();
        exams.push(exam.clone());
        self.db.save(storage_keys::EXAMS, &exams);
        debug!("创建考试 id={} name={}", exam.id, exam.name);
        exam
    }

    /// 合并给出的字段并刷新更新时间，未找到时返回 None
    pub fn update(&self, id: &str, updates: UpdateExamRequest) -> Option<Exam> {
        let mut exams = self.get_all();
        let exam = exams.iter_mut().find(|exam| exam.id == id)?;

        if let Some(name) = updates.name {
            exam.name = name;
        }
        if let Some(exam_type) = updates.exam_type {
            exam.exam_type = exam_type;
        }
        if let Some(category) = updates.category {
            exam.category = category;
        }
        if let Some(target_date) = updates.target_date {
            exam.target_date = Some(target_date);
        }
        if let Some(description) = updates.description {
            exam.description = Some(description);
        }
        exam.updated_at = Utc::now();

        let updated = exam.clone();
        self.db.save(storage_keys::EXAMS, &exams);
        Some(updated)
    }

    /// 删除考试并级联移除其全部关联数据，未找到时返回 false
    pub fn delete(&self, id: &str) -> bool {
        let exams = self.get_all();
        let before = exams.len();
        let remaining: Vec<Exam> = exams.into_iter().filter(|exam| exam.id != id).collect();
        if remaining.len() == before {
            return false;
        }

        self.db.save(storage_keys::EXAMS, &remaining);

        ChapterService::new(self.db.clone()).delete_by_exam_id(id);
        StudySessionService::new(self.db.clone()).delete_by_exam_id(id);
        StudyPlanService::new(self.db.clone()).delete_by_exam_id(id);
        PerformanceService::new(self.db.clone()).delete_by_exam_id(id);
        NotificationService::new(self.db.clone()).delete_by_exam_id(id);

        info!("删除考试 id={} 及其关联数据", id);
        true
    }
}
