//! 学习计划服务
//!
//! 按日期查询约定每天至多一份计划（`get_by_date` 取第一个匹配，
//! 创建时不强制唯一）。`total_planned_time` 由调用方在修改条目时
//! 一并给出；只有级联移除条目时才在服务内重算。

use std::sync::Arc;
use tracing::debug;

use crate::database::{storage_keys, Database};
use crate::models::{CreateStudyPlanRequest, StudyPlan, UpdateStudyPlanRequest};
use crate::utils::datetime::{today, tomorrow};
use crate::utils::ids::generate_id;

pub struct StudyPlanService {
    db: Arc<Database>,
}

impl StudyPlanService {
    pub fn new(db: Arc<Database>) -> Self {
        Self { db }
    }

    pub fn get_all(&self) -> Vec<StudyPlan> {
        self.db.load_collection(storage_keys::STUDY_PLANS)
    }

    pub fn create(&self, request: CreateStudyPlanRequest) -> StudyPlan {
        let plan = StudyPlan {
            id: generate_id(),
            exam_id: request.exam_id,
            date: request.date,
            topics: request.topics,
            total_planned_time: request.total_planned_time,
            actual_time: request.actual_time,
            notes: request.notes,
        };

        let mut plans = self.get_all();
        plans.push(plan.clone());
        self.db.save(storage_keys::STUDY_PLANS, &plans);
        debug!("创建学习计划 id={} date={}", plan.id, plan.date);
        plan
    }

    /// 合并给出的字段，未找到时返回 None
    pub fn update(&self, id: &str, updates: UpdateStudyPlanRequest) -> Option<StudyPlan> {
        let mut plans = self.get_all();
        let plan = plans.iter_mut().find(|plan| plan.id == id)?;

        if let Some(topics) = updates.topics {
            plan.topics = topics;
        }
        if let Some(total_planned_time) = updates.total_planned_time {
            plan.total_planned_time = total_planned_time;
        }
        if let Some(actual_time) = updates.actual_time {
            plan.actual_time = actual_time;
        }
        if let Some(notes) = updates.notes {
            plan.notes = Some(notes);
        }

        let updated = plan.clone();
        self.db.save(storage_keys::STUDY_PLANS, &plans);
        Some(updated)
    }

    /// 指定日期的计划，取第一个匹配
    pub fn get_by_date(&self, date: &str) -> Option<StudyPlan> {
        self.get_all().into_iter().find(|plan| plan.date == date)
    }

    pub fn get_todays_plan(&self) -> Option<StudyPlan> {
        self.get_by_date(&today())
    }

    pub fn get_tomorrows_plan(&self) -> Option<StudyPlan> {
        self.get_by_date(&tomorrow())
    }

    pub fn delete_by_exam_id(&self, exam_id: &str) {
        let remaining: Vec<StudyPlan> = self
            .get_all()
            .into_iter()
            .filter(|plan| plan.exam_id != exam_id)
            .collect();
        self.db.save(storage_keys::STUDY_PLANS, &remaining);
    }

    /// 级联：移除引用指定章节的计划条目并重算计划总时长
    pub fn remove_entries_for_chapter(&self, chapter_id: &str) {
        self.retain_entries(|entry| entry.chapter_id != chapter_id);
    }

    /// 级联：移除引用指定知识点的计划条目并重算计划总时长
    pub fn remove_entries_for_topic(&self, topic_id: &str) {
        self.retain_entries(|entry| entry.topic_id != topic_id);
    }

    fn retain_entries<F>(&self, keep: F)
    where
        F: Fn(&crate::models::PlannedTopic) -> bool,
    {
        let mut plans = self.get_all();
        let mut changed = false;
        for plan in &mut plans {
            let before = plan.topics.len();
            plan.topics.retain(&keep);
            if plan.topics.len() != before {
                plan.total_planned_time =
                    plan.topics.iter().map(|entry| entry.estimated_duration).sum();
                changed = true;
            }
        }
        if changed {
            self.db.save(storage_keys::STUDY_PLANS, &plans);
        }
    }
}
