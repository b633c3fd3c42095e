//! 章节服务
//!
//! Chapter 集合的 CRUD 与进度重算。知识点作为值对象内嵌在章节中，
//! 没有独立集合；对知识点的增删改统一经由本服务按
//! `(chapter_id, topic_id)` 寻址，并在每次变更后重算所属章节的
//! `completed_topics` 与 `progress`。
//!
//! 级联规则：删除章节或移除知识点时，引用它们的学习记录、
//! 计划条目与通知一并清理。

use std::sync::Arc;
use chrono::Utc;
use tracing::{debug, info};

use crate::database::{storage_keys, Database};
use crate::models::{
    Chapter, CreateChapterRequest, CreateTopicRequest, Topic, UpdateChapterRequest,
    UpdateTopicRequest,
};
use crate::notification_service::NotificationService;
use crate::study_plan_service::StudyPlanService;
use crate::study_session_service::StudySessionService;
use crate::utils::ids::generate_id;
use crate::utils::stats::calculate_progress;

pub struct ChapterService {
    db: Arc<Database>,
}

impl ChapterService {
    pub fn new(db: Arc<Database>) -> Self {
        Self { db }
    }

    pub fn get_all(&self) -> Vec<Chapter> {
        self.db.load_collection(storage_keys::CHAPTERS)
    }

    pub fn get_by_exam_id(&self, exam_id: &str) -> Vec<Chapter> {
        self.get_all()
            .into_iter()
            .filter(|chapter| chapter.exam_id == exam_id)
            .collect()
    }

    pub fn get_by_id(&self, id: &str) -> Option<Chapter> {
        self.get_all().into_iter().find(|chapter| chapter.id == id)
    }

    pub fn create(&self, request: CreateChapterRequest) -> Chapter {
        let now = Utc::now();
        let name = request.name;
        let topics: Vec<Topic> = request
            .topics
            .into_iter()
            .map(|topic| materialize_topic(topic, &name, now))
            .collect();
        let completed = topics.iter().filter(|topic| topic.is_complete).count();
        let progress = calculate_progress(completed, topics.len());

        let chapter = Chapter {
            id: generate_id(),
            exam_id: request.exam_id,
            name,
            description: request.description,
            completed_topics: completed as u32,
            progress,
            topics,
            total_duration: request.total_duration,
            created_at: now,
            updated_at: now,
        };

        let mut chapters = self.get_all();
        chapters.push(chapter.clone());
        self.db.save(storage_keys::CHAPTERS, &chapters);
        debug!("创建章节 id={} name={}", chapter.id, chapter.name);
        chapter
    }

    /// 合并给出的字段并刷新更新时间，未找到时返回 None
    pub fn update(&self, id: &str, updates: UpdateChapterRequest) -> Option<Chapter> {
        let mut chapters = self.get_all();
        let chapter = chapters.iter_mut().find(|chapter| chapter.id == id)?;

        if let Some(name) = updates.name {
            // 知识点上冗余的章节名称一并同步
            for topic in &mut chapter.topics {
                topic.chapter = name.clone();
            }
            chapter.name = name;
        }
        if let Some(description) = updates.description {
            chapter.description = Some(description);
        }
        if let Some(total_duration) = updates.total_duration {
            chapter.total_duration = total_duration;
        }
        chapter.updated_at = Utc::now();

        let updated = chapter.clone();
        self.db.save(storage_keys::CHAPTERS, &chapters);
        Some(updated)
    }

    /// 删除章节并级联清理引用它的数据，未找到时返回 false
    pub fn delete(&self, id: &str) -> bool {
        let chapters = self.get_all();
        let before = chapters.len();
        let remaining: Vec<Chapter> =
            chapters.into_iter().filter(|chapter| chapter.id != id).collect();
        if remaining.len() == before {
            return false;
        }

        self.db.save(storage_keys::CHAPTERS, &remaining);

        StudySessionService::new(self.db.clone()).delete_by_chapter_id(id);
        StudyPlanService::new(self.db.clone()).remove_entries_for_chapter(id);
        NotificationService::new(self.db.clone()).delete_by_chapter_id(id);

        info!("删除章节 id={} 及其关联数据", id);
        true
    }

    /// 移除某场考试的全部章节（考试级联删除的一环，
    /// 考试级别的其余关联数据由考试服务统一清理）
    pub fn delete_by_exam_id(&self, exam_id: &str) {
        let remaining: Vec<Chapter> = self
            .get_all()
            .into_iter()
            .filter(|chapter| chapter.exam_id != exam_id)
            .collect();
        self.db.save(storage_keys::CHAPTERS, &remaining);
    }

    /// 从内嵌知识点重算完成数与进度并落盘
    pub fn update_progress(&self, chapter_id: &str) -> Option<Chapter> {
        let mut chapters = self.get_all();
        let chapter = chapters.iter_mut().find(|chapter| chapter.id == chapter_id)?;
        refresh_derived(chapter);

        let updated = chapter.clone();
        self.db.save(storage_keys::CHAPTERS, &chapters);
        Some(updated)
    }

    // ------------------------------------------------------------------
    // 知识点操作
    // ------------------------------------------------------------------

    /// 向章节追加知识点，返回创建的知识点；章节不存在时返回 None
    pub fn add_topic(&self, chapter_id: &str, request: CreateTopicRequest) -> Option<Topic> {
        let mut chapters = self.get_all();
        let chapter = chapters.iter_mut().find(|chapter| chapter.id == chapter_id)?;

        let topic = materialize_topic(request, &chapter.name, Utc::now());
        chapter.topics.push(topic.clone());
        refresh_derived(chapter);

        self.db.save(storage_keys::CHAPTERS, &chapters);
        debug!("章节 {} 新增知识点 {}", chapter_id, topic.id);
        Some(topic)
    }

    /// 更新章节内的知识点，章节或知识点不存在时返回 None
    pub fn update_topic(
        &self,
        chapter_id: &str,
        topic_id: &str,
        updates: UpdateTopicRequest,
    ) -> Option<Topic> {
        let mut chapters = self.get_all();
        let chapter = chapters.iter_mut().find(|chapter| chapter.id == chapter_id)?;
        let topic = chapter.topics.iter_mut().find(|topic| topic.id == topic_id)?;

        if let Some(sl_no) = updates.sl_no {
            topic.sl_no = sl_no;
        }
        if let Some(topic_name) = updates.topic_name {
            topic.topic_name = topic_name;
        }
        if let Some(duration) = updates.duration {
            topic.duration = duration;
        }
        if let Some(is_complete) = updates.is_complete {
            topic.is_complete = is_complete;
        }
        if let Some(self_evaluate) = updates.self_evaluate {
            topic.self_evaluate = self_evaluate;
        }
        if let Some(dpps) = updates.dpps {
            topic.dpps = dpps;
        }
        if let Some(other_problems) = updates.other_problems {
            topic.other_problems = other_problems;
        }
        if let Some(document_updates) = updates.document_updates {
            topic.document_updates = Some(document_updates);
        }
        topic.updated_at = Utc::now();

        let updated = topic.clone();
        refresh_derived(chapter);
        self.db.save(storage_keys::CHAPTERS, &chapters);
        Some(updated)
    }

    /// 从章节移除知识点并级联清理引用它的数据，未找到时返回 false
    pub fn remove_topic(&self, chapter_id: &str, topic_id: &str) -> bool {
        let mut chapters = self.get_all();
        let Some(chapter) = chapters.iter_mut().find(|chapter| chapter.id == chapter_id) else {
            return false;
        };

        let before = chapter.topics.len();
        chapter.topics.retain(|topic| topic.id != topic_id);
        if chapter.topics.len() == before {
            return false;
        }
        refresh_derived(chapter);

        self.db.save(storage_keys::CHAPTERS, &chapters);

        StudySessionService::new(self.db.clone()).delete_by_topic_id(topic_id);
        StudyPlanService::new(self.db.clone()).remove_entries_for_topic(topic_id);
        NotificationService::new(self.db.clone()).delete_by_topic_id(topic_id);
        true
    }

    /// 跨章节按知识点 id 查找，返回所属章节与知识点
    pub fn find_topic(&self, topic_id: &str) -> Option<(Chapter, Topic)> {
        for chapter in self.get_all() {
            if let Some(topic) = chapter.topics.iter().find(|topic| topic.id == topic_id) {
                let topic = topic.clone();
                return Some((chapter, topic));
            }
        }
        None
    }
}

/// 将创建请求落为带标识与时间戳的知识点
fn materialize_topic(request: CreateTopicRequest, chapter_name: &str, now: chrono::DateTime<chrono::Utc>) -> Topic {
    Topic {
        id: generate_id(),
        sl_no: request.sl_no,
        chapter: chapter_name.to_string(),
        topic_name: request.topic_name,
        duration: request.duration,
        is_complete: request.is_complete,
        self_evaluate: request.self_evaluate,
        dpps: request.dpps,
        other_problems: request.other_problems,
        document_updates: request.document_updates,
        created_at: now,
        updated_at: now,
    }
}

/// 重算章节的派生字段并刷新更新时间
fn refresh_derived(chapter: &mut Chapter) {
    let completed = chapter.topics.iter().filter(|topic| topic.is_complete).count();
    chapter.completed_topics = completed as u32;
    chapter.progress = calculate_progress(completed, chapter.topics.len());
    chapter.updated_at = Utc::now();
}
