//! 通知服务

use std::sync::Arc;
use chrono::Utc;

use crate::database::{storage_keys, Database};
use crate::models::{CreateNotificationRequest, Notification};
use crate::utils::ids::generate_id;

pub struct NotificationService {
    db: Arc<Database>,
}

impl NotificationService {
    pub fn new(db: Arc<Database>) -> Self {
        Self { db }
    }

    pub fn get_all(&self) -> Vec<Notification> {
        self.db.load_collection(storage_keys::NOTIFICATIONS)
    }

    pub fn get_by_id(&self, id: &str) -> Option<Notification> {
        self.get_all().into_iter().find(|notification| notification.id == id)
    }

    /// 创建通知，初始为未读
    pub fn create(&self, request: CreateNotificationRequest) -> Notification {
        let notification = Notification {
            id: generate_id(),
            kind: request.kind,
            title: request.title,
            message: request.message,
            date: Utc::now(),
            read: false,
            action_required: request.action_required,
            exam_id: request.exam_id,
            chapter_id: request.chapter_id,
            topic_id: request.topic_id,
        };

        let mut notifications = self.get_all();
        notifications.push(notification.clone());
        self.db.save(storage_keys::NOTIFICATIONS, &notifications);
        notification
    }

    /// 标记已读，未找到时返回 false
    pub fn mark_as_read(&self, id: &str) -> bool {
        let mut notifications = self.get_all();
        let Some(notification) = notifications.iter_mut().find(|n| n.id == id) else {
            return false;
        };
        notification.read = true;
        self.db.save(storage_keys::NOTIFICATIONS, &notifications);
        true
    }

    pub fn get_unread(&self) -> Vec<Notification> {
        self.get_all()
            .into_iter()
            .filter(|notification| !notification.read)
            .collect()
    }

    /// 删除通知，未找到时返回 false
    pub fn delete(&self, id: &str) -> bool {
        let notifications = self.get_all();
        let before = notifications.len();
        let remaining: Vec<Notification> =
            notifications.into_iter().filter(|n| n.id != id).collect();
        if remaining.len() == before {
            return false;
        }
        self.db.save(storage_keys::NOTIFICATIONS, &remaining);
        true
    }

    pub fn delete_by_exam_id(&self, exam_id: &str) {
        self.retain(|n| n.exam_id.as_deref() != Some(exam_id));
    }

    pub fn delete_by_chapter_id(&self, chapter_id: &str) {
        self.retain(|n| n.chapter_id.as_deref() != Some(chapter_id));
    }

    pub fn delete_by_topic_id(&self, topic_id: &str) {
        self.retain(|n| n.topic_id.as_deref() != Some(topic_id));
    }

    fn retain<F>(&self, keep: F)
    where
        F: Fn(&Notification) -> bool,
    {
        let remaining: Vec<Notification> = self.get_all().into_iter().filter(|n| keep(n)).collect();
        self.db.save(storage_keys::NOTIFICATIONS, &remaining);
    }
}
