//! 进程级 UI 状态缓存
//!
//! 渲染层读取的单一状态对象。状态只能通过封闭的动作集合变更，
//! `reduce` 是纯转换：旧状态 + 动作 → 新状态，不原地修改。
//!
//! 缓存不是数据源：持久层每次成功写入都会递增数据版本号，
//! `StateStore` 记录自己最近一次 `hydrate` 时的版本，
//! `is_stale` 据此判断是否需要重新拉取，避免依赖手工补发动作
//! 作为唯一的同步手段。
//!
//! 级联规则与服务层一致：删除考试/章节的动作会同步清理缓存中
//! 引用它们的记录。

use std::sync::Arc;

use crate::chapter_service::ChapterService;
use crate::database::Database;
use crate::exam_service::ExamService;
use crate::models::{
    Chapter, DashboardData, Exam, Notification, Performance, StudyPlan, StudySession, Topic,
    UserSettings,
};
use crate::notification_service::NotificationService;
use crate::performance_service::PerformanceService;
use crate::settings_service::SettingsService;
use crate::study_plan_service::StudyPlanService;
use crate::study_session_service::StudySessionService;
use crate::utils::stats::calculate_progress;

/// 全量应用状态
#[derive(Debug, Clone, PartialEq)]
pub struct AppState {
    pub exams: Vec<Exam>,
    pub chapters: Vec<Chapter>,
    pub study_sessions: Vec<StudySession>,
    pub study_plans: Vec<StudyPlan>,
    pub notifications: Vec<Notification>,
    pub performances: Vec<Performance>,
    pub user_settings: UserSettings,
    pub dashboard_data: Option<DashboardData>,
    pub is_loading: bool,
    pub error: Option<String>,
}

impl Default for AppState {
    fn default() -> Self {
        Self {
            exams: Vec::new(),
            chapters: Vec::new(),
            study_sessions: Vec::new(),
            study_plans: Vec::new(),
            notifications: Vec::new(),
            performances: Vec::new(),
            user_settings: UserSettings::default(),
            dashboard_data: None,
            is_loading: false,
            error: None,
        }
    }
}

/// 批量载入的部分状态（None 的集合保持不变）
#[derive(Debug, Clone, Default)]
pub struct StateSnapshot {
    pub exams: Option<Vec<Exam>>,
    pub chapters: Option<Vec<Chapter>>,
    pub study_sessions: Option<Vec<StudySession>>,
    pub study_plans: Option<Vec<StudyPlan>>,
    pub notifications: Option<Vec<Notification>>,
    pub performances: Option<Vec<Performance>>,
    pub user_settings: Option<UserSettings>,
}

/// 封闭的状态变更动作集合
#[derive(Debug, Clone)]
pub enum AppAction {
    SetLoading(bool),
    SetError(Option<String>),
    AddExam(Exam),
    UpdateExam(Exam),
    DeleteExam(String),
    AddChapter(Chapter),
    UpdateChapter(Chapter),
    DeleteChapter(String),
    /// 向缓存中的章节追加知识点
    AddTopic { chapter_id: String, topic: Topic },
    /// 替换缓存中章节内的同 id 知识点
    UpdateTopic { chapter_id: String, topic: Topic },
    /// 从缓存中的章节移除知识点
    RemoveTopic { chapter_id: String, topic_id: String },
    AddStudySession(StudySession),
    AddStudyPlan(StudyPlan),
    UpdateStudyPlan(StudyPlan),
    AddNotification(Notification),
    MarkNotificationRead(String),
    AddPerformance(Performance),
    UpdateUserSettings(UserSettings),
    SetDashboardData(DashboardData),
    LoadData(StateSnapshot),
}

/// 纯状态转换：不修改传入的旧状态
pub fn reduce(state: &AppState, action: AppAction) -> AppState {
    let mut next = state.clone();
    match action {
        AppAction::SetLoading(loading) => next.is_loading = loading,
        AppAction::SetError(error) => next.error = error,

        AppAction::AddExam(exam) => next.exams.push(exam),
        AppAction::UpdateExam(exam) => {
            let id = exam.id.clone();
            replace_by(&mut next.exams, |e| e.id == id, exam);
        }
        AppAction::DeleteExam(id) => {
            next.exams.retain(|exam| exam.id != id);
            next.chapters.retain(|chapter| chapter.exam_id != id);
            next.study_sessions.retain(|session| session.exam_id != id);
            next.study_plans.retain(|plan| plan.exam_id != id);
            next.performances.retain(|performance| performance.exam_id != id);
            next.notifications.retain(|n| n.exam_id.as_deref() != Some(id.as_str()));
        }

        AppAction::AddChapter(chapter) => next.chapters.push(chapter),
        AppAction::UpdateChapter(chapter) => {
            let id = chapter.id.clone();
            replace_by(&mut next.chapters, |c| c.id == id, chapter);
        }
        AppAction::DeleteChapter(id) => {
            next.chapters.retain(|chapter| chapter.id != id);
            next.study_sessions.retain(|session| session.chapter_id != id);
            for plan in &mut next.study_plans {
                plan.topics.retain(|entry| entry.chapter_id != id);
            }
            next.notifications.retain(|n| n.chapter_id.as_deref() != Some(id.as_str()));
        }

        AppAction::AddTopic { chapter_id, topic } => {
            if let Some(chapter) = next.chapters.iter_mut().find(|c| c.id == chapter_id) {
                chapter.topics.push(topic);
                refresh_chapter_progress(chapter);
            }
        }
        AppAction::UpdateTopic { chapter_id, topic } => {
            if let Some(chapter) = next.chapters.iter_mut().find(|c| c.id == chapter_id) {
                let id = topic.id.clone();
                replace_by(&mut chapter.topics, |t| t.id == id, topic);
                refresh_chapter_progress(chapter);
            }
        }
        AppAction::RemoveTopic { chapter_id, topic_id } => {
            if let Some(chapter) = next.chapters.iter_mut().find(|c| c.id == chapter_id) {
                chapter.topics.retain(|topic| topic.id != topic_id);
                refresh_chapter_progress(chapter);
            }
            next.study_sessions.retain(|session| session.topic_id != topic_id);
            for plan in &mut next.study_plans {
                plan.topics.retain(|entry| entry.topic_id != topic_id);
            }
            next.notifications
                .retain(|n| n.topic_id.as_deref() != Some(topic_id.as_str()));
        }

        AppAction::AddStudySession(session) => next.study_sessions.push(session),

        AppAction::AddStudyPlan(plan) => next.study_plans.push(plan),
        AppAction::UpdateStudyPlan(plan) => {
            let id = plan.id.clone();
            replace_by(&mut next.study_plans, |p| p.id == id, plan);
        }

        AppAction::AddNotification(notification) => next.notifications.push(notification),
        AppAction::MarkNotificationRead(id) => {
            if let Some(notification) = next.notifications.iter_mut().find(|n| n.id == id) {
                notification.read = true;
            }
        }

        AppAction::AddPerformance(performance) => next.performances.push(performance),
        AppAction::UpdateUserSettings(settings) => next.user_settings = settings,
        AppAction::SetDashboardData(data) => next.dashboard_data = Some(data),

        AppAction::LoadData(snapshot) => {
            if let Some(exams) = snapshot.exams {
                next.exams = exams;
            }
            if let Some(chapters) = snapshot.chapters {
                next.chapters = chapters;
            }
            if let Some(sessions) = snapshot.study_sessions {
                next.study_sessions = sessions;
            }
            if let Some(plans) = snapshot.study_plans {
                next.study_plans = plans;
            }
            if let Some(notifications) = snapshot.notifications {
                next.notifications = notifications;
            }
            if let Some(performances) = snapshot.performances {
                next.performances = performances;
            }
            if let Some(settings) = snapshot.user_settings {
                next.user_settings = settings;
            }
        }
    }
    next
}

fn replace_by<T, F>(items: &mut [T], matches: F, replacement: T)
where
    F: Fn(&T) -> bool,
{
    if let Some(slot) = items.iter_mut().find(|item| matches(item)) {
        *slot = replacement;
    }
}

fn refresh_chapter_progress(chapter: &mut Chapter) {
    let completed = chapter.topics.iter().filter(|topic| topic.is_complete).count();
    chapter.completed_topics = completed as u32;
    chapter.progress = calculate_progress(completed, chapter.topics.len());
}

/// 带版本号的状态容器
///
/// 应用启动时创建一次，进程存活期间常驻；重启后由 `hydrate`
/// 从持久层重新初始化。
pub struct StateStore {
    state: AppState,
    synced_version: u64,
}

impl Default for StateStore {
    fn default() -> Self {
        Self::new()
    }
}

impl StateStore {
    /// 以内置默认值初始化，尚未与持久层同步
    pub fn new() -> Self {
        Self { state: AppState::default(), synced_version: 0 }
    }

    pub fn state(&self) -> &AppState {
        &self.state
    }

    pub fn dispatch(&mut self, action: AppAction) {
        self.state = reduce(&self.state, action);
    }

    /// 缓存是否落后于持久层
    pub fn is_stale(&self, db: &Database) -> bool {
        self.synced_version != db.version()
    }

    /// 从持久层整体重读全部集合与设置
    pub fn hydrate(&mut self, db: &Arc<Database>) {
        let version = db.version();
        let snapshot = StateSnapshot {
            exams: Some(ExamService::new(db.clone()).get_all()),
            chapters: Some(ChapterService::new(db.clone()).get_all()),
            study_sessions: Some(StudySessionService::new(db.clone()).get_all()),
            study_plans: Some(StudyPlanService::new(db.clone()).get_all()),
            notifications: Some(NotificationService::new(db.clone()).get_all()),
            performances: Some(PerformanceService::new(db.clone()).get_all()),
            user_settings: Some(SettingsService::new(db.clone()).get()),
        };
        self.dispatch(AppAction::LoadData(snapshot));
        self.synced_version = version;
    }
}
