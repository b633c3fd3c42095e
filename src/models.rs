use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;

// ============================================================================
// 枚举类型
// ============================================================================

/// 考试类型
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ExamType {
    #[serde(rename = "UPSC")]
    Upsc,
    #[serde(rename = "CSE")]
    Cse,
    #[serde(rename = "ESE")]
    Ese,
    #[serde(rename = "GATE")]
    Gate,
    Other,
}

impl fmt::Display for ExamType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            ExamType::Upsc => "UPSC",
            ExamType::Cse => "CSE",
            ExamType::Ese => "ESE",
            ExamType::Gate => "GATE",
            ExamType::Other => "Other",
        };
        write!(f, "{name}")
    }
}

/// 计划条目优先级
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PlanPriority {
    High,
    Medium,
    Low,
}

/// 通知类型
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum NotificationKind {
    Reminder,
    Deadline,
    Achievement,
    Warning,
}

/// 界面主题
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Theme {
    Light,
    Dark,
    Auto,
}

/// 时间显示格式
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum TimeFormat {
    #[serde(rename = "12h")]
    H12,
    #[serde(rename = "24h")]
    H24,
}

// ============================================================================
// 持久化实体
// ============================================================================

/// 考试
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Exam {
    pub id: String,
    pub name: String,
    #[serde(rename = "type")]
    pub exam_type: ExamType,
    pub category: String, // 自由文本分类
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub target_date: Option<DateTime<Utc>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// 知识点（作为章节内嵌的值对象，不单独成集合）
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Topic {
    pub id: String,
    pub sl_no: u32,          // 章节内序号
    pub chapter: String,     // 冗余的章节名称（非引用）
    pub topic_name: String,
    pub duration: String,    // HH:MM:SS 格式的自由文本
    pub is_complete: bool,
    pub self_evaluate: u8,   // 自评分 1-10
    pub dpps: String,        // Daily Practice Problems 记录
    pub other_problems: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub document_updates: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// 章节，内嵌其全部知识点
///
/// 不变式：`completed_topics` 等于 `topics` 中 `is_complete` 为真的数量；
/// `progress` 等于 round(completed_topics / topics.len() × 100)，空列表时为 0。
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Chapter {
    pub id: String,
    pub exam_id: String,
    pub name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    pub topics: Vec<Topic>,
    pub total_duration: String, // 展示用时长文本
    pub completed_topics: u32,  // 派生：完成数
    pub progress: u8,           // 派生：百分比 0-100
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// 学习记录（创建后不可修改）
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StudySession {
    pub id: String,
    pub exam_id: String,
    pub chapter_id: String,
    pub topic_id: String,
    pub date: DateTime<Utc>,
    pub duration: u32, // 分钟
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub notes: Option<String>,
    pub performance_rating: u8, // 1-10
    pub completed: bool,
}

/// 学习计划中的单个条目
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PlannedTopic {
    pub topic_id: String,
    pub chapter_id: String,
    pub estimated_duration: u32, // 分钟
    pub priority: PlanPriority,
    pub completed: bool,
}

/// 单日学习计划（按日期查询，约定每天至多一份）
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StudyPlan {
    pub id: String,
    pub exam_id: String,
    pub date: String, // yyyy-MM-dd
    pub topics: Vec<PlannedTopic>,
    pub total_planned_time: u32, // 分钟，由调用方在修改条目时一并维护
    pub actual_time: u32,        // 分钟，实际投入
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub notes: Option<String>,
}

/// 表现记录（仅追加的日志，无主键）
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Performance {
    pub exam_id: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub chapter_id: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub topic_id: Option<String>,
    pub time_spent: u32, // 分钟
    pub accuracy: f64,   // 百分比
    pub speed: f64,      // 知识点/小时
    pub date: DateTime<Utc>,
}

/// 通知
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Notification {
    pub id: String,
    #[serde(rename = "type")]
    pub kind: NotificationKind,
    pub title: String,
    pub message: String,
    pub date: DateTime<Utc>,
    pub read: bool,
    pub action_required: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub exam_id: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub chapter_id: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub topic_id: Option<String>,
}

/// 通知渠道开关
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NotificationChannels {
    pub email: bool,
    pub push: bool,
    pub sound: bool,
}

/// 用户设置（单例记录，未保存前使用默认值）
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UserSettings {
    pub study_reminders: bool,
    pub reminder_time: String, // HH:MM
    pub daily_study_goal: u32, // 分钟
    pub weekly_study_goal: u32, // 分钟
    pub notifications: NotificationChannels,
    pub theme: Theme,
    pub time_format: TimeFormat,
}

impl Default for UserSettings {
    fn default() -> Self {
        Self {
            study_reminders: true,
            reminder_time: "09:00".to_string(),
            daily_study_goal: 240,   // 4 小时
            weekly_study_goal: 1680, // 28 小时
            notifications: NotificationChannels { email: true, push: true, sound: true },
            theme: Theme::Light,
            time_format: TimeFormat::H12,
        }
    }
}

// ============================================================================
// 读模型（按需计算，不落盘）
// ============================================================================

/// 单个考试在某一天的投入
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ExamDailyProgress {
    pub exam_id: String,
    pub study_time: u32, // 分钟
    pub topics_completed: u32,
}

/// 单日进度
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DailyProgress {
    pub date: String, // yyyy-MM-dd
    pub total_study_time: u32,
    pub completed_topics: u32,
    pub target_topics: u32,
    pub exams: Vec<ExamDailyProgress>,
}

/// 周进度
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct WeeklyProgress {
    pub week_start: String, // yyyy-MM-dd，周一
    pub total_study_time: u32,
    pub completed_topics: u32,
    pub target_topics: u32,
    pub daily_progress: Vec<DailyProgress>,
}

/// 仪表盘聚合数据
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DashboardData {
    pub todays_plan: StudyPlan,
    pub tomorrows_plan: StudyPlan,
    pub current_week_progress: WeeklyProgress,
    pub upcoming_exams: Vec<Exam>,
    pub recent_performance: Vec<Performance>,
    pub notifications: Vec<Notification>,
    pub study_streak: u32,     // 连续学习天数
    pub total_study_time: u32, // 历史总分钟数
}

// ============================================================================
// 服务请求类型
// ============================================================================

/// 创建考试
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateExamRequest {
    pub name: String,
    #[serde(rename = "type")]
    pub exam_type: ExamType,
    pub category: String,
    #[serde(default)]
    pub target_date: Option<DateTime<Utc>>,
    #[serde(default)]
    pub description: Option<String>,
}

/// 更新考试（仅合并给出的字段）
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UpdateExamRequest {
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default, rename = "type")]
    pub exam_type: Option<ExamType>,
    #[serde(default)]
    pub category: Option<String>,
    #[serde(default)]
    pub target_date: Option<DateTime<Utc>>,
    #[serde(default)]
    pub description: Option<String>,
}

/// 创建章节（可携带初始知识点）
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateChapterRequest {
    pub exam_id: String,
    pub name: String,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default)]
    pub total_duration: String,
    #[serde(default)]
    pub topics: Vec<CreateTopicRequest>,
}

/// 更新章节（派生字段由服务重算，不在此列）
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UpdateChapterRequest {
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default)]
    pub total_duration: Option<String>,
}

/// 创建知识点（所属章节名称由服务自动填充）
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateTopicRequest {
    pub sl_no: u32,
    pub topic_name: String,
    #[serde(default)]
    pub duration: String,
    #[serde(default)]
    pub is_complete: bool,
    #[serde(default)]
    pub self_evaluate: u8,
    #[serde(default)]
    pub dpps: String,
    #[serde(default)]
    pub other_problems: String,
    #[serde(default)]
    pub document_updates: Option<String>,
}

/// 更新知识点
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UpdateTopicRequest {
    #[serde(default)]
    pub sl_no: Option<u32>,
    #[serde(default)]
    pub topic_name: Option<String>,
    #[serde(default)]
    pub duration: Option<String>,
    #[serde(default)]
    pub is_complete: Option<bool>,
    #[serde(default)]
    pub self_evaluate: Option<u8>,
    #[serde(default)]
    pub dpps: Option<String>,
    #[serde(default)]
    pub other_problems: Option<String>,
    #[serde(default)]
    pub document_updates: Option<String>,
}

/// 记录一次学习
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateStudySessionRequest {
    pub exam_id: String,
    pub chapter_id: String,
    pub topic_id: String,
    pub date: DateTime<Utc>,
    pub duration: u32,
    #[serde(default)]
    pub notes: Option<String>,
    pub performance_rating: u8,
    #[serde(default)]
    pub completed: bool,
}

/// 创建学习计划
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateStudyPlanRequest {
    pub exam_id: String,
    pub date: String, // yyyy-MM-dd
    #[serde(default)]
    pub topics: Vec<PlannedTopic>,
    #[serde(default)]
    pub total_planned_time: u32,
    #[serde(default)]
    pub actual_time: u32,
    #[serde(default)]
    pub notes: Option<String>,
}

/// 更新学习计划
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UpdateStudyPlanRequest {
    #[serde(default)]
    pub topics: Option<Vec<PlannedTopic>>,
    #[serde(default)]
    pub total_planned_time: Option<u32>,
    #[serde(default)]
    pub actual_time: Option<u32>,
    #[serde(default)]
    pub notes: Option<String>,
}

/// 追加表现记录（时间戳由服务填充）
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CreatePerformanceRequest {
    pub exam_id: String,
    #[serde(default)]
    pub chapter_id: Option<String>,
    #[serde(default)]
    pub topic_id: Option<String>,
    pub time_spent: u32,
    pub accuracy: f64,
    pub speed: f64,
}

/// 创建通知（id、时间与未读状态由服务填充）
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateNotificationRequest {
    #[serde(rename = "type")]
    pub kind: NotificationKind,
    pub title: String,
    pub message: String,
    #[serde(default)]
    pub action_required: bool,
    #[serde(default)]
    pub exam_id: Option<String>,
    #[serde(default)]
    pub chapter_id: Option<String>,
    #[serde(default)]
    pub topic_id: Option<String>,
}
