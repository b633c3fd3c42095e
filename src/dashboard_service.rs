//! 仪表盘聚合服务
//!
//! 跨实体组装只读视图：今明两天的计划、本周进度、临近考试、
//! 最近表现、未读通知、连续学习天数与历史总时长。
//! 每次调用都重新读取各集合现场计算，不做缓存，也没有副作用。

use std::collections::BTreeMap;
use std::sync::Arc;
use chrono::Utc;
use tracing::debug;

use crate::database::Database;
use crate::exam_service::ExamService;
use crate::models::{
    DailyProgress, DashboardData, Exam, ExamDailyProgress, StudyPlan, StudySession,
    WeeklyProgress,
};
use crate::notification_service::NotificationService;
use crate::performance_service::PerformanceService;
use crate::study_plan_service::StudyPlanService;
use crate::study_session_service::StudySessionService;
use crate::utils::datetime::{current_week_range, format_date, today, tomorrow};
use crate::utils::stats::calculate_study_streak;

/// 临近考试最多展示条数
const UPCOMING_EXAMS_LIMIT: usize = 5;
/// 最近表现记录条数
const RECENT_PERFORMANCE_LIMIT: usize = 7;
/// 未读通知最多展示条数
const UNREAD_NOTIFICATIONS_LIMIT: usize = 5;

pub struct DashboardService {
    db: Arc<Database>,
}

impl DashboardService {
    pub fn new(db: Arc<Database>) -> Self {
        Self { db }
    }

    /// 组装仪表盘数据，是当前持久化状态的纯函数
    pub fn get_dashboard_data(&self) -> DashboardData {
        let plan_service = StudyPlanService::new(self.db.clone());
        let session_service = StudySessionService::new(self.db.clone());

        let todays_plan = plan_service
            .get_todays_plan()
            .unwrap_or_else(|| placeholder_plan(today()));
        let tomorrows_plan = plan_service
            .get_tomorrows_plan()
            .unwrap_or_else(|| placeholder_plan(tomorrow()));

        let week = current_week_range();
        let week_sessions = session_service.get_by_date_range(&week.start, &week.end);

        let now = Utc::now();
        let mut upcoming_exams: Vec<Exam> = ExamService::new(self.db.clone())
            .get_all()
            .into_iter()
            .filter(|exam| exam.target_date.map(|date| date > now).unwrap_or(false))
            .collect();
        upcoming_exams.sort_by_key(|exam| exam.target_date);
        upcoming_exams.truncate(UPCOMING_EXAMS_LIMIT);

        let recent_performance = PerformanceService::new(self.db.clone())
            .get_recent_performance(RECENT_PERFORMANCE_LIMIT);

        let mut notifications = NotificationService::new(self.db.clone()).get_unread();
        notifications.truncate(UNREAD_NOTIFICATIONS_LIMIT);

        let all_sessions = session_service.get_all();
        let mut study_dates: Vec<String> =
            all_sessions.iter().map(|session| format_date(&session.date)).collect();
        study_dates.sort();
        study_dates.dedup();
        let study_streak = calculate_study_streak(&study_dates);
        let total_study_time: u32 = all_sessions.iter().map(|session| session.duration).sum();

        let current_week_progress = WeeklyProgress {
            week_start: week.start.clone(),
            total_study_time: week_sessions.iter().map(|session| session.duration).sum(),
            completed_topics: week_sessions.iter().filter(|session| session.completed).count()
                as u32,
            target_topics: weekly_target_topics(&todays_plan),
            daily_progress: build_daily_progress(&week_sessions, &plan_service),
        };

        debug!(
            "仪表盘聚合完成 streak={} total={}min upcoming={}",
            study_streak,
            total_study_time,
            upcoming_exams.len()
        );

        DashboardData {
            todays_plan,
            tomorrows_plan,
            current_week_progress,
            upcoming_exams,
            recent_performance,
            notifications,
            study_streak,
            total_study_time,
        }
    }
}

/// 本周目标知识点数
///
/// 口径现状：取"今天"计划的条目数。日口径与周口径的混用是历史行为，
/// 待产品确认后只需修改此函数。
fn weekly_target_topics(todays_plan: &StudyPlan) -> u32 {
    todays_plan.topics.len() as u32
}

/// 没有计划时使用的空占位计划
fn placeholder_plan(date: String) -> StudyPlan {
    StudyPlan {
        id: String::new(),
        exam_id: String::new(),
        date,
        topics: Vec::new(),
        total_planned_time: 0,
        actual_time: 0,
        notes: None,
    }
}

/// 把一周的学习记录拆成逐日进度，附带按考试的分解
fn build_daily_progress(
    week_sessions: &[StudySession],
    plan_service: &StudyPlanService,
) -> Vec<DailyProgress> {
    let mut by_day: BTreeMap<String, Vec<&StudySession>> = BTreeMap::new();
    for session in week_sessions {
        by_day.entry(format_date(&session.date)).or_default().push(session);
    }

    by_day
        .into_iter()
        .map(|(date, sessions)| {
            let mut by_exam: BTreeMap<&str, (u32, u32)> = BTreeMap::new();
            for session in &sessions {
                let entry = by_exam.entry(session.exam_id.as_str()).or_insert((0, 0));
                entry.0 += session.duration;
                if session.completed {
                    entry.1 += 1;
                }
            }

            let target_topics = plan_service
                .get_by_date(&date)
                .map(|plan| plan.topics.len() as u32)
                .unwrap_or(0);

            DailyProgress {
                total_study_time: sessions.iter().map(|session| session.duration).sum(),
                completed_topics: sessions.iter().filter(|session| session.completed).count()
                    as u32,
                target_topics,
                exams: by_exam
                    .into_iter()
                    .map(|(exam_id, (study_time, topics_completed))| ExamDailyProgress {
                        exam_id: exam_id.to_string(),
                        study_time,
                        topics_completed,
                    })
                    .collect(),
                date,
            }
        })
        .collect()
}
