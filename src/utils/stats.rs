//! 进度与表现统计
//!
//! 纯函数集合：完成率、平均评分、连续学习天数、学习记录的分组与汇总。

use std::collections::{BTreeMap, HashSet};
use chrono::Duration;

use crate::models::StudySession;
use crate::utils::datetime::{format_date, format_naive, local_today, week_range};

/// 完成率百分比，四舍五入；总数为 0 时定义为 0
pub fn calculate_progress(completed: usize, total: usize) -> u8 {
    if total == 0 {
        return 0;
    }
    ((completed as f64 / total as f64) * 100.0).round() as u8
}

/// 平均评分，空列表为 0
pub fn calculate_average_rating(ratings: &[u8]) -> f64 {
    if ratings.is_empty() {
        return 0.0;
    }
    ratings.iter().map(|r| f64::from(*r)).sum::<f64>() / ratings.len() as f64
}

/// 连续学习天数
///
/// 从今天起逐日向前回溯，遇到第一个没有学习记录的日子即停止。
/// 今天没有记录时直接返回 0（不存在宽限日），空输入返回 0。
pub fn calculate_study_streak(study_dates: &[String]) -> u32 {
    if study_dates.is_empty() {
        return 0;
    }

    let dates: HashSet<&str> = study_dates.iter().map(String::as_str).collect();
    let mut streak = 0;
    let mut day = local_today();

    while dates.contains(format_naive(day).as_str()) {
        streak += 1;
        day -= Duration::days(1);
    }

    streak
}

/// 一组学习记录的汇总指标
#[derive(Debug, Clone, PartialEq)]
pub struct PerformanceMetrics {
    pub average_rating: f64,
    pub total_time: u32, // 分钟
    pub topics_completed: u32,
    pub average_time_per_topic: f64, // 分钟
}

/// 汇总一组学习记录
pub fn calculate_performance_metrics(sessions: &[StudySession]) -> PerformanceMetrics {
    if sessions.is_empty() {
        return PerformanceMetrics {
            average_rating: 0.0,
            total_time: 0,
            topics_completed: 0,
            average_time_per_topic: 0.0,
        };
    }

    let total_time: u32 = sessions.iter().map(|s| s.duration).sum();
    let completed = sessions.iter().filter(|s| s.completed).count() as u32;
    let ratings: Vec<u8> = sessions.iter().map(|s| s.performance_rating).collect();

    PerformanceMetrics {
        average_rating: calculate_average_rating(&ratings),
        total_time,
        topics_completed: completed,
        average_time_per_topic: if completed > 0 {
            f64::from(total_time) / f64::from(completed)
        } else {
            0.0
        },
    }
}

/// 分组周期
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Period {
    Day,
    Week,
    Month,
}

/// 按周期分组学习记录，键为该周期的起始标识
/// （日：yyyy-MM-dd；周：所在周周一；月：yyyy-MM）
pub fn group_sessions_by_period(
    sessions: &[StudySession],
    period: Period,
) -> BTreeMap<String, Vec<StudySession>> {
    let mut grouped: BTreeMap<String, Vec<StudySession>> = BTreeMap::new();
    for session in sessions {
        let day = format_date(&session.date);
        let key = match period {
            Period::Day => day,
            Period::Week => match day.parse::<chrono::NaiveDate>() {
                Ok(d) => week_range(d).start,
                Err(_) => day,
            },
            Period::Month => day.chars().take(7).collect(),
        };
        grouped.entry(key).or_default().push(session.clone());
    }
    grouped
}
