//! 日期与时长工具
//!
//! 日历语义统一使用本地时区：一次学习属于哪一天、"今天"的计划是哪份，
//! 都按用户所在时区判断。日期字符串统一为 `yyyy-MM-dd`，
//! 其字典序与时间序一致，区间比较直接用字符串完成。

use chrono::{DateTime, Datelike, Duration, Local, Months, NaiveDate, Utc};

/// 闭区间日期范围（yyyy-MM-dd 字符串）
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DateRange {
    pub start: String,
    pub end: String,
}

/// 将时间戳换算为本地日历日的 yyyy-MM-dd 字符串
pub fn format_date(date: &DateTime<Utc>) -> String {
    date.with_timezone(&Local).format("%Y-%m-%d").to_string()
}

/// NaiveDate 转 yyyy-MM-dd 字符串
pub fn format_naive(date: NaiveDate) -> String {
    date.format("%Y-%m-%d").to_string()
}

/// 本地今天
pub fn today() -> String {
    format_naive(local_today())
}

/// 本地明天
pub fn tomorrow() -> String {
    format_naive(local_today() + Duration::days(1))
}

/// 本地昨天
pub fn yesterday() -> String {
    format_naive(local_today() - Duration::days(1))
}

pub fn local_today() -> NaiveDate {
    Local::now().date_naive()
}

/// 指定日期所在的周（周一起始，周日结束）
pub fn week_range(date: NaiveDate) -> DateRange {
    let monday = date - Duration::days(i64::from(date.weekday().num_days_from_monday()));
    DateRange {
        start: format_naive(monday),
        end: format_naive(monday + Duration::days(6)),
    }
}

/// 本周范围
pub fn current_week_range() -> DateRange {
    week_range(local_today())
}

/// 指定日期所在的月
pub fn month_range(date: NaiveDate) -> DateRange {
    let first = date.with_day(1).unwrap_or(date);
    let last = first
        .checked_add_months(Months::new(1))
        .and_then(|next| next.pred_opt())
        .unwrap_or(date);
    DateRange { start: format_naive(first), end: format_naive(last) }
}

/// 本月范围
pub fn current_month_range() -> DateRange {
    month_range(local_today())
}

/// 解析 HH:MM 为分钟数，无法解析的部分按 0 处理
pub fn parse_time_to_minutes(time: &str) -> u32 {
    let mut parts = time.split(':');
    let hours: u32 = parts.next().and_then(|p| p.parse().ok()).unwrap_or(0);
    let minutes: u32 = parts.next().and_then(|p| p.parse().ok()).unwrap_or(0);
    hours * 60 + minutes
}

/// 分钟数格式化为 HH:MM:00
pub fn format_time(minutes: u32) -> String {
    format!("{:02}:{:02}:00", minutes / 60, minutes % 60)
}

/// 分钟数格式化为展示用时长文本（"2h 30m" / "45m" / "3h"）
pub fn format_duration(minutes: u32) -> String {
    let hours = minutes / 60;
    let mins = minutes % 60;
    if hours == 0 {
        format!("{mins}m")
    } else if mins == 0 {
        format!("{hours}h")
    } else {
        format!("{hours}h {mins}m")
    }
}

/// 分钟转小时，保留两位小数
pub fn minutes_to_hours(minutes: u32) -> f64 {
    (f64::from(minutes) / 60.0 * 100.0).round() / 100.0
}

/// 小时转分钟，四舍五入
pub fn hours_to_minutes(hours: f64) -> u32 {
    (hours * 60.0).round() as u32
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_week_range_starts_on_monday() {
        // 2025-06-11 是周三
        let date = NaiveDate::from_ymd_opt(2025, 6, 11).unwrap();
        let range = week_range(date);
        assert_eq!(range.start, "2025-06-09");
        assert_eq!(range.end, "2025-06-15");
    }

    #[test]
    fn test_week_range_on_monday_is_identity() {
        let monday = NaiveDate::from_ymd_opt(2025, 6, 9).unwrap();
        let range = week_range(monday);
        assert_eq!(range.start, "2025-06-09");
    }

    #[test]
    fn test_month_range() {
        let date = NaiveDate::from_ymd_opt(2025, 2, 14).unwrap();
        let range = month_range(date);
        assert_eq!(range.start, "2025-02-01");
        assert_eq!(range.end, "2025-02-28");
    }

    #[test]
    fn test_month_range_december() {
        let date = NaiveDate::from_ymd_opt(2024, 12, 5).unwrap();
        let range = month_range(date);
        assert_eq!(range.start, "2024-12-01");
        assert_eq!(range.end, "2024-12-31");
    }

    #[test]
    fn test_parse_time_to_minutes() {
        assert_eq!(parse_time_to_minutes("09:30"), 570);
        assert_eq!(parse_time_to_minutes("00:05"), 5);
        assert_eq!(parse_time_to_minutes("bad"), 0);
        assert_eq!(parse_time_to_minutes("2:xx"), 120);
    }

    #[test]
    fn test_format_time_and_duration() {
        assert_eq!(format_time(570), "09:30:00");
        assert_eq!(format_duration(150), "2h 30m");
        assert_eq!(format_duration(45), "45m");
        assert_eq!(format_duration(180), "3h");
    }

    #[test]
    fn test_minutes_hours_conversion() {
        assert_eq!(minutes_to_hours(90), 1.5);
        assert_eq!(hours_to_minutes(1.5), 90);
        assert_eq!(minutes_to_hours(100), 1.67);
    }

    #[test]
    fn test_tomorrow_follows_today() {
        assert!(tomorrow() > today());
        assert!(yesterday() < today());
    }
}
