//! 备份导出/导入的集成测试

use std::sync::Arc;

use chrono::{Duration, Utc};
use tempfile::TempDir;

use study_tracker::backup::{export_data, export_json, import_json, BackupError};
use study_tracker::chapter_service::ChapterService;
use study_tracker::database::Database;
use study_tracker::exam_service::ExamService;
use study_tracker::models::*;
use study_tracker::settings_service::SettingsService;
use study_tracker::study_session_service::StudySessionService;

fn test_db() -> (Arc<Database>, TempDir) {
    let dir = TempDir::new().expect("创建临时目录失败");
    let db = Database::new(&dir.path().join("test.db")).expect("创建数据库失败");
    (Arc::new(db), dir)
}

fn seed(db: &Arc<Database>) -> (Exam, Chapter) {
    let exam = ExamService::new(db.clone()).create(CreateExamRequest {
        name: "UPSC Prelims".to_string(),
        exam_type: ExamType::Upsc,
        category: "Civil Services".to_string(),
        target_date: Some(Utc::now() + Duration::days(200)),
        description: Some("第一阶段".to_string()),
    });
    let chapter = ChapterService::new(db.clone()).create(CreateChapterRequest {
        exam_id: exam.id.clone(),
        name: "Modern History".to_string(),
        description: None,
        total_duration: "20:00:00".to_string(),
        topics: vec![CreateTopicRequest {
            sl_no: 1,
            topic_name: "1857 起义".to_string(),
            duration: "02:00:00".to_string(),
            is_complete: true,
            self_evaluate: 7,
            dpps: "DPP-01".to_string(),
            other_problems: String::new(),
            document_updates: None,
        }],
    });
    StudySessionService::new(db.clone()).create(CreateStudySessionRequest {
        exam_id: exam.id.clone(),
        chapter_id: chapter.id.clone(),
        topic_id: chapter.topics[0].id.clone(),
        date: Utc::now(),
        duration: 90,
        notes: Some("错题复盘".to_string()),
        performance_rating: 8,
        completed: true,
    });

    let settings_service = SettingsService::new(db.clone());
    let mut settings = settings_service.get();
    settings.time_format = TimeFormat::H24;
    settings_service.save(&settings);

    (exam, chapter)
}

#[test]
fn test_export_import_roundtrip() {
    let (db, _dir) = test_db();
    let (exam, chapter) = seed(&db);
    let json = export_json(&db).expect("导出应成功");

    // 导入到一个全新的存储
    let (fresh, _dir2) = test_db();
    let summary = import_json(&fresh, &json).expect("导入应成功");
    assert_eq!(summary.exams, 1);
    assert_eq!(summary.chapters, 1);
    assert_eq!(summary.study_sessions, 1);

    assert_eq!(ExamService::new(fresh.clone()).get_all(), vec![exam]);
    assert_eq!(ChapterService::new(fresh.clone()).get_all(), vec![chapter]);
    assert_eq!(SettingsService::new(fresh.clone()).get().time_format, TimeFormat::H24);

    // 再导出一次，集合内容一致
    let first = export_data(&db);
    let second = export_data(&fresh);
    assert_eq!(first.exams, second.exams);
    assert_eq!(first.chapters, second.chapters);
    assert_eq!(first.study_sessions, second.study_sessions);
    assert_eq!(first.user_settings, second.user_settings);
}

#[test]
fn test_export_document_shape() {
    let (db, _dir) = test_db();
    seed(&db);
    let json = export_json(&db).expect("导出应成功");
    let value: serde_json::Value = serde_json::from_str(&json).expect("导出结果应是合法 JSON");

    assert!(value.get("version").is_some());
    assert!(value.get("exportDate").is_some());
    assert!(value.get("exams").expect("应有 exams").is_array());
    assert!(value.get("userSettings").expect("应有 userSettings").is_object());
    // 字段使用 camelCase 线格式
    let exam = &value["exams"][0];
    assert!(exam.get("targetDate").is_some());
    assert!(exam.get("createdAt").is_some());
    assert_eq!(exam["type"], "UPSC");
}

#[test]
fn test_import_rejects_malformed_json() {
    let (db, _dir) = test_db();
    let err = import_json(&db, "not json at all").expect_err("应拒绝");
    assert!(matches!(err, BackupError::Parse(_)));
}

#[test]
fn test_import_rejects_non_object() {
    let (db, _dir) = test_db();
    let err = import_json(&db, "[1, 2, 3]").expect_err("应拒绝");
    assert!(matches!(err, BackupError::NotAnObject));
}

#[test]
fn test_import_requires_exams_and_settings_keys() {
    let (db, _dir) = test_db();

    let err = import_json(&db, r#"{"userSettings": {}}"#).expect_err("缺 exams 应拒绝");
    assert!(matches!(err, BackupError::MissingField("exams")));

    let err = import_json(&db, r#"{"exams": []}"#).expect_err("缺 userSettings 应拒绝");
    assert!(matches!(err, BackupError::MissingField("userSettings")));
}

#[test]
fn test_import_accepts_settings_alias() {
    let (db, _dir) = test_db();
    let json = format!(
        r#"{{"exams": [], "settings": {}}}"#,
        serde_json::to_string(&UserSettings::default()).expect("序列化默认设置")
    );
    import_json(&db, &json).expect("settings 别名应被接受");
    assert_eq!(SettingsService::new(db).get(), UserSettings::default());
}

#[test]
fn test_failed_import_leaves_existing_data_untouched() {
    let (db, _dir) = test_db();
    let (exam, _) = seed(&db);

    // exams 键存在但内容不成形，解析失败，不做部分导入
    let bad = r#"{"exams": [{"bogus": true}], "userSettings": {}}"#;
    let err = import_json(&db, bad).expect_err("应拒绝");
    assert!(matches!(err, BackupError::Parse(_)));

    assert_eq!(ExamService::new(db.clone()).get_all(), vec![exam]);
}

#[test]
fn test_import_ignores_legacy_topics_collection() {
    let (db, _dir) = test_db();
    let json = format!(
        r#"{{"exams": [], "topics": [{{"anything": 1}}], "userSettings": {}}}"#,
        serde_json::to_string(&UserSettings::default()).expect("序列化默认设置")
    );
    import_json(&db, &json).expect("旧版 topics 键应被忽略");
}
