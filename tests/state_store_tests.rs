//! 状态缓存与纯 reducer 的集成测试

use std::sync::Arc;

use chrono::Utc;
use tempfile::TempDir;

use study_tracker::database::Database;
use study_tracker::exam_service::ExamService;
use study_tracker::models::*;
use study_tracker::settings_service::SettingsService;
use study_tracker::state_store::{reduce, AppAction, AppState, StateSnapshot, StateStore};

fn test_db() -> (Arc<Database>, TempDir) {
    let dir = TempDir::new().expect("创建临时目录失败");
    let db = Database::new(&dir.path().join("test.db")).expect("创建数据库失败");
    (Arc::new(db), dir)
}

fn sample_exam(id: &str) -> Exam {
    let now = Utc::now();
    Exam {
        id: id.to_string(),
        name: "GATE".to_string(),
        exam_type: ExamType::Gate,
        category: "Engineering".to_string(),
        target_date: None,
        description: None,
        created_at: now,
        updated_at: now,
    }
}

fn sample_chapter(id: &str, exam_id: &str, topics: Vec<Topic>) -> Chapter {
    let now = Utc::now();
    let completed = topics.iter().filter(|t| t.is_complete).count() as u32;
    let progress = if topics.is_empty() {
        0
    } else {
        (f64::from(completed) / topics.len() as f64 * 100.0).round() as u8
    };
    Chapter {
        id: id.to_string(),
        exam_id: exam_id.to_string(),
        name: "Ch".to_string(),
        description: None,
        topics,
        total_duration: String::new(),
        completed_topics: completed,
        progress,
        created_at: now,
        updated_at: now,
    }
}

fn sample_topic(id: &str, complete: bool) -> Topic {
    let now = Utc::now();
    Topic {
        id: id.to_string(),
        sl_no: 1,
        chapter: "Ch".to_string(),
        topic_name: "T".to_string(),
        duration: String::new(),
        is_complete: complete,
        self_evaluate: 5,
        dpps: String::new(),
        other_problems: String::new(),
        document_updates: None,
        created_at: now,
        updated_at: now,
    }
}

#[test]
fn test_reduce_does_not_mutate_old_state() {
    let state = AppState::default();
    let next = reduce(&state, AppAction::AddExam(sample_exam("e1")));

    assert!(state.exams.is_empty());
    assert_eq!(next.exams.len(), 1);
    assert_ne!(state, next);
}

#[test]
fn test_reduce_loading_and_error_flags() {
    let state = AppState::default();
    let loading = reduce(&state, AppAction::SetLoading(true));
    assert!(loading.is_loading);

    let errored = reduce(&loading, AppAction::SetError(Some("存储已满".to_string())));
    assert_eq!(errored.error.as_deref(), Some("存储已满"));
    assert!(errored.is_loading);

    let cleared = reduce(&errored, AppAction::SetError(None));
    assert!(cleared.error.is_none());
}

#[test]
fn test_reduce_update_and_delete_exam() {
    let mut state = AppState::default();
    state = reduce(&state, AppAction::AddExam(sample_exam("e1")));
    state = reduce(&state, AppAction::AddExam(sample_exam("e2")));
    state = reduce(&state, AppAction::AddChapter(sample_chapter("c1", "e1", Vec::new())));
    state = reduce(&state, AppAction::AddChapter(sample_chapter("c2", "e2", Vec::new())));

    let mut renamed = sample_exam("e1");
    renamed.name = "GATE 2028".to_string();
    state = reduce(&state, AppAction::UpdateExam(renamed));
    assert_eq!(state.exams[0].name, "GATE 2028");

    // 删除考试时缓存同步清理其章节
    state = reduce(&state, AppAction::DeleteExam("e1".to_string()));
    assert_eq!(state.exams.len(), 1);
    assert_eq!(state.chapters.len(), 1);
    assert_eq!(state.chapters[0].id, "c2");
}

#[test]
fn test_reduce_topic_actions_keep_chapter_derived_fields() {
    let mut state = AppState::default();
    state = reduce(&state, AppAction::AddChapter(sample_chapter("c1", "e1", Vec::new())));

    state = reduce(
        &state,
        AppAction::AddTopic { chapter_id: "c1".to_string(), topic: sample_topic("t1", false) },
    );
    state = reduce(
        &state,
        AppAction::AddTopic { chapter_id: "c1".to_string(), topic: sample_topic("t2", true) },
    );
    assert_eq!(state.chapters[0].completed_topics, 1);
    assert_eq!(state.chapters[0].progress, 50);

    state = reduce(
        &state,
        AppAction::UpdateTopic { chapter_id: "c1".to_string(), topic: sample_topic("t1", true) },
    );
    assert_eq!(state.chapters[0].progress, 100);

    state = reduce(
        &state,
        AppAction::RemoveTopic { chapter_id: "c1".to_string(), topic_id: "t2".to_string() },
    );
    assert_eq!(state.chapters[0].topics.len(), 1);
    assert_eq!(state.chapters[0].completed_topics, 1);
    assert_eq!(state.chapters[0].progress, 100);
}

#[test]
fn test_reduce_mark_notification_read() {
    let now = Utc::now();
    let mut state = AppState::default();
    state = reduce(
        &state,
        AppAction::AddNotification(Notification {
            id: "n1".to_string(),
            kind: NotificationKind::Warning,
            title: "进度落后".to_string(),
            message: String::new(),
            date: now,
            read: false,
            action_required: true,
            exam_id: None,
            chapter_id: None,
            topic_id: None,
        }),
    );

    state = reduce(&state, AppAction::MarkNotificationRead("n1".to_string()));
    assert!(state.notifications[0].read);
}

#[test]
fn test_reduce_load_data_partial() {
    let state = reduce(
        &AppState::default(),
        AppAction::LoadData(StateSnapshot {
            exams: Some(vec![sample_exam("e1")]),
            ..Default::default()
        }),
    );

    assert_eq!(state.exams.len(), 1);
    // 未给出的集合保持原样
    assert!(state.chapters.is_empty());
    assert_eq!(state.user_settings, UserSettings::default());
}

#[test]
fn test_store_staleness_tracks_database_version() {
    let (db, _dir) = test_db();
    let mut store = StateStore::new();

    store.hydrate(&db);
    assert!(!store.is_stale(&db));

    // 服务写入后缓存过期
    let exams = ExamService::new(db.clone());
    let created = exams.create(CreateExamRequest {
        name: "ESE 2027".to_string(),
        exam_type: ExamType::Ese,
        category: "Engineering".to_string(),
        target_date: None,
        description: None,
    });
    assert!(store.is_stale(&db));
    assert!(store.state().exams.is_empty());

    store.hydrate(&db);
    assert!(!store.is_stale(&db));
    assert_eq!(store.state().exams, vec![created]);
}

#[test]
fn test_store_hydrate_picks_up_settings() {
    let (db, _dir) = test_db();
    let settings = SettingsService::new(db.clone());

    let mut changed = settings.get();
    changed.theme = Theme::Auto;
    settings.save(&changed);

    let mut store = StateStore::new();
    store.hydrate(&db);
    assert_eq!(store.state().user_settings.theme, Theme::Auto);
}

#[test]
fn test_store_dispatch_applies_action() {
    let mut store = StateStore::new();
    store.dispatch(AppAction::AddExam(sample_exam("e1")));
    assert_eq!(store.state().exams.len(), 1);
}
