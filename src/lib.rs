// Study Tracker 核心库入口
// 持久化适配器、各实体服务、仪表盘聚合与 UI 状态缓存。
// 展示层（页面、路由、图表渲染）不在本库范围内。

pub mod backup;
pub mod chapter_service;
pub mod dashboard_service;
pub mod database;
pub mod exam_service;
pub mod logging;
pub mod models;
pub mod notification_service;
pub mod performance_service;
pub mod settings_service;
pub mod state_store;
pub mod study_plan_service;
pub mod study_session_service;
pub mod utils;
