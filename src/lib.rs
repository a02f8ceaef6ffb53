//! # Essay Grader
//!
//! 手写作文识别与多维度评分
//!
//! ## 架构设计
//!
//! 本系统采用分层架构：
//!
//! ### ① 客户端与基础设施（Clients / Infrastructure）
//! - `clients/` - `LlmProvider` 接口和基于 async-openai 的 `LlmClient`
//! - `infrastructure/` - `EssayStore` 接口和 SQLite 实现，一份投稿一个事务
//!
//! ### ② 业务能力层（Services）
//! - `TextExtractor` - 单张图片 → 文字
//! - `DimensionGrader` - 单个维度 → 分数 + 评语，失败时给出未评分结果
//!
//! ### ③ 流程层（Workflow）
//! - `GradingFlow` - 六个维度并发评分，按目录顺序汇总
//! - `SubmissionFlow` - 识别 → 拼接 → 评分 → 入库
//!
//! ### ④ 编排层（Orchestration）
//! - `orchestrator/batch_processor` - 批量处理投稿清单，控制并发
//! - `orchestrator/submission_processor` - 处理单份投稿清单
//!
//! ## 模块结构

pub mod clients;
pub mod config;
pub mod error;
pub mod infrastructure;
pub mod models;
pub mod orchestrator;
pub mod services;
pub mod utils;
pub mod workflow;

// 重新导出常用类型
pub use clients::{ChatRequest, LlmClient, LlmProvider};
pub use config::Config;
pub use error::{AppError, AppResult};
pub use infrastructure::{EssayStore, SqliteEssayStore};
pub use models::{Grade, GradeRecord, GradingReport, RubricDimension, Score, RUBRIC_CATALOG};
pub use orchestrator::App;
pub use workflow::{GradingFlow, SubmissionCtx, SubmissionFlow};
