//! 编排层（Orchestration Layer）
//!
//! ## 职责
//!
//! 本层负责批量处理和流程调度，是整个系统的"指挥中心"。
//!
//! ## 模块划分
//!
//! ### `batch_processor` - 批量投稿处理器
//! - 管理应用生命周期（初始化、运行）
//! - 批量加载投稿清单（Vec<SubmissionManifest>）
//! - 控制并发数量（Semaphore）
//! - 持有数据库存储（EssayStore）
//! - 输出全局统计信息和作者报告
//!
//! ### `submission_processor` - 单份投稿处理器
//! - 读取清单中的图片
//! - 调用 SubmissionFlow
//! - 打印评分表
//! - 标记已处理的清单
//!
//! ## 层次关系
//!
//! ```text
//! batch_processor (处理 Vec<SubmissionManifest>)
//!     ↓
//! submission_processor (处理单份清单)
//!     ↓
//! workflow::SubmissionFlow (识别 → 评分 → 入库)
//!     ↓
//! services (能力层：text_extraction / dimension_grader)
//!     ↓
//! clients + infrastructure (LlmClient / SqliteEssayStore)
//! ```

pub mod batch_processor;
pub mod submission_processor;

pub use batch_processor::{App, ProcessingStats};
pub use submission_processor::process_submission;
