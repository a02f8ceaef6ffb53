/// 日志工具模块
///
/// 提供日志初始化、格式化和输出的辅助函数
use anyhow::Result;
use std::fs;
use tracing::info;
use tracing_subscriber::EnvFilter;

/// 初始化 tracing 日志
///
/// 优先使用 `RUST_LOG`，否则按 `verbose` 选择 debug / info。
/// 重复调用是安全的（测试中会多次调用）。
pub fn init(verbose: bool) {
    let default_level = if verbose { "debug" } else { "info" };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level));

    let _ = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .try_init();
}

/// 初始化日志文件
///
/// # 参数
/// - `log_file_path`: 日志文件路径
pub fn init_log_file(log_file_path: &str) -> Result<()> {
    let log_header = format!(
        "{rule}\n作文评分日志 - {}\n{rule}\n\n",
        chrono::Local::now().format("%Y-%m-%d %H:%M:%S"),
        rule = heavy_rule()
    );
    fs::write(log_file_path, log_header)?;
    Ok(())
}

const RULE_WIDTH: usize = 60;

fn heavy_rule() -> String {
    "=".repeat(RULE_WIDTH)
}

fn light_rule() -> String {
    "─".repeat(RULE_WIDTH)
}

/// 记录程序启动信息
pub fn log_startup(max_concurrent: usize, grading_model: &str, vision_model: &str) {
    info!("{}", heavy_rule());
    info!("🚀 作文评分启动 | 并发上限 {}", max_concurrent);
    info!("🤖 评分模型: {} | 识别模型: {}", grading_model, vision_model);
    info!("{}", heavy_rule());
}

/// 记录投稿加载信息
pub fn log_submissions_loaded(total: usize, max_concurrent: usize) {
    info!(
        "✓ 共 {} 份投稿待评分，每批最多 {} 份",
        total,
        max_concurrent.max(1)
    );
}

/// 记录批次开始信息
pub fn log_batch_start(
    batch_num: usize,
    total_batches: usize,
    start: usize,
    end: usize,
    total: usize,
) {
    info!("\n{}", heavy_rule());
    info!(
        "📦 批次 {}/{}: 投稿 #{}-#{} (共 {} 份)",
        batch_num, total_batches, start, end, total
    );
}

/// 记录批次完成信息
pub fn log_batch_complete(batch_num: usize, success: usize, total: usize) {
    info!("{}", light_rule());
    info!("✓ 批次 {} 结束: {}/{} 份入库", batch_num, success, total);
}

/// 打印最终统计信息
pub fn print_final_stats(success: usize, failed: usize, total: usize, log_file_path: &str) {
    let rate = if total == 0 {
        0.0
    } else {
        success as f64 * 100.0 / total as f64
    };

    info!("\n{}", heavy_rule());
    info!(
        "📊 评分结束 ({})",
        chrono::Local::now().format("%Y-%m-%d %H:%M:%S")
    );
    info!("✅ 入库 {}/{} ({:.1}%) | ❌ 失败 {}", success, total, rate, failed);
    info!("{}", heavy_rule());
    info!("日志文件: {}", log_file_path);
}

/// 截断长文本用于日志显示
///
/// # 参数
/// - `text`: 原始文本
/// - `max_len`: 最大字符数
pub fn truncate_text(text: &str, max_len: usize) -> String {
    let flat = text.replace('\n', " ");
    if flat.chars().count() > max_len {
        flat.chars().take(max_len).collect::<String>() + "..."
    } else {
        flat
    }
}
