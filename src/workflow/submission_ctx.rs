//! 投稿处理上下文
//!
//! 封装"我正在处理哪位作者的哪篇作文"这一信息，用作日志前缀

use std::fmt::Display;

/// 投稿处理上下文
#[derive(Debug, Clone)]
pub struct SubmissionCtx {
    /// 投稿序号（仅用于日志显示，从1开始）
    pub submission_index: usize,

    /// 作者用户名
    pub authorname: String,

    /// 作文标题
    pub title: String,
}

impl SubmissionCtx {
    /// 创建新的投稿上下文
    pub fn new(submission_index: usize, authorname: String, title: String) -> Self {
        Self {
            submission_index,
            authorname,
            title,
        }
    }
}

impl Display for SubmissionCtx {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "[投稿 #{} {}《{}》]",
            self.submission_index, self.authorname, self.title
        )
    }
}
