//! 输入验证辅助函数
//!
//! - normalize_history_limit：历史查询条数，缺省 100，限制在 1..=1000

pub const DEFAULT_HISTORY_LIMIT: usize = 100;
pub const MAX_HISTORY_LIMIT: usize = 1000;

/// 规范化历史查询条数
pub fn normalize_history_limit(limit: Option<i64>) -> usize {
    match limit {
        None => DEFAULT_HISTORY_LIMIT,
        Some(value) => value.clamp(1, MAX_HISTORY_LIMIT as i64) as usize,
    }
}
