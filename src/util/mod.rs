use std::cmp::max;

pub mod datetime;
pub mod http;
pub mod text;

/// 同時進行的 I/O 工作數上限
pub fn concurrent_limit_16() -> usize {
    max(16, num_cpus::get() * 4)
}
