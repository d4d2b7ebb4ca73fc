//! # 報酬與風險計算模組
//!
//! 所有函式皆為純計算，不涉及任何 I/O。
//!
//! - **對數報酬 (`log_return`)**：`ln(期末價 / 期初價)` 及其年化。
//! - **波動度 (`volatility`)**：日對數報酬的樣本標準差乘以 √252。
//! - **風險報酬 (`risk_return`)**：報酬風險比與各區間的報酬、風險拆解。
//! - **終值 (`future_value`)**：複利公式試算投資終值。

/// 複利終值試算
pub mod future_value;
/// 對數報酬
pub mod log_return;
/// 各區間報酬與風險
pub mod risk_return;
/// 年化波動度
pub mod volatility;
