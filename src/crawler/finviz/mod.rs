/// 新聞標題採集子模組
pub mod news;

/// 主機域名
const HOST: &str = "finviz.com";

/// finviz 財經採集器
pub struct Finviz {}
