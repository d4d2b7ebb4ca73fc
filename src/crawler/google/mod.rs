/// 免費翻譯子模組
pub mod translate;

/// 翻譯服務的主機域名
const HOST: &str = "translate.googleapis.com";
