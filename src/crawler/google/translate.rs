use anyhow::{anyhow, Result};
use serde_json::Value;

use crate::{crawler::google::HOST, logging, util};

/// 翻譯失敗時顯示的文字
pub const TRANSLATION_NOT_AVAILABLE: &str = "Translation not available";

/// 將文字翻譯成 `target` 語言，失敗時回傳 [`TRANSLATION_NOT_AVAILABLE`]
///
/// 目標語言為英文或文字為空時不翻譯。
pub async fn translate(text: &str, target: &str) -> String {
    if !needs_translation(text, target) {
        return text.to_string();
    }

    match visit(text, target).await {
        Ok(translated) => translated,
        Err(why) => {
            logging::error_file_async(format!(
                "Failed to translate text to {} because {:?}",
                target, why
            ));
            TRANSLATION_NOT_AVAILABLE.to_string()
        }
    }
}

fn needs_translation(text: &str, target: &str) -> bool {
    !text.trim().is_empty() && !target.is_empty() && !target.eq_ignore_ascii_case("en")
}

async fn visit(text: &str, target: &str) -> Result<String> {
    let url = format!(
        "https://{host}/translate_a/single?client=gtx&sl=auto&tl={tl}&dt=t&q={q}",
        host = HOST,
        tl = urlencoding::encode(target),
        q = urlencoding::encode(text)
    );
    let res = util::http::get_json::<Value>(&url).await?;
    parse_translation(&res)
}

/// 回應為巢狀陣列，`[[["譯文", "原文", ...], ...], ...]`，依序串接每一段譯文
fn parse_translation(res: &Value) -> Result<String> {
    let segments = res
        .get(0)
        .and_then(Value::as_array)
        .ok_or_else(|| anyhow!("Unexpected translation response: {}", res))?;

    let translated: String = segments
        .iter()
        .filter_map(|segment| segment.get(0).and_then(Value::as_str))
        .collect();

    if translated.trim().is_empty() {
        return Err(anyhow!("Empty translation response: {}", res));
    }

    Ok(translated)
}

#[cfg(test)]
mod tests {
    use serde_json::json;

    use super::*;

    #[test]
    fn test_parse_translation() {
        let res = json!([
            [
                ["El fondo busca replicar el índice. ", "The fund seeks to track the index. ", null, null, 10],
                ["Invierte en acciones.", "It invests in stocks.", null, null, 10]
            ],
            null,
            "en"
        ]);
        assert_eq!(
            parse_translation(&res).unwrap(),
            "El fondo busca replicar el índice. Invierte en acciones."
        );
        assert!(parse_translation(&json!({"error": 1})).is_err());
        assert!(parse_translation(&json!([[]])).is_err());
    }

    #[test]
    fn test_needs_translation() {
        assert!(!needs_translation("Seeks to track", "en"));
        assert!(!needs_translation("Seeks to track", "EN"));
        assert!(!needs_translation("  ", "es"));
        assert!(needs_translation("Seeks to track", "es"));
    }

    macro_rules! aw {
        ($e:expr) => {
            tokio_test::block_on($e)
        };
    }

    #[test]
    fn test_translate_to_english_is_identity() {
        assert_eq!(aw!(translate("Seeks to track", "en")), "Seeks to track");
        assert_eq!(aw!(translate("", "es")), "");
    }

    #[tokio::test]
    #[ignore]
    async fn test_translate() {
        dotenv::dotenv().ok();
        let text = translate("The fund seeks to track the index.", "es").await;
        logging::debug_file_async(format!("translated : {}", text));
        assert_ne!(text, TRANSLATION_NOT_AVAILABLE);
    }
}
