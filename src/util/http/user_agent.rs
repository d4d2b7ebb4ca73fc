const FIREFOX_VERSIONS: [&str; 12] = [
    "133.0", "132.0", "131.0", "130.0", "129.0", "128.0", "127.0", "126.0", "125.0", "124.0",
    "123.0", "122.0",
];

const CHROME_VERSIONS: [&str; 12] = [
    "133.0.6943.60", "133.0.6943.88", "132.0.6834.83", "132.0.6834.110", "131.0.6778.85",
    "131.0.6778.108", "130.0.6723.92", "130.0.6723.117", "129.0.6668.70", "129.0.6668.89",
    "128.0.6613.120", "128.0.6613.138",
];

const EDGE_VERSIONS: [&str; 6] = [
    "133.0.3048.56", "132.0.2957.63", "131.0.2903.112", "130.0.2849.80", "129.0.2792.65",
    "128.0.2739.90",
];

const OS_STRINGS: [&str; 5] = [
    "Windows NT 10.0; Win64; x64",
    "Windows NT 11.0; Win64; x64",
    "Macintosh; Intel Mac OS X 10_15_7",
    "X11; Linux x86_64",
    "X11; Ubuntu; Linux x86_64",
];

fn pick<'a>(items: &[&'a str]) -> &'a str {
    items[rand::random_range(0..items.len())]
}

fn gen_firefox_ua() -> String {
    let version = pick(&FIREFOX_VERSIONS);
    format!(
        "Mozilla/5.0 ({}; rv:{}) Gecko/20100101 Firefox/{}",
        pick(&OS_STRINGS),
        version,
        version
    )
}

fn gen_chrome_ua() -> String {
    format!(
        "Mozilla/5.0 ({}) AppleWebKit/537.36 (KHTML, like Gecko) Chrome/{} Safari/537.36",
        pick(&OS_STRINGS),
        pick(&CHROME_VERSIONS)
    )
}

fn gen_edge_ua() -> String {
    let edge = pick(&EDGE_VERSIONS);
    // Edge 的 Chrome 版本與主版號相同
    let major = edge.split('.').next().unwrap_or("133");
    format!(
        "Mozilla/5.0 ({}) AppleWebKit/537.36 (KHTML, like Gecko) Chrome/{}.0.0.0 Safari/537.36 Edg/{}",
        pick(&OS_STRINGS[..2]),
        major,
        edge
    )
}

/// 隨機產生桌面瀏覽器的 User-Agent
pub fn gen_random_ua() -> String {
    match rand::random_range(0..10) {
        0..=5 => gen_chrome_ua(),  // 60% Chrome
        6..=8 => gen_firefox_ua(), // 30% Firefox
        _ => gen_edge_ua(),        // 10% Edge
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_gen_random_ua() {
        for _ in 0..20 {
            let ua = gen_random_ua();
            assert!(ua.starts_with("Mozilla/5.0 ("), "{}", ua);
        }
    }

    #[test]
    fn test_edge_ua_matches_major_version() {
        let ua = gen_edge_ua();
        let edge = ua.rsplit("Edg/").next().unwrap();
        let major = edge.split('.').next().unwrap();
        assert!(ua.contains(&format!("Chrome/{}.0.0.0", major)));
    }
}
