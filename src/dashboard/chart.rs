//! 折線圖與分組長條圖的座標，由 `partials/plot.html` 畫成 SVG

use chrono::{Datelike, NaiveDate};

const WIDTH: f64 = 760.0;
const HEIGHT: f64 = 320.0;
const PADDING: f64 = 48.0;

/// 多條序列依序使用的顏色
pub const PALETTE: [&str; 8] = [
    "#348dc1", "#ff9933", "#2ca02c", "#d62728", "#9467bd", "#8c564b", "#e377c2", "#17becf",
];

/// 折線圖的一條序列
pub struct LineSeries<'a> {
    pub label: &'a str,
    pub points: Vec<(NaiveDate, f64)>,
}

/// 分組長條圖中的一組，例︰Return、Risk
pub struct BarGroup<'a> {
    pub label: &'a str,
    pub color: &'static str,
    /// 與類別一一對應，`None` 表示沒有數值
    pub values: Vec<Option<f64>>,
}

/// 水平格線與左側刻度
pub struct GridLine {
    pub y: f64,
    pub label_y: f64,
    pub label: String,
}

/// X 軸下方的文字
pub struct AxisLabel {
    pub x: f64,
    pub label: String,
}

pub struct Polyline {
    pub color: &'static str,
    pub points: String,
}

pub struct Bar {
    pub x: f64,
    pub y: f64,
    pub width: f64,
    pub height: f64,
    pub color: &'static str,
    pub tooltip: String,
}

pub struct LegendEntry {
    pub x: f64,
    pub y: f64,
    pub text_x: f64,
    pub text_y: f64,
    pub color: &'static str,
    pub label: String,
}

/// 一張圖所需的全部座標，數值皆已四捨五入到小數第二位
pub struct Plot {
    pub title: String,
    pub width: f64,
    pub height: f64,
    pub center: f64,
    pub left: f64,
    pub right: f64,
    /// Y 軸刻度文字的 x 座標
    pub tick_x: f64,
    /// X 軸文字的 y 座標
    pub axis_y: f64,
    pub grid: Vec<GridLine>,
    pub x_labels: Vec<AxisLabel>,
    pub lines: Vec<Polyline>,
    pub bars: Vec<Bar>,
    pub zero_line: Option<f64>,
    pub legend: Vec<LegendEntry>,
}

impl Plot {
    fn new(title: &str) -> Self {
        Plot {
            title: title.to_string(),
            width: WIDTH,
            height: HEIGHT,
            center: WIDTH / 2.0,
            left: PADDING,
            right: WIDTH - PADDING,
            tick_x: PADDING - 6.0,
            axis_y: HEIGHT - PADDING + 16.0,
            grid: Vec::new(),
            x_labels: Vec::new(),
            lines: Vec::new(),
            bars: Vec::new(),
            zero_line: None,
            legend: Vec::new(),
        }
    }
}

fn round2(v: f64) -> f64 {
    (v * 100.0).round() / 100.0
}

fn color(idx: usize) -> &'static str {
    PALETTE[idx % PALETTE.len()]
}

/// 數值的上下界，範圍為零時往兩側放寬
fn extent(values: impl Iterator<Item = f64>, include_zero: bool) -> Option<(f64, f64)> {
    let mut min_v = f64::INFINITY;
    let mut max_v = f64::NEG_INFINITY;

    for v in values.filter(|v| v.is_finite()) {
        min_v = min_v.min(v);
        max_v = max_v.max(v);
    }

    if !min_v.is_finite() || !max_v.is_finite() {
        return None;
    }

    if include_zero {
        min_v = min_v.min(0.0);
        max_v = max_v.max(0.0);
    }

    if min_v == max_v {
        let adjust = if min_v == 0.0 { 1.0 } else { min_v.abs() * 0.1 };
        min_v -= adjust;
        max_v += adjust;
    }

    Some((min_v, max_v))
}

fn scale_y(value: f64, min_v: f64, max_v: f64) -> f64 {
    let inner = HEIGHT - 2.0 * PADDING;
    PADDING + (1.0 - (value - min_v) / (max_v - min_v)) * inner
}

fn grid(min_v: f64, max_v: f64, fmt: impl Fn(f64) -> String) -> Vec<GridLine> {
    (0..=4)
        .map(|step| {
            let value = min_v + (max_v - min_v) * step as f64 / 4.0;
            let y = scale_y(value, min_v, max_v);
            GridLine {
                y: round2(y),
                label_y: round2(y + 4.0),
                label: fmt(value),
            }
        })
        .collect()
}

fn legend(labels: &[(&str, &'static str)]) -> Vec<LegendEntry> {
    let mut x = PADDING;
    let y = HEIGHT - 10.0;
    let mut entries = Vec::with_capacity(labels.len());
    for (label, color) in labels {
        entries.push(LegendEntry {
            x: round2(x),
            y: y - 8.0,
            text_x: round2(x + 16.0),
            text_y: y,
            color: *color,
            label: label.to_string(),
        });
        x += 24.0 + 7.0 * label.chars().count() as f64;
    }
    entries
}

/// 依日期繪製一或多條折線，沒有任何資料點時回傳 `None`
pub fn line_chart(title: &str, series: &[LineSeries]) -> Option<Plot> {
    let first = series.iter().flat_map(|s| s.points.iter()).map(|(d, _)| *d).min()?;
    let last = series.iter().flat_map(|s| s.points.iter()).map(|(d, _)| *d).max()?;
    let (min_v, max_v) = extent(
        series.iter().flat_map(|s| s.points.iter()).map(|(_, v)| *v),
        false,
    )?;

    let span = (last - first).num_days().max(1) as f64;
    let scale_x = |date: NaiveDate| {
        PADDING + (date - first).num_days() as f64 / span * (WIDTH - 2.0 * PADDING)
    };

    let mut plot = Plot::new(title);
    plot.grid = grid(min_v, max_v, |v| format!("{:.2}", v));

    // 每年一個刻度
    for year in first.year()..=last.year() {
        let date = match NaiveDate::from_ymd_opt(year, 1, 1) {
            Some(d) if d >= first => d,
            _ if year == first.year() => first,
            _ => continue,
        };
        plot.x_labels.push(AxisLabel {
            x: round2(scale_x(date)),
            label: year.to_string(),
        });
    }

    let mut labels = Vec::with_capacity(series.len());
    for (idx, s) in series.iter().enumerate() {
        let points = s
            .points
            .iter()
            .filter(|(_, v)| v.is_finite())
            .map(|(d, v)| format!("{:.2},{:.2}", scale_x(*d), scale_y(*v, min_v, max_v)))
            .collect::<Vec<_>>()
            .join(" ");
        if points.is_empty() {
            continue;
        }
        plot.lines.push(Polyline {
            color: color(idx),
            points,
        });
        labels.push((s.label, color(idx)));
    }

    if series.len() > 1 {
        plot.legend = legend(&labels);
    }

    Some(plot)
}

/// 分組長條圖，數值以百分比顯示，全部沒有數值時回傳 `None`
pub fn grouped_bar_chart(title: &str, categories: &[String], groups: &[BarGroup]) -> Option<Plot> {
    let (min_v, max_v) = extent(
        groups.iter().flat_map(|g| g.values.iter().flatten().copied()),
        true,
    )?;

    let mut plot = Plot::new(title);
    plot.grid = grid(min_v, max_v, |v| format!("{:.1}%", v * 100.0));

    let zero = scale_y(0.0, min_v, max_v);
    let slot = (WIDTH - 2.0 * PADDING) / categories.len().max(1) as f64;
    let bar = slot * 0.8 / groups.len().max(1) as f64;

    for (c_idx, category) in categories.iter().enumerate() {
        let left = PADDING + slot * c_idx as f64 + slot * 0.1;
        for (g_idx, group) in groups.iter().enumerate() {
            let value = match group.values.get(c_idx).copied().flatten() {
                Some(v) if v.is_finite() => v,
                _ => continue,
            };
            let y = scale_y(value, min_v, max_v);
            plot.bars.push(Bar {
                x: round2(left + bar * g_idx as f64),
                y: round2(y.min(zero)),
                width: round2(bar),
                height: round2((zero - y).abs()),
                color: group.color,
                tooltip: format!("{} {}: {:.2}%", group.label, category, value * 100.0),
            });
        }
        plot.x_labels.push(AxisLabel {
            x: round2(left + slot * 0.4),
            label: category.clone(),
        });
    }

    plot.zero_line = Some(round2(zero));

    let labels: Vec<(&str, &'static str)> = groups.iter().map(|g| (g.label, g.color)).collect();
    plot.legend = legend(&labels);

    Some(plot)
}

#[cfg(test)]
mod tests {
    use askama::Template;

    use super::*;

    #[derive(Template)]
    #[template(path = "partials/plot.html")]
    struct PlotSvg<'a> {
        plot: &'a Plot,
    }

    fn render(plot: &Plot) -> String {
        PlotSvg { plot }.render().unwrap().trim().to_string()
    }

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    #[test]
    fn test_line_chart() {
        let series = vec![
            LineSeries {
                label: "QQQ",
                points: vec![(date(2023, 6, 1), 350.0), (date(2024, 6, 3), 450.0)],
            },
            LineSeries {
                label: "SPY",
                points: vec![(date(2023, 6, 1), 420.0), (date(2024, 6, 3), 530.0)],
            },
        ];
        let plot = line_chart("Historical prices", &series).unwrap();
        assert_eq!(plot.lines.len(), 2);
        assert_eq!(plot.legend.len(), 2);
        assert_eq!(plot.grid.len(), 5);

        let svg = render(&plot);
        assert!(svg.starts_with("<svg"));
        assert!(svg.ends_with("</svg>"));
        assert_eq!(svg.matches("<polyline").count(), 2);
        assert!(svg.contains(">2024<"));
        assert!(svg.contains(">SPY<"));
    }

    #[test]
    fn test_single_line_has_no_legend() {
        let series = vec![LineSeries {
            label: "QQQ",
            points: vec![(date(2023, 6, 1), 350.0), (date(2024, 6, 3), 450.0)],
        }];
        let plot = line_chart("QQQ", &series).unwrap();
        assert!(plot.legend.is_empty());
        assert!(plot.zero_line.is_none());
    }

    #[test]
    fn test_line_chart_without_points() {
        assert!(line_chart("empty", &[]).is_none());
        let series = vec![LineSeries { label: "EWT", points: vec![] }];
        assert!(line_chart("empty", &series).is_none());
    }

    #[test]
    fn test_flat_line_chart() {
        let series = vec![LineSeries {
            label: "AGG",
            points: vec![(date(2024, 1, 2), 100.0), (date(2024, 1, 3), 100.0)],
        }];
        let plot = line_chart("flat", &series).unwrap();
        assert!(!render(&plot).contains("NaN"));
    }

    #[test]
    fn test_grouped_bar_chart() {
        let categories = vec!["1m".to_string(), "3m".to_string(), "1y".to_string()];
        let groups = vec![
            BarGroup { label: "Return", color: PALETTE[0], values: vec![Some(0.12), Some(-0.05), None] },
            BarGroup { label: "Risk", color: PALETTE[1], values: vec![Some(0.2), Some(0.18), None] },
        ];
        let plot = grouped_bar_chart("Return & Risk", &categories, &groups).unwrap();
        assert_eq!(plot.bars.len(), 4);
        assert_eq!(plot.x_labels.len(), 3);
        assert!(plot.zero_line.is_some());

        let svg = render(&plot);
        // 4 根長條加上 2 個圖例
        assert_eq!(svg.matches("<rect").count(), 4 + 2);
        assert!(svg.contains("Return &amp; Risk"));
        assert!(svg.contains("Return 3m: -5.00%"));
    }

    #[test]
    fn test_labels_are_escaped() {
        let categories = vec!["<b>".to_string()];
        let groups = vec![BarGroup { label: "Return", color: PALETTE[0], values: vec![Some(0.1)] }];
        let svg = render(&grouped_bar_chart("t", &categories, &groups).unwrap());
        assert!(svg.contains("&lt;b&gt;"));
        assert!(!svg.contains("<b>"));
    }

    #[test]
    fn test_grouped_bar_chart_without_values() {
        let categories = vec!["QQQ".to_string()];
        let groups = vec![BarGroup { label: "Return", color: PALETTE[0], values: vec![None] }];
        assert!(grouped_bar_chart("nothing", &categories, &groups).is_none());
    }
}
