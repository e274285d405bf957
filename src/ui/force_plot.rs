//! Force-direction chart as inline SVG.
//!
//! Positive contributions (red) are stacked to the left of the output value
//! and push it up towards fraud; negative ones (blue) are stacked to the
//! right and push it down. Together they span the gap between the base value
//! and the output.

use crate::types::prediction::{Explanation, FeatureContribution};
use crate::ui::{escape_html, format_value};
use std::fmt::Write;

const WIDTH: f64 = 960.0;
const MARGIN: f64 = 40.0;
const BAR_Y: f64 = 90.0;
const BAR_HEIGHT: f64 = 30.0;
/// Segments narrower than this get a tooltip but no inline label
const MIN_LABEL_WIDTH: f64 = 60.0;

pub const POSITIVE_COLOR: &str = "#ff0d57";
pub const NEGATIVE_COLOR: &str = "#1e88e5";

struct Segment<'a> {
    contribution: &'a FeatureContribution,
    from: f64,
    to: f64,
}

fn by_magnitude(a: &&FeatureContribution, b: &&FeatureContribution) -> std::cmp::Ordering {
    b.contribution
        .abs()
        .partial_cmp(&a.contribution.abs())
        .unwrap_or(std::cmp::Ordering::Equal)
}

/// Render the chart for one explanation
pub fn render(explanation: &Explanation, height: u32) -> String {
    let base = explanation.base_value;
    let output = explanation.output_value();

    let mut positive: Vec<&FeatureContribution> = explanation
        .contributions
        .iter()
        .filter(|c| c.contribution > 0.0)
        .collect();
    let mut negative: Vec<&FeatureContribution> = explanation
        .contributions
        .iter()
        .filter(|c| c.contribution < 0.0)
        .collect();
    positive.sort_by(by_magnitude);
    negative.sort_by(by_magnitude);

    let mut segments = Vec::with_capacity(positive.len() + negative.len());
    let mut cursor = output;
    for &c in &positive {
        segments.push(Segment {
            contribution: c,
            from: cursor - c.contribution,
            to: cursor,
        });
        cursor -= c.contribution;
    }
    cursor = output;
    for &c in &negative {
        segments.push(Segment {
            contribution: c,
            from: cursor,
            to: cursor - c.contribution,
        });
        cursor -= c.contribution;
    }

    let positive_total: f64 = positive.iter().map(|c| c.contribution).sum();
    let negative_total: f64 = negative.iter().map(|c| -c.contribution).sum();
    let mut lo = (base - negative_total).min(output - positive_total).min(base);
    let mut hi = (base + positive_total).max(output + negative_total).max(base);
    let span = hi - lo;
    let pad = if span > 1e-12 { span * 0.05 } else { 0.5 };
    lo -= pad;
    hi += pad;

    let x = |v: f64| MARGIN + (v - lo) / (hi - lo) * (WIDTH - 2.0 * MARGIN);

    let mut svg = String::new();
    let _ = write!(
        svg,
        r#"<svg class="force-plot" xmlns="http://www.w3.org/2000/svg" viewBox="0 0 {w} {h}" width="100%" height="{h}" font-family="sans-serif">"#,
        w = WIDTH,
        h = height
    );

    // legend
    let _ = write!(
        svg,
        r#"<text x="{l}" y="20" font-size="12" fill="{pc}">higher &#8594; fraud</text><text x="{r}" y="20" font-size="12" fill="{nc}" text-anchor="end">&#8592; lower</text>"#,
        l = MARGIN,
        r = WIDTH - MARGIN,
        pc = POSITIVE_COLOR,
        nc = NEGATIVE_COLOR
    );

    // axis
    let _ = write!(
        svg,
        r##"<line x1="{a}" y1="{y}" x2="{b}" y2="{y}" stroke="#999" stroke-width="1"/>"##,
        a = MARGIN,
        b = WIDTH - MARGIN,
        y = BAR_Y - 10.0
    );
    for i in 0..=4 {
        let v = lo + (hi - lo) * i as f64 / 4.0;
        let _ = write!(
            svg,
            r##"<text x="{px:.1}" y="{y}" font-size="10" fill="#777" text-anchor="middle">{v:.3}</text>"##,
            px = x(v),
            y = BAR_Y - 16.0,
        );
    }

    for segment in &segments {
        let c = segment.contribution;
        let (left, right) = (x(segment.from.min(segment.to)), x(segment.from.max(segment.to)));
        let width = (right - left).max(0.5);
        let color = if c.contribution > 0.0 { POSITIVE_COLOR } else { NEGATIVE_COLOR };
        let label = format!("{} = {}", c.feature, format_value(c.value));
        let _ = write!(
            svg,
            r##"<rect x="{left:.1}" y="{y}" width="{width:.1}" height="{hgt}" fill="{color}" stroke="#fff" stroke-width="1"><title>{title} ({sign}{amount:.4})</title></rect>"##,
            y = BAR_Y,
            hgt = BAR_HEIGHT,
            title = escape_html(&label),
            sign = if c.contribution > 0.0 { "+" } else { "" },
            amount = c.contribution,
        );
        if width >= MIN_LABEL_WIDTH {
            let _ = write!(
                svg,
                r#"<text x="{cx:.1}" y="{y}" font-size="11" fill="{color}" text-anchor="middle">{text}</text>"#,
                cx = left + width / 2.0,
                y = BAR_Y + BAR_HEIGHT + 16.0,
                text = escape_html(&label),
            );
        }
    }

    // base value marker
    let bx = x(base);
    let _ = write!(
        svg,
        r##"<line x1="{bx:.1}" y1="{y1}" x2="{bx:.1}" y2="{y2}" stroke="#555" stroke-dasharray="4,3"/><text x="{bx:.1}" y="{ty}" font-size="11" fill="#555" text-anchor="middle">base value {base:.3}</text>"##,
        y1 = BAR_Y - 6.0,
        y2 = BAR_Y + BAR_HEIGHT + 30.0,
        ty = BAR_Y + BAR_HEIGHT + 44.0,
    );

    // output marker
    let ox = x(output);
    let _ = write!(
        svg,
        r##"<line x1="{ox:.1}" y1="{y1}" x2="{ox:.1}" y2="{y2}" stroke="#000" stroke-width="2"/><text x="{ox:.1}" y="{ty}" font-size="14" font-weight="bold" text-anchor="middle">f(x) = {output:.3}</text>"##,
        y1 = BAR_Y - 4.0,
        y2 = BAR_Y + BAR_HEIGHT + 4.0,
        ty = BAR_Y - 34.0,
    );

    svg.push_str("</svg>");
    svg
}

#[cfg(test)]
mod tests {
    use super::*;

    fn explanation() -> Explanation {
        Explanation {
            base_value: 0.2,
            contributions: vec![
                FeatureContribution {
                    feature: "transaction_amount".to_string(),
                    value: 150000.0,
                    contribution: 0.45,
                },
                FeatureContribution {
                    feature: "age".to_string(),
                    value: 35.0,
                    contribution: -0.1,
                },
                FeatureContribution {
                    feature: "transaction_time".to_string(),
                    value: 14.0,
                    contribution: 0.0,
                },
            ],
        }
    }

    #[test]
    fn test_renders_one_bar_per_nonzero_contribution() {
        let svg = render(&explanation(), 400);
        assert!(svg.starts_with("<svg"));
        assert!(svg.ends_with("</svg>"));
        assert_eq!(svg.matches("<rect").count(), 2);
        assert!(svg.contains(POSITIVE_COLOR));
        assert!(svg.contains(NEGATIVE_COLOR));
        assert!(svg.contains("transaction_amount = 150000"));
        assert!(svg.contains("f(x) = 0.550"));
        assert!(svg.contains("base value 0.200"));
    }

    #[test]
    fn test_labels_are_escaped() {
        let mut explanation = explanation();
        explanation.contributions[0].feature = "<script>".to_string();
        let svg = render(&explanation, 400);
        assert!(!svg.contains("<script>"));
        assert!(svg.contains("&lt;script&gt;"));
    }

    #[test]
    fn test_all_zero_contributions() {
        let explanation = Explanation {
            base_value: 0.3,
            contributions: vec![],
        };
        let svg = render(&explanation, 300);
        assert_eq!(svg.matches("<rect").count(), 0);
        assert!(svg.contains("f(x) = 0.300"));
        assert!(!svg.contains("NaN"));
    }
}
