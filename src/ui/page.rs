//! Server-rendered HTML for the inference UI.

use crate::error::AppError;
use crate::form::{form_values, FieldDomain, FieldSpec, Widget, FIELDS};
use crate::types::prediction::{Explanation, Prediction};
use crate::types::record::TransactionInput;
use crate::ui::force_plot;
use crate::ui::{escape_html, format_value};
use std::collections::HashMap;
use std::fmt::Write;

pub const PAGE_TITLE: &str = "Simplified Fraud Detection App";
pub const LOADED_MESSAGE: &str = "Model and artifacts loaded successfully!";
pub const CHART_HEIGHT: u32 = 400;

const STYLE: &str = r##"
body { margin: 0; font-family: sans-serif; color: #262730; display: flex; }
aside { width: 300px; min-height: 100vh; background: #f0f2f6; padding: 1.5rem; box-sizing: border-box; }
aside label { display: block; margin-top: 1rem; font-size: 0.9rem; }
aside input, aside select { width: 100%; margin-top: 0.25rem; }
main { flex: 1; padding: 2rem 3rem; overflow-x: auto; }
.banner { padding: 0.8rem 1rem; border-radius: 0.4rem; margin: 1rem 0; }
.success { background: #dff5e3; color: #17692c; }
.error { background: #fde2e2; color: #8a1c1c; }
table { border-collapse: collapse; font-size: 0.85rem; }
th, td { border: 1px solid #ddd; padding: 0.3rem 0.6rem; text-align: right; }
th { background: #fafafa; }
button { margin-top: 1rem; padding: 0.5rem 1rem; font-size: 1rem; cursor: pointer; }
.positive { color: #ff0d57; }
.negative { color: #1e88e5; }
"##;

/// What the main panel shows below the input table
pub enum Outcome<'a> {
    /// Form not submitted yet
    Pending,
    Scored {
        prediction: &'a Prediction,
        explanation: &'a Explanation,
    },
    /// The interaction failed after the artifacts were loaded
    Failed(&'a AppError),
}

/// Full page: sidebar form, input table and, once submitted, the result
pub fn render_page(record: &TransactionInput, outcome: Outcome<'_>) -> String {
    let values = form_values(record);
    let mut html = String::with_capacity(16 * 1024);

    open_document(&mut html);
    render_sidebar(&mut html, &values);

    html.push_str("<main>");
    let _ = write!(html, "<h1>{}</h1>", PAGE_TITLE);
    let _ = write!(html, r#"<div class="banner success">{}</div>"#, LOADED_MESSAGE);

    html.push_str("<h3>User Input</h3>");
    render_input_table(&mut html, &values);
    html.push_str(r#"<button type="submit" form="input-form">Predict Fraud Status</button>"#);

    match outcome {
        Outcome::Pending => {}
        Outcome::Scored {
            prediction,
            explanation,
        } => {
            html.push_str("<h3>Prediction</h3>");
            let (class, message) = prediction_banner(prediction);
            let _ = write!(html, r#"<div class="banner {}">{}</div>"#, class, message);

            html.push_str("<h3>Prediction Explanation</h3>");
            html.push_str(&force_plot::render(explanation, CHART_HEIGHT));
            html.push_str(
                "<p><strong>How to read this chart:</strong> Red features push the prediction \
                 score higher (towards fraud), while blue features push it lower.</p>",
            );
            render_contribution_table(&mut html, explanation);
        }
        Outcome::Failed(error) => {
            let _ = write!(
                html,
                r#"<div class="banner error">{}</div>"#,
                escape_html(&error.to_string())
            );
        }
    }

    html.push_str("</main>");
    close_document(&mut html);
    html
}

/// Page shown when nothing but the error can be rendered
pub fn render_error_page(error: &AppError) -> String {
    let mut html = String::new();
    open_document(&mut html);
    html.push_str("<main>");
    let _ = write!(
        html,
        r#"<div class="banner error">{}</div>"#,
        escape_html(&error.to_string())
    );
    html.push_str("</main>");
    close_document(&mut html);
    html
}

/// Banner CSS class and text for a prediction
pub fn prediction_banner(prediction: &Prediction) -> (&'static str, String) {
    if prediction.is_fraud() {
        (
            "error",
            format!(
                "FRAUD DETECTED (Probability: {:.2}%)",
                prediction.probabilities[1] * 100.0
            ),
        )
    } else {
        (
            "success",
            format!(
                "Transaction is likely NOT FRAUDULENT (Probability: {:.2}%)",
                prediction.probabilities[0] * 100.0
            ),
        )
    }
}

fn open_document(html: &mut String) {
    let _ = write!(
        html,
        r#"<!DOCTYPE html><html lang="en"><head><meta charset="utf-8"><title>Fraud Detection App</title><style>{}</style></head><body>"#,
        STYLE
    );
}

fn close_document(html: &mut String) {
    html.push_str("</body></html>");
}

fn render_sidebar(html: &mut String, values: &HashMap<&'static str, String>) {
    html.push_str(r#"<aside><h2>Input Transaction Details</h2>"#);
    html.push_str(r#"<form id="input-form" method="post" action="/predict">"#);
    for spec in FIELDS.iter() {
        let current = values
            .get(spec.name)
            .cloned()
            .unwrap_or_else(|| spec.default_value());
        render_widget(html, spec, &current);
    }
    html.push_str("</form></aside>");
}

fn render_widget(html: &mut String, spec: &FieldSpec, current: &str) {
    let _ = write!(html, r#"<label for="{0}">{1}"#, spec.name, escape_html(spec.label));
    match (spec.widget, spec.domain) {
        (Widget::SelectBox, FieldDomain::Choice { options }) => {
            let _ = write!(html, r#"<select id="{0}" name="{0}">"#, spec.name);
            for option in options {
                let selected = if *option == current { " selected" } else { "" };
                let _ = write!(html, r#"<option value="{0}"{1}>{0}</option>"#, option, selected);
            }
            html.push_str("</select>");
        }
        (widget, FieldDomain::Integer { min, max, .. }) => {
            let (min, max) = (min.to_string(), max.to_string());
            number_input(html, spec.name, widget, &min, &max, "1", current);
        }
        (widget, FieldDomain::Float { min, max, .. }) => {
            let (min, max) = (format!("{:.2}", min), format!("{:.2}", max));
            number_input(html, spec.name, widget, &min, &max, "0.01", current);
        }
        (_, FieldDomain::Choice { .. }) => {}
    }
    html.push_str("</label>");
}

fn number_input(
    html: &mut String,
    name: &str,
    widget: Widget,
    min: &str,
    max: &str,
    step: &str,
    current: &str,
) {
    let kind = if widget == Widget::Slider { "range" } else { "number" };
    let _ = write!(
        html,
        r#"<input type="{kind}" id="{name}" name="{name}" min="{min}" max="{max}" step="{step}" value="{value}""#,
        value = escape_html(current),
    );
    if widget == Widget::Slider {
        let _ = write!(
            html,
            r#" oninput="this.nextElementSibling.value=this.value"><output>{}</output>"#,
            escape_html(current)
        );
    } else {
        html.push('>');
    }
}

fn render_input_table(html: &mut String, values: &HashMap<&'static str, String>) {
    html.push_str("<table><thead><tr><th></th>");
    for spec in FIELDS.iter() {
        let _ = write!(html, "<th>{}</th>", spec.name);
    }
    html.push_str("</tr></thead><tbody><tr><th>0</th>");
    for spec in FIELDS.iter() {
        let value = values.get(spec.name).map(String::as_str).unwrap_or("");
        let _ = write!(html, "<td>{}</td>", escape_html(value));
    }
    html.push_str("</tr></tbody></table>");
}

fn render_contribution_table(html: &mut String, explanation: &Explanation) {
    let _ = write!(
        html,
        "<table><thead><tr><th>Feature</th><th>Value</th><th>Contribution</th></tr></thead><tbody><tr><td>base value</td><td></td><td>{:.4}</td></tr>",
        explanation.base_value
    );
    for c in explanation.ranked() {
        let class = if c.contribution >= 0.0 { "positive" } else { "negative" };
        let _ = write!(
            html,
            r#"<tr><td>{}</td><td>{}</td><td class="{}">{:+.4}</td></tr>"#,
            escape_html(&c.feature),
            format_value(c.value),
            class,
            c.contribution
        );
    }
    let _ = write!(
        html,
        "<tr><th>f(x)</th><td></td><th>{:.4}</th></tr></tbody></table>",
        explanation.output_value()
    );
}
