//! Input widgets and their domains.
//!
//! Every field has a bounded domain and a default, so any submission (including
//! an empty one) maps to a fully populated [`TransactionInput`].

use crate::types::record::{
    KycStatus, TransactionCategory, TransactionInput, TransactionMethod,
};
use std::collections::HashMap;

/// How a field is presented in the sidebar
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Widget {
    Slider,
    NumberInput,
    SelectBox,
}

/// Value domain of a field
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum FieldDomain {
    Integer { min: i64, max: i64, default: i64 },
    Float { min: f64, max: f64, default: f64 },
    /// The first option is the default
    Choice { options: &'static [&'static str] },
}

/// A single form field
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct FieldSpec {
    pub name: &'static str,
    pub label: &'static str,
    pub widget: Widget,
    pub domain: FieldDomain,
}

const KYC_OPTIONS: &[&str] = &["complete", "incomplete"];
const METHOD_OPTIONS: &[&str] = &["card", "online", "cash", "upi"];
const CATEGORY_OPTIONS: &[&str] = &["food", "travel", "loan", "recreation"];
const FLAG_OPTIONS: &[&str] = &["0", "1"];

/// Sidebar fields in display order
pub const FIELDS: [FieldSpec; 11] = [
    FieldSpec {
        name: "age",
        label: "Age",
        widget: Widget::Slider,
        domain: FieldDomain::Integer {
            min: 18,
            max: 100,
            default: 35,
        },
    },
    FieldSpec {
        name: "kyc_status",
        label: "KYC Status",
        widget: Widget::SelectBox,
        domain: FieldDomain::Choice {
            options: KYC_OPTIONS,
        },
    },
    FieldSpec {
        name: "days_since_kyc_incomplete",
        label: "Days Since KYC Incomplete",
        widget: Widget::NumberInput,
        domain: FieldDomain::Integer {
            min: 0,
            max: 365,
            default: 0,
        },
    },
    FieldSpec {
        name: "transaction_amount",
        label: "Transaction Amount ($)",
        widget: Widget::NumberInput,
        domain: FieldDomain::Float {
            min: 10.0,
            max: 200000.0,
            default: 5000.0,
        },
    },
    FieldSpec {
        name: "transaction_method",
        label: "Transaction Method",
        widget: Widget::SelectBox,
        domain: FieldDomain::Choice {
            options: METHOD_OPTIONS,
        },
    },
    FieldSpec {
        name: "transaction_category",
        label: "Transaction Category",
        widget: Widget::SelectBox,
        domain: FieldDomain::Choice {
            options: CATEGORY_OPTIONS,
        },
    },
    FieldSpec {
        name: "transaction_time",
        label: "Transaction Time (0-23h)",
        widget: Widget::Slider,
        domain: FieldDomain::Integer {
            min: 0,
            max: 23,
            default: 14,
        },
    },
    FieldSpec {
        name: "average_expenditure",
        label: "Average Expenditure ($)",
        widget: Widget::NumberInput,
        domain: FieldDomain::Float {
            min: 100.0,
            max: 100000.0,
            default: 1500.0,
        },
    },
    FieldSpec {
        name: "comparison_with_avg_expenditure",
        label: "Transaction vs. Avg Exp.",
        widget: Widget::NumberInput,
        domain: FieldDomain::Float {
            min: -50000.0,
            max: 190000.0,
            default: 3500.0,
        },
    },
    FieldSpec {
        name: "transaction_count_7_days",
        label: "Transactions in Last 7 Days",
        widget: Widget::Slider,
        domain: FieldDomain::Integer {
            min: 1,
            max: 50,
            default: 10,
        },
    },
    FieldSpec {
        name: "suspicion_indicator",
        label: "Manual Suspicion Flag",
        widget: Widget::SelectBox,
        domain: FieldDomain::Choice {
            options: FLAG_OPTIONS,
        },
    },
];

/// Look up a field by name
pub fn field(name: &str) -> Option<&'static FieldSpec> {
    FIELDS.iter().find(|f| f.name == name)
}

impl FieldSpec {
    /// The value this field takes when nothing valid was submitted
    pub fn default_value(&self) -> String {
        match self.domain {
            FieldDomain::Integer { default, .. } => default.to_string(),
            FieldDomain::Float { default, .. } => format!("{:.2}", default),
            FieldDomain::Choice { options } => options[0].to_string(),
        }
    }

    fn integer(&self, raw: Option<&str>) -> i64 {
        let FieldDomain::Integer { min, max, default } = self.domain else {
            return 0;
        };
        raw.and_then(|s| s.trim().parse::<f64>().ok())
            .filter(|v| v.is_finite())
            .map(|v| (v.round() as i64).clamp(min, max))
            .unwrap_or(default)
    }

    fn float(&self, raw: Option<&str>) -> f64 {
        let FieldDomain::Float { min, max, default } = self.domain else {
            return 0.0;
        };
        raw.and_then(|s| s.trim().parse::<f64>().ok())
            .filter(|v| v.is_finite())
            .map(|v| v.clamp(min, max))
            .unwrap_or(default)
    }

    fn choice(&self, raw: Option<&str>) -> &'static str {
        let FieldDomain::Choice { options } = self.domain else {
            return "";
        };
        raw.map(str::trim)
            .and_then(|s| options.iter().find(|o| o.eq_ignore_ascii_case(s)))
            .copied()
            .unwrap_or(options[0])
    }
}

fn spec(index: usize) -> &'static FieldSpec {
    &FIELDS[index]
}

/// Build a record from submitted widget values.
///
/// Missing or unparseable values take the field default, numbers are clamped
/// to the widget range and unknown options fall back to the first option.
pub fn collect_input(form: &HashMap<String, String>) -> TransactionInput {
    let raw = |name: &str| form.get(name).map(String::as_str);

    let kyc_status = match spec(1).choice(raw("kyc_status")) {
        "incomplete" => KycStatus::Incomplete,
        _ => KycStatus::Complete,
    };
    let transaction_method = match spec(4).choice(raw("transaction_method")) {
        "online" => TransactionMethod::Online,
        "cash" => TransactionMethod::Cash,
        "upi" => TransactionMethod::Upi,
        _ => TransactionMethod::Card,
    };
    let transaction_category = match spec(5).choice(raw("transaction_category")) {
        "travel" => TransactionCategory::Travel,
        "loan" => TransactionCategory::Loan,
        "recreation" => TransactionCategory::Recreation,
        _ => TransactionCategory::Food,
    };

    TransactionInput {
        age: spec(0).integer(raw("age")) as u32,
        kyc_status,
        days_since_kyc_incomplete: spec(2).integer(raw("days_since_kyc_incomplete")) as u32,
        transaction_amount: spec(3).float(raw("transaction_amount")),
        transaction_method,
        transaction_category,
        transaction_time: spec(6).integer(raw("transaction_time")) as u32,
        average_expenditure: spec(7).float(raw("average_expenditure")),
        comparison_with_avg_expenditure: spec(8).float(raw("comparison_with_avg_expenditure")),
        transaction_count_7_days: spec(9).integer(raw("transaction_count_7_days")) as u32,
        suspicion_indicator: if spec(10).choice(raw("suspicion_indicator")) == "1" { 1 } else { 0 },
    }
}

/// Current widget values of a record, keyed by field name
pub fn form_values(record: &TransactionInput) -> HashMap<&'static str, String> {
    record
        .to_row()
        .into_iter()
        .map(|(name, value)| (name, value.to_string()))
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::record::CellValue;

    fn form(pairs: &[(&str, &str)]) -> HashMap<String, String> {
        pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect()
    }

    fn assert_within_domains(record: &TransactionInput) {
        let row = record.to_row();
        assert_eq!(row.len(), 11);
        for (name, value) in row {
            let spec = field(name).expect("every column has a widget");
            match (spec.domain, value) {
                (FieldDomain::Integer { min, max, .. }, CellValue::Number(v)) => {
                    assert!(v >= min as f64 && v <= max as f64, "{} = {}", name, v);
                    assert_eq!(v.fract(), 0.0);
                }
                (FieldDomain::Float { min, max, .. }, CellValue::Number(v)) => {
                    assert!(v >= min && v <= max, "{} = {}", name, v);
                }
                (FieldDomain::Choice { options }, value) => {
                    assert!(options.contains(&value.to_string().as_str()), "{}", name);
                }
                (domain, value) => panic!("{}: {:?} does not fit {:?}", name, value, domain),
            }
        }
    }

    #[test]
    fn test_empty_form_gives_defaults() {
        let record = collect_input(&HashMap::new());
        assert_eq!(record, TransactionInput::default());
    }

    #[test]
    fn test_field_table_matches_record_columns() {
        let names: Vec<&str> = FIELDS.iter().map(|f| f.name).collect();
        assert_eq!(names, TransactionInput::COLUMNS.to_vec());
    }

    #[test]
    fn test_values_are_clamped() {
        let record = collect_input(&form(&[
            ("age", "7"),
            ("days_since_kyc_incomplete", "9999"),
            ("transaction_amount", "-5"),
            ("transaction_time", "30"),
            ("average_expenditure", "1e9"),
            ("comparison_with_avg_expenditure", "-60000"),
            ("transaction_count_7_days", "0"),
        ]));
        assert_eq!(record.age, 18);
        assert_eq!(record.days_since_kyc_incomplete, 365);
        assert_eq!(record.transaction_amount, 10.0);
        assert_eq!(record.transaction_time, 23);
        assert_eq!(record.average_expenditure, 100000.0);
        assert_eq!(record.comparison_with_avg_expenditure, -50000.0);
        assert_eq!(record.transaction_count_7_days, 1);
        assert_within_domains(&record);
    }

    #[test]
    fn test_garbage_falls_back_to_defaults() {
        let record = collect_input(&form(&[
            ("age", "old"),
            ("kyc_status", "pending"),
            ("transaction_method", "crypto"),
            ("transaction_amount", "NaN"),
            ("suspicion_indicator", "maybe"),
        ]));
        assert_eq!(record.age, 35);
        assert_eq!(record.kyc_status, KycStatus::Complete);
        assert_eq!(record.transaction_method, TransactionMethod::Card);
        assert_eq!(record.transaction_amount, 5000.0);
        assert_eq!(record.suspicion_indicator, 0);
        assert_within_domains(&record);
    }

    #[test]
    fn test_submitted_choices() {
        let record = collect_input(&form(&[
            ("kyc_status", "incomplete"),
            ("transaction_method", "UPI"),
            ("transaction_category", "loan"),
            ("suspicion_indicator", "1"),
            ("age", "42.4"),
        ]));
        assert_eq!(record.kyc_status, KycStatus::Incomplete);
        assert_eq!(record.transaction_method, TransactionMethod::Upi);
        assert_eq!(record.transaction_category, TransactionCategory::Loan);
        assert_eq!(record.suspicion_indicator, 1);
        assert_eq!(record.age, 42);
    }

    #[test]
    fn test_sweep_stays_within_domains() {
        let inputs = ["", "-1e12", "-1", "0", "0.5", "17", "50", "101", "1e12", "abc"];
        for spec in FIELDS.iter() {
            for raw in inputs {
                let record = collect_input(&form(&[(spec.name, raw)]));
                assert_within_domains(&record);
            }
        }
    }

    #[test]
    fn test_form_values_round_trip_through_collect() {
        let record = collect_input(&form(&[
            ("transaction_method", "cash"),
            ("transaction_amount", "1234.5"),
        ]));
        let values: HashMap<String, String> = form_values(&record)
            .into_iter()
            .map(|(k, v)| (k.to_string(), v))
            .collect();
        assert_eq!(collect_input(&values), record);
    }
}
