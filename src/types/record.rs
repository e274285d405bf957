//! Manually entered transaction record

use serde::{Deserialize, Serialize};
use std::fmt;

/// KYC verification status
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum KycStatus {
    #[default]
    Complete,
    Incomplete,
}

impl KycStatus {
    pub const ALL: [KycStatus; 2] = [KycStatus::Complete, KycStatus::Incomplete];

    pub fn as_str(&self) -> &'static str {
        match self {
            KycStatus::Complete => "complete",
            KycStatus::Incomplete => "incomplete",
        }
    }
}

/// Payment channel of the transaction
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TransactionMethod {
    #[default]
    Card,
    Online,
    Cash,
    Upi,
}

impl TransactionMethod {
    pub const ALL: [TransactionMethod; 4] = [
        TransactionMethod::Card,
        TransactionMethod::Online,
        TransactionMethod::Cash,
        TransactionMethod::Upi,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            TransactionMethod::Card => "card",
            TransactionMethod::Online => "online",
            TransactionMethod::Cash => "cash",
            TransactionMethod::Upi => "upi",
        }
    }
}

/// Merchant category of the transaction
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TransactionCategory {
    #[default]
    Food,
    Travel,
    Loan,
    Recreation,
}

impl TransactionCategory {
    pub const ALL: [TransactionCategory; 4] = [
        TransactionCategory::Food,
        TransactionCategory::Travel,
        TransactionCategory::Loan,
        TransactionCategory::Recreation,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            TransactionCategory::Food => "food",
            TransactionCategory::Travel => "travel",
            TransactionCategory::Loan => "loan",
            TransactionCategory::Recreation => "recreation",
        }
    }
}

/// One cell of the single-row input table
#[derive(Debug, Clone, PartialEq)]
pub enum CellValue {
    Number(f64),
    Text(String),
}

impl fmt::Display for CellValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            CellValue::Number(v) if v.fract() == 0.0 && v.abs() < 1e15 => {
                write!(f, "{}", *v as i64)
            }
            CellValue::Number(v) => write!(f, "{}", v),
            CellValue::Text(s) => f.write_str(s),
        }
    }
}

/// A transaction entered through the form.
///
/// Column names match the names the model was trained with.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TransactionInput {
    pub age: u32,
    pub kyc_status: KycStatus,
    pub days_since_kyc_incomplete: u32,
    pub transaction_amount: f64,
    pub transaction_method: TransactionMethod,
    pub transaction_category: TransactionCategory,
    pub transaction_time: u32,
    pub average_expenditure: f64,
    pub comparison_with_avg_expenditure: f64,
    pub transaction_count_7_days: u32,
    pub suspicion_indicator: u8,
}

impl TransactionInput {
    /// Column names in table order
    pub const COLUMNS: [&'static str; 11] = [
        "age",
        "kyc_status",
        "days_since_kyc_incomplete",
        "transaction_amount",
        "transaction_method",
        "transaction_category",
        "transaction_time",
        "average_expenditure",
        "comparison_with_avg_expenditure",
        "transaction_count_7_days",
        "suspicion_indicator",
    ];

    /// Columns holding text values
    pub const CATEGORICAL_COLUMNS: [&'static str; 3] =
        ["kyc_status", "transaction_method", "transaction_category"];

    /// The record as an ordered single-row table
    pub fn to_row(&self) -> Vec<(&'static str, CellValue)> {
        vec![
            ("age", CellValue::Number(self.age as f64)),
            ("kyc_status", CellValue::Text(self.kyc_status.as_str().to_string())),
            (
                "days_since_kyc_incomplete",
                CellValue::Number(self.days_since_kyc_incomplete as f64),
            ),
            ("transaction_amount", CellValue::Number(self.transaction_amount)),
            (
                "transaction_method",
                CellValue::Text(self.transaction_method.as_str().to_string()),
            ),
            (
                "transaction_category",
                CellValue::Text(self.transaction_category.as_str().to_string()),
            ),
            ("transaction_time", CellValue::Number(self.transaction_time as f64)),
            ("average_expenditure", CellValue::Number(self.average_expenditure)),
            (
                "comparison_with_avg_expenditure",
                CellValue::Number(self.comparison_with_avg_expenditure),
            ),
            (
                "transaction_count_7_days",
                CellValue::Number(self.transaction_count_7_days as f64),
            ),
            (
                "suspicion_indicator",
                CellValue::Number(self.suspicion_indicator as f64),
            ),
        ]
    }
}

impl Default for TransactionInput {
    fn default() -> Self {
        Self {
            age: 35,
            kyc_status: KycStatus::Complete,
            days_since_kyc_incomplete: 0,
            transaction_amount: 5000.0,
            transaction_method: TransactionMethod::Card,
            transaction_category: TransactionCategory::Food,
            transaction_time: 14,
            average_expenditure: 1500.0,
            comparison_with_avg_expenditure: 3500.0,
            transaction_count_7_days: 10,
            suspicion_indicator: 0,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_row_matches_columns() {
        let row = TransactionInput::default().to_row();
        let names: Vec<&str> = row.iter().map(|(name, _)| *name).collect();
        assert_eq!(names, TransactionInput::COLUMNS.to_vec());
    }

    #[test]
    fn test_categorical_columns_are_text() {
        let row = TransactionInput::default().to_row();
        for (name, value) in &row {
            let is_text = matches!(value, CellValue::Text(_));
            assert_eq!(
                is_text,
                TransactionInput::CATEGORICAL_COLUMNS.contains(name),
                "column {}",
                name
            );
        }
    }

    #[test]
    fn test_json_uses_lowercase_options() {
        let json = serde_json::to_value(TransactionInput::default()).unwrap();
        assert_eq!(json["kyc_status"], "complete");
        assert_eq!(json["transaction_method"], "card");
        assert_eq!(json["transaction_category"], "food");
    }

    #[test]
    fn test_cell_display() {
        assert_eq!(CellValue::Number(35.0).to_string(), "35");
        assert_eq!(CellValue::Number(2.5).to_string(), "2.5");
        assert_eq!(CellValue::Text("upi".into()).to_string(), "upi");
    }
}
