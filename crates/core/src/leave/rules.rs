//! Submission validation rules.

use hrm_shared::LeaveConfig;
use rust_decimal::Decimal;

use super::error::LeaveError;
use super::ledger::{BALANCE_SCALE, LeaveBalances, MAX_BALANCE, is_storable};
use super::types::{Attachment, LeaveCategory, SubmitLeaveInput};

/// Limits applied to submissions before the ledger is touched.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct LeaveRules {
    /// Minimum reason length in characters, after trimming.
    pub min_reason_len: usize,
    /// Maximum reason length in characters.
    pub max_reason_len: usize,
    /// Maximum attachments per request.
    pub max_attachments: usize,
    /// Maximum size of one attachment.
    pub max_attachment_bytes: u64,
}

impl Default for LeaveRules {
    fn default() -> Self {
        Self::from(&LeaveConfig::default())
    }
}

impl From<&LeaveConfig> for LeaveRules {
    fn from(config: &LeaveConfig) -> Self {
        Self {
            min_reason_len: config.min_reason_len,
            max_reason_len: config.max_reason_len,
            max_attachments: config.max_attachments,
            max_attachment_bytes: config.max_attachment_bytes,
        }
    }
}

impl LeaveRules {
    /// Validates the reason, note and attachments of a submission.
    pub fn validate_submission(&self, input: &SubmitLeaveInput) -> Result<(), LeaveError> {
        let reason_len = input.reason.trim().chars().count();
        if reason_len < self.min_reason_len {
            return Err(LeaveError::Validation(format!(
                "reason must be at least {} characters",
                self.min_reason_len
            )));
        }
        if reason_len > self.max_reason_len {
            return Err(LeaveError::Validation(format!(
                "reason must be at most {} characters",
                self.max_reason_len
            )));
        }
        if let Some(note) = &input.note {
            if note.chars().count() > self.max_reason_len {
                return Err(LeaveError::Validation(format!(
                    "note must be at most {} characters",
                    self.max_reason_len
                )));
            }
        }
        self.validate_attachments(&input.attachments)
    }

    fn validate_attachments(&self, attachments: &[Attachment]) -> Result<(), LeaveError> {
        if attachments.len() > self.max_attachments {
            return Err(LeaveError::Validation(format!(
                "at most {} attachments are allowed",
                self.max_attachments
            )));
        }
        for attachment in attachments {
            if attachment.name.trim().is_empty() {
                return Err(LeaveError::Validation("attachment name is required".into()));
            }
            if attachment.mime_type.trim().is_empty() {
                return Err(LeaveError::Validation(format!(
                    "attachment {} has no mime type",
                    attachment.name
                )));
            }
            if attachment.size_bytes > self.max_attachment_bytes {
                return Err(LeaveError::Validation(format!(
                    "attachment {} exceeds {} bytes",
                    attachment.name, self.max_attachment_bytes
                )));
            }
        }
        Ok(())
    }

    /// Opening balances must be non-negative, at most [`MAX_BALANCE`] and
    /// carry no more than [`BALANCE_SCALE`] decimal places.
    pub fn validate_opening(balances: &LeaveBalances) -> Result<(), LeaveError> {
        if let Some(category) = balances.first_negative() {
            return Err(LeaveError::Validation(format!(
                "opening {category} balance must not be negative"
            )));
        }
        match LeaveCategory::ALL
            .into_iter()
            .find(|c| !is_storable(balances.get(*c)))
        {
            Some(category) => Err(LeaveError::Validation(format!(
                "opening {category} balance must be at most {MAX_BALANCE} with {BALANCE_SCALE} decimal places"
            ))),
            None => Ok(()),
        }
    }

    /// Charged days must fit a balance column.
    pub fn validate_charged_days(total_days: Decimal) -> Result<(), LeaveError> {
        if is_storable(total_days) {
            Ok(())
        } else {
            Err(LeaveError::Validation(format!(
                "leave of {total_days} days exceeds the maximum of {MAX_BALANCE}"
            )))
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;
    use hrm_shared::types::{EmployeeId, OrganizationId};
    use rstest::rstest;
    use rust_decimal_macros::dec;

    fn input(reason: &str, attachments: Vec<Attachment>) -> SubmitLeaveInput {
        let day = NaiveDate::from_ymd_opt(2026, 5, 4).unwrap();
        SubmitLeaveInput {
            organization_id: OrganizationId::new(),
            employee_id: EmployeeId::new(),
            request_id: None,
            category: LeaveCategory::Casual,
            start_date: day,
            end_date: day,
            reason: reason.into(),
            note: None,
            attachments,
        }
    }

    fn pdf(size_bytes: u64) -> Attachment {
        Attachment {
            name: "certificate.pdf".into(),
            mime_type: "application/pdf".into(),
            size_bytes,
            content_ref: "blob://leave/certificate.pdf".into(),
        }
    }

    #[test]
    fn test_valid_submission() {
        let rules = LeaveRules::default();
        assert!(rules.validate_submission(&input("Family wedding out of town", vec![pdf(1024)])).is_ok());
    }

    #[test]
    fn test_short_reason_rejected_after_trim() {
        let rules = LeaveRules::default();
        let err = rules.validate_submission(&input("   sick    ", vec![])).unwrap_err();
        assert!(matches!(err, LeaveError::Validation(_)));
    }

    #[test]
    fn test_too_many_attachments() {
        let rules = LeaveRules::default();
        let err = rules
            .validate_submission(&input("Medical appointment", vec![pdf(10); 6]))
            .unwrap_err();
        assert!(matches!(err, LeaveError::Validation(m) if m.contains("at most 5")));
    }

    #[test]
    fn test_oversized_attachment() {
        let rules = LeaveRules::default();
        let err = rules
            .validate_submission(&input("Medical appointment", vec![pdf(5 * 1024 * 1024 + 1)]))
            .unwrap_err();
        assert!(matches!(err, LeaveError::Validation(_)));
    }

    #[test]
    fn test_attachment_without_mime_type() {
        let rules = LeaveRules::default();
        let mut bad = pdf(10);
        bad.mime_type = " ".into();
        assert!(rules.validate_submission(&input("Medical appointment", vec![bad])).is_err());
    }

    #[test]
    fn test_rules_follow_config() {
        let config = LeaveConfig {
            max_attachments: 1,
            ..LeaveConfig::default()
        };
        let rules = LeaveRules::from(&config);
        assert_eq!(rules.max_attachments, 1);
        assert!(rules.validate_submission(&input("Medical appointment", vec![pdf(1), pdf(1)])).is_err());
    }

    #[test]
    fn test_negative_opening_rejected() {
        let balances = LeaveBalances {
            sick: dec!(-1),
            ..LeaveBalances::default()
        };
        assert!(LeaveRules::validate_opening(&balances).is_err());
        assert!(LeaveRules::validate_opening(&LeaveBalances::default()).is_ok());
    }

    #[rstest]
    #[case(dec!(12.5), true)]
    #[case(dec!(99999.99), true)]
    #[case(dec!(1.005), false)]
    #[case(dec!(100000), false)]
    #[case(dec!(0.001), false)]
    fn test_opening_must_fit_balance_column(#[case] casual: Decimal, #[case] ok: bool) {
        let balances = LeaveBalances {
            casual,
            ..LeaveBalances::default()
        };
        let result = LeaveRules::validate_opening(&balances);
        assert_eq!(result.is_ok(), ok, "{casual}");
        if !ok {
            assert!(matches!(result, Err(LeaveError::Validation(_))));
        }
    }

    #[rstest]
    #[case(dec!(3), true)]
    #[case(dec!(99999), true)]
    #[case(dec!(100000), false)]
    fn test_charged_days_must_fit_balance_column(#[case] days: Decimal, #[case] ok: bool) {
        assert_eq!(LeaveRules::validate_charged_days(days).is_ok(), ok);
    }
}
