//! Conversions between leave rows and domain types.

use chrono::Utc;
use hrm_core::leave::{Attachment, LeaveAccount, LeaveBalances, LeaveCategory, LeaveError, LeaveRequest};
use hrm_shared::types::{EmployeeId, LeaveRequestId, OrganizationId, UserId};
use sea_orm::{DbErr, Set, SqlErr};

use crate::entities::{leave_accounts, leave_requests};

/// Wraps a database error as a storage failure.
pub(crate) fn storage(err: DbErr) -> LeaveError {
    LeaveError::Storage(err.to_string())
}

/// Maps a failed account insert, recognising primary-key conflicts.
pub(crate) fn account_insert_error(employee_id: EmployeeId, err: DbErr) -> LeaveError {
    match err.sql_err() {
        Some(SqlErr::UniqueConstraintViolation(_)) => LeaveError::DuplicateAccount(employee_id),
        _ => storage(err),
    }
}

/// Maps a failed request insert. A primary-key conflict means the
/// caller-supplied id is already taken by another request.
pub(crate) fn request_insert_error(request_id: LeaveRequestId, err: DbErr) -> LeaveError {
    match err.sql_err() {
        Some(SqlErr::UniqueConstraintViolation(_)) => LeaveError::Validation(format!(
            "request id {request_id} is already used by another request"
        )),
        _ => storage(err),
    }
}

/// Balance column for a category.
pub(crate) const fn balance_column(category: LeaveCategory) -> leave_accounts::Column {
    match category {
        LeaveCategory::Casual => leave_accounts::Column::Casual,
        LeaveCategory::Sick => leave_accounts::Column::Sick,
        LeaveCategory::Annual => leave_accounts::Column::Annual,
        LeaveCategory::Parental => leave_accounts::Column::Parental,
    }
}

pub(crate) fn account_from_model(model: leave_accounts::Model) -> LeaveAccount {
    LeaveAccount {
        employee_id: EmployeeId::from_uuid(model.employee_id),
        organization_id: OrganizationId::from_uuid(model.organization_id),
        employee_name: model.employee_name,
        employee_code: model.employee_code,
        balances: LeaveBalances {
            casual: model.casual,
            sick: model.sick,
            annual: model.annual,
            parental: model.parental,
        },
        created_at: model.created_at.with_timezone(&Utc),
        updated_at: model.updated_at.with_timezone(&Utc),
    }
}

pub(crate) fn account_to_active(account: &LeaveAccount) -> leave_accounts::ActiveModel {
    leave_accounts::ActiveModel {
        employee_id: Set(account.employee_id.into_inner()),
        organization_id: Set(account.organization_id.into_inner()),
        employee_name: Set(account.employee_name.clone()),
        employee_code: Set(account.employee_code.clone()),
        casual: Set(account.balances.casual),
        sick: Set(account.balances.sick),
        annual: Set(account.balances.annual),
        parental: Set(account.balances.parental),
        created_at: Set(account.created_at.into()),
        updated_at: Set(account.updated_at.into()),
    }
}

pub(crate) fn request_from_model(model: leave_requests::Model) -> Result<LeaveRequest, LeaveError> {
    let attachments: Vec<Attachment> = serde_json::from_value(model.attachments).map_err(|e| {
        LeaveError::Storage(format!("leave request {} has malformed attachments: {e}", model.id))
    })?;
    Ok(LeaveRequest {
        id: LeaveRequestId::from_uuid(model.id),
        organization_id: OrganizationId::from_uuid(model.organization_id),
        employee_id: EmployeeId::from_uuid(model.employee_id),
        category: model.category.into(),
        start_date: model.start_date,
        end_date: model.end_date,
        total_days: model.total_days,
        status: model.status.into(),
        reason: model.reason,
        note: model.note,
        attachments,
        reviewed_by: model.reviewed_by.map(UserId::from_uuid),
        reviewed_at: model.reviewed_at.map(|t| t.with_timezone(&Utc)),
        review_note: model.review_note,
        created_at: model.created_at.with_timezone(&Utc),
        updated_at: model.updated_at.with_timezone(&Utc),
    })
}

pub(crate) fn request_to_active(request: &LeaveRequest) -> Result<leave_requests::ActiveModel, LeaveError> {
    let attachments = serde_json::to_value(&request.attachments)
        .map_err(|e| LeaveError::Storage(format!("cannot encode attachments: {e}")))?;
    Ok(leave_requests::ActiveModel {
        id: Set(request.id.into_inner()),
        organization_id: Set(request.organization_id.into_inner()),
        employee_id: Set(request.employee_id.into_inner()),
        category: Set(request.category.into()),
        start_date: Set(request.start_date),
        end_date: Set(request.end_date),
        total_days: Set(request.total_days),
        status: Set(request.status.into()),
        reason: Set(request.reason.clone()),
        note: Set(request.note.clone()),
        attachments: Set(attachments),
        reviewed_by: Set(request.reviewed_by.map(UserId::into_inner)),
        reviewed_at: Set(request.reviewed_at.map(Into::into)),
        review_note: Set(request.review_note.clone()),
        created_at: Set(request.created_at.into()),
        updated_at: Set(request.updated_at.into()),
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;
    use hrm_core::leave::LeaveStatus;
    use rust_decimal_macros::dec;

    fn request() -> LeaveRequest {
        let now = Utc::now();
        LeaveRequest {
            id: LeaveRequestId::new(),
            organization_id: OrganizationId::new(),
            employee_id: EmployeeId::new(),
            category: LeaveCategory::Sick,
            start_date: NaiveDate::from_ymd_opt(2026, 4, 6).unwrap(),
            end_date: NaiveDate::from_ymd_opt(2026, 4, 7).unwrap(),
            total_days: dec!(2),
            status: LeaveStatus::Processing,
            reason: "Recovering from surgery".into(),
            note: Some("Doctor's note attached".into()),
            attachments: vec![Attachment {
                name: "note.pdf".into(),
                mime_type: "application/pdf".into(),
                size_bytes: 2048,
                content_ref: "blob://leave/note.pdf".into(),
            }],
            reviewed_by: Some(UserId::new()),
            reviewed_at: Some(now),
            review_note: None,
            created_at: now,
            updated_at: now,
        }
    }

    #[test]
    fn test_request_active_model_carries_enums_and_json() {
        let req = request();
        let active = request_to_active(&req).unwrap();
        assert_eq!(
            active.status.clone().unwrap(),
            crate::entities::sea_orm_active_enums::LeaveStatus::Processing
        );
        assert_eq!(
            active.category.clone().unwrap(),
            crate::entities::sea_orm_active_enums::LeaveCategory::Sick
        );
        let json = active.attachments.clone().unwrap();
        assert_eq!(json[0]["name"], "note.pdf");
        assert_eq!(json[0]["size_bytes"], 2048);
    }

    #[test]
    fn test_request_model_round_trip() {
        let req = request();
        let active = request_to_active(&req).unwrap();
        let model = leave_requests::Model {
            id: active.id.unwrap(),
            organization_id: active.organization_id.unwrap(),
            employee_id: active.employee_id.unwrap(),
            category: active.category.unwrap(),
            start_date: active.start_date.unwrap(),
            end_date: active.end_date.unwrap(),
            total_days: active.total_days.unwrap(),
            status: active.status.unwrap(),
            reason: active.reason.unwrap(),
            note: active.note.unwrap(),
            attachments: active.attachments.unwrap(),
            reviewed_by: active.reviewed_by.unwrap(),
            reviewed_at: active.reviewed_at.unwrap(),
            review_note: active.review_note.unwrap(),
            created_at: active.created_at.unwrap(),
            updated_at: active.updated_at.unwrap(),
        };
        assert_eq!(request_from_model(model).unwrap(), req);
    }

    #[test]
    fn test_other_insert_failures_stay_storage_errors() {
        let id = LeaveRequestId::new();
        assert!(matches!(
            request_insert_error(id, DbErr::Custom("connection reset".into())),
            LeaveError::Storage(_)
        ));
        assert!(matches!(
            account_insert_error(EmployeeId::new(), DbErr::Custom("connection reset".into())),
            LeaveError::Storage(_)
        ));
    }

    #[test]
    fn test_malformed_attachments_are_a_storage_error() {
        let req = request();
        let active = request_to_active(&req).unwrap();
        let model = leave_requests::Model {
            attachments: serde_json::json!({"not": "a list"}),
            id: active.id.unwrap(),
            organization_id: active.organization_id.unwrap(),
            employee_id: active.employee_id.unwrap(),
            category: active.category.unwrap(),
            start_date: active.start_date.unwrap(),
            end_date: active.end_date.unwrap(),
            total_days: active.total_days.unwrap(),
            status: active.status.unwrap(),
            reason: active.reason.unwrap(),
            note: active.note.unwrap(),
            reviewed_by: active.reviewed_by.unwrap(),
            reviewed_at: active.reviewed_at.unwrap(),
            review_note: active.review_note.unwrap(),
            created_at: active.created_at.unwrap(),
            updated_at: active.updated_at.unwrap(),
        };
        assert!(matches!(request_from_model(model), Err(LeaveError::Storage(_))));
    }
}
