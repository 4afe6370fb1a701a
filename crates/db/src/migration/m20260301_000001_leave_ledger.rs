//! Leave ledger schema.
//!
//! Creates the enum types, the per-employee balance table and the request
//! table, plus the triggers that keep requests append-only.

use sea_orm_migration::prelude::*;

#[derive(DeriveMigrationName)]
pub struct Migration;

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        let db = manager.get_connection();
        db.execute_unprepared(LEAVE_LEDGER_SQL).await?;
        Ok(())
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        let db = manager.get_connection();
        db.execute_unprepared(DROP_SQL).await?;
        Ok(())
    }
}

const LEAVE_LEDGER_SQL: &str = r"
-- ============================================================
-- ENUMS
-- ============================================================
CREATE TYPE leave_category AS ENUM ('casual', 'sick', 'annual', 'parental');
CREATE TYPE leave_status AS ENUM ('pending', 'processing', 'approved', 'denied');

-- ============================================================
-- TABLE: leave_accounts
-- One row per employee; balances are only written by the coordinator
-- ============================================================
CREATE TABLE leave_accounts (
    employee_id UUID PRIMARY KEY,
    organization_id UUID NOT NULL,
    employee_name VARCHAR(255) NOT NULL,
    employee_code VARCHAR(64) NOT NULL DEFAULT '',
    casual NUMERIC(7, 2) NOT NULL DEFAULT 0,
    sick NUMERIC(7, 2) NOT NULL DEFAULT 0,
    annual NUMERIC(7, 2) NOT NULL DEFAULT 0,
    parental NUMERIC(7, 2) NOT NULL DEFAULT 0,
    created_at TIMESTAMPTZ NOT NULL DEFAULT now(),
    updated_at TIMESTAMPTZ NOT NULL DEFAULT now(),
    CONSTRAINT chk_casual_non_negative CHECK (casual >= 0),
    CONSTRAINT chk_sick_non_negative CHECK (sick >= 0),
    CONSTRAINT chk_annual_non_negative CHECK (annual >= 0),
    CONSTRAINT chk_parental_non_negative CHECK (parental >= 0)
);

CREATE INDEX idx_leave_accounts_org ON leave_accounts(organization_id);

-- ============================================================
-- TABLE: leave_requests
-- ============================================================
CREATE TABLE leave_requests (
    id UUID PRIMARY KEY,
    organization_id UUID NOT NULL,
    employee_id UUID NOT NULL REFERENCES leave_accounts(employee_id),
    category leave_category NOT NULL,
    start_date DATE NOT NULL,
    end_date DATE NOT NULL,
    total_days NUMERIC(7, 2) NOT NULL,
    status leave_status NOT NULL DEFAULT 'pending',
    reason TEXT NOT NULL,
    note TEXT,
    attachments JSONB NOT NULL DEFAULT '[]'::jsonb,
    reviewed_by UUID,
    reviewed_at TIMESTAMPTZ,
    review_note TEXT,
    created_at TIMESTAMPTZ NOT NULL DEFAULT now(),
    updated_at TIMESTAMPTZ NOT NULL DEFAULT now(),
    CONSTRAINT chk_leave_dates CHECK (end_date >= start_date),
    CONSTRAINT chk_total_days_positive CHECK (total_days > 0)
);

CREATE INDEX idx_leave_requests_org_created ON leave_requests(organization_id, created_at DESC);
CREATE INDEX idx_leave_requests_org_status ON leave_requests(organization_id, status);
CREATE INDEX idx_leave_requests_employee ON leave_requests(employee_id, status);
CREATE INDEX idx_leave_requests_dates ON leave_requests(organization_id, start_date, end_date);

-- ============================================================
-- FUNCTION: freeze_leave_request
-- Charged days, category and owner never change after submission
-- ============================================================
CREATE OR REPLACE FUNCTION freeze_leave_request()
RETURNS TRIGGER AS $$
BEGIN
    IF NEW.total_days <> OLD.total_days
        OR NEW.category <> OLD.category
        OR NEW.employee_id <> OLD.employee_id
        OR NEW.organization_id <> OLD.organization_id
        OR NEW.start_date <> OLD.start_date
        OR NEW.end_date <> OLD.end_date THEN
        RAISE EXCEPTION 'Leave request % is frozen except for status and review fields', OLD.id;
    END IF;
    RETURN NEW;
END;
$$ LANGUAGE plpgsql;

CREATE TRIGGER trg_freeze_leave_request
BEFORE UPDATE ON leave_requests
FOR EACH ROW
EXECUTE FUNCTION freeze_leave_request();

-- ============================================================
-- FUNCTION: prevent_leave_request_delete
-- Requests are never deleted; cancellation is a move to denied
-- ============================================================
CREATE OR REPLACE FUNCTION prevent_leave_request_delete()
RETURNS TRIGGER AS $$
BEGIN
    RAISE EXCEPTION 'Leave request % cannot be deleted', OLD.id;
END;
$$ LANGUAGE plpgsql;

CREATE TRIGGER trg_prevent_leave_request_delete
BEFORE DELETE ON leave_requests
FOR EACH ROW
EXECUTE FUNCTION prevent_leave_request_delete();
";

const DROP_SQL: &str = r"
DROP TABLE IF EXISTS leave_requests CASCADE;
DROP TABLE IF EXISTS leave_accounts CASCADE;
DROP FUNCTION IF EXISTS freeze_leave_request();
DROP FUNCTION IF EXISTS prevent_leave_request_delete();
DROP TYPE IF EXISTS leave_status;
DROP TYPE IF EXISTS leave_category;
";
