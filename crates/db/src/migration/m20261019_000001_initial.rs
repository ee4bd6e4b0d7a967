//! Initial schema: loan applications and their repayment ledger.

use sea_orm_migration::prelude::*;

#[derive(DeriveMigrationName)]
pub struct Migration;

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        let db = manager.get_connection();
        db.execute_unprepared(INITIAL_SQL).await?;
        Ok(())
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        let db = manager.get_connection();
        db.execute_unprepared(
            r"
            DROP TABLE IF EXISTS repayments CASCADE;
            DROP TABLE IF EXISTS loan_applications CASCADE;
            DROP TYPE IF EXISTS fee_status;
            DROP TYPE IF EXISTS repayment_status;
            DROP TYPE IF EXISTS application_status;
            ",
        )
        .await?;
        Ok(())
    }
}

const INITIAL_SQL: &str = r"
CREATE TYPE application_status AS ENUM ('pending', 'approved', 'rejected', 'cancelled');
CREATE TYPE repayment_status AS ENUM ('pending', 'in_progress', 'complete');
CREATE TYPE fee_status AS ENUM ('unpaid', 'paid');

-- One row per application; derived balance columns are nullable so that
-- records written before they existed can be backfilled on read.
CREATE TABLE loan_applications (
    id UUID PRIMARY KEY,
    loan_id UUID NOT NULL,
    user_id UUID NOT NULL,
    loan_amount NUMERIC(19, 4) NOT NULL,
    interest_rate NUMERIC(9, 4),
    status application_status NOT NULL DEFAULT 'pending',
    total_amount NUMERIC(19, 4),
    paid_amount NUMERIC(19, 4) NOT NULL DEFAULT 0,
    remaining_amount NUMERIC(19, 4),
    repayment_status repayment_status NOT NULL DEFAULT 'pending',
    application_fee_status fee_status NOT NULL DEFAULT 'unpaid',
    fee_transaction_id VARCHAR(255),
    fee_amount NUMERIC(19, 4),
    fee_paid_at TIMESTAMPTZ,
    fee_payment_method VARCHAR(50),
    version BIGINT NOT NULL DEFAULT 1,
    created_at TIMESTAMPTZ NOT NULL DEFAULT now(),
    updated_at TIMESTAMPTZ NOT NULL DEFAULT now(),
    CONSTRAINT chk_loan_amount_positive CHECK (loan_amount > 0),
    CONSTRAINT chk_interest_rate_non_negative CHECK (interest_rate IS NULL OR interest_rate >= 0),
    CONSTRAINT chk_paid_amount_non_negative CHECK (paid_amount >= 0),
    CONSTRAINT chk_remaining_non_negative CHECK (remaining_amount IS NULL OR remaining_amount >= 0)
);

CREATE INDEX idx_loan_applications_user ON loan_applications(user_id, created_at DESC);
CREATE INDEX idx_loan_applications_status ON loan_applications(status);

-- Append-only repayment ledger
CREATE TABLE repayments (
    id UUID PRIMARY KEY,
    application_id UUID NOT NULL REFERENCES loan_applications(id) ON DELETE CASCADE,
    sequence INTEGER NOT NULL,
    amount NUMERIC(19, 4) NOT NULL,
    transaction_id VARCHAR(255) NOT NULL,
    payment_method VARCHAR(50) NOT NULL,
    paid_at TIMESTAMPTZ NOT NULL,
    created_at TIMESTAMPTZ NOT NULL DEFAULT now(),
    CONSTRAINT chk_repayment_amount_positive CHECK (amount > 0),
    CONSTRAINT uq_repayments_sequence UNIQUE (application_id, sequence)
);

-- A transaction id is applied at most once per application
CREATE UNIQUE INDEX uq_repayments_transaction ON repayments(application_id, transaction_id);
";
