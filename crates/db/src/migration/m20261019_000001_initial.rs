//! Initial database migration.
//!
//! Creates the investor, campaign, ledger and billing tables together with
//! the triggers that keep billing events write-once and terminal ledger
//! statuses final.

use sea_orm_migration::prelude::*;

#[derive(DeriveMigrationName)]
pub struct Migration;

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        let db = manager.get_connection();

        // ============================================================
        // PART 1: PARTIES
        // ============================================================
        db.execute_unprepared(INVESTORS_SQL).await?;
        db.execute_unprepared(CAMPAIGNS_SQL).await?;

        // ============================================================
        // PART 2: LEDGER & BILLING
        // ============================================================
        db.execute_unprepared(LEDGER_ENTRIES_SQL).await?;
        db.execute_unprepared(BILLING_EVENTS_SQL).await?;

        // ============================================================
        // PART 3: TRIGGERS & FUNCTIONS
        // ============================================================
        db.execute_unprepared(TRIGGERS_SQL).await?;

        Ok(())
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        let db = manager.get_connection();
        db.execute_unprepared(DROP_ALL_SQL).await?;
        Ok(())
    }
}

// ============================================================
// SQL CONSTANTS
// ============================================================

const INVESTORS_SQL: &str = r"
CREATE TABLE investors (
    id UUID PRIMARY KEY,
    email VARCHAR(255) NOT NULL UNIQUE,
    kyc_status VARCHAR(16) NOT NULL DEFAULT 'unverified',
    is_accredited BOOLEAN NOT NULL DEFAULT false,
    net_worth NUMERIC(19, 2),
    annual_income NUMERIC(19, 2),
    accreditation_status VARCHAR(32) NOT NULL DEFAULT 'NONE',
    accreditation_verified_at TIMESTAMPTZ,
    accreditation_verified_by UUID,
    accreditation_expiry TIMESTAMPTZ,
    created_at TIMESTAMPTZ NOT NULL DEFAULT now(),
    CONSTRAINT chk_kyc_status CHECK (kyc_status IN ('unverified', 'pending', 'verified')),
    CONSTRAINT chk_accreditation_status CHECK (
        accreditation_status IN ('NONE', 'SELF_CERTIFIED', 'PENDING_REVIEW', 'VERIFIED_DOCS')
    ),
    CONSTRAINT chk_accreditation_expiry CHECK (
        accreditation_expiry IS NULL
        OR accreditation_verified_at IS NULL
        OR accreditation_expiry >= accreditation_verified_at
    ),
    CONSTRAINT chk_net_worth_non_negative CHECK (net_worth IS NULL OR net_worth >= 0),
    CONSTRAINT chk_income_non_negative CHECK (annual_income IS NULL OR annual_income >= 0)
);
";

const CAMPAIGNS_SQL: &str = r"
CREATE TABLE campaigns (
    id UUID PRIMARY KEY,
    issuer_id UUID NOT NULL,
    name VARCHAR(255) NOT NULL,
    target_amount NUMERIC(19, 2) NOT NULL,
    deadline TIMESTAMPTZ NOT NULL,
    regulation_type VARCHAR(16) NOT NULL DEFAULT 'REG_CF',
    funding_status VARCHAR(16) NOT NULL DEFAULT 'active',
    created_at TIMESTAMPTZ NOT NULL DEFAULT now(),
    CONSTRAINT chk_target_positive CHECK (target_amount > 0),
    CONSTRAINT chk_funding_status CHECK (funding_status IN ('active', 'funded', 'failed'))
);

CREATE INDEX idx_campaigns_created_at ON campaigns(created_at);
";

const LEDGER_ENTRIES_SQL: &str = r"
CREATE TABLE ledger_entries (
    id UUID PRIMARY KEY,
    investor_id UUID NOT NULL REFERENCES investors(id),
    campaign_id UUID NOT NULL REFERENCES campaigns(id),
    amount NUMERIC(19, 2) NOT NULL,
    transaction_type VARCHAR(16) NOT NULL,
    status VARCHAR(32) NOT NULL,
    payment_reference VARCHAR(255) UNIQUE,
    created_at TIMESTAMPTZ NOT NULL DEFAULT now(),
    CONSTRAINT chk_amount_positive CHECK (amount > 0),
    CONSTRAINT chk_transaction_type CHECK (
        transaction_type IN ('investment', 'trade', 'payout', 'refund')
    ),
    CONSTRAINT chk_status CHECK (
        status IN ('pending_payment', 'pending_settlement', 'settled', 'failed', 'cancelled')
    )
);

CREATE INDEX idx_le_investor_created ON ledger_entries(investor_id, created_at);
CREATE INDEX idx_le_campaign ON ledger_entries(campaign_id);
";

const BILLING_EVENTS_SQL: &str = r"
CREATE TABLE billing_events (
    id UUID PRIMARY KEY,
    investor_id UUID NOT NULL REFERENCES investors(id),
    reference VARCHAR(255) NOT NULL,
    description VARCHAR(255) NOT NULL,
    fee_amount NUMERIC(19, 2) NOT NULL,
    created_at TIMESTAMPTZ NOT NULL DEFAULT now(),
    CONSTRAINT chk_fee_non_negative CHECK (fee_amount >= 0)
);

CREATE INDEX idx_billing_investor ON billing_events(investor_id, created_at);
";

const TRIGGERS_SQL: &str = r"
-- ============================================================
-- FUNCTION: prevent_billing_event_change
-- Billing events are write-once
-- ============================================================
CREATE OR REPLACE FUNCTION prevent_billing_event_change()
RETURNS TRIGGER AS $$
BEGIN
    RAISE EXCEPTION 'Billing events are immutable.';
END;
$$ LANGUAGE plpgsql;

CREATE TRIGGER trg_billing_events_immutable
BEFORE UPDATE OR DELETE ON billing_events
FOR EACH ROW
EXECUTE FUNCTION prevent_billing_event_change();

-- ============================================================
-- FUNCTION: prevent_terminal_ledger_change
-- Settled, failed and cancelled entries never change status
-- ============================================================
CREATE OR REPLACE FUNCTION prevent_terminal_ledger_change()
RETURNS TRIGGER AS $$
BEGIN
    IF OLD.status IN ('settled', 'failed', 'cancelled') AND NEW.status <> OLD.status THEN
        RAISE EXCEPTION 'Ledger entry % is % and cannot change status.', OLD.id, OLD.status;
    END IF;

    IF NEW.status = 'pending_payment' AND OLD.status <> 'pending_payment' THEN
        RAISE EXCEPTION 'Ledger entry % cannot re-enter pending_payment.', OLD.id;
    END IF;

    RETURN NEW;
END;
$$ LANGUAGE plpgsql;

CREATE TRIGGER trg_ledger_terminal_status
BEFORE UPDATE ON ledger_entries
FOR EACH ROW
EXECUTE FUNCTION prevent_terminal_ledger_change();
";

const DROP_ALL_SQL: &str = r"
DROP TRIGGER IF EXISTS trg_ledger_terminal_status ON ledger_entries;
DROP TRIGGER IF EXISTS trg_billing_events_immutable ON billing_events;
DROP FUNCTION IF EXISTS prevent_terminal_ledger_change();
DROP FUNCTION IF EXISTS prevent_billing_event_change();
DROP TABLE IF EXISTS billing_events;
DROP TABLE IF EXISTS ledger_entries;
DROP TABLE IF EXISTS campaigns;
DROP TABLE IF EXISTS investors;
";
