//! Application repository: PostgreSQL implementation of `ApplicationStore`.

use async_trait::async_trait;
use chrono::Utc;
use sea_orm::{
    ActiveModelTrait, ColumnTrait, DatabaseConnection, DbErr, EntityTrait, PaginatorTrait,
    QueryFilter, QueryOrder, Set, SqlErr, TransactionTrait,
};
use uuid::Uuid;

use microloan_core::ledger::{LoanApplication, PAYMENT_METHOD_CARD, PaymentDetails, Repayment};
use microloan_core::store::{ApplicationStore, StoreError};
use microloan_shared::types::{ApplicationId, LoanId, UserId};

use crate::entities::{loan_applications, repayments};

/// Application repository backed by `SeaORM`.
///
/// `save` is a conditional `UPDATE ... WHERE id = $1 AND version = $2`;
/// new repayment rows are inserted in the same database transaction.
#[derive(Debug, Clone)]
pub struct ApplicationRepository {
    db: DatabaseConnection,
}

impl ApplicationRepository {
    /// Creates a new application repository.
    #[must_use]
    pub const fn new(db: DatabaseConnection) -> Self {
        Self { db }
    }

    /// Converts stored rows into the domain record.
    fn to_domain(model: loan_applications::Model, rows: Vec<repayments::Model>) -> LoanApplication {
        let payment_details = match (model.fee_transaction_id, model.fee_amount, model.fee_paid_at) {
            (Some(transaction_id), Some(amount), Some(paid_at)) => Some(PaymentDetails {
                transaction_id,
                amount,
                paid_at: paid_at.with_timezone(&Utc),
                payment_method: model
                    .fee_payment_method
                    .unwrap_or_else(|| PAYMENT_METHOD_CARD.to_string()),
            }),
            _ => None,
        };

        LoanApplication {
            id: ApplicationId::from_uuid(model.id),
            loan_id: LoanId::from_uuid(model.loan_id),
            user_id: UserId::from_uuid(model.user_id),
            loan_amount: model.loan_amount,
            interest_rate: model.interest_rate,
            status: model.status.into(),
            total_amount: model.total_amount,
            paid_amount: model.paid_amount,
            remaining_amount: model.remaining_amount,
            repayment_status: model.repayment_status.into(),
            repayments: rows
                .into_iter()
                .map(|r| Repayment {
                    amount: r.amount,
                    paid_at: r.paid_at.with_timezone(&Utc),
                    transaction_id: r.transaction_id,
                    payment_method: r.payment_method,
                })
                .collect(),
            application_fee_status: model.application_fee_status.into(),
            payment_details,
            version: model.version,
            created_at: model.created_at.with_timezone(&Utc),
            updated_at: model.updated_at.with_timezone(&Utc),
        }
    }

    /// Mutable columns of an application, with the version bumped.
    fn update_model(app: &LoanApplication) -> loan_applications::ActiveModel {
        let details = app.payment_details.as_ref();
        loan_applications::ActiveModel {
            status: Set(app.status.into()),
            total_amount: Set(app.total_amount),
            paid_amount: Set(app.paid_amount),
            remaining_amount: Set(app.remaining_amount),
            repayment_status: Set(app.repayment_status.into()),
            application_fee_status: Set(app.application_fee_status.into()),
            fee_transaction_id: Set(details.map(|d| d.transaction_id.clone())),
            fee_amount: Set(details.map(|d| d.amount)),
            fee_paid_at: Set(details.map(|d| d.paid_at.into())),
            fee_payment_method: Set(details.map(|d| d.payment_method.clone())),
            version: Set(app.version + 1),
            updated_at: Set(app.updated_at.into()),
            ..Default::default()
        }
    }

    /// Full row for a new application.
    fn insert_model(app: &LoanApplication) -> loan_applications::ActiveModel {
        let mut model = Self::update_model(app);
        model.id = Set(app.id.into_inner());
        model.loan_id = Set(app.loan_id.into_inner());
        model.user_id = Set(app.user_id.into_inner());
        model.loan_amount = Set(app.loan_amount);
        model.interest_rate = Set(app.interest_rate);
        model.version = Set(1);
        model.created_at = Set(app.created_at.into());
        model
    }

    fn repayment_model(
        application_id: ApplicationId,
        index: usize,
        repayment: &Repayment,
    ) -> Result<repayments::ActiveModel, StoreError> {
        let sequence = i32::try_from(index)
            .map_err(|_| StoreError::unavailable("repayment sequence out of range"))?;
        Ok(repayments::ActiveModel {
            id: Set(Uuid::now_v7()),
            application_id: Set(application_id.into_inner()),
            sequence: Set(sequence),
            amount: Set(repayment.amount),
            transaction_id: Set(repayment.transaction_id.clone()),
            payment_method: Set(repayment.payment_method.clone()),
            paid_at: Set(repayment.paid_at.into()),
            created_at: Set(Utc::now().into()),
        })
    }

    async fn insert_repayments<C: sea_orm::ConnectionTrait>(
        conn: &C,
        app: &LoanApplication,
        skip: usize,
    ) -> Result<(), StoreError> {
        let rows = app
            .repayments
            .iter()
            .enumerate()
            .skip(skip)
            .map(|(i, r)| Self::repayment_model(app.id, i, r))
            .collect::<Result<Vec<_>, _>>()?;

        let Some(first) = app.repayments.get(skip) else {
            return Ok(());
        };

        repayments::Entity::insert_many(rows)
            .exec(conn)
            .await
            .map_err(|err| match err.sql_err() {
                Some(SqlErr::UniqueConstraintViolation(_)) => {
                    StoreError::DuplicateTransaction(first.transaction_id.clone())
                }
                _ => db_error(&err),
            })?;
        Ok(())
    }
}

fn db_error(err: &DbErr) -> StoreError {
    StoreError::unavailable(err.to_string())
}

#[async_trait]
impl ApplicationStore for ApplicationRepository {
    async fn insert(&self, app: &LoanApplication) -> Result<LoanApplication, StoreError> {
        let txn = self.db.begin().await.map_err(|e| db_error(&e))?;

        Self::insert_model(app).insert(&txn).await.map_err(|err| {
            match err.sql_err() {
                Some(SqlErr::UniqueConstraintViolation(_)) => StoreError::Conflict {
                    id: app.id,
                    expected: app.version,
                },
                _ => db_error(&err),
            }
        })?;
        Self::insert_repayments(&txn, app, 0).await?;

        txn.commit().await.map_err(|e| db_error(&e))?;

        let mut stored = app.clone();
        stored.version = 1;
        Ok(stored)
    }

    async fn load(&self, id: ApplicationId) -> Result<LoanApplication, StoreError> {
        let model = loan_applications::Entity::find_by_id(id.into_inner())
            .one(&self.db)
            .await
            .map_err(|e| db_error(&e))?
            .ok_or(StoreError::NotFound(id))?;

        let rows = repayments::Entity::find()
            .filter(repayments::Column::ApplicationId.eq(id.into_inner()))
            .order_by_asc(repayments::Column::Sequence)
            .all(&self.db)
            .await
            .map_err(|e| db_error(&e))?;

        Ok(Self::to_domain(model, rows))
    }

    async fn save(&self, app: &LoanApplication) -> Result<LoanApplication, StoreError> {
        let txn = self.db.begin().await.map_err(|e| db_error(&e))?;

        let result = loan_applications::Entity::update_many()
            .set(Self::update_model(app))
            .filter(loan_applications::Column::Id.eq(app.id.into_inner()))
            .filter(loan_applications::Column::Version.eq(app.version))
            .exec(&txn)
            .await
            .map_err(|e| db_error(&e))?;

        if result.rows_affected == 0 {
            let exists = loan_applications::Entity::find_by_id(app.id.into_inner())
                .one(&txn)
                .await
                .map_err(|e| db_error(&e))?
                .is_some();
            return Err(if exists {
                StoreError::Conflict {
                    id: app.id,
                    expected: app.version,
                }
            } else {
                StoreError::NotFound(app.id)
            });
        }

        let stored_count = repayments::Entity::find()
            .filter(repayments::Column::ApplicationId.eq(app.id.into_inner()))
            .count(&txn)
            .await
            .map_err(|e| db_error(&e))?;
        let stored_count = usize::try_from(stored_count)
            .map_err(|_| StoreError::unavailable("repayment count out of range"))?;

        Self::insert_repayments(&txn, app, stored_count).await?;

        txn.commit().await.map_err(|e| db_error(&e))?;

        tracing::debug!(
            application_id = %app.id,
            version = app.version + 1,
            "application saved"
        );

        let mut stored = app.clone();
        stored.version = app.version + 1;
        Ok(stored)
    }
}
