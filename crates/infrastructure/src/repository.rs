use chrono::NaiveDate;
use domain::{
    Month, PeriodFilter, RepositoryError, RepositoryFuture, Subscription, SubscriptionId,
    SubscriptionRepository,
};
use sqlx::{FromRow, PgPool, Postgres, QueryBuilder};
use tracing::error;
use uuid::Uuid;

const COLUMNS: &str = "id, user_id, service_name, price, start_date, end_date";

fn map_sqlx_err(
    operation: &'static str,
    id: Option<SubscriptionId>,
    err: sqlx::Error,
) -> RepositoryError {
    match &err {
        sqlx::Error::Database(db) if db.is_unique_violation() => RepositoryError::Conflict,
        _ => {
            let operation = match id {
                Some(id) => format!("{operation} {id}"),
                None => operation.to_string(),
            };
            error!(%operation, error = %err, "订阅存储操作失败");
            RepositoryError::storage(operation, err.to_string())
        }
    }
}

#[derive(Debug, FromRow)]
struct SubscriptionRecord {
    id: Uuid,
    user_id: String,
    service_name: String,
    price: i64,
    start_date: NaiveDate,
    end_date: Option<NaiveDate>,
}

impl From<SubscriptionRecord> for Subscription {
    fn from(value: SubscriptionRecord) -> Self {
        Subscription {
            id: SubscriptionId::from(value.id),
            user_id: value.user_id,
            service_name: value.service_name,
            price: value.price,
            start_date: Month::from_date(value.start_date),
            end_date: value.end_date.map(Month::from_date).into(),
        }
    }
}

/// 把周期条件渲染为 WHERE 子句。
///
/// 与 [`PeriodFilter::matches`] 的分支一一对应：给出上界时，
/// `end_date` 为 NULL 的持续中订阅被显式排除。
fn push_period_filter(builder: &mut QueryBuilder<'_, Postgres>, filter: &PeriodFilter) {
    builder.push(" WHERE TRUE");
    if let Some(from) = filter.from {
        builder.push(" AND start_date >= ").push_bind(from.first_day());
    }
    if let Some(to) = filter.to {
        builder
            .push(" AND end_date IS NOT NULL AND end_date <= ")
            .push_bind(to.first_day());
    }
}

#[derive(Clone)]
pub struct PgSubscriptionRepository {
    pool: PgPool,
}

impl PgSubscriptionRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

impl SubscriptionRepository for PgSubscriptionRepository {
    fn create(&self, subscription: Subscription) -> RepositoryFuture<Subscription> {
        let pool = self.pool.clone();
        Box::pin(async move {
            let record = sqlx::query_as::<_, SubscriptionRecord>(&format!(
                r#"
                INSERT INTO subscriptions ({COLUMNS})
                VALUES ($1, $2, $3, $4, $5, $6)
                RETURNING {COLUMNS}
                "#
            ))
            .bind(Uuid::from(subscription.id))
            .bind(&subscription.user_id)
            .bind(&subscription.service_name)
            .bind(subscription.price)
            .bind(subscription.start_date.first_day())
            .bind(subscription.end_date.month().map(|month| month.first_day()))
            .fetch_one(&pool)
            .await
            .map_err(|err| map_sqlx_err("insert", Some(subscription.id), err))?;

            Ok(Subscription::from(record))
        })
    }

    fn find_by_id(&self, id: SubscriptionId) -> RepositoryFuture<Option<Subscription>> {
        let pool = self.pool.clone();
        Box::pin(async move {
            let record = sqlx::query_as::<_, SubscriptionRecord>(&format!(
                "SELECT {COLUMNS} FROM subscriptions WHERE id = $1"
            ))
            .bind(Uuid::from(id))
            .fetch_optional(&pool)
            .await
            .map_err(|err| map_sqlx_err("select", Some(id), err))?;

            Ok(record.map(Subscription::from))
        })
    }

    fn update(&self, subscription: Subscription) -> RepositoryFuture<Subscription> {
        let pool = self.pool.clone();
        Box::pin(async move {
            let record = sqlx::query_as::<_, SubscriptionRecord>(&format!(
                r#"
                UPDATE subscriptions
                SET user_id = $2, service_name = $3, price = $4, start_date = $5, end_date = $6
                WHERE id = $1
                RETURNING {COLUMNS}
                "#
            ))
            .bind(Uuid::from(subscription.id))
            .bind(&subscription.user_id)
            .bind(&subscription.service_name)
            .bind(subscription.price)
            .bind(subscription.start_date.first_day())
            .bind(subscription.end_date.month().map(|month| month.first_day()))
            .fetch_optional(&pool)
            .await
            .map_err(|err| map_sqlx_err("update", Some(subscription.id), err))?;

            record
                .map(Subscription::from)
                .ok_or(RepositoryError::NotFound)
        })
    }

    fn delete(&self, id: SubscriptionId) -> RepositoryFuture<()> {
        let pool = self.pool.clone();
        Box::pin(async move {
            let result = sqlx::query("DELETE FROM subscriptions WHERE id = $1")
                .bind(Uuid::from(id))
                .execute(&pool)
                .await
                .map_err(|err| map_sqlx_err("delete", Some(id), err))?;

            if result.rows_affected() == 0 {
                return Err(RepositoryError::NotFound);
            }
            Ok(())
        })
    }

    fn list(&self, filter: PeriodFilter) -> RepositoryFuture<Vec<Subscription>> {
        let pool = self.pool.clone();
        Box::pin(async move {
            let mut builder =
                QueryBuilder::<Postgres>::new(format!("SELECT {COLUMNS} FROM subscriptions"));
            push_period_filter(&mut builder, &filter);

            let records = builder
                .build_query_as::<SubscriptionRecord>()
                .fetch_all(&pool)
                .await
                .map_err(|err| map_sqlx_err("list", None, err))?;

            Ok(records.into_iter().map(Subscription::from).collect())
        })
    }
}
