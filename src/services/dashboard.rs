//! Dashboard aggregation: per-user chart series and summary scalars.
//!
//! Grouped queries produce sparse per-day buckets; the alignment core
//! in [`super::analytics`] turns those into the equal-length sequences
//! the charting front end consumes. Every query is scoped to the
//! requesting user.

use std::collections::BTreeMap;

use chrono::{DateTime, NaiveDate, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use sqlx::PgPool;
use uuid::Uuid;

use crate::errors::AppError;
use crate::models::client::ClientSummary;
use crate::models::lead::{LeadStatus, LeadSummary};
use crate::models::product::ProductRef;
use crate::services::analytics::{self, DateSeries, TimePeriod};

/// Filter parameters as they arrive on the query string.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct DashboardFilters {
    pub period: Option<String>,
    pub data_filter: Option<String>,
    pub purchase_period: Option<String>,
    pub purchase_product: Option<String>,
}

/// Complete dashboard payload.
#[derive(Debug, Serialize)]
pub struct DashboardData {
    pub lead_count: i64,
    pub client_count: i64,
    pub latest_leads: Vec<LeadSummary>,
    pub latest_clients: Vec<ClientSummary>,
    pub won_lead_count: i64,
    pub lost_lead_count: i64,
    pub contacted_lead_count: i64,
    pub chart_dates: Vec<String>,
    pub lead_counts: Vec<i64>,
    pub client_counts: Vec<i64>,
    pub won_lead_counts: Vec<i64>,
    pub lost_lead_counts: Vec<i64>,
    pub contacted_lead_counts: Vec<i64>,
    pub purchase_chart_data: PurchaseChartData,
    pub all_products: Vec<ProductRef>,
    pub total_revenue: Decimal,
    pub total_items: i64,
    pub selected_period: String,
    pub selected_data_filter: String,
    pub selected_purchase_period: String,
    pub selected_purchase_product: String,
}

/// Per-product purchase series aligned to a shared purchase axis.
#[derive(Debug, Serialize)]
pub struct PurchaseChartData {
    pub dates: Vec<String>,
    pub products: BTreeMap<String, ProductSeries>,
}

#[derive(Debug, Serialize)]
pub struct ProductSeries {
    pub dates: Vec<String>,
    pub quantities: Vec<i64>,
    pub amounts: Vec<Decimal>,
}

/// Product filter for the purchase chart.
///
/// A value that is neither `all` nor a known product id yields empty
/// series — stale selector state must not break the page.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum ProductFilter {
    All,
    Id(Uuid),
    Unmatched,
}

impl ProductFilter {
    fn parse(value: Option<&str>) -> Self {
        match value {
            None | Some("all") => Self::All,
            Some(raw) => Uuid::parse_str(raw).map(Self::Id).unwrap_or(Self::Unmatched),
        }
    }
}

/// Normalize a monetary sum to a fixed two-decimal rendering.
///
/// Aggregates over an empty set come back as bare `0`; the charting
/// front end expects `0.00`.
fn money(value: Decimal) -> Decimal {
    let mut rounded = value.round_dp(2);
    rounded.rescale(2);
    rounded
}

#[derive(Debug, sqlx::FromRow)]
struct LeadTotals {
    total: i64,
    won: i64,
    lost: i64,
    contacted: i64,
}

#[derive(Debug, sqlx::FromRow)]
struct LeadBucket {
    date: NaiveDate,
    status: LeadStatus,
    count: i64,
}

#[derive(Debug, sqlx::FromRow)]
struct DateBucket {
    date: NaiveDate,
    count: i64,
}

#[derive(Debug, sqlx::FromRow)]
struct PurchaseBucket {
    date: NaiveDate,
    product_id: Uuid,
    product_name: String,
    quantity: i64,
    amount: Decimal,
}

#[derive(Debug, sqlx::FromRow)]
struct PurchaseTotals {
    total_items: i64,
    total_revenue: Decimal,
}

/// Build the full dashboard payload for one user.
pub async fn build(
    pool: &PgPool,
    user_id: Uuid,
    filters: &DashboardFilters,
) -> Result<DashboardData, AppError> {
    let now = Utc::now();
    let period = TimePeriod::from_param(filters.period.as_deref(), TimePeriod::All);
    let purchase_period =
        TimePeriod::from_param(filters.purchase_period.as_deref(), TimePeriod::Last30Days);
    let product_filter = ProductFilter::parse(filters.purchase_product.as_deref());

    let lead_totals = fetch_lead_totals(pool, user_id).await?;
    let client_count = fetch_client_count(pool, user_id).await?;
    let latest_leads = fetch_latest_leads(pool, user_id).await?;
    let latest_clients = fetch_latest_clients(pool, user_id).await?;

    let cutoff = period.cutoff(now);
    let lead_buckets = fetch_lead_buckets(pool, user_id, cutoff).await?;
    let client_buckets = fetch_client_buckets(pool, user_id, cutoff).await?;

    let purchase_cutoff = purchase_period.cutoff(now);
    let purchase_buckets = match product_filter {
        ProductFilter::Unmatched => Vec::new(),
        ProductFilter::All => fetch_purchase_buckets(pool, user_id, purchase_cutoff, None).await?,
        ProductFilter::Id(id) => {
            fetch_purchase_buckets(pool, user_id, purchase_cutoff, Some(id)).await?
        }
    };
    let purchase_totals = match product_filter {
        ProductFilter::Unmatched => PurchaseTotals {
            total_items: 0,
            total_revenue: Decimal::ZERO,
        },
        ProductFilter::All => fetch_purchase_totals(pool, user_id, purchase_cutoff, None).await?,
        ProductFilter::Id(id) => {
            fetch_purchase_totals(pool, user_id, purchase_cutoff, Some(id)).await?
        }
    };

    let all_products = fetch_product_refs(pool).await?;

    let (axis, lead_series, client_series, status_series) =
        align_entity_series(&lead_buckets, &client_buckets);
    let purchase_chart_data = assemble_purchase_chart(&purchase_buckets);

    Ok(DashboardData {
        lead_count: lead_totals.total,
        client_count,
        latest_leads,
        latest_clients,
        won_lead_count: lead_totals.won,
        lost_lead_count: lead_totals.lost,
        contacted_lead_count: lead_totals.contacted,
        chart_dates: analytics::format_axis(&axis),
        lead_counts: lead_series,
        client_counts: client_series,
        won_lead_counts: status_series.won,
        lost_lead_counts: status_series.lost,
        contacted_lead_counts: status_series.contacted,
        purchase_chart_data,
        all_products,
        total_revenue: money(purchase_totals.total_revenue),
        total_items: purchase_totals.total_items,
        selected_period: filters.period.clone().unwrap_or_else(|| "all".to_string()),
        selected_data_filter: filters
            .data_filter
            .clone()
            .unwrap_or_else(|| "all".to_string()),
        selected_purchase_period: filters
            .purchase_period
            .clone()
            .unwrap_or_else(|| "30days".to_string()),
        selected_purchase_product: filters
            .purchase_product
            .clone()
            .unwrap_or_else(|| "all".to_string()),
    })
}

struct StatusSeries {
    won: Vec<i64>,
    lost: Vec<i64>,
    contacted: Vec<i64>,
}

/// One pass over the grouped rows builds every sparse series, then the
/// shared axis reconciles them into aligned sequences.
fn align_entity_series(
    lead_buckets: &[LeadBucket],
    client_buckets: &[DateBucket],
) -> (Vec<NaiveDate>, Vec<i64>, Vec<i64>, StatusSeries) {
    let mut leads: DateSeries<i64> = BTreeMap::new();
    let mut won: DateSeries<i64> = BTreeMap::new();
    let mut lost: DateSeries<i64> = BTreeMap::new();
    let mut contacted: DateSeries<i64> = BTreeMap::new();
    for bucket in lead_buckets {
        *leads.entry(bucket.date).or_insert(0) += bucket.count;
        let status_map = match bucket.status {
            LeadStatus::Won => Some(&mut won),
            LeadStatus::Lost => Some(&mut lost),
            LeadStatus::Contacted => Some(&mut contacted),
            LeadStatus::New => None,
        };
        if let Some(map) = status_map {
            *map.entry(bucket.date).or_insert(0) += bucket.count;
        }
    }

    let mut clients: DateSeries<i64> = BTreeMap::new();
    for bucket in client_buckets {
        clients.insert(bucket.date, bucket.count);
    }

    let axis = analytics::shared_axis([&leads, &won, &lost, &contacted, &clients]);
    let lead_series = analytics::zero_fill(&axis, &leads);
    let client_series = analytics::zero_fill(&axis, &clients);
    let status_series = StatusSeries {
        won: analytics::zero_fill(&axis, &won),
        lost: analytics::zero_fill(&axis, &lost),
        contacted: analytics::zero_fill(&axis, &contacted),
    };
    (axis, lead_series, client_series, status_series)
}

/// Build the per-product purchase chart from grouped purchase rows.
///
/// Series are keyed by product id while accumulating; the display map
/// keys on product name, with an id suffix appended only when two
/// distinct products share a name.
fn assemble_purchase_chart(buckets: &[PurchaseBucket]) -> PurchaseChartData {
    struct Accum {
        name: String,
        quantities: DateSeries<i64>,
        amounts: DateSeries<Decimal>,
    }

    let mut per_product: BTreeMap<Uuid, Accum> = BTreeMap::new();
    for bucket in buckets {
        let entry = per_product.entry(bucket.product_id).or_insert_with(|| Accum {
            name: bucket.product_name.clone(),
            quantities: BTreeMap::new(),
            amounts: BTreeMap::new(),
        });
        *entry.quantities.entry(bucket.date).or_insert(0) += bucket.quantity;
        *entry.amounts.entry(bucket.date).or_insert(Decimal::ZERO) += bucket.amount;
    }

    let axis = analytics::shared_axis(per_product.values().map(|a| &a.quantities));
    let dates = analytics::format_axis(&axis);

    let mut name_counts: BTreeMap<&str, usize> = BTreeMap::new();
    for accum in per_product.values() {
        *name_counts.entry(accum.name.as_str()).or_insert(0) += 1;
    }

    let mut products = BTreeMap::new();
    for (product_id, accum) in &per_product {
        let label = if name_counts[accum.name.as_str()] > 1 {
            let mut short = product_id.simple().to_string();
            short.truncate(8);
            format!("{} (#{short})", accum.name)
        } else {
            accum.name.clone()
        };
        let amounts = analytics::zero_fill(&axis, &accum.amounts)
            .into_iter()
            .map(money)
            .collect();
        products.insert(
            label,
            ProductSeries {
                dates: dates.clone(),
                quantities: analytics::zero_fill(&axis, &accum.quantities),
                amounts,
            },
        );
    }

    PurchaseChartData { dates, products }
}

async fn fetch_lead_totals(pool: &PgPool, user_id: Uuid) -> Result<LeadTotals, AppError> {
    let row = sqlx::query_as::<_, LeadTotals>(
        r#"
        SELECT
            COUNT(*) AS total,
            COALESCE(SUM(CASE WHEN status = 'Won'       THEN 1 ELSE 0 END), 0) AS won,
            COALESCE(SUM(CASE WHEN status = 'Lost'      THEN 1 ELSE 0 END), 0) AS lost,
            COALESCE(SUM(CASE WHEN status = 'Contacted' THEN 1 ELSE 0 END), 0) AS contacted
        FROM leads
        WHERE created_by = $1
        "#,
    )
    .bind(user_id)
    .fetch_one(pool)
    .await?;
    Ok(row)
}

async fn fetch_client_count(pool: &PgPool, user_id: Uuid) -> Result<i64, AppError> {
    let count =
        sqlx::query_scalar::<_, i64>("SELECT COUNT(*) FROM clients WHERE created_by = $1")
            .bind(user_id)
            .fetch_one(pool)
            .await?;
    Ok(count)
}

/// Fetch the 5 most recently created leads.
async fn fetch_latest_leads(pool: &PgPool, user_id: Uuid) -> Result<Vec<LeadSummary>, AppError> {
    let rows = sqlx::query_as::<_, LeadSummary>(
        r#"
        SELECT id, first_name, last_name, company, status, priority, created_at
        FROM leads
        WHERE created_by = $1
        ORDER BY created_at DESC
        LIMIT 5
        "#,
    )
    .bind(user_id)
    .fetch_all(pool)
    .await?;
    Ok(rows)
}

/// Fetch the 5 most recently created clients.
async fn fetch_latest_clients(
    pool: &PgPool,
    user_id: Uuid,
) -> Result<Vec<ClientSummary>, AppError> {
    let rows = sqlx::query_as::<_, ClientSummary>(
        r#"
        SELECT id, first_name, last_name, company, converted_from_lead, created_at
        FROM clients
        WHERE created_by = $1
        ORDER BY created_at DESC
        LIMIT 5
        "#,
    )
    .bind(user_id)
    .fetch_all(pool)
    .await?;
    Ok(rows)
}

/// Leads per UTC calendar day and status within the window.
async fn fetch_lead_buckets(
    pool: &PgPool,
    user_id: Uuid,
    cutoff: Option<DateTime<Utc>>,
) -> Result<Vec<LeadBucket>, AppError> {
    let rows = sqlx::query_as::<_, LeadBucket>(
        r#"
        SELECT (created_at AT TIME ZONE 'UTC')::date AS date, status, COUNT(*) AS count
        FROM leads
        WHERE created_by = $1
          AND ($2::timestamptz IS NULL OR created_at >= $2)
        GROUP BY 1, 2
        ORDER BY 1
        "#,
    )
    .bind(user_id)
    .bind(cutoff)
    .fetch_all(pool)
    .await?;
    Ok(rows)
}

/// Clients per UTC calendar day within the window.
async fn fetch_client_buckets(
    pool: &PgPool,
    user_id: Uuid,
    cutoff: Option<DateTime<Utc>>,
) -> Result<Vec<DateBucket>, AppError> {
    let rows = sqlx::query_as::<_, DateBucket>(
        r#"
        SELECT (created_at AT TIME ZONE 'UTC')::date AS date, COUNT(*) AS count
        FROM clients
        WHERE created_by = $1
          AND ($2::timestamptz IS NULL OR created_at >= $2)
        GROUP BY 1
        ORDER BY 1
        "#,
    )
    .bind(user_id)
    .bind(cutoff)
    .fetch_all(pool)
    .await?;
    Ok(rows)
}

/// Purchases per UTC calendar day and product within the window.
///
/// Amounts use the product's current net price, so the sums here move
/// when the catalog price is edited.
async fn fetch_purchase_buckets(
    pool: &PgPool,
    user_id: Uuid,
    cutoff: Option<DateTime<Utc>>,
    product_id: Option<Uuid>,
) -> Result<Vec<PurchaseBucket>, AppError> {
    let rows = sqlx::query_as::<_, PurchaseBucket>(
        r#"
        SELECT
            (pu.created_at AT TIME ZONE 'UTC')::date AS date,
            pr.id AS product_id,
            pr.name AS product_name,
            SUM(pu.quantity)::bigint AS quantity,
            SUM(pu.quantity * pr.net_price) AS amount
        FROM purchases pu
        JOIN products pr ON pr.id = pu.product_id
        WHERE pu.created_by = $1
          AND ($2::timestamptz IS NULL OR pu.created_at >= $2)
          AND ($3::uuid IS NULL OR pu.product_id = $3)
        GROUP BY 1, pr.id, pr.name
        ORDER BY 1
        "#,
    )
    .bind(user_id)
    .bind(cutoff)
    .bind(product_id)
    .fetch_all(pool)
    .await?;
    Ok(rows)
}

/// Revenue and item totals over the filtered purchase set.
async fn fetch_purchase_totals(
    pool: &PgPool,
    user_id: Uuid,
    cutoff: Option<DateTime<Utc>>,
    product_id: Option<Uuid>,
) -> Result<PurchaseTotals, AppError> {
    let row = sqlx::query_as::<_, PurchaseTotals>(
        r#"
        SELECT
            COALESCE(SUM(pu.quantity), 0)::bigint AS total_items,
            COALESCE(SUM(pu.quantity * pr.net_price), 0) AS total_revenue
        FROM purchases pu
        JOIN products pr ON pr.id = pu.product_id
        WHERE pu.created_by = $1
          AND ($2::timestamptz IS NULL OR pu.created_at >= $2)
          AND ($3::uuid IS NULL OR pu.product_id = $3)
        "#,
    )
    .bind(user_id)
    .bind(cutoff)
    .bind(product_id)
    .fetch_one(pool)
    .await?;
    Ok(row)
}

/// Full catalog for the product selector control.
async fn fetch_product_refs(pool: &PgPool) -> Result<Vec<ProductRef>, AppError> {
    let rows =
        sqlx::query_as::<_, ProductRef>("SELECT id, name FROM products ORDER BY name, id")
            .fetch_all(pool)
            .await?;
    Ok(rows)
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    fn day(s: &str) -> NaiveDate {
        NaiveDate::parse_from_str(s, "%Y-%m-%d").unwrap()
    }

    #[test]
    fn product_filter_parsing() {
        assert_eq!(ProductFilter::parse(None), ProductFilter::All);
        assert_eq!(ProductFilter::parse(Some("all")), ProductFilter::All);
        let id = Uuid::new_v4();
        assert_eq!(
            ProductFilter::parse(Some(&id.to_string())),
            ProductFilter::Id(id)
        );
        assert_eq!(
            ProductFilter::parse(Some("stale-selection")),
            ProductFilter::Unmatched
        );
    }

    #[test]
    fn entity_series_align_to_shared_axis() {
        // Leads on day 1 (New) and day 3 (Won), a client on day 2.
        let lead_buckets = vec![
            LeadBucket {
                date: day("2024-01-01"),
                status: LeadStatus::New,
                count: 1,
            },
            LeadBucket {
                date: day("2024-01-03"),
                status: LeadStatus::Won,
                count: 1,
            },
        ];
        let client_buckets = vec![DateBucket {
            date: day("2024-01-02"),
            count: 1,
        }];

        let (axis, leads, clients, status) = align_entity_series(&lead_buckets, &client_buckets);
        assert_eq!(
            analytics::format_axis(&axis),
            vec!["2024-01-01", "2024-01-02", "2024-01-03"]
        );
        assert_eq!(leads, vec![1, 0, 1]);
        assert_eq!(clients, vec![0, 1, 0]);
        assert_eq!(status.won, vec![0, 0, 1]);
        assert_eq!(status.lost, vec![0, 0, 0]);
        assert_eq!(status.contacted, vec![0, 0, 0]);
    }

    #[test]
    fn status_buckets_roll_up_into_overall_lead_series() {
        let lead_buckets = vec![
            LeadBucket {
                date: day("2024-02-01"),
                status: LeadStatus::Won,
                count: 2,
            },
            LeadBucket {
                date: day("2024-02-01"),
                status: LeadStatus::Lost,
                count: 1,
            },
        ];
        let (_, leads, _, status) = align_entity_series(&lead_buckets, &[]);
        assert_eq!(leads, vec![3]);
        assert_eq!(status.won, vec![2]);
        assert_eq!(status.lost, vec![1]);
    }

    #[test]
    fn purchase_chart_zero_fills_each_product() {
        let widget = Uuid::new_v4();
        let gadget = Uuid::new_v4();
        let buckets = vec![
            PurchaseBucket {
                date: day("2024-03-01"),
                product_id: widget,
                product_name: "Widget".to_string(),
                quantity: 3,
                amount: dec!(30.00),
            },
            PurchaseBucket {
                date: day("2024-03-02"),
                product_id: gadget,
                product_name: "Gadget".to_string(),
                quantity: 5,
                amount: dec!(62.50),
            },
        ];

        let chart = assemble_purchase_chart(&buckets);
        assert_eq!(chart.dates, vec!["2024-03-01", "2024-03-02"]);
        let widget_series = &chart.products["Widget"];
        assert_eq!(widget_series.quantities, vec![3, 0]);
        assert_eq!(widget_series.amounts, vec![dec!(30.00), dec!(0)]);
        let gadget_series = &chart.products["Gadget"];
        assert_eq!(gadget_series.dates, chart.dates);
        assert_eq!(gadget_series.quantities, vec![0, 5]);
    }

    #[test]
    fn duplicate_product_names_stay_distinct() {
        let first = Uuid::new_v4();
        let second = Uuid::new_v4();
        let buckets = vec![
            PurchaseBucket {
                date: day("2024-03-01"),
                product_id: first,
                product_name: "Widget".to_string(),
                quantity: 1,
                amount: dec!(10.00),
            },
            PurchaseBucket {
                date: day("2024-03-01"),
                product_id: second,
                product_name: "Widget".to_string(),
                quantity: 2,
                amount: dec!(20.00),
            },
        ];

        let chart = assemble_purchase_chart(&buckets);
        assert_eq!(chart.products.len(), 2);
        assert!(chart.products.keys().all(|k| k.starts_with("Widget (#")));
    }

    #[test]
    fn empty_purchases_produce_empty_chart() {
        let chart = assemble_purchase_chart(&[]);
        assert!(chart.dates.is_empty());
        assert!(chart.products.is_empty());
    }

    #[test]
    fn money_renders_two_places() {
        assert_eq!(money(Decimal::ZERO).to_string(), "0.00");
        assert_eq!(money(dec!(80)).to_string(), "80.00");
        assert_eq!(money(dec!(12.345)).to_string(), "12.34");
        assert_eq!(money(dec!(12.355)).to_string(), "12.36");
    }
}
