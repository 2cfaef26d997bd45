//! Report generation business logic.
//!
//! Aggregates are computed in SQL through the persistence gateway and
//! returned as plain structs; rates and totals are derived here so the web
//! layer only formats them.

use crate::{
    core::activity,
    db::{fetch_all, fetch_one, statement},
    entities::{ApplicationStatus, ExemptionCategory, activity_log},
    errors::{Error, Result},
};
use chrono::Days;
use sea_orm::{ConnectionTrait, FromQueryResult, Iterable, Value, prelude::Date};

/// Tickets shown on the admin dashboard.
pub const DASHBOARD_TICKETS: i64 = 5;
/// Activity entries shown on the admin dashboard.
pub const DASHBOARD_ACTIVITY: u64 = 10;
/// Days covered by the fare usage report when no range is given.
pub const DEFAULT_USAGE_DAYS: u64 = 30;

/// A recently issued ticket with display names.
#[derive(Debug, Clone, PartialEq, FromQueryResult)]
pub struct RecentTicket {
    /// Ticket id
    pub id: i64,
    /// Day of purchase
    pub purchase_date: Date,
    /// Price paid
    pub price: f64,
    /// Buyer's full name
    pub passenger_name: String,
    /// Fare type sold
    pub fare_type_name: String,
}

/// Overview shown on the admin landing page.
#[derive(Debug, Clone)]
pub struct DashboardSummary {
    /// Number of fare types defined
    pub fare_type_count: i64,
    /// Every status in declaration order, zero when no application has it
    pub status_counts: Vec<(ApplicationStatus, i64)>,
    /// Newest first
    pub recent_tickets: Vec<RecentTicket>,
    /// Newest first
    pub recent_activity: Vec<activity_log::Model>,
}

#[derive(Debug, FromQueryResult)]
struct CountRow {
    count: i64,
}

#[derive(Debug, FromQueryResult)]
struct StatusCountRow {
    status: ApplicationStatus,
    count: i64,
}

/// Collects the admin dashboard figures.
pub async fn dashboard_summary<C>(db: &C) -> Result<DashboardSummary>
where
    C: ConnectionTrait,
{
    let fare_type_count = fetch_one::<CountRow, _>(
        db,
        statement(db, "SELECT COUNT(*) AS count FROM fare_type", []),
    )
    .await?
    .map_or(0, |row| row.count);

    let by_status: Vec<StatusCountRow> = fetch_all(
        db,
        statement(
            db,
            "SELECT status, COUNT(*) AS count FROM exemption_application GROUP BY status",
            [],
        ),
    )
    .await?;
    let status_counts = ApplicationStatus::iter()
        .map(|status| {
            let count = by_status
                .iter()
                .find(|row| row.status == status)
                .map_or(0, |row| row.count);
            (status, count)
        })
        .collect();

    let recent_tickets = fetch_all(
        db,
        statement(
            db,
            "SELECT t.id, t.purchase_date, t.price, p.full_name AS passenger_name, \
             f.name AS fare_type_name \
             FROM ticket t \
             JOIN passenger p ON p.id = t.passenger_id \
             JOIN fare_type f ON f.id = t.fare_type_id \
             ORDER BY t.purchase_date DESC, t.id DESC LIMIT ?",
            [DASHBOARD_TICKETS.into()],
        ),
    )
    .await?;

    let recent_activity = activity::recent_activity(db, DASHBOARD_ACTIVITY).await?;

    Ok(DashboardSummary {
        fare_type_count,
        status_counts,
        recent_tickets,
        recent_activity,
    })
}

/// Tickets sold and revenue for one fare type on one day.
#[derive(Debug, Clone, PartialEq, FromQueryResult)]
pub struct FareUsageRow {
    /// Day of purchase
    pub purchase_date: Date,
    /// Fare type sold
    pub fare_type_name: String,
    /// Tickets sold that day
    pub tickets_sold: i64,
    /// Sum of prices paid
    pub revenue: f64,
}

/// Fare usage over an inclusive date range.
#[derive(Debug, Clone, PartialEq)]
pub struct FareUsageReport {
    /// First day, inclusive
    pub start: Date,
    /// Last day, inclusive
    pub end: Date,
    /// Newest day first
    pub rows: Vec<FareUsageRow>,
    /// Sum of `tickets_sold` over all rows
    pub total_tickets: i64,
    /// Sum of `revenue` over all rows
    pub total_revenue: f64,
}

/// The range used when the report is opened without dates.
#[must_use]
pub fn default_usage_range(today: Date) -> (Date, Date) {
    (today - Days::new(DEFAULT_USAGE_DAYS), today)
}

/// Groups ticket sales per purchase day and fare type.
///
/// # Errors
/// `Error::Validation` if `start` is after `end`.
pub async fn fare_usage_report<C>(db: &C, start: Date, end: Date) -> Result<FareUsageReport>
where
    C: ConnectionTrait,
{
    if start > end {
        return Err(Error::validation("Start date must not be after end date"));
    }

    let rows: Vec<FareUsageRow> = fetch_all(
        db,
        statement(
            db,
            "SELECT t.purchase_date, f.name AS fare_type_name, \
             COUNT(t.id) AS tickets_sold, SUM(t.price) AS revenue \
             FROM ticket t \
             JOIN fare_type f ON f.id = t.fare_type_id \
             WHERE t.purchase_date BETWEEN ? AND ? \
             GROUP BY t.purchase_date, f.name \
             ORDER BY t.purchase_date DESC, f.name",
            [start.into(), end.into()],
        ),
    )
    .await?;

    let total_tickets = rows.iter().map(|row| row.tickets_sold).sum();
    let total_revenue = rows.iter().map(|row| row.revenue).sum();

    Ok(FareUsageReport {
        start,
        end,
        rows,
        total_tickets,
        total_revenue,
    })
}

/// Look-back window of the exemption statistics.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Period {
    /// Last 7 days
    Week,
    /// Last 30 days
    Month,
    /// Last 365 days
    Year,
    /// No lower bound
    #[default]
    All,
}

impl Period {
    /// Parses the `period` query value; anything unknown means all time.
    #[must_use]
    pub fn parse(value: Option<&str>) -> Self {
        match value.map(str::trim) {
            Some("week") => Self::Week,
            Some("month") => Self::Month,
            Some("year") => Self::Year,
            _ => Self::All,
        }
    }

    /// Query value for links and forms.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Week => "week",
            Self::Month => "month",
            Self::Year => "year",
            Self::All => "all",
        }
    }

    /// First day counted, `None` for all time.
    #[must_use]
    pub fn start(self, today: Date) -> Option<Date> {
        let days = match self {
            Self::Week => 7,
            Self::Month => 30,
            Self::Year => 365,
            Self::All => return None,
        };
        Some(today - Days::new(days))
    }
}

/// Application outcomes for one exemption category.
#[derive(Debug, Clone, PartialEq)]
pub struct CategoryStats {
    /// Requested category
    pub category: ExemptionCategory,
    /// Applications submitted in the period
    pub total_applications: i64,
    /// Applications with status Approved
    pub approved: i64,
    /// Percent of applications approved
    pub approval_rate: f64,
}

#[derive(Debug, FromQueryResult)]
struct CategoryRow {
    category: ExemptionCategory,
    total_applications: i64,
    approved: i64,
}

/// Percentage of `approved` out of `total`, 0 when there is nothing to rate.
// Cast safety: application counts stay far below 2^52.
#[allow(clippy::cast_precision_loss)]
#[must_use]
pub fn approval_rate(approved: i64, total: i64) -> f64 {
    if total == 0 {
        return 0.0;
    }

    (approved as f64 / total as f64) * 100.0
}

/// Counts applications and approvals per requested category.
pub async fn exemption_statistics<C>(
    db: &C,
    period: Period,
    today: Date,
) -> Result<Vec<CategoryStats>>
where
    C: ConnectionTrait,
{
    let mut sql = String::from(
        "SELECT category, COUNT(*) AS total_applications, \
         COUNT(CASE WHEN status = ? THEN 1 END) AS approved \
         FROM exemption_application",
    );
    let mut values: Vec<Value> = vec![ApplicationStatus::Approved.into()];
    if let Some(start) = period.start(today) {
        sql.push_str(" WHERE submitted_date >= ?");
        values.push(start.into());
    }
    sql.push_str(" GROUP BY category ORDER BY total_applications DESC, category");

    let rows: Vec<CategoryRow> = fetch_all(db, statement(db, &sql, values)).await?;

    Ok(rows
        .into_iter()
        .map(|row| CategoryStats {
            category: row.category,
            total_applications: row.total_applications,
            approved: row.approved,
            approval_rate: approval_rate(row.approved, row.total_applications),
        })
        .collect())
}

/// Formats an amount of money for display, e.g. `"2.50"`.
#[must_use]
pub fn format_money(amount: f64) -> String {
    format!("{amount:.2}")
}

#[cfg(test)]
mod tests {
    #![allow(clippy::unwrap_used)]
    #![allow(clippy::float_cmp)]
    use super::*;
    use crate::{
        core::{
            fare::{TicketOrder, issue_ticket},
            review,
        },
        entities::exemption_application,
        test_utils::*,
    };
    use chrono::NaiveDate;
    use sea_orm::{ActiveModelTrait, Set};

    fn day(y: i32, m: u32, d: u32) -> Date {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    async fn issue(db: &sea_orm::DatabaseConnection, passenger_id: i64, fare_type_id: i64) -> Result<()> {
        issue_ticket(
            db,
            TicketOrder {
                passenger_id,
                fare_type_id,
                exemption_id: None,
                payment_method: "Cash".to_string(),
            },
        )
        .await
        .map(|_| ())
    }

    #[test]
    fn test_approval_rate() {
        assert_eq!(approval_rate(0, 0), 0.0);
        assert_eq!(approval_rate(1, 4), 25.0);
        assert_eq!(approval_rate(3, 3), 100.0);
    }

    #[test]
    fn test_period_parse_and_start() {
        let today = day(2025, 6, 30);
        assert_eq!(Period::parse(Some("week")), Period::Week);
        assert_eq!(Period::parse(Some("decade")), Period::All);
        assert_eq!(Period::parse(None), Period::All);
        assert_eq!(Period::Week.start(today), Some(day(2025, 6, 23)));
        assert_eq!(Period::Month.start(today), Some(day(2025, 5, 31)));
        assert_eq!(Period::Year.start(today), Some(day(2024, 6, 30)));
        assert_eq!(Period::All.start(today), None);
    }

    #[test]
    fn test_default_usage_range() {
        assert_eq!(
            default_usage_range(day(2025, 3, 31)),
            (day(2025, 3, 1), day(2025, 3, 31))
        );
    }

    #[test]
    fn test_format_money() {
        assert_eq!(format_money(2.0), "2.00");
        assert_eq!(format_money(1.334), "1.33");
    }

    #[tokio::test]
    async fn test_dashboard_summary_integration() -> Result<()> {
        let (db, store, _dir) = setup_with_store().await?;
        let ada = create_test_passenger(&db, "Ada Lovelace", "ada@example.com").await?;
        let grace = create_test_passenger(&db, "Grace Hopper", "grace@example.com").await?;
        let fare = create_test_fare_type(&db, "Adult", 2.0, 0.0).await?;
        create_test_fare_type(&db, "Student", 2.0, 50.0).await?;

        let first = create_test_application(&db, &store, ada.id, fare.fare_type.id).await?;
        create_test_application(&db, &store, grace.id, fare.fare_type.id).await?;
        review::reject_application(&db, first.id).await?;

        for _ in 0..7 {
            issue(&db, ada.id, fare.fare_type.id).await?;
        }

        let summary = dashboard_summary(&db).await?;
        assert_eq!(summary.fare_type_count, 2);
        assert_eq!(summary.status_counts.len(), 5);
        assert!(summary
            .status_counts
            .contains(&(ApplicationStatus::Submitted, 1)));
        assert!(summary.status_counts.contains(&(ApplicationStatus::Rejected, 1)));
        assert!(summary.status_counts.contains(&(ApplicationStatus::Approved, 0)));
        assert_eq!(summary.recent_tickets.len(), 5);
        assert_eq!(summary.recent_tickets[0].passenger_name, "Ada Lovelace");
        assert_eq!(summary.recent_tickets[0].fare_type_name, "Adult");
        assert!(summary.recent_tickets[0].id > summary.recent_tickets[1].id);
        assert_eq!(summary.recent_activity.len(), 10);
        Ok(())
    }

    #[tokio::test]
    async fn test_fare_usage_report() -> Result<()> {
        let db = setup_test_db().await?;
        let passenger = create_test_passenger(&db, "Ada Lovelace", "ada@example.com").await?;
        let adult = create_test_fare_type(&db, "Adult", 2.0, 0.0).await?;
        let weekly = create_test_fare_type(&db, "Weekly", 15.0, 0.0).await?;

        issue(&db, passenger.id, adult.fare_type.id).await?;
        issue(&db, passenger.id, adult.fare_type.id).await?;
        issue(&db, passenger.id, weekly.fare_type.id).await?;

        let today = chrono::Local::now().date_naive();
        let (start, end) = default_usage_range(today);
        let report = fare_usage_report(&db, start, end).await?;

        assert_eq!(report.rows.len(), 2);
        assert_eq!(report.rows[0].fare_type_name, "Adult");
        assert_eq!(report.rows[0].tickets_sold, 2);
        assert_eq!(report.rows[0].revenue, 4.0);
        assert_eq!(report.total_tickets, 3);
        assert_eq!(report.total_revenue, 19.0);

        let empty = fare_usage_report(&db, day(2000, 1, 1), day(2000, 1, 31)).await?;
        assert!(empty.rows.is_empty());
        assert_eq!(empty.total_revenue, 0.0);

        assert!(matches!(
            fare_usage_report(&db, today, start).await,
            Err(Error::Validation { .. })
        ));
        Ok(())
    }

    #[tokio::test]
    async fn test_exemption_statistics() -> Result<()> {
        let (db, store, _dir) = setup_with_store().await?;
        let fare = create_test_fare_type(&db, "Adult", 2.0, 10.0).await?;
        let today = chrono::Local::now().date_naive();

        let mut ids = Vec::new();
        for (i, name) in ["Ada Lovelace", "Grace Hopper", "Alan Turing"].iter().enumerate() {
            let p = create_test_passenger(&db, name, &format!("p{i}@example.com")).await?;
            ids.push(create_test_application(&db, &store, p.id, fare.fare_type.id).await?.id);
        }
        review::approve_application(&db, ids[0], fare.fare_type.id, "Student").await?;
        review::reject_application(&db, ids[1]).await?;

        // an old decided application only counts for all time
        let old_passenger = create_test_passenger(&db, "Old Timer", "old@example.com").await?;
        exemption_application::ActiveModel {
            submitted_date: Set(today - Days::new(100)),
            passenger_id: Set(old_passenger.id),
            fare_type_id: Set(fare.fare_type.id),
            category: Set(ExemptionCategory::Senior),
            status: Set(ApplicationStatus::Approved),
            open_for_passenger: Set(None),
            ..Default::default()
        }
        .insert(&db)
        .await?;

        let month = exemption_statistics(&db, Period::Month, today).await?;
        assert_eq!(month.len(), 1);
        assert_eq!(month[0].category, ExemptionCategory::Student);
        assert_eq!(month[0].total_applications, 3);
        assert_eq!(month[0].approved, 1);
        assert!((month[0].approval_rate - 100.0 / 3.0).abs() < 1e-9);

        let all = exemption_statistics(&db, Period::All, today).await?;
        assert_eq!(all.len(), 2);
        assert_eq!(all[1].category, ExemptionCategory::Senior);
        assert_eq!(all[1].approval_rate, 100.0);
        Ok(())
    }
}
