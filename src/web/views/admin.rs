//! Administration pages.

use super::{error_banner, escape, link, page, passenger::category_label, select, table};
use crate::{
    core::{
        application::{ApplicationDetail, ApplicationSummary},
        fare_type::FareTypeWithTariff,
        report::{CategoryStats, DashboardSummary, FareUsageReport, Period, format_money},
    },
    entities::{ApplicationStatus, ExemptionCategory},
};
use axum::response::Html;
use sea_orm::Iterable;

/// Raw field values the fare type form is rendered with.
#[derive(Debug, Default, Clone, Copy)]
pub struct FareTypeFormValues<'a> {
    /// Fare type name
    pub name: &'a str,
    /// Description as typed
    pub description: &'a str,
    /// Validity as typed
    pub validity: &'a str,
    /// Base price as typed
    pub base_price: &'a str,
    /// Discount rate as typed
    pub discount_rate: &'a str,
}

/// Admin landing page.
#[must_use]
pub fn dashboard(summary: &DashboardSummary) -> Html<String> {
    let statuses: Vec<Vec<String>> = summary
        .status_counts
        .iter()
        .map(|(status, count)| {
            vec![
                link(
                    &format!("/admin/exemption-applications?status={status}"),
                    &status.to_string(),
                ),
                count.to_string(),
            ]
        })
        .collect();
    let tickets: Vec<Vec<String>> = summary
        .recent_tickets
        .iter()
        .map(|t| {
            vec![
                t.id.to_string(),
                t.purchase_date.to_string(),
                escape(&t.passenger_name),
                escape(&t.fare_type_name),
                format_money(t.price),
            ]
        })
        .collect();
    let activity: Vec<Vec<String>> = summary
        .recent_activity
        .iter()
        .map(|a| {
            vec![
                a.created_at.format("%Y-%m-%d %H:%M").to_string(),
                escape(&a.activity_type),
                escape(&a.description),
            ]
        })
        .collect();

    page(
        "Administration",
        &format!(
            "<p>{} fare types &middot; {} &middot; {} &middot; {}</p>\
             <h2>Applications</h2>{}\
             <h2>Recent tickets</h2>{}\
             <h2>Recent activity</h2>{}",
            summary.fare_type_count,
            link("/admin/fare-types", "Manage fare types"),
            link("/admin/reports/fare-usage", "Fare usage report"),
            link("/admin/reports/exemption-stats", "Exemption statistics"),
            table(&["Status", "Count"], &statuses, ""),
            table(
                &["Ticket", "Date", "Passenger", "Fare type", "Price"],
                &tickets,
                "No tickets sold yet."
            ),
            table(&["When", "Type", "Description"], &activity, "No activity yet."),
        ),
    )
}

/// Fare types with their tariffs.
#[must_use]
pub fn fare_types_list(fare_types: &[FareTypeWithTariff]) -> Html<String> {
    let rows: Vec<Vec<String>> = fare_types
        .iter()
        .map(|f| {
            vec![
                escape(&f.fare_type.name),
                escape(&f.fare_type.description),
                escape(&f.fare_type.validity),
                format_money(f.tariff.base_price),
                format!("{}%", f.tariff.discount_rate),
                format!(
                    "{} {}",
                    link(&format!("/admin/fare-types/{}/edit", f.fare_type.id), "Edit"),
                    link(&format!("/admin/fare-types/{}/delete", f.fare_type.id), "Delete")
                ),
            ]
        })
        .collect();
    page(
        "Fare types",
        &format!(
            "<p>{}</p>{}",
            link("/admin/fare-types/create", "Create fare type"),
            table(
                &["Name", "Description", "Validity", "Base price", "Discount", ""],
                &rows,
                "No fare types defined yet."
            )
        ),
    )
}

/// Create and edit share one form; `action` tells them apart.
#[must_use]
pub fn fare_type_form(
    title: &str,
    action: &str,
    values: FareTypeFormValues<'_>,
    error: Option<&str>,
) -> Html<String> {
    page(
        title,
        &format!(
            "{}<form method=\"post\" action=\"{}\">\
             <label for=\"type_name\">Name</label>\
             <input id=\"type_name\" name=\"type_name\" value=\"{}\" required>\
             <label for=\"description\">Description</label>\
             <input id=\"description\" name=\"description\" value=\"{}\" required>\
             <label for=\"validity\">Validity</label>\
             <input id=\"validity\" name=\"validity\" value=\"{}\" required>\
             <label for=\"base_price\">Base price</label>\
             <input id=\"base_price\" name=\"base_price\" value=\"{}\" required>\
             <label for=\"discount_rate\">Discount rate (%)</label>\
             <input id=\"discount_rate\" name=\"discount_rate\" value=\"{}\" required>\
             <p><button type=\"submit\">Save</button> {}</p></form>",
            error_banner(error),
            escape(action),
            escape(values.name),
            escape(values.description),
            escape(values.validity),
            escape(values.base_price),
            escape(values.discount_rate),
            link("/admin/fare-types", "Cancel"),
        ),
    )
}

/// Confirmation page for deleting a fare type, warning when tickets use it.
#[must_use]
pub fn delete_confirm(
    fare_type: &FareTypeWithTariff,
    ticket_count: u64,
    error: Option<&str>,
) -> Html<String> {
    let warning = if ticket_count > 0 {
        format!(
            "<p class=\"error\">{ticket_count} ticket(s) were sold with this fare type; \
             it cannot be deleted while they exist.</p>"
        )
    } else {
        String::new()
    };
    page(
        "Delete fare type",
        &format!(
            "{}<p>Delete fare type <strong>{}</strong> and its tariff?</p>{warning}\
             <form method=\"post\" action=\"/admin/fare-types/{}/delete\">\
             <input type=\"hidden\" name=\"confirm\" value=\"true\">\
             <button type=\"submit\">Delete</button> {}</form>",
            error_banner(error),
            escape(&fare_type.fare_type.name),
            fare_type.fare_type.id,
            link("/admin/fare-types", "Cancel"),
        ),
    )
}

/// Application list with status filter links.
#[must_use]
pub fn applications_list(
    applications: &[ApplicationSummary],
    current: Option<ApplicationStatus>,
) -> Html<String> {
    let mut filters = vec![link("/admin/exemption-applications", "All")];
    filters.extend(ApplicationStatus::iter().map(|status| {
        let label = status.to_string();
        if Some(status) == current {
            format!("<strong>{}</strong>", escape(&label))
        } else {
            link(
                &format!("/admin/exemption-applications?status={label}"),
                &label,
            )
        }
    }));

    let rows: Vec<Vec<String>> = applications
        .iter()
        .map(|s| {
            vec![
                link(
                    &format!("/admin/exemption-applications/{}", s.application.id),
                    &s.application.id.to_string(),
                ),
                s.application.submitted_date.to_string(),
                escape(&s.passenger_name),
                escape(&s.application.category.to_string()),
                escape(&s.fare_type_name),
                escape(&s.application.status.to_string()),
            ]
        })
        .collect();

    page(
        "Exemption applications",
        &format!(
            "<p>{}</p>{}",
            filters.join(" | "),
            table(
                &["ID", "Submitted", "Passenger", "Category", "Fare type", "Status"],
                &rows,
                "No applications found."
            )
        ),
    )
}

/// Review page with documents, validation and decision forms.
#[must_use]
pub fn application_detail(
    detail: &ApplicationDetail,
    fare_types: &[FareTypeWithTariff],
    error: Option<&str>,
) -> Html<String> {
    let app = &detail.application;
    let documents: Vec<Vec<String>> = detail
        .documents
        .iter()
        .map(|d| {
            vec![
                escape(&d.document_type),
                escape(&d.content_type),
                link(&format!("/admin/documents/{}", d.id), "Open"),
            ]
        })
        .collect();

    let mut actions = String::new();
    if matches!(app.status, ApplicationStatus::Submitted | ApplicationStatus::Pending) {
        actions.push_str(&format!(
            "<form method=\"post\" action=\"/admin/exemption-applications/{}/validate\">\
             <button type=\"submit\">Mark documents as validated</button></form>",
            app.id
        ));
    }
    if app.status.is_open() {
        let fares = fare_types
            .iter()
            .map(|f| (f.fare_type.id.to_string(), f.fare_type.name.as_str()));
        let categories =
            ExemptionCategory::iter().map(|c| (c.to_string(), category_label(c)));
        let requested_fare = app.fare_type_id.to_string();
        let requested_category = app.category.to_string();
        actions.push_str(&format!(
            "<form method=\"post\" action=\"/admin/exemption-applications/{id}/process\">\
             <label for=\"fare_type_id\">Fare type</label>{}\
             <label for=\"exemption_category\">Category</label>{}\
             <p><button type=\"submit\" name=\"decision\" value=\"Approved\">Approve</button> \
             <button type=\"submit\" name=\"decision\" value=\"Rejected\">Reject</button></p></form>",
            select("fare_type_id", fares, Some(requested_fare.as_str())),
            select("exemption_category", categories, Some(requested_category.as_str())),
            id = app.id,
        ));
    }

    page(
        &format!("Application #{}", app.id),
        &format!(
            "{}<table>\
             <tr><th>Passenger</th><td>{} ({})</td></tr>\
             <tr><th>Submitted</th><td>{}</td></tr>\
             <tr><th>Category</th><td>{}</td></tr>\
             <tr><th>Requested fare type</th><td>{}</td></tr>\
             <tr><th>Status</th><td>{}</td></tr></table>\
             <h2>Documents</h2>{}{actions}<p>{}</p>",
            error_banner(error),
            escape(&detail.passenger.full_name),
            escape(&detail.passenger.email),
            app.submitted_date,
            escape(&app.category.to_string()),
            escape(&detail.fare_type.name),
            escape(&app.status.to_string()),
            table(&["Description", "Type", ""], &documents, "No documents."),
            link("/admin/exemption-applications", "Back to applications"),
        ),
    )
}

/// Fare usage report with its date range form.
#[must_use]
pub fn fare_usage(report: &FareUsageReport) -> Html<String> {
    let rows: Vec<Vec<String>> = report
        .rows
        .iter()
        .map(|r| {
            vec![
                r.purchase_date.to_string(),
                escape(&r.fare_type_name),
                r.tickets_sold.to_string(),
                format_money(r.revenue),
            ]
        })
        .collect();
    page(
        "Fare usage",
        &format!(
            "<form method=\"get\" action=\"/admin/reports/fare-usage\">\
             <label for=\"start_date\">From</label>\
             <input id=\"start_date\" name=\"start_date\" type=\"date\" value=\"{}\">\
             <label for=\"end_date\">To</label>\
             <input id=\"end_date\" name=\"end_date\" type=\"date\" value=\"{}\">\
             <p><button type=\"submit\">Show</button></p></form>{}\
             <p>Total: {} tickets, revenue {}</p>",
            report.start,
            report.end,
            table(
                &["Date", "Fare type", "Tickets sold", "Revenue"],
                &rows,
                "No tickets sold in this period."
            ),
            report.total_tickets,
            format_money(report.total_revenue),
        ),
    )
}

/// Approval statistics per category with period links.
#[must_use]
pub fn exemption_stats(stats: &[CategoryStats], period: Period) -> Html<String> {
    let periods = [Period::Week, Period::Month, Period::Year, Period::All]
        .iter()
        .map(|p| {
            if *p == period {
                format!("<strong>{}</strong>", p.as_str())
            } else {
                link(
                    &format!("/admin/reports/exemption-stats?period={}", p.as_str()),
                    p.as_str(),
                )
            }
        })
        .collect::<Vec<_>>()
        .join(" | ");
    let rows: Vec<Vec<String>> = stats
        .iter()
        .map(|s| {
            vec![
                escape(category_label(s.category)),
                s.total_applications.to_string(),
                s.approved.to_string(),
                format!("{:.1}%", s.approval_rate),
            ]
        })
        .collect();
    page(
        "Exemption statistics",
        &format!(
            "<p>Period: {periods}</p>{}",
            table(
                &["Category", "Applications", "Approved", "Approval rate"],
                &rows,
                "No applications in this period."
            )
        ),
    )
}
