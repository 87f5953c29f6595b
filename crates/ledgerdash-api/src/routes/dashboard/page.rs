//! Dashboard page rendering
//!
//! Endpoints:
//! - page_dashboard: totals, entry forms, recent tables and charts
//! - page_edit_transaction: edit form for one income or expense row
//!
//! Section order follows `dashboard.layout`; every user-provided string goes
//! through `escape_html` and chart data is embedded as JSON.

use axum::extract::{Query, State};
use axum::response::Html;
use chrono::Local;
use ledgerdash_config::IconFallback;
use ledgerdash_core::{
    Category, DateRange, Decimal, Report, Reporting, Totals, TransactionRow, Variant, MONTH_LABELS,
};
use ledgerdash_utils::escape_html;
use serde::Serialize;
use std::collections::HashMap;

use super::{dashboard_url, parse_id, parse_variant, Flash};
use crate::routes::{field, range_query, requested_range, url_with_query};
use crate::{ApiError, AppState, CurrentUser};

/// Categories and recent rows for one variant
struct VariantData {
    variant: Variant,
    categories: Vec<Category>,
    recent: Vec<TransactionRow>,
}

/// Dashboard page
pub async fn page_dashboard(
    State(state): State<AppState>,
    user: CurrentUser,
    Query(params): Query<HashMap<String, String>>,
) -> Result<Html<String>, ApiError> {
    let range = requested_range(&state, &params);
    let dashboard = &state.config.dashboard;

    let report = state.store.report(user.id, &range).await?;
    let mut sides = Vec::with_capacity(2);
    for variant in Variant::ALL {
        sides.push(VariantData {
            variant,
            categories: state.store.list_categories(user.id, variant).await?,
            recent: state
                .store
                .list_recent_in(user.id, variant, &range, dashboard.recent_limit)
                .await?,
        });
    }

    let layout = dashboard.layout;
    let forms = render_entry_forms(&state, &sides, &range);
    let tables = render_recent_tables(&state, &sides, &range);
    let charts = render_charts(&report);
    let category_form = render_category_form(&range);

    let mut html = String::new();
    if let Some(flash) = Flash::from_code(field(&params, "msg")) {
        html.push_str(&render_flash(flash));
    }
    html.push_str(&render_totals(&state, &report.totals, &range));
    if dashboard.date_filter_enabled() {
        html.push_str(&render_date_filter(&range));
    }
    if layout.charts_first() {
        html.push_str(&charts);
    }
    html.push_str(&forms);
    if layout.inline_category_form() {
        html.push_str(&category_form);
    }
    html.push_str(&tables);
    if !layout.charts_first() {
        html.push_str(&charts);
    }
    if !layout.inline_category_form() {
        html.push_str(&render_settings_panel(&category_form));
    }

    Ok(crate::page_response(&user, "Dashboard", &html))
}

/// Edit form for one transaction
pub async fn page_edit_transaction(
    State(state): State<AppState>,
    user: CurrentUser,
    Query(params): Query<HashMap<String, String>>,
) -> Result<Html<String>, ApiError> {
    let variant = parse_variant(field(&params, "type"))?;
    let id = parse_id(field(&params, "id"))?;
    let row = state.store.transaction(user.id, variant, id).await?;
    let categories = state.store.list_categories(user.id, variant).await?;
    let range = DateRange::from_query(field(&params, "from"), field(&params, "to"));
    let fallback = state.config.dashboard.icon_fallback;

    let inner = format!(
        r#"<div class='max-w-lg mx-auto bg-white rounded-xl shadow-sm p-6'>
            <h2 class='text-xl font-bold mb-4'>Edit {}</h2>
            <form method='post' action='/dashboard' class='space-y-4'>
                <input type='hidden' name='action' value='edit_txn'>
                <input type='hidden' name='type' value='{}'>
                <input type='hidden' name='id' value='{}'>
                {}
                <div>
                    <label class='block text-sm font-medium text-gray-700 mb-1'>Amount</label>
                    <input type='number' name='amount' step='0.01' min='0.01' required value='{}' class='w-full px-3 py-2 border rounded-lg'>
                </div>
                <div>
                    <label class='block text-sm font-medium text-gray-700 mb-1'>Category</label>
                    <select name='category_id' class='w-full px-3 py-2 border rounded-lg bg-white'>{}</select>
                </div>
                <div>
                    <label class='block text-sm font-medium text-gray-700 mb-1'>Note</label>
                    <input type='text' name='note' value='{}' class='w-full px-3 py-2 border rounded-lg'>
                </div>
                <div>
                    <label class='block text-sm font-medium text-gray-700 mb-1'>Date</label>
                    <input type='date' name='created_at' value='{}' class='w-full px-3 py-2 border rounded-lg'>
                </div>
                <div class='flex justify-end gap-2'>
                    <a href='{}' class='px-4 py-2 border rounded-lg hover:bg-gray-50'>Cancel</a>
                    <button type='submit' class='px-4 py-2 bg-indigo-600 text-white rounded-lg hover:bg-indigo-700'>Save</button>
                </div>
            </form>
        </div>"#,
        variant.label(),
        variant,
        row.id,
        hidden_range(&range),
        row.amount,
        category_options(&categories, variant, fallback, row.category_id),
        escape_html(row.note.as_deref().unwrap_or("")),
        row.created_at,
        escape_html(&dashboard_url(&state, &range, None)),
    );

    Ok(crate::page_response(&user, &format!("Edit {}", variant.label()), &inner))
}

// ==================== Sections ====================

fn render_flash(flash: Flash) -> String {
    format!(
        "<div class='px-4 py-3 rounded-lg bg-green-50 border border-green-200 text-green-800'>{}</div>",
        flash.message()
    )
}

fn render_totals(state: &AppState, totals: &Totals, range: &DateRange) -> String {
    let balance_class = if totals.balance < Decimal::ZERO { "text-red-600" } else { "text-green-600" };
    format!(
        r#"<section>
            <p class='text-sm text-gray-500 mb-2'>{}</p>
            <div class='grid grid-cols-1 md:grid-cols-3 gap-4'>
                <div class='bg-white p-4 rounded-xl shadow-sm border-l-4 border-green-500'>
                    <p class='text-sm text-gray-500'>Total Income</p>
                    <p class='text-2xl font-bold text-green-600' id='total-income'>{}</p>
                </div>
                <div class='bg-white p-4 rounded-xl shadow-sm border-l-4 border-red-500'>
                    <p class='text-sm text-gray-500'>Total Expense</p>
                    <p class='text-2xl font-bold text-red-600' id='total-expense'>{}</p>
                </div>
                <div class='bg-white p-4 rounded-xl shadow-sm border-l-4 border-indigo-500'>
                    <p class='text-sm text-gray-500'>Balance</p>
                    <p class='text-2xl font-bold {}' id='balance'>{}</p>
                </div>
            </div>
        </section>"#,
        escape_html(&range.description()),
        state.money(totals.income),
        state.money(totals.expense),
        balance_class,
        state.money(totals.balance),
    )
}

fn render_date_filter(range: &DateRange) -> String {
    let presets = [
        ("month", "This month"),
        ("quarter", "This quarter"),
        ("year", "This year"),
        ("all", "All time"),
    ];
    let links: String = presets
        .iter()
        .map(|(key, label)| {
            format!(
                "<a href='/dashboard?range={}' class='px-3 py-1.5 text-sm border rounded-lg hover:bg-gray-50'>{}</a>",
                key, label
            )
        })
        .collect();

    format!(
        r#"<form method='get' action='/dashboard' id='date-filter' class='flex flex-wrap items-center gap-3 p-3 bg-white rounded-lg border shadow-sm'>
            <label class='text-sm text-gray-600'>From <input type='date' name='from' value='{}' class='ml-1 px-2 py-1.5 text-sm border rounded'></label>
            <label class='text-sm text-gray-600'>To <input type='date' name='to' value='{}' class='ml-1 px-2 py-1.5 text-sm border rounded'></label>
            <button type='submit' class='px-3 py-1.5 bg-indigo-600 text-white text-sm rounded-lg hover:bg-indigo-700'>Apply</button>
            <div class='flex-1'></div>
            {}
        </form>"#,
        range.from_param(),
        range.to_param(),
        links
    )
}

fn render_entry_forms(state: &AppState, sides: &[VariantData], range: &DateRange) -> String {
    let today = Local::now().date_naive();
    let fallback = state.config.dashboard.icon_fallback;
    let forms: String = sides
        .iter()
        .map(|side| {
            let button_class = match side.variant {
                Variant::Income => "bg-green-600 hover:bg-green-700",
                Variant::Expense => "bg-red-600 hover:bg-red-700",
            };
            format!(
                r#"<form method='post' action='/dashboard' class='bg-white rounded-xl shadow-sm p-4 space-y-3'>
                    <h3 class='font-semibold'>Add {}</h3>
                    <input type='hidden' name='action' value='add_txn'>
                    <input type='hidden' name='type' value='{}'>
                    {}
                    <input type='number' name='amount' step='0.01' min='0.01' required placeholder='Amount' class='w-full px-3 py-2 border rounded-lg'>
                    <select name='category_id' class='w-full px-3 py-2 border rounded-lg bg-white'>{}</select>
                    <input type='text' name='note' placeholder='Note' class='w-full px-3 py-2 border rounded-lg'>
                    <input type='date' name='created_at' value='{}' class='w-full px-3 py-2 border rounded-lg'>
                    <button type='submit' class='w-full px-4 py-2 text-white rounded-lg {}'>Add {}</button>
                </form>"#,
                side.variant.label(),
                side.variant,
                hidden_range(range),
                category_options(&side.categories, side.variant, fallback, None),
                today,
                button_class,
                side.variant.label(),
            )
        })
        .collect();
    format!("<section class='grid grid-cols-1 md:grid-cols-2 gap-4'>{}</section>", forms)
}

fn render_category_form(range: &DateRange) -> String {
    format!(
        r#"<form method='post' action='/dashboard' id='category-form' class='bg-white rounded-xl shadow-sm p-4 flex flex-wrap items-end gap-3'>
            <input type='hidden' name='action' value='add_category'>
            {}
            <div>
                <label class='block text-xs text-gray-500 mb-1'>Type</label>
                <select name='category_type' class='px-3 py-2 border rounded-lg bg-white'>
                    <option value='income'>Income</option>
                    <option value='expense'>Expense</option>
                </select>
            </div>
            <div class='flex-1 min-w-[10rem]'>
                <label class='block text-xs text-gray-500 mb-1'>Name</label>
                <input type='text' name='category_name' required class='w-full px-3 py-2 border rounded-lg'>
            </div>
            <div class='w-24'>
                <label class='block text-xs text-gray-500 mb-1'>Icon</label>
                <input type='text' name='icon' placeholder='🛒' class='w-full px-3 py-2 border rounded-lg'>
            </div>
            <button type='submit' class='px-4 py-2 bg-indigo-600 text-white rounded-lg hover:bg-indigo-700'>Add category</button>
        </form>"#,
        hidden_range(range)
    )
}

fn render_settings_panel(category_form: &str) -> String {
    format!(
        r#"<details class='bg-gray-100 rounded-xl p-4'>
            <summary class='cursor-pointer font-semibold text-gray-700'>⚙️ Settings</summary>
            <div class='mt-4'>{}</div>
        </details>"#,
        category_form
    )
}

fn render_recent_tables(state: &AppState, sides: &[VariantData], range: &DateRange) -> String {
    let fallback = state.config.dashboard.icon_fallback;
    let tables: String = sides
        .iter()
        .map(|side| {
            let rows = if side.recent.is_empty() {
                format!(
                    "<tr><td colspan='5' class='px-3 py-6 text-center text-gray-400'>No {} recorded in this period.</td></tr>",
                    side.variant
                )
            } else {
                side.recent
                    .iter()
                    .map(|row| render_recent_row(state, side.variant, row, fallback, range))
                    .collect()
            };
            format!(
                r#"<div class='bg-white rounded-xl shadow-sm p-4 overflow-x-auto'>
                    <h3 class='font-semibold mb-3'>Recent {}</h3>
                    <table class='w-full text-sm' id='recent-{}'>
                        <thead><tr class='text-left text-gray-500 border-b'>
                            <th class='px-3 py-2'>Date</th><th class='px-3 py-2'>Category</th><th class='px-3 py-2'>Note</th>
                            <th class='px-3 py-2 text-right'>Amount</th><th class='px-3 py-2'></th>
                        </tr></thead>
                        <tbody>{}</tbody>
                    </table>
                </div>"#,
                side.variant.label(),
                side.variant,
                rows
            )
        })
        .collect();
    format!("<section class='grid grid-cols-1 lg:grid-cols-2 gap-4'>{}</section>", tables)
}

fn render_recent_row(
    state: &AppState,
    variant: Variant,
    row: &TransactionRow,
    fallback: IconFallback,
    range: &DateRange,
) -> String {
    let mut edit_query = vec![("type", variant.to_string()), ("id", row.id.to_string())];
    edit_query.extend(range_query(state, range));
    let edit_url = url_with_query("/dashboard/edit", &edit_query);

    format!(
        r#"<tr class='border-b last:border-0'>
            <td class='px-3 py-2 whitespace-nowrap'>{}</td>
            <td class='px-3 py-2'>{}</td>
            <td class='px-3 py-2 text-gray-600'>{}</td>
            <td class='px-3 py-2 text-right font-mono'>{}</td>
            <td class='px-3 py-2 whitespace-nowrap text-right'>
                <a href='{}' class='text-indigo-600 hover:underline'>Edit</a>
                <form method='post' action='/dashboard' class='inline' onsubmit="return confirm('Delete this entry?');">
                    <input type='hidden' name='action' value='delete_txn'>
                    <input type='hidden' name='type' value='{}'>
                    <input type='hidden' name='id' value='{}'>
                    {}
                    <button type='submit' class='ml-2 text-red-600 hover:underline'>Delete</button>
                </form>
            </td>
        </tr>"#,
        row.created_at,
        escape_html(&row.category_label(variant, fallback)),
        escape_html(row.note.as_deref().unwrap_or("")),
        state.money(row.amount),
        escape_html(&edit_url),
        variant,
        row.id,
        hidden_range(range),
    )
}

fn render_charts(report: &Report) -> String {
    let pie = report.pie_chart();
    let pie_body = if pie.labels.is_empty() {
        "<p class='py-12 text-center text-gray-400'>No expenses in this period.</p>".to_string()
    } else {
        "<canvas id='expense-pie'></canvas>".to_string()
    };

    format!(
        r#"<section class='grid grid-cols-1 lg:grid-cols-3 gap-4' id='charts'>
            <div class='bg-white rounded-xl shadow-sm p-4'>
                <h3 class='font-semibold mb-3'>Expenses by category</h3>
                {}
            </div>
            <div class='bg-white rounded-xl shadow-sm p-4 lg:col-span-2'>
                <h3 class='font-semibold mb-3'>Monthly income and expense</h3>
                <canvas id='monthly-bars'></canvas>
            </div>
        </section>
        <script>
        (function() {{
            const pie = {};
            const monthly = {};
            const months = {};
            const pieCanvas = document.getElementById('expense-pie');
            if (pieCanvas && pie.labels.length) {{
                new Chart(pieCanvas, {{ type: 'pie', data: {{ labels: pie.labels, datasets: [{{ data: pie.data }}] }} }});
            }}
            new Chart(document.getElementById('monthly-bars'), {{
                type: 'bar',
                data: {{
                    labels: months,
                    datasets: [
                        {{ label: 'Income', data: monthly.income, backgroundColor: '#10b981' }},
                        {{ label: 'Expense', data: monthly.expense, backgroundColor: '#ef4444' }}
                    ]
                }},
                options: {{ scales: {{ y: {{ beginAtZero: true }} }} }}
            }});
        }})();
        </script>"#,
        pie_body,
        script_json(&pie),
        script_json(&report.monthly_series),
        script_json(&MONTH_LABELS),
    )
}

// ==================== Fragments ====================

fn hidden_range(range: &DateRange) -> String {
    format!(
        "<input type='hidden' name='from' value='{}'><input type='hidden' name='to' value='{}'>",
        range.from_param(),
        range.to_param()
    )
}

fn category_options(
    categories: &[Category],
    variant: Variant,
    fallback: IconFallback,
    selected: Option<i64>,
) -> String {
    let mut options = format!(
        "<option value=''{}>Uncategorized</option>",
        if selected.is_none() { " selected" } else { "" }
    );
    for category in categories {
        options.push_str(&format!(
            "<option value='{}'{}>{}</option>",
            category.id,
            if selected == Some(category.id) { " selected" } else { "" },
            escape_html(&category.label(variant, fallback))
        ));
    }
    options
}

/// JSON safe to place inside a `<script>` element
fn script_json<T: Serialize + ?Sized>(value: &T) -> String {
    serde_json::to_string(value)
        .unwrap_or_else(|_| "null".to_string())
        .replace('<', "\\u003c")
}
