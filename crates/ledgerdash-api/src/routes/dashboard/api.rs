//! Dashboard form actions
//!
//! Every action answers with a redirect back to the dashboard (Post/Redirect/Get).
//! Rejected input and ids the user does not own redirect without a banner.

use axum::extract::State;
use axum::response::Redirect;
use axum::Form;
use ledgerdash_core::{
    parse_amount, parse_category_id, parse_form_date, CoreResult, DateRange, TransactionInput, UserId,
    Variant,
};
use std::collections::HashMap;

use super::{dashboard_url, parse_id, parse_variant, Flash};
use crate::routes::field;
use crate::{ApiError, AppState, CurrentUser};

/// POST /dashboard
pub async fn dashboard_action(
    State(state): State<AppState>,
    user: CurrentUser,
    Form(form): Form<HashMap<String, String>>,
) -> Result<Redirect, ApiError> {
    let range = DateRange::from_query(field(&form, "from"), field(&form, "to"));
    let action = field(&form, "action");

    let flash = match apply_action(&state, user.id, action, &form).await {
        Ok(flash) => flash,
        Err(e) if e.is_user_error() => {
            log::warn!(target: "ledgerdash::api", "Ignored {} from user {}: {}", action, user.id, e);
            None
        }
        Err(e) => return Err(e.into()),
    };

    Ok(Redirect::to(&dashboard_url(&state, &range, flash)))
}

async fn apply_action(
    state: &AppState,
    user: UserId,
    action: &str,
    form: &HashMap<String, String>,
) -> CoreResult<Option<Flash>> {
    let store = &state.store;
    match action {
        "add_txn" => {
            let variant = parse_variant(field(form, "type"))?;
            store.add_transaction(user, variant, transaction_input(form)?).await?;
            Ok(Some(Flash::added(variant)))
        }
        "add_category" => {
            let variant = field(form, "category_type")
                .parse::<Variant>()
                .unwrap_or(Variant::Income);
            let icon = Some(field(form, "icon")).filter(|i| !i.trim().is_empty());
            store
                .add_category(user, variant, field(form, "category_name"), icon)
                .await?;
            Ok(Some(Flash::CategoryAdded))
        }
        "edit_txn" => {
            let variant = parse_variant(field(form, "type"))?;
            let id = parse_id(field(form, "id"))?;
            store
                .edit_transaction(user, variant, id, transaction_input(form)?)
                .await?;
            Ok(Some(Flash::Updated))
        }
        "delete_txn" => {
            let variant = parse_variant(field(form, "type"))?;
            let id = parse_id(field(form, "id"))?;
            store.delete_transaction(user, variant, id).await?;
            Ok(Some(Flash::Deleted))
        }
        other => {
            log::debug!(target: "ledgerdash::api", "Unknown dashboard action '{}'", other);
            Ok(None)
        }
    }
}

fn transaction_input(form: &HashMap<String, String>) -> CoreResult<TransactionInput> {
    Ok(TransactionInput {
        amount: parse_amount(field(form, "amount")),
        category_id: parse_category_id(field(form, "category_id"))?,
        note: Some(field(form, "note").to_string()),
        date: parse_form_date(field(form, "created_at"))?,
    })
}
