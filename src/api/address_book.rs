/// Address-book endpoints
use crate::{
    auth::AuthContext,
    config::LookupAuthPolicy,
    contacts::{Contact, LookupAuth},
    context::AppContext,
    error::{RolodexError, RolodexResult},
};
use axum::{
    extract::State,
    http::StatusCode,
    routing::{get, post},
    Json, Router,
};
use serde::Deserialize;
use validator::Validate;

pub fn routes() -> Router<AppContext> {
    Router::new()
        .route("/api/address-book", get(list_contacts))
        .route("/api/address-book/contacts", post(add_contact))
}

/// GET /api/address-book
///
/// The caller's full contact collection.
pub async fn list_contacts(
    State(ctx): State<AppContext>,
    auth: AuthContext,
) -> RolodexResult<Json<Vec<Contact>>> {
    let contacts = ctx.contacts.list(&auth.identity.id).await?;
    Ok(Json(contacts))
}

#[derive(Debug, Deserialize, Validate)]
pub struct AddContactRequest {
    /// Email address of the user to add
    #[serde(default)]
    #[validate(email)]
    pub email: String,
}

/// POST /api/address-book/contacts
///
/// Resolve an email address to a full identity record via the provider, then
/// persist it in the caller's collection. Overwrite semantics make re-adds
/// idempotent.
pub async fn add_contact(
    State(ctx): State<AppContext>,
    auth: AuthContext,
    Json(req): Json<AddContactRequest>,
) -> RolodexResult<(StatusCode, Json<Contact>)> {
    if req.email.is_empty() {
        return Err(RolodexError::Validation("email is required".to_string()));
    }
    req.validate()
        .map_err(|_| RolodexError::Validation("email must be a valid address".to_string()))?;

    // The lookup credential is chosen by configured policy, never implied.
    let lookup_auth = match &ctx.config.provider.lookup_auth {
        LookupAuthPolicy::Forward => LookupAuth::Forwarded(auth.bearer_token.clone()),
        LookupAuthPolicy::ServiceKey { key } => LookupAuth::ServiceKey(key.clone()),
    };

    let contact = ctx.resolver.lookup(&req.email, &lookup_auth).await?;
    ctx.contacts.put(&auth.identity.id, &contact).await?;

    tracing::info!(
        owner = %auth.identity.id,
        contact = %contact.id,
        "contact added"
    );

    Ok((StatusCode::CREATED, Json(contact)))
}
