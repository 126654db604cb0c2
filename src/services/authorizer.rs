//! Connection authorizer: resolves the caller identity the gateway's
//! authorizer attached to an inbound connection message.

use crate::models::connection::RequestContext;
use serde_json::Value;

/// Authorizer claim holding the caller's identity.
pub const USER_ID_CLAIM: &str = "UserId";

/// Caller identity, or `None` when the claim is missing, null, or empty.
///
/// Non-string scalar claims (numbers, booleans) are rendered as text.
pub fn authorize(context: &RequestContext) -> Option<String> {
    let claim = context.authorizer.as_ref()?.get(USER_ID_CLAIM)?;
    let user = match claim {
        Value::Null => return None,
        Value::String(user) => user.clone(),
        other => other.to_string(),
    };
    (!user.is_empty()).then_some(user)
}
