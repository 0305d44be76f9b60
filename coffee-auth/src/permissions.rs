use crate::claims::Claims;
use crate::error::AuthError;

/// Confirms that `claims` grant `permission`.
///
/// The claims must always carry a `permissions` list. An empty `permission`
/// only requires an authenticated caller and passes for any such list.
pub fn check_permissions(permission: &str, claims: &Claims) -> Result<(), AuthError> {
    let granted = claims
        .permissions()
        .ok_or_else(AuthError::missing_permissions)?;

    if permission.is_empty() || granted.iter().any(|p| p == permission) {
        Ok(())
    } else {
        Err(AuthError::permission_denied())
    }
}
