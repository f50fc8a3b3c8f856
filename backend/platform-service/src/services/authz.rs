/// Ownership checks gating mutations
use uuid::Uuid;

use crate::error::{AppError, Result};

/// Fail with Forbidden unless the requester owns the resource.
///
/// Called before any upload is attempted on mutation paths, so a rejected
/// request never costs a remote call.
pub fn assert_owner(owner: Uuid, requester: Uuid) -> Result<()> {
    if owner == requester {
        Ok(())
    } else {
        Err(AppError::Forbidden(
            "you do not own this resource".to_string(),
        ))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn owner_passes() {
        let id = Uuid::new_v4();
        assert!(assert_owner(id, id).is_ok());
    }

    #[test]
    fn non_owner_is_forbidden() {
        let result = assert_owner(Uuid::new_v4(), Uuid::new_v4());
        assert!(matches!(result, Err(AppError::Forbidden(_))));
    }
}
