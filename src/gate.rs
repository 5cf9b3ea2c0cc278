/// Session-scoped access flag. Created per session, never persisted, and only
/// mutated through `check_access` and `logout`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct AccessState {
    pub authenticated: bool,
}

/// Grants access on an exact match against the configured shared secret. An
/// already-authenticated state passes through untouched; anything else stays
/// locked and the caller re-prompts. There is no lockout or backoff policy.
pub fn check_access(state: AccessState, submitted: Option<&str>, secret: &str) -> AccessState {
    if state.authenticated {
        return state;
    }
    match submitted {
        Some(candidate) if candidate == secret => AccessState {
            authenticated: true,
        },
        _ => AccessState {
            authenticated: false,
        },
    }
}

pub fn logout(_state: AccessState) -> AccessState {
    AccessState {
        authenticated: false,
    }
}
