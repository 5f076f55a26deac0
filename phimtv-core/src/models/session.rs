/// Explicit user identity passed to the components that need it at
/// construction time. Nothing in this crate reads ambient auth state.
#[derive(Debug, Clone, Default)]
pub struct SessionContext {
    pub user_id: Option<String>,
    pub auth_token: Option<String>,
}

impl SessionContext {
    /// Anonymous context: user-scoped operations degrade to device-local
    /// behavior instead of failing.
    #[must_use]
    pub fn anonymous() -> Self {
        Self::default()
    }

    #[must_use]
    pub fn authenticated(user_id: impl Into<String>, auth_token: impl Into<String>) -> Self {
        Self {
            user_id: Some(user_id.into()),
            auth_token: Some(auth_token.into()),
        }
    }

    #[must_use]
    pub fn is_authenticated(&self) -> bool {
        self.user_id.is_some() && self.auth_token.is_some()
    }
}
