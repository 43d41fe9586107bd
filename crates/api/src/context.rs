use userdir_auth::User;

/// Authenticated-subject context for a request.
///
/// Inserted by the guards after token verification plus a live store
/// re-check, and read by handlers as an explicit extension; there is no
/// ambient "current user" lookup anywhere.
#[derive(Debug, Clone)]
pub struct AuthContext {
    user: User,
}

impl AuthContext {
    pub fn new(user: User) -> Self {
        Self { user }
    }

    pub fn user(&self) -> &User {
        &self.user
    }
}
