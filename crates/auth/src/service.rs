//! Auth core orchestration: registration, login, token authentication and
//! role authorization, composed from the password, token and store modules.

use std::sync::Arc;

use thiserror::Error;

use userdir_core::{DomainError, UserCode, UserId};

use crate::claims::TokenError;
use crate::password::{self, PasswordError};
use crate::roles::Role;
use crate::store::{NewUser, StoreError, UserChanges, UserStore};
use crate::token::TokenService;
use crate::user::{Registration, User, UserUpdate, ValidRegistration};

/// How many times registration re-draws the 12-digit code when the store
/// reports a collision before giving up. With a 9×10¹¹ codespace this is
/// effectively unreachable.
const CODE_RETRIES: u32 = 3;

/// Auth failure taxonomy. Mapped to HTTP status codes at the API boundary
/// only; nothing here is allowed to leak raw upstream errors to a client.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum AuthError {
    #[error("validation failed: {0}")]
    Validation(String),

    #[error("{0}")]
    Conflict(String),

    #[error("user not found")]
    NotFound,

    #[error("invalid credentials")]
    Unauthorized,

    #[error("{0}")]
    Forbidden(String),

    #[error(transparent)]
    Token(#[from] TokenError),

    #[error("internal error: {0}")]
    Internal(String),
}

impl From<DomainError> for AuthError {
    fn from(e: DomainError) -> Self {
        match e {
            DomainError::Validation(msg) | DomainError::InvalidId(msg) => {
                AuthError::Validation(msg)
            }
            DomainError::Conflict(msg) => AuthError::Conflict(msg),
            DomainError::NotFound => AuthError::NotFound,
            DomainError::Unauthorized => AuthError::Unauthorized,
            DomainError::Forbidden(msg) => AuthError::Forbidden(msg),
            DomainError::Internal(msg) => AuthError::Internal(msg),
        }
    }
}

impl From<StoreError> for AuthError {
    fn from(e: StoreError) -> Self {
        match e {
            StoreError::DuplicateEmail => AuthError::Conflict("email already registered".into()),
            StoreError::DuplicateCode => AuthError::Internal("user code collision".into()),
            StoreError::NotFound => AuthError::NotFound,
            StoreError::Unavailable(msg) => AuthError::Internal(msg),
        }
    }
}

impl From<PasswordError> for AuthError {
    fn from(e: PasswordError) -> Self {
        AuthError::Internal(e.to_string())
    }
}

/// A freshly issued token together with the user it was issued for.
#[derive(Debug, Clone)]
pub struct IssuedToken {
    pub token: String,
    pub user: User,
}

/// Orchestrates credential verification, token issuance and role gating.
///
/// Stateless across requests; the store is the only shared resource.
pub struct AuthService {
    store: Arc<dyn UserStore>,
    tokens: TokenService,
    token_ttl_secs: i64,
    bcrypt_cost: u32,
}

impl AuthService {
    pub fn new(
        store: Arc<dyn UserStore>,
        tokens: TokenService,
        token_ttl_secs: i64,
        bcrypt_cost: u32,
    ) -> Self {
        Self {
            store,
            tokens,
            token_ttl_secs,
            bcrypt_cost,
        }
    }

    /// Register a new user and log them in.
    ///
    /// Flow: validate → hash → create (store arbitrates email uniqueness) →
    /// re-verify the just-supplied credentials against the stored record →
    /// issue a token carrying the claims snapshot.
    pub async fn register(&self, input: Registration) -> Result<IssuedToken, AuthError> {
        let reg = input.validate()?;
        let password = reg.password.clone();

        let created = self.create_validated(reg).await?;
        tracing::info!(user_id = %created.id, email = %created.email, "user registered");

        // Defensive double-check: read the record back and verify the
        // credentials the caller just supplied against what was stored.
        let stored = self
            .store
            .find_by_email(&created.email)?
            .ok_or(AuthError::Unauthorized)?;
        if !self.run_verify(password, stored.password_hash.clone()).await? {
            return Err(AuthError::Unauthorized);
        }

        let token = self.issue_for(&stored)?;
        Ok(IssuedToken {
            token,
            user: stored,
        })
    }

    /// Create a user record without logging them in (the administrative
    /// create path). Same validation and defaults as registration.
    pub async fn create_user(&self, input: Registration) -> Result<User, AuthError> {
        let reg = input.validate()?;
        let user = self.create_validated(reg).await?;
        tracing::info!(user_id = %user.id, "user created");
        Ok(user)
    }

    /// Apply a partial update; a changed password is unwrapped and re-hashed
    /// before the store sees it.
    pub async fn update_user(&self, id: UserId, input: UserUpdate) -> Result<User, AuthError> {
        let valid = input.validate()?;

        let password_hash = match valid.password {
            Some(plain) => Some(self.run_hash(plain).await?),
            None => None,
        };

        let changes = UserChanges {
            name: valid.name,
            email: valid.email,
            password_hash,
            doc_number: valid.doc_number,
            date_birth: valid.date_birth,
            gender: valid.gender,
            receive_email_notifications: valid.receive_email_notifications,
            date_agree_terms: valid.date_agree_terms,
        };

        let user = self.store.update(id, changes)?;
        tracing::info!(user_id = %user.id, "user updated");
        Ok(user)
    }

    /// Authenticate with email + password and issue a token.
    ///
    /// When `allowed_roles` is given, the user's role must be in the set.
    /// The check order is a contract: existence → enabled → role →
    /// credentials. It decides which error a caller sees when several
    /// conditions fail at once.
    pub async fn login(
        &self,
        email: &str,
        password: &str,
        allowed_roles: Option<&[Role]>,
    ) -> Result<IssuedToken, AuthError> {
        let email = email.trim().to_lowercase();
        let password = password::decode_if_base64(password);

        let user = self.store.find_by_email(&email)?.ok_or(AuthError::NotFound)?;

        if !user.enabled {
            tracing::warn!(user_id = %user.id, "login attempt on disabled account");
            return Err(AuthError::Forbidden("account is disabled".into()));
        }

        if let Some(roles) = allowed_roles {
            if !roles.contains(&user.role) {
                return Err(AuthError::Forbidden("insufficient role".into()));
            }
        }

        if !self.run_verify(password, user.password_hash.clone()).await? {
            return Err(AuthError::Unauthorized);
        }

        let token = self.issue_for(&user)?;
        Ok(IssuedToken { token, user })
    }

    /// Verify a bearer token and resolve its subject against live store
    /// state. The embedded claims snapshot is never trusted: the enabled
    /// flag (and later the role) come from the record as it is now.
    pub fn authenticate(&self, bearer: Option<&str>) -> Result<User, AuthError> {
        let token = bearer.ok_or(TokenError::Missing)?;
        let claims = self.tokens.verify(token)?;
        let id = claims.subject_id()?;

        let user = self
            .store
            .find_by_id(id)?
            .ok_or(AuthError::Unauthorized)?;

        if !user.enabled {
            return Err(AuthError::Forbidden("account is disabled".into()));
        }

        Ok(user)
    }

    /// Require the user's live role to be in `required`.
    pub fn authorize(&self, user: &User, required: &[Role]) -> Result<(), AuthError> {
        if required.contains(&user.role) {
            Ok(())
        } else {
            Err(AuthError::Forbidden("insufficient role".into()))
        }
    }

    fn issue_for(&self, user: &User) -> Result<String, AuthError> {
        self.tokens
            .issue(user, self.token_ttl_secs)
            .map_err(|e| AuthError::Internal(format!("token issuance failed: {e}")))
    }

    async fn create_validated(&self, reg: ValidRegistration) -> Result<User, AuthError> {
        let password_hash = self.run_hash(reg.password.clone()).await?;
        self.create_with_fresh_code(&reg, password_hash)
    }

    fn create_with_fresh_code(
        &self,
        reg: &ValidRegistration,
        password_hash: String,
    ) -> Result<User, AuthError> {
        for _ in 0..=CODE_RETRIES {
            let new = NewUser {
                code: UserCode::generate(),
                name: reg.name.clone(),
                email: reg.email.clone(),
                password_hash: password_hash.clone(),
                role: Role::User,
                enabled: true,
                doc_number: reg.doc_number,
                date_birth: reg.date_birth,
                gender: reg.gender,
                receive_email_notifications: reg.receive_email_notifications,
                terms: Some(reg.terms.clone()),
                date_agree_terms: Some(reg.date_agree_terms),
            };
            match self.store.create(new) {
                Ok(user) => return Ok(user),
                Err(StoreError::DuplicateCode) => continue,
                Err(e) => return Err(e.into()),
            }
        }
        Err(AuthError::Internal(
            "could not allocate a unique user code".into(),
        ))
    }

    async fn run_hash(&self, secret: String) -> Result<String, AuthError> {
        let cost = self.bcrypt_cost;
        tokio::task::spawn_blocking(move || password::hash(&secret, cost))
            .await
            .map_err(|e| AuthError::Internal(format!("hash task failed: {e}")))?
            .map_err(AuthError::from)
    }

    async fn run_verify(&self, secret: String, hash: String) -> Result<bool, AuthError> {
        tokio::task::spawn_blocking(move || password::verify(&secret, &hash))
            .await
            .map_err(|e| AuthError::Internal(format!("verify task failed: {e}")))?
            .map_err(AuthError::from)
    }
}
