use std::sync::Arc;

use auth::PasswordHasher;
use auth::TokenService;
use chrono::Utc;

use crate::domain::auth::errors::AuthError;
use crate::domain::auth::models::AuthSession;
use crate::domain::auth::models::RegisterUserCommand;
use crate::domain::user::models::User;
use crate::domain::user::models::UserId;
use crate::domain::user::models::Username;
use crate::domain::user::models::DEFAULT_ROLE;
use crate::domain::user::ports::UserRepository;
use crate::user::errors::UserError;

/// Orchestrates credential verification and token issuance.
///
/// Each call is independent; the service holds no per-session state and no
/// rate-limit state — the request layer gates calls through the limiter and
/// records outcomes, keeping the two concerns separately testable.
pub struct AuthService<R>
where
    R: UserRepository,
{
    repository: Arc<R>,
    password_hasher: PasswordHasher,
    token_service: Arc<TokenService>,
}

impl<R> AuthService<R>
where
    R: UserRepository,
{
    pub fn new(repository: Arc<R>, token_service: Arc<TokenService>) -> Self {
        Self {
            repository,
            password_hasher: PasswordHasher::new(),
            token_service,
        }
    }

    /// Register a new account and issue its first token pair.
    ///
    /// Storage conflicts propagate unchanged and no tokens are issued for
    /// them.
    ///
    /// # Errors
    /// * `EmailAlreadyExists` / `UsernameAlreadyExists` - Conflict in storage
    /// * `Internal` - Hashing, storage or signing failure
    pub async fn register(&self, command: RegisterUserCommand) -> Result<AuthSession, AuthError> {
        let password_hash = self
            .password_hasher
            .hash(&command.password)
            .map_err(|e| AuthError::Internal(format!("Password hashing failed: {}", e)))?;

        let user = User {
            id: UserId::new(),
            username: command.username,
            email: command.email,
            password_hash,
            role: DEFAULT_ROLE.to_string(),
            created_at: Utc::now(),
        };

        let created_user = self.repository.create(user).await.map_err(|e| match e {
            UserError::EmailAlreadyExists(email) => AuthError::EmailAlreadyExists(email),
            UserError::UsernameAlreadyExists(username) => {
                AuthError::UsernameAlreadyExists(username)
            }
            other => AuthError::Internal(other.to_string()),
        })?;

        self.issue_session(created_user)
    }

    /// Verify a username/password pair and issue a fresh token pair.
    ///
    /// # Errors
    /// * `InvalidCredentials` - Unknown username or wrong password (the two
    ///   are indistinguishable by design)
    /// * `Internal` - Storage, hash-parsing or signing failure
    pub async fn login(&self, username: &Username, password: &str) -> Result<AuthSession, AuthError> {
        let user = self
            .repository
            .find_by_username(username)
            .await
            .map_err(|e| AuthError::Internal(e.to_string()))?
            .ok_or(AuthError::InvalidCredentials)?;

        let password_matches = self
            .password_hasher
            .verify(password, &user.password_hash)
            .map_err(|e| AuthError::Internal(format!("Password verification failed: {}", e)))?;

        if !password_matches {
            return Err(AuthError::InvalidCredentials);
        }

        self.issue_session(user)
    }

    /// Exchange a refresh token for a brand-new token pair.
    ///
    /// The presented token is rotated but not invalidated server-side; no
    /// revocation list exists, so it stays valid until natural expiry.
    ///
    /// # Errors
    /// * `InvalidToken` - Expired, malformed, badly signed, wrong purpose, or
    ///   carrying an unparseable subject
    /// * `UserNotFound` - Subject no longer exists in storage
    /// * `Internal` - Storage or signing failure
    pub async fn refresh_token(&self, refresh_token: &str) -> Result<AuthSession, AuthError> {
        let claims = self
            .token_service
            .validate_refresh_token(refresh_token)
            .map_err(|_| AuthError::InvalidToken)?;

        let user_id = UserId::from_string(&claims.sub).map_err(|_| AuthError::InvalidToken)?;

        let user = self
            .repository
            .find_by_id(&user_id)
            .await
            .map_err(|e| AuthError::Internal(e.to_string()))?
            .ok_or(AuthError::UserNotFound)?;

        self.issue_session(user)
    }

    /// Resolve an authenticated subject back to its user record.
    ///
    /// # Errors
    /// * `UserNotFound` - Subject no longer exists
    /// * `Internal` - Storage failure
    pub async fn current_user(&self, id: &UserId) -> Result<User, AuthError> {
        self.repository
            .find_by_id(id)
            .await
            .map_err(|e| AuthError::Internal(e.to_string()))?
            .ok_or(AuthError::UserNotFound)
    }

    fn issue_session(&self, user: User) -> Result<AuthSession, AuthError> {
        let subject = user.id.to_string();

        let (access_token, expires_at) = self
            .token_service
            .issue_access_token(&subject, Some(user.email.as_str()), Some(&user.role))
            .map_err(|e| AuthError::Internal(format!("Token signing failed: {}", e)))?;

        let refresh_token = self
            .token_service
            .issue_refresh_token(&subject)
            .map_err(|e| AuthError::Internal(format!("Token signing failed: {}", e)))?;

        Ok(AuthSession {
            access_token,
            refresh_token,
            expires_at,
            user,
        })
    }
}
