//! Shared fixtures for the naxos-menu integration tests.
#![allow(dead_code)]

use actix_identity::Identity;
use actix_web::cookie::Cookie;
use actix_web::dev::ServiceResponse;
use actix_web::http::header;
use actix_web::{HttpMessage, HttpRequest, HttpResponse, get, test, web};
use async_trait::async_trait;
use diesel_migrations::{EmbeddedMigrations, MigrationHarness, embed_migrations};

use naxos_menu::auth::{
    AuthError, AuthProvider, AuthResult, AuthSession, AuthenticatedUser, SignUpOutcome,
};
use naxos_menu::db::{DbPool, establish_connection_pool};
use naxos_menu::repository::DieselRepository;

pub const MIGRATIONS: EmbeddedMigrations = embed_migrations!();

/// Menu database in a scratch SQLite file, migrated to the current schema.
///
/// Every test passes its own file name so tests can run in parallel. The file
/// and its WAL companions are removed when the value is dropped.
pub struct TestDb {
    path: String,
    pool: DbPool,
}

impl TestDb {
    pub fn new(path: &str) -> Self {
        remove_database_files(path);

        let pool = establish_connection_pool(path).expect("open menu database");
        let mut conn = pool.get().expect("menu database connection");
        conn.run_pending_migrations(MIGRATIONS)
            .expect("migrate menu database");

        TestDb {
            path: path.to_string(),
            pool,
        }
    }

    pub fn pool(&self) -> DbPool {
        self.pool.clone()
    }

    /// Repository backed by this database.
    pub fn repo(&self) -> DieselRepository {
        DieselRepository::new(self.pool())
    }
}

impl Drop for TestDb {
    fn drop(&mut self) {
        remove_database_files(&self.path);
    }
}

fn remove_database_files(path: &str) {
    for file in [path.to_string(), format!("{path}-shm"), format!("{path}-wal")] {
        std::fs::remove_file(file).ok();
    }
}

/// Auth API stand-in that trusts every token it is shown.
///
/// Refreshing fails for `@revoked.test` addresses.
pub struct AcceptingProvider;

pub fn session_for(email: &str, expires_at: i64) -> AuthSession {
    AuthSession {
        user: AuthenticatedUser {
            id: format!("id-{email}"),
            email: email.to_string(),
            role: None,
        },
        access_token: format!("access-{email}"),
        refresh_token: format!("refresh-{email}"),
        expires_at,
    }
}

#[async_trait]
impl AuthProvider for AcceptingProvider {
    async fn sign_up(&self, email: &str, _password: &str) -> AuthResult<SignUpOutcome> {
        Ok(SignUpOutcome::SignedIn(session_for(email, i64::MAX)))
    }

    async fn sign_in(&self, email: &str, _password: &str) -> AuthResult<AuthSession> {
        Ok(session_for(email, i64::MAX))
    }

    async fn sign_out(&self, _access_token: &str) -> AuthResult<()> {
        Ok(())
    }

    async fn refresh(&self, refresh_token: &str) -> AuthResult<AuthSession> {
        match refresh_token.strip_prefix("refresh-") {
            Some(email) if email.ends_with("@revoked.test") => Err(AuthError::SessionExpired),
            Some(email) => Ok(session_for(email, i64::MAX)),
            None => Err(AuthError::SessionExpired),
        }
    }

    async fn get_user(&self, access_token: &str) -> AuthResult<AuthenticatedUser> {
        let email = access_token.trim_start_matches("access-");
        Ok(session_for(email, i64::MAX).user)
    }
}

/// Stores a session for `email` without going through the login form.
#[get("/sign-in-as/{email}/{expires_at}")]
pub async fn sign_in_as(req: HttpRequest, path: web::Path<(String, i64)>) -> HttpResponse {
    let (email, expires_at) = path.into_inner();
    let raw = session_for(&email, expires_at)
        .to_identity()
        .expect("encode session");
    Identity::login(&req.extensions(), raw).expect("store identity");
    HttpResponse::Ok().finish()
}

pub fn sign_in_uri(email: &str) -> String {
    format!("/sign-in-as/{email}/{}", i64::MAX)
}

pub fn location(resp: &ServiceResponse) -> String {
    resp.headers()
        .get(header::LOCATION)
        .and_then(|value| value.to_str().ok())
        .unwrap_or_default()
        .to_string()
}

pub fn cookies_of(resp: &ServiceResponse) -> Vec<Cookie<'static>> {
    resp.response()
        .cookies()
        .map(|cookie| cookie.into_owned())
        .collect()
}

pub fn with_cookies(mut req: test::TestRequest, cookies: &[Cookie<'static>]) -> test::TestRequest {
    for cookie in cookies {
        req = req.cookie(cookie.clone());
    }
    req
}
