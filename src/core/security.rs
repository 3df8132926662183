use std::fmt;
use std::fmt::{Display, Formatter};
use jsonwebtoken::{decode, Algorithm, DecodingKey, Validation};
use serde::{Deserialize, Serialize};
use crate::core::library::{LibraryError, LibraryResult};

pub const JWT_NOT_FOUND_MSG: &str = "JWT not found in security context.";

#[derive(Debug, PartialEq, Clone, Copy, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum IdentityProvider {
    AmazonCognito,
    AppleId,
    GoogleIdentityPlatform,
    KeyCloak,
    MicrosoftEntraId,
}

impl From<String> for IdentityProvider {
    fn from(s: String) -> Self {
        match s.to_uppercase().as_str() {
            "AMAZON_COGNITO" => IdentityProvider::AmazonCognito,
            "APPLE_ID" => IdentityProvider::AppleId,
            "GOOGLE_IDENTITY_PLATFORM" => IdentityProvider::GoogleIdentityPlatform,
            "MICROSOFT_ENTRA_ID" => IdentityProvider::MicrosoftEntraId,
            _ => IdentityProvider::KeyCloak,
        }
    }
}

impl Display for IdentityProvider {
    fn fmt(&self, f: &mut Formatter) -> fmt::Result {
        match self {
            IdentityProvider::AmazonCognito => write!(f, "AMAZON_COGNITO"),
            IdentityProvider::AppleId => write!(f, "APPLE_ID"),
            IdentityProvider::GoogleIdentityPlatform => write!(f, "GOOGLE_IDENTITY_PLATFORM"),
            IdentityProvider::KeyCloak => write!(f, "KEY_CLOAK"),
            IdentityProvider::MicrosoftEntraId => write!(f, "MICROSOFT_ENTRA_ID"),
        }
    }
}

// DigitalUser is the caller identity derived from the bearer token of a request. Its id is the
// token subject and is what the ownership service keys records by.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DigitalUser {
    pub id: String,
    pub subject: String,
    pub identity_provider: Option<IdentityProvider>,
    pub tenant_id: Option<String>,
}

impl DigitalUser {
    pub fn new(subject: &str) -> Self {
        Self {
            id: subject.to_string(),
            subject: subject.to_string(),
            identity_provider: None,
            tenant_id: None,
        }
    }
}

pub trait Authenticator: Sync + Send {
    fn digital_user(&self, jwt: Option<&str>) -> LibraryResult<DigitalUser>;
}

#[derive(Debug, Serialize, Deserialize)]
struct Claims {
    sub: String,
    exp: usize,
    #[serde(default)]
    idp: Option<String>,
    #[serde(default)]
    tenant_id: Option<String>,
}

// Verifies HS256 signed tokens and maps their claims to a DigitalUser.
pub struct JwtAuthenticator {
    secret: Vec<u8>,
}

impl JwtAuthenticator {
    pub fn new(secret: &str) -> Self {
        Self {
            secret: secret.as_bytes().to_vec(),
        }
    }
}

impl Authenticator for JwtAuthenticator {
    fn digital_user(&self, jwt: Option<&str>) -> LibraryResult<DigitalUser> {
        let token = bearer_token(jwt)?;
        let mut validation = Validation::new(Algorithm::HS256);
        validation.validate_exp = true;
        let data = decode::<Claims>(token, &DecodingKey::from_secret(&self.secret), &validation)
            .map_err(|e| LibraryError::not_authenticated(format!("invalid JWT {}", e).as_str()))?;
        Ok(DigitalUser {
            id: data.claims.sub.clone(),
            subject: data.claims.sub,
            identity_provider: data.claims.idp.map(IdentityProvider::from),
            tenant_id: data.claims.tenant_id,
        })
    }
}

// Trusts any non-empty token and resolves it to the configured user, used for local runs.
pub struct StaticAuthenticator {
    user: DigitalUser,
}

impl StaticAuthenticator {
    pub fn new(user: DigitalUser) -> Self {
        Self { user }
    }
}

impl Authenticator for StaticAuthenticator {
    fn digital_user(&self, jwt: Option<&str>) -> LibraryResult<DigitalUser> {
        let _ = bearer_token(jwt)?;
        Ok(self.user.clone())
    }
}

pub(crate) fn bearer_token(jwt: Option<&str>) -> LibraryResult<&str> {
    let raw = jwt.map(str::trim).unwrap_or_default();
    let token = raw.strip_prefix("Bearer ")
        .or_else(|| raw.strip_prefix("bearer "))
        .unwrap_or(raw)
        .trim();
    if token.is_empty() {
        return Err(LibraryError::not_authenticated(JWT_NOT_FOUND_MSG));
    }
    Ok(token)
}
