//! OAuth 2.0 authorization-code flow with PKCE.
//!
//! [`AuthorizationFlow`] builds the provider authorization URL and remembers
//! the PKCE verifier under a random `state`. The verifier is removed the
//! first time that state is presented to
//! [`exchange_code`](AuthorizationFlow::exchange_code), whether or not the
//! exchange succeeds. Receiving the redirect is left to the caller.

use crate::error::{CloudError, Result};
use crate::http::{build_client, json_or_error};
use base64::engine::general_purpose::URL_SAFE_NO_PAD;
use base64::Engine;
use chrono::{Duration, Utc};
use cloudstream_core::{CloudAccount, CloudProvider};
use rand::RngCore;
use reqwest::Client;
use serde::Deserialize;
use sha2::{Digest, Sha256};
use std::collections::HashMap;
use tracing::{debug, info, warn};
use url::Url;

/// Access token lifetime assumed when the provider omits `expires_in`
const DEFAULT_EXPIRES_IN: i64 = 3600;

/// OAuth endpoints and app registration for one provider
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProviderConfig {
    pub provider: CloudProvider,
    pub client_id: String,
    pub redirect_uri: String,
    pub scopes: Vec<String>,
    pub auth_url: String,
    pub token_url: String,
    /// Endpoint that returns the signed-in user's email
    pub userinfo_url: String,
}

impl ProviderConfig {
    /// Public endpoints for `provider`; B2 has no OAuth flow
    pub fn defaults(provider: CloudProvider, client_id: impl Into<String>) -> Result<Self> {
        let client_id = client_id.into();
        let (slug, scopes, auth_url, token_url, userinfo_url): (&str, &[&str], &str, &str, &str) =
            match provider {
                CloudProvider::Dropbox => (
                    "dropbox",
                    &["files.content.read", "files.metadata.read", "account_info.read"],
                    "https://www.dropbox.com/oauth2/authorize",
                    "https://api.dropboxapi.com/oauth2/token",
                    "https://api.dropboxapi.com/2/users/get_current_account",
                ),
                CloudProvider::GoogleDrive => (
                    "google",
                    &[
                        "https://www.googleapis.com/auth/drive.readonly",
                        "https://www.googleapis.com/auth/userinfo.email",
                    ],
                    "https://accounts.google.com/o/oauth2/v2/auth",
                    "https://oauth2.googleapis.com/token",
                    "https://www.googleapis.com/oauth2/v2/userinfo",
                ),
                CloudProvider::OneDrive => (
                    "onedrive",
                    &["Files.Read", "Files.Read.All", "User.Read", "offline_access"],
                    "https://login.microsoftonline.com/common/oauth2/v2.0/authorize",
                    "https://login.microsoftonline.com/common/oauth2/v2.0/token",
                    "https://graph.microsoft.com/v1.0/me",
                ),
                CloudProvider::B2 => return Err(CloudError::UnsupportedProvider(provider)),
            };

        Ok(Self {
            provider,
            client_id,
            redirect_uri: format!("http://localhost:5173/auth/{}/callback", slug),
            scopes: scopes.iter().map(|s| (*s).to_string()).collect(),
            auth_url: auth_url.into(),
            token_url: token_url.into(),
            userinfo_url: userinfo_url.into(),
        })
    }

    pub fn with_redirect_uri(mut self, redirect_uri: impl Into<String>) -> Self {
        self.redirect_uri = redirect_uri.into();
        self
    }

    /// Point every endpoint at `base` (tests, proxies)
    pub fn with_endpoints(mut self, base: &str) -> Self {
        let base = base.trim_end_matches('/');
        self.auth_url = format!("{}/authorize", base);
        self.token_url = format!("{}/token", base);
        self.userinfo_url = format!("{}/userinfo", base);
        self
    }
}

/// PKCE code verifier and its S256 challenge
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PkcePair {
    pub verifier: String,
    pub challenge: String,
}

impl PkcePair {
    /// 32 random bytes as hex, challenge = base64url(sha256(verifier))
    pub fn generate() -> Self {
        Self::from_verifier(random_hex(32))
    }

    pub fn from_verifier(verifier: String) -> Self {
        let challenge = URL_SAFE_NO_PAD.encode(Sha256::digest(verifier.as_bytes()));
        Self {
            verifier,
            challenge,
        }
    }
}

/// Random CSRF state
pub fn generate_state() -> String {
    random_hex(32)
}

fn random_hex(len: usize) -> String {
    let mut bytes = vec![0u8; len];
    rand::thread_rng().fill_bytes(&mut bytes);
    hex::encode(bytes)
}

/// Where to send the user, and the state that identifies the attempt
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AuthorizationRequest {
    pub provider: CloudProvider,
    pub url: String,
    pub state: String,
}

#[derive(Debug, Clone)]
struct PendingAuthorization {
    provider: CloudProvider,
    verifier: String,
}

#[derive(Debug, Deserialize)]
struct TokenResponse {
    access_token: String,
    #[serde(default)]
    refresh_token: Option<String>,
    #[serde(default)]
    expires_in: Option<i64>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
struct UserInfo {
    #[serde(default)]
    email: Option<String>,
    #[serde(default)]
    mail: Option<String>,
    #[serde(default)]
    user_principal_name: Option<String>,
}

impl UserInfo {
    fn into_email(self) -> Option<String> {
        self.email.or(self.user_principal_name).or(self.mail)
    }
}

/// Authorization flows in progress, keyed by state
#[derive(Debug)]
pub struct AuthorizationFlow {
    http: Client,
    configs: HashMap<CloudProvider, ProviderConfig>,
    pending: HashMap<String, PendingAuthorization>,
}

impl AuthorizationFlow {
    pub fn new(configs: impl IntoIterator<Item = ProviderConfig>) -> Result<Self> {
        Ok(Self {
            http: build_client()?,
            configs: configs.into_iter().map(|c| (c.provider, c)).collect(),
            pending: HashMap::new(),
        })
    }

    fn config(&self, provider: CloudProvider) -> Result<&ProviderConfig> {
        let config = self
            .configs
            .get(&provider)
            .ok_or(CloudError::UnsupportedProvider(provider))?;
        if config.client_id.is_empty() {
            return Err(CloudError::MissingClientId(provider));
        }
        Ok(config)
    }

    /// Start an authorization attempt
    pub fn authorization_url(&mut self, provider: CloudProvider) -> Result<AuthorizationRequest> {
        let config = self.config(provider)?;
        let state = generate_state();
        let pkce = PkcePair::generate();

        let mut url = Url::parse(&config.auth_url)?;
        {
            let mut query = url.query_pairs_mut();
            query
                .append_pair("client_id", &config.client_id)
                .append_pair("redirect_uri", &config.redirect_uri)
                .append_pair("response_type", "code")
                .append_pair("scope", &config.scopes.join(" "))
                .append_pair("state", &state)
                .append_pair("code_challenge", &pkce.challenge)
                .append_pair("code_challenge_method", "S256");

            match provider {
                CloudProvider::Dropbox => {
                    query.append_pair("token_access_type", "offline");
                }
                CloudProvider::GoogleDrive => {
                    query
                        .append_pair("access_type", "offline")
                        .append_pair("prompt", "consent");
                }
                CloudProvider::OneDrive | CloudProvider::B2 => {}
            }
        }

        self.pending.insert(
            state.clone(),
            PendingAuthorization {
                provider,
                verifier: pkce.verifier,
            },
        );
        debug!(provider = %provider, "Authorization started");

        Ok(AuthorizationRequest {
            provider,
            url: url.into(),
            state,
        })
    }

    /// Attempts still waiting for their redirect
    pub fn pending_count(&self) -> usize {
        self.pending.len()
    }

    /// Forget an attempt the user abandoned
    pub fn discard(&mut self, state: &str) -> bool {
        self.pending.remove(state).is_some()
    }

    /// Trade the authorization code for tokens and build the account
    pub async fn exchange_code(&mut self, state: &str, code: &str) -> Result<CloudAccount> {
        let pending = self.pending.remove(state).ok_or_else(|| {
            warn!("Authorization state not found");
            CloudError::UnknownState
        })?;
        let config = self.config(pending.provider)?;

        let response = self
            .http
            .post(&config.token_url)
            .form(&[
                ("client_id", config.client_id.as_str()),
                ("code", code),
                ("redirect_uri", config.redirect_uri.as_str()),
                ("grant_type", "authorization_code"),
                ("code_verifier", pending.verifier.as_str()),
            ])
            .send()
            .await?;
        let tokens: TokenResponse = json_or_error(response, "token response").await?;

        let email = self
            .fetch_email(config, &tokens.access_token)
            .await
            .unwrap_or_else(|| "Unknown".to_string());
        info!(provider = %pending.provider, email = %email, "Account connected");

        Ok(CloudAccount {
            provider: pending.provider,
            email,
            expires_at: expiry(tokens.expires_in),
            access_token: tokens.access_token,
            refresh_token: tokens.refresh_token,
        })
    }

    /// New access token for `account`, keeping the old refresh token when
    /// the provider does not rotate it
    pub async fn refresh(&self, account: &CloudAccount) -> Result<CloudAccount> {
        let config = self.config(account.provider)?;
        let refresh_token = account
            .refresh_token
            .as_deref()
            .ok_or(CloudError::MissingRefreshToken(account.provider))?;

        let response = self
            .http
            .post(&config.token_url)
            .form(&[
                ("client_id", config.client_id.as_str()),
                ("refresh_token", refresh_token),
                ("grant_type", "refresh_token"),
            ])
            .send()
            .await?;
        let tokens: TokenResponse = json_or_error(response, "refresh response").await?;
        debug!(provider = %account.provider, "Token refreshed");

        Ok(CloudAccount {
            provider: account.provider,
            email: account.email.clone(),
            expires_at: expiry(tokens.expires_in),
            access_token: tokens.access_token,
            refresh_token: tokens.refresh_token.or_else(|| account.refresh_token.clone()),
        })
    }

    async fn fetch_email(&self, config: &ProviderConfig, access_token: &str) -> Option<String> {
        // Dropbox exposes the account as an RPC endpoint
        let request = match config.provider {
            CloudProvider::Dropbox => self.http.post(&config.userinfo_url),
            _ => self.http.get(&config.userinfo_url),
        };

        let result = async {
            let response = request.bearer_auth(access_token).send().await?;
            json_or_error::<UserInfo>(response, "user info").await
        }
        .await;

        match result {
            Ok(info) => info.into_email(),
            Err(e) => {
                warn!(provider = %config.provider, error = %e, "Failed to fetch user info");
                None
            }
        }
    }
}

fn expiry(expires_in: Option<i64>) -> chrono::DateTime<Utc> {
    Utc::now() + Duration::seconds(expires_in.unwrap_or(DEFAULT_EXPIRES_IN))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn challenge_is_rfc7636_s256() {
        // Appendix B of RFC 7636
        let pair = PkcePair::from_verifier("dBjftJeZ4CVP-mB92K27uhbUJU1p1r_wW1gFWFOEjXk".into());
        assert_eq!(pair.challenge, "E9Melhoa2OwvFrEMTJguCHaoeK1t8URWbuGJSstw-cM");
    }

    #[test]
    fn generated_verifier_is_hex() {
        let pair = PkcePair::generate();
        assert_eq!(pair.verifier.len(), 64);
        assert!(pair.verifier.chars().all(|c| c.is_ascii_hexdigit()));
        assert!(!pair.challenge.contains('='));
        assert_ne!(generate_state(), generate_state());
    }

    #[test]
    fn b2_has_no_oauth() {
        assert!(matches!(
            ProviderConfig::defaults(CloudProvider::B2, "id"),
            Err(CloudError::UnsupportedProvider(CloudProvider::B2))
        ));
    }

    #[test]
    fn provider_specific_parameters() {
        let mut flow = AuthorizationFlow::new([
            ProviderConfig::defaults(CloudProvider::Dropbox, "dbx").unwrap(),
            ProviderConfig::defaults(CloudProvider::GoogleDrive, "goog").unwrap(),
            ProviderConfig::defaults(CloudProvider::OneDrive, "ms").unwrap(),
        ])
        .unwrap();

        let dropbox = flow.authorization_url(CloudProvider::Dropbox).unwrap();
        assert!(dropbox.url.starts_with("https://www.dropbox.com/oauth2/authorize?"));
        assert!(dropbox.url.contains("token_access_type=offline"));
        assert!(dropbox.url.contains("code_challenge_method=S256"));
        assert!(dropbox.url.contains(&format!("state={}", dropbox.state)));

        let google = flow.authorization_url(CloudProvider::GoogleDrive).unwrap();
        assert!(google.url.contains("access_type=offline"));
        assert!(google.url.contains("prompt=consent"));

        let onedrive = flow.authorization_url(CloudProvider::OneDrive).unwrap();
        assert!(!onedrive.url.contains("access_type"));
        assert!(onedrive.url.contains("scope=Files.Read+Files.Read.All+User.Read+offline_access"));

        assert_eq!(flow.pending_count(), 3);
        assert!(flow.discard(&google.state));
        assert!(!flow.discard(&google.state));
    }

    #[test]
    fn empty_client_id_is_rejected() {
        let mut flow =
            AuthorizationFlow::new([ProviderConfig::defaults(CloudProvider::Dropbox, "").unwrap()])
                .unwrap();
        assert!(matches!(
            flow.authorization_url(CloudProvider::Dropbox),
            Err(CloudError::MissingClientId(CloudProvider::Dropbox))
        ));
        assert_eq!(flow.pending_count(), 0);
    }
}
