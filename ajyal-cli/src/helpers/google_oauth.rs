use anyhow::{Context, Result};
use oauth2::basic::{BasicClient, BasicTokenResponse};
use oauth2::{
    AuthUrl, AuthorizationCode, ClientId, ClientSecret, CsrfToken, PkceCodeChallenge,
    PkceCodeVerifier, RedirectUrl, Scope, TokenResponse, TokenUrl,
};
use std::io::Write;

use crate::helpers::token_store::{StoredTokens, TokenStore};

const GOOGLE_AUTH_URL: &str = "https://accounts.google.com/o/oauth2/v2/auth";
const GOOGLE_TOKEN_URL: &str = "https://oauth2.googleapis.com/token";
const GMAIL_READONLY_SCOPE: &str = "https://www.googleapis.com/auth/gmail.readonly";
// Out-of-band redirect: the code is shown in the browser and pasted into
// the terminal, since the CLI runs no callback server.
const OOB_REDIRECT_URI: &str = "urn:ietf:wg:oauth:2.0:oob";

pub struct GoogleOAuthClient {
    client: BasicClient,
}

impl GoogleOAuthClient {
    pub fn new(client_id: &str, client_secret: Option<&str>) -> Result<Self> {
        let client = BasicClient::new(
            ClientId::new(client_id.to_string()),
            client_secret.map(|s| ClientSecret::new(s.to_string())),
            AuthUrl::new(GOOGLE_AUTH_URL.to_string())?,
            Some(TokenUrl::new(GOOGLE_TOKEN_URL.to_string())?),
        )
        .set_redirect_uri(RedirectUrl::new(OOB_REDIRECT_URI.to_string())?);

        Ok(Self { client })
    }

    pub fn authorize_url(&self) -> (String, CsrfToken, PkceCodeVerifier) {
        let (pkce_challenge, pkce_verifier) = PkceCodeChallenge::new_random_sha256();

        let (auth_url, csrf_token) = self
            .client
            .authorize_url(CsrfToken::new_random)
            .add_scope(Scope::new(GMAIL_READONLY_SCOPE.to_string()))
            .set_pkce_challenge(pkce_challenge)
            .url();

        (auth_url.to_string(), csrf_token, pkce_verifier)
    }

    pub async fn exchange_code(
        &self,
        code: String,
        pkce_verifier: PkceCodeVerifier,
    ) -> Result<BasicTokenResponse> {
        let token = self
            .client
            .exchange_code(AuthorizationCode::new(code))
            .set_pkce_verifier(pkce_verifier)
            .request_async(oauth2::reqwest::async_http_client)
            .await?;

        Ok(token)
    }

    pub async fn refresh_token(&self, refresh_token: &str) -> Result<BasicTokenResponse> {
        let token = self
            .client
            .exchange_refresh_token(&oauth2::RefreshToken::new(refresh_token.to_string()))
            .request_async(oauth2::reqwest::async_http_client)
            .await?;

        Ok(token)
    }
}

/// Produces a usable access token: stored and unexpired, else refreshed with
/// the stored refresh token, else the interactive console flow. Whatever is
/// obtained is persisted back to the store.
pub async fn obtain_access_token(
    oauth: &GoogleOAuthClient,
    store: &TokenStore,
) -> Result<String> {
    if let Some(token) = store.valid_access_token() {
        return Ok(token);
    }

    if let Some(stored) = store.load() {
        if let Some(refresh_token) = stored.refresh_token.clone() {
            match oauth.refresh_token(&refresh_token).await {
                Ok(response) => {
                    // Google omits the refresh token on refresh responses;
                    // keep the one we already have.
                    let tokens = StoredTokens::from_response(&response, Some(refresh_token));
                    store.save(&tokens)?;
                    return Ok(tokens.access_token);
                }
                Err(e) => {
                    tracing::warn!(
                        "Token refresh failed, falling back to interactive authorization: {}",
                        e
                    );
                }
            }
        }
    }

    let (auth_url, _csrf_token, pkce_verifier) = oauth.authorize_url();
    println!("Please visit this URL in your browser: {auth_url}");
    print!("Enter the authorization code: ");
    std::io::stdout().flush().context("flush prompt")?;

    let mut code = String::new();
    std::io::stdin()
        .read_line(&mut code)
        .context("read authorization code")?;

    let response = oauth
        .exchange_code(code.trim().to_string(), pkce_verifier)
        .await
        .context("exchange authorization code")?;

    let tokens = StoredTokens::from_response(&response, None);
    store.save(&tokens)?;
    Ok(tokens.access_token)
}

impl StoredTokens {
    /// Maps an OAuth token response onto the persisted form. The fallback
    /// refresh token is used when the response carries none.
    pub fn from_response(
        response: &BasicTokenResponse,
        fallback_refresh: Option<String>,
    ) -> Self {
        let expires_in = response
            .expires_in()
            .and_then(|d| chrono::Duration::from_std(d).ok())
            .unwrap_or_else(|| chrono::Duration::seconds(3600));

        Self {
            access_token: response.access_token().secret().clone(),
            refresh_token: response
                .refresh_token()
                .map(|t| t.secret().clone())
                .or(fallback_refresh),
            expires_at: chrono::Utc::now() + expires_in,
        }
    }
}
