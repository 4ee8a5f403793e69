// The `google_auth` module authenticates against the Gmail API with a cached OAuth token.

use google_gmail1::{
    Gmail,
    api::Scope,
    yup_oauth2::{
        self, InstalledFlowAuthenticator, InstalledFlowReturnMethod,
        authenticator_delegate::InstalledFlowDelegate,
    },
};
use hyper_rustls::{HttpsConnector, HttpsConnectorBuilder};
use hyper_util::{client::legacy::Client, client::legacy::connect::HttpConnector, rt::TokioExecutor};
use rustls::crypto::{CryptoProvider, ring::default_provider};
use std::future::Future;
use std::path::{Path, PathBuf};
use std::pin::Pin;
use std::sync::Arc;
use thiserror::Error;
use tracing::{info, warn};

/// A type alias for the HTTPS connector.
pub type HttpsConnectorType = HttpsConnector<HttpConnector>;
/// A type alias for the Gmail hub.
pub type GmailHubType = Gmail<HttpsConnectorType>;

/// File name of the OAuth client secret inside the install directory.
pub const CREDENTIALS_FILE: &str = "credentials.json";
/// File name of the cached user token inside the install directory.
pub const TOKEN_FILE: &str = "token.json";

/// The `AuthError` enum defines the possible errors that can occur during authentication.
#[derive(Error, Debug)]
pub enum AuthError {
    /// The client secret file could not be read or parsed.
    #[error("Failed to read client secret {path}: {source}")]
    SecretRead {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    /// The authenticator (token cache, local redirect server) could not be set up.
    #[error("Failed to build OAuth authenticator: {0}")]
    Authenticator(std::io::Error),
    /// Obtaining, refreshing or persisting a token failed.
    #[error("Failed to obtain an access token: {0}")]
    Token(#[from] yup_oauth2::Error),
    /// The HTTPS connector could not load the platform roots.
    #[error("Failed to set up HTTPS connector: {0}")]
    Connector(std::io::Error),
}

/// The `GConf` struct holds the configuration for Google authentication.
#[derive(Clone, Debug)]
pub struct GConf(Arc<InnerConf>);

/// The inner configuration for `GConf`.
#[derive(Clone, Debug)]
pub struct InnerConf {
    /// The path to the `credentials.json` client secret.
    pub credentials_path: PathBuf,
    /// The path to the `token.json` token cache.
    pub token_path: PathBuf,
}

impl GConf {
    /// Creates a new `GConf`.
    pub fn new(credentials_path: PathBuf, token_path: PathBuf) -> GConf {
        GConf(Arc::new(InnerConf {
            credentials_path,
            token_path,
        }))
    }

    /// Creates a `GConf` pointing at the standard file names inside `dir`.
    pub fn in_dir(dir: impl AsRef<Path>) -> GConf {
        let dir = dir.as_ref();
        GConf::new(dir.join(CREDENTIALS_FILE), dir.join(TOKEN_FILE))
    }

    /// The path to the client secret file.
    pub fn credentials_path(&self) -> &Path {
        &self.0.credentials_path
    }

    /// The path to the token cache file.
    pub fn token_path(&self) -> &Path {
        &self.0.token_path
    }
}

/// Opens the consent page in the default browser, printing the URL as a fallback.
struct BrowserFlowDelegate;

impl InstalledFlowDelegate for BrowserFlowDelegate {
    fn present_user_url<'a>(
        &'a self,
        url: &'a str,
        need_code: bool,
    ) -> Pin<Box<dyn Future<Output = Result<String, String>> + Send + 'a>> {
        Box::pin(async move {
            if webbrowser::open(url).is_err() {
                warn!("Could not open a browser for the consent page");
            }
            println!("Authorize this application by visiting:\n\n{url}\n");
            if need_code {
                return Err("the local redirect flow does not take a pasted code".to_string());
            }
            Ok(String::new())
        })
    }
}

/// Authenticates with the Gmail API and returns a `GmailHubType`.
///
/// A token cached at the configured token path is reused, and refreshed when it
/// has expired. Without a usable token the installed-app consent flow runs on a
/// local redirect server, and the new token is written back to the cache.
pub async fn gmail_auth(conf: GConf, scopes: &[Scope]) -> Result<GmailHubType, AuthError> {
    info!(
        credentials = %conf.credentials_path().display(),
        "Authenticating with Gmail API"
    );

    let secret = yup_oauth2::read_application_secret(conf.credentials_path())
        .await
        .map_err(|source| AuthError::SecretRead {
            path: conf.credentials_path().to_path_buf(),
            source,
        })?;

    let auth = InstalledFlowAuthenticator::builder(secret, InstalledFlowReturnMethod::HTTPRedirect)
        .persist_tokens_to_disk(conf.token_path())
        .flow_delegate(Box::new(BrowserFlowDelegate))
        .build()
        .await
        .map_err(AuthError::Authenticator)?;

    // Request a token up front so consent happens before any mail call.
    let _token = auth.token(scopes).await?;

    _ = CryptoProvider::install_default(default_provider());

    let https = HttpsConnectorBuilder::new()
        .with_native_roots()
        .map_err(AuthError::Connector)?
        .https_or_http()
        .enable_http1()
        .build();

    let client = Client::builder(TokioExecutor::new()).build(https);

    let hub = Gmail::new(client, auth);
    info!("Gmail authentication successful");
    Ok(hub)
}
