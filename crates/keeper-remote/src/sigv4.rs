//! AWS SigV4 request signing
//!
//! Credentials come from the AWS default provider chain (environment,
//! profile, web identity, IMDS). The chain is async, so the signer owns a
//! small current-thread runtime used only to resolve credentials.

use std::sync::Mutex;
use std::time::{Duration, SystemTime};

use aws_config::{BehaviorVersion, Region};
use aws_credential_types::Credentials;
use aws_credential_types::provider::{ProvideCredentials, SharedCredentialsProvider};
use aws_sigv4::http_request::{SignableBody, SignableRequest, SigningSettings, sign};
use aws_sigv4::sign::v4;
use keeper_core::config::AwsAuth;
use keeper_core::{Error, Result};
use tokio::runtime::Runtime;

/// Refresh credentials this long before they expire.
const EXPIRY_MARGIN: Duration = Duration::from_secs(300);

/// Signs requests for one region and service.
pub struct AwsSigner {
    region: String,
    service: String,
    runtime: Runtime,
    provider: SharedCredentialsProvider,
    cached: Mutex<Option<Credentials>>,
}

impl AwsSigner {
    /// Load the default credential chain for the configured region.
    pub fn from_config(auth: &AwsAuth) -> Result<Self> {
        let runtime = tokio::runtime::Builder::new_current_thread()
            .enable_all()
            .build()
            .map_err(|e| Error::config(format!("cannot start AWS runtime: {}", e)))?;

        let sdk_config = runtime.block_on(
            aws_config::defaults(BehaviorVersion::latest())
                .region(Region::new(auth.region.clone()))
                .load(),
        );
        let provider = sdk_config
            .credentials_provider()
            .ok_or_else(|| Error::config("no AWS credentials provider available"))?;

        Ok(Self {
            region: auth.region.clone(),
            service: auth.service.clone(),
            runtime,
            provider,
            cached: Mutex::new(None),
        })
    }

    /// Signature headers for a request with the given extra headers and body.
    pub fn sign(
        &self,
        method: &str,
        url: &str,
        headers: &[(&str, &str)],
        body: &[u8],
    ) -> Result<Vec<(String, String)>> {
        let credentials = self.credentials()?;
        sign_request(
            &credentials,
            &self.region,
            &self.service,
            SystemTime::now(),
            method,
            url,
            headers,
            body,
        )
    }

    fn credentials(&self) -> Result<Credentials> {
        let mut cached = self
            .cached
            .lock()
            .map_err(|_| Error::config("AWS credential cache poisoned"))?;

        if let Some(credentials) = cached.as_ref()
            && !expires_soon(credentials)
        {
            return Ok(credentials.clone());
        }

        let fresh = self
            .runtime
            .block_on(self.provider.provide_credentials())
            .map_err(|e| Error::Connection {
                target: format!("AWS credentials ({})", self.region),
                message: e.to_string(),
            })?;
        tracing::debug!(region = %self.region, "resolved AWS credentials");
        *cached = Some(fresh.clone());
        Ok(fresh)
    }
}

fn expires_soon(credentials: &Credentials) -> bool {
    credentials
        .expiry()
        .is_some_and(|expiry| expiry <= SystemTime::now() + EXPIRY_MARGIN)
}

/// Compute SigV4 headers (`authorization`, `x-amz-date`, and the session
/// token when present) for one request.
#[allow(clippy::too_many_arguments)]
pub fn sign_request(
    credentials: &Credentials,
    region: &str,
    service: &str,
    time: SystemTime,
    method: &str,
    url: &str,
    headers: &[(&str, &str)],
    body: &[u8],
) -> Result<Vec<(String, String)>> {
    let signing_error = |message: String| Error::config(format!("SigV4 signing failed: {}", message));

    let identity = credentials.clone().into();
    let params = v4::SigningParams::builder()
        .identity(&identity)
        .region(region)
        .name(service)
        .time(time)
        .settings(SigningSettings::default())
        .build()
        .map_err(|e| signing_error(e.to_string()))?
        .into();

    let signable = SignableRequest::new(
        method,
        url,
        headers.iter().copied(),
        SignableBody::Bytes(body),
    )
    .map_err(|e| signing_error(e.to_string()))?;

    let (instructions, _signature) = sign(signable, &params)
        .map_err(|e| signing_error(e.to_string()))?
        .into_parts();

    Ok(instructions
        .headers()
        .map(|(name, value)| (name.to_string(), value.to_string()))
        .collect())
}
