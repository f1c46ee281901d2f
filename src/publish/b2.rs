//! Backblaze B2 backend (native API v2)
//!
//! Flow per run: `b2_authorize_account` once, `b2_list_buckets` to resolve the
//! bucket by name, then for every object `b2_get_upload_url` + upload. Upload
//! URLs are not shared between threads, so each object fetches its own.

use super::store::{BucketHandle, ObjectStore};
use crate::core::error::{ConfigError, PublishError, ReleaseError, ReleaseResult, ResultExt};
use reqwest::blocking::{Client, Response};
use serde::{Deserialize, Serialize};
use sha1::{Digest, Sha1};
use std::fs;
use std::path::Path;

const AUTHORIZE_URL: &str = "https://api.backblazeb2.com/b2api/v2/b2_authorize_account";
const USER_AGENT: &str = concat!("release-rail/", env!("CARGO_PKG_VERSION"));
const CONTENT_TYPE: &str = "application/octet-stream";

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct AuthorizeResponse {
  account_id: String,
  authorization_token: String,
  api_url: String,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct ListBucketsRequest<'a> {
  account_id: &'a str,
  bucket_name: &'a str,
}

#[derive(Debug, Deserialize)]
struct ListBucketsResponse {
  buckets: Vec<Bucket>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct Bucket {
  bucket_id: String,
  bucket_name: String,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct UploadUrlRequest<'a> {
  bucket_id: &'a str,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct UploadUrlResponse {
  upload_url: String,
  authorization_token: String,
}

/// Error body returned by every B2 endpoint
#[derive(Debug, Deserialize)]
struct ApiError {
  status: u16,
  code: String,
  message: String,
}

/// Authorized B2 account session
pub struct B2Store {
  client: Client,
  account_id: String,
  auth_token: String,
  api_url: String,
}

impl B2Store {
  /// Authorize with credentials read from the named environment variables
  pub fn from_env(key_id_env: &str, key_env: &str) -> ReleaseResult<Self> {
    let key_id = read_env(key_id_env)?;
    let key = read_env(key_env)?;
    Self::authorize(&key_id, &key)
  }

  /// Authorize with an application key id and key
  pub fn authorize(key_id: &str, key: &str) -> ReleaseResult<Self> {
    // No request timeout: callers impose deadlines on the whole run
    let client = Client::builder()
      .user_agent(USER_AGENT)
      .timeout(None)
      .build()?;

    let response = client
      .get(AUTHORIZE_URL)
      .basic_auth(key_id, Some(key))
      .send()
      .map_err(|e| ReleaseError::message(format!("B2 authorization request failed: {}", e)))?;
    let auth: AuthorizeResponse = parse_response(response, "b2_authorize_account")?;

    log::debug!("authorized B2 account {} against {}", auth.account_id, auth.api_url);

    Ok(Self {
      client,
      account_id: auth.account_id,
      auth_token: auth.authorization_token,
      api_url: auth.api_url,
    })
  }

  fn api(&self, call: &str) -> String {
    format!("{}/b2api/v2/{}", self.api_url, call)
  }

  fn upload_url(&self, bucket: &BucketHandle) -> ReleaseResult<UploadUrlResponse> {
    let response = self
      .client
      .post(self.api("b2_get_upload_url"))
      .header("Authorization", &self.auth_token)
      .json(&UploadUrlRequest { bucket_id: &bucket.id })
      .send()
      .map_err(|e| ReleaseError::message(format!("b2_get_upload_url failed: {}", e)))?;
    parse_response(response, "b2_get_upload_url")
  }
}

impl ObjectStore for B2Store {
  fn resolve_bucket(&self, name: &str) -> ReleaseResult<Option<BucketHandle>> {
    let response = self
      .client
      .post(self.api("b2_list_buckets"))
      .header("Authorization", &self.auth_token)
      .json(&ListBucketsRequest {
        account_id: &self.account_id,
        bucket_name: name,
      })
      .send()
      .map_err(|e| ReleaseError::message(format!("b2_list_buckets failed: {}", e)))?;
    let listed: ListBucketsResponse = parse_response(response, "b2_list_buckets")?;

    Ok(
      listed
        .buckets
        .into_iter()
        .find(|b| b.bucket_name == name)
        .map(|b| BucketHandle {
          name: b.bucket_name,
          id: b.bucket_id,
        }),
    )
  }

  fn upload(&self, bucket: &BucketHandle, key: &str, file: &Path) -> ReleaseResult<()> {
    let body = fs::read(file).with_context(|| format!("Failed to read {}", file.display()))?;
    let sha1 = format!("{:x}", Sha1::digest(&body));
    let target = self.upload_url(bucket)?;

    let response = self
      .client
      .post(&target.upload_url)
      .header("Authorization", &target.authorization_token)
      .header("X-Bz-File-Name", encode_file_name(key))
      .header("Content-Type", CONTENT_TYPE)
      .header("X-Bz-Content-Sha1", sha1)
      .body(body)
      .send()
      .map_err(|e| {
        ReleaseError::Publish(PublishError::UploadFailure {
          key: key.to_string(),
          reason: e.to_string(),
        })
      })?;

    if !response.status().is_success() {
      return Err(ReleaseError::Publish(PublishError::UploadFailure {
        key: key.to_string(),
        reason: describe_failure(response),
      }));
    }

    Ok(())
  }
}

/// B2 wants file names percent-encoded, with `/` left as is
fn encode_file_name(key: &str) -> String {
  urlencoding::encode(key).replace("%2F", "/")
}

fn read_env(name: &str) -> ReleaseResult<String> {
  std::env::var(name).map_err(|_| {
    ReleaseError::Config(ConfigError::MissingField {
      field: format!("environment variable {}", name),
    })
  })
}

fn parse_response<T: for<'de> Deserialize<'de>>(response: Response, call: &str) -> ReleaseResult<T> {
  if !response.status().is_success() {
    return Err(ReleaseError::message(format!("{} failed: {}", call, describe_failure(response))));
  }
  response
    .json::<T>()
    .map_err(|e| ReleaseError::message(format!("{} returned an unexpected body: {}", call, e)))
}

fn describe_failure(response: Response) -> String {
  let status = response.status();
  match response.json::<ApiError>() {
    Ok(err) => format!("{} {} ({})", err.status, err.code, err.message),
    Err(_) => format!("HTTP {}", status),
  }
}
