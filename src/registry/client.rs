//! HTTP client for the model registry (Hugging Face Hub API)

use std::collections::HashMap;
use std::fs::File;
use std::time::Duration;

use reqwest::blocking::{Body, Client, Response};
use reqwest::header::{ACCEPT, CONTENT_TYPE};
use serde::{Deserialize, Serialize};

use super::error::{RegistryError, RegistryResult};
use super::upload::{
    commit_payload, read_sample, CommitOperation, LfsPointer, UploadFile, UploadMode,
};

const REQUEST_TIMEOUT_SECS: u64 = 300;
const REPO_TYPE: &str = "model";
const REVISION: &str = "main";
/// Most files the registry accepts in one preupload or LFS batch request
const BATCH_SIZE: usize = 256;
const LFS_MEDIA_TYPE: &str = "application/vnd.git-lfs+json";

/// Identity returned by the whoami endpoint
#[derive(Debug, Clone, Deserialize)]
pub struct WhoAmI {
    pub name: String,
}

/// Outcome of [`HubClient::create_repo`]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RepoStatus {
    Created,
    AlreadyExists,
}

#[derive(Serialize)]
struct CreateRepoRequest<'a> {
    name: &'a str,
    #[serde(skip_serializing_if = "Option::is_none")]
    organization: Option<&'a str>,
    #[serde(rename = "type")]
    repo_type: &'a str,
    private: bool,
}

#[derive(Serialize)]
struct PreuploadRequest<'a> {
    files: Vec<PreuploadEntry<'a>>,
}

#[derive(Serialize)]
struct PreuploadEntry<'a> {
    path: &'a str,
    sample: String,
    size: u64,
}

#[derive(Deserialize)]
struct PreuploadResponse {
    files: Vec<PreuploadVerdict>,
}

/// The registry's decision for one file
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PreuploadVerdict {
    pub path: String,
    pub upload_mode: UploadMode,
    #[serde(default)]
    pub should_ignore: bool,
}

#[derive(Serialize)]
struct LfsBatchRequest<'a> {
    operation: &'a str,
    transfers: [&'a str; 1],
    objects: &'a [LfsPointer],
    hash_algo: &'a str,
    #[serde(rename = "ref")]
    git_ref: GitRef<'a>,
}

#[derive(Serialize)]
struct GitRef<'a> {
    name: &'a str,
}

#[derive(Deserialize)]
struct LfsBatchResponse {
    objects: Vec<LfsObject>,
}

/// Per-object answer of the LFS batch endpoint.
///
/// No `actions` means the store already holds the object.
#[derive(Debug, Clone, Deserialize)]
pub struct LfsObject {
    pub oid: String,
    #[serde(default)]
    pub actions: Option<LfsActions>,
    #[serde(default)]
    pub error: Option<LfsObjectError>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct LfsActions {
    pub upload: Option<LfsAction>,
    pub verify: Option<LfsAction>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct LfsAction {
    pub href: String,
    #[serde(default)]
    pub header: HashMap<String, String>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct LfsObjectError {
    pub code: i64,
    pub message: String,
}

/// Response of a successful commit
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CommitInfo {
    #[serde(default)]
    pub commit_url: Option<String>,
    #[serde(default)]
    pub commit_oid: Option<String>,
}

pub struct HubClient {
    client: Client,
    endpoint: String,
    token: String,
}

impl HubClient {
    pub fn new(endpoint: &str, token: &str) -> RegistryResult<Self> {
        let client = Client::builder()
            .timeout(Duration::from_secs(REQUEST_TIMEOUT_SECS))
            .user_agent(concat!("churnops/", env!("CARGO_PKG_VERSION")))
            .build()
            .map_err(|source| RegistryError::Http {
                url: endpoint.to_string(),
                source,
            })?;

        Ok(Self {
            client,
            endpoint: endpoint.trim_end_matches('/').to_string(),
            token: token.to_string(),
        })
    }

    /// Check the token and return the account it belongs to
    pub fn whoami(&self) -> RegistryResult<WhoAmI> {
        let url = format!("{}/api/whoami-v2", self.endpoint);
        tracing::debug!(%url, "authenticating");

        let response = self
            .client
            .get(&url)
            .bearer_auth(&self.token)
            .send()
            .map_err(|source| http_error(&url, source))?;
        let response = ensure_success(&url, response)?;

        response.json().map_err(|source| http_error(&url, source))
    }

    /// Create `repo_id` (`namespace/name`) as a model repository.
    ///
    /// An existing repository is not an error: the call reports
    /// [`RepoStatus::AlreadyExists`] instead.
    pub fn create_repo(&self, repo_id: &str) -> RegistryResult<RepoStatus> {
        let url = format!("{}/api/repos/create", self.endpoint);
        let (organization, name) = match repo_id.split_once('/') {
            Some((org, name)) => (Some(org), name),
            None => (None, repo_id),
        };
        let body = CreateRepoRequest {
            name,
            organization,
            repo_type: REPO_TYPE,
            private: false,
        };

        let response = self
            .client
            .post(&url)
            .bearer_auth(&self.token)
            .json(&body)
            .send()
            .map_err(|source| http_error(&url, source))?;

        if response.status() == reqwest::StatusCode::CONFLICT {
            tracing::info!(repo_id, "repository already exists");
            return Ok(RepoStatus::AlreadyExists);
        }
        ensure_success(&url, response)?;
        tracing::info!(repo_id, "repository created");
        Ok(RepoStatus::Created)
    }

    /// Ask the registry how each file must be uploaded.
    ///
    /// The result is aligned with `files`.
    pub fn preupload(
        &self,
        repo_id: &str,
        files: &[UploadFile],
    ) -> RegistryResult<Vec<PreuploadVerdict>> {
        let url = format!(
            "{}/api/{}s/{}/preupload/{}",
            self.endpoint, REPO_TYPE, repo_id, REVISION
        );
        let mut verdicts = Vec::with_capacity(files.len());

        for chunk in files.chunks(BATCH_SIZE) {
            let entries = chunk
                .iter()
                .map(|file| {
                    Ok(PreuploadEntry {
                        path: &file.path_in_repo,
                        sample: read_sample(file)?,
                        size: file.size,
                    })
                })
                .collect::<RegistryResult<Vec<_>>>()?;

            let response = self
                .client
                .post(&url)
                .bearer_auth(&self.token)
                .json(&PreuploadRequest { files: entries })
                .send()
                .map_err(|source| http_error(&url, source))?;
            let response = ensure_success(&url, response)?;
            let parsed: PreuploadResponse =
                response.json().map_err(|source| http_error(&url, source))?;

            let mut by_path: HashMap<String, PreuploadVerdict> = parsed
                .files
                .into_iter()
                .map(|v| (v.path.clone(), v))
                .collect();
            for file in chunk {
                let verdict = by_path.remove(&file.path_in_repo).ok_or_else(|| {
                    RegistryError::UnexpectedResponse {
                        url: url.clone(),
                        message: format!("no upload mode for {}", file.path_in_repo),
                    }
                })?;
                verdicts.push(verdict);
            }
        }

        tracing::debug!(
            files = files.len(),
            lfs = verdicts
                .iter()
                .filter(|v| v.upload_mode == UploadMode::Lfs)
                .count(),
            "preupload complete"
        );
        Ok(verdicts)
    }

    /// Request upload actions for large files. The result is aligned with `pointers`.
    pub fn lfs_batch(
        &self,
        repo_id: &str,
        pointers: &[LfsPointer],
    ) -> RegistryResult<Vec<LfsObject>> {
        let url = format!("{}/{}.git/info/lfs/objects/batch", self.endpoint, repo_id);
        let mut objects = Vec::with_capacity(pointers.len());

        for chunk in pointers.chunks(BATCH_SIZE) {
            let request = LfsBatchRequest {
                operation: "upload",
                transfers: ["basic"],
                objects: chunk,
                hash_algo: "sha256",
                git_ref: GitRef { name: REVISION },
            };
            let body = serde_json::to_vec(&request)?;

            let response = self
                .client
                .post(&url)
                .bearer_auth(&self.token)
                .header(ACCEPT, LFS_MEDIA_TYPE)
                .header(CONTENT_TYPE, LFS_MEDIA_TYPE)
                .body(body)
                .send()
                .map_err(|source| http_error(&url, source))?;
            let response = ensure_success(&url, response)?;
            let parsed: LfsBatchResponse =
                response.json().map_err(|source| http_error(&url, source))?;

            let by_oid: HashMap<&str, &LfsObject> =
                parsed.objects.iter().map(|o| (o.oid.as_str(), o)).collect();
            for pointer in chunk {
                let object = by_oid.get(pointer.oid.as_str()).ok_or_else(|| {
                    RegistryError::UnexpectedResponse {
                        url: url.clone(),
                        message: format!("no batch entry for object {}", pointer.oid),
                    }
                })?;
                objects.push((*object).clone());
            }
        }

        Ok(objects)
    }

    /// Carry out the actions the batch endpoint returned for one file:
    /// stream the content to the upload href, then confirm it if asked to.
    pub fn lfs_upload(
        &self,
        file: &UploadFile,
        pointer: &LfsPointer,
        object: &LfsObject,
    ) -> RegistryResult<()> {
        if let Some(error) = &object.error {
            return Err(RegistryError::Lfs {
                path: file.path_in_repo.clone(),
                message: format!("{} ({})", error.message, error.code),
            });
        }

        let Some(actions) = &object.actions else {
            tracing::debug!(path = %file.path_in_repo, "object already in large-file store");
            return Ok(());
        };

        if let Some(upload) = &actions.upload {
            if upload.header.contains_key("chunk_size") {
                return Err(RegistryError::Lfs {
                    path: file.path_in_repo.clone(),
                    message: "multipart transfer requested but only basic is supported"
                        .to_string(),
                });
            }

            let content = File::open(&file.local_path).map_err(|source| RegistryError::Io {
                path: file.local_path.display().to_string(),
                source,
            })?;
            // The href is pre-signed; the registry token is not sent to it
            let mut request = self.client.put(&upload.href).body(Body::from(content));
            for (name, value) in &upload.header {
                request = request.header(name.as_str(), value.as_str());
            }
            let response = request
                .send()
                .map_err(|source| http_error(&upload.href, source))?;
            ensure_success(&upload.href, response)?;
            tracing::info!(path = %file.path_in_repo, bytes = pointer.size, "uploaded large file");
        }

        if let Some(verify) = &actions.verify {
            let mut request = self
                .client
                .post(&verify.href)
                .bearer_auth(&self.token)
                .json(pointer);
            for (name, value) in &verify.header {
                request = request.header(name.as_str(), value.as_str());
            }
            let response = request
                .send()
                .map_err(|source| http_error(&verify.href, source))?;
            ensure_success(&verify.href, response)?;
        }

        Ok(())
    }

    /// Create one commit on the main branch of `repo_id` from `operations`
    pub fn commit(
        &self,
        repo_id: &str,
        operations: &[CommitOperation<'_>],
        commit_message: &str,
    ) -> RegistryResult<CommitInfo> {
        let url = format!(
            "{}/api/{}s/{}/commit/{}",
            self.endpoint, REPO_TYPE, repo_id, REVISION
        );
        let payload = commit_payload(operations, commit_message)?;
        tracing::debug!(
            %url,
            operations = operations.len(),
            bytes = payload.len(),
            "uploading commit"
        );

        let response = self
            .client
            .post(&url)
            .bearer_auth(&self.token)
            .header(CONTENT_TYPE, "application/x-ndjson")
            .body(payload)
            .send()
            .map_err(|source| http_error(&url, source))?;
        let response = ensure_success(&url, response)?;

        response.json().map_err(|source| http_error(&url, source))
    }
}

fn http_error(url: &str, source: reqwest::Error) -> RegistryError {
    RegistryError::Http {
        url: url.to_string(),
        source,
    }
}

fn ensure_success(url: &str, response: Response) -> RegistryResult<Response> {
    let status = response.status();
    if status.is_success() {
        return Ok(response);
    }
    let body = response.text().unwrap_or_default();
    Err(RegistryError::Status {
        url: url.to_string(),
        status,
        body,
    })
}
