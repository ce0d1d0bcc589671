//! Registry module - publishing the project folder to the model hub

mod client;
mod credentials;
mod error;
mod upload;

pub use client::{
    CommitInfo, HubClient, LfsAction, LfsActions, LfsObject, LfsObjectError, PreuploadVerdict,
    RepoStatus, WhoAmI,
};
pub use credentials::*;
pub use error::{RegistryError, RegistryResult};
pub use upload::{
    collect_files, commit_payload, lfs_pointer, read_sample, CommitOperation, LfsPointer,
    UploadFile, UploadMode, INLINE_SIZE_LIMIT, SAMPLE_BYTES,
};

use std::path::Path;

/// What a publish run did
#[derive(Debug, Clone)]
pub struct PublishReport {
    pub repo_id: String,
    pub repo_status: RepoStatus,
    /// Files in the commit, inline and large-file together
    pub files_uploaded: usize,
    /// Files routed through the large-file store
    pub lfs_files: usize,
    /// Files the registry asked to leave out
    pub files_ignored: usize,
    pub commit_url: Option<String>,
}

/// Authenticate, ensure `<username>/<repo_name>` exists, then upload every
/// file under `folder` in one commit.
///
/// The registry decides per file whether it travels inline or through the
/// large-file store; files over [`INLINE_SIZE_LIMIT`] always take the latter.
pub fn publish_folder(
    endpoint: &str,
    credentials: &Credentials,
    repo_name: &str,
    folder: &Path,
    commit_message: &str,
) -> RegistryResult<PublishReport> {
    let client = HubClient::new(endpoint, &credentials.token)?;

    let identity = client.whoami()?;
    tracing::info!(user = %identity.name, "authenticated with registry");

    let repo_id = credentials.repo_id(repo_name);
    let repo_status = client.create_repo(&repo_id)?;

    let files = collect_files(folder)?;
    let verdicts = client.preupload(&repo_id, &files)?;

    let mut inline = Vec::new();
    let mut large = Vec::new();
    let mut files_ignored = 0;
    for (file, verdict) in files.iter().zip(&verdicts) {
        if verdict.should_ignore {
            tracing::debug!(path = %file.path_in_repo, "ignored by registry");
            files_ignored += 1;
        } else if verdict.upload_mode == UploadMode::Lfs || file.size > INLINE_SIZE_LIMIT {
            large.push(file);
        } else {
            inline.push(file);
        }
    }

    let pointers = large
        .iter()
        .map(|file| lfs_pointer(file))
        .collect::<RegistryResult<Vec<_>>>()?;
    if !pointers.is_empty() {
        let objects = client.lfs_batch(&repo_id, &pointers)?;
        for ((file, pointer), object) in large.iter().zip(&pointers).zip(&objects) {
            client.lfs_upload(file, pointer, object)?;
        }
    }

    let lfs_files = large.len();
    let mut operations: Vec<CommitOperation<'_>> =
        inline.into_iter().map(CommitOperation::Inline).collect();
    operations.extend(
        large
            .into_iter()
            .zip(pointers)
            .map(|(file, pointer)| CommitOperation::Lfs { file, pointer }),
    );
    operations.sort_by(|a, b| a.path_in_repo().cmp(b.path_in_repo()));

    let commit = client.commit(&repo_id, &operations, commit_message)?;

    Ok(PublishReport {
        repo_id,
        repo_status,
        files_uploaded: operations.len(),
        lfs_files,
        files_ignored,
        commit_url: commit.commit_url,
    })
}
