//! Conversion from GitHub wire types to platform types.

use crate::platform::{
    Completeness, RateLimitInfo, RepositoryTarget, Snippet, SnippetFile, Visibility,
};

use super::types::{GistResponse, RateLimitResource, RepoResponse};

/// Convert a gist payload into a [`Snippet`].
///
/// Listing responses carry no file contents, so the caller states which kind
/// of record this is.
pub fn to_snippet(gist: GistResponse, completeness: Completeness) -> Snippet {
    let visibility = if gist.public {
        Visibility::Public
    } else {
        Visibility::Secret
    };

    let files = gist
        .files
        .into_iter()
        .map(|(name, file)| {
            (
                name,
                SnippetFile {
                    raw_url: file.raw_url,
                    content: file.content,
                },
            )
        })
        .collect();

    Snippet {
        id: gist.id,
        visibility,
        description: gist.description,
        files,
        git_pull_url: gist.git_pull_url,
        html_url: gist.html_url,
        completeness,
    }
}

pub fn to_repository_target(repo: RepoResponse) -> RepositoryTarget {
    RepositoryTarget {
        owner: repo.owner.login,
        name: repo.name,
        description: repo.description,
        homepage: repo.homepage,
        clone_url: repo.clone_url,
        html_url: repo.html_url,
    }
}

pub fn to_rate_limit_info(resource: &RateLimitResource) -> RateLimitInfo {
    RateLimitInfo {
        limit: resource.limit,
        remaining: resource.remaining,
        reset_at: resource.reset_at(),
    }
}
