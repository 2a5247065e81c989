//! Paginated snippet discovery with filename/description filtering.

use regex::Regex;

use crate::config::MirrorConfig;
use crate::platform::{self, Snippet, SnippetClient};
use crate::progress::{MirrorProgress, ProgressCallback, emit};
use crate::throttle::ThrottleGate;

/// First page number requested from the listing.
pub const FIRST_PAGE: u32 = 1;

/// Outcome of a discovery run.
#[derive(Debug, Clone, Default)]
pub struct Discovered {
    /// Matching snippets in listing order.
    pub matches: Vec<Snippet>,
    /// Total snippets examined.
    pub scanned: usize,
    /// Number of listing pages requested.
    pub pages: u32,
}

/// Decide whether a snippet should be migrated.
///
/// A snippet matches when it is public, its description (empty when absent)
/// matches `description`, and at least one filename matches `filename`.
pub fn matches_filters(snippet: &Snippet, description: &Regex, filename: &Regex) -> bool {
    if !snippet.is_public() {
        return false;
    }

    let text = snippet.description.as_deref().unwrap_or("");
    if !description.is_match(text) {
        return false;
    }

    snippet.files.keys().any(|name| filename.is_match(name))
}

/// Page through the user's snippets and collect the matching ones.
///
/// Pages are requested in ascending order; a page shorter than the
/// configured page size ends the listing. The throttle gate is waited on
/// between consecutive page requests. A failed page request aborts discovery.
pub async fn discover<C>(
    client: &C,
    config: &MirrorConfig,
    throttle: &ThrottleGate,
    on_progress: Option<&ProgressCallback>,
) -> platform::Result<Discovered>
where
    C: SnippetClient + ?Sized,
{
    let page_size = config.page_size();
    let mut found = Discovered::default();
    let mut page = FIRST_PAGE;

    loop {
        if page > FIRST_PAGE {
            throttle.wait().await;
        }

        emit(on_progress, MirrorProgress::FetchingPage { page });
        let snippets = client.list_snippets(page, page_size).await?;
        found.pages += 1;

        let count = snippets.len();
        found.scanned += count;
        found.matches.extend(snippets.into_iter().filter(|s| {
            matches_filters(s, config.description_filter(), config.filename_filter())
        }));

        tracing::debug!(page, count, matched = found.matches.len(), "Fetched page");
        emit(
            on_progress,
            MirrorProgress::FetchedPage {
                page,
                count,
                matched_so_far: found.matches.len(),
            },
        );

        if count < page_size as usize {
            break;
        }
        page += 1;
    }

    tracing::info!(
        scanned = found.scanned,
        matched = found.matches.len(),
        pages = found.pages,
        "Discovery complete"
    );
    emit(
        on_progress,
        MirrorProgress::DiscoveryComplete {
            scanned: found.scanned,
            matched: found.matches.len(),
        },
    );

    Ok(found)
}

#[cfg(test)]
mod tests {
    use crate::platform::{Completeness, SnippetFile, Visibility};

    use super::*;

    fn snippet(visibility: Visibility, description: Option<&str>, files: &[&str]) -> Snippet {
        Snippet {
            id: "s1".to_string(),
            visibility,
            description: description.map(String::from),
            files: files
                .iter()
                .map(|f| (f.to_string(), SnippetFile::default()))
                .collect(),
            git_pull_url: "https://gist.github.com/s1.git".to_string(),
            html_url: "https://gist.github.com/s1".to_string(),
            completeness: Completeness::Summary,
        }
    }

    fn re(pattern: &str) -> Regex {
        Regex::new(pattern).unwrap()
    }

    #[test]
    fn secret_snippets_never_match() {
        let s = snippet(Visibility::Secret, Some("dotfiles"), &["bashrc.sh"]);
        assert!(!matches_filters(&s, &re(".*"), &re(".*")));
        assert!(!matches_filters(&s, &re("dotfiles"), &re(r"\.sh$")));
    }

    #[test]
    fn missing_description_only_matches_patterns_accepting_empty() {
        let s = snippet(Visibility::Public, None, &["a.sh"]);
        assert!(matches_filters(&s, &re(".*"), &re(".*")));
        assert!(matches_filters(&s, &re("^$"), &re(".*")));
        assert!(!matches_filters(&s, &re("deploy"), &re(".*")));
    }

    #[test]
    fn any_filename_may_satisfy_the_filter() {
        let s = snippet(Visibility::Public, Some("x"), &["README.md", "run.sh"]);
        assert!(matches_filters(&s, &re(".*"), &re(r"\.sh$")));
        assert!(!matches_filters(&s, &re(".*"), &re(r"\.py$")));
    }

    #[test]
    fn both_filters_must_pass() {
        let s = snippet(Visibility::Public, Some("build helper"), &["make.sh"]);
        assert!(matches_filters(&s, &re("helper"), &re(r"\.sh$")));
        assert!(!matches_filters(&s, &re("deploy"), &re(r"\.sh$")));
    }

    #[test]
    fn snippet_without_files_never_matches() {
        let s = snippet(Visibility::Public, Some("empty"), &[]);
        assert!(!matches_filters(&s, &re(".*"), &re(".*")));
    }
}
