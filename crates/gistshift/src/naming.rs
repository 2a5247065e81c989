//! Target name and description derivation.

use indexmap::IndexMap;

use crate::config::{MirrorConfig, RewriteRule};
use crate::mirror::MirrorError;
use crate::platform::{Snippet, SnippetFile};

/// Name and description derived for a snippet's migration target.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DerivedNames {
    pub name: String,
    pub description: String,
}

/// Drop the final extension: everything from the last `.` onward.
pub fn strip_extension(filename: &str) -> &str {
    match filename.rfind('.') {
        Some(idx) => &filename[..idx],
        None => filename,
    }
}

/// Derive the repository name from the first filename.
///
/// The rewrite is applied once, then the trailing extension is stripped.
/// Fails when there are no files or the result is empty.
pub fn derive_name(
    files: &IndexMap<String, SnippetFile>,
    rule: &RewriteRule,
) -> Result<String, MirrorError> {
    let first = files
        .keys()
        .next()
        .ok_or_else(|| MirrorError::precondition("snippet has no files to derive a name from"))?;

    let rewritten = rule.apply(first);
    let name = strip_extension(&rewritten);

    if name.is_empty() {
        return Err(MirrorError::precondition(format!(
            "filename '{first}' yields an empty repository name"
        )));
    }

    Ok(name.to_string())
}

/// Derive the target description; an absent description is treated as empty.
pub fn derive_description(description: Option<&str>, rule: &RewriteRule) -> String {
    rule.apply(description.unwrap_or(""))
}

/// Derive both the name and the description for a snippet.
pub fn derive(snippet: &Snippet, config: &MirrorConfig) -> Result<DerivedNames, MirrorError> {
    Ok(DerivedNames {
        name: derive_name(&snippet.files, config.name_rewrite())?,
        description: derive_description(
            snippet.description.as_deref(),
            config.description_rewrite(),
        ),
    })
}

#[cfg(test)]
mod tests {
    use regex::Regex;

    use super::*;

    fn files(names: &[&str]) -> IndexMap<String, SnippetFile> {
        names
            .iter()
            .map(|n| (n.to_string(), SnippetFile::default()))
            .collect()
    }

    fn rule(pattern: &str, replacement: &str) -> RewriteRule {
        RewriteRule::new(Regex::new(pattern).unwrap(), replacement)
    }

    #[test]
    fn strips_single_extension() {
        let name = derive_name(&files(&["foo.sh"]), &rule("^", "")).unwrap();
        assert_eq!(name, "foo");
    }

    #[test]
    fn strips_only_the_final_extension() {
        let name = derive_name(&files(&["a.b.tar.gz"]), &rule("^", "")).unwrap();
        assert_eq!(name, "a.b.tar");
    }

    #[test]
    fn name_without_extension_is_kept() {
        assert_eq!(strip_extension("Makefile"), "Makefile");
    }

    #[test]
    fn uses_the_first_filename_in_insertion_order() {
        let name = derive_name(&files(&["zz-last.py", "aa-first.py"]), &rule("^", "")).unwrap();
        assert_eq!(name, "zz-last");
    }

    #[test]
    fn rewrite_is_applied_once_before_stripping() {
        let name = derive_name(&files(&["gist-gist-tool.rb"]), &rule("gist-", "")).unwrap();
        assert_eq!(name, "gist-tool");
    }

    #[test]
    fn empty_file_map_is_a_precondition_error() {
        let err = derive_name(&IndexMap::new(), &rule("^", "")).unwrap_err();
        assert!(matches!(err, MirrorError::Precondition(_)));
    }

    #[test]
    fn dotfile_yields_precondition_error() {
        let err = derive_name(&files(&[".bashrc"]), &rule("^", "")).unwrap_err();
        assert!(err.to_string().contains(".bashrc"));
    }

    #[test]
    fn description_rewrite_is_single_substitution() {
        let r = rule("TODO", "DONE");
        assert_eq!(derive_description(Some("TODO a TODO"), &r), "DONE a TODO");
    }

    #[test]
    fn absent_description_becomes_empty() {
        assert_eq!(derive_description(None, &rule("^", "")), "");
        assert_eq!(derive_description(None, &rule("^", "Mirrored: ")), "Mirrored: ");
    }
}
