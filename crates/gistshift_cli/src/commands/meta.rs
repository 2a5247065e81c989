//! Completions and man pages, generated from the clap definition.

use std::io::Write;
use std::path::{Path, PathBuf};

use clap::CommandFactory;

use crate::Cli;

const BIN_NAME: &str = "gistshift";

fn write_completions(shell: clap_complete::Shell, out: &mut impl Write) {
    clap_complete::generate(shell, &mut Cli::command(), BIN_NAME, out);
}

fn write_man_page(cmd: clap::Command, title: &str, out: &mut impl Write) -> std::io::Result<()> {
    clap_mangen::Man::new(cmd).title(title).render(out)
}

/// Write `gistshift.1` plus `gistshift-<sub>.1` for every visible subcommand.
///
/// Returns the files written, main page first.
fn write_man_pages(dir: &Path) -> std::io::Result<Vec<PathBuf>> {
    std::fs::create_dir_all(dir)?;

    let cmd = Cli::command();
    let mut pages = vec![(BIN_NAME.to_string(), cmd.clone())];
    for sub in cmd.get_subcommands().filter(|s| !s.is_hide_set()) {
        let name = format!("{}-{}", BIN_NAME, sub.get_name());
        pages.push((name, sub.clone()));
    }

    let mut written = Vec::with_capacity(pages.len());
    for (name, page) in pages {
        let path = dir.join(format!("{name}.1"));
        let mut file = std::fs::File::create(&path)?;
        write_man_page(page, &name, &mut file)?;
        written.push(path);
    }
    Ok(written)
}

pub(crate) fn handle_completions(
    shell: clap_complete::Shell,
) -> Result<(), Box<dyn std::error::Error>> {
    write_completions(shell, &mut std::io::stdout().lock());
    Ok(())
}

pub(crate) fn handle_man(output: Option<PathBuf>) -> Result<(), Box<dyn std::error::Error>> {
    let Some(dir) = output else {
        write_man_page(Cli::command(), BIN_NAME, &mut std::io::stdout().lock())?;
        return Ok(());
    };

    let written = write_man_pages(&dir)?;
    println!("Wrote {} man page(s) to {}", written.len(), dir.display());
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn bash_completions_cover_the_subcommands() {
        let mut out = Vec::new();
        write_completions(clap_complete::Shell::Bash, &mut out);
        let script = String::from_utf8(out).unwrap();
        assert!(script.contains("gistshift"));
        assert!(script.contains("run"));
        assert!(script.contains("--filename-filter"));
    }

    #[test]
    fn main_page_describes_conceal_mode() {
        let mut out = Vec::new();
        write_man_page(Cli::command(), BIN_NAME, &mut out).unwrap();
        let page = String::from_utf8(out).unwrap();
        assert!(page.to_lowercase().contains(".th gistshift"));
        assert!(page.contains("conceal mode"));
    }

    #[test]
    fn one_page_per_subcommand_is_written() {
        let dir = tempfile::tempdir().unwrap();
        let out = dir.path().join("man");

        let written = write_man_pages(&out).unwrap();

        let names: Vec<_> = written
            .iter()
            .map(|p| p.file_name().unwrap().to_string_lossy().into_owned())
            .collect();
        assert_eq!(names[0], "gistshift.1");
        assert!(names.contains(&"gistshift-run.1".to_string()));
        assert!(names.contains(&"gistshift-limits.1".to_string()));
        assert!(written.iter().all(|p| p.exists()));
    }
}
