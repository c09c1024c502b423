use super::{SignalAdapter, SignalSource};
use crate::error::Error;
use std::collections::BTreeSet;
use std::fs;
use std::path::{Path, PathBuf};
use tracing::debug;
use walkdir::WalkDir;

/// Launcher definitions (`*.desktop`). Each entry contributes its file stem,
/// the program named by `Exec=` and its `StartupWMClass=`.
pub struct DesktopEntryAdapter {
    dirs: Vec<PathBuf>,
}

impl DesktopEntryAdapter {
    pub fn new(dirs: Vec<PathBuf>) -> Self {
        Self { dirs }
    }
}

impl SignalAdapter for DesktopEntryAdapter {
    fn source(&self) -> SignalSource {
        SignalSource::DesktopEntry
    }

    fn try_collect(&self) -> Result<BTreeSet<String>, Error> {
        let mut identifiers = BTreeSet::new();

        for dir in self.dirs.iter().filter(|dir| dir.is_dir()) {
            // vendor subdirectories (e.g. applications/kde4/) are one level down;
            // flatpak export dirs hold symlinks into the app installations
            for entry in WalkDir::new(dir)
                .max_depth(2)
                .follow_links(true)
                .into_iter()
                .filter_map(|e| e.ok())
            {
                let path = entry.path();
                if !entry.file_type().is_file()
                    || path.extension().and_then(|ext| ext.to_str()) != Some("desktop")
                {
                    continue;
                }

                if let Some(stem) = path.file_stem().and_then(|stem| stem.to_str()) {
                    identifiers.insert(stem.to_string());
                }

                match fs::read_to_string(path) {
                    Ok(contents) => identifiers.extend(parse_desktop_entry(&contents)),
                    Err(err) => debug!("Skipping unreadable {}: {}", path.display(), err),
                }
            }
        }

        Ok(identifiers)
    }
}

/// Identifiers from the `[Desktop Entry]` group of one file.
fn parse_desktop_entry(contents: &str) -> Vec<String> {
    let mut identifiers = Vec::new();
    let mut in_main_group = false;

    for line in contents.lines().map(str::trim) {
        if line.starts_with('[') {
            in_main_group = line == "[Desktop Entry]";
            continue;
        }
        if !in_main_group {
            continue;
        }
        let Some((key, value)) = line.split_once('=') else {
            continue;
        };
        match key.trim() {
            "Exec" => identifiers.extend(exec_program(value.trim())),
            "StartupWMClass" if !value.trim().is_empty() => {
                identifiers.push(value.trim().to_string())
            }
            _ => {}
        }
    }

    identifiers
}

/// The program an `Exec=` line launches. `env VAR=x prog` resolves to `prog`,
/// `flatpak run ... app.id` resolves to the application id.
fn exec_program(exec: &str) -> Option<String> {
    let tokens = exec_tokens(exec);
    let mut tokens = tokens.iter().map(String::as_str);

    let mut program = tokens.next()?;
    if base_name(program) == "env" {
        program = tokens.find(|token| !token.contains('=') && !token.starts_with('-'))?;
    }

    if base_name(program) == "flatpak" {
        let mut rest = tokens.skip_while(|token| *token != "run");
        rest.next()?;
        return rest
            .find(|token| !token.starts_with('-'))
            .map(str::to_string);
    }

    let name = base_name(program);
    (!name.is_empty() && !name.starts_with('%')).then(|| name.to_string())
}

/// Split an `Exec=` value into arguments. A quoted span is one argument and
/// may contain spaces; `\` escapes the next character inside quotes.
fn exec_tokens(exec: &str) -> Vec<String> {
    let mut tokens = Vec::new();
    let mut current = String::new();
    let mut quote: Option<char> = None;
    let mut in_token = false;
    let mut chars = exec.chars();

    while let Some(ch) = chars.next() {
        match (quote, ch) {
            (Some(q), c) if c == q => quote = None,
            (Some('"'), '\\') => {
                if let Some(escaped) = chars.next() {
                    current.push(escaped);
                }
            }
            (Some(_), c) => current.push(c),
            (None, '"') | (None, '\'') => {
                quote = Some(ch);
                in_token = true;
            }
            (None, c) if c.is_whitespace() => {
                if in_token {
                    tokens.push(std::mem::take(&mut current));
                    in_token = false;
                }
            }
            (None, c) => {
                current.push(c);
                in_token = true;
            }
        }
    }
    if in_token {
        tokens.push(current);
    }
    tokens
}

fn base_name(program: &str) -> &str {
    Path::new(program)
        .file_name()
        .and_then(|name| name.to_str())
        .unwrap_or(program)
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    #[test]
    fn test_exec_program() {
        assert_eq!(exec_program("/usr/bin/firefox %u").as_deref(), Some("firefox"));
        assert_eq!(
            exec_program("env GDK_BACKEND=x11 \"/opt/Signal/signal-desktop\" %U").as_deref(),
            Some("signal-desktop")
        );
        assert_eq!(
            exec_program(
                "/usr/bin/flatpak run --branch=stable --arch=x86_64 --command=obsidian md.obsidian.Obsidian @@u %U @@"
            )
            .as_deref(),
            Some("md.obsidian.Obsidian")
        );
        assert_eq!(exec_program(""), None);
    }

    #[test]
    fn test_exec_program_quoted_path_with_spaces() {
        assert_eq!(
            exec_program("\"/opt/My App/app\" %U").as_deref(),
            Some("app")
        );
        assert_eq!(
            exec_tokens(r#"env "A=b c" '/opt/x y/run' --flag"#),
            vec!["env", "A=b c", "/opt/x y/run", "--flag"]
        );
        assert_eq!(exec_tokens(r#""/opt/a \"b\"/c""#), vec![r#"/opt/a "b"/c"#]);
    }

    #[cfg(unix)]
    #[test]
    fn test_collect_follows_symlinked_entries() {
        let tmp = tempdir().unwrap();
        let installed = tmp.path().join("app/md.obsidian.Obsidian/export");
        let exports = tmp.path().join("exports/share/applications");
        fs::create_dir_all(&installed).unwrap();
        fs::create_dir_all(&exports).unwrap();
        fs::write(
            installed.join("md.obsidian.Obsidian.desktop"),
            "[Desktop Entry]\nExec=obsidian %U\nStartupWMClass=obsidian\n",
        )
        .unwrap();
        std::os::unix::fs::symlink(
            installed.join("md.obsidian.Obsidian.desktop"),
            exports.join("md.obsidian.Obsidian.desktop"),
        )
        .unwrap();

        let ids = DesktopEntryAdapter::new(vec![exports]).try_collect().unwrap();
        assert_eq!(
            ids.into_iter().collect::<Vec<_>>(),
            vec!["md.obsidian.Obsidian", "obsidian"]
        );
    }

    #[test]
    fn test_parse_only_main_group() {
        let contents = "\
[Desktop Entry]
Name=Visual Studio Code
Exec=/usr/share/code/code --unity-launch %F
StartupWMClass=Code

[Desktop Action new-empty-window]
Exec=/usr/share/code/code --new-window %F
StartupWMClass=Ignored
";
        assert_eq!(parse_desktop_entry(contents), vec!["code", "Code"]);
    }

    #[test]
    fn test_collect_from_directories() {
        let tmp = tempdir().unwrap();
        let apps = tmp.path().join("applications");
        fs::create_dir_all(apps.join("kde4")).unwrap();
        fs::write(
            apps.join("org.gnome.gedit.desktop"),
            "[Desktop Entry]\nExec=gedit %U\n",
        )
        .unwrap();
        fs::write(apps.join("kde4/kate.desktop"), "[Desktop Entry]\nExec=kate -b %U\n").unwrap();
        fs::write(apps.join("mimeinfo.cache"), "").unwrap();

        let adapter = DesktopEntryAdapter::new(vec![apps, tmp.path().join("missing")]);
        let ids = adapter.try_collect().unwrap();
        assert_eq!(
            ids.into_iter().collect::<Vec<_>>(),
            vec!["gedit", "kate", "org.gnome.gedit"]
        );
    }
}
