//! Construction of the shell script run against each environment

use std::path::Path;

use regex::Regex;
use tracing::debug;

use crate::matrix::error::MatrixError;

/// Quote a string for safe interpolation into a POSIX shell command
pub fn shell_quote(value: &str) -> String {
    if !value.is_empty()
        && value
            .chars()
            .all(|c| c.is_ascii_alphanumeric() || "/._-+=:,@".contains(c))
    {
        return value.to_string();
    }
    format!("'{}'", value.replace('\'', r"'\''"))
}

/// Turn the user's command into the shell command run for every version.
///
/// An existing file is made executable and invoked by absolute path. Anything
/// else is an inline command, prefixed with `interpreter` when one is given.
pub fn prepare_command(raw: &str, interpreter: Option<&str>) -> Result<String, MatrixError> {
    let path = Path::new(raw);
    if !path.is_file() {
        return Ok(match interpreter {
            Some(interpreter) => format!("{} {}", interpreter, raw),
            None => raw.to_string(),
        });
    }

    let script_err = |source| MatrixError::Script {
        path: path.to_path_buf(),
        source,
    };
    let absolute = std::fs::canonicalize(path).map_err(script_err)?;
    make_executable(&absolute).map_err(script_err)?;
    debug!("Using test script {:?}", absolute);

    Ok(shell_quote(&absolute.to_string_lossy()))
}

#[cfg(unix)]
fn make_executable(path: &Path) -> std::io::Result<()> {
    use std::os::unix::fs::PermissionsExt;

    let mut permissions = std::fs::metadata(path)?.permissions();
    if permissions.mode() & 0o111 == 0 {
        permissions.set_mode(0o700);
        std::fs::set_permissions(path, permissions)?;
    }
    Ok(())
}

#[cfg(not(unix))]
fn make_executable(_path: &Path) -> std::io::Result<()> {
    Ok(())
}

/// Rewrites bare occurrences of the project's executables to the copies
/// inside a specific environment
pub struct ExecutableRewriter {
    names: Vec<String>,
    word_re: Regex,
}

impl ExecutableRewriter {
    pub fn new(names: &[String]) -> Self {
        Self {
            names: names.to_vec(),
            word_re: Regex::new(r"[^\s;|&()<>]+").unwrap(),
        }
    }

    /// Replace every whole-word executable name in `command` with
    /// `<bin_dir>/<name>`
    pub fn rewrite(&self, command: &str, bin_dir: &Path) -> String {
        let mut rewritten = String::with_capacity(command.len());
        let mut last = 0;
        for word in self.word_re.find_iter(command) {
            rewritten.push_str(&command[last..word.start()]);
            if self.names.iter().any(|name| name == word.as_str()) {
                let path = bin_dir.join(word.as_str());
                rewritten.push_str(&shell_quote(&path.to_string_lossy()));
            } else {
                rewritten.push_str(word.as_str());
            }
            last = word.end();
        }
        rewritten.push_str(&command[last..]);
        rewritten
    }
}

/// Script that sources the environment bootstrap, then runs the command
pub fn build_script(bootstrap: &Path, command: &str) -> String {
    format!(
        "source {} >/dev/null 2>&1 ; {}",
        shell_quote(&bootstrap.to_string_lossy()),
        command
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;
    use tempfile::TempDir;

    fn rewriter() -> ExecutableRewriter {
        ExecutableRewriter::new(&[
            "ansible".to_string(),
            "ansible-playbook".to_string(),
            "ansible-doc".to_string(),
        ])
    }

    #[rstest]
    #[case("ansible --version", "/env/bin/ansible --version")]
    #[case(
        "ansible-playbook site.yml && ansible-doc ping",
        "/env/bin/ansible-playbook site.yml && /env/bin/ansible-doc ping"
    )]
    #[case("ansible localhost -m ping;ansible all", "/env/bin/ansible localhost -m ping;/env/bin/ansible all")]
    #[case("ansible-inventory --list", "ansible-inventory --list")]
    #[case("cat ansible.cfg", "cat ansible.cfg")]
    #[case("echo $(ansible --version)", "echo $(/env/bin/ansible --version)")]
    fn rewrite_replaces_whole_words_only(#[case] command: &str, #[case] expected: &str) {
        assert_eq!(rewriter().rewrite(command, Path::new("/env/bin")), expected);
    }

    #[test]
    fn rewrite_quotes_paths_with_spaces() {
        assert_eq!(
            rewriter().rewrite("ansible all", Path::new("/my env/bin")),
            "'/my env/bin/ansible' all"
        );
    }

    #[rstest]
    #[case("/plain/path", "/plain/path")]
    #[case("with space", "'with space'")]
    #[case("it's", r"'it'\''s'")]
    #[case("", "''")]
    fn shell_quote_escapes_when_needed(#[case] value: &str, #[case] expected: &str) {
        assert_eq!(shell_quote(value), expected);
    }

    #[test]
    fn build_script_sources_bootstrap_first() {
        assert_eq!(
            build_script(Path::new("/env/hacking/env-setup"), "ansible --version"),
            "source /env/hacking/env-setup >/dev/null 2>&1 ; ansible --version"
        );
    }

    #[rstest]
    #[case(None, "ansible --version")]
    #[case(Some("python3"), "python3 ansible --version")]
    fn prepare_command_passes_inline_commands_through(
        #[case] interpreter: Option<&str>,
        #[case] expected: &str,
    ) {
        assert_eq!(
            prepare_command("ansible --version", interpreter).unwrap(),
            expected
        );
    }

    #[cfg(unix)]
    #[test]
    fn prepare_command_makes_scripts_executable() {
        use std::os::unix::fs::PermissionsExt;

        let temp_dir = TempDir::new().unwrap();
        let script = temp_dir.path().join("test.sh");
        std::fs::write(&script, "#!/bin/bash\nexit 0\n").unwrap();
        std::fs::set_permissions(&script, std::fs::Permissions::from_mode(0o644)).unwrap();

        let command = prepare_command(script.to_str().unwrap(), Some("python3")).unwrap();

        let canonical = std::fs::canonicalize(&script).unwrap();
        assert_eq!(command, shell_quote(&canonical.to_string_lossy()));
        let mode = std::fs::metadata(&script).unwrap().permissions().mode();
        assert_eq!(mode & 0o777, 0o700);
    }
}
