//! Shell command composition.
//!
//! Commands that run on a chef host are built from fragments instead of
//! ad hoc string concatenation: [`ShellCommand`] for a single program,
//! [`CommandChain`] for `&&`-joined sequences (environment setup, virtualenv
//! activation) and [`Nohup`] for detaching a long-running chef from the
//! login shell.

use regex::Regex;
use std::sync::OnceLock;

use crate::error::{ChefopsError, Result};

fn needs_quoting(arg: &str) -> bool {
    arg.is_empty()
        || arg
            .chars()
            .any(|c| c.is_whitespace() || "'\"\\$`!*?;&|<>(){}[]#~".contains(c))
}

/// Quote an argument for a POSIX shell if it needs it.
#[must_use]
pub fn quote(arg: &str) -> String {
    if needs_quoting(arg) {
        format!("'{}'", arg.replace('\'', r"'\''"))
    } else {
        arg.to_string()
    }
}

/// A program and its arguments
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ShellCommand {
    program: String,
    args: Vec<String>,
}

impl ShellCommand {
    /// Start a command
    #[must_use]
    pub fn new(program: impl Into<String>) -> Self {
        Self {
            program: program.into(),
            args: Vec::new(),
        }
    }

    /// Append an argument
    #[must_use]
    pub fn arg(mut self, arg: impl Into<String>) -> Self {
        self.args.push(arg.into());
        self
    }

    /// Append several arguments
    #[must_use]
    pub fn args<I, S>(mut self, args: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.args.extend(args.into_iter().map(Into::into));
        self
    }

    /// Program name
    #[must_use]
    pub fn program(&self) -> &str {
        &self.program
    }

    /// Arguments, unquoted
    #[must_use]
    pub fn arguments(&self) -> &[String] {
        &self.args
    }

    /// Render as a single shell line, quoting where needed
    #[must_use]
    pub fn render(&self) -> String {
        std::iter::once(quote(&self.program))
            .chain(self.args.iter().map(|a| quote(a)))
            .collect::<Vec<_>>()
            .join(" ")
    }
}

impl std::fmt::Display for ShellCommand {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.render())
    }
}

/// Fragments that run one after another, each only if the previous succeeded
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CommandChain {
    fragments: Vec<String>,
}

impl CommandChain {
    /// Empty chain
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Append a raw shell fragment
    #[must_use]
    pub fn then(mut self, fragment: impl Into<String>) -> Self {
        self.fragments.push(fragment.into());
        self
    }

    /// Append a command
    #[must_use]
    pub fn then_command(self, command: &ShellCommand) -> Self {
        self.then(command.render())
    }

    /// Returns true if nothing has been added
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.fragments.is_empty()
    }

    /// Fragments joined with ` && `
    #[must_use]
    pub fn render(&self) -> String {
        self.fragments.join(" && ")
    }
}

/// Runs a command in the background, immune to the shell hanging up.
///
/// The command goes inside `bash -c " ... "`, so it may be a composite
/// (`source keys.env && ./chef.py`) but must not contain double quotes.
/// A trailing `sleep 1` keeps the remote session from closing before the
/// background job has started.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Nohup {
    /// Redirections for stdout/stderr, e.g. `> chef.log 2>&1`
    pub redirects: Option<String>,
    /// File that receives the background PID
    pub pid_file: Option<String>,
}

impl Nohup {
    /// Wrap `cmd`
    #[must_use]
    pub fn wrap(&self, cmd: &str) -> String {
        let mut out = String::from(" ( nohup  bash -c \" ");
        out.push_str(cmd);
        out.push_str(" \" ");
        if let Some(redirects) = &self.redirects {
            out.push_str(redirects);
        }
        out.push_str(" & ");
        if let Some(pid_file) = &self.pid_file {
            out.push_str(&format!(" echo $! >{pid_file} "));
        }
        out.push_str(") && sleep 1");
        out
    }
}

/// Insert extra options in front of the first `--token` of a chef command.
///
/// Options with a value render as ` key=value `, flags as ` key `. Commands
/// without `--token` are returned unchanged.
#[must_use]
pub fn insert_args_before_token(cmd: &str, args: &[(String, Option<String>)]) -> String {
    let args_str: String = args
        .iter()
        .map(|(key, value)| match value {
            Some(value) => format!(" {key}={value} "),
            None => format!(" {key} "),
        })
        .collect();
    cmd.replacen("--token", &format!("{args_str} --token"), 1)
}

fn github_url_pattern() -> &'static Regex {
    static PATTERN: OnceLock<Regex> = OnceLock::new();
    PATTERN.get_or_init(|| {
        Regex::new(r"https://github.com/(?P<account>\w*?)/(?P<repo>[A-Za-z0-9_-]*)")
            .expect("valid github url pattern")
    })
}

/// Repository name (checkout directory) of a `https://github.com/...` URL.
pub fn github_repo_name(url: &str) -> Result<String> {
    let url = url.strip_suffix('/').unwrap_or(url);
    github_url_pattern()
        .captures(url)
        .map(|caps| caps["repo"].to_string())
        .filter(|name| !name.is_empty())
        .ok_or_else(|| ChefopsError::InvalidRepoUrl(url.to_string()))
}

/// A chef run on a content integration host
#[derive(Debug, Clone, Default)]
pub struct ChefRun {
    /// Checkout directory of the chef
    pub chef_dir: String,
    /// Chef command line, normally ending in `--token=...`
    pub command: String,
    /// Extra options inserted before `--token`
    pub args: Vec<(String, Option<String>)>,
    /// `HOME` to export before running
    pub home: Option<String>,
    /// Virtualenv directory name inside the checkout
    pub venv: Option<String>,
    /// Log file for stdout and stderr
    pub log_file: Option<String>,
    /// PID file for the background process
    pub pid_file: Option<String>,
}

impl ChefRun {
    /// The full shell line: change into the checkout, set up the environment,
    /// run the chef in the background.
    #[must_use]
    pub fn render(&self) -> String {
        let mut chain = CommandChain::new().then_command(&ShellCommand::new("cd").arg(&self.chef_dir));
        if let Some(home) = &self.home {
            chain = chain.then(format!("export HOME={}", quote(home)));
        }
        if let Some(venv) = &self.venv {
            let activate = format!("{}/{venv}/bin/activate", self.chef_dir.trim_end_matches('/'));
            chain = chain.then_command(&ShellCommand::new("source").arg(activate));
        }
        chain = chain.then(insert_args_before_token(&self.command, &self.args));

        let nohup = Nohup {
            redirects: self.log_file.as_ref().map(|log| format!("> {} 2>&1", quote(log))),
            pid_file: self.pid_file.clone(),
        };
        nohup.wrap(&chain.render())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn quoting() {
        assert_eq!(quote("plain-arg_1.0"), "plain-arg_1.0");
        assert_eq!(quote("two words"), "'two words'");
        assert_eq!(quote("it's"), r"'it'\''s'");
        assert_eq!(quote(""), "''");
    }

    #[test]
    fn command_rendering() {
        let cmd = ShellCommand::new("git").args(["checkout", "my branch"]);
        assert_eq!(cmd.render(), "git checkout 'my branch'");
        assert_eq!(cmd.program(), "git");
        assert_eq!(cmd.arguments().len(), 2);
    }

    #[test]
    fn chain_joins_with_and() {
        let chain = CommandChain::new()
            .then("export HOME=/data")
            .then_command(&ShellCommand::new("source").arg("venv/bin/activate"));
        assert_eq!(chain.render(), "export HOME=/data && source venv/bin/activate");
        assert!(CommandChain::new().is_empty());
    }

    #[test]
    fn nohup_wrapping() {
        assert_eq!(
            Nohup::default().wrap("./chef.py"),
            " ( nohup  bash -c \" ./chef.py \"  & ) && sleep 1"
        );
        let nohup = Nohup {
            redirects: Some("> out.log 2>&1".into()),
            pid_file: Some("chef.pid".into()),
        };
        assert_eq!(
            nohup.wrap("./chef.py"),
            " ( nohup  bash -c \" ./chef.py \" > out.log 2>&1 &  echo $! >chef.pid ) && sleep 1"
        );
    }

    #[test]
    fn args_go_before_token() {
        let args = vec![
            ("--stage".to_string(), None),
            ("lang".to_string(), Some("fr".to_string())),
        ];
        assert_eq!(
            insert_args_before_token("./sushichef.py -v --token=abc", &args),
            "./sushichef.py -v  --stage  lang=fr  --token=abc"
        );
        assert_eq!(insert_args_before_token("./run.sh", &args), "./run.sh");
    }

    #[test]
    fn repo_names_from_urls() {
        assert_eq!(
            github_repo_name("https://github.com/learningequality/sushi-chef-pbs/").unwrap(),
            "sushi-chef-pbs"
        );
        assert_eq!(
            github_repo_name("https://github.com/learningequality/sushi-chef-pbs.git").unwrap(),
            "sushi-chef-pbs"
        );
        assert!(matches!(
            github_repo_name("git@github.com:learningequality/x.git"),
            Err(ChefopsError::InvalidRepoUrl(_))
        ));
    }

    #[test]
    fn chef_run_line() {
        let run = ChefRun {
            chef_dir: "/data/sushi-chef-pbs".into(),
            command: "./sushichef.py --token=abc".into(),
            args: vec![("--thumbnails".into(), None)],
            home: Some("/data".into()),
            venv: Some("venv".into()),
            log_file: Some("/data/sushi-chef-pbs/chef.log".into()),
            pid_file: None,
        };
        assert_eq!(
            run.render(),
            " ( nohup  bash -c \" cd /data/sushi-chef-pbs && export HOME=/data && \
             source /data/sushi-chef-pbs/venv/bin/activate && \
             ./sushichef.py  --thumbnails  --token=abc \" \
             > /data/sushi-chef-pbs/chef.log 2>&1 & ) && sleep 1"
        );
    }
}
