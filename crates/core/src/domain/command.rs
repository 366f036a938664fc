// Dialog engine command line (argument vector, never a shell string)

use std::path::PathBuf;

use super::CapabilitySet;

/// Default interpreter for the Django project
pub const DEFAULT_PROGRAM: &str = "python";
/// Default Django entry point
pub const DEFAULT_MANAGE_PY: &str = "manage.py";
/// Management command that feeds one message into a dialog
pub const SEND_MESSAGE_SUBCOMMAND: &str = "send_cli_message";
/// Flag understood by `send_cli_message` to bypass app dialog extensions
pub const SKIP_EXTENSIONS_FLAG: &str = "--skip_extensions";
/// Ends option parsing; everything after it is positional
pub const END_OF_OPTIONS: &str = "--";

/// How the dialog engine is reached
///
/// The user id, script path and message text are appended to `base_args`
/// as separate arguments after `--`, so quotes, shell metacharacters and
/// leading dashes in any of them reach the process verbatim.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DialogCommand {
    pub program: String,
    pub base_args: Vec<String>,
    pub working_dir: Option<PathBuf>,
}

impl Default for DialogCommand {
    fn default() -> Self {
        Self::manage_py(DEFAULT_PROGRAM, DEFAULT_MANAGE_PY)
    }
}

impl DialogCommand {
    /// `<program> <manage_py> send_cli_message`
    pub fn manage_py(program: impl Into<String>, manage_py: impl Into<String>) -> Self {
        Self {
            program: program.into(),
            base_args: vec![manage_py.into(), SEND_MESSAGE_SUBCOMMAND.to_string()],
            working_dir: None,
        }
    }

    /// Arbitrary program with a fixed argument prefix (used for stubs)
    pub fn custom<I, S>(program: impl Into<String>, base_args: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            program: program.into(),
            base_args: base_args.into_iter().map(Into::into).collect(),
            working_dir: None,
        }
    }

    pub fn with_working_dir(mut self, dir: impl Into<PathBuf>) -> Self {
        self.working_dir = Some(dir.into());
        self
    }

    /// Arguments passed after the program name
    ///
    /// `<base_args> [--skip_extensions] -- <user_id> <script_path> <text>`
    pub fn argv(&self, caps: &CapabilitySet, text: &str) -> Vec<String> {
        let mut args = self.base_args.clone();
        if caps.skip_extensions {
            args.push(SKIP_EXTENSIONS_FLAG.to_string());
        }
        args.push(END_OF_OPTIONS.to_string());
        args.push(caps.user_id.clone());
        args.push(caps.script_path.clone());
        args.push(text.to_string());
        args
    }

    /// Shell-quoted rendering of the invocation, for diagnostics only
    pub fn display(&self, caps: &CapabilitySet, text: &str) -> String {
        let args = self.argv(caps, text);
        shell_words::join(std::iter::once(self.program.as_str()).chain(args.iter().map(String::as_str)))
    }
}
