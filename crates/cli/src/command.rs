//! Command trait for the hookline CLI
//!
//! Commands that work on a repository implement [`Command`] and receive a
//! [`RuntimeContext`] holding the discovered repository and config path.
//! `sample-config`, `validate-config` and `clean` need neither and are
//! plain functions.

use crate::common::RuntimeContext;
use crate::error::Result;

/// A subcommand that runs inside a git repository
///
/// # Example
///
/// ```rust,ignore
/// use crate::command::Command;
/// use crate::common::RuntimeContext;
/// use crate::error::Result;
/// use clap::Args;
///
/// #[derive(Debug, Args)]
/// pub struct CountCommand;
///
/// impl Command for CountCommand {
///     type Output = usize;
///
///     fn execute(&self, context: &RuntimeContext) -> Result<usize> {
///         Ok(context.load_config()?.hook_count())
///     }
/// }
/// ```
pub trait Command {
    /// The type returned by this command
    type Output;

    /// Execute the command against the repository in `context`
    ///
    /// # Errors
    ///
    /// Returns a `CommandError` describing what went wrong. Failing hooks are
    /// not an error; they are part of the output.
    fn execute(&self, context: &RuntimeContext) -> Result<Self::Output>;
}
