//! Shell completion scripts for kqlsh

use clap::CommandFactory;
use clap_complete::{Shell, generate};
use std::io::{self, Write};

use crate::cli::CliArgs;
use crate::error::{ConfigError, Result};

const BIN_NAME: &str = "kqlsh";

/// Print the completion script for `shell_name` to stdout
pub fn generate_completion(shell_name: &str) -> Result<()> {
    let mut stdout = io::stdout().lock();
    write_completion(shell_name, &mut stdout)?;
    stdout.flush()?;
    Ok(())
}

/// Write the completion script for `shell_name` to `out`
pub fn write_completion<W: Write>(shell_name: &str, out: &mut W) -> Result<()> {
    let shell = parse_shell(shell_name)?;
    let mut cmd = CliArgs::command();
    generate(shell, &mut cmd, BIN_NAME, out);
    Ok(())
}

/// Parse shell name string to Shell enum
fn parse_shell(shell_name: &str) -> Result<Shell> {
    match shell_name.to_lowercase().as_str() {
        "bash" => Ok(Shell::Bash),
        "zsh" => Ok(Shell::Zsh),
        "fish" => Ok(Shell::Fish),
        _ => Err(ConfigError::Generic(format!(
            "Unsupported shell: {shell_name}. Supported shells: bash, zsh, fish"
        ))
        .into()),
    }
}
