//! expconf: Resolve layered experiment configurations
//!
//! Loads base config files, applies `dotted.path=value` overrides, resolves
//! `${...}` interpolations and prints or saves the result.

use anyhow::Result;

fn main() -> Result<()> {
    expconf::cli::run()
}
