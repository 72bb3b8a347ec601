pub mod analyze;
pub mod correlations;
pub mod monitor;
pub mod status;
pub mod watch;

use crate::error::Result;
use serde::Serialize;

/// Print a value as pretty JSON on stdout
pub(crate) fn print_json<T: Serialize + ?Sized>(value: &T) -> Result<()> {
    println!("{}", serde_json::to_string_pretty(value)?);
    Ok(())
}
