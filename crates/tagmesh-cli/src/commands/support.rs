use std::io::{self, Write};

use anyhow::Result;
use serde::Serialize;

#[derive(Debug, Serialize)]
pub(super) struct SlugOutput {
    pub(super) id: String,
}

pub(super) fn print_json<T: Serialize>(value: &T) -> Result<()> {
    let mut stdout = io::stdout().lock();
    serde_json::to_writer_pretty(&mut stdout, value)?;
    writeln!(stdout)?;
    Ok(())
}
