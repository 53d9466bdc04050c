use anyhow::Result;

use crate::core::{Config, OutputFormat, OutputWriter};

pub fn run(config: &Config, format: OutputFormat) -> Result<()> {
    let vocabulary = config.vocabulary()?;
    OutputWriter::new(format).write_vocabulary(&vocabulary)
}
