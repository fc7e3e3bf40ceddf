// Copyright 2021 Xayn AG
//
// This program is free software: you can redistribute it and/or modify
// it under the terms of the GNU Affero General Public License as
// published by the Free Software Foundation, version 3.
//
// This program is distributed in the hope that it will be useful,
// but WITHOUT ANY WARRANTY; without even the implied warranty of
// MERCHANTABILITY or FITNESS FOR A PARTICULAR PURPOSE.  See the
// GNU Affero General Public License for more details.
//
// You should have received a copy of the GNU Affero General Public License
// along with this program.  If not, see <https://www.gnu.org/licenses/>.

//! Aligns the answers of a SQuAD dataset and writes the encoder inputs and span targets as json.

#![forbid(unsafe_code, unsafe_op_in_unsafe_fn)]
#![deny(
    clippy::pedantic,
    noop_method_call,
    rust_2018_idioms,
    unused_qualifications
)]
#![warn(unreachable_pub, rustdoc::missing_crate_level_docs)]
#![allow(clippy::module_name_repetitions)]

use std::{
    fs::File,
    io::{BufWriter, Write},
    path::PathBuf,
};

use anyhow::{Context, Result};
use clap::Parser;
use tracing::{info, instrument, level_filters::LevelFilter};
use xayn_ai_squad::{
    logging,
    tokenizer::{bert, huggingface},
    Config,
    OffsetMode,
    Squad,
};

/// Aligns the answers of a SQuAD dataset to word-piece tokens.
#[derive(Debug, Parser)]
#[clap(name = "SQuAD Preprocess", version)]
struct Args {
    /// Path to the model directory with the `config.toml`.
    #[clap(long, short)]
    model: PathBuf,
    /// Use the `tokenizer.json` instead of the `vocab.txt` of the model directory.
    #[clap(long)]
    huggingface: bool,
    /// Path to the input SQuAD json file.
    #[clap(long, short)]
    input: PathBuf,
    /// Path to the output json file.
    #[clap(long, short)]
    output: PathBuf,
    /// Fixed length of the encoder inputs, overrides the model config.
    #[clap(long)]
    max_len: Option<usize>,
    /// Translate the answer offsets through the whitespace normalization or keep them verbatim.
    #[clap(long, value_enum)]
    offset_mode: Option<Mode>,
    /// The log level.
    #[clap(long, default_value_t = LevelFilter::INFO)]
    log_level: LevelFilter,
    /// Path to an additional json log file.
    #[clap(long)]
    log_file: Option<PathBuf>,
}

#[derive(Clone, Copy, Debug, clap::ValueEnum)]
enum Mode {
    Remap,
    Verbatim,
}

impl From<Mode> for OffsetMode {
    fn from(mode: Mode) -> Self {
        match mode {
            Mode::Remap => OffsetMode::Remap,
            Mode::Verbatim => OffsetMode::Verbatim,
        }
    }
}

#[instrument(skip_all, err)]
fn preprocess(args: &Args) -> Result<()> {
    let mut config = Config::new(&args.model)
        .with_context(|| format!("invalid model config in {}", args.model.display()))?;
    if let Some(max_len) = args.max_len {
        config = config.with_max_len(max_len)?;
    }
    if let Some(mode) = args.offset_mode {
        config = config.with_offset_mode(mode.into());
    }

    let squad = Squad::from_file(&args.input)
        .with_context(|| format!("invalid dataset {}", args.input.display()))?;
    let batch = if args.huggingface {
        config.with_tokenizer::<huggingface::Tokenizer>().build()?.run(&squad)?
    } else {
        config.with_tokenizer::<bert::Tokenizer>().build()?.run(&squad)?
    };

    let mut writer = BufWriter::new(File::create(&args.output)?);
    serde_json::to_writer(&mut writer, &batch)?;
    writer.flush()?;
    info!(samples = batch.len(), output = %args.output.display(), "wrote batch");

    Ok(())
}

fn main() -> Result<()> {
    let args = Args::parse();
    logging::initialize_global(args.log_level, args.log_file.as_deref())?;
    preprocess(&args)
}
