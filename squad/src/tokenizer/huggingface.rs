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

use anyhow::anyhow;
use tokenizers::{tokenizer::Tokenizer as HfTokenizer, Error};

use crate::{
    config::Config,
    tokenizer::{Tokenize, Tokenized},
};

/// A pre-configured huggingface tokenizer.
///
/// Any padding or truncation of the `tokenizer.json` is disabled.
pub struct Tokenizer {
    hf_tokenizer: HfTokenizer,
    add_special_tokens: bool,
}

impl Tokenize for Tokenizer {
    fn new(config: &Config<Self>) -> Result<Self, Error> {
        let tokenizer = config.dir.join("tokenizer.json");
        if !tokenizer.exists() {
            return Err(anyhow!("tokenizer '{}' doesn't exist", tokenizer.display()).into());
        }
        let mut hf_tokenizer = HfTokenizer::from_file(tokenizer)?;
        hf_tokenizer.with_padding(None);
        hf_tokenizer.with_truncation(None)?;
        let add_special_tokens = config.extract::<bool>("tokenizer.add-special-tokens")?;

        Ok(Tokenizer {
            hf_tokenizer,
            add_special_tokens,
        })
    }

    fn encode(&self, sequence: impl AsRef<str>) -> Result<Tokenized, Error> {
        self.hf_tokenizer
            .encode_char_offsets(sequence.as_ref(), self.add_special_tokens)
            .map(Into::into)
    }
}
