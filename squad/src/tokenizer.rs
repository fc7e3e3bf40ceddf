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

//! Tokenizers which encode sequences into word-piece ids with character offsets.

pub mod bert;
pub mod huggingface;

use tokenizers::{Encoding, Error};

use crate::config::Config;

/// A tokenized sequence.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct Tokenized {
    /// The token ids, including the special tokens.
    pub ids: Vec<u32>,
    /// The `(start, end)` character offsets of each token in the encoded sequence.
    ///
    /// Special tokens have the empty offsets `(0, 0)`.
    pub offsets: Vec<(usize, usize)>,
}

impl Tokenized {
    /// Gets the number of tokens.
    pub fn len(&self) -> usize {
        self.ids.len()
    }

    /// Checks if there are no tokens.
    pub fn is_empty(&self) -> bool {
        self.ids.is_empty()
    }
}

impl From<Encoding> for Tokenized {
    fn from(encoding: Encoding) -> Self {
        Self {
            ids: encoding.get_ids().to_vec(),
            offsets: encoding.get_offsets().to_vec(),
        }
    }
}

/// Common tokenizer interface.
pub trait Tokenize: Sized {
    /// Creates a tokenizer from a configuration.
    fn new(config: &Config<Self>) -> Result<Self, Error>;

    /// Encodes the sequence with character offsets.
    fn encode(&self, sequence: impl AsRef<str>) -> Result<Tokenized, Error>;
}
