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

use std::{marker::PhantomData, path::PathBuf};

use figment::{
    error::{Actual, Error, Kind},
    providers::{Format, Toml},
    Figment,
};
use serde::Deserialize;

use crate::{
    example::OffsetMode,
    pipeline::{PreprocessError, Preprocessor},
    tokenizer::{bert::Tokenizer, Tokenize},
};

/// A preprocessor configuration.
///
/// # Example
///
/// The configuration for a Bert preprocessor:
///
/// ```toml
/// # the config file is always named `config.toml`
///
/// # the path is always `vocab.txt` for the bert tokenizer and `tokenizer.json` for the
/// # huggingface tokenizer
/// [tokenizer]
/// cleanse-accents = true
/// cleanse-text = true
/// lower-case = true
/// max-chars = 100
/// # huggingface tokenizer only
/// add-special-tokens = true
///
/// # tokens-related configs of the tokenizer, may differ between tokenizers
/// [tokenizer.tokens]
/// # the `max len` must be in the inclusive range
/// size.min = 2
/// size.max = 512
/// class = "[CLS]"
/// separation = "[SEP]"
/// unknown = "[UNK]"
/// continuation = "##"
///
/// # optional, the alignment configs
/// [squad]
/// max-len = 384
/// offset-mode = "remap"
/// ```
#[must_use]
pub struct Config<T> {
    pub dir: PathBuf,
    toml: Figment,
    pub(crate) max_len: usize,
    pub(crate) offset_mode: OffsetMode,
    tokenizer: PhantomData<T>,
}

impl Config<Tokenizer> {
    /// Creates a preprocessor configuration.
    pub fn new(dir: impl Into<PathBuf>) -> Result<Self, Error> {
        let dir = dir.into();
        let toml = Figment::from(Toml::file(dir.join("config.toml")));
        let min = toml.extract_inner::<usize>(Self::MIN_TOKEN_SIZE)?;
        let max = toml.extract_inner::<usize>(Self::MAX_TOKEN_SIZE)?;
        let offset_mode = if toml.contains(Self::OFFSET_MODE) {
            toml.extract_inner(Self::OFFSET_MODE)?
        } else {
            OffsetMode::default()
        };

        let config = Self {
            dir,
            toml,
            max_len: Self::DEFAULT_MAX_LEN.min(max).max(min),
            offset_mode,
            tokenizer: PhantomData,
        };
        if config.toml.contains(Self::MAX_LEN) {
            let max_len = config.extract(Self::MAX_LEN)?;
            config.with_max_len(max_len)
        } else {
            Ok(config)
        }
    }
}

impl<T> Config<T> {
    const DEFAULT_MAX_LEN: usize = 384;
    const MIN_TOKEN_SIZE: &str = "tokenizer.tokens.size.min";
    const MAX_TOKEN_SIZE: &str = "tokenizer.tokens.size.max";
    const MAX_LEN: &str = "squad.max-len";
    const OFFSET_MODE: &str = "squad.offset-mode";

    pub fn extract<'b, V>(&self, key: &str) -> Result<V, Error>
    where
        V: Deserialize<'b>,
    {
        self.toml.extract_inner(key).map_err(Into::into)
    }

    /// Sets the fixed length of the encoder inputs.
    ///
    /// Defaults to `squad.max-len` or else `384` clamped to the token size range.
    ///
    /// # Errors
    /// Fails if `max_len` is not within the token size range.
    pub fn with_max_len(mut self, max_len: usize) -> Result<Self, Error> {
        let min = self.extract::<usize>(Self::MIN_TOKEN_SIZE)?;
        let max = self.extract::<usize>(Self::MAX_TOKEN_SIZE)?;

        if (min..=max).contains(&max_len) {
            self.max_len = max_len;
            Ok(self)
        } else {
            Err(Error::from(Kind::InvalidValue(
                Actual::Unsigned(max_len as u128),
                format!("{min}..={max}"),
            )))
        }
    }

    /// Sets how answer offsets are treated when whitespace is normalized.
    ///
    /// Defaults to `squad.offset-mode` or else [`OffsetMode::Remap`].
    pub fn with_offset_mode(mut self, offset_mode: OffsetMode) -> Self {
        self.offset_mode = offset_mode;
        self
    }

    /// Sets the tokenizer for the preprocessor.
    ///
    /// Defaults to `bert::Tokenizer`.
    pub fn with_tokenizer<U>(self) -> Config<U> {
        Config {
            dir: self.dir,
            toml: self.toml,
            max_len: self.max_len,
            offset_mode: self.offset_mode,
            tokenizer: PhantomData,
        }
    }

    /// Gets the fixed length of the encoder inputs.
    pub fn max_len(&self) -> usize {
        self.max_len
    }

    /// Gets the offset mode.
    pub fn offset_mode(&self) -> OffsetMode {
        self.offset_mode
    }

    /// Creates a preprocessor from a configuration.
    pub fn build(&self) -> Result<Preprocessor<T>, PreprocessError>
    where
        T: Tokenize,
    {
        let tokenizer = T::new(self)?;

        Ok(Preprocessor {
            tokenizer,
            max_len: self.max_len,
            offset_mode: self.offset_mode,
        })
    }
}
