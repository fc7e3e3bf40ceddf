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

use std::{
    fs::File,
    io::{BufRead, BufReader},
};

use tokenizers::{
    decoders::wordpiece::WordPiece as WordPieceDecoder,
    models::wordpiece::{WordPiece as WordPieceModel, WordPieceBuilder},
    normalizers::bert::BertNormalizer,
    pre_tokenizers::bert::BertPreTokenizer,
    processors::bert::BertProcessing,
    Error,
    Model,
    TokenizerBuilder,
    TokenizerImpl,
};

use crate::{
    config::Config,
    tokenizer::{Tokenize, Tokenized},
};

/// A pre-configured Bert word-piece tokenizer.
///
/// Neither padding nor truncation is configured, overlong sequences are left to the aligner.
pub struct Tokenizer {
    bert: TokenizerImpl<
        WordPieceModel,
        BertNormalizer,
        BertPreTokenizer,
        BertProcessing,
        WordPieceDecoder,
    >,
}

impl Tokenize for Tokenizer {
    fn new(config: &Config<Self>) -> Result<Self, Error> {
        let vocab = BufReader::new(File::open(config.dir.join("vocab.txt"))?)
            .lines()
            .enumerate()
            .map(|(idx, word)| Ok((word?.trim().to_string(), u32::try_from(idx)?)))
            .collect::<Result<_, Error>>()?;
        let model = WordPieceBuilder::new()
            .vocab(vocab)
            .unk_token(config.extract("tokenizer.tokens.unknown")?)
            .continuing_subword_prefix(config.extract("tokenizer.tokens.continuation")?)
            .max_input_chars_per_word(config.extract("tokenizer.max-chars")?)
            .build()?;
        let normalizer = BertNormalizer::new(
            config.extract("tokenizer.cleanse-text")?,
            false,
            Some(config.extract("tokenizer.cleanse-accents")?),
            config.extract("tokenizer.lower-case")?,
        );
        let separation_token = config.extract::<String>("tokenizer.tokens.separation")?;
        let separation_id = model
            .token_to_id(&separation_token)
            .ok_or("missing separation token")?;
        let class_token = config.extract::<String>("tokenizer.tokens.class")?;
        let class_id = model
            .token_to_id(&class_token)
            .ok_or("missing class token")?;
        let post_processor =
            BertProcessing::new((separation_token, separation_id), (class_token, class_id));

        let bert = TokenizerBuilder::new()
            .with_model(model)
            .with_normalizer(Some(normalizer))
            .with_pre_tokenizer(Some(BertPreTokenizer))
            .with_post_processor(Some(post_processor))
            .build()?;

        Ok(Tokenizer { bert })
    }

    fn encode(&self, sequence: impl AsRef<str>) -> Result<Tokenized, Error> {
        self.bert
            .encode_char_offsets(sequence.as_ref(), true)
            .map(Into::into)
    }
}

#[cfg(test)]
mod tests {
    use xayn_test_utils::asset::{bert_mocked, hf_mocked};

    use super::*;

    fn tokenizer() -> Tokenizer {
        let config = Config::new(bert_mocked().unwrap()).unwrap();
        Tokenizer::new(&config).unwrap()
    }

    #[test]
    fn test_new() {
        let bert = tokenizer().bert;
        assert!(bert.get_normalizer().is_some());
        assert!(bert.get_pre_tokenizer().is_some());
        assert!(bert.get_post_processor().is_some());
        assert!(bert.get_padding().is_none());
        assert!(bert.get_truncation().is_none());
        assert!(bert.get_decoder().is_none());
    }

    #[test]
    fn test_new_missing_vocab() {
        let config = Config::new(hf_mocked().unwrap()).unwrap();
        assert!(Tokenizer::new(&config).is_err());
    }

    #[test]
    fn test_encode() {
        let encoding = tokenizer().encode("The quick brown FOX").unwrap();
        assert_eq!(encoding.ids, [2, 4, 5, 6, 7, 3]);
        assert_eq!(
            encoding.offsets,
            [(0, 0), (0, 3), (4, 9), (10, 15), (16, 19), (0, 0)],
        );
    }

    #[test]
    fn test_encode_word_pieces() {
        let encoding = tokenizer().encode("Unbelievable.").unwrap();
        assert_eq!(encoding.ids, [2, 23, 24, 25, 16, 3]);
        assert_eq!(
            encoding.offsets,
            [(0, 0), (0, 2), (2, 8), (8, 12), (12, 13), (0, 0)],
        );
    }

    #[test]
    fn test_encode_unknown() {
        let encoding = tokenizer().encode("a zebra").unwrap();
        assert_eq!(encoding.ids, [2, 18, 1, 3]);
        assert_eq!(encoding.offsets, [(0, 0), (0, 1), (2, 7), (0, 0)]);
    }

    #[test]
    fn test_encode_empty() {
        let encoding = tokenizer().encode("").unwrap();
        assert_eq!(encoding.ids, [2, 3]);
        assert_eq!(encoding.offsets, [(0, 0), (0, 0)]);
    }
}
