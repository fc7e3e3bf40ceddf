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

use displaydoc::Display;
use itertools::Itertools;
#[cfg(feature = "multithreaded")]
use rayon::iter::{IntoParallelRefIterator, ParallelIterator};
use thiserror::Error;
use tracing::{debug, info};

use crate::{
    batch::{Batch, Sample},
    dataset::Squad,
    example::{Alignment, OffsetMode, SkipReason, SquadExample},
    tokenizer::Tokenize,
};

/// A preprocessor can be built from a [`Config`] and consists of a tokenizer and the alignment
/// parameters.
///
/// [`Config`]: crate::config::Config
pub struct Preprocessor<T> {
    pub(crate) tokenizer: T,
    pub(crate) max_len: usize,
    pub(crate) offset_mode: OffsetMode,
}

/// The potential errors of the [`Preprocessor`].
#[derive(Debug, Display, Error)]
pub enum PreprocessError {
    /// Failed to configure the preprocessor: {0}
    Config(#[from] figment::Error),
    /// Failed to run the tokenizer: {0}
    Tokenizer(#[from] tokenizers::Error),
}

impl<T> Preprocessor<T>
where
    T: Tokenize,
{
    /// Creates an example from a raw question/answer record.
    pub fn example(
        &self,
        question: &str,
        context: &str,
        answer_text: &str,
        start_char_idx: usize,
        all_answers: impl IntoIterator<Item = impl AsRef<str>>,
    ) -> SquadExample {
        SquadExample::new(
            question,
            context,
            answer_text,
            start_char_idx,
            all_answers,
            self.offset_mode,
        )
    }

    /// Tokenizes and aligns the example.
    pub fn align(&self, example: &SquadExample) -> Result<Alignment, PreprocessError> {
        let context = self.tokenizer.encode(example.context())?;
        let question = self.tokenizer.encode(example.question())?;

        Ok(example.align(&context, &question, self.max_len))
    }

    /// Gets the fixed length of the encoder inputs.
    pub fn max_len(&self) -> usize {
        self.max_len
    }

    /// Gets the offset mode.
    pub fn offset_mode(&self) -> OffsetMode {
        self.offset_mode
    }
}

impl<T> Preprocessor<T>
where
    T: Tokenize + Sync,
{
    /// Aligns the examples and stacks the aligned ones into a batch.
    ///
    /// Skipped examples are left out, the order of the remaining examples is kept.
    pub fn batch(&self, examples: Vec<SquadExample>) -> Result<Batch, PreprocessError> {
        #[cfg(feature = "multithreaded")]
        let alignments = examples
            .par_iter()
            .map(|example| self.align(example))
            .collect::<Result<Vec<_>, _>>()?;
        #[cfg(not(feature = "multithreaded"))]
        let alignments = examples
            .iter()
            .map(|example| self.align(example))
            .collect::<Result<Vec<_>, _>>()?;

        let total = examples.len();
        let mut skipped = Vec::new();
        let samples = examples
            .into_iter()
            .zip(alignments)
            .filter_map(|(example, alignment)| match alignment {
                Alignment::Aligned(aligned) => Some(Sample { example, aligned }),
                Alignment::Skipped(reason) => {
                    debug!(question = example.question(), %reason, "skipped example");
                    skipped.push(reason);
                    None
                }
            })
            .collect::<Vec<_>>();

        let skipped = skipped.into_iter().counts();
        let count = |reason: SkipReason| skipped.get(&reason).copied().unwrap_or_default();
        info!(
            examples = total,
            aligned = samples.len(),
            out_of_bounds = count(SkipReason::OutOfBounds),
            no_answer_tokens = count(SkipReason::NoAnswerTokens),
            overflow = count(SkipReason::Overflow),
            "aligned examples",
        );

        Ok(Batch::new(self.max_len, samples))
    }

    /// Creates, aligns and stacks the examples of the dataset.
    pub fn run(&self, squad: &Squad) -> Result<Batch, PreprocessError> {
        self.batch(squad.examples(self.offset_mode))
    }
}

#[cfg(test)]
mod tests {
    use xayn_test_utils::{
        asset::{bert_mocked, hf_mocked, squad_mocked},
        error::Panic,
    };

    use super::*;
    use crate::{config::Config, tokenizer::huggingface};

    fn preprocessor() -> Preprocessor<crate::tokenizer::bert::Tokenizer> {
        Config::new(bert_mocked().unwrap()).unwrap().build().unwrap()
    }

    #[test]
    fn test_align() -> Result<(), Panic> {
        let preprocessor = preprocessor();
        let example = preprocessor.example(
            "What color is the fox?",
            "The quick brown fox",
            "quick",
            4,
            ["quick"],
        );
        let aligned = preprocessor.align(&example)?.aligned().unwrap();
        assert_eq!(aligned.start_token_idx, 2);
        assert_eq!(aligned.end_token_idx, 2);
        assert_eq!(aligned.input_ids.len(), preprocessor.max_len());
        assert_eq!(
            aligned.input_ids[..14],
            [2, 4, 5, 6, 7, 3, 12, 13, 14, 4, 7, 15, 3, 0],
        );
        Ok(())
    }

    #[test]
    fn test_align_word_pieces() -> Result<(), Panic> {
        let preprocessor = preprocessor();
        let context = "Unbelievable jumps.";
        for (answer, start, span) in [
            ("Unbelievable", 0, (1, 3)),
            ("believ", 2, (2, 2)),
            ("lievable", 4, (2, 3)),
            ("jumps", 13, (4, 4)),
        ] {
            let example = preprocessor.example("Who jumps?", context, answer, start, [answer]);
            let aligned = preprocessor.align(&example)?.aligned().unwrap();
            assert_eq!((aligned.start_token_idx, aligned.end_token_idx), span);
        }
        Ok(())
    }

    #[test]
    fn test_align_out_of_bounds() -> Result<(), Panic> {
        let preprocessor = preprocessor();
        let example = preprocessor.example("Who?", "The quick brown fox.", "quick", 100, ["quick"]);
        assert_eq!(
            preprocessor.align(&example)?,
            Alignment::Skipped(SkipReason::OutOfBounds),
        );
        Ok(())
    }

    #[test]
    fn test_align_overflow() -> Result<(), Panic> {
        let preprocessor = Config::new(bert_mocked()?)?.with_max_len(8)?.build()?;
        let example = preprocessor.example("Who?", "The quick brown fox", "quick", 4, ["quick"]);
        assert_eq!(
            preprocessor.align(&example)?,
            Alignment::Skipped(SkipReason::Overflow),
        );
        Ok(())
    }

    #[test]
    fn test_align_huggingface() -> Result<(), Panic> {
        let preprocessor = Config::new(hf_mocked()?)?
            .with_tokenizer::<huggingface::Tokenizer>()
            .build()?;
        let example = preprocessor.example(
            "What color is the fox?",
            "The quick brown fox jumps",
            "brown fox",
            10,
            ["brown fox"],
        );
        let aligned = preprocessor.align(&example)?.aligned().unwrap();
        assert_eq!((aligned.start_token_idx, aligned.end_token_idx), (3, 4));
        assert_eq!(aligned.input_ids.len(), 64);
        Ok(())
    }

    #[test]
    fn test_run() -> Result<(), Panic> {
        let squad = Squad::from_file(squad_mocked()?)?;
        let batch = preprocessor().run(&squad)?;

        assert_eq!(batch.len(), 3);
        assert_eq!(batch.inputs.input_ids.shape(), [3, 32]);
        assert_eq!(batch.inputs.token_type_ids.shape(), [3, 32]);
        assert_eq!(batch.inputs.attention_mask.shape(), [3, 32]);
        assert_eq!(batch.targets.start_token_idx.to_vec(), [3, 1, 6]);
        assert_eq!(batch.targets.end_token_idx.to_vec(), [3, 4, 6]);
        let questions = batch
            .samples()
            .iter()
            .map(|sample| sample.example.question())
            .collect::<Vec<_>>();
        assert_eq!(
            questions,
            [
                "What color is the fox?",
                "Who jumps over the dog?",
                "Which animal jumps fast?",
            ],
        );
        Ok(())
    }

    #[test]
    fn test_run_verbatim() -> Result<(), Panic> {
        let squad = Squad::from_file(squad_mocked()?)?;
        let batch = Config::new(bert_mocked()?)?
            .with_offset_mode(OffsetMode::Verbatim)
            .build()?
            .run(&squad)?;

        assert_eq!(batch.len(), 3);
        // the raw offset of "fox" points at "jumps" after the whitespace is collapsed
        assert_eq!(batch.targets.start_token_idx.to_vec(), [3, 1, 7]);
        assert_eq!(batch.targets.end_token_idx.to_vec(), [3, 4, 7]);
        Ok(())
    }
}
