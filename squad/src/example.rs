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

//! Alignment of answer character spans to word-piece token spans.

use displaydoc::Display;
use serde::{Deserialize, Serialize};

use crate::tokenizer::Tokenized;

/// How the answer start offset is treated when the whitespace of the context is normalized.
#[derive(Clone, Copy, Debug, Default, Deserialize, Eq, PartialEq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum OffsetMode {
    /// Shifts the start offset by the number of characters removed before it.
    #[default]
    Remap,
    /// Keeps the start offset of the raw context unchanged.
    ///
    /// This is only correct if the normalization doesn't remove characters before the answer.
    Verbatim,
}

/// Collapses runs of whitespace into single spaces and trims the ends.
pub fn normalize_whitespace(text: &str) -> String {
    text.split_whitespace().collect::<Vec<_>>().join(" ")
}

/// Maps a character offset of the raw text to the whitespace normalized text.
///
/// Offsets pointing at removed whitespace map to the position of the next kept character.
fn remap_offset(text: &str, offset: usize) -> usize {
    let mut normalized = 0;
    let mut pending_space = false;
    for (idx, c) in text.chars().enumerate() {
        if c.is_whitespace() {
            pending_space = normalized > 0;
        } else {
            if pending_space {
                normalized += 1;
                pending_space = false;
            }
            if idx >= offset {
                return normalized;
            }
            normalized += 1;
        }
    }

    normalized
}

/// A question with its context and answer.
///
/// The question, context and answers are whitespace normalized.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct SquadExample {
    question: String,
    context: String,
    answer_text: String,
    start_char_idx: usize,
    all_answers: Vec<String>,
}

impl SquadExample {
    /// Creates an example from a raw question/answer record.
    ///
    /// The `start_char_idx` is the character offset of the answer in the raw `context`.
    pub fn new(
        question: &str,
        context: &str,
        answer_text: &str,
        start_char_idx: usize,
        all_answers: impl IntoIterator<Item = impl AsRef<str>>,
        offset_mode: OffsetMode,
    ) -> Self {
        let start_char_idx = match offset_mode {
            OffsetMode::Remap => remap_offset(context, start_char_idx),
            OffsetMode::Verbatim => start_char_idx,
        };

        Self {
            question: normalize_whitespace(question),
            context: normalize_whitespace(context),
            answer_text: normalize_whitespace(answer_text),
            start_char_idx,
            all_answers: all_answers
                .into_iter()
                .map(|answer| normalize_whitespace(answer.as_ref()))
                .collect(),
        }
    }

    pub fn question(&self) -> &str {
        &self.question
    }

    pub fn context(&self) -> &str {
        &self.context
    }

    pub fn answer_text(&self) -> &str {
        &self.answer_text
    }

    /// The character offset of the answer in the normalized context.
    pub fn start_char_idx(&self) -> usize {
        self.start_char_idx
    }

    pub fn all_answers(&self) -> &[String] {
        &self.all_answers
    }

    /// Aligns the answer span to the tokens of the context.
    ///
    /// The tokenizations must be of the normalized [`context()`] and [`question()`].
    ///
    /// [`context()`]: Self::context
    /// [`question()`]: Self::question
    pub fn align(
        &self,
        tokenized_context: &Tokenized,
        tokenized_question: &Tokenized,
        max_len: usize,
    ) -> Alignment {
        let context_len = self.context.chars().count();
        let Some(end_char_idx) = self
            .start_char_idx
            .checked_add(self.answer_text.chars().count())
            .filter(|&end_char_idx| end_char_idx < context_len)
        else {
            return Alignment::Skipped(SkipReason::OutOfBounds);
        };

        let mut is_char_in_answer = vec![false; context_len];
        is_char_in_answer[self.start_char_idx..end_char_idx].fill(true);
        let answer_token_idx = tokenized_context
            .offsets
            .iter()
            .enumerate()
            .filter_map(|(idx, &(start, end))| {
                let end = end.min(context_len);
                (start < end && is_char_in_answer[start..end].contains(&true)).then_some(idx)
            })
            .collect::<Vec<_>>();
        let (Some(&start_token_idx), Some(&end_token_idx)) =
            (answer_token_idx.first(), answer_token_idx.last())
        else {
            return Alignment::Skipped(SkipReason::NoAnswerTokens);
        };

        let question_ids = tokenized_question.ids.get(1..).unwrap_or_default();
        let len = tokenized_context.len() + question_ids.len();
        if len > max_len {
            return Alignment::Skipped(SkipReason::Overflow);
        }

        let mut input_ids = Vec::with_capacity(max_len);
        input_ids.extend_from_slice(&tokenized_context.ids);
        input_ids.extend_from_slice(question_ids);
        input_ids.resize(max_len, 0);

        let mut token_type_ids = vec![0; tokenized_context.len()];
        token_type_ids.resize(len, 1);
        token_type_ids.resize(max_len, 0);

        let mut attention_mask = vec![1; len];
        attention_mask.resize(max_len, 0);

        Alignment::Aligned(AlignedExample {
            input_ids,
            token_type_ids,
            attention_mask,
            start_token_idx,
            end_token_idx,
            context_offsets: tokenized_context.offsets.clone(),
        })
    }
}

/// Aligns an answer span of a raw record to the tokens of the context.
///
/// This is a shorthand for [`SquadExample::new()`] followed by [`SquadExample::align()`] with the
/// answer as the only reference answer.
#[allow(clippy::too_many_arguments)]
pub fn align(
    context: &str,
    question: &str,
    answer_text: &str,
    start_char_idx: usize,
    tokenized_context: &Tokenized,
    tokenized_question: &Tokenized,
    max_len: usize,
    offset_mode: OffsetMode,
) -> Alignment {
    SquadExample::new(
        question,
        context,
        answer_text,
        start_char_idx,
        [answer_text],
        offset_mode,
    )
    .align(tokenized_context, tokenized_question, max_len)
}

/// The reason why an example couldn't be aligned.
#[derive(Clone, Copy, Debug, Display, Eq, Hash, PartialEq, Serialize)]
pub enum SkipReason {
    /// the answer extends past the end of the context
    OutOfBounds,
    /// no context token overlaps the answer
    NoAnswerTokens,
    /// the encoder inputs exceed the maximum length
    Overflow,
}

/// The fixed-length encoder inputs and span targets of an example.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct AlignedExample {
    /// The context token ids followed by the question token ids, zero padded.
    pub input_ids: Vec<u32>,
    /// `0` for the context tokens, `1` for the question tokens and `0` for the padding.
    pub token_type_ids: Vec<u32>,
    /// `1` for the tokens and `0` for the padding.
    pub attention_mask: Vec<u32>,
    /// The index of the first answer token.
    pub start_token_idx: usize,
    /// The index of the last answer token.
    pub end_token_idx: usize,
    /// The character offsets of the context tokens.
    pub context_offsets: Vec<(usize, usize)>,
}

/// The outcome of an alignment.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Alignment {
    Aligned(AlignedExample),
    Skipped(SkipReason),
}

impl Alignment {
    pub fn aligned(self) -> Option<AlignedExample> {
        match self {
            Self::Aligned(aligned) => Some(aligned),
            Self::Skipped(_) => None,
        }
    }

    pub fn is_skipped(&self) -> bool {
        matches!(self, Self::Skipped(_))
    }
}
