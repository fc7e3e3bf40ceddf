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

//! Exact match evaluation of predicted answer spans.

use displaydoc::Display;
use itertools::Itertools;
use ndarray::{ArrayView1, ArrayView2};
use once_cell::sync::Lazy;
use regex::Regex;
use thiserror::Error;
use tracing::info;

use crate::batch::{Batch, Sample};

/// The potential errors of the exact match evaluation.
#[derive(Debug, Display, Error)]
pub enum EvaluationError {
    /// Invalid logits of shape {actual:?}, expected shape {expected:?}
    Shape {
        expected: (usize, usize),
        actual: (usize, usize),
    },
}

/// Normalizes an answer for comparison.
///
/// Lower cases the text, removes punctuation and articles and collapses whitespace.
pub fn normalize_answer(text: impl AsRef<str>) -> String {
    // match the english articles as whole words
    static ARTICLES: Lazy<Regex> = Lazy::new(|| Regex::new(r"\b(a|an|the)\b").unwrap());

    let text = text
        .as_ref()
        .to_lowercase()
        .chars()
        .filter(|c| !c.is_ascii_punctuation())
        .collect::<String>();
    ARTICLES
        .replace_all(&text, " ")
        .split_whitespace()
        .join(" ")
}

/// Gets the index of the first maximum.
fn argmax(logits: ArrayView1<'_, f32>) -> usize {
    logits
        .iter()
        .position_min_by(|a, b| b.total_cmp(a))
        .unwrap_or_default()
}

/// Extracts the answer predicted by the token span from the context of the sample.
///
/// Returns `None` if the start token isn't a context token. An end token beyond the context
/// tokens extends the answer to the end of the context.
pub fn predict_answer(
    sample: &Sample,
    start_token_idx: usize,
    end_token_idx: usize,
) -> Option<String> {
    let offsets = &sample.aligned.context_offsets;
    let &(start_char_idx, _) = offsets.get(start_token_idx)?;
    let context = sample.example.context();
    let answer = if let Some(&(_, end_char_idx)) = offsets.get(end_token_idx) {
        context
            .chars()
            .skip(start_char_idx)
            .take(end_char_idx.saturating_sub(start_char_idx))
            .collect()
    } else {
        context.chars().skip(start_char_idx).collect()
    };

    Some(answer)
}

/// Computes the share of samples whose predicted answer matches any reference answer.
///
/// The logits are of shape `(batch_size, max_len)`, the predicted span of a sample is the
/// arg-max of its start and end logits.
pub fn exact_match(
    batch: &Batch,
    start_logits: ArrayView2<'_, f32>,
    end_logits: ArrayView2<'_, f32>,
) -> Result<f32, EvaluationError> {
    let expected = (batch.len(), batch.max_len());
    for actual in [start_logits.dim(), end_logits.dim()] {
        if actual != expected {
            return Err(EvaluationError::Shape { expected, actual });
        }
    }
    if batch.is_empty() {
        return Ok(0.);
    }

    let matches = batch
        .samples()
        .iter()
        .zip(start_logits.rows())
        .zip(end_logits.rows())
        .filter(|((sample, start_logits), end_logits)| {
            predict_answer(sample, argmax(*start_logits), argmax(*end_logits)).map_or(
                false,
                |prediction| {
                    let prediction = normalize_answer(prediction);
                    sample
                        .example
                        .all_answers()
                        .iter()
                        .any(|answer| normalize_answer(answer) == prediction)
                },
            )
        })
        .count();
    #[allow(clippy::cast_precision_loss)] // batch sizes are small
    let score = matches as f32 / batch.len() as f32;
    info!(exact_match = score, samples = batch.len(), "evaluated predicted answers");

    Ok(score)
}
