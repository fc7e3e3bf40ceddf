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

use ndarray::{Array1, Array2};
use serde::Serialize;

use crate::example::{AlignedExample, SquadExample};

/// An example together with its successful alignment.
#[derive(Clone, Debug)]
pub struct Sample {
    pub example: SquadExample,
    pub aligned: AlignedExample,
}

/// The encoder inputs of a batch, each of shape `(batch_size, max_len)`.
#[derive(Clone, Debug, Serialize)]
pub struct Inputs {
    pub input_ids: Array2<i64>,
    pub token_type_ids: Array2<i64>,
    pub attention_mask: Array2<i64>,
}

/// The answer span targets of a batch, each of shape `(batch_size,)`.
#[derive(Clone, Debug, Serialize)]
pub struct Targets {
    pub start_token_idx: Array1<i64>,
    pub end_token_idx: Array1<i64>,
}

/// Stacked inputs and targets of aligned examples.
///
/// The samples are kept in the same order as the rows of the arrays.
#[derive(Clone, Debug, Serialize)]
pub struct Batch {
    pub inputs: Inputs,
    pub targets: Targets,
    #[serde(skip)]
    samples: Vec<Sample>,
}

impl Batch {
    /// Stacks the samples.
    ///
    /// The samples must be aligned with the same `max_len` as the batch.
    pub fn new(max_len: usize, samples: Vec<Sample>) -> Self {
        debug_assert!(
            samples
                .iter()
                .all(|sample| sample.aligned.input_ids.len() == max_len),
            "samples must be aligned with the max_len of the batch",
        );
        let shape = (samples.len(), max_len);
        let stack = |input: fn(&AlignedExample) -> &[u32]| {
            Array2::from_shape_fn(shape, |(i, j)| {
                input(&samples[i].aligned)
                    .get(j)
                    .copied()
                    .map_or(0, i64::from)
            })
        };
        let inputs = Inputs {
            input_ids: stack(|aligned| aligned.input_ids.as_slice()),
            token_type_ids: stack(|aligned| aligned.token_type_ids.as_slice()),
            attention_mask: stack(|aligned| aligned.attention_mask.as_slice()),
        };

        #[allow(clippy::cast_possible_wrap)] // token indices are bounded by max_len
        let targets = Targets {
            start_token_idx: samples
                .iter()
                .map(|sample| sample.aligned.start_token_idx as i64)
                .collect(),
            end_token_idx: samples
                .iter()
                .map(|sample| sample.aligned.end_token_idx as i64)
                .collect(),
        };

        Self {
            inputs,
            targets,
            samples,
        }
    }

    /// Gets the number of samples.
    pub fn len(&self) -> usize {
        self.samples.len()
    }

    /// Checks if there are no samples.
    pub fn is_empty(&self) -> bool {
        self.samples.is_empty()
    }

    /// Gets the fixed length of the inputs.
    pub fn max_len(&self) -> usize {
        self.inputs.input_ids.ncols()
    }

    pub fn samples(&self) -> &[Sample] {
        &self.samples
    }
}
