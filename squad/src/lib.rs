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

//! Preprocessing of SQuAD examples for extractive question answering with Bert.
//!
//! The answers of the examples are given as character spans of their contexts. The preprocessor
//! tokenizes the contexts and questions into word-pieces, aligns the answer spans to token spans
//! and stacks the examples into fixed-length encoder inputs and span targets. Predictions of a
//! model for those inputs can be scored with the exact match metric.
//!
//! See the binary in this crate for usage details.

#![forbid(unsafe_op_in_unsafe_fn)]
#![deny(
    clippy::future_not_send,
    clippy::pedantic,
    noop_method_call,
    rust_2018_idioms,
    unsafe_code,
    unused_qualifications
)]
#![warn(unreachable_pub, rustdoc::missing_crate_level_docs)]
#![allow(
    clippy::items_after_statements,
    clippy::missing_errors_doc,
    clippy::module_name_repetitions,
    clippy::must_use_candidate
)]

mod batch;
mod config;
mod dataset;
mod example;
mod exact_match;
pub mod logging;
mod pipeline;
pub mod tokenizer;

pub use crate::{
    batch::{Batch, Inputs, Sample, Targets},
    config::Config,
    dataset::{Answer, Article, DatasetError, Paragraph, QuestionAnswers, Squad},
    exact_match::{exact_match, normalize_answer, predict_answer, EvaluationError},
    example::{
        align,
        normalize_whitespace,
        AlignedExample,
        Alignment,
        OffsetMode,
        SkipReason,
        SquadExample,
    },
    pipeline::{PreprocessError, Preprocessor},
};

/// A Bert preprocessor.
pub type BertPreprocessor = Preprocessor<tokenizer::bert::Tokenizer>;
