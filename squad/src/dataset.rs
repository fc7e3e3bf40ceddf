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

//! The SQuAD dataset format.

use std::{
    fs::File,
    io::{BufReader, Read},
    path::Path,
};

use displaydoc::Display;
use serde::Deserialize;
use thiserror::Error;
use tracing::debug;

use crate::example::{OffsetMode, SquadExample};

/// The potential errors of the [`Squad`] dataset.
#[derive(Debug, Display, Error)]
pub enum DatasetError {
    /// Failed to read the dataset: {0}
    Io(#[from] std::io::Error),
    /// Failed to parse the dataset: {0}
    Json(#[from] serde_json::Error),
}

/// A SQuAD dataset.
#[derive(Clone, Debug, Deserialize)]
pub struct Squad {
    #[serde(default)]
    pub version: Option<String>,
    pub data: Vec<Article>,
}

/// A titled collection of paragraphs.
#[derive(Clone, Debug, Deserialize)]
pub struct Article {
    #[serde(default)]
    pub title: Option<String>,
    pub paragraphs: Vec<Paragraph>,
}

/// A context with questions about it.
#[derive(Clone, Debug, Deserialize)]
pub struct Paragraph {
    pub context: String,
    pub qas: Vec<QuestionAnswers>,
}

/// A question with its reference answers.
#[derive(Clone, Debug, Deserialize)]
pub struct QuestionAnswers {
    #[serde(default)]
    pub id: Option<String>,
    pub question: String,
    #[serde(default)]
    pub answers: Vec<Answer>,
    #[serde(default)]
    pub is_impossible: bool,
}

/// An answer span.
#[derive(Clone, Debug, Deserialize)]
pub struct Answer {
    pub text: String,
    /// The character offset of the answer in the context.
    pub answer_start: usize,
}

impl Squad {
    /// Reads a dataset from json.
    pub fn from_reader(reader: impl Read) -> Result<Self, DatasetError> {
        serde_json::from_reader(reader).map_err(Into::into)
    }

    /// Reads a dataset from a json file.
    pub fn from_file(path: impl AsRef<Path>) -> Result<Self, DatasetError> {
        Self::from_reader(BufReader::new(File::open(path)?))
    }

    /// Creates an example for each answerable question.
    ///
    /// The first answer is the span to align, all answers are kept as references.
    pub fn examples(&self, offset_mode: OffsetMode) -> Vec<SquadExample> {
        self.data
            .iter()
            .flat_map(|article| &article.paragraphs)
            .flat_map(|paragraph| {
                paragraph.qas.iter().filter_map(|qa| {
                    let Some(answer) = qa.answers.first() else {
                        debug!(id = ?qa.id, "skipped unanswerable question");
                        return None;
                    };
                    Some(SquadExample::new(
                        &qa.question,
                        &paragraph.context,
                        &answer.text,
                        answer.answer_start,
                        qa.answers.iter().map(|answer| &answer.text),
                        offset_mode,
                    ))
                })
            })
            .collect()
    }

    /// Counts the questions of all paragraphs.
    pub fn len(&self) -> usize {
        self.data
            .iter()
            .flat_map(|article| &article.paragraphs)
            .map(|paragraph| paragraph.qas.len())
            .sum()
    }

    /// Checks if there are no questions.
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}
