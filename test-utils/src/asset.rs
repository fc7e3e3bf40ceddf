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
    env::var_os,
    io::{Error, ErrorKind, Result},
    path::{Path, PathBuf},
};

const ASSETS_DIR: &str = "assets/";

/// Resolves the path to the requested data relative to the workspace directory.
fn resolve_path(path: &[impl AsRef<Path>]) -> Result<PathBuf> {
    let manifest = var_os("CARGO_MANIFEST_DIR")
        .ok_or_else(|| Error::new(ErrorKind::NotFound, "missing CARGO_MANIFEST_DIR"))?;

    let workspace = PathBuf::from(manifest)
        .ancestors()
        .find(|path| path.join(ASSETS_DIR).is_dir())
        .ok_or_else(|| Error::new(ErrorKind::NotFound, "missing cargo workspace dir"))?
        .to_path_buf();

    path.iter()
        .fold(workspace, |path, component| path.join(component))
        .canonicalize()
}

/// Resolves the path to the mocked bert word-piece model directory.
pub fn bert_mocked() -> Result<PathBuf> {
    resolve_path(&[ASSETS_DIR, "bert_mocked"])
}

/// Resolves the path to the mocked huggingface model directory.
pub fn hf_mocked() -> Result<PathBuf> {
    resolve_path(&[ASSETS_DIR, "hf_mocked"])
}

/// Resolves the path to the mocked squad dataset.
pub fn squad_mocked() -> Result<PathBuf> {
    resolve_path(&[ASSETS_DIR, "squad_mocked", "train.json"])
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_bert_mocked() {
        assert!(bert_mocked().unwrap().join("vocab.txt").is_file());
    }

    #[test]
    fn test_hf_mocked() {
        assert!(hf_mocked().unwrap().join("tokenizer.json").is_file());
    }

    #[test]
    fn test_squad_mocked() {
        assert!(squad_mocked().unwrap().is_file());
    }
}
