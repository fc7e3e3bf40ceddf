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

use std::hint::black_box;

use criterion::{criterion_group, criterion_main, Criterion};
use xayn_ai_squad::{BertPreprocessor, Config, Squad};
use xayn_test_utils::asset::{bert_mocked, squad_mocked};

const CONTEXT: &str = "The quick brown fox jumps over the lazy dog. The lazy dog jumps over the quick
brown fox. Unbelievable, the quick brown fox jumps over the lazy dog fast.";

fn preprocessor() -> BertPreprocessor {
    Config::new(bert_mocked().unwrap())
        .unwrap()
        .with_max_len(64)
        .unwrap()
        .build()
        .unwrap()
}

fn bench_align(manager: &mut Criterion) {
    let preprocessor = preprocessor();
    let example = preprocessor.example("Who jumps fast?", CONTEXT, "fox", 120, ["fox"]);
    manager.bench_function("Align", |bencher| {
        bencher.iter(|| black_box(preprocessor.align(black_box(&example)).unwrap()))
    });
}

fn bench_run(manager: &mut Criterion) {
    let preprocessor = preprocessor();
    let squad = Squad::from_file(squad_mocked().unwrap()).unwrap();
    manager.bench_function("Run", |bencher| {
        bencher.iter(|| black_box(preprocessor.run(black_box(&squad)).unwrap()))
    });
}

criterion_group! {
    name = bench;
    config = Criterion::default();
    targets =
        bench_align,
        bench_run,
}

criterion_main! {
    bench,
}
