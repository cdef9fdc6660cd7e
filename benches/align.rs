//! Diff benchmarks
//!
//! One paragraph is the usual unit of a correction pass.

use amend::diff::aligner;
use amend::DiffResult;
use criterion::{black_box, criterion_group, criterion_main, Criterion};

const WORDS: &[&str] = &[
    "the", "quick", "brown", "fox", "jumps", "over", "lazy", "dog", "while", "a", "cat",
    "sleeps", "on", "mat", "near", "door",
];

fn generate_pair(num_words: usize) -> (String, String) {
    let mut original = Vec::with_capacity(num_words);
    let mut corrected = Vec::with_capacity(num_words);

    for i in 0..num_words {
        let word = WORDS[i % WORDS.len()];
        original.push(word.to_string());
        match i % 11 {
            // typo that the correction fixes
            3 => {
                original.pop();
                original.push(format!("{}x", word));
                corrected.push(word.to_string());
            }
            // dropped word
            7 => {}
            _ => corrected.push(word.to_string()),
        }
        if i % 17 == 0 {
            corrected.push("really".to_string());
        }
    }

    (original.join(" "), corrected.join(" "))
}

fn bench_compute_sentence(c: &mut Criterion) {
    let original = "Toi di hoc and teh cat sta on the mat";
    let corrected = "Tôi đi học and the cat sat on the mat";

    c.bench_function("compute_sentence", |b| {
        b.iter(|| DiffResult::compute(black_box(original), black_box(corrected)))
    });
}

fn bench_compute_paragraph(c: &mut Criterion) {
    let (original, corrected) = generate_pair(200);

    c.bench_function("compute_paragraph_200_words", |b| {
        b.iter(|| DiffResult::compute(black_box(&original), black_box(&corrected)))
    });
}

fn bench_align_page(c: &mut Criterion) {
    let (original, corrected) = generate_pair(1000);
    let old = aligner::tokenize(&original);
    let new = aligner::tokenize(&corrected);

    c.bench_function("align_page_1000_words", |b| {
        b.iter(|| aligner::align(black_box(&old), black_box(&new)))
    });
}

criterion_group!(
    benches,
    bench_compute_sentence,
    bench_compute_paragraph,
    bench_align_page
);
criterion_main!(benches);
