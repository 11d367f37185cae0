use criterion::{Criterion, criterion_group, criterion_main};
use campus_rag::embeddings::{Embedder, HashingEmbedder};
use campus_rag::index::VectorIndex;
use campus_rag::lexical::{KeywordSearch, TfidfSearch};
use std::hint::black_box;

fn passages(count: usize) -> Vec<String> {
    (0..count)
        .map(|i| {
            format!(
                "Predmet {i}: predavanja iz informatike, ekonomije i menadžmenta. Cijena {} KM.",
                1000 + i
            )
        })
        .collect()
}

pub fn criterion_benchmark(c: &mut Criterion) {
    let texts = passages(2000);
    let embedder = HashingEmbedder::new(384);
    let vectors = embedder.embed(&texts).expect("hashing embedder cannot fail");
    let index = VectorIndex::build(vectors).expect("vectors share a dimension");
    let query = embedder
        .embed_query("cijena studija informatike")
        .expect("hashing embedder cannot fail");

    c.bench_function("vector_search", |b| {
        b.iter(|| index.search(black_box(&query), black_box(5)))
    });

    let document = texts.join("\n\n");
    let tfidf = TfidfSearch::default();
    let corpus = tfidf.fit(&document);
    c.bench_function("tfidf_search", |b| {
        b.iter(|| tfidf.search(black_box(&corpus), black_box("cijena studija informatike")))
    });

    let keyword = KeywordSearch::default();
    c.bench_function("keyword_search", |b| {
        b.iter(|| keyword.search(black_box(&document), black_box("cijena studija")))
    });
}

criterion_group!(benches, criterion_benchmark);
criterion_main!(benches);
