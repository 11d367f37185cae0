use criterion::{Criterion, criterion_group, criterion_main};
use campus_rag::embeddings::{ChunkingConfig, chunk_document};
use std::hint::black_box;

fn faculty_document(sections: usize) -> String {
    let mut document = String::new();
    for i in 0..sections {
        document.push_str(&format!("## Sekcija {i}\n"));
        for j in 0..12 {
            document.push_str(&format!(
                "- Stavka {j}: informacije o studijskom programu, upisu i školarini\n"
            ));
        }
        document.push_str("Dodatni opis odsjeka i kontakt podaci za studente.\n\n");
    }
    document
}

pub fn criterion_benchmark(c: &mut Criterion) {
    let document = faculty_document(200);
    let config = ChunkingConfig::default();
    c.bench_function("chunking", |b| {
        b.iter(|| chunk_document(black_box(&document), black_box(&config)))
    });
}

criterion_group!(benches, criterion_benchmark);
criterion_main!(benches);
