use super::*;

#[test]
fn same_text_same_vector() {
    let embedder = HashingEmbedder::new(64);

    let a = embedder
        .embed_query("Computer Science")
        .expect("embedding should succeed");
    let b = embedder
        .embed_query("computer   science!")
        .expect("embedding should succeed");

    assert_eq!(a, b);
    assert_eq!(a.len(), 64);
    assert_eq!(a.iter().sum::<f32>(), 2.0);
}

#[test]
fn output_aligned_with_input() {
    let embedder = HashingEmbedder::default();
    let texts = vec!["one".to_string(), String::new(), "two three".to_string()];

    let vectors = embedder.embed(&texts).expect("embedding should succeed");

    assert_eq!(vectors.len(), 3);
    assert!(vectors[1].iter().all(|&v| v == 0.0));
    assert_eq!(vectors[2].iter().sum::<f32>(), 2.0);
}

#[test]
fn model_name_includes_dimension() {
    let embedder = HashingEmbedder::new(0);
    assert_eq!(embedder.dimension(), 1);
    assert_eq!(embedder.model(), "hashing-bow-1");
}

#[test]
fn buckets_are_stable_across_builds() {
    assert_eq!(bucket_of("programs", 256), 253);
    assert_eq!(bucket_of("cijena", 256), 226);
    assert_eq!(bucket_of("cijena", 1000), 418);

    let vector = HashingEmbedder::default()
        .embed_query("Programs")
        .expect("embedding should succeed");
    assert_eq!(vector[253], 1.0);
}
