use super::*;

struct FixedEmbedder;

impl Embedder for FixedEmbedder {
    fn model(&self) -> &str {
        "fixed"
    }

    fn embed(&self, texts: &[String]) -> Result<Vec<Vec<f32>>> {
        Ok(texts.iter().map(|t| vec![t.len() as f32, 1.0]).collect())
    }
}

#[test]
fn embed_query_uses_batch_path() {
    let vector = FixedEmbedder
        .embed_query("abc")
        .expect("embedding should succeed");
    assert_eq!(vector, vec![3.0, 1.0]);
}

#[test]
fn boxed_embedder_delegates() {
    let boxed: Box<dyn Embedder> = Box::new(FixedEmbedder);
    assert_eq!(boxed.model(), "fixed");
    assert_eq!(
        boxed
            .embed(&["a".to_string(), "bb".to_string()])
            .expect("embedding should succeed")
            .len(),
        2
    );
}

#[test]
fn check_embeddings_count_mismatch() {
    let err = check_embeddings(&[vec![1.0]], 2, None).expect_err("count mismatch should fail");
    assert!(matches!(err, RagError::EmbeddingFailure(_)));
}

#[test]
fn check_embeddings_dimension_mismatch() {
    let err = check_embeddings(&[vec![1.0, 2.0], vec![1.0]], 2, Some(2))
        .expect_err("dimension mismatch should fail");
    assert!(matches!(err, RagError::EmbeddingFailure(_)));
    assert!(check_embeddings(&[vec![1.0, 2.0]], 1, Some(2)).is_ok());
}
