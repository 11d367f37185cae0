use super::*;

fn index_of(vectors: &[&[f32]]) -> VectorIndex {
    VectorIndex::build(vectors.iter().map(|v| v.to_vec()).collect())
        .expect("index should build")
}

#[test]
fn empty_index_returns_nothing() {
    let index = VectorIndex::build(Vec::new()).expect("empty build should succeed");

    assert!(index.is_empty());
    assert_eq!(index.dimension(), 0);
    assert!(
        index
            .search(&[1.0, 0.0, 0.0], 3)
            .expect("search should succeed")
            .is_empty()
    );
}

#[test]
fn nearest_vector_ranks_first() {
    let index = index_of(&[&[0.0, 1.0], &[1.0, 0.1], &[-1.0, 0.0]]);

    let hits = index.search(&[1.0, 0.0], 3).expect("search should succeed");

    let positions: Vec<usize> = hits.iter().map(|h| h.position).collect();
    assert_eq!(positions, vec![1, 0, 2]);
    assert!(hits[0].score > 0.99);
    assert!(hits[2].score < -0.99);
}

#[test]
fn scores_ignore_magnitude() {
    let index = index_of(&[&[10.0, 0.0], &[0.5, 0.0]]);

    let hits = index.search(&[3.0, 0.0], 2).expect("search should succeed");

    assert!((hits[0].score - 1.0).abs() < 1e-6);
    assert!((hits[1].score - 1.0).abs() < 1e-6);
}

#[test]
fn ties_keep_lower_position_first() {
    let index = index_of(&[&[0.0, 1.0], &[1.0, 0.0], &[2.0, 0.0], &[1.0, 0.0]]);

    let hits = index.search(&[1.0, 0.0], 3).expect("search should succeed");

    let positions: Vec<usize> = hits.iter().map(|h| h.position).collect();
    assert_eq!(positions, vec![1, 2, 3]);
}

#[test]
fn k_bounds() {
    let index = index_of(&[&[1.0, 0.0], &[0.0, 1.0]]);

    assert!(
        index
            .search(&[1.0, 0.0], 0)
            .expect("search should succeed")
            .is_empty()
    );
    assert_eq!(
        index
            .search(&[1.0, 0.0], 10)
            .expect("search should succeed")
            .len(),
        2
    );
}

#[test]
fn query_dimension_mismatch() {
    let index = index_of(&[&[1.0, 0.0, 0.0]]);

    let err = index.search(&[1.0, 0.0], 1).expect_err("should reject query");
    assert!(matches!(
        err,
        RagError::DimensionMismatch {
            expected: 3,
            actual: 2
        }
    ));
}

#[test]
fn build_rejects_mixed_dimensions() {
    let result = VectorIndex::build(vec![vec![1.0, 0.0], vec![1.0, 0.0, 0.0]]);
    assert!(matches!(
        result,
        Err(RagError::DimensionMismatch {
            expected: 2,
            actual: 3
        })
    ));

    assert!(VectorIndex::build(vec![Vec::new()]).is_err());
}

#[test]
fn zero_vectors_score_zero() {
    let index = index_of(&[&[0.0, 0.0], &[1.0, 1.0]]);

    let hits = index.search(&[1.0, 1.0], 2).expect("search should succeed");

    assert_eq!(hits[0].position, 1);
    assert_eq!(hits[1].position, 0);
    assert_eq!(hits[1].score, 0.0);
}

#[test]
fn stored_vectors_are_normalized() {
    let index = index_of(&[&[3.0, 4.0]]);

    let stored = index.vector(0).expect("vector 0 should exist");
    assert!((stored[0] - 0.6).abs() < 1e-6);
    assert!((stored[1] - 0.8).abs() < 1e-6);
    assert!(index.vector(1).is_none());
}

#[test]
fn non_finite_scores_rank_last() {
    let index = VectorIndex::from_normalized(2, vec![f32::NAN, 0.0, 0.0, 1.0])
        .expect("raw index should load");

    let hits = index.search(&[0.0, 1.0], 2).expect("search should succeed");

    assert_eq!(hits[0].position, 1);
    assert_eq!(hits[1].score, f32::NEG_INFINITY);
}

#[test]
fn from_normalized_rejects_ragged_buffer() {
    assert!(VectorIndex::from_normalized(3, vec![0.0; 4]).is_err());
    assert!(VectorIndex::from_normalized(0, vec![1.0]).is_err());
    assert!(
        VectorIndex::from_normalized(0, Vec::new())
            .expect("empty buffer is valid")
            .is_empty()
    );
}
