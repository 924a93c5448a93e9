use neardup::{
    IndexConfig, IndexConfigError, LshIndex, MinHash, MinHashConfig, MinHashConfigError,
    NearDuplicateIndex, PipelineError,
};

#[test]
fn jaccard_with_different_seed_fails() {
    let a = MinHash::new(128, 1).unwrap();
    let b = MinHash::new(128, 2).unwrap();
    assert_eq!(
        a.jaccard(&b),
        Err(MinHashConfigError::SeedMismatch { left: 1, right: 2 })
    );
}

#[test]
fn jaccard_with_different_length_fails() {
    let a = MinHash::new(128, 1).unwrap();
    let b = MinHash::new(64, 1).unwrap();
    assert!(matches!(
        a.jaccard(&b),
        Err(MinHashConfigError::LengthMismatch {
            left: 128,
            right: 64
        })
    ));
}

#[test]
fn insert_and_query_with_wrong_length_fail() {
    let mut index = LshIndex::new(IndexConfig::default()).unwrap();
    let short = MinHash::new(64, 1).unwrap();

    let expected = IndexConfigError::SignatureLength {
        expected: 128,
        actual: 64,
    };
    assert_eq!(index.insert("short", &short), Err(expected.clone()));
    assert_eq!(index.query(&short), Err(expected));
    assert!(index.is_empty());
}

#[test]
fn uneven_banding_is_rejected() {
    let cfg = IndexConfig::new().with_num_bands(3).with_num_perm(128);
    assert!(matches!(
        LshIndex::new(cfg),
        Err(IndexConfigError::UnevenBands {
            num_perm: 128,
            num_bands: 3
        })
    ));
}

#[test]
fn zero_permutations_bubble_up_through_pipeline() {
    let result = neardup::signature_for_text("text", &MinHashConfig::new().with_num_perm(0));
    assert_eq!(
        result.unwrap_err(),
        PipelineError::MinHash(MinHashConfigError::ZeroPermutations)
    );
}

#[test]
fn index_errors_bubble_up_through_pipeline() {
    let result = NearDuplicateIndex::with_configs(
        MinHashConfig::default(),
        IndexConfig::new().with_num_bands(0),
    );
    assert_eq!(
        result.unwrap_err(),
        PipelineError::Index(IndexConfigError::ZeroBands)
    );
}
