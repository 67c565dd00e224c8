//! Vector similarity functions.

use crate::error::{DocentError, Result};

/// Euclidean norm of a vector.
pub fn magnitude(v: &[f32]) -> f32 {
    v.iter().map(|x| x * x).sum::<f32>().sqrt()
}

/// Compute cosine similarity between two vectors.
///
/// Fails if the vectors differ in length or either has zero magnitude.
pub fn cosine_similarity(a: &[f32], b: &[f32]) -> Result<f32> {
    if a.len() != b.len() || a.is_empty() {
        return Err(DocentError::DimensionMismatch(format!(
            "cannot compare vectors of length {} and {}",
            a.len(),
            b.len()
        )));
    }

    let norm_a = magnitude(a);
    let norm_b = magnitude(b);
    if norm_a == 0.0 || norm_b == 0.0 {
        return Err(DocentError::DimensionMismatch(
            "cosine similarity is undefined for zero-magnitude vectors".to_string(),
        ));
    }

    Ok(cosine_with_norms(a, b, norm_a, norm_b))
}

/// Cosine similarity with both norms already known. Callers guarantee equal
/// lengths and non-zero norms.
pub(crate) fn cosine_with_norms(a: &[f32], b: &[f32], norm_a: f32, norm_b: f32) -> f32 {
    let dot_product: f32 = a.iter().zip(b).map(|(x, y)| x * y).sum();
    dot_product / (norm_a * norm_b)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_cosine_similarity() {
        let a = vec![1.0, 0.0, 0.0];
        let b = vec![1.0, 0.0, 0.0];
        assert!((cosine_similarity(&a, &b).unwrap() - 1.0).abs() < 0.001);

        let c = vec![0.0, 1.0, 0.0];
        assert!(cosine_similarity(&a, &c).unwrap().abs() < 0.001);

        let d = vec![-1.0, 0.0, 0.0];
        assert!((cosine_similarity(&a, &d).unwrap() + 1.0).abs() < 0.001);
    }

    #[test]
    fn test_cosine_is_scale_invariant() {
        let a = vec![1.0, 2.0, 3.0];
        let b = vec![10.0, 20.0, 30.0];
        assert!((cosine_similarity(&a, &b).unwrap() - 1.0).abs() < 1e-5);
    }

    #[test]
    fn test_precomputed_norms_match() {
        let a = [3.0, 4.0];
        let b = [1.0, 2.0];
        let direct = cosine_similarity(&a, &b).unwrap();
        let cached = cosine_with_norms(&a, &b, magnitude(&a), magnitude(&b));
        assert_eq!(direct, cached);
    }

    #[test]
    fn test_length_mismatch_is_error() {
        let result = cosine_similarity(&[1.0, 0.0], &[1.0, 0.0, 0.0]);
        assert!(matches!(result, Err(DocentError::DimensionMismatch(_))));
    }

    #[test]
    fn test_zero_vector_is_error() {
        let result = cosine_similarity(&[0.0, 0.0], &[1.0, 0.0]);
        assert!(matches!(result, Err(DocentError::DimensionMismatch(_))));
    }
}
