//! Bitstring enumeration and result metrics.

use ndarray::Array2;

/// All `2^n` bitstrings of length `n`, one per row, counting up with the
/// most significant bit in column 0.
pub fn all_bitstrings(n: usize) -> Array2<u8> {
    Array2::from_shape_fn((1 << n, n), |(row, col)| ((row >> (n - 1 - col)) & 1) as u8)
}

/// [`all_bitstrings`] rendered as space-separated strings, e.g. `"0 1 1"`.
pub fn all_bitstrings_as_strings(n: usize) -> Vec<String> {
    all_bitstrings(n)
        .rows()
        .into_iter()
        .map(|row| row.iter().map(u8::to_string).collect::<Vec<_>>().join(" "))
        .collect()
}

/// All spin configurations `1 − 2b` in the order of [`all_bitstrings`].
pub fn all_spinstrings(n: usize) -> Array2<i8> {
    all_bitstrings(n).mapv(|b| 1 - 2 * b as i8)
}

/// `(E − E_max) / (E_min − E_max)`: 1 at the ground state, 0 at the top of
/// the spectrum.
pub fn approximation_ratio(energy: f64, e_min: f64, e_max: f64) -> f64 {
    (energy - e_max) / (e_min - e_max)
}

/// Consecutive non-overlapping pairs `(a0, a1), (a2, a3), …`; an odd
/// trailing element is dropped.
pub fn pairwise<T: Clone>(items: &[T]) -> Vec<(T, T)> {
    items
        .chunks_exact(2)
        .map(|pair| (pair[0].clone(), pair[1].clone()))
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use ndarray::array;

    #[test]
    fn test_bitstrings() {
        assert_eq!(
            all_bitstrings(2),
            array![[0, 0], [0, 1], [1, 0], [1, 1]]
        );
        assert_eq!(all_bitstrings(3).row(6).to_vec(), vec![1, 1, 0]);
        assert_eq!(all_bitstrings(0).dim(), (1, 0));
    }

    #[test]
    fn test_bitstring_strings() {
        assert_eq!(all_bitstrings_as_strings(2), vec!["0 0", "0 1", "1 0", "1 1"]);
    }

    #[test]
    fn test_spinstrings() {
        assert_eq!(all_spinstrings(1), array![[1], [-1]]);
        assert_eq!(all_spinstrings(2).row(1).to_vec(), vec![1, -1]);
    }

    #[test]
    fn test_approximation_ratio() {
        assert_eq!(approximation_ratio(-4.0, -4.0, 0.0), 1.0);
        assert_eq!(approximation_ratio(0.0, -4.0, 0.0), 0.0);
        assert_eq!(approximation_ratio(-3.0, -4.0, 0.0), 0.75);
    }

    #[test]
    fn test_pairwise() {
        assert_eq!(pairwise(&[0, 1, 2, 3, 4]), vec![(0, 1), (2, 3)]);
        assert!(pairwise::<u32>(&[]).is_empty());
    }
}
