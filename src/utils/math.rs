//! Math utility functions

/// Dot product of two equally sized vectors
pub fn dot(a: &[f64], b: &[f64]) -> f64 {
    a.iter().zip(b.iter()).map(|(x, y)| x * y).sum()
}

/// Argmax - find index of maximum value, first one wins on ties
pub fn argmax(x: &[f64]) -> usize {
    let mut best = 0;
    for (idx, v) in x.iter().enumerate() {
        if *v > x[best] {
            best = idx;
        }
    }
    best
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_dot() {
        assert_eq!(dot(&[1.0, 2.0, 3.0], &[4.0, 5.0, 6.0]), 32.0);
        assert_eq!(dot(&[], &[]), 0.0);
    }

    #[test]
    fn test_argmax() {
        let x = vec![1.0, 5.0, 3.0, 2.0];
        assert_eq!(argmax(&x), 1);
        assert_eq!(argmax(&[2.0, 2.0]), 0);
    }
}
