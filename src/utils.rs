/// Mixed-radix layout of a flat table.
///
/// The first dimension varies fastest:
///
/// ```text
/// index = d[0] + d[1] * L[0] + d[2] * L[0] * L[1] + ...
/// ```
///
/// For a CPT the dimensions are the variable itself followed by its parents in
/// stored order; for a factor they are its scope. This is the one stride
/// routine in the crate: CPT lookup, factor construction, join and eliminate
/// all go through it, so tables built by any of them line up.
///
/// ```
/// use bnet_rs::utils::Layout;
///
/// let layout = Layout::new(vec![2, 3]);
/// assert_eq!(layout.size(), 6);
/// assert_eq!(layout.index(&[1, 2]), 5);
/// ```
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Layout {
    lengths: Vec<usize>,
    strides: Vec<usize>,
    size: usize,
}

impl Layout {
    pub fn new(lengths: Vec<usize>) -> Self {
        let mut strides = Vec::with_capacity(lengths.len());
        let mut size = 1;
        for &len in &lengths {
            strides.push(size);
            size *= len;
        }
        Self { lengths, strides, size }
    }

    /// Number of cells in the table.
    pub fn size(&self) -> usize {
        self.size
    }

    /// Number of dimensions.
    pub fn rank(&self) -> usize {
        self.lengths.len()
    }

    pub fn lengths(&self) -> &[usize] {
        &self.lengths
    }

    pub fn strides(&self) -> &[usize] {
        &self.strides
    }

    /// Flat index of a full digit vector.
    pub fn index(&self, digits: &[usize]) -> usize {
        debug_assert_eq!(digits.len(), self.rank());
        digits.iter().zip(&self.strides).map(|(d, s)| d * s).sum()
    }

    /// Flat index where digit `i` is read from `values[positions[i]]`.
    ///
    /// Used to project a shared value vector onto a sub-table.
    pub fn index_via(&self, positions: &[usize], values: &[usize]) -> usize {
        debug_assert_eq!(positions.len(), self.rank());
        positions
            .iter()
            .zip(&self.strides)
            .map(|(&p, s)| values[p] * s)
            .sum()
    }

    /// Enumerator over every digit vector of this layout, in flat-index order.
    pub fn odometer(&self) -> Odometer {
        Odometer::new(self.lengths.clone())
    }
}

/// Restartable enumerator of mixed-radix digit vectors.
///
/// The first digit is least significant. Starting from all zeros, each
/// [`advance`][Odometer::advance] moves to the next vector; it returns `false`
/// once the sequence wraps around. A zero-rank odometer yields exactly one
/// (empty) vector.
///
/// ```
/// use bnet_rs::utils::Odometer;
///
/// let mut od = Odometer::new(vec![2, 2]);
/// let mut seen = vec![od.digits().to_vec()];
/// while od.advance() {
///     seen.push(od.digits().to_vec());
/// }
/// assert_eq!(seen, vec![vec![0, 0], vec![1, 0], vec![0, 1], vec![1, 1]]);
/// ```
#[derive(Debug, Clone)]
pub struct Odometer {
    lengths: Vec<usize>,
    digits: Vec<usize>,
}

impl Odometer {
    pub fn new(lengths: Vec<usize>) -> Self {
        let digits = vec![0; lengths.len()];
        Self { lengths, digits }
    }

    pub fn digits(&self) -> &[usize] {
        &self.digits
    }

    /// Moves to the next digit vector. Returns `false` after the last one,
    /// leaving the odometer back at all zeros.
    pub fn advance(&mut self) -> bool {
        for (digit, &len) in self.digits.iter_mut().zip(&self.lengths) {
            *digit += 1;
            if *digit < len {
                return true;
            }
            *digit = 0;
        }
        false
    }

    pub fn reset(&mut self) {
        self.digits.fill(0);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_layout_strides() {
        let layout = Layout::new(vec![2, 3, 4]);
        assert_eq!(layout.strides(), &[1, 2, 6]);
        assert_eq!(layout.size(), 24);
        assert_eq!(layout.index(&[0, 0, 0]), 0);
        assert_eq!(layout.index(&[1, 0, 0]), 1);
        assert_eq!(layout.index(&[0, 1, 0]), 2);
        assert_eq!(layout.index(&[1, 2, 3]), 23);
    }

    #[test]
    fn test_layout_empty() {
        let layout = Layout::new(vec![]);
        assert_eq!(layout.size(), 1);
        assert_eq!(layout.rank(), 0);
        assert_eq!(layout.index(&[]), 0);
    }

    #[test]
    fn test_index_via() {
        // Sub-table over (c, a) projected from values laid out as (a, b, c).
        let layout = Layout::new(vec![3, 2]);
        let values = [1, 0, 2];
        // c = 2, a = 1
        assert_eq!(layout.index_via(&[2, 0], &values), 5);
    }

    #[test]
    fn test_odometer_matches_layout_order() {
        let layout = Layout::new(vec![2, 3, 2]);
        let mut od = layout.odometer();
        let mut i = 0;
        loop {
            assert_eq!(layout.index(od.digits()), i);
            i += 1;
            if !od.advance() {
                break;
            }
        }
        assert_eq!(i, layout.size());
        assert_eq!(od.digits(), &[0, 0, 0]);
    }

    #[test]
    fn test_odometer_zero_rank() {
        let mut od = Odometer::new(vec![]);
        assert!(od.digits().is_empty());
        assert!(!od.advance());
    }

    #[test]
    fn test_odometer_reset() {
        let mut od = Odometer::new(vec![3]);
        od.advance();
        od.advance();
        assert_eq!(od.digits(), &[2]);
        od.reset();
        assert_eq!(od.digits(), &[0]);
    }
}
