//! Shape arithmetic shared by the folding transforms.

use crate::error::FoldError;

/// Number of elements a shape addresses. The empty product is 1, so a rank-0
/// shape holds a single scalar.
pub fn num_elements(shape: &[usize]) -> usize {
    shape.iter().product()
}

/// Row-major (C order) strides for a contiguous tensor of `shape`.
pub fn row_major_strides(shape: &[usize]) -> Vec<i64> {
    let mut strides = vec![0i64; shape.len()];
    let mut step = 1i64;
    for (stride, &size) in strides.iter_mut().zip(shape).rev() {
        *stride = step;
        step *= size as i64;
    }
    strides
}

/// Return the result of multi-directional broadcasting `a` with `b`, or
/// `None` if the shapes are incompatible.
///
/// Shapes are aligned from the right; each dimension pair must be equal or
/// have at least one side equal to 1, and the output dimension is the larger
/// of the two.
pub fn broadcast_shapes(a: &[usize], b: &[usize]) -> Option<Vec<usize>> {
    let rank = a.len().max(b.len());
    let mut result = vec![0; rank];
    for i in 0..rank {
        let da = if i < a.len() { a[a.len() - 1 - i] } else { 1 };
        let db = if i < b.len() { b[b.len() - 1 - i] } else { 1 };
        result[rank - 1 - i] = if da == db || db == 1 {
            da
        } else if da == 1 {
            db
        } else {
            return None;
        };
    }
    Some(result)
}

/// Resolve an axis that may be negative (counting from the back) to an
/// absolute axis in `[0, ndim)`.
pub fn resolve_axis(ndim: usize, axis: i64) -> Result<usize, FoldError> {
    let rank = ndim as i64;
    let resolved = if axis < 0 { axis + rank } else { axis };
    if resolved < 0 || resolved >= rank {
        return Err(FoldError::InvalidValue("axis is out of range"));
    }
    Ok(resolved as usize)
}

/// Resolve a list of possibly-negative axes to absolute, distinct axes.
pub fn resolve_axes(ndim: usize, axes: &[i64]) -> Result<Vec<usize>, FoldError> {
    let mut resolved = Vec::with_capacity(axes.len());
    for &axis in axes {
        let abs = resolve_axis(ndim, axis)?;
        if resolved.contains(&abs) {
            return Err(FoldError::InvalidValue("duplicate axis"));
        }
        resolved.push(abs);
    }
    Ok(resolved)
}

/// True if `perm` is a permutation of `[0, ndim)`.
pub fn is_valid_permutation(ndim: usize, perm: &[usize]) -> bool {
    perm.len() == ndim && (0..ndim).all(|dim| perm.contains(&dim))
}

/// Invert a permutation.
pub fn inverse_permutation(perm: &[usize]) -> Vec<usize> {
    let mut inverse = vec![0; perm.len()];
    for (i, &p) in perm.iter().enumerate() {
        inverse[p] = i;
    }
    inverse
}

/// Slice parameters normalised to absolute literal values, one per axis of
/// the input.
#[derive(Debug, PartialEq)]
pub struct NormalizedSlice {
    /// Absolute start index per axis, in `[0, dim]` (or `[0, dim-1]` for a
    /// negative step).
    pub starts: Vec<i64>,
    /// Step per axis; never zero.
    pub steps: Vec<i64>,
    /// The resulting output shape.
    pub shape: Vec<usize>,
}

/// Normalise ONNX Slice parameters against `shape`.
///
/// `axes` defaults to all axes, `steps` to all ones. Negative starts/ends
/// count from the end of the axis, and out-of-bounds values clamp, per the
/// ONNX specification. A step of zero is an error.
pub fn normalize_slice_params(
    shape: &[usize],
    starts: &[i64],
    ends: &[i64],
    axes: Option<&[i64]>,
    steps: Option<&[i64]>,
) -> Result<NormalizedSlice, FoldError> {
    let rank = shape.len();
    let axes = match axes {
        Some(axes) => resolve_axes(rank, axes)?,
        None => (0..rank).collect(),
    };
    if starts.len() != axes.len() || ends.len() != axes.len() {
        return Err(FoldError::InvalidValue(
            "starts, ends and axes must have matching lengths",
        ));
    }
    if let Some(steps) = steps {
        if steps.len() != axes.len() {
            return Err(FoldError::InvalidValue(
                "steps must match the length of axes",
            ));
        }
    }

    let mut norm = NormalizedSlice {
        starts: vec![0; rank],
        steps: vec![1; rank],
        shape: shape.to_vec(),
    };

    for (i, &axis) in axes.iter().enumerate() {
        let dim = shape[axis] as i64;
        let step = steps.map(|s| s[i]).unwrap_or(1);
        if step == 0 {
            return Err(FoldError::IndexOutOfRange("slice step must be nonzero"));
        }

        let mut start = starts[i];
        let mut end = ends[i];
        if start < 0 {
            start += dim;
        }
        if end < 0 {
            end += dim;
        }
        let (start, end) = if step > 0 {
            (start.clamp(0, dim), end.clamp(0, dim))
        } else {
            (start.clamp(0, (dim - 1).max(0)), end.clamp(-1, dim - 1))
        };

        let span = end - start;
        let count = if step > 0 {
            (span + step - 1) / step
        } else {
            (span + step + 1).div_euclid(step)
        }
        .max(0);

        norm.starts[axis] = start;
        norm.steps[axis] = step;
        norm.shape[axis] = count as usize;
    }

    Ok(norm)
}

#[cfg(test)]
mod tests {
    use super::{
        broadcast_shapes, inverse_permutation, is_valid_permutation, normalize_slice_params,
        resolve_axes, resolve_axis, row_major_strides,
    };
    use crate::error::FoldError;

    #[test]
    fn test_row_major_strides() {
        assert_eq!(row_major_strides(&[2, 3, 4]), &[12, 4, 1]);
        assert_eq!(row_major_strides(&[5]), &[1]);
        assert_eq!(row_major_strides(&[]), &[] as &[i64]);
    }

    #[test]
    fn test_broadcast_shapes() {
        #[derive(Debug)]
        struct Case {
            a: &'static [usize],
            b: &'static [usize],
            expected: Option<&'static [usize]>,
        }

        let cases = [
            Case {
                a: &[2, 3],
                b: &[2, 3],
                expected: Some(&[2, 3]),
            },
            Case {
                a: &[2, 1],
                b: &[3],
                expected: Some(&[2, 3]),
            },
            Case {
                a: &[],
                b: &[4, 5],
                expected: Some(&[4, 5]),
            },
            Case {
                a: &[2, 3],
                b: &[2, 4],
                expected: None,
            },
            Case {
                a: &[1, 0],
                b: &[3, 1],
                expected: Some(&[3, 0]),
            },
        ];

        for case in cases {
            assert_eq!(
                broadcast_shapes(case.a, case.b),
                case.expected.map(|s| s.to_vec()),
                "case {:?}",
                case
            );
        }
    }

    #[test]
    fn test_resolve_axis() {
        assert_eq!(resolve_axis(3, 0), Ok(0));
        assert_eq!(resolve_axis(3, -1), Ok(2));
        assert_eq!(resolve_axis(3, 2), Ok(2));
        assert!(resolve_axis(3, 3).is_err());
        assert!(resolve_axis(3, -4).is_err());
    }

    #[test]
    fn test_resolve_axes_rejects_duplicates() {
        assert_eq!(resolve_axes(3, &[0, -1]), Ok(vec![0, 2]));
        assert_eq!(
            resolve_axes(3, &[0, -3]),
            Err(FoldError::InvalidValue("duplicate axis"))
        );
    }

    #[test]
    fn test_permutations() {
        assert!(is_valid_permutation(3, &[2, 0, 1]));
        assert!(!is_valid_permutation(3, &[0, 1]));
        assert!(!is_valid_permutation(3, &[0, 0, 1]));
        assert_eq!(inverse_permutation(&[2, 0, 1]), &[1, 2, 0]);
    }

    #[test]
    fn test_normalize_slice_params() {
        // starts=[1], ends=[8], steps=[2] over a 10-element axis.
        let norm = normalize_slice_params(&[10], &[1], &[8], Some(&[0]), Some(&[2])).unwrap();
        assert_eq!(norm.starts, &[1]);
        assert_eq!(norm.steps, &[2]);
        assert_eq!(norm.shape, &[4]);

        // Negative step walks backwards over the whole axis.
        let norm =
            normalize_slice_params(&[10], &[-1], &[i64::MIN], Some(&[0]), Some(&[-1])).unwrap();
        assert_eq!(norm.starts, &[9]);
        assert_eq!(norm.steps, &[-1]);
        assert_eq!(norm.shape, &[10]);

        // Out-of-range ends clamp.
        let norm = normalize_slice_params(&[5], &[0], &[100], None, None).unwrap();
        assert_eq!(norm.shape, &[5]);

        // Unlisted axes are untouched.
        let norm = normalize_slice_params(&[4, 6], &[2], &[6], Some(&[1]), None).unwrap();
        assert_eq!(norm.starts, &[0, 2]);
        assert_eq!(norm.shape, &[4, 4]);

        // Step zero is rejected.
        let err = normalize_slice_params(&[5], &[0], &[5], None, Some(&[0]));
        assert_eq!(
            err,
            Err(FoldError::IndexOutOfRange("slice step must be nonzero"))
        );
    }
}
