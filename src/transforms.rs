//! The tensor algebra behind the operator evaluators.
//!
//! Every function returns a new [`Elements`]; inputs are never mutated.
//! Transforms that are expressible as an affine index transform (transpose,
//! slice, expand, contiguous reshape, split) return lazy views over their
//! input. Transforms whose consumers need contiguous storage (combine, cast,
//! reduce) materialise eagerly, and gather/scatter/concat defer their copy
//! into a lazy producer. Splat inputs produce splat outputs wherever the
//! result is uniform.

use smallvec::SmallVec;

use crate::dtype::ElementType;
use crate::elements::Elements;
use crate::error::FoldError;
use crate::shape::{
    broadcast_shapes, is_valid_permutation, num_elements, row_major_strides, NormalizedSlice,
};
use crate::wide::{cast_wide, WideNum};

/// Incrementally walks the linear base positions of a strided tensor in
/// row-major logical order.
struct Odometer<'a> {
    shape: &'a [usize],
    strides: &'a [i64],
    index: SmallVec<[usize; 8]>,
    pos: i64,
}

impl<'a> Odometer<'a> {
    fn new(shape: &'a [usize], strides: &'a [i64], start: i64) -> Odometer<'a> {
        Odometer {
            shape,
            strides,
            index: SmallVec::from_elem(0, shape.len()),
            pos: start,
        }
    }

    fn pos(&self) -> i64 {
        self.pos
    }

    fn advance(&mut self) {
        for dim in (0..self.shape.len()).rev() {
            self.index[dim] += 1;
            self.pos += self.strides[dim];
            if self.index[dim] < self.shape[dim] {
                return;
            }
            self.pos -= self.shape[dim] as i64 * self.strides[dim];
            self.index[dim] = 0;
        }
    }
}

/// Apply `f` elementwise. The shape is preserved; the element type may
/// change (eg. for the divide-by-constant step of ReduceMean).
pub fn transform(
    src: &Elements,
    out_type: ElementType,
    f: impl Fn(WideNum) -> WideNum,
) -> Elements {
    if let Some(value) = src.splat_value() {
        return Elements::splat(out_type, src.shape(), f(value));
    }
    let mut bytes = vec![0u8; src.len() * out_type.byte_width()];
    for (i, value) in src.iter_wide().enumerate() {
        out_type.write_wide(&mut bytes, i, f(value));
    }
    Elements::from_bytes(out_type, src.shape(), bytes)
}

/// Elementwise binary combination with multi-directional broadcasting.
///
/// `out_shape` is the declared result shape and must equal the broadcast of
/// the operand shapes. The operands must share an element type, which is
/// also the result element type.
pub fn combine(
    lhs: &Elements,
    rhs: &Elements,
    out_shape: &[usize],
    f: impl Fn(WideNum, WideNum) -> WideNum,
) -> Result<Elements, FoldError> {
    assert_eq!(
        lhs.dtype(),
        rhs.dtype(),
        "elementwise operands must have matching element types"
    );
    let broadcast = broadcast_shapes(lhs.shape(), rhs.shape())
        .ok_or(FoldError::ShapeMismatch("operands do not broadcast together"))?;
    if broadcast != out_shape {
        return Err(FoldError::ShapeMismatch(
            "broadcast result does not match the declared shape",
        ));
    }

    if let (Some(a), Some(b)) = (lhs.splat_value(), rhs.splat_value()) {
        return Ok(Elements::splat(lhs.dtype(), out_shape, f(a, b)));
    }

    let lhs = expand(lhs, out_shape)?;
    let rhs = expand(rhs, out_shape)?;
    let dtype = lhs.dtype();
    let mut bytes = vec![0u8; num_elements(out_shape) * dtype.byte_width()];
    for (i, (a, b)) in lhs.iter_wide().zip(rhs.iter_wide()).enumerate() {
        dtype.write_wide(&mut bytes, i, f(a, b));
    }
    Ok(Elements::from_bytes(dtype, out_shape, bytes))
}

/// Ternary select `cond ? lhs : rhs` with the same broadcast discipline as
/// [`combine`]. `cond` must be boolean; `lhs` and `rhs` share an element
/// type.
pub fn where_select(
    cond: &Elements,
    lhs: &Elements,
    rhs: &Elements,
    out_shape: &[usize],
) -> Result<Elements, FoldError> {
    assert_eq!(
        cond.dtype(),
        ElementType::Bool,
        "where condition must have bool element type"
    );
    assert_eq!(
        lhs.dtype(),
        rhs.dtype(),
        "where branches must have matching element types"
    );
    let broadcast = broadcast_shapes(cond.shape(), lhs.shape())
        .and_then(|shape| broadcast_shapes(&shape, rhs.shape()))
        .ok_or(FoldError::ShapeMismatch("operands do not broadcast together"))?;
    if broadcast != out_shape {
        return Err(FoldError::ShapeMismatch(
            "broadcast result does not match the declared shape",
        ));
    }

    if let (Some(c), Some(a), Some(b)) = (
        cond.splat_value(),
        lhs.splat_value(),
        rhs.splat_value(),
    ) {
        let picked = if c.to_bool() { a } else { b };
        return Ok(Elements::splat(lhs.dtype(), out_shape, picked));
    }

    let cond = expand(cond, out_shape)?;
    let lhs = expand(lhs, out_shape)?;
    let rhs = expand(rhs, out_shape)?;
    let dtype = lhs.dtype();
    let mut bytes = vec![0u8; num_elements(out_shape) * dtype.byte_width()];
    let values = lhs.iter_wide().zip(rhs.iter_wide());
    for (i, (c, (a, b))) in cond.iter_wide().zip(values).enumerate() {
        dtype.write_wide(&mut bytes, i, if c.to_bool() { a } else { b });
    }
    Ok(Elements::from_bytes(dtype, out_shape, bytes))
}

/// Permute the axes of `src`. Returns a view.
pub fn transpose(src: &Elements, perm: &[usize]) -> Elements {
    assert!(
        is_valid_permutation(src.ndim(), perm),
        "perm must be a permutation of the input axes"
    );
    let out_shape: Vec<usize> = perm.iter().map(|&p| src.shape()[p]).collect();
    if let Some(value) = src.splat_value() {
        return Elements::splat(src.dtype(), &out_shape, value);
    }
    let (base, offset, strides) = src.as_strided();
    let out_strides: Vec<i64> = perm.iter().map(|&p| strides[p]).collect();
    Elements::view(base, src.dtype(), out_shape, offset, out_strides)
}

/// Reinterpret `src` with a new shape of the same element count, preserving
/// row-major order. Cheap for contiguous inputs and splats.
pub fn reshape(src: &Elements, new_shape: &[usize]) -> Result<Elements, FoldError> {
    if num_elements(new_shape) != src.len() {
        return Err(FoldError::ShapeMismatch(
            "reshape must preserve the element count",
        ));
    }
    if new_shape == src.shape() {
        return Ok(src.clone());
    }
    if let Some(value) = src.splat_value() {
        return Ok(Elements::splat(src.dtype(), new_shape, value));
    }
    let contiguous = if src.is_contiguous() {
        src.clone()
    } else {
        src.to_dense()
    };
    let (base, _, _) = contiguous.as_strided();
    Ok(Elements::view(
        base,
        src.dtype(),
        new_shape.to_vec(),
        0,
        row_major_strides(new_shape),
    ))
}

/// Broadcast `src` to `target`, which must be the already-inferred broadcast
/// shape. Returns a view with zero strides on the broadcast dimensions.
pub fn expand(src: &Elements, target: &[usize]) -> Result<Elements, FoldError> {
    let broadcast = broadcast_shapes(src.shape(), target).ok_or(FoldError::ShapeMismatch(
        "input does not broadcast to the target shape",
    ))?;
    if broadcast != target {
        return Err(FoldError::ShapeMismatch(
            "input does not broadcast to the target shape",
        ));
    }
    if src.shape() == target {
        return Ok(src.clone());
    }
    if let Some(value) = src.splat_value() {
        return Ok(Elements::splat(src.dtype(), target, value));
    }

    let (base, offset, strides) = src.as_strided();
    let pad = target.len() - src.ndim();
    let out_strides: Vec<i64> = target
        .iter()
        .enumerate()
        .map(|(dim, &size)| {
            if dim < pad {
                0
            } else if src.shape()[dim - pad] == size {
                strides[dim - pad]
            } else {
                0
            }
        })
        .collect();
    Ok(Elements::view(
        base,
        src.dtype(),
        target.to_vec(),
        offset,
        out_strides,
    ))
}

/// Convert every element to `to`, rounding through the target's precision.
pub fn cast_element_type(src: &Elements, to: ElementType) -> Elements {
    if to == src.dtype() {
        return src.clone();
    }
    transform(src, to, |value| cast_wide(to, value))
}

/// Left-fold the elements along `axes` in row-major order.
///
/// `axes` must be absolute, distinct and non-empty, and `src` must be
/// non-empty; the evaluator handles the empty cases, which need an identity.
pub fn reduce(
    src: &Elements,
    axes: &[usize],
    keep_dims: bool,
    f: impl Fn(WideNum, WideNum) -> WideNum,
) -> Elements {
    assert!(!src.is_empty(), "reduce input must be non-empty");
    assert!(!axes.is_empty(), "reduce axes must be non-empty");
    let rank = src.ndim();
    let mut sorted_axes = axes.to_vec();
    sorted_axes.sort_unstable();
    assert!(
        sorted_axes.windows(2).all(|w| w[0] < w[1]) && sorted_axes[sorted_axes.len() - 1] < rank,
        "reduce axes must be distinct and in range"
    );

    let dtype = src.dtype();
    let (base, offset, strides) = src.as_strided();

    let mut kept_shape = Vec::new();
    let mut kept_strides = Vec::new();
    let mut red_shape = Vec::new();
    let mut red_strides = Vec::new();
    for dim in 0..rank {
        if sorted_axes.binary_search(&dim).is_ok() {
            red_shape.push(src.shape()[dim]);
            red_strides.push(strides[dim]);
        } else {
            kept_shape.push(src.shape()[dim]);
            kept_strides.push(strides[dim]);
        }
    }

    let out_shape: Vec<usize> = if keep_dims {
        (0..rank)
            .map(|dim| {
                if sorted_axes.binary_search(&dim).is_ok() {
                    1
                } else {
                    src.shape()[dim]
                }
            })
            .collect()
    } else {
        kept_shape.clone()
    };

    let n_out = num_elements(&kept_shape);
    let n_red = num_elements(&red_shape);
    let mut bytes = vec![0u8; n_out * dtype.byte_width()];

    let mut outer = Odometer::new(&kept_shape, &kept_strides, offset);
    for out_index in 0..n_out {
        let mut inner = Odometer::new(&red_shape, &red_strides, outer.pos());
        let mut acc = base.base_get(inner.pos() as usize);
        for _ in 1..n_red {
            inner.advance();
            acc = f(acc, base.base_get(inner.pos() as usize));
        }
        dtype.write_wide(&mut bytes, out_index, acc);
        outer.advance();
    }

    Elements::from_bytes(dtype, &out_shape, bytes)
}

/// Partition `src` into contiguous slabs along `axis`. The sizes must sum to
/// the axis size.
pub fn split(src: &Elements, axis: usize, sizes: &[usize]) -> Vec<Elements> {
    assert!(axis < src.ndim(), "split axis must be in range");
    assert_eq!(
        sizes.iter().sum::<usize>(),
        src.shape()[axis],
        "split sizes must sum to the axis size"
    );

    if src.is_splat() {
        let value = src.splat_value().unwrap();
        return sizes
            .iter()
            .map(|&size| {
                let mut shape = src.shape().to_vec();
                shape[axis] = size;
                Elements::splat(src.dtype(), &shape, value)
            })
            .collect();
    }

    let (base, offset, strides) = src.as_strided();
    let mut start = 0i64;
    sizes
        .iter()
        .map(|&size| {
            let mut shape = src.shape().to_vec();
            shape[axis] = size;
            let piece = Elements::view(
                base.clone(),
                src.dtype(),
                shape,
                offset + start * strides[axis],
                strides.clone(),
            );
            start += size as i64;
            piece
        })
        .collect()
}

/// Select a strided window per axis. Parameters come pre-normalised from the
/// shape helper. Returns a view.
pub fn slice(src: &Elements, params: &NormalizedSlice) -> Elements {
    assert_eq!(params.starts.len(), src.ndim());
    if let Some(value) = src.splat_value() {
        return Elements::splat(src.dtype(), &params.shape, value);
    }
    let (base, mut offset, strides) = src.as_strided();
    let mut out_strides = Vec::with_capacity(src.ndim());
    for dim in 0..src.ndim() {
        offset += params.starts[dim] * strides[dim];
        out_strides.push(params.steps[dim] * strides[dim]);
    }
    Elements::view(base, src.dtype(), params.shape.clone(), offset, out_strides)
}

/// Join `inputs` along `axis`. All inputs share rank, element type and every
/// dimension except `axis`.
pub fn concat(inputs: &[Elements], axis: usize) -> Result<Elements, FoldError> {
    let first = inputs.first().expect("concat requires at least one input");
    let dtype = first.dtype();
    let rank = first.ndim();
    assert!(axis < rank, "concat axis must be in range");

    for input in &inputs[1..] {
        assert_eq!(
            input.dtype(),
            dtype,
            "concat inputs must have matching element types"
        );
        if input.ndim() != rank {
            return Err(FoldError::ShapeMismatch(
                "concat inputs must have the same rank",
            ));
        }
        for dim in 0..rank {
            if dim != axis && input.shape()[dim] != first.shape()[dim] {
                return Err(FoldError::ShapeMismatch(
                    "concat inputs may differ only on the concat axis",
                ));
            }
        }
    }

    let mut out_shape = first.shape().to_vec();
    out_shape[axis] = inputs.iter().map(|input| input.shape()[axis]).sum();
    let stride: usize = out_shape[axis..].iter().product();
    let inputs = inputs.to_vec();

    Ok(Elements::from_fn(dtype, &out_shape, move |dst| {
        let mut start = 0;
        for input in &inputs {
            let len: usize = input.shape()[axis..].iter().product();
            let data: Vec<WideNum> = input.iter_wide().collect();
            let mut in_pos = 0;
            let mut offset = start;
            while offset < dst.len() {
                dst[offset..offset + len].copy_from_slice(&data[in_pos..in_pos + len]);
                in_pos += len;
                offset += stride;
            }
            start += len;
        }
    }))
}

/// For each index, copy the corresponding slab of `src` along `axis`.
/// Negative indices count from the end of the axis; anything still out of
/// range after normalisation is an error.
pub fn gather(
    src: &Elements,
    indices: &Elements,
    axis: usize,
) -> Result<Elements, FoldError> {
    assert!(axis < src.ndim(), "gather axis must be in range");
    assert!(
        indices.dtype().is_int(),
        "gather indices must have an integer element type"
    );

    let axis_size = src.shape()[axis] as i64;
    let mut resolved = Vec::with_capacity(indices.len());
    for raw in indices.iter_wide() {
        let mut index = raw.to_index();
        if index < 0 {
            index += axis_size;
        }
        if index < 0 || index >= axis_size {
            return Err(FoldError::IndexOutOfRange("gather index is out of range"));
        }
        resolved.push(index as usize);
    }

    let mut out_shape = src.shape()[..axis].to_vec();
    out_shape.extend_from_slice(indices.shape());
    out_shape.extend_from_slice(&src.shape()[axis + 1..]);

    let dtype = src.dtype();
    let slab: usize = src.shape()[axis + 1..].iter().product();
    let n_outer: usize = src.shape()[..axis].iter().product();
    let src_block = src.shape()[axis] * slab;
    let out_block = resolved.len() * slab;
    let src = src.clone();

    Ok(Elements::from_fn(dtype, &out_shape, move |dst| {
        let data: Vec<WideNum> = src.iter_wide().collect();
        for outer in 0..n_outer {
            for (j, &index) in resolved.iter().enumerate() {
                let from = outer * src_block + index * slab;
                let to = outer * out_block + j * slab;
                dst[to..to + slab].copy_from_slice(&data[from..from + slab]);
            }
        }
    }))
}

/// ScatterND: copy `data`, then replace the slice addressed by each index
/// tuple with the corresponding slab of `updates`. When tuples collide the
/// last write in row-major traversal of `indices` wins.
pub fn scatter_nd(
    data: &Elements,
    indices: &Elements,
    updates: &Elements,
) -> Result<Elements, FoldError> {
    assert!(
        indices.dtype().is_int(),
        "scatter indices must have an integer element type"
    );
    assert_eq!(
        updates.dtype(),
        data.dtype(),
        "scatter updates must match the data element type"
    );

    let rank = data.ndim();
    if indices.ndim() == 0 {
        return Err(FoldError::ShapeMismatch("scatter indices must have rank >= 1"));
    }
    let k = *indices.shape().last().unwrap();
    if k == 0 || k > rank {
        return Err(FoldError::ShapeMismatch(
            "scatter index tuple width must be in [1, data rank]",
        ));
    }
    let outer = &indices.shape()[..indices.ndim() - 1];
    let mut expected_updates = outer.to_vec();
    expected_updates.extend_from_slice(&data.shape()[k..]);
    if updates.shape() != expected_updates {
        return Err(FoldError::ShapeMismatch(
            "updates shape must combine the index prefix with the data slice shape",
        ));
    }

    let slab: usize = data.shape()[k..].iter().product();
    let strides = row_major_strides(data.shape());
    let raw: Vec<i64> = indices.iter_wide().map(|ix| ix.to_index()).collect();
    let mut positions = Vec::with_capacity(num_elements(outer));
    for tuple in raw.chunks(k) {
        let mut pos = 0i64;
        for (dim, &index) in tuple.iter().enumerate() {
            if index < 0 || index >= data.shape()[dim] as i64 {
                return Err(FoldError::IndexOutOfRange("scatter index is out of range"));
            }
            pos += index * strides[dim];
        }
        positions.push(pos as usize);
    }

    let data = data.clone();
    let updates = updates.clone();
    let dtype = data.dtype();
    let shape = data.shape().to_vec();

    Ok(Elements::from_fn(dtype, &shape, move |dst| {
        data.read_wide(dst);
        let upd: Vec<WideNum> = updates.iter_wide().collect();
        for (i, &pos) in positions.iter().enumerate() {
            dst[pos..pos + slab].copy_from_slice(&upd[i * slab..(i + 1) * slab]);
        }
    }))
}
