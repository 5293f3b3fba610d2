//! Immutable constant tensor values.
//!
//! An [`Elements`] is the payload of a dense constant in the graph: a shape,
//! an element type and one of several storage representations. Values are
//! immutable once constructed and cheap to clone (shared ownership), so a
//! folded result can be referenced by several constants, or serve as the base
//! of lazy views, without copying its bytes.

use std::fmt;
use std::fmt::Debug;
use std::sync::{Arc, OnceLock};

use smallvec::SmallVec;

use crate::dtype::ElementType;
use crate::shape::{num_elements, row_major_strides};
use crate::wide::{NarrowElem, WideNum};

/// A concrete Rust scalar that maps to an [`ElementType`].
///
/// Used by the typed constructors and accessors which tests and IR lifting
/// rely on.
pub trait Scalar: NarrowElem {
    const DTYPE: ElementType;
}

macro_rules! impl_scalar {
    ($ty:ty, $dtype:ident) => {
        impl Scalar for $ty {
            const DTYPE: ElementType = ElementType::$dtype;
        }
    };
}

impl_scalar!(bool, Bool);
impl_scalar!(i8, I8);
impl_scalar!(i16, I16);
impl_scalar!(i32, I32);
impl_scalar!(i64, I64);
impl_scalar!(u8, U8);
impl_scalar!(u16, U16);
impl_scalar!(u32, U32);
impl_scalar!(u64, U64);
impl_scalar!(f32, F32);
impl_scalar!(f64, F64);
impl_scalar!(crate::half::F16, F16);
impl_scalar!(crate::half::Bf16, BF16);

/// An immutable N-dimensional constant value.
#[derive(Clone)]
pub struct Elements {
    inner: Arc<Inner>,
}

struct Inner {
    dtype: ElementType,
    shape: Vec<usize>,
    repr: Repr,
}

enum Repr {
    /// Contiguous row-major packed little-endian bytes.
    Dense(Vec<u8>),

    /// A single scalar logically broadcast to the full shape.
    Splat(WideNum),

    /// A strided window onto a base value. Reads are computed on demand.
    View(View),

    /// A deferred computation, materialised once on first read.
    Producer(Producer),
}

/// Affine index transform over a base value.
///
/// Maps a row-major logical index of this value to a linear element index of
/// `base`. The base is never itself a view; composing transforms flattens
/// them so reads do not recurse.
struct View {
    base: Elements,
    offset: i64,
    /// Per-dimension stride in elements of the base. Zero strides broadcast,
    /// negative strides reverse.
    strides: Vec<i64>,
}

struct Producer {
    fill: Box<dyn Fn(&mut [WideNum]) + Send + Sync>,
    cache: OnceLock<Vec<WideNum>>,
}

impl Producer {
    fn materialized(&self, len: usize, zero: WideNum) -> &[WideNum] {
        self.cache.get_or_init(|| {
            let mut buf = vec![zero; len];
            (self.fill)(&mut buf);
            buf
        })
    }
}

impl Elements {
    fn new(dtype: ElementType, shape: Vec<usize>, repr: Repr) -> Elements {
        Elements {
            inner: Arc::new(Inner { dtype, shape, repr }),
        }
    }

    /// Create a dense value from packed little-endian row-major bytes.
    pub fn from_bytes(dtype: ElementType, shape: &[usize], bytes: Vec<u8>) -> Elements {
        assert_eq!(
            bytes.len(),
            num_elements(shape) * dtype.byte_width(),
            "dense buffer size must match element count times width"
        );
        Elements::new(dtype, shape.to_vec(), Repr::Dense(bytes))
    }

    /// Create a splat: one scalar broadcast to the full shape.
    pub fn splat(dtype: ElementType, shape: &[usize], value: WideNum) -> Elements {
        Elements::new(dtype, shape.to_vec(), Repr::Splat(value))
    }

    /// Create a value whose elements are computed by `fill` on first read.
    ///
    /// `fill` must be idempotent and must not borrow from the rewrite in
    /// progress; materialisation may happen on an arbitrary later thread.
    pub fn from_fn<F>(dtype: ElementType, shape: &[usize], fill: F) -> Elements
    where
        F: Fn(&mut [WideNum]) + Send + Sync + 'static,
    {
        Elements::new(
            dtype,
            shape.to_vec(),
            Repr::Producer(Producer {
                fill: Box::new(fill),
                cache: OnceLock::new(),
            }),
        )
    }

    /// Create a dense value from a vector of typed scalars.
    pub fn from_vec<T: Scalar>(shape: &[usize], data: Vec<T>) -> Elements {
        assert_eq!(
            data.len(),
            num_elements(shape),
            "data length must match element count"
        );
        let dtype = T::DTYPE;
        let mut bytes = vec![0u8; data.len() * dtype.byte_width()];
        for (i, value) in data.into_iter().enumerate() {
            dtype.write_wide(&mut bytes, i, value.to_wide());
        }
        Elements::from_bytes(dtype, shape, bytes)
    }

    /// Create a splat from a typed scalar.
    pub fn splat_of<T: Scalar>(shape: &[usize], value: T) -> Elements {
        Elements::splat(T::DTYPE, shape, value.to_wide())
    }

    pub(crate) fn view(
        base: Elements,
        dtype: ElementType,
        shape: Vec<usize>,
        offset: i64,
        strides: Vec<i64>,
    ) -> Elements {
        debug_assert!(!matches!(base.inner.repr, Repr::View(_)));
        debug_assert_eq!(shape.len(), strides.len());
        Elements::new(
            dtype,
            shape,
            Repr::View(View {
                base,
                offset,
                strides,
            }),
        )
    }

    pub fn dtype(&self) -> ElementType {
        self.inner.dtype
    }

    pub fn shape(&self) -> &[usize] {
        &self.inner.shape
    }

    pub fn ndim(&self) -> usize {
        self.inner.shape.len()
    }

    /// Number of elements the shape addresses (the empty product is 1).
    pub fn len(&self) -> usize {
        num_elements(&self.inner.shape)
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    pub fn is_splat(&self) -> bool {
        matches!(self.inner.repr, Repr::Splat(_))
    }

    /// The scalar of a splat value, or `None` for other representations.
    pub fn splat_value(&self) -> Option<WideNum> {
        match self.inner.repr {
            Repr::Splat(v) => Some(v),
            _ => None,
        }
    }

    /// Read one element of a non-view representation by linear index.
    pub(crate) fn base_get(&self, index: usize) -> WideNum {
        match &self.inner.repr {
            Repr::Dense(bytes) => self.inner.dtype.read_wide(bytes, index),
            Repr::Splat(v) => *v,
            Repr::Producer(p) => p.materialized(self.len(), self.inner.dtype.wide_zero())[index],
            Repr::View(_) => unreachable!("views always compose onto non-view bases"),
        }
    }

    /// Decompose into a non-view base plus an affine index transform.
    ///
    /// Transforms that are expressible as strides build on this to avoid
    /// materialising their input.
    pub(crate) fn as_strided(&self) -> (Elements, i64, Vec<i64>) {
        match &self.inner.repr {
            Repr::View(view) => (view.base.clone(), view.offset, view.strides.clone()),
            Repr::Splat(_) => (self.clone(), 0, vec![0; self.ndim()]),
            _ => (self.clone(), 0, row_major_strides(self.shape())),
        }
    }

    /// True if logical order equals base storage order, ie. the value can be
    /// reinterpreted with a different shape without moving elements.
    pub(crate) fn is_contiguous(&self) -> bool {
        match &self.inner.repr {
            Repr::Dense(_) | Repr::Producer(_) => true,
            Repr::Splat(_) => false,
            Repr::View(view) => {
                view.offset == 0 && view.strides == row_major_strides(self.shape())
            }
        }
    }

    /// Iterate over all elements in row-major logical order.
    pub fn iter_wide(&self) -> WideIter<'_> {
        let (base, offset, strides): (&Elements, i64, SmallVec<[i64; 8]>) =
            match &self.inner.repr {
                Repr::View(view) => (&view.base, view.offset, SmallVec::from_slice(&view.strides)),
                Repr::Splat(_) => (self, 0, SmallVec::from_elem(0, self.ndim())),
                _ => (self, 0, SmallVec::from_iter(row_major_strides(self.shape()))),
            };
        WideIter {
            base,
            shape: &self.inner.shape,
            strides,
            index: SmallVec::from_elem(0, self.ndim()),
            pos: offset,
            remaining: self.len(),
        }
    }

    /// Copy all elements into `dst` in row-major logical order.
    pub fn read_wide(&self, dst: &mut [WideNum]) {
        assert_eq!(dst.len(), self.len());
        for (slot, value) in dst.iter_mut().zip(self.iter_wide()) {
            *slot = value;
        }
    }

    /// Copy the elements of a tensor with the given dtype out as typed scalars.
    pub fn to_vec<T: Scalar>(&self) -> Vec<T> {
        assert_eq!(
            self.dtype(),
            T::DTYPE,
            "requested scalar type does not match element type"
        );
        self.iter_wide().map(T::from_wide).collect()
    }

    /// Force this value into a dense buffer representation.
    pub(crate) fn to_dense(&self) -> Elements {
        if matches!(self.inner.repr, Repr::Dense(_)) {
            return self.clone();
        }
        let dtype = self.dtype();
        let mut bytes = vec![0u8; self.len() * dtype.byte_width()];
        for (i, value) in self.iter_wide().enumerate() {
            dtype.write_wide(&mut bytes, i, value);
        }
        Elements::from_bytes(dtype, self.shape(), bytes)
    }
}

impl Debug for Elements {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let repr = match &self.inner.repr {
            Repr::Dense(_) => "dense",
            Repr::Splat(_) => "splat",
            Repr::View(_) => "view",
            Repr::Producer(_) => "producer",
        };
        f.debug_struct("Elements")
            .field("dtype", &self.inner.dtype)
            .field("shape", &self.inner.shape)
            .field("repr", &repr)
            .finish()
    }
}

/// Row-major iterator over the elements of an [`Elements`] value.
pub struct WideIter<'a> {
    base: &'a Elements,
    shape: &'a [usize],
    strides: SmallVec<[i64; 8]>,
    index: SmallVec<[usize; 8]>,
    pos: i64,
    remaining: usize,
}

impl Iterator for WideIter<'_> {
    type Item = WideNum;

    fn next(&mut self) -> Option<WideNum> {
        if self.remaining == 0 {
            return None;
        }
        self.remaining -= 1;

        debug_assert!(self.pos >= 0);
        let value = self.base.base_get(self.pos as usize);

        for dim in (0..self.shape.len()).rev() {
            self.index[dim] += 1;
            self.pos += self.strides[dim];
            if self.index[dim] < self.shape[dim] {
                break;
            }
            self.pos -= self.shape[dim] as i64 * self.strides[dim];
            self.index[dim] = 0;
        }

        Some(value)
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        (self.remaining, Some(self.remaining))
    }
}

impl ExactSizeIterator for WideIter<'_> {}
