//! Widest-precision scalars used for intermediate arithmetic.
//!
//! Every element type family has one widest representative: `i64` for signed
//! integers, `u64` for unsigned integers, `f64` for floats and `bool` for
//! booleans. Values are widened when read out of packed storage, combined at
//! wide precision, and narrowed again when materialised. Arithmetic wrapped
//! by [`binary_fn`]/[`unary_fn`] round-trips through the narrow type so that
//! folded results are bit-identical to evaluating the operator at runtime in
//! the tensor's actual precision.

use crate::dtype::ElementType;
use crate::half::{Bf16, F16};

/// One tensor element, widened to its family's largest representation.
///
/// The variant must agree with the family of the element type that
/// accompanies the value; mixing them up is a programming error, not a
/// recoverable condition.
#[derive(Copy, Clone, Debug, PartialEq)]
pub enum WideNum {
    I64(i64),
    U64(u64),
    F64(f64),
    Bool(bool),
}

impl WideNum {
    pub fn to_i64(self) -> i64 {
        match self {
            WideNum::I64(v) => v,
            other => panic!("expected signed wide scalar, got {:?}", other),
        }
    }

    pub fn to_u64(self) -> u64 {
        match self {
            WideNum::U64(v) => v,
            other => panic!("expected unsigned wide scalar, got {:?}", other),
        }
    }

    pub fn to_f64(self) -> f64 {
        match self {
            WideNum::F64(v) => v,
            other => panic!("expected float wide scalar, got {:?}", other),
        }
    }

    pub fn to_bool(self) -> bool {
        match self {
            WideNum::Bool(v) => v,
            other => panic!("expected bool wide scalar, got {:?}", other),
        }
    }

    /// Interpret an integer wide scalar as a tensor index.
    pub(crate) fn to_index(self) -> i64 {
        match self {
            WideNum::I64(v) => v,
            WideNum::U64(v) => v as i64,
            other => panic!("expected integer index, got {:?}", other),
        }
    }
}

/// Conversion between a narrow element type and its wide representative.
pub trait NarrowElem: Copy {
    fn from_wide(n: WideNum) -> Self;
    fn to_wide(self) -> WideNum;
}

macro_rules! impl_narrow_elem {
    ($ty:ty, $wide:ident, $widest:ty) => {
        impl NarrowElem for $ty {
            fn from_wide(n: WideNum) -> Self {
                match n {
                    WideNum::$wide(v) => v as $ty,
                    other => panic!(
                        concat!("expected ", stringify!($wide), " wide scalar, got {:?}"),
                        other
                    ),
                }
            }

            fn to_wide(self) -> WideNum {
                WideNum::$wide(self as $widest)
            }
        }
    };
}

impl_narrow_elem!(i8, I64, i64);
impl_narrow_elem!(i16, I64, i64);
impl_narrow_elem!(i32, I64, i64);
impl_narrow_elem!(i64, I64, i64);
impl_narrow_elem!(u8, U64, u64);
impl_narrow_elem!(u16, U64, u64);
impl_narrow_elem!(u32, U64, u64);
impl_narrow_elem!(u64, U64, u64);
impl_narrow_elem!(f32, F64, f64);
impl_narrow_elem!(f64, F64, f64);

impl NarrowElem for bool {
    fn from_wide(n: WideNum) -> Self {
        n.to_bool()
    }

    fn to_wide(self) -> WideNum {
        WideNum::Bool(self)
    }
}

impl NarrowElem for F16 {
    fn from_wide(n: WideNum) -> Self {
        F16::from_f32(n.to_f64() as f32)
    }

    fn to_wide(self) -> WideNum {
        WideNum::F64(self.to_f32() as f64)
    }
}

impl NarrowElem for Bf16 {
    fn from_wide(n: WideNum) -> Self {
        Bf16::from_f32(n.to_f64() as f32)
    }

    fn to_wide(self) -> WideNum {
        WideNum::F64(self.to_f32() as f64)
    }
}

/// Arithmetic at a narrow type's precision.
///
/// Integer operations wrap like the runtime's two's-complement arithmetic.
/// The 16-bit float types compute in `f32` and round the result back, which
/// is how half precision units behave.
pub(crate) trait NarrowArith: NarrowElem {
    fn sum(self, rhs: Self) -> Self;
    fn diff(self, rhs: Self) -> Self;
    fn prod(self, rhs: Self) -> Self;
    fn quot(self, rhs: Self) -> Self;
    fn minimum(self, rhs: Self) -> Self;
    fn maximum(self, rhs: Self) -> Self;
    fn negate(self) -> Self;
    fn relu(self) -> Self;
    fn root(self) -> Self;
}

macro_rules! impl_int_arith {
    ($ty:ty) => {
        impl NarrowArith for $ty {
            fn sum(self, rhs: Self) -> Self {
                self.wrapping_add(rhs)
            }
            fn diff(self, rhs: Self) -> Self {
                self.wrapping_sub(rhs)
            }
            fn prod(self, rhs: Self) -> Self {
                self.wrapping_mul(rhs)
            }
            fn quot(self, rhs: Self) -> Self {
                self.wrapping_div(rhs)
            }
            fn minimum(self, rhs: Self) -> Self {
                Ord::min(self, rhs)
            }
            fn maximum(self, rhs: Self) -> Self {
                Ord::max(self, rhs)
            }
            fn negate(self) -> Self {
                self.wrapping_neg()
            }
            fn relu(self) -> Self {
                Ord::max(self, 0)
            }
            fn root(self) -> Self {
                unreachable!("sqrt is only defined for float elements")
            }
        }
    };
}

impl_int_arith!(i8);
impl_int_arith!(i16);
impl_int_arith!(i32);
impl_int_arith!(i64);
impl_int_arith!(u8);
impl_int_arith!(u16);
impl_int_arith!(u32);
impl_int_arith!(u64);

macro_rules! impl_float_arith {
    ($ty:ty) => {
        impl NarrowArith for $ty {
            fn sum(self, rhs: Self) -> Self {
                self + rhs
            }
            fn diff(self, rhs: Self) -> Self {
                self - rhs
            }
            fn prod(self, rhs: Self) -> Self {
                self * rhs
            }
            fn quot(self, rhs: Self) -> Self {
                self / rhs
            }
            fn minimum(self, rhs: Self) -> Self {
                if rhs < self {
                    rhs
                } else {
                    self
                }
            }
            fn maximum(self, rhs: Self) -> Self {
                if self < rhs {
                    rhs
                } else {
                    self
                }
            }
            fn negate(self) -> Self {
                -self
            }
            fn relu(self) -> Self {
                if self < 0. {
                    0.
                } else {
                    self
                }
            }
            fn root(self) -> Self {
                self.sqrt()
            }
        }
    };
}

impl_float_arith!(f32);
impl_float_arith!(f64);

macro_rules! impl_half_arith {
    ($ty:ty, $via:ident) => {
        impl NarrowArith for $ty {
            fn sum(self, rhs: Self) -> Self {
                <$ty>::$via(self.to_f32() + rhs.to_f32())
            }
            fn diff(self, rhs: Self) -> Self {
                <$ty>::$via(self.to_f32() - rhs.to_f32())
            }
            fn prod(self, rhs: Self) -> Self {
                <$ty>::$via(self.to_f32() * rhs.to_f32())
            }
            fn quot(self, rhs: Self) -> Self {
                <$ty>::$via(self.to_f32() / rhs.to_f32())
            }
            fn minimum(self, rhs: Self) -> Self {
                if rhs.to_f32() < self.to_f32() {
                    rhs
                } else {
                    self
                }
            }
            fn maximum(self, rhs: Self) -> Self {
                if self.to_f32() < rhs.to_f32() {
                    rhs
                } else {
                    self
                }
            }
            fn negate(self) -> Self {
                <$ty>::$via(-self.to_f32())
            }
            fn relu(self) -> Self {
                if self.to_f32() < 0. {
                    <$ty>::ZERO
                } else {
                    self
                }
            }
            fn root(self) -> Self {
                <$ty>::$via(self.to_f32().sqrt())
            }
        }
    };
}

impl_half_arith!(F16, from_f32);
impl_half_arith!(Bf16, from_f32);

/// An elementwise binary combiner over wide scalars.
pub type WideBinaryFn = Box<dyn Fn(WideNum, WideNum) -> WideNum + Send + Sync>;

/// An elementwise unary function over wide scalars.
pub type WideUnaryFn = Box<dyn Fn(WideNum) -> WideNum + Send + Sync>;

/// Elementwise binary operations with a constant-folding evaluator.
#[derive(Copy, Clone, Debug, Eq, PartialEq)]
pub enum BinaryOp {
    Add,
    Sub,
    Mul,
    Div,
    Min,
    Max,
}

/// Elementwise unary operations with a constant-folding evaluator.
#[derive(Copy, Clone, Debug, Eq, PartialEq)]
pub enum UnaryOp {
    Neg,
    Sqrt,
    Relu,
}

fn wrap_binary<T: NarrowArith + 'static>(f: fn(T, T) -> T) -> WideBinaryFn {
    Box::new(move |lhs, rhs| f(T::from_wide(lhs), T::from_wide(rhs)).to_wide())
}

fn wrap_unary<T: NarrowArith + 'static>(f: fn(T) -> T) -> WideUnaryFn {
    Box::new(move |val| f(T::from_wide(val)).to_wide())
}

/// Return a combiner that evaluates `op` at the precision of `dtype`.
///
/// Booleans have no arithmetic; requesting a combiner for them is a
/// programming error.
pub fn binary_fn(dtype: ElementType, op: BinaryOp) -> WideBinaryFn {
    macro_rules! dispatch {
        ($ty:ty) => {
            match op {
                BinaryOp::Add => wrap_binary::<$ty>(NarrowArith::sum),
                BinaryOp::Sub => wrap_binary::<$ty>(NarrowArith::diff),
                BinaryOp::Mul => wrap_binary::<$ty>(NarrowArith::prod),
                BinaryOp::Div => wrap_binary::<$ty>(NarrowArith::quot),
                BinaryOp::Min => wrap_binary::<$ty>(NarrowArith::minimum),
                BinaryOp::Max => wrap_binary::<$ty>(NarrowArith::maximum),
            }
        };
    }

    match dtype {
        ElementType::Bool => panic!("elementwise arithmetic is not defined for bool elements"),
        ElementType::I8 => dispatch!(i8),
        ElementType::I16 => dispatch!(i16),
        ElementType::I32 => dispatch!(i32),
        ElementType::I64 => dispatch!(i64),
        ElementType::U8 => dispatch!(u8),
        ElementType::U16 => dispatch!(u16),
        ElementType::U32 => dispatch!(u32),
        ElementType::U64 => dispatch!(u64),
        ElementType::F16 => dispatch!(F16),
        ElementType::BF16 => dispatch!(Bf16),
        ElementType::F32 => dispatch!(f32),
        ElementType::F64 => dispatch!(f64),
    }
}

/// Return a unary function that evaluates `op` at the precision of `dtype`.
pub fn unary_fn(dtype: ElementType, op: UnaryOp) -> WideUnaryFn {
    macro_rules! dispatch {
        ($ty:ty) => {
            match op {
                UnaryOp::Neg => wrap_unary::<$ty>(NarrowArith::negate),
                UnaryOp::Sqrt => wrap_unary::<$ty>(NarrowArith::root),
                UnaryOp::Relu => wrap_unary::<$ty>(NarrowArith::relu),
            }
        };
    }

    match dtype {
        ElementType::Bool => panic!("elementwise arithmetic is not defined for bool elements"),
        ElementType::I8 => dispatch!(i8),
        ElementType::I16 => dispatch!(i16),
        ElementType::I32 => dispatch!(i32),
        ElementType::I64 => dispatch!(i64),
        ElementType::U8 => dispatch!(u8),
        ElementType::U16 => dispatch!(u16),
        ElementType::U32 => dispatch!(u32),
        ElementType::U64 => dispatch!(u64),
        ElementType::F16 => dispatch!(F16),
        ElementType::BF16 => dispatch!(Bf16),
        ElementType::F32 => dispatch!(f32),
        ElementType::F64 => dispatch!(f64),
    }
}

/// Return a function dividing by a constant denominator at the precision of
/// `dtype`. Used to turn a folded ReduceSum into a ReduceMean.
pub fn div_by(dtype: ElementType, denominator: i64) -> WideUnaryFn {
    macro_rules! divider {
        ($ty:ty) => {{
            let denom = denominator as $ty;
            Box::new(move |val| NarrowArith::quot(<$ty>::from_wide(val), denom).to_wide())
        }};
    }

    match dtype {
        ElementType::Bool => panic!("elementwise arithmetic is not defined for bool elements"),
        ElementType::I8 => divider!(i8),
        ElementType::I16 => divider!(i16),
        ElementType::I32 => divider!(i32),
        ElementType::I64 => divider!(i64),
        ElementType::U8 => divider!(u8),
        ElementType::U16 => divider!(u16),
        ElementType::U32 => divider!(u32),
        ElementType::U64 => divider!(u64),
        ElementType::F16 => {
            let denom = F16::from_f32(denominator as f32);
            Box::new(move |val| NarrowArith::quot(F16::from_wide(val), denom).to_wide())
        }
        ElementType::BF16 => {
            let denom = Bf16::from_f32(denominator as f32);
            Box::new(move |val| NarrowArith::quot(Bf16::from_wide(val), denom).to_wide())
        }
        ElementType::F32 => divider!(f32),
        ElementType::F64 => divider!(f64),
    }
}

/// Convert a wide scalar to the family of `to`, rounding through `to`'s
/// narrow precision.
///
/// Float to integer conversion truncates toward zero, maps NaN to zero and
/// saturates at the target range, matching Rust's scalar `as` casts.
pub fn cast_wide(to: ElementType, x: WideNum) -> WideNum {
    macro_rules! narrow_int {
        ($ty:ty, $wide:ident, $widest:ty) => {{
            let narrow = match x {
                WideNum::I64(v) => v as $ty,
                WideNum::U64(v) => v as $ty,
                WideNum::F64(v) => v as $ty,
                WideNum::Bool(b) => b as u8 as $ty,
            };
            WideNum::$wide(narrow as $widest)
        }};
    }

    match to {
        ElementType::Bool => WideNum::Bool(match x {
            WideNum::I64(v) => v != 0,
            WideNum::U64(v) => v != 0,
            WideNum::F64(v) => v != 0.0,
            WideNum::Bool(b) => b,
        }),
        ElementType::I8 => narrow_int!(i8, I64, i64),
        ElementType::I16 => narrow_int!(i16, I64, i64),
        ElementType::I32 => narrow_int!(i32, I64, i64),
        ElementType::I64 => narrow_int!(i64, I64, i64),
        ElementType::U8 => narrow_int!(u8, U64, u64),
        ElementType::U16 => narrow_int!(u16, U64, u64),
        ElementType::U32 => narrow_int!(u32, U64, u64),
        ElementType::U64 => narrow_int!(u64, U64, u64),
        ElementType::F16 | ElementType::BF16 | ElementType::F32 | ElementType::F64 => {
            let v = match x {
                WideNum::I64(v) => v as f64,
                WideNum::U64(v) => v as f64,
                WideNum::F64(v) => v,
                WideNum::Bool(b) => b as u8 as f64,
            };
            WideNum::F64(match to {
                ElementType::F16 => F16::from_f32(v as f32).to_f32() as f64,
                ElementType::BF16 => Bf16::from_f32(v as f32).to_f32() as f64,
                ElementType::F32 => (v as f32) as f64,
                _ => v,
            })
        }
    }
}
