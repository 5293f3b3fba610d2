//! Tensor element types and their packed byte representations.

use std::fmt;
use std::fmt::Display;

use crate::half::{Bf16, F16};
use crate::wide::WideNum;

/// Enum specifying the element type of a constant tensor.
#[derive(Copy, Clone, Debug, Eq, PartialEq, Hash)]
pub enum ElementType {
    Bool,
    I8,
    I16,
    I32,
    I64,
    U8,
    U16,
    U32,
    U64,
    F16,
    BF16,
    F32,
    F64,
}

/// The numeric family of an element type.
///
/// Each family has a single widest representative ([`WideNum`] variant) that
/// all intermediate arithmetic happens in.
#[derive(Copy, Clone, Debug, Eq, PartialEq)]
pub enum Family {
    SignedInt,
    UnsignedInt,
    Float,
    Bool,
}

impl ElementType {
    pub fn family(self) -> Family {
        match self {
            ElementType::Bool => Family::Bool,
            ElementType::I8 | ElementType::I16 | ElementType::I32 | ElementType::I64 => {
                Family::SignedInt
            }
            ElementType::U8 | ElementType::U16 | ElementType::U32 | ElementType::U64 => {
                Family::UnsignedInt
            }
            ElementType::F16 | ElementType::BF16 | ElementType::F32 | ElementType::F64 => {
                Family::Float
            }
        }
    }

    /// Size of one packed element in bytes.
    pub fn byte_width(self) -> usize {
        match self {
            ElementType::Bool | ElementType::I8 | ElementType::U8 => 1,
            ElementType::I16 | ElementType::U16 | ElementType::F16 | ElementType::BF16 => 2,
            ElementType::I32 | ElementType::U32 | ElementType::F32 => 4,
            ElementType::I64 | ElementType::U64 | ElementType::F64 => 8,
        }
    }

    pub fn is_float(self) -> bool {
        self.family() == Family::Float
    }

    pub fn is_int(self) -> bool {
        matches!(self.family(), Family::SignedInt | Family::UnsignedInt)
    }

    /// The wide representation of zero in this type's family.
    pub fn wide_zero(self) -> WideNum {
        match self.family() {
            Family::SignedInt => WideNum::I64(0),
            Family::UnsignedInt => WideNum::U64(0),
            Family::Float => WideNum::F64(0.0),
            Family::Bool => WideNum::Bool(false),
        }
    }

    /// The wide representation of one in this type's family.
    pub fn wide_one(self) -> WideNum {
        match self.family() {
            Family::SignedInt => WideNum::I64(1),
            Family::UnsignedInt => WideNum::U64(1),
            Family::Float => WideNum::F64(1.0),
            Family::Bool => WideNum::Bool(true),
        }
    }

    /// Decode element `index` from packed little-endian bytes and widen it.
    pub fn read_wide(self, bytes: &[u8], index: usize) -> WideNum {
        let w = self.byte_width();
        let chunk = &bytes[index * w..index * w + w];

        macro_rules! decode {
            ($ty:ty, $wide:ident, $as:ty) => {
                WideNum::$wide(<$ty>::from_le_bytes(chunk.try_into().unwrap()) as $as)
            };
        }

        match self {
            ElementType::Bool => WideNum::Bool(chunk[0] != 0),
            ElementType::I8 => decode!(i8, I64, i64),
            ElementType::I16 => decode!(i16, I64, i64),
            ElementType::I32 => decode!(i32, I64, i64),
            ElementType::I64 => decode!(i64, I64, i64),
            ElementType::U8 => decode!(u8, U64, u64),
            ElementType::U16 => decode!(u16, U64, u64),
            ElementType::U32 => decode!(u32, U64, u64),
            ElementType::U64 => decode!(u64, U64, u64),
            ElementType::F16 => {
                let bits = u16::from_le_bytes(chunk.try_into().unwrap());
                WideNum::F64(F16::from_bits(bits).to_f32() as f64)
            }
            ElementType::BF16 => {
                let bits = u16::from_le_bytes(chunk.try_into().unwrap());
                WideNum::F64(Bf16::from_bits(bits).to_f32() as f64)
            }
            ElementType::F32 => decode!(f32, F64, f64),
            ElementType::F64 => decode!(f64, F64, f64),
        }
    }

    /// Narrow a wide scalar of this type's family and store it as packed
    /// little-endian bytes at element `index`.
    pub fn write_wide(self, bytes: &mut [u8], index: usize, value: WideNum) {
        let w = self.byte_width();
        let chunk = &mut bytes[index * w..index * w + w];

        macro_rules! encode {
            ($value:expr) => {
                chunk.copy_from_slice(&($value).to_le_bytes())
            };
        }

        match self {
            ElementType::Bool => chunk[0] = value.to_bool() as u8,
            ElementType::I8 => encode!(value.to_i64() as i8),
            ElementType::I16 => encode!(value.to_i64() as i16),
            ElementType::I32 => encode!(value.to_i64() as i32),
            ElementType::I64 => encode!(value.to_i64()),
            ElementType::U8 => encode!(value.to_u64() as u8),
            ElementType::U16 => encode!(value.to_u64() as u16),
            ElementType::U32 => encode!(value.to_u64() as u32),
            ElementType::U64 => encode!(value.to_u64()),
            ElementType::F16 => encode!(F16::from_f32(value.to_f64() as f32).to_bits()),
            ElementType::BF16 => encode!(Bf16::from_f32(value.to_f64() as f32).to_bits()),
            ElementType::F32 => encode!(value.to_f64() as f32),
            ElementType::F64 => encode!(value.to_f64()),
        }
    }
}

impl Display for ElementType {
    /// Format this enum value in the style of the corresponding Rust type
    /// (eg. "i32" for `ElementType::I32`).
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            ElementType::Bool => "bool",
            ElementType::I8 => "i8",
            ElementType::I16 => "i16",
            ElementType::I32 => "i32",
            ElementType::I64 => "i64",
            ElementType::U8 => "u8",
            ElementType::U16 => "u16",
            ElementType::U32 => "u32",
            ElementType::U64 => "u64",
            ElementType::F16 => "f16",
            ElementType::BF16 => "bf16",
            ElementType::F32 => "f32",
            ElementType::F64 => "f64",
        };
        write!(f, "{}", name)
    }
}

#[cfg(test)]
mod tests {
    use super::ElementType;
    use crate::wide::WideNum;

    #[test]
    fn test_read_write_round_trip() {
        #[derive(Debug)]
        struct Case {
            dtype: ElementType,
            value: WideNum,
        }

        let cases = [
            Case {
                dtype: ElementType::Bool,
                value: WideNum::Bool(true),
            },
            Case {
                dtype: ElementType::I8,
                value: WideNum::I64(-100),
            },
            Case {
                dtype: ElementType::I32,
                value: WideNum::I64(-1 << 30),
            },
            Case {
                dtype: ElementType::I64,
                value: WideNum::I64(i64::MIN),
            },
            Case {
                dtype: ElementType::U16,
                value: WideNum::U64(65_535),
            },
            Case {
                dtype: ElementType::U64,
                value: WideNum::U64(u64::MAX),
            },
            Case {
                dtype: ElementType::F16,
                value: WideNum::F64(-2.5),
            },
            Case {
                dtype: ElementType::BF16,
                value: WideNum::F64(1.5),
            },
            Case {
                dtype: ElementType::F32,
                value: WideNum::F64(3.5),
            },
            Case {
                dtype: ElementType::F64,
                value: WideNum::F64(std::f64::consts::PI),
            },
        ];

        for case in cases {
            let mut buf = vec![0u8; case.dtype.byte_width() * 2];
            case.dtype.write_wide(&mut buf, 1, case.value);
            assert_eq!(case.dtype.read_wide(&buf, 1), case.value, "case {:?}", case);
            // Element 0 was not disturbed.
            assert_eq!(case.dtype.read_wide(&buf, 0), case.dtype.wide_zero());
        }
    }

    #[test]
    fn test_write_narrows_to_storage_precision() {
        // A wide f64 that is not representable in f32 must come back rounded.
        let mut buf = vec![0u8; 4];
        ElementType::F32.write_wide(&mut buf, 0, WideNum::F64(0.1));
        assert_eq!(
            ElementType::F32.read_wide(&buf, 0),
            WideNum::F64(0.1f32 as f64)
        );
    }
}
