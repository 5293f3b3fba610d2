//! Compile-time constant propagation for ONNX computation graphs.
//!
//! This crate folds operators whose operands are all constant tensors into
//! single constant nodes holding the precomputed result. Arithmetic runs at
//! the widest precision of each element type family and is rounded back
//! through the storage precision, so folded results are bit-identical to
//! evaluating the operator at runtime.
//!
//! The pieces, from the bottom up:
//!
//! - [`WideNum`]: the widest-precision scalar all intermediate arithmetic
//!   uses, with per-element-type wrapped operators.
//! - [`Elements`]: the immutable constant tensor value, stored as a dense
//!   buffer, a splat, a lazy strided view or a deferred producer.
//! - [`transforms`]: the tensor algebra (transpose, reshape, slice, concat,
//!   gather, scatter, split, cast, reduce, broadcasting combine, where).
//! - [`Graph`]: the mutable IR the rewrite driver operates on.
//! - [`ConstPropPass`]: the pass itself, registered as `constprop-onnx`,
//!   which applies one fold pattern per operator family to a fixed point.
//!
//! ```
//! use onnx_constprop::{ConstPropPass, ElementType, Elements, Graph, OpKind, TensorType};
//!
//! let mut graph = Graph::new();
//! let lhs = graph.add_constant(None, Elements::from_vec::<f32>(&[3], vec![1.0, 2.0, 3.0]));
//! let rhs = graph.add_constant(None, Elements::from_vec::<f32>(&[3], vec![10.0, 20.0, 30.0]));
//! let out = graph.add_value(Some("sum"), TensorType::new(ElementType::F32, &[3]));
//! graph.add_op(None, OpKind::Add, &[Some(lhs), Some(rhs)], &[out]);
//! graph.set_output_ids(&[out]);
//!
//! ConstPropPass::new(false).run(&mut graph).unwrap();
//!
//! let folded = graph.constant_elements(graph.output_ids()[0]).unwrap();
//! assert_eq!(folded.to_vec::<f32>(), &[11.0, 22.0, 33.0]);
//! ```

mod constprop;
mod dtype;
mod elements;
mod error;
mod graph;
mod half;
pub mod report;
pub mod shape;
pub mod transforms;
mod wide;

pub use constprop::{
    apply_patterns_greedily, populate_const_prop_patterns, ConstPropPass, FoldOutputs,
    RewritePattern,
};
pub use dtype::{ElementType, Family};
pub use elements::{Elements, Scalar, WideIter};
pub use error::FoldError;
pub use graph::{
    ConstantNode, Graph, Node, NodeId, OpKind, OperatorNode, ReduceAttrs, TensorType, ValueNode,
};
pub use half::{Bf16, F16};
pub use wide::{
    binary_fn, cast_wide, div_by, unary_fn, BinaryOp, NarrowElem, UnaryOp, WideBinaryFn, WideNum,
    WideUnaryFn,
};
