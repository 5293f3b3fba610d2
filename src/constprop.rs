//! The constant-propagation pass.
//!
//! Each supported operator is fronted by a [`RewritePattern`] whose match
//! predicate is "all relevant operands are dense constants" (splats
//! qualify). A matching pattern evaluates the operator at compile time via
//! the [`transforms`](crate::transforms) algebra and hands back one
//! [`Elements`] per operator result; the driver swaps those into the graph
//! as new constant nodes and deletes the operator. Patterns are applied
//! greedily to a fixed point, so chains of foldable operators collapse in a
//! single run regardless of the order operators are visited in.

use std::io;

use smallvec::{smallvec, SmallVec};

use crate::elements::Elements;
use crate::error::FoldError;
use crate::graph::{Graph, Node, NodeId, OpKind, OperatorNode, ReduceAttrs, TensorType};
use crate::report;
use crate::shape::{is_valid_permutation, normalize_slice_params, resolve_axis};
use crate::transforms;
use crate::wide::{binary_fn, div_by, unary_fn, BinaryOp, UnaryOp};

/// The folded constants replacing one operator, one per operator result.
pub type FoldOutputs = SmallVec<[Elements; 1]>;

/// A rewrite that folds one family of operators.
pub trait RewritePattern {
    /// Try to fold the operator at `op_id`.
    ///
    /// Returns `None` when the pattern does not apply (wrong operator, or
    /// operands not all constant); the driver then offers the operator to
    /// the next pattern. An error aborts the pass.
    fn match_and_rewrite(
        &self,
        graph: &Graph,
        op_id: NodeId,
    ) -> Option<Result<FoldOutputs, FoldError>>;
}

fn single(elements: Elements) -> FoldOutputs {
    smallvec![elements]
}

/// The constant payload of operand `index`, if present and constant.
fn const_input<'a>(graph: &'a Graph, op: &OperatorNode, index: usize) -> Option<&'a Elements> {
    graph.constant_elements(op.input(index)?)
}

/// The declared type of operator result `index`.
fn result_type(graph: &Graph, op: &OperatorNode, index: usize) -> TensorType {
    graph
        .value_type(op.output_ids()[index])
        .expect("operator result must be a typed value node")
}

struct FoldElementwiseBinary;

impl RewritePattern for FoldElementwiseBinary {
    fn match_and_rewrite(
        &self,
        graph: &Graph,
        op_id: NodeId,
    ) -> Option<Result<FoldOutputs, FoldError>> {
        let op = graph.get_node(op_id)?.as_operator()?;
        let kind = match op.kind() {
            OpKind::Add => BinaryOp::Add,
            OpKind::Sub => BinaryOp::Sub,
            OpKind::Mul => BinaryOp::Mul,
            OpKind::Div => BinaryOp::Div,
            OpKind::Min => BinaryOp::Min,
            OpKind::Max => BinaryOp::Max,
            _ => return None,
        };
        let lhs = const_input(graph, op, 0)?;
        let rhs = const_input(graph, op, 1)?;
        report::count("ElementwiseBinary", &[lhs, rhs]);

        assert_eq!(
            lhs.dtype(),
            rhs.dtype(),
            "elementwise binary operands must have matching element types"
        );
        let out_ty = result_type(graph, op, 0);
        let combiner = binary_fn(lhs.dtype(), kind);
        Some(transforms::combine(lhs, rhs, &out_ty.shape, combiner).map(single))
    }
}

struct FoldElementwiseUnary;

impl RewritePattern for FoldElementwiseUnary {
    fn match_and_rewrite(
        &self,
        graph: &Graph,
        op_id: NodeId,
    ) -> Option<Result<FoldOutputs, FoldError>> {
        let op = graph.get_node(op_id)?.as_operator()?;
        let kind = match op.kind() {
            OpKind::Neg => UnaryOp::Neg,
            OpKind::Sqrt => UnaryOp::Sqrt,
            OpKind::Relu => UnaryOp::Relu,
            _ => return None,
        };
        let data = const_input(graph, op, 0)?;
        report::count("ElementwiseUnary", &[data]);

        if kind == UnaryOp::Sqrt && !data.dtype().is_float() {
            return Some(Err(FoldError::UnsupportedConfiguration(
                "sqrt requires a float element type",
            )));
        }
        let f = unary_fn(data.dtype(), kind);
        Some(Ok(single(transforms::transform(data, data.dtype(), f))))
    }
}

struct FoldWhere;

impl RewritePattern for FoldWhere {
    fn match_and_rewrite(
        &self,
        graph: &Graph,
        op_id: NodeId,
    ) -> Option<Result<FoldOutputs, FoldError>> {
        let op = graph.get_node(op_id)?.as_operator()?;
        if !matches!(op.kind(), OpKind::Where) {
            return None;
        }
        let cond = const_input(graph, op, 0)?;
        let lhs = const_input(graph, op, 1)?;
        let rhs = const_input(graph, op, 2)?;
        report::count("Where", &[cond, lhs, rhs]);

        let out_ty = result_type(graph, op, 0);
        Some(transforms::where_select(cond, lhs, rhs, &out_ty.shape).map(single))
    }
}

struct FoldReduce;

impl FoldReduce {
    fn eval(
        &self,
        graph: &Graph,
        op: &OperatorNode,
        data: &Elements,
        axes_values: &[i64],
        attrs: &ReduceAttrs,
        combiner: Option<BinaryOp>,
    ) -> Result<FoldOutputs, FoldError> {
        let rank = data.ndim() as i64;
        let mut axes: Vec<usize> = Vec::with_capacity(axes_values.len());
        for &value in axes_values {
            assert!(
                -rank <= value && value < rank,
                "reduce axis {} out of range for rank {}",
                value,
                rank
            );
            let axis = if value < 0 { value + rank } else { value } as usize;
            assert!(!axes.contains(&axis), "duplicate reduce axis {}", axis);
            axes.push(axis);
        }

        // Empty axes reduce over all dimensions unless the op opted out.
        if axes.is_empty() && !attrs.noop_with_empty_axes {
            axes = (0..rank as usize).collect();
        }
        if axes.is_empty() {
            return Ok(single(data.clone()));
        }

        let out_ty = result_type(graph, op, 0);
        if data.is_empty() {
            // NumPy has no identity for Min/Max/Mean over an empty tensor.
            let identity = match combiner {
                Some(BinaryOp::Add) => data.dtype().wide_zero(),
                Some(BinaryOp::Mul) => data.dtype().wide_one(),
                _ => {
                    return Err(FoldError::UnsupportedConfiguration(
                        "reduction of an empty tensor has no identity",
                    ))
                }
            };
            return Ok(single(Elements::splat(out_ty.dtype, &out_ty.shape, identity)));
        }

        let dtype = data.dtype();
        let reduced = match combiner {
            Some(kind) => {
                transforms::reduce(data, &axes, attrs.keep_dims, binary_fn(dtype, kind))
            }
            None => {
                // Mean: sum, then divide by the product of the reduced
                // extents.
                let sum = transforms::reduce(
                    data,
                    &axes,
                    attrs.keep_dims,
                    binary_fn(dtype, BinaryOp::Add),
                );
                assert!(
                    data.len() % sum.len() == 0,
                    "sum must reduce the element count by an integer factor"
                );
                let denominator = (data.len() / sum.len()) as i64;
                transforms::transform(&sum, dtype, div_by(dtype, denominator))
            }
        };
        Ok(single(reduced))
    }
}

impl RewritePattern for FoldReduce {
    fn match_and_rewrite(
        &self,
        graph: &Graph,
        op_id: NodeId,
    ) -> Option<Result<FoldOutputs, FoldError>> {
        let op = graph.get_node(op_id)?.as_operator()?;
        let (attrs, combiner) = match op.kind() {
            OpKind::ReduceSum(attrs) => (attrs, Some(BinaryOp::Add)),
            OpKind::ReduceProd(attrs) => (attrs, Some(BinaryOp::Mul)),
            OpKind::ReduceMin(attrs) => (attrs, Some(BinaryOp::Min)),
            OpKind::ReduceMax(attrs) => (attrs, Some(BinaryOp::Max)),
            OpKind::ReduceMean(attrs) => (attrs, None),
            _ => return None,
        };
        let data = const_input(graph, op, 0)?;

        // Axes come from the attribute (older opsets) or from a constant
        // operand (newer opsets).
        let axes_values: Vec<i64> = if let Some(axes) = &attrs.axes {
            axes.clone()
        } else if let Some(axes_id) = op.input(1) {
            let axes = graph.constant_elements(axes_id)?;
            axes.iter_wide().map(|value| value.to_index()).collect()
        } else {
            Vec::new()
        };

        report::count("Reduce", &[data]);
        Some(self.eval(graph, op, data, &axes_values, attrs, combiner))
    }
}

struct FoldTranspose;

impl RewritePattern for FoldTranspose {
    fn match_and_rewrite(
        &self,
        graph: &Graph,
        op_id: NodeId,
    ) -> Option<Result<FoldOutputs, FoldError>> {
        let op = graph.get_node(op_id)?.as_operator()?;
        let OpKind::Transpose { perm } = op.kind() else {
            return None;
        };
        let data = const_input(graph, op, 0)?;
        report::count("Transpose", &[data]);

        let rank = data.ndim();
        let perm: Vec<usize> = match perm {
            Some(perm) => {
                let mut resolved = Vec::with_capacity(perm.len());
                for &axis in perm {
                    if axis < 0 || axis >= rank as i64 {
                        return Some(Err(FoldError::InvalidValue(
                            "perm must be a permutation of the input axes",
                        )));
                    }
                    resolved.push(axis as usize);
                }
                if !is_valid_permutation(rank, &resolved) {
                    return Some(Err(FoldError::InvalidValue(
                        "perm must be a permutation of the input axes",
                    )));
                }
                resolved
            }
            // The ONNX default reverses the dimensions.
            None => (0..rank).rev().collect(),
        };
        Some(Ok(single(transforms::transpose(data, &perm))))
    }
}

/// Reshape, Squeeze and Unsqueeze all reinterpret the input with the result
/// shape that shape inference already assigned.
struct FoldReshapeLike;

impl RewritePattern for FoldReshapeLike {
    fn match_and_rewrite(
        &self,
        graph: &Graph,
        op_id: NodeId,
    ) -> Option<Result<FoldOutputs, FoldError>> {
        let op = graph.get_node(op_id)?.as_operator()?;
        let family = match op.kind() {
            OpKind::Reshape => "Reshape",
            OpKind::Squeeze => "Squeeze",
            OpKind::Unsqueeze => "Unsqueeze",
            _ => return None,
        };
        let data = const_input(graph, op, 0)?;
        report::count(family, &[data]);

        let out_ty = result_type(graph, op, 0);
        Some(transforms::reshape(data, &out_ty.shape).map(single))
    }
}

struct FoldSplit;

impl RewritePattern for FoldSplit {
    fn match_and_rewrite(
        &self,
        graph: &Graph,
        op_id: NodeId,
    ) -> Option<Result<FoldOutputs, FoldError>> {
        let op = graph.get_node(op_id)?.as_operator()?;
        let OpKind::Split { axis, sizes } = op.kind() else {
            return None;
        };
        let data = const_input(graph, op, 0)?;
        report::count("Split", &[data]);

        let axis = match resolve_axis(data.ndim(), *axis) {
            Ok(axis) => axis,
            Err(err) => return Some(Err(err)),
        };
        let n_outputs = op.output_ids().len();
        let axis_size = data.shape()[axis];

        let raw_sizes: Option<Vec<i64>> = if let Some(sizes) = sizes {
            Some(sizes.clone())
        } else if let Some(sizes_id) = op.input(1) {
            match graph.constant_elements(sizes_id) {
                Some(sizes) => Some(sizes.iter_wide().map(|v| v.to_index()).collect()),
                None => {
                    return Some(Err(FoldError::UnsupportedConfiguration(
                        "split with dynamic sizes is not supported",
                    )))
                }
            }
        } else {
            None
        };

        let sizes: Vec<usize> = match raw_sizes {
            Some(raw) => {
                let mut sizes = Vec::with_capacity(raw.len());
                for value in raw {
                    if value < 0 {
                        return Some(Err(FoldError::InvalidValue(
                            "split sizes must be non-negative",
                        )));
                    }
                    sizes.push(value as usize);
                }
                sizes
            }
            None => {
                // Without sizes the axis is divided evenly across the
                // results.
                assert!(
                    axis_size % n_outputs == 0,
                    "the split axis size must be divisible by the number of results"
                );
                vec![axis_size / n_outputs; n_outputs]
            }
        };
        assert_eq!(
            sizes.len(),
            n_outputs,
            "split sizes must match the result count"
        );

        Some(Ok(SmallVec::from_vec(transforms::split(data, axis, &sizes))))
    }
}

struct FoldScatterNd;

impl RewritePattern for FoldScatterNd {
    fn match_and_rewrite(
        &self,
        graph: &Graph,
        op_id: NodeId,
    ) -> Option<Result<FoldOutputs, FoldError>> {
        let op = graph.get_node(op_id)?.as_operator()?;
        if !matches!(op.kind(), OpKind::ScatterNd) {
            return None;
        }
        let data = const_input(graph, op, 0)?;
        let indices = const_input(graph, op, 1)?;
        let updates = const_input(graph, op, 2)?;
        report::count("Scatter", &[data, indices, updates]);

        Some(transforms::scatter_nd(data, indices, updates).map(single))
    }
}

struct FoldCast;

impl RewritePattern for FoldCast {
    fn match_and_rewrite(
        &self,
        graph: &Graph,
        op_id: NodeId,
    ) -> Option<Result<FoldOutputs, FoldError>> {
        let op = graph.get_node(op_id)?.as_operator()?;
        let OpKind::Cast { to } = op.kind() else {
            return None;
        };
        let data = const_input(graph, op, 0)?;
        report::count("Cast", &[data]);

        Some(Ok(single(transforms::cast_element_type(data, *to))))
    }
}

struct FoldSlice;

impl RewritePattern for FoldSlice {
    fn match_and_rewrite(
        &self,
        graph: &Graph,
        op_id: NodeId,
    ) -> Option<Result<FoldOutputs, FoldError>> {
        let op = graph.get_node(op_id)?.as_operator()?;
        if !matches!(op.kind(), OpKind::Slice) {
            return None;
        }
        let data = const_input(graph, op, 0)?;

        // All slice parameters must be constant for the shape helper to
        // normalise them to literals.
        let as_ints = |elements: &Elements| -> Vec<i64> {
            elements.iter_wide().map(|value| value.to_index()).collect()
        };
        let starts = as_ints(const_input(graph, op, 1)?);
        let ends = as_ints(const_input(graph, op, 2)?);
        let axes = match op.input(3) {
            Some(id) => Some(as_ints(graph.constant_elements(id)?)),
            None => None,
        };
        let steps = match op.input(4) {
            Some(id) => Some(as_ints(graph.constant_elements(id)?)),
            None => None,
        };
        report::count("Slice", &[data]);

        let params = match normalize_slice_params(
            data.shape(),
            &starts,
            &ends,
            axes.as_deref(),
            steps.as_deref(),
        ) {
            Ok(params) => params,
            Err(err) => return Some(Err(err)),
        };
        Some(Ok(single(transforms::slice(data, &params))))
    }
}

struct FoldConcat;

impl RewritePattern for FoldConcat {
    fn match_and_rewrite(
        &self,
        graph: &Graph,
        op_id: NodeId,
    ) -> Option<Result<FoldOutputs, FoldError>> {
        let op = graph.get_node(op_id)?.as_operator()?;
        let OpKind::Concat { axis } = op.kind() else {
            return None;
        };

        let mut inputs = Vec::with_capacity(op.input_ids().len());
        for index in 0..op.input_ids().len() {
            inputs.push(const_input(graph, op, index)?.clone());
        }
        let counted: Vec<&Elements> = inputs.iter().collect();
        report::count("Concat", &counted);

        let axis = match resolve_axis(inputs[0].ndim(), *axis) {
            Ok(axis) => axis,
            Err(err) => return Some(Err(err)),
        };
        Some(transforms::concat(&inputs, axis).map(single))
    }
}

struct FoldExpand;

impl RewritePattern for FoldExpand {
    fn match_and_rewrite(
        &self,
        graph: &Graph,
        op_id: NodeId,
    ) -> Option<Result<FoldOutputs, FoldError>> {
        let op = graph.get_node(op_id)?.as_operator()?;
        if !matches!(op.kind(), OpKind::Expand) {
            return None;
        }
        let data = const_input(graph, op, 0)?;
        report::count("Expand", &[data]);

        let out_ty = result_type(graph, op, 0);
        Some(transforms::expand(data, &out_ty.shape).map(single))
    }
}

struct FoldGather;

impl RewritePattern for FoldGather {
    fn match_and_rewrite(
        &self,
        graph: &Graph,
        op_id: NodeId,
    ) -> Option<Result<FoldOutputs, FoldError>> {
        let op = graph.get_node(op_id)?.as_operator()?;
        let OpKind::Gather { axis } = op.kind() else {
            return None;
        };
        let data = const_input(graph, op, 0)?;
        let indices = const_input(graph, op, 1)?;
        report::count("Gather", &[data, indices]);

        let axis = match resolve_axis(data.ndim(), *axis) {
            Ok(axis) => axis,
            Err(err) => return Some(Err(err)),
        };
        Some(transforms::gather(data, indices, axis).map(single))
    }
}

/// Register every fold pattern into `patterns`.
pub fn populate_const_prop_patterns(patterns: &mut Vec<Box<dyn RewritePattern>>) {
    patterns.push(Box::new(FoldElementwiseBinary));
    patterns.push(Box::new(FoldElementwiseUnary));
    patterns.push(Box::new(FoldWhere));
    patterns.push(Box::new(FoldReduce));
    patterns.push(Box::new(FoldTranspose));
    patterns.push(Box::new(FoldReshapeLike));
    patterns.push(Box::new(FoldSplit));
    patterns.push(Box::new(FoldScatterNd));
    patterns.push(Box::new(FoldCast));
    patterns.push(Box::new(FoldSlice));
    patterns.push(Box::new(FoldConcat));
    patterns.push(Box::new(FoldExpand));
    patterns.push(Box::new(FoldGather));
}

/// Offer every operator to every pattern until no more folds apply.
pub fn apply_patterns_greedily(
    graph: &mut Graph,
    patterns: &[Box<dyn RewritePattern>],
) -> Result<(), FoldError> {
    loop {
        let mut n_folds = 0;
        for op_id in graph.operator_ids() {
            if graph.get_node(op_id).is_none() {
                continue;
            }
            let Some(result) = patterns
                .iter()
                .find_map(|pattern| pattern.match_and_rewrite(graph, op_id))
            else {
                continue;
            };
            apply_fold(graph, op_id, result?);
            n_folds += 1;
        }
        if n_folds == 0 {
            return Ok(());
        }
    }
}

/// Swap an operator's results for freshly created constants and delete it.
fn apply_fold(graph: &mut Graph, op_id: NodeId, outputs: FoldOutputs) {
    let out_value_ids = {
        let op = graph
            .get_node(op_id)
            .and_then(Node::as_operator)
            .expect("fold target must be an operator");
        op.output_ids().to_vec()
    };
    assert_eq!(
        outputs.len(),
        out_value_ids.len(),
        "fold must produce one constant per operator result"
    );

    for (value_id, elements) in out_value_ids.into_iter().zip(outputs) {
        let declared = graph
            .value_type(value_id)
            .expect("operator result must be a typed value node");
        assert_eq!(
            elements.dtype(),
            declared.dtype,
            "folded element type must match the declared result type"
        );
        assert_eq!(
            elements.shape(),
            &declared.shape[..],
            "folded shape must match the declared result shape"
        );

        let name = graph
            .get_node(value_id)
            .and_then(Node::name)
            .map(|s| s.to_owned());
        let const_id = graph.add_constant(name.as_deref(), elements);
        graph.replace_value(value_id, const_id);
    }
    graph.remove_op(op_id);
}

/// The compiler pass wrapping the fold patterns.
///
/// Registered under the stable identifier given by [`ConstPropPass::ARGUMENT`].
pub struct ConstPropPass {
    report: bool,
}

impl ConstPropPass {
    /// The stable pass identifier.
    pub const ARGUMENT: &'static str = "constprop-onnx";

    pub fn new(report: bool) -> ConstPropPass {
        ConstPropPass { report }
    }

    pub fn description(&self) -> &'static str {
        "Replace operators whose operands are all constant with precomputed constants"
    }

    /// Fold `graph` to a fixed point.
    ///
    /// When the pass was constructed with `report` enabled, the cumulative
    /// fold statistics are dumped to stdout afterwards, whether or not the
    /// pass succeeded.
    pub fn run(&self, graph: &mut Graph) -> Result<(), FoldError> {
        let mut patterns: Vec<Box<dyn RewritePattern>> = Vec::new();
        populate_const_prop_patterns(&mut patterns);
        let result = apply_patterns_greedily(graph, &patterns);
        if self.report {
            let _ = report::dump(&mut io::stdout());
        }
        result
    }
}

#[cfg(test)]
mod tests {
    use super::ConstPropPass;
    use crate::dtype::ElementType;
    use crate::elements::Elements;
    use crate::error::FoldError;
    use crate::graph::{Graph, OpKind, ReduceAttrs, TensorType};
    use crate::report;

    fn fold(graph: &mut Graph) {
        ConstPropPass::new(false).run(graph).unwrap();
    }

    /// The constant that replaced the graph's single output.
    fn output_elements(graph: &Graph) -> &Elements {
        graph
            .constant_elements(graph.output_ids()[0])
            .expect("graph output should have been folded to a constant")
    }

    #[test]
    fn test_fold_add() {
        let mut graph = Graph::new();
        let lhs = graph.add_constant(
            Some("lhs"),
            Elements::from_vec::<f32>(&[3], vec![1.0, 2.0, 3.0]),
        );
        let rhs = graph.add_constant(
            Some("rhs"),
            Elements::from_vec::<f32>(&[3], vec![10.0, 20.0, 30.0]),
        );
        let out = graph.add_value(Some("sum"), TensorType::new(ElementType::F32, &[3]));
        graph.add_op(Some("add"), OpKind::Add, &[Some(lhs), Some(rhs)], &[out]);
        graph.set_output_ids(&[out]);

        fold(&mut graph);

        assert!(graph.operator_ids().is_empty());
        assert_eq!(output_elements(&graph).to_vec::<f32>(), &[11.0, 22.0, 33.0]);
    }

    #[test]
    fn test_fold_binary_broadcast() {
        let mut graph = Graph::new();
        let lhs = graph.add_constant(None, Elements::from_vec::<i32>(&[2, 1], vec![1, 2]));
        let rhs = graph.add_constant(None, Elements::from_vec::<i32>(&[3], vec![10, 20, 30]));
        let out = graph.add_value(None, TensorType::new(ElementType::I32, &[2, 3]));
        graph.add_op(None, OpKind::Mul, &[Some(lhs), Some(rhs)], &[out]);
        graph.set_output_ids(&[out]);

        fold(&mut graph);

        assert_eq!(
            output_elements(&graph).to_vec::<i32>(),
            &[10, 20, 30, 20, 40, 60]
        );
    }

    #[test]
    fn test_fold_unary_ops() {
        #[derive(Debug)]
        struct Case {
            kind: OpKind,
            input: Vec<f32>,
            expected: Vec<f32>,
        }

        let cases = [
            Case {
                kind: OpKind::Neg,
                input: vec![1.0, -2.0],
                expected: vec![-1.0, 2.0],
            },
            Case {
                kind: OpKind::Relu,
                input: vec![-1.5, 0.0, 2.5],
                expected: vec![0.0, 0.0, 2.5],
            },
            Case {
                kind: OpKind::Sqrt,
                input: vec![4.0, 9.0],
                expected: vec![2.0, 3.0],
            },
        ];

        for case in cases {
            let mut graph = Graph::new();
            let shape = [case.input.len()];
            let input = graph.add_constant(None, Elements::from_vec::<f32>(&shape, case.input.clone()));
            let out = graph.add_value(None, TensorType::new(ElementType::F32, &shape));
            graph.add_op(None, case.kind.clone(), &[Some(input)], &[out]);
            graph.set_output_ids(&[out]);

            fold(&mut graph);

            assert_eq!(
                output_elements(&graph).to_vec::<f32>(),
                case.expected,
                "case {:?}",
                case
            );
        }
    }

    #[test]
    fn test_sqrt_of_int_is_rejected() {
        let mut graph = Graph::new();
        let input = graph.add_constant(None, Elements::from_vec::<i32>(&[2], vec![4, 9]));
        let out = graph.add_value(None, TensorType::new(ElementType::I32, &[2]));
        graph.add_op(None, OpKind::Sqrt, &[Some(input)], &[out]);
        graph.set_output_ids(&[out]);

        let err = ConstPropPass::new(false).run(&mut graph).unwrap_err();
        assert_eq!(
            err,
            FoldError::UnsupportedConfiguration("sqrt requires a float element type")
        );
    }

    #[test]
    fn test_fold_where_and_counters() {
        // The Where family is folded only by this test, so the cumulative
        // counter delta is exact.
        let before = report::counters_for("Where");

        let mut graph = Graph::new();
        let cond = graph.add_constant(
            None,
            Elements::from_vec::<bool>(&[3], vec![true, false, true]),
        );
        let lhs = graph.add_constant(None, Elements::from_vec::<f32>(&[3], vec![1.0, 2.0, 3.0]));
        let rhs = graph.add_constant(None, Elements::splat_of::<f32>(&[3], 0.0));
        let out = graph.add_value(None, TensorType::new(ElementType::F32, &[3]));
        graph.add_op(None, OpKind::Where, &[Some(cond), Some(lhs), Some(rhs)], &[out]);
        graph.set_output_ids(&[out]);

        fold(&mut graph);

        assert_eq!(output_elements(&graph).to_vec::<f32>(), &[1.0, 0.0, 3.0]);

        let after = report::counters_for("Where");
        assert_eq!(after.invocations - before.invocations, 1);
        assert_eq!(after.input_elms - before.input_elms, 9);
    }

    #[test]
    fn test_fold_reduce_mean() {
        let mut graph = Graph::new();
        let data = graph.add_constant(
            None,
            Elements::from_vec::<f32>(&[2, 3], vec![1.0, 2.0, 3.0, 4.0, 5.0, 6.0]),
        );
        let out = graph.add_value(None, TensorType::new(ElementType::F32, &[2]));
        graph.add_op(
            None,
            OpKind::ReduceMean(ReduceAttrs {
                axes: Some(vec![1]),
                keep_dims: false,
                noop_with_empty_axes: false,
            }),
            &[Some(data)],
            &[out],
        );
        graph.set_output_ids(&[out]);

        fold(&mut graph);

        assert_eq!(output_elements(&graph).to_vec::<f32>(), &[2.0, 5.0]);
    }

    #[test]
    fn test_fold_reduce_axes_from_operand() {
        let mut graph = Graph::new();
        let data = graph.add_constant(
            None,
            Elements::from_vec::<i64>(&[2, 3], vec![1, 2, 3, 4, 5, 6]),
        );
        let axes = graph.add_constant(None, Elements::from_vec::<i64>(&[1], vec![0]));
        let out = graph.add_value(None, TensorType::new(ElementType::I64, &[1, 3]));
        graph.add_op(
            None,
            OpKind::ReduceSum(ReduceAttrs::default()),
            &[Some(data), Some(axes)],
            &[out],
        );
        graph.set_output_ids(&[out]);

        fold(&mut graph);

        assert_eq!(output_elements(&graph).to_vec::<i64>(), &[5, 7, 9]);
        assert_eq!(output_elements(&graph).shape(), &[1, 3]);
    }

    #[test]
    fn test_fold_reduce_empty_axes_reduces_all() {
        let mut graph = Graph::new();
        let data = graph.add_constant(None, Elements::from_vec::<i64>(&[2, 2], vec![1, 2, 3, 4]));
        let out = graph.add_value(None, TensorType::new(ElementType::I64, &[]));
        graph.add_op(
            None,
            OpKind::ReduceProd(ReduceAttrs {
                axes: None,
                keep_dims: false,
                noop_with_empty_axes: false,
            }),
            &[Some(data)],
            &[out],
        );
        graph.set_output_ids(&[out]);

        fold(&mut graph);

        assert_eq!(output_elements(&graph).to_vec::<i64>(), &[24]);
    }

    #[test]
    fn test_fold_reduce_noop_with_empty_axes() {
        let mut graph = Graph::new();
        let data = graph.add_constant(None, Elements::from_vec::<i64>(&[4], vec![1, 2, 3, 4]));
        let out = graph.add_value(None, TensorType::new(ElementType::I64, &[4]));
        graph.add_op(
            None,
            OpKind::ReduceMax(ReduceAttrs {
                axes: None,
                keep_dims: true,
                noop_with_empty_axes: true,
            }),
            &[Some(data)],
            &[out],
        );
        graph.set_output_ids(&[out]);

        fold(&mut graph);

        assert_eq!(output_elements(&graph).to_vec::<i64>(), &[1, 2, 3, 4]);
    }

    #[test]
    fn test_fold_reduce_empty_tensor_identities() {
        // Sum over an empty tensor folds to the additive identity.
        let mut graph = Graph::new();
        let data = graph.add_constant(None, Elements::from_vec::<f32>(&[0, 3], vec![]));
        let out = graph.add_value(None, TensorType::new(ElementType::F32, &[]));
        graph.add_op(
            None,
            OpKind::ReduceSum(ReduceAttrs {
                axes: None,
                keep_dims: false,
                noop_with_empty_axes: false,
            }),
            &[Some(data)],
            &[out],
        );
        graph.set_output_ids(&[out]);

        fold(&mut graph);
        assert_eq!(output_elements(&graph).to_vec::<f32>(), &[0.0]);

        // Min over an empty tensor has no identity and must fail.
        let mut graph = Graph::new();
        let data = graph.add_constant(None, Elements::from_vec::<f32>(&[0, 3], vec![]));
        let out = graph.add_value(None, TensorType::new(ElementType::F32, &[]));
        graph.add_op(
            None,
            OpKind::ReduceMin(ReduceAttrs {
                axes: None,
                keep_dims: false,
                noop_with_empty_axes: false,
            }),
            &[Some(data)],
            &[out],
        );
        graph.set_output_ids(&[out]);

        let err = ConstPropPass::new(false).run(&mut graph).unwrap_err();
        assert_eq!(
            err,
            FoldError::UnsupportedConfiguration("reduction of an empty tensor has no identity")
        );
    }

    #[test]
    fn test_fold_transpose() {
        let mut graph = Graph::new();
        let data = graph.add_constant(
            None,
            Elements::from_vec::<i32>(&[2, 3], vec![1, 2, 3, 4, 5, 6]),
        );
        let out = graph.add_value(None, TensorType::new(ElementType::I32, &[3, 2]));
        graph.add_op(
            None,
            OpKind::Transpose {
                perm: Some(vec![1, 0]),
            },
            &[Some(data)],
            &[out],
        );
        graph.set_output_ids(&[out]);

        fold(&mut graph);

        let folded = output_elements(&graph);
        assert_eq!(folded.shape(), &[3, 2]);
        assert_eq!(folded.to_vec::<i32>(), &[1, 4, 2, 5, 3, 6]);
    }

    #[test]
    fn test_fold_transpose_default_perm_reverses() {
        let mut graph = Graph::new();
        let data = graph.add_constant(
            None,
            Elements::from_vec::<i32>(&[1, 2, 3], vec![1, 2, 3, 4, 5, 6]),
        );
        let out = graph.add_value(None, TensorType::new(ElementType::I32, &[3, 2, 1]));
        graph.add_op(None, OpKind::Transpose { perm: None }, &[Some(data)], &[out]);
        graph.set_output_ids(&[out]);

        fold(&mut graph);

        let folded = output_elements(&graph);
        assert_eq!(folded.shape(), &[3, 2, 1]);
        assert_eq!(folded.to_vec::<i32>(), &[1, 4, 2, 5, 3, 6]);
    }

    #[test]
    fn test_fold_reshape_squeeze_unsqueeze() {
        #[derive(Debug)]
        struct Case {
            kind: OpKind,
            in_shape: Vec<usize>,
            out_shape: Vec<usize>,
        }

        let cases = [
            Case {
                kind: OpKind::Reshape,
                in_shape: vec![2, 3],
                out_shape: vec![3, 2],
            },
            Case {
                kind: OpKind::Squeeze,
                in_shape: vec![1, 6, 1],
                out_shape: vec![6],
            },
            Case {
                kind: OpKind::Unsqueeze,
                in_shape: vec![6],
                out_shape: vec![1, 6, 1],
            },
        ];

        for case in cases {
            let mut graph = Graph::new();
            let data = graph.add_constant(
                None,
                Elements::from_vec::<i32>(&case.in_shape, (0..6).collect()),
            );
            let out = graph.add_value(None, TensorType::new(ElementType::I32, &case.out_shape));
            graph.add_op(None, case.kind.clone(), &[Some(data)], &[out]);
            graph.set_output_ids(&[out]);

            fold(&mut graph);

            let folded = output_elements(&graph);
            assert_eq!(folded.shape(), case.out_shape, "case {:?}", case);
            assert_eq!(folded.to_vec::<i32>(), (0..6).collect::<Vec<_>>(), "case {:?}", case);
        }
    }

    #[test]
    fn test_fold_split_variants() {
        // Sizes from the attribute.
        let mut graph = Graph::new();
        let data = graph.add_constant(None, Elements::from_vec::<i32>(&[5], vec![1, 2, 3, 4, 5]));
        let out_a = graph.add_value(None, TensorType::new(ElementType::I32, &[2]));
        let out_b = graph.add_value(None, TensorType::new(ElementType::I32, &[3]));
        graph.add_op(
            None,
            OpKind::Split {
                axis: 0,
                sizes: Some(vec![2, 3]),
            },
            &[Some(data)],
            &[out_a, out_b],
        );
        graph.set_output_ids(&[out_a, out_b]);

        fold(&mut graph);

        assert_eq!(
            graph.constant_elements(graph.output_ids()[0]).unwrap().to_vec::<i32>(),
            &[1, 2]
        );
        assert_eq!(
            graph.constant_elements(graph.output_ids()[1]).unwrap().to_vec::<i32>(),
            &[3, 4, 5]
        );

        // Sizes from a constant operand.
        let mut graph = Graph::new();
        let data = graph.add_constant(None, Elements::from_vec::<i32>(&[4], vec![1, 2, 3, 4]));
        let sizes = graph.add_constant(None, Elements::from_vec::<i64>(&[2], vec![1, 3]));
        let out_a = graph.add_value(None, TensorType::new(ElementType::I32, &[1]));
        let out_b = graph.add_value(None, TensorType::new(ElementType::I32, &[3]));
        graph.add_op(
            None,
            OpKind::Split { axis: 0, sizes: None },
            &[Some(data), Some(sizes)],
            &[out_a, out_b],
        );
        graph.set_output_ids(&[out_a, out_b]);

        fold(&mut graph);

        assert_eq!(
            graph.constant_elements(graph.output_ids()[0]).unwrap().to_vec::<i32>(),
            &[1]
        );
        assert_eq!(
            graph.constant_elements(graph.output_ids()[1]).unwrap().to_vec::<i32>(),
            &[2, 3, 4]
        );

        // No sizes at all: the axis divides evenly across the results.
        let mut graph = Graph::new();
        let data = graph.add_constant(None, Elements::from_vec::<i32>(&[4], vec![1, 2, 3, 4]));
        let out_a = graph.add_value(None, TensorType::new(ElementType::I32, &[2]));
        let out_b = graph.add_value(None, TensorType::new(ElementType::I32, &[2]));
        graph.add_op(
            None,
            OpKind::Split { axis: 0, sizes: None },
            &[Some(data)],
            &[out_a, out_b],
        );
        graph.set_output_ids(&[out_a, out_b]);

        fold(&mut graph);

        assert_eq!(
            graph.constant_elements(graph.output_ids()[1]).unwrap().to_vec::<i32>(),
            &[3, 4]
        );
    }

    #[test]
    fn test_fold_split_dynamic_sizes_fails() {
        let mut graph = Graph::new();
        let data = graph.add_constant(None, Elements::from_vec::<i32>(&[4], vec![1, 2, 3, 4]));
        // The sizes operand is a dynamic value, not a constant.
        let sizes = graph.add_value(None, TensorType::new(ElementType::I64, &[2]));
        let out_a = graph.add_value(None, TensorType::new(ElementType::I32, &[2]));
        let out_b = graph.add_value(None, TensorType::new(ElementType::I32, &[2]));
        graph.add_op(
            None,
            OpKind::Split { axis: 0, sizes: None },
            &[Some(data), Some(sizes)],
            &[out_a, out_b],
        );
        graph.set_output_ids(&[out_a, out_b]);

        let err = ConstPropPass::new(false).run(&mut graph).unwrap_err();
        assert_eq!(
            err,
            FoldError::UnsupportedConfiguration("split with dynamic sizes is not supported")
        );
    }

    #[test]
    fn test_fold_scatter_nd_and_counters() {
        // The Scatter family is folded only by this test, so the cumulative
        // counter delta is exact.
        let before = report::counters_for("Scatter");

        let mut graph = Graph::new();
        let data = graph.add_constant(None, Elements::splat_of::<f32>(&[4, 4], 0.0));
        let indices = graph.add_constant(None, Elements::from_vec::<i64>(&[2, 2], vec![0, 0, 2, 3]));
        let updates = graph.add_constant(None, Elements::from_vec::<f32>(&[2], vec![1.0, 9.0]));
        let out = graph.add_value(None, TensorType::new(ElementType::F32, &[4, 4]));
        graph.add_op(
            None,
            OpKind::ScatterNd,
            &[Some(data), Some(indices), Some(updates)],
            &[out],
        );
        graph.set_output_ids(&[out]);

        fold(&mut graph);

        let values = output_elements(&graph).to_vec::<f32>();
        assert_eq!(values[0], 1.0);
        assert_eq!(values[11], 9.0);
        assert_eq!(values.iter().filter(|v| **v == 0.0).count(), 14);

        let after = report::counters_for("Scatter");
        assert_eq!(after.invocations - before.invocations, 1);
        assert_eq!(after.input_elms - before.input_elms, 16 + 4 + 2);
    }

    #[test]
    fn test_fold_cast() {
        let mut graph = Graph::new();
        let data = graph.add_constant(
            None,
            Elements::from_vec::<f32>(&[3], vec![1.9, -2.9, 300.0]),
        );
        let out = graph.add_value(None, TensorType::new(ElementType::I8, &[3]));
        graph.add_op(
            None,
            OpKind::Cast {
                to: ElementType::I8,
            },
            &[Some(data)],
            &[out],
        );
        graph.set_output_ids(&[out]);

        fold(&mut graph);

        assert_eq!(output_elements(&graph).to_vec::<i8>(), &[1, -2, 127]);
    }

    #[test]
    fn test_fold_slice() {
        let mut graph = Graph::new();
        let data = graph.add_constant(None, Elements::from_vec::<i64>(&[10], (0..10).collect()));
        let starts = graph.add_constant(None, Elements::from_vec::<i64>(&[1], vec![1]));
        let ends = graph.add_constant(None, Elements::from_vec::<i64>(&[1], vec![8]));
        let axes = graph.add_constant(None, Elements::from_vec::<i64>(&[1], vec![0]));
        let steps = graph.add_constant(None, Elements::from_vec::<i64>(&[1], vec![2]));
        let out = graph.add_value(None, TensorType::new(ElementType::I64, &[4]));
        graph.add_op(
            None,
            OpKind::Slice,
            &[Some(data), Some(starts), Some(ends), Some(axes), Some(steps)],
            &[out],
        );
        graph.set_output_ids(&[out]);

        fold(&mut graph);

        assert_eq!(output_elements(&graph).to_vec::<i64>(), &[1, 3, 5, 7]);
    }

    #[test]
    fn test_fold_slice_step_zero_fails() {
        let mut graph = Graph::new();
        let data = graph.add_constant(None, Elements::from_vec::<i64>(&[4], (0..4).collect()));
        let starts = graph.add_constant(None, Elements::from_vec::<i64>(&[1], vec![0]));
        let ends = graph.add_constant(None, Elements::from_vec::<i64>(&[1], vec![4]));
        let axes = graph.add_constant(None, Elements::from_vec::<i64>(&[1], vec![0]));
        let steps = graph.add_constant(None, Elements::from_vec::<i64>(&[1], vec![0]));
        let out = graph.add_value(None, TensorType::new(ElementType::I64, &[4]));
        graph.add_op(
            None,
            OpKind::Slice,
            &[Some(data), Some(starts), Some(ends), Some(axes), Some(steps)],
            &[out],
        );
        graph.set_output_ids(&[out]);

        let err = ConstPropPass::new(false).run(&mut graph).unwrap_err();
        assert_eq!(err, FoldError::IndexOutOfRange("slice step must be nonzero"));
    }

    #[test]
    fn test_fold_concat() {
        let mut graph = Graph::new();
        let a = graph.add_constant(None, Elements::from_vec::<i32>(&[2], vec![1, 2]));
        let b = graph.add_constant(None, Elements::from_vec::<i32>(&[3], vec![3, 4, 5]));
        let out = graph.add_value(None, TensorType::new(ElementType::I32, &[5]));
        graph.add_op(None, OpKind::Concat { axis: 0 }, &[Some(a), Some(b)], &[out]);
        graph.set_output_ids(&[out]);

        fold(&mut graph);

        assert_eq!(output_elements(&graph).to_vec::<i32>(), &[1, 2, 3, 4, 5]);
    }

    #[test]
    fn test_fold_concat_negative_axis() {
        let mut graph = Graph::new();
        let a = graph.add_constant(None, Elements::from_vec::<i32>(&[2, 1], vec![1, 4]));
        let b = graph.add_constant(None, Elements::from_vec::<i32>(&[2, 2], vec![2, 3, 5, 6]));
        let out = graph.add_value(None, TensorType::new(ElementType::I32, &[2, 3]));
        graph.add_op(None, OpKind::Concat { axis: -1 }, &[Some(a), Some(b)], &[out]);
        graph.set_output_ids(&[out]);

        fold(&mut graph);

        assert_eq!(output_elements(&graph).to_vec::<i32>(), &[1, 2, 3, 4, 5, 6]);
    }

    #[test]
    fn test_fold_expand_preserves_splat() {
        let mut graph = Graph::new();
        let data = graph.add_constant(None, Elements::splat_of::<f32>(&[1], 5.0));
        let shape = graph.add_constant(None, Elements::from_vec::<i64>(&[2], vec![2, 4]));
        let out = graph.add_value(None, TensorType::new(ElementType::F32, &[2, 4]));
        graph.add_op(None, OpKind::Expand, &[Some(data), Some(shape)], &[out]);
        graph.set_output_ids(&[out]);

        fold(&mut graph);

        let folded = output_elements(&graph);
        assert!(folded.is_splat(), "expanding a splat must stay a splat");
        assert_eq!(folded.shape(), &[2, 4]);
        assert_eq!(folded.to_vec::<f32>(), &[5.0; 8]);
    }

    #[test]
    fn test_fold_gather() {
        let mut graph = Graph::new();
        let data = graph.add_constant(
            None,
            Elements::from_vec::<f32>(&[3, 2], vec![10.0, 20.0, 30.0, 40.0, 50.0, 60.0]),
        );
        let indices = graph.add_constant(None, Elements::from_vec::<i64>(&[3], vec![2, 0, -1]));
        let out = graph.add_value(None, TensorType::new(ElementType::F32, &[3, 2]));
        graph.add_op(
            None,
            OpKind::Gather { axis: 0 },
            &[Some(data), Some(indices)],
            &[out],
        );
        graph.set_output_ids(&[out]);

        fold(&mut graph);

        assert_eq!(
            output_elements(&graph).to_vec::<f32>(),
            &[50.0, 60.0, 10.0, 20.0, 50.0, 60.0]
        );
    }

    #[test]
    fn test_fold_gather_bad_index_fails() {
        let mut graph = Graph::new();
        let data = graph.add_constant(None, Elements::from_vec::<f32>(&[3], vec![1.0, 2.0, 3.0]));
        let indices = graph.add_constant(None, Elements::from_vec::<i64>(&[1], vec![5]));
        let out = graph.add_value(None, TensorType::new(ElementType::F32, &[1]));
        graph.add_op(
            None,
            OpKind::Gather { axis: 0 },
            &[Some(data), Some(indices)],
            &[out],
        );
        graph.set_output_ids(&[out]);

        let err = ConstPropPass::new(false).run(&mut graph).unwrap_err();
        assert_eq!(err, FoldError::IndexOutOfRange("gather index is out of range"));
    }

    #[test]
    fn test_transitive_folding_collapses_chains() {
        // Add(c1, c2) feeding Reshape(..) collapses in a single run.
        let mut graph = Graph::new();
        let lhs = graph.add_constant(None, Elements::from_vec::<i32>(&[4], vec![1, 2, 3, 4]));
        let rhs = graph.add_constant(None, Elements::from_vec::<i32>(&[4], vec![10, 20, 30, 40]));
        let sum = graph.add_value(None, TensorType::new(ElementType::I32, &[4]));
        graph.add_op(None, OpKind::Add, &[Some(lhs), Some(rhs)], &[sum]);
        let reshaped = graph.add_value(None, TensorType::new(ElementType::I32, &[2, 2]));
        graph.add_op(None, OpKind::Reshape, &[Some(sum)], &[reshaped]);
        graph.set_output_ids(&[reshaped]);

        fold(&mut graph);

        assert!(graph.operator_ids().is_empty());
        let folded = output_elements(&graph);
        assert_eq!(folded.shape(), &[2, 2]);
        assert_eq!(folded.to_vec::<i32>(), &[11, 22, 33, 44]);
    }

    #[test]
    fn test_folding_is_confluent_under_operator_order() {
        // The same chain, but with the consumer registered before the
        // producer. The fixed-point loop must still fold everything.
        let mut graph = Graph::new();
        let lhs = graph.add_constant(None, Elements::from_vec::<i32>(&[4], vec![1, 2, 3, 4]));
        let rhs = graph.add_constant(None, Elements::from_vec::<i32>(&[4], vec![10, 20, 30, 40]));
        let sum = graph.add_value(None, TensorType::new(ElementType::I32, &[4]));
        let reshaped = graph.add_value(None, TensorType::new(ElementType::I32, &[2, 2]));
        graph.add_op(None, OpKind::Reshape, &[Some(sum)], &[reshaped]);
        graph.add_op(None, OpKind::Add, &[Some(lhs), Some(rhs)], &[sum]);
        graph.set_output_ids(&[reshaped]);

        fold(&mut graph);

        assert!(graph.operator_ids().is_empty());
        assert_eq!(output_elements(&graph).to_vec::<i32>(), &[11, 22, 33, 44]);
    }

    #[test]
    fn test_folding_is_idempotent() {
        let mut graph = Graph::new();
        let lhs = graph.add_constant(None, Elements::from_vec::<i32>(&[2], vec![1, 2]));
        let rhs = graph.add_constant(None, Elements::from_vec::<i32>(&[2], vec![3, 4]));
        let out = graph.add_value(None, TensorType::new(ElementType::I32, &[2]));
        graph.add_op(None, OpKind::Add, &[Some(lhs), Some(rhs)], &[out]);
        graph.set_output_ids(&[out]);

        fold(&mut graph);
        let folded_output = graph.output_ids().to_vec();
        let node_count = graph.node_count();

        fold(&mut graph);
        assert_eq!(graph.output_ids(), folded_output);
        assert_eq!(graph.node_count(), node_count);
    }

    #[test]
    fn test_non_constant_operand_is_left_alone() {
        let mut graph = Graph::new();
        let lhs = graph.add_constant(None, Elements::from_vec::<i32>(&[2], vec![1, 2]));
        let rhs = graph.add_value(Some("dynamic"), TensorType::new(ElementType::I32, &[2]));
        let out = graph.add_value(None, TensorType::new(ElementType::I32, &[2]));
        let op = graph.add_op(None, OpKind::Add, &[Some(lhs), Some(rhs)], &[out]);
        graph.set_output_ids(&[out]);

        fold(&mut graph);

        assert_eq!(graph.operator_ids(), &[op]);
        assert!(graph.constant_elements(out).is_none());
    }

    #[test]
    fn test_splat_operands_fold_to_splat() {
        let mut graph = Graph::new();
        let lhs = graph.add_constant(None, Elements::splat_of::<f32>(&[64, 64], 2.0));
        let rhs = graph.add_constant(None, Elements::splat_of::<f32>(&[64, 64], 3.0));
        let out = graph.add_value(None, TensorType::new(ElementType::F32, &[64, 64]));
        graph.add_op(None, OpKind::Add, &[Some(lhs), Some(rhs)], &[out]);
        graph.set_output_ids(&[out]);

        fold(&mut graph);

        let folded = output_elements(&graph);
        assert!(folded.is_splat(), "adding splats must produce a splat");
        assert_eq!(folded.to_vec::<f32>()[0], 5.0);
    }

    #[test]
    fn test_folded_constant_keeps_value_name() {
        let mut graph = Graph::new();
        let lhs = graph.add_constant(None, Elements::from_vec::<i32>(&[1], vec![1]));
        let rhs = graph.add_constant(None, Elements::from_vec::<i32>(&[1], vec![2]));
        let out = graph.add_value(Some("total"), TensorType::new(ElementType::I32, &[1]));
        graph.add_op(None, OpKind::Add, &[Some(lhs), Some(rhs)], &[out]);
        graph.set_output_ids(&[out]);

        fold(&mut graph);

        let folded_id = graph.output_ids()[0];
        assert_eq!(graph.get_node(folded_id).unwrap().name(), Some("total"));
    }

    #[test]
    fn test_pass_metadata() {
        assert_eq!(ConstPropPass::ARGUMENT, "constprop-onnx");
        assert!(!ConstPropPass::new(false).description().is_empty());
    }
}
