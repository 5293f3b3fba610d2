//! A minimal mutable IR for ONNX computation graphs.
//!
//! This is the surface the folding patterns rewrite: a flat list of nodes
//! where a node is a constant (with an [`Elements`] payload), a value
//! (a dynamic tensor with a declared type, as assigned by shape inference)
//! or an operator connecting them. Node IDs are stable for the lifetime of
//! the graph; removing a node leaves a hole rather than renumbering.

use crate::dtype::ElementType;
use crate::elements::Elements;

pub type NodeId = usize;

/// The declared type of a tensor value: element type plus static shape.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct TensorType {
    pub dtype: ElementType,
    pub shape: Vec<usize>,
}

impl TensorType {
    pub fn new(dtype: ElementType, shape: &[usize]) -> TensorType {
        TensorType {
            dtype,
            shape: shape.to_vec(),
        }
    }
}

/// Attributes shared by the reduction operators.
///
/// `axes` carries the attribute surface of the older opsets; newer opsets
/// pass axes as a second (constant) operand instead. `keepdims` defaults to
/// 1 and `noop_with_empty_axes` to 0, per the ONNX defaults.
#[derive(Clone, Debug)]
pub struct ReduceAttrs {
    pub axes: Option<Vec<i64>>,
    pub keep_dims: bool,
    pub noop_with_empty_axes: bool,
}

impl Default for ReduceAttrs {
    fn default() -> ReduceAttrs {
        ReduceAttrs {
            axes: None,
            keep_dims: true,
            noop_with_empty_axes: false,
        }
    }
}

/// Operator kinds the folder understands, with their attributes.
#[derive(Clone, Debug)]
pub enum OpKind {
    Add,
    Sub,
    Mul,
    Div,
    Min,
    Max,
    Neg,
    Sqrt,
    Relu,
    Where,
    ReduceSum(ReduceAttrs),
    ReduceProd(ReduceAttrs),
    ReduceMin(ReduceAttrs),
    ReduceMax(ReduceAttrs),
    ReduceMean(ReduceAttrs),
    /// `perm` defaults to reversing the axes when omitted.
    Transpose {
        perm: Option<Vec<i64>>,
    },
    Unsqueeze,
    Squeeze,
    Reshape,
    /// Split sizes may come from the attribute, from a constant second
    /// operand, or be omitted for an even split.
    Split {
        axis: i64,
        sizes: Option<Vec<i64>>,
    },
    ScatterNd,
    Cast {
        to: ElementType,
    },
    Slice,
    Concat {
        axis: i64,
    },
    Expand,
    Gather {
        axis: i64,
    },
}

#[derive(Debug)]
pub struct ConstantNode {
    name: Option<String>,
    elements: Elements,
}

impl ConstantNode {
    pub fn name(&self) -> Option<&str> {
        self.name.as_deref()
    }

    pub fn elements(&self) -> &Elements {
        &self.elements
    }
}

#[derive(Debug)]
pub struct ValueNode {
    name: Option<String>,
    ty: TensorType,
}

impl ValueNode {
    pub fn name(&self) -> Option<&str> {
        self.name.as_deref()
    }

    pub fn ty(&self) -> &TensorType {
        &self.ty
    }
}

#[derive(Debug)]
pub struct OperatorNode {
    name: Option<String>,
    kind: OpKind,
    inputs: Vec<Option<NodeId>>,
    outputs: Vec<NodeId>,
}

impl OperatorNode {
    pub fn name(&self) -> Option<&str> {
        self.name.as_deref()
    }

    pub fn kind(&self) -> &OpKind {
        &self.kind
    }

    /// The operand at `index`, if the operator has one there.
    pub fn input(&self, index: usize) -> Option<NodeId> {
        self.inputs.get(index).copied().flatten()
    }

    pub fn input_ids(&self) -> &[Option<NodeId>] {
        &self.inputs
    }

    pub fn output_ids(&self) -> &[NodeId] {
        &self.outputs
    }
}

#[derive(Debug)]
pub enum Node {
    Constant(ConstantNode),
    Value(ValueNode),
    Operator(OperatorNode),
}

impl Node {
    pub fn name(&self) -> Option<&str> {
        match self {
            Node::Constant(node) => node.name(),
            Node::Value(node) => node.name(),
            Node::Operator(node) => node.name(),
        }
    }

    pub fn as_operator(&self) -> Option<&OperatorNode> {
        match self {
            Node::Operator(op) => Some(op),
            _ => None,
        }
    }

    pub fn as_constant(&self) -> Option<&ConstantNode> {
        match self {
            Node::Constant(constant) => Some(constant),
            _ => None,
        }
    }
}

/// A mutable computation graph.
#[derive(Default)]
pub struct Graph {
    nodes: Vec<Option<Node>>,
    output_ids: Vec<NodeId>,
}

impl Graph {
    pub fn new() -> Graph {
        Graph::default()
    }

    fn push(&mut self, node: Node) -> NodeId {
        self.nodes.push(Some(node));
        self.nodes.len() - 1
    }

    /// Add a constant node holding `elements`.
    pub fn add_constant(&mut self, name: Option<&str>, elements: Elements) -> NodeId {
        self.push(Node::Constant(ConstantNode {
            name: name.map(|s| s.to_owned()),
            elements,
        }))
    }

    /// Add a value node with a declared type.
    pub fn add_value(&mut self, name: Option<&str>, ty: TensorType) -> NodeId {
        self.push(Node::Value(ValueNode {
            name: name.map(|s| s.to_owned()),
            ty,
        }))
    }

    /// Add an operator node reading `inputs` and defining `outputs`.
    pub fn add_op(
        &mut self,
        name: Option<&str>,
        kind: OpKind,
        inputs: &[Option<NodeId>],
        outputs: &[NodeId],
    ) -> NodeId {
        self.push(Node::Operator(OperatorNode {
            name: name.map(|s| s.to_owned()),
            kind,
            inputs: inputs.to_vec(),
            outputs: outputs.to_vec(),
        }))
    }

    pub fn get_node(&self, id: NodeId) -> Option<&Node> {
        self.nodes.get(id).and_then(|slot| slot.as_ref())
    }

    pub fn set_output_ids(&mut self, ids: &[NodeId]) {
        self.output_ids = ids.to_vec();
    }

    pub fn output_ids(&self) -> &[NodeId] {
        &self.output_ids
    }

    /// IDs of all live operator nodes, in insertion order.
    pub fn operator_ids(&self) -> Vec<NodeId> {
        self.nodes
            .iter()
            .enumerate()
            .filter_map(|(id, slot)| match slot {
                Some(Node::Operator(_)) => Some(id),
                _ => None,
            })
            .collect()
    }

    /// Count of live nodes, for tests and diagnostics.
    pub fn node_count(&self) -> usize {
        self.nodes.iter().filter(|slot| slot.is_some()).count()
    }

    /// The constant payload of `id`, if it refers to a constant node.
    ///
    /// This is the constant recogniser used by the fold patterns: both dense
    /// buffers and splats qualify.
    pub fn constant_elements(&self, id: NodeId) -> Option<&Elements> {
        self.get_node(id)
            .and_then(Node::as_constant)
            .map(ConstantNode::elements)
    }

    pub fn is_dense_constant(&self, id: NodeId) -> bool {
        self.constant_elements(id).is_some()
    }

    /// The declared type of a value or constant node.
    pub fn value_type(&self, id: NodeId) -> Option<TensorType> {
        match self.get_node(id)? {
            Node::Value(value) => Some(value.ty().clone()),
            Node::Constant(constant) => Some(TensorType::new(
                constant.elements().dtype(),
                constant.elements().shape(),
            )),
            Node::Operator(_) => None,
        }
    }

    /// Replace `old_id` with `new_id` in operator inputs and graph outputs.
    pub fn replace_value(&mut self, old_id: NodeId, new_id: NodeId) {
        for slot in self.nodes.iter_mut() {
            if let Some(Node::Operator(op)) = slot {
                for input in op.inputs.iter_mut() {
                    if *input == Some(old_id) {
                        *input = Some(new_id);
                    }
                }
            }
        }
        for output in self.output_ids.iter_mut() {
            if *output == old_id {
                *output = new_id;
            }
        }
    }

    /// Remove an operator node, leaving a hole so other IDs stay stable.
    pub fn remove_op(&mut self, id: NodeId) {
        let slot = self.nodes.get_mut(id).expect("node ID in range");
        assert!(
            matches!(slot, Some(Node::Operator(_))),
            "only operator nodes can be removed"
        );
        *slot = None;
    }
}

#[cfg(test)]
mod tests {
    use super::{Graph, OpKind, TensorType};
    use crate::dtype::ElementType;
    use crate::elements::Elements;

    #[test]
    fn test_graph_build_and_query() {
        let mut graph = Graph::new();
        let c = graph.add_constant(
            Some("weights"),
            Elements::from_vec::<f32>(&[2], vec![1., 2.]),
        );
        let v = graph.add_value(Some("out"), TensorType::new(ElementType::F32, &[2]));
        let op = graph.add_op(Some("relu"), OpKind::Relu, &[Some(c)], &[v]);
        graph.set_output_ids(&[v]);

        assert!(graph.is_dense_constant(c));
        assert!(!graph.is_dense_constant(v));
        assert_eq!(graph.operator_ids(), &[op]);
        assert_eq!(
            graph.value_type(v),
            Some(TensorType::new(ElementType::F32, &[2]))
        );
        // Constants report their own type.
        assert_eq!(
            graph.value_type(c),
            Some(TensorType::new(ElementType::F32, &[2]))
        );
    }

    #[test]
    fn test_replace_value_rewires_consumers_and_outputs() {
        let mut graph = Graph::new();
        let a = graph.add_value(Some("a"), TensorType::new(ElementType::F32, &[2]));
        let out = graph.add_value(Some("out"), TensorType::new(ElementType::F32, &[2]));
        let op = graph.add_op(None, OpKind::Relu, &[Some(a)], &[out]);
        graph.set_output_ids(&[a]);

        let replacement = graph.add_constant(None, Elements::splat_of::<f32>(&[2], 0.0));
        graph.replace_value(a, replacement);

        let op_node = graph.get_node(op).unwrap().as_operator().unwrap();
        assert_eq!(op_node.input(0), Some(replacement));
        assert_eq!(graph.output_ids(), &[replacement]);
    }

    #[test]
    fn test_remove_op_keeps_ids_stable() {
        let mut graph = Graph::new();
        let a = graph.add_value(None, TensorType::new(ElementType::F32, &[2]));
        let out = graph.add_value(None, TensorType::new(ElementType::F32, &[2]));
        let op = graph.add_op(None, OpKind::Relu, &[Some(a)], &[out]);

        assert_eq!(graph.node_count(), 3);
        graph.remove_op(op);
        assert_eq!(graph.node_count(), 2);
        assert!(graph.get_node(op).is_none());
        assert!(graph.get_node(out).is_some());
        assert!(graph.operator_ids().is_empty());
    }
}
