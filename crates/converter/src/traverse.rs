//! Depth-first walks over an element tree.
//!
//! `run` is iterative: it keeps an explicit work stack, so deep or wide trees never recurse.
//! Every non-root element with children is visited twice, once on entry and once through a
//! closing pseudo-node (see `Element::copy_as_closing`) after its descendants. Leaves and the
//! root are visited once.
use crate::types::{Element, Id, NodeId};

/// Receives the visit stream produced by `run`.
pub trait ElementVisitor {
    fn visit(&mut self, element: &Element);
}

impl<F: FnMut(&Element)> ElementVisitor for F {
    fn visit(&mut self, element: &Element) {
        self(element)
    }
}

enum Pending<'a> {
    Node(&'a Element),
    Closing(Element),
}

pub fn run<V: ElementVisitor + ?Sized>(root: &Element, visitor: &mut V) {
    let mut stack: Vec<Pending<'_>> = vec![Pending::Node(root)];
    let mut visits = 0usize;

    while let Some(entry) = stack.pop() {
        visits += 1;
        match entry {
            Pending::Node(element) => {
                if !element.is_root() && !element.is_leaf() {
                    stack.push(Pending::Closing(element.copy_as_closing()));
                }
                for child in element.children().iter().rev() {
                    stack.push(Pending::Node(child));
                }
                visitor.visit(element);
            }
            Pending::Closing(closing) => visitor.visit(&closing),
        }
    }

    log::trace!(target: "converter.traverse", "visited {visits} nodes");
}

/// Give every unnumbered element a fresh id and point each child's parent at its owner.
///
/// Numbering continues after the largest id already present, in document order.
pub fn assign_element_ids(root: &mut Element) {
    let mut next = max_id(root).wrapping_add(1);
    let mut stack: Vec<(&mut Element, Option<Id>)> = vec![(root, None)];

    while let Some((element, parent)) = stack.pop() {
        if element.id() == Id::UNASSIGNED {
            element.set_id(Id(next));
            next = next.wrapping_add(1);
        }
        element.set_parent(parent);

        let id = element.id();
        for child in element.children_mut().iter_mut().rev() {
            stack.push((child, Some(id)));
        }
    }
}

fn max_id(root: &Element) -> NodeId {
    let mut max = root.id().0;
    let mut stack = vec![root];
    while let Some(element) = stack.pop() {
        max = max.max(element.id().0);
        stack.extend(element.children());
    }
    max
}

pub fn find_element_by_id(root: &Element, id: Id) -> Option<&Element> {
    let mut stack = vec![root];
    while let Some(element) = stack.pop() {
        if element.id() == id {
            return Some(element);
        }
        stack.extend(element.children().iter().rev());
    }
    None
}

/// Number of real elements in the tree, root included.
pub fn count_nodes(root: &Element) -> usize {
    let mut count = 0;
    let mut stack = vec![root];
    while let Some(element) = stack.pop() {
        count += 1;
        stack.extend(element.children());
    }
    count
}
