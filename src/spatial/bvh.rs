//! Bounding volume hierarchy over area bounding boxes.
//!
//! Every node stores the box enclosing its subtree. The tree is built top
//! down by splitting at the median centroid along the longest axis, so it
//! stays balanced regardless of how the areas are clustered.

use crate::bounds::Aabb2;
use crate::primitives::Point2;
use num_traits::Float;

/// Anything with an axis-aligned bounding box.
pub trait Bounded<F: Float> {
    fn bounds(&self) -> Aabb2<F>;

    /// Point used to partition primitives between children.
    fn centroid(&self) -> Point2<F> {
        self.bounds().center()
    }
}

impl<F: Float> Bounded<F> for Aabb2<F> {
    fn bounds(&self) -> Aabb2<F> {
        *self
    }
}

#[derive(Debug, Clone)]
enum Node<F> {
    /// `order[first..first + count]` are the primitives of this leaf.
    Leaf {
        bounds: Aabb2<F>,
        first: usize,
        count: usize,
    },
    Internal {
        bounds: Aabb2<F>,
        left: usize,
        right: usize,
    },
}

impl<F: Float> Node<F> {
    fn bounds(&self) -> Aabb2<F> {
        match self {
            Node::Leaf { bounds, .. } | Node::Internal { bounds, .. } => *bounds,
        }
    }
}

/// A bounding volume hierarchy referring to primitives by index.
///
/// The primitives stay with the caller, who passes the same slice to every
/// query. Rebuild the tree whenever that slice changes.
///
/// # Example
///
/// ```
/// use fogmap::bounds::Aabb2;
/// use fogmap::spatial::Bvh;
///
/// let areas = vec![
///     Aabb2::from_bounds([0.0, 0.0, 1.0, 1.0]),
///     Aabb2::from_bounds([0.5, 0.5, 2.0, 2.0]),
///     Aabb2::from_bounds([10.0, 10.0, 11.0, 11.0]),
/// ];
/// let bvh = Bvh::build(&areas, 1);
///
/// let mut hits = bvh.query_aabb(&areas, Aabb2::from_bounds([-1.0, -1.0, 3.0, 3.0]));
/// hits.sort_unstable();
/// assert_eq!(hits, vec![0, 1]);
/// ```
#[derive(Debug, Clone)]
pub struct Bvh<F> {
    nodes: Vec<Node<F>>,
    order: Vec<usize>,
}

impl<F: Float> Default for Bvh<F> {
    fn default() -> Self {
        Self {
            nodes: Vec::new(),
            order: Vec::new(),
        }
    }
}

impl<F: Float> Bvh<F> {
    /// Builds a hierarchy over `primitives`.
    ///
    /// # Arguments
    ///
    /// * `primitives` - The primitives to index
    /// * `max_leaf_size` - Maximum number of primitives per leaf, at least 1
    pub fn build<T: Bounded<F>>(primitives: &[T], max_leaf_size: usize) -> Self {
        if primitives.is_empty() {
            return Self::default();
        }

        let mut order: Vec<usize> = (0..primitives.len()).collect();
        let mut nodes = Vec::with_capacity(2 * primitives.len() / max_leaf_size.max(1) + 1);
        build_node(primitives, &mut order, 0, max_leaf_size.max(1), &mut nodes);

        Self { nodes, order }
    }

    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    /// Number of indexed primitives.
    pub fn len(&self) -> usize {
        self.order.len()
    }

    /// Box enclosing every primitive, `None` when empty.
    pub fn bounds(&self) -> Option<Aabb2<F>> {
        self.nodes.first().map(Node::bounds)
    }

    /// Indices of primitives whose box intersects `query`. Touching counts.
    pub fn query_aabb<T: Bounded<F>>(&self, primitives: &[T], query: Aabb2<F>) -> Vec<usize> {
        let mut hits = Vec::new();
        self.for_each_intersecting(primitives, query, |i| {
            hits.push(i);
            true
        });
        hits
    }

    /// Visits every primitive whose box intersects `query`.
    ///
    /// Traversal stops as soon as `visit` returns `false`.
    pub fn for_each_intersecting<T, V>(&self, primitives: &[T], query: Aabb2<F>, mut visit: V)
    where
        T: Bounded<F>,
        V: FnMut(usize) -> bool,
    {
        if self.nodes.is_empty() {
            return;
        }

        let mut stack = vec![0];
        while let Some(node) = stack.pop() {
            match &self.nodes[node] {
                Node::Leaf { bounds, .. } | Node::Internal { bounds, .. }
                    if !bounds.intersects(query) => {}
                Node::Leaf { first, count, .. } => {
                    for &i in &self.order[*first..*first + *count] {
                        if primitives[i].bounds().intersects(query) && !visit(i) {
                            return;
                        }
                    }
                }
                Node::Internal { left, right, .. } => {
                    stack.push(*right);
                    stack.push(*left);
                }
            }
        }
    }
}

/// Builds the subtree over `order` and returns its node index.
///
/// `offset` is the position of `order[0]` in the full ordering.
fn build_node<F: Float, T: Bounded<F>>(
    primitives: &[T],
    order: &mut [usize],
    offset: usize,
    max_leaf_size: usize,
    nodes: &mut Vec<Node<F>>,
) -> usize {
    let bounds = order
        .iter()
        .map(|&i| primitives[i].bounds())
        .reduce(Aabb2::union)
        .unwrap_or_else(|| Aabb2::from_point(Point2::new(F::zero(), F::zero())));

    let index = nodes.len();
    if order.len() <= max_leaf_size {
        nodes.push(Node::Leaf {
            bounds,
            first: offset,
            count: order.len(),
        });
        return index;
    }

    // Median split along the longest axis of the centroids' spread
    let along_x = bounds.width() >= bounds.height();
    let key = |i: usize| {
        let c = primitives[i].centroid();
        if along_x {
            c.x
        } else {
            c.y
        }
    };
    let mid = order.len() / 2;
    order.select_nth_unstable_by(mid, |&a, &b| {
        key(a).partial_cmp(&key(b)).unwrap_or(std::cmp::Ordering::Equal)
    });

    nodes.push(Node::Internal {
        bounds,
        left: 0,
        right: 0,
    });
    let (lo, hi) = order.split_at_mut(mid);
    let left = build_node(primitives, lo, offset, max_leaf_size, nodes);
    let right = build_node(primitives, hi, offset + mid, max_leaf_size, nodes);
    nodes[index] = Node::Internal {
        bounds,
        left,
        right,
    };

    index
}
