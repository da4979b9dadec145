//! Adaptive octree partition of a point cloud.
//!
//! The octree buckets every point of a [`PointCloud`] into exactly one leaf
//! cube. Region-based precision/recall is defined over these leaves, so the
//! structure maintains a flat point-index → leaf map for O(1) lookup after
//! construction (no tree descent per query).
//!
//! Nodes live in an arena and refer to their children by [`NodeId`]; there
//! are no parent or root back-references.

use crate::core::{Point3, PointCloud};

/// Default maximum subdivision depth.
///
/// Bounds leaf volume at `size / 2^9` and guarantees termination even when
/// many points are coincident.
pub const DEFAULT_MAX_DEPTH: u8 = 9;

/// Index of a node in the octree arena.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct NodeId(u32);

impl NodeId {
    const ROOT: NodeId = NodeId(0);

    #[inline]
    fn index(self) -> usize {
        self.0 as usize
    }
}

/// A cube region of point space.
#[derive(Clone, Debug)]
struct Node {
    /// Cube center.
    center: Point3,
    /// Half of the cube side length.
    half_size: f32,
    /// Depth below the root (root is 0).
    depth: u8,
    /// Child nodes, present only on internal nodes.
    children: Option<[NodeId; 8]>,
    /// Point indices bucketed here. Empty on internal nodes.
    points: Vec<usize>,
}

impl Node {
    #[inline]
    fn is_leaf(&self) -> bool {
        self.children.is_none()
    }
}

/// Bounded-depth octree over a point cloud.
///
/// Every point index of the source cloud maps to exactly one leaf; the
/// partition is total and disjoint.
#[derive(Clone, Debug)]
pub struct Octree {
    nodes: Vec<Node>,
    /// Point index → containing leaf. Maintained during subdivision.
    leaf_of: Vec<NodeId>,
    max_depth: u8,
}

impl Octree {
    /// Build an octree over the cloud with the default depth bound.
    pub fn new(cloud: &PointCloud) -> Self {
        Self::build(cloud, DEFAULT_MAX_DEPTH)
    }

    /// Build an octree over the cloud, subdividing to at most `max_depth`
    /// levels below the root.
    ///
    /// The root covers the axis-aligned bounding cube of the cloud: centered
    /// on the bounding-box midpoint, sided by the largest extent across the
    /// three axes. An empty cloud produces a single zero-sized root leaf.
    pub fn build(cloud: &PointCloud, max_depth: u8) -> Self {
        let (center, half_size) = match cloud.bounds() {
            Some((min, max)) => ((min + max) * 0.5, (max - min).max_element() * 0.5),
            None => (Point3::ZERO, 0.0),
        };

        let root = Node {
            center,
            half_size,
            depth: 0,
            children: None,
            points: (0..cloud.len()).collect(),
        };

        let mut tree = Self {
            nodes: vec![root],
            leaf_of: vec![NodeId::ROOT; cloud.len()],
            max_depth,
        };
        tree.subdivide(cloud);

        log::debug!(
            "octree built: {} points, {} nodes, {} leaves, depth {}",
            cloud.len(),
            tree.node_count(),
            tree.leaf_count(),
            tree.max_depth_reached()
        );

        tree
    }

    /// Recursively split nodes until each is empty or at the depth bound.
    fn subdivide(&mut self, cloud: &PointCloud) {
        let mut pending = vec![NodeId::ROOT];

        while let Some(id) = pending.pop() {
            let node = &self.nodes[id.index()];
            if node.points.is_empty() || node.depth >= self.max_depth {
                continue;
            }

            let center = node.center;
            let quarter = node.half_size * 0.5;
            let child_depth = node.depth + 1;
            let points = std::mem::take(&mut self.nodes[id.index()].points);

            let mut children = [NodeId::ROOT; 8];
            for (octant, child) in children.iter_mut().enumerate() {
                *child = NodeId(self.nodes.len() as u32);
                self.nodes.push(Node {
                    center: octant_center(center, quarter, octant),
                    half_size: quarter,
                    depth: child_depth,
                    children: None,
                    points: Vec::new(),
                });
            }

            for p in points {
                let child = children[octant_of(cloud.points()[p], center)];
                self.nodes[child.index()].points.push(p);
                self.leaf_of[p] = child;
            }

            self.nodes[id.index()].children = Some(children);
            pending.extend_from_slice(&children);
        }
    }

    /// The unique leaf containing the given point index.
    ///
    /// O(1). Only defined for indices of the cloud the tree was built from.
    #[inline]
    pub fn find_leaf(&self, point_index: usize) -> NodeId {
        self.leaf_of[point_index]
    }

    /// Side length of the root cube (diameter along the longest axis).
    #[inline]
    pub fn size(&self) -> f32 {
        self.nodes[NodeId::ROOT.index()].half_size * 2.0
    }

    /// Number of points the tree was built over.
    #[inline]
    pub fn point_count(&self) -> usize {
        self.leaf_of.len()
    }

    /// Total number of nodes in the arena.
    #[inline]
    pub fn node_count(&self) -> usize {
        self.nodes.len()
    }

    /// Number of leaf nodes.
    pub fn leaf_count(&self) -> usize {
        self.nodes.iter().filter(|n| n.is_leaf()).count()
    }

    /// Deepest node level present in the tree.
    pub fn max_depth_reached(&self) -> u8 {
        self.nodes.iter().map(|n| n.depth).max().unwrap_or(0)
    }

    /// Check whether a node is a leaf.
    #[inline]
    pub fn is_leaf(&self, id: NodeId) -> bool {
        self.nodes[id.index()].is_leaf()
    }

    /// Depth of a node below the root.
    #[inline]
    pub fn depth(&self, id: NodeId) -> u8 {
        self.nodes[id.index()].depth
    }

    /// Point indices bucketed at a node (empty for internal nodes).
    #[inline]
    pub fn points_at(&self, id: NodeId) -> &[usize] {
        &self.nodes[id.index()].points
    }

    /// Iterate over all leaf node ids.
    pub fn leaves(&self) -> impl Iterator<Item = NodeId> + '_ {
        self.nodes
            .iter()
            .enumerate()
            .filter(|(_, n)| n.is_leaf())
            .map(|(i, _)| NodeId(i as u32))
    }
}

/// Octant of `point` relative to `center`: bit 2 = x, bit 1 = y, bit 0 = z.
/// Components equal to the center go to the greater-or-equal side.
#[inline]
fn octant_of(point: Point3, center: Point3) -> usize {
    (((point.x >= center.x) as usize) << 2)
        | (((point.y >= center.y) as usize) << 1)
        | ((point.z >= center.z) as usize)
}

/// Center of the child cube for the given octant.
#[inline]
fn octant_center(center: Point3, quarter: f32, octant: usize) -> Point3 {
    let sign = |bit: usize| if octant & bit != 0 { quarter } else { -quarter };
    Point3::new(
        center.x + sign(4),
        center.y + sign(2),
        center.z + sign(1),
    )
}
