use std::collections::VecDeque;

use log::{debug, trace};

use crate::error::Error;
use crate::image::Image;
use crate::ord_float::OrdFloat64;
use crate::stats::{ClusterStats, PrincipalAxis};

#[cfg(feature = "threads")]
use rayon::prelude::*;

/// Cluster identifier. Ids are assigned in increasing order and double as
/// indices into the tree's node arena.
pub type NodeId = u32;

pub const ROOT: NodeId = 0;

pub struct ClusterNode {
    pub id: NodeId,
    pub stats: ClusterStats,
    principal: Option<PrincipalAxis>,
    children: Option<[NodeId; 2]>,
    exhausted: bool,
}

impl ClusterNode {
    fn new(id: NodeId, stats: ClusterStats) -> Self {
        let principal = stats.principal_axis();

        Self {
            id,
            stats,
            principal,
            children: None,
            exhausted: false,
        }
    }

    pub fn is_leaf(&self) -> bool {
        self.children.is_none()
    }

    /// Left and right child ids of a split node
    pub fn children(&self) -> Option<[NodeId; 2]> {
        self.children
    }

    pub fn principal_axis(&self) -> Option<&PrincipalAxis> {
        self.principal.as_ref()
    }

    /// Largest covariance eigenvalue. Undefined eigenvalues rank below every
    /// real value.
    pub fn eigenvalue(&self) -> f64 {
        match self.principal {
            Some(p) if !p.eigenvalue.is_nan() => p.eigenvalue,
            _ => f64::NEG_INFINITY,
        }
    }

    /// Whether a split attempt found that the node's pixels can't be divided
    pub fn is_exhausted(&self) -> bool {
        self.exhausted
    }

    fn is_candidate(&self) -> bool {
        let eigenvalue = self.eigenvalue();

        self.is_leaf() && !self.exhausted && eigenvalue.is_finite() && eigenvalue > 0.0
    }
}

/// Binary partition of an image's pixels in color space.
///
/// Every pixel carries the id of exactly one node. Splitting a leaf moves its
/// pixels to two new children, so the leaves always partition the image.
pub struct ClusterTree<'img, 'data> {
    image: &'img Image<'data>,
    labels: Vec<NodeId>,
    nodes: Vec<ClusterNode>,
}

impl<'img, 'data> ClusterTree<'img, 'data> {
    /// Creates a single-node tree with every pixel assigned to the root.
    ///
    /// Returns [`Error::EmptyInput`] if the image has no pixels
    pub fn new(image: &'img Image<'data>) -> Result<Self, Error> {
        if image.is_empty() {
            return Err(Error::EmptyInput)
        }

        let labels = vec![ROOT; image.len()];
        let root = ClusterNode::new(ROOT, ClusterStats::compute(image, &labels, ROOT));

        Ok(Self {
            image,
            labels,
            nodes: vec![root],
        })
    }

    /// Cluster id of every pixel, row-major
    pub fn labels(&self) -> &[NodeId] {
        &self.labels
    }

    pub fn node(&self, id: NodeId) -> Option<&ClusterNode> {
        self.nodes.get(id as usize)
    }

    /// All nodes in id order
    pub fn nodes(&self) -> &[ClusterNode] {
        &self.nodes
    }

    pub fn root(&self) -> &ClusterNode {
        &self.nodes[ROOT as usize]
    }

    /// The id the next created node will receive: one past the largest id in
    /// the tree
    pub fn next_id(&self) -> NodeId {
        self.nodes.len() as NodeId
    }

    /// Leaves in breadth-first order
    pub fn leaves(&self) -> Vec<&ClusterNode> {
        let mut ret = Vec::new();
        let mut queue = VecDeque::new();
        queue.push_back(ROOT);

        while let Some(id) = queue.pop_front() {
            let node = &self.nodes[id as usize];

            match node.children {
                Some([left, right]) => {
                    queue.push_back(left);
                    queue.push_back(right);
                }
                None => ret.push(node),
            }
        }

        ret
    }

    pub fn leaf_count(&self) -> usize {
        // Each split turns one leaf into two
        self.nodes.len().div_ceil(2)
    }

    /// Picks the leaf with the largest covariance eigenvalue. Ties go to the
    /// leaf seen first in breadth-first order.
    ///
    /// Returns `None` if no leaf has any variance left to split on
    pub fn select(&self) -> Option<NodeId> {
        let mut best: Option<&ClusterNode> = None;

        for node in self.leaves().into_iter().filter(|n| n.is_candidate()) {
            let better = match best {
                None => true,
                Some(b) => OrdFloat64::from(node.eigenvalue()) > OrdFloat64::from(b.eigenvalue()),
            };

            if better {
                best = Some(node);
            }
        }

        best.map(|n| n.id)
    }

    /// Splits a leaf with the plane through its mean, perpendicular to its
    /// principal axis. Pixels projecting at or below the mean go left.
    ///
    /// Returns the ids of the new children, or `None` if the node isn't a
    /// splittable leaf. A leaf whose pixels would all land on one side is
    /// marked exhausted and never offered by [`ClusterTree::select`] again.
    pub fn split(&mut self, id: NodeId) -> Option<[NodeId; 2]> {
        let node = self.nodes.get(id as usize)?;
        if !node.is_leaf() || node.exhausted {
            return None
        }

        let axis = match node.principal {
            Some(axis) if axis.eigenvalue.is_finite() => axis,
            _ => {
                trace!("Cluster {} has no principal axis", id);
                self.nodes[id as usize].exhausted = true;
                return None
            }
        };
        let threshold = axis.direction.dot(&node.stats.mean);

        let (left_count, right_count) = self.count_sides(id, &axis, threshold);
        if left_count == 0 || right_count == 0 {
            trace!(
                "Cluster {} can't be split: {} pixels on one side only",
                id,
                left_count + right_count,
            );
            self.nodes[id as usize].exhausted = true;
            return None
        }

        let left = self.next_id();
        let right = left + 1;
        self.relabel(id, [left, right], &axis, threshold);

        let left_stats = ClusterStats::compute(self.image, &self.labels, left);
        let right_stats = ClusterStats::compute(self.image, &self.labels, right);

        debug!(
            "Split cluster {} (eigenvalue {:.6}) into {} ({} px) and {} ({} px)",
            id, axis.eigenvalue, left, left_stats.count, right, right_stats.count,
        );

        self.nodes.push(ClusterNode::new(left, left_stats));
        self.nodes.push(ClusterNode::new(right, right_stats));
        self.nodes[id as usize].children = Some([left, right]);

        Some([left, right])
    }

    /// Splits the highest-variance leaf until there are `target` leaves or no
    /// leaf can be split any further. Returns the number of leaves.
    pub fn grow(&mut self, target: usize) -> usize {
        while self.leaf_count() < target {
            let Some(id) = self.select() else {
                trace!("No splittable clusters left at {} leaves", self.leaf_count());
                break
            };

            self.split(id);
        }

        self.leaf_count()
    }

    #[cfg(not(feature = "threads"))]
    fn count_sides(&self, id: NodeId, axis: &PrincipalAxis, threshold: f64) -> (usize, usize) {
        let mut left = 0;
        let mut right = 0;

        for (pix, _) in self.image.pixels().zip(&self.labels).filter(|(_, l)| **l == id) {
            if axis.project(pix) <= threshold {
                left += 1;
            } else {
                right += 1;
            }
        }

        (left, right)
    }

    #[cfg(feature = "threads")]
    fn count_sides(&self, id: NodeId, axis: &PrincipalAxis, threshold: f64) -> (usize, usize) {
        self.image
            .par_pixels()
            .zip(self.labels.par_iter())
            .filter(|(_, l)| **l == id)
            .map(|(pix, _)| if axis.project(pix) <= threshold { (1, 0) } else { (0, 1) })
            .reduce(|| (0, 0), |a, b| (a.0 + b.0, a.1 + b.1))
    }

    #[cfg(not(feature = "threads"))]
    fn relabel(&mut self, id: NodeId, children: [NodeId; 2], axis: &PrincipalAxis, threshold: f64) {
        for (pix, label) in self.image.pixels().zip(self.labels.iter_mut()) {
            if *label != id {
                continue
            }

            *label = side(children, axis.project(pix), threshold);
        }
    }

    #[cfg(feature = "threads")]
    fn relabel(&mut self, id: NodeId, children: [NodeId; 2], axis: &PrincipalAxis, threshold: f64) {
        self.image
            .par_pixels()
            .zip(self.labels.par_iter_mut())
            .filter(|(_, label)| **label == id)
            .for_each(|(pix, label)| *label = side(children, axis.project(pix), threshold));
    }
}

#[inline(always)]
fn side(children: [NodeId; 2], projection: f64, threshold: f64) -> NodeId {
    if projection <= threshold {
        children[0]
    } else {
        children[1]
    }
}
