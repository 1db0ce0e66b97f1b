//! Barnes-Hut octree over particle positions, rebuilt every step.
//!
//! Nodes live in a flat arena reserved once for the whole run and cleared in
//! place before each build; parent and child links are arena indices. The
//! root covers the whole container. A node at depth `d` spans
//! `size · 0.5^(d+1)` on either side of its center, and each child sits at
//! its parent's center offset by the child's own half-size along every axis,
//! in the direction given by the octant bits (x = 1, y = 2, z = 4; a set bit
//! means the positive side).
//!
//! Building stops as soon as the node or depth budget would be exceeded. The
//! tree is then flagged as overflowed and must not be traversed; callers fall
//! back to exhaustive pairwise work for that step.

use bevy::log::debug;

use crate::error::{SimulationError, reserve_fixed};
use crate::physics::math::{Scalar, Vector};
use crate::physics::particle::Particle;

pub type NodeIndex = u32;

pub const ROOT: NodeIndex = 0;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NodeKind {
    Leaf { particle: usize },
    Internal { children: [Option<NodeIndex>; 8] },
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct OctreeNode {
    pub center: Vector,
    /// Particles in this node's subtree
    pub count: usize,
    pub depth: usize,
    pub parent: Option<NodeIndex>,
    pub kind: NodeKind,
}

impl OctreeNode {
    #[inline]
    pub fn is_leaf(&self) -> bool {
        matches!(self.kind, NodeKind::Leaf { .. })
    }

    pub fn children(&self) -> impl Iterator<Item = NodeIndex> + '_ {
        let children: &[Option<NodeIndex>] = match &self.kind {
            NodeKind::Internal { children } => children,
            NodeKind::Leaf { .. } => &[],
        };
        children.iter().flatten().copied()
    }
}

/// Resource limits for a single build
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct OctreeBudget {
    pub max_nodes: usize,
    /// Nodes may only exist at depths strictly below this
    pub max_depth: usize,
    /// How many single-child levels may be inserted to pull two nearly
    /// coincident particles apart
    pub separation_tries: usize,
}

impl OctreeBudget {
    /// Budget for `capacity` particles: `node_budget_factor · capacity`
    /// nodes, ⌈log₂ nodes⌉ separation tries and ten times that in depth.
    pub fn for_capacity(capacity: usize, node_budget_factor: usize) -> Self {
        let max_nodes = capacity
            .saturating_mul(node_budget_factor)
            .clamp(1, NodeIndex::MAX as usize);
        let log2_nodes = max_nodes.next_power_of_two().trailing_zeros() as usize;

        Self {
            max_nodes,
            max_depth: (10 * log2_nodes).max(1),
            separation_tries: log2_nodes,
        }
    }

    pub fn with_max_depth(mut self, max_depth: usize) -> Self {
        self.max_depth = max_depth.max(1);
        self
    }

    pub fn with_separation_tries(mut self, separation_tries: usize) -> Self {
        self.separation_tries = separation_tries;
        self
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct OctreeStats {
    pub node_count: usize,
    pub leaf_count: usize,
    pub particle_count: usize,
    pub depth: usize,
    pub overflowed: bool,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
struct Overflow;

#[derive(Debug)]
pub struct Octree {
    nodes: Vec<OctreeNode>,
    half_size_at_depth: Vec<Vector>,
    root_center: Vector,
    budget: OctreeBudget,
    depth: usize,
    overflowed: bool,
}

impl Octree {
    pub fn new(container_size: Vector, budget: OctreeBudget) -> Result<Self, SimulationError> {
        let mut octree = Self {
            nodes: reserve_fixed("octree nodes", budget.max_nodes)?,
            half_size_at_depth: reserve_fixed("octree levels", budget.max_depth)?,
            root_center: Vector::ZERO,
            budget,
            depth: 0,
            overflowed: false,
        };
        octree.set_container_size(container_size);
        Ok(octree)
    }

    /// Recomputes the per-depth geometry. Any existing nodes are dropped.
    pub fn set_container_size(&mut self, container_size: Vector) {
        self.nodes.clear();
        self.half_size_at_depth.clear();
        self.half_size_at_depth.extend(
            (0..self.budget.max_depth).map(|depth| container_size * libm::pow(0.5, depth as Scalar + 1.0)),
        );
        self.root_center = container_size * 0.5;
        self.depth = 0;
        self.overflowed = false;
    }

    #[inline]
    pub fn budget(&self) -> OctreeBudget {
        self.budget
    }

    #[inline]
    pub fn overflowed(&self) -> bool {
        self.overflowed
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    #[inline]
    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    /// Root of a successfully built, non-empty tree
    pub fn root(&self) -> Option<&OctreeNode> {
        if self.overflowed {
            return None;
        }
        self.nodes.first()
    }

    #[inline]
    pub fn node(&self, index: NodeIndex) -> &OctreeNode {
        &self.nodes[index as usize]
    }

    pub fn nodes(&self) -> &[OctreeNode] {
        &self.nodes
    }

    /// Half the edge length of an octant at `depth`, per axis
    #[inline]
    pub fn half_size(&self, depth: usize) -> Vector {
        self.half_size_at_depth[depth]
    }

    pub fn stats(&self) -> OctreeStats {
        OctreeStats {
            node_count: self.nodes.len(),
            leaf_count: self.nodes.iter().filter(|node| node.is_leaf()).count(),
            particle_count: self.nodes.first().map_or(0, |root| root.count),
            depth: self.depth,
            overflowed: self.overflowed,
        }
    }

    /// Rebuilds the tree from scratch. Returns `false` when a budget was
    /// exceeded and the tree is unusable for this step.
    pub fn build(&mut self, particles: &[Particle]) -> bool {
        self.nodes.clear();
        self.depth = 0;
        self.overflowed = false;

        if particles.is_empty() {
            return true;
        }

        self.nodes.push(OctreeNode {
            center: self.root_center,
            count: 1,
            depth: 0,
            parent: None,
            kind: NodeKind::Leaf { particle: 0 },
        });

        for index in 1..particles.len() {
            if self.insert(index, particles).is_err() {
                self.overflowed = true;
                debug!(
                    "Octree overflowed at particle {index} of {} ({} nodes, depth {})",
                    particles.len(),
                    self.nodes.len(),
                    self.depth
                );
                return false;
            }
        }

        true
    }

    #[inline]
    fn octant_index(position: Vector, center: Vector) -> usize {
        ((position.x > center.x) as usize)
            | (((position.y > center.y) as usize) << 1)
            | (((position.z > center.z) as usize) << 2)
    }

    #[inline]
    fn octant_direction(octant: usize) -> Vector {
        let sign = |bit: usize| if octant & bit != 0 { 1.0 } else { -1.0 };
        Vector::new(sign(1), sign(2), sign(4))
    }

    fn insert(&mut self, index: usize, particles: &[Particle]) -> Result<(), Overflow> {
        let position = particles[index].position;
        let mut current = ROOT;

        loop {
            let node = &mut self.nodes[current as usize];
            node.count += 1;
            let octant = Self::octant_index(position, node.center);
            let kind = node.kind;

            match kind {
                NodeKind::Internal { children } => match children[octant] {
                    Some(child) => current = child,
                    None => {
                        self.push_child(current, octant, NodeKind::Leaf { particle: index }, 1)?;
                        return Ok(());
                    }
                },
                NodeKind::Leaf { particle: resident } => {
                    return self.split_leaf(current, resident, index, particles);
                }
            }
        }
    }

    /// Turns an occupied leaf into an internal node holding both its resident
    /// and the incoming particle.
    fn split_leaf(
        &mut self,
        leaf: NodeIndex,
        resident: usize,
        incoming: usize,
        particles: &[Particle],
    ) -> Result<(), Overflow> {
        let resident_position = particles[resident].position;
        let incoming_position = particles[incoming].position;

        self.nodes[leaf as usize].kind = NodeKind::Internal {
            children: [None; 8],
        };

        let mut parent = leaf;
        let mut center = self.nodes[leaf as usize].center;
        let mut incoming_octant = Self::octant_index(incoming_position, center);
        let mut resident_octant = Self::octant_index(resident_position, center);

        let mut tries = 0;
        while incoming_octant == resident_octant && tries < self.budget.separation_tries {
            parent = self.push_child(
                parent,
                incoming_octant,
                NodeKind::Internal {
                    children: [None; 8],
                },
                2,
            )?;
            center = self.nodes[parent as usize].center;
            incoming_octant = Self::octant_index(incoming_position, center);
            resident_octant = Self::octant_index(resident_position, center);
            tries += 1;
        }

        if incoming_octant == resident_octant {
            // Still inseparable: park the resident in the neighbouring octant.
            resident_octant ^= 1;
        }

        self.push_child(parent, incoming_octant, NodeKind::Leaf { particle: incoming }, 1)?;
        self.push_child(parent, resident_octant, NodeKind::Leaf { particle: resident }, 1)?;

        Ok(())
    }

    fn push_child(
        &mut self,
        parent: NodeIndex,
        octant: usize,
        kind: NodeKind,
        count: usize,
    ) -> Result<NodeIndex, Overflow> {
        let parent_node = self.nodes[parent as usize];
        let depth = parent_node.depth + 1;

        if self.nodes.len() >= self.budget.max_nodes || depth >= self.budget.max_depth {
            return Err(Overflow);
        }

        let index = self.nodes.len() as NodeIndex;
        let center =
            parent_node.center + self.half_size_at_depth[depth] * Self::octant_direction(octant);

        self.nodes.push(OctreeNode {
            center,
            count,
            depth,
            parent: Some(parent),
            kind,
        });

        if let NodeKind::Internal { children } = &mut self.nodes[parent as usize].kind {
            children[octant] = Some(index);
        }

        self.depth = self.depth.max(depth);
        Ok(index)
    }
}
