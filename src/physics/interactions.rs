//! Pairwise collision and attraction resolution over the octree.
//!
//! Every step runs two passes, collisions first and then attraction. Each
//! pass walks the particles in turn and uses the tree to drop partners that
//! cannot be in reach. Pairs are resolved in place, so results depend on the
//! order in which particles and their partners are visited; see
//! [`TraversalOrder`]. The tree never changes that order, so a tree pass and
//! the pairwise fallback produce identical results.

use serde::{Deserialize, Serialize};

use crate::physics::lennard_jones::InteractionCoefficients;
use crate::physics::math::{Scalar, Vector, VectorExt};
use crate::physics::octree::{NodeIndex, NodeKind, Octree, ROOT};
use crate::physics::particle::Particle;

/// Physical model used when two particles meet
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize, clap::ValueEnum,
)]
#[serde(rename_all = "snake_case")]
pub enum InteractionLaw {
    /// Hard spheres exchanging velocity through the pair's center of mass
    Ideal,
    /// Hard spheres exchanging the velocity component along their axis
    Bouncy,
    /// Bouncy collisions plus Lennard-Jones attraction
    #[default]
    Potential,
}

impl InteractionLaw {
    #[inline]
    pub fn attracts(self) -> bool {
        matches!(self, InteractionLaw::Potential)
    }
}

/// Order in which particles are walked during a pass.
///
/// Each unordered pair is resolved once. Walking in ascending order, a
/// particle only resolves partners with a higher index and is the one
/// repositioned when they overlap; descending order mirrors this. The
/// simulation alternates between the two every step.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum TraversalOrder {
    #[default]
    Ascending,
    Descending,
}

impl TraversalOrder {
    pub fn reversed(self) -> Self {
        match self {
            TraversalOrder::Ascending => TraversalOrder::Descending,
            TraversalOrder::Descending => TraversalOrder::Ascending,
        }
    }

    /// Particle indices in walking order
    fn indices(self, count: usize) -> impl Iterator<Item = usize> {
        (0..count).map(move |step| match self {
            TraversalOrder::Ascending => step,
            TraversalOrder::Descending => count - 1 - step,
        })
    }

    fn sort(self, indices: &mut [usize]) {
        match self {
            TraversalOrder::Ascending => indices.sort_unstable(),
            TraversalOrder::Descending => indices.sort_unstable_by(|a, b| b.cmp(a)),
        }
    }

    #[inline]
    fn resolves(self, walked: usize, other: usize) -> bool {
        match self {
            TraversalOrder::Ascending => other > walked,
            TraversalOrder::Descending => other < walked,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Pass {
    Collision,
    Attraction,
}

#[derive(Debug, Clone)]
pub struct InteractionEngine {
    law: InteractionLaw,
    coefficients: InteractionCoefficients,
    potential_energy: Scalar,
    used_fallback: bool,
    /// Largest distance any particle has moved since the tree was built
    drift: Scalar,
    candidates: Vec<usize>,
}

impl InteractionEngine {
    pub fn new(law: InteractionLaw, coefficients: InteractionCoefficients) -> Self {
        Self {
            law,
            coefficients,
            potential_energy: 0.0,
            used_fallback: false,
            drift: 0.0,
            candidates: Vec::new(),
        }
    }

    #[inline]
    pub fn law(&self) -> InteractionLaw {
        self.law
    }

    #[inline]
    pub fn coefficients(&self) -> &InteractionCoefficients {
        &self.coefficients
    }

    /// Lennard-Jones energy summed over the pairs seen by the last pass
    #[inline]
    pub fn potential_energy(&self) -> Scalar {
        self.potential_energy
    }

    /// Whether the last call had to skip the tree
    #[inline]
    pub fn used_fallback(&self) -> bool {
        self.used_fallback
    }

    /// Resolves collisions and then attraction for every pair in reach.
    ///
    /// `octree` must have been built from `particles` this step. An
    /// overflowed tree is ignored and every pair is checked instead.
    pub fn resolve(&mut self, octree: &Octree, particles: &mut [Particle], order: TraversalOrder) {
        if octree.root().is_none() && particles.len() > 1 {
            self.resolve_exhaustive(particles, order);
            self.used_fallback = true;
            return;
        }

        self.potential_energy = 0.0;
        self.used_fallback = false;
        self.drift = 0.0;

        if octree.root().is_none() {
            return;
        }

        let overshoot = overshoot(octree, particles);
        self.tree_pass(octree, particles, order, Pass::Collision, overshoot);
        if self.law.attracts() {
            self.tree_pass(octree, particles, order, Pass::Attraction, overshoot);
        }
    }

    /// Checks every unordered pair without consulting a tree.
    pub fn resolve_exhaustive(&mut self, particles: &mut [Particle], order: TraversalOrder) {
        self.potential_energy = 0.0;
        self.used_fallback = false;

        self.pairwise_pass(particles, order, Pass::Collision);
        if self.law.attracts() {
            self.pairwise_pass(particles, order, Pass::Attraction);
        }
    }

    fn reach(&self, pass: Pass) -> Scalar {
        match pass {
            Pass::Collision => self.coefficients.collision_reach(),
            Pass::Attraction => self.coefficients.cutoff_distance(),
        }
    }

    /// Walks every particle once. The tree only narrows the partner list;
    /// partners are resolved in index order, exactly as the pairwise pass
    /// would visit them.
    ///
    /// Node boxes describe positions at build time, give or take
    /// `overshoot` for particles that had not yet been reflected off a wall.
    /// `drift` bounds how far any particle has moved since then, and the
    /// walked particle may move by up to `slack` before its partner list is
    /// gathered again.
    fn tree_pass(
        &mut self,
        octree: &Octree,
        particles: &mut [Particle],
        order: TraversalOrder,
        pass: Pass,
        overshoot: Scalar,
    ) {
        let reach = self.reach(pass);
        let slack = self.coefficients.collision_reach();
        let mut candidates = std::mem::take(&mut self.candidates);

        for walked in order.indices(particles.len()) {
            let start = particles[walked].position;
            let mut resolved_through = None;

            loop {
                let anchor = particles[walked].position;
                let margin = Vector::splat(reach + overshoot + self.drift + slack);

                candidates.clear();
                let filter = CandidateFilter {
                    walked,
                    resolved_through,
                    order,
                };
                gather(octree, ROOT, anchor, margin, filter, &mut candidates);
                order.sort(&mut candidates);

                let mut moved_too_far = false;
                for &other in &candidates {
                    let moved = (particles[walked].position - anchor).abs().max_element();
                    if moved > slack {
                        moved_too_far = true;
                        break;
                    }
                    self.resolve_pair(pass, particles, walked, other);
                    resolved_through = Some(other);
                }

                if !moved_too_far {
                    break;
                }
            }

            self.drift = self.drift.max(particles[walked].position.distance(start));
        }

        self.candidates = candidates;
    }

    fn pairwise_pass(&mut self, particles: &mut [Particle], order: TraversalOrder, pass: Pass) {
        let count = particles.len();

        match order {
            TraversalOrder::Ascending => {
                for walked in 0..count {
                    for other in walked + 1..count {
                        self.resolve_pair(pass, particles, walked, other);
                    }
                }
            }
            TraversalOrder::Descending => {
                for walked in (0..count).rev() {
                    for other in (0..walked).rev() {
                        self.resolve_pair(pass, particles, walked, other);
                    }
                }
            }
        }
    }

    #[inline]
    fn resolve_pair(&mut self, pass: Pass, particles: &mut [Particle], moved: usize, other: usize) {
        let (a, b) = pair_mut(particles, moved, other);
        match pass {
            Pass::Collision => self.collide(a, b),
            Pass::Attraction => self.attract(a, b),
        }
    }

    /// Separates an overlapping pair so the spheres just touch, moving `a`
    /// along the line between their centers, then exchanges momentum.
    fn collide(&self, a: &mut Particle, b: &mut Particle) {
        let species = self.coefficients.species();
        let radius_sum = species.collision_radius(a.species) + species.collision_radius(b.species);

        let separation = a.position - b.position;
        if separation.length_squared() > radius_sum * radius_sum {
            return;
        }

        let separation = separation.with_length(radius_sum);
        a.position = b.position + separation;

        match self.law {
            InteractionLaw::Ideal => {
                let mass_a = species.mass(a.species);
                let mass_b = species.mass(b.species);
                let twice_center_of_mass =
                    (a.velocity * mass_a + b.velocity * mass_b) * (2.0 / (mass_a + mass_b));

                a.velocity = twice_center_of_mass - a.velocity;
                b.velocity = twice_center_of_mass - b.velocity;
            }
            InteractionLaw::Bouncy | InteractionLaw::Potential => {
                let projection = separation
                    * (separation.dot(a.velocity - b.velocity) / (radius_sum * radius_sum));

                a.velocity -= projection;
                b.velocity += projection;
            }
        }
    }

    fn attract(&mut self, a: &mut Particle, b: &mut Particle) {
        let cutoff = self.coefficients.cutoff_distance();

        let separation = a.position - b.position;
        let distance_squared = separation.length_squared();
        if distance_squared > cutoff * cutoff {
            return;
        }

        let distance = distance_squared.sqrt();
        let pair = self.coefficients.pair(a.species, b.species);
        let force = separation.with_length(pair.force(distance));

        a.force -= force;
        b.force += force;
        self.potential_energy += pair.potential(distance);
    }
}

#[inline]
fn pair_mut(particles: &mut [Particle], a: usize, b: usize) -> (&mut Particle, &mut Particle) {
    debug_assert_ne!(a, b);

    if a < b {
        let (low, high) = particles.split_at_mut(b);
        (&mut low[a], &mut high[0])
    } else {
        let (low, high) = particles.split_at_mut(a);
        (&mut high[0], &mut low[b])
    }
}

/// Furthest any particle lies outside the root box on a single axis. A
/// particle outside the root stays outside every box on its path by the
/// same distance.
fn overshoot(octree: &Octree, particles: &[Particle]) -> Scalar {
    let center = octree.node(ROOT).center;
    let half_size = octree.half_size(0);

    particles
        .iter()
        .map(|particle| {
            ((particle.position - center).abs() - half_size)
                .max(Vector::ZERO)
                .max_element()
        })
        .fold(0.0, Scalar::max)
}

#[derive(Debug, Clone, Copy)]
struct CandidateFilter {
    walked: usize,
    /// Last partner already resolved for `walked`
    resolved_through: Option<usize>,
    order: TraversalOrder,
}

impl CandidateFilter {
    #[inline]
    fn accepts(self, other: usize) -> bool {
        self.order.resolves(self.walked, other)
            && self
                .resolved_through
                .is_none_or(|last| self.order.resolves(last, other))
    }
}

/// Collects the particles below `index` whose node box, grown by `margin`,
/// contains `anchor`. Leaves are not tested against their own box: a
/// resident parked in a sibling octant may lie outside it.
fn gather(
    octree: &Octree,
    index: NodeIndex,
    anchor: Vector,
    margin: Vector,
    filter: CandidateFilter,
    candidates: &mut Vec<usize>,
) {
    let node = octree.node(index);

    match node.kind {
        NodeKind::Leaf { particle } => {
            if filter.accepts(particle) {
                candidates.push(particle);
            }
        }
        NodeKind::Internal { children } => {
            let offset = node.center - anchor;
            if !offset.within_half_extents(octree.half_size(node.depth) + margin) {
                return;
            }
            for child in children.into_iter().flatten() {
                gather(octree, child, anchor, margin, filter, candidates);
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::physics::octree::OctreeBudget;
    use crate::physics::species::{Species, SpeciesTable};

    const BOX_SIZE: Scalar = 100.0;

    /// Radii 1 and 1.5 keep touching distances exact; cutoff is 21.
    fn engine(law: InteractionLaw) -> InteractionEngine {
        let table =
            SpeciesTable::new([4.0, 40.0], [1.0, 1.5], [[0.1, 0.3], [0.3, 1.0]]).unwrap();
        InteractionEngine::new(law, InteractionCoefficients::new(table, 7.0))
    }

    fn built_octree(particles: &[Particle]) -> Octree {
        let mut octree =
            Octree::new(Vector::splat(BOX_SIZE), OctreeBudget::for_capacity(64, 4)).unwrap();
        assert!(octree.build(particles));
        octree
    }

    fn resolve_with_tree(
        engine: &mut InteractionEngine,
        particles: &mut [Particle],
        order: TraversalOrder,
    ) {
        let octree = built_octree(particles);
        engine.resolve(&octree, particles, order);
    }

    fn assert_vectors_close(actual: Vector, expected: Vector, tolerance: Scalar) {
        let scale = expected.length().max(1.0);
        assert!(
            (actual - expected).length() <= tolerance * scale,
            "expected {expected}, got {actual}"
        );
    }

    #[test]
    fn test_head_on_touching_pair_reverses() {
        let mut engine = engine(InteractionLaw::Bouncy);
        let radius = engine
            .coefficients()
            .species()
            .collision_radius(Species::Helium);

        let mut particles = vec![
            Particle::new(
                Vector::new(40.0, 50.0, 50.0),
                Vector::new(1.0, 0.0, 0.0),
                Species::Helium,
            ),
            Particle::new(
                Vector::new(40.0 + 2.0 * radius, 50.0, 50.0),
                Vector::new(-1.0, 0.0, 0.0),
                Species::Helium,
            ),
        ];

        resolve_with_tree(&mut engine, &mut particles, TraversalOrder::Ascending);

        assert_eq!(particles[0].position, Vector::new(40.0, 50.0, 50.0));
        assert_eq!(particles[1].position, Vector::new(40.0 + 2.0 * radius, 50.0, 50.0));
        assert_eq!(particles[0].velocity, Vector::new(-1.0, 0.0, 0.0));
        assert_eq!(particles[1].velocity, Vector::new(1.0, 0.0, 0.0));
    }

    fn overlapping_pair() -> Vec<Particle> {
        vec![
            Particle::new(Vector::new(49.4, 49.2, 50.0), Vector::ZERO, Species::Helium),
            Particle::new(Vector::new(50.0, 50.0, 50.0), Vector::ZERO, Species::Argon),
        ]
    }

    #[test]
    fn test_overlap_is_separated_to_touching_distance() {
        let mut engine = engine(InteractionLaw::Bouncy);
        let species = *engine.coefficients().species();
        let radius_sum =
            species.collision_radius(Species::Helium) + species.collision_radius(Species::Argon);

        let mut particles = overlapping_pair();
        let direction = (particles[0].position - particles[1].position).normalize();

        resolve_with_tree(&mut engine, &mut particles, TraversalOrder::Ascending);

        let separation = particles[0].position - particles[1].position;
        assert!((separation.length() - radius_sum).abs() < 1e-12);
        assert_vectors_close(separation.normalize(), direction, 1e-12);
        assert_eq!(
            particles[1].position,
            Vector::new(50.0, 50.0, 50.0),
            "ascending order moves the lower index"
        );
    }

    #[test]
    fn test_descending_order_moves_higher_index() {
        let mut engine = engine(InteractionLaw::Bouncy);

        let mut particles = overlapping_pair();
        resolve_with_tree(&mut engine, &mut particles, TraversalOrder::Descending);

        assert_eq!(particles[0].position, Vector::new(49.4, 49.2, 50.0));
        assert_ne!(particles[1].position, Vector::new(50.0, 50.0, 50.0));
    }

    #[test]
    fn test_separated_pair_does_not_collide() {
        let mut engine = engine(InteractionLaw::Bouncy);
        let mut particles = vec![
            Particle::new(Vector::new(20.0, 50.0, 50.0), Vector::X, Species::Helium),
            Particle::new(Vector::new(23.0, 50.0, 50.0), -Vector::X, Species::Argon),
        ];
        let before = particles.clone();

        resolve_with_tree(&mut engine, &mut particles, TraversalOrder::Ascending);

        assert_eq!(particles, before);
        assert_eq!(engine.potential_energy(), 0.0);
    }

    #[test]
    fn test_collision_conserves_momentum() {
        for law in [InteractionLaw::Ideal, InteractionLaw::Bouncy] {
            let mut engine = engine(law);
            let species = *engine.coefficients().species();
            let mut particles = overlapping_pair();
            particles[0].velocity = Vector::new(3.0, 1.0, -0.5);
            particles[1].velocity = Vector::new(-1.0, 0.25, 2.0);

            let momentum = |particles: &[Particle]| {
                particles
                    .iter()
                    .map(|p| p.velocity * species.mass(p.species))
                    .sum::<Vector>()
            };
            let before = momentum(&particles);

            resolve_with_tree(&mut engine, &mut particles, TraversalOrder::Ascending);

            assert_vectors_close(momentum(&particles), before, 1e-12);
        }
    }

    #[test]
    fn test_ideal_law_reflects_through_center_of_mass() {
        let mut engine = engine(InteractionLaw::Ideal);
        let species = *engine.coefficients().species();
        let mut particles = overlapping_pair();
        particles[0].velocity = Vector::new(2.0, 0.0, 0.0);
        particles[1].velocity = Vector::new(0.0, -1.0, 0.0);

        let mass_a = species.mass(Species::Helium);
        let mass_b = species.mass(Species::Argon);
        let center_of_mass = (particles[0].velocity * mass_a + particles[1].velocity * mass_b)
            / (mass_a + mass_b);
        let expected_a = 2.0 * center_of_mass - particles[0].velocity;
        let expected_b = 2.0 * center_of_mass - particles[1].velocity;

        resolve_with_tree(&mut engine, &mut particles, TraversalOrder::Ascending);

        assert_vectors_close(particles[0].velocity, expected_a, 1e-12);
        assert_vectors_close(particles[1].velocity, expected_b, 1e-12);
    }

    #[test]
    fn test_attraction_is_equal_and_opposite() {
        let mut engine = engine(InteractionLaw::Potential);
        let pair = *engine
            .coefficients()
            .pair(Species::Helium, Species::Argon);
        let distance = 1.5 * pair.sigma;

        let mut particles = vec![
            Particle::new(Vector::new(20.0, 50.0, 50.0), Vector::ZERO, Species::Helium),
            Particle::new(
                Vector::new(20.0 + distance, 50.0, 50.0),
                Vector::ZERO,
                Species::Argon,
            ),
        ];

        resolve_with_tree(&mut engine, &mut particles, TraversalOrder::Ascending);

        assert!(
            particles[0].force.x > 0.0,
            "helium should be pulled toward argon, got {}",
            particles[0].force
        );
        assert_eq!(particles[0].force, -particles[1].force);
        assert!((particles[0].force.length() - pair.force(distance)).abs() < 1e-12);
        assert!((engine.potential_energy() - pair.potential(distance)).abs() < 1e-15);
    }

    #[test]
    fn test_hard_sphere_laws_do_not_attract() {
        for law in [InteractionLaw::Ideal, InteractionLaw::Bouncy] {
            let mut engine = engine(law);
            let mut particles = vec![
                Particle::new(Vector::new(20.0, 50.0, 50.0), Vector::ZERO, Species::Argon),
                Particle::new(Vector::new(25.0, 50.0, 50.0), Vector::ZERO, Species::Argon),
            ];

            resolve_with_tree(&mut engine, &mut particles, TraversalOrder::Ascending);

            assert_eq!(particles[0].force, Vector::ZERO);
            assert_eq!(particles[1].force, Vector::ZERO);
            assert_eq!(engine.potential_energy(), 0.0);
        }
    }

    /// A 5×2×2 lattice with spacing 13: face and edge neighbours fall inside
    /// the attraction cutoff, body diagonals and longer pairs do not, and no
    /// pair is close enough to collide.
    fn lattice() -> Vec<Particle> {
        let mut particles = Vec::new();
        for i in 0..5 {
            for j in 0..2 {
                for k in 0..2 {
                    let species = if (i + j + k) % 2 == 0 {
                        Species::Helium
                    } else {
                        Species::Argon
                    };
                    particles.push(Particle::new(
                        Vector::new(
                            24.0 + 13.0 * i as Scalar,
                            43.5 + 13.0 * j as Scalar,
                            43.5 + 13.0 * k as Scalar,
                        ),
                        Vector::new(0.1 * i as Scalar, -0.2 * j as Scalar, 0.3 * k as Scalar),
                        species,
                    ));
                }
            }
        }
        particles
    }

    #[test]
    fn test_tree_matches_exhaustive_pairwise() {
        for order in [TraversalOrder::Ascending, TraversalOrder::Descending] {
            let mut tree_engine = engine(InteractionLaw::Potential);
            let mut exhaustive_engine = engine(InteractionLaw::Potential);

            let mut via_tree = lattice();
            let mut via_pairs = lattice();
            assert!(via_tree.len() <= 20);

            let octree = built_octree(&via_tree);
            tree_engine.resolve(&octree, &mut via_tree, order);
            exhaustive_engine.resolve_exhaustive(&mut via_pairs, order);

            assert!(!tree_engine.used_fallback());
            assert!(tree_engine.potential_energy() < 0.0);
            assert_eq!(
                tree_engine.potential_energy(),
                exhaustive_engine.potential_energy()
            );
            assert!(via_pairs.iter().all(|p| p.force != Vector::ZERO));
            assert_eq!(via_tree, via_pairs);
        }
    }

    /// Twelve particles packed within ±2.5 of the box center, so most pairs
    /// overlap and collisions chain into each other.
    fn cluster() -> Vec<Particle> {
        (0..12)
            .map(|n| {
                let step = n as Scalar;
                let offset = Vector::new(
                    ((n * 7) % 5) as Scalar - 2.0 + 0.05 * step,
                    ((n * 3) % 5) as Scalar - 2.0 - 0.03 * step,
                    (n % 5) as Scalar - 2.0 + 0.02 * step,
                );
                let species = if n % 3 == 0 {
                    Species::Argon
                } else {
                    Species::Helium
                };
                Particle::new(
                    Vector::splat(BOX_SIZE / 2.0) + offset * 0.9,
                    Vector::new(0.5 - 0.1 * step, 0.2 * step - 1.0, 0.3),
                    species,
                )
            })
            .collect()
    }

    #[test]
    fn test_tree_matches_exhaustive_with_chained_collisions() {
        for law in [InteractionLaw::Bouncy, InteractionLaw::Potential] {
            for order in [TraversalOrder::Ascending, TraversalOrder::Descending] {
                let mut tree_engine = engine(law);
                let mut exhaustive_engine = engine(law);

                let mut via_tree = cluster();
                let mut via_pairs = cluster();
                let before = via_tree.clone();

                let octree = built_octree(&via_tree);
                tree_engine.resolve(&octree, &mut via_tree, order);
                exhaustive_engine.resolve_exhaustive(&mut via_pairs, order);

                assert!(!tree_engine.used_fallback());
                assert_ne!(via_pairs, before, "the cluster should collide");
                assert_eq!(via_tree, via_pairs, "{law:?} {order:?}");
                assert_eq!(
                    tree_engine.potential_energy(),
                    exhaustive_engine.potential_energy()
                );
            }
        }
    }

    #[test]
    fn test_tree_finds_collisions_beyond_the_walls() {
        // Integration can carry particles past a wall before the tree is
        // built; reflection only happens after the interactions.
        let particles = vec![
            Particle::new(Vector::splat(20.0), Vector::ZERO, Species::Argon),
            Particle::new(
                Vector::new(BOX_SIZE + 8.0, 50.0, 50.0),
                Vector::X,
                Species::Helium,
            ),
            Particle::new(
                Vector::new(BOX_SIZE + 9.5, 50.0, 50.0),
                -Vector::X,
                Species::Helium,
            ),
        ];

        for order in [TraversalOrder::Ascending, TraversalOrder::Descending] {
            let mut tree_engine = engine(InteractionLaw::Bouncy);
            let mut exhaustive_engine = engine(InteractionLaw::Bouncy);

            let mut via_tree = particles.clone();
            let mut via_pairs = particles.clone();
            let octree = built_octree(&via_tree);
            tree_engine.resolve(&octree, &mut via_tree, order);
            exhaustive_engine.resolve_exhaustive(&mut via_pairs, order);

            assert!(!tree_engine.used_fallback());
            assert_eq!(via_pairs[1].velocity, -Vector::X, "the pair should bounce");
            assert_eq!(via_tree, via_pairs, "{order:?}");
        }
    }

    #[test]
    fn test_overflowed_tree_falls_back_to_pairwise() {
        let mut particles = vec![
            Particle::new(Vector::new(30.0, 30.0, 30.0), Vector::ZERO, Species::Helium),
            Particle::new(Vector::new(31.5, 30.5, 30.0), Vector::X, Species::Argon),
            Particle::new(Vector::new(70.0, 60.0, 40.0), -Vector::Y, Species::Helium),
            Particle::new(Vector::new(71.0, 61.0, 40.5), Vector::Z, Species::Argon),
        ];
        let mut expected = particles.clone();

        let mut octree = Octree::new(
            Vector::splat(BOX_SIZE),
            OctreeBudget {
                max_nodes: 2,
                max_depth: 8,
                separation_tries: 4,
            },
        )
        .unwrap();
        assert!(!octree.build(&particles));

        let mut engine = engine(InteractionLaw::Potential);
        engine.resolve(&octree, &mut particles, TraversalOrder::Ascending);
        assert!(engine.used_fallback());

        let mut reference = self::engine(InteractionLaw::Potential);
        reference.resolve_exhaustive(&mut expected, TraversalOrder::Ascending);

        assert_eq!(particles, expected);
        assert_eq!(engine.potential_energy(), reference.potential_energy());
    }

    #[test]
    fn test_potential_energy_resets_between_calls() {
        let mut engine = engine(InteractionLaw::Potential);
        let mut particles = vec![
            Particle::new(Vector::new(20.0, 50.0, 50.0), Vector::ZERO, Species::Argon),
            Particle::new(Vector::new(26.0, 50.0, 50.0), Vector::ZERO, Species::Argon),
        ];

        resolve_with_tree(&mut engine, &mut particles, TraversalOrder::Ascending);
        let first = engine.potential_energy();
        assert!(first < 0.0);
        resolve_with_tree(&mut engine, &mut particles, TraversalOrder::Descending);

        assert_eq!(engine.potential_energy(), first);
    }

    #[test]
    fn test_single_and_empty_sets_are_noops() {
        let mut engine = engine(InteractionLaw::Potential);

        let mut empty: Vec<Particle> = Vec::new();
        let octree = Octree::new(Vector::splat(BOX_SIZE), OctreeBudget::for_capacity(1, 4)).unwrap();
        engine.resolve(&octree, &mut empty, TraversalOrder::Ascending);
        assert!(!engine.used_fallback());

        let mut single = vec![Particle::new(
            Vector::splat(50.0),
            Vector::X,
            Species::Helium,
        )];
        resolve_with_tree(&mut engine, &mut single, TraversalOrder::Ascending);
        assert_eq!(single[0].force, Vector::ZERO);
        assert_eq!(engine.potential_energy(), 0.0);
    }

    #[test]
    fn test_traversal_order_reverses() {
        assert_eq!(TraversalOrder::Ascending.reversed(), TraversalOrder::Descending);
        assert_eq!(TraversalOrder::Descending.reversed(), TraversalOrder::Ascending);
    }
}
