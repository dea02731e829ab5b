use std::hash::{Hash, Hasher};
use std::sync::OnceLock;

use petgraph::graph::{EdgeIndex, NodeIndex};

use crate::atom::Atom;
use crate::bond::{Bond, BondOrder};
use crate::canonical::{self, CanonicalForm, CanonicalOptions};
use crate::graph::{Graph, GraphError, NotFoundError};
use crate::valence::{self, InvalidValenceError};

#[derive(Debug, Clone, Copy, PartialEq, Eq, thiserror::Error)]
pub enum MoleculeError {
    #[error(transparent)]
    Graph(#[from] GraphError),
    #[error(transparent)]
    Valence(#[from] InvalidValenceError),
}

impl From<NotFoundError> for MoleculeError {
    fn from(e: NotFoundError) -> Self {
        MoleculeError::Graph(GraphError::NotFound(e))
    }
}

/// A single electron-placement change applied through [`Molecule::apply`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Edit {
    BondOrder(EdgeIndex, BondOrder),
    Charge(NodeIndex, i8),
    Radicals(NodeIndex, u8),
    LonePairs(NodeIndex, u8),
}

enum Undo {
    Bond(EdgeIndex, Bond),
    Atom(NodeIndex, Atom),
}

/// A chemical graph: atoms and bonds in one owned arena.
///
/// Construction checks topology only; electron bookkeeping is checked by
/// [`Molecule::validate`] and at every [`Molecule::apply`]. Equality is
/// structural (isomorphism under strict comparison), not index-wise.
#[derive(Clone, Default)]
pub struct Molecule {
    graph: Graph<Atom, Bond>,
    canonical: OnceLock<(u64, CanonicalForm)>,
}

impl Molecule {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn builder() -> MoleculeBuilder {
        MoleculeBuilder::default()
    }

    pub fn from_graph(graph: Graph<Atom, Bond>) -> Self {
        Self {
            graph,
            canonical: OnceLock::new(),
        }
    }

    /// Builds a molecule from an ordered atom list and `(i, j, order)` bonds
    /// referring to positions in that list.
    pub fn from_parts(
        atoms: impl IntoIterator<Item = Atom>,
        bonds: &[(usize, usize, BondOrder)],
    ) -> Result<Self, MoleculeError> {
        let mut graph = Graph::new();
        for atom in atoms {
            graph.add_vertex(atom);
        }
        for &(a, b, order) in bonds {
            graph.add_edge(NodeIndex::new(a), NodeIndex::new(b), Bond::new(order))?;
        }
        Ok(Self::from_graph(graph))
    }

    pub fn graph(&self) -> &Graph<Atom, Bond> {
        &self.graph
    }

    pub fn into_graph(self) -> Graph<Atom, Bond> {
        self.graph
    }

    /// Mutable access for in-crate algorithms that keep the electron budget
    /// themselves. Drops the canonical cache.
    pub(crate) fn graph_mut(&mut self) -> &mut Graph<Atom, Bond> {
        self.canonical = OnceLock::new();
        &mut self.graph
    }

    pub fn atom(&self, idx: NodeIndex) -> &Atom {
        self.graph.vertex(idx)
    }

    pub fn bond(&self, idx: EdgeIndex) -> &Bond {
        self.graph.edge(idx)
    }

    pub fn atom_count(&self) -> usize {
        self.graph.vertex_count()
    }

    pub fn bond_count(&self) -> usize {
        self.graph.edge_count()
    }

    pub fn atoms(&self) -> impl Iterator<Item = NodeIndex> + '_ {
        self.graph.vertices()
    }

    pub fn bonds(&self) -> impl Iterator<Item = EdgeIndex> + '_ {
        self.graph.edges()
    }

    pub fn neighbors(&self, idx: NodeIndex) -> impl Iterator<Item = NodeIndex> + '_ {
        self.graph.neighbors(idx)
    }

    pub fn bonds_of(&self, idx: NodeIndex) -> impl Iterator<Item = EdgeIndex> + '_ {
        self.graph.incident_edges(idx)
    }

    pub fn bond_between(&self, a: NodeIndex, b: NodeIndex) -> Option<EdgeIndex> {
        self.graph.edge_between(a, b)
    }

    pub fn bond_endpoints(&self, idx: EdgeIndex) -> Option<(NodeIndex, NodeIndex)> {
        self.graph.edge_endpoints(idx)
    }

    pub fn add_atom(&mut self, atom: Atom) -> NodeIndex {
        self.graph_mut().add_vertex(atom)
    }

    pub fn add_bond(
        &mut self,
        a: NodeIndex,
        b: NodeIndex,
        order: BondOrder,
    ) -> Result<EdgeIndex, MoleculeError> {
        Ok(self.graph_mut().add_edge(a, b, Bond::new(order))?)
    }

    /// Removes an atom and its bonds; the last atom takes over `idx`.
    pub fn remove_atom(&mut self, idx: NodeIndex) -> Result<Atom, MoleculeError> {
        self.graph.try_vertex(idx)?;
        Ok(self.graph_mut().remove_vertex(idx)?)
    }

    pub fn remove_bond(&mut self, idx: EdgeIndex) -> Result<Bond, MoleculeError> {
        self.graph.try_edge(idx)?;
        Ok(self.graph_mut().remove_edge(idx)?)
    }

    /// First atom (in index order) whose electrons do not balance.
    pub fn validate(&self) -> Result<(), InvalidValenceError> {
        valence::check_all(&self.graph)
    }

    pub fn is_valid(&self) -> bool {
        self.validate().is_ok()
    }

    /// Applies `edits` as one transaction. Every atom touched by an edit is
    /// re-checked afterwards; on any failure the molecule is left exactly
    /// as it was.
    pub fn apply(&mut self, edits: &[Edit]) -> Result<(), MoleculeError> {
        for edit in edits {
            match *edit {
                Edit::BondOrder(e, _) => {
                    self.graph.try_edge(e)?;
                }
                Edit::Charge(v, _) | Edit::Radicals(v, _) | Edit::LonePairs(v, _) => {
                    self.graph.try_vertex(v)?;
                }
            }
        }

        let mut undo = Vec::with_capacity(edits.len());
        let mut touched = Vec::new();
        for edit in edits {
            match *edit {
                Edit::BondOrder(e, order) => {
                    let bond = self.graph.edge_mut(e);
                    undo.push(Undo::Bond(e, *bond));
                    bond.order = order;
                    if order == BondOrder::Aromatic {
                        bond.is_aromatic = true;
                    }
                    if let Some((a, b)) = self.graph.edge_endpoints(e) {
                        touched.extend([a, b]);
                    }
                }
                Edit::Charge(v, value) => {
                    let atom = self.graph.vertex_mut(v);
                    undo.push(Undo::Atom(v, *atom));
                    atom.charge = value;
                    touched.push(v);
                }
                Edit::Radicals(v, value) => {
                    let atom = self.graph.vertex_mut(v);
                    undo.push(Undo::Atom(v, *atom));
                    atom.radical_electrons = value;
                    touched.push(v);
                }
                Edit::LonePairs(v, value) => {
                    let atom = self.graph.vertex_mut(v);
                    undo.push(Undo::Atom(v, *atom));
                    atom.lone_pairs = value;
                    touched.push(v);
                }
            }
        }

        touched.sort_unstable();
        touched.dedup();
        let result = touched
            .iter()
            .try_for_each(|&v| valence::check_atom(&self.graph, v));

        match result {
            Ok(()) => {
                self.canonical = OnceLock::new();
                Ok(())
            }
            Err(err) => {
                for entry in undo.into_iter().rev() {
                    match entry {
                        Undo::Bond(e, bond) => *self.graph.edge_mut(e) = bond,
                        Undo::Atom(v, atom) => *self.graph.vertex_mut(v) = atom,
                    }
                }
                Err(err.into())
            }
        }
    }

    pub fn set_bond_order(&mut self, idx: EdgeIndex, order: BondOrder) -> Result<(), MoleculeError> {
        self.apply(&[Edit::BondOrder(idx, order)])
    }

    /// Recomputes every atom's lone pairs from its charge, radicals, bonds
    /// and hydrogens. All-or-nothing.
    pub fn update_lone_pairs(&mut self) -> Result<(), InvalidValenceError> {
        let mut next = self.graph.clone();
        for v in self.graph.vertices() {
            match valence::balancing_lone_pairs(&self.graph, v) {
                Some(lp) => next.vertex_mut(v).lone_pairs = lp,
                None => {
                    valence::check_atom(&self.graph, v)?;
                }
            }
        }
        valence::check_all(&next)?;
        *self.graph_mut() = next;
        Ok(())
    }

    /// Recomputes every atom's formal charge from its other electrons.
    pub fn update_charges(&mut self) -> Result<(), InvalidValenceError> {
        let mut next = self.graph.clone();
        for v in self.graph.vertices() {
            match valence::balancing_charge(&self.graph, v) {
                Some(charge) => next.vertex_mut(v).charge = charge,
                None => {
                    valence::check_atom(&self.graph, v)?;
                }
            }
        }
        valence::check_all(&next)?;
        *self.graph_mut() = next;
        Ok(())
    }

    pub fn total_charge(&self) -> i32 {
        self.graph
            .vertices()
            .map(|v| self.graph.vertex(v).charge as i32)
            .sum()
    }

    pub fn radical_count(&self) -> u32 {
        self.graph
            .vertices()
            .map(|v| self.graph.vertex(v).radical_electrons as u32)
            .sum()
    }

    pub fn is_radical(&self) -> bool {
        self.radical_count() > 0
    }

    pub fn has_aromatic_bonds(&self) -> bool {
        self.graph
            .edges()
            .any(|e| self.graph.edge(e).order == BondOrder::Aromatic)
    }

    /// Hash of the exact labeled content (indices included).
    pub fn content_hash(&self) -> u64 {
        let mut hasher = std::collections::hash_map::DefaultHasher::new();
        self.graph.vertex_count().hash(&mut hasher);
        for v in self.graph.vertices() {
            self.graph.vertex(v).hash(&mut hasher);
        }
        for e in self.graph.edges() {
            if let Some((a, b)) = self.graph.edge_endpoints(e) {
                (a.index().min(b.index()), a.index().max(b.index())).hash(&mut hasher);
            }
            self.graph.edge(e).order.hash(&mut hasher);
        }
        hasher.finish()
    }

    /// Canonical form under default options, computed once per content.
    pub fn canonical_form(&self) -> &CanonicalForm {
        let key = self.content_hash();
        let (cached_key, form) = self.canonical.get_or_init(|| {
            (
                key,
                canonical::compute(&self.graph, &CanonicalOptions::default()),
            )
        });
        debug_assert_eq!(*cached_key, key, "canonical cache outlived an edit");
        form
    }

    /// Strict isomorphism through the matcher, bypassing canonical forms.
    pub fn is_isomorphic(&self, other: &Molecule) -> bool {
        crate::substruct::is_isomorphic(self, other)
    }
}

impl PartialEq for Molecule {
    fn eq(&self, other: &Self) -> bool {
        canonical::graphs_equal(self, other)
    }
}

impl Eq for Molecule {}

impl Hash for Molecule {
    fn hash<H: Hasher>(&self, state: &mut H) {
        let mut keys: Vec<_> = self
            .graph
            .vertices()
            .map(|v| {
                let a = self.graph.vertex(v);
                (
                    a.element,
                    a.charge,
                    a.radical_electrons,
                    a.lone_pairs,
                    a.isotope,
                    a.implicit_hydrogens,
                )
            })
            .collect();
        keys.sort_unstable();
        keys.hash(state);
        let mut orders: Vec<_> = self.graph.edges().map(|e| self.graph.edge(e).order).collect();
        orders.sort_unstable();
        orders.hash(state);
    }
}

impl std::fmt::Debug for Molecule {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let bonds: Vec<_> = self
            .graph
            .edges()
            .filter_map(|e| {
                let (a, b) = self.graph.edge_endpoints(e)?;
                Some((a.index(), b.index(), self.graph.edge(e).order))
            })
            .collect();
        let atoms: Vec<_> = self.graph.vertices().map(|v| self.graph.vertex(v)).collect();
        f.debug_struct("Molecule")
            .field("atoms", &atoms)
            .field("bonds", &bonds)
            .finish()
    }
}

/// Incremental constructor for adapters that emit atoms and bonds in order.
#[derive(Debug, Clone, Default)]
pub struct MoleculeBuilder {
    atoms: Vec<Atom>,
    bonds: Vec<(usize, usize, BondOrder)>,
}

impl MoleculeBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds an atom and returns its position.
    pub fn atom(&mut self, atom: Atom) -> usize {
        self.atoms.push(atom);
        self.atoms.len() - 1
    }

    pub fn bond(&mut self, a: usize, b: usize, order: BondOrder) -> &mut Self {
        self.bonds.push((a, b, order));
        self
    }

    pub fn build(&self) -> Result<Molecule, MoleculeError> {
        Molecule::from_parts(self.atoms.iter().copied(), &self.bonds)
    }
}
