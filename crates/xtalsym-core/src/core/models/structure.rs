use super::atom::Atom;
use super::cell::UnitCell;
use super::ids::AtomId;
use super::topology::{Bond, HydrogenBond};
use crate::core::symmetry::ops::SpaceGroup;
use crate::core::utils::elements;
use slotmap::{SecondaryMap, SlotMap};
use std::collections::{HashMap, VecDeque};

/// A maximal set of atoms joined only by `"."` (non-symmetry) bonds and
/// hydrogen bonds. Every atom of a structure belongs to exactly one group;
/// an unbonded atom forms a singleton group.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ConnectivityGroup {
    atoms: Vec<AtomId>,
}

impl ConnectivityGroup {
    pub fn atoms(&self) -> &[AtomId] {
        &self.atoms
    }

    pub fn len(&self) -> usize {
        self.atoms.len()
    }

    pub fn is_empty(&self) -> bool {
        self.atoms.is_empty()
    }
}

/// Represents a complete crystal structure: unit cell, space group, atoms,
/// bonds, hydrogen bonds, and the cached connectivity partition.
///
/// This struct is the central data model for symmetry expansion. Atoms are
/// stored in a slot map with stable IDs and indexed by their unique label;
/// bonds and hydrogen bonds reference atoms by label so that symmetry-
/// generated endpoints can be expressed before they are materialized.
#[derive(Debug, Clone)]
pub struct CrystalStructure {
    /// The unit cell, immutable for the lifetime of the structure.
    cell: UnitCell,
    /// The space-group operator table used to expand this structure.
    space_group: SpaceGroup,
    /// Primary atom storage with stable IDs.
    atoms: SlotMap<AtomId, Atom>,
    /// Lookup map from unique atom label to its ID.
    label_map: HashMap<String, AtomId>,
    /// All covalent bonds, in insertion order.
    bonds: Vec<Bond>,
    /// All hydrogen bonds, in insertion order.
    hydrogen_bonds: Vec<HydrogenBond>,
    /// Cached connectivity partition; stale after atoms/bonds change until
    /// `rebuild_connectivity` runs again.
    groups: Vec<ConnectivityGroup>,
    /// Reverse lookup from atom ID to its group index.
    group_index: SecondaryMap<AtomId, usize>,
}

impl CrystalStructure {
    /// Creates an empty structure for the given cell and space group.
    pub fn new(cell: UnitCell, space_group: SpaceGroup) -> Self {
        Self {
            cell,
            space_group,
            atoms: SlotMap::with_key(),
            label_map: HashMap::new(),
            bonds: Vec::new(),
            hydrogen_bonds: Vec::new(),
            groups: Vec::new(),
            group_index: SecondaryMap::new(),
        }
    }

    pub fn cell(&self) -> &UnitCell {
        &self.cell
    }

    pub fn space_group(&self) -> &SpaceGroup {
        &self.space_group
    }

    /// Adds an atom, normalizing its element symbol capitalization when the
    /// symbol is known.
    ///
    /// # Return
    ///
    /// Returns `Some(AtomId)`, or `None` when an atom with the same label
    /// already exists.
    pub fn add_atom(&mut self, mut atom: Atom) -> Option<AtomId> {
        if self.label_map.contains_key(&atom.label) {
            return None;
        }
        if let Some(canonical) = elements::canonical_symbol(&atom.element) {
            if atom.element != canonical {
                atom.element = canonical.to_string();
            }
        }
        let label = atom.label.clone();
        let id = self.atoms.insert(atom);
        self.label_map.insert(label, id);
        Some(id)
    }

    pub fn atom(&self, id: AtomId) -> Option<&Atom> {
        self.atoms.get(id)
    }

    /// Iterates atoms in insertion order (atoms are never removed).
    pub fn atoms_iter(&self) -> impl Iterator<Item = (AtomId, &Atom)> {
        self.atoms.iter()
    }

    pub fn atom_count(&self) -> usize {
        self.atoms.len()
    }

    pub fn find_atom_by_label(&self, label: &str) -> Option<AtomId> {
        self.label_map.get(label).copied()
    }

    pub fn contains_label(&self, label: &str) -> bool {
        self.label_map.contains_key(label)
    }

    /// Adds a bond between two existing atoms (by base label).
    ///
    /// # Return
    ///
    /// Returns `Some(())`, or `None` when either endpoint label is unknown.
    pub fn add_bond(&mut self, bond: Bond) -> Option<()> {
        if !self.label_map.contains_key(&bond.atom1) || !self.label_map.contains_key(&bond.atom2) {
            return None;
        }
        self.bonds.push(bond);
        Some(())
    }

    pub fn bonds(&self) -> &[Bond] {
        &self.bonds
    }

    /// Adds a hydrogen bond between three existing atoms (by base label).
    ///
    /// # Return
    ///
    /// Returns `Some(())`, or `None` when any endpoint label is unknown.
    pub fn add_hydrogen_bond(&mut self, hydrogen_bond: HydrogenBond) -> Option<()> {
        let known = |label: &str| self.label_map.contains_key(label);
        if !known(&hydrogen_bond.donor)
            || !known(&hydrogen_bond.hydrogen)
            || !known(&hydrogen_bond.acceptor)
        {
            return None;
        }
        self.hydrogen_bonds.push(hydrogen_bond);
        Some(())
    }

    pub fn hydrogen_bonds(&self) -> &[HydrogenBond] {
        &self.hydrogen_bonds
    }

    /// The cached connectivity partition, one entry per group.
    pub fn connected_groups(&self) -> &[ConnectivityGroup] {
        &self.groups
    }

    /// The group index of an atom, if the partition covers it.
    pub fn group_of(&self, id: AtomId) -> Option<usize> {
        self.group_index.get(id).copied()
    }

    pub fn group_of_label(&self, label: &str) -> Option<usize> {
        self.find_atom_by_label(label).and_then(|id| self.group_of(id))
    }

    /// Recomputes the connectivity partition from `"."` bonds and hydrogen
    /// bonds. Must run after construction (and after any mutation) before
    /// the structure is handed to the expansion engine; the engine treats
    /// the partition as read-only input.
    pub fn rebuild_connectivity(&mut self) {
        let mut adjacency: HashMap<AtomId, Vec<AtomId>> = HashMap::new();
        let connect = |adjacency: &mut HashMap<AtomId, Vec<AtomId>>, a: AtomId, b: AtomId| {
            adjacency.entry(a).or_default().push(b);
            adjacency.entry(b).or_default().push(a);
        };

        for bond in &self.bonds {
            if !bond.symmetry.is_none() {
                continue;
            }
            if let (Some(a), Some(b)) = (
                self.find_atom_by_label(&bond.atom1),
                self.find_atom_by_label(&bond.atom2),
            ) {
                connect(&mut adjacency, a, b);
            }
        }
        for hb in &self.hydrogen_bonds {
            if !hb.symmetry.is_none() {
                continue;
            }
            let ids = (
                self.find_atom_by_label(&hb.donor),
                self.find_atom_by_label(&hb.hydrogen),
                self.find_atom_by_label(&hb.acceptor),
            );
            if let (Some(d), Some(h), Some(a)) = ids {
                connect(&mut adjacency, d, h);
                connect(&mut adjacency, d, a);
            }
        }

        self.groups.clear();
        self.group_index.clear();

        for (start, _) in self.atoms.iter() {
            if self.group_index.contains_key(start) {
                continue;
            }
            let group_idx = self.groups.len();
            let mut members = Vec::new();
            let mut queue = VecDeque::from([start]);
            self.group_index.insert(start, group_idx);
            while let Some(id) = queue.pop_front() {
                members.push(id);
                if let Some(neighbors) = adjacency.get(&id) {
                    for &next in neighbors {
                        if !self.group_index.contains_key(next) {
                            self.group_index.insert(next, group_idx);
                            queue.push_back(next);
                        }
                    }
                }
            }
            self.groups.push(ConnectivityGroup { atoms: members });
        }
    }
}
