use super::config::ExpansionConfig;
use super::connectivity::EdgeMember;
use super::error::ExpansionError;
use super::traversal::{SymmetryInstance, TraversalOutcome};
use crate::core::models::atom::Atom;
use crate::core::models::structure::CrystalStructure;
use crate::core::models::topology::{Bond, HydrogenBond};
use crate::core::symmetry::code::{SiteSymmetry, SymmetryCode, symmetry_label};
use crate::core::symmetry::ops::SymmetryProvider;
use nalgebra::Point3;
use std::collections::{HashMap, HashSet};
use tracing::{debug, info};

/// Symmetry-generated atoms that survived special-position collapsing, plus
/// the label rewrites for the copies that did not.
#[derive(Debug, Default)]
struct GeneratedAtoms {
    atoms: Vec<Atom>,
    substitutions: HashMap<String, String>,
}

/// Materializes the traversal outcome into a new structure: the original
/// atoms/bonds plus every required symmetry instance, with coinciding
/// copies collapsed and all generated bonds deduped by order-independent
/// identifiers.
pub(crate) fn grow<S: SymmetryProvider>(
    structure: &CrystalStructure,
    symmetry: &S,
    outcome: &TraversalOutcome,
    config: &ExpansionConfig,
) -> Result<CrystalStructure, ExpansionError> {
    let identity = symmetry.identity_code();
    let instances = collect_required_instances(outcome, &identity);
    let GeneratedAtoms {
        atoms: generated_atoms,
        substitutions,
    } = generate_atoms(structure, symmetry, &instances, config)?;

    let effective = |label: &str, code: &SymmetryCode| -> String {
        if *code == identity {
            label.to_string()
        } else {
            let suffixed = symmetry_label(label, code);
            substitutions.get(&suffixed).cloned().unwrap_or(suffixed)
        }
    };

    let mut out = CrystalStructure::new(structure.cell().clone(), structure.space_group().clone());
    for (_, atom) in structure.atoms_iter() {
        out.add_atom(atom.clone());
    }
    let generated_count = generated_atoms.len();
    for atom in generated_atoms {
        out.add_atom(atom);
    }

    let mut seen_bonds: HashSet<(String, String)> = HashSet::new();
    let mut seen_hydrogen_bonds: HashSet<(String, String, String)> = HashSet::new();
    let mut new_bonds: Vec<Bond> = Vec::new();
    let mut new_hydrogen_bonds: Vec<HydrogenBond> = Vec::new();

    // Original "." bonds pass through unchanged; their identity copies are
    // always the kept ones, so no substitution applies.
    for bond in structure.bonds().iter().filter(|b| b.symmetry.is_none()) {
        if seen_bonds.insert(pair_key(&bond.atom1, &bond.atom2)) {
            new_bonds.push(bond.clone());
        }
    }
    for hb in structure.hydrogen_bonds().iter().filter(|h| h.symmetry.is_none()) {
        if seen_hydrogen_bonds.insert(triple_key(&hb.donor, &hb.hydrogen, &hb.acceptor)) {
            new_hydrogen_bonds.push(hb.clone());
        }
    }

    // Symmetry-equivalent copies of each group's internal topology, one set
    // per required instance.
    for instance in &instances {
        for bond in structure.bonds().iter().filter(|b| b.symmetry.is_none()) {
            if structure.group_of_label(&bond.atom1) != Some(instance.group) {
                continue;
            }
            let atom1 = effective(&bond.atom1, &instance.code);
            let atom2 = effective(&bond.atom2, &instance.code);
            if atom1 == atom2 {
                continue; // both endpoints collapsed onto one site
            }
            if seen_bonds.insert(pair_key(&atom1, &atom2)) {
                new_bonds.push(Bond {
                    atom1,
                    atom2,
                    symmetry: SiteSymmetry::None,
                    length: bond.length,
                    length_su: bond.length_su,
                });
            }
        }
        for hb in structure.hydrogen_bonds().iter().filter(|h| h.symmetry.is_none()) {
            if structure.group_of_label(&hb.donor) != Some(instance.group) {
                continue;
            }
            let donor = effective(&hb.donor, &instance.code);
            let hydrogen = effective(&hb.hydrogen, &instance.code);
            let acceptor = effective(&hb.acceptor, &instance.code);
            if donor == acceptor {
                continue;
            }
            if seen_hydrogen_bonds.insert(triple_key(&donor, &hydrogen, &acceptor)) {
                new_hydrogen_bonds.push(HydrogenBond {
                    donor,
                    hydrogen,
                    acceptor,
                    symmetry: SiteSymmetry::None,
                    ..hb.clone()
                });
            }
        }
    }

    // The inter-fragment members of every traversed connection become fully
    // internal bonds between materialized endpoints.
    for connection in &outcome.network {
        for member in &connection.members {
            match *member {
                EdgeMember::Bond(index) => {
                    let bond = &structure.bonds()[index];
                    let atom1 = effective(&bond.atom1, &connection.origin.code);
                    let atom2 = effective(&bond.atom2, &connection.target.code);
                    if atom1 == atom2 {
                        continue;
                    }
                    if seen_bonds.insert(pair_key(&atom1, &atom2)) {
                        new_bonds.push(Bond {
                            atom1,
                            atom2,
                            symmetry: SiteSymmetry::None,
                            length: bond.length,
                            length_su: bond.length_su,
                        });
                    }
                }
                EdgeMember::HydrogenBond(index) => {
                    let hb = &structure.hydrogen_bonds()[index];
                    let donor = effective(&hb.donor, &connection.origin.code);
                    let hydrogen = effective(&hb.hydrogen, &connection.origin.code);
                    let acceptor = effective(&hb.acceptor, &connection.target.code);
                    if donor == acceptor {
                        continue;
                    }
                    if seen_hydrogen_bonds.insert(triple_key(&donor, &hydrogen, &acceptor)) {
                        new_hydrogen_bonds.push(HydrogenBond {
                            donor,
                            hydrogen,
                            acceptor,
                            symmetry: SiteSymmetry::None,
                            ..hb.clone()
                        });
                    }
                }
            }
        }
    }

    // Translation links close rings against atoms that already exist; the
    // composed code becomes the emitted bond's own site symmetry.
    for link in &outcome.translation_links {
        for member in &link.members {
            match *member {
                EdgeMember::Bond(index) => {
                    let bond = &structure.bonds()[index];
                    let atom1 = effective(&bond.atom1, &link.origin.code);
                    let key = pair_key(&atom1, &symmetry_label(&bond.atom2, &link.target.code));
                    if seen_bonds.insert(key) {
                        new_bonds.push(Bond {
                            atom1,
                            atom2: bond.atom2.clone(),
                            symmetry: SiteSymmetry::Code(link.target.code),
                            length: bond.length,
                            length_su: bond.length_su,
                        });
                    }
                }
                EdgeMember::HydrogenBond(index) => {
                    let hb = &structure.hydrogen_bonds()[index];
                    let donor = effective(&hb.donor, &link.origin.code);
                    let hydrogen = effective(&hb.hydrogen, &link.origin.code);
                    let key = triple_key(
                        &donor,
                        &hydrogen,
                        &symmetry_label(&hb.acceptor, &link.target.code),
                    );
                    if seen_hydrogen_bonds.insert(key) {
                        new_hydrogen_bonds.push(HydrogenBond {
                            donor,
                            hydrogen,
                            acceptor: hb.acceptor.clone(),
                            symmetry: SiteSymmetry::Code(link.target.code),
                            ..hb.clone()
                        });
                    }
                }
            }
        }
    }

    // Original symmetry-carrying edges survive verbatim only when no
    // materialized equivalent replaced them (e.g. after a truncated
    // traversal); otherwise the keys above already cover them.
    for bond in structure.bonds() {
        if let Some(code) = bond.symmetry.code() {
            let key = pair_key(&bond.atom1, &effective(&bond.atom2, code));
            if seen_bonds.insert(key) {
                new_bonds.push(bond.clone());
            }
        }
    }
    for hb in structure.hydrogen_bonds() {
        if let Some(code) = hb.symmetry.code() {
            let key = triple_key(&hb.donor, &hb.hydrogen, &effective(&hb.acceptor, code));
            if seen_hydrogen_bonds.insert(key) {
                new_hydrogen_bonds.push(hb.clone());
            }
        }
    }

    for bond in new_bonds {
        if !out.contains_label(&bond.atom1) || !out.contains_label(&bond.atom2) {
            debug!(atom1 = %bond.atom1, atom2 = %bond.atom2, "Dropped bond with unmaterialized endpoint.");
            continue;
        }
        out.add_bond(bond)
            .ok_or_else(|| ExpansionError::Internal("generated bond rejected".to_string()))?;
    }
    for hb in new_hydrogen_bonds {
        if !out.contains_label(&hb.donor)
            || !out.contains_label(&hb.hydrogen)
            || !out.contains_label(&hb.acceptor)
        {
            debug!(donor = %hb.donor, acceptor = %hb.acceptor, "Dropped hydrogen bond with unmaterialized endpoint.");
            continue;
        }
        out.add_hydrogen_bond(hb).ok_or_else(|| {
            ExpansionError::Internal("generated hydrogen bond rejected".to_string())
        })?;
    }

    out.rebuild_connectivity();
    info!(
        instances = instances.len(),
        generated_atoms = generated_count,
        atoms = out.atom_count(),
        bonds = out.bonds().len(),
        hydrogen_bonds = out.hydrogen_bonds().len(),
        "Materialized symmetry expansion."
    );
    Ok(out)
}

/// Every non-identity instance touched by a network connection, in
/// discovery order.
fn collect_required_instances(
    outcome: &TraversalOutcome,
    identity: &SymmetryCode,
) -> Vec<SymmetryInstance> {
    let mut seen = HashSet::new();
    let mut instances = Vec::new();
    for connection in &outcome.network {
        for instance in [connection.origin, connection.target] {
            if instance.code != *identity && seen.insert(instance) {
                instances.push(instance);
            }
        }
    }
    instances
}

/// Applies every required instance to its group's atoms, relabels the
/// copies, and collapses the ones that land on an already-kept copy of the
/// same original atom (special positions). The first-encountered copy wins.
fn generate_atoms<S: SymmetryProvider>(
    structure: &CrystalStructure,
    symmetry: &S,
    instances: &[SymmetryInstance],
    config: &ExpansionConfig,
) -> Result<GeneratedAtoms, ExpansionError> {
    let cell = structure.cell();
    let lengths = cell.lengths();
    let tolerance = config.position_tolerance;
    let coincide = |a: &Point3<f64>, b: &Point3<f64>| {
        (a.x - b.x).abs() < tolerance * lengths[0]
            && (a.y - b.y).abs() < tolerance * lengths[1]
            && (a.z - b.z).abs() < tolerance * lengths[2]
    };

    let mut generated = GeneratedAtoms::default();
    // Kept copies per original atom label: the identity copy plus every
    // generated copy that did not collapse.
    let mut kept_copies: HashMap<String, Vec<(String, Point3<f64>)>> = HashMap::new();

    for instance in instances {
        let group = &structure.connected_groups()[instance.group];
        let base_atoms: Vec<Atom> = group
            .atoms()
            .iter()
            .filter_map(|&id| structure.atom(id))
            .cloned()
            .collect();
        let transformed = symmetry.apply(&instance.code, &base_atoms)?;

        for (base, moved) in base_atoms.iter().zip(transformed) {
            let label = symmetry_label(&base.label, &instance.code);
            let cartesian = moved.position.to_cartesian(cell);
            let copies = kept_copies
                .entry(base.label.clone())
                .or_insert_with(|| vec![(base.label.clone(), base.position.to_cartesian(cell))]);

            if let Some((kept, _)) = copies.iter().find(|(_, at)| coincide(&cartesian, at)) {
                debug!(copy = %label, kept = %kept, "Collapsed special-position duplicate.");
                generated.substitutions.insert(label, kept.clone());
                continue;
            }
            copies.push((label.clone(), cartesian));

            // Already present from an earlier expansion of the same
            // structure; counts as kept but is not re-added.
            if structure.contains_label(&label) {
                continue;
            }
            let mut atom = moved;
            atom.label = label;
            generated.atoms.push(atom);
        }
    }
    Ok(generated)
}

fn pair_key(a: &str, b: &str) -> (String, String) {
    if a <= b {
        (a.to_string(), b.to_string())
    } else {
        (b.to_string(), a.to_string())
    }
}

fn triple_key(a: &str, b: &str, c: &str) -> (String, String, String) {
    let mut labels = [a, b, c];
    labels.sort_unstable();
    (
        labels[0].to_string(),
        labels[1].to_string(),
        labels[2].to_string(),
    )
}
