use crate::core::models::structure::CrystalStructure;
use crate::engine::config::ExpansionConfig;
use crate::engine::connectivity::build_seed_connections;
use crate::engine::error::ExpansionError;
use crate::engine::materialize;
use crate::engine::traversal::create_connectivity;
use tracing::{info, instrument};

/// Grows a structure's asymmetric unit into a chemically complete local
/// neighborhood: every symmetry-crossing bond/H-bond is resolved into
/// materialized symmetry-equivalent atoms and fully internal bonds, while
/// translational duplicates are closed with completion bonds instead of
/// tiling the lattice.
///
/// The input is never mutated; the returned structure contains the union of
/// the original and the generated atoms/bonds/H-bonds, with generated
/// labels following the `"<label>@<code>"` convention. The call is safe to
/// repeat: once no unresolved symmetry-crossing edges remain, the output
/// equals the input.
///
/// # Errors
///
/// [`ExpansionError::UnresolvedLabel`] when an edge references a label that
/// no connectivity group covers (stale partition or mistyped input), and
/// [`ExpansionError::Symmetry`] when a code falls outside the structure's
/// operator table. Hitting the traversal iteration cap is *not* an error:
/// the expansion is truncated, logged, and still materialized.
#[instrument(skip_all, name = "grow_symmetry")]
pub fn grow_symmetry(
    structure: &CrystalStructure,
    config: &ExpansionConfig,
) -> Result<CrystalStructure, ExpansionError> {
    let seeds = build_seed_connections(structure)?;
    let outcome = create_connectivity(structure.space_group(), &seeds, config)?;
    info!(
        network = outcome.network.len(),
        translation_links = outcome.translation_links.len(),
        truncated = outcome.truncated,
        "Resolved symmetry connection network."
    );
    materialize::grow(structure, structure.space_group(), &outcome, config)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::models::atom::Atom;
    use crate::core::models::cell::UnitCell;
    use crate::core::models::position::Position;
    use crate::core::models::topology::{Bond, HydrogenBond};
    use crate::core::symmetry::code::{OpId, SiteSymmetry};
    use crate::core::symmetry::ops::SpaceGroup;
    use nalgebra::Vector3;
    use std::collections::HashSet;

    fn inversion_group() -> SpaceGroup {
        SpaceGroup::from_operators("P -1", &["x, y, z", "-x, -y, -z"]).unwrap()
    }

    fn new_structure() -> CrystalStructure {
        let cell = UnitCell::new(10.0, 10.0, 10.0, 90.0, 90.0, 90.0).unwrap();
        CrystalStructure::new(cell, inversion_group())
    }

    fn add(structure: &mut CrystalStructure, label: &str, element: &str, frac: [f64; 3]) {
        structure
            .add_atom(Atom::new(
                label,
                element,
                Position::Fractional(Vector3::new(frac[0], frac[1], frac[2])),
            ))
            .unwrap();
    }

    fn bond(structure: &mut CrystalStructure, a: &str, b: &str, symmetry: &str) {
        structure
            .add_bond(Bond::new(a, b, symmetry.parse::<SiteSymmetry>().unwrap()))
            .unwrap();
    }

    fn labels(structure: &CrystalStructure) -> HashSet<String> {
        structure
            .atoms_iter()
            .map(|(_, atom)| atom.label.clone())
            .collect()
    }

    fn assert_no_duplicate_bonds(structure: &CrystalStructure) {
        let mut seen = HashSet::new();
        for bond in structure.bonds() {
            let key = if bond.atom1 <= bond.atom2 {
                (bond.atom1.clone(), bond.atom2.clone(), bond.symmetry)
            } else {
                (bond.atom2.clone(), bond.atom1.clone(), bond.symmetry)
            };
            assert!(seen.insert(key), "duplicate bond {bond:?}");
        }
    }

    #[test]
    fn single_symmetry_bond_materializes_the_partner_image() {
        let mut structure = new_structure();
        add(&mut structure, "C1", "C", [0.1, 0.1, 0.1]);
        add(&mut structure, "N1", "N", [0.2, 0.2, 0.2]);
        bond(&mut structure, "C1", "N1", "2_555");
        structure.rebuild_connectivity();

        let grown = grow_symmetry(&structure, &ExpansionConfig::default()).unwrap();

        assert_eq!(
            labels(&grown),
            HashSet::from(["C1".to_string(), "N1".to_string(), "N1@2_555".to_string()])
        );
        assert_eq!(grown.bonds().len(), 1);
        let bond = &grown.bonds()[0];
        assert_eq!(bond.atom1, "C1");
        assert_eq!(bond.atom2, "N1@2_555");
        assert!(bond.symmetry.is_none());

        // The image sits at the inverted coordinate.
        let id = grown.find_atom_by_label("N1@2_555").unwrap();
        let frac = *grown.atom(id).unwrap().position.fractional().unwrap();
        assert!((frac - Vector3::new(-0.2, -0.2, -0.2)).norm() < 1e-12);
        assert_no_duplicate_bonds(&grown);
    }

    #[test]
    fn self_symmetry_bond_materializes_own_image() {
        let mut structure = new_structure();
        add(&mut structure, "C1", "C", [0.1, 0.15, 0.2]);
        bond(&mut structure, "C1", "C1", "2_555");
        structure.rebuild_connectivity();

        let grown = grow_symmetry(&structure, &ExpansionConfig::default()).unwrap();

        assert_eq!(
            labels(&grown),
            HashSet::from(["C1".to_string(), "C1@2_555".to_string()])
        );
        assert_eq!(grown.bonds().len(), 1);
        assert_eq!(grown.bonds()[0].atom1, "C1");
        assert_eq!(grown.bonds()[0].atom2, "C1@2_555");
        assert!(grown.bonds()[0].symmetry.is_none());
    }

    #[test]
    fn translation_differing_inverse_closes_with_completion_bonds() {
        let mut structure = new_structure();
        add(&mut structure, "C1", "C", [0.1, 0.1, 0.1]);
        add(&mut structure, "N1", "N", [0.2, 0.2, 0.2]);
        bond(&mut structure, "C1", "N1", "2_555");
        bond(&mut structure, "N1", "C1", "2_565");
        structure.rebuild_connectivity();

        let grown = grow_symmetry(&structure, &ExpansionConfig::default()).unwrap();

        // Both directions generate exactly one image each; the lattice-
        // shifted rediscoveries must not become third and fourth atoms.
        assert_eq!(
            labels(&grown),
            HashSet::from([
                "C1".to_string(),
                "N1".to_string(),
                "N1@2_555".to_string(),
                "C1@2_565".to_string(),
            ])
        );

        let internal: Vec<_> = grown
            .bonds()
            .iter()
            .filter(|b| b.symmetry.is_none())
            .collect();
        assert_eq!(internal.len(), 2);

        // Ring closure happens through bonds whose own site symmetry is the
        // composed pure-translation code, pointing at existing atoms.
        let completions: Vec<_> = grown
            .bonds()
            .iter()
            .filter_map(|b| b.symmetry.code().map(|code| (b, code)))
            .collect();
        assert_eq!(completions.len(), 2);
        for (bond, code) in completions {
            assert_eq!(code.op(), OpId::new(1));
            assert!(code.has_translation());
            assert!(grown.contains_label(&bond.atom1));
            assert!(grown.contains_label(&bond.atom2));
        }
        assert_no_duplicate_bonds(&grown);
    }

    #[test]
    fn special_position_copy_collapses_onto_the_original() {
        let mut structure = new_structure();
        add(&mut structure, "C1", "C", [0.1, 0.1, 0.1]);
        add(&mut structure, "O1", "O", [0.0, 0.0, 0.0]); // inversion center
        bond(&mut structure, "C1", "O1", "2_555");
        structure.rebuild_connectivity();

        let grown = grow_symmetry(&structure, &ExpansionConfig::default()).unwrap();

        // O1's image coincides with O1 itself; exactly one copy survives
        // and the generated bond references the kept label.
        assert_eq!(
            labels(&grown),
            HashSet::from(["C1".to_string(), "O1".to_string()])
        );
        assert_eq!(grown.bonds().len(), 1);
        assert_eq!(grown.bonds()[0].atom1, "C1");
        assert_eq!(grown.bonds()[0].atom2, "O1");
        assert!(grown.bonds()[0].symmetry.is_none());
    }

    #[test]
    fn external_hydrogen_bond_is_rewritten_internal() {
        let mut structure = new_structure();
        add(&mut structure, "O1", "O", [0.1, 0.1, 0.1]);
        add(&mut structure, "H1", "H", [0.15, 0.1, 0.1]);
        add(&mut structure, "O2", "O", [0.3, 0.3, 0.3]);
        bond(&mut structure, "O1", "H1", ".");
        structure
            .add_hydrogen_bond(HydrogenBond::new(
                "O1",
                "H1",
                "O2",
                "2_555".parse::<SiteSymmetry>().unwrap(),
            ))
            .unwrap();
        structure.rebuild_connectivity();

        let grown = grow_symmetry(&structure, &ExpansionConfig::default()).unwrap();

        assert!(grown.contains_label("O2@2_555"));
        assert_eq!(grown.hydrogen_bonds().len(), 1);
        let hb = &grown.hydrogen_bonds()[0];
        assert_eq!(hb.donor, "O1");
        assert_eq!(hb.hydrogen, "H1");
        assert_eq!(hb.acceptor, "O2@2_555");
        assert!(hb.symmetry.is_none());
    }

    #[test]
    fn growth_is_idempotent_once_fully_resolved() {
        let mut structure = new_structure();
        add(&mut structure, "C1", "C", [0.1, 0.1, 0.1]);
        add(&mut structure, "N1", "N", [0.2, 0.2, 0.2]);
        bond(&mut structure, "C1", "N1", "2_555");
        structure.rebuild_connectivity();

        let once = grow_symmetry(&structure, &ExpansionConfig::default()).unwrap();
        let twice = grow_symmetry(&once, &ExpansionConfig::default()).unwrap();

        assert_eq!(labels(&once), labels(&twice));
        assert_eq!(once.bonds().len(), twice.bonds().len());
        assert_eq!(once.hydrogen_bonds().len(), twice.hydrogen_bonds().len());
    }

    #[test]
    fn repeated_growth_is_stable_with_translation_links() {
        let mut structure = new_structure();
        add(&mut structure, "C1", "C", [0.1, 0.1, 0.1]);
        add(&mut structure, "N1", "N", [0.2, 0.2, 0.2]);
        bond(&mut structure, "C1", "N1", "2_555");
        bond(&mut structure, "N1", "C1", "2_565");
        structure.rebuild_connectivity();

        let once = grow_symmetry(&structure, &ExpansionConfig::default()).unwrap();
        let twice = grow_symmetry(&once, &ExpansionConfig::default()).unwrap();

        // Completion bonds stay completion bonds; nothing new materializes.
        assert_eq!(labels(&once), labels(&twice));
        assert_eq!(once.bonds().len(), twice.bonds().len());
    }

    #[test]
    fn exhausted_iteration_cap_still_returns_a_structure() {
        let mut structure = new_structure();
        add(&mut structure, "C1", "C", [0.1, 0.1, 0.1]);
        add(&mut structure, "N1", "N", [0.2, 0.2, 0.2]);
        bond(&mut structure, "C1", "N1", "2_555");
        structure.rebuild_connectivity();

        let config = ExpansionConfig {
            max_iterations: 0,
            ..ExpansionConfig::default()
        };
        let grown = grow_symmetry(&structure, &config).unwrap();

        // Nothing was traversed, so nothing materializes; the unresolved
        // symmetry bond survives verbatim.
        assert_eq!(grown.atom_count(), 2);
        assert_eq!(grown.bonds().len(), 1);
        assert!(!grown.bonds()[0].symmetry.is_none());
    }

    #[test]
    fn stale_connectivity_aborts_the_expansion() {
        let mut structure = new_structure();
        add(&mut structure, "C1", "C", [0.1, 0.1, 0.1]);
        structure.rebuild_connectivity();
        add(&mut structure, "N1", "N", [0.2, 0.2, 0.2]);
        bond(&mut structure, "C1", "N1", "2_555");

        let err = grow_symmetry(&structure, &ExpansionConfig::default()).unwrap_err();
        assert!(matches!(err, ExpansionError::UnresolvedLabel { label } if label == "N1"));
    }

    #[test]
    fn multi_member_bridge_materializes_every_member_bond() {
        let mut structure = new_structure();
        add(&mut structure, "C1", "C", [0.10, 0.10, 0.10]);
        add(&mut structure, "C2", "C", [0.15, 0.10, 0.10]);
        add(&mut structure, "N1", "N", [0.30, 0.30, 0.30]);
        add(&mut structure, "N2", "N", [0.35, 0.30, 0.30]);
        bond(&mut structure, "C1", "C2", ".");
        bond(&mut structure, "N1", "N2", ".");
        bond(&mut structure, "C1", "N1", "2_555");
        bond(&mut structure, "C2", "N2", "2_555");
        structure.rebuild_connectivity();

        let grown = grow_symmetry(&structure, &ExpansionConfig::default()).unwrap();

        assert!(grown.contains_label("N1@2_555"));
        assert!(grown.contains_label("N2@2_555"));
        // The image fragment also carries a copy of its internal bond.
        let pair = |a: &str, b: &str| {
            grown
                .bonds()
                .iter()
                .any(|bond| bond.references(a) && bond.references(b))
        };
        assert!(pair("C1", "N1@2_555"));
        assert!(pair("C2", "N2@2_555"));
        assert!(pair("N1@2_555", "N2@2_555"));
        assert_no_duplicate_bonds(&grown);
    }
}
