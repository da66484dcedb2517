use super::error::ExpansionError;
use crate::core::models::structure::CrystalStructure;
use crate::core::symmetry::code::SymmetryCode;
use itertools::Itertools;

/// One atom-pair member of a connecting edge, referencing the structure's
/// bond or hydrogen-bond list so the member keeps its own geometry values.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub(crate) enum EdgeMember {
    Bond(usize),
    HydrogenBond(usize),
}

/// An aggregated symmetry-crossing connection out of one group: all the
/// atom-pair bonds/H-bonds that lead from the origin group to the same
/// target group through the same symmetry code.
#[derive(Debug, Clone, PartialEq)]
pub(crate) struct SeedConnection {
    pub target_group: usize,
    pub symmetry: SymmetryCode,
    pub members: Vec<EdgeMember>,
}

/// Scans every bond/H-bond whose site symmetry is not `"."` and groups them
/// by `(origin group, target group, code)` into seed connections, indexed
/// by origin group.
///
/// An edge whose two endpoints resolve to the same group is a valid
/// intra-group symmetry connection (an atom bonded to its own image) and is
/// treated like any other seed.
///
/// # Errors
///
/// [`ExpansionError::UnresolvedLabel`] when an endpoint belongs to no
/// connectivity group — the cached partition is stale or the input is
/// inconsistent, and the whole expansion is aborted.
pub(crate) fn build_seed_connections(
    structure: &CrystalStructure,
) -> Result<Vec<Vec<SeedConnection>>, ExpansionError> {
    let resolve = |label: &str| -> Result<usize, ExpansionError> {
        structure
            .group_of_label(label)
            .ok_or_else(|| ExpansionError::UnresolvedLabel {
                label: label.to_string(),
            })
    };

    let mut edges: Vec<((usize, usize, SymmetryCode), EdgeMember)> = Vec::new();
    for (index, bond) in structure.bonds().iter().enumerate() {
        if let Some(code) = bond.symmetry.code() {
            let origin = resolve(&bond.atom1)?;
            let target = resolve(&bond.atom2)?;
            edges.push(((origin, target, *code), EdgeMember::Bond(index)));
        }
    }
    for (index, hb) in structure.hydrogen_bonds().iter().enumerate() {
        if let Some(code) = hb.symmetry.code() {
            let origin = resolve(&hb.donor)?;
            let target = resolve(&hb.acceptor)?;
            edges.push(((origin, target, *code), EdgeMember::HydrogenBond(index)));
        }
    }

    let mut seeds: Vec<Vec<SeedConnection>> = vec![Vec::new(); structure.connected_groups().len()];
    for ((origin, target, symmetry), members) in edges
        .into_iter()
        .into_group_map()
        .into_iter()
        .sorted_by_key(|(key, _)| *key)
    {
        seeds[origin].push(SeedConnection {
            target_group: target,
            symmetry,
            members,
        });
    }
    Ok(seeds)
}
