use super::config::ExpansionConfig;
use super::connectivity::{EdgeMember, SeedConnection};
use super::error::ExpansionError;
use crate::core::symmetry::code::{OpId, SymmetryCode};
use crate::core::symmetry::ops::SymmetryProvider;
use std::collections::{HashMap, HashSet, VecDeque};
use tracing::{debug, warn};

/// One "copy" of a connectivity group: the group index plus the absolute
/// symmetry code that places it.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub(crate) struct SymmetryInstance {
    pub group: usize,
    pub code: SymmetryCode,
}

/// A traversed (or translation-linked) connection between two group
/// instances, with the atom-pair members it aggregates. Creation-origin
/// tagging only matters while the traversal is running (duplicate
/// detection is scoped per origin), so the resolved record does not carry
/// it.
#[derive(Debug, Clone, PartialEq)]
pub(crate) struct ResolvedConnection {
    pub origin: SymmetryInstance,
    pub target: SymmetryInstance,
    pub members: Vec<EdgeMember>,
}

/// Result of the breadth-first exploration: the connections to materialize,
/// the translation links that close rings without growing the lattice, and
/// whether the iteration cap cut the traversal short.
#[derive(Debug, Clone, Default, PartialEq)]
pub(crate) struct TraversalOutcome {
    pub network: Vec<ResolvedConnection>,
    pub translation_links: Vec<ResolvedConnection>,
    pub truncated: bool,
}

/// Canonical identity of a connection: the unordered pair of its endpoint
/// instances, so that discovering the same edge from either side (or along
/// the inverse path) produces the same key.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
struct ConnectionKey {
    lo: SymmetryInstance,
    hi: SymmetryInstance,
}

impl ConnectionKey {
    fn new(a: SymmetryInstance, b: SymmetryInstance) -> Self {
        if b < a { Self { lo: b, hi: a } } else { Self { lo: a, hi: b } }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
struct InstanceKey {
    group: usize,
    op: OpId,
}

/// The instances discovered along paths starting from one creation origin.
/// Keyed by `(group, operation)`; the stored translations are the ones
/// already materialized, so a new translation for a known key is a
/// translational duplicate.
#[derive(Debug, Clone, Default)]
struct DiscoveredInstances {
    map: HashMap<InstanceKey, Vec<[i8; 3]>>,
}

impl DiscoveredInstances {
    fn record(&mut self, instance: &SymmetryInstance) {
        let key = InstanceKey {
            group: instance.group,
            op: instance.code.op(),
        };
        let translations = self.map.entry(key).or_default();
        let translation = instance.code.translation();
        if !translations.contains(&translation) {
            translations.push(translation);
        }
    }

    fn is_translational_duplicate(&self, instance: &SymmetryInstance, identity_op: OpId) -> bool {
        // A pure lattice translation of the asymmetric unit is always
        // redundant: the identity copies of every group already exist.
        if instance.code.op() == identity_op && instance.code.has_translation() {
            return true;
        }
        let key = InstanceKey {
            group: instance.group,
            op: instance.code.op(),
        };
        self.map
            .get(&key)
            .is_some_and(|translations| !translations.contains(&instance.code.translation()))
    }
}

#[derive(Debug, Clone, Copy)]
struct PendingConnection {
    creation_origin: usize,
    origin: SymmetryInstance,
    target: SymmetryInstance,
    seed_index: usize,
}

/// Breadth-first exploration of the symmetry-crossing connection graph.
///
/// Starting from every seed connection (origin symmetry = identity), each
/// processed edge discovers the absolute instance it leads to and fans out
/// over that group's own seed connections. An edge whose target is a
/// translational duplicate of an instance already discovered for the same
/// creation origin is filed as a translation link instead of being
/// enqueued — this is what keeps the traversal from tiling the lattice.
///
/// The iteration cap is a safety valve: on exceeding it the traversal stops
/// and returns the partial network with `truncated` set, which the caller
/// reports but still materializes.
pub(crate) fn create_connectivity<S: SymmetryProvider>(
    symmetry: &S,
    seeds: &[Vec<SeedConnection>],
    config: &ExpansionConfig,
) -> Result<TraversalOutcome, ExpansionError> {
    let identity = symmetry.identity_code();
    let identity_op = symmetry.identity_op();

    let mut processed: HashSet<ConnectionKey> = HashSet::new();
    let mut discovered: Vec<DiscoveredInstances> =
        (0..seeds.len()).map(|_| DiscoveredInstances::default()).collect();
    let mut queue: VecDeque<PendingConnection> = VecDeque::new();
    let mut outcome = TraversalOutcome::default();

    // Seed the queue. Every seed edge leaves its group's identity instance.
    for (group, connections) in seeds.iter().enumerate() {
        let origin = SymmetryInstance { group, code: identity };
        for (seed_index, seed) in connections.iter().enumerate() {
            let target = SymmetryInstance {
                group: seed.target_group,
                code: symmetry.combine(&seed.symmetry, &origin.code)?,
            };
            if !processed.insert(ConnectionKey::new(origin, target)) {
                continue;
            }
            if discovered[group].is_translational_duplicate(&target, identity_op) {
                outcome.translation_links.push(ResolvedConnection {
                    origin,
                    target,
                    members: seed.members.clone(),
                });
            } else {
                queue.push_back(PendingConnection {
                    creation_origin: group,
                    origin,
                    target,
                    seed_index,
                });
            }
        }
    }

    let mut iterations = 0usize;
    while let Some(pending) = queue.pop_front() {
        if iterations >= config.max_iterations {
            outcome.truncated = true;
            warn!(
                cap = config.max_iterations,
                pending = queue.len() + 1,
                "Symmetry traversal hit its iteration cap; returning a partial expansion."
            );
            break;
        }
        iterations += 1;

        let members = seeds[pending.origin.group][pending.seed_index].members.clone();
        discovered[pending.creation_origin].record(&pending.target);
        let reached = pending.target;
        outcome.network.push(ResolvedConnection {
            origin: pending.origin,
            target: reached,
            members,
        });

        for (next_index, next) in seeds[reached.group].iter().enumerate() {
            let next_target = SymmetryInstance {
                group: next.target_group,
                code: symmetry.combine(&next.symmetry, &reached.code)?,
            };
            if !processed.insert(ConnectionKey::new(reached, next_target)) {
                continue;
            }
            if discovered[pending.creation_origin]
                .is_translational_duplicate(&next_target, identity_op)
            {
                debug!(
                    group = next_target.group,
                    code = %next_target.code,
                    "Filed translational duplicate as a link."
                );
                outcome.translation_links.push(ResolvedConnection {
                    origin: reached,
                    target: next_target,
                    members: next.members.clone(),
                });
            } else {
                queue.push_back(PendingConnection {
                    creation_origin: pending.creation_origin,
                    origin: reached,
                    target: next_target,
                    seed_index: next_index,
                });
            }
        }
    }

    Ok(outcome)
}
