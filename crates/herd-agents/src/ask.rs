//! Iteration protocols that stay correct while the callback mutates the
//! set being iterated.
//!
//! Every protocol is generic over a context `C` that owns the set (an
//! [`AgentSet`] itself, or a whole model) and a `view` accessor that
//! finds the set inside it. The callback receives `&mut C` and the
//! current id; ids are copied out before each call, so the callback may
//! create, kill or re-breed agents freely.
//!
//! | Protocol | Visits |
//! |---|---|
//! | [`for_loop`] | indices `0..len` as they stand; no protection |
//! | [`ask`] | members in order, never past the last id present at the start |
//! | [`base_set_ask`] | like [`ask`], resuming after the current id if it was removed |
//! | [`clone_ask`] | a snapshot, skipping agents that died or left the breed |
//!
//! [`ask_set`] picks the protocol for a scope.

use herd_core::AgentId;
use tracing::warn;

use crate::agent_set::{AgentSet, Scope};

/// Plain indexed loop over the members of `scope`.
///
/// Intended for sets whose membership does not change during the loop.
pub fn for_loop<C, S>(
    ctx: &mut C,
    view: impl Fn(&C) -> &AgentSet<S>,
    scope: Scope,
    mut f: impl FnMut(&mut C, AgentId),
) {
    let len = view(ctx).len(scope);
    for i in 0..len {
        let Some(&id) = view(ctx).members(scope).get(i) else {
            break;
        };
        f(ctx, id);
    }
}

/// Visit members in order, stopping at the last id present when the ask
/// began. Agents created by the callback are not visited.
///
/// Removing the current member or an earlier one shifts the rest down,
/// so the next member is skipped; this is logged as a warning. Use
/// [`base_set_ask`] or [`clone_ask`] when the callback removes agents.
pub fn ask<C, S>(
    ctx: &mut C,
    view: impl Fn(&C) -> &AgentSet<S>,
    scope: Scope,
    mut f: impl FnMut(&mut C, AgentId),
) {
    let Some(&last) = view(ctx).members(scope).last() else {
        return;
    };
    let mut i = 0;
    while let Some(&id) = view(ctx).members(scope).get(i) {
        if id > last {
            break;
        }
        f(ctx, id);
        let members = view(ctx).members(scope);
        if members.get(i) != Some(&id) {
            warn!(
                set = view(ctx).name(),
                %id,
                index = i,
                len = members.len(),
                "members removed during ask; later members may be skipped"
            );
        }
        i += 1;
    }
}

/// Base-set ask that tracks the current id.
///
/// If the callback removed the current agent (or any before it), the
/// index is rewound to the first member after it, so no survivor is
/// skipped and none is visited twice.
pub fn base_set_ask<C, S>(
    ctx: &mut C,
    view: impl Fn(&C) -> &AgentSet<S>,
    mut f: impl FnMut(&mut C, AgentId),
) {
    let Some(&last) = view(ctx).members(Scope::Base).last() else {
        return;
    };
    let mut i = 0;
    while let Some(&id) = view(ctx).members(Scope::Base).get(i) {
        if id > last {
            break;
        }
        f(ctx, id);
        let members = view(ctx).members(Scope::Base);
        if members.get(i) == Some(&id) {
            i += 1;
        } else {
            let resume = members.partition_point(|&m| m <= id);
            warn!(
                set = view(ctx).name(),
                %id,
                index = i,
                resume,
                len = members.len(),
                "members removed during ask; resuming after current id"
            );
            i = resume;
        }
    }
}

/// Ask over a snapshot of the members of `scope`.
///
/// Snapshot members that died, or left the breed, before their turn are
/// skipped. Members added during the ask are not visited.
pub fn clone_ask<C, S>(
    ctx: &mut C,
    view: impl Fn(&C) -> &AgentSet<S>,
    scope: Scope,
    mut f: impl FnMut(&mut C, AgentId),
) {
    let snapshot = view(ctx).members(scope).to_vec();
    for id in snapshot {
        if view(ctx).contains(scope, id) {
            f(ctx, id);
        }
    }
}

/// Dispatch to the protocol for `scope`: [`for_loop`] over a fixed
/// set's base, [`base_set_ask`] over any other base, [`clone_ask`] over
/// a breed.
pub fn ask_set<C, S>(
    ctx: &mut C,
    view: impl Fn(&C) -> &AgentSet<S>,
    scope: Scope,
    f: impl FnMut(&mut C, AgentId),
) {
    match scope {
        Scope::Base if view(ctx).is_fixed() => for_loop(ctx, view, scope, f),
        Scope::Base => base_set_ask(ctx, view, f),
        Scope::Breed(_) => clone_ask(ctx, view, scope, f),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    fn set_of(n: usize) -> AgentSet<u32> {
        let mut set = AgentSet::new("turtles");
        for i in 0..n {
            set.add_agent(Scope::Base, i as u32).unwrap();
        }
        set
    }

    fn ids(v: &[u32]) -> Vec<AgentId> {
        v.iter().map(|&i| AgentId(i)).collect()
    }

    #[test]
    fn ask_skips_agents_created_during_loop() {
        let mut set = set_of(3);
        let mut seen = Vec::new();
        set.ask(Scope::Base, |s, id| {
            seen.push(id);
            s.add_agent(Scope::Base, 0).unwrap();
        });
        assert_eq!(seen, ids(&[0, 1, 2]));
        assert_eq!(set.len(Scope::Base), 6);
    }

    #[test]
    fn ask_survives_self_removal() {
        let mut set = set_of(5);
        let mut seen = Vec::new();
        set.ask(Scope::Base, |s, id| {
            seen.push(id);
            if id.0 % 2 == 1 {
                s.remove_agent(id);
            }
        });
        assert_eq!(seen, ids(&[0, 1, 2, 3, 4]));
        assert_eq!(set.members(Scope::Base).as_slice(), ids(&[0, 2, 4]).as_slice());
    }

    #[test]
    fn ask_survives_removal_of_earlier_members() {
        let mut set = set_of(6);
        let mut seen = Vec::new();
        set.ask(Scope::Base, |s, id| {
            seen.push(id);
            if id == AgentId(3) {
                s.remove_agent(AgentId(0));
                s.remove_agent(AgentId(1));
                s.remove_agent(AgentId(3));
            }
        });
        assert_eq!(seen, ids(&[0, 1, 2, 3, 4, 5]));
    }

    #[test]
    fn removal_of_later_member_is_not_visited() {
        let mut set = set_of(4);
        let mut seen = Vec::new();
        set.ask(Scope::Base, |s, id| {
            seen.push(id);
            if id == AgentId(0) {
                s.remove_agent(AgentId(2));
            }
        });
        assert_eq!(seen, ids(&[0, 1, 3]));
    }

    #[test]
    fn breed_ask_skips_rebred_members() {
        let mut set: AgentSet<u32> = AgentSet::new("turtles");
        let a = set.new_breed("a");
        let b = set.new_breed("b");
        for _ in 0..4 {
            set.add_agent(Scope::Breed(a), 0).unwrap();
        }
        let mut seen = Vec::new();
        set.ask(Scope::Breed(a), |s, id| {
            seen.push(id);
            if id == AgentId(0) {
                s.set_breed(AgentId(2), Some(b)).unwrap();
                s.add_agent(Scope::Breed(a), 0).unwrap();
            }
        });
        assert_eq!(seen, ids(&[0, 1, 3]));
        assert_eq!(set.len(Scope::Breed(a)), 4);
    }

    #[test]
    fn plain_ask_skips_successor_of_removed_member() {
        let mut set = set_of(4);
        let mut seen = Vec::new();
        ask(&mut set, |s| s, Scope::Base, |s, id| {
            seen.push(id);
            if id == AgentId(1) {
                s.remove_agent(id);
            }
        });
        assert_eq!(seen, ids(&[0, 1, 3]));
    }

    #[test]
    fn base_set_ask_rewinds_after_removal() {
        let mut set = set_of(4);
        let mut seen = Vec::new();
        base_set_ask(&mut set, |s| s, |s, id| {
            seen.push(id);
            if id == AgentId(1) {
                s.remove_agent(AgentId(0));
                s.remove_agent(id);
            }
        });
        assert_eq!(seen, ids(&[0, 1, 2, 3]));
        assert_eq!(set.members(Scope::Base).as_slice(), ids(&[2, 3]).as_slice());
    }

    #[test]
    fn breed_ask_skips_members_that_died() {
        let mut set: AgentSet<u32> = AgentSet::new("turtles");
        let a = set.new_breed("a");
        for _ in 0..5 {
            set.add_agent(Scope::Breed(a), 0).unwrap();
        }
        let mut seen = Vec::new();
        clone_ask(&mut set, |s| s, Scope::Breed(a), |s, id| {
            seen.push(id);
            if id == AgentId(1) {
                s.remove_agent(AgentId(3));
                s.remove_agent(id);
            }
        });
        assert_eq!(seen, ids(&[0, 1, 2, 4]));
        assert_eq!(set.members(Scope::Breed(a)).as_slice(), ids(&[0, 2, 4]).as_slice());
        assert_eq!(set.members(Scope::Base).as_slice(), ids(&[0, 2, 4]).as_slice());
    }

    #[test]
    fn fixed_set_uses_plain_loop() {
        let mut set: AgentSet<u32> = AgentSet::new_fixed("patches");
        for _ in 0..3 {
            set.add_agent(Scope::Base, 0).unwrap();
        }
        set.ask(Scope::Base, |s, id| {
            if let Some(v) = s.state_mut(id) {
                *v += 1;
            }
        });
        assert!(set.members(Scope::Base).all(|&id| set.state(id) == Some(&1)));
    }

    #[test]
    fn last_id_guard_on_breed_scope() {
        let mut set: AgentSet<u32> = AgentSet::new("turtles");
        let a = set.new_breed("a");
        set.add_agent(Scope::Breed(a), 0).unwrap();
        set.add_agent(Scope::Breed(a), 0).unwrap();
        let mut visits = 0;
        ask(&mut set, |s| s, Scope::Breed(a), |s, _| {
            visits += 1;
            s.add_agent(Scope::Breed(a), 0).unwrap();
        });
        assert_eq!(visits, 2);
    }

    proptest! {
        #[test]
        fn every_original_member_visited_once_under_append(n in 0usize..40, spawn in 0u32..3) {
            let mut set = set_of(n);
            let mut seen = Vec::new();
            set.ask(Scope::Base, |s, id| {
                seen.push(id);
                for _ in 0..spawn {
                    s.add_agent(Scope::Base, 0).unwrap();
                }
            });
            prop_assert_eq!(seen, (0..n as u32).map(AgentId).collect::<Vec<_>>());
        }

        #[test]
        fn survivors_visited_once_under_removal(
            n in 1usize..40,
            kill in prop::collection::vec(any::<bool>(), 40),
        ) {
            let mut set = set_of(n);
            let mut seen = Vec::new();
            set.ask(Scope::Base, |s, id| {
                seen.push(id);
                if kill[id.index() % kill.len()] {
                    s.remove_agent(id);
                }
            });
            prop_assert_eq!(seen, (0..n as u32).map(AgentId).collect::<Vec<_>>());
        }
    }
}
