//! Decision-tree builder
//!
//! Turns a [`DecisionGroup`] into a balanced dispatch over fork ids so the
//! emitted callback check costs at most ⌈log_k n⌉ levels of comparisons
//! instead of a linear scan.
//!
//! ```text
//! n == 1          Direct        single comparison, fork id ignored
//! 2 <= n <= k     Match         flat if / else-if over members, else UnknownForkId
//! n > k           Ranges        k contiguous chunks guarded by `forkId <= upper`,
//!                               last chunk is the catch-all; chunks recurse
//! ```
//!
//! Chunk boundaries are the cut positions `⌊i·n/k⌋` for `i = 1..k`, so chunk
//! sizes never differ by more than one.

use crate::error::{AuthError, GenerationError};
use crate::grouping::DecisionGroup;
use std::iter;
use types::ForkId;

/// Branches per level when none is configured
pub const DEFAULT_FAN_OUT: usize = 4;

/// One member of a flat match: fork id and its index in the group
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct MatchArm {
    pub fork_id: ForkId,
    pub entry: usize,
}

/// Range guard: taken when `fork_id <= upper`, or unconditionally when
/// `upper` is `None` (the catch-all)
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RangeBranch {
    pub upper: Option<ForkId>,
    pub node: DispatchNode,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DispatchNode {
    /// Top-level singleton group; the fork id is not inspected
    Direct { entry: usize },
    /// Singleton chunk inside a range; the fork id must match exactly
    Leaf { fork_id: ForkId, entry: usize },
    Match { arms: Vec<MatchArm> },
    Ranges { branches: Vec<RangeBranch> },
}

/// A reachable leaf and the number of dispatch levels above it
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TreeLeaf {
    /// `None` only for a [`DispatchNode::Direct`] root
    pub fork_id: Option<ForkId>,
    pub entry: usize,
    pub depth: usize,
}

impl DispatchNode {
    pub fn depth(&self) -> usize {
        match self {
            Self::Direct { .. } | Self::Leaf { .. } => 0,
            Self::Match { .. } => 1,
            Self::Ranges { branches } => {
                1 + branches
                    .iter()
                    .map(|branch| branch.node.depth())
                    .max()
                    .unwrap_or(0)
            }
        }
    }

    fn resolve(&self, fork_id: ForkId) -> Result<usize, AuthError> {
        let unknown = AuthError::UnknownForkId { fork_id };
        match self {
            Self::Direct { entry } => Ok(*entry),
            Self::Leaf { fork_id: id, entry } if *id == fork_id => Ok(*entry),
            Self::Leaf { .. } => Err(unknown),
            Self::Match { arms } => arms
                .iter()
                .find(|arm| arm.fork_id == fork_id)
                .map(|arm| arm.entry)
                .ok_or(unknown),
            Self::Ranges { branches } => branches
                .iter()
                .find(|branch| branch.upper.map_or(true, |upper| fork_id <= upper))
                .ok_or(unknown)?
                .node
                .resolve(fork_id),
        }
    }

    fn collect_leaves(&self, level: usize, leaves: &mut Vec<TreeLeaf>) {
        match self {
            Self::Direct { entry } => leaves.push(TreeLeaf {
                fork_id: None,
                entry: *entry,
                depth: level,
            }),
            Self::Leaf { fork_id, entry } => leaves.push(TreeLeaf {
                fork_id: Some(*fork_id),
                entry: *entry,
                depth: level,
            }),
            Self::Match { arms } => leaves.extend(arms.iter().map(|arm| TreeLeaf {
                fork_id: Some(arm.fork_id),
                entry: arm.entry,
                depth: level + 1,
            })),
            Self::Ranges { branches } => {
                for branch in branches {
                    branch.node.collect_leaves(level + 1, leaves);
                }
            }
        }
    }
}

/// Balanced dispatch structure over one group's fork ids
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DecisionTree {
    root: DispatchNode,
    fan_out: usize,
}

impl DecisionTree {
    pub fn build(group: &DecisionGroup, fan_out: usize) -> Result<Self, GenerationError> {
        if fan_out < 2 {
            return Err(GenerationError::InvalidFanOut { fan_out });
        }

        let members: Vec<MatchArm> = group
            .fork_ids()
            .enumerate()
            .map(|(entry, fork_id)| MatchArm { fork_id, entry })
            .collect();

        let root = match members.as_slice() {
            [only] => DispatchNode::Direct { entry: only.entry },
            _ => build_node(&members, fan_out),
        };

        Ok(Self { root, fan_out })
    }

    pub fn root(&self) -> &DispatchNode {
        &self.root
    }

    pub fn fan_out(&self) -> usize {
        self.fan_out
    }

    /// Dispatch levels on the longest path to a leaf
    pub fn depth(&self) -> usize {
        self.root.depth()
    }

    /// Group index of the deployment handling `fork_id`
    pub fn resolve(&self, fork_id: ForkId) -> Result<usize, AuthError> {
        self.root.resolve(fork_id)
    }

    pub fn leaves(&self) -> Vec<TreeLeaf> {
        let mut leaves = Vec::new();
        self.root.collect_leaves(0, &mut leaves);
        leaves
    }
}

/// Exclusive end positions of the first `fan_out - 1` chunks of `len` items
pub fn partition_cuts(len: usize, fan_out: usize) -> Vec<usize> {
    (1..fan_out).map(|i| i * len / fan_out).collect()
}

fn build_node(members: &[MatchArm], fan_out: usize) -> DispatchNode {
    if let [only] = members {
        return DispatchNode::Leaf {
            fork_id: only.fork_id,
            entry: only.entry,
        };
    }
    if members.len() <= fan_out {
        return DispatchNode::Match {
            arms: members.to_vec(),
        };
    }

    // n > k keeps every cut strictly increasing, so no chunk is empty
    let mut branches = Vec::with_capacity(fan_out);
    let mut start = 0;
    for end in partition_cuts(members.len(), fan_out)
        .into_iter()
        .chain(iter::once(members.len()))
    {
        let chunk = &members[start..end];
        debug_assert!(!chunk.is_empty());
        start = end;

        let upper = (end < members.len()).then(|| chunk[chunk.len() - 1].fork_id);
        branches.push(RangeBranch {
            upper,
            node: build_node(chunk, fan_out),
        });
    }

    DispatchNode::Ranges { branches }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testing::group_of;

    #[test]
    fn test_quartile_cuts() {
        assert_eq!(partition_cuts(10, 4), [2, 5, 7]);

        let group = group_of(&[0, 1, 2, 3, 5, 8, 13, 21, 55, 89]);
        let tree = DecisionTree::build(&group, 4).unwrap();

        let DispatchNode::Ranges { branches } = tree.root() else {
            panic!("ten members with fan-out 4 should split into ranges");
        };
        let uppers: Vec<_> = branches.iter().map(|branch| branch.upper).collect();
        assert_eq!(
            uppers,
            [Some(ForkId(1)), Some(ForkId(5)), Some(ForkId(13)), None]
        );

        let sizes: Vec<usize> = branches
            .iter()
            .map(|branch| match &branch.node {
                DispatchNode::Match { arms } => arms.len(),
                DispatchNode::Leaf { .. } => 1,
                other => panic!("unexpected chunk node {other:?}"),
            })
            .collect();
        assert_eq!(sizes, [2, 3, 2, 3]);
        assert_eq!(tree.depth(), 2);
    }

    #[test]
    fn test_singleton_group_has_no_dispatch() {
        let tree = DecisionTree::build(&group_of(&[42]), 4).unwrap();
        assert_eq!(tree.root(), &DispatchNode::Direct { entry: 0 });
        assert_eq!(tree.depth(), 0);
        // The fork id is not consulted for a direct comparison
        assert_eq!(tree.resolve(ForkId(7)), Ok(0));
    }

    #[test]
    fn test_small_group_is_flat_match() {
        let tree = DecisionTree::build(&group_of(&[0, 3, 9]), 4).unwrap();
        assert!(matches!(tree.root(), DispatchNode::Match { arms } if arms.len() == 3));
        assert_eq!(tree.depth(), 1);
        assert_eq!(tree.resolve(ForkId(3)), Ok(1));
        assert_eq!(
            tree.resolve(ForkId(4)),
            Err(AuthError::UnknownForkId { fork_id: ForkId(4) })
        );
    }

    #[test]
    fn test_singleton_chunks_still_check_fork_id() {
        // Five members, fan-out 4: chunks of 1, 1, 1, 2
        let tree = DecisionTree::build(&group_of(&[10, 20, 30, 40, 50]), 4).unwrap();
        let DispatchNode::Ranges { branches } = tree.root() else {
            panic!("expected ranges");
        };
        assert_eq!(
            branches[0].node,
            DispatchNode::Leaf {
                fork_id: ForkId(10),
                entry: 0
            }
        );
        // 5 falls into the first range but is not a member
        assert_eq!(
            tree.resolve(ForkId(5)),
            Err(AuthError::UnknownForkId { fork_id: ForkId(5) })
        );
        assert_eq!(tree.resolve(ForkId(50)), Ok(4));
    }

    #[test]
    fn test_large_chunks_recurse() {
        let forks: Vec<u8> = (0..17).collect();
        let tree = DecisionTree::build(&group_of(&forks), 4).unwrap();
        assert_eq!(tree.depth(), 3);

        let leaves = tree.leaves();
        assert_eq!(leaves.len(), 17);
        for fork in forks {
            assert_eq!(tree.resolve(ForkId(fork)), Ok(usize::from(fork)));
        }
    }

    #[test]
    fn test_fan_out_below_two_is_rejected() {
        let err = DecisionTree::build(&group_of(&[0, 1]), 1).unwrap_err();
        assert_eq!(err, GenerationError::InvalidFanOut { fan_out: 1 });
    }
}
