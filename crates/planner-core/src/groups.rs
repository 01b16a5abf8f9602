//! Group mixing: pick one clip per group and sequence the picks.
//!
//! Strict mode walks groups in ascending `order` and round-robins members
//! across the variant index. Random mode shuffles both and retries a
//! bounded number of times to avoid a clip order already accepted in the
//! batch.

use std::collections::{BTreeSet, HashMap, HashSet};

use rand::seq::SliceRandom;
use rand::Rng;

use remix_common::{RemixError, RemixResult};
use remix_model::{Clip, ClipId, DuplicatePolicy, GroupMixingMode, GroupSpec};

/// A group together with the indices of its member clips.
#[derive(Debug, Clone, PartialEq)]
pub struct ResolvedGroup {
    pub group: GroupSpec,
    pub members: Vec<usize>,
}

/// Groups of a request, in strict sequencing order.
#[derive(Debug, Clone, PartialEq)]
pub struct GroupLayout {
    groups: Vec<ResolvedGroup>,
}

impl GroupLayout {
    /// Bind clips to groups.
    ///
    /// With no declared groups, groups are derived from the clips' `groupId`s
    /// in first-appearance order. Clips without a group do not take part.
    pub fn resolve(clips: &[Clip], declared: &[GroupSpec]) -> RemixResult<Self> {
        let entries: Vec<GroupSpec> = if declared.is_empty() {
            derive_groups(clips)
        } else {
            let mut seen = HashSet::new();
            for group in declared {
                if !seen.insert(group.id.as_str()) {
                    return Err(RemixError::configuration(format!(
                        "group '{}' is declared more than once",
                        group.id
                    )));
                }
            }
            declared.to_vec()
        };

        if entries.is_empty() {
            return Err(RemixError::insufficient_input(
                "group mixing is enabled but no groups exist",
            ));
        }

        let position: HashMap<&str, usize> = entries
            .iter()
            .enumerate()
            .map(|(i, g)| (g.id.as_str(), i))
            .collect();
        let mut members: Vec<Vec<usize>> = vec![vec![]; entries.len()];

        for (clip_index, clip) in clips.iter().enumerate() {
            let Some(group_id) = clip.group_id.as_deref() else {
                continue;
            };
            let Some(&slot) = position.get(group_id) else {
                return Err(RemixError::configuration(format!(
                    "clip '{}' references undeclared group '{group_id}'",
                    clip.id
                )));
            };
            members[slot].push(clip_index);
        }

        if let Some(empty) = entries
            .iter()
            .zip(&members)
            .find(|(_, m)| m.is_empty())
            .map(|(g, _)| g)
        {
            return Err(RemixError::insufficient_input(format!(
                "group '{}' has no clips",
                empty.id
            )));
        }

        let mut groups: Vec<ResolvedGroup> = entries
            .into_iter()
            .zip(members)
            .map(|(group, members)| ResolvedGroup { group, members })
            .collect();
        groups.sort_by(|a, b| {
            a.group
                .order
                .cmp(&b.group.order)
                .then_with(|| a.group.id.cmp(&b.group.id))
        });

        Ok(Self { groups })
    }

    pub fn groups(&self) -> &[ResolvedGroup] {
        &self.groups
    }

    pub fn len(&self) -> usize {
        self.groups.len()
    }

    pub fn is_empty(&self) -> bool {
        self.groups.is_empty()
    }
}

fn derive_groups(clips: &[Clip]) -> Vec<GroupSpec> {
    let mut seen = HashSet::new();
    clips
        .iter()
        .filter_map(|c| c.group_id.as_deref())
        .filter(|g| seen.insert(*g))
        .enumerate()
        .map(|(i, g)| GroupSpec::new(g, i as i32))
        .collect()
}

/// Outcome of one group selection.
#[derive(Debug, Clone, PartialEq)]
pub struct GroupSelection {
    /// Chosen clip indices in play order, one per group.
    pub clip_indices: Vec<usize>,

    /// Random mode ran out of attempts and accepted an order seen before.
    pub duplicate: bool,
}

/// Picks clips for group mixing.
#[derive(Debug, Clone)]
pub struct GroupSelector {
    layout: GroupLayout,
    mode: GroupMixingMode,
    attempts: usize,
    policy: DuplicatePolicy,
}

impl GroupSelector {
    pub fn new(
        layout: GroupLayout,
        mode: GroupMixingMode,
        attempts: usize,
        policy: DuplicatePolicy,
    ) -> Self {
        Self {
            layout,
            mode,
            attempts: attempts.max(1),
            policy,
        }
    }

    pub fn layout(&self) -> &GroupLayout {
        &self.layout
    }

    /// Select the clip order for the variant at `global_index`.
    ///
    /// `accepted` holds the clip orders already accepted by random mode and
    /// is extended with the new one.
    pub fn select<R: Rng + ?Sized>(
        &self,
        global_index: usize,
        clips: &[Clip],
        rng: &mut R,
        accepted: &mut BTreeSet<Vec<ClipId>>,
    ) -> RemixResult<GroupSelection> {
        match self.mode {
            GroupMixingMode::Strict => Ok(GroupSelection {
                clip_indices: self.select_strict(global_index),
                duplicate: false,
            }),
            GroupMixingMode::Random => self.select_random(global_index, clips, rng, accepted),
        }
    }

    fn select_strict(&self, global_index: usize) -> Vec<usize> {
        self.layout
            .groups
            .iter()
            .map(|g| g.members[global_index % g.members.len()])
            .collect()
    }

    fn select_random<R: Rng + ?Sized>(
        &self,
        global_index: usize,
        clips: &[Clip],
        rng: &mut R,
        accepted: &mut BTreeSet<Vec<ClipId>>,
    ) -> RemixResult<GroupSelection> {
        let mut candidate = vec![];

        for attempt in 0..self.attempts {
            let mut groups: Vec<&ResolvedGroup> = self.layout.groups.iter().collect();
            groups.shuffle(rng);
            candidate = groups
                .iter()
                .filter_map(|g| g.members.choose(rng).copied())
                .collect();

            let key = clip_ids(&candidate, clips);
            if accepted.insert(key) {
                tracing::trace!(global_index, attempt, "Accepted random group selection");
                return Ok(GroupSelection {
                    clip_indices: candidate,
                    duplicate: false,
                });
            }
        }

        match self.policy {
            DuplicatePolicy::Accept => Ok(GroupSelection {
                clip_indices: candidate,
                duplicate: true,
            }),
            DuplicatePolicy::FailBatch => Err(RemixError::insufficient_input(format!(
                "random group mixing found no unused combination for variant {} after {} attempts",
                global_index + 1,
                self.attempts
            ))),
        }
    }
}

fn clip_ids(indices: &[usize], clips: &[Clip]) -> Vec<ClipId> {
    indices.iter().map(|&i| clips[i].id.clone()).collect()
}
