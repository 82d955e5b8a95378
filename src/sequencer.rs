//! Runs one parallel batch of per-item tweens and reports, exactly once, when the
//! last of them has finished or been cancelled.

use crate::animation::{AnimationError, AnimationEvent, AnimationHandle, Animator, Tween};
use crate::geometry::Point;
use crate::tree::NodeId;
use derive_more::{Display, From, Into};
use std::collections::HashMap;
use strum::Display as StrumDisplay;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Display, From, Into)]
#[display("batch#{_0}")]
pub struct BatchId(usize);

crate::impl_id_newtype!(BatchId);

#[derive(Debug, Clone, Copy, PartialEq, Eq, StrumDisplay)]
#[strum(serialize_all = "kebab-case")]
pub enum BatchKind {
    /// The owner's children fly out of its center.
    Open,
    /// The owner's children fly back into its center.
    Close,
    /// The owner's children other than the expanded branch fly back into its center.
    CollapseSiblings,
}

impl BatchKind {
    pub fn phase(self) -> Phase {
        match self {
            Self::Open => Phase::Opening,
            Self::Close | Self::CollapseSiblings => Phase::Closing,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Phase {
    Opening,
    Closing,
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ChildTask {
    pub node: NodeId,
    pub tween: Tween,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FinishedBatch {
    pub id: BatchId,
    pub owner: NodeId,
    pub kind: BatchKind,
}

/// One item's tween reached a terminal state.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Settled {
    pub node: NodeId,
    pub phase: Phase,
    /// Owner's center at the time the batch started.
    pub center: Point,
    /// Present on the last item of the batch only.
    pub finished: Option<FinishedBatch>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Started {
    Running(BatchId),
    /// Nothing to animate; the batch is already over.
    Finished(FinishedBatch),
}

#[derive(Debug)]
struct Batch {
    owner: NodeId,
    kind: BatchKind,
    center: Point,
    pending: Vec<AnimationHandle>,
}

#[derive(Debug, Default)]
pub struct Sequencer {
    next_batch: usize,
    batches: HashMap<BatchId, Batch>,
    tasks: HashMap<AnimationHandle, (BatchId, NodeId)>,
}

impl Sequencer {
    pub fn new() -> Self {
        Self::default()
    }

    /// Starts every task of a batch. If the engine refuses one, the tasks already
    /// started are cancelled and nothing is recorded.
    pub fn start<A: Animator + ?Sized>(
        &mut self,
        owner: NodeId,
        kind: BatchKind,
        center: Point,
        tasks: Vec<ChildTask>,
        animator: &mut A,
    ) -> Result<Started, AnimationError> {
        let id = BatchId::new(self.next_batch);
        self.next_batch += 1;

        if tasks.is_empty() {
            return Ok(Started::Finished(FinishedBatch { id, owner, kind }));
        }

        let mut started = Vec::with_capacity(tasks.len());
        for task in tasks {
            match animator.animate(task.tween) {
                Ok(handle) => started.push((handle, task.node)),
                Err(e) => {
                    started.iter().for_each(|&(h, _)| animator.cancel(h));
                    return Err(e);
                }
            }
        }

        let pending = started.iter().map(|&(h, _)| h).collect();
        self.tasks
            .extend(started.into_iter().map(|(h, node)| (h, (id, node))));
        self.batches.insert(
            id,
            Batch {
                owner,
                kind,
                center,
                pending,
            },
        );
        log::debug!("{id} ({kind}) started for {owner}");
        Ok(Started::Running(id))
    }

    /// Feeds one engine notification in. Start and repeat only confirm the tween is
    /// alive; end and cancel both release the item.
    pub fn on_event(&mut self, handle: AnimationHandle, event: AnimationEvent) -> Option<Settled> {
        if !event.is_terminal() {
            return None;
        }
        let Some((batch, node)) = self.tasks.remove(&handle) else {
            log::debug!("ignoring {event} for untracked {handle}");
            return None;
        };
        self.settle(batch, handle, node)
    }

    /// Cancels every tween still pending in `id`, settling them in start order.
    pub fn cancel_batch<A: Animator + ?Sized>(
        &mut self,
        id: BatchId,
        animator: &mut A,
    ) -> Vec<Settled> {
        let handles = self
            .batches
            .get(&id)
            .map(|b| b.pending.clone())
            .unwrap_or_default();

        handles
            .into_iter()
            .filter_map(|handle| {
                animator.cancel(handle);
                let (batch, node) = self.tasks.remove(&handle)?;
                self.settle(batch, handle, node)
            })
            .collect()
    }

    fn settle(&mut self, id: BatchId, handle: AnimationHandle, node: NodeId) -> Option<Settled> {
        let batch = self.batches.get_mut(&id)?;
        batch.pending.retain(|&h| h != handle);
        let (phase, center) = (batch.kind.phase(), batch.center);

        let finished = if batch.pending.is_empty() {
            self.batches.remove(&id).map(|b| FinishedBatch {
                id,
                owner: b.owner,
                kind: b.kind,
            })
        } else {
            None
        };

        Some(Settled {
            node,
            phase,
            center,
            finished,
        })
    }

    pub fn batches_owned_by(&self, owner: NodeId) -> Vec<BatchId> {
        let mut ids: Vec<_> = self
            .batches
            .iter()
            .filter(|(_, b)| b.owner == owner)
            .map(|(&id, _)| id)
            .collect();
        ids.sort();
        ids
    }

    /// Batch currently animating `node` as one of its items, if any.
    pub fn batch_animating(&self, node: NodeId) -> Option<BatchId> {
        self.tasks
            .values()
            .find(|&&(_, n)| n == node)
            .map(|&(batch, _)| batch)
    }

    pub fn running(&self) -> Vec<BatchId> {
        let mut ids: Vec<_> = self.batches.keys().copied().collect();
        ids.sort();
        ids
    }

    pub fn pending(&self, id: BatchId) -> usize {
        self.batches.get(&id).map_or(0, |b| b.pending.len())
    }

    pub fn is_idle(&self) -> bool {
        self.batches.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::animation::{Easing, PropertyDeltas};
    use crate::host::ViewId;
    use crate::testing::ManualAnimator;
    use std::time::Duration;

    fn tasks(n: usize) -> Vec<ChildTask> {
        (0..n)
            .map(|i| ChildTask {
                node: NodeId::new(i + 1),
                tween: Tween {
                    target: ViewId::new(i + 1),
                    deltas: PropertyDeltas::opening(Point::new(10, 10)),
                    duration: Duration::from_millis(300),
                    delay: Duration::ZERO,
                    easing: Easing::Overshoot,
                },
            })
            .collect()
    }

    #[test]
    fn test_empty_batch_finishes_immediately() {
        let mut seq = Sequencer::new();
        let mut animator = ManualAnimator::default();

        let started = seq
            .start(NodeId::new(0), BatchKind::Open, Point::default(), vec![], &mut animator)
            .unwrap();

        assert!(matches!(started, Started::Finished(f) if f.owner == NodeId::new(0)));
        assert!(seq.is_idle());
        assert!(animator.started.is_empty());
    }

    #[test]
    fn test_barrier_fires_once_for_any_finish_cancel_mix() {
        for n in 1..7 {
            for mask in 0..(1u32 << n) {
                let mut seq = Sequencer::new();
                let mut animator = ManualAnimator::default();
                let Started::Running(id) = seq
                    .start(
                        NodeId::new(0),
                        BatchKind::Close,
                        Point::default(),
                        tasks(n),
                        &mut animator,
                    )
                    .unwrap()
                else {
                    panic!("batch of {n} should be running");
                };

                let handles = animator.handles();
                let mut finished = 0;
                for (i, &h) in handles.iter().enumerate() {
                    let event = if mask & (1 << i) != 0 {
                        AnimationEvent::Cancel
                    } else {
                        AnimationEvent::End
                    };
                    let settled = seq.on_event(h, event).unwrap();
                    assert_eq!(settled.phase, Phase::Closing);
                    if let Some(done) = settled.finished {
                        assert_eq!(done.id, id);
                        assert_eq!(i, n - 1, "barrier released early");
                        finished += 1;
                    }
                    // A late duplicate must not release anything again.
                    assert!(seq.on_event(h, AnimationEvent::End).is_none());
                }
                assert_eq!(finished, 1);
                assert!(seq.is_idle());
            }
        }
    }

    #[test]
    fn test_start_and_repeat_do_not_release() {
        let mut seq = Sequencer::new();
        let mut animator = ManualAnimator::default();
        seq.start(NodeId::new(0), BatchKind::Open, Point::default(), tasks(2), &mut animator)
            .unwrap();
        let h = animator.handles()[0];

        assert!(seq.on_event(h, AnimationEvent::Start).is_none());
        assert!(seq.on_event(h, AnimationEvent::Repeat).is_none());
        assert_eq!(seq.running().len(), 1);
        assert_eq!(seq.pending(seq.running()[0]), 2);
    }

    #[test]
    fn test_cancel_batch_settles_everything() {
        let mut seq = Sequencer::new();
        let mut animator = ManualAnimator::default();
        let Started::Running(id) = seq
            .start(NodeId::new(0), BatchKind::Open, Point::new(5, 5), tasks(3), &mut animator)
            .unwrap()
        else {
            panic!("expected a running batch");
        };
        let first = animator.handles()[0];
        seq.on_event(first, AnimationEvent::End).unwrap();

        let settled = seq.cancel_batch(id, &mut animator);
        assert_eq!(settled.len(), 2);
        assert!(settled[0].finished.is_none());
        assert_eq!(settled[1].finished.map(|f| f.id), Some(id));
        assert_eq!(animator.cancelled.len(), 2);
        assert!(seq.is_idle());
        assert!(seq.batch_animating(NodeId::new(2)).is_none());
    }

    #[test]
    fn test_refused_tween_rolls_back() {
        let mut seq = Sequencer::new();
        let mut animator = ManualAnimator {
            refuse_after: Some(2),
            ..ManualAnimator::default()
        };

        let result = seq.start(
            NodeId::new(0),
            BatchKind::Open,
            Point::default(),
            tasks(4),
            &mut animator,
        );

        assert!(result.is_err());
        assert_eq!(animator.cancelled, animator.handles());
        assert!(seq.is_idle());
    }
}
