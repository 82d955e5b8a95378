use crate::animation::{
    AnimationEvent, AnimationHandle, Animator, Easing, HINT_DURATION, PropertyDeltas, Tween,
};
use crate::error::MenuError;
use crate::geometry::{ArcSpan, Point};
use crate::host::{Host, ViewId, view_center};
use crate::layout;
use crate::sequencer::{BatchId, BatchKind, FinishedBatch, Sequencer, Settled, Started};
use crate::style::{MenuStyle, RadiusPolicy};
use crate::tree::{MenuNode, NodeId, Status, Tree};
use async_channel::{Receiver, Sender};
use derive_more::Display;
use std::collections::{HashMap, VecDeque};
use std::time::Duration;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Transition {
    #[default]
    Animated,
    Instant,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Display)]
pub enum MenuEvent {
    #[display("{_0} opened")]
    Opened(NodeId),
    #[display("{_0} closed")]
    Closed(NodeId),
    /// A leaf item was toggled.
    #[display("{_0} selected")]
    Selected(NodeId),
}

/// A radial menu tree plus the state machine that opens and closes its rings.
///
/// Everything runs on the thread that owns the menu. Tween progress comes back
/// through [`Menu::on_animation_event`]; state changes go out to subscribers
/// over channels, so a listener can never re-enter a transition half way.
pub struct Menu<H, A> {
    host: H,
    animator: Option<A>,
    tree: Tree,
    sequencer: Sequencer,
    style: MenuStyle,
    /// Nodes still waiting to close once the keyed batch is done, deepest first.
    close_chains: HashMap<BatchId, VecDeque<NodeId>>,
    listeners: Vec<Sender<MenuEvent>>,
    /// Set while tearing down: follow-up transitions snap instead of animating.
    halting: bool,
}

impl<H: Host, A: Animator> Menu<H, A> {
    pub fn new(host: H, root_view: ViewId, style: MenuStyle) -> Self {
        let size = host.measure(root_view);
        let tree = Tree::new(MenuNode::new(root_view, size, &style.arc));
        Self {
            host,
            animator: None,
            tree,
            sequencer: Sequencer::new(),
            style,
            close_chains: HashMap::new(),
            listeners: Vec::new(),
            halting: false,
        }
    }

    pub fn with_animator(mut self, animator: A) -> Self {
        self.animator = Some(animator);
        self
    }

    pub fn root(&self) -> NodeId {
        self.tree.root()
    }

    pub fn tree(&self) -> &Tree {
        &self.tree
    }

    pub fn node(&self, id: NodeId) -> Result<&MenuNode, MenuError> {
        self.tree.get(id)
    }

    pub fn status(&self, id: NodeId) -> Result<Status, MenuError> {
        Ok(self.tree.get(id)?.status())
    }

    pub fn host(&self) -> &H {
        &self.host
    }

    pub fn host_mut(&mut self) -> &mut H {
        &mut self.host
    }

    pub fn animator(&self) -> Option<&A> {
        self.animator.as_ref()
    }

    pub fn animator_mut(&mut self) -> Option<&mut A> {
        self.animator.as_mut()
    }

    pub fn style(&self) -> &MenuStyle {
        &self.style
    }

    pub fn is_animating(&self) -> bool {
        !self.sequencer.is_idle()
    }

    /// Registers a listener for open/close/select notifications.
    pub fn subscribe(&mut self) -> Receiver<MenuEvent> {
        let (tx, rx) = async_channel::unbounded();
        self.listeners.push(tx);
        rx
    }

    fn notify(&mut self, event: MenuEvent) {
        log::info!("{event}");
        self.listeners.retain(|tx| tx.try_send(event).is_ok());
    }

    fn center_of(&self, id: NodeId) -> Result<Point, MenuError> {
        Ok(view_center(&self.host, self.tree.get(id)?.view))
    }

    fn default_transition(&self) -> Transition {
        if self.style.motion.animate {
            Transition::Animated
        } else {
            Transition::Instant
        }
    }

    fn require_animator(&self, transition: Transition) -> Result<(), MenuError> {
        match (transition, &self.animator) {
            (Transition::Animated, None) => Err(MenuError::NoAnimator),
            _ => Ok(()),
        }
    }

    /// Measures `view` and registers it as the last child of `parent`.
    pub fn add_item(&mut self, parent: NodeId, view: ViewId) -> Result<NodeId, MenuError> {
        let size = self.host.measure(view);
        let id = self
            .tree
            .insert_child(parent, MenuNode::new(view, size, &self.style.arc))?;
        if self.status(parent)? == Status::Open {
            self.relayout(parent)?;
        }
        Ok(id)
    }

    /// Drops `id` and its subtree. In-flight work touching it is cancelled first.
    pub fn remove_item(&mut self, id: NodeId) -> Result<(), MenuError> {
        if id == self.tree.root() {
            return Err(MenuError::RootRemoval);
        }
        let parent = self.tree.get(id)?.parent();
        let doomed = self.tree.post_order(id)?;

        self.halting = true;
        let halted = self.halt_subtree(id, &doomed);
        self.halting = false;
        halted?;

        for &gone in &doomed {
            let view = self.tree.get(gone)?.view;
            if self.host.is_attached(view) {
                self.host.reset_transform(view);
                self.host.detach(view);
            }
        }
        self.tree.remove_subtree(id)?;

        if let Some(parent) = parent
            && self.status(parent)? == Status::Open
        {
            self.relayout(parent)?;
        }
        Ok(())
    }

    fn halt_subtree(&mut self, id: NodeId, doomed: &[NodeId]) -> Result<(), MenuError> {
        for &node in doomed {
            self.cancel(node)?;
        }
        if let Some(batch) = self.sequencer.batch_animating(id) {
            self.cancel_batch(batch)?;
        }
        Ok(())
    }

    pub fn set_angle_range(&mut self, id: NodeId, start: f64, end: f64) -> Result<(), MenuError> {
        let arc = ArcSpan::new(start, end);
        let node = self.tree.get_mut(id)?;
        if node.arc == arc {
            return Ok(());
        }
        node.arc = arc;
        self.relayout_if_open(id)
    }

    pub fn set_radius(&mut self, id: NodeId, radius: i32) -> Result<(), MenuError> {
        self.set_radius_policy(id, RadiusPolicy::Fixed(radius))
    }

    pub fn set_radius_policy(&mut self, id: NodeId, policy: RadiusPolicy) -> Result<(), MenuError> {
        let node = self.tree.get_mut(id)?;
        if node.radius_policy == policy {
            return Ok(());
        }
        node.radius_policy = policy;
        self.relayout_if_open(id)
    }

    fn relayout_if_open(&mut self, id: NodeId) -> Result<(), MenuError> {
        match self.status(id)? {
            Status::Open => self.relayout(id),
            // A running batch restores onto the fresh positions when it settles.
            Status::Playing => {
                let center = self.center_of(id)?;
                layout::calculate(&mut self.tree, id, center)
            }
            Status::Closed => Ok(()),
        }
    }

    /// Recomputes the ring of an open node and moves its visible children in place.
    fn relayout(&mut self, id: NodeId) -> Result<(), MenuError> {
        let center = self.center_of(id)?;
        layout::calculate(&mut self.tree, id, center)?;

        // While one branch is expanded the rest of the ring stays folded away.
        let show_all = !self.tree.has_active_child(id)?;
        let children = self.tree.get(id)?.children().to_vec();
        for child in children {
            let node = self.tree.get(child)?;
            let (view, frame, status, active) =
                (node.view, node.target_frame(), node.status(), node.active);
            if self.host.is_attached(view) {
                self.host.set_frame(view, frame);
                if status == Status::Open {
                    self.relayout(child)?;
                }
            } else if show_all && !active {
                self.host.attach(view, frame)?;
            }
        }
        Ok(())
    }

    /// Opens or closes `id` with the style's default transition. Toggling a leaf
    /// selects it; toggling a node mid-transition is ignored.
    pub fn toggle(&mut self, id: NodeId) -> Result<(), MenuError> {
        let transition = self.default_transition();
        let node = self.tree.get(id)?;
        if node.is_leaf() {
            self.notify(MenuEvent::Selected(id));
            return Ok(());
        }
        match node.status() {
            Status::Playing => {
                log::debug!("ignoring toggle of {id} while it is playing");
                Ok(())
            }
            Status::Open => self.close(id, transition),
            Status::Closed => self.open(id, transition),
        }
    }

    pub fn open(&mut self, id: NodeId, transition: Transition) -> Result<(), MenuError> {
        self.require_animator(transition)?;
        let node = self.tree.get(id)?;
        if node.is_leaf() {
            return Ok(());
        }
        if node.status() != Status::Closed {
            log::debug!("ignoring open of {id}: already {}", node.status());
            return Ok(());
        }

        let (parent, view) = (node.parent(), node.view);
        if let Some(parent) = parent {
            let parent_status = self.status(parent)?;
            if parent_status != Status::Open {
                log::debug!("ignoring open of {id}: parent {parent} is {parent_status}");
                return Ok(());
            }
            let sibling_expanded = self
                .tree
                .siblings(id)?
                .into_iter()
                .any(|s| self.tree.get(s).is_ok_and(|n| n.active));
            if sibling_expanded {
                log::debug!("ignoring open of {id}: a sibling branch is expanded");
                return Ok(());
            }
            // Folded away by an earlier sibling collapse; there is no button to fan out from.
            if !self.host.is_attached(view) {
                log::debug!("ignoring open of {id}: {view} is not shown");
                return Ok(());
            }
        }

        let center = self.center_of(id)?;
        layout::calculate(&mut self.tree, id, center)?;

        match transition {
            Transition::Instant => self.open_instant(id, parent),
            Transition::Animated => self.open_animated(id, parent, center),
        }
    }

    fn open_instant(&mut self, id: NodeId, parent: Option<NodeId>) -> Result<(), MenuError> {
        layout::place_instant(&self.tree, id, &mut self.host)?;
        self.tree.get_mut(id)?.active = true;
        self.tree.set_status(id, Status::Open)?;
        self.notify(MenuEvent::Opened(id));

        if let Some(parent) = parent {
            let center = self.center_of(parent)?;
            layout::collapse_instant(&self.tree, parent, center, &mut self.host)?;
            self.settle_collapsed(parent)?;
        }
        Ok(())
    }

    fn open_animated(
        &mut self,
        id: NodeId,
        parent: Option<NodeId>,
        center: Point,
    ) -> Result<(), MenuError> {
        let attached = layout::attach_at_center(&self.tree, id, center, &mut self.host)?;
        self.tree.get_mut(id)?.active = true;
        self.tree.set_status(id, Status::Playing)?;

        let tasks = layout::opening_tasks(&self.tree, id, center, &self.style.motion)?;
        let animator = self.animator.as_mut().ok_or(MenuError::NoAnimator)?;
        let started = match self
            .sequencer
            .start(id, BatchKind::Open, center, tasks, animator)
        {
            Ok(started) => started,
            Err(e) => {
                layout::detach_all(&self.tree, &attached, &mut self.host);
                self.tree.get_mut(id)?.active = false;
                self.tree.set_status(id, Status::Closed)?;
                return Err(e.into());
            }
        };

        self.hint(id, true);
        if let Started::Finished(done) = started {
            self.finish_batch(done)?;
        }
        if let Some(parent) = parent {
            self.collapse_siblings(parent)?;
        }
        Ok(())
    }

    /// Folds every child of `parent` except the expanded branch back into `parent`.
    fn collapse_siblings(&mut self, parent: NodeId) -> Result<(), MenuError> {
        let center = self.center_of(parent)?;
        let tasks =
            layout::closing_tasks(&self.tree, parent, center, &self.style.motion, &self.host)?;
        self.tree.set_status(parent, Status::Playing)?;

        let animator = self.animator.as_mut().ok_or(MenuError::NoAnimator)?;
        match self
            .sequencer
            .start(parent, BatchKind::CollapseSiblings, center, tasks, animator)
        {
            Ok(Started::Running(_)) => Ok(()),
            Ok(Started::Finished(done)) => self.finish_batch(done),
            Err(e) => {
                log::warn!("Failed to animate sibling collapse of {parent}: {e}");
                layout::collapse_instant(&self.tree, parent, center, &mut self.host)?;
                self.settle_collapsed(parent)?;
                Err(e.into())
            }
        }
    }

    /// Closes `id` and every open submenu below it, deepest first.
    pub fn close(&mut self, id: NodeId, transition: Transition) -> Result<(), MenuError> {
        self.require_animator(transition)?;
        let node = self.tree.get(id)?;
        if node.is_leaf() {
            return Ok(());
        }
        if node.status() != Status::Open {
            log::debug!("ignoring close of {id}: already {}", node.status());
            return Ok(());
        }
        if let Some(parent) = node.parent()
            && self.status(parent)? == Status::Playing
        {
            log::debug!("ignoring close of {id}: parent {parent} is playing");
            return Ok(());
        }

        let subtree = self.tree.post_order(id)?;
        let mut chain = VecDeque::new();
        for node in subtree {
            match self.status(node)? {
                Status::Playing => {
                    log::debug!("ignoring close of {id}: {node} is playing");
                    return Ok(());
                }
                Status::Open => chain.push_back(node),
                Status::Closed => {}
            }
        }

        match transition {
            Transition::Instant => {
                for node in chain {
                    self.close_instant(node)?;
                }
                Ok(())
            }
            Transition::Animated => {
                for &node in &chain {
                    self.tree.set_status(node, Status::Playing)?;
                }
                self.hint(id, false);
                self.continue_close(chain)
            }
        }
    }

    fn close_instant(&mut self, id: NodeId) -> Result<(), MenuError> {
        let center = self.center_of(id)?;
        layout::collapse_instant(&self.tree, id, center, &mut self.host)?;
        self.tree.get_mut(id)?.active = false;
        if self.tree.set_status(id, Status::Closed)? == Status::Closed {
            self.notify(MenuEvent::Closed(id));
        }
        Ok(())
    }

    /// Starts the close batch of the next node in `chain`; the rest waits for it.
    fn continue_close(&mut self, mut chain: VecDeque<NodeId>) -> Result<(), MenuError> {
        while let Some(id) = chain.pop_front() {
            if !self.tree.contains(id) {
                continue;
            }
            if self.halting {
                self.close_instant(id)?;
                continue;
            }

            let center = self.center_of(id)?;
            let tasks =
                layout::closing_tasks(&self.tree, id, center, &self.style.motion, &self.host)?;
            let animator = self.animator.as_mut().ok_or(MenuError::NoAnimator)?;
            match self
                .sequencer
                .start(id, BatchKind::Close, center, tasks, animator)
            {
                Ok(Started::Running(batch)) => {
                    if !chain.is_empty() {
                        self.close_chains.insert(batch, chain);
                    }
                    return Ok(());
                }
                Ok(Started::Finished(done)) => self.finish_batch(done)?,
                Err(e) => {
                    log::error!("Failed to animate close of {id}: {e}");
                    self.close_instant(id)?;
                    for rest in chain {
                        if self.tree.contains(rest) {
                            self.close_instant(rest)?;
                        }
                    }
                    return Err(e.into());
                }
            }
        }
        Ok(())
    }

    fn settle_collapsed(&mut self, parent: NodeId) -> Result<(), MenuError> {
        if self.tree.set_status(parent, Status::Closed)? == Status::Closed {
            self.notify(MenuEvent::Closed(parent));
        }
        Ok(())
    }

    fn hint(&mut self, id: NodeId, expanding: bool) {
        if !self.style.motion.hint_rotation {
            return;
        }
        let (Ok(node), Some(animator)) = (self.tree.get(id), self.animator.as_mut()) else {
            return;
        };
        let tween = Tween {
            target: node.view,
            deltas: PropertyDeltas::hint(expanding),
            duration: HINT_DURATION,
            delay: Duration::ZERO,
            easing: Easing::Decelerate,
        };
        if let Err(e) = animator.animate(tween) {
            log::warn!("Failed to start hint rotation of {id}: {e}");
        }
    }

    /// Feeds one notification from the animation engine into the menu.
    pub fn on_animation_event(
        &mut self,
        handle: AnimationHandle,
        event: AnimationEvent,
    ) -> Result<(), MenuError> {
        match self.sequencer.on_event(handle, event) {
            Some(settled) => self.apply_settled(settled),
            None => Ok(()),
        }
    }

    fn apply_settled(&mut self, settled: Settled) -> Result<(), MenuError> {
        if self.tree.contains(settled.node) {
            layout::restore(
                &self.tree,
                settled.node,
                settled.phase,
                settled.center,
                &mut self.host,
            )?;
        }
        match settled.finished {
            Some(done) => self.finish_batch(done),
            None => Ok(()),
        }
    }

    fn finish_batch(&mut self, done: FinishedBatch) -> Result<(), MenuError> {
        let chain = self.close_chains.remove(&done.id);
        log::debug!("{} ({}) finished for {}", done.id, done.kind, done.owner);

        if self.tree.contains(done.owner) {
            match done.kind {
                BatchKind::Open => {
                    if self.tree.set_status(done.owner, Status::Open)? == Status::Open {
                        self.notify(MenuEvent::Opened(done.owner));
                    }
                }
                BatchKind::CollapseSiblings => self.settle_collapsed(done.owner)?,
                BatchKind::Close => {
                    self.tree.get_mut(done.owner)?.active = false;
                    if self.tree.set_status(done.owner, Status::Closed)? == Status::Closed {
                        self.notify(MenuEvent::Closed(done.owner));
                    }
                }
            }
        }

        match chain {
            Some(rest) => self.continue_close(rest),
            None => Ok(()),
        }
    }

    /// Cancels the batches `id` owns. Items settle where their tweens were heading
    /// and the node leaves PLAYING as if the batch had finished.
    pub fn cancel(&mut self, id: NodeId) -> Result<(), MenuError> {
        self.tree.get(id)?;
        for batch in self.sequencer.batches_owned_by(id) {
            self.cancel_batch(batch)?;
        }
        Ok(())
    }

    fn cancel_batch(&mut self, batch: BatchId) -> Result<(), MenuError> {
        let Some(animator) = self.animator.as_mut() else {
            return Ok(());
        };
        let settled = self.sequencer.cancel_batch(batch, animator);
        for item in settled {
            self.apply_settled(item)?;
        }
        Ok(())
    }

    /// Cancels everything in flight and folds the whole tree away without animating.
    /// Call this before abandoning the container.
    pub fn teardown(&mut self) -> Result<(), MenuError> {
        self.halting = true;
        let result = self.halt_all();
        self.halting = false;
        result
    }

    fn halt_all(&mut self) -> Result<(), MenuError> {
        for batch in self.sequencer.running() {
            self.cancel_batch(batch)?;
        }
        let root = self.tree.root();
        for node in self.tree.post_order(root)? {
            if self.status(node)? != Status::Closed {
                self.close_instant(node)?;
            }
        }
        Ok(())
    }
}
