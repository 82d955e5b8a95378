use crate::animation::{PropertyDeltas, Tween};
use crate::error::MenuError;
use crate::geometry::{Point, Rect, Size, calculate_item_positions, compute_radius};
use crate::host::Host;
use crate::sequencer::{ChildTask, Phase};
use crate::style::{MotionStyle, RadiusPolicy};
use crate::tree::{NodeId, Tree};

/// Where an item rests while folded into its parent: straddling the parent's center.
pub fn rest_frame(center: Point, size: Size) -> Rect {
    Rect::centered_at(center, size)
}

fn resolve_radius(policy: RadiusPolicy, button: Size, sizes: &[Size], sweep: f64) -> i32 {
    match policy {
        RadiusPolicy::Fixed(radius) => radius,
        RadiusPolicy::Auto {
            min_radius,
            child_padding,
        } => {
            let item = sizes
                .iter()
                .map(|s| s.width.max(s.height))
                .max()
                .unwrap_or(0);
            let floor = min_radius.unwrap_or(button.width / 2 + item);
            compute_radius(sweep, sizes.len(), item, child_padding, floor)
        }
    }
}

/// Resolves the ring radius of `id` and stores every child's target top-left.
/// A node without children has nothing to lay out.
pub fn calculate(tree: &mut Tree, id: NodeId, center: Point) -> Result<(), MenuError> {
    let node = tree.get(id)?;
    if node.is_leaf() {
        return Ok(());
    }

    let children = node.children().to_vec();
    let arc = node.arc.normalized();
    let (policy, button) = (node.radius_policy, node.size);
    let sizes = children
        .iter()
        .map(|&c| tree.get(c).map(|n| n.size))
        .collect::<Result<Vec<_>, _>>()?;

    let radius = resolve_radius(policy, button, &sizes, arc.sweep().abs());
    let positions = calculate_item_positions(&sizes, center, radius, arc);

    tree.get_mut(id)?.radius = radius;
    for (child, position) in children.into_iter().zip(positions) {
        tree.get_mut(child)?.position = position;
    }
    Ok(())
}

/// Children of `id` that take part in a bulk transition.
fn sweepable(tree: &Tree, id: NodeId) -> Result<Vec<(usize, NodeId)>, MenuError> {
    let node = tree.get(id)?;
    let mut out = Vec::with_capacity(node.children().len());
    for (i, &child) in node.children().iter().enumerate() {
        if !tree.get(child)?.active {
            out.push((i, child));
        }
    }
    Ok(out)
}

/// Moves every child straight onto its frame, attaching the ones not yet shown.
pub fn place_instant<H: Host + ?Sized>(
    tree: &Tree,
    id: NodeId,
    host: &mut H,
) -> Result<(), MenuError> {
    for (_, child) in sweepable(tree, id)? {
        let node = tree.get(child)?;
        if host.is_attached(node.view) {
            host.set_frame(node.view, node.target_frame());
        } else {
            host.attach(node.view, node.target_frame())?;
        }
    }
    Ok(())
}

/// Attaches every child at the parent's center so the open animation springs outward.
///
/// Fails without touching the container if any of those children is already attached.
pub fn attach_at_center<H: Host + ?Sized>(
    tree: &Tree,
    id: NodeId,
    center: Point,
    host: &mut H,
) -> Result<Vec<NodeId>, MenuError> {
    let children = sweepable(tree, id)?;
    for &(_, child) in &children {
        let view = tree.get(child)?.view;
        if host.is_attached(view) {
            return Err(MenuError::AlreadyAttached { node: child, view });
        }
    }

    let mut attached = Vec::with_capacity(children.len());
    for (_, child) in children {
        let node = tree.get(child)?;
        if let Err(e) = host.attach(node.view, rest_frame(center, node.size)) {
            detach_all(tree, &attached, host);
            return Err(e.into());
        }
        attached.push(child);
    }
    Ok(attached)
}

pub fn detach_all<H: Host + ?Sized>(tree: &Tree, nodes: &[NodeId], host: &mut H) {
    for node in nodes.iter().filter_map(|&n| tree.get(n).ok()) {
        host.detach(node.view);
    }
}

pub fn opening_tasks(
    tree: &Tree,
    id: NodeId,
    center: Point,
    motion: &MotionStyle,
) -> Result<Vec<ChildTask>, MenuError> {
    let count = tree.get(id)?.children().len();
    sweepable(tree, id)?
        .into_iter()
        .map(|(i, child)| {
            let node = tree.get(child)?;
            let delta = node.position - rest_frame(center, node.size).origin;
            Ok(ChildTask {
                node: child,
                tween: Tween {
                    target: node.view,
                    deltas: PropertyDeltas::opening(delta),
                    duration: motion.duration(),
                    delay: motion.stagger(count, i),
                    easing: motion.open_easing,
                },
            })
        })
        .collect()
}

/// Tweens folding the visible, inactive children of `id` back into `center`.
pub fn closing_tasks<H: Host + ?Sized>(
    tree: &Tree,
    id: NodeId,
    center: Point,
    motion: &MotionStyle,
    host: &H,
) -> Result<Vec<ChildTask>, MenuError> {
    let count = tree.get(id)?.children().len();
    let mut tasks = Vec::new();
    for (i, child) in sweepable(tree, id)? {
        let node = tree.get(child)?;
        if !host.is_attached(node.view) {
            continue;
        }
        let delta = rest_frame(center, node.size).origin - node.position;
        tasks.push(ChildTask {
            node: child,
            tween: Tween {
                target: node.view,
                deltas: PropertyDeltas::closing(delta),
                duration: motion.duration(),
                delay: motion.stagger(count, i),
                easing: motion.close_easing,
            },
        });
    }
    Ok(tasks)
}

/// Clears the transient transform of one item and pins its static frame to where
/// the finished (or cancelled) tween was heading.
pub fn restore<H: Host + ?Sized>(
    tree: &Tree,
    node: NodeId,
    phase: Phase,
    center: Point,
    host: &mut H,
) -> Result<(), MenuError> {
    let item = tree.get(node)?;
    host.reset_transform(item.view);
    match phase {
        Phase::Opening => host.set_frame(item.view, item.target_frame()),
        Phase::Closing => {
            host.set_frame(item.view, rest_frame(center, item.size));
            host.detach(item.view);
        }
    }
    Ok(())
}

/// Detaches the visible, inactive children of `id` without animating.
pub fn collapse_instant<H: Host + ?Sized>(
    tree: &Tree,
    id: NodeId,
    center: Point,
    host: &mut H,
) -> Result<(), MenuError> {
    for (_, child) in sweepable(tree, id)? {
        if host.is_attached(tree.get(child)?.view) {
            restore(tree, child, Phase::Closing, center, host)?;
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::geometry::ArcSpan;
    use crate::host::{Container, ViewId};
    use crate::style::ArcStyle;
    use crate::testing::MockHost;
    use crate::tree::MenuNode;

    fn tree_with_items(count: usize, style: &ArcStyle) -> Tree {
        let mut tree = Tree::new(MenuNode::new(ViewId::new(0), Size::square(80), style));
        for i in 1..=count {
            tree.insert_child(
                tree.root(),
                MenuNode::new(ViewId::new(i), Size::square(48), style),
            )
            .unwrap();
        }
        tree
    }

    #[test]
    fn test_calculate_fixed_radius() {
        let mut tree = tree_with_items(6, &ArcStyle::default());
        let root = tree.root();
        calculate(&mut tree, root, Point::new(500, 900)).unwrap();

        let first = tree.child(root, 0).unwrap();
        assert_eq!(tree.get(root).unwrap().radius, 250);
        assert_eq!(tree.get(first).unwrap().position, Point::new(250 - 24, 900 - 24));
    }

    #[test]
    fn test_calculate_auto_radius_uses_floor() {
        let style = ArcStyle {
            radius: None,
            ..ArcStyle::default()
        };
        let mut tree = tree_with_items(1, &style);
        let root = tree.root();
        calculate(&mut tree, root, Point::new(0, 0)).unwrap();

        // Half the button plus one item.
        assert_eq!(tree.get(root).unwrap().radius, 40 + 48);
    }

    #[test]
    fn test_calculate_leaf_is_noop() {
        let mut tree = tree_with_items(0, &ArcStyle::default());
        let root = tree.root();
        calculate(&mut tree, root, Point::new(10, 10)).unwrap();
        assert_eq!(tree.get(root).unwrap().radius, 250);
    }

    #[test]
    fn test_open_deltas_land_on_targets() {
        let mut tree = tree_with_items(4, &ArcStyle::default());
        let root = tree.root();
        tree.get_mut(root).unwrap().arc = ArcSpan::new(0.0, 360.0);
        let center = Point::new(333, 777);
        calculate(&mut tree, root, center).unwrap();

        let tasks = opening_tasks(&tree, root, center, &MotionStyle::default()).unwrap();
        assert_eq!(tasks.len(), 4);
        for task in &tasks {
            let node = tree.get(task.node).unwrap();
            let rest = rest_frame(center, node.size).origin;
            let landed = Point::new(
                rest.x + task.tween.deltas.translation_x.to as i32,
                rest.y + task.tween.deltas.translation_y.to as i32,
            );
            assert_eq!(landed, node.position);
        }
        let delays: Vec<_> = tasks.iter().map(|t| t.tween.delay.as_millis()).collect();
        assert_eq!(delays, vec![80, 60, 40, 20]);
    }

    #[test]
    fn test_attach_at_center_rejects_attached_items() {
        let mut tree = tree_with_items(3, &ArcStyle::default());
        let root = tree.root();
        let mut host = MockHost::default();
        let second = tree.child(root, 1).unwrap();
        host.attach(ViewId::new(2), Rect::default()).unwrap();
        let calls = host.calls.len();

        let err = attach_at_center(&tree, root, Point::new(0, 0), &mut host).unwrap_err();

        assert!(matches!(err, MenuError::AlreadyAttached { node, .. } if node == second));
        assert_eq!(host.calls.len(), calls);

        tree.get_mut(second).unwrap().active = true;
        let attached = attach_at_center(&tree, root, Point::new(100, 100), &mut host).unwrap();
        assert_eq!(attached.len(), 2);
        assert_eq!(
            host.frame(ViewId::new(1)),
            Some(Rect::centered_at(Point::new(100, 100), Size::square(48)))
        );
    }

    #[test]
    fn test_restore_closing_detaches_at_rest() {
        let tree = tree_with_items(1, &ArcStyle::default());
        let item = tree.child(tree.root(), 0).unwrap();
        let mut host = MockHost::default();
        host.attach(ViewId::new(1), Rect::default()).unwrap();

        restore(&tree, item, Phase::Closing, Point::new(60, 60), &mut host).unwrap();

        assert!(!host.is_attached(ViewId::new(1)));
        assert_eq!(
            host.frame(ViewId::new(1)),
            Some(Rect::centered_at(Point::new(60, 60), Size::square(48)))
        );
        assert_eq!(host.resets(ViewId::new(1)), 1);
    }
}
