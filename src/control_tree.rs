/*
 * Name-based lookup over a tree of controls. The search is depth-first and
 * pre-order: a node is checked before its children, and the first match wins.
 */

/// Identifies the kind of a control so lookups can filter without native class queries.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ControlKind {
    Form,
    RichTextBox,
    Other,
}

pub trait ControlNode {
    fn name(&self) -> &str;
    fn kind(&self) -> ControlKind;
    fn children(&self) -> &[Self]
    where
        Self: Sized;
}

pub fn find_control<'a, C: ControlNode>(root: &'a C, name: &str) -> Option<&'a C> {
    find_control_where(root, name, |_| true)
}

pub fn find_control_of_kind<'a, C: ControlNode>(
    root: &'a C,
    name: &str,
    kind: ControlKind,
) -> Option<&'a C> {
    find_control_where(root, name, |control| control.kind() == kind)
}

/*
 * Finds the first control named `name` that also passes `filter`. A same-named
 * control rejected by the filter does not end the search; its subtree and the
 * remaining siblings are still visited.
 */
pub fn find_control_where<'a, C, F>(root: &'a C, name: &str, filter: F) -> Option<&'a C>
where
    C: ControlNode,
    F: Fn(&C) -> bool,
{
    let mut pending = vec![root];
    while let Some(control) = pending.pop() {
        if control.name() == name && filter(control) {
            return Some(control);
        }
        pending.extend(control.children().iter().rev());
    }
    None
}

/// A control tree node carrying its native handle.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ControlEntry<H> {
    name: String,
    kind: ControlKind,
    handle: H,
    children: Vec<ControlEntry<H>>,
}

impl<H> ControlEntry<H> {
    pub fn new(name: impl Into<String>, kind: ControlKind, handle: H) -> Self {
        Self {
            name: name.into(),
            kind,
            handle,
            children: Vec::new(),
        }
    }

    pub fn handle(&self) -> &H {
        &self.handle
    }

    pub fn add_child(&mut self, child: ControlEntry<H>) -> &mut ControlEntry<H> {
        self.children.push(child);
        let last = self.children.len() - 1;
        &mut self.children[last]
    }

    pub fn with_child(mut self, child: ControlEntry<H>) -> Self {
        self.children.push(child);
        self
    }
}

impl<H> ControlNode for ControlEntry<H> {
    fn name(&self) -> &str {
        &self.name
    }

    fn kind(&self) -> ControlKind {
        self.kind
    }

    fn children(&self) -> &[Self] {
        &self.children
    }
}
