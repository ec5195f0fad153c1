//! Thin wrapper over Rowan's green node builder

use rowan::{Checkpoint, GreenNode, GreenNodeBuilder};

use super::CsSyntaxKind;

/// Builder for C# green trees
///
/// Keeps the parser independent of the raw `rowan::SyntaxKind` conversion.
#[derive(Default)]
pub struct CstBuilder {
    inner: GreenNodeBuilder<'static>,
}

impl CstBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn start_node(&mut self, kind: CsSyntaxKind) {
        self.inner.start_node(kind.into());
    }

    /// Wrap everything emitted since `checkpoint` into a node of `kind`
    pub fn start_node_at(&mut self, checkpoint: Checkpoint, kind: CsSyntaxKind) {
        self.inner.start_node_at(checkpoint, kind.into());
    }

    pub fn finish_node(&mut self) {
        self.inner.finish_node();
    }

    pub fn token(&mut self, kind: CsSyntaxKind, text: &str) {
        self.inner.token(kind.into(), text);
    }

    pub fn checkpoint(&self) -> Checkpoint {
        self.inner.checkpoint()
    }

    pub fn finish(self) -> GreenNode {
        self.inner.finish()
    }
}
