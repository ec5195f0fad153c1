//! Type aliases for C# CST nodes
//!
//! These types are Rowan's generic tree types parameterized with
//! [`CsLanguage`]. Red nodes are not `Send`; share the green node across
//! threads and rebuild a root with [`CsSyntaxNode::new_root`] where needed.

use super::CsLanguage;

/// A node in the C# concrete syntax tree
pub type CsSyntaxNode = rowan::SyntaxNode<CsLanguage>;

/// A token (including trivia) in the C# concrete syntax tree
pub type CsSyntaxToken = rowan::SyntaxToken<CsLanguage>;

/// Either a node or a token
pub type CsSyntaxElement = rowan::SyntaxElement<CsLanguage>;

pub type CsSyntaxNodeChildren = rowan::SyntaxNodeChildren<CsLanguage>;
