use std::fmt;

/// Renderable tree produced by components and committed to a [`Host`](crate::Host).
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub enum Node {
    #[default]
    Empty,
    Text(String),
    Element { tag: String, children: Vec<Node> },
    Fragment(Vec<Node>),
}

impl Node {
    pub fn text(text: impl Into<String>) -> Self {
        Node::Text(text.into())
    }

    pub fn element(tag: impl Into<String>, children: impl IntoIterator<Item = Node>) -> Self {
        Node::Element {
            tag: tag.into(),
            children: children.into_iter().collect(),
        }
    }

    pub fn fragment(children: impl IntoIterator<Item = Node>) -> Self {
        Node::Fragment(children.into_iter().collect())
    }

    pub fn is_empty(&self) -> bool {
        match self {
            Node::Empty => true,
            Node::Fragment(children) => children.iter().all(Node::is_empty),
            _ => false,
        }
    }

    /// Markup form of the tree, e.g. `<main><h1>Home</h1></main>`.
    pub fn to_markup(&self) -> String {
        self.to_string()
    }
}

impl From<&str> for Node {
    fn from(text: &str) -> Self {
        Node::text(text)
    }
}

impl From<String> for Node {
    fn from(text: String) -> Self {
        Node::Text(text)
    }
}

impl From<Option<Node>> for Node {
    fn from(node: Option<Node>) -> Self {
        node.unwrap_or_default()
    }
}

impl fmt::Display for Node {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Node::Empty => Ok(()),
            Node::Text(text) => f.write_str(text),
            Node::Element { tag, children } => {
                write!(f, "<{tag}>")?;
                for child in children {
                    write!(f, "{child}")?;
                }
                write!(f, "</{tag}>")
            }
            Node::Fragment(children) => {
                for child in children {
                    write!(f, "{child}")?;
                }
                Ok(())
            }
        }
    }
}
