//! Tree rendering for node hierarchies

use console::Style;

/// A node in a rendered tree
#[derive(Debug, Clone)]
pub struct TreeNode {
    pub name: String,
    pub node_type: NodeType,
    pub children: Vec<TreeNode>,
    /// Ordered key/value pairs shown under or beside the node
    pub metadata: Vec<(String, String)>,
}

/// Kinds of entries in a scene tree
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NodeType {
    /// The scene itself
    Scene,
    /// A node referenced by a skin
    Joint,
    /// Any other node
    Node,
}

/// Options for tree rendering
#[derive(Debug, Clone)]
pub struct TreeOptions {
    pub max_depth: Option<usize>,
    pub no_color: bool,
    pub show_metadata: bool,
    pub compact: bool,
}

impl Default for TreeOptions {
    fn default() -> Self {
        Self {
            max_depth: None,
            no_color: false,
            show_metadata: true,
            compact: false,
        }
    }
}

impl TreeNode {
    pub fn new(name: String, node_type: NodeType) -> Self {
        Self {
            name,
            node_type,
            children: Vec::new(),
            metadata: Vec::new(),
        }
    }

    /// Add a child node
    pub fn add_child(mut self, child: TreeNode) -> Self {
        self.children.push(child);
        self
    }

    /// Add metadata
    pub fn with_metadata(mut self, key: &str, value: &str) -> Self {
        self.metadata.push((key.to_string(), value.to_string()));
        self
    }
}

impl NodeType {
    pub fn icon(self) -> &'static str {
        match self {
            NodeType::Scene => "📁",
            NodeType::Joint => "🦴",
            NodeType::Node => "◇",
        }
    }

    pub fn style(self, no_color: bool) -> Style {
        if no_color {
            return Style::new();
        }
        match self {
            NodeType::Scene => Style::new().bold().cyan(),
            NodeType::Joint => Style::new().yellow(),
            NodeType::Node => Style::new().green(),
        }
    }
}

/// Render a tree structure to string
pub fn render_tree(root: &TreeNode, options: &TreeOptions) -> String {
    let mut output = String::new();
    render_node(root, &mut output, "", true, 0, options);
    output
}

fn render_node(
    node: &TreeNode,
    output: &mut String,
    prefix: &str,
    is_last: bool,
    depth: usize,
    options: &TreeOptions,
) {
    if let Some(max_depth) = options.max_depth
        && depth > max_depth
    {
        return;
    }

    let style = node.node_type.style(options.no_color);
    let connector = if depth == 0 {
        ""
    } else if is_last {
        "└── "
    } else {
        "├── "
    };

    output.push_str(&format!(
        "{}{}{} {}",
        prefix,
        connector,
        node.node_type.icon(),
        style.apply_to(&node.name)
    ));

    if options.show_metadata && options.compact && !node.metadata.is_empty() {
        let parts: Vec<String> = node
            .metadata
            .iter()
            .map(|(key, value)| format!("{key}:{value}"))
            .collect();
        output.push_str(&format!(" [{}]", parts.join(", ")));
    }
    output.push('\n');

    let child_prefix = if depth == 0 {
        String::new()
    } else {
        format!("{}{}", prefix, if is_last { "    " } else { "│   " })
    };

    if options.show_metadata && !options.compact {
        let meta_style = if options.no_color {
            Style::new()
        } else {
            Style::new().dim()
        };
        for (key, value) in &node.metadata {
            output.push_str(&format!(
                "{}    {}: {}\n",
                child_prefix,
                meta_style.apply_to(key),
                value
            ));
        }
    }

    for (i, child) in node.children.iter().enumerate() {
        let is_last_child = i == node.children.len() - 1;
        render_node(
            child,
            output,
            &child_prefix,
            is_last_child,
            depth + 1,
            options,
        );
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample_tree() -> TreeNode {
        TreeNode::new("scene".to_string(), NodeType::Scene).add_child(
            TreeNode::new("root".to_string(), NodeType::Joint)
                .with_metadata("t", "(0, 0, 0)")
                .add_child(TreeNode::new("hand".to_string(), NodeType::Joint))
                .add_child(TreeNode::new("prop".to_string(), NodeType::Node)),
        )
    }

    #[test]
    fn test_render_connectors() {
        let options = TreeOptions {
            no_color: true,
            show_metadata: false,
            ..Default::default()
        };
        let output = render_tree(&sample_tree(), &options);
        let lines: Vec<&str> = output.lines().collect();

        assert_eq!(lines.len(), 4);
        assert!(lines[1].starts_with("└── "));
        assert!(lines[2].starts_with("    ├── "));
        assert!(lines[3].starts_with("    └── "));
    }

    #[test]
    fn test_max_depth() {
        let options = TreeOptions {
            max_depth: Some(1),
            no_color: true,
            ..Default::default()
        };
        let output = render_tree(&sample_tree(), &options);
        assert!(output.contains("root"));
        assert!(!output.contains("hand"));
    }

    #[test]
    fn test_compact_metadata_inline() {
        let options = TreeOptions {
            no_color: true,
            compact: true,
            ..Default::default()
        };
        let output = render_tree(&sample_tree(), &options);
        assert!(output.contains("root [t:(0, 0, 0)]"));
    }
}
