//! Tree rendering of joint hierarchies

use bonekit::Skeleton;
use console::Style;

use super::format::format_vec3;

/// Represents a node in a tree structure
#[derive(Debug, Clone)]
pub struct TreeNode {
    pub name: String,
    pub node_type: NodeType,
    pub children: Vec<TreeNode>,
    pub metadata: Vec<(String, String)>,
}

/// Types of nodes in the tree
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NodeType {
    /// The rig itself
    Rig,
    /// A joint without parent
    Root,
    /// A joint with children
    Joint,
    /// A joint without children
    Leaf,
}

/// Options for tree rendering
#[derive(Debug, Clone, Default)]
pub struct TreeOptions {
    pub max_depth: Option<usize>,
    pub no_color: bool,
    pub show_metadata: bool,
    pub compact: bool,
}

impl TreeNode {
    /// Create a new tree node
    pub fn new(name: String, node_type: NodeType) -> Self {
        Self {
            name,
            node_type,
            children: Vec::new(),
            metadata: Vec::new(),
        }
    }

    /// Add a child node
    pub fn add_child(mut self, child: Self) -> Self {
        self.children.push(child);
        self
    }

    /// Add metadata
    pub fn with_metadata(mut self, key: &str, value: &str) -> Self {
        self.metadata.push((key.to_string(), value.to_string()));
        self
    }

    /// Number of nodes below this one
    pub fn descendant_count(&self) -> usize {
        let mut count = 0;
        let mut pending: Vec<&Self> = self.children.iter().collect();
        while let Some(node) = pending.pop() {
            count += 1;
            pending.extend(&node.children);
        }
        count
    }

    /// Build the tree of a skeleton's joints under a rig node
    pub fn from_skeleton(name: &str, skeleton: &Skeleton) -> Self {
        let rig = Self::new(name.to_string(), NodeType::Rig)
            .with_metadata("joints", &skeleton.len().to_string())
            .with_metadata("bind seed", &format!("{:?}", skeleton.options().bind_seed));

        // Children are built before parents by walking indices backwards
        let mut built: Vec<Option<Self>> = vec![None; skeleton.len()];
        for joint in skeleton.joints().iter().rev() {
            let node_type = if joint.is_root() {
                NodeType::Root
            } else if joint.children().is_empty() {
                NodeType::Leaf
            } else {
                NodeType::Joint
            };
            let mut node = Self::new(format!("joint {}", joint.index()), node_type)
                .with_metadata("position", &format_vec3(joint.bind_position()));
            if joint.is_degenerate() {
                node = node.with_metadata("bone", "degenerate");
            }
            for &child in joint.children() {
                if let Some(child) = built[child].take() {
                    node = node.add_child(child);
                }
            }
            built[joint.index()] = Some(node);
        }

        skeleton
            .roots()
            .filter_map(|root| built[root].take())
            .fold(rig, Self::add_child)
    }
}

impl NodeType {
    /// Get icon for node type
    pub fn icon(self) -> &'static str {
        match self {
            Self::Rig => "🦴",
            Self::Root => "◉",
            Self::Joint => "●",
            Self::Leaf => "○",
        }
    }

    /// Get color style for node type
    pub fn style(self, no_color: bool) -> Style {
        if no_color {
            Style::new()
        } else {
            match self {
                Self::Rig => Style::new().bold().cyan(),
                Self::Root => Style::new().bold().yellow(),
                Self::Joint => Style::new().green(),
                Self::Leaf => Style::new().dim(),
            }
        }
    }
}

/// Render a tree structure to string.
///
/// Nodes at `max_depth` are shown with a count of the joints hidden below
/// them instead of their children.
pub fn render_tree(root: &TreeNode, options: &TreeOptions) -> String {
    let mut output = String::new();
    let meta_style = if options.no_color {
        Style::new()
    } else {
        Style::new().dim()
    };

    // (node, prefix of its line, last among siblings, depth)
    let mut pending = vec![(root, String::new(), true, 0usize)];
    while let Some((node, prefix, is_last, depth)) = pending.pop() {
        let (connector, indent) = match (depth, is_last) {
            (0, _) => ("", ""),
            (_, true) => ("└── ", "    "),
            (_, false) => ("├── ", "│   "),
        };
        let inner = format!("{prefix}{indent}");

        output.push_str(&format!(
            "{prefix}{connector}{} {}",
            node.node_type.icon(),
            node.node_type.style(options.no_color).apply_to(&node.name)
        ));
        if options.show_metadata && options.compact && !node.metadata.is_empty() {
            let parts: Vec<String> = node
                .metadata
                .iter()
                .map(|(key, value)| format!("{key}: {value}"))
                .collect();
            output.push_str(&format!(" [{}]", parts.join(", ")));
        }
        output.push('\n');

        if options.show_metadata && !options.compact {
            for (key, value) in &node.metadata {
                output.push_str(&format!("{inner}    {}: {value}\n", meta_style.apply_to(key)));
            }
        }

        if options.max_depth.is_some_and(|max| depth >= max) {
            let hidden = node.descendant_count();
            if hidden > 0 {
                output.push_str(&format!("{inner}└── … {hidden} more\n"));
            }
            continue;
        }

        // Pushed in reverse so the first child is rendered first
        let last = node.children.len().saturating_sub(1);
        for (i, child) in node.children.iter().enumerate().rev() {
            pending.push((child, inner.clone(), i == last, depth + 1));
        }
    }
    output
}

#[cfg(test)]
mod tests {
    use super::*;
    use bonekit::JointSpec;
    use glam::Vec3;

    fn skeleton() -> Skeleton {
        Skeleton::new(&[
            JointSpec::root(0, Vec3::Y),
            JointSpec::child(1, Vec3::new(1.0, 1.0, 0.0), 0),
            JointSpec::child(2, Vec3::new(-1.0, 1.0, 0.0), 0),
            JointSpec::child(3, Vec3::new(1.0, 2.0, 0.0), 1),
        ])
        .unwrap()
    }

    #[test]
    fn test_tree_follows_hierarchy() {
        let tree = TreeNode::from_skeleton("arm", &skeleton());
        assert_eq!(tree.node_type, NodeType::Rig);
        assert_eq!(tree.children.len(), 1);

        let root = &tree.children[0];
        assert_eq!(root.node_type, NodeType::Root);
        let names: Vec<_> = root.children.iter().map(|c| c.name.as_str()).collect();
        assert_eq!(names, vec!["joint 1", "joint 2"]);
        assert_eq!(root.children[0].children[0].node_type, NodeType::Leaf);
    }

    #[test]
    fn test_tree_rendering() {
        let tree = TreeNode::from_skeleton("arm", &skeleton());
        let options = TreeOptions {
            no_color: true,
            show_metadata: true,
            ..TreeOptions::default()
        };
        let output = render_tree(&tree, &options);

        assert!(output.contains("arm"));
        assert!(output.contains("├── ● joint 1"));
        assert!(output.contains("└── ○ joint 2"));
        assert!(output.contains("position: (1.000, 2.000, 0.000)"));
    }

    #[test]
    fn test_max_depth() {
        let tree = TreeNode::from_skeleton("arm", &skeleton());
        let options = TreeOptions {
            max_depth: Some(1),
            no_color: true,
            ..TreeOptions::default()
        };
        let output = render_tree(&tree, &options);
        assert!(output.contains("joint 0"));
        assert!(output.contains("└── … 3 more"));
        assert!(!output.contains("joint 1"));
    }
}
