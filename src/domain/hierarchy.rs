// Tree shaping for area-proportional layouts
use serde::Serialize;

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct TreeNode {
    pub name: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub size: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub fill: Option<String>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub children: Vec<TreeNode>,
}

impl TreeNode {
    pub fn leaf(name: impl Into<String>, size: f64) -> Self {
        Self {
            name: name.into(),
            size: Some(size),
            fill: None,
            children: Vec::new(),
        }
    }

    pub fn with_fill(mut self, fill: impl Into<String>) -> Self {
        self.fill = Some(fill.into());
        self
    }
}

/// Build a single-root tree with one leaf per record.
///
/// Leaf sizes are floored to 1 so that zero or negative categories stay
/// visible in the layout.
pub fn to_hierarchy<R, L, V>(root: &str, records: &[R], label_selector: L, value_selector: V) -> TreeNode
where
    L: Fn(&R) -> String,
    V: Fn(&R) -> f64,
{
    let children = records
        .iter()
        .map(|r| TreeNode::leaf(label_selector(r), value_selector(r).max(1.0)))
        .collect();

    TreeNode {
        name: root.to_string(),
        size: None,
        fill: None,
        children,
    }
}
