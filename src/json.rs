use serde_json::{json, Map, Value as JsonValue};

use crate::{NodeId, RecordTree, Value};

impl RecordTree {
    /// Structured dump of the tree.
    ///
    /// Every node becomes an object with its `label` and `value`, groups also have `children`.
    /// The root itself is the top level array of children.
    #[must_use]
    pub fn to_json(&self) -> JsonValue {
        self.children_json(NodeId::ROOT)
    }

    fn children_json(&self, parent: NodeId) -> JsonValue {
        let children = self
            .node(parent)
            .map(crate::Node::children)
            .unwrap_or_default();
        JsonValue::Array(children.iter().map(|&child| self.node_json(child)).collect())
    }

    fn node_json(&self, id: NodeId) -> JsonValue {
        let Some(node) = self.node(id) else {
            return JsonValue::Null;
        };
        let mut object = Map::new();
        object.insert("label".to_owned(), json!(node.label()));
        object.insert("value".to_owned(), value_json(node.value()));
        if !node.children().is_empty() {
            object.insert("children".to_owned(), self.children_json(id));
        }
        JsonValue::Object(object)
    }
}

fn value_json(value: &Value) -> JsonValue {
    match value {
        Value::Empty => JsonValue::Null,
        Value::Integer(value) | Value::Bytes(value) => json!(value),
        Value::Count(count) => json!(count),
        Value::Text(text) => json!(text),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn top_level_is_an_array_in_row_order() {
        let tree = RecordTree::build(&crate::record::example_container());
        let json = tree.to_json();
        let rows = json.as_array().unwrap();
        assert_eq!(rows.len(), 20);
        assert_eq!(rows[0]["label"], "vkFormat");
        assert_eq!(rows[0]["value"], "VK_FORMAT_R8G8B8A8_SRGB");
        assert_eq!(rows[2]["value"], 4);
        assert!(rows[2].get("children").is_none());
    }

    #[test]
    fn groups_have_children() {
        let tree = RecordTree::build(&crate::record::example_container());
        let json = tree.to_json();
        let kv = &json[17];
        assert_eq!(kv["value"], 2);
        assert_eq!(kv["children"][1]["label"], "KTXwriter");
        assert_eq!(kv["children"][1]["value"], "toktx v4.3");
        assert_eq!(json[18]["value"], JsonValue::Null);
        let depth = &json[19]["children"][0]["children"][0]["children"][0]["children"][0];
        assert_eq!(depth["label"], "depth");
    }
}
