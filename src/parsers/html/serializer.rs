use html5ever::serialize::{serialize, SerializeOpts, TraversalScope};
use markup5ever_rcdom::{Handle, SerializableHandle};

/// 序列化节点的所有子节点（即节点的 inner HTML）
///
/// 序列化失败时返回空字符串并记录警告；写入的是内存缓冲区，实际不会失败。
pub fn serialize_children(node: &Handle) -> String {
    let mut buf: Vec<u8> = Vec::new();
    let serializable: SerializableHandle = node.clone().into();
    let opts = SerializeOpts {
        traversal_scope: TraversalScope::ChildrenOnly(None),
        ..Default::default()
    };

    if let Err(e) = serialize(&mut buf, &serializable, opts) {
        tracing::warn!("DOM 序列化失败: {}", e);
        return String::new();
    }

    String::from_utf8_lossy(&buf).into_owned()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::parsers::html::dom::fragment_to_dom;

    #[test]
    fn test_serialize_children_of_body() {
        let (_dom, body) = fragment_to_dom("<b>24</b> MP &amp; mehr");
        let body = body.expect("body should exist");
        assert_eq!(serialize_children(&body), "<b>24</b> MP &amp; mehr");
    }
}
