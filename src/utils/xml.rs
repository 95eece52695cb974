// XML报文工具
// 将标签报文解析为有序的字符串键映射, 并支持对指定节点做原位替换

use std::collections::{BTreeMap, HashMap};

use crate::error::{ChannelError, Result};

/// 映射的顺序类型
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OrdinalType {
    /// 无序
    Unordered,
    /// 按键的ASCII升序
    Ascii,
    /// 保持报文中的出现顺序
    Linked,
}

/// 节点值
#[derive(Debug, Clone, PartialEq)]
pub enum FieldValue {
    Text(String),
    Nested(FieldMap),
}

#[derive(Debug, Clone, PartialEq)]
enum Entries {
    Unordered(HashMap<String, FieldValue>),
    Ascii(BTreeMap<String, FieldValue>),
    Linked(Vec<(String, FieldValue)>),
}

/// 报文字段映射
#[derive(Debug, Clone, PartialEq)]
pub struct FieldMap {
    entries: Entries,
}

impl FieldMap {
    pub fn new(ordinal: OrdinalType) -> Self {
        let entries = match ordinal {
            OrdinalType::Unordered => Entries::Unordered(HashMap::new()),
            OrdinalType::Ascii => Entries::Ascii(BTreeMap::new()),
            OrdinalType::Linked => Entries::Linked(Vec::new()),
        };
        Self { entries }
    }

    /// 解析XML报文, 取根节点下的子节点
    ///
    /// 空文本节点不会进入映射; 含子节点的节点解析为嵌套映射
    ///
    /// # Arguments
    /// * `content` - XML报文
    /// * `ordinal` - 映射的顺序类型
    ///
    /// # Returns
    /// * 字段映射
    pub fn parse(content: &str, ordinal: OrdinalType) -> Result<Self> {
        let document = roxmltree::Document::parse(content)?;
        Ok(Self::from_node(document.root_element(), ordinal))
    }

    fn from_node(node: roxmltree::Node<'_, '_>, ordinal: OrdinalType) -> Self {
        let mut map = FieldMap::new(ordinal);

        for child in node.children().filter(|n| n.is_element()) {
            let name = child.tag_name().name().to_string();
            if child.children().any(|n| n.is_element()) {
                map.insert(name, FieldValue::Nested(Self::from_node(child, ordinal)));
            } else {
                let text: String = child
                    .children()
                    .filter(|n| n.is_text())
                    .filter_map(|n| n.text())
                    .collect();
                if !text.is_empty() {
                    map.insert(name, FieldValue::Text(text));
                }
            }
        }

        map
    }

    pub fn insert(&mut self, key: String, value: FieldValue) {
        match &mut self.entries {
            Entries::Unordered(map) => {
                map.insert(key, value);
            }
            Entries::Ascii(map) => {
                map.insert(key, value);
            }
            Entries::Linked(list) => match list.iter_mut().find(|(k, _)| *k == key) {
                Some(entry) => entry.1 = value,
                None => list.push((key, value)),
            },
        }
    }

    pub fn get(&self, key: &str) -> Option<&FieldValue> {
        match &self.entries {
            Entries::Unordered(map) => map.get(key),
            Entries::Ascii(map) => map.get(key),
            Entries::Linked(list) => list.iter().find(|(k, _)| k == key).map(|(_, v)| v),
        }
    }

    /// 获取文本字段
    pub fn text(&self, key: &str) -> Option<&str> {
        match self.get(key) {
            Some(FieldValue::Text(text)) => Some(text.as_str()),
            _ => None,
        }
    }

    pub fn remove(&mut self, key: &str) -> Option<FieldValue> {
        match &mut self.entries {
            Entries::Unordered(map) => map.remove(key),
            Entries::Ascii(map) => map.remove(key),
            Entries::Linked(list) => {
                let index = list.iter().position(|(k, _)| k == key)?;
                Some(list.remove(index).1)
            }
        }
    }

    /// 移除文本字段并返回其值
    pub fn remove_text(&mut self, key: &str) -> Option<String> {
        match self.remove(key) {
            Some(FieldValue::Text(text)) => Some(text),
            _ => None,
        }
    }

    pub fn len(&self) -> usize {
        match &self.entries {
            Entries::Unordered(map) => map.len(),
            Entries::Ascii(map) => map.len(),
            Entries::Linked(list) => list.len(),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// 按映射顺序遍历
    pub fn iter(&self) -> Box<dyn Iterator<Item = (&str, &FieldValue)> + '_> {
        match &self.entries {
            Entries::Unordered(map) => Box::new(map.iter().map(|(k, v)| (k.as_str(), v))),
            Entries::Ascii(map) => Box::new(map.iter().map(|(k, v)| (k.as_str(), v))),
            Entries::Linked(list) => Box::new(list.iter().map(|(k, v)| (k.as_str(), v))),
        }
    }

    /// 拼接为 `key=value&key=value` 形式 (仅文本字段)
    pub fn pair(&self) -> String {
        self.iter()
            .filter_map(|(key, value)| match value {
                FieldValue::Text(text) => Some(format!("{}={}", key, text)),
                FieldValue::Nested(_) => None,
            })
            .collect::<Vec<_>>()
            .join("&")
    }
}

/// 替换根节点下指定子节点的内容, 报文其余部分逐字节保持不变
///
/// 只匹配根节点的直接子节点; 文本、CDATA 或嵌套节点中同名的标签不受影响
///
/// # Arguments
/// * `content` - 原始报文
/// * `node` - 节点名
/// * `value` - 新的节点内容
///
/// # Returns
/// * 替换后的报文
pub fn replace_node_text(content: &str, node: &str, value: &str) -> Result<String> {
    let document = roxmltree::Document::parse(content)?;
    let range = document
        .root_element()
        .children()
        .find(|n| n.is_element() && n.tag_name().name() == node)
        .map(|n| n.range())
        .ok_or_else(|| ChannelError::Payload(format!("No <{}> element found in payload", node)))?;

    let mut replaced = String::with_capacity(content.len() + value.len());
    replaced.push_str(&content[..range.start]);
    replaced.push_str(&format!("<{}>{}</{}>", node, value, node));
    replaced.push_str(&content[range.end..]);
    Ok(replaced)
}
