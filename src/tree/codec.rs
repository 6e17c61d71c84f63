//! Serde support for the hierarchy model
//!
//! Loose hierarchies deserialize from permissive config text, so fixtures can
//! be written in TOML or any other self-describing format: tables become
//! mappings, arrays become ordered lists, bare strings become file names and
//! the markers `"file"` and `"directory"` become explicit kinds. Canonical
//! trees serialize to the same shape for snapshotting.

use std::collections::BTreeMap;
use std::fmt;

use serde::de::{Deserialize, Deserializer, Error as _, MapAccess, SeqAccess, Visitor};
use serde::ser::{Serialize, SerializeMap, Serializer};

use super::{FileTree, Hierarchy, Item, ItemType, ListItem, Node};

fn kind_from_marker<E: serde::de::Error>(value: &str) -> Result<ItemType, E> {
    match value {
        "file" => Ok(ItemType::File),
        "directory" => Ok(ItemType::Directory),
        other => Err(E::unknown_variant(other, &["file", "directory"])),
    }
}

impl<'de> Deserialize<'de> for Hierarchy {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        struct HierarchyVisitor;

        impl<'de> Visitor<'de> for HierarchyVisitor {
            type Value = Hierarchy;

            fn expecting(&self, f: &mut fmt::Formatter) -> fmt::Result {
                f.write_str("a mapping of names to items, or a list of items")
            }

            fn visit_map<A: MapAccess<'de>>(self, mut access: A) -> Result<Self::Value, A::Error> {
                let mut entries = BTreeMap::new();
                while let Some((name, item)) = access.next_entry::<String, Item>()? {
                    entries.insert(name, item);
                }
                Ok(Hierarchy::Map(entries))
            }

            fn visit_seq<A: SeqAccess<'de>>(self, mut access: A) -> Result<Self::Value, A::Error> {
                let mut entries = Vec::new();
                while let Some(entry) = access.next_element::<ListItem>()? {
                    entries.push(entry);
                }
                Ok(Hierarchy::List(entries))
            }
        }

        deserializer.deserialize_any(HierarchyVisitor)
    }
}

impl<'de> Deserialize<'de> for Item {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        struct ItemVisitor;

        impl<'de> Visitor<'de> for ItemVisitor {
            type Value = Item;

            fn expecting(&self, f: &mut fmt::Formatter) -> fmt::Result {
                f.write_str("null, \"file\", \"directory\", a mapping or a list")
            }

            fn visit_unit<E: serde::de::Error>(self) -> Result<Self::Value, E> {
                Ok(Item::Unspecified)
            }

            fn visit_none<E: serde::de::Error>(self) -> Result<Self::Value, E> {
                Ok(Item::Unspecified)
            }

            fn visit_str<E: serde::de::Error>(self, value: &str) -> Result<Self::Value, E> {
                kind_from_marker(value).map(Item::Kind)
            }

            fn visit_map<A: MapAccess<'de>>(self, mut access: A) -> Result<Self::Value, A::Error> {
                let mut entries = BTreeMap::new();
                while let Some((name, item)) = access.next_entry::<String, Item>()? {
                    entries.insert(name, item);
                }
                Ok(Item::Nested(Hierarchy::Map(entries)))
            }

            fn visit_seq<A: SeqAccess<'de>>(self, mut access: A) -> Result<Self::Value, A::Error> {
                let mut entries = Vec::new();
                while let Some(entry) = access.next_element::<ListItem>()? {
                    entries.push(entry);
                }
                Ok(Item::Nested(Hierarchy::List(entries)))
            }
        }

        deserializer.deserialize_any(ItemVisitor)
    }
}

impl<'de> Deserialize<'de> for ListItem {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        struct ListItemVisitor;

        impl<'de> Visitor<'de> for ListItemVisitor {
            type Value = ListItem;

            fn expecting(&self, f: &mut fmt::Formatter) -> fmt::Result {
                f.write_str("a file name or a single-entry mapping of name to content")
            }

            fn visit_str<E: serde::de::Error>(self, value: &str) -> Result<Self::Value, E> {
                Ok(ListItem::Name(value.to_owned()))
            }

            fn visit_map<A: MapAccess<'de>>(self, mut access: A) -> Result<Self::Value, A::Error> {
                let (name, item) = access
                    .next_entry::<String, Item>()?
                    .ok_or_else(|| A::Error::custom("expected a single named item, got none"))?;
                if access.next_entry::<String, Item>()?.is_some() {
                    return Err(A::Error::custom(
                        "expected a single named item, got several",
                    ));
                }
                Ok(ListItem::Pair(name, item))
            }
        }

        deserializer.deserialize_any(ListItemVisitor)
    }
}

impl Serialize for FileTree {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        let mut map = serializer.serialize_map(Some(self.0.len()))?;
        for (name, node) in &self.0 {
            map.serialize_entry(name, node)?;
        }
        map.end()
    }
}

impl Serialize for Node {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        match self {
            Node::File => serializer.serialize_str("file"),
            Node::Directory(children) => children.serialize(serializer),
        }
    }
}

#[cfg(test)]
mod tests {
    use crate::tree::{unify, FileTree, Hierarchy, Item, ItemType, ListItem, Node};

    #[test]
    fn hierarchy_from_toml_tables_and_arrays() {
        let hierarchy: Hierarchy = toml::from_str(
            r#"
            "README.md" = "file"
            data = "directory"

            [src]
            contents = ["lib.rs", "main.rs"]
            "#,
        )
        .unwrap();
        let tree = unify(hierarchy).unwrap();
        assert_eq!(tree.get("README.md"), Some(&Node::File));
        assert_eq!(tree.get("data"), Some(&Node::Directory(FileTree::new())));
        let Some(Node::Directory(src)) = tree.get("src") else {
            panic!("src should be a directory");
        };
        let Some(Node::Directory(contents)) = src.get("contents") else {
            panic!("src/contents should be a directory");
        };
        assert_eq!(contents.get("lib.rs"), Some(&Node::File));
        assert_eq!(contents.get("main.rs"), Some(&Node::File));
    }

    #[test]
    fn list_items_from_toml() {
        let hierarchy: Hierarchy = toml::from_str(r#"sub_dir = ["a.txt", "b.txt"]"#).unwrap();
        let Hierarchy::Map(entries) = &hierarchy else {
            panic!("top level should be a mapping");
        };
        assert_eq!(entries.len(), 1);
        let tree = unify(hierarchy).unwrap();
        assert_eq!(
            tree.get("sub_dir"),
            Some(&Node::Directory(
                unify(Hierarchy::list(["a.txt", "b.txt"])).unwrap()
            ))
        );
    }

    #[test]
    fn unknown_marker_is_rejected() {
        let result: Result<Hierarchy, _> = toml::from_str(r#"entry = "symlink""#);
        assert!(result.is_err());
    }

    #[test]
    fn directory_marker_yields_empty_directory() {
        let hierarchy: Hierarchy = toml::from_str(r#"name = "directory""#).unwrap();
        let tree = unify(hierarchy).unwrap();
        assert_eq!(tree.get("name"), Some(&Node::Directory(FileTree::new())));
    }

    #[test]
    fn file_tree_serializes_to_nested_tables() {
        let tree = unify(Hierarchy::map::<_, _, Item>([
            ("file.txt", ItemType::File.into()),
            (
                "sub_dir",
                Hierarchy::list([ListItem::from("inner.txt")]).into(),
            ),
        ]))
        .unwrap();
        let rendered = toml::to_string(&tree).unwrap();
        assert!(rendered.contains(r#""file.txt" = "file""#));
        assert!(rendered.contains("[sub_dir]"));
        assert!(rendered.contains(r#""inner.txt" = "file""#));
    }
}
