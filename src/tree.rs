//! The file hierarchy model and its operations
//!
//! A [`Hierarchy`] is the permissive, caller-facing description of a tree of
//! files and directories. It allows several shorthands: an ordered list of
//! names, a name paired with nested content, a bare [`Item::Unspecified`]
//! meaning "empty file". [`unify`] normalizes any well-formed hierarchy into
//! the canonical [`FileTree`] form, which [`create_file_tree`] materializes
//! on disk and [`read_children_as_file_tree`] derives back from disk.

use std::collections::{btree_map, BTreeMap};
use std::fs::{self, OpenOptions};

use anyhow::{Context, Result};
use camino::Utf8Path;
use tracing::debug;

mod codec;

/// The physical kind of a filesystem entry named by a hierarchy
#[derive(Clone, Copy, Debug, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ItemType {
    /// A regular file
    File,
    /// A directory
    Directory,
}

/// A loose description of a tree of files and directories
///
/// Hierarchies are value trees: built once, passed by value, never shared.
/// See the crate documentation for the accepted shapes.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Hierarchy {
    /// Entries keyed by name; each name is a single path segment
    Map(BTreeMap<String, Item>),
    /// Entries in caller order; names must be unique within the list
    List(Vec<ListItem>),
}

/// The content associated with a named entry of a loose hierarchy
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Item {
    /// No content given; shorthand for an empty file
    Unspecified,
    /// An explicit file or (empty) directory marker
    Kind(ItemType),
    /// A nested hierarchy, making the entry a directory
    Nested(Hierarchy),
}

/// One entry of the ordered-list form of a loose hierarchy
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum ListItem {
    /// A bare name, implying a file
    Name(String),
    /// A name paired with its content
    Pair(String, Item),
}

impl Hierarchy {
    /// Builds the mapping form from (name, content) pairs
    ///
    /// Later entries silently replace earlier ones with the same name, as in
    /// any mapping.
    pub fn map<I, K, V>(entries: I) -> Self
    where
        I: IntoIterator<Item = (K, V)>,
        K: Into<String>,
        V: Into<Item>,
    {
        Hierarchy::Map(
            entries
                .into_iter()
                .map(|(name, item)| (name.into(), item.into()))
                .collect(),
        )
    }

    /// Builds the ordered-list form from names and (name, content) pairs
    pub fn list<I, T>(entries: I) -> Self
    where
        I: IntoIterator<Item = T>,
        T: Into<ListItem>,
    {
        Hierarchy::List(entries.into_iter().map(Into::into).collect())
    }
}

impl ListItem {
    /// A named entry with the given content
    pub fn pair(name: impl Into<String>, content: impl Into<Item>) -> Self {
        ListItem::Pair(name.into(), content.into())
    }
}

impl From<ItemType> for Item {
    fn from(kind: ItemType) -> Self {
        Item::Kind(kind)
    }
}

impl From<Hierarchy> for Item {
    fn from(hierarchy: Hierarchy) -> Self {
        Item::Nested(hierarchy)
    }
}

impl From<&str> for ListItem {
    fn from(name: &str) -> Self {
        ListItem::Name(name.to_owned())
    }
}

impl From<String> for ListItem {
    fn from(name: String) -> Self {
        ListItem::Name(name)
    }
}

/// The canonical, unified description of a tree of files and directories
///
/// Every key is a single path segment; every value is either a file marker or
/// a nested tree. An empty tree is an empty directory. This is the only form
/// the materializer, reader and comparisons operate on.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct FileTree(BTreeMap<String, Node>);

/// A single entry of a [`FileTree`]
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Node {
    /// A regular file (contents are never captured, only the name)
    File,
    /// A directory and its children
    Directory(FileTree),
}

impl FileTree {
    /// An empty tree (an empty directory)
    pub fn new() -> Self {
        FileTree(BTreeMap::new())
    }

    /// True if the tree has no entries
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// The number of direct entries
    pub fn len(&self) -> usize {
        self.0.len()
    }

    /// Looks up a direct entry by name
    pub fn get(&self, name: &str) -> Option<&Node> {
        self.0.get(name)
    }

    /// Iterates over direct entries in name order
    pub fn iter(&self) -> impl Iterator<Item = (&str, &Node)> {
        self.0.iter().map(|(name, node)| (name.as_str(), node))
    }
}

/// A unified tree is itself a well-formed loose hierarchy, so unification can
/// be applied to its own output
impl From<FileTree> for Hierarchy {
    fn from(tree: FileTree) -> Self {
        Hierarchy::Map(
            tree.0
                .into_iter()
                .map(|(name, node)| {
                    let item = match node {
                        Node::File => Item::Kind(ItemType::File),
                        Node::Directory(children) => Item::Nested(children.into()),
                    };
                    (name, item)
                })
                .collect(),
        )
    }
}

/// A loose hierarchy that violates the hierarchy grammar
#[derive(Clone, Debug, PartialEq, Eq, thiserror::Error)]
pub enum MalformedHierarchyError {
    /// A name appeared more than once within one list
    #[error("duplicate item with name {0}")]
    DuplicateItem(String),
    /// A list pair carried content that does not describe an item
    #[error("unknown item content for item {0}")]
    UnknownItemContent(String),
}

/// Normalizes a loose hierarchy into its canonical [`FileTree`] form
///
/// This is a pure transformation; nothing touches the disk. Unification is
/// idempotent: feeding a unified tree back in (via `Hierarchy::from`) yields
/// an equal tree.
pub fn unify(hierarchy: Hierarchy) -> Result<FileTree, MalformedHierarchyError> {
    match hierarchy {
        Hierarchy::Map(entries) => {
            let mut tree = BTreeMap::new();
            for (name, item) in entries {
                tree.insert(name, unify_item(item)?);
            }
            Ok(FileTree(tree))
        }
        Hierarchy::List(entries) => unify_list(entries),
    }
}

fn unify_item(item: Item) -> Result<Node, MalformedHierarchyError> {
    Ok(match item {
        Item::Unspecified | Item::Kind(ItemType::File) => Node::File,
        Item::Kind(ItemType::Directory) => Node::Directory(FileTree::new()),
        Item::Nested(hierarchy) => Node::Directory(unify(hierarchy)?),
    })
}

fn unify_list(entries: Vec<ListItem>) -> Result<FileTree, MalformedHierarchyError> {
    let mut tree = BTreeMap::new();
    for entry in entries {
        let (name, node) = match entry {
            ListItem::Name(name) => (name, Node::File),
            // An unspecified pair is the one shape the list grammar rejects
            ListItem::Pair(name, Item::Unspecified) => {
                return Err(MalformedHierarchyError::UnknownItemContent(name));
            }
            ListItem::Pair(name, item) => {
                let node = unify_item(item)?;
                (name, node)
            }
        };
        match tree.entry(name) {
            btree_map::Entry::Occupied(occupied) => {
                return Err(MalformedHierarchyError::DuplicateItem(occupied.key().clone()));
            }
            btree_map::Entry::Vacant(vacant) => {
                vacant.insert(node);
            }
        }
    }
    Ok(FileTree(tree))
}

/// Creates the described files and directories under the given base directory
///
/// The base directory must already exist; passing anything else is a caller
/// contract violation and panics. Every described entry must be new: colliding
/// with a pre-existing path is an error, since this is meant for building
/// fixtures in a clean directory, not for reconciling trees (see the [`copy`]
/// module for that).
///
/// Returns the unified tree that was created, ready to be compared against a
/// later [`read_children_as_file_tree`].
///
/// [`copy`]: crate::copy
pub fn create_file_tree(
    directory: impl AsRef<Utf8Path>,
    hierarchy: Hierarchy,
) -> Result<FileTree> {
    let directory = directory.as_ref();
    assert!(
        directory.is_dir(),
        "base directory {directory} must be an existing directory"
    );
    let tree = unify(hierarchy)?;
    create_nodes(directory, &tree)?;
    Ok(tree)
}

fn create_nodes(directory: &Utf8Path, tree: &FileTree) -> Result<()> {
    for (name, node) in tree.iter() {
        let path = directory.join(name);
        match node {
            Node::File => {
                debug!("Creating file {path}");
                OpenOptions::new()
                    .write(true)
                    .create_new(true)
                    .open(&path)
                    .with_context(|| format!("Creating file {path}"))?;
            }
            Node::Directory(children) => {
                debug!("Creating directory {path}");
                fs::create_dir(&path).with_context(|| format!("Creating directory {path}"))?;
                create_nodes(&path, children)?;
            }
        }
    }
    Ok(())
}

/// Reads the direct and nested children of a directory back into canonical
/// form
///
/// Only names and kinds are captured, never file contents, so comparing the
/// result against a unified hierarchy verifies structural shape. Entries that
/// are neither files nor directories (broken symlinks, sockets and the like)
/// are skipped with a diagnostic note. Symlinks are followed when classifying.
pub fn read_children_as_file_tree(directory: impl AsRef<Utf8Path>) -> Result<FileTree> {
    read_children(directory.as_ref())
}

fn read_children(directory: &Utf8Path) -> Result<FileTree> {
    let mut tree = BTreeMap::new();
    let listing_context = || format!("Listing directory {directory}");
    for entry in fs::read_dir(directory).with_context(listing_context)? {
        let entry = entry.with_context(listing_context)?;
        let name = entry.file_name().to_string_lossy().into_owned();
        let path = directory.join(&name);
        let node = match fs::metadata(&path) {
            Ok(metadata) if metadata.is_file() => Node::File,
            Ok(metadata) if metadata.is_dir() => Node::Directory(read_children(&path)?),
            Ok(_) => {
                debug!("Skipping {path}: neither a file nor a directory");
                continue;
            }
            Err(error) => {
                debug!("Skipping {path}: {error}");
                continue;
            }
        };
        tree.insert(name, node);
    }
    Ok(FileTree(tree))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn file_entry(name: &str) -> (String, Node) {
        (name.to_owned(), Node::File)
    }

    #[test]
    fn unify_map_shorthands() {
        let tree = unify(Hierarchy::map([
            ("unspecified.txt", Item::Unspecified),
            ("marked.txt", ItemType::File.into()),
            ("empty_dir", ItemType::Directory.into()),
        ]))
        .unwrap();
        assert_eq!(tree.get("unspecified.txt"), Some(&Node::File));
        assert_eq!(tree.get("marked.txt"), Some(&Node::File));
        assert_eq!(
            tree.get("empty_dir"),
            Some(&Node::Directory(FileTree::new()))
        );
    }

    #[test]
    fn unify_nested_list_and_map() {
        let tree = unify(Hierarchy::map([(
            "sub_dir",
            Item::Nested(Hierarchy::map([(
                "deeper",
                Item::Nested(Hierarchy::list(["a.txt", "b.txt"])),
            )])),
        )]))
        .unwrap();
        let expected = FileTree(
            [(
                "sub_dir".to_owned(),
                Node::Directory(FileTree(
                    [(
                        "deeper".to_owned(),
                        Node::Directory(FileTree(
                            [file_entry("a.txt"), file_entry("b.txt")].into(),
                        )),
                    )]
                    .into(),
                )),
            )]
            .into(),
        );
        assert_eq!(tree, expected);
    }

    #[test]
    fn unify_top_level_list() {
        let tree = unify(Hierarchy::list([
            ListItem::from("file.txt"),
            ListItem::pair("sub_dir", Hierarchy::list(["inner.txt"])),
            ListItem::pair("empty", ItemType::Directory),
            ListItem::pair("marked.txt", ItemType::File),
        ]))
        .unwrap();
        assert_eq!(tree.get("file.txt"), Some(&Node::File));
        assert_eq!(tree.get("marked.txt"), Some(&Node::File));
        assert_eq!(tree.get("empty"), Some(&Node::Directory(FileTree::new())));
        assert_eq!(
            tree.get("sub_dir"),
            Some(&Node::Directory(FileTree([file_entry("inner.txt")].into())))
        );
    }

    #[test]
    fn unify_rejects_duplicate_bare_names() {
        let error = unify(Hierarchy::list(["a.txt", "a.txt"])).unwrap_err();
        assert_eq!(
            error,
            MalformedHierarchyError::DuplicateItem("a.txt".to_owned())
        );
        assert!(error.to_string().contains("a.txt"));
        assert!(error.to_string().contains("duplicate item"));
    }

    #[test]
    fn unify_rejects_duplicate_paired_names() {
        let error = unify(Hierarchy::list([
            ListItem::from("a.txt"),
            ListItem::pair("a.txt", ItemType::File),
        ]))
        .unwrap_err();
        assert_eq!(
            error,
            MalformedHierarchyError::DuplicateItem("a.txt".to_owned())
        );
    }

    #[test]
    fn unify_rejects_unspecified_pair_content() {
        let error = unify(Hierarchy::List(vec![ListItem::Pair(
            "odd".to_owned(),
            Item::Unspecified,
        )]))
        .unwrap_err();
        assert_eq!(
            error,
            MalformedHierarchyError::UnknownItemContent("odd".to_owned())
        );
    }

    #[test]
    fn unify_is_idempotent() {
        let unified = unify(Hierarchy::map([
            ("file.txt", Item::Unspecified),
            ("sub_dir", Item::Nested(Hierarchy::list(["inner.txt"]))),
            ("empty", ItemType::Directory.into()),
        ]))
        .unwrap();
        let again = unify(Hierarchy::from(unified.clone())).unwrap();
        assert_eq!(again, unified);
    }

    #[test]
    fn empty_hierarchies_unify_to_empty_trees() {
        assert!(unify(Hierarchy::Map(BTreeMap::new())).unwrap().is_empty());
        assert!(unify(Hierarchy::List(Vec::new())).unwrap().is_empty());
    }
}
