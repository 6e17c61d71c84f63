//! Utilities for declaratively building, reading back and copying small
//! trees of files and directories, geared towards test fixtures.
//!
//! # Describing a tree
//!
//! A tree is described by a loose [`Hierarchy`], which accepts a few
//! shorthands: a mapping of names to content, an ordered list of names, an
//! [`Item::Unspecified`] (meaning "empty file") or an explicit [`ItemType`]
//! marker. [`unify`] normalizes every accepted shape into the canonical
//! [`FileTree`] form, and [`create_file_tree`] materializes it on disk:
//!
//! ```
//! use fixtree::{
//!     create_file_tree, read_children_as_file_tree, Hierarchy, Item, TempDir,
//! };
//!
//! let base = TempDir::create("fixtree_doc_tree")?;
//! let created = create_file_tree(
//!     base.path(),
//!     Hierarchy::map([
//!         ("README.md", Item::Unspecified),
//!         ("src", Hierarchy::list(["lib.rs", "main.rs"]).into()),
//!     ]),
//! )?;
//!
//! assert!(base.path().join("src/lib.rs").is_file());
//! assert_eq!(read_children_as_file_tree(base.path())?, created);
//! # Ok::<(), anyhow::Error>(())
//! ```
//!
//! Reading a tree back captures names and kinds only, never file contents,
//! so the comparison above verifies structural shape.
//!
//! # Copying trees
//!
//! [`copy_children`] replicates one existing directory's entries into
//! another, with a configurable policy for merging directories and
//! overwriting files:
//!
//! ```
//! use fixtree::{copy_children, CopyOptions, TempDir};
//!
//! let source = TempDir::create("fixtree_doc_source")?;
//! let target = TempDir::create("fixtree_doc_target")?;
//! std::fs::write(source.path().join("notes.txt").as_std_path(), "contents")?;
//!
//! copy_children(source.path(), target.path(), CopyOptions::default())?;
//! assert!(target.path().join("notes.txt").is_file());
//! # Ok::<(), anyhow::Error>(())
//! ```
//!
//! The copier favors clear conflict reporting over speed and offers no
//! rollback; see the [`copy`] module for the exact rules.
//!
//! Beyond these, the [`temp`] module provides the scoped temporary files and
//! directories used above, and the [`flags`] and [`assertion`] modules cover
//! the executable permission bit and friendly path preconditions.
#![warn(missing_docs)]

pub mod assertion;
pub mod copy;
pub mod flags;
pub mod temp;
pub mod tree;

pub use self::{
    copy::{copy, copy_children, CopyError, CopyOptions},
    temp::{TempDir, TempFile},
    tree::{
        create_file_tree, read_children_as_file_tree, unify, FileTree, Hierarchy, Item, ItemType,
        ListItem, MalformedHierarchyError, Node,
    },
};
