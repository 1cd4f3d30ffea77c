//! Lexical path comparison.
//!
//! Task scopes and settings scopes are matched against a deploy target by
//! comparing normalized segment lists, never by substring. Nothing here
//! touches the filesystem, so paths that do not exist still compare.

use std::path::{Component, Path};

const ROOT: &str = "/";
const PARENT: &str = "..";

/// How one path relates to another.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PathRelation {
  /// Both paths normalize to the same segments.
  Equal,
  /// The first path is a strict ancestor of the second.
  AncestorOf,
  /// Anything else, including the first path being a descendant.
  Unrelated,
}

impl PathRelation {
  /// True for `Equal` and `AncestorOf`.
  pub fn contains(self) -> bool {
    matches!(self, PathRelation::Equal | PathRelation::AncestorOf)
  }
}

/// Normalize a path into its segments.
///
/// `.` is dropped, `..` pops the previous segment (but never climbs above the
/// root), and repeated or trailing separators disappear. Absolute paths keep a
/// leading root marker so they never compare equal to relative ones. Segments
/// are case-folded on Windows.
pub fn normalize(path: &Path) -> Vec<String> {
  let mut segments: Vec<String> = Vec::new();
  let mut anchored = 0;

  for component in path.components() {
    match component {
      Component::Prefix(prefix) => {
        segments.push(fold_case(&prefix.as_os_str().to_string_lossy()));
        anchored += 1;
      }
      Component::RootDir => {
        segments.push(ROOT.to_string());
        anchored += 1;
      }
      Component::CurDir => {}
      Component::ParentDir => {
        let can_pop = segments.len() > anchored && segments.last().is_some_and(|s| s != PARENT);
        if can_pop {
          segments.pop();
        } else if anchored == 0 {
          segments.push(PARENT.to_string());
        }
      }
      Component::Normal(part) => segments.push(fold_case(&part.to_string_lossy())),
    }
  }

  segments
}

/// Compare `a` against `b`.
pub fn path_relation(a: &Path, b: &Path) -> PathRelation {
  let a = normalize(a);
  let b = normalize(b);

  if a == b {
    PathRelation::Equal
  } else if !a.is_empty() && a.len() < b.len() && b.starts_with(&a) {
    PathRelation::AncestorOf
  } else {
    PathRelation::Unrelated
  }
}

/// True when `ancestor` is `path` itself or one of its ancestors.
pub fn path_contains(ancestor: &Path, path: &Path) -> bool {
  path_relation(ancestor, path).contains()
}

fn fold_case(segment: &str) -> String {
  if cfg!(windows) {
    segment.to_lowercase()
  } else {
    segment.to_string()
  }
}
