//! Explicit call paths used as execution-state fingerprints.
//!
//! A guided program reports where it is before every value request. Instead of
//! unwinding the native stack, each construction step extends a [`CallPath`]
//! with a [`Frame`] naming the function and the source line of the call, and
//! hands the extended path down.

use std::fmt;
use std::hash::{Hash, Hasher};
use std::rc::Rc;

/// Record the current function and line as a [`Frame`].
///
/// The function name is qualified with the caller's module path, e.g.
/// `frame!("grow")` inside `guidetree::application::builder` yields
/// `guidetree::application::builder::grow.<line>`.
#[macro_export]
macro_rules! frame {
    ($name:literal) => {
        $crate::domain::Frame::new(concat!(module_path!(), "::", $name), line!())
    };
}

/// One active call: qualified function name and the line currently executing.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Frame {
    pub function: &'static str,
    pub line: u32,
}

impl Frame {
    pub const fn new(function: &'static str, line: u32) -> Self {
        Self { function, line }
    }
}

impl fmt::Display for Frame {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}.{}", self.function, self.line)
    }
}

/// Most frames a report lists. Deeper paths report only their innermost
/// frames, so positions below this depth share a state.
pub const MAX_REPORTED_FRAMES: usize = 30;

/// Chain of active frames. Extending a path shares its parent, so every call
/// level costs one allocation regardless of depth.
#[derive(Debug, Clone, Default)]
pub struct CallPath {
    head: Option<Rc<Link>>,
}

#[derive(Debug)]
struct Link {
    frame: Frame,
    depth: usize,
    parent: Option<Rc<Link>>,
}

impl CallPath {
    pub fn new() -> Self {
        Self::default()
    }

    /// A new path with `frame` as the innermost call.
    pub fn with(&self, frame: Frame) -> Self {
        Self {
            head: Some(Rc::new(Link {
                frame,
                depth: self.depth() + 1,
                parent: self.head.clone(),
            })),
        }
    }

    /// Frames innermost first, the order they are reported in.
    pub fn frames(&self) -> impl Iterator<Item = &Frame> {
        std::iter::successors(self.head.as_deref(), |link| link.parent.as_deref())
            .map(|link| &link.frame)
    }

    pub fn depth(&self) -> usize {
        self.head.as_ref().map_or(0, |link| link.depth)
    }

    pub fn is_empty(&self) -> bool {
        self.head.is_none()
    }

    /// Serialise as `frame;frame;...;`, innermost first, at most
    /// [`MAX_REPORTED_FRAMES`] frames.
    pub fn report(&self) -> String {
        self.to_string()
    }
}

impl PartialEq for CallPath {
    fn eq(&self, other: &Self) -> bool {
        self.depth() == other.depth() && self.frames().eq(other.frames())
    }
}

impl Eq for CallPath {}

impl Hash for CallPath {
    fn hash<H: Hasher>(&self, state: &mut H) {
        for frame in self.frames() {
            frame.hash(state);
        }
    }
}

impl fmt::Display for CallPath {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for frame in self.frames().take(MAX_REPORTED_FRAMES) {
            write!(f, "{frame};")?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn given_empty_path_when_reporting_then_empty_string() {
        assert_eq!(CallPath::new().report(), "");
    }

    #[test]
    fn given_nested_frames_when_reporting_then_innermost_first() {
        let path = CallPath::new()
            .with(Frame::new("bst::main", 19))
            .with(Frame::new("builder::grow", 51))
            .with(Frame::new("builder::grow", 46));

        assert_eq!(path.report(), "builder::grow.46;builder::grow.51;bst::main.19;");
        assert_eq!(path.depth(), 3);
    }

    #[test]
    fn given_path_when_extending_then_parent_is_unchanged() {
        let root = CallPath::new().with(Frame::new("main", 1));
        let child = root.with(Frame::new("build", 2));

        assert_eq!(root.depth(), 1);
        assert_eq!(child.depth(), 2);
    }

    #[test]
    fn given_frame_macro_then_qualifies_with_module_path() {
        let frame = crate::frame!("lookup");
        assert_eq!(frame.function, "guidetree::domain::call_path::tests::lookup");
        assert!(frame.line > 0);
    }

    #[test]
    fn given_path_deeper_than_report_limit_when_reporting_then_keeps_innermost_frames() {
        let mut path = CallPath::new().with(Frame::new("main", 1));
        for line in 0..40 {
            path = path.with(Frame::new("grow", 100 + line));
        }

        let report = path.report();

        assert_eq!(path.depth(), 41);
        assert_eq!(report.matches(';').count(), MAX_REPORTED_FRAMES);
        assert!(report.starts_with("grow.139;grow.138;"));
        assert!(!report.contains("main.1;"));
    }

    #[test]
    fn given_shared_parent_when_extending_twice_then_siblings_differ_only_at_head() {
        let parent = CallPath::new().with(Frame::new("main", 1));
        let left = parent.with(Frame::new("grow", 10));
        let right = parent.with(Frame::new("grow", 11));

        assert_ne!(left, right);
        assert_eq!(left.frames().nth(1), right.frames().nth(1));
        assert_eq!(parent.with(Frame::new("grow", 10)), left);
    }
}
