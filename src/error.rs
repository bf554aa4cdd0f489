// `npoint_nostd_internal` returns `&'static str` everywhere, while this crate
// defines a proper Error type and wraps the stringly errors whenever they
// cross the crate boundary.
//
// Every problem we currently report is a configuration problem. Faults that
// occur during a traversal are panics raised by a matcher, and they are never
// converted into an `Error` (a partial traversal isn't a usable result).

#[derive(Debug)]
pub struct Error {
    kind: ErrorKind,
}

/// The underlying internal error type
#[non_exhaustive]
#[derive(Clone, Debug)]
enum ErrorKind {
    /// An error that occurs when the trees disagree about the number of
    /// spatial dimensions
    DimensionMismatch(DimensionMismatchError),
    /// An error that occurs when a tree without any points is configured
    EmptyTree(EmptyTreeError),
    /// An error that occurs when no trees are configured
    EmptyTreeList(EmptyTreeListError),
    /// An error that occurs within `npoint_nostd_internal`
    InternalLegacyAdHoc(InternalLegacyAdHocError),
    /// An error that occurs when a matcher is constructed with bad parameters
    MatcherConfig(MatcherConfigError),
    /// An error that occurs when a tree is assigned a multiplicity of 0
    Multiplicity(MultiplicityError),
    /// An error that occurs when the matcher expects a different number of
    /// slots than the configuration provides
    TupleSize(TupleSizeError),
}

// define constructor methods for Error
impl Error {
    /// produce an error indicating that the tree at `tree_index` has a
    /// different number of spatial dimensions than the first tree
    pub(crate) fn dimension_mismatch(tree_index: usize, expected: usize, actual: usize) -> Self {
        Error {
            kind: ErrorKind::DimensionMismatch(DimensionMismatchError {
                tree_index,
                expected,
                actual,
            }),
        }
    }

    /// produce an error indicating that the tree at `tree_index` is empty
    pub(crate) fn empty_tree(tree_index: usize) -> Self {
        Error {
            kind: ErrorKind::EmptyTree(EmptyTreeError { tree_index }),
        }
    }

    /// produce an error indicating that no trees were configured
    pub(crate) fn empty_tree_list() -> Self {
        Error {
            kind: ErrorKind::EmptyTreeList(EmptyTreeListError),
        }
    }

    /// wraps a legacy internal error string
    pub(crate) fn internal_legacy_adhoc(message: &'static str) -> Self {
        Error {
            kind: ErrorKind::InternalLegacyAdHoc(InternalLegacyAdHocError(message)),
        }
    }

    /// produce an error describing a problem with a matcher's parameters
    pub(crate) fn matcher_config(matcher: &'static str, what: String) -> Self {
        Error {
            kind: ErrorKind::MatcherConfig(MatcherConfigError { matcher, what }),
        }
    }

    /// produce an error indicating that the tree at `tree_index` was assigned
    /// a multiplicity of 0
    pub(crate) fn multiplicity(tree_index: usize) -> Self {
        Error {
            kind: ErrorKind::Multiplicity(MultiplicityError { tree_index }),
        }
    }

    /// produce an error indicating that the matcher expects `expected` slots
    pub(crate) fn tuple_size(expected: usize, actual: usize) -> Self {
        Error {
            kind: ErrorKind::TupleSize(TupleSizeError { expected, actual }),
        }
    }
}

impl std::error::Error for Error {}

impl core::fmt::Display for Error {
    fn fmt(&self, f: &mut core::fmt::Formatter) -> core::fmt::Result {
        self.kind.fmt(f)
    }
}

impl std::error::Error for ErrorKind {}

impl core::fmt::Display for ErrorKind {
    fn fmt(&self, f: &mut core::fmt::Formatter) -> core::fmt::Result {
        match *self {
            ErrorKind::DimensionMismatch(ref err) => err.fmt(f),
            ErrorKind::EmptyTree(ref err) => err.fmt(f),
            ErrorKind::EmptyTreeList(ref err) => err.fmt(f),
            ErrorKind::InternalLegacyAdHoc(ref msg) => msg.fmt(f),
            ErrorKind::MatcherConfig(ref err) => err.fmt(f),
            ErrorKind::Multiplicity(ref err) => err.fmt(f),
            ErrorKind::TupleSize(ref err) => err.fmt(f),
        }
    }
}

/// An error that occurs when the trees disagree about the number of spatial
/// dimensions
#[derive(Clone, Debug)]
struct DimensionMismatchError {
    tree_index: usize,
    expected: usize,
    actual: usize,
}

impl std::error::Error for DimensionMismatchError {}

impl core::fmt::Display for DimensionMismatchError {
    fn fmt(&self, f: &mut core::fmt::Formatter) -> core::fmt::Result {
        write!(
            f,
            "tree {} has {} spatial dimensions. It should have {}",
            self.tree_index, self.actual, self.expected
        )
    }
}

/// An error that occurs when a tree without any points is configured
#[derive(Clone, Debug)]
struct EmptyTreeError {
    tree_index: usize,
}

impl std::error::Error for EmptyTreeError {}

impl core::fmt::Display for EmptyTreeError {
    fn fmt(&self, f: &mut core::fmt::Formatter) -> core::fmt::Result {
        write!(f, "tree {} doesn't hold any points", self.tree_index)
    }
}

/// An error that occurs when no trees are configured
#[derive(Clone, Debug)]
struct EmptyTreeListError;

impl std::error::Error for EmptyTreeListError {}

impl core::fmt::Display for EmptyTreeListError {
    fn fmt(&self, f: &mut core::fmt::Formatter) -> core::fmt::Result {
        write!(f, "at least one tree must be specified")
    }
}

/// A temporary type that wraps the string errors from
/// `npoint_nostd_internal`.
#[derive(Clone)]
struct InternalLegacyAdHocError(&'static str);

impl std::error::Error for InternalLegacyAdHocError {}

impl core::fmt::Display for InternalLegacyAdHocError {
    fn fmt(&self, f: &mut core::fmt::Formatter) -> core::fmt::Result {
        core::fmt::Display::fmt(&self.0, f)
    }
}

impl core::fmt::Debug for InternalLegacyAdHocError {
    fn fmt(&self, f: &mut core::fmt::Formatter) -> core::fmt::Result {
        core::fmt::Debug::fmt(&self.0, f)
    }
}

/// An error that occurs when a matcher is constructed with bad parameters
#[derive(Clone, Debug)]
struct MatcherConfigError {
    matcher: &'static str,
    // TODO: chain the underlying error rather than flattening it to a String
    what: String,
}

impl std::error::Error for MatcherConfigError {}

impl core::fmt::Display for MatcherConfigError {
    fn fmt(&self, f: &mut core::fmt::Formatter) -> core::fmt::Result {
        let MatcherConfigError { matcher, what } = self;
        write!(f, "problem with the {matcher} configuration: {what}")
    }
}

/// An error that occurs when a tree is assigned a multiplicity of 0
#[derive(Clone, Debug)]
struct MultiplicityError {
    tree_index: usize,
}

impl std::error::Error for MultiplicityError {}

impl core::fmt::Display for MultiplicityError {
    fn fmt(&self, f: &mut core::fmt::Formatter) -> core::fmt::Result {
        write!(
            f,
            "tree {} has a multiplicity of 0. Each tree must fill at least one slot",
            self.tree_index
        )
    }
}

/// An error that occurs when the matcher expects a different number of slots
/// than the sum of the multiplicities
#[derive(Clone, Debug)]
struct TupleSizeError {
    expected: usize,
    actual: usize,
}

impl std::error::Error for TupleSizeError {}

impl core::fmt::Display for TupleSizeError {
    fn fmt(&self, f: &mut core::fmt::Formatter) -> core::fmt::Result {
        write!(
            f,
            "the matcher operates on {}-tuples, but the multiplicities add up to {}",
            self.expected, self.actual
        )
    }
}
