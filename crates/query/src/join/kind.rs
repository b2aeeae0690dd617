//! Join kinds a join view can be asked for.

use core::fmt;

/// Join kind for a join view. Only `Inner` is provided.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
pub enum JoinKind {
    #[default]
    Inner,
    LeftOuter,
    RightOuter,
    FullOuter,
    Cross,
}

impl JoinKind {
    /// Whether a join view can compose rows with this kind.
    #[inline]
    pub fn is_supported(self) -> bool {
        self == JoinKind::Inner
    }
}

impl fmt::Display for JoinKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            JoinKind::Inner => "inner join",
            JoinKind::LeftOuter => "left outer join",
            JoinKind::RightOuter => "right outer join",
            JoinKind::FullOuter => "full outer join",
            JoinKind::Cross => "cross join",
        };
        f.write_str(name)
    }
}
