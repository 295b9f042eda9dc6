use std::fmt;

use crate::errors::ErrorCode;

/// The closed set of resource kinds guarded by ownership checks.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ResourceKind {
    Photo,
    Comment,
    SocialMedia,
}

impl ResourceKind {
    pub const ALL: [ResourceKind; 3] = [
        ResourceKind::Photo,
        ResourceKind::Comment,
        ResourceKind::SocialMedia,
    ];

    /// Name of the route path parameter carrying this kind's id.
    pub const fn path_param(&self) -> &'static str {
        match self {
            Self::Photo => "photo_id",
            Self::Comment => "comment_id",
            Self::SocialMedia => "socialmedia_id",
        }
    }

    /// Resource type name used in client-facing messages and bodies.
    pub const fn noun(&self) -> &'static str {
        match self {
            Self::Photo => "photo",
            Self::Comment => "comment",
            Self::SocialMedia => "socialmedia",
        }
    }

    /// Capitalized label used in not-found messages.
    pub const fn label(&self) -> &'static str {
        match self {
            Self::Photo => "Photo",
            Self::Comment => "Comment",
            Self::SocialMedia => "Social Media",
        }
    }

    pub const fn not_found_code(&self) -> ErrorCode {
        match self {
            Self::Photo => ErrorCode::PhotoNotFound,
            Self::Comment => ErrorCode::CommentNotFound,
            Self::SocialMedia => ErrorCode::SocialMediaNotFound,
        }
    }
}

impl fmt::Display for ResourceKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.noun())
    }
}
