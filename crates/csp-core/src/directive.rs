//! Directive names recognised by the parser
//!
//! The tokenizer classifies every directive-name token into a
//! [`DirectiveKind`] up front; the parser dispatches on it with an exhaustive
//! match, so adding a directive here forces a decision about its grammar.

use std::fmt;

/// Every directive name the parser knows about, plus a catch-all.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, serde::Serialize)]
#[serde(rename_all = "kebab-case")]
pub enum DirectiveKind {
    BaseUri,
    BlockAllMixedContent,
    ChildSrc,
    ConnectSrc,
    DefaultSrc,
    FontSrc,
    FormAction,
    FrameAncestors,
    FrameSrc,
    ImgSrc,
    ManifestSrc,
    MediaSrc,
    NavigateTo,
    ObjectSrc,
    PluginTypes,
    PrefetchSrc,
    Referrer,
    ReportTo,
    ReportUri,
    RequireSriFor,
    Sandbox,
    ScriptSrc,
    ScriptSrcAttr,
    ScriptSrcElem,
    StyleSrc,
    StyleSrcAttr,
    StyleSrcElem,
    UpgradeInsecureRequests,
    WorkerSrc,
    /// Pre-standard name, replaced by `default-src`
    Allow,
    /// Pre-standard name, replaced by `'unsafe-inline'` / `'unsafe-eval'`
    Options,
    Unrecognised,
}

impl DirectiveKind {
    /// Classify a directive name. Matching is ASCII case-insensitive.
    pub fn from_name(name: &str) -> Self {
        match name.to_ascii_lowercase().as_str() {
            "base-uri" => DirectiveKind::BaseUri,
            "block-all-mixed-content" => DirectiveKind::BlockAllMixedContent,
            "child-src" => DirectiveKind::ChildSrc,
            "connect-src" => DirectiveKind::ConnectSrc,
            "default-src" => DirectiveKind::DefaultSrc,
            "font-src" => DirectiveKind::FontSrc,
            "form-action" => DirectiveKind::FormAction,
            "frame-ancestors" => DirectiveKind::FrameAncestors,
            "frame-src" => DirectiveKind::FrameSrc,
            "img-src" => DirectiveKind::ImgSrc,
            "manifest-src" => DirectiveKind::ManifestSrc,
            "media-src" => DirectiveKind::MediaSrc,
            "navigate-to" => DirectiveKind::NavigateTo,
            "object-src" => DirectiveKind::ObjectSrc,
            "plugin-types" => DirectiveKind::PluginTypes,
            "prefetch-src" => DirectiveKind::PrefetchSrc,
            "referrer" => DirectiveKind::Referrer,
            "report-to" => DirectiveKind::ReportTo,
            "report-uri" => DirectiveKind::ReportUri,
            "require-sri-for" => DirectiveKind::RequireSriFor,
            "sandbox" => DirectiveKind::Sandbox,
            "script-src" => DirectiveKind::ScriptSrc,
            "script-src-attr" => DirectiveKind::ScriptSrcAttr,
            "script-src-elem" => DirectiveKind::ScriptSrcElem,
            "style-src" => DirectiveKind::StyleSrc,
            "style-src-attr" => DirectiveKind::StyleSrcAttr,
            "style-src-elem" => DirectiveKind::StyleSrcElem,
            "upgrade-insecure-requests" => DirectiveKind::UpgradeInsecureRequests,
            "worker-src" => DirectiveKind::WorkerSrc,
            "allow" => DirectiveKind::Allow,
            "options" => DirectiveKind::Options,
            _ => DirectiveKind::Unrecognised,
        }
    }

    /// Canonical lowercase name as it appears in a header.
    pub fn name(self) -> &'static str {
        match self {
            DirectiveKind::BaseUri => "base-uri",
            DirectiveKind::BlockAllMixedContent => "block-all-mixed-content",
            DirectiveKind::ChildSrc => "child-src",
            DirectiveKind::ConnectSrc => "connect-src",
            DirectiveKind::DefaultSrc => "default-src",
            DirectiveKind::FontSrc => "font-src",
            DirectiveKind::FormAction => "form-action",
            DirectiveKind::FrameAncestors => "frame-ancestors",
            DirectiveKind::FrameSrc => "frame-src",
            DirectiveKind::ImgSrc => "img-src",
            DirectiveKind::ManifestSrc => "manifest-src",
            DirectiveKind::MediaSrc => "media-src",
            DirectiveKind::NavigateTo => "navigate-to",
            DirectiveKind::ObjectSrc => "object-src",
            DirectiveKind::PluginTypes => "plugin-types",
            DirectiveKind::PrefetchSrc => "prefetch-src",
            DirectiveKind::Referrer => "referrer",
            DirectiveKind::ReportTo => "report-to",
            DirectiveKind::ReportUri => "report-uri",
            DirectiveKind::RequireSriFor => "require-sri-for",
            DirectiveKind::Sandbox => "sandbox",
            DirectiveKind::ScriptSrc => "script-src",
            DirectiveKind::ScriptSrcAttr => "script-src-attr",
            DirectiveKind::ScriptSrcElem => "script-src-elem",
            DirectiveKind::StyleSrc => "style-src",
            DirectiveKind::StyleSrcAttr => "style-src-attr",
            DirectiveKind::StyleSrcElem => "style-src-elem",
            DirectiveKind::UpgradeInsecureRequests => "upgrade-insecure-requests",
            DirectiveKind::WorkerSrc => "worker-src",
            DirectiveKind::Allow => "allow",
            DirectiveKind::Options => "options",
            DirectiveKind::Unrecognised => "unrecognised",
        }
    }

    /// Whether the directive's value is a whitespace-separated list.
    ///
    /// The tokenizer splits list values into sub-directive-value tokens and
    /// keeps every other value as a single directive-value token.
    pub fn is_list_valued(self) -> bool {
        self.is_source_list()
            || matches!(
                self,
                DirectiveKind::FrameAncestors
                    | DirectiveKind::PluginTypes
                    | DirectiveKind::ReportUri
                    | DirectiveKind::RequireSriFor
                    | DirectiveKind::Sandbox
            )
    }

    /// Whether the directive takes a (full) source-list.
    pub fn is_source_list(self) -> bool {
        matches!(
            self,
            DirectiveKind::BaseUri
                | DirectiveKind::ChildSrc
                | DirectiveKind::ConnectSrc
                | DirectiveKind::DefaultSrc
                | DirectiveKind::FontSrc
                | DirectiveKind::FormAction
                | DirectiveKind::FrameSrc
                | DirectiveKind::ImgSrc
                | DirectiveKind::ManifestSrc
                | DirectiveKind::MediaSrc
                | DirectiveKind::NavigateTo
                | DirectiveKind::ObjectSrc
                | DirectiveKind::PrefetchSrc
                | DirectiveKind::ScriptSrc
                | DirectiveKind::ScriptSrcAttr
                | DirectiveKind::ScriptSrcElem
                | DirectiveKind::StyleSrc
                | DirectiveKind::StyleSrcAttr
                | DirectiveKind::StyleSrcElem
                | DirectiveKind::WorkerSrc
        )
    }
}

impl fmt::Display for DirectiveKind {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        f.write_str(self.name())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const ALL: [DirectiveKind; 31] = [
        DirectiveKind::BaseUri,
        DirectiveKind::BlockAllMixedContent,
        DirectiveKind::ChildSrc,
        DirectiveKind::ConnectSrc,
        DirectiveKind::DefaultSrc,
        DirectiveKind::FontSrc,
        DirectiveKind::FormAction,
        DirectiveKind::FrameAncestors,
        DirectiveKind::FrameSrc,
        DirectiveKind::ImgSrc,
        DirectiveKind::ManifestSrc,
        DirectiveKind::MediaSrc,
        DirectiveKind::NavigateTo,
        DirectiveKind::ObjectSrc,
        DirectiveKind::PluginTypes,
        DirectiveKind::PrefetchSrc,
        DirectiveKind::Referrer,
        DirectiveKind::ReportTo,
        DirectiveKind::ReportUri,
        DirectiveKind::RequireSriFor,
        DirectiveKind::Sandbox,
        DirectiveKind::ScriptSrc,
        DirectiveKind::ScriptSrcAttr,
        DirectiveKind::ScriptSrcElem,
        DirectiveKind::StyleSrc,
        DirectiveKind::StyleSrcAttr,
        DirectiveKind::StyleSrcElem,
        DirectiveKind::UpgradeInsecureRequests,
        DirectiveKind::WorkerSrc,
        DirectiveKind::Allow,
        DirectiveKind::Options,
    ];

    #[test]
    fn test_name_roundtrip() {
        for kind in ALL {
            assert_eq!(DirectiveKind::from_name(kind.name()), kind, "{}", kind);
        }
    }

    #[test]
    fn test_case_insensitive() {
        assert_eq!(DirectiveKind::from_name("Script-SRC"), DirectiveKind::ScriptSrc);
        assert_eq!(DirectiveKind::from_name("IMG-SRC"), DirectiveKind::ImgSrc);
    }

    #[test]
    fn test_unrecognised() {
        assert_eq!(DirectiveKind::from_name("script"), DirectiveKind::Unrecognised);
        assert_eq!(DirectiveKind::from_name(""), DirectiveKind::Unrecognised);
    }

    #[test]
    fn test_list_valued() {
        assert!(DirectiveKind::ScriptSrc.is_list_valued());
        assert!(DirectiveKind::FrameAncestors.is_list_valued());
        assert!(DirectiveKind::Sandbox.is_list_valued());
        assert!(!DirectiveKind::FrameAncestors.is_source_list());
        assert!(!DirectiveKind::Referrer.is_list_valued());
        assert!(!DirectiveKind::ReportTo.is_list_valued());
        assert!(!DirectiveKind::UpgradeInsecureRequests.is_list_valued());
        assert!(!DirectiveKind::Unrecognised.is_list_valued());
    }
}
