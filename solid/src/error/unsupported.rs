use solid_parser::Span;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum UnsupportedFeatureKind {
    /// Tuple, record, set or map literal with `literal_collections` off
    LiteralCollections,
    /// `?.` or `!.` with `optional_access` off
    OptionalAccess,
    /// A construct the instruction builder cannot lower
    Lowering(String),
    Other(String),
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UnsupportedFeature {
    pub kind: UnsupportedFeatureKind,
    pub span: Span,
    pub hint: Option<String>,
}

impl UnsupportedFeature {
    pub fn new(kind: UnsupportedFeatureKind, span: Span) -> Self {
        Self {
            kind,
            span,
            hint: None,
        }
    }

    pub fn with_hint(mut self, hint: impl Into<String>) -> Self {
        self.hint = Some(hint.into());
        self
    }

    pub fn code(&self) -> u32 {
        9001
    }
}

impl std::fmt::Display for UnsupportedFeatureKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::LiteralCollections => write!(f, "collection literal"),
            Self::OptionalAccess => write!(f, "optional access"),
            Self::Lowering(what) => write!(f, "cannot lower {} to instructions", what),
            Self::Other(message) => write!(f, "{}", message),
        }
    }
}

impl std::fmt::Display for UnsupportedFeature {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "Unsupported feature: {} at {}", self.kind, self.span)?;
        if let Some(hint) = &self.hint {
            write!(f, " (hint: {})", hint)?;
        }
        Ok(())
    }
}

impl std::error::Error for UnsupportedFeature {}
