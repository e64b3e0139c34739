use thiserror::Error;

#[derive(Debug, Error)]
pub enum BracketError {
    #[error("No bracket pairs configured.\n\nAdd at least one entry to `bracket_pairs` in the config.")]
    EmptyPairTable,

    #[error("At least one rainbow color is required")]
    ZeroColorLevels,

    #[error("Window size must be greater than zero")]
    ZeroWindowSize,

    #[error("Bracket '{0}' cannot close itself")]
    SymmetricPair(char),

    #[error("Bracket '{0}' appears more than once in the pair table")]
    DuplicateBracket(char),

    #[error("Invalid bracket {0:?}: expected a single character")]
    InvalidBracket(String),

    #[error("'{0}' is not a configured opening bracket")]
    UnknownBracket(char),

    #[error("Unknown syntax: {0}")]
    UnknownSyntax(String),

    #[error("Invalid color {0:?}: expected #RRGGBB")]
    InvalidColor(String),

    #[error("Document session is closed")]
    SessionClosed,

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}
