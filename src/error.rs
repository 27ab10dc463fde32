use crate::convert::ConversionState;
use thiserror::Error;

/// All errors that the crate can generate
#[derive(Error, Debug)]
pub enum Error {
    /// The page size and margins leave no room for content. Fix the layout
    /// parameters; retrying with the same inputs fails the same way.
    #[error("invalid layout: usable area is {width} x {height}")]
    InvalidLayout { width: f32, height: f32 },

    /// The source image has a zero dimension
    #[error("image is empty ({width} x {height} pixels)")]
    EmptyImage { width: u32, height: u32 },

    /// The input file is not a document, text file, HTML page or image
    #[error("unsupported input: {0}")]
    UnsupportedInput(String),

    /// The document could not be turned into HTML
    #[error("failed to extract document contents: {0}")]
    Extraction(String),

    /// The HTML renderer failed
    #[error("failed to render HTML: {0}")]
    Render(String),

    /// A conversion tried to move between states out of order
    #[error("invalid conversion state transition from {from:?} to {to:?}")]
    InvalidTransition {
        from: ConversionState,
        to: ConversionState,
    },

    /// Conversion was requested without selecting an input first
    #[error("no input selected")]
    NoInput,

    #[error(transparent)]
    /// An I/O error occurred
    Io(#[from] std::io::Error),

    #[error(transparent)]
    /// [owned_ttf_parser] failed to parse the font
    FaceParsing(#[from] owned_ttf_parser::FaceParsingError),

    #[error(transparent)]
    /// [image] failed to decode the image
    Image(#[from] image::ImageError),

    #[error(transparent)]
    /// [zip] failed to open the document container
    Zip(#[from] zip::result::ZipError),

    #[error(transparent)]
    /// [roxmltree] failed to parse document XML
    Xml(#[from] roxmltree::Error),
}

impl Error {
    pub(crate) fn invalid_layout(width: f32, height: f32) -> Error {
        Error::InvalidLayout { width, height }
    }
}
