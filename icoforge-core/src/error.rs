use std::{error, fmt, io, path::PathBuf};

#[derive(Debug)]
pub enum Error {
    NoInputs,
    NoSizes,
    InvalidSize { size: u32 },
    OutputRootUnusable { path: PathBuf, source: io::Error },
    ImageError(image::ImageError),
    IoError(io::Error),
}

impl error::Error for Error {}

impl fmt::Display for Error {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::NoInputs => write!(f, "No input images selected"),
            Self::NoSizes => write!(f, "No target sizes configured"),
            Self::InvalidSize { size } => write!(f, "Invalid target size: {size}"),
            Self::OutputRootUnusable { path, source } => {
                write!(f, "Cannot use output directory {:?}: {}", path, source)
            }
            Self::ImageError(err) => err.fmt(f),
            Self::IoError(err) => err.fmt(f),
        }
    }
}

impl From<io::Error> for Error {
    fn from(err: io::Error) -> Error {
        Error::IoError(err)
    }
}

impl From<image::ImageError> for Error {
    fn from(err: image::ImageError) -> Error {
        Error::ImageError(err)
    }
}
