//! Error conversion implementations.
//!
//! This module contains From trait implementations to convert errors raised by
//! the XML and ZIP layers into the unified Error type.

use super::types::Error;

impl From<quick_xml::Error> for Error {
    fn from(err: quick_xml::Error) -> Self {
        Error::Xml(err.to_string())
    }
}

impl From<quick_xml::events::attributes::AttrError> for Error {
    fn from(err: quick_xml::events::attributes::AttrError) -> Self {
        Error::Xml(format!("attribute error: {}", err))
    }
}

impl From<quick_xml::encoding::EncodingError> for Error {
    fn from(err: quick_xml::encoding::EncodingError) -> Self {
        Error::Xml(format!("encoding error: {}", err))
    }
}

impl From<quick_xml::escape::EscapeError> for Error {
    fn from(err: quick_xml::escape::EscapeError) -> Self {
        Error::Xml(format!("escape error: {}", err))
    }
}

impl From<zip::result::ZipError> for Error {
    fn from(err: zip::result::ZipError) -> Self {
        match err {
            zip::result::ZipError::Io(e) => Error::Io(e),
            zip::result::ZipError::FileNotFound => {
                Error::PartNotFound("file not found in archive".to_string())
            },
            other => Error::Zip(other.to_string()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_zip_not_found_maps_to_part_not_found() {
        let err = Error::from(zip::result::ZipError::FileNotFound);
        assert!(matches!(err, Error::PartNotFound(_)));
    }

    #[test]
    fn test_zip_io_maps_to_io() {
        let io = std::io::Error::new(std::io::ErrorKind::UnexpectedEof, "short read");
        let err = Error::from(zip::result::ZipError::Io(io));
        assert!(matches!(err, Error::Io(_)));
    }
}
