use std::error::Error;
use std::fmt;

/// Boxed error held by an [`ErrorList`]
pub type BoxError = Box<dyn Error + Send + Sync + 'static>;

/// Combines several errors into one, preserving their order
#[derive(Debug, Default)]
pub struct ErrorList {
    errors: Vec<BoxError>,
}

impl ErrorList {
    pub fn new(errors: Vec<BoxError>) -> Self {
        Self { errors }
    }

    pub fn errors(&self) -> &[BoxError] {
        &self.errors
    }

    pub fn len(&self) -> usize {
        self.errors.len()
    }

    pub fn is_empty(&self) -> bool {
        self.errors.is_empty()
    }

    pub fn iter(&self) -> std::slice::Iter<'_, BoxError> {
        self.errors.iter()
    }
}

impl fmt::Display for ErrorList {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("errors: [")?;
        for (i, err) in self.errors.iter().enumerate() {
            if i > 0 {
                f.write_str(" ")?;
            }
            write!(f, "{}", err)?;
        }
        f.write_str("]")
    }
}

impl Error for ErrorList {}

impl<E> FromIterator<E> for ErrorList
where
    E: Into<BoxError>,
{
    fn from_iter<I: IntoIterator<Item = E>>(iter: I) -> Self {
        Self::new(iter.into_iter().map(Into::into).collect())
    }
}

impl IntoIterator for ErrorList {
    type Item = BoxError;
    type IntoIter = std::vec::IntoIter<BoxError>;

    fn into_iter(self) -> Self::IntoIter {
        self.errors.into_iter()
    }
}

impl<'a> IntoIterator for &'a ErrorList {
    type Item = &'a BoxError;
    type IntoIter = std::slice::Iter<'a, BoxError>;

    fn into_iter(self) -> Self::IntoIter {
        self.errors.iter()
    }
}
