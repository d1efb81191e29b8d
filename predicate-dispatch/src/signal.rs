//! The continuation signal.

/// What a candidate's implementation did with the value it was handed.
///
/// `Declined` is the continuation signal: the predicate accepted the value but
/// the implementation found, part-way through, that it does not apply after
/// all. The engine then tries the next candidate as if the predicate had
/// returned `false`. Genuine failures travel in the surrounding `Result`.
#[derive(Debug, Clone, PartialEq)]
pub enum Outcome<T> {
    /// The candidate produced a result; resolution stops here.
    Matched(T),
    /// Try the next candidate.
    Declined,
}

impl<T> Outcome<T> {
    pub fn is_declined(&self) -> bool {
        matches!(self, Outcome::Declined)
    }

    /// Convert into an `Option`, dropping the decline.
    pub fn matched(self) -> Option<T> {
        match self {
            Outcome::Matched(value) => Some(value),
            Outcome::Declined => None,
        }
    }

    pub fn map<U>(self, f: impl FnOnce(T) -> U) -> Outcome<U> {
        match self {
            Outcome::Matched(value) => Outcome::Matched(f(value)),
            Outcome::Declined => Outcome::Declined,
        }
    }
}

impl<T> From<Option<T>> for Outcome<T> {
    fn from(value: Option<T>) -> Self {
        match value {
            Some(value) => Outcome::Matched(value),
            None => Outcome::Declined,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_option_conversion() {
        assert_eq!(Outcome::from(Some(3)), Outcome::Matched(3));
        assert!(Outcome::<i32>::from(None).is_declined());
        assert_eq!(Outcome::Matched(2).map(|v| v * 2).matched(), Some(4));
        assert_eq!(Outcome::<i32>::Declined.matched(), None);
    }
}
