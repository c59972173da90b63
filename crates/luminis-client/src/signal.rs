use std::fmt;

/// Control tokens exchanged as whole frames. Matching is case-sensitive.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Signal {
    Begin,
    GetReady,
    Move,
    End,
    Ready,
    NoResponse,
}

impl Signal {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Begin => "BEGIN",
            Self::GetReady => "GET_READY",
            Self::Move => "MOVE",
            Self::End => "END",
            Self::Ready => "READY",
            Self::NoResponse => "NO_RESPONSE",
        }
    }

    pub fn parse(token: &str) -> Option<Self> {
        match token {
            "BEGIN" => Some(Self::Begin),
            "GET_READY" => Some(Self::GetReady),
            "MOVE" => Some(Self::Move),
            "END" => Some(Self::End),
            "READY" => Some(Self::Ready),
            "NO_RESPONSE" => Some(Self::NoResponse),
            _ => None,
        }
    }
}

impl fmt::Display for Signal {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn tokens_parse_back() {
        for signal in [
            Signal::Begin,
            Signal::GetReady,
            Signal::Move,
            Signal::End,
            Signal::Ready,
            Signal::NoResponse,
        ] {
            assert_eq!(Signal::parse(signal.as_str()), Some(signal));
        }
    }

    #[test]
    fn parsing_is_case_sensitive() {
        assert_eq!(Signal::parse("move"), None);
        assert_eq!(Signal::parse("MOVE "), None);
    }
}
