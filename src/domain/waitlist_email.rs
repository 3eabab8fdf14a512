use validator::validate_email;

/// RFC 5321 upper bound on the length of a forward-path.
const MAX_EMAIL_LENGTH: usize = 254;

/// A trimmed, lowercased, grammar-checked email address. This is the uniqueness key of the
/// waitlist: two inputs that parse to the same `WaitlistEmail` are the same signer.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct WaitlistEmail(String);

#[derive(thiserror::Error, Debug, PartialEq, Eq)]
pub enum EmailError {
    #[error("Please enter a valid email address")]
    Invalid,
    #[error("Email address is too long")]
    TooLong,
}

impl WaitlistEmail {
    pub fn parse(s: String) -> Result<WaitlistEmail, EmailError> {
        let normalized = s.trim().to_lowercase();

        if !is_valid_address(&normalized) {
            return Err(EmailError::Invalid);
        }
        if normalized.chars().count() > MAX_EMAIL_LENGTH {
            return Err(EmailError::TooLong);
        }

        Ok(Self(canonicalize(normalized)))
    }
}

fn is_valid_address(s: &str) -> bool {
    if s.is_empty() || s.chars().any(char::is_whitespace) {
        return false;
    }
    let domain = match s.rsplit_once('@') {
        Some((_, domain)) => domain,
        None => return false,
    };
    is_fully_qualified(domain) && validate_email(s)
}

/// A host name with at least two labels and an alphabetic (or punycode) top-level domain.
/// IP literals such as `[127.0.0.1]` and numeric TLDs are rejected.
fn is_fully_qualified(domain: &str) -> bool {
    if domain.starts_with('[') {
        return false;
    }
    match domain.rsplit_once('.') {
        Some((_, tld)) => {
            tld.starts_with("xn--")
                || (tld.chars().count() >= 2 && tld.chars().all(char::is_alphabetic))
        }
        None => false,
    }
}

/// Provider-specific aliasing is left alone: dots, `+tags` and `googlemail.com` survive as typed.
/// Folding them would merge addresses the signer considers distinct.
fn canonicalize(normalized: String) -> String {
    normalized
}

impl AsRef<str> for WaitlistEmail {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

impl std::fmt::Display for WaitlistEmail {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        self.0.fmt(f)
    }
}
