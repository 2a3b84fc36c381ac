use std::fmt;

use crate::error::{Error, Result};

/// Owned author/committer identity: name, email, and the moment the
/// signature was made (unix seconds plus UTC offset in minutes).
///
/// Duplicated, never shared, across owners; converts to and from the
/// store's borrowed signature handles at the call boundary.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Signature {
    pub name: String,
    pub email: String,
    pub time: i64,
    pub offset_minutes: i32,
}

impl Signature {
    /// Parse `"Name <email>"`, stamping the current local time.
    pub fn parse(s: &str) -> Result<Signature> {
        let open = s.find('<');
        let close = s.rfind('>');
        let (open, close) = match (open, close) {
            (Some(o), Some(c)) if o < c => (o, c),
            _ => {
                return Err(Error::InvalidArgument(format!(
                    "expected \"Name <email>\", got {:?}",
                    s
                )))
            }
        };
        let name = s[..open].trim();
        let email = s[open + 1..close].trim();
        if name.is_empty() || email.is_empty() {
            return Err(Error::InvalidArgument(format!(
                "expected \"Name <email>\", got {:?}",
                s
            )));
        }
        let now = chrono::Local::now();
        Ok(Signature {
            name: name.to_string(),
            email: email.to_string(),
            time: now.timestamp(),
            offset_minutes: now.offset().local_minus_utc() / 60,
        })
    }

    pub fn from_git(sig: &git2::Signature<'_>) -> Signature {
        Signature {
            name: sig.name().unwrap_or("").to_string(),
            email: sig.email().unwrap_or("").to_string(),
            time: sig.when().seconds(),
            offset_minutes: sig.when().offset_minutes(),
        }
    }

    pub fn to_git(&self) -> Result<git2::Signature<'static>> {
        let when = git2::Time::new(self.time, self.offset_minutes);
        Ok(git2::Signature::new(&self.name, &self.email, &when)?)
    }
}

impl fmt::Display for Signature {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} <{}>", self.name, self.email)
    }
}
