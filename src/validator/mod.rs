mod host;
mod local;
mod types;

pub use types::{FormatError, HostFormatIssue, ParsedAddress, UserFormatIssue};

use host::check_host;
use local::check_user;

const MIN_TOTAL_LEN: usize = 6;
const MAX_TOTAL_LEN: usize = 254;

/// Checks an already normalized address and splits it at its last `@`.
///
/// Checks run in order and fail fast: total length, `@` placement (the host
/// keeps at least three characters), user length, dot placement and charset,
/// then host shape. Input is expected to come from
/// [`normalize_address`](crate::normalize_address); nothing is rewritten here.
pub fn validate_format(normalized: &str) -> Result<ParsedAddress, FormatError> {
    let len = normalized.len();
    if !(MIN_TOTAL_LEN..=MAX_TOTAL_LEN).contains(&len) {
        return Err(FormatError::BadUserFormat(UserFormatIssue::TotalLength(
            len,
        )));
    }

    let at = match normalized.rfind('@') {
        Some(at) if at > 0 && at <= len - 4 => at,
        _ => return Err(FormatError::BadUserFormat(UserFormatIssue::MisplacedAt)),
    };
    let (user, host) = (&normalized[..at], &normalized[at + 1..]);

    check_user(user).map_err(FormatError::BadUserFormat)?;
    check_host(host).map_err(FormatError::BadHostFormat)?;

    Ok(ParsedAddress {
        normalized: normalized.to_string(),
        user: user.to_string(),
        host: host.to_string(),
    })
}
